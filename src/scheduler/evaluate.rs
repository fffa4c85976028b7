use chrono::{DateTime, Duration, Utc};

use crate::hoyo::RealtimeNotes;

use super::storage::SubscriptionV1;

/* The moment the remaining time will have dropped to the threshold. Clamped
 * so a remaining time already at or below the threshold yields `now`, never
 * a moment in the past. */
fn threshold_crossing(
    now: DateTime<Utc>,
    remaining: Duration,
    threshold: Duration,
) -> DateTime<Utc> {
    now + (remaining - threshold).max(Duration::zero())
}

/* Evaluates one subscription against freshly fetched realtime notes.
 *
 * Returns the updated record (the input is left untouched) and the
 * notification text, if any threshold was crossed. The updated record's
 * next_check_time is the earliest moment any enabled check becomes
 * interesting again, capped at a day out, and floored to an hour out
 * whenever a notification fired so the user is not pinged back-to-back. */
pub fn evaluate(
    subscription: &SubscriptionV1,
    notes: &RealtimeNotes,
    now: DateTime<Utc>,
) -> (SubscriptionV1, Option<String>) {
    let wording = subscription.game.wording();
    let mut updated = subscription.clone();
    let mut message = String::new();

    /* Fallback ceiling: re-check within a day no matter what. */
    let mut candidates = vec![now + Duration::days(1)];

    if let Some(hours) = subscription.threshold_power {
        let threshold = Duration::hours(hours);
        if notes.time_to_full <= threshold {
            message += if notes.time_to_full <= Duration::zero() {
                wording.power_full
            } else {
                wording.power_almost_full
            };
        }
        candidates.push(if notes.current_stamina >= notes.max_stamina {
            now + Duration::hours(6)
        } else {
            threshold_crossing(now, notes.time_to_full, threshold)
        });
    }

    if let Some(hours) = subscription.threshold_expedition {
        /* Only the expedition that finishes last matters. */
        if let Some(longest) = notes
            .expeditions
            .iter()
            .max_by_key(|epd| epd.remaining_time)
        {
            let threshold = Duration::hours(hours);
            if longest.remaining_time <= threshold {
                message += if longest.remaining_time <= Duration::zero() {
                    wording.expedition_done
                } else {
                    wording.expedition_almost_done
                };
            }
            candidates.push(if longest.finished {
                now + Duration::hours(6)
            } else {
                threshold_crossing(now, longest.remaining_time, threshold)
            });
        }
    }

    if let (Some(check_time), Some(progress)) =
        (subscription.check_daily_time, notes.daily_progress)
    {
        let mut check_time = check_time;
        if now >= check_time {
            if progress.current < progress.max {
                message += wording.daily_incomplete;
            }
            check_time = check_time + Duration::days(1);
            updated.check_daily_time = Some(check_time);
        }
        candidates.push(check_time);
    }

    if let (Some(check_time), Some(progress)) =
        (subscription.check_universe_time, notes.weekly_activity)
    {
        let mut check_time = check_time;
        if now >= check_time {
            if progress.current < progress.max {
                message += wording.weekly_activity_incomplete;
            }
            check_time = check_time + Duration::weeks(1);
            updated.check_universe_time = Some(check_time);
        }
        candidates.push(check_time);
    }

    if let (Some(check_time), Some(remaining)) = (
        subscription.check_echo_of_war_time,
        notes.remaining_weekly_discounts,
    ) {
        let mut check_time = check_time;
        if now >= check_time {
            if remaining > 0 {
                message += wording.weekly_boss_incomplete;
            }
            check_time = check_time + Duration::weeks(1);
            updated.check_echo_of_war_time = Some(check_time);
        }
        candidates.push(check_time);
    }

    let mut next_check_time = candidates.into_iter().min().unwrap();
    if !message.is_empty() {
        next_check_time = next_check_time.max(now + Duration::hours(1));
    }
    updated.next_check_time = next_check_time;

    if message.is_empty() {
        (updated, None)
    } else {
        (updated, Some(message))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use crate::hoyo::{Expedition, Game, Progress};

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn subscription(game: Game) -> SubscriptionV1 {
        SubscriptionV1 {
            discord_user_id: 1,
            discord_channel_id: 2,
            game,
            uid: "800000001".to_string(),
            server: "prod_official_asia".to_string(),
            cookie: "ltoken=abc".to_string(),
            threshold_power: None,
            threshold_expedition: None,
            check_daily_time: None,
            check_universe_time: None,
            check_echo_of_war_time: None,
            next_check_time: now(),
        }
    }

    fn notes() -> RealtimeNotes {
        RealtimeNotes {
            current_stamina: 100,
            max_stamina: 240,
            time_to_full: Duration::hours(18),
            expeditions: Vec::new(),
            daily_progress: Some(Progress {
                current: 500,
                max: 500,
            }),
            weekly_activity: Some(Progress {
                current: 14000,
                max: 14000,
            }),
            remaining_weekly_discounts: Some(0),
        }
    }

    fn expedition(remaining: Duration) -> Expedition {
        Expedition {
            remaining_time: remaining,
            finished: remaining <= Duration::zero(),
        }
    }

    #[test]
    fn disabled_fields_are_inert() {
        let (updated, message) = evaluate(&subscription(Game::StarRail), &notes(), now());

        assert_eq!(message, None);
        assert_eq!(updated.next_check_time, now() + Duration::days(1));
        assert_eq!(updated.check_daily_time, None);
        assert_eq!(updated.check_universe_time, None);
        assert_eq!(updated.check_echo_of_war_time, None);
    }

    #[test]
    fn next_check_is_minimum_of_candidates() {
        let mut sub = subscription(Game::StarRail);
        sub.threshold_power = Some(2);
        sub.check_daily_time = Some(now() + Duration::hours(5));

        /* Stamina crosses the threshold in 16 hours, the daily check is due
         * in 5: the daily check wins. */
        let (updated, message) = evaluate(&sub, &notes(), now());

        assert_eq!(message, None);
        assert_eq!(updated.next_check_time, now() + Duration::hours(5));
    }

    #[test]
    fn notification_floors_next_check_to_one_hour() {
        let mut sub = subscription(Game::StarRail);
        sub.threshold_power = Some(2);

        let mut notes = notes();
        notes.time_to_full = Duration::minutes(90);

        let (updated, message) = evaluate(&sub, &notes, now());

        let message = message.unwrap();
        assert!(message.contains("almost full"));
        /* The crossing candidate would be 30 minutes in the past, clamped to
         * now; the notification floor pushes it to an hour out. */
        assert_eq!(updated.next_check_time, now() + Duration::hours(1));
    }

    #[test]
    fn full_resource_reports_full_and_backs_off() {
        let mut sub = subscription(Game::StarRail);
        sub.threshold_power = Some(2);

        let mut notes = notes();
        notes.current_stamina = 240;
        notes.time_to_full = Duration::zero();

        let (updated, message) = evaluate(&sub, &notes, now());

        assert!(message.unwrap().contains("Trailblaze Power is full"));
        assert_eq!(updated.next_check_time, now() + Duration::hours(6));
    }

    #[test]
    fn longest_expedition_is_the_one_checked() {
        let mut sub = subscription(Game::StarRail);
        sub.threshold_expedition = Some(1);

        let mut notes = notes();
        notes.expeditions = vec![
            expedition(Duration::minutes(30)),
            expedition(Duration::hours(3)),
        ];

        /* The 3 hour expedition is the longest and is above the threshold,
         * so nothing fires; the next check is its crossing time. */
        let (updated, message) = evaluate(&sub, &notes, now());

        assert_eq!(message, None);
        assert_eq!(updated.next_check_time, now() + Duration::hours(2));
    }

    #[test]
    fn finished_expedition_notifies_and_backs_off() {
        let mut sub = subscription(Game::StarRail);
        sub.threshold_expedition = Some(1);

        let mut notes = notes();
        notes.expeditions = vec![expedition(Duration::zero())];

        let (updated, message) = evaluate(&sub, &notes, now());

        assert!(message.unwrap().contains("Assignments are complete"));
        /* Finished expeditions back off 6 hours; the notification floor of
         * 1 hour does not override a later candidate. */
        assert_eq!(updated.next_check_time, now() + Duration::hours(6));
    }

    #[test]
    fn empty_expedition_list_is_skipped() {
        let mut sub = subscription(Game::StarRail);
        sub.threshold_expedition = Some(1);

        let (updated, message) = evaluate(&sub, &notes(), now());

        assert_eq!(message, None);
        assert_eq!(updated.next_check_time, now() + Duration::days(1));
    }

    #[test]
    fn due_daily_check_advances_by_a_day() {
        let mut sub = subscription(Game::StarRail);
        sub.check_daily_time = Some(now() - Duration::seconds(1));

        let mut notes = notes();
        notes.daily_progress = Some(Progress {
            current: 5,
            max: 10,
        });

        let (updated, message) = evaluate(&sub, &notes, now());

        assert!(message.unwrap().contains("daily training is not yet complete"));
        assert_eq!(
            updated.check_daily_time,
            Some(now() - Duration::seconds(1) + Duration::days(1))
        );
        assert_eq!(
            updated.next_check_time,
            now() - Duration::seconds(1) + Duration::days(1)
        );
    }

    #[test]
    fn complete_daily_advances_without_message() {
        let mut sub = subscription(Game::StarRail);
        sub.check_daily_time = Some(now());

        let (updated, message) = evaluate(&sub, &notes(), now());

        assert_eq!(message, None);
        assert_eq!(updated.check_daily_time, Some(now() + Duration::days(1)));
    }

    #[test]
    fn weekly_checks_advance_by_a_week() {
        let mut sub = subscription(Game::StarRail);
        sub.check_universe_time = Some(now() - Duration::hours(2));
        sub.check_echo_of_war_time = Some(now() - Duration::hours(3));

        let mut notes = notes();
        notes.weekly_activity = Some(Progress {
            current: 6000,
            max: 14000,
        });
        notes.remaining_weekly_discounts = Some(3);

        let (updated, message) = evaluate(&sub, &notes, now());

        let message = message.unwrap();
        assert!(message.contains("Simulated Universe"));
        assert!(message.contains("Echo of War"));
        assert_eq!(
            updated.check_universe_time,
            Some(now() - Duration::hours(2) + Duration::weeks(1))
        );
        assert_eq!(
            updated.check_echo_of_war_time,
            Some(now() - Duration::hours(3) + Duration::weeks(1))
        );
    }

    #[test]
    fn future_check_times_are_untouched() {
        let mut sub = subscription(Game::StarRail);
        sub.check_daily_time = Some(now() + Duration::hours(3));
        sub.check_universe_time = Some(now() + Duration::days(2));
        sub.check_echo_of_war_time = Some(now() + Duration::days(3));

        let (updated, message) = evaluate(&sub, &notes(), now());

        assert_eq!(message, None);
        assert_eq!(updated.check_daily_time, sub.check_daily_time);
        assert_eq!(updated.check_universe_time, sub.check_universe_time);
        assert_eq!(updated.check_echo_of_war_time, sub.check_echo_of_war_time);
        assert_eq!(updated.next_check_time, now() + Duration::hours(3));
    }

    #[test]
    fn evaluation_is_idempotent_while_nothing_is_due() {
        let mut sub = subscription(Game::StarRail);
        sub.threshold_power = Some(2);
        sub.check_daily_time = Some(now() + Duration::hours(8));

        let (first, message) = evaluate(&sub, &notes(), now());
        assert_eq!(message, None);

        let (second, message) = evaluate(&first, &notes(), now());
        assert_eq!(message, None);
        assert_eq!(first, second);
    }

    #[test]
    fn missing_activity_data_skips_the_check() {
        /* A Genshin snapshot has no Simulated Universe equivalent; an
         * enabled universe check must neither fire nor advance. */
        let mut sub = subscription(Game::Genshin);
        sub.check_universe_time = Some(now() - Duration::hours(1));

        let mut notes = notes();
        notes.weekly_activity = None;

        let (updated, message) = evaluate(&sub, &notes, now());

        assert_eq!(message, None);
        assert_eq!(updated.check_universe_time, sub.check_universe_time);
        assert_eq!(updated.next_check_time, now() + Duration::days(1));
    }

    #[test]
    fn genshin_wording_is_used_for_genshin_records() {
        let mut sub = subscription(Game::Genshin);
        sub.threshold_power = Some(2);

        let mut notes = notes();
        notes.time_to_full = Duration::minutes(90);

        let (_, message) = evaluate(&sub, &notes, now());

        assert!(message.unwrap().contains("Original Resin is almost full"));
    }

    #[test]
    fn threshold_crossing_never_returns_the_past() {
        assert_eq!(
            threshold_crossing(now(), Duration::hours(5), Duration::hours(2)),
            now() + Duration::hours(3)
        );
        assert_eq!(
            threshold_crossing(now(), Duration::minutes(30), Duration::hours(2)),
            now()
        );
        assert_eq!(
            threshold_crossing(now(), Duration::hours(2), Duration::hours(2)),
            now()
        );
    }

    #[test]
    fn input_record_is_not_mutated() {
        let mut sub = subscription(Game::StarRail);
        sub.check_daily_time = Some(now() - Duration::seconds(1));
        let before = sub.clone();

        let (updated, _) = evaluate(&sub, &notes(), now());

        assert_eq!(sub, before);
        assert_ne!(updated.check_daily_time, before.check_daily_time);
    }
}
