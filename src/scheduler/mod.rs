use std::{env, sync::Arc};

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::hoyo::{FetchError, Game, RealtimeNotes};
use crate::state::BotState;

mod evaluate;
mod load;
mod storage;

pub use storage::SubscriptionV1;

pub struct Scheduler {
    bot: BotState,
    storage_folder: String,
    subscriptions: Arc<Mutex<Vec<(u64, Game)>>>,
}

impl Scheduler {
    pub fn new(bot: BotState) -> Self {
        let storage_folder =
            env::var("STORAGE_FOLDER").expect("Expected STORAGE_FOLDER in the environment");

        Self {
            bot,
            storage_folder,
            subscriptions: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub async fn start(bot: BotState) {
        let scheduler = Arc::new(Scheduler::new(bot.clone()));
        bot.set_scheduler(scheduler.clone()).await;
        tokio::spawn(async move {
            scheduler.load_all_subscriptions().await;
            scheduler.run().await;
        });
    }

    pub async fn run(&self) {
        info!("Starting realtime-notes scheduler thread");

        loop {
            /* Each record carries its own next_check_time; once a minute we
             * pick up whichever ones are due. Records are re-read from
             * storage so a /schedule upsert between ticks is not lost. */
            let due: Vec<SubscriptionV1> = {
                let subscriptions = self.subscriptions.lock().await;
                let now = Utc::now();

                subscriptions
                    .iter()
                    .filter_map(|(discord_user_id, game)| {
                        self.read_from_storage(*discord_user_id, *game).ok()
                    })
                    .filter(|subscription| subscription.next_check_time <= now)
                    .collect()
            };

            for subscription in due {
                self.check_subscription(subscription).await;
            }

            tokio::time::sleep(tokio::time::Duration::from_secs(60)).await;
        }
    }

    pub async fn check_subscription(&self, subscription: SubscriptionV1) {
        info!(
            "[{}] Checking {} realtime notes",
            subscription.discord_user_id,
            subscription.game.key()
        );

        match self.bot.get_realtime_notes(&subscription).await {
            Ok(notes) => {
                let (updated, message) =
                    evaluate::evaluate(&subscription, &notes, Utc::now());

                if let Err(error) = self.insert_or_replace(&updated) {
                    warn!(
                        "[{}] Failed to persist subscription: {}",
                        updated.discord_user_id, error
                    );
                    return;
                }

                if let Some(message) = message {
                    let message = format!(
                        "<@{}> {}\n{}",
                        updated.discord_user_id,
                        message,
                        render_notes(updated.game, &notes)
                    );
                    let _ = self
                        .bot
                        .discord_send_message(updated.discord_channel_id, &message)
                        .await;
                }
            }
            Err(error) => {
                warn!(
                    "[{}] Failed to fetch realtime notes: {}",
                    subscription.discord_user_id, error
                );

                /* Anti-automation challenges get a much longer backoff than
                 * ordinary API hiccups. */
                let retry_after = error.retry_after();
                let mut updated = subscription;
                updated.next_check_time = Utc::now() + retry_after;

                if let Err(error) = self.insert_or_replace(&updated) {
                    warn!(
                        "[{}] Failed to persist subscription: {}",
                        updated.discord_user_id, error
                    );
                }

                let message = match error {
                    FetchError::AntiAutomation => format!(
                        "<@{}>: HoYoLAB asked for manual verification, so your realtime notes could not be checked. Complete the verification on hoyolab.com, or renew your cookie with {}. Checking again <t:{}:R>.",
                        updated.discord_user_id,
                        self.bot.command_mention("schedule").await,
                        updated.next_check_time.timestamp()
                    ),
                    _ => format!(
                        "<@{}>: Failed to check your realtime notes: {}. Checking again <t:{}:R>.",
                        updated.discord_user_id,
                        error,
                        updated.next_check_time.timestamp()
                    ),
                };
                let _ = self
                    .bot
                    .discord_send_message(updated.discord_channel_id, &message)
                    .await;
            }
        }
    }
}

/* Long-form rendering of the notes that rides along with every
 * notification. Only activities the game actually has are listed. */
fn render_notes(game: Game, notes: &RealtimeNotes) -> String {
    let wording = game.wording();
    let mut message = String::new();

    message += &format!(
        "- `{}`: {}/{}",
        wording.power_name, notes.current_stamina, notes.max_stamina
    );
    if notes.current_stamina >= notes.max_stamina {
        message += ", full.\n";
    } else {
        message += &format!(
            ", full <t:{}:R>.\n",
            (Utc::now() + notes.time_to_full).timestamp()
        );
    }

    if !notes.expeditions.is_empty() {
        let finished = notes.expeditions.iter().filter(|epd| epd.finished).count();
        message += &format!(
            "- `Expeditions`: {}/{} finished",
            finished,
            notes.expeditions.len()
        );

        let longest = notes
            .expeditions
            .iter()
            .map(|epd| epd.remaining_time)
            .max()
            .unwrap();
        if longest > chrono::Duration::zero() {
            message += &format!(", last one done <t:{}:R>.\n", (Utc::now() + longest).timestamp());
        } else {
            message += ".\n";
        }
    }

    if let Some(progress) = notes.daily_progress {
        message += &format!(
            "- `{}`: {}/{}.\n",
            wording.daily_name, progress.current, progress.max
        );
    }
    if let Some(progress) = notes.weekly_activity {
        message += &format!(
            "- `{}`: {}/{}.\n",
            wording.weekly_activity_name, progress.current, progress.max
        );
    }
    if let Some(remaining) = notes.remaining_weekly_discounts {
        message += &format!(
            "- `{}`: {} remaining.\n",
            wording.weekly_boss_name, remaining
        );
    }

    message
}
