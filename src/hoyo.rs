use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/* HoYoLAB returns this retcode when it wants a geetest puzzle solved
 * before handing out game records again. */
const RETCODE_ANTI_AUTOMATION: i32 = 1034;

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub enum Game {
    Genshin,
    StarRail,
}

/* Per-game message fragments; picked once via the game tag instead of
 * branching at every call site. */
pub struct Wording {
    pub power_name: &'static str,
    pub daily_name: &'static str,
    pub weekly_activity_name: &'static str,
    pub weekly_boss_name: &'static str,
    pub power_full: &'static str,
    pub power_almost_full: &'static str,
    pub expedition_done: &'static str,
    pub expedition_almost_done: &'static str,
    pub daily_incomplete: &'static str,
    pub weekly_activity_incomplete: &'static str,
    pub weekly_boss_incomplete: &'static str,
}

static GENSHIN_WORDING: Wording = Wording {
    power_name: "Original Resin",
    daily_name: "Daily Commissions",
    weekly_activity_name: "Weekly Activity",
    weekly_boss_name: "Weekly Boss Discounts",
    power_full: "Original Resin is full! ",
    power_almost_full: "Original Resin is almost full! ",
    expedition_done: "Expeditions are complete! ",
    expedition_almost_done: "Expeditions are almost complete! ",
    daily_incomplete: "Today's daily commissions are not yet complete! ",
    weekly_activity_incomplete: "This week's activity is not yet complete! ",
    weekly_boss_incomplete: "This week's boss discounts are not yet used! ",
};

static STARRAIL_WORDING: Wording = Wording {
    power_name: "Trailblaze Power",
    daily_name: "Daily Training",
    weekly_activity_name: "Simulated Universe",
    weekly_boss_name: "Echo of War",
    power_full: "Trailblaze Power is full! ",
    power_almost_full: "Trailblaze Power is almost full! ",
    expedition_done: "Assignments are complete! ",
    expedition_almost_done: "Assignments are almost complete! ",
    daily_incomplete: "Today's daily training is not yet complete! ",
    weekly_activity_incomplete: "This week's Simulated Universe is not yet complete! ",
    weekly_boss_incomplete: "This week's Echo of War is not yet complete! ",
};

impl Game {
    pub fn key(&self) -> &'static str {
        match self {
            Game::Genshin => "genshin",
            Game::StarRail => "starrail",
        }
    }

    pub fn from_key(key: &str) -> Option<Game> {
        match key {
            "genshin" => Some(Game::Genshin),
            "starrail" => Some(Game::StarRail),
            _ => None,
        }
    }

    pub fn wording(&self) -> &'static Wording {
        match self {
            Game::Genshin => &GENSHIN_WORDING,
            Game::StarRail => &STARRAIL_WORDING,
        }
    }

    fn notes_url(&self, uid: &str, server: &str) -> String {
        match self {
            Game::Genshin => format!(
                "https://bbs-api-os.hoyolab.com/game_record/genshin/api/dailyNote?role_id={}&server={}",
                uid, server
            ),
            Game::StarRail => format!(
                "https://bbs-api-os.hoyolab.com/game_record/hkrpg/api/note?role_id={}&server={}",
                uid, server
            ),
        }
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("anti-automation challenge triggered")]
    AntiAutomation,
    #[error("API returned retcode {retcode}: {message}")]
    Api { retcode: i32, message: String },
    #[error("request failed: {0}")]
    Http(String),
}

impl FetchError {
    /* Backoff contract towards the scheduler: bot-detection means backing
     * off for a full day, anything else is retried after five hours. */
    pub fn retry_after(&self) -> Duration {
        match self {
            FetchError::AntiAutomation => Duration::hours(24),
            _ => Duration::hours(5),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Expedition {
    pub remaining_time: Duration,
    pub finished: bool,
}

#[derive(Clone, Copy, Debug)]
pub struct Progress {
    pub current: u32,
    pub max: u32,
}

/* Normalized realtime notes; both games map onto this. Activities a game
 * does not have stay None and are never evaluated. */
#[derive(Clone, Debug)]
pub struct RealtimeNotes {
    pub current_stamina: u32,
    pub max_stamina: u32,
    pub time_to_full: Duration,
    pub expeditions: Vec<Expedition>,
    pub daily_progress: Option<Progress>,
    pub weekly_activity: Option<Progress>,
    pub remaining_weekly_discounts: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    retcode: i32,
    message: String,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct GenshinExpedition {
    status: String,
    remained_time: String,
}

#[derive(Debug, Deserialize)]
struct GenshinNote {
    current_resin: u32,
    max_resin: u32,
    resin_recovery_time: String,
    finished_task_num: u32,
    total_task_num: u32,
    remaining_resin_discount_num: u32,
    expeditions: Vec<GenshinExpedition>,
}

#[derive(Debug, Deserialize)]
struct StarRailExpedition {
    status: String,
    remaining_time: i64,
}

#[derive(Debug, Deserialize)]
struct StarRailNote {
    current_stamina: u32,
    max_stamina: u32,
    stamina_recover_time: i64,
    current_train_score: u32,
    max_train_score: u32,
    current_rogue_score: u32,
    max_rogue_score: u32,
    weekly_cocoon_cnt: u32,
    expeditions: Vec<StarRailExpedition>,
}

impl From<GenshinNote> for RealtimeNotes {
    fn from(note: GenshinNote) -> Self {
        RealtimeNotes {
            current_stamina: note.current_resin,
            max_stamina: note.max_resin,
            time_to_full: Duration::seconds(note.resin_recovery_time.parse().unwrap_or(0)),
            expeditions: note
                .expeditions
                .into_iter()
                .map(|epd| Expedition {
                    remaining_time: Duration::seconds(epd.remained_time.parse().unwrap_or(0)),
                    finished: epd.status == "Finished",
                })
                .collect(),
            daily_progress: Some(Progress {
                current: note.finished_task_num,
                max: note.total_task_num,
            }),
            /* Genshin has no Simulated Universe equivalent. */
            weekly_activity: None,
            remaining_weekly_discounts: Some(note.remaining_resin_discount_num),
        }
    }
}

impl From<StarRailNote> for RealtimeNotes {
    fn from(note: StarRailNote) -> Self {
        RealtimeNotes {
            current_stamina: note.current_stamina,
            max_stamina: note.max_stamina,
            time_to_full: Duration::seconds(note.stamina_recover_time),
            expeditions: note
                .expeditions
                .into_iter()
                .map(|epd| Expedition {
                    remaining_time: Duration::seconds(epd.remaining_time),
                    finished: epd.status == "Finished",
                })
                .collect(),
            daily_progress: Some(Progress {
                current: note.current_train_score,
                max: note.max_train_score,
            }),
            weekly_activity: Some(Progress {
                current: note.current_rogue_score,
                max: note.max_rogue_score,
            }),
            remaining_weekly_discounts: Some(note.weekly_cocoon_cnt),
        }
    }
}

pub struct Hoyo;

impl Hoyo {
    pub fn new() -> Self {
        Hoyo
    }

    pub async fn get_realtime_notes(
        &self,
        game: Game,
        uid: &str,
        server: &str,
        cookie: &str,
    ) -> Result<RealtimeNotes, FetchError> {
        let url = game.notes_url(uid, server);

        let response = reqwest::Client::new()
            .get(&url)
            .header("Cookie", cookie)
            .header("x-rpc-language", "en-us")
            .send()
            .await;

        let body = match response {
            Ok(response) => {
                let status = response.status().as_u16();
                let body = response.text().await;

                match (status, body) {
                    (200, Ok(body)) => body,
                    (_, Err(body)) => return Err(FetchError::Http(body.to_string())),
                    (status, _) => {
                        return Err(FetchError::Http(format!(
                            "Failed to fetch realtime notes: status code {}",
                            status
                        )))
                    }
                }
            }
            Err(e) => return Err(FetchError::Http(e.to_string())),
        };

        match game {
            Game::Genshin => {
                let response: ApiResponse<GenshinNote> =
                    serde_json::from_str(&body).map_err(|e| FetchError::Http(e.to_string()))?;
                Ok(unwrap_api_response(response)?.into())
            }
            Game::StarRail => {
                let response: ApiResponse<StarRailNote> =
                    serde_json::from_str(&body).map_err(|e| FetchError::Http(e.to_string()))?;
                Ok(unwrap_api_response(response)?.into())
            }
        }
    }
}

fn unwrap_api_response<T>(response: ApiResponse<T>) -> Result<T, FetchError> {
    match (response.retcode, response.data) {
        (0, Some(data)) => Ok(data),
        (RETCODE_ANTI_AUTOMATION, _) => Err(FetchError::AntiAutomation),
        (retcode, _) => Err(FetchError::Api {
            retcode,
            message: response.message,
        }),
    }
}
