use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::hoyo::Game;

use super::Scheduler;

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct SubscriptionV1 {
    pub discord_user_id: u64,
    pub discord_channel_id: u64,
    pub game: Game,
    pub uid: String,
    pub server: String,
    pub cookie: String,
    /* Notify when the resource is at most this many hours from full. */
    pub threshold_power: Option<i64>,
    /* Notify when the longest expedition has at most this many hours left. */
    pub threshold_expedition: Option<i64>,
    pub check_daily_time: Option<DateTime<Utc>>,
    pub check_universe_time: Option<DateTime<Utc>>,
    pub check_echo_of_war_time: Option<DateTime<Utc>>,
    pub next_check_time: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(tag = "version")]
enum Storage {
    #[serde(rename = "1")]
    V1(SubscriptionV1),
}

impl Scheduler {
    fn storage_path(&self, discord_user_id: u64, game: Game) -> String {
        format!(
            "{}/sub-{}-{}.json",
            self.storage_folder,
            discord_user_id,
            game.key()
        )
    }

    pub fn read_from_storage(
        &self,
        discord_user_id: u64,
        game: Game,
    ) -> Result<SubscriptionV1, String> {
        let storage_path = self.storage_path(discord_user_id, game);

        let storage =
            std::fs::read_to_string(&storage_path).map_err(|_| "Subscription not found.")?;
        let storage: Storage = serde_json::from_str(&storage).map_err(|_| "Invalid storage.")?;
        match storage {
            Storage::V1(subscription) => Ok(subscription),
        }
    }

    /* Upsert keyed by (user, game); a whole-file write, so the record is
     * never visible half-updated and the last writer wins. */
    pub fn insert_or_replace(&self, subscription: &SubscriptionV1) -> Result<(), String> {
        let storage_path = self.storage_path(subscription.discord_user_id, subscription.game);

        std::fs::write(
            &storage_path,
            serde_json::to_string(&Storage::V1(subscription.clone())).map_err(|e| e.to_string())?,
        )
        .map_err(|e| e.to_string())
    }
}
