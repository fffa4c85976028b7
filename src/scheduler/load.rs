use tracing::warn;

use crate::hoyo::Game;

use super::Scheduler;

impl Scheduler {
    pub async fn load_all_subscriptions(&self) {
        let storage_files = std::fs::read_dir(&self.storage_folder).unwrap();

        for storage_file in storage_files {
            let storage_file = storage_file.unwrap();
            let storage_file = storage_file.path();
            let storage_file = storage_file.file_name().unwrap();

            /* Subscriptions are stored in sub-<user>-<game>.json. */
            if let Some(storage_file) = storage_file.to_str() {
                let Some(key) = storage_file
                    .strip_prefix("sub-")
                    .and_then(|name| name.strip_suffix(".json"))
                else {
                    continue;
                };
                /* Game keys never contain a dash, so split on the last one. */
                let Some((discord_user_id, game)) = key.rsplit_once('-') else {
                    continue;
                };
                let (Ok(discord_user_id), Some(game)) =
                    (discord_user_id.parse::<u64>(), Game::from_key(game))
                else {
                    warn!("Ignoring unrecognized storage file {}", storage_file);
                    continue;
                };

                let mut subscriptions = self.subscriptions.lock().await;
                subscriptions.push((discord_user_id, game));
            }
        }
    }

    /* Registers a freshly written subscription with the running scheduler;
     * the /schedule command persists the record before calling this. */
    pub async fn queue_subscription(&self, discord_user_id: u64, game: Game) {
        let mut subscriptions = self.subscriptions.lock().await;

        if !subscriptions
            .iter()
            .any(|entry| *entry == (discord_user_id, game))
        {
            subscriptions.push((discord_user_id, game));
        }
    }
}
