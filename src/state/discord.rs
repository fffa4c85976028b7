use serenity::all::ChannelId;

use super::BotState;

impl BotState {
    pub async fn discord_send_message(
        &self,
        channel_id: u64,
        message: &String,
    ) -> Result<(), String> {
        let this = self.0.read().await;
        let http = &this.discord.as_ref().unwrap().http;

        let channel_id = ChannelId::new(channel_id);
        channel_id.say(http, message).await.map_err(|e| e.to_string())?;

        Ok(())
    }
}
