use serenity::all::{ActivityData, Command, GuildId, Interaction, Ready};
use serenity::{async_trait, prelude::*};
use tracing::{error, info};

use crate::mentions::CommandMentions;
use crate::scheduler::Scheduler;
use crate::state::BotState;

mod schedule;

#[async_trait]
impl EventHandler for BotState {
    async fn ready(&self, _: Context, ready: Ready) {
        info!("Connected to Discord as {}", ready.user.name);
    }

    async fn cache_ready(&self, ctx: Context, _guilds: Vec<GuildId>) {
        if !self.set_if_startup().await {
            return;
        }
        self.set_discord(ctx.clone()).await;

        ctx.set_activity(Some(ActivityData::custom("Watching your realtime notes")));

        /* Register our global commands, and remember their IDs so messages
         * can render proper command mentions. */
        match Command::create_global_command(&ctx.http, schedule::register()).await {
            Ok(command) => {
                self.set_mentions(CommandMentions::new(&[command])).await;
            }
            Err(why) => {
                error!("Error creating global command: {why:?}");
            }
        }

        Scheduler::start(self.clone()).await;
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if let Interaction::Command(command) = interaction {
            match command.data.name.as_str() {
                "schedule" => schedule::run(&self, &ctx, &command).await,
                _ => {}
            };
        }
    }
}
