use std::sync::atomic::Ordering;
use std::sync::{atomic::AtomicBool, Arc};

use serenity::all::Context;
use tokio::sync::RwLock;

use crate::hoyo::Hoyo;
use crate::mentions::CommandMentions;
use crate::scheduler::Scheduler;

mod discord;
mod hoyo;
mod scheduler;

struct BotStorage {
    startup: AtomicBool,
    hoyo: Hoyo,
    discord: Option<Context>,
    scheduler: Option<Arc<Scheduler>>,
    mentions: Option<CommandMentions>,
}

pub struct BotState(Arc<RwLock<BotStorage>>);

impl Clone for BotState {
    fn clone(&self) -> Self {
        BotState(self.0.clone())
    }
}

impl BotState {
    pub fn new() -> Self {
        BotState(Arc::new(RwLock::new(BotStorage {
            startup: AtomicBool::new(true),
            hoyo: Hoyo::new(),
            discord: None,
            scheduler: None,
            mentions: None,
        })))
    }

    pub async fn set_discord(&self, ctx: Context) {
        let mut this = self.0.write().await;

        this.discord = Some(ctx);
    }

    pub async fn set_scheduler(&self, scheduler: Arc<Scheduler>) {
        let mut this = self.0.write().await;

        this.scheduler = Some(scheduler);
    }

    /* The command-mention table is built once from the registration
     * response at startup and never written again. */
    pub async fn set_mentions(&self, mentions: CommandMentions) {
        let mut this = self.0.write().await;

        this.mentions = Some(mentions);
    }

    pub async fn command_mention(&self, name: &str) -> String {
        let this = self.0.read().await;

        match &this.mentions {
            Some(mentions) => mentions.mention(name),
            None => format!("`/{}`", name),
        }
    }

    pub async fn set_if_startup(&self) -> bool {
        let this = self.0.read().await;

        if !this.startup.load(Ordering::Relaxed) {
            return false;
        }
        this.startup.swap(false, Ordering::Relaxed);

        true
    }
}
