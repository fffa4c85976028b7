use crate::scheduler::SubscriptionV1;

use super::BotState;

impl BotState {
    /* Persists the subscription and makes sure the scheduler picks it up on
     * its next tick. */
    pub async fn insert_subscription(&self, subscription: SubscriptionV1) -> Result<(), String> {
        let this = self.0.read().await;
        let scheduler = this.scheduler.as_ref().ok_or("Scheduler not running.")?;

        scheduler.insert_or_replace(&subscription)?;
        scheduler
            .queue_subscription(subscription.discord_user_id, subscription.game)
            .await;

        Ok(())
    }
}
