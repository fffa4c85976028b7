use crate::hoyo::{FetchError, RealtimeNotes};
use crate::scheduler::SubscriptionV1;

use super::BotState;

impl BotState {
    pub async fn get_realtime_notes(
        &self,
        subscription: &SubscriptionV1,
    ) -> Result<RealtimeNotes, FetchError> {
        let this = self.0.read().await;

        this.hoyo
            .get_realtime_notes(
                subscription.game,
                &subscription.uid,
                &subscription.server,
                &subscription.cookie,
            )
            .await
    }
}
