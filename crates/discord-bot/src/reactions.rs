use std::sync::Arc;

use async_trait::async_trait;
use contestbot_core::errors::{ContestError, ContestResult};
use contestbot_core::ledger::ReactionGateway;
use contestbot_core::models::{MessageId, UserId};
use contestbot_core::tracking::ExpiringSet;
use serenity::http::Http;
use serenity::model::channel::ReactionType;
use serenity::model::id::{self, ChannelId};
use tokio::sync::Mutex;
use tracing::debug;

/// Discord caps reaction user listings at 100 per request.
const REACTION_PAGE_SIZE: u8 = 100;

pub type ExpectedRemovals = Arc<Mutex<ExpiringSet<(MessageId, UserId)>>>;

/// Upvote reactions on the messages of one submission channel.
pub struct ChannelReactions {
    http: Arc<Http>,
    channel_id: ChannelId,
    upvote: ReactionType,
    expected_removals: ExpectedRemovals,
}

impl ChannelReactions {
    pub fn new(
        http: Arc<Http>,
        channel_id: ChannelId,
        upvote: ReactionType,
        expected_removals: ExpectedRemovals,
    ) -> Self {
        Self {
            http,
            channel_id,
            upvote,
            expected_removals,
        }
    }
}

fn gateway_error(e: serenity::Error) -> ContestError {
    ContestError::Gateway(e.to_string())
}

#[async_trait]
impl ReactionGateway for ChannelReactions {
    async fn upvoters(&self, message: MessageId) -> ContestResult<Vec<UserId>> {
        let mut upvoters = Vec::new();
        let mut after: Option<id::UserId> = None;

        loop {
            let page = self
                .channel_id
                .reaction_users(
                    &self.http,
                    id::MessageId(message),
                    self.upvote.clone(),
                    Some(REACTION_PAGE_SIZE),
                    after,
                )
                .await
                .map_err(gateway_error)?;

            let full_page = page.len() == REACTION_PAGE_SIZE as usize;
            after = page.last().map(|user| user.id);
            upvoters.extend(page.into_iter().map(|user| user.id.0));

            if !full_page {
                break;
            }
        }

        debug!("Fetched {} upvoters for message {}", upvoters.len(), message);
        Ok(upvoters)
    }

    async fn retract_upvote(&self, message: MessageId, user: UserId) -> ContestResult<()> {
        self.expected_removals.lock().await.insert((message, user));

        self.channel_id
            .delete_reaction(
                &self.http,
                id::MessageId(message),
                Some(id::UserId(user)),
                self.upvote.clone(),
            )
            .await
            .map_err(gateway_error)
    }

    async fn add_marker(&self, message: MessageId) -> ContestResult<()> {
        self.channel_id
            .create_reaction(&self.http, id::MessageId(message), self.upvote.clone())
            .await
            .map_err(gateway_error)
    }
}
