// storefront_core/src/services/chat.rs

//! Chat Service: buyer/admin messaging, scoped threads and read tracking.

use chrono::Utc;
use std::fmt;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use super::degrade_read;
use crate::actor::Actor;
use crate::backend::ChatBackend;
use crate::chat::{summarize_conversations, with_context_banners, ChatMessage, ConversationSummary, NewChatMessage, ThreadEntry, ThreadScope};
use crate::error::{ShopError, ShopResult};
use crate::realtime::Realtime;

#[derive(Clone)]
pub struct ChatService {
    chat: Arc<dyn ChatBackend>,
    realtime: Realtime,
    admin_user_id: Uuid,
}

impl fmt::Debug for ChatService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatService")
            .field("admin_user_id", &self.admin_user_id)
            .finish_non_exhaustive()
    }
}

impl ChatService {
    pub fn new(chat: Arc<dyn ChatBackend>, realtime: Realtime, admin_user_id: Uuid) -> Self {
        Self {
            chat,
            realtime,
            admin_user_id,
        }
    }

    /// Persists the message and fans it out on the chat hub. Every
    /// conversation has the admin on one side.
    #[instrument(
        name = "chat_service::send_message",
        skip(self, new_message),
        fields(sender_id = %new_message.sender_id, receiver_id = %new_message.receiver_id),
        err(Display)
    )]
    pub async fn send_message(&self, new_message: NewChatMessage) -> ShopResult<ChatMessage> {
        new_message.validate()?;
        if new_message.sender_id != self.admin_user_id && new_message.receiver_id != self.admin_user_id {
            return Err(ShopError::Unauthorized("Buyers can only message the shop admin".to_string()));
        }

        let message = new_message.into_message(Uuid::new_v4(), Utc::now());
        self.chat.insert_message(&message).await?;
        info!("Message {} sent from {} to {}.", message.id, message.sender_id, message.receiver_id);
        self.realtime.publish_chat(message.clone());
        Ok(message)
    }

    /// Thread between two users; the general thread when `product_id` is None.
    #[instrument(name = "chat_service::fetch_thread", skip(self), fields(user_a = %user_a, user_b = %user_b))]
    pub async fn fetch_thread(&self, user_a: Uuid, user_b: Uuid, product_id: Option<Uuid>) -> ShopResult<Vec<ChatMessage>> {
        let result = self
            .chat
            .list_thread(user_a, user_b, ThreadScope::from_product(product_id))
            .await
            .map_err(ShopError::from);
        degrade_read(result, "chat thread")
    }

    /// Admin view of everything exchanged with one buyer, with a banner
    /// before the first message about each product or order.
    #[instrument(name = "chat_service::fetch_unified_thread", skip(self, actor), fields(buyer_id = %buyer_id))]
    pub async fn fetch_unified_thread(&self, actor: &Actor, buyer_id: Uuid) -> ShopResult<Vec<ThreadEntry>> {
        actor.require_admin("view unified chat threads")?;
        let result = self
            .chat
            .list_thread(actor.user_id, buyer_id, ThreadScope::All)
            .await
            .map_err(ShopError::from);
        degrade_read(result, "unified chat thread").map(with_context_banners)
    }

    /// Marks messages from `other_id` to `reader_id` as read.
    #[instrument(
        name = "chat_service::mark_thread_read",
        skip(self),
        fields(reader_id = %reader_id, other_id = %other_id),
        err(Display)
    )]
    pub async fn mark_thread_read(&self, reader_id: Uuid, other_id: Uuid, product_id: Option<Uuid>) -> ShopResult<u64> {
        // The admin reads the unified thread, so their read marker spans all scopes.
        let scope = if reader_id == self.admin_user_id {
            ThreadScope::All
        } else {
            ThreadScope::from_product(product_id)
        };
        let marked = self.chat.mark_thread_read(reader_id, other_id, scope, Utc::now()).await?;
        Ok(marked)
    }

    #[instrument(name = "chat_service::unread_count", skip(self), fields(user_id = %user_id))]
    pub async fn unread_count(&self, user_id: Uuid) -> ShopResult<i64> {
        let result = self.chat.count_unread_messages(user_id).await.map_err(ShopError::from);
        degrade_read(result, "unread message count")
    }

    /// One summary per partner, most recent conversation first.
    #[instrument(name = "chat_service::conversations", skip(self), fields(user_id = %user_id))]
    pub async fn conversations(&self, user_id: Uuid) -> ShopResult<Vec<ConversationSummary>> {
        let result = self.chat.list_messages_for(user_id).await.map_err(ShopError::from);
        degrade_read(result, "conversations").map(|messages| summarize_conversations(user_id, &messages))
    }
}
