// storefront_core/src/chat.rs

//! Chat messages between buyers and the admin, thread scoping and the banner
//! synthesis of the unified admin view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

use crate::error::{ShopError, ShopResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub product_id: Option<Uuid>,
    pub order_id: Option<Uuid>,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChatMessage {
    /// The participant of this message that is not `user_id`.
    pub fn partner_of(&self, user_id: Uuid) -> Uuid {
        if self.sender_id == user_id {
            self.receiver_id
        } else {
            self.sender_id
        }
    }

    pub fn involves(&self, user_a: Uuid, user_b: Uuid) -> bool {
        (self.sender_id == user_a && self.receiver_id == user_b) || (self.sender_id == user_b && self.receiver_id == user_a)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewChatMessage {
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub product_id: Option<Uuid>,
    pub order_id: Option<Uuid>,
    pub message: String,
}

impl NewChatMessage {
    pub fn validate(&self) -> ShopResult<()> {
        if self.message.trim().is_empty() {
            return Err(ShopError::Validation("Message text is required".to_string()));
        }
        if self.sender_id == self.receiver_id {
            return Err(ShopError::Validation("Cannot send a message to yourself".to_string()));
        }
        Ok(())
    }

    pub fn into_message(self, id: Uuid, now: DateTime<Utc>) -> ChatMessage {
        ChatMessage {
            id,
            sender_id: self.sender_id,
            receiver_id: self.receiver_id,
            product_id: self.product_id,
            order_id: self.order_id,
            message: self.message,
            is_read: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Which messages of a participant pair a thread covers. Product threads and
/// the general thread are disjoint; `All` is the unified admin view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadScope {
    General,
    Product(Uuid),
    All,
}

impl ThreadScope {
    pub fn from_product(product_id: Option<Uuid>) -> Self {
        match product_id {
            Some(id) => ThreadScope::Product(id),
            None => ThreadScope::General,
        }
    }

    pub fn matches(&self, message: &ChatMessage) -> bool {
        match self {
            ThreadScope::General => message.product_id.is_none(),
            ThreadScope::Product(id) => message.product_id == Some(*id),
            ThreadScope::All => true,
        }
    }
}

/// What a conversation was about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ContextRef {
    Product(Uuid),
    Order(Uuid),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "entry", rename_all = "snake_case")]
pub enum ThreadEntry {
    /// "This conversation started about ..." marker.
    Banner { context: ContextRef, at: DateTime<Utc> },
    Message(ChatMessage),
}

/// Inserts a banner before the first message referencing each distinct
/// product and order. `messages` must already be in thread order.
pub fn with_context_banners(messages: Vec<ChatMessage>) -> Vec<ThreadEntry> {
    let mut seen: HashSet<ContextRef> = HashSet::new();
    let mut entries = Vec::with_capacity(messages.len());
    for message in messages {
        let refs = [
            message.product_id.map(ContextRef::Product),
            message.order_id.map(ContextRef::Order),
        ];
        for context in refs.into_iter().flatten() {
            if seen.insert(context) {
                entries.push(ThreadEntry::Banner {
                    context,
                    at: message.created_at,
                });
            }
        }
        entries.push(ThreadEntry::Message(message));
    }
    entries
}

/// One row of a participant's inbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub partner_id: Uuid,
    pub last_message: ChatMessage,
    pub unread_count: i64,
}

/// Groups messages involving `user_id` by partner, newest conversation first.
pub fn summarize_conversations(user_id: Uuid, messages: &[ChatMessage]) -> Vec<ConversationSummary> {
    let mut summaries: Vec<ConversationSummary> = Vec::new();
    for message in messages {
        let partner_id = message.partner_of(user_id);
        let unread = i64::from(message.receiver_id == user_id && !message.is_read);
        match summaries.iter_mut().find(|s| s.partner_id == partner_id) {
            Some(summary) => {
                summary.unread_count += unread;
                if (message.created_at, message.id) > (summary.last_message.created_at, summary.last_message.id) {
                    summary.last_message = message.clone();
                }
            }
            None => summaries.push(ConversationSummary {
                partner_id,
                last_message: message.clone(),
                unread_count: unread,
            }),
        }
    }
    summaries.sort_by(|a, b| b.last_message.created_at.cmp(&a.last_message.created_at));
    summaries
}
