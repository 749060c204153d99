// tests/chat_tests.rs
mod common;
use common::*;
use chrono::Utc;
use storefront_core::{ChatBackend, ChatMessage, ContextRef, NewChatMessage, ShopError, ThreadEntry};
use uuid::Uuid;

fn note(sender: Uuid, receiver: Uuid, product_id: Option<Uuid>, order_id: Option<Uuid>, text: &str) -> NewChatMessage {
    NewChatMessage {
        sender_id: sender,
        receiver_id: receiver,
        product_id,
        order_id,
        message: text.to_string(),
    }
}

#[tokio::test]
async fn test_product_and_general_threads_are_separate() {
    let t = TestShop::new();
    let (buyer, admin) = (t.buyer.user_id, t.admin.user_id);
    let product = t.seed_product("Shirt", 100_000, None);

    t.shop.chat.send_message(note(buyer, admin, None, None, "hello")).await.unwrap();
    t.shop
        .chat
        .send_message(note(buyer, admin, Some(product.id), None, "size?"))
        .await
        .unwrap();
    t.shop
        .chat
        .send_message(note(admin, buyer, Some(product.id), None, "M and L"))
        .await
        .unwrap();

    let general = t.shop.chat.fetch_thread(buyer, admin, None).await.unwrap();
    assert_eq!(general.len(), 1);
    let product_thread = t.shop.chat.fetch_thread(admin, buyer, Some(product.id)).await.unwrap();
    let texts: Vec<&str> = product_thread.iter().map(|m| m.message.as_str()).collect();
    assert_eq!(texts, vec!["size?", "M and L"]);
}

#[tokio::test]
async fn test_unified_thread_has_one_banner_per_context() {
    let t = TestShop::new();
    let (buyer, admin) = (t.buyer.user_id, t.admin.user_id);
    let product = t.seed_product("Shirt", 100_000, None);
    let order = t.place_order(&product, 1).await.order;

    t.shop.chat.send_message(note(buyer, admin, None, None, "hi")).await.unwrap();
    t.shop
        .chat
        .send_message(note(buyer, admin, Some(product.id), None, "about the shirt"))
        .await
        .unwrap();
    t.shop
        .chat
        .send_message(note(admin, buyer, Some(product.id), None, "sure"))
        .await
        .unwrap();
    t.shop
        .chat
        .send_message(note(buyer, admin, None, Some(order.id), "where is my order"))
        .await
        .unwrap();

    let entries = t.shop.chat.fetch_unified_thread(&t.admin, buyer).await.unwrap();
    let banners: Vec<ContextRef> = entries
        .iter()
        .filter_map(|e| match e {
            ThreadEntry::Banner { context, .. } => Some(*context),
            ThreadEntry::Message(_) => None,
        })
        .collect();
    assert_eq!(banners, vec![ContextRef::Product(product.id), ContextRef::Order(order.id)]);
    assert_eq!(entries.len(), 6);

    let result = t.shop.chat.fetch_unified_thread(&t.buyer, admin).await;
    assert!(matches!(result, Err(ShopError::Unauthorized(_))));
}

#[tokio::test]
async fn test_read_tracking_and_conversations() {
    let t = TestShop::new();
    let (buyer, admin) = (t.buyer.user_id, t.admin.user_id);
    let other_buyer = Uuid::new_v4();
    let product = t.seed_product("Shirt", 100_000, None);

    t.shop.chat.send_message(note(buyer, admin, None, None, "one")).await.unwrap();
    t.shop
        .chat
        .send_message(note(buyer, admin, Some(product.id), None, "two"))
        .await
        .unwrap();
    t.shop.chat.send_message(note(other_buyer, admin, None, None, "three")).await.unwrap();
    assert_eq!(t.shop.chat.unread_count(admin).await.unwrap(), 3);

    let conversations = t.shop.chat.conversations(admin).await.unwrap();
    assert_eq!(conversations.len(), 2);
    let with_buyer = conversations.iter().find(|c| c.partner_id == buyer).unwrap();
    assert_eq!(with_buyer.unread_count, 2);

    // The admin's read marker covers every scope of the pair.
    assert_eq!(t.shop.chat.mark_thread_read(admin, buyer, None).await.unwrap(), 2);
    assert_eq!(t.shop.chat.unread_count(admin).await.unwrap(), 1);
}

#[tokio::test]
async fn test_buyer_read_marker_is_scoped() {
    let t = TestShop::new();
    let (buyer, admin) = (t.buyer.user_id, t.admin.user_id);
    let product = t.seed_product("Shirt", 100_000, None);

    t.shop.chat.send_message(note(admin, buyer, None, None, "welcome")).await.unwrap();
    t.shop
        .chat
        .send_message(note(admin, buyer, Some(product.id), None, "restocked"))
        .await
        .unwrap();

    assert_eq!(t.shop.chat.mark_thread_read(buyer, admin, Some(product.id)).await.unwrap(), 1);
    assert_eq!(t.shop.chat.unread_count(buyer).await.unwrap(), 1);
}

#[tokio::test]
async fn test_invalid_messages_are_rejected() {
    let t = TestShop::new();
    let (buyer, admin) = (t.buyer.user_id, t.admin.user_id);
    let mut live = t.shop.realtime.subscribe_chat(admin);

    let blank = t.shop.chat.send_message(note(buyer, admin, None, None, "   ")).await;
    assert!(matches!(blank, Err(ShopError::Validation(_))));
    let to_self = t.shop.chat.send_message(note(buyer, buyer, None, None, "hi me")).await;
    assert!(matches!(to_self, Err(ShopError::Validation(_))));
    let between_buyers = t
        .shop
        .chat
        .send_message(note(buyer, Uuid::new_v4(), None, None, "psst"))
        .await;
    assert!(matches!(between_buyers, Err(ShopError::Unauthorized(_))));
    assert!(live.try_recv().is_none());

    let sent = t.shop.chat.send_message(note(buyer, admin, None, None, "ok")).await.unwrap();
    assert_eq!(live.try_recv().map(|m| m.id), Some(sent.id));
}

#[tokio::test]
async fn test_mark_read_leaves_readers_own_messages_unread() {
    let t = TestShop::new();
    let (buyer, admin) = (t.buyer.user_id, t.admin.user_id);

    t.shop.chat.send_message(note(buyer, admin, None, None, "is this in stock?")).await.unwrap();
    t.shop.chat.send_message(note(admin, buyer, None, None, "yes, two left")).await.unwrap();
    t.shop.chat.send_message(note(buyer, admin, None, None, "great, ordering now")).await.unwrap();

    assert_eq!(t.shop.chat.mark_thread_read(buyer, admin, None).await.unwrap(), 1);

    let thread = t.shop.chat.fetch_thread(buyer, admin, None).await.unwrap();
    let own: Vec<&ChatMessage> = thread.iter().filter(|m| m.sender_id == buyer).collect();
    assert_eq!(own.len(), 2);
    assert!(own.iter().all(|m| !m.is_read));
    assert_eq!(t.shop.chat.unread_count(admin).await.unwrap(), 2);
    assert_eq!(t.shop.chat.unread_count(buyer).await.unwrap(), 0);
}

#[tokio::test]
async fn test_thread_reads_are_stable_when_timestamps_tie() {
    let t = TestShop::new();
    let (buyer, admin) = (t.buyer.user_id, t.admin.user_id);
    let at = Utc::now();

    for text in ["first", "second", "third", "fourth"] {
        let message = ChatMessage {
            id: Uuid::new_v4(),
            sender_id: buyer,
            receiver_id: admin,
            product_id: None,
            order_id: None,
            message: text.to_string(),
            is_read: false,
            created_at: at,
            updated_at: at,
        };
        t.backend.insert_message(&message).await.unwrap();
    }

    let first = t.shop.chat.fetch_thread(buyer, admin, None).await.unwrap();
    let second = t.shop.chat.fetch_thread(admin, buyer, None).await.unwrap();
    assert_eq!(first, second);

    let ids: Vec<Uuid> = first.iter().map(|m| m.id).collect();
    let mut sorted = ids.clone();
    sorted.sort();
    assert_eq!(ids, sorted);
}
