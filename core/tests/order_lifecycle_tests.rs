// tests/order_lifecycle_tests.rs
mod common;
use common::*;
use storefront_core::{
    CartLine, OrderFilter, OrderState, OrderStatus, PaymentStatus, ShopError,
};
use uuid::Uuid;

#[tokio::test]
async fn test_checkout_to_confirmed_payment() {
    let t = TestShop::new();
    let mut events = t.shop.realtime.orders.subscribe();
    let shirt = t.seed_product("Shirt", 50_000, Some("shirt.png"));
    let socks = t.seed_product("Socks", 30_000, None);
    let method = t.seed_payment_method("BCA Transfer", true).await;

    let lines = [
        CartLine {
            product_id: shirt.id,
            quantity: 2,
        },
        CartLine {
            product_id: socks.id,
            quantity: 1,
        },
    ];
    let created = t
        .shop
        .orders
        .create_order(t.buyer.user_id, &lines, shipping())
        .await
        .unwrap();
    let order_id = created.order.id;
    assert_eq!(created.order.total_amount, 130_000);
    assert!((100..=999).contains(&created.order.payment_unique_code));
    assert_eq!(created.order.state(), OrderState::NEW);
    assert_eq!(created.items.len(), 2);

    let selected = t
        .shop
        .orders
        .select_payment_method(order_id, t.buyer.user_id, method.id)
        .await
        .unwrap();
    assert_eq!(
        selected.state(),
        OrderState::new(OrderStatus::Pending, PaymentStatus::AwaitingConfirmation)
    );
    assert_eq!(selected.payment_method_id, Some(method.id));

    let confirmed = t.shop.orders.confirm_payment_by_admin(&t.admin, order_id).await.unwrap();
    assert_eq!(confirmed.state(), OrderState::new(OrderStatus::Processing, PaymentStatus::Paid));

    t.dispatch_pending(&mut events).await;
    let inbox = t.shop.inbox.list(t.buyer.user_id, None).await.unwrap();
    let titles: Vec<&str> = inbox.iter().map(|n| n.title.as_str()).collect();
    assert_eq!(titles, vec!["Payment confirmed", "Order created"]);
    assert!(inbox.iter().all(|n| n.order_id == Some(order_id)));

    let admin_inbox = t.shop.inbox.list(t.admin.user_id, None).await.unwrap();
    let admin_titles: Vec<&str> = admin_inbox.iter().map(|n| n.title.as_str()).collect();
    assert_eq!(admin_titles, vec!["Payment awaiting confirmation", "New order"]);
    assert!(admin_inbox[0].message.contains(&created.order.payment_unique_code.to_string()));

    let detail = t.shop.orders.get_order(&t.buyer, order_id).await.unwrap();
    assert_eq!(detail.payable_amount, 130_000 + i64::from(created.order.payment_unique_code));
    assert_eq!(detail.payment_method.map(|m| m.id), Some(method.id));
    assert_eq!(detail.buyer.map(|p| p.full_name), Some("Sari Buyer".to_string()));
}

#[tokio::test]
async fn test_second_payment_selection_is_rejected() {
    let t = TestShop::new();
    let product = t.seed_product("Mug", 25_000, None);
    let method = t.seed_payment_method("BCA Transfer", true).await;
    let order = t.place_order(&product, 2).await.order;

    t.shop
        .orders
        .select_payment_method(order.id, t.buyer.user_id, method.id)
        .await
        .unwrap();
    let second = t
        .shop
        .orders
        .select_payment_method(order.id, t.buyer.user_id, method.id)
        .await;
    match second {
        Err(ShopError::InvalidState { current, .. }) => {
            assert_eq!(current.payment_status, PaymentStatus::AwaitingConfirmation);
        }
        other => panic!("Expected InvalidState, got {:?}", other),
    }
}

#[tokio::test]
async fn test_inactive_or_unknown_method_cannot_be_selected() {
    let t = TestShop::new();
    let product = t.seed_product("Mug", 25_000, None);
    let inactive = t.seed_payment_method("Old Wallet", false).await;
    let order = t.place_order(&product, 1).await.order;

    let result = t
        .shop
        .orders
        .select_payment_method(order.id, t.buyer.user_id, inactive.id)
        .await;
    assert!(matches!(result, Err(ShopError::Validation(_))));

    let result = t
        .shop
        .orders
        .select_payment_method(order.id, t.buyer.user_id, Uuid::new_v4())
        .await;
    assert!(matches!(result, Err(ShopError::NotFound { .. })));

    let unchanged = t.shop.orders.get_order(&t.buyer, order.id).await.unwrap();
    assert_eq!(unchanged.order.state(), OrderState::NEW);
}

#[tokio::test]
async fn test_reactivated_method_becomes_selectable() {
    let t = TestShop::new();
    let product = t.seed_product("Mug", 25_000, None);
    let method = t.seed_payment_method("Old Wallet", false).await;
    let order = t.place_order(&product, 1).await.order;

    let denied = t
        .shop
        .catalog
        .set_payment_method_active(&t.buyer, method.id, true)
        .await;
    assert!(matches!(denied, Err(ShopError::Unauthorized(_))));

    let activated = t
        .shop
        .catalog
        .set_payment_method_active(&t.admin, method.id, true)
        .await
        .unwrap();
    assert!(activated.is_active);
    assert_eq!(activated.name, "Old Wallet");

    let active = t.shop.catalog.list_active_payment_methods().await.unwrap();
    assert!(active.iter().any(|m| m.id == method.id));

    let selected = t
        .shop
        .orders
        .select_payment_method(order.id, t.buyer.user_id, method.id)
        .await
        .unwrap();
    assert_eq!(selected.payment_status, PaymentStatus::AwaitingConfirmation);
}

#[tokio::test]
async fn test_confirming_unpaid_order_fails() {
    let t = TestShop::new();
    let product = t.seed_product("Lamp", 80_000, None);
    let order = t.place_order(&product, 1).await.order;

    let result = t.shop.orders.confirm_payment_by_admin(&t.admin, order.id).await;
    assert!(matches!(result, Err(ShopError::InvalidState { .. })));
    let result = t.shop.orders.confirm_payment_by_buyer(order.id, t.buyer.user_id).await;
    assert!(matches!(result, Err(ShopError::InvalidState { .. })));
}

#[tokio::test]
async fn test_buyer_confirmation_requires_ownership() {
    let t = TestShop::new();
    let product = t.seed_product("Lamp", 80_000, None);
    let method = t.seed_payment_method("BCA Transfer", true).await;
    let order = t.place_order(&product, 1).await.order;
    t.shop
        .orders
        .select_payment_method(order.id, t.buyer.user_id, method.id)
        .await
        .unwrap();

    let stranger = Uuid::new_v4();
    let result = t.shop.orders.confirm_payment_by_buyer(order.id, stranger).await;
    assert!(matches!(result, Err(ShopError::Unauthorized(_))));

    let paid = t
        .shop
        .orders
        .confirm_payment_by_buyer(order.id, t.buyer.user_id)
        .await
        .unwrap();
    assert_eq!(paid.state(), OrderState::new(OrderStatus::Processing, PaymentStatus::Paid));
}

#[tokio::test]
async fn test_admin_cancel_of_paid_order_refunds() {
    let t = TestShop::new();
    let mut events = t.shop.realtime.orders.subscribe();
    let product = t.seed_product("Chair", 450_000, None);
    let method = t.seed_payment_method("BCA Transfer", true).await;
    let order = t.place_order(&product, 1).await.order;
    t.shop
        .orders
        .select_payment_method(order.id, t.buyer.user_id, method.id)
        .await
        .unwrap();
    t.shop.orders.confirm_payment_by_admin(&t.admin, order.id).await.unwrap();

    let cancelled = t
        .shop
        .orders
        .update_order_status(&t.admin, order.id, OrderStatus::Cancelled, None)
        .await
        .unwrap();
    assert_eq!(cancelled.state(), OrderState::new(OrderStatus::Cancelled, PaymentStatus::Refunded));

    t.dispatch_pending(&mut events).await;
    let latest = t.shop.inbox.list(t.buyer.user_id, Some(1)).await.unwrap();
    assert_eq!(latest.len(), 1);
    assert!(latest[0].title.to_lowercase().contains("cancel"));

    // Terminal: nothing moves it any more.
    let result = t
        .shop
        .orders
        .update_order_status(&t.admin, order.id, OrderStatus::Completed, None)
        .await;
    assert!(matches!(result, Err(ShopError::InvalidState { .. })));
}

#[tokio::test]
async fn test_inconsistent_status_pair_is_rejected() {
    let t = TestShop::new();
    let product = t.seed_product("Chair", 450_000, None);
    let order = t.place_order(&product, 1).await.order;

    let result = t
        .shop
        .orders
        .update_order_status(&t.admin, order.id, OrderStatus::Processing, Some(PaymentStatus::Unpaid))
        .await;
    assert!(matches!(result, Err(ShopError::InvalidState { .. }) | Err(ShopError::Validation(_))));
    let unchanged = t.shop.orders.get_order(&t.admin, order.id).await.unwrap();
    assert_eq!(unchanged.order.state(), OrderState::NEW);
}

#[tokio::test]
async fn test_buyer_cannot_use_admin_operations() {
    let t = TestShop::new();
    let product = t.seed_product("Chair", 450_000, None);
    let order = t.place_order(&product, 1).await.order;

    let result = t
        .shop
        .orders
        .update_order_status(&t.buyer, order.id, OrderStatus::Cancelled, None)
        .await;
    assert!(matches!(result, Err(ShopError::Unauthorized(_))));
    let result = t.shop.orders.confirm_payment_by_admin(&t.buyer, order.id).await;
    assert!(matches!(result, Err(ShopError::Unauthorized(_))));
    let result = t.shop.orders.delete_order(&t.buyer, order.id).await;
    assert!(matches!(result, Err(ShopError::Unauthorized(_))));
    let result = t.shop.orders.list_all_orders(&t.buyer, &OrderFilter::default()).await;
    assert!(matches!(result, Err(ShopError::Unauthorized(_))));
}

#[tokio::test]
async fn test_buyer_cancel_only_while_pending() {
    let t = TestShop::new();
    let product = t.seed_product("Fan", 150_000, None);
    let method = t.seed_payment_method("BCA Transfer", true).await;

    let first = t.place_order(&product, 1).await.order;
    let cancelled = t
        .shop
        .orders
        .cancel_order_by_buyer(first.id, t.buyer.user_id)
        .await
        .unwrap();
    assert_eq!(cancelled.state(), OrderState::new(OrderStatus::Cancelled, PaymentStatus::Refunded));

    let second = t.place_order(&product, 1).await.order;
    t.shop
        .orders
        .select_payment_method(second.id, t.buyer.user_id, method.id)
        .await
        .unwrap();
    t.shop.orders.confirm_payment_by_admin(&t.admin, second.id).await.unwrap();
    let result = t.shop.orders.cancel_order_by_buyer(second.id, t.buyer.user_id).await;
    assert!(matches!(result, Err(ShopError::InvalidState { .. })));
}

#[tokio::test]
async fn test_failed_item_write_leaves_no_order() {
    let t = TestShop::new();
    let mut events = t.shop.realtime.orders.subscribe();
    let product = t.seed_product("Desk", 900_000, None);
    t.backend.set_fail_order_writes(true);

    let lines = [CartLine {
        product_id: product.id,
        quantity: 1,
    }];
    let result = t.shop.orders.create_order(t.buyer.user_id, &lines, shipping()).await;
    assert!(matches!(result, Err(ShopError::OrderCreationFailed { .. })));
    assert!(events.try_recv().is_none());

    t.backend.set_fail_order_writes(false);
    let orders = t.shop.orders.list_orders_for_user(t.buyer.user_id).await.unwrap();
    assert!(orders.is_empty());
}

#[tokio::test]
async fn test_invalid_cart_is_rejected_before_writing() {
    let t = TestShop::new();
    let product = t.seed_product("Desk", 900_000, None);

    let empty = t.shop.orders.create_order(t.buyer.user_id, &[], shipping()).await;
    assert!(matches!(empty, Err(ShopError::Validation(_))));

    let zero = [CartLine {
        product_id: product.id,
        quantity: 0,
    }];
    let result = t.shop.orders.create_order(t.buyer.user_id, &zero, shipping()).await;
    assert!(matches!(result, Err(ShopError::Validation(_))));

    let unknown = [CartLine {
        product_id: Uuid::new_v4(),
        quantity: 1,
    }];
    let result = t.shop.orders.create_order(t.buyer.user_id, &unknown, shipping()).await;
    assert!(result.is_err());

    let mut blank = shipping();
    blank.address = "  ".to_string();
    let line = [CartLine {
        product_id: product.id,
        quantity: 1,
    }];
    let result = t.shop.orders.create_order(t.buyer.user_id, &line, blank).await;
    assert!(matches!(result, Err(ShopError::Validation(_))));
}

#[tokio::test]
async fn test_delete_cascades_to_items() {
    let t = TestShop::new();
    let product = t.seed_product("Rug", 200_000, None);
    let order = t.place_order(&product, 3).await.order;
    assert_eq!(t.backend.order_item_count(order.id), 1);

    t.shop.orders.delete_order(&t.admin, order.id).await.unwrap();
    assert_eq!(t.backend.order_item_count(order.id), 0);
    let result = t.shop.orders.get_order(&t.admin, order.id).await;
    assert!(matches!(result, Err(ShopError::NotFound { .. })));

    let again = t.shop.orders.delete_order(&t.admin, order.id).await;
    assert!(matches!(again, Err(ShopError::NotFound { .. })));
}

#[tokio::test]
async fn test_order_projection_and_visibility() {
    let t = TestShop::new();
    let with_image = t.seed_product("Poster", 40_000, Some("poster.png"));
    let order = t.place_order(&with_image, 2).await.order;

    let other_buyer = storefront_core::Actor::buyer(Uuid::new_v4());
    let result = t.shop.orders.get_order(&other_buyer, order.id).await;
    assert!(matches!(result, Err(ShopError::Unauthorized(_))));

    let mine = t.shop.orders.list_orders_for_user(t.buyer.user_id).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].items[0].subtotal, Some(80_000));
    assert_eq!(mine[0].items[0].image_url.as_deref(), Some("poster.png"));
    assert!(t
        .shop
        .orders
        .list_orders_for_user(other_buyer.user_id)
        .await
        .unwrap()
        .is_empty());

    let filter = OrderFilter {
        order_status: Some(OrderStatus::Pending),
        ..OrderFilter::default()
    };
    assert_eq!(t.shop.orders.list_all_orders(&t.admin, &filter).await.unwrap().len(), 1);
    let filter = OrderFilter {
        payment_status: Some(PaymentStatus::Paid),
        ..OrderFilter::default()
    };
    assert!(t.shop.orders.list_all_orders(&t.admin, &filter).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_reads_degrade_when_backend_is_down() {
    let t = TestShop::new();
    let product = t.seed_product("Rug", 200_000, None);
    t.place_order(&product, 1).await;

    t.backend.set_fail_reads(true);
    let orders = t.shop.orders.list_orders_for_user(t.buyer.user_id).await.unwrap();
    assert!(orders.is_empty());
    assert_eq!(t.shop.inbox.unread_count(t.buyer.user_id).await.unwrap(), 0);
    assert!(t.shop.catalog.list_products().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_concurrent_payment_selection_lets_one_through() {
    let t = TestShop::new();
    let product = t.seed_product("Kettle", 120_000, None);
    let method = t.seed_payment_method("BCA Transfer", true).await;
    let order = t.place_order(&product, 1).await.order;

    let (a, b) = tokio::join!(
        t.shop
            .orders
            .select_payment_method(order.id, t.buyer.user_id, method.id),
        t.shop
            .orders
            .select_payment_method(order.id, t.buyer.user_id, method.id),
    );
    let successes = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
    assert_eq!(successes, 1);
}

#[tokio::test]
async fn test_order_stream_is_scoped_to_the_viewer() {
    let t = TestShop::new();
    let product = t.seed_product("Shirt", 100_000, None);
    let mut own = t.shop.realtime.subscribe_orders(t.buyer);
    let mut everything = t.shop.realtime.subscribe_orders(t.admin);

    let other_buyer = Uuid::new_v4();
    let lines = [CartLine {
        product_id: product.id,
        quantity: 1,
    }];
    let foreign = t
        .shop
        .orders
        .create_order(other_buyer, &lines, shipping())
        .await
        .unwrap()
        .order;
    let mine = t.place_order(&product, 1).await.order;

    assert_eq!(own.try_recv().map(|e| e.order_id), Some(mine.id));
    assert!(own.try_recv().is_none());

    assert_eq!(everything.try_recv().map(|e| e.order_id), Some(foreign.id));
    assert_eq!(everything.try_recv().map(|e| e.order_id), Some(mine.id));
}

#[tokio::test]
async fn test_items_keep_cart_line_order() {
    let t = TestShop::new();
    let zebra = t.seed_product("Zebra Print Tote", 60_000, None);
    let apron = t.seed_product("Apron", 40_000, None);
    let lines = [
        CartLine {
            product_id: zebra.id,
            quantity: 1,
        },
        CartLine {
            product_id: apron.id,
            quantity: 2,
        },
    ];
    let order = t
        .shop
        .orders
        .create_order(t.buyer.user_id, &lines, shipping())
        .await
        .unwrap()
        .order;

    let detail = t.shop.orders.get_order(&t.buyer, order.id).await.unwrap();
    let names: Vec<&str> = detail.items.iter().map(|v| v.item.product_name.as_str()).collect();
    assert_eq!(names, ["Zebra Print Tote", "Apron"]);
}
