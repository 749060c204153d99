// storefront_app/src/web/routes.rs

use actix_web::web;

use crate::web::handlers::{admin_handlers, catalog_handlers, chat_handlers, notification_handlers, order_handlers};

async fn health_check_handler() -> actix_web::HttpResponse {
  actix_web::HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/api/v1")
      .route("/health", web::get().to(health_check_handler))
      .service(
        web::scope("/products")
          .route("", web::get().to(catalog_handlers::list_products_handler))
          .route("/{product_id}", web::get().to(catalog_handlers::get_product_handler)),
      )
      .route(
        "/payment-methods",
        web::get().to(catalog_handlers::list_payment_methods_handler),
      )
      .service(
        web::scope("/orders")
          .route("", web::post().to(order_handlers::create_order_handler))
          .route("", web::get().to(order_handlers::list_my_orders_handler))
          .route("/stream", web::get().to(order_handlers::order_event_stream_handler))
          .route("/{order_id}", web::get().to(order_handlers::get_order_handler))
          .route(
            "/{order_id}/payment-method",
            web::post().to(order_handlers::select_payment_method_handler),
          )
          .route(
            "/{order_id}/confirm-payment",
            web::post().to(order_handlers::confirm_payment_handler),
          )
          .route("/{order_id}/cancel", web::post().to(order_handlers::cancel_order_handler)),
      )
      .service(
        web::scope("/notifications")
          .route("", web::get().to(notification_handlers::list_notifications_handler))
          .route(
            "/unread-count",
            web::get().to(notification_handlers::unread_count_handler),
          )
          .route("/stream", web::get().to(notification_handlers::toast_stream_handler))
          .route("/read-all", web::post().to(notification_handlers::mark_all_read_handler))
          .route(
            "/{notification_id}/read",
            web::post().to(notification_handlers::mark_read_handler),
          ),
      )
      .service(
        web::scope("/chat")
          .route("/messages", web::post().to(chat_handlers::send_message_handler))
          .route("/threads/{other_id}", web::get().to(chat_handlers::fetch_thread_handler))
          .route(
            "/threads/{other_id}/read",
            web::post().to(chat_handlers::mark_thread_read_handler),
          )
          .route("/unread-count", web::get().to(chat_handlers::unread_count_handler))
          .route("/conversations", web::get().to(chat_handlers::conversations_handler)),
      )
      .service(
        web::scope("/admin")
          .route("/orders", web::get().to(admin_handlers::list_orders_handler))
          .route(
            "/orders/{order_id}/confirm-payment",
            web::post().to(admin_handlers::confirm_payment_handler),
          )
          .route(
            "/orders/{order_id}/status",
            web::put().to(admin_handlers::update_status_handler),
          )
          .route("/orders/{order_id}", web::delete().to(admin_handlers::delete_order_handler))
          .route(
            "/payment-methods",
            web::get().to(admin_handlers::list_payment_methods_handler),
          )
          .route(
            "/payment-methods",
            web::post().to(admin_handlers::create_payment_method_handler),
          )
          .route(
            "/payment-methods/{method_id}",
            web::put().to(admin_handlers::update_payment_method_handler),
          )
          .route(
            "/payment-methods/{method_id}/active",
            web::put().to(admin_handlers::set_payment_method_active_handler),
          )
          .route("/chat/{buyer_id}", web::get().to(admin_handlers::unified_chat_handler)),
      ),
  );
}
