// storefront_app/src/web/handlers/mod.rs

pub mod admin_handlers;
pub mod catalog_handlers;
pub mod chat_handlers;
pub mod notification_handlers;
pub mod order_handlers;

use actix_web::{http::header, web, HttpResponse};
use futures_util::{stream, Stream, StreamExt};
use serde::Serialize;
use std::convert::Infallible;
use tracing::warn;

/// One server-sent event frame. Encoding failures yield an empty frame.
pub(crate) fn sse_frame<T: Serialize>(event: &str, value: &T) -> web::Bytes {
  match serde_json::to_string(value) {
    Ok(payload) => web::Bytes::from(format!("event: {}\ndata: {}\n\n", event, payload)),
    Err(e) => {
      warn!(error = %e, "Failed to encode {} event; skipping.", event);
      web::Bytes::new()
    }
  }
}

/// Wraps a frame stream in an event-stream response, led by a comment line
/// so clients see the connection open immediately.
pub(crate) fn sse_response<S>(frames: S) -> HttpResponse
where
  S: Stream<Item = web::Bytes> + 'static,
{
  let greeting = stream::once(async { web::Bytes::from_static(b": connected\n\n") });
  HttpResponse::Ok()
    .insert_header((header::CACHE_CONTROL, "no-cache"))
    .content_type("text/event-stream")
    .streaming(greeting.chain(frames).map(Ok::<_, Infallible>))
}
