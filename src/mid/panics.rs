use std::any::Any;
use std::panic::AssertUnwindSafe;

use anyhow::anyhow;
use futures_util::FutureExt;
use sales_web::{Context, Error, Handler, Middleware, handler, middleware};

/// Converts a panic in any inner layer into an unexpected error, which the
/// app treats as fatal.
pub fn panics() -> Middleware {
    middleware(|next: Handler| {
        handler(move |ctx: Context, req| {
            let next = next.clone();
            async move {
                match AssertUnwindSafe(next(ctx, req)).catch_unwind().await {
                    Ok(result) => result,
                    Err(payload) => Err(Error::Unexpected(anyhow!(
                        "panic: {}",
                        panic_message(payload.as_ref())
                    ))),
                }
            }
        })
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        *msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.as_str()
    } else {
        "unknown panic"
    }
}
