use std::time::Instant;

use sales_web::{Context, Handler, Middleware, handler, middleware};
use tracing::{error, info, warn};

/// Logs every request on the way in and its status and latency on the way out.
pub fn logger() -> Middleware {
    middleware(|next: Handler| {
        handler(move |ctx: Context, req| {
            let next = next.clone();
            async move {
                let start = Instant::now();
                let trace_id = ctx.trace_id().to_string();
                let method = req.method().clone();
                let path = req.uri().path().to_string();
                let remote = req
                    .headers()
                    .get("x-forwarded-for")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("-")
                    .to_string();

                info!(
                    trace_id = %trace_id,
                    method = %method,
                    path = %path,
                    remote = %remote,
                    "request started"
                );

                let result = next(ctx, req).await;
                let latency_ms = start.elapsed().as_millis() as u64;

                match &result {
                    Ok(res) => {
                        let status = res.status().as_u16();
                        match status {
                            400..=499 => warn!(
                                trace_id = %trace_id,
                                method = %method,
                                path = %path,
                                status,
                                latency_ms,
                                "request completed"
                            ),
                            500..=599 => error!(
                                trace_id = %trace_id,
                                method = %method,
                                path = %path,
                                status,
                                latency_ms,
                                "request completed"
                            ),
                            _ => info!(
                                trace_id = %trace_id,
                                method = %method,
                                path = %path,
                                status,
                                latency_ms,
                                "request completed"
                            ),
                        }
                    }
                    Err(err) => error!(
                        trace_id = %trace_id,
                        method = %method,
                        path = %path,
                        latency_ms,
                        error = %err,
                        "request failed"
                    ),
                }

                result
            }
        })
    })
}
