use axum::response::IntoResponse;
use sales_web::{Context, Error, Handler, Middleware, handler, middleware};
use tracing::{error, warn};

/// Turns request errors into client responses. Every other error is logged
/// and passed outward so the app can shut down.
pub fn errors() -> Middleware {
    middleware(|next: Handler| {
        handler(move |ctx: Context, req| {
            let next = next.clone();
            async move {
                let trace_id = ctx.trace_id().to_string();

                match next(ctx, req).await {
                    Ok(res) => Ok(res),
                    Err(Error::Request(err)) => {
                        warn!(
                            trace_id = %trace_id,
                            status = err.status.as_u16(),
                            error = %err,
                            "request error"
                        );
                        Ok(err.into_response())
                    }
                    Err(err) => {
                        error!(trace_id = %trace_id, error = %err, "unrecoverable error");
                        Err(err)
                    }
                }
            }
        })
    })
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;
    use axum::{body::Body, extract::Request, http::StatusCode, response::Response};
    use http_body_util::BodyExt;
    use sales_web::{RequestError, wrap_middleware};

    use super::*;

    async fn run(h: Handler) -> Result<Response, Error> {
        h(Context::new(), Request::new(Body::empty())).await
    }

    #[tokio::test]
    async fn test_request_error_becomes_response() {
        let h = wrap_middleware(
            &[Some(errors())],
            handler(|_ctx, _req| async {
                Err(Error::from(RequestError::not_found(anyhow!("not found"))))
            }),
        );

        let res = run(h).await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let body = res.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "not found");
    }

    #[tokio::test]
    async fn test_fatal_error_passes_through() {
        let h = wrap_middleware(
            &[Some(errors())],
            handler(|_ctx, _req| async { Err(Error::context("claims missing from context")) }),
        );

        let err = run(h).await.unwrap_err();
        assert!(matches!(err, Error::Context(_)));
    }
}
