use std::sync::Arc;

use anyhow::anyhow;
use axum::http::{HeaderMap, header};
use sales_auth::{Authenticator, Claims};
use sales_web::{Context, Error, Handler, Middleware, RequestError, handler, middleware};
use tracing::debug;

/// Validates the bearer token and stores its claims in the request context.
/// Any problem with the header or token ends the request with 401.
pub fn authenticate(auth: Arc<Authenticator>) -> Middleware {
    middleware(move |next: Handler| {
        let auth = auth.clone();
        handler(move |mut ctx: Context, req| {
            let auth = auth.clone();
            let next = next.clone();
            async move {
                let claims = claims_from_headers(&auth, req.headers())?;
                debug!(trace_id = %ctx.trace_id(), sub = %claims.sub, "authenticated");
                ctx.insert(claims);
                next(ctx, req).await
            }
        })
    })
}

/// Passes the request on only if the authenticated claims hold one of `roles`.
///
/// Must run after [`authenticate`]. Finding no claims in the context is a
/// wiring defect and fails the request as fatal.
pub fn authorize(roles: &[&'static str]) -> Middleware {
    let roles: Arc<[&'static str]> = roles.into();

    middleware(move |next: Handler| {
        let roles = roles.clone();
        handler(move |ctx: Context, req| {
            let roles = roles.clone();
            let next = next.clone();
            async move {
                let Some(claims) = ctx.get::<Claims>() else {
                    return Err(Error::context("claims missing from context"));
                };

                if !claims.authorize(&roles) {
                    debug!(
                        trace_id = %ctx.trace_id(),
                        have = ?claims.roles,
                        want = ?roles,
                        "role check failed"
                    );
                    return Err(RequestError::forbidden(anyhow!(
                        "you are not authorized for that action"
                    ))
                    .into());
                }

                next(ctx, req).await
            }
        })
    })
}

fn claims_from_headers(auth: &Authenticator, headers: &HeaderMap) -> Result<Claims, RequestError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let token = bearer_token(value).ok_or_else(|| {
        RequestError::unauthorized(anyhow!(
            "expected authorization header format: bearer <token>"
        ))
    })?;

    auth.validate_token(token).map_err(RequestError::unauthorized)
}

/// Extracts the token from `Bearer <token>`. The scheme is case-insensitive
/// and the value must have exactly two space-separated parts.
fn bearer_token(value: &str) -> Option<&str> {
    let parts: Vec<&str> = value.split(' ').collect();
    match parts.as_slice() {
        [scheme, token] if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() => {
            Some(token)
        }
        _ => None,
    }
}
