#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Router,
    body::{Body, Bytes},
    extract::Request,
    http::{Method, StatusCode, header},
};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use sales_api::state::AppState;
use sales_auth::{Authenticator, Claims, key_pair_from_pem};
use sales_config::DbConfig;
use tower::ServiceExt;

pub const KID: &str = "4754d86b-7a6d-4df5-9c65-224741361492";
const PRIVATE_PEM: &str = include_str!("../../testdata/private.pem");

pub fn authenticator() -> Arc<Authenticator> {
    let (private, public) = key_pair_from_pem(PRIVATE_PEM).unwrap();
    let lookup = move |kid: &str| (kid == KID).then(|| public.clone());
    Arc::new(Authenticator::new("RS256", lookup, HashMap::from([(KID.to_string(), private)])).unwrap())
}

pub fn token(auth: &Authenticator, subject: &str, roles: &[&str]) -> String {
    let claims = Claims::new(
        subject,
        roles.iter().map(|r| r.to_string()).collect(),
        Utc::now(),
        Duration::hours(1),
    );
    auth.generate_token(KID, &claims).unwrap()
}

/// State whose pool points at a closed port. Routes that never reach the
/// database work normally; the rest fail to connect.
pub fn offline_state(auth: Arc<Authenticator>) -> AppState {
    let db = sales_db::open(&DbConfig {
        user: "postgres".to_string(),
        password: "postgres".to_string(),
        host: "127.0.0.1:1".to_string(),
        name: "postgres".to_string(),
        disable_tls: true,
        max_connections: 1,
    });
    AppState::new(db, auth, "test")
}

pub fn request(method: Method, uri: &str, bearer: Option<&str>, body: Option<&str>) -> Request {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn send(router: &Router, req: Request) -> (StatusCode, Bytes) {
    let res = router.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let body = res.into_body().collect().await.unwrap().to_bytes();
    (status, body)
}

pub fn json(body: &Bytes) -> serde_json::Value {
    serde_json::from_slice(body).unwrap()
}
