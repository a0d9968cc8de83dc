//! Feature modules. Each one registers its routes on the [`App`](sales_web::App)
//! and keeps its SQL in a service.

pub mod check;
pub mod products;
pub mod users;

use sales_auth::{Claims, ROLE_ADMIN};
use sales_web::{Context, Error};
use uuid::Uuid;

/// The claims stored by the authenticate middleware. Missing claims mean the
/// route was registered without it, which is fatal.
pub fn claims(ctx: &Context) -> Result<Claims, Error> {
    ctx.get::<Claims>()
        .cloned()
        .ok_or_else(|| Error::context("claims missing from context"))
}

/// Whether `claims` may act on a record owned by `owner`: admins always,
/// everyone else only on their own records.
pub fn can_access(claims: &Claims, owner: Uuid) -> bool {
    claims.authorize(&[ROLE_ADMIN]) || claims.sub == owner.to_string()
}
