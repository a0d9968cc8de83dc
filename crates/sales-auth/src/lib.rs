//! Authentication and authorization support for the sales API.
//!
//! Tokens are RS/PS signed JWTs whose header names the signing key id. The
//! [`Authenticator`] mints tokens from [`Claims`] and validates incoming ones.

pub mod claims;
pub mod error;
pub mod jwt;
pub mod keys;

pub use claims::{Claims, ISSUER, ROLE_ADMIN, ROLE_USER};
pub use error::Error;
pub use jwt::Authenticator;
pub use keys::{
    KeyLookup, Keys, key_pair_from_pem, private_key_from_pem, public_key_from_pem, static_keys,
};
