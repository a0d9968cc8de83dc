//! # Sales Admin
//!
//! Operator tasks that run outside the API process: key generation, token
//! minting, schema migration and seeding.

pub mod keygen;
pub mod token;
