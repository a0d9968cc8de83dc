//! Key material: private keys for signing and a lookup for verification keys.

use std::collections::HashMap;

use jsonwebtoken::{DecodingKey, EncodingKey};
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::{DecodePrivateKey, EncodePublicKey, LineEnding};
use rsa::{RsaPrivateKey, RsaPublicKey};

use crate::error::Error;

/// Private signing keys by key id.
pub type Keys = HashMap<String, EncodingKey>;

/// Resolves the verification key for a key id found in a token header.
///
/// Implemented for any `Fn(&str) -> Option<DecodingKey>`, so a closure over a
/// map or a single configured key is enough.
pub trait KeyLookup: Send + Sync {
    fn public_key(&self, kid: &str) -> Option<DecodingKey>;
}

impl<F> KeyLookup for F
where
    F: Fn(&str) -> Option<DecodingKey> + Send + Sync,
{
    fn public_key(&self, kid: &str) -> Option<DecodingKey> {
        self(kid)
    }
}

/// A lookup over a fixed set of public keys.
pub fn static_keys(keys: HashMap<String, DecodingKey>) -> impl KeyLookup {
    move |kid: &str| keys.get(kid).cloned()
}

/// Parses an RSA private key in PKCS#1 or PKCS#8 PEM form.
pub fn private_key_from_pem(pem: &str) -> Result<EncodingKey, Error> {
    EncodingKey::from_rsa_pem(pem.as_bytes())
        .map_err(|e| Error::Config(format!("parsing private key: {e}")))
}

/// Parses an RSA public key in PEM form.
pub fn public_key_from_pem(pem: &str) -> Result<DecodingKey, Error> {
    DecodingKey::from_rsa_pem(pem.as_bytes())
        .map_err(|e| Error::Config(format!("parsing public key: {e}")))
}

/// Parses an RSA private key and derives its public half.
pub fn key_pair_from_pem(pem: &str) -> Result<(EncodingKey, DecodingKey), Error> {
    let private = RsaPrivateKey::from_pkcs1_pem(pem)
        .or_else(|_| RsaPrivateKey::from_pkcs8_pem(pem))
        .map_err(|e| Error::Config(format!("parsing private key: {e}")))?;

    let public_pem = RsaPublicKey::from(&private)
        .to_public_key_pem(LineEnding::LF)
        .map_err(|e| Error::Config(format!("encoding public key: {e}")))?;

    Ok((private_key_from_pem(pem)?, public_key_from_pem(&public_pem)?))
}
