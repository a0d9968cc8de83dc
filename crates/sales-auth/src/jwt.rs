use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use jsonwebtoken::{Algorithm, Header, Validation, decode, decode_header, encode};

use crate::claims::Claims;
use crate::error::Error;
use crate::keys::{KeyLookup, Keys};

/// Signs and verifies tokens with an asymmetric algorithm.
///
/// Signing picks the private key by key id and records that id in the token
/// header. Verification reads the id back and asks the [`KeyLookup`] for the
/// matching public key.
pub struct Authenticator {
    algorithm: Algorithm,
    keys: Keys,
    lookup: Arc<dyn KeyLookup>,
    validation: Validation,
}

impl Authenticator {
    pub fn new<L>(algorithm: &str, lookup: L, keys: Keys) -> Result<Self, Error>
    where
        L: KeyLookup + 'static,
    {
        let algorithm = Algorithm::from_str(algorithm)
            .map_err(|_| Error::Config(format!("unknown algorithm {algorithm:?}")))?;

        if !matches!(
            algorithm,
            Algorithm::RS256
                | Algorithm::RS384
                | Algorithm::RS512
                | Algorithm::PS256
                | Algorithm::PS384
                | Algorithm::PS512
        ) {
            return Err(Error::Config(format!(
                "algorithm {algorithm:?} is not an RSA algorithm"
            )));
        }

        if keys.is_empty() {
            return Err(Error::Config("no private keys configured".to_string()));
        }

        let mut validation = Validation::new(algorithm);
        validation.leeway = 0;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            algorithm,
            keys,
            lookup: Arc::new(lookup),
            validation,
        })
    }

    pub fn generate_token(&self, kid: &str, claims: &Claims) -> Result<String, Error> {
        let key = self
            .keys
            .get(kid)
            .ok_or_else(|| Error::Signing(format!("no private key for kid {kid:?}")))?;

        let mut header = Header::new(self.algorithm);
        header.kid = Some(kid.to_string());

        encode(&header, claims, key).map_err(|e| Error::Signing(e.to_string()))
    }

    /// Checks signature and expiry and returns the embedded claims.
    pub fn validate_token(&self, token: &str) -> Result<Claims, Error> {
        let header = decode_header(token)
            .map_err(|e| Error::Authentication(format!("parsing token header: {e}")))?;

        let kid = header
            .kid
            .ok_or_else(|| Error::Authentication("missing kid in token header".to_string()))?;

        let key = self
            .lookup
            .public_key(&kid)
            .ok_or_else(|| Error::Authentication(format!("no public key for kid {kid:?}")))?;

        let data = decode::<Claims>(token, &key, &self.validation)
            .map_err(|e| Error::Authentication(e.to_string()))?;

        Ok(data.claims)
    }
}

impl fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kids: Vec<_> = self.keys.keys().collect();
        kids.sort();
        f.debug_struct("Authenticator")
            .field("algorithm", &self.algorithm)
            .field("kids", &kids)
            .finish_non_exhaustive()
    }
}
