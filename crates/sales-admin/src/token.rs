//! Offline token minting from a private key file.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use sales_auth::{Authenticator, Claims, key_pair_from_pem};

/// Signs a token for `subject` with the key in `private_key_file`.
pub fn generate_token(
    private_key_file: &Path,
    algorithm: &str,
    kid: &str,
    subject: &str,
    roles: Vec<String>,
    lifetime: Duration,
) -> Result<String> {
    let pem = fs::read_to_string(private_key_file)
        .with_context(|| format!("reading {}", private_key_file.display()))?;
    let (private, public) = key_pair_from_pem(&pem)?;

    let lookup_kid = kid.to_string();
    let lookup = move |k: &str| (k == lookup_kid).then(|| public.clone());
    let auth = Authenticator::new(algorithm, lookup, HashMap::from([(kid.to_string(), private)]))?;

    let claims = Claims::new(subject, roles, Utc::now(), lifetime);
    let token = auth.generate_token(kid, &claims)?;

    // Round-trip so a broken key pair fails here rather than at the API.
    auth.validate_token(&token)
        .context("validating generated token")?;

    Ok(token)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn fixture_key() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../../testdata/private.pem")
    }

    #[test]
    fn test_generate_token_from_key_file() {
        let token = generate_token(
            &fixture_key(),
            "RS256",
            "test-kid",
            "1234567890",
            vec!["ADMIN".to_string()],
            Duration::hours(1),
        )
        .unwrap();

        assert_eq!(token.split('.').count(), 3);
    }

    #[test]
    fn test_generate_token_rejects_symmetric_algorithm() {
        let result = generate_token(
            &fixture_key(),
            "HS256",
            "test-kid",
            "1234567890",
            vec![],
            Duration::hours(1),
        );

        assert!(result.is_err());
    }

    #[test]
    fn test_generate_token_missing_key_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = generate_token(
            &dir.path().join("missing.pem"),
            "RS256",
            "test-kid",
            "1234567890",
            vec![],
            Duration::hours(1),
        );

        assert!(result.is_err());
    }
}
