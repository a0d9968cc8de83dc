//! Token claims and role checks.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Role granting full access.
pub const ROLE_ADMIN: &str = "ADMIN";
/// Role every regular account carries.
pub const ROLE_USER: &str = "USER";

/// Issuer stamped on tokens minted by this service.
pub const ISSUER: &str = "service project";

/// Identity and authorization payload of a token.
///
/// Wire format follows the registered JWT claim names plus a `roles` array.
/// Timestamps are Unix seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub sub: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub aud: String,
    pub exp: i64,
    pub iat: i64,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl Claims {
    /// Claims for `subject`, issued at `now` and valid for `lifetime`.
    pub fn new<S>(subject: S, roles: Vec<String>, now: DateTime<Utc>, lifetime: Duration) -> Self
    where
        S: Into<String>,
    {
        Self {
            iss: ISSUER.to_string(),
            sub: subject.into(),
            aud: String::new(),
            exp: (now + lifetime).timestamp(),
            iat: now.timestamp(),
            roles,
        }
    }

    /// Returns true if the claims carry at least one of `roles`.
    pub fn authorize(&self, roles: &[&str]) -> bool {
        self.roles
            .iter()
            .any(|have| roles.iter().any(|want| have == want))
    }

    pub fn is_admin(&self) -> bool {
        self.authorize(&[ROLE_ADMIN])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims_with(roles: &[&str]) -> Claims {
        Claims {
            iss: ISSUER.to_string(),
            sub: "5cf37266-3473-4006-984f-9325122678b7".to_string(),
            aud: "students".to_string(),
            exp: 9999999999,
            iat: 1234567890,
            roles: roles.iter().map(|r| r.to_string()).collect(),
        }
    }

    #[test]
    fn test_authorize_matching_role() {
        let claims = claims_with(&[ROLE_ADMIN]);
        assert!(claims.authorize(&[ROLE_ADMIN]));
        assert!(claims.is_admin());
    }

    #[test]
    fn test_authorize_any_of_required() {
        let claims = claims_with(&[ROLE_USER]);
        assert!(claims.authorize(&[ROLE_ADMIN, ROLE_USER]));
    }

    #[test]
    fn test_authorize_disjoint_roles() {
        let claims = claims_with(&[ROLE_USER]);
        assert!(!claims.authorize(&[ROLE_ADMIN]));
        assert!(!claims.is_admin());
    }

    #[test]
    fn test_authorize_without_roles() {
        let claims = claims_with(&[]);
        assert!(!claims.authorize(&[ROLE_ADMIN, ROLE_USER]));
    }

    #[test]
    fn test_authorize_nothing_required() {
        let claims = claims_with(&[ROLE_ADMIN, ROLE_USER]);
        assert!(!claims.authorize(&[]));
    }

    #[test]
    fn test_new_sets_lifetime() {
        let now = Utc::now();
        let claims = Claims::new("user1", vec![ROLE_USER.to_string()], now, Duration::hours(1));

        assert_eq!(claims.iss, ISSUER);
        assert_eq!(claims.iat, now.timestamp());
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_claims_wire_format() {
        let claims = claims_with(&[ROLE_ADMIN]);
        let json = serde_json::to_value(&claims).unwrap();

        assert_eq!(json["iss"], ISSUER);
        assert_eq!(json["aud"], "students");
        assert_eq!(json["exp"], 9999999999i64);
        assert_eq!(json["roles"][0], "ADMIN");
    }

    #[test]
    fn test_claims_deserialize_without_optional_fields() {
        let json = r#"{"iss":"service project","sub":"user1","exp":9999999999,"iat":1234567890}"#;
        let claims: Claims = serde_json::from_str(json).unwrap();

        assert!(claims.aud.is_empty());
        assert!(claims.roles.is_empty());
    }
}
