/// Failures while configuring the authenticator or handling tokens.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid algorithm or key material. Fatal at startup.
    #[error("auth config: {0}")]
    Config(String),

    /// No private key for the requested key id, or encoding failed.
    #[error("signing token: {0}")]
    Signing(String),

    /// The token is malformed, unsigned by a known key, or expired.
    #[error("authenticating token: {0}")]
    Authentication(String),
}
