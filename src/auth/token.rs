use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use std::fmt;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use super::types::Claims;

/// Tokens are signed and verified with HMAC-SHA512 only
pub const TOKEN_ALGORITHM: Algorithm = Algorithm::HS512;

/// Signing secret and validity window, fixed at startup
#[derive(Clone)]
pub struct TokenConfig {
    secret: String,
    pub expiration_ms: i64,
}

impl TokenConfig {
    pub fn new(secret: impl Into<String>, expiration_ms: i64) -> Self {
        Self {
            secret: secret.into(),
            expiration_ms,
        }
    }
}

impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"<redacted>")
            .field("expiration_ms", &self.expiration_ms)
            .finish()
    }
}

/// Reasons a token can be refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("JWT claims string is empty")]
    Empty,

    #[error("Cannot issue a token for an empty subject")]
    EmptySubject,

    #[error("Invalid JWT token: {0}")]
    Malformed(String),

    #[error("Invalid JWT signature")]
    InvalidSignature,

    #[error("JWT token is expired")]
    Expired,

    #[error("JWT token is unsupported")]
    UnsupportedAlgorithm,

    #[error("Invalid JWT claims: {0}")]
    InvalidClaims(String),

    #[error("Failed to encode JWT token: {0}")]
    Encoding(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                TokenError::UnsupportedAlgorithm
            }
            ErrorKind::MissingRequiredClaim(claim) => {
                TokenError::InvalidClaims(format!("missing required claim `{}`", claim))
            }
            ErrorKind::ImmatureSignature
            | ErrorKind::InvalidIssuer
            | ErrorKind::InvalidAudience
            | ErrorKind::InvalidSubject => TokenError::InvalidClaims(e.to_string()),
            _ => TokenError::Malformed(e.to_string()),
        }
    }
}

/// Mints and checks bearer tokens for authenticated principals.
///
/// Holds no mutable state: every operation is a function of its input, the
/// current time and the configuration given at construction, so a single
/// instance can be shared across request handlers.
#[derive(Clone)]
pub struct TokenAuthority {
    config: TokenConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenAuthority {
    pub fn new(config: TokenConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    pub fn expiration_ms(&self) -> i64 {
        self.config.expiration_ms
    }

    /// Creates a signed token for `subject`, valid from now for the configured window
    pub fn issue(&self, subject: &str) -> Result<String, TokenError> {
        self.issue_at(subject, Utc::now())
    }

    /// Creates a signed token for `subject` as if issued at `issued_at`
    #[instrument(skip(self, subject))]
    pub fn issue_at(&self, subject: &str, issued_at: DateTime<Utc>) -> Result<String, TokenError> {
        if subject.is_empty() {
            warn!("Refusing to issue JWT token for empty subject");
            return Err(TokenError::EmptySubject);
        }

        let expires_at = issued_at + Duration::milliseconds(self.config.expiration_ms);

        debug!(
            expiration_ms = self.config.expiration_ms,
            exp_timestamp = expires_at.timestamp(),
            "Creating JWT token with expiration"
        );

        let claims = Claims {
            sub: subject.to_string(),
            iat: issued_at.timestamp() as usize,
            exp: expires_at.timestamp() as usize,
        };

        encode(&Header::new(TOKEN_ALGORITHM), &claims, &self.encoding_key).map_err(|e| {
            debug!(error = %e, "Failed to encode JWT token");
            TokenError::Encoding(e.to_string())
        })
    }

    /// Returns the subject of a structurally valid, correctly signed token.
    /// Expiration is not checked here; see [`TokenAuthority::validate`].
    #[instrument(skip(self, token))]
    pub fn parse_subject(&self, token: &str) -> Result<String, TokenError> {
        self.decode_claims(token, false).map(|claims| claims.sub)
    }

    /// True iff the token is well formed, signed with our secret and not yet expired.
    /// Never fails: every refusal is logged and reported as `false`.
    #[instrument(skip(self, token))]
    pub fn validate(&self, token: &str) -> bool {
        match self.decode_claims(token, true) {
            Ok(claims) => {
                debug!(subject = %claims.sub, exp = claims.exp, "JWT token validated");
                true
            }
            Err(e) => {
                warn!(reason = %e, "JWT token rejected");
                false
            }
        }
    }

    fn decode_claims(&self, token: &str, check_expiry: bool) -> Result<Claims, TokenError> {
        if token.trim().is_empty() {
            return Err(TokenError::Empty);
        }

        let mut validation = Validation::new(TOKEN_ALGORITHM);
        validation.leeway = 0;
        validation.validate_exp = check_expiry;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)?.claims;

        if claims.sub.is_empty() {
            return Err(TokenError::InvalidClaims("empty subject".to_string()));
        }

        // jsonwebtoken accepts exp == now; a token is only valid strictly before exp
        if check_expiry && claims.exp as i64 <= Utc::now().timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}

impl fmt::Debug for TokenAuthority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenAuthority")
            .field("config", &self.config)
            .finish()
    }
}
