/// Token codec: signed, expiring access/refresh/reset tokens
///
/// Each token kind is signed with its own HS256 secret, so a leaked access
/// secret cannot forge refresh tokens and a password-reset token can never
/// stand in for a session token. Tokens carry only the principal id and the
/// validity window; role and active status are re-resolved from the
/// credential store at every verification.
use crate::config::TokenSettings;
use crate::error::{AuthError, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Token type: "access", "refresh" or "reset"
    pub token_type: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
    Reset,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
            TokenKind::Reset => "reset",
        }
    }

    fn others(&self) -> [TokenKind; 2] {
        match self {
            TokenKind::Access => [TokenKind::Refresh, TokenKind::Reset],
            TokenKind::Refresh => [TokenKind::Access, TokenKind::Reset],
            TokenKind::Reset => [TokenKind::Access, TokenKind::Refresh],
        }
    }
}

/// Classified verification failures
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("malformed token or invalid signature")]
    Malformed,
    #[error("token kind mismatch")]
    WrongKind,
}

/// Token pair issued on login and on every successful refresh
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

#[derive(Clone)]
struct KeyPair {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl KeyPair {
    fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

/// Instance-held signing material, one key pair per token kind.
#[derive(Clone)]
pub struct TokenCodec {
    access: KeyPair,
    refresh: KeyPair,
    reset: KeyPair,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
    reset_ttl_secs: i64,
}

impl TokenCodec {
    pub fn new(settings: &TokenSettings) -> Self {
        Self {
            access: KeyPair::from_secret(&settings.access_secret),
            refresh: KeyPair::from_secret(&settings.refresh_secret),
            reset: KeyPair::from_secret(&settings.reset_secret),
            access_ttl_secs: settings.access_ttl_secs,
            refresh_ttl_secs: settings.refresh_ttl_secs,
            reset_ttl_secs: settings.reset_ttl_secs,
        }
    }

    fn keys(&self, kind: TokenKind) -> &KeyPair {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
            TokenKind::Reset => &self.reset,
        }
    }

    pub fn ttl_secs(&self, kind: TokenKind) -> i64 {
        match kind {
            TokenKind::Access => self.access_ttl_secs,
            TokenKind::Refresh => self.refresh_ttl_secs,
            TokenKind::Reset => self.reset_ttl_secs,
        }
    }

    /// Issue a signed token of the given kind for a principal id
    pub fn issue(&self, user_id: Uuid, kind: TokenKind) -> Result<String> {
        let now = Utc::now();
        let expiry = now + Duration::seconds(self.ttl_secs(kind));

        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: expiry.timestamp(),
            token_type: kind.as_str().to_string(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.keys(kind).encoding,
        )
        .map_err(|e| AuthError::Internal(format!("Failed to sign {} token: {}", kind.as_str(), e)))
    }

    /// Issue both an access and a refresh token for a principal id
    pub fn issue_pair(&self, user_id: Uuid) -> Result<TokenPair> {
        let access_token = self.issue(user_id, TokenKind::Access)?;
        let refresh_token = self.issue(user_id, TokenKind::Refresh)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_ttl_secs,
        })
    }

    /// Verify a token as the expected kind and return the embedded principal id
    ///
    /// Failures are classified: `Expired` (signature valid, window past),
    /// `WrongKind` (a token of another kind presented here), and `Malformed`
    /// for everything else. No clock leeway; server time only.
    pub fn verify(&self, token: &str, kind: TokenKind) -> std::result::Result<Uuid, TokenError> {
        match decode::<Claims>(token, &self.keys(kind).decoding, &validation()) {
            Ok(data) => {
                if data.claims.token_type != kind.as_str() {
                    return Err(TokenError::WrongKind);
                }
                Uuid::parse_str(&data.claims.sub).map_err(|_| TokenError::Malformed)
            }
            Err(err) => match err.kind() {
                ErrorKind::ExpiredSignature => Err(TokenError::Expired),
                ErrorKind::InvalidSignature => {
                    // Distinguish a cross-kind presentation from garbage: a
                    // token that verifies under another kind's secret is
                    // WrongKind, not Malformed.
                    for other in kind.others() {
                        match decode::<Claims>(token, &self.keys(other).decoding, &validation()) {
                            Ok(_) => return Err(TokenError::WrongKind),
                            Err(e) if matches!(e.kind(), ErrorKind::ExpiredSignature) => {
                                return Err(TokenError::WrongKind)
                            }
                            Err(_) => continue,
                        }
                    }
                    Err(TokenError::Malformed)
                }
                _ => Err(TokenError::Malformed),
            },
        }
    }
}

fn validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.leeway = 0;
    validation
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_codec() -> TokenCodec {
        TokenCodec::new(&TokenSettings {
            access_secret: "access-secret-for-tests".into(),
            refresh_secret: "refresh-secret-for-tests".into(),
            reset_secret: "reset-secret-for-tests".into(),
            access_ttl_secs: 900,
            refresh_ttl_secs: 604_800,
            reset_ttl_secs: 600,
        })
    }

    fn expired_codec() -> TokenCodec {
        TokenCodec::new(&TokenSettings {
            access_secret: "access-secret-for-tests".into(),
            refresh_secret: "refresh-secret-for-tests".into(),
            reset_secret: "reset-secret-for-tests".into(),
            access_ttl_secs: -120,
            refresh_ttl_secs: -120,
            reset_ttl_secs: -120,
        })
    }

    #[test]
    fn test_issue_and_verify_round_trip() {
        let codec = test_codec();
        let user_id = Uuid::new_v4();

        let token = codec.issue(user_id, TokenKind::Access).unwrap();
        assert_eq!(token.matches('.').count(), 2); // JWT has 3 parts
        assert_eq!(codec.verify(&token, TokenKind::Access).unwrap(), user_id);
    }

    #[test]
    fn test_refresh_token_is_rejected_as_access() {
        let codec = test_codec();
        let token = codec.issue(Uuid::new_v4(), TokenKind::Refresh).unwrap();

        assert_eq!(
            codec.verify(&token, TokenKind::Access).unwrap_err(),
            TokenError::WrongKind
        );
    }

    #[test]
    fn test_reset_token_is_rejected_as_session_token() {
        let codec = test_codec();
        let token = codec.issue(Uuid::new_v4(), TokenKind::Reset).unwrap();

        assert_eq!(
            codec.verify(&token, TokenKind::Access).unwrap_err(),
            TokenError::WrongKind
        );
        assert_eq!(
            codec.verify(&token, TokenKind::Refresh).unwrap_err(),
            TokenError::WrongKind
        );
    }

    #[test]
    fn test_expired_token_classified_as_expired() {
        let codec = expired_codec();
        let token = codec.issue(Uuid::new_v4(), TokenKind::Refresh).unwrap();

        assert_eq!(
            codec.verify(&token, TokenKind::Refresh).unwrap_err(),
            TokenError::Expired
        );
    }

    #[test]
    fn test_tampered_token_is_malformed() {
        let codec = test_codec();
        let token = codec.issue(Uuid::new_v4(), TokenKind::Access).unwrap();
        let tampered = format!("{}x", token);

        assert_eq!(
            codec.verify(&tampered, TokenKind::Access).unwrap_err(),
            TokenError::Malformed
        );
        assert_eq!(
            codec.verify("not.a.token", TokenKind::Access).unwrap_err(),
            TokenError::Malformed
        );
    }

    #[test]
    fn test_foreign_signature_is_malformed_not_wrong_kind() {
        let codec = test_codec();
        let foreign = TokenCodec::new(&TokenSettings {
            access_secret: "some-other-deployment-secret".into(),
            refresh_secret: "another-deployment-secret".into(),
            reset_secret: "yet-another-secret".into(),
            access_ttl_secs: 900,
            refresh_ttl_secs: 604_800,
            reset_ttl_secs: 600,
        });
        let token = foreign.issue(Uuid::new_v4(), TokenKind::Access).unwrap();

        assert_eq!(
            codec.verify(&token, TokenKind::Access).unwrap_err(),
            TokenError::Malformed
        );
    }

    #[test]
    fn test_refresh_expiry_is_later_than_access() {
        let codec = test_codec();
        let pair = codec.issue_pair(Uuid::new_v4()).unwrap();

        assert!(!pair.access_token.is_empty());
        assert!(!pair.refresh_token.is_empty());
        assert_eq!(pair.token_type, "Bearer");
        assert_eq!(pair.expires_in, 900);
    }

    #[test]
    fn test_tokens_carry_no_role_claims() {
        let codec = test_codec();
        let token = codec.issue(Uuid::new_v4(), TokenKind::Access).unwrap();

        use base64::Engine;
        let payload = token.split('.').nth(1).unwrap();
        let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(payload)
            .unwrap();
        let claims: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(claims.get("role").is_none());
        assert_eq!(claims["token_type"], "access");
    }
}
