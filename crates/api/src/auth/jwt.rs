//! Session tokens for registered players.
//!
//! A session is an HS256 access token naming the user, plus an opaque
//! refresh token. The refresh token is only stored as a SHA-256 digest on
//! the user row and is replaced on every login or refresh.

use chrono::Duration;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use questlog_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Access tokens live for 30 days so a game client rarely has to refresh.
const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 30 * 24 * 60;
const DEFAULT_REFRESH_EXPIRY_DAYS: i64 = 30;

/// Signing secret and token lifetimes.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expiry_mins: i64,
    pub refresh_token_expiry_days: i64,
}

impl JwtConfig {
    /// Read `JWT_SECRET` (required), `JWT_ACCESS_EXPIRY_MINS` (default
    /// `43200`) and `JWT_REFRESH_EXPIRY_DAYS` (default `30`).
    ///
    /// # Panics
    ///
    /// Panics if the secret is missing or empty, or a lifetime is not an
    /// integer.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        Self {
            secret,
            access_token_expiry_mins: env_i64("JWT_ACCESS_EXPIRY_MINS", DEFAULT_ACCESS_EXPIRY_MINS),
            refresh_token_expiry_days: env_i64(
                "JWT_REFRESH_EXPIRY_DAYS",
                DEFAULT_REFRESH_EXPIRY_DAYS,
            ),
        }
    }

    fn access_ttl(&self) -> Duration {
        Duration::minutes(self.access_token_expiry_mins)
    }

    fn refresh_ttl(&self) -> Duration {
        Duration::days(self.refresh_token_expiry_days)
    }
}

fn env_i64(name: &str, default: i64) -> i64 {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|_| panic!("{name} must be an integer, got {raw:?}")),
        Err(_) => default,
    }
}

/// Access-token payload.
#[derive(Debug, Serialize, Deserialize, Clone)]
struct Claims {
    sub: DbId,
    exp: i64,
    iat: i64,
    /// Keeps two tokens issued in the same second distinct.
    jti: String,
}

/// A freshly issued refresh token. Hand `plaintext` to the client and
/// persist `hash` with `expires_at`.
#[derive(Debug, Clone)]
pub struct RefreshToken {
    pub plaintext: String,
    pub hash: String,
    pub expires_at: Timestamp,
}

/// Everything a login or refresh hands back to the player.
#[derive(Debug, Clone)]
pub struct Session {
    pub access_token: String,
    pub refresh: RefreshToken,
}

/// Issue a new access token and refresh token for `user_id`, both dated
/// from `now`.
pub fn issue_session(
    user_id: DbId,
    config: &JwtConfig,
    now: Timestamp,
) -> Result<Session, jsonwebtoken::errors::Error> {
    let claims = Claims {
        sub: user_id,
        exp: (now + config.access_ttl()).timestamp(),
        iat: now.timestamp(),
        jti: Uuid::new_v4().to_string(),
    };
    let access_token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )?;

    let plaintext = Uuid::new_v4().simple().to_string();
    let refresh = RefreshToken {
        hash: refresh_token_digest(&plaintext),
        plaintext,
        expires_at: now + config.refresh_ttl(),
    };

    Ok(Session {
        access_token,
        refresh,
    })
}

/// Check an access token's signature and expiry and return the user it
/// names.
pub fn authenticate(token: &str, config: &JwtConfig) -> Result<DbId, jsonwebtoken::errors::Error> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims.sub)
}

/// Hex SHA-256 of a refresh token, the form it is looked up by.
pub fn refresh_token_digest(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn config() -> JwtConfig {
        JwtConfig {
            secret: "a-long-enough-secret-for-hs256-signing".to_string(),
            access_token_expiry_mins: 60,
            refresh_token_expiry_days: 30,
        }
    }

    #[test]
    fn session_token_names_its_user() {
        let session = issue_session(7, &config(), Utc::now()).unwrap();
        assert_eq!(authenticate(&session.access_token, &config()).unwrap(), 7);
    }

    #[test]
    fn refresh_token_is_stored_by_digest_and_expires_after_configured_days() {
        let now = Utc::now();
        let session = issue_session(7, &config(), now).unwrap();

        assert_eq!(session.refresh.hash, refresh_token_digest(&session.refresh.plaintext));
        assert_ne!(session.refresh.hash, session.refresh.plaintext);
        assert_eq!(session.refresh.expires_at, now + Duration::days(30));
    }

    #[test]
    fn each_session_gets_a_new_refresh_token() {
        let now = Utc::now();
        let a = issue_session(7, &config(), now).unwrap();
        let b = issue_session(7, &config(), now).unwrap();
        assert_ne!(a.refresh.plaintext, b.refresh.plaintext);
        assert_ne!(a.access_token, b.access_token);
    }

    #[test]
    fn stale_session_is_rejected() {
        // Past the decoder's 60 second leeway.
        let issued = Utc::now() - Duration::minutes(65);
        let session = issue_session(7, &config(), issued).unwrap();
        assert!(authenticate(&session.access_token, &config()).is_err());
    }

    #[test]
    fn token_signed_with_another_secret_is_rejected() {
        let session = issue_session(7, &config(), Utc::now()).unwrap();
        let other = JwtConfig {
            secret: "some-other-secret".to_string(),
            ..config()
        };
        assert!(authenticate(&session.access_token, &other).is_err());
    }
}
