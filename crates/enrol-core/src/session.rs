//! Admin sessions: signed, time-bound tokens kept in the medium.
//!
//! A token is `<expires>.<issued>.<username>.<mac>` where the timestamps are
//! Unix seconds and `mac` is a keyed BLAKE3 digest of everything before the
//! last dot. The 32-byte key is generated once per medium and stored under
//! [`SECRET_KEY`].

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use serde::Serialize;

use crate::config::{AdminConfig, SessionConfig};
use crate::error::ErrorCode;
use crate::store::medium::{KvMedium, MediumError};

/// Medium key of the signing secret.
pub const SECRET_KEY: &str = "session_secret";

/// Medium key of the current admin token.
pub const SESSION_KEY: &str = "admin_session";

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("not logged in")]
    NotLoggedIn,

    #[error("session expired at {0}")]
    Expired(DateTime<Utc>),

    #[error("session token failed verification")]
    Tampered,

    #[error(transparent)]
    Medium(#[from] MediumError),
}

impl AuthError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidCredentials | Self::NotLoggedIn => ErrorCode::Unauthorized,
            Self::Expired(_) => ErrorCode::SessionExpired,
            Self::Tampered => ErrorCode::SessionTampered,
            Self::Medium(err) => err.code(),
        }
    }
}

/// A verified admin session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub username: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Hex BLAKE3 digest of a password, as stored in `admin.password_blake3`.
#[must_use]
pub fn hash_password(password: &str) -> String {
    blake3::hash(password.as_bytes()).to_hex().to_string()
}

/// Issues and verifies admin sessions against one medium.
#[derive(Debug, Clone)]
pub struct SessionManager<M: KvMedium> {
    medium: M,
    admin: AdminConfig,
    ttl: Duration,
}

impl<M: KvMedium> SessionManager<M> {
    pub fn new(medium: M, admin: &AdminConfig, session: &SessionConfig) -> Self {
        Self {
            medium,
            admin: admin.clone(),
            ttl: Duration::minutes(i64::from(session.ttl_minutes)),
        }
    }

    /// Check credentials and store a fresh token.
    pub fn login(&self, username: &str, password: &str) -> Result<Session, AuthError> {
        self.login_at(username, password, Utc::now())
    }

    pub fn login_at(
        &self,
        username: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<Session, AuthError> {
        let Ok(expected) = blake3::Hash::from_hex(self.admin.password_blake3.trim()) else {
            tracing::warn!("admin.password_blake3 is not a 64-digit hex digest");
            return Err(AuthError::InvalidCredentials);
        };
        // Hash equality is constant-time.
        let password_ok = blake3::hash(password.as_bytes()) == expected;
        if username != self.admin.username || !password_ok {
            tracing::warn!(username, "admin login rejected");
            return Err(AuthError::InvalidCredentials);
        }

        let secret = self.secret_or_create()?;
        let session = Session {
            username: username.to_string(),
            issued_at: trim_to_seconds(now),
            expires_at: trim_to_seconds(now + self.ttl),
        };
        self.medium.set(SESSION_KEY, &sign(&secret, &session))?;

        tracing::info!(username, expires_at = %session.expires_at, "admin logged in");
        Ok(session)
    }

    /// The active session, if the stored token verifies and has not expired.
    pub fn current(&self) -> Result<Session, AuthError> {
        self.current_at(Utc::now())
    }

    pub fn current_at(&self, now: DateTime<Utc>) -> Result<Session, AuthError> {
        let Some(token) = self.medium.get(SESSION_KEY)? else {
            return Err(AuthError::NotLoggedIn);
        };
        let Some(secret) = self.secret()? else {
            return Err(AuthError::Tampered);
        };

        let session = verify(&secret, token.trim())?;
        if session.username != self.admin.username {
            return Err(AuthError::NotLoggedIn);
        }
        if now >= session.expires_at {
            return Err(AuthError::Expired(session.expires_at));
        }
        Ok(session)
    }

    /// Drop the stored token. Returns whether one was present.
    pub fn logout(&self) -> Result<bool, AuthError> {
        let existed = self.medium.get(SESSION_KEY)?.is_some();
        self.medium.remove(SESSION_KEY)?;
        if existed {
            tracing::info!("admin logged out");
        }
        Ok(existed)
    }

    fn secret(&self) -> Result<Option<[u8; 32]>, AuthError> {
        Ok(self
            .medium
            .get(SECRET_KEY)?
            .and_then(|hex| blake3::Hash::from_hex(hex.trim()).ok())
            .map(|hash| *hash.as_bytes()))
    }

    fn secret_or_create(&self) -> Result<[u8; 32], AuthError> {
        if let Some(secret) = self.secret()? {
            return Ok(secret);
        }
        let mut secret = [0_u8; 32];
        rand::thread_rng().fill_bytes(&mut secret);
        self.medium
            .set(SECRET_KEY, blake3::Hash::from(secret).to_hex().as_str())?;
        tracing::debug!("generated session secret");
        Ok(secret)
    }
}

fn trim_to_seconds(at: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp(at.timestamp(), 0).unwrap_or(at)
}

fn sign(secret: &[u8; 32], session: &Session) -> String {
    let payload = format!(
        "{}.{}.{}",
        session.expires_at.timestamp(),
        session.issued_at.timestamp(),
        session.username
    );
    let mac = blake3::keyed_hash(secret, payload.as_bytes());
    format!("{payload}.{}", mac.to_hex())
}

fn verify(secret: &[u8; 32], token: &str) -> Result<Session, AuthError> {
    let (payload, mac) = token.rsplit_once('.').ok_or(AuthError::Tampered)?;
    let mac = blake3::Hash::from_hex(mac).map_err(|_| AuthError::Tampered)?;
    if blake3::keyed_hash(secret, payload.as_bytes()) != mac {
        return Err(AuthError::Tampered);
    }

    let mut parts = payload.splitn(3, '.');
    let mut timestamp = || {
        parts
            .next()
            .and_then(|raw| raw.parse::<i64>().ok())
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .ok_or(AuthError::Tampered)
    };
    let expires_at = timestamp()?;
    let issued_at = timestamp()?;
    let username = parts.next().ok_or(AuthError::Tampered)?.to_string();

    Ok(Session {
        username,
        issued_at,
        expires_at,
    })
}
