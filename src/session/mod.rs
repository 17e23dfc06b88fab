//! Session token storage.
//!
//! The access token always lives in persistent scope. Where the refresh token
//! lives depends on the remember-choice made at login, and it is only ever
//! present in one scope: writing it to one removes it from the other.
//! Reads check persistent scope first and fall back to session scope, so a
//! login without "remember me" still yields a usable refresh token for the
//! rest of the session.

pub mod store;

pub use self::store::{FileStore, KeyValueStore, MemoryStore, StoreError};

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::debug;

pub const ACCESS_TOKEN_KEY: &str = "accessToken";
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

/// Access/refresh pair returned by a successful login.
#[derive(Debug)]
pub struct SessionTokens {
    pub access: SecretString,
    pub refresh: SecretString,
}

impl SessionTokens {
    /// Extract `access` and `refresh` from a login response body.
    #[must_use]
    pub fn from_body(body: &Value) -> Option<Self> {
        let access = body.get("access")?.as_str()?;
        let refresh = body.get("refresh")?.as_str()?;

        Some(Self {
            access: SecretString::from(access.to_string()),
            refresh: SecretString::from(refresh.to_string()),
        })
    }
}

/// Token persistence over a persistent-scope and a session-scope store.
#[derive(Debug)]
pub struct SessionManager<P, S> {
    persistent: P,
    session: S,
}

impl<P: KeyValueStore, S: KeyValueStore> SessionManager<P, S> {
    pub fn new(persistent: P, session: S) -> Self {
        Self {
            persistent,
            session,
        }
    }

    pub fn persistent(&self) -> &P {
        &self.persistent
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    /// Store the tokens from a successful login.
    ///
    /// # Errors
    /// Returns an error if either store fails to write.
    pub fn store(&self, tokens: &SessionTokens, remember: bool) -> Result<(), StoreError> {
        self.persistent
            .set(ACCESS_TOKEN_KEY, tokens.access.expose_secret())?;

        if remember {
            self.persistent
                .set(REFRESH_TOKEN_KEY, tokens.refresh.expose_secret())?;
            self.session.remove(REFRESH_TOKEN_KEY)?;
        } else {
            self.session
                .set(REFRESH_TOKEN_KEY, tokens.refresh.expose_secret())?;
            self.persistent.remove(REFRESH_TOKEN_KEY)?;
        }

        debug!("stored session tokens, remember: {}", remember);

        Ok(())
    }

    /// Token for authenticated requests; persistent scope only.
    pub fn access_token(&self) -> Option<SecretString> {
        self.persistent
            .get(ACCESS_TOKEN_KEY)
            .map(SecretString::from)
    }

    pub fn refresh_token(&self) -> Option<SecretString> {
        self.persistent
            .get(REFRESH_TOKEN_KEY)
            .or_else(|| self.session.get(REFRESH_TOKEN_KEY))
            .map(SecretString::from)
    }

    pub fn is_authenticated(&self) -> bool {
        self.persistent.get(ACCESS_TOKEN_KEY).is_some()
    }

    /// Drop both tokens from persistent scope and the session-scope refresh
    /// token, if any.
    ///
    /// # Errors
    /// Returns an error if either store fails to write.
    pub fn logout(&self) -> Result<(), StoreError> {
        self.persistent.remove(ACCESS_TOKEN_KEY)?;
        self.persistent.remove(REFRESH_TOKEN_KEY)?;
        self.session.remove(REFRESH_TOKEN_KEY)?;

        debug!("session tokens cleared");

        Ok(())
    }
}
