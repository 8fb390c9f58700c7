//! Auth-session state for the current user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Read by the navigation guard on every protected route change. The guard
//! may ask the store to rehydrate from storage or to log out; only the
//! store's own methods mutate the session.

use crate::role::Role;
use crate::storage::{StorageError, TOKEN_KEY, TokenStorage};
use crate::token::{TokenError, decode_claims};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Snapshot of the authenticated session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    pub token: Option<String>,
    pub role: Option<Role>,
    pub user_id: Option<String>,
    pub authenticated: bool,
}

/// Owns the session and its persisted token.
#[derive(Debug)]
pub struct SessionStore<S> {
    session: Session,
    storage: S,
}

impl<S: TokenStorage> SessionStore<S> {
    /// An unauthenticated store over `storage`. Call
    /// [`initialize_from_storage`](Self::initialize_from_storage) to rehydrate.
    pub fn new(storage: S) -> Self {
        Self { session: Session::default(), storage }
    }

    /// Load and decode a persisted token. Returns whether the session is
    /// authenticated afterwards.
    ///
    /// Safe to call repeatedly: an authenticated store is left untouched. An
    /// unreadable or expired token is discarded from storage.
    pub fn initialize_from_storage(&mut self) -> bool {
        if self.session.authenticated {
            return true;
        }

        let stored = match self.storage.get(TOKEN_KEY) {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!(error = %e, "session storage unreadable");
                return false;
            }
        };
        let Some(token) = stored else {
            tracing::debug!("no persisted session token");
            return false;
        };

        match decode_claims(&token) {
            Ok(claims) => {
                tracing::debug!(role = %claims.role, user_id = ?claims.user_id, "session rehydrated");
                self.session = Session {
                    token: Some(token),
                    role: Some(claims.role),
                    user_id: claims.user_id,
                    authenticated: true,
                };
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "discarding persisted session token");
                self.session = Session::default();
                if let Err(e) = self.storage.remove(TOKEN_KEY) {
                    tracing::warn!(error = %e, "failed to remove discarded token");
                }
                false
            }
        }
    }

    /// Adopt `token` as the session and persist it.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError`] if the token cannot be decoded or persisted.
    /// The session is unchanged on error.
    pub fn login(&mut self, token: &str) -> Result<(), SessionError> {
        let claims = decode_claims(token)?;
        self.storage.set(TOKEN_KEY, token)?;
        tracing::info!(role = %claims.role, user_id = ?claims.user_id, "session started");
        self.session = Session {
            token: Some(token.to_owned()),
            role: Some(claims.role),
            user_id: claims.user_id,
            authenticated: true,
        };
        Ok(())
    }

    /// Clear the session and its persisted token. Idempotent; never navigates.
    pub fn logout(&mut self) {
        if self.session.authenticated {
            tracing::info!(user_id = ?self.session.user_id, "session ended");
        }
        self.session = Session::default();
        if let Err(e) = self.storage.remove(TOKEN_KEY) {
            tracing::warn!(error = %e, "failed to clear persisted session token");
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.authenticated
    }

    /// Whether the role is ADMIN or above.
    #[must_use]
    pub fn is_admin_user(&self) -> bool {
        self.session.role.is_some_and(|role| role.satisfies(Role::Admin))
    }

    #[must_use]
    pub fn is_super_admin_user(&self) -> bool {
        self.session.role.is_some_and(|role| role.satisfies(Role::SuperAdmin))
    }

    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.session.token.as_deref()
    }

    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.session.role
    }

    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.session.user_id.as_deref()
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub fn storage(&self) -> &S {
        &self.storage
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
