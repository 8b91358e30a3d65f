//! Session context
//!
//! Owns the signed-in state (token + user profile), mirrors it to local
//! storage and publishes every change through a `watch` channel so views
//! can react without polling.

use std::sync::Arc;

use oficina_client::{ClientError, OficinaApi};
use serde::{Deserialize, Serialize};
use shared::models::User;
use thiserror::Error;
use tokio::sync::watch;

use crate::storage::{LocalStore, StorageError, keys};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Snapshot published to subscribers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub token: Option<String>,
    pub user: Option<User>,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(User::is_admin)
    }
}

pub struct SessionContext<A: OficinaApi + ?Sized> {
    api: Arc<A>,
    store: Arc<LocalStore>,
    tx: watch::Sender<SessionState>,
}

impl<A: OficinaApi + ?Sized> SessionContext<A> {
    /// Restore the persisted session and install its token on the client
    pub fn initialize(api: Arc<A>, store: Arc<LocalStore>) -> Self {
        let state = SessionState {
            token: store.get(keys::AUTH_TOKEN),
            user: store.get(keys::AUTH_USER),
        };
        if state.token.is_some() {
            api.set_token(state.token.clone());
            tracing::debug!("Restored persisted session");
        }
        let (tx, _rx) = watch::channel(state);
        Self { api, store, tx }
    }

    pub fn api(&self) -> &Arc<A> {
        &self.api
    }

    pub fn state(&self) -> SessionState {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.tx.subscribe()
    }

    pub fn current_user(&self) -> Option<User> {
        self.tx.borrow().user.clone()
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User, SessionError> {
        let resp = self.api.login(email.trim(), password).await.map_err(|e| {
            tracing::warn!(email = %email, error = %e, "Login failed");
            e
        })?;

        let persisted = self
            .store
            .set(keys::AUTH_TOKEN, &resp.token)
            .and_then(|()| self.store.set(keys::AUTH_USER, &resp.user));
        if let Err(e) = persisted {
            // The client must not stay authenticated behind an anonymous state
            tracing::error!(error = %e, "Failed to persist session");
            self.api.set_token(None);
            for key in [keys::AUTH_TOKEN, keys::AUTH_USER] {
                if let Err(e) = self.store.remove(key) {
                    tracing::warn!(key, error = %e, "Failed to drop partial session");
                }
            }
            return Err(e.into());
        }
        tracing::info!(user_id = %resp.user.id, "Signed in");

        self.tx.send_replace(SessionState {
            token: Some(resp.token),
            user: Some(resp.user.clone()),
        });
        Ok(resp.user)
    }

    /// Re-fetch the profile of the current token.
    ///
    /// An expired token signs the session out and yields `Ok(None)`; other
    /// failures keep the cached profile.
    pub async fn refresh(&self) -> Result<Option<User>, SessionError> {
        if !self.state().is_authenticated() {
            return Ok(None);
        }

        match self.api.me().await {
            Ok(user) => {
                self.store.set(keys::AUTH_USER, &user)?;
                self.tx.send_modify(|s| s.user = Some(user.clone()));
                Ok(Some(user))
            }
            Err(ClientError::Unauthorized) => {
                tracing::info!("Session expired");
                self.clear_local()?;
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Sign out; local state is cleared even if the server call fails
    pub async fn logout(&self) -> Result<(), SessionError> {
        if let Err(e) = self.api.logout().await {
            tracing::warn!(error = %e, "Server logout failed");
        }
        self.clear_local()?;
        tracing::info!("Signed out");
        Ok(())
    }

    fn clear_local(&self) -> Result<(), SessionError> {
        self.api.set_token(None);
        self.store.remove(keys::AUTH_TOKEN)?;
        self.store.remove(keys::AUTH_USER)?;
        self.tx.send_replace(SessionState::default());
        Ok(())
    }
}
