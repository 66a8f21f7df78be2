//! Caller identity and the credential store trait.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::UserId;
use uuid::Uuid;

use crate::error::{CheckoutError, Result};

/// An identity presented with a request: the user plus their bearer token.
///
/// Operations that touch a user's data take one of these explicitly and
/// verify it against the credential store before doing anything else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// The user making the request.
    pub user_id: UserId,

    /// The bearer token presented with the request.
    pub token: String,
}

impl Identity {
    /// Creates an identity from its parts.
    pub fn new(user_id: UserId, token: impl Into<String>) -> Self {
        Self {
            user_id,
            token: token.into(),
        }
    }
}

/// Trait for session validation operations.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Returns true when the identity's token matches an active session.
    async fn is_authenticated(&self, identity: &Identity) -> Result<bool>;

    /// Ends the identity's session. A no-op for invalid identities.
    async fn clear_session(&self, identity: &Identity) -> Result<()>;

    /// Verifies the identity and returns its user ID.
    ///
    /// Fails closed: an identity that cannot be positively verified gets
    /// [`CheckoutError::Unauthenticated`], and a credential store outage is
    /// surfaced rather than waved through.
    async fn authenticate(&self, identity: &Identity) -> Result<UserId> {
        if self.is_authenticated(identity).await? {
            Ok(identity.user_id)
        } else {
            Err(CheckoutError::Unauthenticated)
        }
    }
}

#[derive(Debug, Default)]
struct InMemorySessionState {
    tokens: HashMap<UserId, String>,
    fail_on_check: bool,
}

/// In-memory credential store for demos and testing.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessions {
    state: Arc<RwLock<InMemorySessionState>>,
}

impl InMemorySessions {
    /// Creates a store with no active sessions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a session for the user and returns the identity to present.
    ///
    /// Signing in again replaces the previous token.
    pub fn sign_in(&self, user_id: UserId) -> Identity {
        let token = Uuid::new_v4().to_string();
        self.state
            .write()
            .unwrap()
            .tokens
            .insert(user_id, token.clone());
        Identity::new(user_id, token)
    }

    /// Configures session checks to fail until cleared.
    pub fn set_fail_on_check(&self, fail: bool) {
        self.state.write().unwrap().fail_on_check = fail;
    }

    /// Returns the number of active sessions.
    pub fn session_count(&self) -> usize {
        self.state.read().unwrap().tokens.len()
    }
}

#[async_trait]
impl CredentialStore for InMemorySessions {
    async fn is_authenticated(&self, identity: &Identity) -> Result<bool> {
        let state = self.state.read().unwrap();
        if state.fail_on_check {
            return Err(CheckoutError::CollaboratorUnavailable {
                collaborator: "credential store",
                reason: "session checks are disabled".to_string(),
            });
        }
        Ok(state
            .tokens
            .get(&identity.user_id)
            .is_some_and(|token| token == &identity.token))
    }

    async fn clear_session(&self, identity: &Identity) -> Result<()> {
        let mut state = self.state.write().unwrap();
        let token_matches = state
            .tokens
            .get(&identity.user_id)
            .is_some_and(|token| token == &identity.token);
        if token_matches {
            state.tokens.remove(&identity.user_id);
        }
        Ok(())
    }
}
