//! Process-wide session state.
//!
//! `AuthSession` is the only writer. Everything else holds a
//! [`SessionContext`], a read-only view that can be subscribed to; dropping
//! the [`SessionSubscription`] releases it.

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::error::ConsoleError;
use crate::helpers::auth::IdentityProvider;

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
    #[serde(skip_serializing)]
    pub id_token: String,
}

/// Read-only view of the current session.
#[derive(Clone, Debug)]
pub struct SessionContext {
    rx: watch::Receiver<Option<SessionUser>>,
}

impl SessionContext {
    pub fn current(&self) -> Option<SessionUser> {
        self.rx.borrow().clone()
    }

    pub fn is_signed_in(&self) -> bool {
        self.rx.borrow().is_some()
    }

    /// The signed-in user or `Unauthenticated`.
    pub fn require(&self) -> Result<SessionUser, ConsoleError> {
        self.current().ok_or(ConsoleError::Unauthenticated)
    }

    pub fn subscribe(&self) -> SessionSubscription {
        let mut rx = self.rx.clone();
        rx.mark_unchanged();
        SessionSubscription { rx }
    }
}

/// Change feed of the session, held for as long as the subscriber lives.
#[derive(Debug)]
pub struct SessionSubscription {
    rx: watch::Receiver<Option<SessionUser>>,
}

impl SessionSubscription {
    /// Waits for the next sign-in or sign-out. `None` once the session
    /// owner is gone.
    pub async fn changed(&mut self) -> Option<Option<SessionUser>> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    pub fn current(&self) -> Option<SessionUser> {
        self.rx.borrow().clone()
    }
}

/// Owner of the session: signs in and out through the identity provider
/// and publishes the result.
pub struct AuthSession {
    provider: Arc<dyn IdentityProvider>,
    tx: watch::Sender<Option<SessionUser>>,
}

impl AuthSession {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { provider, tx }
    }

    pub fn context(&self) -> SessionContext {
        SessionContext {
            rx: self.tx.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<SessionUser, ConsoleError> {
        match self.provider.sign_in(email, password).await {
            Ok(user) => {
                info!("Signed in as {}", user.email);
                self.tx.send_replace(Some(user.clone()));
                Ok(user)
            }
            Err(e) => {
                warn!("Sign-in failed for {}: {}", email, e);
                Err(e)
            }
        }
    }

    pub fn sign_out(&self) {
        if let Some(user) = self.tx.send_replace(None) {
            info!("Signed out {}", user.email);
        }
    }

    pub async fn send_password_reset(&self, email: &str) -> Result<(), ConsoleError> {
        self.provider.send_password_reset(email).await
    }

    /// Re-checks the current token with the provider and clears the
    /// session when it is no longer valid. The lookup result is only
    /// published while the session still holds the token it was made for;
    /// otherwise the newer session is returned untouched.
    pub async fn refresh(&self) -> Result<Option<SessionUser>, ConsoleError> {
        let Some(current) = self.tx.borrow().clone() else {
            return Ok(None);
        };

        let user = self.provider.lookup(&current.id_token).await?;

        let mut applied = false;
        self.tx.send_if_modified(|state| {
            let same_token = state
                .as_ref()
                .is_some_and(|held| held.id_token == current.id_token);
            if same_token {
                *state = user.clone();
                applied = true;
            }
            same_token
        });

        if !applied {
            info!("Session changed during refresh of {}, dropping lookup", current.email);
            return Ok(self.tx.borrow().clone());
        }
        if user.is_none() {
            info!("Session of {} expired", current.email);
        }
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tokio::sync::Notify;

    struct FixedIdentity;

    #[async_trait]
    impl IdentityProvider for FixedIdentity {
        async fn sign_in(&self, email: &str, password: &str) -> Result<SessionUser, ConsoleError> {
            if password != "correct" {
                return Err(ConsoleError::Api {
                    endpoint: "accounts:signInWithPassword".into(),
                    status: 400,
                    message: "INVALID_PASSWORD".into(),
                });
            }
            Ok(SessionUser {
                uid: "u1".into(),
                email: email.into(),
                display_name: None,
                id_token: "token-1".into(),
            })
        }

        async fn lookup(&self, id_token: &str) -> Result<Option<SessionUser>, ConsoleError> {
            Ok((id_token == "token-1").then(|| SessionUser {
                uid: "u1".into(),
                email: "office@school.test".into(),
                display_name: Some("Office".into()),
                id_token: id_token.into(),
            }))
        }

        async fn send_password_reset(&self, _email: &str) -> Result<(), ConsoleError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn subscribers_see_sign_in_and_sign_out() {
        let session = AuthSession::new(Arc::new(FixedIdentity));
        let context = session.context();
        let mut subscription = context.subscribe();
        assert!(!context.is_signed_in());

        session.sign_in("office@school.test", "correct").await.unwrap();
        let change = subscription.changed().await.unwrap();
        assert_eq!(change.unwrap().uid, "u1");
        assert!(context.is_signed_in());

        session.sign_out();
        assert_eq!(subscription.changed().await, Some(None));
        assert!(matches!(context.require(), Err(ConsoleError::Unauthenticated)));
    }

    #[tokio::test]
    async fn failed_sign_in_leaves_session_empty() {
        let session = AuthSession::new(Arc::new(FixedIdentity));
        assert!(session.sign_in("office@school.test", "wrong").await.is_err());
        assert!(session.context().current().is_none());
    }

    #[tokio::test]
    async fn dropping_subscription_releases_it() {
        let session = AuthSession::new(Arc::new(FixedIdentity));
        let context = session.context();
        let base = session.subscriber_count();

        let subscription = context.subscribe();
        assert_eq!(session.subscriber_count(), base + 1);
        drop(subscription);
        assert_eq!(session.subscriber_count(), base);
    }

    /// Holds every lookup until released.
    struct SlowLookup {
        entered: Arc<Notify>,
        release: Arc<Notify>,
    }

    #[async_trait]
    impl IdentityProvider for SlowLookup {
        async fn sign_in(&self, email: &str, password: &str) -> Result<SessionUser, ConsoleError> {
            FixedIdentity.sign_in(email, password).await
        }

        async fn lookup(&self, id_token: &str) -> Result<Option<SessionUser>, ConsoleError> {
            self.entered.notify_one();
            self.release.notified().await;
            FixedIdentity.lookup(id_token).await
        }

        async fn send_password_reset(&self, _email: &str) -> Result<(), ConsoleError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn late_lookup_does_not_undo_sign_out() {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let session = Arc::new(AuthSession::new(Arc::new(SlowLookup {
            entered: entered.clone(),
            release: release.clone(),
        })));
        session.sign_in("office@school.test", "correct").await.unwrap();

        let refreshing = tokio::spawn({
            let session = session.clone();
            async move { session.refresh().await }
        });
        entered.notified().await;
        session.sign_out();
        release.notify_one();

        assert_eq!(refreshing.await.unwrap().unwrap(), None);
        assert!(!session.context().is_signed_in());
    }

    #[tokio::test]
    async fn refresh_picks_up_profile_from_provider() {
        let session = AuthSession::new(Arc::new(FixedIdentity));
        session.sign_in("office@school.test", "correct").await.unwrap();

        let user = session.refresh().await.unwrap().unwrap();
        assert_eq!(user.display_name.as_deref(), Some("Office"));
        assert!(session.context().is_signed_in());
    }
}
