//! Credential lifespan state machine.
//!
//! ```text
//! UNINITIALIZED → READY → CLOSED
//! ```
//! `READY` is entered once the credential is constructed. Every invocation
//! during `READY` receives the same `Arc`. `CLOSED` is entered exactly once;
//! asking for the credential afterwards is a programming error.

use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::TokenCredential;
use crate::types::{Error, Result};

/// Lifespan state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum LifespanState {
    Uninitialized,
    Ready,
    Closed,
}

impl LifespanState {
    /// Check if transition is valid.
    pub fn can_transition_to(self, to: LifespanState) -> bool {
        matches!(
            (self, to),
            (LifespanState::Uninitialized, LifespanState::Ready)
                | (LifespanState::Ready, LifespanState::Closed)
        )
    }
}

struct Inner {
    state: LifespanState,
    credential: Option<Arc<dyn TokenCredential>>,
}

/// Owns the process-wide credential from startup to shutdown.
pub struct CredentialLifespan {
    inner: Mutex<Inner>,
}

impl std::fmt::Debug for CredentialLifespan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialLifespan")
            .field("state", &self.state())
            .finish()
    }
}

impl Default for CredentialLifespan {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialLifespan {
    /// Create a lifespan in `Uninitialized` state.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: LifespanState::Uninitialized,
                credential: None,
            }),
        }
    }

    /// Construct the credential and enter `Ready`.
    ///
    /// A factory failure is a fatal startup error; it is not retried and the
    /// lifespan stays `Uninitialized`.
    pub async fn initialize<F, Fut>(&self, factory: F) -> Result<()>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Arc<dyn TokenCredential>>>,
    {
        let state = self.state();
        if !state.can_transition_to(LifespanState::Ready) {
            return Err(Error::state_transition(format!(
                "cannot initialize credential: state is {:?}, expected Uninitialized",
                state
            )));
        }

        let credential = factory().await?;

        let mut inner = self.lock();
        if !inner.state.can_transition_to(LifespanState::Ready) {
            return Err(Error::state_transition(format!(
                "cannot initialize credential: state is {:?}, expected Uninitialized",
                inner.state
            )));
        }
        inner.credential = Some(credential);
        inner.state = LifespanState::Ready;
        tracing::info!("Credential ready");
        Ok(())
    }

    /// Construct a lifespan and initialize it in one step.
    pub async fn open<F, Fut>(factory: F) -> Result<Self>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Arc<dyn TokenCredential>>>,
    {
        let lifespan = Self::new();
        lifespan.initialize(factory).await?;
        Ok(lifespan)
    }

    /// The shared credential. Only valid while `Ready`.
    pub fn credential(&self) -> Result<Arc<dyn TokenCredential>> {
        let inner = self.lock();
        match (&inner.state, &inner.credential) {
            (LifespanState::Ready, Some(credential)) => Ok(credential.clone()),
            (state, _) => Err(Error::state_transition(format!(
                "credential requested in {:?} state",
                state
            ))),
        }
    }

    pub fn state(&self) -> LifespanState {
        self.lock().state
    }

    /// Release the credential and enter `Closed`.
    ///
    /// Only the first call from `Ready` releases anything; later calls are
    /// no-ops.
    pub async fn close(&self) {
        let credential = {
            let mut inner = self.lock();
            if !inner.state.can_transition_to(LifespanState::Closed) {
                return;
            }
            inner.state = LifespanState::Closed;
            inner.credential.take()
        };

        if let Some(credential) = credential {
            credential.close().await;
            tracing::info!("Credential closed");
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Scoped acquisition: open the credential, run `body`, then close it.
///
/// The credential is closed whether `body` returns `Ok`, returns `Err`, or
/// panics. A panic is resumed after the close.
pub async fn run_with_credential<F, Fut, B, BFut, T>(factory: F, body: B) -> Result<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Arc<dyn TokenCredential>>>,
    B: FnOnce(Arc<CredentialLifespan>) -> BFut,
    BFut: Future<Output = Result<T>>,
{
    let lifespan = Arc::new(CredentialLifespan::open(factory).await?);

    let outcome = AssertUnwindSafe(body(lifespan.clone())).catch_unwind().await;
    lifespan.close().await;

    match outcome {
        Ok(result) => result,
        Err(panic) => std::panic::resume_unwind(panic),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::MockTokenCredential;

    fn closing_once() -> Arc<dyn TokenCredential> {
        let mut mock = MockTokenCredential::new();
        mock.expect_close().times(1).returning(|| ());
        Arc::new(mock)
    }

    #[test]
    fn test_state_transitions() {
        use LifespanState::*;
        assert!(Uninitialized.can_transition_to(Ready));
        assert!(Ready.can_transition_to(Closed));
        assert!(!Uninitialized.can_transition_to(Closed));
        assert!(!Closed.can_transition_to(Ready));
        assert!(!Ready.can_transition_to(Ready));
    }

    #[tokio::test]
    async fn test_same_credential_for_every_invocation() {
        let lifespan = CredentialLifespan::open(|| async { Ok::<_, Error>(closing_once()) })
            .await
            .unwrap();

        let first = lifespan.credential().unwrap();
        for _ in 0..10 {
            assert!(Arc::ptr_eq(&first, &lifespan.credential().unwrap()));
        }
        drop(first);
        lifespan.close().await;
    }

    #[tokio::test]
    async fn test_close_exactly_once() {
        let lifespan = CredentialLifespan::open(|| async { Ok::<_, Error>(closing_once()) })
            .await
            .unwrap();

        lifespan.close().await;
        lifespan.close().await;
        assert_eq!(lifespan.state(), LifespanState::Closed);
    }

    #[tokio::test]
    async fn test_credential_after_close_is_error() {
        let lifespan = CredentialLifespan::open(|| async { Ok::<_, Error>(closing_once()) })
            .await
            .unwrap();
        lifespan.close().await;

        let err = lifespan.credential().err().unwrap();
        assert!(matches!(err, Error::StateTransition(_)));
    }

    #[tokio::test]
    async fn test_credential_before_initialize_is_error() {
        let lifespan = CredentialLifespan::new();
        assert_eq!(lifespan.state(), LifespanState::Uninitialized);
        assert!(lifespan.credential().is_err());
    }

    #[tokio::test]
    async fn test_double_initialize_rejected() {
        let lifespan = CredentialLifespan::open(|| async { Ok::<_, Error>(closing_once()) })
            .await
            .unwrap();

        let again = lifespan
            .initialize(|| async { Ok::<_, Error>(Arc::new(MockTokenCredential::new()) as Arc<dyn TokenCredential>) })
            .await;
        assert!(again.is_err());
        lifespan.close().await;
    }

    #[tokio::test]
    async fn test_factory_failure_is_fatal() {
        let result = CredentialLifespan::open(|| async {
            Err::<Arc<dyn TokenCredential>, _>(Error::credential("no ambient identity"))
        })
        .await;
        assert!(matches!(result, Err(Error::Credential(_))));
    }

    #[tokio::test]
    async fn test_run_with_credential_closes_on_error() {
        let result: Result<()> = run_with_credential(
            || async { Ok::<_, Error>(closing_once()) },
            |_lifespan| async { Err(Error::internal("server crashed")) },
        )
        .await;
        assert!(matches!(result, Err(Error::Internal(_))));
    }

    #[tokio::test]
    async fn test_run_with_credential_closes_with_zero_invocations() {
        let result = run_with_credential(
            || async { Ok::<_, Error>(closing_once()) },
            |lifespan| async move {
                assert_eq!(lifespan.state(), LifespanState::Ready);
                Ok::<_, Error>(7)
            },
        )
        .await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_run_with_credential_closes_on_panic() {
        let handle = tokio::spawn(run_with_credential(
            || async { Ok::<_, Error>(closing_once()) },
            |_lifespan| async {
                if true {
                    panic!("handler bug");
                }
                Ok::<_, Error>(())
            },
        ));

        let join = handle.await;
        assert!(join.unwrap_err().is_panic());
    }
}
