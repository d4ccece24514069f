use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio_util::sync::CancellationToken;

type ActiveRequests = HashMap<String, (u64, CancellationToken)>;

/// Tracks the in-flight recommendation request of each client session
///
/// Starting a request for a session cancels whatever request that session
/// still had running, so only the newest one ever publishes a result.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    active: Arc<Mutex<ActiveRequests>>,
    generation: Arc<AtomicU64>,
}

/// One registered request
///
/// Dropping the ticket, whether the request finished or its future was
/// abandoned, releases the session entry unless a newer request owns it.
#[derive(Debug)]
pub struct SessionTicket {
    registry: SessionRegistry,
    session_id: String,
    generation: u64,
    token: CancellationToken,
}

impl std::fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("active", &self.active_sessions())
            .finish()
    }
}

impl SessionTicket {
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl Drop for SessionTicket {
    fn drop(&mut self) {
        let mut active = self.registry.lock();
        if matches!(active.get(&self.session_id), Some((generation, _)) if *generation == self.generation)
        {
            active.remove(&self.session_id);
        }
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new request for `session_id`, superseding the previous one
    pub fn begin(&self, session_id: &str) -> SessionTicket {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();

        let previous = self
            .lock()
            .insert(session_id.to_string(), (generation, token.clone()));

        if let Some((_, previous)) = previous {
            tracing::info!(session_id = %session_id, "Superseding in-flight recommendation request");
            previous.cancel();
        }

        SessionTicket {
            registry: self.clone(),
            session_id: session_id.to_string(),
            generation,
            token,
        }
    }

    /// Sessions with a request still in flight
    pub fn active_sessions(&self) -> usize {
        self.lock().len()
    }

    // The map holds no invariant a panicking holder could break
    fn lock(&self) -> MutexGuard<'_, ActiveRequests> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_cancels_previous_request() {
        let registry = SessionRegistry::new();

        let first = registry.begin("abc");
        let second = registry.begin("abc");

        assert!(first.token().is_cancelled());
        assert!(!second.token().is_cancelled());
    }

    #[test]
    fn test_sessions_are_independent() {
        let registry = SessionRegistry::new();

        let a = registry.begin("a");
        let b = registry.begin("b");

        assert!(!a.token().is_cancelled());
        assert!(!b.token().is_cancelled());
        assert_eq!(registry.active_sessions(), 2);
    }

    #[test]
    fn test_dropping_ticket_releases_session() {
        let registry = SessionRegistry::new();

        let ticket = registry.begin("abc");
        drop(ticket);

        assert_eq!(registry.active_sessions(), 0);
    }

    #[test]
    fn test_stale_ticket_keeps_newer_request() {
        let registry = SessionRegistry::new();

        let stale = registry.begin("abc");
        let current = registry.begin("abc");
        drop(stale);

        assert_eq!(registry.active_sessions(), 1);

        // A third request must still be able to cancel the current one
        let _third = registry.begin("abc");
        assert!(current.token().is_cancelled());
    }

    #[tokio::test]
    async fn test_aborted_request_releases_session() {
        let registry = SessionRegistry::new();

        let task = tokio::spawn({
            let registry = registry.clone();
            async move {
                let ticket = registry.begin("abandoned");
                ticket.token().cancelled().await;
            }
        });
        while registry.active_sessions() == 0 {
            tokio::task::yield_now().await;
        }

        task.abort();
        let _ = task.await;

        assert_eq!(registry.active_sessions(), 0);
    }
}
