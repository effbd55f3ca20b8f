//! Shared utilities and common patterns used across the codebase

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;

/// Type-safe wrapper for an agent index to prevent confusion with other numeric types
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize,
)]
#[serde(transparent)]
pub struct AgentId(pub u32);

impl AgentId {
    /// Create a new AgentId
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the underlying u32 value
    pub fn get(&self) -> u32 {
        self.0
    }

    /// Index into a slot list
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for AgentId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<AgentId> for u32 {
    fn from(agent: AgentId) -> Self {
        agent.0
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Cancellation signal shared by every agent of a run
///
/// Cloning is cheap; every clone observes the same [`CancelHandle`].
#[derive(Debug, Clone)]
pub struct RunContext {
    cancel_rx: watch::Receiver<bool>,
}

/// Owner side of a [`RunContext`]
#[derive(Debug, Clone)]
pub struct CancelHandle {
    cancel_tx: Arc<watch::Sender<bool>>,
}

impl RunContext {
    /// Create a fresh, uncancelled context and the handle that cancels it
    pub fn new() -> (CancelHandle, RunContext) {
        let (cancel_tx, cancel_rx) = watch::channel(false);
        (
            CancelHandle {
                cancel_tx: Arc::new(cancel_tx),
            },
            RunContext { cancel_rx },
        )
    }

    /// Non-blocking check, done at the start of every iteration
    pub fn is_cancelled(&self) -> bool {
        *self.cancel_rx.borrow()
    }

    /// Resolves once the context is cancelled.
    ///
    /// If every [`CancelHandle`] is dropped without cancelling, this never resolves.
    pub async fn cancelled(&self) {
        let mut rx = self.cancel_rx.clone();
        let outcome = rx.wait_for(|cancelled| *cancelled).await.map(|_| ());
        if outcome.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

impl CancelHandle {
    /// Cancel every agent observing this handle's context
    pub fn cancel(&self) {
        self.cancel_tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancel_tx.borrow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_agent_id_display() {
        assert_eq!(AgentId::from(3).to_string(), "3");
        assert_eq!(u32::from(AgentId::new(9)), 9);
    }

    #[test]
    fn test_cancel_visible_to_all_clones() {
        let (handle, ctx) = RunContext::new();
        let other = ctx.clone();
        assert!(!ctx.is_cancelled());

        handle.cancel();

        assert!(ctx.is_cancelled());
        assert!(other.is_cancelled());
        assert!(handle.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancelled_future_resolves() {
        let (handle, ctx) = RunContext::new();
        let waiter = tokio::spawn(async move { ctx.cancelled().await });

        handle.cancel();

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("cancellation should wake the waiter")
            .unwrap();
    }
}
