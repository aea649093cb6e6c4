//! Connection execution context
//!
//! Wraps a [`MetadataConnection`] with the safety rails every metadata
//! read in the engine relies on: savepoint-guarded execution, a
//! per-connection capability cache, and the policy that degraded reads
//! return defaults instead of propagating.
//!
//! One connection is single-writer; the mutexes here only protect the
//! lazily built caches against two concurrent first-use calls.

use crate::{DialektError, MetadataConnection, Result};
use std::collections::HashSet;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Execution context for a single connection.
pub struct ExecutionContext {
    conn: Arc<dyn MetadataConnection>,
    /// Capabilities recorded as unsupported for this connection.
    unsupported: Mutex<HashSet<String>>,
    /// Outstanding savepoints, innermost last.
    savepoints: Mutex<Vec<String>>,
    /// Per-context savepoint counter; deliberately not process-wide.
    savepoint_seq: AtomicU64,
}

impl ExecutionContext {
    pub fn new(conn: Arc<dyn MetadataConnection>) -> Self {
        Self {
            conn,
            unsupported: Mutex::new(HashSet::new()),
            savepoints: Mutex::new(Vec::new()),
            savepoint_seq: AtomicU64::new(0),
        }
    }

    pub fn connection(&self) -> &Arc<dyn MetadataConnection> {
        &self.conn
    }

    /// Whether a capability has been recorded as unsupported.
    pub fn is_recorded_unsupported(&self, capability: &str) -> bool {
        self.unsupported.lock().unwrap().contains(capability)
    }

    /// Record a capability as unsupported for the rest of this
    /// connection's life.
    pub fn record_unsupported(&self, capability: &str) {
        self.unsupported.lock().unwrap().insert(capability.to_string());
    }

    /// Run a capability probe at most once per connection.
    ///
    /// A probe that errors records the capability as unsupported and
    /// yields `fallback`; later calls short-circuit to `fallback`
    /// without touching the connection again.
    pub async fn capability<Fut>(
        &self,
        name: &str,
        fallback: bool,
        probe: impl FnOnce() -> Fut,
    ) -> bool
    where
        Fut: Future<Output = Result<bool>>,
    {
        if self.is_recorded_unsupported(name) {
            return fallback;
        }
        match probe().await {
            Ok(answer) => answer,
            Err(err) => {
                tracing::debug!(capability = %name, error = %err, "capability probe failed, recording as unsupported");
                self.record_unsupported(name);
                fallback
            }
        }
    }

    /// Run `op` guarded by a savepoint.
    ///
    /// Outside a transaction (auto-commit on) the savepoint would be a
    /// no-op, so none is created. On error the savepoint is rolled back
    /// before the error is handed to the caller.
    pub async fn with_savepoint<T, Fut>(&self, op: impl FnOnce() -> Fut) -> Result<T>
    where
        Fut: Future<Output = Result<T>>,
    {
        if self.conn.is_closed() {
            return Err(DialektError::ConnectionClosed);
        }
        if self.conn.auto_commit().await.unwrap_or(true) {
            return op().await;
        }

        let name = format!(
            "dialekt_sp_{}",
            self.savepoint_seq.fetch_add(1, Ordering::Relaxed)
        );
        self.conn.create_savepoint(&name).await?;
        self.savepoints.lock().unwrap().push(name.clone());

        match op().await {
            Ok(value) => {
                self.finish_savepoint(&name, false).await;
                Ok(value)
            }
            Err(err) => {
                self.finish_savepoint(&name, true).await;
                Err(err)
            }
        }
    }

    /// Release or roll back a savepoint, tolerating out-of-order use.
    ///
    /// Savepoints are strictly nested; releasing one that is not the
    /// innermost indicates a bug in the caller, which is logged but not
    /// turned into a failure here.
    async fn finish_savepoint(&self, name: &str, rollback: bool) {
        {
            let mut stack = self.savepoints.lock().unwrap();
            match stack.last() {
                Some(top) if top == name => {
                    stack.pop();
                }
                _ => {
                    tracing::warn!(
                        savepoint = %name,
                        "savepoint finished out of order; caller is not strictly nesting"
                    );
                    stack.retain(|s| s != name);
                }
            }
        }
        let result = if rollback {
            self.conn.rollback_to_savepoint(name).await
        } else {
            self.conn.release_savepoint(name).await
        };
        if let Err(err) = result {
            tracing::warn!(savepoint = %name, error = %err, "savepoint cleanup failed");
        }
    }

    /// Count of savepoints currently outstanding.
    pub fn open_savepoints(&self) -> usize {
        self.savepoints.lock().unwrap().len()
    }

    /// Apply the degraded-read policy to a metadata result.
    ///
    /// Fatal errors propagate; a cancelled statement and every transient
    /// probe failure become a logged default, because partial metadata is
    /// preferable to none.
    pub fn default_on_failure<T: Default>(result: Result<T>, context: &str) -> Result<T> {
        match result {
            Ok(value) => Ok(value),
            Err(err) if err.is_fatal() => Err(err),
            Err(DialektError::Cancelled) => {
                tracing::debug!(context = %context, "metadata read cancelled, returning empty result");
                Ok(T::default())
            }
            Err(err) => {
                tracing::warn!(context = %context, error = %err, "metadata read degraded to default");
                Ok(T::default())
            }
        }
    }
}
