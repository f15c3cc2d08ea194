//! Fault injection for the in-memory store.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::storage::{Mutation, MutationKind, Result, StorageError};

/// Failure, conflict and latency knobs.
#[derive(Default)]
pub struct Faults {
    fail_on: Mutex<Option<MutationKind>>,
    conflicts: AtomicU32,
    latency: Mutex<Option<Duration>>,
}

impl Faults {
    /// Fail every update that contains a mutation of `kind`.
    pub fn fail_on_mutation(&self, kind: MutationKind) {
        *self.fail_on.lock().unwrap_or_else(|e| e.into_inner()) = Some(kind);
    }

    /// Report a version conflict on the next `count` updates.
    pub fn inject_conflicts(&self, count: u32) {
        self.conflicts.store(count, Ordering::SeqCst);
    }

    /// Sleep before every read and write.
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap_or_else(|e| e.into_inner()) = Some(latency);
    }

    pub fn clear(&self) {
        *self.fail_on.lock().unwrap_or_else(|e| e.into_inner()) = None;
        *self.latency.lock().unwrap_or_else(|e| e.into_inner()) = None;
        self.conflicts.store(0, Ordering::SeqCst);
    }

    pub(super) async fn delay(&self) {
        let latency = *self.latency.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }

    pub(super) fn check_write(&self, mutations: &[Mutation]) -> Result<()> {
        let fail_on = *self.fail_on.lock().unwrap_or_else(|e| e.into_inner());
        match fail_on {
            Some(kind) if mutations.iter().any(|m| m.kind() == kind) => Err(
                StorageError::Unavailable(format!("injected failure on {:?}", kind)),
            ),
            _ => Ok(()),
        }
    }

    pub(super) fn take_conflict(&self) -> bool {
        self.conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}
