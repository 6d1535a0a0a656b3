//! Sequence tokens and the per-group staleness guard

use bracekit_core::{Error, Group, Result};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Issues cycle tokens and remembers the newest one committed per group
#[derive(Debug, Default)]
pub struct SequenceGuard {
    issued: AtomicU64,
    committed: Mutex<BTreeMap<Group, u64>>,
}

impl SequenceGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next token, greater than every token issued before it. Starts at 1.
    pub fn issue(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn latest_committed(&self, group: Group) -> Option<u64> {
        self.committed.lock().get(&group).copied()
    }

    /// Run `commit` only if no newer token has committed for `group`
    ///
    /// The check and the commit happen under one lock, so two cycles of the
    /// same group can never both pass the check before either records its
    /// token. A failed `commit` leaves the recorded token unchanged.
    pub fn commit_if_current<T>(
        &self,
        group: Group,
        token: u64,
        commit: impl FnOnce() -> Result<T>,
    ) -> Result<T> {
        let mut committed = self.committed.lock();
        if let Some(&latest) = committed.get(&group) {
            if latest >= token {
                return Err(Error::StaleCycleDiscarded {
                    group,
                    token,
                    latest,
                });
            }
        }
        let value = commit()?;
        committed.insert(group, token);
        Ok(value)
    }
}
