//! Sequencing of overlapping updates.
//!
//! Every update takes a token before it starts loading. Results are only
//! committed when their token is newer than the last committed one, so a slow
//! early request can never overwrite the answer to a later one.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Mutex, MutexGuard,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct UpdateToken(u64);

impl UpdateToken {
    pub fn raw(self) -> u64 {
        self.0
    }
}

#[derive(Debug)]
struct Committed<T> {
    token: u64,
    value: Option<T>,
}

#[derive(Debug)]
pub struct UpdateSession<T> {
    issued: AtomicU64,
    committed: Mutex<Committed<T>>,
}

impl<T> Default for UpdateSession<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> UpdateSession<T> {
    pub fn new() -> Self {
        Self {
            issued: AtomicU64::new(0),
            committed: Mutex::new(Committed {
                token: 0,
                value: None,
            }),
        }
    }

    pub fn begin(&self) -> UpdateToken {
        UpdateToken(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// True when `token` is still the most recently issued one.
    pub fn is_current(&self, token: UpdateToken) -> bool {
        self.issued.load(Ordering::SeqCst) == token.0
    }

    /// Stores `value` unless a newer update already landed. Returns whether
    /// the value was kept.
    pub fn commit(&self, token: UpdateToken, value: T) -> bool {
        let mut committed = self.lock();
        if token.0 <= committed.token {
            return false;
        }
        committed.token = token.0;
        committed.value = Some(value);
        true
    }

    pub fn latest(&self) -> Option<T>
    where
        T: Clone,
    {
        self.lock().value.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Committed<T>> {
        // A panic while holding the lock cannot leave a half-written value.
        self.committed
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
