//! The signed-in account, as an observable cell.
//!
//! Anything may read or subscribe; only [`crate::auth::Auth`] writes.

use crate::models::Account;
use log::debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// Handle returned by [`SessionStore::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Arc<dyn Fn(Option<&Account>) + Send + Sync>;

#[derive(Default)]
pub struct SessionStore {
    account: RwLock<Option<Account>>,
    subscribers: Mutex<Vec<(SubscriptionId, Callback)>>,
    next_id: AtomicU64,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the signed-in account
    pub fn current(&self) -> Option<Account> {
        self.account
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_signed_in(&self) -> bool {
        self.account
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Register `callback`. It runs once right away with the current value,
    /// then after every change until unsubscribed.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(Option<&Account>) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let callback: Callback = Arc::new(callback);
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::clone(&callback)));

        let current = self.current();
        callback(current.as_ref());
        id
    }

    /// Returns false if `id` was not registered
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let before = subscribers.len();
        subscribers.retain(|(sid, _)| *sid != id);
        subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Replace the account and notify subscribers if it changed
    pub(crate) fn set(&self, account: Option<Account>) {
        {
            let mut slot = self.account.write().unwrap_or_else(PoisonError::into_inner);
            if *slot == account {
                return;
            }
            *slot = account.clone();
        }
        debug!(
            "session changed: {}",
            account.as_ref().map_or("signed out", |a| a.username.as_str())
        );

        // Callbacks run without holding either lock so they may read the store
        let callbacks: Vec<Callback> = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();
        for callback in callbacks {
            callback(account.as_ref());
        }
    }
}
