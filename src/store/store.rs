use crate::transaction::{NewTransaction, Transaction, TransactionId};

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

type Observer = Box<dyn FnMut(&[Transaction]) + Send>;

#[derive(Default)]
struct Inner {
    transactions: Vec<Transaction>,
    observers: Vec<(u64, Observer)>,
    next_observer_id: u64,
}

impl Inner {
    fn notify(&mut self) {
        let Inner {
            transactions,
            observers,
            ..
        } = self;

        for (_, observer) in observers.iter_mut() {
            observer(transactions.as_slice());
        }
    }
}

/// Observable in-memory collection of transactions.
///
/// Cloning yields another handle to the same collection. Each mutation and
/// the notifications it triggers run under a single lock, so every observer
/// sees every state in order. Observers run synchronously on the mutating
/// thread and must not call back into the same store.
#[derive(Clone, Default)]
pub struct LedgerStore {
    inner: Arc<Mutex<Inner>>,
}

impl LedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A panicking observer poisons the lock; the state itself is always
    /// consistent at that point, so keep going.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replaces the whole collection, keeping the given order. No merging.
    pub fn bulk_load(&self, transactions: Vec<Transaction>) {
        let mut inner = self.lock();
        tracing::debug!(count = transactions.len(), "Bulk loading transactions");
        inner.transactions = transactions;
        inner.notify();
    }

    pub fn add(&self, new_tx: NewTransaction) -> TransactionId {
        let id = TransactionId::new();
        let mut inner = self.lock();
        inner.transactions.push(new_tx.into_transaction(id));
        tracing::debug!(%id, "Added transaction");
        inner.notify();
        id
    }

    /// Removes the transaction with `id` if present. Observers are notified either way.
    pub fn remove(&self, id: TransactionId) {
        let mut inner = self.lock();
        match inner.transactions.iter().position(|tx| tx.id == id) {
            Some(index) => {
                inner.transactions.remove(index);
                tracing::debug!(%id, "Removed transaction");
            }
            None => tracing::debug!(%id, "No transaction to remove"),
        }
        inner.notify();
    }

    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.transactions.clear();
        tracing::debug!("Cleared transactions");
        inner.notify();
    }

    /// Registers `observer`, calling it right away with the current
    /// collection and then after every mutation.
    ///
    /// Dropping the returned [`Subscription`] does not unsubscribe; call
    /// [`Subscription::unsubscribe`].
    #[must_use = "the subscription is needed to unsubscribe"]
    pub fn subscribe<F>(&self, mut observer: F) -> Subscription
    where
        F: FnMut(&[Transaction]) + Send + 'static,
    {
        let mut inner = self.lock();
        observer(inner.transactions.as_slice());

        let id = inner.next_observer_id;
        inner.next_observer_id += 1;
        inner.observers.push((id, Box::new(observer)));

        Subscription {
            store: Arc::downgrade(&self.inner),
            id,
        }
    }

    pub fn snapshot(&self) -> Vec<Transaction> {
        self.lock().transactions.clone()
    }

    pub fn get(&self, id: TransactionId) -> Option<Transaction> {
        self.lock().transactions.iter().find(|tx| tx.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().transactions.is_empty()
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().observers.len()
    }
}

impl fmt::Debug for LedgerStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.lock();
        f.debug_struct("LedgerStore")
            .field("transactions", &inner.transactions.len())
            .field("observers", &inner.observers.len())
            .finish()
    }
}

/// Handle returned by [`LedgerStore::subscribe`].
#[derive(Debug)]
pub struct Subscription {
    store: Weak<Mutex<Inner>>,
    id: u64,
}

impl Subscription {
    pub fn unsubscribe(self) {
        if let Some(store) = self.store.upgrade() {
            let mut inner = store.lock().unwrap_or_else(PoisonError::into_inner);
            inner.observers.retain(|(id, _)| *id != self.id);
        }
    }
}
