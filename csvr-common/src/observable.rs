//! Observable values and memoised derivations
//!
//! Dialog state is built on two primitives:
//! - [`ValueExpression`]: a single stored value with change notification
//! - [`Computed`]: a value derived on demand, cached until invalidated
//!
//! Both use `tokio::sync::watch` for notification, so bound consumers can
//! `changed().await` on a receiver from either.

use tokio::sync::watch;

/// A stored value whose consumers are notified when it changes
#[derive(Debug)]
pub struct ValueExpression<T> {
    tx: watch::Sender<T>,
}

impl<T: Clone + PartialEq> ValueExpression<T> {
    pub fn new(initial: T) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx }
    }

    /// Current value
    pub fn get(&self) -> T {
        self.tx.borrow().clone()
    }

    /// Store a value, notifying subscribers only if it differs from the current one
    ///
    /// Returns whether the value changed.
    pub fn set_value(&self, value: T) -> bool {
        self.tx.send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        })
    }

    /// Bind a consumer to this value
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }
}

impl<T: Clone + PartialEq + Default> Default for ValueExpression<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// Pull-based memoised derivation
///
/// The derivation function is supplied at read time so the owner can borrow
/// whatever state the value depends on. `invalidate` drops the cached value
/// and bumps the version seen by subscribers; the next read recomputes.
#[derive(Debug)]
pub struct Computed<T> {
    cached: Option<T>,
    version: watch::Sender<u64>,
    recomputations: u64,
}

impl<T: Clone> Computed<T> {
    pub fn new() -> Self {
        let (version, _) = watch::channel(0);
        Self {
            cached: None,
            version,
            recomputations: 0,
        }
    }

    /// Cached value, recomputing with `derive` if stale
    pub fn get_or_compute<F>(&mut self, derive: F) -> T
    where
        F: FnOnce() -> T,
    {
        if let Some(value) = &self.cached {
            return value.clone();
        }
        let value = derive();
        self.recomputations += 1;
        self.cached = Some(value.clone());
        value
    }

    /// Drop the cached value and notify bound consumers
    pub fn invalidate(&mut self) {
        self.cached = None;
        self.version.send_modify(|v| *v += 1);
    }

    pub fn is_stale(&self) -> bool {
        self.cached.is_none()
    }

    /// How many times the derivation has run
    pub fn recomputations(&self) -> u64 {
        self.recomputations
    }

    /// Receiver whose value increments on every invalidation
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.version.subscribe()
    }
}

impl<T: Clone> Default for Computed<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_value_reports_change() {
        let value = ValueExpression::new(Some("a".to_string()));
        assert!(!value.set_value(Some("a".to_string())));
        assert!(value.set_value(None));
        assert_eq!(value.get(), None);
    }

    #[tokio::test]
    async fn test_subscriber_notified_on_change_only() {
        let value = ValueExpression::new(1);
        let mut rx = value.subscribe();

        value.set_value(1);
        assert!(!rx.has_changed().unwrap());

        value.set_value(2);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), 2);
    }

    #[test]
    fn test_computed_memoises_until_invalidated() {
        let mut computed: Computed<bool> = Computed::new();
        let mut calls = 0;

        assert!(computed.is_stale());
        assert!(computed.get_or_compute(|| {
            calls += 1;
            true
        }));
        assert!(computed.get_or_compute(|| {
            calls += 1;
            false
        }));
        assert_eq!(calls, 1);
        assert_eq!(computed.recomputations(), 1);

        computed.invalidate();
        assert!(!computed.get_or_compute(|| false));
        assert_eq!(computed.recomputations(), 2);
    }

    #[tokio::test]
    async fn test_computed_invalidation_bumps_version() {
        let mut computed: Computed<u32> = Computed::new();
        let mut rx = computed.subscribe();
        computed.get_or_compute(|| 7);

        computed.invalidate();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), 1);
    }
}
