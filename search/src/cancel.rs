//! Cooperative cancellation for long-running searches.
//!
//! Generation polls a canceler between batches; verification additionally
//! registers the pids of in-flight oracle processes so that canceling a
//! session tears the external programs down too.

use prover::proc::OraclePid;
use std::sync::{Arc, RwLock};

/// Something that can be canceled, and asked whether it has been.
pub trait Canceler: Clone + Send + Sync {
    /// Has this been canceled?
    fn is_canceled(&self) -> bool;
    /// Cancel it. Must be idempotent.
    fn cancel(&self);
}

/// A plain shared cancellation flag.
#[derive(Clone, Default)]
pub struct BasicCanceler {
    flag: Arc<RwLock<bool>>,
}

impl BasicCanceler {
    /// Create a canceler in the not-canceled state.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Canceler for BasicCanceler {
    fn is_canceled(&self) -> bool {
        *self.flag.read().unwrap()
    }

    fn cancel(&self) {
        *self.flag.write().unwrap() = true;
    }
}

/// A canceler that fans cancellation out to dynamically registered children.
pub struct MultiCanceler<C: Canceler> {
    inner: Arc<RwLock<(bool, Vec<C>)>>,
}

impl<C: Canceler> Clone for MultiCanceler<C> {
    fn clone(&self) -> Self {
        MultiCanceler {
            inner: self.inner.clone(),
        }
    }
}

impl<C: Canceler> MultiCanceler<C> {
    /// Create a canceler in the not-canceled state with no children.
    pub fn new() -> Self {
        MultiCanceler {
            inner: Arc::new(RwLock::new((false, vec![]))),
        }
    }

    /// Register a child to be canceled when this canceler is. If the
    /// canceler already fired, the child is canceled on the spot and
    /// `false` is returned.
    pub fn add_canceler(&self, child: C) -> bool {
        let mut guard = self.inner.write().unwrap();
        if guard.0 {
            child.cancel();
            false
        } else {
            guard.1.push(child);
            true
        }
    }

    /// Unregister every child without canceling it. For children that have
    /// run their course: a pid may be reassigned to an unrelated process
    /// once the one it named has been reaped.
    pub fn release(&self) {
        self.inner.write().unwrap().1.clear();
    }
}

impl<C: Canceler> Default for MultiCanceler<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Canceler> Canceler for MultiCanceler<C> {
    fn is_canceled(&self) -> bool {
        self.inner.read().unwrap().0
    }

    fn cancel(&self) {
        let mut guard = self.inner.write().unwrap();
        guard.0 = true;
        for child in guard.1.drain(..) {
            child.cancel();
        }
    }
}

/// The pids of one oracle race, grouped so the race can detach them from
/// the session canceler when it resolves.
pub type OracleCancelers = MultiCanceler<OraclePid>;

impl Canceler for OraclePid {
    fn is_canceled(&self) -> bool {
        false
    }

    fn cancel(&self) {
        // ESRCH is already swallowed; other kill failures leave a process
        // behind but cannot be reported from here
        if let Err(err) = self.kill() {
            log::warn!("failed to kill oracle process on cancel: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_canceler() {
        let c = BasicCanceler::new();
        assert!(!c.is_canceled());
        let other = c.clone();
        other.cancel();
        assert!(c.is_canceled());
    }

    #[test]
    fn test_multi_canceler_fans_out() {
        let multi: MultiCanceler<BasicCanceler> = MultiCanceler::new();
        let a = BasicCanceler::new();
        let b = BasicCanceler::new();
        assert!(multi.add_canceler(a.clone()));
        assert!(multi.add_canceler(b.clone()));
        multi.cancel();
        assert!(multi.is_canceled());
        assert!(a.is_canceled());
        assert!(b.is_canceled());
    }

    #[test]
    fn test_release_detaches_children() {
        let multi: MultiCanceler<BasicCanceler> = MultiCanceler::new();
        let child = BasicCanceler::new();
        assert!(multi.add_canceler(child.clone()));
        multi.release();
        multi.cancel();
        assert!(multi.is_canceled());
        assert!(!child.is_canceled());
    }

    #[test]
    fn test_late_registration_cancels_immediately() {
        let multi: MultiCanceler<BasicCanceler> = MultiCanceler::new();
        multi.cancel();
        let late = BasicCanceler::new();
        assert!(!multi.add_canceler(late.clone()));
        assert!(late.is_canceled());
    }
}
