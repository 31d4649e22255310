//! Debug-only exclusivity guard.
//!
//! The map runs user code (`K: Hash` while hashing a lookup key, `K: Eq`
//! while probing) at moments when its table and list may be mid-update. A
//! key implementation that calls back into the same map from those hooks
//! would observe or corrupt a transiently inconsistent structure. In debug
//! builds the guard panics on such reentry; in release builds it compiles
//! away entirely.

use core::cell::Cell;
use core::marker::PhantomData;

/// Per-map flag tracking whether a public operation is in flight. Guard each
/// entry point with `let _g = self.exclusion.enter();`.
#[derive(Debug)]
pub(crate) struct DebugExclusion {
    #[cfg(debug_assertions)]
    busy: Cell<bool>,
    // Raw-pointer marker keeps the owning map !Send + !Sync, matching the
    // single-threaded contract.
    _single_thread: PhantomData<*mut ()>,
}

impl DebugExclusion {
    pub(crate) const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            busy: Cell::new(false),
            _single_thread: PhantomData,
        }
    }

    /// Mark the map busy until the returned guard drops. Panics in debug
    /// builds if the map is already inside an operation.
    #[inline]
    pub(crate) fn enter(&self) -> ExclusionGuard<'_> {
        #[cfg(debug_assertions)]
        {
            assert!(
                !self.busy.replace(true),
                "reentrant use of FifoHashMap from K::eq or K::hash"
            );
            return ExclusionGuard { owner: self };
        }

        #[cfg(not(debug_assertions))]
        {
            return ExclusionGuard {
                _marker: PhantomData,
            };
        }
    }
}

pub(crate) struct ExclusionGuard<'a> {
    #[cfg(debug_assertions)]
    owner: &'a DebugExclusion,
    #[cfg(not(debug_assertions))]
    _marker: PhantomData<&'a ()>,
}

impl Drop for ExclusionGuard<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        self.owner.busy.set(false);
    }
}
