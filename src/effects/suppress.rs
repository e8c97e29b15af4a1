//! Self-tracking suppression.
//!
//! The transport's own HTTP call would otherwise be captured as telemetry by
//! the very pipeline it serves and re-exported in a loop. While a guard is
//! alive on the current thread, collectors feeding this pipeline must treat
//! telemetry produced on it as excluded.

use std::cell::Cell;
use std::marker::PhantomData;

thread_local! {
    static SUPPRESSION_DEPTH: Cell<u32> = const { Cell::new(0) };
}

/// Marks the current thread as suppressed until dropped.
///
/// Guards nest; suppression ends when the outermost guard is released.
/// The guard is not `Send` and must be dropped on the thread that created it.
#[must_use = "suppression ends when the guard is dropped"]
pub struct SuppressionGuard {
    _not_send: PhantomData<*const ()>,
}

/// Begins a suppression scope on the current thread.
pub fn suppress_self_tracking() -> SuppressionGuard {
    SUPPRESSION_DEPTH.with(|depth| depth.set(depth.get() + 1));
    SuppressionGuard {
        _not_send: PhantomData,
    }
}

/// True while any suppression guard is alive on the current thread.
pub fn is_self_tracking_suppressed() -> bool {
    SUPPRESSION_DEPTH.with(|depth| depth.get() > 0)
}

impl Drop for SuppressionGuard {
    fn drop(&mut self) {
        SUPPRESSION_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{self, AssertUnwindSafe};

    use super::*;

    #[test]
    fn guard_scopes_suppression() {
        assert!(!is_self_tracking_suppressed());
        {
            let _guard = suppress_self_tracking();
            assert!(is_self_tracking_suppressed());
        }
        assert!(!is_self_tracking_suppressed());
    }

    #[test]
    fn guards_nest() {
        let outer = suppress_self_tracking();
        {
            let _inner = suppress_self_tracking();
            assert!(is_self_tracking_suppressed());
        }
        assert!(is_self_tracking_suppressed());
        drop(outer);
        assert!(!is_self_tracking_suppressed());
    }

    #[test]
    fn guard_releases_on_unwind() {
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let _guard = suppress_self_tracking();
            panic!("boom");
        }));
        assert!(result.is_err());
        assert!(!is_self_tracking_suppressed());
    }

    #[test]
    fn suppression_is_per_thread() {
        let _guard = suppress_self_tracking();
        let seen = std::thread::spawn(is_self_tracking_suppressed)
            .join()
            .unwrap();
        assert!(!seen);
    }
}
