//! Advisory build-progress callback.
//!
//! Called once per inserted key during DAWG construction, and once per
//! exhausted key during the no-DAWG (values-absent) build path. Those are
//! different counts for the same input set and no attempt is made to
//! unify them. Never called from query paths.

/// Single-method progress sink. Implementations must not block for long;
/// the caller pays for whatever the callback costs.
pub trait Progress {
    fn increment(&self, n: u32);
}

/// A `Progress` that discards every increment. Used when the caller
/// passes `None`.
pub struct NullProgress;

impl Progress for NullProgress {
    fn increment(&self, _n: u32) {}
}
