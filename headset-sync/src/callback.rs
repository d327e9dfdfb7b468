/*
 * Copyright 2025 Security Union LLC
 *
 * Licensed under either of
 *
 * * Apache License, Version 2.0
 *   (http://www.apache.org/licenses/LICENSE-2.0)
 * * MIT license
 *   (http://opensource.org/licenses/MIT)
 *
 * at your option.
 *
 * Unless you explicitly state otherwise, any contribution intentionally
 * submitted for inclusion in the work by you, as defined in the Apache-2.0
 * license, shall be dual licensed as above, without any additional terms or
 * conditions.
 */

//! Cloneable notification hook handed to the coordinator by its host.

use std::fmt;
use std::sync::Arc;

/// Shared `Fn` wrapper.
///
/// Backed by an `Arc` so a coordinator holding callbacks can still be moved into
/// a task or behind a mutex on a multi-threaded host.
pub struct Callback<IN, OUT = ()> {
    cb: Arc<dyn Fn(IN) -> OUT + Send + Sync>,
}

impl<IN, OUT, F: Fn(IN) -> OUT + Send + Sync + 'static> From<F> for Callback<IN, OUT> {
    fn from(func: F) -> Self {
        Callback { cb: Arc::new(func) }
    }
}

impl<IN, OUT> Clone for Callback<IN, OUT> {
    fn clone(&self) -> Self {
        Self {
            cb: self.cb.clone(),
        }
    }
}

#[allow(clippy::vtable_address_comparisons)]
impl<IN, OUT> PartialEq for Callback<IN, OUT> {
    fn eq(&self, other: &Callback<IN, OUT>) -> bool {
        Arc::ptr_eq(&self.cb, &other.cb)
    }
}

impl<IN, OUT> fmt::Debug for Callback<IN, OUT> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callback<_>")
    }
}

impl<IN, OUT> Callback<IN, OUT> {
    /// Calls the callback's function.
    pub fn emit(&self, value: IN) -> OUT {
        (*self.cb)(value)
    }
}

impl<IN> Callback<IN> {
    /// Creates a callback that ignores its input, for hosts that do not listen.
    pub fn noop() -> Self {
        Self::from(|_| ())
    }
}

impl<IN> Default for Callback<IN> {
    fn default() -> Self {
        Self::noop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_emit_invokes_function() {
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_clone = hits.clone();
        let cb: Callback<usize> = Callback::from(move |n| {
            hits_clone.fetch_add(n, Ordering::SeqCst);
        });
        cb.emit(2);
        cb.clone().emit(3);
        assert_eq!(hits.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn test_clones_compare_equal() {
        let cb: Callback<u8> = Callback::noop();
        let other: Callback<u8> = Callback::noop();
        assert_eq!(cb, cb.clone());
        assert_ne!(cb, other);
    }
}
