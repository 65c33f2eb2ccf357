//! The one parallelism primitive of the crate.
//!
//! Transform and accumulate split their work into contiguous blocks of
//! the outermost output dimension and run each block on the rayon pool.
//! Everything else in the crate is written against `parallel_for` so the
//! scheduling policy lives in one place.

use std::ops::Range;

use rayon::prelude::*;

/// Minimum number of elements a transform processes per task.
pub(crate) const TRANSFORM_GRAIN: usize = 16 * 1024;

/// Run `body` over `0..len` in contiguous blocks of at least `grain`
/// elements. Blocks are disjoint; the body runs once per block, possibly
/// concurrently and in any order. With a single block the body runs on
/// the calling thread.
pub(crate) fn parallel_for<F>(len: usize, grain: usize, body: F)
where F: Fn(Range<usize>) + Send + Sync
{
    if len == 0 {
        return;
    }
    let grain = grain.max(1);
    let blocks = len.div_ceil(grain);
    if blocks <= 1 {
        body(0..len);
        return;
    }
    (0..blocks).into_par_iter().for_each(|block| {
        let begin = block * grain;
        let end = (begin + grain).min(len);
        body(begin..end);
    });
}

/// An unconditionally `Send + Sync` raw pointer.
///
/// Workers receive disjoint offset ranges into one output buffer; the
/// engine guarantees disjointness by partitioning the outermost output
/// dimension, which this wrapper cannot express to the compiler.
#[derive(Copy, Clone)]
pub(crate) struct SendPtr<T>(*mut T);

unsafe impl<T> Send for SendPtr<T> {}
unsafe impl<T> Sync for SendPtr<T> {}

impl<T> SendPtr<T>
{
    /// Callers must uphold that concurrent users write disjoint offsets.
    pub(crate) fn new(ptr: *mut T) -> SendPtr<T>
    {
        SendPtr(ptr)
    }

    pub(crate) fn get(self) -> *mut T
    {
        self.0
    }
}
