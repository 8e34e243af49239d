//! Cache-space allocation.
//!
//! Before a transfer writes to disk it asks the cache-space allocator whether
//! `content_length` bytes may be used. The answer is advisory: a grant does
//! not reserve blocks, it only selects a file sink over an in-memory buffer.
//! Eviction and accounting live behind this interface, outside the crate.

/// Grants or denies disk space for a single transfer.
///
/// Implementations must be safe to call from several transfers at once.
/// Closures of type `Fn(u64) -> bool` implement it directly:
///
/// ```rust
/// use cachedl::download::CacheSpace;
///
/// let small_only = |bytes: u64| bytes <= 1024 * 1024;
/// assert!(small_only.apply_for_space(512));
/// assert!(!small_only.apply_for_space(8 * 1024 * 1024));
/// ```
pub trait CacheSpace: Send + Sync {
    /// Returns true when `bytes` may be written to the disk cache.
    fn apply_for_space(&self, bytes: u64) -> bool;
}

/// Allocator that grants every request.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnlimitedSpace;

impl CacheSpace for UnlimitedSpace {
    fn apply_for_space(&self, _bytes: u64) -> bool {
        true
    }
}

impl<F> CacheSpace for F
where
    F: Fn(u64) -> bool + Send + Sync,
{
    fn apply_for_space(&self, bytes: u64) -> bool {
        self(bytes)
    }
}
