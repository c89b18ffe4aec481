//! Recoverable failures reported by fallible operations.

use core::alloc::Layout;

/// The error type for operations that need to acquire memory.
///
/// Returned before any element is touched; a failed operation leaves the
/// container exactly as it was.
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The requested capacity exceeds the maximum supported by the index
    /// type, or its size in bytes overflows the address space.
    #[error("requested capacity exceeds the representable maximum")]
    CapacityOverflow,
    /// The global allocator could not satisfy the request.
    #[error("memory allocation of {} bytes failed", .layout.size())]
    AllocFailed {
        /// The layout of the rejected allocation request.
        layout: Layout,
    },
}

/// Shorthand for `core::result::Result<T, relovec::Error>`.
pub type Result<T> = core::result::Result<T, Error>;

#[cold]
#[inline(never)]
#[track_caller]
pub(crate) fn handle_error(err: Error) -> ! {
    match err {
        Error::CapacityOverflow => panic!("capacity overflow"),
        Error::AllocFailed { layout } => alloc::alloc::handle_alloc_error(layout),
    }
}
