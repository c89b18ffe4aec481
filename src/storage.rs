//! Index types and the raw memory block backing [`DynArray`](crate::DynArray).

use crate::error::{handle_error, Error, Result};

use alloc::alloc::{alloc, dealloc, Layout};
use core::marker::PhantomData;
use core::mem;
use core::ptr::NonNull;

/// Two-way conversion between `Self` and `usize`.
///
/// # Safety
/// Implementors must ensure the conversion functions are each other's inverse,
/// i.e. `Capacity::from_usize(i).as_usize()` must either evaluate to `i`, or
/// panic for all `usize` values. `MAX_REPRESENTABLE` must be the largest `i`
/// for which `from_usize(i)` does not panic.
///
/// Using [`index_type!`] should be preferred over implementing this manually.
pub unsafe trait Capacity: Copy {
    /// The zero index.
    const ZERO: Self;
    /// The largest `usize` value that can be converted into `Self`.
    const MAX_REPRESENTABLE: usize;

    /// Convert a `usize` into `Self`.
    fn from_usize(i: usize) -> Self;
    /// Convert `self` into `usize`.
    fn as_usize(&self) -> usize;
}

#[inline(never)]
#[cold]
#[track_caller]
fn from_value_out_of_range(i: usize) -> ! {
    panic!("called `from_usize` with value out of range (is {})", i)
}

#[inline(never)]
#[cold]
#[track_caller]
fn into_value_out_of_range() -> ! {
    panic!("called `as_usize` with value out of range")
}

macro_rules! impl_capacity {
    ($($t:ty),*) => {$(
        unsafe impl Capacity for $t {
            const ZERO: Self = 0;
            const MAX_REPRESENTABLE: usize = if (<$t>::MAX as u128) < (usize::MAX as u128) {
                <$t>::MAX as usize
            } else {
                usize::MAX
            };

            #[inline]
            #[track_caller]
            fn from_usize(i: usize) -> Self {
                match i.try_into() {
                    Ok(t) => t,
                    Err(_) => from_value_out_of_range(i),
                }
            }

            #[inline]
            #[track_caller]
            fn as_usize(&self) -> usize {
                match (*self).try_into() {
                    Ok(i) => i,
                    Err(_) => into_value_out_of_range(),
                }
            }
        }
    )*};
}

impl_capacity!(u8, u16, u32, u64);

unsafe impl Capacity for usize {
    const ZERO: Self = 0;
    const MAX_REPRESENTABLE: usize = usize::MAX;

    #[inline]
    fn from_usize(i: usize) -> Self {
        i
    }

    #[inline]
    fn as_usize(&self) -> usize {
        *self
    }
}

/// Generates a newtype wrapping an implementor of [`Capacity`].
///
/// This can help in avoiding use of the wrong index with a [`DynArray`](crate::DynArray).
///
/// # Examples
/// ```compile_fail
/// use relovec::{index_type, DynArray};
///
/// index_type! { pub IndexA: u8 };
/// index_type! { IndexB: u8 };
///
/// let mut vec_a = DynArray::<u32, IndexA>::new();
/// for i in 0..20 { vec_a.push(i); }
///
/// let mut vec_b = DynArray::<u32, IndexB>::new();
/// for i in 0..30 { vec_b.push(i * 2); }
///
/// let a = vec_a[IndexA(10)];
/// let b = vec_b[IndexB(15)];
/// let c = vec_a[IndexB(25)];
/// //      ^^^^^^^^^^^^^^^^^ `DynArray<...>` cannot be indexed by `IndexB`
/// ```
#[macro_export]
macro_rules! index_type {
    ($v:vis $name:ident: $repr:ty) => {
        #[derive(
            core::marker::Copy,
            core::clone::Clone,
            core::default::Default,
            core::fmt::Debug,
            core::hash::Hash,
            core::cmp::PartialEq,
            core::cmp::Eq,
            core::cmp::PartialOrd,
            core::cmp::Ord)]
        $v struct $name($repr);

        unsafe impl $crate::storage::Capacity for $name {
            const ZERO: Self = Self(<$repr as $crate::storage::Capacity>::ZERO);
            const MAX_REPRESENTABLE: usize = <$repr as $crate::storage::Capacity>::MAX_REPRESENTABLE;

            #[inline]
            #[track_caller]
            fn from_usize(i: usize) -> Self {
                Self(<$repr as $crate::storage::Capacity>::from_usize(i))
            }

            #[inline]
            #[track_caller]
            fn as_usize(&self) -> usize {
                <$repr as $crate::storage::Capacity>::as_usize(&self.0)
            }
        }
    }
}

/// An owned, allocated but uninitialized memory region with room for a fixed
/// number of `T`.
///
/// A `RawBlock` only knows its capacity; it never constructs or drops the
/// values stored in it. Dropping the block returns the region to the global
/// allocator without running any element destructors, so whoever writes into
/// the block is responsible for dropping what it wrote.
///
/// A block with capacity 0 does not allocate and is referred to as the
/// *null* block. Blocks of zero-sized types never allocate either, but still
/// report the capacity they were created with.
///
/// # Examples
/// ```
/// use relovec::storage::RawBlock;
///
/// let mut a = RawBlock::<u32>::allocate(4);
/// let mut b = RawBlock::<u32>::new();
/// assert_eq!((a.capacity(), b.capacity()), (4, 0));
///
/// a.exchange(&mut b);
/// assert!(a.is_null());
/// assert_eq!(b.capacity(), 4);
/// ```
pub struct RawBlock<T> {
    ptr: NonNull<T>,
    cap: usize,
    elem: PhantomData<T>, // Indicates this block logically owns values of T
}

unsafe impl<T: Send> Send for RawBlock<T> {}
unsafe impl<T: Sync> Sync for RawBlock<T> {}

impl<T> RawBlock<T> {
    /// Constructs the null block, which owns no memory.
    #[inline]
    pub const fn new() -> Self {
        RawBlock {
            ptr: NonNull::dangling(),
            cap: 0,
            elem: PhantomData,
        }
    }

    /// Allocates a block with room for exactly `capacity` elements, returning
    /// the null block if `capacity == 0`.
    ///
    /// # Errors
    /// Returns [`Error::CapacityOverflow`] if the size of the region in bytes
    /// would overflow `isize`, and [`Error::AllocFailed`] if the allocator
    /// cannot satisfy the request.
    pub fn try_allocate(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Ok(Self::new());
        }

        let layout = Layout::array::<T>(capacity).map_err(|_| Error::CapacityOverflow)?;
        if layout.size() == 0 {
            return Ok(RawBlock {
                ptr: NonNull::dangling(),
                cap: capacity,
                elem: PhantomData,
            });
        }

        let ptr = unsafe { alloc(layout) }.cast::<T>();
        let ptr = NonNull::new(ptr).ok_or(Error::AllocFailed { layout })?;
        Ok(RawBlock {
            ptr,
            cap: capacity,
            elem: PhantomData,
        })
    }

    /// Allocates a block with room for exactly `capacity` elements.
    ///
    /// # Panics
    /// Panics if the size of the region overflows, and aborts through
    /// [`handle_alloc_error`](alloc::alloc::handle_alloc_error) if the
    /// allocator fails. See [`try_allocate`](RawBlock::try_allocate) for a
    /// checked version.
    #[track_caller]
    pub fn allocate(capacity: usize) -> Self {
        match Self::try_allocate(capacity) {
            Ok(block) => block,
            Err(e) => handle_error(e),
        }
    }

    /// Returns the number of elements the block has room for.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.cap
    }

    /// Returns `true` if this is the null block.
    #[inline]
    pub fn is_null(&self) -> bool {
        self.cap == 0
    }

    /// Returns the memory region to the allocator, leaving the null block in
    /// its place.
    ///
    /// Values still stored in the block are leaked, not dropped.
    pub fn release(&mut self) {
        if self.cap == 0 {
            return;
        }

        let layout = Layout::array::<T>(self.cap).unwrap_or_else(|_| unreachable!());
        if layout.size() != 0 {
            unsafe { dealloc(self.ptr.as_ptr().cast(), layout) };
        }

        self.ptr = NonNull::dangling();
        self.cap = 0;
    }

    /// Swaps the regions owned by `self` and `other`.
    #[inline]
    pub fn exchange(&mut self, other: &mut Self) {
        mem::swap(&mut self.ptr, &mut other.ptr);
        mem::swap(&mut self.cap, &mut other.cap);
    }

    /// Transfers ownership of the region into a new block, leaving the null
    /// block in `self`.
    #[inline]
    pub fn take(&mut self) -> Self {
        mem::replace(self, Self::new())
    }

    /// Returns a pointer to the first slot.
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    /// Returns a mutable pointer to the first slot.
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr.as_ptr()
    }

    /// Returns a pointer to the slot at `offset`.
    ///
    /// `offset == capacity()` is allowed and yields the one-past-the-end
    /// pointer. The slot may not be initialized.
    #[inline]
    pub fn ptr_at(&self, offset: usize) -> *const T {
        debug_assert!(offset <= self.cap);
        self.ptr.as_ptr().wrapping_add(offset)
    }

    /// Returns a mutable pointer to the slot at `offset`.
    ///
    /// `offset == capacity()` is allowed and yields the one-past-the-end
    /// pointer. The slot may not be initialized.
    #[inline]
    pub fn mut_ptr_at(&mut self, offset: usize) -> *mut T {
        debug_assert!(offset <= self.cap);
        self.ptr.as_ptr().wrapping_add(offset)
    }
}

impl<T> Default for RawBlock<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for RawBlock<T> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<T> core::fmt::Debug for RawBlock<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RawBlock")
            .field("ptr", &self.ptr)
            .field("capacity", &self.cap)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_capacity_is_null() {
        let block = RawBlock::<u64>::allocate(0);
        assert!(block.is_null());
        assert_eq!(block.capacity(), 0);
        assert_eq!(block.as_ptr(), NonNull::<u64>::dangling().as_ptr());
    }

    #[test]
    fn allocation_is_sized_in_elements() {
        let mut block = RawBlock::<u64>::allocate(16);
        assert_eq!(block.capacity(), 16);
        assert_eq!(block.as_ptr() as usize % mem::align_of::<u64>(), 0);

        for i in 0..16 {
            unsafe { block.mut_ptr_at(i).write(i as u64 * 3) };
        }
        for i in 0..16 {
            assert_eq!(unsafe { block.ptr_at(i).read() }, i as u64 * 3);
        }

        let end = block.ptr_at(16) as usize;
        assert_eq!(end - block.as_ptr() as usize, 16 * mem::size_of::<u64>());
    }

    #[test]
    fn zero_sized_types_never_allocate() {
        let block = RawBlock::<()>::allocate(1000);
        assert_eq!(block.capacity(), 1000);
        assert!(!block.is_null());
        assert_eq!(block.as_ptr(), NonNull::<()>::dangling().as_ptr());
    }

    #[test]
    fn oversized_requests_are_rejected() {
        let result = RawBlock::<u64>::try_allocate(usize::MAX / 4);
        assert_eq!(result.unwrap_err(), Error::CapacityOverflow);
    }

    #[test]
    fn take_leaves_null_block_behind() {
        let mut a = RawBlock::<u32>::allocate(8);
        let ptr = a.as_ptr();

        let b = a.take();
        assert!(a.is_null());
        assert_eq!(b.capacity(), 8);
        assert_eq!(b.as_ptr(), ptr);

        let c = b;
        assert_eq!(c.as_ptr(), ptr);
    }

    #[test]
    fn exchange_swaps_ownership() {
        let mut a = RawBlock::<u32>::allocate(2);
        let mut b = RawBlock::<u32>::allocate(5);
        let (pa, pb) = (a.as_ptr(), b.as_ptr());

        a.exchange(&mut b);
        assert_eq!((a.capacity(), a.as_ptr()), (5, pb));
        assert_eq!((b.capacity(), b.as_ptr()), (2, pa));
    }

    #[test]
    fn release_is_idempotent() {
        let mut block = RawBlock::<u16>::allocate(3);
        block.release();
        assert!(block.is_null());
        block.release();
        assert!(block.is_null());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic]
    fn offset_past_capacity_is_a_fault() {
        let block = RawBlock::<u8>::allocate(4);
        let _ = block.ptr_at(5);
    }

    #[test]
    fn capacity_conversions() {
        assert_eq!(<u8 as Capacity>::MAX_REPRESENTABLE, 255);
        assert_eq!(<u16 as Capacity>::MAX_REPRESENTABLE, 65535);
        assert_eq!(<usize as Capacity>::MAX_REPRESENTABLE, usize::MAX);
        assert_eq!(u8::from_usize(200).as_usize(), 200);

        index_type! { Small: u8 };
        assert_eq!(Small::from_usize(7), Small(7));
        assert_eq!(Small::MAX_REPRESENTABLE, 255);
        assert_eq!(Small::ZERO.as_usize(), 0);
    }

    #[test]
    #[should_panic]
    fn capacity_conversion_out_of_range() {
        let _ = u8::from_usize(256);
    }
}
