//! A contiguous growable array type over raw memory.
//!
//! [`DynArray`] has O(1) indexing, amortized O(1) push to the back, and
//! positional insertion and removal that shift the elements behind them.
//!
//! The array is generic over its [index type](crate::storage::Capacity),
//! which defaults to `usize`. Narrower index types bound the capacity:
//! growing past `I::MAX_REPRESENTABLE` elements fails with
//! [`Error::CapacityOverflow`].
//!
//! # Growth
//! When an insertion finds the array full, a new [`RawBlock`] with twice the
//! capacity (or one slot, starting from empty) is allocated. The new element is
//! constructed in its final slot of the new block *before* any existing
//! element is relocated, so a panicking constructor leaves the array exactly
//! as it was. Relocation itself is a bitwise move that cannot fail; the old
//! block is committed away with [`RawBlock::exchange`] and released without
//! dropping the moved-from slots.
//!
//! Every operation that may allocate has a `try_` counterpart returning
//! [`Result`](crate::Result); allocation failures are reported before any
//! element is touched.

use crate::error::{handle_error, Error, Result};
use crate::storage::{Capacity, RawBlock};

use core::cmp::{Eq, Ord, Ordering, PartialEq, PartialOrd};
use core::hash::{Hash, Hasher};
use core::iter::{
    DoubleEndedIterator, ExactSizeIterator, FromIterator, FusedIterator,
    IntoIterator as IntoIter, Iterator,
};
use core::mem::{self, ManuallyDrop};
use core::ptr;

/// A contiguous growable array type.
///
/// Owns exactly one [`RawBlock`]; slots `[0, len)` hold live values, slots
/// `[len, capacity)` are uninitialized.
///
/// See the [module-level documentation](crate::vec) for more.
pub struct DynArray<T, I: Capacity = usize> {
    len: I,
    buf: RawBlock<T>,
}

impl<T, I: Capacity> DynArray<T, I> {
    /// Constructs a new, empty `DynArray` without allocating.
    ///
    /// # Examples
    /// ```
    /// let arr = relovec::DynArray::<u32>::new();
    /// assert_eq!(arr.len(), 0);
    /// assert_eq!(arr.capacity(), 0);
    /// ```
    #[inline]
    pub const fn new() -> Self {
        DynArray {
            len: I::ZERO,
            buf: RawBlock::new(),
        }
    }

    /// Constructs a new, empty `DynArray` with room for exactly `capacity`
    /// elements.
    pub fn try_with_capacity(capacity: I) -> Result<Self> {
        Ok(DynArray {
            len: I::ZERO,
            buf: RawBlock::try_allocate(capacity.as_usize())?,
        })
    }

    /// Constructs a new, empty `DynArray` with room for exactly `capacity`
    /// elements.
    ///
    /// # Panics
    /// Panics if the allocation size overflows. See
    /// [`try_with_capacity`](DynArray::try_with_capacity) for a checked version.
    #[track_caller]
    pub fn with_capacity(capacity: I) -> Self {
        match Self::try_with_capacity(capacity) {
            Ok(arr) => arr,
            Err(e) => handle_error(e),
        }
    }

    /// Returns the number of elements the array can hold without reallocating.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Returns the number of elements in the array, also referred to as its *length*.
    #[inline]
    pub fn len(&self) -> usize {
        self.len.as_usize()
    }

    /// Returns `true` if the array contains no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len.as_usize() == 0
    }

    /// Returns `true` if the next insertion will have to reallocate.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len.as_usize() == self.buf.capacity()
    }

    /// Returns the position of the first element.
    #[inline]
    pub fn begin(&self) -> I {
        I::ZERO
    }

    /// Returns the position one past the last element.
    ///
    /// This is the only valid insertion position that is not a valid index.
    #[inline]
    pub fn end(&self) -> I {
        self.len
    }

    /// Extracts a slice containing the entire array.
    ///
    /// Equivalent to `&s[..]`.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        self
    }

    /// Extracts a mutable slice of the entire array.
    ///
    /// Equivalent to `&mut s[..]`.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self
    }

    /// Returns a raw pointer to the array's buffer.
    ///
    /// The pointer is dangling, but non-null, while the capacity is zero.
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.buf.as_ptr()
    }

    /// Returns a raw mutable pointer to the array's buffer.
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.buf.as_mut_ptr()
    }

    /// Returns a reference to the element at the specified index, or [`None`]
    /// if the index is out of bounds.
    ///
    /// # Examples
    /// ```
    /// let mut arr = relovec::DynArray::<u32>::new();
    /// arr.push(1); arr.push(2); arr.push(3);
    /// assert_eq!(arr.get(1), Some(&2));
    /// assert_eq!(arr.get(3), None);
    /// ```
    #[inline]
    pub fn get(&self, index: I) -> Option<&T> {
        let index = index.as_usize();
        if self.len() <= index {
            return None;
        }

        unsafe { Some(&*self.buf.ptr_at(index)) }
    }

    /// Returns a mutable reference to the element at the specified index, or
    /// [`None`] if the index is out of bounds.
    #[inline]
    pub fn get_mut(&mut self, index: I) -> Option<&mut T> {
        let index = index.as_usize();
        if self.len() <= index {
            return None;
        }

        unsafe { Some(&mut *self.buf.mut_ptr_at(index)) }
    }

    /// Reserves capacity for exactly `capacity` elements in total.
    ///
    /// Does nothing if the capacity is already sufficient. Otherwise all
    /// elements are relocated into a new block; length and element order are
    /// unchanged either way.
    ///
    /// # Errors
    /// Returns an error if the allocation fails, in which case the array is
    /// left untouched.
    ///
    /// # Examples
    /// ```
    /// let mut arr = relovec::DynArray::<u32>::new();
    /// arr.push(1);
    /// arr.try_reserve(10).unwrap();
    /// assert_eq!(arr.capacity(), 10);
    ///
    /// arr.try_reserve(5).unwrap();
    /// assert_eq!(arr.capacity(), 10);
    /// assert_eq!(arr, &[1][..]);
    /// ```
    pub fn try_reserve(&mut self, capacity: I) -> Result<()> {
        let new_cap = capacity.as_usize();
        if new_cap <= self.capacity() {
            return Ok(());
        }

        let mut block = RawBlock::try_allocate(new_cap)?;
        unsafe {
            self.relocate_into(&mut block, self.len(), 0);
        }
        self.buf.exchange(&mut block);
        Ok(())
    }

    /// Reserves capacity for exactly `capacity` elements in total.
    ///
    /// # Panics
    /// Panics if the allocation size overflows. See
    /// [`try_reserve`](DynArray::try_reserve) for a checked version.
    #[track_caller]
    pub fn reserve(&mut self, capacity: I) {
        if let Err(e) = self.try_reserve(capacity) {
            handle_error(e);
        }
    }

    /// Resizes the array in place so that its length equals `new_len`.
    ///
    /// Capacity for `new_len` elements is reserved first. Excess elements are
    /// dropped; missing ones are produced by calling `f` once per new slot,
    /// in order. If `f` panics, the elements created so far remain in the
    /// array.
    pub fn try_resize_with<F: FnMut() -> T>(&mut self, new_len: I, mut f: F) -> Result<()> {
        self.try_reserve(new_len)?;

        let target = new_len.as_usize();
        if target < self.len() {
            self.truncate(new_len);
        } else {
            while self.len() < target {
                unsafe { self.push_unchecked(f()) };
            }
        }

        Ok(())
    }

    /// Resizes the array in place so that its length equals `new_len`.
    ///
    /// # Panics
    /// Panics if the allocation size overflows. See
    /// [`try_resize_with`](DynArray::try_resize_with) for a checked version.
    #[track_caller]
    pub fn resize_with<F: FnMut() -> T>(&mut self, new_len: I, f: F) {
        if let Err(e) = self.try_resize_with(new_len, f) {
            handle_error(e);
        }
    }

    /// Shortens the array, keeping the first `len` elements and dropping the rest.
    ///
    /// If `len` is greater than the array's current length, this has no effect.
    ///
    /// # Examples
    /// ```
    /// let mut arr = relovec::DynArray::<u32>::from(&[1, 2, 3, 4][..]);
    ///
    /// arr.truncate(6);
    /// assert_eq!(arr, &[1, 2, 3, 4][..]);
    ///
    /// arr.truncate(2);
    /// assert_eq!(arr, &[1, 2][..]);
    /// ```
    pub fn truncate(&mut self, len: I) {
        let new_len = len.as_usize();
        let old_len = self.len();

        if new_len >= old_len {
            return;
        }

        self.len = len;
        unsafe {
            let tail = ptr::slice_from_raw_parts_mut(self.buf.mut_ptr_at(new_len), old_len - new_len);
            ptr::drop_in_place(tail);
        }
    }

    /// Clears the array, dropping all values but keeping the capacity.
    ///
    /// Equivalent to `s.truncate(0)`.
    #[inline]
    pub fn clear(&mut self) {
        self.truncate(I::ZERO);
    }

    /// Constructs a new element at the back of the array, returning a
    /// reference to it.
    ///
    /// The element is produced by `f`. If the array is full, `f` runs after
    /// the new block is allocated and before any existing element is moved;
    /// if it panics, the array is left as it was.
    ///
    /// # Errors
    /// Returns an error if growing the array fails. `f` is not called in
    /// that case.
    pub fn try_emplace_back_with<F: FnOnce() -> T>(&mut self, f: F) -> Result<&mut T> {
        let end = self.end();
        self.try_emplace_with(end, f)?;
        unsafe { Ok(&mut *self.buf.mut_ptr_at(end.as_usize())) }
    }

    /// Constructs a new element at the back of the array, returning a
    /// reference to it.
    ///
    /// # Panics
    /// Panics if growing the array fails. See
    /// [`try_emplace_back_with`](DynArray::try_emplace_back_with) for a
    /// checked version.
    #[track_caller]
    pub fn emplace_back_with<F: FnOnce() -> T>(&mut self, f: F) -> &mut T {
        let end = self.end();
        self.emplace_with(end, f);
        unsafe { &mut *self.buf.mut_ptr_at(end.as_usize()) }
    }

    /// Appends an element to the back of the array, returning a reference to
    /// it, or an error if the array was full and could not grow.
    ///
    /// # Examples
    /// ```
    /// let mut arr = relovec::DynArray::<u32, u8>::new();
    /// for i in 0..255 {
    ///     assert!(arr.try_push(i).is_ok());
    /// }
    /// assert_eq!(arr.try_push(255), Err(relovec::Error::CapacityOverflow));
    /// ```
    #[inline]
    pub fn try_push(&mut self, value: T) -> Result<&mut T> {
        self.try_emplace_back_with(move || value)
    }

    /// Appends an element to the back of the array, returning a reference to it.
    ///
    /// # Panics
    /// Panics if growing the array fails. See [`try_push`](DynArray::try_push)
    /// for a checked version.
    ///
    /// # Examples
    /// ```
    /// let mut arr = relovec::DynArray::<u32>::new();
    /// *arr.push(1) += 10;
    /// arr.push(2);
    /// assert_eq!(arr, &[11, 2][..]);
    /// ```
    #[inline]
    #[track_caller]
    pub fn push(&mut self, value: T) -> &mut T {
        self.emplace_back_with(move || value)
    }

    /// Constructs a new element at position `index`, shifting all elements
    /// after it to the right. Returns the position of the new element.
    ///
    /// If the array is full, the new element is constructed in its final
    /// slot of a freshly allocated block, and the elements before and after
    /// it are moved around it. Otherwise `f` runs first, and only then are
    /// the trailing elements shifted to make room. A panic in `f` leaves the
    /// array untouched either way.
    ///
    /// # Errors
    /// Returns an error if growing the array fails. `f` is not called in
    /// that case.
    ///
    /// # Panics
    /// Panics if `index > len`.
    pub fn try_emplace_with<F: FnOnce() -> T>(&mut self, index: I, f: F) -> Result<I> {
        #[cold]
        #[inline(never)]
        fn assert_failed(index: usize, len: usize) -> ! {
            panic!(
                "insertion index (is {}) should be <= len (is {})",
                index, len
            );
        }

        let idx = index.as_usize();
        let len = self.len();
        if idx > len {
            assert_failed(idx, len);
        }

        if len == self.capacity() {
            let mut block = RawBlock::<T>::try_allocate(self.grown_capacity()?)?;
            unsafe {
                block.mut_ptr_at(idx).write(f());
                self.relocate_into(&mut block, idx, 1);
            }
            self.buf.exchange(&mut block);
        } else {
            let value = f();
            unsafe {
                let p = self.buf.mut_ptr_at(idx);
                ptr::copy(p, p.add(1), len - idx);
                p.write(value);
            }
        }

        self.len = I::from_usize(len + 1);
        Ok(index)
    }

    /// Constructs a new element at position `index`, shifting all elements
    /// after it to the right. Returns the position of the new element.
    ///
    /// # Panics
    /// Panics if `index > len`, or if growing the array fails. See
    /// [`try_emplace_with`](DynArray::try_emplace_with) for a checked version.
    #[track_caller]
    pub fn emplace_with<F: FnOnce() -> T>(&mut self, index: I, f: F) -> I {
        match self.try_emplace_with(index, f) {
            Ok(pos) => pos,
            Err(e) => handle_error(e),
        }
    }

    /// Inserts an element at position `index`, shifting all elements after it
    /// to the right. Returns the position of the new element, or an error if
    /// the array was full and could not grow.
    ///
    /// # Panics
    /// Panics if `index > len`.
    #[inline]
    pub fn try_insert(&mut self, index: I, element: T) -> Result<I> {
        self.try_emplace_with(index, move || element)
    }

    /// Inserts an element at position `index`, shifting all elements after it
    /// to the right. Returns the position of the new element.
    ///
    /// # Panics
    /// Panics if `index > len`, or if growing the array fails.
    ///
    /// # Examples
    /// ```
    /// let mut arr = relovec::DynArray::<u32>::from(&[10, 20, 30][..]);
    /// let pos = arr.insert(arr.begin() + 1, 15);
    /// assert_eq!(arr[pos], 15);
    /// assert_eq!(arr, &[10, 15, 20, 30][..]);
    /// ```
    #[inline]
    #[track_caller]
    pub fn insert(&mut self, index: I, element: T) -> I {
        self.emplace_with(index, move || element)
    }

    /// Removes and returns the element at position `index`, shifting all
    /// elements after it to the left.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    ///
    /// # Examples
    /// ```
    /// let mut arr = relovec::DynArray::<u32>::from(&[1, 2, 3][..]);
    /// assert_eq!(arr.remove(0), 1);
    /// assert_eq!(arr, &[2, 3][..]);
    /// ```
    pub fn remove(&mut self, index: I) -> T {
        #[cold]
        #[inline(never)]
        fn assert_failed(idx: usize, len: usize) -> ! {
            panic!("removal index (is {}) should be < len (is {})", idx, len);
        }

        let idx = index.as_usize();
        let len = self.len();
        if idx >= len {
            assert_failed(idx, len);
        }

        unsafe {
            let p = self.buf.mut_ptr_at(idx);
            let ret = ptr::read(p);
            ptr::copy(p.add(1), p, len - idx - 1);
            self.len = I::from_usize(len - 1);
            ret
        }
    }

    /// Drops the element at position `index`, shifting all elements after it
    /// to the left. Returns the position of the element that now occupies the
    /// erased slot, which is [`end`](DynArray::end) if the last element was
    /// erased.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    ///
    /// # Examples
    /// ```
    /// let mut arr = relovec::DynArray::<u32>::from(&[1, 2, 3][..]);
    /// let pos = arr.erase(1);
    /// assert_eq!(arr[pos], 3);
    /// assert_eq!(arr.erase(pos), arr.end());
    /// assert_eq!(arr, &[1][..]);
    /// ```
    pub fn erase(&mut self, index: I) -> I {
        drop(self.remove(index));
        index
    }

    /// Removes an element from the array and returns it.
    ///
    /// The removed element is replaced by the last element of the array. This
    /// does not preserve ordering, but it is O(1).
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn swap_remove(&mut self, index: I) -> T {
        #[cold]
        #[inline(never)]
        fn assert_failed(idx: usize, len: usize) -> ! {
            panic!(
                "swap_remove index (is {}) should be < len (is {})",
                idx, len
            );
        }

        let idx = index.as_usize();
        let len = self.len();
        if idx >= len {
            assert_failed(idx, len);
        }

        unsafe {
            let last = self.buf.ptr_at(len - 1).read();
            let hole = self.buf.mut_ptr_at(idx);
            self.len = I::from_usize(len - 1);
            ptr::replace(hole, last)
        }
    }

    /// Removes the last element from the array and returns it, or [`None`] if it is empty.
    ///
    /// # Examples
    /// ```
    /// let mut arr = relovec::DynArray::<u32>::from(&[1, 2, 3][..]);
    /// assert_eq!(arr.pop(), Some(3));
    /// assert_eq!(arr, &[1, 2][..]);
    /// ```
    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }

        self.len = I::from_usize(self.len() - 1);
        unsafe { Some(self.buf.ptr_at(self.len()).read()) }
    }

    /// Swaps two elements in the array.
    ///
    /// # Panics
    /// Panics if either argument is out of bounds.
    #[inline]
    pub fn swap(&mut self, fst: I, snd: I) {
        let fst = fst.as_usize();
        let snd = snd.as_usize();
        self.as_mut_slice().swap(fst, snd);
    }

    /// Exchanges the contents of two arrays, including their storage.
    ///
    /// This never touches individual elements.
    ///
    /// # Examples
    /// ```
    /// let mut a = relovec::DynArray::<u32>::from(&[1, 2][..]);
    /// let mut b = relovec::DynArray::<u32>::new();
    /// a.exchange(&mut b);
    /// assert!(a.is_empty());
    /// assert_eq!(a.capacity(), 0);
    /// assert_eq!(b, &[1, 2][..]);
    /// ```
    #[inline]
    pub fn exchange(&mut self, other: &mut Self) {
        self.buf.exchange(&mut other.buf);
        mem::swap(&mut self.len, &mut other.len);
    }

    /// Capacity to grow to when inserting into a full array.
    fn grown_capacity(&self) -> Result<usize> {
        let cap = self.capacity();
        let doubled = if cap == 0 { 1 } else { cap.saturating_mul(2) };
        let new_cap = usize::min(doubled, I::MAX_REPRESENTABLE);
        if new_cap <= cap {
            return Err(Error::CapacityOverflow);
        }
        Ok(new_cap)
    }

    /// Moves all live elements into `dst`, leaving `gap` uninitialized slots
    /// starting at `at`.
    ///
    /// # Safety
    /// `dst` must be a distinct block with room for `len + gap` elements, and
    /// `at` must not exceed `len`. Afterwards the elements are owned by `dst`;
    /// the source slots must not be dropped again.
    unsafe fn relocate_into(&self, dst: &mut RawBlock<T>, at: usize, gap: usize) {
        let len = self.len();
        debug_assert!(at <= len);
        debug_assert!(len + gap <= dst.capacity());

        let src = self.buf.as_ptr();
        let dst = dst.as_mut_ptr();
        ptr::copy_nonoverlapping(src, dst, at);
        ptr::copy_nonoverlapping(src.add(at), dst.add(at + gap), len - at);
    }

    /// Writes `value` into the first spare slot.
    ///
    /// # Safety
    /// The array must not be full.
    #[inline]
    unsafe fn push_unchecked(&mut self, value: T) {
        let len = self.len();
        debug_assert!(len < self.capacity());
        self.buf.mut_ptr_at(len).write(value);
        self.len = I::from_usize(len + 1);
    }
}

impl<T: Default, I: Capacity> DynArray<T, I> {
    /// Constructs an array of exactly `len` default values, with no spare
    /// capacity.
    ///
    /// If `T::default` panics, the values created so far are dropped and the
    /// block is released.
    pub fn try_with_default(len: I) -> Result<Self> {
        let mut ret = Self::try_with_capacity(len)?;
        for _ in 0..len.as_usize() {
            unsafe { ret.push_unchecked(T::default()) };
        }
        Ok(ret)
    }

    /// Constructs an array of exactly `len` default values.
    ///
    /// # Panics
    /// Panics if the allocation size overflows.
    ///
    /// # Examples
    /// ```
    /// let arr = relovec::DynArray::<u32>::with_default(3);
    /// assert_eq!(arr, &[0, 0, 0][..]);
    /// assert_eq!(arr.capacity(), 3);
    /// ```
    #[track_caller]
    pub fn with_default(len: I) -> Self {
        match Self::try_with_default(len) {
            Ok(arr) => arr,
            Err(e) => handle_error(e),
        }
    }

    /// Resizes the array, filling new slots with default values.
    pub fn try_resize_default(&mut self, new_len: I) -> Result<()> {
        self.try_resize_with(new_len, T::default)
    }

    /// Resizes the array, filling new slots with default values.
    ///
    /// # Examples
    /// ```
    /// let mut arr = relovec::DynArray::<u32>::from(&[1, 2, 3][..]);
    /// arr.resize_default(5);
    /// assert_eq!(arr, &[1, 2, 3, 0, 0][..]);
    /// arr.resize_default(1);
    /// assert_eq!(arr, &[1][..]);
    /// ```
    #[track_caller]
    pub fn resize_default(&mut self, new_len: I) {
        self.resize_with(new_len, T::default)
    }
}

impl<T: Clone, I: Capacity> DynArray<T, I> {
    /// Resizes the array, filling new slots with clones of `value`.
    pub fn try_resize(&mut self, new_len: I, value: T) -> Result<()> {
        self.try_resize_with(new_len, || value.clone())
    }

    /// Resizes the array, filling new slots with clones of `value`.
    #[track_caller]
    pub fn resize(&mut self, new_len: I, value: T) {
        self.resize_with(new_len, || value.clone())
    }

    /// Clones the array into storage of exactly `self.len()` elements.
    ///
    /// If cloning an element panics, the clones made so far are dropped and
    /// the new block is released; `self` is never modified.
    pub fn try_clone(&self) -> Result<Self> {
        let mut ret = Self::try_with_capacity(self.len)?;
        for item in self.iter() {
            unsafe { ret.push_unchecked(item.clone()) };
        }
        Ok(ret)
    }
}

impl<T, I: Capacity> Drop for DynArray<T, I> {
    fn drop(&mut self) {
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(
                self.buf.as_mut_ptr(),
                self.len(),
            ))
        }
    }
}

impl<T, I: Capacity> Default for DynArray<T, I> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone, I: Capacity> Clone for DynArray<T, I> {
    #[track_caller]
    fn clone(&self) -> Self {
        match self.try_clone() {
            Ok(arr) => arr,
            Err(e) => handle_error(e),
        }
    }

    /// Overwrites `self` with a copy of `source`.
    ///
    /// If `source` does not fit into the current capacity, a complete copy is
    /// built first and then exchanged in, so a panicking `clone` leaves `self`
    /// unchanged. Otherwise the common prefix is assigned element-wise with
    /// [`Clone::clone_from`], after which surplus elements are dropped or
    /// missing ones are cloned into the spare capacity.
    fn clone_from(&mut self, source: &Self) {
        if source.len() > self.capacity() {
            let mut copy = source.clone();
            self.exchange(&mut copy);
            return;
        }

        let common = usize::min(self.len(), source.len());
        self.as_mut_slice()[..common].clone_from_slice(&source.as_slice()[..common]);

        if source.len() < self.len() {
            self.truncate(source.len);
        } else {
            for item in &source.as_slice()[common..] {
                unsafe { self.push_unchecked(item.clone()) };
            }
        }
    }
}

impl<T, I: Capacity> core::ops::Deref for DynArray<T, I> {
    type Target = [T];
    fn deref(&self) -> &[T] {
        unsafe { core::slice::from_raw_parts(self.buf.as_ptr(), self.len()) }
    }
}

impl<T, I: Capacity> core::ops::DerefMut for DynArray<T, I> {
    fn deref_mut(&mut self) -> &mut [T] {
        let len = self.len();
        unsafe { core::slice::from_raw_parts_mut(self.buf.as_mut_ptr(), len) }
    }
}

#[cold]
#[inline(never)]
#[track_caller]
fn index_out_of_bounds(index: usize, len: usize) -> ! {
    panic!("index (is {}) should be < len (is {})", index, len);
}

impl<T, I: Capacity> core::ops::Index<I> for DynArray<T, I> {
    type Output = T;
    #[track_caller]
    fn index(&self, index: I) -> &Self::Output {
        let idx = index.as_usize();
        if idx >= self.len() {
            index_out_of_bounds(idx, self.len());
        }
        unsafe { &*self.buf.ptr_at(idx) }
    }
}

impl<T, I: Capacity> core::ops::IndexMut<I> for DynArray<T, I> {
    #[track_caller]
    fn index_mut(&mut self, index: I) -> &mut Self::Output {
        let idx = index.as_usize();
        if idx >= self.len() {
            index_out_of_bounds(idx, self.len());
        }
        unsafe { &mut *self.buf.mut_ptr_at(idx) }
    }
}

macro_rules! _impl_idx_range {
    ($self:ident, $idx:ident: $r:ty, $lo:expr, $hi:expr) => {
        impl<T, I: Capacity> core::ops::Index<$r> for DynArray<T, I> {
            type Output = [T];
            #[allow(unused_variables)]
            fn index(&self, $idx: $r) -> &Self::Output {
                let $self = self;
                let start = $lo;
                let end = $hi;
                &self.as_slice()[start..end]
            }
        }

        impl<T, I: Capacity> core::ops::IndexMut<$r> for DynArray<T, I> {
            #[allow(unused_variables)]
            fn index_mut(&mut self, $idx: $r) -> &mut Self::Output {
                let (start, end) = {
                    let $self = &self;
                    ($lo, $hi)
                };
                &mut self.as_mut_slice()[start..end]
            }
        }
    };
}

_impl_idx_range! { s, index: core::ops::Range<I>, index.start.as_usize(), index.end.as_usize() }
_impl_idx_range! { s, index: core::ops::RangeFrom<I>, index.start.as_usize(), s.len() }
_impl_idx_range! { s, index: core::ops::RangeFull, 0, s.len() }
_impl_idx_range! { s, index: core::ops::RangeInclusive<I>, index.start().as_usize(), index.end().as_usize().saturating_add(1) }
_impl_idx_range! { s, index: core::ops::RangeTo<I>, 0, index.end.as_usize() }
_impl_idx_range! { s, index: core::ops::RangeToInclusive<I>, 0, index.end.as_usize().saturating_add(1) }

impl<T, I: Capacity> AsRef<[T]> for DynArray<T, I> {
    fn as_ref(&self) -> &[T] {
        self
    }
}

impl<T, I: Capacity> AsMut<[T]> for DynArray<T, I> {
    fn as_mut(&mut self) -> &mut [T] {
        self
    }
}

impl<T: core::fmt::Debug, I: Capacity> core::fmt::Debug for DynArray<T, I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.as_slice().fmt(f)
    }
}

impl<T: Hash, I: Capacity> Hash for DynArray<T, I> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        Hash::hash(self.as_slice(), state)
    }
}

impl<AT, AI, BT, BI> PartialEq<DynArray<BT, BI>> for DynArray<AT, AI>
where
    AT: PartialEq<BT>,
    AI: Capacity,
    BI: Capacity,
{
    #[inline]
    fn eq(&self, other: &DynArray<BT, BI>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq, I: Capacity> Eq for DynArray<T, I> {}

impl<V, T, I> PartialEq<&[V]> for DynArray<T, I>
where
    T: PartialEq<V>,
    I: Capacity,
{
    #[inline]
    fn eq(&self, other: &&[V]) -> bool {
        self.as_slice() == &other[..]
    }
}

impl<V, T, I> PartialEq<&mut [V]> for DynArray<T, I>
where
    T: PartialEq<V>,
    I: Capacity,
{
    #[inline]
    fn eq(&self, other: &&mut [V]) -> bool {
        self.as_slice() == &other[..]
    }
}

impl<V, T, I, const N: usize> PartialEq<[V; N]> for DynArray<T, I>
where
    T: PartialEq<V>,
    I: Capacity,
{
    #[inline]
    fn eq(&self, other: &[V; N]) -> bool {
        self.as_slice() == &other[..]
    }
}

impl<V, T, I> PartialEq<DynArray<T, I>> for &[V]
where
    V: PartialEq<T>,
    I: Capacity,
{
    #[inline]
    fn eq(&self, other: &DynArray<T, I>) -> bool {
        &self[..] == other.as_slice()
    }
}

impl<V, T, I, const N: usize> PartialEq<DynArray<T, I>> for [V; N]
where
    V: PartialEq<T>,
    I: Capacity,
{
    #[inline]
    fn eq(&self, other: &DynArray<T, I>) -> bool {
        &self[..] == other.as_slice()
    }
}

impl<T: PartialOrd, I: Capacity> PartialOrd for DynArray<T, I> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.as_slice().partial_cmp(other.as_slice())
    }
}

impl<T: Ord, I: Capacity> Ord for DynArray<T, I> {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_slice().cmp(other.as_slice())
    }
}

impl<T, I: Capacity> Extend<T> for DynArray<T, I> {
    fn extend<It: IntoIter<Item = T>>(&mut self, iter: It) {
        for element in iter {
            self.push(element);
        }
    }
}

impl<'a, T: Clone + 'a, I: Capacity> Extend<&'a T> for DynArray<T, I> {
    fn extend<It: IntoIter<Item = &'a T>>(&mut self, iter: It) {
        for element in iter {
            self.push(element.clone());
        }
    }
}

impl<T, I: Capacity> FromIterator<T> for DynArray<T, I> {
    fn from_iter<It: IntoIter<Item = T>>(iter: It) -> Self {
        let mut ret = Self::new();
        ret.extend(iter);
        ret
    }
}

impl<T: Clone, I: Capacity> From<&[T]> for DynArray<T, I> {
    /// Clones the slice into an array with exactly `source.len()` capacity.
    ///
    /// # Panics
    /// Panics if `source.len()` cannot be represented by the index type `I`.
    fn from(source: &[T]) -> Self {
        let mut ret = Self::with_capacity(I::from_usize(source.len()));
        for item in source {
            unsafe { ret.push_unchecked(item.clone()) };
        }
        ret
    }
}

impl<T, I: Capacity, const N: usize> From<[T; N]> for DynArray<T, I> {
    /// Moves the elements of the array into storage of exactly `N` elements.
    fn from(source: [T; N]) -> Self {
        let mut ret = Self::with_capacity(I::from_usize(N));
        for item in source {
            unsafe { ret.push_unchecked(item) };
        }
        ret
    }
}

/// An iterator that moves out of a [`DynArray`].
///
/// This `struct` is created by the `into_iter` method on [`DynArray`]
/// (provided by the [`IntoIterator`](core::iter::IntoIterator) trait).
///
/// # Example
/// ```
/// let arr = relovec::DynArray::<u32>::from([1, 2]);
/// let mut iter: relovec::vec::IntoIterator<_, _> = arr.into_iter();
/// # assert_eq!(iter.next(), Some(1));
/// # assert_eq!(iter.next(), Some(2));
/// # assert_eq!(iter.next(), None);
/// ```
pub struct IntoIterator<T, I: Capacity> {
    start: I,
    end: I,
    buf: RawBlock<T>,
}

impl<T, I: Capacity> IntoIterator<T, I> {
    /// Returns the remaining items of this iterator as a slice.
    pub fn as_slice(&self) -> &[T] {
        let start = self.start.as_usize();
        let len = self.end.as_usize() - start;
        unsafe { core::slice::from_raw_parts(self.buf.ptr_at(start), len) }
    }
}

impl<T, I: Capacity> Iterator for IntoIterator<T, I> {
    type Item = T;

    fn size_hint(&self) -> (usize, Option<usize>) {
        let size = self.end.as_usize() - self.start.as_usize();
        (size, Some(size))
    }

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let start = self.start.as_usize();
        let end = self.end.as_usize();
        if start >= end {
            return None;
        }

        self.start = I::from_usize(start + 1);
        unsafe { Some(self.buf.ptr_at(start).read()) }
    }
}

impl<T, I: Capacity> DoubleEndedIterator for IntoIterator<T, I> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        let start = self.start.as_usize();
        let end = self.end.as_usize();
        if start >= end {
            return None;
        }

        let end = end - 1;
        self.end = I::from_usize(end);
        unsafe { Some(self.buf.ptr_at(end).read()) }
    }
}

impl<T, I: Capacity> ExactSizeIterator for IntoIterator<T, I> {}
impl<T, I: Capacity> FusedIterator for IntoIterator<T, I> {}

impl<T, I: Capacity> Drop for IntoIterator<T, I> {
    fn drop(&mut self) {
        self.for_each(drop);
    }
}

impl<T, I: Capacity> IntoIter for DynArray<T, I> {
    type Item = T;
    type IntoIter = IntoIterator<T, I>;

    fn into_iter(self) -> Self::IntoIter {
        let mut this = ManuallyDrop::new(self);
        IntoIterator {
            start: I::ZERO,
            end: this.len,
            buf: this.buf.take(),
        }
    }
}

impl<'a, T, I: Capacity> IntoIter for &'a DynArray<T, I> {
    type Item = &'a T;
    type IntoIter = core::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl<'a, T, I: Capacity> IntoIter for &'a mut DynArray<T, I> {
    type Item = &'a mut T;
    type IntoIter = core::slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_mut_slice().iter_mut()
    }
}
