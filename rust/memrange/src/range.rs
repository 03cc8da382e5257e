//! `MemoryRange`: the mutable counterpart of [`MemoryView`].
//!
//! A range has the same two-pointer layout and the same state machine as a
//! view. Read-only queries go through [`MemoryRange::as_view`], which borrows
//! the range for as long as the view lives. A plain range never owns the
//! memory it describes; see [`AllocatedRange`](crate::AllocatedRange) for the
//! owning variant.

use std::{fmt, marker::PhantomData, ptr};

use memrange_common::{Error, Result, State, result::verify_state};

use crate::view::MemoryView;

/// A mutable descriptor over the half-open byte interval `[begin, end)`.
#[repr(C)]
pub struct MemoryRange<'a> {
    begin: *mut u8,
    end: *mut u8,
    _marker: PhantomData<&'a mut [u8]>,
}

// SAFETY: a range behaves like `&'a mut [u8]`: it can move across threads,
// and shared access only yields read-only views.
unsafe impl Send for MemoryRange<'_> {}

unsafe impl Sync for MemoryRange<'_> {}

impl<'a> MemoryRange<'a> {
    /// The uninitialized range: both bounds null.
    pub const fn uninit() -> MemoryRange<'a> {
        MemoryRange {
            begin: ptr::null_mut(),
            end: ptr::null_mut(),
            _marker: PhantomData,
        }
    }

    /// Creates a range over `data`.
    pub fn from_slice(data: &'a mut [u8]) -> MemoryRange<'a> {
        let range = data.as_mut_ptr_range();
        MemoryRange {
            begin: range.start,
            end: range.end,
            _marker: PhantomData,
        }
    }

    /// Creates a range over the raw bytes of a typed slice.
    pub fn from_typed<T>(data: &'a mut [T]) -> MemoryRange<'a>
    where
        T: bytemuck::Pod,
    {
        Self::from_slice(bytemuck::cast_slice_mut(data))
    }

    /// Creates a range from two pointers without validating them.
    ///
    /// # Safety
    ///
    /// If the resulting state is `EMPTY` or `HAS_DATA`, `[begin, end)` must be
    /// a single allocation, readable and writable for `'a`, and not accessed
    /// through any other path during `'a`.
    pub const unsafe fn from_raw_parts(begin: *mut u8, end: *mut u8) -> MemoryRange<'a> {
        MemoryRange {
            begin,
            end,
            _marker: PhantomData,
        }
    }

    /// Creates a range from two pointers, failing with `InvalidRange` unless the
    /// pair is `EMPTY` or `HAS_DATA`.
    ///
    /// # Safety
    ///
    /// Same as [`from_raw_parts`](MemoryRange::from_raw_parts).
    pub unsafe fn make(begin: *mut u8, end: *mut u8) -> Result<MemoryRange<'a>> {
        verify_state("make", State::of(begin, end))?;
        Ok(unsafe { Self::from_raw_parts(begin, end) })
    }

    #[inline]
    pub fn begin(&self) -> *mut u8 {
        self.begin
    }

    #[inline]
    pub fn end(&self) -> *mut u8 {
        self.end
    }

    /// A read-only view of the same bounds, borrowing this range.
    #[inline]
    pub fn as_view(&self) -> MemoryView<'_> {
        unsafe { MemoryView::from_raw_parts(self.begin, self.end) }
    }

    /// Converts into a read-only view for the remainder of `'a`.
    #[inline]
    pub fn into_view(self) -> MemoryView<'a> {
        unsafe { MemoryView::from_raw_parts(self.begin, self.end) }
    }

    /// A shorter-lived range over the same bounds.
    #[inline]
    pub fn reborrow(&mut self) -> MemoryRange<'_> {
        unsafe { MemoryRange::from_raw_parts(self.begin, self.end) }
    }
}

/// State classification and size queries, shared with [`MemoryView`].
impl MemoryRange<'_> {
    #[inline]
    pub fn get_state(&self) -> State {
        State::of(self.begin, self.end)
    }

    #[inline]
    pub fn is_uninit(&self) -> bool {
        self.get_state() == State::Uninitialized
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.get_state() == State::Empty
    }

    #[inline]
    pub fn has_data(&self) -> bool {
        self.get_state() == State::HasData
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.get_state().is_valid()
    }

    #[inline]
    pub fn is_invalid(&self) -> bool {
        self.get_state().is_invalid()
    }

    #[inline]
    pub fn unpack(&self) -> (*mut u8, *mut u8) {
        (self.begin, self.end)
    }

    pub fn unpack_validated(&self) -> Result<(*mut u8, *mut u8)> {
        self.checked("unpack_validated")
    }

    #[inline]
    fn checked(&self, op: &'static str) -> Result<(*mut u8, *mut u8)> {
        verify_state(op, self.get_state())?;
        Ok((self.begin, self.end))
    }

    pub fn diff(&self) -> Result<usize> {
        self.as_view().diff()
    }

    pub fn size(&self) -> Result<usize> {
        self.as_view().size()
    }

    /// Mutable address of the byte `offset` bytes after `begin`.
    pub fn at_begin(&mut self, offset: usize) -> Result<*mut u8> {
        self.as_view().at_begin(offset).map(|p| p as *mut u8)
    }

    /// Mutable address of the byte `offset` bytes before the last one.
    pub fn at_end(&mut self, offset: usize) -> Result<*mut u8> {
        self.as_view().at_end(offset).map(|p| p as *mut u8)
    }

    pub fn get(&self, offset: usize) -> Result<u8> {
        self.as_view().get(offset)
    }

    pub fn get_mut(&mut self, offset: usize) -> Result<&mut u8> {
        let p = self.at_begin(offset)?;
        Ok(unsafe { &mut *p })
    }

    /// Writes `value` at `offset`.
    pub fn set(&mut self, offset: usize, value: u8) -> Result<()> {
        *self.get_mut(offset)? = value;
        Ok(())
    }

    #[inline]
    pub fn is_equal(&self, other: &MemoryRange<'_>) -> bool {
        self.as_view().is_equal(&other.as_view())
    }
}

impl<'a> MemoryRange<'a> {
    /// Sub-range without any check.
    ///
    /// # Safety
    ///
    /// The range must be valid and `offset + size` must not exceed its size.
    /// The returned range aliases `self`; the caller must not access the same
    /// bytes through both.
    pub unsafe fn slice_unchecked(&self, offset: usize, size: usize) -> MemoryRange<'a> {
        let begin = self.begin.wrapping_add(offset);
        unsafe { MemoryRange::from_raw_parts(begin, begin.wrapping_add(size)) }
    }

    /// Sub-range `[begin + offset, begin + offset + size)` borrowing `self`.
    pub fn slice(&mut self, offset: usize, size: usize) -> Result<MemoryRange<'_>> {
        let view = self.as_view().slice(offset, size)?;
        let (begin, end) = view.unpack();
        Ok(unsafe { MemoryRange::from_raw_parts(begin as *mut u8, end as *mut u8) })
    }

    /// Splits a valid range at `mid` into `[begin, begin + mid)` and
    /// `[begin + mid, end)`.
    pub fn split_at(self, mid: usize) -> Result<(MemoryRange<'a>, MemoryRange<'a>)> {
        let size = self.checked_size("split_at")?;
        if mid > size {
            return Err(Error::out_of_range("split_at", mid, size));
        }
        unsafe {
            let head = self.slice_unchecked(0, mid);
            let tail = self.slice_unchecked(mid, size - mid);
            Ok((head, tail))
        }
    }

    fn checked_size(&self, op: &'static str) -> Result<usize> {
        let (begin, end) = self.checked(op)?;
        Ok(end as usize - begin as usize)
    }

    pub fn as_slice(&self) -> Result<&[u8]> {
        self.as_view().as_slice()
    }

    pub fn as_mut_slice(&mut self) -> Result<&mut [u8]> {
        let len = self.checked_size("as_mut_slice")?;
        Ok(unsafe { std::slice::from_raw_parts_mut(self.begin, len) })
    }

    /// Consumes the range, returning its bytes for the rest of `'a`.
    pub fn into_mut_slice(self) -> Result<&'a mut [u8]> {
        let len = self.checked_size("into_mut_slice")?;
        Ok(unsafe { std::slice::from_raw_parts_mut(self.begin, len) })
    }
}

/// Bulk writes through the raw memory primitives.
impl MemoryRange<'_> {
    /// Copies the common prefix of `src` into the start of this range.
    ///
    /// Returns the end of the written bytes. The regions may overlap.
    pub fn copy_from(&mut self, src: &MemoryView<'_>) -> Result<*mut u8> {
        let (begin, end) = self.checked("copy_from")?;
        let (src_begin, src_end) = src.checked("copy_from")?;
        Ok(unsafe { memrange_rawops::copy(begin, end, src_begin, src_end) })
    }

    /// Copies the last `min(size, src.size)` bytes of `src` to the end of this
    /// range.
    ///
    /// Returns the start of the written bytes. The regions may overlap.
    pub fn rcopy_from(&mut self, src: &MemoryView<'_>) -> Result<*mut u8> {
        let (begin, end) = self.checked("rcopy_from")?;
        let (src_begin, src_end) = src.checked("rcopy_from")?;
        Ok(unsafe { memrange_rawops::rcopy(begin, end, src_begin, src_end) })
    }

    /// Sets every byte of the range to `value`.
    pub fn fill(&mut self, value: u8) -> Result<()> {
        let (begin, end) = self.checked("fill")?;
        unsafe { memrange_rawops::set(begin, end, value) };
        Ok(())
    }
}

/// Mutation of the descriptor itself.
impl<'a> MemoryRange<'a> {
    /// Replaces both bounds without validation.
    ///
    /// # Safety
    ///
    /// Same as [`from_raw_parts`](MemoryRange::from_raw_parts).
    #[inline]
    pub unsafe fn reset(&mut self, begin: *mut u8, end: *mut u8) {
        self.begin = begin;
        self.end = end;
    }

    /// Takes over the bounds of `other`.
    #[inline]
    pub fn assign(&mut self, other: MemoryRange<'a>) {
        *self = other;
    }

    /// Trades bounds with `other`.
    #[inline]
    pub fn swap(&mut self, other: &mut MemoryRange<'a>) {
        std::mem::swap(self, other);
    }

    /// Clears `self`, then swaps: `self` ends up with `other`'s bounds and
    /// `other` is left uninitialized.
    #[inline]
    pub fn exchange(&mut self, other: &mut MemoryRange<'a>) {
        self.clear();
        self.swap(other);
    }

    /// Resets to the uninitialized state. Borrowed memory is not touched.
    #[inline]
    pub fn clear(&mut self) {
        self.begin = ptr::null_mut();
        self.end = ptr::null_mut();
    }
}

impl Default for MemoryRange<'_> {
    fn default() -> Self {
        MemoryRange::uninit()
    }
}

impl fmt::Debug for MemoryRange<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryRange")
            .field("begin", &self.begin)
            .field("end", &self.end)
            .field("state", &self.get_state())
            .finish()
    }
}

impl<'a> From<&'a mut [u8]> for MemoryRange<'a> {
    fn from(data: &'a mut [u8]) -> Self {
        MemoryRange::from_slice(data)
    }
}

impl<'a> From<MemoryRange<'a>> for MemoryView<'a> {
    fn from(range: MemoryRange<'a>) -> Self {
        range.into_view()
    }
}
