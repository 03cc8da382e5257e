//! `MemoryView`: an immutable, bounds-checked `[begin, end)` byte descriptor.

use std::{fmt, marker::PhantomData, ptr};

use memrange_common::{
    Error, Result, State,
    result::{verify_alignment, verify_state},
};

/// A read-only descriptor over the half-open byte interval `[begin, end)`.
///
/// A view is two pointers and nothing else. It may be in any of the six
/// [`State`]s; only `EMPTY` and `HAS_DATA` views can be queried, and every
/// query validates the state first.
///
/// Views built from slices are always valid for `'a`. Views built from raw
/// pointers through [`from_raw_parts`](MemoryView::from_raw_parts) or
/// [`make`](MemoryView::make) carry the caller's promise that the memory is
/// readable for `'a` whenever the pair is valid.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct MemoryView<'a> {
    begin: *const u8,
    end: *const u8,
    _marker: PhantomData<&'a [u8]>,
}

// SAFETY: a view only ever hands out shared access to `&'a [u8]`, which is
// itself `Send + Sync`.
unsafe impl Send for MemoryView<'_> {}

unsafe impl Sync for MemoryView<'_> {}

impl<'a> MemoryView<'a> {
    /// The uninitialized view: both bounds null.
    pub const fn uninit() -> MemoryView<'a> {
        MemoryView {
            begin: ptr::null(),
            end: ptr::null(),
            _marker: PhantomData,
        }
    }

    /// Creates a view over the bytes of `data`. Never fails; an empty slice
    /// yields an `EMPTY` view.
    pub fn from_slice(data: &'a [u8]) -> MemoryView<'a> {
        let range = data.as_ptr_range();
        MemoryView {
            begin: range.start,
            end: range.end,
            _marker: PhantomData,
        }
    }

    /// Creates a view over the raw bytes of a typed slice.
    pub fn from_typed<T>(data: &'a [T]) -> MemoryView<'a>
    where
        T: bytemuck::NoUninit,
    {
        Self::from_slice(bytemuck::cast_slice(data))
    }

    /// Creates a view from two pointers without validating them.
    ///
    /// # Safety
    ///
    /// If the resulting state is `EMPTY` or `HAS_DATA`, `[begin, end)` must be
    /// a single allocation readable for `'a` and not mutated during `'a`.
    /// Invalid pairs are allowed; they are rejected by every checked operation.
    pub const unsafe fn from_raw_parts(begin: *const u8, end: *const u8) -> MemoryView<'a> {
        MemoryView {
            begin,
            end,
            _marker: PhantomData,
        }
    }

    /// Creates a view from two pointers, failing with `InvalidRange` unless the
    /// pair is `EMPTY` or `HAS_DATA`.
    ///
    /// # Safety
    ///
    /// Same as [`from_raw_parts`](MemoryView::from_raw_parts).
    pub unsafe fn make(begin: *const u8, end: *const u8) -> Result<MemoryView<'a>> {
        verify_state("make", State::of(begin, end))?;
        Ok(unsafe { Self::from_raw_parts(begin, end) })
    }

    /// Inclusive start of the view.
    #[inline]
    pub fn begin(&self) -> *const u8 {
        self.begin
    }

    /// Exclusive end of the view.
    #[inline]
    pub fn end(&self) -> *const u8 {
        self.end
    }
}

/// State classification.
impl MemoryView<'_> {
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
}

impl<'a> MemoryView<'a> {
    /// Returns the raw `(begin, end)` pair without any state check.
    #[inline]
    pub fn unpack(&self) -> (*const u8, *const u8) {
        (self.begin, self.end)
    }

    /// Returns the raw `(begin, end)` pair, failing with `InvalidRange` unless
    /// the view is `EMPTY` or `HAS_DATA`.
    #[inline]
    pub fn unpack_validated(&self) -> Result<(*const u8, *const u8)> {
        self.checked("unpack_validated")
    }

    #[inline]
    pub(crate) fn checked(&self, op: &'static str) -> Result<(*const u8, *const u8)> {
        verify_state(op, self.get_state())?;
        Ok((self.begin, self.end))
    }

    #[inline]
    fn checked_size(&self, op: &'static str) -> Result<usize> {
        let (begin, end) = self.checked(op)?;
        Ok(end as usize - begin as usize)
    }

    /// `end - begin` in bytes. Fails with `InvalidRange` on invalid views,
    /// including uninitialized ones.
    #[inline]
    pub fn diff(&self) -> Result<usize> {
        self.checked_size("diff")
    }

    /// Size of the view in bytes; same as [`diff`](MemoryView::diff).
    #[inline]
    pub fn size(&self) -> Result<usize> {
        self.checked_size("size")
    }

    /// Checks whether `begin` is a multiple of `alignment`.
    ///
    /// Fails with `InvalidAlignment` unless `alignment` is a non-zero power
    /// of two, and with `InvalidRange` on invalid views.
    pub fn is_aligned(&self, alignment: usize) -> Result<bool> {
        verify_alignment("is_aligned", alignment)?;
        let (begin, _) = self.checked("is_aligned")?;
        Ok((begin as usize & (alignment - 1)) == 0)
    }

    /// `true` iff `offset < size`.
    pub fn is_valid_offset(&self, offset: usize) -> Result<bool> {
        Ok(offset < self.checked_size("is_valid_offset")?)
    }

    /// Address of the byte `offset` bytes after `begin`.
    pub fn at_begin(&self, offset: usize) -> Result<*const u8> {
        let (begin, end) = self.checked("at_begin")?;
        let size = end as usize - begin as usize;
        if offset >= size {
            return Err(Error::out_of_range("at_begin", offset, size));
        }
        Ok(unsafe { begin.add(offset) })
    }

    /// Address of the byte `offset` bytes before the last one; offset 0 is the
    /// last byte of the view.
    pub fn at_end(&self, offset: usize) -> Result<*const u8> {
        let (begin, end) = self.checked("at_end")?;
        let size = end as usize - begin as usize;
        if offset >= size {
            return Err(Error::out_of_range("at_end", offset, size));
        }
        Ok(unsafe { end.sub(offset + 1) })
    }

    #[inline]
    pub fn at(&self, offset: usize, reversed: bool) -> Result<*const u8> {
        if reversed {
            self.at_end(offset)
        } else {
            self.at_begin(offset)
        }
    }

    #[inline]
    pub fn at_first(&self) -> Result<*const u8> {
        self.at(0, false)
    }

    #[inline]
    pub fn at_last(&self) -> Result<*const u8> {
        self.at(0, true)
    }

    /// Reads the byte at `offset`.
    pub fn get(&self, offset: usize) -> Result<u8> {
        let p = self.at_begin(offset)?;
        Ok(unsafe { p.read() })
    }

    /// `begin <= ptr < end`.
    pub fn contains_ptr(&self, ptr: *const u8) -> Result<bool> {
        let (begin, end) = self.checked("contains_ptr")?;
        Ok(begin <= ptr && ptr < end)
    }

    /// `begin <= begin2 && end2 <= end`. An empty `[begin2, end2)` lying
    /// within the bounds, including exactly at `end`, is contained.
    pub fn contains_range(&self, begin2: *const u8, end2: *const u8) -> Result<bool> {
        let (begin, end) = self.checked("contains_range")?;
        Ok(begin <= begin2 && end2 <= end)
    }

    pub fn contains(&self, other: &MemoryView<'_>) -> Result<bool> {
        let (begin2, end2) = other.unpack();
        self.contains_range(begin2, end2)
    }

    #[inline]
    pub fn is_equal_begin_to(&self, ptr: *const u8) -> bool {
        self.begin == ptr
    }

    #[inline]
    pub fn is_equal_end_to(&self, ptr: *const u8) -> bool {
        self.end == ptr
    }

    #[inline]
    pub fn is_equal_begin(&self, other: &MemoryView<'_>) -> bool {
        self.begin == other.begin
    }

    #[inline]
    pub fn is_equal_end(&self, other: &MemoryView<'_>) -> bool {
        self.end == other.end
    }

    /// Address equality of both bounds; contents are never compared.
    #[inline]
    pub fn is_equal(&self, other: &MemoryView<'_>) -> bool {
        self.is_equal_begin(other) && self.is_equal_end(other)
    }
}

/// Search.
impl<'a> MemoryView<'a> {
    /// Finds the first occurrence of `[needle_begin, needle_end)`.
    ///
    /// Returns the start of the match, or [`end`](MemoryView::end) if there is
    /// none. An empty needle matches at `begin` whatever its address, null
    /// included.
    ///
    /// # Safety
    ///
    /// `[needle_begin, needle_end)` must be readable.
    pub unsafe fn find_range(
        &self,
        needle_begin: *const u8,
        needle_end: *const u8,
    ) -> Result<*const u8> {
        let (begin, end) = self.checked("find_range")?;
        if needle_begin == needle_end {
            return Ok(begin);
        }
        check_raw_pair("find_range", needle_begin, needle_end)?;
        Ok(unsafe { memrange_rawops::find(begin, end, needle_begin, needle_end) })
    }

    /// Finds the last occurrence of `[needle_begin, needle_end)`.
    ///
    /// Returns the start of the right-most match, or [`end`](MemoryView::end)
    /// if there is none. An empty needle matches at `begin`, not at `end`.
    ///
    /// # Safety
    ///
    /// `[needle_begin, needle_end)` must be readable.
    pub unsafe fn rfind_range(
        &self,
        needle_begin: *const u8,
        needle_end: *const u8,
    ) -> Result<*const u8> {
        let (begin, end) = self.checked("rfind_range")?;
        if needle_begin == needle_end {
            return Ok(begin);
        }
        check_raw_pair("rfind_range", needle_begin, needle_end)?;
        Ok(unsafe { memrange_rawops::rfind(begin, end, needle_begin, needle_end) })
    }

    pub fn find(&self, needle: &MemoryView<'_>) -> Result<*const u8> {
        let (needle_begin, needle_end) = needle.checked("find")?;
        unsafe { self.find_range(needle_begin, needle_end) }
    }

    pub fn rfind(&self, needle: &MemoryView<'_>) -> Result<*const u8> {
        let (needle_begin, needle_end) = needle.checked("rfind")?;
        unsafe { self.rfind_range(needle_begin, needle_end) }
    }

    /// Like [`find`](MemoryView::find), as an offset from `begin`.
    pub fn find_offset(&self, needle: &MemoryView<'_>) -> Result<Option<usize>> {
        let hit = self.find(needle)?;
        Ok(self.hit_offset(hit, needle))
    }

    /// Like [`rfind`](MemoryView::rfind), as an offset from `begin`.
    pub fn rfind_offset(&self, needle: &MemoryView<'_>) -> Result<Option<usize>> {
        let hit = self.rfind(needle)?;
        Ok(self.hit_offset(hit, needle))
    }

    fn hit_offset(&self, hit: *const u8, needle: &MemoryView<'_>) -> Option<usize> {
        if hit == self.end && !needle.is_empty() {
            None
        } else {
            Some(hit as usize - self.begin as usize)
        }
    }
}

/// Comparison.
impl<'a> MemoryView<'a> {
    /// Compares the common prefix of `self` and `[other_begin, other_end)`.
    ///
    /// Returns the address within `self` of the first differing byte, or
    /// `None` if the compared prefix is identical. Sizes need not match.
    ///
    /// # Safety
    ///
    /// `[other_begin, other_end)` must be readable.
    pub unsafe fn compare_range(
        &self,
        other_begin: *const u8,
        other_end: *const u8,
    ) -> Result<Option<*const u8>> {
        let (begin, end) = self.checked("compare_range")?;
        check_raw_pair("compare_range", other_begin, other_end)?;
        Ok(unsafe { memrange_rawops::compare(begin, end, other_begin, other_end) })
    }

    /// Compares the common suffix of `self` and `[other_begin, other_end)`,
    /// scanning backwards from the ends.
    ///
    /// Returns the address within `self` of the differing byte closest to
    /// `end`, or `None` if the compared suffix is identical.
    ///
    /// # Safety
    ///
    /// `[other_begin, other_end)` must be readable.
    pub unsafe fn rcompare_range(
        &self,
        other_begin: *const u8,
        other_end: *const u8,
    ) -> Result<Option<*const u8>> {
        let (begin, end) = self.checked("rcompare_range")?;
        check_raw_pair("rcompare_range", other_begin, other_end)?;
        Ok(unsafe { memrange_rawops::rcompare(begin, end, other_begin, other_end) })
    }

    pub fn compare(&self, other: &MemoryView<'_>) -> Result<Option<*const u8>> {
        let (other_begin, other_end) = other.checked("compare")?;
        unsafe { self.compare_range(other_begin, other_end) }
    }

    pub fn rcompare(&self, other: &MemoryView<'_>) -> Result<Option<*const u8>> {
        let (other_begin, other_end) = other.checked("rcompare")?;
        unsafe { self.rcompare_range(other_begin, other_end) }
    }
}

/// Construction and mutation of the descriptor itself.
impl<'a> MemoryView<'a> {
    /// Returns a copy of the bounds after validating them.
    pub fn try_clone(&self) -> Result<MemoryView<'a>> {
        self.checked("clone")?;
        Ok(*self)
    }

    /// Sub-view `[begin + offset, begin + offset + size)` without any check.
    ///
    /// # Safety
    ///
    /// The view must be valid and `offset + size` must not exceed its size.
    #[inline]
    pub unsafe fn slice_unchecked(&self, offset: usize, size: usize) -> MemoryView<'a> {
        let begin = self.begin.wrapping_add(offset);
        unsafe { MemoryView::from_raw_parts(begin, begin.wrapping_add(size)) }
    }

    /// Sub-view `[begin + offset, begin + offset + size)`.
    ///
    /// Fails with `InvalidRange` on invalid views and with `OutOfRange` unless
    /// `offset + size` is within the view.
    pub fn slice(&self, offset: usize, size: usize) -> Result<MemoryView<'a>> {
        let len = self.checked_size("slice")?;
        match offset.checked_add(size) {
            Some(last) if last <= len => Ok(unsafe { self.slice_unchecked(offset, size) }),
            _ => Err(Error::out_of_range("slice", offset, len)),
        }
    }

    /// The bytes of a valid view.
    pub fn as_slice(&self) -> Result<&'a [u8]> {
        let len = self.checked_size("as_slice")?;
        Ok(unsafe { std::slice::from_raw_parts(self.begin, len) })
    }

    /// Replaces both bounds without validation.
    ///
    /// # Safety
    ///
    /// Same as [`from_raw_parts`](MemoryView::from_raw_parts).
    #[inline]
    pub unsafe fn reset(&mut self, begin: *const u8, end: *const u8) {
        self.begin = begin;
        self.end = end;
    }

    /// Copies the bounds of `other`.
    #[inline]
    pub fn assign(&mut self, other: &MemoryView<'a>) {
        *self = *other;
    }

    /// Trades bounds with `other`.
    #[inline]
    pub fn swap(&mut self, other: &mut MemoryView<'a>) {
        std::mem::swap(self, other);
    }

    /// Resets to the uninitialized state.
    #[inline]
    pub fn clear(&mut self) {
        *self = MemoryView::uninit();
    }
}

/// Rejects null or reversed raw pointer pairs passed as needles or operands.
pub(crate) fn check_raw_pair(op: &'static str, begin: *const u8, end: *const u8) -> Result<()> {
    if begin.is_null() {
        return Err(Error::null_reference(op, "begin"));
    }
    if end.is_null() {
        return Err(Error::null_reference(op, "end"));
    }
    verify_state(op, State::of(begin, end))
}

impl Default for MemoryView<'_> {
    fn default() -> Self {
        MemoryView::uninit()
    }
}

impl PartialEq for MemoryView<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.is_equal(other)
    }
}

impl Eq for MemoryView<'_> {}

impl fmt::Debug for MemoryView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryView")
            .field("begin", &self.begin)
            .field("end", &self.end)
            .field("state", &self.get_state())
            .finish()
    }
}

impl<'a> From<&'a [u8]> for MemoryView<'a> {
    fn from(data: &'a [u8]) -> Self {
        MemoryView::from_slice(data)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for MemoryView<'a> {
    fn from(data: &'a [u8; N]) -> Self {
        MemoryView::from_slice(data)
    }
}

impl<'a> From<&'a str> for MemoryView<'a> {
    fn from(s: &'a str) -> Self {
        MemoryView::from_slice(s.as_bytes())
    }
}
