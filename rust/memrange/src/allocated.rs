//! `AllocatedRange`: a memory range that owns its block.

use std::{fmt, mem::ManuallyDrop};

use memrange_alloc::{Allocator, HeapAllocator};
use memrange_common::{Result, State};

use crate::{range::MemoryRange, view::MemoryView};

/// A [`MemoryRange`] that exclusively owns its backing block and releases it
/// through the allocator handle it holds.
///
/// An allocated range is either `UNINITIALIZED` (no block) or `HAS_DATA`.
/// Newly allocated and newly grown bytes are always zero.
pub struct AllocatedRange<A: Allocator = HeapAllocator> {
    /// Bounds of the owned block. The `'static` lifetime never escapes: all
    /// accessors reborrow it for the lifetime of `&self` / `&mut self`.
    range: MemoryRange<'static>,
    allocator: A,
}

impl AllocatedRange<HeapAllocator> {
    /// Allocates `size` zero bytes from a default [`HeapAllocator`].
    pub fn new(size: usize) -> Result<Self> {
        Self::new_in(size, HeapAllocator::new())
    }

    /// Allocates a copy of `data` from a default [`HeapAllocator`].
    pub fn copy_from_slice(data: &[u8]) -> Result<Self> {
        Self::copy_from_slice_in(data, HeapAllocator::new())
    }
}

impl<A: Allocator> AllocatedRange<A> {
    /// An uninitialized range that will allocate from `allocator`.
    pub fn empty_in(allocator: A) -> Self {
        AllocatedRange {
            range: MemoryRange::uninit(),
            allocator,
        }
    }

    /// Allocates `size` zero bytes from `allocator`. A zero size yields an
    /// uninitialized range.
    pub fn new_in(size: usize, allocator: A) -> Result<Self> {
        let ptr = allocator.alloc_zeroed(size)?;
        Ok(unsafe { Self::from_raw_parts(ptr, size, allocator) })
    }

    /// Allocates a copy of `data` from `allocator`.
    pub fn copy_from_slice_in(data: &[u8], allocator: A) -> Result<Self> {
        let mut owned = Self::new_in(data.len(), allocator)?;
        if !data.is_empty() {
            owned.range().copy_from(&MemoryView::from_slice(data))?;
        }
        Ok(owned)
    }

    /// Takes ownership of a block.
    ///
    /// # Safety
    ///
    /// `ptr` must be null with `size == 0`, or a block of exactly `size`
    /// initialized bytes returned by `allocator` and not owned elsewhere.
    pub unsafe fn from_raw_parts(ptr: *mut u8, size: usize, allocator: A) -> Self {
        let range = if ptr.is_null() {
            MemoryRange::uninit()
        } else {
            unsafe { MemoryRange::from_raw_parts(ptr, ptr.add(size)) }
        };
        AllocatedRange { range, allocator }
    }

    /// Releases ownership of the block without freeing it, returning the
    /// pointer, its size and the allocator it must be returned to.
    pub fn into_raw_parts(self) -> (*mut u8, usize, A) {
        let this = ManuallyDrop::new(self);
        let size = this.block_size();
        let (begin, _) = this.range.unpack();
        // SAFETY: `this` is never dropped, so the allocator is moved out once.
        let allocator = unsafe { std::ptr::read(&this.allocator) };
        (begin, size, allocator)
    }

    pub fn allocator(&self) -> &A {
        &self.allocator
    }

    /// A read-only view of the owned bytes.
    pub fn view(&self) -> MemoryView<'_> {
        self.range.as_view()
    }

    /// A mutable range over the owned bytes. The bounds themselves can only
    /// be changed through the owning methods below.
    pub fn range(&mut self) -> MemoryRange<'_> {
        self.range.reborrow()
    }

    #[inline]
    pub fn get_state(&self) -> State {
        self.range.get_state()
    }

    #[inline]
    pub fn is_uninit(&self) -> bool {
        self.range.is_uninit()
    }

    #[inline]
    pub fn has_data(&self) -> bool {
        self.range.has_data()
    }

    /// Size of the owned block; zero when uninitialized.
    #[inline]
    pub fn len(&self) -> usize {
        self.block_size()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.block_size() == 0
    }

    pub fn as_slice(&self) -> &[u8] {
        self.view().as_slice().unwrap_or_default()
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        let len = self.block_size();
        if len == 0 {
            return &mut [];
        }
        unsafe { std::slice::from_raw_parts_mut(self.range.begin(), len) }
    }

    /// Releases the owned block and resets to the uninitialized state.
    pub fn clear(&mut self) {
        let size = self.block_size();
        let (begin, _) = self.range.unpack();
        self.range.clear();
        if !begin.is_null() {
            unsafe { self.allocator.free(begin, size) };
        }
    }

    /// Grows or shrinks the owned block, preserving the common prefix and
    /// zero-filling any new bytes. Resizing to zero releases the block.
    ///
    /// On failure the range is left unchanged.
    pub fn resize(&mut self, new_size: usize) -> Result<()> {
        let old_size = self.block_size();
        if new_size == old_size {
            return Ok(());
        }
        let (begin, _) = self.range.unpack();
        let ptr = unsafe { self.allocator.realloc(begin, old_size, new_size)? };
        if ptr.is_null() {
            self.range.clear();
            return Ok(());
        }
        unsafe {
            let end = ptr.add(new_size);
            if new_size > old_size {
                memrange_rawops::set(ptr.add(old_size), end, 0);
            }
            self.range.reset(ptr, end);
        }
        Ok(())
    }

    /// Trades blocks, and the allocators that own them, with `other`.
    pub fn swap(&mut self, other: &mut AllocatedRange<A>) {
        std::mem::swap(self, other);
    }

    /// Releases the block held by `self`, then takes over `other`'s block;
    /// `other` is left uninitialized.
    pub fn exchange(&mut self, other: &mut AllocatedRange<A>) {
        self.clear();
        self.swap(other);
    }

    fn block_size(&self) -> usize {
        let (begin, end) = self.range.unpack();
        memrange_rawops::span_len(begin as *const u8, end as *const u8)
    }
}

impl<A: Allocator + Default> Default for AllocatedRange<A> {
    fn default() -> Self {
        Self::empty_in(A::default())
    }
}

impl<A: Allocator> Drop for AllocatedRange<A> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<A: Allocator + Clone> Clone for AllocatedRange<A> {
    /// Deep copy into a new block from a clone of the allocator.
    ///
    /// # Panics
    ///
    /// Panics if the allocation fails, like `Vec::clone`.
    fn clone(&self) -> Self {
        Self::copy_from_slice_in(self.as_slice(), self.allocator.clone())
            .expect("AllocatedRange::clone: allocation failed")
    }
}

impl<A: Allocator> fmt::Debug for AllocatedRange<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AllocatedRange")
            .field("range", &self.range)
            .field("len", &self.len())
            .field("alignment", &self.allocator.alignment())
            .finish_non_exhaustive()
    }
}
