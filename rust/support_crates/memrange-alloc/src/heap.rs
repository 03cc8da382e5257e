//! Global-heap allocator with a fixed block alignment.

use std::alloc::{self, Layout};

use memrange_common::{Error, Result, result::verify_alignment};

use crate::Allocator;

/// Allocates blocks from the global heap, each aligned to
/// [`alignment`](HeapAllocator::alignment) bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeapAllocator {
    alignment: usize,
}

impl HeapAllocator {
    /// Alignment used by [`HeapAllocator::new`], matching a typical cache line.
    pub const DEFAULT_ALIGNMENT: usize = 64;

    /// Creates an allocator with [`DEFAULT_ALIGNMENT`](Self::DEFAULT_ALIGNMENT).
    pub const fn new() -> HeapAllocator {
        HeapAllocator {
            alignment: Self::DEFAULT_ALIGNMENT,
        }
    }

    /// Creates an allocator with the specified block alignment.
    ///
    /// Fails with `InvalidAlignment` unless `alignment` is a non-zero power of two.
    pub fn with_alignment(alignment: usize) -> Result<HeapAllocator> {
        verify_alignment("HeapAllocator::with_alignment", alignment)?;
        Ok(HeapAllocator { alignment })
    }

    fn layout(&self, size: usize) -> Result<Layout> {
        Layout::from_size_align(size, self.alignment)
            .map_err(|e| Error::invalid_arg("size", format!("{size}: {e}")))
    }
}

impl Default for HeapAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl Allocator for HeapAllocator {
    fn alloc(&self, size: usize) -> Result<*mut u8> {
        if size == 0 {
            return Ok(std::ptr::null_mut());
        }
        let layout = self.layout(size)?;
        let ptr = unsafe { alloc::alloc(layout) };
        if ptr.is_null() {
            return Err(Error::out_of_memory(size, self.alignment));
        }
        log::trace!("heap alloc: {size} bytes at {ptr:p}");
        Ok(ptr)
    }

    fn alloc_zeroed(&self, size: usize) -> Result<*mut u8> {
        if size == 0 {
            return Ok(std::ptr::null_mut());
        }
        let layout = self.layout(size)?;
        let ptr = unsafe { alloc::alloc_zeroed(layout) };
        if ptr.is_null() {
            return Err(Error::out_of_memory(size, self.alignment));
        }
        log::trace!("heap alloc_zeroed: {size} bytes at {ptr:p}");
        Ok(ptr)
    }

    unsafe fn free(&self, ptr: *mut u8, size: usize) {
        if ptr.is_null() || size == 0 {
            return;
        }
        log::trace!("heap free: {size} bytes at {ptr:p}");
        // SAFETY: the block was allocated by `alloc` with this exact layout,
        // which therefore passed `Layout::from_size_align` already.
        unsafe {
            let layout = Layout::from_size_align_unchecked(size, self.alignment);
            alloc::dealloc(ptr, layout);
        }
    }

    unsafe fn realloc(&self, ptr: *mut u8, old_size: usize, new_size: usize) -> Result<*mut u8> {
        if ptr.is_null() || old_size == 0 {
            return self.alloc(new_size);
        }
        if new_size == 0 {
            unsafe { self.free(ptr, old_size) };
            return Ok(std::ptr::null_mut());
        }
        // Validates that `new_size` rounded up to the alignment does not overflow.
        self.layout(new_size)?;
        let new_ptr = unsafe {
            let layout = Layout::from_size_align_unchecked(old_size, self.alignment);
            alloc::realloc(ptr, layout, new_size)
        };
        if new_ptr.is_null() {
            return Err(Error::out_of_memory(new_size, self.alignment));
        }
        log::trace!("heap realloc: {ptr:p} ({old_size} bytes) -> {new_ptr:p} ({new_size} bytes)");
        Ok(new_ptr)
    }

    fn alignment(&self) -> usize {
        self.alignment
    }
}
