//! Allocator handing out whole pages from the operating system.
//!
//! Every block is rounded up to a page multiple and is page aligned. Fresh
//! blocks are always zero-filled, so [`Allocator::alloc_zeroed`] costs nothing
//! extra. Growing a block within its current page capacity is done in place.

use memrange_common::{Error, Result};

use crate::{Allocator, mmap};

/// Page-granular allocator backed by anonymous memory mappings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageAllocator;

impl PageAllocator {
    pub const fn new() -> PageAllocator {
        PageAllocator
    }

    /// Returns the size of a regular memory page on the current system.
    pub fn page_size() -> usize {
        mmap::get_page_size()
    }

    /// Number of bytes actually reserved for a request of `size` bytes.
    ///
    /// Fails with `OutOfMemory` when the page-rounded size overflows.
    pub fn capacity_for(size: usize) -> Result<usize> {
        mmap::capacity_for(size).map_err(|_| Error::out_of_memory(size, Self::page_size()))
    }
}

impl Allocator for PageAllocator {
    fn alloc(&self, size: usize) -> Result<*mut u8> {
        if size == 0 {
            return Ok(std::ptr::null_mut());
        }
        let (ptr, capacity) = mmap::map(size).map_err(|e| {
            log::debug!("page alloc: mapping {size} bytes failed: {e}");
            Error::out_of_memory(size, Self::page_size())
        })?;
        log::trace!("page alloc: {size} bytes ({capacity} mapped) at {ptr:p}");
        Ok(ptr)
    }

    fn alloc_zeroed(&self, size: usize) -> Result<*mut u8> {
        self.alloc(size)
    }

    unsafe fn free(&self, ptr: *mut u8, size: usize) {
        if ptr.is_null() || size == 0 {
            return;
        }
        let capacity = match mmap::capacity_for(size) {
            Ok(capacity) => capacity,
            Err(e) => {
                log::warn!("page free: invalid size {size} for {ptr:p}: {e}");
                return;
            }
        };
        log::trace!("page free: {size} bytes ({capacity} mapped) at {ptr:p}");
        if let Err(e) = unsafe { mmap::unmap(ptr, capacity) } {
            log::warn!("page free: unmapping {ptr:p} failed: {e}");
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
        let old_capacity = Self::capacity_for(old_size)?;
        let new_capacity = Self::capacity_for(new_size)?;
        if old_capacity == new_capacity {
            if new_size > old_size {
                // Bytes past `old_size` may hold data from before a shrink.
                unsafe { ptr.add(old_size).write_bytes(0, new_size - old_size) };
            }
            log::trace!("page realloc in place: {ptr:p} {old_size} -> {new_size} bytes");
            return Ok(ptr);
        }
        let new_ptr = self.alloc(new_size)?;
        unsafe {
            std::ptr::copy_nonoverlapping(ptr, new_ptr, old_size.min(new_size));
            self.free(ptr, old_size);
        }
        log::trace!("page realloc: {ptr:p} ({old_size} bytes) -> {new_ptr:p} ({new_size} bytes)");
        Ok(new_ptr)
    }

    fn alignment(&self) -> usize {
        Self::page_size()
    }
}
