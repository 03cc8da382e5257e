//! Allocators consumed by owning memory ranges.
//!
//! The [`Allocator`] trait is a plain alloc/free/realloc triple over raw byte
//! blocks. Two implementations are provided:
//!
//! - [`HeapAllocator`]: the global heap, with a configurable power-of-two
//!   alignment.
//! - [`PageAllocator`]: whole pages from the operating system (`mmap` on
//!   Linux, a page-aligned heap emulation elsewhere).

use std::sync::Arc;

use memrange_common::Result;

pub mod align;
pub mod heap;
pub mod page;

#[cfg_attr(target_os = "linux", path = "mmap_linux.rs")]
#[cfg_attr(not(target_os = "linux"), path = "mmap_fallback.rs")]
mod mmap;

pub use heap::HeapAllocator;
pub use page::PageAllocator;

/// A source of raw byte blocks.
///
/// Blocks are identified by their start pointer and the size they were
/// requested with; callers must pass that same size back to [`free`] and
/// [`realloc`].
///
/// [`free`]: Allocator::free
/// [`realloc`]: Allocator::realloc
pub trait Allocator {
    /// Allocates `size` bytes. A zero `size` returns a null pointer.
    fn alloc(&self, size: usize) -> Result<*mut u8>;

    /// Allocates `size` zero-initialized bytes. A zero `size` returns a null pointer.
    fn alloc_zeroed(&self, size: usize) -> Result<*mut u8> {
        let ptr = self.alloc(size)?;
        if !ptr.is_null() {
            unsafe { ptr.write_bytes(0, size) };
        }
        Ok(ptr)
    }

    /// Releases a block. A null `ptr` is ignored.
    ///
    /// # Safety
    ///
    /// `ptr` must be null or have been returned by this allocator for a block
    /// of `size` bytes that has not been released yet.
    unsafe fn free(&self, ptr: *mut u8, size: usize);

    /// Resizes a block, preserving the first `min(old_size, new_size)` bytes.
    ///
    /// A null `ptr` behaves as [`alloc`](Allocator::alloc); a zero `new_size`
    /// behaves as [`free`](Allocator::free) and returns null. On failure the
    /// original block is left untouched.
    ///
    /// # Safety
    ///
    /// Same as [`free`](Allocator::free) for `ptr` and `old_size`.
    unsafe fn realloc(&self, ptr: *mut u8, old_size: usize, new_size: usize) -> Result<*mut u8> {
        if ptr.is_null() {
            return self.alloc(new_size);
        }
        if new_size == 0 {
            unsafe { self.free(ptr, old_size) };
            return Ok(std::ptr::null_mut());
        }
        let new_ptr = self.alloc(new_size)?;
        unsafe {
            std::ptr::copy_nonoverlapping(ptr, new_ptr, old_size.min(new_size));
            self.free(ptr, old_size);
        }
        Ok(new_ptr)
    }

    /// Minimum alignment of every block returned by this allocator.
    fn alignment(&self) -> usize;
}

impl<A: Allocator + ?Sized> Allocator for &A {
    fn alloc(&self, size: usize) -> Result<*mut u8> {
        (**self).alloc(size)
    }

    fn alloc_zeroed(&self, size: usize) -> Result<*mut u8> {
        (**self).alloc_zeroed(size)
    }

    unsafe fn free(&self, ptr: *mut u8, size: usize) {
        unsafe { (**self).free(ptr, size) }
    }

    unsafe fn realloc(&self, ptr: *mut u8, old_size: usize, new_size: usize) -> Result<*mut u8> {
        unsafe { (**self).realloc(ptr, old_size, new_size) }
    }

    fn alignment(&self) -> usize {
        (**self).alignment()
    }
}

impl<A: Allocator + ?Sized> Allocator for Arc<A> {
    fn alloc(&self, size: usize) -> Result<*mut u8> {
        (**self).alloc(size)
    }

    fn alloc_zeroed(&self, size: usize) -> Result<*mut u8> {
        (**self).alloc_zeroed(size)
    }

    unsafe fn free(&self, ptr: *mut u8, size: usize) {
        unsafe { (**self).free(ptr, size) }
    }

    unsafe fn realloc(&self, ptr: *mut u8, old_size: usize, new_size: usize) -> Result<*mut u8> {
        unsafe { (**self).realloc(ptr, old_size, new_size) }
    }

    fn alignment(&self) -> usize {
        (**self).alignment()
    }
}

#[cfg(test)]
mod tests;
