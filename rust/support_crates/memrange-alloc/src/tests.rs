use std::sync::Arc;

use memrange_common::ErrorKind;

use crate::{Allocator, HeapAllocator, PageAllocator, align, mmap};

fn fill_pattern(ptr: *mut u8, len: usize) {
    for i in 0..len {
        unsafe { ptr.add(i).write(i as u8) };
    }
}

fn check_pattern(ptr: *const u8, len: usize) {
    for i in 0..len {
        assert_eq!(unsafe { ptr.add(i).read() }, i as u8, "byte {i}");
    }
}

#[test]
fn test_heap_alloc_respects_alignment() {
    for alignment in [1usize, 8, 64, 128, 4096] {
        let heap = HeapAllocator::with_alignment(alignment).unwrap();
        assert_eq!(heap.alignment(), alignment);
        let p = heap.alloc(100).unwrap();
        assert!(!p.is_null());
        assert!(align::is_aligned_ptr(p, alignment));
        unsafe { heap.free(p, 100) };
    }
}

#[test]
fn test_heap_rejects_bad_alignment() {
    for alignment in [0usize, 3, 48] {
        let err = HeapAllocator::with_alignment(alignment).unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::InvalidAlignment { alignment: a, .. } if *a == alignment
        ));
    }
}

#[test]
fn test_heap_zero_size_is_null() {
    let heap = HeapAllocator::new();
    assert!(heap.alloc(0).unwrap().is_null());
    assert!(heap.alloc_zeroed(0).unwrap().is_null());
    unsafe { heap.free(std::ptr::null_mut(), 0) };
}

#[test]
fn test_heap_alloc_zeroed() {
    let heap = HeapAllocator::new();
    let p = heap.alloc_zeroed(257).unwrap();
    for i in 0..257 {
        assert_eq!(unsafe { p.add(i).read() }, 0);
    }
    unsafe { heap.free(p, 257) };
}

#[test]
fn test_heap_realloc_contract() {
    let heap = HeapAllocator::new();

    // Null input behaves as alloc.
    let p = unsafe { heap.realloc(std::ptr::null_mut(), 0, 32) }.unwrap();
    assert!(!p.is_null());
    fill_pattern(p, 32);

    // Growing preserves contents and alignment.
    let p = unsafe { heap.realloc(p, 32, 1000) }.unwrap();
    check_pattern(p, 32);
    assert!(align::is_aligned_ptr(p, HeapAllocator::DEFAULT_ALIGNMENT));

    // Shrinking preserves the prefix.
    let p = unsafe { heap.realloc(p, 1000, 8) }.unwrap();
    check_pattern(p, 8);

    // Zero size behaves as free.
    let p = unsafe { heap.realloc(p, 8, 0) }.unwrap();
    assert!(p.is_null());
}

#[test]
fn test_heap_huge_request_fails() {
    let heap = HeapAllocator::new();
    let err = heap.alloc(usize::MAX).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::InvalidArgument { .. }));
}

#[test]
fn test_page_alloc_is_page_aligned_and_zeroed() {
    let pages = PageAllocator::new();
    let page_size = PageAllocator::page_size();
    assert!(page_size.is_power_of_two());
    assert_eq!(pages.alignment(), page_size);

    let p = pages.alloc(10).unwrap();
    assert!(align::is_aligned_ptr(p, page_size));
    for i in 0..page_size {
        assert_eq!(unsafe { p.add(i).read() }, 0);
    }
    unsafe { pages.free(p, 10) };
}

#[test]
fn test_page_capacity_rounding() {
    let page_size = mmap::get_page_size();
    assert_eq!(PageAllocator::capacity_for(0).unwrap(), page_size);
    assert_eq!(PageAllocator::capacity_for(1).unwrap(), page_size);
    assert_eq!(PageAllocator::capacity_for(page_size).unwrap(), page_size);
    assert_eq!(
        PageAllocator::capacity_for(page_size * 3 + 100).unwrap(),
        page_size * 4
    );
    assert!(matches!(
        PageAllocator::capacity_for(usize::MAX).unwrap_err().kind(),
        ErrorKind::OutOfMemory { .. }
    ));
}

#[test]
fn test_page_huge_alloc_is_out_of_memory() {
    let pages = PageAllocator::new();
    for size in [usize::MAX / 2, usize::MAX] {
        let err = pages.alloc(size).unwrap_err();
        assert!(
            matches!(err.kind(), ErrorKind::OutOfMemory { size: s, .. } if *s == size),
            "{err}"
        );
    }
}

#[test]
fn test_page_realloc_in_place_and_moving() {
    let pages = PageAllocator::new();
    let page_size = PageAllocator::page_size();

    let p = pages.alloc(16).unwrap();
    fill_pattern(p, 16);

    // Within the same page: no move, and the tail reads as zero.
    let q = unsafe { pages.realloc(p, 16, 8) }.unwrap();
    assert_eq!(p, q);
    let q = unsafe { pages.realloc(q, 8, 32) }.unwrap();
    assert_eq!(p, q);
    check_pattern(q, 8);
    for i in 8..32 {
        assert_eq!(unsafe { q.add(i).read() }, 0);
    }

    // Across a page boundary: contents follow the block.
    let r = unsafe { pages.realloc(q, 32, page_size * 2 + 1) }.unwrap();
    check_pattern(r, 8);
    assert!(align::is_aligned_ptr(r, page_size));

    let r = unsafe { pages.realloc(r, page_size * 2 + 1, 0) }.unwrap();
    assert!(r.is_null());
}

#[test]
fn test_shared_handles_forward() {
    let heap = Arc::new(HeapAllocator::with_alignment(256).unwrap());
    let by_ref = &*heap;
    assert_eq!(Allocator::alignment(&by_ref), 256);
    assert_eq!(Allocator::alignment(&heap), 256);

    let p = heap.alloc(64).unwrap();
    assert!(align::is_aligned_ptr(p, 256));
    let p = unsafe { by_ref.realloc(p, 64, 512) }.unwrap();
    assert!(align::is_aligned_ptr(p, 256));
    unsafe { heap.free(p, 512) };
}

#[test]
fn test_default_realloc_via_trait_object() {
    // A minimal allocator relying on the provided `realloc`/`alloc_zeroed`.
    struct Counting(HeapAllocator, std::cell::Cell<usize>);

    impl Allocator for Counting {
        fn alloc(&self, size: usize) -> memrange_common::Result<*mut u8> {
            self.1.set(self.1.get() + 1);
            self.0.alloc(size)
        }

        unsafe fn free(&self, ptr: *mut u8, size: usize) {
            unsafe { self.0.free(ptr, size) }
        }

        fn alignment(&self) -> usize {
            self.0.alignment()
        }
    }

    let a = Counting(HeapAllocator::new(), Default::default());
    let dyn_a: &dyn Allocator = &a;
    let p = dyn_a.alloc_zeroed(24).unwrap();
    for i in 0..24 {
        assert_eq!(unsafe { p.add(i).read() }, 0);
    }
    fill_pattern(p, 24);
    let p = unsafe { dyn_a.realloc(p, 24, 100) }.unwrap();
    check_pattern(p, 24);
    assert_eq!(a.1.get(), 2);
    let p = unsafe { dyn_a.realloc(p, 100, 0) }.unwrap();
    assert!(p.is_null());
}

#[test]
fn test_random_heap_realloc_sequence() {
    let mut rng = fastrand::Rng::with_seed(7);
    let heap = HeapAllocator::with_alignment(16).unwrap();
    let mut size = 0usize;
    let mut ptr = std::ptr::null_mut();
    for _ in 0..200 {
        let new_size = rng.usize(0..2048);
        ptr = unsafe { heap.realloc(ptr, size, new_size) }.unwrap();
        assert_eq!(ptr.is_null(), new_size == 0);
        if new_size > 0 {
            assert!(align::is_aligned_ptr(ptr, 16));
            check_pattern(ptr, size.min(new_size));
            fill_pattern(ptr, new_size);
        }
        size = new_size;
    }
    unsafe { heap.free(ptr, size) };
}
