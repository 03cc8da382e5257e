use std::alloc::{Layout, alloc_zeroed, dealloc};

/// Allocates `size` bytes of zeroed, page-aligned memory (emulated).
pub fn map(size: usize) -> std::io::Result<(*mut u8, usize)> {
    let page_size = get_page_size();
    let capacity = capacity_for(size)?;

    let layout = Layout::from_size_align(capacity, page_size)
        .map_err(|_| std::io::Error::new(std::io::ErrorKind::InvalidInput, "Invalid layout"))?;

    let ptr = unsafe { alloc_zeroed(layout) };
    if ptr.is_null() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::OutOfMemory,
            "Failed to allocate memory",
        ));
    }

    Ok((ptr, capacity))
}

/// Frees memory that was allocated by [`map`].
///
/// # Safety
///
/// `ptr` and `capacity` must come from a single call to [`map`] and the
/// memory must not be referenced afterwards.
pub unsafe fn unmap(ptr: *mut u8, capacity: usize) -> std::io::Result<()> {
    let page_size = get_page_size();
    assert!(capacity.is_multiple_of(page_size));

    let layout = Layout::from_size_align(capacity, page_size)
        .map_err(|_| std::io::Error::new(std::io::ErrorKind::InvalidInput, "Invalid layout"))?;

    unsafe {
        dealloc(ptr, layout);
    }
    Ok(())
}

/// Page-rounded capacity for a request of `size` bytes (at least one page).
pub fn capacity_for(size: usize) -> std::io::Result<usize> {
    crate::align::checked_align_up(size.max(1), get_page_size()).ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "mapping size overflow")
    })
}

/// Returns the "standard page" size in bytes.
pub fn get_page_size() -> usize {
    4 * 1024
}
