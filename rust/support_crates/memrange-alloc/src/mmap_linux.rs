use std::sync::OnceLock;

/// Maps `size` bytes of anonymous, zero-filled memory using standard pages.
///
/// The mapping is rounded up to the nearest page boundary; the returned tuple
/// holds the start pointer and the mapped capacity. The memory must be
/// released with [`unmap`] and that same capacity.
pub fn map(size: usize) -> std::io::Result<(*mut u8, usize)> {
    let capacity = capacity_for(size)?;
    let ptr = unsafe {
        libc::mmap(
            std::ptr::null_mut(),
            capacity,
            libc::PROT_READ | libc::PROT_WRITE,
            libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
            -1,
            0,
        )
    };
    if ptr.is_null() || ptr == libc::MAP_FAILED {
        return Err(std::io::Error::last_os_error());
    }
    Ok((ptr as *mut u8, capacity))
}

/// Unmaps memory returned by [`map`].
///
/// # Safety
///
/// - `ptr` was returned by a previous call to [`map`]
/// - `capacity` matches the capacity returned by that call
/// - The memory has not already been unmapped and is no longer referenced
pub unsafe fn unmap(ptr: *mut u8, capacity: usize) -> std::io::Result<()> {
    let res = unsafe { libc::munmap(ptr as *mut libc::c_void, capacity) };
    if res < 0 {
        return Err(std::io::Error::last_os_error());
    }
    Ok(())
}

/// Page-rounded capacity for a request of `size` bytes (at least one page).
pub fn capacity_for(size: usize) -> std::io::Result<usize> {
    let page_size = get_page_size();
    assert!(page_size.is_power_of_two());
    crate::align::checked_align_up(size.max(1), page_size).ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "mapping size overflow")
    })
}

/// Gets the system's standard page size in bytes, caching the result of
/// `sysconf(_SC_PAGESIZE)`. Falls back to 4KB if it cannot be determined.
pub fn get_page_size() -> usize {
    static SIZE: OnceLock<usize> = OnceLock::new();
    *SIZE.get_or_init(|| read_page_size().unwrap_or(4 * 1024))
}

fn read_page_size() -> std::io::Result<usize> {
    let res = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if res < 0 {
        return Err(std::io::Error::last_os_error());
    }
    assert!(res < i32::MAX as _);
    Ok(res as usize)
}
