/// Aligns a number up to the next multiple of the specified alignment.
///
/// # Examples
///
/// ```
/// use memrange_alloc::align::align_up;
///
/// assert_eq!(align_up(0, 8), 0);
/// assert_eq!(align_up(1, 8), 8);
/// assert_eq!(align_up(8, 8), 8);
/// assert_eq!(align_up(9, 8), 16);
/// ```
///
/// # Panics
///
/// This function will panic in debug builds if `alignment` is 0 or not a power
/// of 2, or if the result overflows.
#[inline]
pub fn align_up(n: usize, alignment: usize) -> usize {
    debug_assert_ne!(alignment, 0);
    debug_assert!(alignment.is_power_of_two());
    (n + alignment - 1) & !(alignment - 1)
}

/// Like [`align_up`], but returns `None` instead of overflowing.
///
/// ```
/// use memrange_alloc::align::checked_align_up;
///
/// assert_eq!(checked_align_up(5, 4), Some(8));
/// assert_eq!(checked_align_up(usize::MAX, 4), None);
/// ```
#[inline]
pub fn checked_align_up(n: usize, alignment: usize) -> Option<usize> {
    debug_assert!(alignment.is_power_of_two());
    Some(n.checked_add(alignment - 1)? & !(alignment - 1))
}

/// Checks if a number is aligned to the specified alignment boundary.
///
/// ```
/// use memrange_alloc::align::is_aligned;
///
/// assert!(is_aligned(0, 8));
/// assert!(!is_aligned(7, 8));
/// assert!(is_aligned(16, 8));
/// ```
#[inline]
pub fn is_aligned(n: usize, alignment: usize) -> bool {
    debug_assert_ne!(alignment, 0);
    debug_assert!(alignment.is_power_of_two());
    (n & (alignment - 1)) == 0
}

/// Checks whether the address of `ptr` is a multiple of `alignment`.
#[inline]
pub fn is_aligned_ptr<T>(ptr: *const T, alignment: usize) -> bool {
    is_aligned(ptr as usize, alignment)
}
