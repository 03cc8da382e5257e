//! Byte-level memory primitives over explicit `[begin, end)` pointer pairs.
//!
//! These functions perform no state validation: a pair whose `end` precedes
//! its `begin` is treated as zero-length, and all other preconditions are the
//! caller's responsibility. Bounds-checked wrappers live in the `memrange`
//! crate.
//!
//! Substring search is delegated to [`memchr::memmem`], which picks a
//! vectorized implementation at runtime where one is available.

use std::ptr;

use memchr::memmem;

/// Block size used when scanning for the first or last differing byte.
const COMPARE_BLOCK: usize = 64;

/// Number of bytes in `[begin, end)`, or zero if `end` precedes `begin`.
#[inline]
pub fn span_len<T>(begin: *const T, end: *const T) -> usize {
    (end as usize).saturating_sub(begin as usize)
}

/// Copies `min(len(dst), len(src))` bytes from the start of `src` to the start
/// of `dst`, returning the end of the written region in `dst`.
///
/// The regions may overlap.
///
/// # Safety
///
/// Both regions must be valid for the copied length: `src` readable and
/// `dst` writable.
#[inline]
pub unsafe fn copy(dst: *mut u8, dst_end: *mut u8, src: *const u8, src_end: *const u8) -> *mut u8 {
    let n = span_len(dst as *const u8, dst_end as *const u8).min(span_len(src, src_end));
    if n == 0 {
        return dst;
    }
    unsafe {
        ptr::copy(src, dst, n);
        dst.add(n)
    }
}

/// Copies the last `min(len(dst), len(src))` bytes of `src` to the end of
/// `dst`, returning the start of the written region in `dst`.
///
/// The regions may overlap.
///
/// # Safety
///
/// Same as [`copy`].
#[inline]
pub unsafe fn rcopy(
    dst: *mut u8,
    dst_end: *mut u8,
    src: *const u8,
    src_end: *const u8,
) -> *mut u8 {
    let n = span_len(dst as *const u8, dst_end as *const u8).min(span_len(src, src_end));
    if n == 0 {
        return dst_end;
    }
    unsafe {
        let dst_start = dst_end.sub(n);
        ptr::copy(src_end.sub(n), dst_start, n);
        dst_start
    }
}

/// Fills `[dst, dst_end)` with `value`.
///
/// # Safety
///
/// The region must be writable.
#[inline]
pub unsafe fn set(dst: *mut u8, dst_end: *mut u8, value: u8) {
    let n = span_len(dst as *const u8, dst_end as *const u8);
    if n != 0 {
        unsafe { dst.write_bytes(value, n) };
    }
}

/// Compares the common prefix of the two regions.
///
/// Returns the address within `lhs` of the first differing byte, or `None` if
/// the first `min(len(lhs), len(rhs))` bytes are identical.
///
/// # Safety
///
/// Both regions must be readable.
pub unsafe fn compare(
    lhs: *const u8,
    lhs_end: *const u8,
    rhs: *const u8,
    rhs_end: *const u8,
) -> Option<*const u8> {
    let n = span_len(lhs, lhs_end).min(span_len(rhs, rhs_end));
    let (a, b) = unsafe { (bytes(lhs, n), bytes(rhs, n)) };
    first_mismatch(a, b).map(|i| unsafe { lhs.add(i) })
}

/// Compares the common suffix of the two regions, scanning from the end.
///
/// Returns the address within `lhs` of the differing byte closest to
/// `lhs_end`, or `None` if the last `min(len(lhs), len(rhs))` bytes are
/// identical.
///
/// # Safety
///
/// Both regions must be readable.
pub unsafe fn rcompare(
    lhs: *const u8,
    lhs_end: *const u8,
    rhs: *const u8,
    rhs_end: *const u8,
) -> Option<*const u8> {
    let n = span_len(lhs, lhs_end).min(span_len(rhs, rhs_end));
    if n == 0 {
        return None;
    }
    let (lhs_start, a, b) = unsafe {
        let lhs_start = lhs_end.sub(n);
        (lhs_start, bytes(lhs_start, n), bytes(rhs_end.sub(n), n))
    };
    last_mismatch(a, b).map(|i| unsafe { lhs_start.add(i) })
}

/// Finds the first occurrence of `[needle, needle_end)` in
/// `[haystack, haystack_end)`.
///
/// Returns the start of the match, or `haystack_end` if there is none. An
/// empty needle matches at `haystack`.
///
/// # Safety
///
/// Both regions must be readable.
pub unsafe fn find(
    haystack: *const u8,
    haystack_end: *const u8,
    needle: *const u8,
    needle_end: *const u8,
) -> *const u8 {
    let needle_len = span_len(needle, needle_end);
    if needle_len == 0 {
        return haystack;
    }
    let haystack_len = span_len(haystack, haystack_end);
    if needle_len > haystack_len {
        return haystack_end;
    }
    let (h, n) = unsafe { (bytes(haystack, haystack_len), bytes(needle, needle_len)) };
    match memmem::find(h, n) {
        Some(i) => unsafe { haystack.add(i) },
        None => haystack_end,
    }
}

/// Finds the last occurrence of `[needle, needle_end)` in
/// `[haystack, haystack_end)`.
///
/// Returns the start of the right-most match, or `haystack_end` if there is
/// none. An empty needle matches at `haystack`, the same anchor as [`find`].
///
/// # Safety
///
/// Both regions must be readable.
pub unsafe fn rfind(
    haystack: *const u8,
    haystack_end: *const u8,
    needle: *const u8,
    needle_end: *const u8,
) -> *const u8 {
    let needle_len = span_len(needle, needle_end);
    if needle_len == 0 {
        return haystack;
    }
    let haystack_len = span_len(haystack, haystack_end);
    if needle_len > haystack_len {
        return haystack_end;
    }
    let (h, n) = unsafe { (bytes(haystack, haystack_len), bytes(needle, needle_len)) };
    match memmem::rfind(h, n) {
        Some(i) => unsafe { haystack.add(i) },
        None => haystack_end,
    }
}

/// Index of the first position where `a` and `b` differ, over their common length.
pub fn first_mismatch(a: &[u8], b: &[u8]) -> Option<usize> {
    let n = a.len().min(b.len());
    let (a, b) = (&a[..n], &b[..n]);
    let mut base = 0;
    for (ca, cb) in a.chunks(COMPARE_BLOCK).zip(b.chunks(COMPARE_BLOCK)) {
        if ca != cb {
            let i = ca.iter().zip(cb).position(|(x, y)| x != y)?;
            return Some(base + i);
        }
        base += ca.len();
    }
    None
}

/// Index of the last position where `a` and `b` differ, over their common length.
pub fn last_mismatch(a: &[u8], b: &[u8]) -> Option<usize> {
    let n = a.len().min(b.len());
    let (a, b) = (&a[..n], &b[..n]);
    let mut end = n;
    for (ca, cb) in a.rchunks(COMPARE_BLOCK).zip(b.rchunks(COMPARE_BLOCK)) {
        let start = end - ca.len();
        if ca != cb {
            let i = ca.iter().zip(cb).rposition(|(x, y)| x != y)?;
            return Some(start + i);
        }
        end = start;
    }
    None
}

/// Reborrows `len` bytes at `begin` as a slice; a zero length never touches
/// the pointer.
#[inline]
unsafe fn bytes<'a>(begin: *const u8, len: usize) -> &'a [u8] {
    if len == 0 {
        &[]
    } else {
        unsafe { std::slice::from_raw_parts(begin, len) }
    }
}
