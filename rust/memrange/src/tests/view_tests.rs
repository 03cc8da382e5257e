use memrange_common::{ErrorKind, State};

use crate::MemoryView;

fn views_of_every_state(data: &[u8; 8]) -> Vec<MemoryView<'_>> {
    let begin = data.as_ptr();
    let end = begin.wrapping_add(data.len());
    unsafe {
        vec![
            MemoryView::uninit(),
            MemoryView::from_raw_parts(begin, begin),
            MemoryView::from_raw_parts(begin, end),
            MemoryView::from_raw_parts(std::ptr::null(), end),
            MemoryView::from_raw_parts(begin, std::ptr::null()),
            MemoryView::from_raw_parts(end, begin),
        ]
    }
}

fn is_invalid_range(e: &crate::Error) -> bool {
    matches!(e.kind(), ErrorKind::InvalidRange { .. })
}

fn is_out_of_range(e: &crate::Error) -> bool {
    matches!(e.kind(), ErrorKind::OutOfRange { .. })
}

#[test]
fn test_every_state_reachable_and_consistent() {
    let data = [0u8; 8];
    let views = views_of_every_state(&data);
    let states: Vec<State> = views.iter().map(|v| v.get_state()).collect();
    assert_eq!(
        states,
        vec![
            State::Uninitialized,
            State::Empty,
            State::HasData,
            State::InvalidNullBegin,
            State::InvalidNullEnd,
            State::InvalidDangling,
        ]
    );
    for v in &views {
        let state = v.get_state();
        assert_eq!(v.is_valid(), !v.is_invalid());
        assert_eq!(v.is_uninit(), state == State::Uninitialized);
        assert_eq!(v.is_empty(), state == State::Empty);
        assert_eq!(v.has_data(), state == State::HasData);
        assert_eq!(v.is_valid(), v.is_empty() || v.has_data());
    }
}

#[test]
fn test_diff_and_size_agree() {
    let data = [0u8; 8];
    for v in views_of_every_state(&data) {
        match (v.diff(), v.size()) {
            (Ok(d), Ok(s)) => {
                assert!(v.is_valid());
                assert_eq!(d, s);
            }
            (Err(d), Err(s)) => {
                assert!(v.is_invalid());
                assert!(is_invalid_range(&d));
                assert!(is_invalid_range(&s));
            }
            _ => panic!("diff and size disagree for {v:?}"),
        }
    }
    assert_eq!(MemoryView::from_slice(&data).size().unwrap(), 8);
    assert_eq!(MemoryView::from_slice(&data[..0]).size().unwrap(), 0);
}

#[test]
fn test_unpack_vs_unpack_validated() {
    let data = [0u8; 8];
    for v in views_of_every_state(&data) {
        let raw = v.unpack();
        assert_eq!(raw, (v.begin(), v.end()));
        match v.unpack_validated() {
            Ok(pair) => assert_eq!(pair, raw),
            Err(e) => {
                assert!(v.is_invalid());
                assert!(is_invalid_range(&e));
            }
        }
    }
}

#[test]
fn test_make_validates() {
    let data = [1u8, 2, 3, 4];
    let p = data.as_ptr();
    unsafe {
        assert!(MemoryView::make(p, p.add(4)).is_ok());
        assert!(MemoryView::make(p, p).unwrap().is_empty());
        let err = MemoryView::make(p.add(1), p).unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::InvalidRange {
                state: State::InvalidDangling,
                ..
            }
        ));
        assert!(MemoryView::make(std::ptr::null(), std::ptr::null()).is_err());
        assert!(MemoryView::make(std::ptr::null(), p).is_err());
        assert!(MemoryView::make(p, std::ptr::null()).is_err());
    }
}

#[test]
fn test_alignment_checks() {
    let data = [0u64; 4];
    let view = MemoryView::from_typed(&data);
    assert!(view.is_aligned(8).unwrap());
    assert!(view.is_aligned(1).unwrap());

    for bad in [0usize, 3, 12] {
        let err = view.is_aligned(bad).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidAlignment { .. }));
    }

    let shifted = view.slice(1, 8).unwrap();
    assert!(!shifted.is_aligned(2).unwrap());
    assert!(shifted.is_aligned(1).unwrap());

    assert!(is_invalid_range(
        &MemoryView::uninit().is_aligned(8).unwrap_err()
    ));
}

#[test]
fn test_offsets() {
    let data = *b"abcdef";
    let view = MemoryView::from_slice(&data);
    assert!(view.is_valid_offset(0).unwrap());
    assert!(view.is_valid_offset(5).unwrap());
    assert!(!view.is_valid_offset(6).unwrap());

    assert_eq!(view.at_begin(2).unwrap(), &data[2] as *const u8);
    assert_eq!(view.at_end(0).unwrap(), &data[5] as *const u8);
    assert_eq!(view.at_end(5).unwrap(), &data[0] as *const u8);
    assert_eq!(view.at(1, true).unwrap(), view.at_end(1).unwrap());
    assert_eq!(view.at(1, false).unwrap(), view.at_begin(1).unwrap());
    assert_eq!(view.at_first().unwrap(), view.begin());
    assert_eq!(view.at_last().unwrap(), &data[5] as *const u8);
    assert_eq!(view.get(3).unwrap(), b'd');

    assert!(is_out_of_range(&view.at_begin(6).unwrap_err()));
    assert!(is_out_of_range(&view.at_end(6).unwrap_err()));
    assert!(is_out_of_range(&view.at_end(usize::MAX).unwrap_err()));
}

#[test]
fn test_empty_view_has_no_offsets() {
    let data = [1u8; 2];
    let empty = MemoryView::from_slice(&data[..0]);
    assert!(empty.is_empty());
    assert!(!empty.is_valid_offset(0).unwrap());
    assert!(is_out_of_range(&empty.at_first().unwrap_err()));
    assert!(is_out_of_range(&empty.at_last().unwrap_err()));
    assert!(is_invalid_range(
        &MemoryView::uninit().is_valid_offset(0).unwrap_err()
    ));
}

#[test]
fn test_containment() {
    let data = [0u8; 10];
    let view = MemoryView::from_slice(&data);
    let (b, e) = view.unpack();

    assert!(view.contains_ptr(b).unwrap());
    assert!(view.contains_ptr(e.wrapping_sub(1)).unwrap());
    assert!(!view.contains_ptr(e).unwrap());
    assert!(!view.contains_ptr(std::ptr::null()).unwrap());

    // Reflexive, and monotonic when shrinking towards the interior.
    assert!(view.contains_range(b, e).unwrap());
    for i in 0..=5 {
        assert!(
            view.contains_range(b.wrapping_add(i), e.wrapping_sub(i))
                .unwrap()
        );
    }

    // Empty sub-ranges, including exactly at the end.
    assert!(view.contains_range(e, e).unwrap());
    assert!(view.contains_range(b, b).unwrap());
    assert!(!view.contains_range(b, e.wrapping_add(1)).unwrap());
    assert!(!view.contains_range(b.wrapping_sub(1), e).unwrap());

    let inner = view.slice(2, 3).unwrap();
    assert!(view.contains(&inner).unwrap());
    assert!(!inner.contains(&view).unwrap());
    assert!(view.contains(&view).unwrap());
}

#[test]
fn test_equality_is_by_address() {
    let a = *b"same";
    let b = *b"same";
    let va = MemoryView::from_slice(&a);
    let vb = MemoryView::from_slice(&b);
    assert!(!va.is_equal(&vb));
    assert_ne!(va, vb);
    assert!(va.is_equal(&va.try_clone().unwrap()));

    let head = va.slice(0, 2).unwrap();
    assert!(head.is_equal_begin(&va));
    assert!(!head.is_equal_end(&va));
    assert!(head.is_equal_begin_to(va.begin()));
    assert!(va.is_equal_end_to(va.end()));
}

#[test]
fn test_find_and_rfind() {
    let hay = MemoryView::from("abcabcabc");
    let needle = MemoryView::from("bc");
    assert_eq!(hay.find_offset(&needle).unwrap(), Some(1));
    assert_eq!(hay.rfind_offset(&needle).unwrap(), Some(7));
    assert_eq!(hay.find(&"zz".into()).unwrap(), hay.end());
    assert_eq!(hay.rfind(&"zz".into()).unwrap(), hay.end());
    assert_eq!(hay.find_offset(&"zz".into()).unwrap(), None);
    assert_eq!(hay.find(&"abcabcabcabc".into()).unwrap(), hay.end());
}

#[test]
fn test_empty_needle_matches_at_begin() {
    let hay = MemoryView::from("hello");
    let other = *b"xyz";
    for i in 0..=3 {
        let p = other.as_ptr().wrapping_add(i);
        unsafe {
            assert_eq!(hay.find_range(p, p).unwrap(), hay.begin());
            assert_eq!(hay.rfind_range(p, p).unwrap(), hay.begin());
        }
    }
    let empty_needle = MemoryView::from_slice(&other[..0]);
    assert_eq!(hay.find_offset(&empty_needle).unwrap(), Some(0));
    assert_eq!(hay.rfind_offset(&empty_needle).unwrap(), Some(0));
}

#[test]
fn test_empty_null_needle_matches_at_begin() {
    let hay = MemoryView::from("hello");
    let null = std::ptr::null();
    unsafe {
        assert_eq!(hay.find_range(null, null).unwrap(), hay.begin());
        assert_eq!(hay.rfind_range(null, null).unwrap(), hay.begin());
        assert!(is_invalid_range(
            &MemoryView::uninit().find_range(null, null).unwrap_err()
        ));
    }
}

#[test]
fn test_search_argument_errors() {
    let hay = MemoryView::from("hello");
    let n = *b"lo";
    let (nb, ne) = MemoryView::from_slice(&n).unpack();
    unsafe {
        let err = hay.find_range(std::ptr::null(), ne).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::NullReference { name: "begin", .. }));
        let err = hay.rfind_range(nb, std::ptr::null()).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::NullReference { name: "end", .. }));
        let err = hay.find_range(ne, nb).unwrap_err();
        assert!(is_invalid_range(&err));
        let err = hay.compare_range(std::ptr::null(), ne).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::NullReference { .. }));
        let err = hay.rcompare_range(std::ptr::null(), ne).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::NullReference { name: "begin", .. }));
        let err = hay.rcompare_range(nb, std::ptr::null()).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::NullReference { name: "end", .. }));
        let err = hay.rcompare_range(ne, nb).unwrap_err();
        assert!(is_invalid_range(&err));
    }
    assert!(is_invalid_range(&hay.find(&MemoryView::uninit()).unwrap_err()));
    assert!(is_invalid_range(
        &MemoryView::uninit().find(&hay).unwrap_err()
    ));
}

#[test]
fn test_compare_and_rcompare() {
    let a = MemoryView::from("prefix-middle-suffix");
    let b = MemoryView::from("prefix_middle_suffix");
    let first = a.compare(&b).unwrap().unwrap();
    assert_eq!(first as usize - a.begin() as usize, 6);
    let last = a.rcompare(&b).unwrap().unwrap();
    assert_eq!(last as usize - a.begin() as usize, 13);

    // Overlapping prefix only: a shorter, equal prefix compares equal.
    assert_eq!(a.compare(&"prefix".into()).unwrap(), None);
    assert_eq!(a.rcompare(&"suffix".into()).unwrap(), None);
    assert!(a.rcompare(&"prefix".into()).unwrap().is_some());

    let empty = MemoryView::from("");
    assert_eq!(a.compare(&empty).unwrap(), None);
    assert_eq!(empty.rcompare(&a).unwrap(), None);
}

#[test]
fn test_slice_checked_and_unchecked() {
    let data = *b"0123456789";
    let view = MemoryView::from_slice(&data);
    let size = view.size().unwrap();

    assert!(view.slice(0, size).unwrap().is_equal(&view));
    assert_eq!(view.slice(3, 4).unwrap().as_slice().unwrap(), b"3456");
    assert!(view.slice(10, 0).unwrap().is_empty());
    assert!(is_out_of_range(&view.slice(8, 3).unwrap_err()));
    assert!(is_out_of_range(&view.slice(usize::MAX, 2).unwrap_err()));

    let sub = unsafe { view.slice_unchecked(2, 5) };
    assert_eq!(sub.as_slice().unwrap(), b"23456");
    assert!(unsafe { view.slice_unchecked(0, size) }.is_equal(&view));
}

#[test]
fn test_descriptor_mutation() {
    let a = *b"aaaa";
    let b = *b"bb";
    let mut va = MemoryView::from_slice(&a);
    let mut vb = MemoryView::from_slice(&b);
    let (a0, b0) = (va, vb);

    va.swap(&mut vb);
    assert!(va.is_equal(&b0));
    assert!(vb.is_equal(&a0));

    va.assign(&vb);
    assert!(va.is_equal(&a0));

    va.clear();
    assert!(va.is_uninit());
    assert!(is_invalid_range(&va.try_clone().unwrap_err()));

    let (begin, end) = b0.unpack();
    unsafe { va.reset(begin, end) };
    assert_eq!(va.as_slice().unwrap(), b"bb");
    assert!(MemoryView::default().is_uninit());
}

#[test]
fn test_random_search_agreement() {
    let mut rng = fastrand::Rng::with_seed(0xfeed);
    for _ in 0..500 {
        let hay: Vec<u8> = (0..rng.usize(1..64)).map(|_| rng.u8(b'x'..=b'z')).collect();
        let needle: Vec<u8> = (0..rng.usize(1..5)).map(|_| rng.u8(b'x'..=b'z')).collect();
        let h = MemoryView::from_slice(&hay);
        let n = MemoryView::from_slice(&needle);
        let f = h.find_offset(&n).unwrap();
        let r = h.rfind_offset(&n).unwrap();
        assert_eq!(f.is_some(), r.is_some(), "{hay:?} {needle:?}");
        if let (Some(f), Some(r)) = (f, r) {
            assert!(f <= r);
            assert_eq!(&hay[f..f + needle.len()], &needle[..]);
            assert_eq!(&hay[r..r + needle.len()], &needle[..]);
        }
    }
}
