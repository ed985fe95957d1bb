mod common;

use common::{TestRam, allocator, slots};
use kernel_frame_alloc::FrameError;
use kernel_info::memory::{ALLOC_JUNK_BYTE, FREE_JUNK_BYTE};

#[test]
fn three_frames_are_handed_out_in_stack_order() {
    let ram = TestRam::with_frames(4);
    let counts = slots(3);
    let alloc = allocator(&ram, &counts);
    let (a, b, c) = (ram.frame(1), ram.frame(2), ram.frame(3));

    assert_eq!(alloc.total_frames(), 3);
    assert_eq!(alloc.free_frames(), 3);

    // init released A, B, C in address order; the stack returns them reversed
    assert_eq!(alloc.allocate(), Some(c));
    assert_eq!(alloc.allocate(), Some(b));
    assert_eq!(alloc.allocate(), Some(a));
    assert_eq!(alloc.allocate(), None);

    for f in [a, b, c] {
        assert_eq!(alloc.ref_count(f.base()), 1);
    }

    unsafe { alloc.free(a.base()) };
    assert_eq!(alloc.ref_count(a.base()), 0);
    assert_eq!(alloc.allocate(), Some(a));
    assert_eq!(alloc.ref_count(a.base()), 1);
}

#[test]
fn allocate_free_allocate_leaks_no_references() {
    let ram = TestRam::with_frames(2);
    let counts = slots(1);
    let alloc = allocator(&ram, &counts);

    for _ in 0..10 {
        let f = alloc.allocate().unwrap();
        assert_eq!(alloc.ref_count(f.base()), 1);
        assert_eq!(unsafe { alloc.try_free(f.base()) }, Ok(0));
        assert_eq!(alloc.ref_count(f.base()), 0);
    }
    assert_eq!(alloc.free_frames(), 1);
}

#[test]
fn copy_on_write_sharing() {
    let ram = TestRam::with_frames(4);
    let counts = slots(3);
    let alloc = allocator(&ram, &counts);

    let x = alloc.allocate().unwrap();
    assert_eq!(alloc.ref_count(x.base()), 1);
    assert!(!alloc.is_shared(x.base()));

    assert_eq!(alloc.share(x.base()), 2);
    assert!(alloc.is_shared(x.base()));

    // first release: still owned, not back in the pool
    unsafe { alloc.free(x.base()) };
    assert_eq!(alloc.ref_count(x.base()), 1);
    assert_eq!(alloc.free_frames(), 2);

    // second release: reclaimed, and next in line
    unsafe { alloc.free(x.base()) };
    assert_eq!(alloc.ref_count(x.base()), 0);
    assert_eq!(alloc.free_frames(), 3);
    assert_eq!(alloc.allocate(), Some(x));
    assert_eq!(alloc.ref_count(x.base()), 1);
}

#[test]
fn shared_frame_is_not_touched_by_partial_release() {
    let ram = TestRam::with_frames(2);
    let counts = slots(1);
    let alloc = allocator(&ram, &counts);

    let x = alloc.allocate().unwrap();
    ram.write(x, 0xAB);
    alloc.share(x.base());

    assert_eq!(unsafe { alloc.try_free(x.base()) }, Ok(1));
    assert!(ram.bytes(x).iter().all(|&b| b == 0xAB));
    assert_eq!(alloc.allocate(), None);
}

#[test]
fn frames_carry_markers() {
    let ram = TestRam::with_frames(2);
    let counts = slots(1);
    let alloc = allocator(&ram, &counts);
    let f = ram.frame(1);

    // freed during init; only the list link at the start differs
    assert!(ram.bytes(f)[64..].iter().all(|&b| b == FREE_JUNK_BYTE));

    assert_eq!(alloc.allocate(), Some(f));
    assert!(ram.bytes(f).iter().all(|&b| b == ALLOC_JUNK_BYTE));

    ram.write(f, 0x00);
    unsafe { alloc.free(f.base()) };
    assert!(ram.bytes(f)[64..].iter().all(|&b| b == FREE_JUNK_BYTE));
}

#[test]
fn allocate_zeroed_clears_the_frame() {
    let ram = TestRam::with_frames(2);
    let counts = slots(1);
    let alloc = allocator(&ram, &counts);

    let f = alloc.allocate_zeroed().unwrap();
    assert!(ram.bytes(f).iter().all(|&b| b == 0));
    assert_eq!(alloc.ref_count(f.base()), 1);
}

#[test]
fn kernel_image_frame_is_not_managed() {
    let ram = TestRam::with_frames(3);
    let counts = slots(2);
    let alloc = allocator(&ram, &counts);

    assert_eq!(alloc.range().start(), ram.frame(1));
    let handed_out: Vec<_> = std::iter::from_fn(|| alloc.allocate()).collect();
    assert_eq!(handed_out, vec![ram.frame(2), ram.frame(1)]);
}

#[test]
fn misaligned_release_is_reported() {
    let ram = TestRam::with_frames(2);
    let counts = slots(1);
    let alloc = allocator(&ram, &counts);

    let f = alloc.allocate().unwrap();
    let inside = f.base() + 8;
    assert_eq!(
        unsafe { alloc.try_free(inside) },
        Err(FrameError::Misaligned(inside))
    );
    assert_eq!(alloc.ref_count(f.base()), 1);
    assert_eq!(alloc.free_frames(), 0);

    // the reference survived, so the proper release still reclaims the frame
    assert_eq!(unsafe { alloc.try_free(f.base()) }, Ok(0));
    assert_eq!(alloc.free_frames(), 1);
    assert_eq!(alloc.allocate(), Some(f));
}

#[test]
fn misaligned_partial_release_drops_one_owner() {
    let ram = TestRam::with_frames(2);
    let counts = slots(1);
    let alloc = allocator(&ram, &counts);

    let f = alloc.allocate().unwrap();
    alloc.share(f.base());
    assert_eq!(unsafe { alloc.try_free(f.base() + 8) }, Ok(1));
    assert_eq!(alloc.ref_count(f.base()), 1);
    assert_eq!(alloc.free_frames(), 0);
}

#[test]
fn out_of_range_release_is_reported() {
    let ram = TestRam::with_frames(2);
    let counts = slots(1);
    let alloc = allocator(&ram, &counts);

    for addr in [ram.base(), ram.top()] {
        assert!(matches!(
            unsafe { alloc.try_free(addr) },
            Err(FrameError::OutOfRange { .. })
        ));
    }
    assert_eq!(alloc.free_frames(), 1);
}

#[test]
fn double_release_is_reported_as_underflow() {
    let ram = TestRam::with_frames(2);
    let counts = slots(1);
    let alloc = allocator(&ram, &counts);

    let f = alloc.allocate().unwrap();
    unsafe { alloc.free(f.base()) };
    assert_eq!(
        unsafe { alloc.try_free(f.base()) },
        Err(FrameError::Underflow(f.base()))
    );
    assert_eq!(alloc.ref_count(f.base()), 0);
    assert_eq!(alloc.free_frames(), 1);
}

#[test]
fn sharing_a_free_frame_is_reported() {
    let ram = TestRam::with_frames(2);
    let counts = slots(1);
    let alloc = allocator(&ram, &counts);

    let f = ram.frame(1);
    assert_eq!(alloc.try_share(f.base()), Err(FrameError::NotOwned(f.base())));
    assert_eq!(alloc.ref_count(f.base()), 0);
    assert!(matches!(
        alloc.try_share(ram.base()),
        Err(FrameError::OutOfRange { .. })
    ));
}

#[test]
#[should_panic(expected = "not 4 KiB aligned")]
fn misaligned_free_is_fatal() {
    let ram = TestRam::with_frames(2);
    let counts = slots(1);
    let alloc = allocator(&ram, &counts);

    let f = alloc.allocate().unwrap();
    unsafe { alloc.free(f.base() + 1) };
}

#[test]
#[should_panic(expected = "outside the managed range")]
fn unmanaged_free_is_fatal() {
    let ram = TestRam::with_frames(2);
    let counts = slots(1);
    let alloc = allocator(&ram, &counts);

    unsafe { alloc.free(ram.top()) };
}

#[test]
#[should_panic(expected = "below zero")]
fn double_free_is_fatal() {
    let ram = TestRam::with_frames(2);
    let counts = slots(1);
    let alloc = allocator(&ram, &counts);

    let f = alloc.allocate().unwrap();
    unsafe {
        alloc.free(f.base());
        alloc.free(f.base());
    }
}

#[test]
#[should_panic(expected = "no owner")]
fn sharing_an_unowned_frame_is_fatal() {
    let ram = TestRam::with_frames(2);
    let counts = slots(1);
    let alloc = allocator(&ram, &counts);

    alloc.share(ram.frame(1).base());
}
