mod common;

use common::{marker, Harness};
use gbi_core::SegmentTable;

const ROOT: u32 = 0x1000;

#[test]
fn resolution_example() {
    let mut segments = SegmentTable::new();
    segments.set(3, 0x1000);
    assert_eq!(segments.resolve(0x0300_0010), 0x1010);
    assert_eq!(segments.resolve(0x0500_0020), 0x0000_0020);
}

#[test]
fn unset_segments_alias_low_memory_and_are_counted() {
    let mut h = Harness::new();
    h.list(ROOT, |dl| {
        dl.display_list(0x0900_0040).end_display_list();
    });
    h.list(0x40, |dl| {
        dl.set_env_color(marker(9)).end_display_list();
    });

    let frame = h.run(ROOT);
    assert_eq!(frame.markers(), [9]);
    assert_eq!(frame.stats().unresolved_segments, 1);
}

#[test]
fn segment_zero_is_physical_and_never_counted() {
    let mut h = Harness::new();
    h.list(ROOT, |dl| {
        dl.display_list(0x2000).end_display_list();
    });
    h.list(0x2000, |dl| {
        dl.end_display_list();
    });

    assert_eq!(h.run(ROOT).stats().unresolved_segments, 0);
}

#[test]
fn segments_set_by_a_list_apply_to_later_commands() {
    let mut h = Harness::new();
    h.list(ROOT, |dl| {
        dl.segment(0xA, 0x0003_0000)
            .display_list(0x0A00_0200)
            .end_display_list();
    });
    h.list(0x0003_0200, |dl| {
        dl.set_env_color(marker(1)).end_display_list();
    });

    let frame = h.run(ROOT);
    assert_eq!(frame.markers(), [1]);
    assert_eq!(h.interp.segments().get(0xA), Some(0x0003_0000));
}

#[test]
fn segments_persist_across_frames() {
    let mut h = Harness::new();
    h.list(ROOT, |dl| {
        dl.segment(2, 0x0004_0000).end_display_list();
    });
    h.list(0x2000, |dl| {
        dl.display_list(0x0200_0000).end_display_list();
    });
    h.list(0x0004_0000, |dl| {
        dl.set_env_color(marker(2)).end_display_list();
    });

    h.run(ROOT);
    let frame = h.run(0x2000);
    assert_eq!(frame.markers(), [2]);
    assert_eq!(frame.stats().unresolved_segments, 0);
}

#[test]
fn later_writes_overwrite() {
    let mut h = Harness::new();
    h.interp.set_segment(1, 0x5000);
    h.list(ROOT, |dl| {
        dl.segment(1, 0x6000).end_display_list();
    });

    h.run(ROOT);
    assert_eq!(h.interp.segments().get(1), Some(0x6000));
}

#[test]
fn segments_survive_a_failed_frame() {
    let mut h = Harness::new();
    h.list(ROOT, |dl| {
        dl.segment(3, 0x7000).raw(0xDE00_0000, 0);
    });
    // runs off into zeroed memory: G_SPNOOP until the end of the image
    let frame = h.run(ROOT);
    assert!(frame.result.is_err());
    assert_eq!(h.interp.segments().get(3), Some(0x7000));
}

#[test]
fn reset_forgets_segments() {
    let mut h = Harness::new();
    h.interp.set_segment(4, 0x1234_5678);
    h.interp.reset();
    assert_eq!(h.interp.segments(), &SegmentTable::new());
}
