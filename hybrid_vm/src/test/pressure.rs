/*
 *  Copyright (C) 2025  Markus Elias Gerber
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  You should have received a copy of the GNU General Public License
 *  along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

use super::{base_of, get_test_manager};
use crate::{
    modules::reclaim::{ClockReclaimModule, FirstResidentReclaimModule, ReclaimModule},
    AccessKind, PageKey, SegmentManager,
};

/// 4 frames of 64 bytes and one segment of 8 pages.
/// Touches pages 0 to 4 in order, the last one can only be served by eviction
fn fill_and_overflow<R: ReclaimModule>() -> (SegmentManager<R>, u64) {
    let mut manager: SegmentManager<R> = get_test_manager(256, 64, 2);
    manager.create_segment(1, 512).unwrap();
    let base = base_of(&manager, 1);

    for page in 0..4 {
        let translation = manager
            .access(1, base + page * 64, AccessKind::Read)
            .unwrap();
        assert!(translation.page_fault);
        assert_eq!(translation.pfn, page as usize);
    }
    assert_eq!(manager.memory_utilization(), (4, 4));
    assert_eq!(manager.counters().frame_eviction_count(), 0);

    let translation = manager.access(1, base + 4 * 64 + 7, AccessKind::Read).unwrap();
    assert!(translation.page_fault);
    // page 0 was evicted and page 4 took over its frame
    assert_eq!(translation.pfn, 0);
    assert_eq!(translation.physical_address, 7);

    (manager, base)
}

fn check_overflow<R: ReclaimModule>() {
    let (mut manager, base) = fill_and_overflow::<R>();

    let stats = manager.stats();
    assert_eq!(stats.page_faults, 5);
    assert_eq!(stats.frame_evictions, 1);
    assert_eq!(stats.segment_evictions, 0);
    assert_eq!(stats.frames_used, 4);
    assert_eq!(manager.memory_map()[0], Some(PageKey::new(1, 4)));

    let info = manager.segment_info(1).unwrap();
    assert_eq!(info.resident_pages, 4);

    // page 0 has to be faulted in again
    assert!(manager.access(1, base, AccessKind::Read).unwrap().page_fault);
    assert_eq!(manager.counters().page_fault_count(), 6);
    assert_eq!(manager.counters().frame_eviction_count(), 2);
    assert_eq!(manager.memory_map()[1], Some(PageKey::new(1, 0)));

    manager.check_integrity();
}

#[test]
fn test_overflow_first_resident() {
    check_overflow::<FirstResidentReclaimModule>();
}

#[test]
fn test_overflow_clock() {
    check_overflow::<ClockReclaimModule>();
}

#[test]
fn test_bounds_checked_under_pressure() {
    let (mut manager, base) = fill_and_overflow::<FirstResidentReclaimModule>();
    let before = manager.stats();

    assert!(manager.translate(1, base + 512).is_err());
    assert!(manager.translate(1, base + 10_000).is_err());

    // nothing was evicted or counted for the rejected requests
    assert_eq!(manager.stats(), before);
}

#[test]
fn test_faults_across_segments_share_frames() {
    let mut manager: SegmentManager<FirstResidentReclaimModule> = get_test_manager(192, 64, 4);
    manager.create_segment(1, 128).unwrap();
    manager.create_segment(2, 128).unwrap();
    let base_1 = base_of(&manager, 1);
    let base_2 = base_of(&manager, 2);

    manager.translate(2, base_2).unwrap();
    manager.translate(2, base_2 + 64).unwrap();
    manager.translate(1, base_1 + 64).unwrap();

    // pool is exhausted, the first resident page in segment order goes
    manager.translate(1, base_1).unwrap();
    assert_eq!(
        manager.memory_map(),
        vec![
            Some(PageKey::new(2, 0)),
            Some(PageKey::new(2, 1)),
            Some(PageKey::new(1, 0))
        ]
    );
    assert_eq!(manager.counters().frame_eviction_count(), 1);
    manager.check_integrity();
}

#[test]
fn test_clock_protects_recently_used_page() {
    let mut manager: SegmentManager<ClockReclaimModule> = get_test_manager(192, 64, 1);
    manager.create_segment(1, 640).unwrap();
    let base = base_of(&manager, 1);

    for page in 0..4 {
        manager.translate(1, base + page * 64).unwrap();
    }
    // page 3 evicted page 0 and cleared every other referenced bit
    assert_eq!(manager.memory_map()[0], Some(PageKey::new(1, 3)));
    assert_eq!(manager.reclaim_module().hand(), 1);

    // page 1 is used again and gets a second chance
    assert!(!manager.access(1, base + 64, AccessKind::Read).unwrap().page_fault);

    manager.translate(1, base + 4 * 64).unwrap();
    assert_eq!(manager.memory_map()[2], Some(PageKey::new(1, 4)));
    assert_eq!(manager.segment_info(1).unwrap().resident_pages, 3);
    manager.check_integrity();
}

#[test]
fn test_dirty_page_eviction_is_counted() {
    let mut manager: SegmentManager<FirstResidentReclaimModule> = get_test_manager(128, 64, 1);
    manager.create_segment(1, 256).unwrap();
    let base = base_of(&manager, 1);

    manager.access(1, base, AccessKind::Write).unwrap();
    manager.access(1, base + 64, AccessKind::Read).unwrap();
    manager.access(1, base + 128, AccessKind::Read).unwrap();

    // page 0 was dirty, its content is gone
    assert_eq!(manager.counters().dirty_discard_count(), 1);

    manager.access(1, base + 192, AccessKind::Read).unwrap();
    assert_eq!(manager.counters().dirty_discard_count(), 1);
    assert_eq!(manager.counters().frame_eviction_count(), 2);
}
