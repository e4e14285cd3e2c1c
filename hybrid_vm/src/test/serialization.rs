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

use serde_json::json;

use super::{base_of, get_test_manager};
use crate::{modules::reclaim::FirstResidentReclaimModule, ManagerConfig, SegmentManager};

#[test]
fn test_stats_to_json() {
    let mut manager: SegmentManager<FirstResidentReclaimModule> = get_test_manager(128, 64, 2);
    manager.create_segment(1, 192).unwrap();
    let base = base_of(&manager, 1);

    for page in 0..3 {
        manager.translate(1, base + page * 64).unwrap();
    }

    let value = serde_json::to_value(manager.stats()).unwrap();
    assert_eq!(
        value,
        json!({
            "page_faults": 3,
            "segment_evictions": 0,
            "frames_used": 2,
            "frames_total": 2,
            "live_segments": 1,
            "frame_evictions": 1,
            "translations": 3,
            "hits": 0,
            "dirty_discards": 0
        })
    );
}

#[test]
fn test_segment_info_to_json() {
    let mut manager: SegmentManager<FirstResidentReclaimModule> = get_test_manager(128, 64, 2);
    manager.create_labeled_segment(5, 100, "stack").unwrap();

    let value = serde_json::to_value(manager.segments()).unwrap();
    assert_eq!(value[0]["label"], "stack");
    assert_eq!(value[0]["page_count"], 2);
    assert_eq!(value[0]["resident_pages"], 0);
}

#[test]
fn test_config_from_json() {
    let config: ManagerConfig = serde_json::from_str(
        r#"{ "total_memory_bytes": 4096, "page_size_bytes": 256, "max_segments": 3 }"#,
    )
    .unwrap();

    assert_eq!(config.total_frames(), 16);
    assert!(SegmentManager::new(config).is_ok());
}
