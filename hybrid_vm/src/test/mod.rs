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

use crate::{modules::reclaim::ReclaimModule, ManagerConfig, SegmentManager};

mod pressure;
#[cfg(feature = "serde")]
mod serialization;

pub(crate) fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub(crate) fn get_test_manager<R: ReclaimModule>(
    total_memory_bytes: u64,
    page_size_bytes: u64,
    max_segments: usize,
) -> SegmentManager<R> {
    init_logging();

    SegmentManager::with_reclaim_module(ManagerConfig {
        total_memory_bytes,
        page_size_bytes,
        max_segments,
    })
    .unwrap()
}

/// Base address of a live segment
pub(crate) fn base_of<R: ReclaimModule>(manager: &SegmentManager<R>, id: u32) -> u64 {
    manager.segment_info(id).unwrap().base
}
