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

mod address;
mod config;
mod error;
mod eviction;
mod frame_allocator;
mod page_table;
mod segment_manager;
mod segment_registry;
mod shared_segment_manager;
mod stats;
mod translator;
mod util;

#[cfg(test)]
mod test;

pub use crate::segment_manager::SegmentManager;
pub use crate::shared_segment_manager::SharedSegmentManager;
pub use address::{PageKey, Pfn, SegmentId, Vpn};
pub use config::ManagerConfig;
pub use error::{ConfigError, FrameError, PageTableError, SegmentError, TranslationError};
pub use frame_allocator::FrameAllocator;
pub use page_table::{PageEntryStatus, PageTable, PageTableEntry};
pub use segment_registry::{Segment, SegmentInfo, SegmentRegistry};
pub use stats::{Stats, StatsCollector};
pub use translator::{AccessKind, Translation};
pub mod modules;
