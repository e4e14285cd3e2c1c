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

use crate::error::ConfigError;

/// Construction time parameters of a [`crate::SegmentManager`].
///
/// They are fixed for the lifetime of the manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ManagerConfig {
    /// Physical memory budget in bytes
    pub total_memory_bytes: u64,

    /// Size of one page and one frame in bytes
    pub page_size_bytes: u64,

    /// How many segments can be live at the same time
    pub max_segments: usize,
}

impl ManagerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.total_memory_bytes == 0 {
            return Err(ConfigError::ZeroTotalMemory);
        }
        if self.page_size_bytes == 0 {
            return Err(ConfigError::ZeroPageSize);
        }
        if self.max_segments == 0 {
            return Err(ConfigError::ZeroMaxSegments);
        }

        Ok(())
    }

    /// Number of whole frames that fit into the memory budget.
    ///
    /// A remainder smaller than one page is dropped.
    pub fn total_frames(&self) -> u64 {
        if self.page_size_bytes == 0 {
            return 0;
        }

        self.total_memory_bytes / self.page_size_bytes
    }
}
