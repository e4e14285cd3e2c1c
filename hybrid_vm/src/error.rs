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

use thiserror::Error;

use crate::address::{PageKey, Pfn, SegmentId, Vpn};

/// Errors of segment creation and release
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SegmentError {
    #[error("segment {id} already exists")]
    DuplicateSegment { id: SegmentId },

    #[error("segment {id} does not exist")]
    UnknownSegment { id: SegmentId },

    #[error("segment {id} must be at least one byte long")]
    ZeroSize { id: SegmentId },

    #[error("no free virtual range of {size_bytes} bytes left for segment {id}")]
    AddressSpaceExhausted { id: SegmentId, size_bytes: u64 },
}

/// Errors of address translation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TranslationError {
    #[error("segment {id} does not exist")]
    UnknownSegment { id: SegmentId },

    #[error("virtual address {virtual_address:#x} is outside of segment {id} [{base:#x}, {base:#x} + {limit})")]
    OutOfBounds {
        id: SegmentId,
        virtual_address: u64,
        base: u64,
        limit: u64,
    },

    #[error("no physical frame available to map {key}")]
    OutOfMemory { key: PageKey },
}

/// Frame pool contract violations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("frame {pfn} is already free")]
    DoubleFree { pfn: Pfn },

    #[error("frame {pfn} is out of range (total frames: {total_frames})")]
    InvalidFrame { pfn: Pfn, total_frames: usize },
}

/// Page table contract violations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PageTableError {
    #[error("vpn {vpn} is already mapped to frame {pfn}")]
    AlreadyMapped { vpn: Vpn, pfn: Pfn },
}

/// Invalid construction parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("total memory must be greater than zero")]
    ZeroTotalMemory,

    #[error("page size must be greater than zero")]
    ZeroPageSize,

    #[error("maximum segment count must be greater than zero")]
    ZeroMaxSegments,

    #[error("a pool of {frames} frames cannot be held on this target")]
    FramePoolTooLarge { frames: u64 },
}
