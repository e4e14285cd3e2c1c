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

use core::fmt;

/// Caller assigned identifier of a segment
pub type SegmentId = u32;

/// Virtual page number, local to one segment
pub type Vpn = u64;

/// Physical frame number in `[0, total_frames)`
pub type Pfn = usize;

/// Identifies one page of one segment.
///
/// Ordering is by segment first and page second, which is the stable
/// order used whenever resident pages are scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageKey {
    pub segment: SegmentId,
    pub vpn: Vpn,
}

impl PageKey {
    pub const fn new(segment: SegmentId, vpn: Vpn) -> Self {
        Self { segment, vpn }
    }
}

impl fmt::Display for PageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(segment={}, vpn={})", self.segment, self.vpn)
    }
}

/// A segment relative offset split into its page number and the offset inside that page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SegmentOffset {
    pub(crate) offset: u64,
    pub(crate) vpn: Vpn,
    pub(crate) page_offset: u64,
}

impl SegmentOffset {
    #[inline]
    pub(crate) fn split(offset: u64, page_size: u64) -> Self {
        debug_assert_ne!(page_size, 0);

        Self {
            offset,
            vpn: offset / page_size,
            page_offset: offset % page_size,
        }
    }

    /// Physical address of this offset if its page lives in frame `pfn`
    #[inline]
    pub(crate) fn physical_address(&self, pfn: Pfn, page_size: u64) -> u64 {
        pfn as u64 * page_size + self.page_offset
    }
}

impl fmt::Display for SegmentOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "offset {} = (vpn={}, page_offset={})",
            self.offset, self.vpn, self.page_offset
        )
    }
}
