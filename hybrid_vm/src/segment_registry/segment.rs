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

use crate::{
    address::{SegmentId, SegmentOffset},
    page_table::PageTable,
    util::div_ceil,
};

/// A contiguous virtual region with its own page table
#[derive(Debug)]
pub struct Segment {
    pub(crate) id: SegmentId,
    pub(crate) label: Option<String>,

    /// First virtual address of this segment
    pub(crate) base: u64,

    /// Size in bytes, always greater than zero
    pub(crate) limit: u64,

    /// How many translation requests touched this segment.
    /// Used as the LRU rank for admission eviction
    pub(crate) access_count: u64,

    pub(crate) page_table: PageTable,
}

impl Segment {
    pub(crate) fn new(id: SegmentId, base: u64, limit: u64, label: Option<String>) -> Self {
        debug_assert_ne!(limit, 0);

        Self {
            id,
            label,
            base,
            limit,
            access_count: 0,
            page_table: PageTable::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> SegmentId {
        self.id
    }

    #[inline]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    #[inline]
    pub fn base(&self) -> u64 {
        self.base
    }

    #[inline]
    pub fn limit(&self) -> u64 {
        self.limit
    }

    #[inline]
    pub fn access_count(&self) -> u64 {
        self.access_count
    }

    #[inline]
    pub fn page_table(&self) -> &PageTable {
        &self.page_table
    }

    /// One past the last virtual address of this segment
    #[inline]
    pub(crate) fn end(&self) -> u64 {
        self.base + self.limit
    }

    /// Splits `virtual_address` into a segment relative page and offset,
    /// or returns `None` if the address lies outside of `[base, base + limit)`
    #[inline]
    pub(crate) fn offset_of(&self, virtual_address: u64, page_size: u64) -> Option<SegmentOffset> {
        let offset = virtual_address.checked_sub(self.base)?;
        if offset >= self.limit {
            return None;
        }

        Some(SegmentOffset::split(offset, page_size))
    }

    #[inline]
    pub(crate) fn overlaps(&self, start: u64, end: u64) -> bool {
        self.base < end && start < self.end()
    }

    pub(crate) fn info(&self, page_size: u64) -> SegmentInfo {
        SegmentInfo {
            id: self.id,
            label: self.label.clone(),
            base: self.base,
            limit: self.limit,
            page_count: div_ceil(self.limit, page_size),
            access_count: self.access_count,
            resident_pages: self.page_table.len(),
        }
    }
}

/// Read only snapshot of a segment
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SegmentInfo {
    pub id: SegmentId,
    pub label: Option<String>,
    pub base: u64,
    pub limit: u64,

    /// Pages covered by `limit`, the last one possibly partial
    pub page_count: u64,
    pub access_count: u64,
    pub resident_pages: usize,
}
