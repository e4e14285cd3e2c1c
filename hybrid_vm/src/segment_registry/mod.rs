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

use std::collections::BTreeMap;

use log::{debug, trace};

use crate::{
    address::{PageKey, SegmentId},
    error::SegmentError,
    frame_allocator::FrameAllocator,
    util::round_up_to_nearest,
};

mod segment;

pub use segment::{Segment, SegmentInfo};


/// What was given back when a segment was released
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ReleasedSegment {
    pub(crate) frames_freed: usize,

    /// Resident pages that were written to and whose content is now lost
    pub(crate) dirty_pages: usize,
}

/// Owns every live segment together with its page table
pub struct SegmentRegistry {
    /// Live segments, ordered by id
    segments: BTreeMap<SegmentId, Segment>,
    max_segments: usize,

    /// Segment bases are aligned to this
    page_size: u64,
}

impl SegmentRegistry {
    pub fn new(max_segments: usize, page_size: u64) -> Self {
        debug_assert_ne!(page_size, 0);

        Self {
            segments: BTreeMap::new(),
            max_segments,
            page_size,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.segments.len() >= self.max_segments
    }

    #[inline]
    pub fn contains(&self, id: SegmentId) -> bool {
        self.segments.contains_key(&id)
    }

    #[inline]
    pub fn get(&self, id: SegmentId) -> Option<&Segment> {
        self.segments.get(&id)
    }

    #[inline]
    pub fn get_mut(&mut self, id: SegmentId) -> Option<&mut Segment> {
        self.segments.get_mut(&id)
    }

    /// Live segments in ascending id order
    pub fn iter(&self) -> impl Iterator<Item = &Segment> + '_ {
        self.segments.values()
    }

    /// Every resident page, segments by ascending id, then pages by ascending vpn
    pub fn resident_pages(&self) -> impl Iterator<Item = PageKey> + '_ {
        self.segments.values().flat_map(|segment| {
            segment
                .page_table
                .resident_vpns()
                .map(move |vpn| PageKey::new(segment.id, vpn))
        })
    }

    /// Rejects requests that can never be admitted, no matter what is evicted
    pub(crate) fn check_admissible(&self, id: SegmentId, size_bytes: u64) -> Result<(), SegmentError> {
        if self.contains(id) {
            return Err(SegmentError::DuplicateSegment { id });
        }
        if size_bytes == 0 {
            return Err(SegmentError::ZeroSize { id });
        }

        Ok(())
    }

    /// Admits a new segment with an empty page table.
    ///
    /// The request has to pass [`check_admissible`](Self::check_admissible)
    /// and the caller has to make room first if the registry
    /// [`is_full`](Self::is_full).
    pub(crate) fn insert(
        &mut self,
        id: SegmentId,
        size_bytes: u64,
        label: Option<String>,
    ) -> Result<&Segment, SegmentError> {
        debug_assert_eq!(self.check_admissible(id, size_bytes), Ok(()));
        debug_assert!(!self.is_full(), "no room left for segment {}", id);

        let base = self
            .find_base(size_bytes)
            .ok_or(SegmentError::AddressSpaceExhausted { id, size_bytes })?;

        debug!(
            "Create segment {} (label: {:?}) at [{:#x}, {:#x})",
            id,
            label,
            base,
            base + size_bytes
        );

        let segment = self
            .segments
            .entry(id)
            .or_insert(Segment::new(id, base, size_bytes, label));

        Ok(segment)
    }

    /// Removes a segment and returns all of its frames to `frames`
    pub(crate) fn release_segment(
        &mut self,
        id: SegmentId,
        frames: &mut FrameAllocator,
    ) -> Result<ReleasedSegment, SegmentError> {
        let mut segment = self
            .segments
            .remove(&id)
            .ok_or(SegmentError::UnknownSegment { id })?;

        let mut released = ReleasedSegment {
            frames_freed: 0,
            dirty_pages: 0,
        };

        for (vpn, entry) in segment.page_table.drain() {
            frames.release_owned(entry.pfn, PageKey::new(id, vpn));

            released.frames_freed += 1;
            if entry.status.is_dirty() {
                released.dirty_pages += 1;
            }
        }

        debug!(
            "Released segment {} ({} frames freed, {} dirty pages discarded)",
            id, released.frames_freed, released.dirty_pages
        );

        Ok(released)
    }

    /// Counts one access to the segment.
    ///
    /// Returns `false` if the segment does not exist.
    pub(crate) fn touch(&mut self, id: SegmentId) -> bool {
        match self.segments.get_mut(&id) {
            Some(segment) => {
                segment.access_count += 1;
                trace!("Touch segment {} (access count: {})", id, segment.access_count);
                true
            }
            None => false,
        }
    }

    /// Segment with the smallest access counter, ties go to the smallest id
    pub fn least_recently_used(&self) -> Option<SegmentId> {
        self.segments
            .values()
            .min_by_key(|segment| (segment.access_count, segment.id))
            .map(|segment| segment.id)
    }

    /// First fit search for a page aligned virtual range of `size_bytes`
    /// that does not overlap any live segment
    fn find_base(&self, size_bytes: u64) -> Option<u64> {
        let mut ranges: Vec<(u64, u64)> = self
            .segments
            .values()
            .map(|segment| (segment.base, segment.end()))
            .collect();
        ranges.sort_unstable();

        let mut candidate: u64 = 0;
        for (base, end) in ranges {
            if candidate.checked_add(size_bytes)? <= base {
                break;
            }
            candidate = candidate.max(round_up_to_nearest(end, self.page_size)?);
        }

        // the range itself has to be addressable as well
        candidate.checked_add(size_bytes).map(|_| candidate)
    }

    pub fn infos(&self) -> Vec<SegmentInfo> {
        self.segments
            .values()
            .map(|segment| segment.info(self.page_size))
            .collect()
    }

    /// Checks that no two live segments overlap
    #[cfg(debug_assertions)]
    pub(crate) fn check_integrity(&self) {
        assert!(self.segments.len() <= self.max_segments);

        for segment in self.segments.values() {
            assert_eq!(segment.base % self.page_size, 0, "segment {} is unaligned", segment.id);
            for other in self.segments.values() {
                if other.id == segment.id {
                    continue;
                }

                assert!(
                    !segment.overlaps(other.base, other.end()),
                    "segments {} and {} overlap",
                    segment.id,
                    other.id
                );
            }
        }
    }

    #[cfg(not(debug_assertions))]
    #[inline]
    pub(crate) fn check_integrity(&self) {
        // check nothing
    }
}
