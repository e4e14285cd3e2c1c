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

use log::trace;

use crate::{
    address::{PageKey, Pfn},
    frame_allocator::FrameAllocator,
    page_table::PageEntryStatus,
    segment_registry::SegmentRegistry,
};

mod clock;
mod default;

pub use clock::ClockReclaimModule;
pub use default::FirstResidentReclaimModule;

/// A page that was evicted to free its frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvictedPage {
    pub key: PageKey,
    pub pfn: Pfn,

    /// The page was written to, its content is discarded anyway
    pub was_dirty: bool,
}

/// View on all resident pages that a [`ReclaimModule`] can inspect and evict from
pub struct ReclaimList<'a> {
    registry: &'a mut SegmentRegistry,
    frames: &'a mut FrameAllocator,

    /// Every page evicted through this list, in eviction order
    evicted: Vec<EvictedPage>,
}

impl<'a> ReclaimList<'a> {
    pub(crate) fn new(registry: &'a mut SegmentRegistry, frames: &'a mut FrameAllocator) -> Self {
        Self {
            registry,
            frames,
            evicted: Vec::new(),
        }
    }

    /// Pages that were actually evicted, whatever the module reports
    #[inline]
    pub(crate) fn evicted(&self) -> &[EvictedPage] {
        &self.evicted
    }

    /// Total number of physical frames
    #[inline]
    pub fn frame_count(&self) -> usize {
        self.frames.total()
    }

    /// Page that currently lives in frame `pfn`
    #[inline]
    pub fn owner(&self, pfn: Pfn) -> Option<PageKey> {
        self.frames.owner(pfn)
    }

    /// Resident pages, segments by ascending id and pages by ascending vpn
    pub fn resident_pages(&self) -> impl Iterator<Item = PageKey> + '_ {
        self.registry.resident_pages()
    }

    pub fn status(&self, key: PageKey) -> Option<PageEntryStatus> {
        let segment = self.registry.get(key.segment)?;
        segment.page_table.entry(key.vpn).map(|entry| entry.status)
    }

    /// Clears the referenced bit of `key` and returns its previous value
    pub fn clear_referenced(&mut self, key: PageKey) -> bool {
        let Some(entry) = self
            .registry
            .get_mut(key.segment)
            .and_then(|segment| segment.page_table.entry_mut(key.vpn))
        else {
            return false;
        };

        let was_referenced = entry.status.is_referenced();
        entry.status.set_referenced(false);
        was_referenced
    }

    /// Unmaps `key` and gives its frame back to the frame pool.
    ///
    /// Returns `None` if `key` is not resident.
    pub fn evict(&mut self, key: PageKey) -> Option<EvictedPage> {
        let entry = self
            .registry
            .get_mut(key.segment)?
            .page_table
            .unmap_entry(key.vpn)?;

        self.frames.release_owned(entry.pfn, key);
        trace!("Evicted {} from frame {}", key, entry.pfn);

        let evicted = EvictedPage {
            key,
            pfn: entry.pfn,
            was_dirty: entry.status.is_dirty(),
        };
        self.evicted.push(evicted);

        Some(evicted)
    }
}

/// Frame level replacement policy.
///
/// Called by the fault handler whenever the frame pool is exhausted. An
/// implementation has to be deterministic: the same sequence of calls has to
/// evict the same pages.
pub trait ReclaimModule {
    fn new() -> Self;

    /// Evicts exactly one resident page through `list`.
    ///
    /// Returns `None` only if there is no resident page at all. The returned
    /// page has to be the one evicted through `list`, anything else aborts.
    fn reclaim_frame(&mut self, list: &mut ReclaimList<'_>) -> Option<EvictedPage>;
}
