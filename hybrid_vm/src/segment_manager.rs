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

use log::debug;

use crate::{
    address::{PageKey, SegmentId},
    config::ManagerConfig,
    error::{ConfigError, SegmentError},
    eviction::evict_segment_for_admission,
    frame_allocator::FrameAllocator,
    modules::reclaim::{FirstResidentReclaimModule, ReclaimModule},
    segment_registry::{SegmentInfo, SegmentRegistry},
    stats::{Stats, StatsCollector},
};

/// Hybrid segmentation and paging memory manager.
///
/// Segments are created by the caller and populated lazily: a page only
/// gets a physical frame once an address inside of it is translated. Two
/// eviction tiers keep the manager inside its budget. Creating a segment
/// while `max_segments` are live releases the least recently used segment,
/// and a page fault with no free frame lets the reclaim module `R` evict
/// one resident page.
///
/// Physical frames are not backed by any storage, evicted content is lost.
pub struct SegmentManager<R: ReclaimModule = FirstResidentReclaimModule> {
    pub(crate) config: ManagerConfig,
    pub(crate) registry: SegmentRegistry,
    pub(crate) frames: FrameAllocator,
    pub(crate) stats: StatsCollector,
    pub(crate) reclaim: R,
}

impl SegmentManager<FirstResidentReclaimModule> {
    /// Creates a manager that reclaims frames with [`FirstResidentReclaimModule`]
    pub fn new(config: ManagerConfig) -> Result<Self, ConfigError> {
        Self::with_reclaim_module(config)
    }
}

impl<R: ReclaimModule> SegmentManager<R> {
    pub fn with_reclaim_module(config: ManagerConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        debug!(
            "Create segment manager: {} frames of {} bytes, at most {} segments",
            config.total_frames(),
            config.page_size_bytes,
            config.max_segments
        );

        Ok(Self {
            registry: SegmentRegistry::new(config.max_segments, config.page_size_bytes),
            frames: FrameAllocator::new(config.total_frames())?,
            stats: StatsCollector::new(),
            reclaim: R::new(),
            config,
        })
    }

    pub fn create_segment(&mut self, id: SegmentId, size_bytes: u64) -> Result<(), SegmentError> {
        self.admit_segment(id, size_bytes, None)
    }

    /// Like [`SegmentManager::create_segment`] but attaches a label for diagnostics
    pub fn create_labeled_segment(
        &mut self,
        id: SegmentId,
        size_bytes: u64,
        label: impl Into<String>,
    ) -> Result<(), SegmentError> {
        self.admit_segment(id, size_bytes, Some(label.into()))
    }

    fn admit_segment(
        &mut self,
        id: SegmentId,
        size_bytes: u64,
        label: Option<String>,
    ) -> Result<(), SegmentError> {
        self.check_integrity();

        // reject invalid requests before evicting anything
        self.registry.check_admissible(id, size_bytes)?;

        if self.registry.is_full() {
            evict_segment_for_admission(&mut self.registry, &mut self.frames, &mut self.stats);
        }

        self.registry.insert(id, size_bytes, label)?;

        self.check_integrity();
        Ok(())
    }

    /// Removes a segment and returns every frame it holds
    pub fn release_segment(&mut self, id: SegmentId) -> Result<(), SegmentError> {
        self.check_integrity();

        let released = self.registry.release_segment(id, &mut self.frames)?;
        self.stats.record_dirty_discards(released.dirty_pages);

        self.check_integrity();
        Ok(())
    }

    /// Owner of every frame, indexed by frame number
    pub fn memory_map(&self) -> Vec<Option<PageKey>> {
        self.frames.memory_map()
    }

    pub fn stats(&self) -> Stats {
        Stats::collect(
            &self.stats,
            self.frames.used_count(),
            self.frames.total(),
            self.registry.len(),
        )
    }

    /// Event counters
    #[inline]
    pub fn counters(&self) -> &StatsCollector {
        &self.stats
    }

    /// `(frames_used, frames_total)`
    #[inline]
    pub fn memory_utilization(&self) -> (usize, usize) {
        (self.frames.used_count(), self.frames.total())
    }

    #[inline]
    pub fn segment_count(&self) -> usize {
        self.registry.len()
    }

    pub fn segment_info(&self, id: SegmentId) -> Option<SegmentInfo> {
        self.registry
            .get(id)
            .map(|segment| segment.info(self.config.page_size_bytes))
    }

    /// Snapshots of all live segments in ascending id order
    pub fn segments(&self) -> Vec<SegmentInfo> {
        self.registry.infos()
    }

    /// Segment that would be evicted by the next admission eviction
    #[inline]
    pub fn least_recently_used(&self) -> Option<SegmentId> {
        self.registry.least_recently_used()
    }

    #[inline]
    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    #[inline]
    pub fn reclaim_module(&self) -> &R {
        &self.reclaim
    }

    /// Checks that page tables and the frame pool agree on every frame
    #[cfg(debug_assertions)]
    pub(crate) fn check_integrity(&self) {
        self.registry.check_integrity();
        self.frames.check_integrity();

        let mut resident = 0;
        for segment in self.registry.iter() {
            for (vpn, entry) in segment.page_table.entries() {
                assert_eq!(
                    self.frames.owner(entry.pfn),
                    Some(PageKey::new(segment.id, vpn)),
                    "frame {} is not owned by the page mapped to it",
                    entry.pfn
                );
                resident += 1;
            }
        }

        // together with the owner check above: no frame is shared by two pages
        assert_eq!(resident, self.frames.used_count());
        assert_eq!(
            self.frames.used_count() + self.frames.free_count(),
            self.frames.total()
        );
    }

    #[cfg(not(debug_assertions))]
    #[inline]
    pub(crate) fn check_integrity(&self) {
        // check nothing
    }
}
