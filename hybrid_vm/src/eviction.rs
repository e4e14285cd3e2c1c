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

use log::{debug, error, warn};

use crate::{
    address::SegmentId,
    frame_allocator::FrameAllocator,
    modules::reclaim::{EvictedPage, ReclaimList, ReclaimModule},
    segment_registry::SegmentRegistry,
    stats::StatsCollector,
};

/// Releases the least recently used segment so that a new one can be admitted
pub(crate) fn evict_segment_for_admission(
    registry: &mut SegmentRegistry,
    frames: &mut FrameAllocator,
    stats: &mut StatsCollector,
) -> Option<SegmentId> {
    let victim = registry.least_recently_used()?;

    warn!(
        "Segment limit reached, evict least recently used segment {}",
        victim
    );

    // victim was just taken from the registry, release cannot fail
    let released = registry.release_segment(victim, frames).ok()?;
    stats.record_segment_eviction();
    stats.record_dirty_discards(released.dirty_pages);

    Some(victim)
}

/// Lets `module` evict one resident page so its frame becomes free.
///
/// Counts what the module actually evicted through the list. A module that
/// evicts more than one page, or reports a page it did not evict, breaks the
/// frame accounting and aborts execution.
pub(crate) fn reclaim_frame<R: ReclaimModule>(
    module: &mut R,
    registry: &mut SegmentRegistry,
    frames: &mut FrameAllocator,
    stats: &mut StatsCollector,
) -> Option<EvictedPage> {
    let mut list = ReclaimList::new(registry, frames);
    let reported = module.reclaim_frame(&mut list);

    let evicted = match (reported, list.evicted()) {
        (None, []) => return None,
        (Some(reported), [evicted]) if reported == *evicted => *evicted,
        (reported, evicted) => {
            error!(
                "Reclaim module reported {:?} but evicted {:?}",
                reported, evicted
            );
            panic!(
                "reclaim module reported {:?} but evicted {:?}",
                reported, evicted
            );
        }
    };

    debug!(
        "Reclaimed frame {} from {} (dirty: {})",
        evicted.pfn, evicted.key, evicted.was_dirty
    );

    stats.record_frame_eviction();
    if evicted.was_dirty {
        stats.record_dirty_discards(1);
    }

    Some(evicted)
}
