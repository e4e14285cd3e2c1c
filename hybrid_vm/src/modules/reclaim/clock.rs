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

use super::{EvictedPage, ReclaimList, ReclaimModule};

/// Second chance replacement over the frame pool.
///
/// A hand sweeps the frames in circular order. A page with its referenced
/// bit set loses the bit and is skipped, the first page found without it is
/// evicted. The hand then rests on the frame after the victim.
pub struct ClockReclaimModule {
    hand: usize,
}

impl ClockReclaimModule {
    /// Frame the next sweep starts at
    pub fn hand(&self) -> usize {
        self.hand
    }
}

impl ReclaimModule for ClockReclaimModule {
    fn new() -> Self {
        Self { hand: 0 }
    }

    fn reclaim_frame(&mut self, list: &mut ReclaimList<'_>) -> Option<EvictedPage> {
        let frame_count = list.frame_count();
        if frame_count == 0 {
            return None;
        }

        // first sweep clears every referenced bit at worst,
        // so the second sweep is guaranteed to find a victim
        for _ in 0..2 * frame_count {
            let pfn = self.hand % frame_count;
            self.hand = (pfn + 1) % frame_count;

            let Some(key) = list.owner(pfn) else {
                // free frame, nothing to evict here
                continue;
            };

            if list.clear_referenced(key) {
                trace!("Clock: give {} in frame {} a second chance", key, pfn);
                continue;
            }

            return list.evict(key);
        }

        // only free frames left
        None
    }
}
