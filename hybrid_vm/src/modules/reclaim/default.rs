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

use super::{EvictedPage, ReclaimList, ReclaimModule};

/// Evicts the first resident page in stable order: live segments by
/// ascending id, then their resident pages by ascending vpn.
///
/// Completely stateless.
pub struct FirstResidentReclaimModule;

impl ReclaimModule for FirstResidentReclaimModule {
    fn new() -> Self {
        Self
    }

    fn reclaim_frame(&mut self, list: &mut ReclaimList<'_>) -> Option<EvictedPage> {
        let victim = list.resident_pages().next()?;
        list.evict(victim)
    }
}

#[cfg(test)]
mod test {
    use super::FirstResidentReclaimModule;
    use crate::{
        address::PageKey,
        frame_allocator::FrameAllocator,
        modules::reclaim::{
            test::{populate, reclaim, PAGE_SIZE},
            ReclaimModule,
        },
        segment_registry::SegmentRegistry,
    };

    #[test]
    fn test_evicts_in_stable_order() {
        let mut registry = SegmentRegistry::new(4, PAGE_SIZE);
        let mut frames = FrameAllocator::new(4).unwrap();
        populate(
            &mut registry,
            &mut frames,
            &[
                PageKey::new(2, 0),
                PageKey::new(1, 5),
                PageKey::new(2, 1),
                PageKey::new(1, 2),
            ],
        );

        let mut module = FirstResidentReclaimModule::new();
        let order: Vec<_> = (0..4)
            .map(|_| reclaim(&mut module, &mut registry, &mut frames).unwrap())
            .collect();

        assert_eq!(
            order,
            vec![
                PageKey::new(1, 2),
                PageKey::new(1, 5),
                PageKey::new(2, 0),
                PageKey::new(2, 1)
            ]
        );

        assert_eq!(reclaim(&mut module, &mut registry, &mut frames), None);
        assert_eq!(frames.free_count(), 4);
    }
}
