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

use log::{error, trace};

use crate::{
    address::{PageKey, Pfn},
    error::{ConfigError, FrameError},
};

/// Owns the fixed pool of physical frames.
///
/// Every granted frame remembers the page it was granted to, so the pool
/// doubles as the reverse map from frame to page. Frames are handed out
/// from 0 upward, released frames are reused first.
pub struct FrameAllocator {
    /// Owner of every frame below the watermark, `None` if the frame was
    /// released again. Capacity is reserved for the whole pool up front
    owners: Vec<Option<PageKey>>,

    total: usize,

    /// Released frames below the watermark, the next one to hand out is at the end
    released: Vec<Pfn>,
}

impl FrameAllocator {
    /// Creates a pool of `total_frames` free frames.
    ///
    /// Only the owner table is reserved here, frames are initialized on
    /// first use. Fails if the table cannot be reserved on this target.
    pub fn new(total_frames: u64) -> Result<Self, ConfigError> {
        let too_large = ConfigError::FramePoolTooLarge {
            frames: total_frames,
        };
        let total = usize::try_from(total_frames).map_err(|_| too_large)?;

        let mut owners = Vec::new();
        owners.try_reserve_exact(total).map_err(|_| too_large)?;

        Ok(Self {
            owners,
            total,
            released: Vec::new(),
        })
    }

    /// Grants a free frame to `owner` or returns `None` if the pool is exhausted
    pub fn allocate(&mut self, owner: PageKey) -> Option<Pfn> {
        let pfn = match self.released.pop() {
            Some(pfn) => {
                debug_assert!(
                    self.owners[pfn].is_none(),
                    "released frame {} is owned by {:?}",
                    pfn,
                    self.owners[pfn]
                );
                self.owners[pfn] = Some(owner);
                pfn
            }
            None if self.owners.len() < self.total => {
                // within the reserved capacity, never reallocates
                self.owners.push(Some(owner));
                self.owners.len() - 1
            }
            None => return None,
        };

        trace!("Grant frame {} to {}", pfn, owner);
        Some(pfn)
    }

    /// Returns `pfn` to the pool and returns the page that owned it
    pub fn release(&mut self, pfn: Pfn) -> Result<PageKey, FrameError> {
        if pfn >= self.total {
            return Err(FrameError::InvalidFrame {
                pfn,
                total_frames: self.total,
            });
        }

        // frames above the watermark were never granted
        let owner = self
            .owners
            .get_mut(pfn)
            .and_then(Option::take)
            .ok_or(FrameError::DoubleFree { pfn })?;

        self.released.push(pfn);
        trace!("Release frame {} (was owned by {})", pfn, owner);

        Ok(owner)
    }

    /// Releases a frame that is known to belong to `expected_owner`.
    ///
    /// Any failure means the one-frame-one-owner invariant is broken and
    /// aborts execution.
    pub(crate) fn release_owned(&mut self, pfn: Pfn, expected_owner: PageKey) {
        match self.release(pfn) {
            Ok(owner) if owner == expected_owner => {}
            Ok(owner) => {
                error!(
                    "Frame {} was released for {} but was owned by {}",
                    pfn, expected_owner, owner
                );
                panic!(
                    "frame {} was released for {} but was owned by {}",
                    pfn, expected_owner, owner
                );
            }
            Err(err) => {
                error!("Frame contract violated while releasing {}: {}", expected_owner, err);
                panic!("frame contract violated while releasing {}: {}", expected_owner, err);
            }
        }
    }

    #[inline]
    pub fn owner(&self, pfn: Pfn) -> Option<PageKey> {
        self.owners.get(pfn).copied().flatten()
    }

    #[inline]
    pub fn total(&self) -> usize {
        self.total
    }

    #[inline]
    pub fn free_count(&self) -> usize {
        (self.total - self.owners.len()) + self.released.len()
    }

    #[inline]
    pub fn used_count(&self) -> usize {
        self.total() - self.free_count()
    }

    /// Point in time copy of the frame owners, indexed by frame number
    pub fn memory_map(&self) -> Vec<Option<PageKey>> {
        let mut map = self.owners.clone();
        map.resize(self.total, None);
        map
    }

    #[cfg(debug_assertions)]
    pub(crate) fn check_integrity(&self) {
        assert!(self.owners.len() <= self.total);

        let mut is_released = vec![false; self.owners.len()];
        for &pfn in self.released.iter() {
            assert!(pfn < self.owners.len(), "frame {} was released but never granted", pfn);
            assert!(!is_released[pfn], "frame {} was released twice", pfn);
            assert!(self.owners[pfn].is_none(), "released frame {} has an owner", pfn);
            is_released[pfn] = true;
        }

        let owned = self.owners.iter().filter(|owner| owner.is_some()).count();
        assert_eq!(owned + self.released.len(), self.owners.len());
    }

    #[cfg(not(debug_assertions))]
    #[inline]
    pub(crate) fn check_integrity(&self) {
        // check nothing
    }
}

#[cfg(test)]
mod test {
    use super::FrameAllocator;
    use crate::{
        address::PageKey,
        error::{ConfigError, FrameError},
    };

    #[test]
    fn test_allocate_until_exhausted() {
        let mut frames = FrameAllocator::new(3).unwrap();
        assert_eq!(frames.total(), 3);
        assert_eq!(frames.free_count(), 3);

        for vpn in 0..3 {
            let pfn = frames.allocate(PageKey::new(1, vpn)).unwrap();
            // fresh pool hands out frames in ascending order
            assert_eq!(pfn, vpn as usize);
            frames.check_integrity();
        }

        assert_eq!(frames.allocate(PageKey::new(1, 3)), None);
        assert_eq!(frames.used_count(), 3);
        assert_eq!(frames.free_count(), 0);
    }

    #[test]
    fn test_release_returns_owner() {
        let mut frames = FrameAllocator::new(2).unwrap();
        let key = PageKey::new(7, 42);
        let pfn = frames.allocate(key).unwrap();

        assert_eq!(frames.owner(pfn), Some(key));
        assert_eq!(frames.release(pfn), Ok(key));
        assert_eq!(frames.owner(pfn), None);
        assert_eq!(frames.used_count(), 0);
        frames.check_integrity();
    }

    #[test]
    fn test_released_frame_is_reused_first() {
        let mut frames = FrameAllocator::new(4).unwrap();
        for vpn in 0..4 {
            frames.allocate(PageKey::new(0, vpn)).unwrap();
        }

        frames.release(2).unwrap();
        assert_eq!(frames.allocate(PageKey::new(1, 0)), Some(2));
        assert_eq!(frames.owner(2), Some(PageKey::new(1, 0)));
    }

    #[test]
    fn test_release_contract_violations() {
        let mut frames = FrameAllocator::new(2).unwrap();
        let pfn = frames.allocate(PageKey::new(0, 0)).unwrap();
        frames.release(pfn).unwrap();

        assert_eq!(frames.release(pfn), Err(FrameError::DoubleFree { pfn }));
        assert_eq!(
            frames.release(2),
            Err(FrameError::InvalidFrame {
                pfn: 2,
                total_frames: 2
            })
        );

        // failed releases must not corrupt the pool
        frames.check_integrity();
        assert_eq!(frames.free_count(), 2);
    }

    #[test]
    #[should_panic]
    fn test_release_owned_aborts_on_wrong_owner() {
        let mut frames = FrameAllocator::new(1).unwrap();
        let pfn = frames.allocate(PageKey::new(0, 0)).unwrap();
        frames.release_owned(pfn, PageKey::new(0, 1));
    }

    #[test]
    fn test_empty_pool() {
        let mut frames = FrameAllocator::new(0).unwrap();
        assert_eq!(frames.allocate(PageKey::new(0, 0)), None);
        assert_eq!(frames.owner(0), None);
        assert!(frames.memory_map().is_empty());
    }

    #[test]
    fn test_pool_larger_than_address_space() {
        assert_eq!(
            FrameAllocator::new(u64::MAX).err(),
            Some(ConfigError::FramePoolTooLarge { frames: u64::MAX })
        );
    }

    #[test]
    fn test_large_pool_is_initialized_lazily() {
        let mut frames = FrameAllocator::new(1 << 20).unwrap();
        assert_eq!(frames.free_count(), 1 << 20);

        assert_eq!(frames.allocate(PageKey::new(0, 0)), Some(0));
        assert_eq!(frames.allocate(PageKey::new(0, 1)), Some(1));
        frames.release(0).unwrap();

        // frames above the watermark are free, not unknown
        assert_eq!(frames.release(5), Err(FrameError::DoubleFree { pfn: 5 }));
        assert_eq!(frames.allocate(PageKey::new(0, 2)), Some(0));
        assert_eq!(frames.used_count(), 2);
        assert_eq!(frames.memory_map().len(), 1 << 20);
        frames.check_integrity();
    }
}
