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

use log::{debug, error, trace, warn};

use crate::{
    address::{PageKey, Pfn, SegmentId, Vpn},
    error::TranslationError,
    eviction::reclaim_frame,
    modules::reclaim::ReclaimModule,
    SegmentManager,
};

/// How a translated address is going to be used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    Read,
    /// Marks the page dirty
    Write,
}

/// Outcome of a successful translation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Translation {
    pub physical_address: u64,
    pub pfn: Pfn,
    pub vpn: Vpn,

    /// The page was not resident and had to be faulted in
    pub page_fault: bool,
}

impl<R: ReclaimModule> SegmentManager<R> {
    /// Translates `virtual_address` of segment `id` into a physical address,
    /// faulting the page in if required
    pub fn translate(&mut self, id: SegmentId, virtual_address: u64) -> Result<u64, TranslationError> {
        self.access(id, virtual_address, AccessKind::Read)
            .map(|translation| translation.physical_address)
    }

    pub fn access(
        &mut self,
        id: SegmentId,
        virtual_address: u64,
        kind: AccessKind,
    ) -> Result<Translation, TranslationError> {
        let page_size = self.config.page_size_bytes;

        let segment = self
            .registry
            .get(id)
            .ok_or(TranslationError::UnknownSegment { id })?;
        let split = segment
            .offset_of(virtual_address, page_size)
            .ok_or(TranslationError::OutOfBounds {
                id,
                virtual_address,
                base: segment.base,
                limit: segment.limit,
            })?;

        let touched = self.registry.touch(id);
        debug_assert!(touched, "segment {} vanished after its bounds check", id);
        self.stats.record_translation();

        let key = PageKey::new(id, split.vpn);
        let (pfn, page_fault) = match self.lookup(key) {
            Some(pfn) => {
                self.stats.record_hit();
                (pfn, false)
            }
            None => (self.handle_page_fault(key)?, true),
        };

        if let Some(entry) = self
            .registry
            .get_mut(id)
            .and_then(|segment| segment.page_table.entry_mut(split.vpn))
        {
            entry.status.set_referenced(true);
            if kind == AccessKind::Write {
                entry.status.set_dirty(true);
            }
        }

        let physical_address = split.physical_address(pfn, page_size);
        trace!(
            "Translate {:#x} of segment {} ({}) to {:#x}",
            virtual_address,
            id,
            split,
            physical_address
        );

        Ok(Translation {
            physical_address,
            pfn,
            vpn: split.vpn,
            page_fault,
        })
    }

    #[inline]
    fn lookup(&self, key: PageKey) -> Option<Pfn> {
        self.registry.get(key.segment)?.page_table.lookup(key.vpn)
    }

    /// Maps the non resident page `key` to a frame
    fn handle_page_fault(&mut self, key: PageKey) -> Result<Pfn, TranslationError> {
        self.check_integrity();
        self.stats.record_page_fault();
        trace!("Page fault for {}", key);

        let pfn = self.allocate_frame(key)?;

        let table = match self.registry.get_mut(key.segment) {
            Some(segment) => &mut segment.page_table,
            None => {
                error!("Segment of {} vanished while handling its page fault", key);
                panic!("segment of {} vanished while handling its page fault", key);
            }
        };
        if let Err(err) = table.map(key.vpn, pfn) {
            error!("Page fault for resident page {}: {}", key, err);
            panic!("page fault for resident page {}: {}", key, err);
        }

        self.check_integrity();
        Ok(pfn)
    }

    /// Grants a frame to `key`.
    /// If the pool is exhausted, the reclaim module evicts one resident page first
    fn allocate_frame(&mut self, key: PageKey) -> Result<Pfn, TranslationError> {
        if let Some(pfn) = self.frames.allocate(key) {
            return Ok(pfn);
        }

        warn!(
            "No free frame for {}, try to reclaim one from a resident page...",
            key
        );

        if reclaim_frame(
            &mut self.reclaim,
            &mut self.registry,
            &mut self.frames,
            &mut self.stats,
        )
        .is_none()
        {
            warn!("-> Could not reclaim any frame for {}", key);
            return Err(TranslationError::OutOfMemory { key });
        }

        match self.frames.allocate(key) {
            Some(pfn) => {
                debug!("-> Success! Frame {} is now used by {}", pfn, key);
                Ok(pfn)
            }
            None => {
                warn!("-> Reclaimed frame for {} is gone again", key);
                Err(TranslationError::OutOfMemory { key })
            }
        }
    }
}
