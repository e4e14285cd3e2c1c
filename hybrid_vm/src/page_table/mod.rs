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

use log::trace;

use crate::{
    address::{Pfn, Vpn},
    error::PageTableError,
};

mod page_entry_status;

pub use page_entry_status::PageEntryStatus;

/// A resident page: the frame it lives in and its status bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageTableEntry {
    pub pfn: Pfn,
    pub status: PageEntryStatus,
}

/// Single level page table of one segment.
///
/// Only resident pages have an entry. Entries are kept ordered by VPN so
/// that every scan over them is deterministic.
#[derive(Debug, Default)]
pub struct PageTable {
    entries: BTreeMap<Vpn, PageTableEntry>,
}

impl PageTable {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    #[inline]
    pub fn lookup(&self, vpn: Vpn) -> Option<Pfn> {
        self.entries.get(&vpn).map(|entry| entry.pfn)
    }

    /// Installs a mapping for a page that is not resident yet
    pub fn map(&mut self, vpn: Vpn, pfn: Pfn) -> Result<(), PageTableError> {
        if let Some(entry) = self.entries.get(&vpn) {
            return Err(PageTableError::AlreadyMapped {
                vpn,
                pfn: entry.pfn,
            });
        }

        trace!("Map vpn {} to frame {}", vpn, pfn);
        self.entries.insert(
            vpn,
            PageTableEntry {
                pfn,
                status: PageEntryStatus::new_clean(),
            },
        );

        Ok(())
    }

    /// Removes a mapping and returns the freed frame, if there was one
    #[inline]
    pub fn unmap(&mut self, vpn: Vpn) -> Option<Pfn> {
        self.unmap_entry(vpn).map(|entry| entry.pfn)
    }

    /// Like [`PageTable::unmap`], but keeps the status bits of the removed entry
    pub fn unmap_entry(&mut self, vpn: Vpn) -> Option<PageTableEntry> {
        let entry = self.entries.remove(&vpn)?;
        trace!("Unmap vpn {} from frame {}", vpn, entry.pfn);
        Some(entry)
    }

    /// Resident pages in ascending order
    pub fn resident_vpns(&self) -> impl Iterator<Item = Vpn> + '_ {
        self.entries.keys().copied()
    }

    pub fn entries(&self) -> impl Iterator<Item = (Vpn, &PageTableEntry)> + '_ {
        self.entries.iter().map(|(vpn, entry)| (*vpn, entry))
    }

    #[inline]
    pub fn entry(&self, vpn: Vpn) -> Option<&PageTableEntry> {
        self.entries.get(&vpn)
    }

    #[inline]
    pub fn entry_mut(&mut self, vpn: Vpn) -> Option<&mut PageTableEntry> {
        self.entries.get_mut(&vpn)
    }

    /// Removes every mapping and yields the removed entries in ascending order
    pub(crate) fn drain(&mut self) -> impl Iterator<Item = (Vpn, PageTableEntry)> {
        core::mem::take(&mut self.entries).into_iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::PageTable;
    use crate::error::PageTableError;

    #[test]
    fn test_map_and_lookup() {
        let mut table = PageTable::new();
        assert_eq!(table.lookup(0), None);

        table.map(0, 5).unwrap();
        table.map(3, 1).unwrap();

        assert_eq!(table.lookup(0), Some(5));
        assert_eq!(table.lookup(3), Some(1));
        assert_eq!(table.lookup(1), None);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_map_twice_fails() {
        let mut table = PageTable::new();
        table.map(2, 9).unwrap();

        assert_eq!(
            table.map(2, 4),
            Err(PageTableError::AlreadyMapped { vpn: 2, pfn: 9 })
        );
        // original mapping is untouched
        assert_eq!(table.lookup(2), Some(9));
    }

    #[test]
    fn test_unmap_is_idempotent() {
        let mut table = PageTable::new();
        table.map(1, 3).unwrap();

        assert_eq!(table.unmap(1), Some(3));
        assert_eq!(table.unmap(1), None);
        assert!(table.is_empty());

        // can be mapped again afterwards
        table.map(1, 0).unwrap();
        assert_eq!(table.lookup(1), Some(0));
    }

    #[test]
    fn test_resident_vpns_are_ordered() {
        let mut table = PageTable::new();
        for (vpn, pfn) in [(7, 0), (2, 1), (4, 2), (0, 3)] {
            table.map(vpn, pfn).unwrap();
        }

        let vpns: Vec<_> = table.resident_vpns().collect();
        assert_eq!(vpns, vec![0, 2, 4, 7]);
    }

    #[test]
    fn test_unmap_entry_keeps_status() {
        let mut table = PageTable::new();
        table.map(0, 2).unwrap();
        table.entry_mut(0).unwrap().status.set_dirty(true);

        let entry = table.unmap_entry(0).unwrap();
        assert_eq!(entry.pfn, 2);
        assert!(entry.status.is_dirty());
    }

    #[test]
    fn test_drain() {
        let mut table = PageTable::new();
        table.map(3, 0).unwrap();
        table.map(1, 1).unwrap();

        let drained: Vec<_> = table.drain().map(|(vpn, entry)| (vpn, entry.pfn)).collect();
        assert_eq!(drained, vec![(1, 1), (3, 0)]);
        assert!(table.is_empty());
    }
}
