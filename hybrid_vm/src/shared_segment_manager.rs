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

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{
    address::{PageKey, SegmentId},
    config::ManagerConfig,
    error::{ConfigError, SegmentError, TranslationError},
    modules::reclaim::{FirstResidentReclaimModule, ReclaimModule},
    segment_registry::SegmentInfo,
    stats::Stats,
    translator::{AccessKind, Translation},
    SegmentManager,
};

/// A [`SegmentManager`] that can be shared between threads.
///
/// Every operation that may change state holds the exclusive lock for its
/// whole duration, including any eviction it triggers. Statistics and
/// snapshots only take the shared lock.
pub struct SharedSegmentManager<R: ReclaimModule = FirstResidentReclaimModule> {
    inner: RwLock<SegmentManager<R>>,
}

impl SharedSegmentManager<FirstResidentReclaimModule> {
    pub fn new(config: ManagerConfig) -> Result<Self, ConfigError> {
        Ok(Self::from_manager(SegmentManager::new(config)?))
    }
}

impl<R: ReclaimModule> SharedSegmentManager<R> {
    pub fn from_manager(manager: SegmentManager<R>) -> Self {
        Self {
            inner: RwLock::new(manager),
        }
    }

    pub fn create_segment(&self, id: SegmentId, size_bytes: u64) -> Result<(), SegmentError> {
        self.write().create_segment(id, size_bytes)
    }

    pub fn create_labeled_segment(
        &self,
        id: SegmentId,
        size_bytes: u64,
        label: impl Into<String>,
    ) -> Result<(), SegmentError> {
        self.write().create_labeled_segment(id, size_bytes, label)
    }

    pub fn release_segment(&self, id: SegmentId) -> Result<(), SegmentError> {
        self.write().release_segment(id)
    }

    pub fn translate(&self, id: SegmentId, virtual_address: u64) -> Result<u64, TranslationError> {
        self.write().translate(id, virtual_address)
    }

    pub fn access(
        &self,
        id: SegmentId,
        virtual_address: u64,
        kind: AccessKind,
    ) -> Result<Translation, TranslationError> {
        self.write().access(id, virtual_address, kind)
    }

    pub fn stats(&self) -> Stats {
        self.read().stats()
    }

    pub fn memory_map(&self) -> Vec<Option<PageKey>> {
        self.read().memory_map()
    }

    pub fn segment_info(&self, id: SegmentId) -> Option<SegmentInfo> {
        self.read().segment_info(id)
    }

    /// Runs `f` with shared access to the whole manager
    pub fn with_manager<T>(&self, f: impl FnOnce(&SegmentManager<R>) -> T) -> T {
        f(&self.read())
    }

    pub fn into_inner(self) -> SegmentManager<R> {
        match self.inner.into_inner() {
            Ok(manager) => manager,
            Err(_) => poisoned(),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, SegmentManager<R>> {
        self.inner.read().unwrap_or_else(|_| poisoned())
    }

    fn write(&self) -> RwLockWriteGuard<'_, SegmentManager<R>> {
        self.inner.write().unwrap_or_else(|_| poisoned())
    }
}

/// A panic while holding the lock is always a broken frame or page table
/// invariant, so the state behind the lock cannot be trusted anymore
fn poisoned() -> ! {
    panic!("segment manager is poisoned by an earlier contract violation");
}
