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

/// Event counters of a [`crate::SegmentManager`].
///
/// All counters only ever grow. They are updated by the translator and the
/// eviction paths at the moment the counted event completes, callers can
/// only read them.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StatsCollector {
    page_faults: u64,
    segment_evictions: u64,
    frame_evictions: u64,
    translations: u64,
    hits: u64,
    dirty_discards: u64,
}

impl StatsCollector {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn page_fault_count(&self) -> u64 {
        self.page_faults
    }

    #[inline]
    pub fn segment_eviction_count(&self) -> u64 {
        self.segment_evictions
    }

    #[inline]
    pub fn frame_eviction_count(&self) -> u64 {
        self.frame_evictions
    }

    /// Translation requests that passed the bounds check
    #[inline]
    pub fn translation_count(&self) -> u64 {
        self.translations
    }

    /// Translation requests served without a page fault
    #[inline]
    pub fn hit_count(&self) -> u64 {
        self.hits
    }

    /// Dirty pages whose content was thrown away by an eviction or release
    #[inline]
    pub fn dirty_discard_count(&self) -> u64 {
        self.dirty_discards
    }

    /// Share of translations that faulted, `0.0` before the first translation
    pub fn page_fault_rate(&self) -> f64 {
        if self.translations == 0 {
            return 0.0;
        }

        self.page_faults as f64 / self.translations as f64
    }

    #[inline]
    pub(crate) fn record_translation(&mut self) {
        self.translations += 1;
    }

    #[inline]
    pub(crate) fn record_hit(&mut self) {
        self.hits += 1;
    }

    #[inline]
    pub(crate) fn record_page_fault(&mut self) {
        self.page_faults += 1;
    }

    #[inline]
    pub(crate) fn record_segment_eviction(&mut self) {
        self.segment_evictions += 1;
    }

    #[inline]
    pub(crate) fn record_frame_eviction(&mut self) {
        self.frame_evictions += 1;
    }

    #[inline]
    pub(crate) fn record_dirty_discards(&mut self, count: usize) {
        self.dirty_discards += count as u64;
    }
}

/// Point in time snapshot for reporting layers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Stats {
    pub page_faults: u64,
    pub segment_evictions: u64,
    pub frames_used: usize,
    pub frames_total: usize,
    pub live_segments: usize,

    pub frame_evictions: u64,
    pub translations: u64,
    pub hits: u64,
    pub dirty_discards: u64,
}

impl Stats {
    pub(crate) fn collect(
        counters: &StatsCollector,
        frames_used: usize,
        frames_total: usize,
        live_segments: usize,
    ) -> Self {
        Self {
            page_faults: counters.page_faults,
            segment_evictions: counters.segment_evictions,
            frames_used,
            frames_total,
            live_segments,
            frame_evictions: counters.frame_evictions,
            translations: counters.translations,
            hits: counters.hits,
            dirty_discards: counters.dirty_discards,
        }
    }

    #[inline]
    pub fn frames_free(&self) -> usize {
        self.frames_total - self.frames_used
    }
}
