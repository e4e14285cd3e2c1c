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

use std::{error::Error, thread};

use env_logger::{Builder, Env};
use hybrid_vm::{
    modules::reclaim::ClockReclaimModule, AccessKind, ManagerConfig, SegmentManager,
    SharedSegmentManager,
};
use log::info;

const PAGE_SIZE: u64 = 256;
const TILE_SIZE: u64 = 64;
const TILES: u64 = 48;
const WORKERS: u32 = 3;

/// Streams tiles from an input segment through a filter stage into an
/// output segment. The working set is larger than physical memory, so
/// every pass keeps evicting pages of the previous one.
fn run_single_threaded() -> Result<(), Box<dyn Error>> {
    let mut manager = SegmentManager::<ClockReclaimModule>::with_reclaim_module(ManagerConfig {
        total_memory_bytes: 16 * PAGE_SIZE,
        page_size_bytes: PAGE_SIZE,
        max_segments: 3,
    })?;

    manager.create_labeled_segment(1, TILES * TILE_SIZE, "input")?;
    manager.create_labeled_segment(2, TILES * TILE_SIZE, "output")?;
    manager.create_labeled_segment(3, 4 * TILE_SIZE, "kernel")?;

    let input = manager.segment_info(1).map(|info| info.base).unwrap_or_default();
    let output = manager.segment_info(2).map(|info| info.base).unwrap_or_default();
    let kernel = manager.segment_info(3).map(|info| info.base).unwrap_or_default();

    for pass in 0..3 {
        for tile in 0..TILES {
            let offset = tile * TILE_SIZE;
            manager.access(3, kernel + (tile % 4) * TILE_SIZE, AccessKind::Read)?;
            manager.access(1, input + offset, AccessKind::Read)?;
            manager.access(2, output + offset, AccessKind::Write)?;
        }
        info!("pass {} done: {:?}", pass, manager.stats());
    }

    // a fourth segment pushes out the least used one
    manager.create_labeled_segment(4, 8 * TILE_SIZE, "histogram")?;
    for segment in manager.segments() {
        info!("live segment: {:?}", segment);
    }

    println!("{}", serde_json::to_string_pretty(&manager.stats())?);
    Ok(())
}

/// Every worker owns one tile segment and all of them share the frame pool
fn run_workers() -> Result<(), Box<dyn Error>> {
    let manager = SharedSegmentManager::new(ManagerConfig {
        total_memory_bytes: 8 * PAGE_SIZE,
        page_size_bytes: PAGE_SIZE,
        max_segments: WORKERS as usize,
    })?;

    for worker in 0..WORKERS {
        manager.create_labeled_segment(worker, TILES * TILE_SIZE, format!("worker {}", worker))?;
    }

    thread::scope(|scope| {
        let handles: Vec<_> = (0..WORKERS)
            .map(|worker| {
                let manager = &manager;
                scope.spawn(move || {
                    let base = manager
                        .segment_info(worker)
                        .map(|info| info.base)
                        .unwrap_or_default();

                    for tile in 0..TILES {
                        manager.access(worker, base + tile * TILE_SIZE, AccessKind::Write)?;
                    }
                    Ok::<_, hybrid_vm::TranslationError>(())
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| match handle.join() {
                Ok(result) => result,
                Err(panic) => std::panic::resume_unwind(panic),
            })
            .collect::<Result<Vec<_>, _>>()
    })?;

    println!("{}", serde_json::to_string_pretty(&manager.stats())?);
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_module_path(false)
        .init();

    info!("run single threaded pipeline");
    run_single_threaded()?;

    info!("run {} workers on a shared manager", WORKERS);
    run_workers()?;

    Ok(())
}
