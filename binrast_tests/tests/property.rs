// Copyright 2026 the Binrast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Properties of binning results over generated scenes.

#![allow(clippy::missing_assert_message)]

use anyhow::Result;
use binrast::{Bin, BinQueueConfig, BinRasterizer, QueueLayout, ScreenDimension};
use binrast_tests::{bin_and_compare, bin_once, scenes, TestParams};

#[test]
fn matches_oracle_on_random_scenes() -> Result<()> {
    let cases = [
        (1_u64, 100, 64, 64, 32, 32),
        (2, 700, 100, 75, 16, 16),
        (3, 1000, 257, 129, 32, 16),
        (4, 300, 31, 47, 8, 12),
        (5, 0, 64, 64, 32, 32),
    ];
    for (seed, count, width, height, bin_width, bin_height) in cases {
        let triangles = scenes::random_triangles(seed, count, 3, 1.2);
        let params = TestParams {
            bin_width,
            bin_height,
            queue_size: count as u32 + 1,
            ..TestParams::new(format!("random_{seed}"), width, height)
        };
        bin_and_compare(&triangles, &params)?;
    }
    Ok(())
}

#[test]
fn matches_oracle_with_extra_axes() -> Result<()> {
    let triangles = scenes::random_triangles(11, 600, 7, 1.0);
    let params = TestParams {
        queue_size: 600,
        ..TestParams::new("extra_axes", 96, 96)
    };
    bin_and_compare(&triangles, &params)?;
    Ok(())
}

#[test]
fn small_triangles_touch_few_bins() -> Result<()> {
    let triangles = scenes::small_triangles(21, 2000, 3, 0.02);
    let params = TestParams {
        bin_width: 16,
        bin_height: 16,
        queue_size: 2000,
        ..TestParams::new("small_triangles", 128, 128)
    };
    let lists = bin_and_compare(&triangles, &params)?;
    let hits: usize = lists.bins.iter().map(Vec::len).sum();
    // Every triangle is on screen, and none spans more than 2x2 bins.
    assert!(hits >= triangles.len());
    assert!(hits <= 4 * triangles.len());
    Ok(())
}

#[test]
fn queues_are_strictly_increasing() -> Result<()> {
    let triangles = scenes::random_triangles(31, 1500, 3, 1.1);
    let params = TestParams {
        queue_size: 1500,
        workgroups: (2, 2),
        ..TestParams::new("strictly_increasing", 80, 80)
    };
    let mut rasterizer = BinRasterizer::new(params.options())?;
    let binned = rasterizer.bin(&triangles, &params.binning_params())?;
    assert!(!binned.has_overflow());
    let queues = binned.queues();
    let layout = *queues.layout();
    for layer in 0..layout.layers {
        for y in 0..layout.bins_y {
            for x in 0..layout.bins_x {
                let entries: Vec<u32> = queues.queue(layer, x, y).iter().collect();
                assert!(
                    entries.windows(2).all(|pair| pair[0] < pair[1]),
                    "layer {layer} bin ({x}, {y}): {entries:?}"
                );
            }
        }
    }
    // Batches go to exactly one workgroup, so layers never share a triangle.
    for y in 0..layout.bins_y {
        for x in 0..layout.bins_x {
            let merged = binned.bin_triangles(x, y);
            assert!(merged.windows(2).all(|pair| pair[0] < pair[1]));
        }
    }
    Ok(())
}

#[test]
fn workgroups_agree_with_a_single_workgroup() -> Result<()> {
    let triangles = scenes::random_triangles(41, 2500, 4, 1.3);
    let single = TestParams {
        bin_width: 16,
        bin_height: 16,
        queue_size: 2500,
        ..TestParams::new("single_workgroup", 64, 48)
    };
    let expected = bin_once(&triangles, &single)?;
    assert!(!expected.has_overflow);
    for workgroups in [(2, 1), (1, 3), (3, 2)] {
        let params = TestParams {
            bin_width: 16,
            bin_height: 16,
            queue_size: 2500,
            workgroups,
            ..TestParams::new(format!("workgroups_{workgroups:?}"), 64, 48)
        };
        assert_eq!(bin_once(&triangles, &params)?, expected, "{}", params.name);
    }
    Ok(())
}

#[test]
fn every_bin_sees_every_batch() -> Result<()> {
    let count = 3 * binrast::BATCH_COUNT as usize + 17;
    let triangles = scenes::full_screen(count);
    let params = TestParams {
        bin_width: 24,
        bin_height: 24,
        queue_size: count as u32,
        workgroups: (2, 1),
        ..TestParams::new("every_bin_sees_every_batch", 70, 50)
    };
    let lists = bin_and_compare(&triangles, &params)?;
    let all: Vec<u32> = (0..count as u32).collect();
    assert!(lists.bins.iter().all(|bin| *bin == all));
    Ok(())
}

#[test]
fn grid_scene_puts_one_triangle_per_bin() -> Result<()> {
    let triangles = scenes::grid(4, 3);
    let params = TestParams {
        bin_width: 16,
        bin_height: 16,
        queue_size: 1,
        ..TestParams::new("grid_scene", 64, 48)
    };
    let lists = bin_and_compare(&triangles, &params)?;
    for y in 0..3 {
        for x in 0..4 {
            assert_eq!(lists.bin(x, y), [y * 4 + x]);
        }
    }
    Ok(())
}

#[test]
fn queue_regions_are_disjoint() {
    for (queue_size, bins_x, bins_y, layers) in [(1, 1, 1, 1), (4, 3, 2, 2), (7, 5, 4, 3)] {
        let layout = QueueLayout {
            queue_size,
            bins_x,
            bins_y,
            layers,
        };
        let mut owners = vec![0_u32; layout.len()];
        for layer in 0..layers {
            for y in 0..bins_y {
                for x in 0..bins_x {
                    for slot in layout.region(layer, x, y) {
                        owners[slot] += 1;
                    }
                }
            }
        }
        assert!(owners.iter().all(|&count| count == 1), "{layout:?}");
    }
}

#[test]
fn boundary_bins_end_at_the_screen_edge() {
    for (width, height, bin_width, bin_height) in [(64, 64, 32, 32), (100, 75, 32, 16), (7, 5, 3, 2)]
    {
        let screen = ScreenDimension::new(width, height);
        let config = BinQueueConfig::new(bin_width, bin_height, 1);
        let (bins_x, bins_y) = (config.bins_x(screen), config.bins_y(screen));
        for y in 0..bins_y {
            let last = Bin::from_grid(screen, &config, bins_x - 1, y);
            assert_eq!(last.x + last.width, width);
        }
        for x in 0..bins_x {
            let last = Bin::from_grid(screen, &config, x, bins_y - 1);
            assert_eq!(last.y + last.height, height);
        }
        let covered: u32 = (0..bins_y)
            .flat_map(|y| (0..bins_x).map(move |x| (x, y)))
            .map(|(x, y)| {
                let bin = Bin::from_grid(screen, &config, x, y);
                bin.width * bin.height
            })
            .sum();
        assert_eq!(covered, width * height);
    }
}
