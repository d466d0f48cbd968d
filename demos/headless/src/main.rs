// Copyright 2026 the Binrast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Headless

#![allow(clippy::print_stdout, reason = "Command line demo")]

use std::time::Instant;

use anyhow::{bail, Result};
use binrast::{
    BinQueueConfig, BinRasterizer, BinnedTriangles, BinningParams, OverflowPolicy,
    RasterizerOptions, ScreenDimension, Triangles,
};
use clap::{Parser, ValueEnum};

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    if args.workgroups.len() != 2 {
        bail!("--workgroups takes two values, got {:?}", args.workgroups);
    }

    let triangles = generate(&args);
    log::info!(
        "Generated {} {:?} triangles with seed {}",
        triangles.len(),
        args.scene,
        args.seed
    );

    let overflow_policy = match args.max_queue_size {
        Some(max_queue_size) => OverflowPolicy::GrowQueue { max_queue_size },
        None => OverflowPolicy::Report,
    };
    let mut rasterizer = BinRasterizer::new(RasterizerOptions {
        workgroups: (args.workgroups[0], args.workgroups[1]),
        overflow_policy,
    })?;
    let params = BinningParams {
        screen_dimension: ScreenDimension::new(args.width, args.height),
        bin_queue_config: BinQueueConfig::new(args.bin_width, args.bin_height, args.queue_size),
    };

    let start = Instant::now();
    let binned = rasterizer.bin_with_retry(&triangles, &params)?;
    let elapsed = start.elapsed();
    print_occupancy(&binned);
    println!(
        "Binned {} triangles in {:.2?} with a queue size of {}",
        triangles.len(),
        elapsed,
        binned.config().gpu.queues.queue_size
    );
    Ok(())
}

fn print_occupancy(binned: &BinnedTriangles<'_>) {
    let gpu = &binned.config().gpu;
    let counts: Vec<Vec<usize>> = (0..gpu.bins_y)
        .map(|y| {
            (0..gpu.bins_x)
                .map(|x| binned.bin_triangles(x, y).len())
                .collect()
        })
        .collect();
    let width = counts
        .iter()
        .flatten()
        .map(|count| count.to_string().len())
        .max()
        .unwrap_or(1);
    println!(
        "{}x{} bins of {}x{} pixels:",
        gpu.bins_x, gpu.bins_y, gpu.queues.bin_width, gpu.queues.bin_height
    );
    for row in &counts {
        let cells: Vec<String> = row.iter().map(|count| format!("{count:>width$}")).collect();
        println!("  {}", cells.join(" "));
    }
    let total: usize = counts.iter().flatten().sum();
    let fullest = counts.iter().flatten().max().copied().unwrap_or(0);
    println!("{total} entries, fullest bin holds {fullest}");
}

fn generate(args: &Args) -> Triangles {
    match args.scene {
        Scene::Random => {
            scenes::random_triangles(args.seed, args.triangles, args.render_dimension, 1.2)
        }
        Scene::Small => {
            scenes::small_triangles(args.seed, args.triangles, args.render_dimension, args.size)
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Scene {
    /// Triangles with vertices anywhere around the screen
    Random,
    /// Triangles no larger than `--size` at random positions
    Small,
}

#[derive(Parser, Debug)]
#[command(about, long_about = None, bin_name = "cargo run -p headless --")]
struct Args {
    /// Width of the screen in pixels
    #[arg(long, default_value_t = 1024)]
    width: u32,
    /// Height of the screen in pixels
    #[arg(long, default_value_t = 768)]
    height: u32,
    #[arg(long, default_value_t = 64)]
    bin_width: u32,
    #[arg(long, default_value_t = 64)]
    bin_height: u32,
    /// Maximum number of triangles per bin
    #[arg(long, short, default_value_t = 256)]
    queue_size: u32,
    /// Grow the queue size up to this value when a bin overflows
    #[arg(long)]
    max_queue_size: Option<u32>,
    /// Number of workgroups along x and y
    #[arg(long, num_args = 2, default_values_t = [1, 1])]
    workgroups: Vec<u32>,
    /// Number of triangles to generate
    #[arg(long, short, default_value_t = 10_000)]
    triangles: usize,
    /// Floats per point
    #[arg(long, default_value_t = 3)]
    render_dimension: u32,
    #[arg(long, value_enum, default_value_t = Scene::Small)]
    scene: Scene,
    /// Size of small triangles, in NDC
    #[arg(long, default_value_t = 0.05)]
    size: f32,
    #[arg(long, default_value_t = 0)]
    seed: u64,
}
