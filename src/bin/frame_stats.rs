//! Frame statistics
//!
//! Decode every frame of a stack in parallel and tabulate the per-frame
//! pixel statistics into a CSV file

use std::{path::PathBuf, time::Instant};

use indicatif::ParallelProgressIterator;
use parse_frames::StackLoader;
use rayon::prelude::*;
use serde::Serialize;
use structopt::StructOpt;

#[derive(Debug, Serialize)]
struct Record {
    frame: String,
    rows: usize,
    cols: usize,
    min: i64,
    max: i64,
    mean: f64,
    median: f64,
}

#[derive(Debug, StructOpt)]
#[structopt(name = "frame_stats", about = "Tabulate per-frame pixel statistics")]
struct Opt {
    /// Path to any frame of the stack; its folder and extension pick the stack
    path: PathBuf,
    /// Keep only the frames whose file stem matches this regular expression
    #[structopt(short = "m", long = "match")]
    filter: Option<String>,
    /// CSV file the statistics are written to
    #[structopt(short, long, default_value = "frame-stats.csv")]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opt = Opt::from_args();

    let mut loader = StackLoader::default().seed(&opt.path);
    if let Some(arg) = opt.filter {
        loader = loader.name_filter(arg);
    }
    let stack = loader.load()?;
    let n_frames = stack.len();
    println!("Found {} {} frames", n_frames, stack.format());

    let now = Instant::now();
    let records = (0..n_frames)
        .into_par_iter()
        .progress_count(n_frames as u64)
        .map(|index| {
            let frame = stack.frame(index)?;
            let (rows, cols) = frame.dim();
            let (min, max) = frame.minmax().unwrap_or_default();
            Ok(Record {
                frame: stack
                    .path(index)
                    .and_then(|path| path.file_name())
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                rows,
                cols,
                min,
                max,
                mean: frame.mean(),
                median: frame.median(),
            })
        })
        .collect::<anyhow::Result<Vec<Record>>>()?;

    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(&opt.output)?;
    wtr.write_record(["Frame", "Rows", "Cols", "Min", "Max", "Mean", "Median"])?;
    for record in &records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;

    println!("{:<24}: {:>8}s", "Statistics", now.elapsed().as_secs());
    println!("Saved to {:?}", opt.output);
    Ok(())
}
