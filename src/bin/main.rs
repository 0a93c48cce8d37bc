use std::path::PathBuf;

use parse_frames::{Session, StackLoader};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "parse-frames",
    about = "Browse a folder of X-ray detector frames from the command line"
)]
struct Opt {
    /// Path to any frame of the stack; its folder and extension pick the stack
    path: PathBuf,
    /// Keep only the frames whose file stem matches this regular expression
    #[structopt(short = "m", long = "match")]
    filter: Option<String>,
    /// Sum the whole stack instead of showing a single frame
    #[structopt(short, long)]
    sum: bool,
    /// Frame to show (0-based, clamped to the stack)
    #[structopt(short, long)]
    frame: Option<usize>,
    /// Hot-pixel level, defaults to the auto threshold
    #[structopt(short, long)]
    level: Option<f64>,
    /// Save the display image to this `.npy` file
    #[structopt(long)]
    npy: Option<PathBuf>,
    /// Save the hot-pixel list to this CSV file
    #[structopt(long)]
    hot: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opt = Opt::from_args();

    let mut loader = StackLoader::default().seed(&opt.path);
    if let Some(arg) = opt.filter {
        loader = loader.name_filter(arg);
    }
    let mut session = Session::new(loader.load()?)?;

    if opt.sum {
        session.toggle_summing();
        for index in 1..session.len() {
            session.goto(index)?;
        }
    } else if let Some(arg) = opt.frame {
        session.goto(arg)?;
    }

    session.summary();

    if let Some(path) = opt.npy {
        session.write_npy(&path)?;
        println!("Display image saved to {:?}", path);
    }
    if let Some(path) = opt.hot {
        let level = opt.level.unwrap_or_else(|| session.value_threshold());
        let mut wtr = csv::Writer::from_path(&path)?;
        for spot in session.hot_pixels(level) {
            wtr.serialize(spot)?;
        }
        wtr.flush()?;
        println!("Hot pixels saved to {:?}", path);
    }
    Ok(())
}
