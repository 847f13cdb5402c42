//! # Pagegen Preview
//!
//! Loads one page template, resolves it and prints the passability grid.
//! A developer tool for checking templates; the game links the library.

use clap::Parser;
use log::{error, info};
use pagegen::{DoorDirection, LoadError, PageConfig, PageLoader, PageResult, SymmetryOp};
use std::path::PathBuf;

/// Command line arguments for the page previewer.
#[derive(Parser, Debug)]
#[command(name = "pagegen")]
#[command(about = "Preview randomized level pages built from tile templates")]
#[command(version)]
struct Args {
    /// Template file (Tiled-style TMX)
    template: PathBuf,

    /// Random seed for symmetry selection and coin draws
    #[arg(short, long)]
    seed: Option<u64>,

    /// Carve a door on this edge (up, down, left, right); may be repeated
    #[arg(short, long)]
    door: Vec<DoorDirection>,

    /// JSON page configuration (rule table, fallback page)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of pages to generate from the template
    #[arg(short, long, default_value_t = 1)]
    count: usize,

    /// Show the fallback page instead of failing on a bad template
    #[arg(long)]
    fallback: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() {
    let args = Args::parse();
    initialize_logging(&args.log_level);

    info!("Starting pagegen v{}", pagegen::VERSION);

    if let Err(err) = run(&args) {
        error!("{}", err);
        std::process::exit(1);
    }
}

/// Initializes env_logger, letting `RUST_LOG` override the flag.
fn initialize_logging(log_level: &str) {
    env_logger::Builder::new()
        .parse_filters(log_level)
        .parse_default_env()
        .format_target(false)
        .init();
}

fn run(args: &Args) -> PageResult<()> {
    let mut config = match &args.config {
        Some(path) => PageConfig::from_json_file(path)?,
        None => PageConfig::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    let mut loader = PageLoader::from_files(config);

    for index in 0..args.count {
        let (mut page, op) = match load(&mut loader, args) {
            Ok(loaded) => loaded,
            Err(err) if args.fallback && err.is_fallback_eligible() => {
                info!("Template unusable ({}), showing fallback page", err);
                (loader.fallback_page(), SymmetryOp::Identity)
            }
            Err(err) => return Err(err),
        };

        for &direction in &args.door {
            pagegen::carve_door(&mut page, direction);
        }

        println!("page {} ({}), {} solid cells", index + 1, op, page.solid_count());
        print!("{}", page);
    }

    Ok(())
}

fn load(
    loader: &mut PageLoader,
    args: &Args,
) -> Result<(pagegen::PassabilityGrid, SymmetryOp), LoadError> {
    let grid = loader.load_grid(&args.template)?;
    let op = grid.chosen_op();
    Ok((loader.resolve(&grid), op))
}
