use std::path::PathBuf;
use std::process;

use clap::{CommandFactory, Parser};

use facegrep_cli::{
    build_config, init_logging, parse_args, progress_printer, require_dir, require_threshold,
    UsageError,
};
use facegrep_core::detection::domain::detector_kind::DetectorKind;
use facegrep_core::discovery::file_finder;
use facegrep_core::pipeline::infrastructure::component_factory::create_cluster_use_case;
use facegrep_core::shared::constants::DEFAULT_THRESHOLD;

/// Group the faces found in a directory of images by identity.
#[derive(Parser)]
#[command(name = "facecluster")]
struct Cli {
    /// Directory searched recursively for images.
    search_dir: PathBuf,

    /// Use the accurate (slower) face detector.
    #[arg(short, long)]
    mmod: bool,

    /// Average embeddings over jittered crops.
    #[arg(short, long)]
    jitter: bool,

    /// Face difference threshold; lower keeps identities apart more strictly.
    #[arg(short, long, default_value_t = DEFAULT_THRESHOLD)]
    threshold: f32,

    /// Seed for jitter sampling and clustering order.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() {
    init_logging();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        if e.is::<UsageError>() {
            eprintln!("\n{}", Cli::command().render_usage());
        }
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli: Cli = parse_args()?;
    require_dir(&cli.search_dir, "Search directory")?;
    let threshold = require_threshold(cli.threshold)?;

    let kind = if cli.mmod {
        DetectorKind::Accurate
    } else {
        DetectorKind::Fast
    };
    let mut config = build_config(kind)?;
    config.jitter = cli.jitter;
    config.threshold = threshold;
    config.seed = cli.seed;

    let images = file_finder::find_images(&cli.search_dir)?;
    let clusters = create_cluster_use_case(&config)?
        .with_progress(progress_printer("Scanning"))
        .execute(&images)?;

    for (id, cluster) in clusters.iter().enumerate() {
        println!("person {id}:");
        for face in cluster {
            let b = &face.bounding_box;
            println!(
                "  {} #{} [{:.0}, {:.0}, {:.0}x{:.0}]",
                face.path.display(),
                face.face_index,
                b.x,
                b.y,
                b.width,
                b.height
            );
        }
    }
    Ok(())
}
