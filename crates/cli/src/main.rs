use std::path::PathBuf;
use std::process;

use clap::{CommandFactory, Parser};

use facegrep_cli::{
    build_config, init_logging, parse_args, progress_printer, require_dir, require_file,
    require_threshold, resolve_jitter, UsageError,
};
use facegrep_core::detection::domain::detector_kind::DetectorKind;
use facegrep_core::discovery::file_finder;
use facegrep_core::pipeline::infrastructure::component_factory::create_search_use_case;
use facegrep_core::shared::constants::DEFAULT_THRESHOLD;

/// Find images containing the person in a reference face photo.
#[derive(Parser)]
#[command(name = "facegrep")]
struct Cli {
    /// Image containing the face to look for.
    reference: PathBuf,

    /// Directory searched recursively for candidate images.
    search_dir: PathBuf,

    /// Average embeddings over jittered crops (default).
    #[arg(short, long, overrides_with = "no_jitter")]
    jitter: bool,

    /// Embed each face once, without jitter.
    #[arg(long, overrides_with = "jitter")]
    no_jitter: bool,

    /// Use the accurate (slower) face detector.
    #[arg(short, long)]
    mmod: bool,

    /// Face difference threshold; lower is stricter.
    #[arg(short, long, default_value_t = DEFAULT_THRESHOLD)]
    threshold: f32,

    /// Candidate images processed in parallel.
    #[arg(long, default_value = "1")]
    workers: usize,

    /// Seed for jitter sampling, for reproducible runs.
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
    require_file(&cli.reference, "Reference face file")?;
    require_dir(&cli.search_dir, "Search directory")?;
    let threshold = require_threshold(cli.threshold)?;

    let kind = if cli.mmod {
        DetectorKind::Accurate
    } else {
        DetectorKind::Fast
    };
    let mut config = build_config(kind)?;
    config.jitter = resolve_jitter(cli.jitter, cli.no_jitter);
    config.threshold = threshold;
    config.workers = cli.workers.max(1);
    config.seed = cli.seed;

    let mut search = create_search_use_case(&config)?;
    if !search.init(&cli.reference)? {
        log::warn!("Nothing to search for: {}", cli.reference.display());
        return Ok(());
    }

    let candidates = file_finder::find_images(&cli.search_dir)?;
    log::info!("Searching {} image(s)", candidates.len());
    let search = search.with_progress(progress_printer("Searching"));
    for path in search.search(&candidates)? {
        println!("{}", path.display());
    }
    Ok(())
}
