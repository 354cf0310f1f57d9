use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, ValueEnum};
use tracing::{info, warn};

use edlconform::{CollisionScope, ConformOpts, FrameRate, SourceCatalog, conform};

#[derive(Parser, Debug)]
#[command(name = "edlconform", version)]
struct Cli {
    /// Edit list to conform (CMX3600).
    edl: PathBuf,

    /// Source audio files.
    sources: Vec<PathBuf>,

    /// File listing one source path per line (`#` comments allowed).
    #[arg(short = 's', long)]
    source_list: Option<PathBuf>,

    /// Composition name (defaults to the edit list title).
    #[arg(short = 't', long)]
    sequence_name: Option<String>,

    /// Edit rate in frames per second.
    #[arg(long = "fs", default_value_t = 24)]
    frame_rate: u32,

    /// Output composition JSON.
    #[arg(short = 'o', long)]
    output: PathBuf,

    /// Lane collision scope.
    #[arg(long, value_enum, default_value_t = LaneScope::PerEdit)]
    lane_scope: LaneScope,

    /// Log file (defaults to the output path with a `.log` extension).
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LaneScope {
    /// Collisions resolve within one edit; edits share lanes across the run.
    PerEdit,
    /// Every matched edit/channel combination gets its own lane.
    Global,
}

impl From<LaneScope> for CollisionScope {
    fn from(scope: LaneScope) -> Self {
        match scope {
            LaneScope::PerEdit => CollisionScope::PerEdit,
            LaneScope::Global => CollisionScope::Global,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_path = cli
        .log_file
        .clone()
        .unwrap_or_else(|| cli.output.with_extension("log"));
    let _guard = init_tracing(&log_path)?;

    run(cli)
}

fn init_tracing(log_path: &Path) -> anyhow::Result<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _};

    if let Some(parent) = log_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log dir '{}'", parent.display()))?;
    }
    let file = File::create(log_path)
        .with_context(|| format!("create log file '{}'", log_path.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(fmt::layer().with_ansi(false).with_writer(writer))
        .init();
    Ok(guard)
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let rate = FrameRate::new(cli.frame_rate)?;

    let paths = collect_source_paths(&cli)?;
    if paths.is_empty() {
        anyhow::bail!("no source files given (positional paths or --source-list)");
    }

    let catalog = SourceCatalog::load(&paths, rate)?;
    info!(
        sources = catalog.len(),
        offered = paths.len(),
        "source catalog loaded"
    );

    let list = edlconform::read_edit_list(&cli.edl, rate)
        .with_context(|| format!("read edit list '{}'", cli.edl.display()))?;
    info!(edits = list.edits.len(), title = ?list.title, "edit list parsed");

    let opts = ConformOpts {
        collision_scope: cli.lane_scope.into(),
    };
    let output = conform(&list.edits, &catalog, opts)?;
    report(&output.summary);

    let name = cli
        .sequence_name
        .or(list.title)
        .unwrap_or_else(|| "Untitled".to_string());
    let doc = edlconform::build_document(&name, rate, &output);

    if let Some(parent) = cli.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    edlconform::write_json(&doc, &cli.output)
        .with_context(|| format!("write composition '{}'", cli.output.display()))?;

    eprintln!("wrote {}", cli.output.display());
    Ok(())
}

fn collect_source_paths(cli: &Cli) -> anyhow::Result<Vec<PathBuf>> {
    let mut paths = cli.sources.clone();
    if let Some(list_path) = &cli.source_list {
        let text = fs::read_to_string(list_path)
            .with_context(|| format!("read source list '{}'", list_path.display()))?;
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            paths.push(PathBuf::from(line));
        }
    }
    Ok(paths)
}

fn report(summary: &edlconform::RunSummary) {
    info!(
        edits = summary.edit_count,
        matched = summary.matched_edit_count,
        clips = summary.clip_count,
        "conform summary"
    );
    for unmatched in &summary.unmatched_edits {
        warn!(edit = %unmatched, "no linkable source for this edit");
    }
    for unused in &summary.unused_sources {
        warn!(source = %unused, "source file never used");
    }
    if summary.overlap_warnings > 0 {
        warn!(
            count = summary.overlap_warnings,
            "overlapping clips were appended without gaps"
        );
    }
}
