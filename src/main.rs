use clap::{Args, Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use sepval::analysis::{self, ExportKind, FileExport};
use sepval::catalog;
use sepval::config::{Config, LogFormat, LogLevel};
use sepval::report::Summary;
use sepval::{
    box_plot_report, read_in_metrics, BoxReportOptions, JsonFigures, ModelFilter, NoPlots, PlotBackend, Quantity,
};
use std::path::PathBuf;
use std::process;

/// Exit code when some files or groups failed but the run completed
const EXIT_PARTIAL: i32 = 2;

#[derive(Parser, Debug)]
#[command(name = "sepval")]
#[command(author, version, about = "Post-analysis of SEP forecast validation results")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only show summary and warnings
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log output format
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Export false alarms and misses from selections tables
    Export(ExportArgs),

    /// Box plots of grouped metrics for one forecasted quantity
    Metrics(MetricsArgs),

    /// Show the file prefix and metric groups of a quantity
    Groups {
        /// Forecasted quantity, e.g. "All Clear"
        quantity: String,
    },
}

#[derive(Args, Debug)]
struct ExportArgs {
    /// Selections table, or a directory to search for them
    path: PathBuf,

    /// Flux threshold (pfu)
    #[arg(short, long)]
    threshold: f64,

    /// Also write outcome figures
    #[arg(long)]
    plot: bool,

    /// Table kind, when the file name does not tell
    #[arg(long, value_enum)]
    kind: Option<KindArg>,

    /// Number of parallel workers (default: number of CPUs)
    #[arg(short, long)]
    jobs: Option<usize>,
}

#[derive(Args, Debug)]
struct MetricsArgs {
    /// Directory containing the validation run's output/ folder
    output_root: PathBuf,

    /// Forecasted quantity, e.g. "Max Flux"
    #[arg(long)]
    quantity: String,

    /// Model names or fragments to keep ("All" keeps everything)
    #[arg(long, num_args = 1.., default_value = "All")]
    include: Vec<String>,

    /// Model names or fragments to drop
    #[arg(long, num_args = 1..)]
    exclude: Vec<String>,

    /// Replace model names with "Model <n>"
    #[arg(long)]
    anonymous: bool,

    /// Model to single out
    #[arg(long, default_value = "")]
    highlight: String,

    /// Write long-form tables only
    #[arg(long)]
    no_plots: bool,

    /// Where figures go (default: <OUTPUT_ROOT>/summary)
    #[arg(long)]
    summary_dir: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum KindArg {
    AllClear,
    MaxFlux,
}

impl From<KindArg> for ExportKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::AllClear => ExportKind::AllClear,
            KindArg::MaxFlux => ExportKind::MaxFluxInPredictionWindow,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let config = match Config::load_or_default(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => fatal(e),
    };

    let mut log = config.log.clone().with_env();
    if cli.verbose {
        log.level = LogLevel::Debug;
    } else if cli.quiet {
        log.level = LogLevel::Warn;
    }
    if let Some(format) = cli.log_format {
        log.format = format;
    }
    sepval::logging::init_logging(&log);

    let code = match &cli.command {
        Command::Export(args) => run_export(args, &config, cli.quiet),
        Command::Metrics(args) => run_metrics(args, &config, cli.quiet),
        Command::Groups { quantity } => run_groups(quantity),
    };
    process::exit(code);
}

fn fatal(e: sepval::Error) -> ! {
    eprintln!("\x1b[31mError:\x1b[0m {}", e);
    process::exit(1);
}

fn run_export(args: &ExportArgs, config: &Config, quiet: bool) -> i32 {
    // Set up thread pool
    if let Some(jobs) = args.jobs.or(config.jobs) {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
            .ok();
    }

    let files: Vec<(PathBuf, ExportKind)> = if args.path.is_dir() {
        analysis::discover(&args.path)
    } else {
        match args.kind.map(ExportKind::from).or_else(|| ExportKind::for_file(&args.path)) {
            Some(kind) => vec![(args.path.clone(), kind)],
            None => {
                eprintln!("Cannot tell the table kind of {}; pass --kind", args.path.display());
                return 1;
            }
        }
    };

    if files.is_empty() {
        eprintln!("No selections tables found (all_clear_selections_*, max_flux_in_pred_win_selections_*)");
        return 1;
    }

    if !quiet {
        eprintln!("\x1b[1msepval - Incorrect Forecast Export\x1b[0m");
        eprintln!("{}", "─".repeat(70));
        eprintln!("Found {} selections table(s)\n", files.len());
    }

    // Set up progress bar
    let pb = if !quiet && files.len() > 1 {
        let pb = ProgressBar::new(files.len() as u64);
        if let Ok(style) = ProgressStyle::default_bar().template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}") {
            pb.set_style(style.progress_chars("=>-"));
        }
        Some(pb)
    } else {
        None
    };

    let backend: &dyn PlotBackend = if args.plot { &JsonFigures } else { &NoPlots };
    let results = analysis::export_batch(&files, args.threshold, args.plot, backend, pb.as_ref());

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    let mut totals = Summary::default();
    let mut failed = 0;
    for r in &results {
        print_export(r, quiet);
        match &r.result {
            Ok(summary) => totals.merge(&summary.counts),
            Err(_) => failed += 1,
        }
    }

    if !quiet {
        eprintln!("\n{}", "─".repeat(70));
        eprintln!("\x1b[1mSummary:\x1b[0m");
        eprintln!("  Forecasts:         {}", totals.total);
        eprintln!("  \x1b[32mHits:\x1b[0m              {}", totals.hits);
        eprintln!("  \x1b[32mCorrect negatives:\x1b[0m {}", totals.correct_negatives);
        eprintln!("  \x1b[33mFalse alarms:\x1b[0m      {}", totals.false_alarms);
        eprintln!("  \x1b[31mMisses:\x1b[0m            {}", totals.misses);
        if totals.skipped > 0 {
            eprintln!("  \x1b[90mSkipped:\x1b[0m           {}", totals.skipped);
        }
        if failed > 0 {
            eprintln!("  \x1b[90mFailed files:\x1b[0m      {}", failed);
        }
    }

    if failed > 0 {
        EXIT_PARTIAL
    } else {
        0
    }
}

fn print_export(r: &FileExport, quiet: bool) {
    let name = r
        .path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match &r.result {
        Ok(summary) => {
            if quiet {
                return;
            }
            println!(
                "\x1b[32m{:<8}\x1b[0m FA {:>4}  M {:>4}  {}",
                "[OK]", summary.counts.false_alarms, summary.counts.misses, name
            );
            for path in &summary.written {
                println!("         -> {}", path.display());
            }
        }
        Err(e) => {
            println!("\x1b[90m{:<8}\x1b[0m {}: {}", "[ERROR]", name, e);
        }
    }
}

fn run_metrics(args: &MetricsArgs, config: &Config, quiet: bool) -> i32 {
    let quantity = match Quantity::from_name(&args.quantity) {
        Ok(q) => q,
        Err(e) => fatal(e),
    };

    let filter = ModelFilter::from_lists(&args.include, &args.exclude);
    let table = match read_in_metrics(&args.output_root, quantity, &filter) {
        Ok(t) => t,
        Err(e) => fatal(e),
    };

    let summary_dir = args
        .summary_dir
        .clone()
        .unwrap_or_else(|| args.output_root.join("summary"));
    let options = BoxReportOptions {
        anonymous: args.anonymous,
        highlight: &args.highlight,
        percent_metrics: &config.percent_metrics,
        summary_dir: &summary_dir,
    };
    let backend: &dyn PlotBackend = if args.no_plots { &NoPlots } else { &JsonFigures };

    let report = match box_plot_report(&table, quantity, &options, backend) {
        Ok(r) => r,
        Err(e) => fatal(e),
    };

    if !quiet {
        eprintln!("\x1b[1m{} metrics\x1b[0m", quantity);
        eprintln!("{}", "─".repeat(70));
        for path in &report.tables {
            println!("{}", path.display());
        }
        eprintln!("\n{} group table(s) written to {}", report.tables.len(), summary_dir.display());
    }
    for f in &report.failures {
        eprintln!(
            "\x1b[31mGroup {} ({}, {}) failed:\x1b[0m {}",
            f.group, f.energy_channel, f.threshold, f.error
        );
    }

    if report.is_complete() {
        0
    } else {
        EXIT_PARTIAL
    }
}

fn run_groups(name: &str) -> i32 {
    let quantity = match Quantity::from_name(name) {
        Ok(q) => q,
        Err(e) => fatal(e),
    };
    println!("{}: file prefix '{}'", quantity, quantity.file_prefix());

    match catalog::groups_for(quantity) {
        Ok([]) => println!("  no metric groups"),
        Ok(groups) => {
            for (i, group) in groups.iter().enumerate() {
                println!("  Group {}: {}", i + 1, group.join(", "));
            }
        }
        Err(e) => fatal(e),
    }
    0
}
