use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use log::{error, info};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use fimerge::config::MergeConfig;
use fimerge::output::schema::schema_json_pretty;
use fimerge::pipeline::{FilterRunner, MergeRunner};

#[derive(Parser)]
#[command(name = "fimerge", version)]
#[command(
    about = "Filter and merge FusionInspector fusion tables",
    long_about = "Filters FusionInspector coding-effect-annotated abridged tables to in-frame calls and merges per-lane or per-replicate tables of the same sample into one deduplicated table ranked by junction reads and spanning fragments."
)]
struct Cli {
    /// Log verbosity level
    #[arg(long, global = true, default_value = "info")]
    log_level: LogLevel,
    /// Write log output to a file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<String>,
    /// Append to log file instead of truncating
    #[arg(long, global = true)]
    append_log: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Keep only in-frame fusions of a coding-effect-annotated abridged table
    Filter {
        /// FusionInspector coding-effect-annotated abridged file to filter.
        #[arg(short = 'i', long, required = true)]
        input_file: PathBuf,
        /// Output name prefix for the filtered file (e.g. "sample1_L").
        #[arg(short = 'o', long, required = true)]
        output_prefix: String,
        /// Output directory. Uses the current working directory if not specified.
        #[arg(long)]
        out_dir: Option<PathBuf>,
        /// Path to configuration JSON file (filter column and value, file naming).
        #[arg(long)]
        config: Option<PathBuf>,
        /// Force overwrite of existing output files.
        #[arg(short, long)]
        force: bool,
    },
    /// Merge coding-effect tables per sample, dropping duplicate fusion calls
    Merge {
        /// Coding-effect files to merge. Files not ending in ".coding_effect" are ignored.
        #[arg(short = 'a', long, required = true, num_args = 1..)]
        array: Vec<PathBuf>,
        /// Output directory. Uses the current working directory if not specified.
        #[arg(short = 'o', long)]
        output_directory: Option<PathBuf>,
        /// Path to configuration JSON file (input marker, sample delimiter, file naming).
        #[arg(long)]
        config: Option<PathBuf>,
        /// Write a JSON summary of the merge to this path.
        #[arg(long)]
        summary: Option<PathBuf>,
        /// Force overwrite of existing output files.
        #[arg(short, long)]
        force: bool,
    },
    /// Print JSON Schema for the merge summary
    Schema {
        /// Write schema to file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn load_config(path: Option<&Path>) -> anyhow::Result<MergeConfig> {
    match path {
        Some(p) => MergeConfig::load(p).context("Error loading configuration"),
        None => Ok(MergeConfig::default()),
    }
}

fn output_dir(dir: Option<&PathBuf>) -> anyhow::Result<PathBuf> {
    match dir {
        Some(d) => Ok(d.clone()),
        None => std::env::current_dir().context("Cannot determine working directory"),
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Filter {
            input_file,
            output_prefix,
            out_dir,
            config,
            force,
        } => {
            let config = load_config(config.as_deref())?;
            let out_dir = output_dir(out_dir.as_ref())?;
            let output = FilterRunner::new(input_file, output_prefix, &out_dir)
                .with_config(&config)
                .with_force(*force)
                .run()
                .with_context(|| format!("Filtering {} failed", input_file.display()))?;
            info!("Filtered file saved to {}", output.display());
        }
        Commands::Merge {
            array,
            output_directory,
            config,
            summary,
            force,
        } => {
            let config = load_config(config.as_deref())?;
            let out_dir = output_dir(output_directory.as_ref())?;
            let result = MergeRunner::new(array, &out_dir)
                .with_config(&config)
                .with_summary(summary.as_deref())
                .with_force(*force)
                .run()
                .context("Merging fusion tables failed")?;
            if result.outputs.is_empty() {
                info!("No {} inputs found; nothing written", config.input_marker);
            }
        }
        Commands::Schema { output } => {
            let schema = schema_json_pretty().context("Cannot serialize schema")?;
            match output {
                Some(path) => {
                    std::fs::write(path, &schema)
                        .with_context(|| format!("Error writing schema to {}", path.display()))?;
                    info!("Schema written to {}", path.display());
                }
                None => println!("{}", schema),
            }
        }
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let mut log_builder = env_logger::Builder::from_default_env();
    log_builder
        .filter_level(cli.log_level.to_level_filter())
        .format_module_path(false);
    if let Some(ref path) = cli.log_file {
        let file = if cli.append_log {
            std::fs::File::options().create(true).append(true).open(path)
        } else {
            std::fs::File::create(path)
        };
        match file {
            Ok(f) => {
                log_builder.target(env_logger::Target::Pipe(Box::new(f)));
            }
            Err(e) => {
                eprintln!("Could not open log file '{}': {}", path, e);
                std::process::exit(1);
            }
        }
    }
    log_builder.init();

    if let Err(e) = run(&cli) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}
