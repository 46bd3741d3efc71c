use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser};
use std::path::PathBuf;

use logsift::input::{read_input, DEFAULT_BUFFER_SIZE};
use logsift::logging::init_logging;
use logsift::tty::{should_use_colors, terminal_width};
use logsift::{
    CancellationToken, ConsoleRenderer, CsvLayout, DisplayOptions, ExtractionPipeline, FileConfig,
    FileExporter, PipelineConfig,
};

#[derive(Parser)]
#[command(name = "logsift")]
#[command(about = "Extract structured records from log text with regex patterns")]
#[command(version)]
struct Args {
    /// Extraction patterns with named groups, tried in order
    #[arg(value_name = "PATTERN")]
    patterns: Vec<String>,

    /// Additional extraction patterns
    #[arg(short = 'p', long = "pattern", action = ArgAction::Append)]
    extra_patterns: Vec<String>,

    /// Input file (default: stdin)
    #[arg(short = 'i', long = "input")]
    input_file: Option<PathBuf>,

    /// Group records by this field
    #[arg(short = 'c', long = "correlate", value_name = "FIELD")]
    correlate: Option<String>,

    /// Export the result (.json or .csv; other extensions are written as JSON)
    #[arg(short = 'o', long = "output")]
    output_file: Option<PathBuf>,

    /// Maximum records and groups shown on the console
    #[arg(short = 'n', long = "limit", value_name = "N")]
    limit: Option<usize>,

    /// Maximum columns with a statistics block
    #[arg(long, value_name = "N")]
    stats_columns: Option<usize>,

    /// Write one CSV row per correlation group
    #[arg(long)]
    csv_groups: bool,

    /// YAML file with patterns and defaults
    #[arg(long = "config", value_name = "FILE")]
    config_file: Option<PathBuf>,

    /// Force colored output
    #[arg(long, conflicts_with = "no_color")]
    color: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Do not render the result on the console
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,

    /// Debug mode - show processing details
    #[arg(long)]
    debug: bool,

    /// Buffer size for reading input
    #[arg(long, default_value_t = DEFAULT_BUFFER_SIZE)]
    buffer_size: usize,
}

/// Settings after merging the config file with command-line flags
struct Settings {
    pipeline: PipelineConfig,
    limit: usize,
    stats_columns: usize,
    output_file: Option<PathBuf>,
    csv_layout: CsvLayout,
}

impl Args {
    fn get_all_patterns(&self) -> Vec<String> {
        let mut all_patterns = self.patterns.clone();
        all_patterns.extend(self.extra_patterns.clone());
        all_patterns
    }

    fn color_preference(&self) -> Option<bool> {
        match (self.color, self.no_color) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }

    fn settings(&self) -> Result<Settings> {
        let file = match &self.config_file {
            Some(path) => FileConfig::load(path)
                .with_context(|| format!("Failed to load config file '{}'", path.display()))?,
            None => FileConfig::default(),
        };

        let cli_patterns = self.get_all_patterns();
        let patterns = if cli_patterns.is_empty() {
            file.patterns
        } else {
            cli_patterns
        };

        let settings = Settings {
            pipeline: PipelineConfig {
                patterns,
                correlation_field: self.correlate.clone().or(file.correlate),
            },
            limit: self.limit.or(file.limit).unwrap_or(20),
            stats_columns: self.stats_columns.or(file.stats_columns).unwrap_or(10),
            output_file: self.output_file.clone().or(file.output),
            csv_layout: if self.csv_groups || file.csv_groups.unwrap_or(false) {
                CsvLayout::Groups
            } else {
                CsvLayout::Records
            },
        };
        settings.validate()?;
        Ok(settings)
    }
}

impl Settings {
    fn validate(&self) -> Result<()> {
        if self.pipeline.patterns.is_empty() {
            bail!("Must provide at least one pattern (argument, --pattern or --config)");
        }
        self.pipeline.validate()?;
        if self.limit == 0 {
            bail!("--limit must be greater than 0");
        }
        Ok(())
    }
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose, args.debug);

    if let Err(e) = run(args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let settings = args.settings()?;

    let lines = read_input(args.input_file.as_deref(), args.buffer_size)?;

    // Installed after the read so Ctrl-C on a blocked stdin still ends the process
    let cancel = CancellationToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || handler_token.cancel())
        .context("Failed to install Ctrl-C handler")?;

    let mut pipeline = ExtractionPipeline::new(settings.pipeline).with_cancellation(cancel);

    if !args.quiet {
        let options = DisplayOptions {
            limit: settings.limit,
            stats_columns: settings.stats_columns,
            use_colors: args.color_preference().unwrap_or_else(should_use_colors),
            width: terminal_width(),
        };
        pipeline.add_sink(Box::new(ConsoleRenderer::stdout(options)));
    }

    if let Some(path) = &settings.output_file {
        let exporter = FileExporter::new(path, settings.csv_layout);
        let (format, target) = exporter.target();
        if args.debug {
            eprintln!("Exporting {:?} to {}", format, target.display());
        }
        pipeline.add_sink(Box::new(exporter));
    }

    let result = pipeline.run(&lines)?;

    if args.debug {
        let config = pipeline.config();
        eprintln!("Final statistics:");
        eprintln!("  Patterns: {}", config.patterns.len());
        if let Some(field) = &config.correlation_field {
            eprintln!("  Correlated by: {}", field);
        }
        eprintln!("  Lines read: {}", lines.len());
        eprintln!("  Lines processed: {}", result.total_lines_processed());
        eprintln!("  Records: {}", result.records.len());
        eprintln!("  Groups: {}", result.groups.len());
        if let Some(elapsed) = pipeline.last_duration() {
            eprintln!("  Processing time: {}", humantime::format_duration(elapsed));
        }
    }

    Ok(())
}
