//! Cols CLI - reshape CSV columns with a script
//!
//! # Main Commands
//!
//! ```bash
//! cols run -c reshape.conf a.csv b.csv     # Apply a script, CSV to stdout
//! cols run -c reshape.conf a.csv -o out.csv
//! ```
//!
//! # Script Helpers
//!
//! ```bash
//! cols check -c reshape.conf     # Parse a script and dump it as JSON
//! cols help-conf                 # Show the script reference
//! cols sample                    # Print a sample script
//! ```

use clap::{Parser, Subcommand};
use cols::script::directive::parse_byte;
use cols::{
    operations_description, run, sample_script, DefaultProjection, HeaderPolicy, RunError,
    RunOptions, Script, TracingSink,
};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cols")]
#[command(about = "Rename, move, fill and select CSV columns with a script", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a script to CSV files
    Run {
        /// Script file
        #[arg(short, long)]
        config: PathBuf,

        /// Input CSV files, processed in order
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Columns written when the script has no `use` line
        #[arg(long, value_enum)]
        default_projection: Option<DefaultProjection>,

        /// Write the header once or for every input
        #[arg(long = "header", value_enum)]
        header_policy: Option<HeaderPolicy>,

        /// Output field separator (a single character, or `tab`)
        #[arg(long)]
        output_delim: Option<String>,

        /// Quote output fields that contain the separator or quotes
        #[arg(long)]
        quote: bool,

        /// Log every operation
        #[arg(long)]
        debug: bool,
    },

    /// Parse a script and print it as JSON
    Check {
        /// Script file
        #[arg(short, long)]
        config: PathBuf,
    },

    /// Show the script reference
    HelpConf,

    /// Print a sample script
    Sample,
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let debug = matches!(cli.command, Commands::Run { debug: true, .. });
    init_tracing(debug);

    let result = match cli.command {
        Commands::Run {
            config,
            inputs,
            output,
            default_projection,
            header_policy,
            output_delim,
            quote,
            debug: _,
        } => {
            let overrides = Overrides {
                default_projection,
                header_policy,
                output_delim,
                quote,
            };
            cmd_run(&config, &inputs, output.as_deref(), overrides)
        }

        Commands::Check { config } => cmd_check(&config),

        Commands::HelpConf => {
            println!("{}", operations_description());
            Ok(())
        }

        Commands::Sample => {
            print!("{}", sample_script());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Run flags that override environment settings
struct Overrides {
    default_projection: Option<DefaultProjection>,
    header_policy: Option<HeaderPolicy>,
    output_delim: Option<String>,
    quote: bool,
}

impl Overrides {
    fn apply(self, mut options: RunOptions) -> Result<RunOptions, RunError> {
        if let Some(projection) = self.default_projection {
            options.default_projection = projection;
        }
        if let Some(policy) = self.header_policy {
            options.header_policy = policy;
        }
        if let Some(raw) = self.output_delim {
            options.output_delimiter = parse_byte(&raw).ok_or_else(|| {
                RunError::InvalidOption(format!("--output-delim '{}' is not a single character", raw))
            })?;
        }
        options.quote |= self.quote;
        Ok(options)
    }
}

fn cmd_run(
    config: &Path,
    inputs: &[PathBuf],
    output: Option<&Path>,
    overrides: Overrides,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = overrides.apply(RunOptions::from_env()?)?;
    let script = Script::load(config)?;
    tracing::debug!(
        "Loaded {} operations from {}",
        script.steps.len(),
        config.display()
    );

    let summary = match output {
        Some(path) => {
            let file = BufWriter::new(File::create(path)?);
            run(&script, inputs, &options, file, &TracingSink)?
        }
        None => run(&script, inputs, &options, io::stdout().lock(), &TracingSink)?,
    };

    tracing::info!(
        "Processed {} files, wrote {} rows",
        summary.files,
        summary.rows_written
    );
    Ok(())
}

fn cmd_check(config: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let script = Script::load(config)?;

    for key in script.directives.unknown_keys() {
        eprintln!("warning: unknown directive 'in {}'", key);
    }
    for step in script.steps.iter().filter(|s| !s.operation.is_runnable()) {
        eprintln!("warning: line {} will be skipped: {}", step.line, step.source);
    }

    println!("{}", script.to_json()?);
    Ok(())
}
