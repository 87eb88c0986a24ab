use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use dbdiagram::error::ConfigError;
use dbdiagram::geometry::Point;
use dbdiagram::{DiagramConfig, DiagramError, DiagramView, SAMPLE_SCHEMA, svg};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to read {path}: {source}")]
    Read { path: String, source: io::Error },
    #[error("failed to write {path}: {source}")]
    Write { path: String, source: io::Error },
    #[error("invalid config {path}: {source}")]
    Config { path: String, source: ConfigError },
    #[error("failed to encode draw commands: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Diagram(#[from] DiagramError),
}

/// Schema diagram renderer
#[derive(Parser, Debug)]
#[command(name = "dbdiagram", version, about, long_about = None)]
struct Cli {
    /// More log output on stderr (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Lay out a schema and write it as SVG or JSON draw commands
    Render(RenderArgs),
    /// Parse a schema and report what was found
    Check {
        /// Schema file; stdin when omitted
        input: Option<PathBuf>,
    },
    /// Print a sample schema
    Sample,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum Format {
    #[default]
    Svg,
    Json,
}

#[derive(Debug, Args)]
struct RenderArgs {
    /// Schema file; stdin when omitted
    input: Option<PathBuf>,
    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t)]
    format: Format,
    #[arg(long, default_value_t = 1.0)]
    zoom: f64,
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pan_x: f64,
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pan_y: f64,
    /// TOML file overriding layout, viewport and style defaults
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Render(args) => render(&args),
        Command::Check { input } => check(input.as_deref()),
        Command::Sample => {
            print!("{SAMPLE_SCHEMA}");
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn read_input(path: Option<&Path>) -> Result<String, CliError> {
    match path {
        Some(path) => fs::read_to_string(path).map_err(|source| CliError::Read {
            path: path.display().to_string(),
            source,
        }),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|source| CliError::Read {
                    path: "<stdin>".to_string(),
                    source,
                })?;
            Ok(buffer)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<DiagramConfig, CliError> {
    let Some(path) = path else {
        return Ok(DiagramConfig::default());
    };
    let text = fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.display().to_string(),
        source,
    })?;
    DiagramConfig::from_toml(&text).map_err(|source| CliError::Config {
        path: path.display().to_string(),
        source,
    })
}

fn render(args: &RenderArgs) -> Result<(), CliError> {
    let config = load_config(args.config.as_deref())?;
    let source = read_input(args.input.as_deref())?;

    let mut view = DiagramView::new(config);
    view.generate(&source)?;
    let viewport = view.viewport_mut();
    viewport.zoom_to(args.zoom, Some(Point::default()));
    viewport.set_pan(Point::new(args.pan_x, args.pan_y));

    let size = view.fit_to_content();
    let commands = view.render();
    tracing::debug!(
        commands = commands.len(),
        width = size.width,
        height = size.height,
        "rendered"
    );

    let output = match args.format {
        Format::Svg => svg::to_svg(&commands, size, config.style.palette.background),
        Format::Json => serde_json::to_string_pretty(&commands)?,
    };

    match &args.output {
        Some(path) => fs::write(path, &output).map_err(|source| CliError::Write {
            path: path.display().to_string(),
            source,
        }),
        None => {
            print!("{output}");
            Ok(())
        }
    }
}

fn check(input: Option<&Path>) -> Result<(), CliError> {
    let source = read_input(input)?;
    let mut view = DiagramView::default();
    let summary = view.generate(&source)?;

    println!("tables: {}", summary.tables);
    for (_, table) in view.diagram().tables() {
        println!(
            "  {} ({} columns, pk: {})",
            table.name,
            table.columns.len(),
            table.primary_keys.join(", ")
        );
    }
    println!("relationships: {}", summary.relationships);
    for fk in view.diagram().dangling_references() {
        println!(
            "  dangling: {}.{} > {}.{}",
            fk.from_table, fk.from_column, fk.to_table, fk.to_column
        );
    }
    Ok(())
}
