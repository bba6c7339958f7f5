use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use flowforce::config::AppConfig;
use flowforce::report;
use flowforce::AppState;
use flowforce_core::forces::Observation;
use flowforce_core::outputs::create_bundle;
use flowforce_core::parameters::{FootingShape, ParameterOverrides, SubmergedHeightMode};
use flowforce_core::session::{self, EventSelection, FileFailure};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Water flow forces on transmission tower footings (AS 5100.2 Section 16)", long_about = None)]
struct Cli {
    /// TOML config file. Defaults to $FLOWFORCE_CONFIG when set.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP server
    Serve {
        /// Address to listen on, overriding the config file
        #[arg(long)]
        bind: Option<String>,
    },
    /// Calculate forces for spreadsheets or directories of spreadsheets
    Calculate(CalculateArgs),
    /// Calculate forces for a single observation
    Preview(PreviewArgs),
    /// Show default parameters for a footing shape
    Defaults {
        #[arg(long)]
        shape: Option<FootingShape>,
    },
}

#[derive(Args, Debug)]
struct CalculateArgs {
    /// .xlsx or .csv files, or directories containing them
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Event to calculate; repeat for several. Defaults to every event found.
    #[arg(long = "event")]
    events: Vec<String>,

    /// Write a results bundle (zip) to this path
    #[arg(long)]
    bundle: Option<PathBuf>,

    /// Print every row, not just the per-event summary
    #[arg(long)]
    rows: bool,

    #[command(flatten)]
    parameters: ParameterArgs,
}

#[derive(Args, Debug)]
struct PreviewArgs {
    #[arg(long)]
    depth: f64,
    #[arg(long)]
    velocity: f64,
    #[arg(long, default_value_t = 0.0)]
    scour: f64,

    #[command(flatten)]
    parameters: ParameterArgs,
}

#[derive(Args, Debug, Default)]
struct ParameterArgs {
    #[arg(long)]
    shape: Option<FootingShape>,
    #[arg(long)]
    drag_coefficient: Option<f64>,
    #[arg(long)]
    width: Option<f64>,
    #[arg(long)]
    face_area: Option<f64>,
    #[arg(long)]
    pile_diameter: Option<f64>,
    #[arg(long)]
    pile_drag_coefficient: Option<f64>,
    #[arg(long)]
    water_density: Option<f64>,
    #[arg(long)]
    submerged_height_mode: Option<SubmergedHeightMode>,
    #[arg(long)]
    exposed_height: Option<f64>,
    #[arg(long)]
    min_debris_depth: Option<f64>,
    #[arg(long)]
    max_debris_depth: Option<f64>,
    #[arg(long)]
    debris_span: Option<f64>,
    #[arg(long)]
    log_mass: Option<f64>,
    #[arg(long)]
    stopping_distance: Option<f64>,
    #[arg(long)]
    load_factor: Option<f64>,
}

impl From<ParameterArgs> for ParameterOverrides {
    fn from(args: ParameterArgs) -> Self {
        ParameterOverrides {
            shape: args.shape,
            drag_coefficient: args.drag_coefficient,
            width: args.width,
            face_area: args.face_area,
            pile_diameter: args.pile_diameter,
            pile_drag_coefficient: args.pile_drag_coefficient,
            water_density: args.water_density,
            submerged_height_mode: args.submerged_height_mode,
            exposed_height: args.exposed_height,
            min_debris_depth: args.min_debris_depth,
            max_debris_depth: args.max_debris_depth,
            debris_span: args.debris_span,
            log_mass: args.log_mass,
            stopping_distance: args.stopping_distance,
            load_factor: args.load_factor,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Command::Serve { bind } => serve(config, bind).await,
        Command::Calculate(args) => calculate(&config, args),
        Command::Preview(args) => preview(&config, args),
        Command::Defaults { shape } => {
            let params = config
                .parameters
                .merge(ParameterOverrides {
                    shape,
                    ..ParameterOverrides::default()
                })
                .resolve();
            println!("{}", report::parameters_table(&params));
            Ok(())
        }
    }
}

async fn serve(config: AppConfig, bind: Option<String>) -> Result<()> {
    let bind = bind.unwrap_or_else(|| config.server.bind.clone());
    let app = flowforce::router(AppState::from_config(&config));

    let listener = TcpListener::bind(&bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

fn preview(config: &AppConfig, args: PreviewArgs) -> Result<()> {
    let params = config.parameters.clone().merge(args.parameters.into()).resolve();
    let observation = Observation::new(args.depth, args.velocity, args.scour);
    let forces = session::preview(&observation, &params)?;

    println!("{}", report::parameters_table(&params));
    println!("{}", report::forces_table(&forces));
    Ok(())
}

fn calculate(config: &AppConfig, args: CalculateArgs) -> Result<()> {
    let params = config.parameters.clone().merge(args.parameters.into()).resolve();
    params.validate().context("invalid structure parameters")?;
    let selection = EventSelection::from_names(args.events);
    let files = expand_paths(&args.paths)?;
    if files.is_empty() {
        bail!("no .xlsx or .csv files found");
    }

    println!("{}", report::parameters_table(&params));

    let mut processed = Vec::new();
    let mut failures = Vec::new();
    for path in &files {
        let file_name = path.display().to_string();
        let content = match fs::read(path) {
            Ok(content) => content,
            Err(err) => {
                warn!(file_name = %file_name, error = %err, "Failed to read file");
                eprintln!("WARNING: skipping {file_name}: {err}");
                failures.push(FileFailure {
                    file_name,
                    error: err.to_string(),
                });
                continue;
            }
        };

        match session::process_file(&file_name, &content, &selection, &params) {
            Ok(file) => {
                println!("\n{file_name} ({} rows)", file.report.row_count);
                for warning in &file.report.warnings {
                    println!("  warning: {warning}");
                }
                println!("{}", report::summary_table(&file.report));
                if args.rows {
                    for event in &file.report.events {
                        println!("{}", event.forces.event);
                        println!("{}", report::event_table(event));
                    }
                }
                processed.push(file);
            }
            Err(err) => {
                warn!(file_name = %file_name, error = %err, "Failed to process file");
                eprintln!("WARNING: skipping {file_name}: {err}");
                failures.push(FileFailure {
                    file_name,
                    error: err.to_string(),
                });
            }
        }
    }

    info!(
        processed = processed.len(),
        failed = failures.len(),
        "Calculation finished"
    );
    if processed.is_empty() {
        bail!("none of the {} files could be processed", files.len());
    }

    if let Some(bundle_path) = &args.bundle {
        let bytes = create_bundle(&processed, &failures, &params, &selection, Utc::now())?;
        fs::write(bundle_path, bytes)
            .with_context(|| format!("failed to write {}", bundle_path.display()))?;
        println!("\nResults bundle written to {}", bundle_path.display());
    }

    Ok(())
}

/// Files as given; directories expand to their `*.xlsx` and `*.csv` entries.
fn expand_paths(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if !path.is_dir() {
            files.push(path.clone());
            continue;
        }

        let mut found = Vec::new();
        for extension in ["xlsx", "csv"] {
            let pattern = directory_pattern(path, extension)?;
            for entry in glob::glob(&pattern)? {
                match entry {
                    Ok(file) if file.is_file() => found.push(file),
                    Ok(_) => {}
                    Err(err) => warn!(error = %err, "Could not read path from glob pattern"),
                }
            }
        }
        found.sort();
        files.extend(found);
    }
    Ok(files)
}

fn directory_pattern(dir: &Path, extension: &str) -> Result<String> {
    let escaped = glob::Pattern::escape(
        dir.to_str()
            .with_context(|| format!("path is not valid UTF-8: {}", dir.display()))?,
    );
    Ok(format!("{escaped}/*.{extension}"))
}
