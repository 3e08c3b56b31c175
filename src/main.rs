use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use photo_geotag::app::{Session, SessionError};
use photo_geotag::config::{ElevationConfig, GeotagConfig, OverwritePolicy};
use photo_geotag::core::elevation::{
    ElevationClient, ElevationSource, FixedElevation, NoElevation,
};
use photo_geotag::core::metadata;
use photo_geotag::core::selection::Classification;
use photo_geotag::models::{BatchReport, ImageRecord};

#[derive(Parser)]
#[command(name = "photo_geotag", version, about = "Write a map location into JPEG EXIF")]
struct Cli {
    /// Log debug output (repeatable).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write GPS tags, and optionally a capture date, into the given files.
    Tag(TagArgs),
    /// Show which files already carry a location or a capture date.
    Inspect {
        #[arg(long)]
        json: bool,

        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[derive(Args)]
struct TagArgs {
    /// Latitude in decimal degrees, south negative.
    #[arg(long, allow_hyphen_values = true)]
    lat: String,

    /// Longitude in decimal degrees, west negative.
    #[arg(long, allow_hyphen_values = true)]
    lon: String,

    /// Overwrite existing GPS tags without asking.
    #[arg(long, conflicts_with = "keep_existing")]
    overwrite: bool,

    /// Skip files that already have GPS tags without asking.
    #[arg(long)]
    keep_existing: bool,

    /// Capture date for files that have none, as "YYYY:MM:DD HH:MM:SS".
    #[arg(long)]
    date: Option<String>,

    /// Do not query the elevation service; altitude is written as 0.
    #[arg(long)]
    no_elevation: bool,

    /// Use this elevation in meters instead of looking it up.
    #[arg(long, allow_hyphen_values = true, conflicts_with = "no_elevation")]
    elevation: Option<f64>,

    #[arg(long, value_name = "URL")]
    elevation_url: Option<String>,

    #[arg(long)]
    json: bool,

    #[arg(required = true)]
    files: Vec<PathBuf>,
}

impl TagArgs {
    fn config(&self) -> GeotagConfig {
        let mut elevation = ElevationConfig {
            enabled: !self.no_elevation,
            ..ElevationConfig::default()
        };
        if let Some(url) = &self.elevation_url {
            elevation.endpoint = url.clone();
        }

        let overwrite = if self.overwrite {
            OverwritePolicy::Always
        } else if self.keep_existing {
            OverwritePolicy::Never
        } else {
            OverwritePolicy::Ask
        };

        GeotagConfig {
            elevation,
            overwrite,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Tag(args) => run_tag(args),
        Command::Inspect { json, files } => run_inspect(&files, json),
    }
}

fn init_tracing(verbose: u8) {
    let default_filter = if verbose > 0 {
        "photo_geotag=debug"
    } else {
        "photo_geotag=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run_tag(args: TagArgs) -> Result<()> {
    if let Some(date) = &args.date {
        metadata::validate_exif_date(date).context("--date rejected, no file was changed")?;
    }

    let config = args.config();
    let mut session = Session::new(elevation_source(args.elevation, &config.elevation));

    session
        .set_point(&args.lat, &args.lon)
        .context("invalid map point")?;
    eprintln!("{}", session.status());

    session.select_files(&args.files);
    eprintln!("{}", session.status());

    let mut reports = Vec::new();

    // An empty GPS write set is only a warning; the date action still runs.
    let policy = config.overwrite;
    match session.write_gps(|tagged| policy.decide(tagged, confirm_overwrite)) {
        Ok(report) => {
            eprintln!("{}", session.status());
            reports.push(report);
        }
        Err(SessionError::NoFilesSelected) => {}
        Err(err) => {
            print_warnings(&mut session);
            return Err(err).context("GPS tags not written");
        }
    }
    print_warnings(&mut session);

    if let Some(date) = &args.date {
        match session.write_date(date) {
            Ok(report) => {
                eprintln!("{}", session.status());
                reports.push(report);
            }
            Err(SessionError::NoFilesSelected) => {}
            Err(err) => {
                print_warnings(&mut session);
                return Err(err).context("capture date not written");
            }
        }
        print_warnings(&mut session);
    }

    if reports.is_empty() {
        bail!("nothing to write in the selected files");
    }
    for report in &reports {
        print_report(report, args.json)?;
    }

    let failed: usize = reports.iter().map(|report| report.summary.failed).sum();
    if failed > 0 {
        bail!("{failed} write(s) failed");
    }
    Ok(())
}

fn run_inspect(files: &[PathBuf], json: bool) -> Result<()> {
    let selection = Classification::classify(files);

    if json {
        let out = serde_json::to_string_pretty(&selection.records)
            .context("failed to encode inspection result")?;
        println!("{out}");
        return Ok(());
    }

    for record in &selection.records {
        println!("{}", describe(record));
    }
    Ok(())
}

fn elevation_source(fixed: Option<f64>, config: &ElevationConfig) -> Box<dyn ElevationSource> {
    if let Some(meters) = fixed {
        return Box::new(FixedElevation(meters));
    }
    if !config.enabled {
        return Box::new(NoElevation);
    }

    match ElevationClient::new(config.clone()) {
        Ok(client) => {
            debug!(
                endpoint = %client.config().endpoint,
                koordsys = client.config().coordinate_system,
                "elevation lookups enabled"
            );
            Box::new(client)
        }
        Err(err) => {
            warn!(error = %err, "elevation client unavailable, altitude will be 0");
            Box::new(NoElevation)
        }
    }
}

/// Asks on stdin. Anything other than y/yes, including a read error, is a no.
fn confirm_overwrite(tagged: &[PathBuf]) -> bool {
    eprintln!("{} selected image(s) already have GPS data:", tagged.len());
    for path in tagged {
        eprintln!("  {}", path.display());
    }
    eprint!("Overwrite existing GPS data? [y/N] ");
    let _ = io::stderr().flush();

    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

fn print_warnings<E: ElevationSource>(session: &mut Session<E>) {
    for message in session.take_warnings() {
        eprintln!("warning: {message}");
    }
}

fn print_report(report: &BatchReport, json: bool) -> Result<()> {
    if json {
        let out = serde_json::to_string_pretty(report).context("failed to encode report")?;
        println!("{out}");
        return Ok(());
    }

    for result in &report.results {
        match &result.error {
            None => println!("ok    {}", result.path.display()),
            Some(error) => println!("FAIL  {}: {error}", result.path.display()),
        }
    }
    println!(
        "{}: {} written, {} failed",
        report.operation.label(),
        report.summary.succeeded,
        report.summary.failed
    );
    Ok(())
}

fn describe(record: &ImageRecord) -> String {
    let location = match record.location {
        Some((latitude, longitude, altitude)) => {
            format!("{latitude:.6}, {longitude:.6} @ {altitude:.2}m")
        }
        None => String::from("no GPS"),
    };
    let date = record.date_taken.as_deref().unwrap_or("no capture date");
    format!("{}\t{location}\t{date}", record.path.display())
}
