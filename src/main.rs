// sortreel: sort weather records and play the sort back step by step

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::info;

use sortreel::config::{PlaybackConfig, DEFAULT_INTERVAL_MS, DEFAULT_TOP_N};
use sortreel::logging::{self, Verbosity};
use sortreel::meter::measure_generate;
use sortreel::playback::{PlaybackController, Status};
use sortreel::source::{JsonFileSource, RecordSource, Selection};
use sortreel::{analysis, Algorithm, Record, SortOrder};

#[derive(Parser, Debug)]
#[command(
    name = "sortreel",
    version,
    about = "Generate and play back the sort trace of weather records"
)]
struct Cli {
    /// JSON file holding an array of record objects.
    input: PathBuf,

    /// Attribute to sort on (e.g. Temperature, Humidity, Pressure).
    #[arg(short, long, default_value = "Temperature")]
    key: String,

    /// Sort algorithm: merge or quick.
    #[arg(short, long, default_value = "merge")]
    algorithm: Algorithm,

    /// Sort order: asc or desc.
    #[arg(short, long, default_value = "desc")]
    order: SortOrder,

    /// Number of top records to keep before sorting.
    #[arg(short = 'n', long, default_value_t = DEFAULT_TOP_N)]
    top: usize,

    /// Milliseconds between playback steps.
    #[arg(long, env = "SORTREEL_INTERVAL_MS", default_value_t = DEFAULT_INTERVAL_MS)]
    interval_ms: u64,

    /// Print the sorted result without playing the trace back.
    #[arg(long)]
    no_play: bool,

    /// Print key statistics of the selected records.
    #[arg(long)]
    stats: bool,

    /// Debug-level logging.
    #[arg(short, long)]
    verbose: bool,

    /// Only log errors.
    #[arg(short, long)]
    quiet: bool,
}

fn render(step: usize, last: usize, key: &str, snapshot: &[Record]) -> String {
    let values: Vec<String> = snapshot
        .iter()
        .map(|r| r.get(key).map_or_else(|| "-".to_string(), |v| v.to_string()))
        .collect();
    format!("step {:>3}/{}: {}", step, last, values.join(" "))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    if let Err(e) = logging::init(Verbosity::from_flags(cli.verbose, cli.quiet)) {
        eprintln!("Warning: logging unavailable: {}", e);
    }

    let selection = Selection {
        key: cli.key.clone(),
        algorithm: cli.algorithm,
        order: cli.order,
        limit: Some(cli.top),
    };
    let records = JsonFileSource::new(&cli.input).fetch(&selection)?;
    info!(records = records.len(), %selection, "records selected");

    if cli.stats {
        match analysis::summarize(&records, &cli.key)? {
            Some(stats) => println!(
                "{}: min {} / max {} / mean {:.2} / median {} / trend {} ({:+.3} per record)",
                cli.key,
                stats.min,
                stats.max,
                stats.mean,
                stats.median,
                stats.trend.label(),
                stats.slope
            ),
            None => println!("{}: no records", cli.key),
        }
    }

    let measured = measure_generate(&records, &cli.key, cli.algorithm, cli.order)?;
    let last = measured.trace.last_step();
    println!(
        "{} sort ({}, {}): {} snapshots in {:.3} ms",
        cli.algorithm,
        cli.algorithm.time_complexity(),
        cli.order,
        measured.trace.len(),
        measured.millis()
    );

    if cli.no_play {
        println!("{}", render(last, last, &cli.key, measured.trace.last()));
        return Ok(());
    }

    let controller = PlaybackController::new(PlaybackConfig::with_interval_ms(cli.interval_ms));
    println!("{}", render(0, last, &cli.key, measured.trace.first()));

    let key = cli.key.clone();
    let subscription = controller.subscribe(move |step, snapshot: &[Record]| {
        println!("{}", render(step, last, &key, snapshot));
    });
    controller.load(measured.trace);
    controller.start(None);
    // A short trace may already be Completed here
    let status = controller.status();
    if matches!(status, Status::Idle | Status::Paused) {
        subscription.unsubscribe();
        return Err(format!("Playback could not start (status {:?})", status).into());
    }

    let end = controller.wait_while_running(Duration::from_millis(50));
    subscription.unsubscribe();
    if end != Status::Completed {
        return Err(format!(
            "Playback stopped at step {} of {} ({:?})",
            controller.current_step(),
            last,
            end
        )
        .into());
    }

    Ok(())
}
