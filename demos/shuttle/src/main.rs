//! shuttle: a city bus working its way along a line of stops.
//!
//! Usage: `shuttle [config.json] [output_dir]`
//!
//! Without a config file the built-in city bus runs ten stops with default
//! tuning.  Per-stop reports go to `<output_dir>/stop_reports.csv`
//! (default `output/shuttle`).  Set `RUST_LOG=debug` to follow individual
//! admissions and door events.

mod config;
mod observer;
mod report_csv;

#[cfg(test)]
mod tests;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use pax_stop::{StopLayout, StopSchedulerBuilder};
use pax_world::KinematicWorld;

use config::ShuttleConfig;
use observer::ReportObserver;
use report_csv::{CsvReportWriter, REPORT_FILE};

const DEFAULT_OUTPUT_DIR: &str = "output/shuttle";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => ShuttleConfig::load(path.as_ref())?,
        None => ShuttleConfig::default(),
    };
    let output_dir = args.next().map_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR), PathBuf::from);

    println!("=== shuttle: pax stop-cycle demo ===");
    println!(
        "Stops: {}  |  Capacity: {}  |  Seed: {}",
        config.stops, config.stop.capacity, config.sim.seed
    );
    println!();

    // 1. World and vehicle.
    let (layout, world) = match config.layout.clone() {
        Some(layout) => (layout, KinematicWorld::new()),
        None => (
            StopLayout::city_bus(),
            KinematicWorld::new().with_areas(StopLayout::city_bus_areas()),
        ),
    };
    println!(
        "Vehicle: {} seats, {} m between doors",
        layout.seats.len(),
        layout.entry.frame.position.distance(layout.exit.frame.position)
    );

    // 2. Scheduler.
    let mut stop = StopSchedulerBuilder::new(config.sim.clone(), layout, world)
        .stop_config(config.stop.clone())
        .agent_config(config.agent.clone())
        .build()
        .context("building the stop scheduler")?;

    // 3. Output.
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("creating {}", output_dir.display()))?;
    let writer = CsvReportWriter::new(&output_dir).context("opening the report file")?;
    let mut observer = ReportObserver::new(writer);

    // 4. Run.
    let t0 = Instant::now();
    let completed = stop.run_stops(config.stops, &mut observer);
    let elapsed = t0.elapsed();
    observer.finish();
    if let Some(e) = observer.take_error() {
        return Err(e).context("writing stop reports");
    }

    if completed < config.stops {
        tracing::warn!(
            completed,
            requested = config.stops,
            end_tick = config.sim.total_ticks,
            "run ended before every stop was served; raise sim.total_ticks"
        );
    }

    // 5. Summary.
    let sim_secs = stop.clock().elapsed_secs();
    println!();
    println!("Stops completed : {completed}");
    println!("Simulated time  : {sim_secs:.1} s ({} ticks)", stop.clock().current_tick.0);
    println!("Wall time       : {:.3} s", elapsed.as_secs_f64());
    println!("Boarded         : {}", observer.boarded);
    println!("Alighted        : {}", observer.alighted);
    println!("Recycled        : {}", observer.recycled);
    println!("Forced closes   : {}", observer.forced_closes);
    println!("On board now    : {}", stop.inside().len());
    println!("Queued now      : {}", stop.queue().len());
    println!(
        "Reports         : {} rows → {}",
        observer.rows_written(),
        output_dir.join(REPORT_FILE).display()
    );

    Ok(())
}
