//! scenario — a time-aware shaper port with guard bands.
//!
//! Runs a single egress port: full-size frames arrive every 20 µs, a gate
//! cycles through `[100, 50, 100, 50]` µs windows, and a preempting server
//! holds whenever the worst-case guard band is up.
//!
//! ```text
//! scenario [CONFIG.json] [OUTPUT_DIR]
//! ```
//!
//! Without a config file the built-in scenario runs.  With an output
//! directory, `gate_events.csv` and `streams.csv` are written there.
//! Set `RUST_LOG=debug` for per-event logs.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use tas_core::Tick;
use tas_output::{CsvTraceWriter, TraceObserver};
use tas_sim::{NoopObserver, SimBuilder, SimConfig, SimObserver, load_config_file};

// ── Observer wrapper to count events ─────────────────────────────────────────

#[derive(Default)]
struct Counts {
    guard_bands: usize,
    fragments:   usize,
}

struct CountingObserver<O: SimObserver> {
    inner:  O,
    counts: Counts,
}

impl<O: SimObserver> CountingObserver<O> {
    fn new(inner: O) -> Self {
        Self { inner, counts: Counts::default() }
    }
}

impl<O: SimObserver> SimObserver for CountingObserver<O> {
    fn on_gate_changed(&mut self, at: Tick, open: bool) {
        self.inner.on_gate_changed(at, open);
    }

    fn on_guard_band_changed(&mut self, at: Tick, active: bool) {
        self.inner.on_guard_band_changed(at, active);
    }

    fn on_transmission_allowed_changed(&mut self, at: Tick, allowed: bool) {
        if !allowed {
            self.counts.guard_bands += 1;
        }
        self.inner.on_transmission_allowed_changed(at, allowed);
    }

    fn on_stream_started(&mut self, at: Tick, packet: &tas_core::Packet) {
        self.inner.on_stream_started(at, packet);
    }

    fn on_stream_ended(&mut self, at: Tick, packet: &tas_core::Packet, complete: bool) {
        if !complete {
            self.counts.fragments += 1;
        }
        self.inner.on_stream_ended(at, packet, complete);
    }

    fn on_sim_end(&mut self, final_tick: Tick) {
        self.inner.on_sim_end(final_tick);
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => load_config_file(Path::new(&path))
            .with_context(|| format!("loading config from {path}"))?,
        None => SimConfig::scenario(),
    };
    let output_dir = args.next();

    println!("=== scenario — time-aware shaper port ===");
    println!(
        "Cycle: {:?} ns  |  Policy: {:?}  |  Mode: {}",
        config.gate.schedule, config.gate.guard_band_policy, config.server.preemption_mode
    );
    println!("Duration: {} ns  |  Seed: {}", config.duration, config.seed);
    println!();

    let mut sim = SimBuilder::new(config).build()?;
    let t0 = Instant::now();

    let counts = match output_dir {
        Some(dir) => {
            std::fs::create_dir_all(&dir).with_context(|| format!("creating {dir}"))?;
            let writer = CsvTraceWriter::new(Path::new(&dir))?;
            let mut obs = CountingObserver::new(TraceObserver::new(writer));
            sim.run(&mut obs)?;
            if let Some(e) = obs.inner.take_error() {
                eprintln!("output error: {e}");
            }
            println!("Trace written to {dir}/");
            obs.counts
        }
        None => {
            let mut obs = CountingObserver::new(NoopObserver);
            sim.run(&mut obs)?;
            obs.counts
        }
    };
    let elapsed = t0.elapsed();

    println!("Simulation complete in {:.3} ms", elapsed.as_secs_f64() * 1e3);
    println!("  transmission blocked : {} times", counts.guard_bands);
    println!("  preempted fragments  : {}", counts.fragments);
    println!("  delivered bytes      : {}", sim.sink.delivered_bytes());
    println!("  queued at end        : {} frames", sim.queue.len());
    println!();

    println!("{:<8} {:>10} {:>10} {:>8} {:<8}", "Frame", "Start ns", "End ns", "Bytes", "Complete");
    println!("{}", "-".repeat(48));
    for r in sim.sink.receptions() {
        println!(
            "{:<8} {:>10} {:>10} {:>8} {:<8}",
            r.packet_id.0,
            r.started_at.0,
            r.ended_at.0,
            r.sent_bytes,
            if r.complete { "yes" } else { "no" },
        );
    }

    Ok(())
}
