//! Run configuration and its JSON loader.
//!
//! ```json
//! {
//!   "duration": 600000,
//!   "seed": 7,
//!   "gate":   { "schedule": [100000, 50000, 100000, 50000], "initially_open": true,
//!               "data_rate": "1Gbps", "max_frame_length": 1500 },
//!   "server": { "datarate": "1Gbps", "preemption_mode": "withHoldRelease" },
//!   "traffic": { "interval": 20000, "min_length": 64, "max_length": 1500 }
//! }
//! ```

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tas_core::{Bitrate, Tick};
use tas_gate::{GateConfig, GuardBandPolicy};
use tas_server::{PreemptionMode, ServerConfig};

use crate::{SimError, SimResult};

// ── TrafficConfig ─────────────────────────────────────────────────────────────

/// Periodic packet arrivals with uniformly drawn lengths.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrafficConfig {
    /// Tick of the first arrival.
    pub start:      u64,
    /// Ticks between arrivals.  Must be `> 0`.
    pub interval:   u64,
    /// Inclusive bounds on the packet length in bytes.
    pub min_length: u64,
    pub max_length: u64,
    /// Stop after this many packets; unbounded if `None`.
    pub count:      Option<u64>,
}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self {
            start:      0,
            interval:   10_000,
            min_length: 64,
            max_length: 1_500,
            count:      None,
        }
    }
}

impl TrafficConfig {
    pub fn validate(&self) -> SimResult<()> {
        if self.interval == 0 {
            return Err(SimError::Config("traffic interval must be > 0".into()));
        }
        if self.min_length == 0 || self.min_length > self.max_length {
            return Err(SimError::Config(format!(
                "traffic lengths must satisfy 0 < min_length <= max_length, got {}..={}",
                self.min_length, self.max_length
            )));
        }
        Ok(())
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimConfig {
    /// Simulated time to run, in ticks.
    pub duration: u64,

    /// Seed for the traffic source.
    #[serde(default)]
    pub seed: u64,

    pub gate: GateConfig,

    pub server: ServerConfig,

    /// Generated traffic.  `None` runs without a source; packets can still
    /// be injected by hand.
    #[serde(default)]
    pub traffic: Option<TrafficConfig>,
}

impl SimConfig {
    pub fn end_tick(&self) -> Tick {
        Tick(self.duration)
    }

    /// Two 300 µs cycles of `[100, 50, 100, 50]` µs at 1 Gb/s with a
    /// 1500-byte worst-case frame, full-size traffic every 20 µs, and a
    /// server that holds on guard bands.
    pub fn scenario() -> Self {
        let rate = Bitrate::gbps(1);
        SimConfig {
            duration: 600_000,
            seed:     42,
            gate:     GateConfig {
                schedule:          vec![100_000, 50_000, 100_000, 50_000],
                initially_open:    true,
                guard_band_policy: GuardBandPolicy::WorstCase,
                max_frame_length:  1_500,
                data_rate:         Some(rate),
                ..GateConfig::default()
            },
            server:   ServerConfig::new(rate, PreemptionMode::WithHoldRelease),
            traffic:  Some(TrafficConfig {
                interval:   20_000,
                min_length: 1_500,
                max_length: 1_500,
                ..TrafficConfig::default()
            }),
        }
    }
}

/// Read a [`SimConfig`] from JSON.
pub fn load_config_json<R: Read>(reader: R) -> SimResult<SimConfig> {
    Ok(serde_json::from_reader(reader)?)
}

/// Read a [`SimConfig`] from a JSON file.
pub fn load_config_file(path: &Path) -> SimResult<SimConfig> {
    let file = File::open(path)?;
    load_config_json(BufReader::new(file))
}
