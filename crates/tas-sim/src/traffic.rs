//! Seeded packet generator.

use tas_core::{Packet, PacketId, SimRng, Tick};

use crate::{SimResult, TrafficConfig};

/// Emits one packet per arrival with a length drawn uniformly from
/// `min_length..=max_length`.  The same seed always yields the same train.
pub struct TrafficSource {
    config:  TrafficConfig,
    rng:     SimRng,
    next_id: u64,
}

impl TrafficSource {
    pub fn new(config: TrafficConfig, seed: u64) -> SimResult<Self> {
        config.validate()?;
        Ok(Self { config, rng: SimRng::new(seed), next_id: 0 })
    }

    pub fn config(&self) -> &TrafficConfig {
        &self.config
    }

    /// Packets emitted so far.
    pub fn emitted(&self) -> u64 {
        self.next_id
    }

    fn exhausted(&self) -> bool {
        self.config.count.is_some_and(|n| self.next_id >= n)
    }

    /// When the first packet arrives, if any.
    pub fn first_arrival(&self) -> Option<Tick> {
        (!self.exhausted()).then_some(Tick(self.config.start))
    }

    /// When the packet after the one emitted at `now` arrives, if any.
    pub fn next_arrival(&self, now: Tick) -> Option<Tick> {
        (!self.exhausted()).then_some(now + self.config.interval)
    }

    /// Draw the next packet.
    pub fn emit(&mut self) -> Packet {
        let length = self.rng.gen_range(self.config.min_length..=self.config.max_length);
        let packet = Packet::new(PacketId(self.next_id), length);
        self.next_id += 1;
        packet
    }
}
