//! Fluent builder for constructing a [`Sim`].

use tas_core::Packet;
use tas_gate::PeriodicGate;
use tas_schedule::EventScheduler;
use tas_server::PreemptingServer;

use crate::{LinkSink, PacketQueue, Sim, SimConfig, SimError, SimResult, TrafficSource};

/// Fluent builder for [`Sim`].
///
/// # Optional inputs (have defaults)
///
/// | Method                  | Default                          |
/// |-------------------------|----------------------------------|
/// | `.initial_packets(v)`   | Empty queue                      |
/// | `.without_traffic()`    | Source from `config.traffic`     |
/// | `.link_busy(b)`         | Link free                        |
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimBuilder::new(SimConfig::scenario())
///     .initial_packets(vec![Packet::new(PacketId(0), 1_500)])
///     .build()?;
/// sim.run(&mut NoopObserver)?;
/// ```
pub struct SimBuilder {
    config:          SimConfig,
    initial_packets: Vec<Packet>,
    with_traffic:    bool,
    link_busy:       bool,
}

impl SimBuilder {
    pub fn new(config: SimConfig) -> Self {
        Self {
            config,
            initial_packets: Vec::new(),
            with_traffic:    true,
            link_busy:       false,
        }
    }

    /// Packets already queued at tick 0.
    pub fn initial_packets(mut self, packets: Vec<Packet>) -> Self {
        self.initial_packets = packets;
        self
    }

    /// Ignore `config.traffic`; packets then only come from
    /// [`initial_packets`][Self::initial_packets] and
    /// [`Sim::inject`][crate::Sim::inject].
    pub fn without_traffic(mut self) -> Self {
        self.with_traffic = false;
        self
    }

    /// Start with the link refusing new streams.
    pub fn link_busy(mut self, busy: bool) -> Self {
        self.link_busy = busy;
        self
    }

    /// Validate inputs and return a ready-to-run [`Sim`].
    pub fn build(self) -> SimResult<Sim> {
        if self.config.duration == 0 {
            return Err(SimError::Config("duration must be > 0".into()));
        }

        let gate = PeriodicGate::new(&self.config.gate)?;
        let server = PreemptingServer::new(&self.config.server);
        if self.config.gate.data_rate.is_some_and(|r| r != server.datarate()) {
            tracing::warn!(
                gate = ?self.config.gate.data_rate,
                server = %server.datarate(),
                "gate and server data rates differ"
            );
        }

        let traffic = match (&self.config.traffic, self.with_traffic) {
            (Some(t), true) => Some(TrafficSource::new(t.clone(), self.config.seed)?),
            _ => None,
        };

        let mut queue = PacketQueue::new();
        for packet in self.initial_packets {
            queue.push(packet);
        }
        let mut sink = LinkSink::new();
        sink.set_busy(self.link_busy);

        tracing::info!(
            duration = self.config.duration,
            policy = %self.config.gate.guard_band_policy,
            mode = %self.config.server.preemption_mode,
            queued = queue.len(),
            "built simulation"
        );

        Ok(Sim::from_parts(
            self.config,
            EventScheduler::new(),
            queue,
            gate,
            server,
            sink,
            traffic,
        ))
    }
}
