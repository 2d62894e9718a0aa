//! The peers a server reacts against.

use tas_core::{PacketConsumer, PacketProvider, TimerHost};

/// Mutable borrows of the server's upstream, downstream and timer host,
/// built by the caller for the duration of one reaction.
///
/// The server owns none of its peers; the simulation loop assembles a
/// fresh context for every call so the same queue, gate and link can be
/// observed and driven by other components between reactions.
pub struct StreamContext<'a> {
    pub provider: &'a mut dyn PacketProvider,
    pub consumer: &'a mut dyn PacketConsumer,
    pub timers:   &'a mut dyn TimerHost,
}

impl<'a> StreamContext<'a> {
    #[inline]
    pub fn new(
        provider: &'a mut dyn PacketProvider,
        consumer: &'a mut dyn PacketConsumer,
        timers:   &'a mut dyn TimerHost,
    ) -> Self {
        Self { provider, consumer, timers }
    }
}
