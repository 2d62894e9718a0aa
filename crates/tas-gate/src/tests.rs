//! Unit tests for tas-gate.

use tas_core::{Bitrate, Packet, PacketId, Tick, TimerHost, TimerTarget};
use tas_schedule::EventScheduler;

use crate::{GateConfig, GateError, GateSignal, GuardBandCalculator, GuardBandPolicy, PeriodicGate};

// ── Helpers ───────────────────────────────────────────────────────────────────

const US: u64 = 1_000;

/// `[100, 50, 100, 50]` µs, initially open, 1 Gb/s, 1500 B max frame
/// (12 µs on the wire), worst-case policy.
fn scenario_config() -> GateConfig {
    GateConfig {
        schedule:          vec![100 * US, 50 * US, 100 * US, 50 * US],
        initially_open:    true,
        guard_band_policy: GuardBandPolicy::WorstCase,
        max_frame_length:  1_500,
        data_rate:         Some(Bitrate::gbps(1)),
        ..GateConfig::default()
    }
}

fn best_case_config() -> GateConfig {
    GateConfig { guard_band_policy: GuardBandPolicy::BestCase, ..scenario_config() }
}

/// A frame that takes `us` microseconds at 1 Gb/s.
fn frame_of_us(us: u64) -> Packet {
    Packet::new(PacketId(1), us * 125)
}

fn started(config: &GateConfig) -> (PeriodicGate, EventScheduler, Vec<GateSignal>) {
    let mut gate = PeriodicGate::new(config).unwrap();
    let mut timers = EventScheduler::new();
    let signals = gate.initialize(None, &mut timers);
    (gate, timers, signals)
}

/// Dispatch every timer due up to `until`, collecting emitted signals.
fn run_until(
    gate:   &mut PeriodicGate,
    timers: &mut EventScheduler,
    head:   Option<&Packet>,
    until:  Tick,
) -> Vec<(Tick, GateSignal)> {
    let mut out = Vec::new();
    while let Some((handle, target)) = timers.pop_due(until) {
        assert_ne!(target, TimerTarget::StreamEnd);
        let now = timers.now();
        for s in gate.on_timer(handle, head, timers).unwrap() {
            out.push((now, s));
        }
        assert!(!gate.is_in_guard_band() || gate.is_open(), "guard band while closed");
    }
    timers.advance_to(until);
    out
}

fn guard_band_flips(signals: &[(Tick, GateSignal)]) -> Vec<(Tick, bool)> {
    signals
        .iter()
        .filter_map(|&(t, s)| match s {
            GateSignal::GuardBandChanged(b) => Some((t, b)),
            _ => None,
        })
        .collect()
}

// ── Configuration ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod config {
    use super::*;

    #[test]
    fn policy_parses_camel_case_names() {
        assert_eq!("bestCase".parse::<GuardBandPolicy>().unwrap(), GuardBandPolicy::BestCase);
        assert_eq!("worstCase".parse::<GuardBandPolicy>().unwrap(), GuardBandPolicy::WorstCase);
        assert_eq!(GuardBandPolicy::BestCase.to_string(), "bestCase");
    }

    #[test]
    fn unknown_policy_is_configuration_error() {
        let err = "averageCase".parse::<GuardBandPolicy>().unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("averageCase"));
    }

    #[test]
    fn json_partial_config_uses_defaults() {
        let json = r#"{
            "schedule": [100000, 50000],
            "initially_open": true,
            "guard_band_policy": "bestCase",
            "data_rate": "1Gbps"
        }"#;
        let cfg: GateConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.guard_band_policy, GuardBandPolicy::BestCase);
        assert_eq!(cfg.data_rate, Some(Bitrate::gbps(1)));
        assert_eq!(cfg.max_frame_length, 1_500);
        assert_eq!(cfg.fixed_overhead_bytes, 100);
        assert!(cfg.enable_implicit_guard_band);
    }

    #[test]
    fn json_rejects_unknown_policy_and_fields() {
        let bad_policy = r#"{ "schedule": [1, 1], "guard_band_policy": "typical" }"#;
        assert!(serde_json::from_str::<GateConfig>(bad_policy).is_err());
        let bad_field = r#"{ "schedule": [1, 1], "gbMode": "bestCase" }"#;
        assert!(serde_json::from_str::<GateConfig>(bad_field).is_err());
    }

    #[test]
    fn gate_rejects_malformed_schedules() {
        for schedule in [vec![], vec![10, 20, 30], vec![10, 0]] {
            let cfg = GateConfig { schedule, ..scenario_config() };
            let err = PeriodicGate::new(&cfg).err().unwrap();
            assert!(matches!(err, GateError::Schedule(_)));
            assert!(err.is_configuration());
        }
    }
}

// ── Guard-band calculator ─────────────────────────────────────────────────────

#[cfg(test)]
mod calculator {
    use super::*;

    fn worst() -> GuardBandCalculator {
        GuardBandCalculator::from_config(&scenario_config())
    }

    fn best() -> GuardBandCalculator {
        GuardBandCalculator::from_config(&best_case_config())
    }

    #[test]
    fn worst_case_lead_is_max_frame_time() {
        assert_eq!(worst().worst_case_lead(), Some(12 * US));
        assert_eq!(best().worst_case_lead(), None);
    }

    #[test]
    fn projected_durations() {
        // (1500 + 100) B at 1 Gb/s.
        assert_eq!(worst().projected_duration(None), Some(12_800));
        assert_eq!(worst().projected_duration(Some(&frame_of_us(1))), Some(12_800));
        assert_eq!(best().projected_duration(Some(&frame_of_us(15))), Some(15 * US));
        assert_eq!(best().projected_duration(None), None);

        let mut calc = best();
        calc.extra_length = 25;
        calc.extra_latency = 7;
        assert_eq!(calc.projected_duration(Some(&frame_of_us(1))), Some(1_000 + 200 + 7));
    }

    #[test]
    fn admits_boundary_is_inclusive() {
        let calc = best();
        let p = frame_of_us(10);
        assert!(calc.admits(Tick(90 * US), Some(&p), Some(Tick(100 * US))));
        assert!(!calc.admits(Tick(90 * US + 1), Some(&p), Some(Tick(100 * US))));
    }

    #[test]
    fn admits_everything_without_a_close() {
        assert!(worst().admits(Tick(99 * US), None, None));
        assert!(best().admits(Tick(99 * US), Some(&frame_of_us(1_000)), None));
    }

    #[test]
    fn best_case_rejects_missing_candidate() {
        assert!(!best().admits(Tick(0), None, Some(Tick(100 * US))));
    }

    #[test]
    fn unbounded_rate_and_disabled_guard_band_delegate() {
        let mut calc = worst();
        calc.data_rate = None;
        assert!(calc.admits(Tick(99 * US), None, Some(Tick(100 * US))));
        assert!(!calc.evaluate(true, Tick(99 * US), None, Some(Tick(100 * US))));

        let mut calc = worst();
        calc.implicit = false;
        assert!(calc.admits(Tick(99 * US), None, Some(Tick(100 * US))));
        assert_eq!(calc.worst_case_lead(), None);
    }

    #[test]
    fn evaluate_is_false_while_closed() {
        assert!(!worst().evaluate(false, Tick(99 * US), None, Some(Tick(100 * US))));
        assert!(!best().evaluate(false, Tick(99 * US), Some(&frame_of_us(50)), Some(Tick(100 * US))));
    }

    #[test]
    fn best_case_needs_a_head_of_line_packet() {
        let calc = best();
        let close = Some(Tick(100 * US));
        assert!(!calc.evaluate(true, Tick(99 * US), None, close));
        assert!(calc.evaluate(true, Tick(86 * US), Some(&frame_of_us(15)), close));
        assert!(!calc.evaluate(true, Tick(85 * US), Some(&frame_of_us(15)), close));
    }
}

// ── Worst-case gate ───────────────────────────────────────────────────────────

#[cfg(test)]
mod worst_case {
    use super::*;

    #[test]
    fn initial_open_gate_reports_flow() {
        let (gate, timers, signals) = started(&scenario_config());
        assert!(gate.is_open());
        assert_eq!(
            signals,
            vec![
                GateSignal::GateStateChanged(true),
                GateSignal::TransmissionAllowedChanged(true),
                GateSignal::CanPushChanged,
                GateSignal::CanPullChanged,
            ]
        );
        assert_eq!(gate.next_close_time(), Some(Tick(100 * US)));
        assert_eq!(gate.guard_band_timer().unwrap().at, Tick(88 * US));
        assert_eq!(timers.queue().len(), 2);
    }

    #[test]
    fn scenario_guard_band_window() {
        let (mut gate, mut timers, _) = started(&scenario_config());
        let signals = run_until(&mut gate, &mut timers, None, Tick(600 * US));
        assert_eq!(
            guard_band_flips(&signals),
            vec![
                (Tick(88 * US), true),
                (Tick(100 * US), false),
                (Tick(238 * US), true),
                (Tick(250 * US), false),
                (Tick(388 * US), true),
                (Tick(400 * US), false),
                (Tick(538 * US), true),
                (Tick(550 * US), false),
            ]
        );
    }

    #[test]
    fn guard_band_activation_blocks_transmission() {
        let (mut gate, mut timers, _) = started(&scenario_config());
        let signals = run_until(&mut gate, &mut timers, None, Tick(88 * US));
        assert_eq!(
            signals,
            vec![
                (Tick(88 * US), GateSignal::GuardBandChanged(true)),
                (Tick(88 * US), GateSignal::TransmissionAllowedChanged(false)),
            ]
        );
        assert!(gate.is_in_guard_band());
        assert!(!gate.is_transmission_allowed());
    }

    #[test]
    fn close_clears_guard_band_before_closing() {
        let (mut gate, mut timers, _) = started(&scenario_config());
        run_until(&mut gate, &mut timers, None, Tick(88 * US));
        let signals = run_until(&mut gate, &mut timers, None, Tick(100 * US));
        assert_eq!(
            signals,
            vec![
                (Tick(100 * US), GateSignal::GuardBandChanged(false)),
                (Tick(100 * US), GateSignal::GateStateChanged(false)),
            ]
        );
        assert!(!gate.is_open());
        assert_eq!(gate.next_close_time(), None);
    }

    #[test]
    fn reopen_rearms_guard_band_timer() {
        let (mut gate, mut timers, _) = started(&scenario_config());
        let signals = run_until(&mut gate, &mut timers, None, Tick(150 * US));
        assert!(signals.ends_with(&[
            (Tick(150 * US), GateSignal::GateStateChanged(true)),
            (Tick(150 * US), GateSignal::TransmissionAllowedChanged(true)),
            (Tick(150 * US), GateSignal::CanPushChanged),
            (Tick(150 * US), GateSignal::CanPullChanged),
        ]));
        assert_eq!(gate.guard_band_timer().unwrap().at, Tick(238 * US));
        assert_eq!(gate.next_close_time(), Some(Tick(250 * US)));
    }

    #[test]
    fn admission_uses_max_frame_regardless_of_candidate() {
        let (mut gate, mut timers, _) = started(&scenario_config());
        let small = frame_of_us(1);
        run_until(&mut gate, &mut timers, None, Tick(70 * US));
        assert!(gate.can_admit(Some(&small), timers.now()).unwrap());
        assert!(gate.can_admit(None, timers.now()).unwrap());
        // 87.2 µs is the last instant at which 12.8 µs still fits.
        run_until(&mut gate, &mut timers, None, Tick(87_200));
        assert!(gate.can_admit(Some(&small), timers.now()).unwrap());
        run_until(&mut gate, &mut timers, None, Tick(87_201));
        assert!(!gate.can_admit(Some(&small), timers.now()).unwrap());
        run_until(&mut gate, &mut timers, None, Tick(90 * US));
        assert!(!gate.can_admit(Some(&small), timers.now()).unwrap());
    }

    #[test]
    fn fifteen_microsecond_candidate_before_close() {
        let long = frame_of_us(15);

        // Worst case projects the 12.8 µs maximum frame, not the candidate.
        let (mut gate, mut timers, _) = started(&scenario_config());
        run_until(&mut gate, &mut timers, None, Tick(70 * US));
        assert!(gate.can_admit(Some(&long), timers.now()).unwrap());
        run_until(&mut gate, &mut timers, None, Tick(80 * US));
        assert!(gate.can_admit(Some(&long), timers.now()).unwrap());
        run_until(&mut gate, &mut timers, None, Tick(88 * US));
        assert!(!gate.can_admit(Some(&long), timers.now()).unwrap());

        // Best case projects the candidate itself: 80 + 15 still fits.
        let (mut gate, mut timers, _) = started(&best_case_config());
        run_until(&mut gate, &mut timers, None, Tick(80 * US));
        assert!(gate.can_admit(Some(&long), timers.now()).unwrap());
        run_until(&mut gate, &mut timers, None, Tick(85 * US));
        assert!(gate.can_admit(Some(&long), timers.now()).unwrap());
        run_until(&mut gate, &mut timers, None, Tick(85 * US + 1));
        assert!(!gate.can_admit(Some(&long), timers.now()).unwrap());
    }

    #[test]
    fn admission_on_closed_gate_is_consistency_error() {
        let (mut gate, mut timers, _) = started(&scenario_config());
        run_until(&mut gate, &mut timers, None, Tick(120 * US));
        let err = gate.can_admit(None, timers.now()).unwrap_err();
        assert!(matches!(err, GateError::GateClosed));
        assert!(!err.is_configuration());
        assert!(!gate.allows_flow(None, timers.now()));
    }

    #[test]
    fn starting_inside_guard_band_activates_immediately() {
        let cfg = GateConfig { initial_offset: 95 * US, ..scenario_config() };
        let (gate, timers, signals) = started(&cfg);
        assert!(gate.is_in_guard_band());
        assert_eq!(
            signals,
            vec![GateSignal::GateStateChanged(true), GateSignal::GuardBandChanged(true)]
        );
        assert!(gate.guard_band_timer().is_none());
        assert_eq!(gate.next_close_time(), Some(Tick(5 * US)));
        assert_eq!(timers.queue().count(TimerTarget::GuardBandActivation), 0);
    }

    #[test]
    fn short_open_interval_is_guarded_from_the_start() {
        // Open for 10 µs only: shorter than the 12 µs lead.
        let cfg = GateConfig {
            schedule:       vec![40 * US, 10 * US],
            initially_open: false,
            ..scenario_config()
        };
        let (mut gate, mut timers, _) = started(&cfg);
        let signals = run_until(&mut gate, &mut timers, None, Tick(45 * US));
        assert_eq!(
            signals,
            vec![
                (Tick(40 * US), GateSignal::GateStateChanged(true)),
                (Tick(40 * US), GateSignal::GuardBandChanged(true)),
            ]
        );
    }

    #[test]
    fn initially_closed_gate_guards_the_first_close() {
        let cfg = GateConfig {
            schedule:       vec![50 * US, 100 * US],
            initially_open: false,
            ..scenario_config()
        };
        let (mut gate, mut timers, signals) = started(&cfg);
        assert!(signals.is_empty());
        assert!(gate.guard_band_timer().is_none());
        let signals = run_until(&mut gate, &mut timers, None, Tick(160 * US));
        assert_eq!(
            guard_band_flips(&signals),
            vec![(Tick(138 * US), true), (Tick(150 * US), false)]
        );
    }

    #[test]
    fn absolute_scheduling_hits_same_instants() {
        let cfg = GateConfig { schedule_for_absolute_time: true, ..scenario_config() };
        let (mut gate, mut timers, _) = started(&cfg);
        let signals = run_until(&mut gate, &mut timers, None, Tick(300 * US));
        assert_eq!(
            guard_band_flips(&signals),
            vec![
                (Tick(88 * US), true),
                (Tick(100 * US), false),
                (Tick(238 * US), true),
                (Tick(250 * US), false),
            ]
        );
    }
}

// ── Best-case gate ────────────────────────────────────────────────────────────

#[cfg(test)]
mod best_case {
    use super::*;

    #[test]
    fn no_guard_band_timer_is_armed() {
        let (mut gate, mut timers, _) = started(&best_case_config());
        assert!(gate.guard_band_timer().is_none());
        let signals = run_until(&mut gate, &mut timers, None, Tick(600 * US));
        assert!(guard_band_flips(&signals).is_empty());
        assert_eq!(timers.queue().count(TimerTarget::GuardBandActivation), 0);
    }

    #[test]
    fn empty_queue_never_guards() {
        let (mut gate, mut timers, _) = started(&best_case_config());
        run_until(&mut gate, &mut timers, None, Tick(99 * US));
        let signals = gate.on_can_pull_changed(None, &timers);
        assert_eq!(signals, vec![GateSignal::CanPullChanged]);
        assert!(!gate.is_in_guard_band());
    }

    #[test]
    fn head_of_line_packet_sizes_the_guard_band() {
        let (mut gate, mut timers, _) = started(&best_case_config());
        let p = frame_of_us(15);

        run_until(&mut gate, &mut timers, None, Tick(80 * US));
        assert_eq!(gate.on_can_pull_changed(Some(&p), &timers), vec![GateSignal::CanPullChanged]);
        assert!(gate.can_admit(Some(&p), timers.now()).unwrap());

        run_until(&mut gate, &mut timers, Some(&p), Tick(86 * US));
        assert_eq!(
            gate.on_can_pull_changed(Some(&p), &timers),
            vec![
                GateSignal::GuardBandChanged(true),
                GateSignal::TransmissionAllowedChanged(false),
                GateSignal::CanPullChanged,
            ]
        );
        assert!(!gate.can_admit(Some(&p), timers.now()).unwrap());

        // A smaller head of line fits again.
        let small = frame_of_us(10);
        assert_eq!(
            gate.on_can_pull_changed(Some(&small), &timers),
            vec![
                GateSignal::GuardBandChanged(false),
                GateSignal::TransmissionAllowedChanged(true),
                GateSignal::CanPullChanged,
            ]
        );
    }

    #[test]
    fn closed_gate_does_not_forward_flow_changes() {
        let (mut gate, mut timers, _) = started(&best_case_config());
        run_until(&mut gate, &mut timers, None, Tick(120 * US));
        assert!(gate.on_can_pull_changed(Some(&frame_of_us(1)), &timers).is_empty());
        assert!(gate.on_can_push_changed(None, &timers).is_empty());
    }
}

// ── Degenerate configurations ─────────────────────────────────────────────────

#[cfg(test)]
mod degenerate {
    use super::*;

    #[test]
    fn unbounded_rate_has_no_guard_band() {
        let cfg = GateConfig { data_rate: None, ..scenario_config() };
        let (mut gate, mut timers, _) = started(&cfg);
        assert!(gate.guard_band_timer().is_none());
        let signals = run_until(&mut gate, &mut timers, None, Tick(99_999));
        assert!(guard_band_flips(&signals).is_empty());
        assert!(gate.can_admit(Some(&frame_of_us(500)), timers.now()).unwrap());
    }

    #[test]
    fn disabled_implicit_guard_band_only_checks_openness() {
        let cfg = GateConfig { enable_implicit_guard_band: false, ..scenario_config() };
        let (mut gate, mut timers, _) = started(&cfg);
        assert!(gate.guard_band_timer().is_none());
        run_until(&mut gate, &mut timers, None, Tick(99 * US));
        assert!(gate.can_admit(None, timers.now()).unwrap());
        assert!(!gate.is_in_guard_band());
    }
}

// ── Timers, priorities, reconfiguration ───────────────────────────────────────

#[cfg(test)]
mod lifecycle {
    use super::*;

    #[test]
    fn priorities_follow_transition_kind() {
        let cfg = GateConfig {
            open_scheduling_priority:  -3,
            close_scheduling_priority: 7,
            ..scenario_config()
        };
        let (mut gate, mut timers, _) = started(&cfg);
        // Interval 0 is open: its end is a close.
        assert_eq!(gate.phase_timer().unwrap().priority, 7);
        assert_eq!(gate.guard_band_timer().unwrap().priority, 7);
        run_until(&mut gate, &mut timers, None, Tick(100 * US));
        // Interval 1 is closed: its end is an open.
        assert_eq!(gate.phase_timer().unwrap().priority, -3);
    }

    #[test]
    fn close_before_open_at_same_instant() {
        // Two gates whose transitions coincide at 100 µs: one closes, one
        // opens.  The host must run the smaller priority first.
        let mut timers = EventScheduler::new();
        let closing_cfg = GateConfig {
            close_scheduling_priority: -1,
            open_scheduling_priority:  1,
            ..scenario_config()
        };
        let opening_cfg = GateConfig {
            initially_open: false,
            schedule:       vec![100 * US, 50 * US],
            ..closing_cfg.clone()
        };
        let mut opening = PeriodicGate::new(&opening_cfg).unwrap();
        let mut closing = PeriodicGate::new(&closing_cfg).unwrap();
        // Arm the opening gate first so FIFO order alone would run it first.
        opening.initialize(None, &mut timers);
        closing.initialize(None, &mut timers);

        let mut order = Vec::new();
        while let Some((handle, _)) = timers.pop_due(Tick(100 * US)) {
            if closing.phase_timer() == Some(handle) || closing.guard_band_timer() == Some(handle) {
                closing.on_timer(handle, None, &mut timers).unwrap();
                order.push("close");
            } else {
                opening.on_timer(handle, None, &mut timers).unwrap();
                order.push("open");
            }
        }
        // Guard-band timer at 88 µs, then the close, then the open.
        assert_eq!(order, vec!["close", "close", "open"]);
    }

    #[test]
    fn reinitialize_is_idempotent() {
        let cfg = GateConfig { initial_offset: 30 * US, ..scenario_config() };
        let mut gate = PeriodicGate::new(&cfg).unwrap();
        let mut timers = EventScheduler::new();
        gate.initialize(None, &mut timers);
        let first = (gate.phase_timer().unwrap().at, gate.guard_band_timer().unwrap().at);
        let signals = gate.initialize(None, &mut timers);
        let second = (gate.phase_timer().unwrap().at, gate.guard_band_timer().unwrap().at);
        assert!(signals.is_empty());
        assert_eq!(first, second);
        assert_eq!(first, (Tick(70 * US), Tick(58 * US)));
        assert_eq!(timers.queue().count(TimerTarget::GatePhase), 1);
        assert_eq!(timers.queue().count(TimerTarget::GuardBandActivation), 1);
    }

    #[test]
    fn reconfigure_cancels_old_generation() {
        let (mut gate, mut timers, _) = started(&scenario_config());
        let old_phase = gate.phase_timer().unwrap();
        let old_guard = gate.guard_band_timer().unwrap();

        let signals = gate
            .reconfigure(vec![20 * US, 80 * US], 0, false, None, &mut timers)
            .unwrap();
        assert_eq!(
            signals,
            vec![
                GateSignal::GateStateChanged(false),
                GateSignal::TransmissionAllowedChanged(false),
            ]
        );
        assert!(!timers.is_scheduled(old_phase));
        assert!(!timers.is_scheduled(old_guard));
        assert_eq!(timers.queue().len(), 1);
        assert_eq!(gate.durations(), &[20 * US, 80 * US]);
        assert!(!gate.initially_open());

        // A stale handle from the old generation is rejected.
        let err = gate.on_timer(old_phase, None, &mut timers).unwrap_err();
        assert!(matches!(err, GateError::UnknownTimer { .. }));
    }

    #[test]
    fn failed_reconfigure_keeps_running_schedule() {
        let (mut gate, mut timers, _) = started(&scenario_config());
        let phase = gate.phase_timer().unwrap();
        let err = gate
            .reconfigure(vec![10, 0], 0, true, None, &mut timers)
            .unwrap_err();
        assert!(err.is_configuration());
        assert_eq!(gate.phase_timer(), Some(phase));
        assert!(timers.is_scheduled(phase));
        assert_eq!(gate.durations().len(), 4);
    }

    #[test]
    fn foreign_timer_is_rejected() {
        let (mut gate, mut timers, _) = started(&scenario_config());
        let foreign = timers.schedule_after(5, 0, TimerTarget::StreamEnd);
        let err = gate.on_timer(foreign, None, &mut timers).unwrap_err();
        assert!(matches!(err, GateError::UnknownTimer { handle } if handle == foreign));
    }

    #[test]
    fn accessors_reflect_configuration() {
        let cfg = GateConfig { initial_offset: 7, ..scenario_config() };
        let gate = PeriodicGate::new(&cfg).unwrap();
        assert_eq!(gate.initial_offset(), 7);
        assert!(gate.initially_open());
        assert_eq!(gate.policy(), GuardBandPolicy::WorstCase);
        assert_eq!(gate.schedule().total_duration(), 300 * US);
        // Not yet initialized.
        assert!(!gate.is_open());
        assert!(gate.phase_timer().is_none());
    }
}
