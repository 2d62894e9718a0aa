//! `tas-schedule` — gate control lists, timer queue, and CSV loading.
//!
//! # Crate layout
//!
//! | Module           | Contents                                               |
//! |------------------|--------------------------------------------------------|
//! | [`gate_schedule`]| `GateSchedule`, `PhaseState`                           |
//! | [`timer_queue`]  | `TimerQueue` (`BTreeMap<TimerHandle, TimerTarget>`)    |
//! | [`scheduler`]    | `EventScheduler` — clock + queue, implements `TimerHost` |
//! | [`loader`]       | `load_schedule_csv`, `load_schedule_reader`            |
//! | [`error`]        | `ScheduleError`, `ScheduleResult<T>`                   |
//!
//! # Cycle model (summary)
//!
//! A gate control list is a cyclic list of interval durations.  Intervals
//! alternate between open and closed, starting from `initially_open`.  A
//! starting `offset` into the cycle is resolved into a [`PhaseState`]:
//!
//! ```text
//! offset   = initial_offset % total_duration
//! while offset >= durations[index]:
//!     offset  -= durations[index]
//!     is_open  = !is_open
//!     index    = (index + 1) % len
//! ```

pub mod error;
pub mod gate_schedule;
pub mod loader;
pub mod scheduler;
pub mod timer_queue;


pub use error::{ScheduleError, ScheduleResult};
pub use gate_schedule::{GateSchedule, PhaseState};
pub use loader::{load_schedule_csv, load_schedule_reader};
pub use scheduler::EventScheduler;
pub use timer_queue::TimerQueue;
