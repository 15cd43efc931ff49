//! Stop-cycle, doorway and passenger tuning parameters.
//!
//! All values are plain numbers read once per stop cycle.  Defaults mirror a
//! small city bus with one boarding door and one alighting door.  With the
//! `serde` feature every struct is loadable from JSON/TOML, and missing
//! fields fall back to these defaults.

use crate::{PaxError, PaxResult};

// ── Range ─────────────────────────────────────────────────────────────────────

/// A `[min, max]` bound.  Integer ranges are inclusive; float ranges are
/// half-open when sampled.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Range<T> {
    pub min: T,
    pub max: T,
}

impl<T> Range<T> {
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }
}

// ── StopConfig ────────────────────────────────────────────────────────────────

/// Parameters for one stop visit: capacity, windows, spawn and board counts.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StopConfig {
    /// Maximum passengers inside the vehicle.
    pub capacity: u32,

    /// Pacing delay between consecutive admissions in one flow.
    pub gate_interval_secs: f32,

    /// Random dwell while driving between stops.
    pub cruise_secs: Range<f32>,

    /// Random boarding wish per stop (inclusive).
    pub board_per_stop: Range<u32>,

    /// Random number of new passengers joining the queue per stop (inclusive).
    pub spawn_per_stop: Range<u32>,

    /// Queue length ceiling for spawning.  0 = unbounded.
    pub outside_queue_max: u32,

    /// Spacing between freshly spawned passengers behind the queue anchor.
    pub spawn_back_spacing: f32,

    /// Passengers placed in the queue when the scheduler is built.
    pub initial_queue: u32,

    /// How long new alighters may be admitted.
    pub alight_window_secs: f32,

    /// How long new boarders may be admitted.
    pub board_window_secs: f32,

    /// Floor applied to both windows.
    pub min_window_secs: f32,

    /// Probability that a riding passenger alights at a given stop.
    pub alight_probability: f64,

    /// How long the close-safety routine waits for a doorway to clear before
    /// forcing it shut.
    pub close_timeout_secs: f32,

    /// Pause between the end of both flows and the first door close.
    pub settle_secs: f32,

    /// Extra time an admitted passenger may take to pass through a doorway
    /// after its flow's window has ended.
    pub transit_grace_secs: f32,

    /// An alighted passenger is recycled within this distance of the exit point.
    pub recycle_clear_distance: f32,

    /// Re-issue the walk to the exit point while closer than this.
    pub recycle_nudge_distance: f32,

    /// Recycle an alighted passenger after this long even if it never
    /// reached the exit point.
    pub recycle_timeout_secs: f32,
}

impl Default for StopConfig {
    fn default() -> Self {
        Self {
            capacity:               40,
            gate_interval_secs:     0.25,
            cruise_secs:            Range::new(3.0, 7.0),
            board_per_stop:         Range::new(1, 5),
            spawn_per_stop:         Range::new(0, 5),
            outside_queue_max:      30,
            spawn_back_spacing:     1.0,
            initial_queue:          3,
            alight_window_secs:     6.0,
            board_window_secs:      8.0,
            min_window_secs:        0.5,
            alight_probability:     0.3,
            close_timeout_secs:     2.0,
            settle_secs:            0.1,
            transit_grace_secs:     3.0,
            recycle_clear_distance: 0.4,
            recycle_nudge_distance: 3.0,
            recycle_timeout_secs:   30.0,
        }
    }
}

impl StopConfig {
    /// Effective alight window, floored at `min_window_secs`.
    pub fn alight_window(&self) -> f32 {
        self.alight_window_secs.max(self.min_window_secs)
    }

    /// Effective board window, floored at `min_window_secs`.
    pub fn board_window(&self) -> f32 {
        self.board_window_secs.max(self.min_window_secs)
    }

    pub fn validate(&self) -> PaxResult<()> {
        if !(0.0..=1.0).contains(&self.alight_probability) {
            return Err(PaxError::Config(format!(
                "alight_probability {} outside [0, 1]",
                self.alight_probability
            )));
        }
        non_negative("cruise_secs.min", self.cruise_secs.min)?;
        non_negative("cruise_secs.max", self.cruise_secs.max)?;
        if self.cruise_secs.max < self.cruise_secs.min {
            return Err(PaxError::Config("cruise_secs must satisfy 0 <= min <= max".into()));
        }
        non_negative("gate_interval_secs", self.gate_interval_secs)?;
        non_negative("alight_window_secs", self.alight_window_secs)?;
        non_negative("board_window_secs", self.board_window_secs)?;
        non_negative("min_window_secs", self.min_window_secs)?;
        non_negative("close_timeout_secs", self.close_timeout_secs)?;
        non_negative("settle_secs", self.settle_secs)?;
        non_negative("transit_grace_secs", self.transit_grace_secs)?;
        non_negative("spawn_back_spacing", self.spawn_back_spacing)?;
        positive("recycle_clear_distance", self.recycle_clear_distance)?;
        non_negative("recycle_nudge_distance", self.recycle_nudge_distance)?;
        positive("recycle_timeout_secs", self.recycle_timeout_secs)?;
        Ok(())
    }
}

// ── GateConfig ────────────────────────────────────────────────────────────────

/// Admission and clearance tuning for one doorway.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GateConfig {
    /// Maximum concurrent occupants.  Must be ≥ 1; 1 models a single-file door.
    pub throughput: u32,

    /// Detection radius around each slot.  Too large and passers-by register.
    pub slot_radius: f32,

    /// An occupant farther than this from every slot has finished passing.
    pub pass_clear_distance: f32,

    /// Alighters within this distance of the doorway skip the inside-side test.
    pub admit_near_radius: f32,

    /// Slots must stay empty this long before the doorway counts as clear.
    pub clear_debounce_secs: f32,

    /// Ignore trigger-only (non-solid) bodies when probing slots.
    pub ignore_triggers: bool,

    /// How far the close-safety routine pushes a straggler away from a slot.
    pub nudge_distance: f32,

    /// Nudge probe radius as a multiple of `slot_radius`.
    pub nudge_radius_factor: f32,

    /// Alighters first wait this far inside the doorway.
    pub inner_wait_offset: f32,

    /// ... and count as waiting once within this radius of that point.
    pub inner_wait_radius: f32,

    /// One pace past the slot, used to step clear after admission.
    pub pass_step: f32,

    /// Standing place offset inside the doorway when no seat is free.
    pub standing_offset: f32,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            throughput:          1,
            slot_radius:         0.12,
            pass_clear_distance: 0.4,
            admit_near_radius:   0.7,
            clear_debounce_secs: 0.2,
            ignore_triggers:     true,
            nudge_distance:      0.4,
            nudge_radius_factor: 1.2,
            inner_wait_offset:   0.45,
            inner_wait_radius:   0.35,
            pass_step:           0.7,
            standing_offset:     0.9,
        }
    }
}

impl GateConfig {
    pub fn validate(&self) -> PaxResult<()> {
        if self.throughput == 0 {
            return Err(PaxError::Config("gate throughput must be >= 1".into()));
        }
        positive("slot_radius", self.slot_radius)?;
        positive("pass_clear_distance", self.pass_clear_distance)?;
        non_negative("admit_near_radius", self.admit_near_radius)?;
        non_negative("clear_debounce_secs", self.clear_debounce_secs)?;
        positive("nudge_distance", self.nudge_distance)?;
        positive("nudge_radius_factor", self.nudge_radius_factor)?;
        non_negative("inner_wait_offset", self.inner_wait_offset)?;
        positive("inner_wait_radius", self.inner_wait_radius)?;
        positive("pass_step", self.pass_step)?;
        non_negative("standing_offset", self.standing_offset)?;
        Ok(())
    }
}

// ── AgentConfig ───────────────────────────────────────────────────────────────

/// Per-passenger movement thresholds and queue-following hysteresis.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AgentConfig {
    /// Default "has arrived" distance.
    pub arrive_threshold: f32,

    /// Looser arrival distance used when stepping clear of a slot.
    pub loose_arrive_threshold: f32,

    /// Gap kept behind the passenger ahead in the queue.
    pub follow_distance: f32,

    /// Minimum interval between queue re-paths while not settled.
    pub queue_repath_secs: f32,

    /// Within this distance of the follow anchor the passenger settles.
    pub queue_settle_radius: f32,

    /// A settled passenger wakes when its leader has moved this far.
    pub queue_wake_distance: f32,

    /// ... or when its own offset exceeds the settle radius by this margin.
    pub queue_wake_margin: f32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            arrive_threshold:       0.18,
            loose_arrive_threshold: 0.2,
            follow_distance:        0.6,
            queue_repath_secs:      0.15,
            queue_settle_radius:    0.15,
            queue_wake_distance:    0.28,
            queue_wake_margin:      0.06,
        }
    }
}

impl AgentConfig {
    pub fn validate(&self) -> PaxResult<()> {
        positive("arrive_threshold", self.arrive_threshold)?;
        positive("loose_arrive_threshold", self.loose_arrive_threshold)?;
        non_negative("follow_distance", self.follow_distance)?;
        non_negative("queue_repath_secs", self.queue_repath_secs)?;
        positive("queue_settle_radius", self.queue_settle_radius)?;
        positive("queue_wake_distance", self.queue_wake_distance)?;
        non_negative("queue_wake_margin", self.queue_wake_margin)?;
        Ok(())
    }
}

// ── Validation helpers ────────────────────────────────────────────────────────

fn positive(name: &str, v: f32) -> PaxResult<()> {
    if v > 0.0 && v.is_finite() {
        Ok(())
    } else {
        Err(PaxError::Config(format!("{name} must be > 0 (got {v})")))
    }
}

fn non_negative(name: &str, v: f32) -> PaxResult<()> {
    if v >= 0.0 && v.is_finite() {
        Ok(())
    } else {
        Err(PaxError::Config(format!("{name} must be >= 0 (got {v})")))
    }
}
