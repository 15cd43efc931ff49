//! Per-stop summary.

/// What happened during one stop visit.  Produced when the entry door has
/// closed and handed to [`StopObserver::on_stop_complete`][crate::StopObserver::on_stop_complete].
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StopReport {
    /// 1-based stop counter.
    pub stop_index: u32,

    /// Simulated seconds at arrival and departure.
    pub arrived_at:  f64,
    pub departed_at: f64,

    /// New passengers added to the queue on arrival.
    pub spawned: u32,

    pub alight_selected:  u32,
    pub alight_completed: u32,
    /// Selected but not through the door before the window closed.
    pub alight_abandoned: u32,

    /// `min(wish, capacity left, queue length)` at arrival.
    pub board_target:    u32,
    pub board_completed: u32,
    /// Popped from the queue but not admitted in time; returned to the head.
    pub board_abandoned: u32,

    /// Doors shut by `force_close` this visit.
    pub forced_closes: u32,

    pub queue_len:    u32,
    pub inside_count: u32,
}

impl StopReport {
    pub fn new(stop_index: u32, arrived_at: f64) -> Self {
        Self { stop_index, arrived_at, ..Self::default() }
    }

    /// Seconds from arrival to departure.
    pub fn dwell_secs(&self) -> f64 {
        (self.departed_at - self.arrived_at).max(0.0)
    }
}
