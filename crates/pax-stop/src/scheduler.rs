//! The `StopScheduler` and its tick loop.

use std::fmt;
use std::mem;

use pax_agent::{AgentState, AgentStore, QueueChain, SeatPool};
use pax_core::{AgentConfig, AgentId, SimClock, SimConfig, SimRng, StopConfig, Vec3};
use pax_gate::{Gate, HoldOwner};
use pax_world::World;

use crate::{
    AlightFlow, BoardFlow, CloseDoorTask, CloseOutcome, RecycleTask, StopCtx, StopError, StopObserver,
    StopReport, StopResult,
};

/// Borrow the scheduler's shared state as a [`StopCtx`], leaving the doors
/// and the stage free for the caller.
macro_rules! ctx {
    ($s:expr, $now:expr) => {
        StopCtx {
            now:          $now,
            config:       &$s.config,
            agent_config: &$s.agent_config,
            world:        &mut $s.world,
            agents:       &mut $s.agents,
            seats:        &mut $s.seats,
            queue:        &mut $s.queue,
            inside:       &mut $s.inside,
            recycling:    &mut $s.recycling,
            report:       &mut $s.report,
            exit_point:   $s.exit_point,
        }
    };
}

// ── Phase ─────────────────────────────────────────────────────────────────────

/// Where the cycle is.  Reported to observers.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Phase {
    /// Doors closed, driving to the next stop.
    Cruising,
    /// Doors opened and held, arrivals spawned, alighters selected.
    Arrival,
    /// Alight and board flows running side by side.
    Flows,
    /// Both flows done; a short pause before closing.
    Settling,
    /// Close-safety routine on the exit door.
    ClosingExit,
    /// Close-safety routine on the entry door.
    ClosingEntry,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Cruising => "cruising",
            Phase::Arrival => "arrival",
            Phase::Flows => "flows",
            Phase::Settling => "settling",
            Phase::ClosingExit => "closing_exit",
            Phase::ClosingEntry => "closing_entry",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Phase plus the tasks running in it.
pub(crate) enum Stage {
    Cruise { until: f64 },
    Flows { alight: AlightFlow, board: BoardFlow },
    Settle { until: f64 },
    CloseExit(CloseDoorTask),
    CloseEntry(CloseDoorTask),
}

impl Stage {
    fn phase(&self) -> Phase {
        match self {
            Stage::Cruise { .. } => Phase::Cruising,
            Stage::Flows { .. } => Phase::Flows,
            Stage::Settle { .. } => Phase::Settling,
            Stage::CloseExit(_) => Phase::ClosingExit,
            Stage::CloseEntry(_) => Phase::ClosingEntry,
        }
    }
}

// ── StopScheduler ─────────────────────────────────────────────────────────────

/// Drives the stop-visit cycle, one tick at a time.
///
/// ```text
///   Cruise ─► Arrival ─► Flows (alight ∥ board) ─► Settle ─► Close exit ─► Close entry ─┐
///     ▲                                                                                 │
///     └────────────────────────────── report ◄──────────────────────────────────────────┘
/// ```
///
/// Every tick, in order:
///
/// 1. **World**: advance body movement by one tick.
/// 2. **Agents**: queue following for the waiting line, parking for riders.
/// 3. **Stage**: poll the current phase and its tasks.
/// 4. **Recycling**: poll alighted passengers walking away.
/// 5. **Signals**: deliver passenger state changes and door events.
///
/// All tasks share one thread and one virtual clock; a run is reproducible
/// from `SimConfig::seed`.
///
/// Create via [`StopSchedulerBuilder`][crate::StopSchedulerBuilder].
pub struct StopScheduler<W: World> {
    pub(crate) sim:   SimConfig,
    pub(crate) clock: SimClock,

    /// Active configuration.  Replaced from `staged` at the next arrival.
    pub(crate) config: StopConfig,
    pub(crate) staged: Option<StopConfig>,

    pub(crate) agent_config: AgentConfig,
    pub(crate) rng:          SimRng,

    pub(crate) world:  W,
    pub(crate) agents: AgentStore,
    pub(crate) seats:  SeatPool,
    pub(crate) queue:  QueueChain,

    /// On board, in boarding order.
    pub(crate) inside: Vec<AgentId>,

    pub(crate) recycling: Vec<RecycleTask>,

    pub(crate) entry: Gate,
    pub(crate) exit:  Gate,

    pub(crate) exit_point: Vec3,

    pub(crate) stage: Stage,

    /// Stops arrived at so far.
    pub(crate) stop_index: u32,

    /// Report for the visit in progress.
    pub(crate) report: StopReport,

    /// Reports for completed visits.
    pub(crate) reports: Vec<StopReport>,
}

impl<W: World> StopScheduler<W> {
    // ── Public API ────────────────────────────────────────────────────────

    /// Run from the current tick to `SimConfig::end_tick()`.
    pub fn run<O: StopObserver + ?Sized>(&mut self, observer: &mut O) {
        while self.clock.current_tick < self.sim.end_tick() {
            self.step(observer);
        }
    }

    /// Run exactly `n` ticks from the current position (ignores `end_tick`).
    pub fn run_ticks<O: StopObserver + ?Sized>(&mut self, n: u64, observer: &mut O) {
        for _ in 0..n {
            self.step(observer);
        }
    }

    /// Run until `n` more stops have been completed or `end_tick` is reached.
    /// Returns how many were completed.
    pub fn run_stops<O: StopObserver + ?Sized>(&mut self, n: u32, observer: &mut O) -> u32 {
        let before = self.reports.len();
        let target = before + n as usize;
        while self.reports.len() < target && self.clock.current_tick < self.sim.end_tick() {
            self.step(observer);
        }
        (self.reports.len() - before) as u32
    }

    /// Advance the cycle by one tick.
    pub fn step<O: StopObserver + ?Sized>(&mut self, observer: &mut O) {
        let tick = self.clock.current_tick;
        let now = self.clock.elapsed_secs();

        self.world.advance(self.clock.dt_secs());
        self.update_agents(now);
        self.poll_stage(now, observer);
        self.poll_recycling(now, observer);
        self.emit_signals(observer);

        observer.on_tick(tick, self.phase());
        self.clock.advance();
    }

    /// Stage a new configuration.  It takes effect at the next arrival.
    pub fn set_config(&mut self, config: StopConfig) -> StopResult<()> {
        config.validate()?;
        self.staged = Some(config);
        Ok(())
    }

    /// Create a passenger at `at` and append it to the queue.
    pub fn spawn_passenger(&mut self, at: Vec3) -> AgentId {
        let id = self.agents.spawn();
        self.world.place(id, at);
        self.queue.push_back(id, &mut self.agents, &mut self.world);
        tracing::debug!(agent = %id, at = %at, "spawned");
        id
    }

    /// Destroy a passenger from outside the cycle and scrub every reference
    /// to it: inside list, queue (re-linked), seat, door slots, recycling.
    /// Tasks holding the id drop it when they next look.
    pub fn remove_agent(&mut self, agent: AgentId) -> StopResult<()> {
        if !self.agents.contains(agent) {
            return Err(StopError::UnknownAgent(agent));
        }
        tracing::warn!(%agent, "passenger removed mid-cycle; scrubbing references");
        self.entry.release_agent(agent);
        self.exit.release_agent(agent);
        self.recycling.retain(|t| t.agent != agent);
        let now = self.clock.elapsed_secs();
        let mut ctx = ctx!(self, now);
        ctx.retire(agent);
        Ok(())
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.stage.phase()
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    pub fn sim_config(&self) -> &SimConfig {
        &self.sim
    }

    pub fn config(&self) -> &StopConfig {
        &self.config
    }

    pub fn agent_config(&self) -> &AgentConfig {
        &self.agent_config
    }

    /// Stops arrived at so far, including one in progress.
    pub fn stop_index(&self) -> u32 {
        self.stop_index
    }

    pub fn reports(&self) -> &[StopReport] {
        &self.reports
    }

    /// Report for the visit in progress (or the last one, while cruising).
    pub fn current_report(&self) -> &StopReport {
        &self.report
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }

    pub fn agents(&self) -> &AgentStore {
        &self.agents
    }

    pub fn seats(&self) -> &SeatPool {
        &self.seats
    }

    pub fn queue(&self) -> &QueueChain {
        &self.queue
    }

    pub fn inside(&self) -> &[AgentId] {
        &self.inside
    }

    pub fn entry_gate(&self) -> &Gate {
        &self.entry
    }

    pub fn exit_gate(&self) -> &Gate {
        &self.exit
    }

    /// Passengers currently walking away to be recycled.
    pub fn recycling_count(&self) -> usize {
        self.recycling.len()
    }

    /// The running flows, while in [`Phase::Flows`].
    pub fn flows(&self) -> Option<(&AlightFlow, &BoardFlow)> {
        match &self.stage {
            Stage::Flows { alight, board } => Some((alight, board)),
            _ => None,
        }
    }

    // ── Per-tick work ─────────────────────────────────────────────────────

    fn update_agents(&mut self, now: f64) {
        for &id in self.queue.as_slice() {
            if let Some(a) = self.agents.get_mut(id) {
                a.update_queue_follow(now, &self.agent_config, &mut self.world);
            }
        }
        for &id in &self.inside {
            if let Some(a) = self.agents.get_mut(id) {
                a.update_riding(&self.agent_config, &self.seats, &mut self.world);
            }
        }
    }

    fn poll_stage<O: StopObserver + ?Sized>(&mut self, now: f64, observer: &mut O) {
        match self.stage {
            Stage::Cruise { until } => {
                if now >= until {
                    self.arrive(now, observer);
                }
            }
            Stage::Flows { .. } => {
                if self.poll_flows(now) {
                    let until = now + self.config.settle_secs as f64;
                    self.enter(Stage::Settle { until }, observer);
                }
            }
            Stage::Settle { until } => {
                if now >= until {
                    let task = CloseDoorTask::new(HoldOwner::StopCycle, now, self.config.close_timeout_secs);
                    self.enter(Stage::CloseExit(task), observer);
                }
            }
            Stage::CloseExit(_) => {
                if let Some(outcome) = self.poll_close(now) {
                    self.record_close(outcome);
                    let task = CloseDoorTask::new(HoldOwner::StopCycle, now, self.config.close_timeout_secs);
                    self.enter(Stage::CloseEntry(task), observer);
                }
            }
            Stage::CloseEntry(_) => {
                if let Some(outcome) = self.poll_close(now) {
                    self.record_close(outcome);
                    self.depart(now, observer);
                }
            }
        }
    }

    /// Poll both flows once.  `true` when both have finished.
    fn poll_flows(&mut self, now: f64) -> bool {
        let Stage::Flows { alight, board } = &mut self.stage else { return false };
        let mut ctx = ctx!(self, now);
        let alight_done = alight.poll(&mut ctx, &mut self.exit).is_done();
        let board_done = board.poll(&mut ctx, &mut self.entry).is_done();
        alight_done && board_done
    }

    fn poll_close(&mut self, now: f64) -> Option<CloseOutcome> {
        let (task, gate) = match &mut self.stage {
            Stage::CloseExit(task) => (task, &mut self.exit),
            Stage::CloseEntry(task) => (task, &mut self.entry),
            _ => return None,
        };
        if task.poll(now, gate, &mut self.world).is_done() { task.outcome() } else { None }
    }

    fn record_close(&mut self, outcome: CloseOutcome) {
        if outcome == CloseOutcome::Forced {
            self.report.forced_closes += 1;
        }
    }

    fn poll_recycling<O: StopObserver + ?Sized>(&mut self, now: f64, observer: &mut O) {
        if self.recycling.is_empty() {
            return;
        }
        let mut tasks = mem::take(&mut self.recycling);
        let mut removed = Vec::new();
        {
            let mut ctx = ctx!(self, now);
            tasks.retain_mut(|task| {
                if task.poll(&mut ctx).is_done() {
                    removed.push(task.agent);
                    false
                } else {
                    true
                }
            });
        }
        tasks.append(&mut self.recycling);
        self.recycling = tasks;
        for agent in removed {
            if !self.agents.contains(agent) {
                observer.on_agent_removed(agent);
            }
        }
    }

    fn emit_signals<O: StopObserver + ?Sized>(&mut self, observer: &mut O) {
        for a in self.agents.iter_mut() {
            if let Some(state) = a.take_state_change() {
                observer.on_agent_state(a.id, state);
            }
        }
        for gate in [&mut self.entry, &mut self.exit] {
            let id = gate.id();
            for event in gate.take_events() {
                observer.on_gate_event(id, event);
            }
        }
    }

    // ── Phase transitions ─────────────────────────────────────────────────

    fn enter<O: StopObserver + ?Sized>(&mut self, stage: Stage, observer: &mut O) {
        self.stage = stage;
        let phase = self.stage.phase();
        tracing::debug!(stop = self.stop_index, %phase, "phase");
        observer.on_phase(self.stop_index, phase);
    }

    /// Open and hold both doors, spawn arrivals, pick alighters, and start
    /// both flows.
    fn arrive<O: StopObserver + ?Sized>(&mut self, now: f64, observer: &mut O) {
        if let Some(config) = self.staged.take() {
            self.config = config;
        }
        self.stop_index += 1;
        self.report = StopReport::new(self.stop_index, now);
        observer.on_phase(self.stop_index, Phase::Arrival);

        for gate in [&mut self.exit, &mut self.entry] {
            gate.hold_open(HoldOwner::StopCycle);
            gate.set_admit_enabled(true);
        }

        self.spawn_arrivals();
        self.select_alighters();
        let wish = self.rng.count_in(self.config.board_per_stop);

        let mut ctx = ctx!(self, now);
        let alight = AlightFlow::start(&mut ctx, &mut self.exit);
        let board = BoardFlow::start(wish, &mut ctx, &mut self.entry);

        tracing::info!(
            stop = self.stop_index,
            spawned = self.report.spawned,
            alighting = self.report.alight_selected,
            boarding = self.report.board_target,
            queued = self.queue.len(),
            inside = self.inside.len(),
            "arrived"
        );
        self.enter(Stage::Flows { alight, board }, observer);
    }

    /// Append a random number of newcomers to the queue, up to the queue
    /// ceiling.
    fn spawn_arrivals(&mut self) {
        let range = self.config.spawn_per_stop;
        if range.max < range.min || range.max == 0 {
            return;
        }
        let mut n = self.rng.count_in(range) as usize;
        let ceiling = self.config.outside_queue_max as usize;
        if ceiling > 0 {
            n = n.min(ceiling.saturating_sub(self.queue.len()));
        }
        let spacing = self.config.spawn_back_spacing;
        for _ in 0..n {
            let at = self.queue.back_of_line(self.queue.len(), spacing);
            self.spawn_passenger(at);
        }
        self.report.spawned = n as u32;
    }

    /// Roll each rider not already selected, then send newly selected riders
    /// toward the exit door.  Passengers left over from an earlier window are
    /// already on their way.
    fn select_alighters(&mut self) {
        let agents = &self.agents;
        self.inside.retain(|&a| agents.contains(a));

        let p = self.config.alight_probability;
        let door = self.exit.id();
        let wait = self.exit.inner_wait_point();
        for &id in &self.inside {
            let Some(a) = self.agents.get_mut(id) else { continue };
            if !a.will_alight_here {
                a.will_alight_here = self.rng.gen_bool(p);
            }
            if a.will_alight_here && a.state() == AgentState::Riding {
                if let Err(e) = a.begin_prepare_alight(door, wait, &mut self.seats, &mut self.world) {
                    tracing::warn!(error = %e, "prepare-alight transition refused");
                }
            }
        }
    }

    /// Close out the report and start cruising to the next stop.
    fn depart<O: StopObserver + ?Sized>(&mut self, now: f64, observer: &mut O) {
        self.report.departed_at = now;
        self.report.queue_len = self.queue.len() as u32;
        self.report.inside_count = self.inside.len() as u32;

        let r = &self.report;
        tracing::info!(
            stop = r.stop_index,
            alighted = r.alight_completed,
            alight_abandoned = r.alight_abandoned,
            boarded = r.board_completed,
            board_target = r.board_target,
            forced_closes = r.forced_closes,
            dwell_secs = r.dwell_secs(),
            "departed"
        );
        observer.on_stop_complete(&self.report);
        self.reports.push(self.report.clone());

        let cruise = self.rng.secs_in(self.config.cruise_secs) as f64;
        self.enter(Stage::Cruise { until: now + cruise }, observer);
    }
}

impl fmt::Debug for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.phase().as_str())
    }
}

