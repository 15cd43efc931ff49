//! Unit tests for pax-stop.

use pax_agent::{AgentState, AgentStore, QueueChain, SeatPool};
use pax_core::{AgentConfig, AgentId, GateConfig, GateId, Pose, Range, SeatId, SimConfig, StopConfig, Vec3};
use pax_gate::{Gate, GateEvent, HoldOwner};
use pax_world::{KinematicWorld, Navigator, World};

use crate::{
    AlightFlow, BoardFlow, CloseDoorTask, CloseOutcome, ENTRY_GATE, EXIT_GATE, FlowStatus, NoopObserver, Phase,
    RecycleTask, StopCtx, StopLayout, StopObserver, StopReport, StopScheduler, StopSchedulerBuilder, board_target,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

const DT: f64 = 0.05;

/// Everything a task needs, owned locally so flows can be driven without a
/// scheduler.  Doors are kept outside so they can be borrowed alongside.
struct Rig {
    config:       StopConfig,
    agent_config: AgentConfig,
    world:        KinematicWorld,
    agents:       AgentStore,
    seats:        SeatPool,
    queue:        QueueChain,
    inside:       Vec<AgentId>,
    recycling:    Vec<RecycleTask>,
    report:       StopReport,
    exit_point:   Vec3,
    now:          f64,
}

impl Rig {
    /// City-bus geometry in an unbounded world.  Returns `(rig, entry, exit)`.
    fn new(config: StopConfig) -> (Rig, Gate, Gate) {
        let layout = StopLayout::city_bus();
        let entry = Gate::new(ENTRY_GATE, layout.entry.frame, layout.entry.slots, layout.entry.config).unwrap();
        let exit = Gate::new(EXIT_GATE, layout.exit.frame, layout.exit.slots, layout.exit.config).unwrap();
        let rig = Rig {
            config,
            agent_config: AgentConfig::default(),
            world: KinematicWorld::new(),
            agents: AgentStore::new(),
            seats: SeatPool::new(layout.seats),
            queue: QueueChain::new(layout.queue_anchor),
            inside: Vec::new(),
            recycling: Vec::new(),
            report: StopReport::default(),
            exit_point: layout.exit_point,
            now: 0.0,
        };
        (rig, entry, exit)
    }

    fn ctx(&mut self) -> StopCtx<'_, KinematicWorld> {
        StopCtx {
            now:          self.now,
            config:       &self.config,
            agent_config: &self.agent_config,
            world:        &mut self.world,
            agents:       &mut self.agents,
            seats:        &mut self.seats,
            queue:        &mut self.queue,
            inside:       &mut self.inside,
            recycling:    &mut self.recycling,
            report:       &mut self.report,
            exit_point:   self.exit_point,
        }
    }

    fn tick(&mut self) {
        self.world.advance(DT as f32);
        self.now += DT;
    }

    /// Line `n` passengers up behind the queue anchor.
    fn enqueue(&mut self, n: usize) -> Vec<AgentId> {
        (0..n)
            .map(|_| {
                let id = self.agents.spawn();
                let at = self.queue.back_of_line(self.queue.len(), 0.6);
                self.world.place(id, at);
                self.queue.push_back(id, &mut self.agents, &mut self.world);
                id
            })
            .collect()
    }

    /// A passenger sitting in `seat`, walked through the legal path.
    fn rider(&mut self, seat: u32) -> AgentId {
        let seat = SeatId(seat);
        let id = self.agents.spawn();
        let pos = self.seats.slot(seat).unwrap().pose.position;
        self.world.place(id, pos);
        assert!(self.seats.try_reserve(seat, id));
        let anchor = self.queue.anchor();
        let a = self.agents.get_mut(id).unwrap();
        a.begin_queue(anchor, &mut self.world).unwrap();
        a.begin_board(ENTRY_GATE, &mut self.world).unwrap();
        a.begin_ride(Some(seat), pos, &mut self.world).unwrap();
        self.world.stop(id);
        self.inside.push(id);
        id
    }

    /// Select a rider to alight and send it toward `exit`.
    fn mark_alighting(&mut self, id: AgentId, exit: &Gate) {
        let a = self.agents.get_mut(id).unwrap();
        a.will_alight_here = true;
        a.begin_prepare_alight(exit.id(), exit.inner_wait_point(), &mut self.seats, &mut self.world)
            .unwrap();
    }
}

/// Poll `flow` once per tick until done or `max_ticks` pass.  Returns whether
/// it finished.
fn drive_alight(rig: &mut Rig, flow: &mut AlightFlow, exit: &mut Gate, max_ticks: usize) -> bool {
    for _ in 0..max_ticks {
        if flow.poll(&mut rig.ctx(), exit).is_done() {
            return true;
        }
        rig.tick();
    }
    false
}

fn drive_board(rig: &mut Rig, flow: &mut BoardFlow, entry: &mut Gate, max_ticks: usize) -> bool {
    for _ in 0..max_ticks {
        if flow.poll(&mut rig.ctx(), entry).is_done() {
            return true;
        }
        rig.tick();
    }
    false
}

/// A lone doorway at the origin facing +z, two slots.
fn doorway() -> Gate {
    Gate::new(
        EXIT_GATE,
        Pose::new(Vec3::ZERO, Vec3::FORWARD),
        vec![Vec3::ZERO, Vec3::new(0.0, 0.0, 0.3)],
        GateConfig::default(),
    )
    .unwrap()
}

fn bus(sim: SimConfig, config: StopConfig) -> StopScheduler<KinematicWorld> {
    let world = KinematicWorld::new().with_areas(StopLayout::city_bus_areas());
    StopSchedulerBuilder::new(sim, StopLayout::city_bus(), world)
        .stop_config(config)
        .build()
        .unwrap()
}

#[derive(Default)]
struct Recorder {
    phases:  Vec<(u32, Phase)>,
    reports: Vec<StopReport>,
    events:  Vec<(GateId, GateEvent)>,
    removed: Vec<AgentId>,
    ticks:   u64,
}

impl StopObserver for Recorder {
    fn on_tick(&mut self, _tick: pax_core::Tick, _phase: Phase) {
        self.ticks += 1;
    }

    fn on_phase(&mut self, stop_index: u32, phase: Phase) {
        self.phases.push((stop_index, phase));
    }

    fn on_agent_removed(&mut self, agent: AgentId) {
        self.removed.push(agent);
    }

    fn on_gate_event(&mut self, gate: GateId, event: GateEvent) {
        self.events.push((gate, event));
    }

    fn on_stop_complete(&mut self, report: &StopReport) {
        self.reports.push(report.clone());
    }
}

// ── Board target ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod target {
    use super::*;

    #[test]
    fn bounded_by_wish_capacity_and_queue() {
        assert_eq!(board_target(5, 40, 0, 3), 3);
        assert_eq!(board_target(5, 40, 38, 10), 2);
        assert_eq!(board_target(2, 40, 0, 10), 2);
        assert_eq!(board_target(0, 40, 0, 10), 0);
    }

    #[test]
    fn overfull_vehicle_gives_zero() {
        assert_eq!(board_target(5, 10, 12, 10), 0);
    }

    proptest::proptest! {
        #[test]
        fn never_exceeds_any_bound(wish in 0u32..50, capacity in 0u32..50, inside in 0usize..60, queued in 0usize..60) {
            let t = board_target(wish, capacity, inside, queued);
            proptest::prop_assert!(t <= wish);
            proptest::prop_assert!(t as usize <= queued);
            proptest::prop_assert!(inside + t as usize <= (capacity as usize).max(inside));
        }
    }
}

// ── AlightFlow ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod alight {
    use super::*;

    #[test]
    fn alighters_walk_out_and_are_handed_to_recycling() {
        let (mut rig, _entry, mut exit) = Rig::new(StopConfig::default());
        let stay = rig.rider(0);
        let a = rig.rider(12);
        let b = rig.rider(13);
        rig.mark_alighting(a, &exit);
        rig.mark_alighting(b, &exit);

        let mut flow = AlightFlow::start(&mut rig.ctx(), &mut exit);
        assert_eq!(flow.selected(), &[a, b]);
        assert_eq!(rig.report.alight_selected, 2);
        assert!(exit.is_open());

        assert!(drive_alight(&mut rig, &mut flow, &mut exit, 400));
        assert_eq!(flow.completed(), 2);
        assert_eq!(rig.report.alight_completed, 2);
        assert_eq!(rig.report.alight_abandoned, 0);
        assert_eq!(rig.inside, vec![stay]);
        assert_eq!(rig.recycling.len(), 2);
        assert_eq!(exit.occupant_count(), 0);
        assert!(!exit.admit_enabled());
        for id in [a, b] {
            assert_eq!(rig.agents.get(id).unwrap().state(), AgentState::Alighting);
        }
        assert!(!rig.seats.slot(SeatId(12)).unwrap().is_reserved());
        assert!(rig.seats.is_consistent_with(&rig.agents));
    }

    #[test]
    fn window_bounds_a_slow_crowd() {
        let config = StopConfig { alight_window_secs: 6.0, ..StopConfig::default() };
        let (mut rig, _entry, mut exit) = Rig::new(config);
        let riders: Vec<AgentId> = (0..10).map(|s| rig.rider(s)).collect();
        for &id in &riders {
            rig.mark_alighting(id, &exit);
            rig.world.set_speed(id, 0.2);
        }

        let mut flow = AlightFlow::start(&mut rig.ctx(), &mut exit);
        let deadline = flow.deadline();
        assert!((deadline - 6.0).abs() < 1e-9);

        assert!(drive_alight(&mut rig, &mut flow, &mut exit, 1000));
        let bound = deadline + rig.config.transit_grace_secs as f64 + rig.config.gate_interval_secs as f64 + DT;
        assert!(rig.now <= bound, "finished at {} (bound {bound})", rig.now);

        let completed = flow.completed();
        assert!(completed < 10);
        assert!(rig.report.alight_abandoned > 0);
        assert_eq!(rig.report.alight_abandoned, 10 - completed);
        assert!(!exit.admit_enabled());

        // Leftovers stay on board, still heading out.
        assert_eq!(rig.inside.len(), (10 - completed) as usize);
        for id in &rig.inside {
            let a = rig.agents.get(*id).unwrap();
            assert_eq!(a.state(), AgentState::PrepareAlight);
            assert!(a.will_alight_here);
        }
    }

    #[test]
    fn leftovers_are_selected_again_next_window() {
        let config = StopConfig { alight_window_secs: 0.5, min_window_secs: 0.5, ..StopConfig::default() };
        let (mut rig, _entry, mut exit) = Rig::new(config);
        let far = rig.rider(0);
        rig.mark_alighting(far, &exit);
        rig.world.set_speed(far, 0.0);

        let mut flow = AlightFlow::start(&mut rig.ctx(), &mut exit);
        assert!(drive_alight(&mut rig, &mut flow, &mut exit, 400));
        assert_eq!(rig.report.alight_abandoned, 1);

        let next = AlightFlow::start(&mut rig.ctx(), &mut exit);
        assert_eq!(next.selected(), &[far]);
    }

    #[test]
    fn nobody_selected_finishes_at_once() {
        let (mut rig, _entry, mut exit) = Rig::new(StopConfig::default());
        rig.rider(0);
        let mut flow = AlightFlow::start(&mut rig.ctx(), &mut exit);
        assert_eq!(flow.poll(&mut rig.ctx(), &mut exit), FlowStatus::Done);
        assert!(flow.is_done());
        assert_eq!(flow.poll(&mut rig.ctx(), &mut exit), FlowStatus::Done);
    }

    #[test]
    fn removed_alighter_is_skipped() {
        let (mut rig, _entry, mut exit) = Rig::new(StopConfig::default());
        let a = rig.rider(12);
        rig.mark_alighting(a, &exit);
        let mut flow = AlightFlow::start(&mut rig.ctx(), &mut exit);
        rig.ctx().retire(a);

        assert!(drive_alight(&mut rig, &mut flow, &mut exit, 10));
        assert_eq!(flow.completed(), 0);
        assert!(rig.inside.is_empty());
    }
}

// ── BoardFlow ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod board {
    use super::*;

    #[test]
    fn boards_the_head_of_the_line_up_to_the_target() {
        let (mut rig, mut entry, _exit) = Rig::new(StopConfig::default());
        let line = rig.enqueue(3);

        let mut flow = BoardFlow::start(2, &mut rig.ctx(), &mut entry);
        assert_eq!(flow.target(), 2);
        assert_eq!(rig.report.board_target, 2);

        assert!(drive_board(&mut rig, &mut flow, &mut entry, 400));
        assert_eq!(flow.boarded(), 2);
        assert_eq!(rig.report.board_completed, 2);
        assert_eq!(rig.inside, vec![line[0], line[1]]);
        assert_eq!(rig.queue.as_slice(), &[line[2]]);
        assert!(rig.queue.is_intact(&rig.agents));
        for id in &rig.inside {
            let a = rig.agents.get(*id).unwrap();
            assert_eq!(a.state(), AgentState::Riding);
            assert!(a.seat().is_some());
        }
        assert_eq!(rig.seats.free_count(), rig.seats.len() - 2);
        assert!(rig.seats.is_consistent_with(&rig.agents));
        assert_eq!(entry.occupant_count(), 0);
        assert!(!entry.admit_enabled());
    }

    #[test]
    fn full_vehicle_boards_nobody() {
        let config = StopConfig { capacity: 1, ..StopConfig::default() };
        let (mut rig, mut entry, _exit) = Rig::new(config);
        rig.rider(0);
        rig.enqueue(2);

        let mut flow = BoardFlow::start(5, &mut rig.ctx(), &mut entry);
        assert_eq!(flow.target(), 0);
        assert_eq!(flow.poll(&mut rig.ctx(), &mut entry), FlowStatus::Done);
        assert_eq!(rig.queue.len(), 2);
        assert!(!entry.admit_enabled());
    }

    #[test]
    fn no_free_seat_means_standing() {
        let (mut rig, mut entry, _exit) = Rig::new(StopConfig::default());
        for s in 0..rig.seats.len() as u32 {
            rig.rider(s);
        }
        let line = rig.enqueue(1);

        let mut flow = BoardFlow::start(1, &mut rig.ctx(), &mut entry);
        assert!(drive_board(&mut rig, &mut flow, &mut entry, 400));
        assert_eq!(flow.boarded(), 1);
        let a = rig.agents.get(line[0]).unwrap();
        assert_eq!(a.state(), AgentState::Riding);
        assert_eq!(a.seat(), None);
        assert_eq!(rig.world.body(line[0]).unwrap().target, Some(entry.standing_point()));
    }

    #[test]
    fn unadmitted_boarder_returns_to_the_head() {
        let config = StopConfig { board_window_secs: 1.0, ..StopConfig::default() };
        let (mut rig, mut entry, _exit) = Rig::new(config);
        // Solid bodies standing on both slots.
        for &slot in entry.slots() {
            let blocker = rig.agents.spawn();
            rig.world.place(blocker, slot);
        }
        let line = rig.enqueue(2);

        let mut flow = BoardFlow::start(2, &mut rig.ctx(), &mut entry);
        assert!(drive_board(&mut rig, &mut flow, &mut entry, 400));

        assert_eq!(flow.boarded(), 0);
        assert_eq!(rig.report.board_abandoned, 1);
        assert_eq!(rig.queue.head(), Some(line[0]));
        assert_eq!(rig.queue.len(), 2);
        assert_eq!(rig.agents.get(line[0]).unwrap().state(), AgentState::QueueOutside);
        assert!(rig.queue.is_intact(&rig.agents));
        assert!(!entry.admit_enabled());
    }
}

// ── CloseDoorTask ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod close {
    use super::*;

    fn run(task: &mut CloseDoorTask, gate: &mut Gate, world: &mut KinematicWorld, max_ticks: usize) -> f64 {
        let mut now = 0.0;
        for _ in 0..max_ticks {
            if task.poll(now, gate, world).is_done() {
                return now;
            }
            world.advance(DT as f32);
            now += DT;
        }
        panic!("close task did not finish");
    }

    #[test]
    fn clear_doorway_closes_normally() {
        let mut gate = doorway();
        let mut world = KinematicWorld::new();
        gate.hold_open(HoldOwner::StopCycle);

        let mut task = CloseDoorTask::new(HoldOwner::StopCycle, 0.0, 2.0);
        let at = run(&mut task, &mut gate, &mut world, 100);
        assert_eq!(task.outcome(), Some(CloseOutcome::Closed));
        assert!(at < 2.0);
        assert!(!gate.is_open());
        assert!(!gate.is_held());
        assert!(gate.is_passage_blocked());
    }

    #[test]
    fn frozen_straggler_forces_the_door() {
        let mut gate = doorway();
        let mut world = KinematicWorld::new();
        let stuck = AgentId(0);
        world.place(stuck, Vec3::ZERO);
        world.set_speed(stuck, 0.0);
        gate.hold_open(HoldOwner::StopCycle);
        gate.take_events();

        let mut task = CloseDoorTask::new(HoldOwner::StopCycle, 0.0, 2.0);
        let at = run(&mut task, &mut gate, &mut world, 100);
        assert_eq!(task.outcome(), Some(CloseOutcome::Forced));
        assert!(at >= 2.0 && at <= 2.0 + DT + 1e-9);
        assert!(!gate.is_open());
        assert_eq!(gate.holder_count(), 0);
        assert_eq!(gate.take_events(), vec![GateEvent::ForceClosed]);
    }

    #[test]
    fn straggler_is_nudged_clear() {
        let mut gate = doorway();
        let mut world = KinematicWorld::new();
        let late = AgentId(0);
        world.place(late, Vec3::new(0.0, 0.0, 0.3));
        gate.hold_open(HoldOwner::StopCycle);

        let mut task = CloseDoorTask::new(HoldOwner::StopCycle, 0.0, 2.0);
        run(&mut task, &mut gate, &mut world, 100);
        assert_eq!(task.outcome(), Some(CloseOutcome::Closed));
        let z = world.position(late).unwrap().z;
        assert!(z > 0.42, "pushed inward, z = {z}");
    }

    #[test]
    fn other_holder_keeps_it_open() {
        let mut gate = doorway();
        let mut world = KinematicWorld::new();
        gate.hold_open(HoldOwner::StopCycle);
        gate.hold_open(HoldOwner::External(7));

        let mut task = CloseDoorTask::new(HoldOwner::StopCycle, 0.0, 2.0);
        run(&mut task, &mut gate, &mut world, 100);
        assert_eq!(task.outcome(), Some(CloseOutcome::StillHeld));
        assert!(gate.is_open());
        assert!(gate.is_held_by(HoldOwner::External(7)));
        assert!(!gate.is_held_by(HoldOwner::StopCycle));
    }
}

// ── RecycleTask ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod recycle {
    use super::*;

    #[test]
    fn arrival_at_the_exit_point_retires() {
        let (mut rig, _entry, _exit) = Rig::new(StopConfig::default());
        let id = rig.agents.spawn();
        rig.world.place(id, rig.exit_point + Vec3::new(0.3, 0.0, 0.0));

        let mut task = RecycleTask::new(id, rig.now);
        assert_eq!(task.poll(&mut rig.ctx()), FlowStatus::Done);
        assert!(!rig.agents.contains(id));
        assert!(rig.world.body(id).is_none());
    }

    #[test]
    fn walker_is_retired_once_close() {
        let (mut rig, _entry, _exit) = Rig::new(StopConfig::default());
        let id = rig.agents.spawn();
        rig.world.place(id, rig.exit_point + Vec3::new(-2.0, 0.0, 0.0));
        rig.world.move_to(id, rig.exit_point).unwrap();

        let mut task = RecycleTask::new(id, rig.now);
        let mut done = false;
        for _ in 0..100 {
            if task.poll(&mut rig.ctx()).is_done() {
                done = true;
                break;
            }
            rig.tick();
        }
        assert!(done);
        assert!(!rig.agents.contains(id));
    }

    #[test]
    fn timeout_retires_a_stuck_walker() {
        let (mut rig, _entry, _exit) = Rig::new(StopConfig::default());
        let id = rig.agents.spawn();
        rig.world.place(id, rig.exit_point + Vec3::new(-20.0, 0.0, 0.0));
        rig.world.set_speed(id, 0.0);

        let mut task = RecycleTask::new(id, 0.0);
        assert_eq!(task.poll(&mut rig.ctx()), FlowStatus::Running);
        rig.now = rig.config.recycle_timeout_secs as f64;
        assert_eq!(task.poll(&mut rig.ctx()), FlowStatus::Done);
        assert!(!rig.agents.contains(id));
    }

    #[test]
    fn missing_passenger_is_done() {
        let (mut rig, _entry, _exit) = Rig::new(StopConfig::default());
        let mut task = RecycleTask::new(AgentId(99), 0.0);
        assert_eq!(task.poll(&mut rig.ctx()), FlowStatus::Done);
    }
}

// ── Layout & builder ──────────────────────────────────────────────────────────

#[cfg(test)]
mod layout {
    use super::*;
    use crate::{DoorLayout, StopError};

    #[test]
    fn city_bus_is_valid() {
        let layout = StopLayout::default();
        assert!(layout.validate().is_ok());
        assert_eq!(layout.seats.len(), 16);
        assert_eq!(layout.entry.slots.len(), 2);
    }

    #[test]
    fn non_finite_coordinates_are_rejected() {
        let mut layout = StopLayout::city_bus();
        layout.exit_point = Vec3::new(f32::NAN, 0.0, 0.0);
        assert!(matches!(layout.validate(), Err(StopError::Layout(_))));
    }

    #[test]
    fn coinciding_doors_are_rejected() {
        let mut layout = StopLayout::city_bus();
        layout.exit = DoorLayout::at(layout.entry.frame.position, Vec3::FORWARD);
        assert!(matches!(layout.validate(), Err(StopError::Layout(_))));
    }

    #[test]
    fn builder_rejects_bad_config() {
        let config = StopConfig { alight_probability: 1.5, ..StopConfig::default() };
        let built = StopSchedulerBuilder::new(SimConfig::default(), StopLayout::city_bus(), KinematicWorld::new())
            .stop_config(config)
            .build();
        assert!(matches!(built, Err(StopError::Config(_))));
    }

    #[test]
    fn builder_rejects_unbounded_cruise() {
        for cruise in [Range::new(3.0, f32::INFINITY), Range::new(f32::NAN, 7.0)] {
            let config = StopConfig { cruise_secs: cruise, ..StopConfig::default() };
            let built = StopSchedulerBuilder::new(SimConfig::default(), StopLayout::city_bus(), KinematicWorld::new())
                .stop_config(config)
                .build();
            assert!(matches!(built, Err(StopError::Config(_))));
        }
    }

    #[test]
    fn non_finite_cruise_is_never_staged() {
        let mut stop = bus(SimConfig::default(), StopConfig::default());
        let config = StopConfig { cruise_secs: Range::new(3.0, f32::INFINITY), ..StopConfig::default() };
        assert!(matches!(stop.set_config(config), Err(StopError::Config(_))));
        assert_eq!(stop.run_stops(2, &mut NoopObserver), 2);
    }

    #[test]
    fn builder_rejects_zero_throughput_door() {
        let mut layout = StopLayout::city_bus();
        layout.entry.config.throughput = 0;
        let built = StopSchedulerBuilder::new(SimConfig::default(), layout, KinematicWorld::new()).build();
        assert!(matches!(built, Err(StopError::Gate(_))));
    }

    #[test]
    fn builder_places_the_initial_queue() {
        let config = StopConfig { initial_queue: 4, ..StopConfig::default() };
        let stop = bus(SimConfig::default(), config);
        assert_eq!(stop.queue().len(), 4);
        assert_eq!(stop.agents().len(), 4);
        assert!(stop.queue().is_intact(stop.agents()));
        assert_eq!(stop.phase(), Phase::Cruising);
        assert_eq!(stop.stop_index(), 0);
        assert!(!stop.entry_gate().is_open());
        assert!(!stop.exit_gate().is_open());
    }
}

// ── Scheduler ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod scheduler {
    use super::*;
    use crate::StopError;

    fn advance_to_first_stop(stop: &mut StopScheduler<KinematicWorld>) {
        for _ in 0..1000 {
            if stop.stop_index() > 0 {
                return;
            }
            stop.step(&mut NoopObserver);
        }
        panic!("never arrived");
    }

    #[test]
    fn phases_run_in_order() {
        let mut stop = bus(SimConfig::default(), StopConfig::default());
        let mut rec = Recorder::default();
        assert_eq!(stop.run_stops(1, &mut rec), 1);

        let first: Vec<Phase> = rec.phases.iter().filter(|(i, _)| *i == 1).map(|&(_, p)| p).collect();
        assert_eq!(
            first,
            vec![
                Phase::Arrival,
                Phase::Flows,
                Phase::Settling,
                Phase::ClosingExit,
                Phase::ClosingEntry,
                Phase::Cruising,
            ]
        );
        assert_eq!(stop.phase(), Phase::Cruising);
        assert_eq!(rec.reports.len(), 1);
        assert_eq!(rec.reports[0], stop.reports()[0]);
        assert_eq!(rec.ticks, stop.clock().current_tick.0);
    }

    #[test]
    fn both_doors_open_and_close_each_stop() {
        let mut stop = bus(SimConfig::default(), StopConfig::default());
        let mut rec = Recorder::default();
        stop.run_stops(2, &mut rec);

        for gate in [ENTRY_GATE, EXIT_GATE] {
            let opened = rec.events.iter().filter(|&&(g, e)| g == gate && e == GateEvent::Opened).count();
            let shut = rec
                .events
                .iter()
                .filter(|&&(g, e)| g == gate && matches!(e, GateEvent::Closed | GateEvent::ForceClosed))
                .count();
            assert_eq!(opened, 2, "{gate}");
            assert_eq!(shut, 2, "{gate}");
        }
        assert!(!stop.entry_gate().is_open());
        assert!(!stop.exit_gate().is_open());
        assert!(!stop.entry_gate().is_held());
        assert!(!stop.exit_gate().is_held());
    }

    #[test]
    fn reports_stay_consistent_over_many_stops() {
        let config = StopConfig { alight_probability: 0.5, ..StopConfig::default() };
        let mut stop = bus(SimConfig::default(), config);
        assert_eq!(stop.run_stops(5, &mut NoopObserver), 5);

        for r in stop.reports() {
            assert!(r.board_completed <= r.board_target, "{r:?}");
            assert_eq!(r.alight_completed + r.alight_abandoned, r.alight_selected, "{r:?}");
            assert!(r.departed_at >= r.arrived_at);
            assert!(r.inside_count <= stop.config().capacity);
        }
        let indices: Vec<u32> = stop.reports().iter().map(|r| r.stop_index).collect();
        assert_eq!(indices, vec![1, 2, 3, 4, 5]);

        assert!(stop.seats().is_consistent_with(stop.agents()));
        assert!(stop.queue().is_intact(stop.agents()));
        for &id in stop.inside() {
            assert!(stop.agents().get(id).unwrap().state().is_inside());
        }
    }

    #[test]
    fn everyone_on_board_alights_next_stop() {
        let config = StopConfig { alight_probability: 1.0, ..StopConfig::default() };
        let mut stop = bus(SimConfig::default(), config);
        stop.run_stops(2, &mut NoopObserver);
        let r = stop.reports();
        assert_eq!(r[0].alight_selected, 0);
        assert_eq!(r[1].alight_selected, r[0].inside_count);
    }

    #[test]
    fn capacity_caps_the_board_target() {
        let config = StopConfig {
            capacity: 2,
            initial_queue: 6,
            board_per_stop: pax_core::Range::new(5, 5),
            alight_probability: 0.0,
            ..StopConfig::default()
        };
        let mut stop = bus(SimConfig::default(), config);
        stop.run_stops(3, &mut NoopObserver);
        assert_eq!(stop.reports()[0].board_target, 2);
        assert!(stop.inside().len() <= 2);
        assert!(stop.reports().iter().all(|r| r.inside_count <= 2));
    }

    #[test]
    fn recycled_passengers_are_gone() {
        let config = StopConfig { alight_probability: 1.0, ..StopConfig::default() };
        let mut stop = bus(SimConfig::default(), config);
        let mut rec = Recorder::default();
        stop.run_stops(4, &mut rec);
        for id in &rec.removed {
            assert!(!stop.agents().contains(*id));
            assert!(stop.world().body(*id).is_none());
        }
    }

    #[test]
    fn same_seed_same_run() {
        let sim = SimConfig { seed: 7, ..SimConfig::default() };
        let mut a = bus(sim.clone(), StopConfig::default());
        let mut b = bus(sim, StopConfig::default());
        a.run_stops(3, &mut NoopObserver);
        b.run_stops(3, &mut NoopObserver);
        assert_eq!(a.reports(), b.reports());
        assert_eq!(a.clock().current_tick, b.clock().current_tick);
    }

    #[test]
    fn run_stops_at_end_tick() {
        let sim = SimConfig { total_ticks: 400, ..SimConfig::default() };
        let mut stop = bus(sim, StopConfig::default());
        stop.run(&mut NoopObserver);
        assert_eq!(stop.clock().current_tick.0, 400);
        assert_eq!(stop.run_stops(1, &mut NoopObserver), 0);
    }

    #[test]
    fn removing_a_queued_passenger_relinks_the_line() {
        let config = StopConfig { initial_queue: 3, ..StopConfig::default() };
        let mut stop = bus(SimConfig::default(), config);
        let middle = stop.queue().as_slice()[1];

        stop.remove_agent(middle).unwrap();
        assert!(!stop.queue().contains(middle));
        assert!(!stop.agents().contains(middle));
        assert!(stop.world().body(middle).is_none());
        assert!(stop.queue().is_intact(stop.agents()));

        assert!(matches!(stop.remove_agent(middle), Err(StopError::UnknownAgent(_))));
    }

    #[test]
    fn removing_a_rider_frees_its_seat() {
        let config = StopConfig { alight_probability: 0.0, ..StopConfig::default() };
        let mut stop = bus(SimConfig::default(), config);
        stop.run_stops(1, &mut NoopObserver);
        let Some(&rider) = stop.inside().first() else { return };

        let free = stop.seats().free_count();
        let had_seat = stop.agents().get(rider).unwrap().seat().is_some();
        stop.remove_agent(rider).unwrap();
        assert!(!stop.inside().contains(&rider));
        assert_eq!(stop.seats().free_count(), free + had_seat as usize);
        assert!(stop.seats().is_consistent_with(stop.agents()));
    }

    #[test]
    fn config_change_waits_for_the_next_arrival() {
        let mut stop = bus(SimConfig::default(), StopConfig::default());
        let smaller = StopConfig { capacity: 5, ..StopConfig::default() };
        stop.set_config(smaller).unwrap();
        assert_eq!(stop.config().capacity, 40);

        advance_to_first_stop(&mut stop);
        assert_eq!(stop.config().capacity, 5);
    }

    #[test]
    fn invalid_config_is_refused() {
        let mut stop = bus(SimConfig::default(), StopConfig::default());
        let bad = StopConfig { alight_probability: -0.1, ..StopConfig::default() };
        assert!(matches!(stop.set_config(bad), Err(StopError::Config(_))));
    }

    #[test]
    fn flows_are_visible_while_running() {
        let mut stop = bus(SimConfig::default(), StopConfig::default());
        advance_to_first_stop(&mut stop);
        assert_eq!(stop.phase(), Phase::Flows);
        let (_, board) = stop.flows().unwrap();
        assert_eq!(board.target(), stop.current_report().board_target);
        assert!(stop.entry_gate().is_held_by(HoldOwner::StopCycle));
        assert!(stop.exit_gate().is_held_by(HoldOwner::StopCycle));
    }

    #[test]
    fn phase_names() {
        assert_eq!(Phase::ClosingEntry.to_string(), "closing_entry");
        assert_eq!(Phase::Cruising.as_str(), "cruising");
    }
}
