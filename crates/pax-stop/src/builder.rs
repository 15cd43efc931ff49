//! Fluent builder for constructing a [`StopScheduler`].

use pax_agent::{AgentStore, QueueChain, SeatPool};
use pax_core::{AgentConfig, GateId, SimConfig, SimRng, StopConfig};
use pax_gate::Gate;
use pax_world::World;

use crate::scheduler::Stage;
use crate::{StopLayout, StopReport, StopResult, StopScheduler};

/// Distance from the queue anchor to the first pre-placed passenger.
const INITIAL_QUEUE_LEAD: f32 = 1.0;
/// Spacing between pre-placed passengers.
const INITIAL_QUEUE_SPACING: f32 = 0.6;

pub const ENTRY_GATE: GateId = GateId(0);
pub const EXIT_GATE: GateId = GateId(1);

/// Fluent builder for [`StopScheduler<W>`].
///
/// # Required inputs
///
/// - [`SimConfig`]: tick duration, run length, seed
/// - [`StopLayout`]: doors, queue anchor, exit point, seats
/// - `W: World`: navigation and proximity (e.g. [`pax_world::KinematicWorld`])
///
/// # Optional inputs (have defaults)
///
/// | Method               | Default                 |
/// |----------------------|-------------------------|
/// | `.stop_config(c)`    | `StopConfig::default()` |
/// | `.agent_config(c)`   | `AgentConfig::default()`|
///
/// # Example
///
/// ```rust,ignore
/// let world = KinematicWorld::new().with_areas(StopLayout::city_bus_areas());
/// let mut stop = StopSchedulerBuilder::new(SimConfig::default(), StopLayout::city_bus(), world)
///     .stop_config(StopConfig { capacity: 20, ..StopConfig::default() })
///     .build()?;
/// stop.run_stops(5, &mut NoopObserver);
/// ```
pub struct StopSchedulerBuilder<W: World> {
    sim:          SimConfig,
    layout:       StopLayout,
    world:        W,
    stop_config:  StopConfig,
    agent_config: AgentConfig,
}

impl<W: World> StopSchedulerBuilder<W> {
    pub fn new(sim: SimConfig, layout: StopLayout, world: W) -> Self {
        Self {
            sim,
            layout,
            world,
            stop_config:  StopConfig::default(),
            agent_config: AgentConfig::default(),
        }
    }

    pub fn stop_config(mut self, config: StopConfig) -> Self {
        self.stop_config = config;
        self
    }

    pub fn agent_config(mut self, config: AgentConfig) -> Self {
        self.agent_config = config;
        self
    }

    /// Validate everything, build both doors, pre-place the initial queue and
    /// start cruising toward the first stop.
    pub fn build(self) -> StopResult<StopScheduler<W>> {
        // ── Validate ──────────────────────────────────────────────────────
        self.sim.validate()?;
        self.stop_config.validate()?;
        self.agent_config.validate()?;
        self.layout.validate()?;

        let StopLayout { entry, exit, queue_anchor, exit_point, seats } = self.layout;
        let entry = Gate::new(ENTRY_GATE, entry.frame, entry.slots, entry.config)?;
        let exit = Gate::new(EXIT_GATE, exit.frame, exit.slots, exit.config)?;

        // ── Assemble ──────────────────────────────────────────────────────
        let mut rng = SimRng::new(self.sim.seed);
        let first_cruise = rng.secs_in(self.stop_config.cruise_secs) as f64;
        let initial_queue = self.stop_config.initial_queue;

        let mut stop = StopScheduler {
            clock:        self.sim.make_clock(),
            sim:          self.sim,
            config:       self.stop_config,
            staged:       None,
            agent_config: self.agent_config,
            rng,
            world:        self.world,
            agents:       AgentStore::new(),
            seats:        SeatPool::new(seats),
            queue:        QueueChain::new(queue_anchor),
            inside:       Vec::new(),
            recycling:    Vec::new(),
            entry,
            exit,
            exit_point,
            stage:        Stage::Cruise { until: first_cruise },
            stop_index:   0,
            report:       StopReport::default(),
            reports:      Vec::new(),
        };

        // ── Initial queue ─────────────────────────────────────────────────
        for i in 0..initial_queue {
            let at = queue_anchor.ahead(-(INITIAL_QUEUE_LEAD + INITIAL_QUEUE_SPACING * i as f32));
            stop.spawn_passenger(at);
        }
        tracing::debug!(queued = initial_queue, "stop scheduler built");

        Ok(stop)
    }
}
