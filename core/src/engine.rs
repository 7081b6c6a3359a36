//! The simulation engine — the heart of the transit simulation.
//!
//! EXECUTION ORDER (fixed, documented, never reordered):
//!   0. Engine: clock advance, `TickStarted`, `DayStarted` on rollover
//!   1. Population subsystem    (midnight growth: citizens and points)
//!   2. Economy subsystem       (midnight settlement: income minus upkeep)
//!   3. Movement subsystem      (every citizen, at most one hop)
//!   4. Satisfaction subsystem  (satisfaction, score, game-over streak)
//!   5. Challenge subsystem     (objective progress from this tick's events)
//!
//! RULES:
//!   - Subsystems execute in registration order, every tick.
//!   - No subsystem calls another subsystem's functions directly.
//!   - All randomness flows through the RngBank.
//!   - All state changes are recorded in the event log.
//!   - Exactly one writer: ticks, timer tasks and player commands all go
//!     through `&mut SimEngine`, one at a time.

use crate::{
    bootstrap::bootstrap_world,
    challenge_subsystem::{completed_events, ChallengeSubsystem},
    clock::{SimClock, SimSpeed},
    command::{CommandOutcome, PlayerCommand, QueuedCommand},
    config::SimConfig,
    economy_subsystem::EconomySubsystem,
    error::{SimError, SimResult},
    event::{EventLogEntry, SimEvent, SpawnReason},
    map::{PointFactory, RandomPointFactory},
    movement_subsystem::{MovementSubsystem, MovementTotals},
    network::{transport_cost, Route, RouteRejection, TransportType},
    population_subsystem::PopulationSubsystem,
    rng::{RngBank, SubsystemSlot},
    satisfaction_subsystem::SatisfactionSubsystem,
    scheduler::{ScheduledTask, Scheduler},
    snapshot::SimSnapshot,
    state::SimulationState,
    store::SimStore,
    subsystem::{SimSubsystem, TickContext},
    types::{CitizenId, RunId, Tick},
};
use std::collections::VecDeque;
use std::sync::Arc;

const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct SimEngine {
    pub run_id:     RunId,
    pub clock:      SimClock,
    pub rng_bank:   RngBank,
    base_run_id:    RunId,
    seed:           u64,
    subsystems:     Vec<(SubsystemSlot, Box<dyn SimSubsystem>)>,
    store:          SimStore,
    state:          SimulationState,
    config:         SimConfig,
    factory:        Arc<dyn PointFactory>,
    scheduler:      Scheduler,
    /// Commands submitted from outside, applied by the next `pump`.
    inbox:          VecDeque<QueuedCommand>,
    /// Events raised outside a tick, written on the next flush.
    outbox:         Vec<(&'static str, SimEvent)>,
    generation:     u32,
    growth_spawned: u64,
    commands_seen:  u64,
}

impl SimEngine {
    /// Build a fully wired engine on a bootstrapped world.
    /// The run must already be registered in `store`.
    pub fn build(run_id: RunId, seed: u64, store: SimStore, config: SimConfig) -> SimResult<Self> {
        Self::build_with_factory(run_id, seed, store, config, Arc::new(RandomPointFactory))
    }

    pub fn build_with_factory(
        run_id: RunId,
        seed: u64,
        store: SimStore,
        config: SimConfig,
        factory: Arc<dyn PointFactory>,
    ) -> SimResult<Self> {
        store.require_run(&run_id)?;
        let rng_bank = RngBank::new(seed);
        let mut rng = rng_bank.for_subsystem_at_tick(SubsystemSlot::Bootstrap, 0);
        let state = bootstrap_world(&config, factory.as_ref(), &mut rng)?;

        let mut engine = Self::new(run_id, seed, store, config, factory, state);
        engine.wire_subsystems();
        engine.announce_world()?;
        Ok(engine)
    }

    /// Engine on a fresh in-memory store with the test config.
    pub fn build_test(run_id: &str, seed: u64) -> SimResult<Self> {
        let store = SimStore::in_memory()?;
        store.migrate()?;
        store.insert_run(run_id, seed, "test")?;
        Self::build(run_id.to_string(), seed, store, SimConfig::default_test())
    }

    fn new(
        run_id: RunId,
        seed: u64,
        store: SimStore,
        config: SimConfig,
        factory: Arc<dyn PointFactory>,
        state: SimulationState,
    ) -> Self {
        let clock = SimClock::new(run_id.clone());
        Self {
            scheduler:      Scheduler::new(config.timers.clone(), clock.speed),
            clock,
            rng_bank:       RngBank::new(seed),
            base_run_id:    run_id.clone(),
            run_id,
            seed,
            subsystems:     Vec::new(),
            store,
            state,
            config,
            factory,
            inbox:          VecDeque::new(),
            outbox:         Vec::new(),
            generation:     0,
            growth_spawned: 0,
            commands_seen:  0,
        }
    }

    /// EXECUTION ORDER — fixed, documented, never reordered.
    fn wire_subsystems(&mut self) {
        let population = PopulationSubsystem::new(self.config.clone(), Arc::clone(&self.factory));
        let economy = EconomySubsystem::new(self.config.economy.clone());
        let movement = MovementSubsystem::new(self.config.satisfaction.clone());
        let satisfaction = SatisfactionSubsystem::new(self.config.satisfaction.clone());

        self.subsystems.clear();
        self.register(SubsystemSlot::Population, Box::new(population));
        self.register(SubsystemSlot::Economy, Box::new(economy));
        self.register(SubsystemSlot::Movement, Box::new(movement));
        self.register(SubsystemSlot::Satisfaction, Box::new(satisfaction));
        self.register(SubsystemSlot::Challenge, Box::new(ChallengeSubsystem::new()));
    }

    /// Register a subsystem. Call in the documented execution order.
    pub fn register(&mut self, slot: SubsystemSlot, subsystem: Box<dyn SimSubsystem>) {
        self.subsystems.push((slot, subsystem));
    }

    /// Replace the world with a hand-built one, e.g. a test fixture or a
    /// scenario. Lookup indices are rebuilt; the clock is left alone.
    pub fn load_world(&mut self, mut state: SimulationState) -> SimResult<()> {
        state.reindex();
        self.state = state;
        self.outbox.push((
            "engine",
            SimEvent::WorldBootstrapped {
                tick: self.clock.current_tick,
                points: self.state.points.len(),
                routes: self.state.routes.len(),
                citizens: self.state.citizens.len(),
            },
        ));
        self.flush_events()
    }

    // ── Tick loop ──────────────────────────────────────────────

    /// Advance one tick. This is the core simulation step.
    pub fn tick(&mut self) -> SimResult<Vec<SimEvent>> {
        if self.state.game_over {
            return Err(SimError::GameOver { day: self.clock.day });
        }
        if self.clock.paused {
            return Err(SimError::ClockPaused);
        }
        self.step()
    }

    /// Manual one-hour step. Works on a paused clock; refused after game over.
    pub fn advance_time(&mut self) -> SimResult<Vec<SimEvent>> {
        if self.state.game_over {
            return Err(SimError::GameOver { day: self.clock.day });
        }
        self.step()
    }

    fn step(&mut self) -> SimResult<Vec<SimEvent>> {
        self.flush_events()?;

        let satisfied_before = self.state.citizens.satisfied_count();
        let satisfaction_before = self.state.satisfaction;
        let step = self.clock.advance();
        let tick = step.tick;
        let ctx = TickContext { step, satisfied_before, satisfaction_before };

        let mut tick_events = vec![SimEvent::TickStarted { tick }];
        if step.rolled_over {
            log::info!("tick={tick} engine: day {} begins at {satisfaction_before}% satisfaction", step.day);
            tick_events.push(SimEvent::DayStarted {
                tick,
                day: step.day,
                satisfaction: satisfaction_before,
                satisfied: satisfied_before,
            });
        }
        for event in &tick_events {
            append_event(&self.store, &self.run_id, tick, "engine", event)?;
        }

        // Execute each subsystem in registration order.
        // Each subsystem sees all events emitted so far this tick.
        for (slot, subsystem) in &mut self.subsystems {
            let mut rng = self.rng_bank.for_subsystem_at_tick(*slot, tick);
            let new_events = subsystem.update(&ctx, &mut self.state, &tick_events, &mut rng)?;
            for event in &new_events {
                append_event(&self.store, &self.run_id, tick, subsystem.name(), event)?;
            }
            tick_events.extend(new_events);
        }

        let completed = SimEvent::TickCompleted { tick };
        append_event(&self.store, &self.run_id, tick, "engine", &completed)?;
        tick_events.push(completed);

        log::debug!(
            "tick={tick} engine: day {} hour {} satisfaction={}% citizens={} resources={}",
            step.day,
            step.time,
            self.state.satisfaction,
            self.state.citizens.len(),
            self.state.resources
        );

        if tick % self.config.snapshot_interval.max(1) == 0 {
            self.take_snapshot(tick)?;
        }
        if self.state.game_over {
            // Terminal: stop the timers until a restart.
            self.clock.pause();
        }
        Ok(tick_events)
    }

    /// Run n ticks in a loop. Used for testing and fast-forward.
    /// Stops early at game over; returns how many ticks ran.
    pub fn run_ticks(&mut self, n: u64) -> SimResult<u64> {
        self.clock.resume();
        let mut ran = 0;
        for _ in 0..n {
            if self.state.game_over {
                break;
            }
            self.tick()?;
            ran += 1;
        }
        self.clock.pause();
        Ok(ran)
    }

    /// Let `elapsed_ms` of real time pass and run whatever came due:
    /// queued player commands first, then timer tasks in due order.
    /// A paused or finished game freezes its timers.
    pub fn pump(&mut self, elapsed_ms: u64) -> SimResult<Vec<ScheduledTask>> {
        while let Some(queued) = self.inbox.pop_front() {
            self.apply_command(queued.command)?;
        }

        let mut fired = Vec::new();
        if self.state.game_over || self.clock.paused {
            return Ok(fired);
        }
        self.scheduler.advance(elapsed_ms);
        while let Some(task) = self.scheduler.pop_due(self.clock.speed) {
            match task {
                ScheduledTask::ClockTick => {
                    self.tick()?;
                }
                ScheduledTask::PopulationGrowth => {
                    self.spawn_growth_citizen()?;
                }
                ScheduledTask::PoolTrim => {
                    self.trim_citizens()?;
                }
            }
            fired.push(task);
            if self.state.game_over {
                break;
            }
        }
        Ok(fired)
    }

    // ── Timer tasks ────────────────────────────────────────────

    /// The growth timer: one new citizen on a random trip.
    pub fn spawn_growth_citizen(&mut self) -> SimResult<Option<CitizenId>> {
        self.growth_spawned += 1;
        let mut rng = self
            .rng_bank
            .for_subsystem_at_tick(SubsystemSlot::Growth, self.growth_spawned);
        let spawned = self.state.citizens.spawn(&self.state.points, &mut rng);
        if spawned.is_some() {
            self.outbox.push((
                "growth",
                SimEvent::CitizensSpawned {
                    tick: self.clock.current_tick,
                    count: 1,
                    reason: SpawnReason::Growth,
                },
            ));
        }
        self.flush_events()?;
        Ok(spawned)
    }

    /// The trim timer: cap the pool, keeping the most recent citizens.
    /// Dropped citizens keep whatever they already contributed to the totals.
    pub fn trim_citizens(&mut self) -> SimResult<usize> {
        let population = &self.config.population;
        let dropped = self.state.citizens.trim(population.trim_threshold, population.trim_keep);
        if dropped > 0 {
            log::info!(
                "tick={} engine: trimmed {dropped} citizens, {} remain",
                self.clock.current_tick,
                self.state.citizens.len()
            );
            self.outbox.push((
                "growth",
                SimEvent::CitizensTrimmed {
                    tick: self.clock.current_tick,
                    dropped,
                    remaining: self.state.citizens.len(),
                },
            ));
        }
        self.flush_events()?;
        Ok(dropped)
    }

    // ── Network editing ────────────────────────────────────────

    /// Today's price of a route of `kind`.
    pub fn transport_cost(&self, kind: TransportType) -> i64 {
        transport_cost(kind, self.clock.day, self.config.economy.cost_inflation_per_day)
    }

    /// Buy a route. `false` means nothing changed.
    pub fn add_route(&mut self, start: &str, end: &str, kind: TransportType) -> bool {
        self.try_add_route(start, end, kind).is_ok()
    }

    /// Buy a route, or say why not. On success the cost is debited and the
    /// network challenges are refreshed; on rejection nothing changes.
    pub fn try_add_route(
        &mut self,
        start: &str,
        end: &str,
        kind: TransportType,
    ) -> Result<usize, RouteRejection> {
        let tick = self.clock.current_tick;
        let checked = self
            .state
            .routes
            .validate(&self.state.points, start, end, kind)
            .and_then(|_| {
                let cost = self.transport_cost(kind);
                if self.state.resources < cost {
                    Err(RouteRejection::InsufficientFunds { cost, available: self.state.resources })
                } else {
                    Ok(cost)
                }
            });

        let cost = match checked {
            Ok(cost) => cost,
            Err(rejection) => {
                log::warn!("tick={tick} engine: route {start}-{end} ({kind:?}) rejected: {}", rejection.reason());
                self.outbox.push((
                    "engine",
                    SimEvent::RouteRejected {
                        tick,
                        start: start.to_string(),
                        end: end.to_string(),
                        kind,
                        reason: rejection.reason(),
                    },
                ));
                return Err(rejection);
            }
        };

        self.state.resources -= cost;
        let index = self.state.routes.push(Route { start: start.to_string(), end: end.to_string(), kind });
        log::info!(
            "tick={tick} engine: route #{index} {start}-{end} ({kind:?}) built for {cost}, {} left",
            self.state.resources
        );
        self.outbox.push((
            "engine",
            SimEvent::RouteAdded {
                tick,
                index,
                start: start.to_string(),
                end: end.to_string(),
                kind,
                cost,
            },
        ));
        self.refresh_network_challenges();
        Ok(index)
    }

    /// Demolish the route at `index`. No refund; out of range is a no-op.
    pub fn remove_route(&mut self, index: usize) -> Option<Route> {
        let removed = self.state.routes.remove(index)?;
        let tick = self.clock.current_tick;
        log::info!("tick={tick} engine: route #{index} {}-{} removed", removed.start, removed.end);
        self.outbox.push((
            "engine",
            SimEvent::RouteRemoved {
                tick,
                index,
                start: removed.start.clone(),
                end: removed.end.clone(),
                kind: removed.kind,
            },
        ));
        self.refresh_network_challenges();
        Some(removed)
    }

    /// Choose the mode the player is about to build. An unaffordable mode
    /// clears the selection instead.
    pub fn select_transport(&mut self, kind: TransportType) -> Option<TransportType> {
        let selected = (self.state.resources >= self.transport_cost(kind)).then_some(kind);
        self.state.selected_transport = selected;
        self.outbox.push((
            "engine",
            SimEvent::TransportSelected { tick: self.clock.current_tick, requested: kind, selected },
        ));
        selected
    }

    fn refresh_network_challenges(&mut self) {
        let completed = self.state.refresh_network_challenges();
        let events = completed_events(self.clock.current_tick, &completed, &self.state);
        self.outbox.extend(events.into_iter().map(|e| ("challenge", e)));
    }

    // ── Commands ───────────────────────────────────────────────

    /// Queue a command for the next `pump`. Returns its id.
    pub fn submit(&mut self, command: PlayerCommand) -> String {
        let command_id = self.next_command_id();
        self.inbox.push_back(QueuedCommand {
            run_id: self.run_id.clone(),
            queued_at: self.clock.current_tick,
            command_id: command_id.clone(),
            command,
        });
        command_id
    }

    /// Apply a player command now and record it in the event log.
    pub fn apply_command(&mut self, command: PlayerCommand) -> SimResult<CommandOutcome> {
        let command_id = self.next_command_id();
        self.outbox.push((
            "engine",
            SimEvent::PlayerCommandReceived {
                tick: self.clock.current_tick,
                command_id,
                command_type: command.type_name().to_string(),
            },
        ));

        let outcome = match command {
            PlayerCommand::Pause => {
                self.clock.pause();
                CommandOutcome::Applied
            }
            PlayerCommand::Resume => {
                if self.state.game_over {
                    CommandOutcome::Ignored
                } else {
                    self.clock.resume();
                    CommandOutcome::Applied
                }
            }
            PlayerCommand::SetSpeed { speed } => {
                self.set_speed(speed);
                CommandOutcome::Applied
            }
            PlayerCommand::AdvanceTime => {
                if self.state.game_over {
                    CommandOutcome::Ignored
                } else {
                    self.advance_time()?;
                    CommandOutcome::Applied
                }
            }
            PlayerCommand::AddRoute { start, end, kind } => match self.try_add_route(&start, &end, kind) {
                Ok(_) => CommandOutcome::Applied,
                Err(rejection) => CommandOutcome::Rejected(rejection.reason()),
            },
            PlayerCommand::RemoveRoute { index } => match self.remove_route(index) {
                Some(_) => CommandOutcome::Applied,
                None => CommandOutcome::Rejected(format!("no route at index {index}")),
            },
            PlayerCommand::SelectTransport { kind } => {
                self.select_transport(kind);
                CommandOutcome::Applied
            }
            PlayerCommand::Restart => {
                self.restart()?;
                CommandOutcome::Applied
            }
        };
        self.flush_events()?;
        Ok(outcome)
    }

    pub fn set_speed(&mut self, speed: SimSpeed) {
        self.clock.set_speed(speed);
        self.scheduler.rearm_clock(speed);
    }

    /// Throw the world away and start over from a fresh bootstrap. Each
    /// restart is logged as its own run, `<run_id>-r<generation>`.
    pub fn restart(&mut self) -> SimResult<()> {
        self.flush_events()?;
        self.generation += 1;
        let run_id = format!("{}-r{}", self.base_run_id, self.generation);
        self.store.insert_run(&run_id, self.seed, ENGINE_VERSION)?;

        self.rng_bank = RngBank::new(generation_seed(self.seed, self.generation));
        let mut rng = self.rng_bank.for_subsystem_at_tick(SubsystemSlot::Bootstrap, 0);
        let state = bootstrap_world(&self.config, self.factory.as_ref(), &mut rng)?;

        self.clock = SimClock::new(run_id.clone());
        self.scheduler = Scheduler::new(self.config.timers.clone(), self.clock.speed);
        self.run_id = run_id;
        self.state = state;
        self.inbox.clear();
        self.growth_spawned = 0;
        self.wire_subsystems();
        log::info!("engine: restarted as {} (generation {})", self.run_id, self.generation);
        self.announce_world()
    }

    fn next_command_id(&mut self) -> String {
        self.commands_seen += 1;
        format!("cmd-{}-{:06}", self.generation, self.commands_seen)
    }

    // ── Event log ──────────────────────────────────────────────

    /// Write any events raised outside a tick to the store.
    pub fn flush_events(&mut self) -> SimResult<()> {
        for (subsystem, event) in self.outbox.drain(..) {
            append_event(&self.store, &self.run_id, self.clock.current_tick, subsystem, &event)?;
        }
        Ok(())
    }

    /// `RunInitialized` and `WorldBootstrapped` at tick 0, so seed
    /// differences are observable before the first tick.
    fn announce_world(&mut self) -> SimResult<()> {
        self.outbox.push((
            "engine",
            SimEvent::RunInitialized { run_id: self.run_id.clone(), seed: self.seed },
        ));
        self.outbox.push((
            "engine",
            SimEvent::WorldBootstrapped {
                tick: 0,
                points: self.state.points.len(),
                routes: self.state.routes.len(),
                citizens: self.state.citizens.len(),
            },
        ));
        self.flush_events()
    }

    /// Query events for a specific tick from the store.
    /// Used by the determinism test and replay tooling.
    pub fn store_events_for_tick(&self, run_id: &str, tick: Tick) -> SimResult<Vec<EventLogEntry>> {
        self.store.events_for_tick(run_id, tick)
    }

    pub fn store_event_count(&self, event_type: &str) -> SimResult<i64> {
        self.store.event_count(&self.run_id, event_type)
    }

    pub fn latest_snapshot(&self) -> SimResult<Option<SimSnapshot>> {
        match self.store.latest_snapshot_before(&self.run_id, self.clock.current_tick)? {
            Some((_, json)) => {
                let mut snapshot: SimSnapshot = serde_json::from_str(&json)?;
                snapshot.state.reindex();
                Ok(Some(snapshot))
            }
            None => Ok(None),
        }
    }

    // ── Read access ────────────────────────────────────────────

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn is_game_over(&self) -> bool {
        self.state.game_over
    }

    /// The full read model for presentation.
    pub fn snapshot(&self) -> SimSnapshot {
        SimSnapshot {
            run_id: self.run_id.clone(),
            tick: self.clock.current_tick,
            clock: self.clock.clone(),
            generation: self.generation,
            state: self.state.clone(),
        }
    }

    /// Query the MovementSubsystem's lifetime counters.
    /// Used by sim-runner to print end-of-run summaries.
    pub fn movement_totals(&self) -> Option<&MovementTotals> {
        self.subsystems.iter().find_map(|(_, sub)| {
            sub.as_any()
                .downcast_ref::<MovementSubsystem>()
                .map(|m| &m.totals)
        })
    }

    fn take_snapshot(&self, tick: Tick) -> SimResult<()> {
        let json = serde_json::to_string(&self.snapshot())?;
        self.store.save_snapshot(&self.run_id, tick, &json)?;
        log::debug!("Snapshot saved at tick {tick}");
        Ok(())
    }
}

fn generation_seed(seed: u64, generation: u32) -> u64 {
    seed ^ u64::from(generation).wrapping_mul(0xd6e8_feb8_6659_fd93)
}

fn append_event(
    store: &SimStore,
    run_id: &str,
    tick: Tick,
    subsystem: &str,
    event: &SimEvent,
) -> SimResult<()> {
    let entry = EventLogEntry {
        id:         None,
        run_id:     run_id.to_string(),
        tick,
        subsystem:  subsystem.to_string(),
        event_type: event_type_name(event).to_string(),
        payload:    serde_json::to_string(event)?,
    };
    store.append_event(&entry)
}

/// Extract a stable string name from a SimEvent variant.
/// Used for the event_type column in event_log.
pub fn event_type_name(event: &SimEvent) -> &'static str {
    match event {
        SimEvent::TickStarted { .. }           => "tick_started",
        SimEvent::TickCompleted { .. }         => "tick_completed",
        SimEvent::RunInitialized { .. }        => "run_initialized",
        SimEvent::WorldBootstrapped { .. }     => "world_bootstrapped",
        SimEvent::DayStarted { .. }            => "day_started",
        SimEvent::PointAdded { .. }            => "point_added",
        SimEvent::CitizensSpawned { .. }       => "citizens_spawned",
        SimEvent::CitizensTrimmed { .. }       => "citizens_trimmed",
        SimEvent::DailySettlement { .. }       => "daily_settlement",
        SimEvent::JourneyCompleted { .. }      => "journey_completed",
        SimEvent::MovementSummary { .. }       => "movement_summary",
        SimEvent::SatisfactionUpdated { .. }   => "satisfaction_updated",
        SimEvent::GameOver { .. }              => "game_over",
        SimEvent::ChallengeCompleted { .. }    => "challenge_completed",
        SimEvent::PlayerCommandReceived { .. } => "player_command_received",
        SimEvent::RouteAdded { .. }            => "route_added",
        SimEvent::RouteRejected { .. }         => "route_rejected",
        SimEvent::RouteRemoved { .. }          => "route_removed",
        SimEvent::TransportSelected { .. }     => "transport_selected",
    }
}
