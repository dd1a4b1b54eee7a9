use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};
use rand::Rng;
use rand_distr::{Distribution, Uniform};

use crate::{
    Admission, Allocate, ConfigError, Event, PumpLocation, Scheduler, ServicingLedger,
    SimulationConfig, SweepOutcome, Topology, TransactionRecord, Vehicle, VehicleGenerator,
    WaitingQueue,
};

/// A fuelling that has just started and whose completion must be scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingCompletion {
    /// Where the vehicle is being fuelled.
    pub location: PumpLocation,
    /// How long until fuelling finishes.
    pub after: Duration,
}

/// What happened to an arriving vehicle.
#[derive(Debug, PartialEq, Eq)]
pub enum ArrivalOutcome {
    /// The vehicle went straight to a pump.
    Serviced(PendingCompletion),
    /// The vehicle joined the queue.
    Queued,
    /// The queue was full and the vehicle drove away.
    Rejected(Vehicle),
}

/// The entire state of the forecourt: the pumps, the waiting queue, and the servicing ledger.
///
/// Each operation is one atomic state transition at the given time of the simulation.
/// A vehicle is owned either by the queue or by the ledger, never both.
pub struct Forecourt {
    topology: Topology,
    queue: WaitingQueue,
    ledger: ServicingLedger,
    allocator: Box<dyn Allocate>,
}

impl Forecourt {
    /// Constructs an empty forecourt.
    #[must_use]
    pub fn new(config: &SimulationConfig, allocator: Box<dyn Allocate>) -> Self {
        Self {
            topology: Topology::new(config.lanes, config.pumps_per_lane),
            queue: WaitingQueue::bounded(config.max_queue_length, config.max_queue_wait()),
            ledger: ServicingLedger::new(config.dispense_rate),
            allocator,
        }
    }

    /// The pumps.
    #[must_use]
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// The waiting queue.
    #[must_use]
    pub fn queue(&self) -> &WaitingQueue {
        &self.queue
    }

    /// Services in progress and finished transactions.
    #[must_use]
    pub fn ledger(&self) -> &ServicingLedger {
        &self.ledger
    }

    /// Checks if newly arriving vehicles would be turned away.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.queue.is_full()
    }

    fn start_service(
        &mut self,
        vehicle: Vehicle,
        location: PumpLocation,
        now: Duration,
    ) -> PendingCompletion {
        let pump = self
            .topology
            .pump(location)
            .map(|pump| pump.id())
            .unwrap_or_else(|| panic!("allocated pump at {} does not exist", location));
        log::info!(
            "[{:?}] Vehicle {} ({}, {}) being fuelled at pump {}: {} litres",
            now,
            vehicle.id(),
            vehicle.category(),
            vehicle.fuel_kind(),
            pump,
            vehicle.volume_needed()
        );
        let after = self.ledger.start(vehicle, pump, location, now);
        PendingCompletion { location, after }
    }

    /// Handles an arriving vehicle.
    pub fn arrive(&mut self, vehicle: Vehicle, now: Duration) -> ArrivalOutcome {
        match self
            .queue
            .admit(vehicle, now, &mut self.topology, &*self.allocator)
        {
            Admission::Assigned(vehicle, location) => {
                ArrivalOutcome::Serviced(self.start_service(vehicle, location, now))
            }
            Admission::Queued => {
                log::info!(
                    "[{:?}] Vehicle inserted in the queue ({} waiting)",
                    now,
                    self.queue.len()
                );
                ArrivalOutcome::Queued
            }
            Admission::Rejected(vehicle) => {
                log::debug!("[{:?}] Queue full, vehicle {} dropped", now, vehicle.id());
                ArrivalOutcome::Rejected(vehicle)
            }
        }
    }

    /// Sweeps the waiting queue, see [`WaitingQueue::sweep`].
    /// Returns the fuelling started during the sweep.
    pub fn sweep(&mut self, now: Duration) -> Vec<PendingCompletion> {
        let outcomes = self
            .queue
            .sweep(now, &mut self.topology, &*self.allocator);
        let mut started = Vec::new();
        for outcome in outcomes {
            match outcome {
                SweepOutcome::Abandoned { vehicle, waited } => {
                    log::info!(
                        "[{:?}] Vehicle {} has left the forecourt after waiting {:?}",
                        now,
                        vehicle.id(),
                        waited
                    );
                    self.ledger.record_abandonment();
                }
                SweepOutcome::Assigned(vehicle, location) => {
                    started.push(self.start_service(vehicle, location, now));
                }
            }
        }
        log::debug!(
            "[{:?}] Sweep finished: {} waiting, pumps {}",
            now,
            self.queue.len(),
            self.topology
        );
        started
    }

    /// Finishes fuelling at the pump at `location`, frees the pump, and records the transaction.
    pub fn complete(&mut self, location: PumpLocation, now: Duration) -> TransactionRecord {
        let record = self.ledger.complete(location, now).clone();
        let pump = self.topology.release(location);
        log::info!(
            "[{:?}] Vehicle {} fuelled at pump {}: {} litres of {}",
            now,
            record.vehicle_id,
            pump,
            record.litres_dispensed,
            record.fuel_kind
        );
        record
    }

    /// Stops all fuelling in progress without recording transactions, and frees the pumps.
    /// Vehicles in the queue stay there.
    pub fn shut_down(&mut self, now: Duration) {
        let abandoned = self.ledger.abandon_active();
        for service in &abandoned {
            self.topology.release(service.location());
        }
        if !abandoned.is_empty() || !self.queue.is_empty() {
            log::warn!(
                "[{:?}] Shutting down with {} vehicles being fuelled and {} waiting",
                now,
                abandoned.len(),
                self.queue.len()
            );
        }
    }
}

/// The main simulation object.
///
/// Arrivals and sweeps keep rescheduling themselves, and every started fuelling schedules its
/// own completion. The arrival gaps, in milliseconds, are sampled from `G`.
pub struct Simulation<R, G> {
    /// Current state of the forecourt, mutated by the events.
    pub forecourt: Forecourt,
    /// Schedules events and maintains the clock.
    pub scheduler: Scheduler,
    generator: VehicleGenerator,
    rng: R,
    arrival_gaps: G,
    sweep_period: Duration,
}

impl<R: Rng> Simulation<R, Uniform<u64>> {
    /// Constructs a simulation with arrival gaps drawn uniformly from the configured range.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn from_config(
        config: &SimulationConfig,
        allocator: Box<dyn Allocate>,
        rng: R,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(
            Forecourt::new(config, allocator),
            rng,
            Uniform::new_inclusive(config.min_arrival_gap_ms, config.max_arrival_gap_ms),
            config.sweep_period(),
        ))
    }
}

impl<R, G> Simulation<R, G>
where
    R: Rng,
    G: Distribution<u64>,
{
    /// Constructs a simulation and schedules the first arrival and the first sweep.
    pub fn new(forecourt: Forecourt, rng: R, arrival_gaps: G, sweep_period: Duration) -> Self {
        let mut sim = Self {
            forecourt,
            scheduler: Scheduler::default(),
            generator: VehicleGenerator::default(),
            rng,
            arrival_gaps,
            sweep_period,
        };
        sim.schedule_arrival();
        sim.scheduler.schedule(sweep_period, Event::Sweep);
        sim
    }

    fn schedule_arrival(&mut self) {
        let gap = Duration::from_millis(self.arrival_gaps.sample(&mut self.rng));
        self.scheduler.schedule(gap, Event::Arrival);
    }

    fn schedule_completion(&mut self, completion: PendingCompletion) {
        self.scheduler
            .schedule(completion.after, Event::ServiceCompleted(completion.location));
    }

    fn process_event(&mut self, event: Event) {
        let now = self.scheduler.time();
        match event {
            Event::Arrival => {
                if self.forecourt.is_full() {
                    log::debug!("[{:?}] Queue full, arrival dropped", now);
                } else {
                    let vehicle = self.generator.generate(&mut self.rng);
                    if let ArrivalOutcome::Serviced(completion) = self.forecourt.arrive(vehicle, now)
                    {
                        self.schedule_completion(completion);
                    }
                }
                self.schedule_arrival();
            }
            Event::Sweep => {
                for completion in self.forecourt.sweep(now) {
                    self.schedule_completion(completion);
                }
                self.scheduler.schedule(self.sweep_period, Event::Sweep);
            }
            Event::ServiceCompleted(location) => {
                self.forecourt.complete(location, now);
            }
        }
    }

    /// Performs one step of the simulation. Returns `true` if there was in fact an event
    /// available to process, and `false` instead, which signifies that the simulation ended.
    pub fn step(&mut self) -> bool {
        if let Some(entry) = self.scheduler.pop() {
            log::trace!("[{:?}] [event] {:?}", entry.time(), entry.event());
            self.process_event(entry.event());
            true
        } else {
            false
        }
    }

    /// Processes all events scheduled before `end`, then cancels everything still pending.
    ///
    /// Fuelling in progress at `end` is abandoned and never recorded. If `real_time` is set,
    /// each event waits until its time has passed on the wall clock.
    pub fn run_until(&mut self, end: Duration, real_time: bool) -> Duration {
        let pb = ProgressBar::new(end.as_secs()).with_style(
            ProgressStyle::default_bar().template("{msg} {wide_bar} {percent}%"),
        );
        let wall_start = Instant::now();
        while let Some(next) = self.scheduler.peek_time() {
            if next >= end {
                break;
            }
            if real_time {
                if let Some(wait) = next.checked_sub(wall_start.elapsed()) {
                    std::thread::sleep(wait);
                }
            }
            self.step();
            let secs = self.scheduler.time().as_secs();
            if pb.position() < secs {
                let ledger = self.forecourt.ledger();
                pb.set_position(secs);
                pb.set_message(&format!(
                    "[{time}s] [Q={queued}] [A={active}] [S={serviced}] [L={left}]",
                    time = secs,
                    queued = self.forecourt.queue().len(),
                    active = ledger.num_active(),
                    serviced = ledger.vehicles_serviced(),
                    left = ledger.vehicles_abandoned(),
                ));
            }
        }
        if real_time {
            if let Some(wait) = end.checked_sub(wall_start.elapsed()) {
                std::thread::sleep(wait);
            }
        }
        let cancelled = self.scheduler.cancel_all(end);
        log::debug!("[{:?}] Cancelled {} pending events", end, cancelled);
        self.forecourt.shut_down(end);
        pb.finish();
        end
    }
}
