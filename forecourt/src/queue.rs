use std::collections::VecDeque;
use std::time::Duration;

use crate::{Allocate, PumpLocation, Topology, Vehicle};

/// Result of admitting a vehicle that just arrived.
#[derive(Debug, PartialEq, Eq)]
pub enum Admission {
    /// Nobody was waiting and a pump was free; the vehicle drives straight to it.
    /// The pump is already marked as occupied.
    Assigned(Vehicle, PumpLocation),
    /// The vehicle joined the back of the queue.
    Queued,
    /// The queue is full and the vehicle is turned away.
    Rejected(Vehicle),
}

/// What happened to a vehicle during a sweep. Vehicles that keep waiting are not reported.
#[derive(Debug, PartialEq, Eq)]
pub enum SweepOutcome {
    /// The vehicle waited for too long and left the forecourt.
    Abandoned {
        /// The vehicle that left.
        vehicle: Vehicle,
        /// How long it had been waiting.
        waited: Duration,
    },
    /// The vehicle left the queue for the given pump, which is already marked as occupied.
    Assigned(Vehicle, PumpLocation),
}

/// Bounded queue of vehicles waiting for a pump, in the order of arrival.
///
/// # Examples
///
/// ```
/// # use std::time::Duration;
/// # use forecourt::*;
/// let mut topology = Topology::new(1, 1);
/// let mut queue = WaitingQueue::bounded(1, Duration::from_millis(2000));
/// let vehicle = |id: u64| Vehicle::new(id.into(), VehicleCategory::Car, FuelKind::Diesel, 0);
///
/// let admission = queue.admit(vehicle(1), Duration::default(), &mut topology, &DeepestRunAllocator);
/// assert!(matches!(admission, Admission::Assigned(_, _)));
/// let admission = queue.admit(vehicle(2), Duration::default(), &mut topology, &DeepestRunAllocator);
/// assert_eq!(admission, Admission::Queued);
/// let admission = queue.admit(vehicle(3), Duration::default(), &mut topology, &DeepestRunAllocator);
/// assert!(matches!(admission, Admission::Rejected(_)));
/// ```
#[derive(Debug)]
pub struct WaitingQueue {
    inner: VecDeque<Vehicle>,
    capacity: usize,
    max_wait: Duration,
}

impl WaitingQueue {
    /// Creates a queue holding at most `capacity` vehicles, each willing to wait up to `max_wait`.
    #[must_use]
    pub fn bounded(capacity: usize, max_wait: Duration) -> Self {
        Self {
            inner: VecDeque::with_capacity(capacity),
            capacity,
            max_wait,
        }
    }

    /// Returns the number of waiting vehicles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Checks if nobody is waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Checks if the queue reached its capacity.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.inner.len() >= self.capacity
    }

    /// Maximum number of waiting vehicles.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterates over the waiting vehicles, from the one that arrived first.
    pub fn iter(&self) -> impl Iterator<Item = &Vehicle> {
        self.inner.iter()
    }

    /// Appends a vehicle to the back of the queue, stamping it with the current time.
    /// Gives the vehicle back if the queue is full.
    fn push_back(&mut self, mut vehicle: Vehicle, now: Duration) -> Result<(), Vehicle> {
        if self.is_full() {
            Err(vehicle)
        } else {
            vehicle.enqueue(now);
            self.inner.push_back(vehicle);
            Ok(())
        }
    }

    /// Admits a vehicle that just arrived.
    ///
    /// Once anybody is waiting, newcomers always join the queue, even if a pump happens to be
    /// free, so that nobody jumps the queue on arrival. Only when the queue is empty is the
    /// allocator asked for a pump.
    pub fn admit<A: Allocate + ?Sized>(
        &mut self,
        vehicle: Vehicle,
        now: Duration,
        topology: &mut Topology,
        allocator: &A,
    ) -> Admission {
        if self.is_full() {
            return Admission::Rejected(vehicle);
        }
        if self.is_empty() {
            if let Some(location) = topology.claim(allocator) {
                return Admission::Assigned(vehicle, location);
            }
        }
        match self.push_back(vehicle, now) {
            Ok(()) => Admission::Queued,
            Err(vehicle) => Admission::Rejected(vehicle),
        }
    }

    /// Visits each waiting vehicle once, starting from the most recently queued one.
    ///
    /// A vehicle that has been waiting for longer than the maximum wait leaves. Any other vehicle
    /// is given a pump if the allocator finds one. Both can happen within a single sweep.
    /// Because of the visiting order, when several pumps free up at once, the vehicles at the back
    /// of the queue are served before the ones at the front.
    pub fn sweep<A: Allocate + ?Sized>(
        &mut self,
        now: Duration,
        topology: &mut Topology,
        allocator: &A,
    ) -> Vec<SweepOutcome> {
        let mut outcomes = Vec::new();
        let mut remaining = VecDeque::with_capacity(self.capacity);
        for mut vehicle in std::mem::take(&mut self.inner).into_iter().rev() {
            let waited = vehicle.waiting_time(now).unwrap_or_default();
            if waited > self.max_wait {
                vehicle.dequeue();
                outcomes.push(SweepOutcome::Abandoned { vehicle, waited });
            } else if let Some(location) = topology.claim(allocator) {
                vehicle.dequeue();
                outcomes.push(SweepOutcome::Assigned(vehicle, location));
            } else {
                remaining.push_front(vehicle);
            }
        }
        self.inner = remaining;
        outcomes
    }
}
