use std::collections::HashMap;
use std::time::Duration;

use delegate::delegate;
use serde::Serialize;

use crate::{FuelKind, PumpId, PumpLocation, Vehicle, VehicleId};

/// A vehicle being fuelled at a pump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveService {
    vehicle: Vehicle,
    pump: PumpId,
    location: PumpLocation,
    start: Duration,
    duration: Duration,
}

impl ActiveService {
    /// The vehicle being fuelled.
    #[must_use]
    pub fn vehicle(&self) -> &Vehicle {
        &self.vehicle
    }

    /// The pump in use.
    #[must_use]
    pub fn pump(&self) -> PumpId {
        self.pump
    }

    /// Where the pump is.
    #[must_use]
    pub fn location(&self) -> PumpLocation {
        self.location
    }

    /// The time of the simulation when fuelling started.
    #[must_use]
    pub fn start_time(&self) -> Duration {
        self.start
    }

    /// The time of the simulation when fuelling will finish.
    #[must_use]
    pub fn end_time(&self) -> Duration {
        self.start + self.duration
    }

    delegate! {
        to self.vehicle {
            /// The ID of the vehicle being fuelled.
            #[must_use]
            pub fn id(&self) -> VehicleId;
            /// The fuel being dispensed.
            #[must_use]
            pub fn fuel_kind(&self) -> FuelKind;
            /// Litres to dispense.
            #[must_use]
            pub fn volume_needed(&self) -> u32;
        }
    }
}

/// A finished fuelling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionRecord {
    /// The vehicle that was fuelled.
    pub vehicle_id: VehicleId,
    /// The fuel dispensed.
    pub fuel_kind: FuelKind,
    /// Litres dispensed.
    pub litres_dispensed: u32,
    /// The time of the simulation when fuelling finished.
    pub completed_at: Duration,
}

/// Keeps track of fuelling in progress, and of all finished transactions.
///
/// Totals only ever grow during a run.
#[derive(Debug)]
pub struct ServicingLedger {
    dispense_rate: f64,
    active: HashMap<PumpLocation, ActiveService>,
    transactions: Vec<TransactionRecord>,
    litres_dispensed: u64,
    vehicles_abandoned: usize,
}

impl ServicingLedger {
    /// Constructs an empty ledger for pumps dispensing `dispense_rate` litres per millisecond.
    #[must_use]
    pub fn new(dispense_rate: f64) -> Self {
        Self {
            dispense_rate,
            active: HashMap::new(),
            transactions: Vec::new(),
            litres_dispensed: 0,
            vehicles_abandoned: 0,
        }
    }

    /// How long it takes to dispense `litres`.
    #[must_use]
    pub fn service_duration(&self, litres: u32) -> Duration {
        Duration::from_secs_f64(f64::from(litres) / self.dispense_rate / 1000.0)
    }

    /// Starts fuelling `vehicle` at the pump at `location` and returns the time it will take.
    ///
    /// # Panics
    ///
    /// Panics if the pump is already serving another vehicle.
    pub fn start(
        &mut self,
        vehicle: Vehicle,
        pump: PumpId,
        location: PumpLocation,
        now: Duration,
    ) -> Duration {
        let duration = self.service_duration(vehicle.volume_needed());
        let service = ActiveService {
            vehicle,
            pump,
            location,
            start: now,
            duration,
        };
        if let Some(previous) = self.active.insert(location, service) {
            panic!(
                "pump {} is already serving vehicle {}",
                previous.pump,
                previous.id()
            );
        }
        duration
    }

    /// Finishes fuelling at the pump at `location` and records the transaction.
    ///
    /// # Panics
    ///
    /// Panics if no vehicle is being fuelled at that pump.
    pub fn complete(&mut self, location: PumpLocation, now: Duration) -> &TransactionRecord {
        let service = self
            .active
            .remove(&location)
            .unwrap_or_else(|| panic!("no active service at pump location {}", location));
        let litres_dispensed = service.volume_needed();
        self.litres_dispensed += u64::from(litres_dispensed);
        self.transactions.push(TransactionRecord {
            vehicle_id: service.id(),
            fuel_kind: service.fuel_kind(),
            litres_dispensed,
            completed_at: now,
        });
        &self.transactions[self.transactions.len() - 1]
    }

    /// Counts a vehicle that left the queue without being served.
    pub fn record_abandonment(&mut self) {
        self.vehicles_abandoned += 1;
    }

    /// Removes all services in progress without recording any transactions.
    pub fn abandon_active(&mut self) -> Vec<ActiveService> {
        let mut services: Vec<_> = self.active.drain().map(|(_, service)| service).collect();
        services.sort_by_key(ActiveService::location);
        services
    }

    /// Returns the service in progress at the pump at `location`, if any.
    #[must_use]
    pub fn active_service(&self, location: PumpLocation) -> Option<&ActiveService> {
        self.active.get(&location)
    }

    /// Iterates over services in progress, in no particular order.
    pub fn active_services(&self) -> impl Iterator<Item = &ActiveService> {
        self.active.values()
    }

    /// Number of services in progress.
    #[must_use]
    pub fn num_active(&self) -> usize {
        self.active.len()
    }

    /// All finished transactions, in the order of completion.
    #[must_use]
    pub fn transactions(&self) -> &[TransactionRecord] {
        &self.transactions
    }

    /// Total litres dispensed in finished transactions.
    #[must_use]
    pub fn litres_dispensed(&self) -> u64 {
        self.litres_dispensed
    }

    /// Number of vehicles fuelled to completion.
    #[must_use]
    pub fn vehicles_serviced(&self) -> usize {
        self.transactions.len()
    }

    /// Number of vehicles that left the queue without being served.
    #[must_use]
    pub fn vehicles_abandoned(&self) -> usize {
        self.vehicles_abandoned
    }
}
