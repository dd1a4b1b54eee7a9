//! Fuel-station forecourt simulation.
//!
//! Vehicles arrive at random intervals and ask for fuel. A vehicle is either assigned one of the
//! pumps, which are grouped into lanes, or waits in a bounded queue. Queued vehicles are
//! periodically swept: those that waited too long leave the forecourt, the rest are given any pump
//! that became available in the meantime. Every finished fuelling is recorded in a ledger, which
//! is summarized in a [`Report`] at the end of the run.
//!
//! All state transitions are discrete events processed one at a time by [`Simulation`] on a
//! simulated clock. See [`Event`] for the list of events.

#![warn(
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_import_braces,
    unused_qualifications
)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::default_trait_access,
    clippy::inline_always
)]

use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};

mod allocate;
pub use allocate::{Allocate, AllocatorOption, DeepestRunAllocator, FirstFreeAllocator};

mod config;
pub use config::{ConfigError, DurationArg, SimulationConfig};

mod ledger;
pub use ledger::{ActiveService, ServicingLedger, TransactionRecord};

mod queue;
pub use queue::{Admission, SweepOutcome, WaitingQueue};

mod report;
pub use report::{Report, TransactionLine};

mod scheduler;
pub use scheduler::{Event, EventEntry, Scheduler};

mod simulation;
pub use simulation::{ArrivalOutcome, Forecourt, PendingCompletion, Simulation};

mod topology;
pub use topology::{Lane, Pump, PumpLocation, Topology};

mod vehicle;
pub use vehicle::{FuelKind, Vehicle, VehicleCategory, VehicleGenerator};

/// Vehicle ID.
#[derive(
    From,
    Into,
    Debug,
    PartialEq,
    PartialOrd,
    Eq,
    Ord,
    Serialize,
    Deserialize,
    Copy,
    Clone,
    Hash,
    Display,
)]
pub struct VehicleId(u64);

/// Pump ID, i.e., the number painted on the pump.
#[derive(
    From,
    Into,
    Debug,
    PartialEq,
    PartialOrd,
    Eq,
    Ord,
    Serialize,
    Deserialize,
    Copy,
    Clone,
    Hash,
    Display,
)]
pub struct PumpId(usize);
