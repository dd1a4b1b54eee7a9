use std::fmt;
use std::time::SystemTime;

use serde::Serialize;

use crate::{FuelKind, ServicingLedger, TransactionRecord, VehicleId};

/// One finished transaction as printed in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionLine {
    /// The vehicle that was fuelled.
    pub vehicle_id: VehicleId,
    /// Wall-clock time of completion, RFC 3339 with milliseconds.
    pub date_time: String,
    /// The fuel dispensed.
    pub fuel_type: FuelKind,
    /// Litres dispensed.
    pub number_of_litres_dispensed: u32,
}

impl TransactionLine {
    fn new(record: &TransactionRecord, started_at: SystemTime) -> Self {
        Self {
            vehicle_id: record.vehicle_id,
            date_time: humantime::format_rfc3339_millis(started_at + record.completed_at)
                .to_string(),
            fuel_type: record.fuel_kind,
            number_of_litres_dispensed: record.litres_dispensed,
        }
    }
}

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    litres_dispensed: u64,
    vehicles_serviced: usize,
    vehicles_left: usize,
    transactions: Vec<TransactionLine>,
}

impl Report {
    /// Builds a report from the ledger. Simulation times are shifted by `started_at`, the
    /// wall-clock time at which the run started.
    #[must_use]
    pub fn new(ledger: &ServicingLedger, started_at: SystemTime) -> Self {
        Self {
            litres_dispensed: ledger.litres_dispensed(),
            vehicles_serviced: ledger.vehicles_serviced(),
            vehicles_left: ledger.vehicles_abandoned(),
            transactions: ledger
                .transactions()
                .iter()
                .map(|record| TransactionLine::new(record, started_at))
                .collect(),
        }
    }

    /// Total litres dispensed.
    #[must_use]
    pub fn litres_dispensed(&self) -> u64 {
        self.litres_dispensed
    }

    /// Number of vehicles fuelled to completion.
    #[must_use]
    pub fn vehicles_serviced(&self) -> usize {
        self.vehicles_serviced
    }

    /// Number of vehicles that left the queue without being served.
    #[must_use]
    pub fn vehicles_left(&self) -> usize {
        self.vehicles_left
    }

    /// Finished transactions in the order of completion.
    #[must_use]
    pub fn transactions(&self) -> &[TransactionLine] {
        &self.transactions
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "Simulation Report:")?;
        writeln!(f, "Total of litres dispensed: {}", self.litres_dispensed)?;
        writeln!(f, "Total of vehicles serviced: {}", self.vehicles_serviced)?;
        writeln!(f, "Total of vehicles that left: {}", self.vehicles_left)?;
        for line in &self.transactions {
            let json = serde_json::to_string(line).map_err(|_| fmt::Error)?;
            writeln!(f, "{}", json)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{PumpId, PumpLocation, Vehicle, VehicleCategory};
    use std::time::{Duration, UNIX_EPOCH};

    fn ledger() -> ServicingLedger {
        let mut ledger = ServicingLedger::new(0.0015);
        let location = PumpLocation::new(0, 2);
        let vehicle = Vehicle::new(VehicleId(7), VehicleCategory::Van, FuelKind::Lpg, 72);
        ledger.start(vehicle, PumpId(1), location, Duration::from_secs(1));
        ledger.complete(location, Duration::from_millis(6333));
        ledger.record_abandonment();
        ledger
    }

    #[test]
    fn test_report() {
        let report = Report::new(&ledger(), UNIX_EPOCH);
        assert_eq!(report.litres_dispensed(), 8);
        assert_eq!(report.vehicles_serviced(), 1);
        assert_eq!(report.vehicles_left(), 1);
        assert_eq!(
            report.transactions(),
            &[TransactionLine {
                vehicle_id: VehicleId(7),
                date_time: String::from("1970-01-01T00:00:06.333Z"),
                fuel_type: FuelKind::Lpg,
                number_of_litres_dispensed: 8,
            }]
        );
    }

    #[test]
    fn test_display() {
        let report = Report::new(&ledger(), UNIX_EPOCH);
        assert_eq!(
            report.to_string(),
            "\nSimulation Report:\n\
             Total of litres dispensed: 8\n\
             Total of vehicles serviced: 1\n\
             Total of vehicles that left: 1\n\
             {\"vehicleId\":7,\"dateTime\":\"1970-01-01T00:00:06.333Z\",\
             \"fuelType\":\"LPG\",\"numberOfLitresDispensed\":8}\n"
        );
    }

    #[test]
    fn test_empty_report() {
        let report = Report::new(&ServicingLedger::new(0.0015), UNIX_EPOCH);
        assert!(report.transactions().is_empty());
        assert!(report.to_string().ends_with("Total of vehicles that left: 0\n"));
    }
}
