use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::VehicleId;

/// Kind of fuel a vehicle runs on.
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumString,
    strum::Display,
)]
pub enum FuelKind {
    /// Diesel.
    Diesel,
    /// Liquefied petroleum gas.
    #[strum(serialize = "LPG")]
    #[serde(rename = "LPG")]
    Lpg,
    /// Unleaded petrol.
    Unleaded,
}

/// Category of a vehicle, which determines its tank capacity and the fuels it accepts.
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumString,
    strum::Display,
)]
pub enum VehicleCategory {
    /// Passenger car.
    Car,
    /// Van.
    Van,
    /// Heavy goods vehicle.
    #[strum(serialize = "HGV")]
    #[serde(rename = "HGV")]
    Hgv,
}

impl VehicleCategory {
    /// All categories, in the order used for random selection.
    pub const ALL: [Self; 3] = [Self::Car, Self::Van, Self::Hgv];

    /// Tank capacity in litres.
    #[must_use]
    pub fn tank_capacity(self) -> u32 {
        match self {
            Self::Car => 10,
            Self::Van => 80,
            Self::Hgv => 150,
        }
    }

    /// Fuels a vehicle of this category can run on.
    #[must_use]
    pub fn permitted_fuels(self) -> &'static [FuelKind] {
        match self {
            Self::Car => &[FuelKind::Diesel, FuelKind::Lpg, FuelKind::Unleaded],
            Self::Van => &[FuelKind::Diesel, FuelKind::Lpg],
            Self::Hgv => &[FuelKind::Diesel],
        }
    }

    /// The fuel every vehicle of this category runs on, if it is not a matter of choice.
    #[must_use]
    pub fn fixed_fuel(self) -> Option<FuelKind> {
        match self {
            Self::Hgv => Some(FuelKind::Diesel),
            Self::Car | Self::Van => None,
        }
    }
}

/// A vehicle that pulled into the forecourt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vehicle {
    id: VehicleId,
    category: VehicleCategory,
    fuel_kind: FuelKind,
    fuel_in_tank: u32,
    queued_at: Option<Duration>,
}

impl Vehicle {
    /// Constructs a vehicle with `fuel_in_tank` litres already in the tank.
    ///
    /// # Panics
    ///
    /// Panics if the category does not permit the fuel, or the tank holds more than its capacity.
    #[must_use]
    pub fn new(
        id: VehicleId,
        category: VehicleCategory,
        fuel_kind: FuelKind,
        fuel_in_tank: u32,
    ) -> Self {
        assert!(
            category.permitted_fuels().contains(&fuel_kind),
            "{} cannot run on {}",
            category,
            fuel_kind
        );
        assert!(
            fuel_in_tank <= category.tank_capacity(),
            "{} litres exceed the tank capacity of {}",
            fuel_in_tank,
            category
        );
        Self {
            id,
            category,
            fuel_kind,
            fuel_in_tank,
            queued_at: None,
        }
    }

    /// The ID of the vehicle.
    #[must_use]
    pub fn id(&self) -> VehicleId {
        self.id
    }

    /// The category of the vehicle.
    #[must_use]
    pub fn category(&self) -> VehicleCategory {
        self.category
    }

    /// The fuel the vehicle asks for.
    #[must_use]
    pub fn fuel_kind(&self) -> FuelKind {
        self.fuel_kind
    }

    /// Litres in the tank at arrival.
    #[must_use]
    pub fn fuel_in_tank(&self) -> u32 {
        self.fuel_in_tank
    }

    /// Tank capacity in litres.
    #[must_use]
    pub fn tank_capacity(&self) -> u32 {
        self.category.tank_capacity()
    }

    /// Litres needed to fill up the tank.
    #[must_use]
    pub fn volume_needed(&self) -> u32 {
        self.tank_capacity() - self.fuel_in_tank
    }

    /// The time of the simulation when the vehicle joined the queue, or `None` if it is not queued.
    #[must_use]
    pub fn queued_at(&self) -> Option<Duration> {
        self.queued_at
    }

    /// How long the vehicle has been waiting in the queue at time `now`.
    #[must_use]
    pub fn waiting_time(&self, now: Duration) -> Option<Duration> {
        self.queued_at.map(|queued_at| now.saturating_sub(queued_at))
    }

    pub(crate) fn enqueue(&mut self, time: Duration) {
        self.queued_at = Some(time);
    }

    pub(crate) fn dequeue(&mut self) {
        self.queued_at = None;
    }
}

/// Generates vehicles with random attributes and consecutive IDs, starting at 1.
///
/// The generator itself holds no randomness; a random number generator is passed in each time.
#[derive(Debug)]
pub struct VehicleGenerator {
    next_id: u64,
}

impl Default for VehicleGenerator {
    fn default() -> Self {
        Self { next_id: 1 }
    }
}

impl VehicleGenerator {
    /// Generates a new vehicle:
    /// - the category is selected uniformly at random,
    /// - the fuel is selected uniformly from the ones permitted, unless the category has one
    ///   fixed fuel,
    /// - the tank initially holds a whole number of litres below a quarter of its capacity.
    pub fn generate<R: Rng>(&mut self, rng: &mut R) -> Vehicle {
        let category = VehicleCategory::ALL[rng.gen_range(0..VehicleCategory::ALL.len())];
        let fuel_kind = category.fixed_fuel().unwrap_or_else(|| {
            let fuels = category.permitted_fuels();
            fuels[rng.gen_range(0..fuels.len())]
        });
        let max_initial = f64::from(category.tank_capacity()) / 4.0;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let fuel_in_tank = (rng.gen::<f64>() * max_initial).floor() as u32;
        let id = VehicleId(self.next_id);
        self.next_id += 1;
        Vehicle::new(id, category, fuel_kind, fuel_in_tank)
    }

    /// Number of vehicles generated so far.
    #[must_use]
    pub fn generated(&self) -> u64 {
        self.next_id - 1
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaChaRng;

    #[test]
    fn test_catalog() {
        assert_eq!(VehicleCategory::Car.tank_capacity(), 10);
        assert_eq!(VehicleCategory::Van.tank_capacity(), 80);
        assert_eq!(VehicleCategory::Hgv.tank_capacity(), 150);
        assert_eq!(VehicleCategory::Hgv.permitted_fuels(), &[FuelKind::Diesel]);
        assert_eq!(VehicleCategory::Hgv.to_string(), "HGV");
        assert_eq!(FuelKind::Lpg.to_string(), "LPG");
        assert_eq!("LPG".parse::<FuelKind>().unwrap(), FuelKind::Lpg);
    }

    #[test]
    fn test_volume_needed() {
        let vehicle = Vehicle::new(VehicleId(1), VehicleCategory::Car, FuelKind::Unleaded, 2);
        assert_eq!(vehicle.volume_needed(), 8);
        assert_eq!(vehicle.queued_at(), None);
        assert_eq!(vehicle.waiting_time(Duration::from_secs(1)), None);
    }

    #[test]
    fn test_waiting_time() {
        let mut vehicle = Vehicle::new(VehicleId(1), VehicleCategory::Van, FuelKind::Lpg, 0);
        vehicle.enqueue(Duration::from_millis(500));
        assert_eq!(
            vehicle.waiting_time(Duration::from_millis(2600)),
            Some(Duration::from_millis(2100))
        );
        vehicle.dequeue();
        assert_eq!(vehicle.queued_at(), None);
    }

    #[test]
    #[should_panic]
    fn test_forbidden_fuel() {
        let _ = Vehicle::new(VehicleId(1), VehicleCategory::Hgv, FuelKind::Lpg, 0);
    }

    #[test]
    #[should_panic]
    fn test_overfull_tank() {
        let _ = Vehicle::new(VehicleId(1), VehicleCategory::Car, FuelKind::Diesel, 11);
    }

    #[test]
    fn test_generator() {
        let mut rng = ChaChaRng::seed_from_u64(17);
        let mut generator = VehicleGenerator::default();
        assert_eq!(generator.generated(), 0);
        let vehicles: Vec<_> = (0..1000).map(|_| generator.generate(&mut rng)).collect();
        assert_eq!(generator.generated(), 1000);
        for (idx, vehicle) in vehicles.iter().enumerate() {
            assert_eq!(u64::from(vehicle.id()), idx as u64 + 1);
            assert!(vehicle
                .category()
                .permitted_fuels()
                .contains(&vehicle.fuel_kind()));
            assert!(f64::from(vehicle.fuel_in_tank()) < f64::from(vehicle.tank_capacity()) / 4.0);
            if vehicle.category() == VehicleCategory::Hgv {
                assert_eq!(vehicle.fuel_kind(), FuelKind::Diesel);
            }
        }
        for category in &VehicleCategory::ALL {
            assert!(vehicles.iter().any(|v| v.category() == *category));
        }
        assert!(vehicles.iter().any(|v| v.fuel_kind() == FuelKind::Unleaded));
        assert!(vehicles.iter().any(|v| v.fuel_kind() == FuelKind::Lpg));
    }
}
