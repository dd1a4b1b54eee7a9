use std::fmt;

use itertools::Itertools;
use serde::Serialize;

use crate::{Allocate, PumpId};

/// Coordinates of a pump within the forecourt.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct PumpLocation {
    /// Index of the lane in the topology order.
    pub lane: usize,
    /// Position within the lane; position 0 is where vehicles enter the lane.
    pub position: usize,
}

impl PumpLocation {
    /// Constructs a new location.
    #[must_use]
    pub fn new(lane: usize, position: usize) -> Self {
        Self { lane, position }
    }
}

impl fmt::Display for PumpLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.lane, self.position)
    }
}

/// A single fuel pump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pump {
    id: PumpId,
    occupied: bool,
}

impl Pump {
    fn new(id: PumpId) -> Self {
        Self {
            id,
            occupied: false,
        }
    }

    /// The number of the pump.
    #[must_use]
    pub fn id(&self) -> PumpId {
        self.id
    }

    /// Whether a vehicle is currently being fuelled at this pump.
    #[must_use]
    pub fn is_occupied(&self) -> bool {
        self.occupied
    }
}

/// An ordered sequence of pumps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lane {
    pumps: Vec<Pump>,
}

impl Lane {
    /// Pumps in the lane, ordered by position.
    #[must_use]
    pub fn pumps(&self) -> &[Pump] {
        &self.pumps
    }

    /// Number of free pumps at the beginning of the lane, up to the first occupied one.
    #[must_use]
    pub fn leading_free_run(&self) -> usize {
        self.pumps.iter().take_while(|p| !p.occupied).count()
    }
}

/// Fixed arrangement of lanes and pumps.
///
/// The structure never changes after construction; only the occupancy of pumps does.
/// Pumps are numbered lane by lane, and within a lane the numbers decrease with the position,
/// e.g., a 3x3 forecourt looks as follows:
///
/// ```text
/// lane 0: [3, 2, 1]
/// lane 1: [6, 5, 4]
/// lane 2: [9, 8, 7]
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    lanes: Vec<Lane>,
}

impl Topology {
    /// Constructs `num_lanes` lanes with `pumps_per_lane` free pumps each.
    #[must_use]
    pub fn new(num_lanes: usize, pumps_per_lane: usize) -> Self {
        Self::from_lane_sizes(std::iter::repeat(pumps_per_lane).take(num_lanes))
    }

    fn from_lane_sizes<I: IntoIterator<Item = usize>>(sizes: I) -> Self {
        let mut offset = 0;
        let lanes = sizes
            .into_iter()
            .map(|size| {
                let pumps = (0..size)
                    .map(|position| Pump::new(PumpId::from(offset + size - position)))
                    .collect();
                offset += size;
                Lane { pumps }
            })
            .collect();
        Self { lanes }
    }

    /// Constructs a topology with the given occupancy, one vector per lane.
    #[cfg(test)]
    pub(crate) fn with_occupancy(occupancy: &[Vec<bool>]) -> Self {
        let mut topology = Self::from_lane_sizes(occupancy.iter().map(Vec::len));
        for (lane, pumps) in topology.lanes.iter_mut().zip(occupancy) {
            for (pump, &occupied) in lane.pumps.iter_mut().zip(pumps) {
                pump.occupied = occupied;
            }
        }
        topology
    }

    /// Lanes in the scan order.
    #[must_use]
    pub fn lanes(&self) -> &[Lane] {
        &self.lanes
    }

    /// Returns the pump at `location`, or `None` if there is no such pump.
    #[must_use]
    pub fn pump(&self, location: PumpLocation) -> Option<&Pump> {
        self.lanes
            .get(location.lane)
            .and_then(|lane| lane.pumps.get(location.position))
    }

    /// Total number of pumps.
    #[must_use]
    pub fn num_pumps(&self) -> usize {
        self.lanes.iter().map(|lane| lane.pumps.len()).sum()
    }

    /// Number of pumps currently in use.
    #[must_use]
    pub fn num_occupied(&self) -> usize {
        self.lanes
            .iter()
            .flat_map(|lane| &lane.pumps)
            .filter(|pump| pump.occupied)
            .count()
    }

    fn pump_mut(&mut self, location: PumpLocation) -> &mut Pump {
        self.lanes
            .get_mut(location.lane)
            .and_then(|lane| lane.pumps.get_mut(location.position))
            .unwrap_or_else(|| panic!("no pump at location {}", location))
    }

    /// Marks the pump at `location` as occupied and returns its ID.
    ///
    /// # Panics
    ///
    /// Panics if the location is out of bounds or the pump is already occupied.
    pub fn occupy(&mut self, location: PumpLocation) -> PumpId {
        let pump = self.pump_mut(location);
        assert!(!pump.occupied, "pump {} is already occupied", pump.id);
        pump.occupied = true;
        pump.id
    }

    /// Marks the pump at `location` as free and returns its ID.
    ///
    /// # Panics
    ///
    /// Panics if the location is out of bounds or the pump is not occupied.
    pub fn release(&mut self, location: PumpLocation) -> PumpId {
        let pump = self.pump_mut(location);
        assert!(pump.occupied, "pump {} is not occupied", pump.id);
        pump.occupied = false;
        pump.id
    }

    /// Asks `allocator` for a pump and occupies it in one go.
    pub fn claim<A: Allocate + ?Sized>(&mut self, allocator: &A) -> Option<PumpLocation> {
        let location = allocator.select_pump(self)?;
        self.occupy(location);
        Some(location)
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            self.lanes.iter().format_with(" ", |lane, f| {
                f(&format_args!(
                    "[{}]",
                    lane.pumps.iter().format_with(" ", |pump, f| {
                        if pump.occupied {
                            f(&format_args!("{}*", pump.id))
                        } else {
                            f(&pump.id)
                        }
                    })
                ))
            })
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn ids(lane: &Lane) -> Vec<usize> {
        lane.pumps().iter().map(|p| usize::from(p.id())).collect()
    }

    #[test]
    fn test_numbering() {
        let topology = Topology::new(3, 3);
        assert_eq!(topology.num_pumps(), 9);
        assert_eq!(ids(&topology.lanes()[0]), vec![3, 2, 1]);
        assert_eq!(ids(&topology.lanes()[1]), vec![6, 5, 4]);
        assert_eq!(ids(&topology.lanes()[2]), vec![9, 8, 7]);
        assert_eq!(topology.num_occupied(), 0);
    }

    #[test]
    fn test_leading_free_run() {
        let topology = Topology::with_occupancy(&[
            vec![false, false, false],
            vec![false, true, false],
            vec![true, false, false],
        ]);
        let runs: Vec<_> = topology
            .lanes()
            .iter()
            .map(Lane::leading_free_run)
            .collect();
        assert_eq!(runs, vec![3, 1, 0]);
    }

    #[test]
    fn test_occupy_release() {
        let mut topology = Topology::new(2, 2);
        let location = PumpLocation::new(1, 0);
        assert_eq!(topology.occupy(location), PumpId::from(4));
        assert!(topology.pump(location).unwrap().is_occupied());
        assert_eq!(topology.num_occupied(), 1);
        assert_eq!(topology.to_string(), "[2 1] [4* 3]");
        assert_eq!(topology.release(location), PumpId::from(4));
        assert!(!topology.pump(location).unwrap().is_occupied());
        assert_eq!(topology.num_occupied(), 0);
    }

    #[test]
    #[should_panic]
    fn test_occupy_twice() {
        let mut topology = Topology::new(1, 1);
        topology.occupy(PumpLocation::new(0, 0));
        topology.occupy(PumpLocation::new(0, 0));
    }

    #[test]
    #[should_panic]
    fn test_release_free() {
        let mut topology = Topology::new(1, 1);
        topology.release(PumpLocation::new(0, 0));
    }

    #[test]
    fn test_pump_out_of_bounds() {
        let topology = Topology::new(3, 3);
        assert!(topology.pump(PumpLocation::new(3, 0)).is_none());
        assert!(topology.pump(PumpLocation::new(0, 3)).is_none());
    }
}
