use serde::{Deserialize, Serialize};

use crate::{PumpLocation, Topology};

/// Implementors are allocation policies that select a pump for a vehicle.
///
/// Selection is read-only: the caller is responsible for occupying the returned pump, see
/// [`Topology::claim`].
pub trait Allocate {
    /// Selects a free pump, or returns `None` if the policy finds no pump available.
    fn select_pump(&self, topology: &Topology) -> Option<PumpLocation>;
}

/// Sends vehicles as deep into the forecourt as they can drive.
///
/// A vehicle can reach only the free pumps at the start of a lane, up to the first occupied one,
/// because it cannot pass a vehicle that is being fuelled. Among all reachable pumps, this policy
/// selects the one with the highest position, and resolves ties in favor of the lane that comes
/// first. If the first pump of every lane is occupied, no pump is available, even if some pumps
/// further down the lanes are free.
#[derive(Debug, Default, Clone, Copy)]
pub struct DeepestRunAllocator;

impl Allocate for DeepestRunAllocator {
    fn select_pump(&self, topology: &Topology) -> Option<PumpLocation> {
        let mut best: Option<PumpLocation> = None;
        for (lane_idx, lane) in topology.lanes().iter().enumerate() {
            for (position, pump) in lane.pumps().iter().enumerate() {
                if pump.is_occupied() {
                    break;
                }
                if best.map_or(true, |best| best.position < position) {
                    best = Some(PumpLocation::new(lane_idx, position));
                }
            }
        }
        best
    }
}

/// Selects the first free pump in the scan order, regardless of occupied pumps in front of it.
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstFreeAllocator;

impl Allocate for FirstFreeAllocator {
    fn select_pump(&self, topology: &Topology) -> Option<PumpLocation> {
        topology
            .lanes()
            .iter()
            .enumerate()
            .find_map(|(lane_idx, lane)| {
                lane.pumps()
                    .iter()
                    .position(|pump| !pump.is_occupied())
                    .map(|position| PumpLocation::new(lane_idx, position))
            })
    }
}

/// Type of allocation policy.
#[derive(
    Debug,
    PartialEq,
    Eq,
    Clone,
    Copy,
    strum::EnumString,
    strum::Display,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AllocatorOption {
    /// See [`DeepestRunAllocator`].
    DeepestRun,

    /// See [`FirstFreeAllocator`].
    FirstFree,
}

impl Default for AllocatorOption {
    fn default() -> Self {
        Self::DeepestRun
    }
}

impl AllocatorOption {
    /// Returns the allocation policy of this type.
    #[must_use]
    pub fn allocator(self) -> Box<dyn Allocate> {
        match self {
            Self::DeepestRun => Box::new(DeepestRunAllocator),
            Self::FirstFree => Box::new(FirstFreeAllocator),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use quickcheck::{Arbitrary, Gen};
    use quickcheck_macros::quickcheck;

    const F: bool = false;
    const O: bool = true;

    fn select(occupancy: &[Vec<bool>]) -> Option<PumpLocation> {
        DeepestRunAllocator.select_pump(&Topology::with_occupancy(occupancy))
    }

    #[test]
    fn test_all_free() {
        let topology = Topology::new(3, 3);
        let location = DeepestRunAllocator.select_pump(&topology);
        assert_eq!(location, Some(PumpLocation::new(0, 2)));
        assert_eq!(
            topology.pump(location.unwrap()).map(|p| usize::from(p.id())),
            Some(1)
        );
    }

    #[test]
    fn test_scan_stops_at_occupied() {
        assert_eq!(
            select(&[vec![F, O, F], vec![O, O, O], vec![O, O, O]]),
            Some(PumpLocation::new(0, 0))
        );
    }

    #[test]
    fn test_deeper_lane_wins() {
        assert_eq!(
            select(&[vec![F, O, F], vec![F, F, O], vec![O, F, F]]),
            Some(PumpLocation::new(1, 1))
        );
        assert_eq!(
            select(&[vec![F, O, O], vec![O, F, F], vec![F, F, F]]),
            Some(PumpLocation::new(2, 2))
        );
    }

    #[test]
    fn test_ties_go_to_first_lane() {
        assert_eq!(
            select(&[vec![O, F, F], vec![F, F, O], vec![F, F, O]]),
            Some(PumpLocation::new(1, 1))
        );
        assert_eq!(
            select(&[vec![F, O, O], vec![F, O, O], vec![F, O, O]]),
            Some(PumpLocation::new(0, 0))
        );
    }

    #[test]
    fn test_no_pump_when_entries_blocked() {
        assert_eq!(select(&[vec![O, F, F], vec![O, F, F], vec![O, F, F]]), None);
        assert_eq!(select(&[vec![O, O, O], vec![O, O, O], vec![O, O, O]]), None);
    }

    #[test]
    fn test_first_free() {
        let topology = Topology::with_occupancy(&[vec![O, O, O], vec![O, F, F], vec![F, F, F]]);
        assert_eq!(
            FirstFreeAllocator.select_pump(&topology),
            Some(PumpLocation::new(1, 1))
        );
        let topology = Topology::with_occupancy(&[vec![O, O], vec![O, O]]);
        assert_eq!(FirstFreeAllocator.select_pump(&topology), None);
    }

    #[test]
    fn test_allocator_option() {
        assert_eq!(
            "deepest_run".parse::<AllocatorOption>().unwrap(),
            AllocatorOption::DeepestRun
        );
        assert_eq!(
            "first_free".parse::<AllocatorOption>().unwrap(),
            AllocatorOption::FirstFree
        );
        assert!("random".parse::<AllocatorOption>().is_err());
        assert_eq!(AllocatorOption::default().to_string(), "deepest_run");
    }

    /// Occupancy of a forecourt with a random shape.
    #[derive(Debug, Clone)]
    struct Occupancy(Vec<Vec<bool>>);

    impl Arbitrary for Occupancy {
        fn arbitrary(g: &mut Gen) -> Self {
            let num_lanes = usize::arbitrary(g) % 5 + 1;
            let pumps_per_lane = usize::arbitrary(g) % 5 + 1;
            Occupancy(
                (0..num_lanes)
                    .map(|_| (0..pumps_per_lane).map(|_| bool::arbitrary(g)).collect())
                    .collect(),
            )
        }
    }

    #[quickcheck]
    fn selected_pump_is_free(occupancy: Occupancy) -> bool {
        let topology = Topology::with_occupancy(&occupancy.0);
        [
            DeepestRunAllocator.select_pump(&topology),
            FirstFreeAllocator.select_pump(&topology),
        ]
        .iter()
        .flatten()
        .all(|&location| !topology.pump(location).unwrap().is_occupied())
    }

    #[quickcheck]
    fn selection_is_deterministic(occupancy: Occupancy) -> bool {
        let topology = Topology::with_occupancy(&occupancy.0);
        let first = DeepestRunAllocator.select_pump(&topology);
        (0..5).all(|_| DeepestRunAllocator.select_pump(&topology.clone()) == first)
    }

    #[quickcheck]
    fn selects_end_of_longest_leading_run(occupancy: Occupancy) -> bool {
        let topology = Topology::with_occupancy(&occupancy.0);
        let runs: Vec<_> = topology
            .lanes()
            .iter()
            .map(|lane| lane.leading_free_run())
            .collect();
        let longest = runs.iter().copied().max().unwrap_or(0);
        let expected = runs
            .iter()
            .position(|&run| run == longest && run > 0)
            .map(|lane| PumpLocation::new(lane, longest - 1));
        DeepestRunAllocator.select_pump(&topology) == expected
    }
}
