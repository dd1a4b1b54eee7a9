//! Deterministic distributions for driving simulations in tests.

#![warn(
    missing_docs,
    rust_2018_idioms,
    trivial_casts,
    trivial_numeric_casts,
    unused_import_braces,
    unused_qualifications
)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::default_trait_access)]

use std::cell::Cell;

use rand::distributions::Distribution;

/// This distribution ignores the random number generator and always produces the same value.
///
/// Handy for arrival processes with a fixed period, e.g., a vehicle every 1500 milliseconds.
pub struct Constant<T>(T);

impl<T> Constant<T> {
    /// Constructs a distribution always returning `value`.
    pub fn new(value: T) -> Self {
        Self(value)
    }
}

impl<T: Copy> Distribution<T> for Constant<T> {
    fn sample<R: rand::Rng + ?Sized>(&self, _: &mut R) -> T {
        self.0
    }
}

/// Replays the given values in order, starting over once all of them were produced.
///
/// ```
/// # use rand::distributions::Distribution;
/// # use testing::Cycle;
/// let mut rng = rand::rngs::mock::StepRng::new(0, 1);
/// let dist = Cycle::new(vec![3, 1, 2]);
/// let values: Vec<u64> = (0..5).map(|_| dist.sample(&mut rng)).collect();
/// assert_eq!(values, vec![3, 1, 2, 3, 1]);
/// ```
pub struct Cycle<T> {
    values: Vec<T>,
    next: Cell<usize>,
}

impl<T> Cycle<T> {
    /// Constructs a distribution cycling over `values`.
    ///
    /// # Panics
    ///
    /// Panics if `values` is empty.
    pub fn new(values: Vec<T>) -> Self {
        assert!(!values.is_empty(), "cannot cycle over an empty sequence");
        Self {
            values,
            next: Cell::new(0),
        }
    }
}

impl<T: Copy> Distribution<T> for Cycle<T> {
    fn sample<R: rand::Rng + ?Sized>(&self, _: &mut R) -> T {
        let idx = self.next.get();
        self.next.replace((idx + 1) % self.values.len());
        self.values[idx]
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::rngs::mock::StepRng;

    #[test]
    fn test_constant() {
        let mut rng = StepRng::new(7, 3);
        let dist = Constant::new(1500_u64);
        assert!((0..10).all(|_| dist.sample(&mut rng) == 1500));
    }

    #[test]
    fn test_cycle() {
        let mut rng = StepRng::new(0, 1);
        let dist = Cycle::new(vec![2200_u64, 1500]);
        assert_eq!(dist.sample(&mut rng), 2200);
        assert_eq!(dist.sample(&mut rng), 1500);
        assert_eq!(dist.sample(&mut rng), 2200);
    }

    #[test]
    #[should_panic]
    fn test_empty_cycle() {
        let _ = Cycle::<u64>::new(Vec::new());
    }
}
