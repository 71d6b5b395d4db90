use std::collections::BTreeMap;
use std::fmt;

const THRESHOLD_ACCURACY: f64 = 1e-6;

/// Probabilities at or below this are treated as numerical noise from the LP solver
/// and dropped from the support.
pub const SUPPORT_THRESHOLD: f64 = 1e-9;

/// A mixed strategy over the pure strategies of one player, stored sparsely as its
/// support. Only indices with strictly positive mass are kept, ordered by index.
#[derive(Debug, Clone, PartialEq)]
pub struct MixedStrategy {
    num_pure_strategies: usize,
    support: BTreeMap<usize, f64>,
}

impl MixedStrategy {
    /// Keeps the entries of `probabilities` strictly above `threshold` and rescales them
    /// so that they sum to one. Returns `None` if nothing above the threshold remains.
    pub fn from_dense(probabilities: &[f64], threshold: f64) -> Option<MixedStrategy> {
        let support = probabilities
            .iter()
            .enumerate()
            .filter(|(_, p)| **p > threshold)
            .map(|(index, p)| (index, *p))
            .collect::<BTreeMap<usize, f64>>();
        Self::normalized(probabilities.len(), support)
    }

    /// Builds a strategy from `(index, weight)` pairs, summing duplicate indices and
    /// rescaling the total weight to one.
    pub fn from_weights<I>(num_pure_strategies: usize, weights: I) -> Option<MixedStrategy>
    where
        I: IntoIterator<Item = (usize, f64)>,
    {
        let mut support = BTreeMap::<usize, f64>::new();
        for (index, weight) in weights {
            assert!(index < num_pure_strategies, "pure strategy {} out of range", index);
            *support.entry(index).or_insert(0.0) += weight;
        }
        support.retain(|_, weight| *weight > 0.0);
        Self::normalized(num_pure_strategies, support)
    }

    pub fn pure(num_pure_strategies: usize, index: usize) -> MixedStrategy {
        assert!(index < num_pure_strategies);
        let mut support = BTreeMap::new();
        support.insert(index, 1.0);
        MixedStrategy {
            num_pure_strategies,
            support,
        }
    }

    pub fn uniform(num_pure_strategies: usize) -> MixedStrategy {
        assert!(num_pure_strategies > 0);
        let prob = 1.0 / (num_pure_strategies as f64);
        let strategy = MixedStrategy {
            num_pure_strategies,
            support: (0..num_pure_strategies).map(|index| (index, prob)).collect(),
        };
        strategy.validate();
        strategy
    }

    fn normalized(
        num_pure_strategies: usize,
        mut support: BTreeMap<usize, f64>,
    ) -> Option<MixedStrategy> {
        let total_mass = support.values().sum::<f64>();
        if support.is_empty() || total_mass <= 0.0 {
            return None;
        }
        for prob in support.values_mut() {
            *prob /= total_mass;
        }
        let strategy = MixedStrategy {
            num_pure_strategies,
            support,
        };
        strategy.validate();
        Some(strategy)
    }

    /// Validate if this is a legitimate mixed strategy. Panics upon failure.
    pub fn validate(&self) {
        assert!(!self.support.is_empty(), "mixed strategy has empty support");
        for (&index, &prob) in self.support.iter() {
            assert!(index < self.num_pure_strategies);
            assert!(prob > 0.0, "probability {} at {} is not positive", prob, index);
        }
        assert!(
            abs_diff_eq!(self.total_mass(), 1.0, epsilon = THRESHOLD_ACCURACY),
            "mixed strategy has total mass {}",
            self.total_mass()
        );
    }

    pub fn num_pure_strategies(&self) -> usize {
        self.num_pure_strategies
    }

    pub fn probability(&self, index: usize) -> f64 {
        self.support.get(&index).cloned().unwrap_or(0.0)
    }

    pub fn support(&self) -> &BTreeMap<usize, f64> {
        &self.support
    }

    pub fn support_size(&self) -> usize {
        self.support.len()
    }

    pub fn is_pure(&self) -> bool {
        self.support.len() == 1
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.support.iter().map(|(&index, &prob)| (index, prob))
    }

    pub fn total_mass(&self) -> f64 {
        self.support.values().sum()
    }

    pub fn to_dense(&self) -> Vec<f64> {
        let mut dense = vec![0f64; self.num_pure_strategies];
        for (index, prob) in self.iter() {
            dense[index] = prob;
        }
        dense
    }

    /// Largest absolute difference in probability between two strategies over the
    /// same pure strategies.
    pub fn max_difference(&self, other: &MixedStrategy) -> f64 {
        assert_eq!(self.num_pure_strategies, other.num_pure_strategies);
        self.support
            .keys()
            .chain(other.support.keys())
            .map(|&index| (self.probability(index) - other.probability(index)).abs())
            .fold(0f64, f64::max)
    }
}

impl fmt::Display for MixedStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (index, prob) in self.iter() {
            if !first {
                write!(f, " ")?;
            }
            write!(f, "{}:{:.3}", index, prob)?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn from_dense_drops_noise() {
        let strategy = MixedStrategy::from_dense(&[0.5, 1e-12, -1e-14, 0.5], SUPPORT_THRESHOLD)
            .unwrap();
        assert_eq!(strategy.support_size(), 2);
        assert_eq!(strategy.num_pure_strategies(), 4);
        assert_approx_eq!(strategy.probability(0), 0.5);
        assert_approx_eq!(strategy.probability(1), 0.0);
        assert_approx_eq!(strategy.probability(3), 0.5);
        assert_approx_eq!(strategy.total_mass(), 1.0);
    }

    #[test]
    fn from_dense_renormalizes() {
        let strategy = MixedStrategy::from_dense(&[0.2, 0.2, 0.0], SUPPORT_THRESHOLD).unwrap();
        assert_approx_eq!(strategy.probability(0), 0.5);
        assert_approx_eq!(strategy.probability(1), 0.5);
    }

    #[test]
    fn from_dense_without_mass() {
        assert!(MixedStrategy::from_dense(&[0.0, 1e-11], SUPPORT_THRESHOLD).is_none());
        assert!(MixedStrategy::from_dense(&[], SUPPORT_THRESHOLD).is_none());
    }

    #[test]
    fn from_weights_accumulates() {
        let strategy = MixedStrategy::from_weights(3, vec![(2, 1.0), (0, 2.0), (2, 1.0)]).unwrap();
        assert_approx_eq!(strategy.probability(0), 0.5);
        assert_approx_eq!(strategy.probability(2), 0.5);
        assert_eq!(strategy.to_string(), "0:0.500 2:0.500");
    }

    #[test]
    fn pure_and_uniform() {
        let pure = MixedStrategy::pure(3, 1);
        assert!(pure.is_pure());
        assert_eq!(pure.to_dense(), vec![0.0, 1.0, 0.0]);

        let uniform = MixedStrategy::uniform(4);
        assert_approx_eq!(uniform.probability(3), 0.25);
        assert_approx_eq!(pure.max_difference(&MixedStrategy::uniform(3)), 2.0 / 3.0);
    }

    #[test]
    #[should_panic]
    fn invalid_mass_panics() {
        let mut support = BTreeMap::new();
        support.insert(0, 0.3);
        MixedStrategy {
            num_pure_strategies: 2,
            support,
        }
        .validate();
    }
}
