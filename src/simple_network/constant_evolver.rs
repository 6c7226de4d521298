//! Definition of the `ConstantNetworkEvolver`, which keeps every specimen fully connected.

use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::evolution::Evolver;
use crate::simple_network::{NetworkError, SimpleNetwork};
use crate::utils::random::{roll_percentage, SharedGenerator};


/// How a [`ConstantNetworkEvolver`] combines the weights of two parents.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MateStrategy {
    /// Every edge gets the mean of the parents' weights.
    #[default]
    AverageWeights,

    /// Every edge gets the weight of a randomly chosen parent.
    RandomMerge,
}


/// Options of a [`ConstantNetworkEvolver`].
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct ConstantEvolverOptions {
    pub layer_sizes: Vec<usize>,
    /// Probability of each edge changing its weight in a mutation.
    pub mutate_chance: f64,
    pub mutate_stddev: f64,
    pub mate_strategy: MateStrategy,
}


impl Default for ConstantEvolverOptions {
    fn default() -> Self {
        Self {
            layer_sizes: Vec::new(),
            mutate_chance: 0.5,
            mutate_stddev: 0.5,
            mate_strategy: MateStrategy::default(),
        }
    }
}


impl ConstantEvolverOptions {
    pub fn new(layer_sizes: Vec<usize>) -> Self {
        Self { layer_sizes, ..Self::default() }
    }
}


/// Evolves complete networks of constant layer sizes. Only the weights of edges ever change.
///
/// Initial weights are uniform in [-1, 1]. Mutated weights are not bounded.
pub struct ConstantNetworkEvolver<R = SharedGenerator> {
    options: ConstantEvolverOptions,
    template: SimpleNetwork,
    weight_change: Normal<f64>,
    rng: R,
}


impl ConstantNetworkEvolver<SharedGenerator> {
    pub fn new(options: ConstantEvolverOptions) -> Result<Self, NetworkError> {
        Self::with_rng(options, SharedGenerator)
    }
}


impl<R: Rng> ConstantNetworkEvolver<R> {
    /// # Errors
    /// If the layer sizes do not describe a valid network or the standard deviation is negative or
    /// not finite.
    pub fn with_rng(options: ConstantEvolverOptions, rng: R) -> Result<Self, NetworkError> {
        let template = SimpleNetwork::new(&options.layer_sizes)?;
        let stddev = options.mutate_stddev;
        if !stddev.is_finite() {
            return Err(NetworkError::InvalidStddev(stddev));
        }
        let weight_change = Normal::new(0., stddev).map_err(|_| NetworkError::InvalidStddev(stddev))?;
        Ok(Self { options, template, weight_change, rng })
    }

    pub fn options(&self) -> &ConstantEvolverOptions {
        &self.options
    }
}


impl<R: Rng> Evolver<SimpleNetwork> for ConstantNetworkEvolver<R> {
    fn initial_specimen(&mut self) -> SimpleNetwork {
        let mut specimen = self.template.clone();
        for edge in specimen.all_edges() {
            specimen.add_connection(&edge, self.rng.gen_range(-1f64..=1f64));
        }
        specimen
    }

    /// Combines the parents' weights edge by edge. Missing edges count as weight zero.
    ///
    /// # Panics
    /// If the parents do not have the same layer sizes.
    fn mate(&mut self, father: &SimpleNetwork, mother: &SimpleNetwork) -> SimpleNetwork {
        assert_eq!(
            father.layer_sizes(), mother.layer_sizes(),
            "both parents must have the same layer sizes",
        );
        let mut offspring = father.disconnected();
        for edge in offspring.all_edges() {
            let father_weight = father.connection_weight(&edge).unwrap_or(0.);
            let mother_weight = mother.connection_weight(&edge).unwrap_or(0.);
            let weight = match self.options.mate_strategy {
                MateStrategy::AverageWeights => (father_weight + mother_weight) / 2.,
                MateStrategy::RandomMerge => {
                    if roll_percentage(&mut self.rng, 0.5) { father_weight } else { mother_weight }
                },
            };
            offspring.add_connection(&edge, weight);
        }
        offspring
    }

    /// Shifts each weight with `mutate_chance` by a normally distributed amount.
    fn mutate(&mut self, specimen: &SimpleNetwork) -> SimpleNetwork {
        let mut mutated = specimen.clone();
        for edge in specimen.all_edges() {
            if roll_percentage(&mut self.rng, self.options.mutate_chance) {
                let weight = specimen.connection_weight(&edge).unwrap_or(0.);
                mutated.add_connection(&edge, weight + self.weight_change.sample(&mut self.rng));
            }
        }
        mutated
    }
}


#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn seeded(options: ConstantEvolverOptions, seed: u64) -> ConstantNetworkEvolver<StdRng> {
        ConstantNetworkEvolver::with_rng(options, StdRng::seed_from_u64(seed)).unwrap()
    }

    #[test]
    fn test_options_defaults() {
        let options: ConstantEvolverOptions = serde_json::from_str(
            r#"{"layer_sizes": [2, 2], "mate_strategy": "random_merge"}"#,
        ).unwrap();
        assert_eq!(options.mutate_chance, 0.5);
        assert_eq!(options.mutate_stddev, 0.5);
        assert_eq!(options.mate_strategy, MateStrategy::RandomMerge);
        let options = ConstantEvolverOptions { mutate_stddev: -0.5, ..ConstantEvolverOptions::new(vec![2, 2]) };
        assert_eq!(ConstantNetworkEvolver::new(options).err(), Some(NetworkError::InvalidStddev(-0.5)));
    }

    #[test]
    fn test_initial_specimen_is_complete() {
        let mut evolver = seeded(ConstantEvolverOptions::new(vec![3, 4, 2]), 1);
        let specimen = evolver.initial_specimen();
        assert_eq!(specimen.edge_count(), 3 * 4 + 4 * 2);
        for edge in specimen.all_edges() {
            assert!((-1. ..=1.).contains(&specimen.connection_weight(&edge).unwrap()));
        }
    }

    #[test]
    fn test_mate_average_weights() {
        let mut evolver = seeded(ConstantEvolverOptions::new(vec![2, 1]), 2);
        let father = evolver.initial_specimen();
        let mother = evolver.initial_specimen();
        let child = evolver.mate(&father, &mother);
        for edge in child.all_edges() {
            let expected = (father.connection_weight(&edge).unwrap() + mother.connection_weight(&edge).unwrap()) / 2.;
            assert_eq!(child.connection_weight(&edge), Some(expected));
        }
    }

    #[test]
    fn test_mate_random_merge() {
        let options = ConstantEvolverOptions {
            mate_strategy: MateStrategy::RandomMerge,
            ..ConstantEvolverOptions::new(vec![50, 2])
        };
        let mut evolver = seeded(options, 3);
        let mut father = evolver.template.clone();
        let mut mother = evolver.template.clone();
        for edge in father.all_edges() {
            father.add_connection(&edge, 1.);
            mother.add_connection(&edge, -1.);
        }
        let child = evolver.mate(&father, &mother);
        assert_eq!(child.edge_count(), 100);
        let from_father = child.edges_where(|edge| child.connection_weight(edge) == Some(1.)).len();
        assert!((20..80).contains(&from_father), "{from_father}");
    }

    #[test]
    fn test_mutate_only_changes_weights() {
        let options = ConstantEvolverOptions { mutate_chance: 1., ..ConstantEvolverOptions::new(vec![3, 3]) };
        let mut evolver = seeded(options, 4);
        let specimen = evolver.initial_specimen();
        let mutated = evolver.mutate(&specimen);
        assert_eq!(mutated.edge_count(), specimen.edge_count());
        let changed = mutated.edges_where(|edge| mutated.connection_weight(edge) != specimen.connection_weight(edge));
        assert_eq!(changed.len(), 9);

        let options = ConstantEvolverOptions { mutate_chance: 0., ..ConstantEvolverOptions::new(vec![3, 3]) };
        let mut evolver = seeded(options, 5);
        assert_eq!(evolver.mutate(&specimen), specimen);
    }
}
