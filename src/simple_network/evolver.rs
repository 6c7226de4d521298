//! Definition of the `SimpleNetworkEvolver`, an [`Evolver`] for [`SimpleNetwork`] specimens.

use std::collections::BTreeMap;

use log::trace;
use rand::Rng;
use rand::seq::SliceRandom;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::evolution::Evolver;
use crate::simple_network::{Edge, NetworkError, Node, SimpleNetwork};
use crate::utils::random::{choose_weighted_key, roll_percentage, SharedGenerator, WeightedSampler};


/// Options of a [`SimpleNetworkEvolver`].
///
/// Missing fields are filled in from the defaults when deserializing.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct EvolverOptions {
    /// Number of nodes on each layer of every specimen.
    pub layer_sizes: Vec<usize>,

    /// Probability of a mutation adding or removing edges.
    pub mutation_grow_chance: f64,

    /// Relative probabilities of the number of edges to add (positive) or remove (negative)
    /// in a growth mutation.
    pub mutation_grow_probabilities: BTreeMap<i32, f64>,

    /// Probability of each edge changing its weight in a mutation.
    pub mutation_weight_chance: f64,

    /// Standard deviation of a weight change.
    pub mutation_weight_stddev: f64,
}


impl Default for EvolverOptions {
    fn default() -> Self {
        Self {
            layer_sizes: Vec::new(),
            mutation_grow_chance: 0.,
            mutation_grow_probabilities: BTreeMap::from([(-1, 0.5), (1, 0.5)]),
            mutation_weight_chance: 0.,
            mutation_weight_stddev: 1.,
        }
    }
}


impl EvolverOptions {
    pub fn new(layer_sizes: Vec<usize>) -> Self {
        Self { layer_sizes, ..Self::default() }
    }
}


/// Creates, mates and mutates [`SimpleNetwork`] specimens with fixed layer sizes.
///
/// All weights created by this evolver lie in the interval [-1, 1].
pub struct SimpleNetworkEvolver<R = SharedGenerator> {
    options: EvolverOptions,
    template: SimpleNetwork,
    weight_change: Normal<f64>,
    rng: R,
}


impl SimpleNetworkEvolver<SharedGenerator> {
    /// Constructs an evolver drawing from the process-wide random number generator.
    ///
    /// # Errors
    /// See [`SimpleNetworkEvolver::with_rng`].
    pub fn new(options: EvolverOptions) -> Result<Self, NetworkError> {
        Self::with_rng(options, SharedGenerator)
    }
}


impl<R: Rng> SimpleNetworkEvolver<R> {
    /// Constructs an evolver drawing from a specific random number generator.
    ///
    /// # Arguments
    /// * `options` - Options of the evolver.
    /// * `rng` - Source of all randomness used by the evolver.
    ///
    /// # Errors
    /// If the layer sizes do not describe a valid network, the standard deviation is negative or
    /// not finite, or a growth probability is negative or not finite.
    pub fn with_rng(options: EvolverOptions, rng: R) -> Result<Self, NetworkError> {
        let template = SimpleNetwork::new(&options.layer_sizes)?;
        let stddev = options.mutation_weight_stddev;
        if !stddev.is_finite() {
            return Err(NetworkError::InvalidStddev(stddev));
        }
        let weight_change = Normal::new(0., stddev).map_err(|_| NetworkError::InvalidStddev(stddev))?;
        WeightedSampler::new(options.mutation_grow_probabilities.values().copied().collect())?;
        Ok(Self { options, template, weight_change, rng })
    }

    pub fn options(&self) -> &EvolverOptions {
        &self.options
    }

    /// Returns a random path between two nodes, ordered from `from` to `to`.
    ///
    /// Every intermediate node is chosen uniformly from its layer. The path is empty if `to` is not
    /// on a later layer than `from`.
    fn random_path(&mut self, network: &SimpleNetwork, from: Node, to: Node) -> Vec<Edge> {
        let mut path = Vec::with_capacity(to.layer.saturating_sub(from.layer));
        let mut current = to;
        while current.layer > from.layer + 1 {
            let layer = current.layer - 1;
            let intermediate = Node::new(layer, self.rng.gen_range(0..network.layer_size(layer)));
            path.push(Edge::new(intermediate, current));
            current = intermediate;
        }
        if current.layer == from.layer + 1 {
            path.push(Edge::new(from, current));
        }
        path.reverse();
        path
    }

    fn random_weight(&mut self) -> f64 {
        self.rng.gen_range(-1f64..=1f64)
    }

    /// Adds or removes a randomly chosen number of edges.
    fn mutate_growth(&mut self, specimen: &mut SimpleNetwork) {
        let chosen = choose_weighted_key(&self.options.mutation_grow_probabilities, &mut self.rng)
            .expect("growth probabilities are validated on construction");
        let Some(&growth) = chosen else {
            trace!("no growth probabilities configured");
            return;
        };
        trace!("growing network by {growth} edges");
        for _ in 0..growth.unsigned_abs() {
            if growth < 0 {
                self.remove_random_edge(specimen);
            } else {
                self.add_random_edge(specimen);
            }
        }
    }

    fn add_random_edge(&mut self, specimen: &mut SimpleNetwork) {
        let missing = specimen.edges_where(|edge| !specimen.has_connection(edge));
        if let Some(edge) = missing.choose(&mut self.rng).copied() {
            let weight = self.random_weight();
            specimen.add_connection(&edge, weight);
        }
    }

    fn remove_random_edge(&mut self, specimen: &mut SimpleNetwork) {
        let existing = specimen.edges_where(|edge| specimen.has_connection(edge));
        if let Some(edge) = existing.choose(&mut self.rng) {
            specimen.remove_connection(edge);
        }
    }

    /// Shifts the weight of an edge by a normally distributed amount, clamped to [-1, 1].
    fn mutate_weight(&mut self, specimen: &mut SimpleNetwork, edge: &Edge) {
        let change = self.weight_change.sample(&mut self.rng);
        let weight = specimen.connection_weight(edge).unwrap_or(0.);
        specimen.add_connection(edge, (weight + change).clamp(-1., 1.));
    }
}


impl<R: Rng> Evolver<SimpleNetwork> for SimpleNetworkEvolver<R> {
    /// Returns a network with one random path from a random input node to each output node.
    fn initial_specimen(&mut self) -> SimpleNetwork {
        let mut specimen = self.template.clone();
        let output_layer = specimen.layer_count() - 1;
        for to in specimen.nodes_on_layer(output_layer) {
            let from = Node::new(0, self.rng.gen_range(0..specimen.layer_size(0)));
            for edge in self.random_path(&specimen, from, to) {
                let weight = self.random_weight();
                specimen.add_connection(&edge, weight);
            }
        }
        specimen
    }

    /// Copies every edge from the father or the mother with equal probability.
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
            let parent = if roll_percentage(&mut self.rng, 0.5) { father } else { mother };
            if let Some(weight) = parent.connection_weight(&edge) {
                offspring.add_connection(&edge, weight);
            }
        }
        offspring
    }

    /// Possibly grows or shrinks the specimen, then possibly changes the weight of each edge that
    /// it shares with the original.
    ///
    /// Edges removed by the growth step stay removed; the weight step never re-creates them.
    fn mutate(&mut self, specimen: &SimpleNetwork) -> SimpleNetwork {
        let mut mutated = specimen.clone();
        if roll_percentage(&mut self.rng, self.options.mutation_grow_chance) {
            self.mutate_growth(&mut mutated);
        }
        let kept = mutated.edges_where(|edge| specimen.has_connection(edge) && mutated.has_connection(edge));
        for edge in kept {
            if roll_percentage(&mut self.rng, self.options.mutation_weight_chance) {
                self.mutate_weight(&mut mutated, &edge);
            }
        }
        mutated
    }
}


#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use crate::utils::random::WeightError;

    use super::*;

    fn seeded(options: EvolverOptions, seed: u64) -> SimpleNetworkEvolver<StdRng> {
        SimpleNetworkEvolver::with_rng(options, StdRng::seed_from_u64(seed)).unwrap()
    }

    #[test]
    fn test_options_defaults() {
        let options: EvolverOptions = serde_json::from_str(r#"{"layer_sizes": [3, 2]}"#).unwrap();
        assert_eq!(options, EvolverOptions::new(vec![3, 2]));
        assert_eq!(options.mutation_grow_chance, 0.);
        assert_eq!(options.mutation_weight_stddev, 1.);
        assert_eq!(options.mutation_grow_probabilities.get(&-1), Some(&0.5));
        assert_eq!(options.mutation_grow_probabilities.get(&1), Some(&0.5));
    }

    #[test]
    fn test_invalid_options() {
        assert_eq!(
            SimpleNetworkEvolver::new(EvolverOptions::new(vec![3])).err(),
            Some(NetworkError::TooFewLayers(1)),
        );
        let options = EvolverOptions { mutation_weight_stddev: -1., ..EvolverOptions::new(vec![3, 2]) };
        assert_eq!(SimpleNetworkEvolver::new(options).err(), Some(NetworkError::InvalidStddev(-1.)));
        let options = EvolverOptions {
            mutation_grow_probabilities: BTreeMap::from([(1, -0.5)]),
            ..EvolverOptions::new(vec![3, 2])
        };
        assert_eq!(
            SimpleNetworkEvolver::new(options).err(),
            Some(NetworkError::InvalidGrowthProbabilities(WeightError::Negative { index: 0, weight: -0.5 })),
        );
    }

    #[test]
    fn test_random_path() {
        let mut evolver = seeded(EvolverOptions::new(vec![2, 4, 4, 3]), 1);
        let network = evolver.template.clone();
        let path = evolver.random_path(&network, Node::new(0, 1), Node::new(3, 2));
        assert_eq!(path.len(), 3);
        assert_eq!(path[0].from, Node::new(0, 1));
        assert_eq!(path[2].to, Node::new(3, 2));
        assert_eq!(path[0].to, path[1].from);
        assert_eq!(path[1].to, path[2].from);
        assert!(evolver.random_path(&network, Node::new(1, 0), Node::new(1, 0)).is_empty());
    }

    #[test]
    fn test_initial_specimen() {
        let mut evolver = seeded(EvolverOptions::new(vec![3, 5, 5, 4]), 2);
        for _ in 0..20 {
            let specimen = evolver.initial_specimen();
            for output in specimen.nodes_on_layer(3) {
                let incoming = specimen.edges_where(|edge| edge.to == output && specimen.has_connection(edge));
                assert!(!incoming.is_empty());
            }
            for edge in specimen.edges_where(|edge| specimen.has_connection(edge)) {
                let weight = specimen.connection_weight(&edge).unwrap();
                assert!((-1. ..=1.).contains(&weight));
            }
        }
    }

    #[test]
    fn test_mate_takes_edges_from_parents() {
        let mut evolver = seeded(EvolverOptions::new(vec![2, 2]), 3);
        let mut father = evolver.template.clone();
        let mut mother = evolver.template.clone();
        father.add_connection(&Edge::between(0, 0, 0), 0.5);
        mother.add_connection(&Edge::between(0, 0, 0), -0.5);
        mother.add_connection(&Edge::between(0, 1, 1), 1.);
        for _ in 0..20 {
            let child = evolver.mate(&father, &mother);
            let weight = child.connection_weight(&Edge::between(0, 0, 0));
            assert!(weight == Some(0.5) || weight == Some(-0.5));
            assert!(!child.has_connection(&Edge::between(0, 1, 0)));
            assert!(!child.has_connection(&Edge::between(0, 0, 1)));
        }
    }

    #[test]
    #[should_panic(expected = "same layer sizes")]
    fn test_mate_different_layer_sizes() {
        let mut evolver = seeded(EvolverOptions::new(vec![2, 2]), 4);
        let other = SimpleNetwork::new(&[2, 3]).unwrap();
        let template = evolver.template.clone();
        evolver.mate(&template, &other);
    }

    #[test]
    fn test_mutate_without_chances_is_identity() {
        let mut evolver = seeded(EvolverOptions::new(vec![3, 3, 2]), 5);
        let specimen = evolver.initial_specimen();
        assert_eq!(evolver.mutate(&specimen), specimen);
    }

    #[test]
    fn test_mutate_growth() {
        let options = EvolverOptions {
            mutation_grow_chance: 1.,
            mutation_grow_probabilities: BTreeMap::from([(2, 1.)]),
            ..EvolverOptions::new(vec![3, 3, 2])
        };
        let mut evolver = seeded(options, 6);
        let specimen = evolver.initial_specimen();
        let grown = evolver.mutate(&specimen);
        assert_eq!(grown.edge_count(), specimen.edge_count() + 2);

        let options = EvolverOptions {
            mutation_grow_chance: 1.,
            mutation_grow_probabilities: BTreeMap::from([(-1, 1.)]),
            ..EvolverOptions::new(vec![3, 3, 2])
        };
        let mut evolver = seeded(options, 7);
        let shrunk = evolver.mutate(&grown);
        assert_eq!(shrunk.edge_count(), grown.edge_count() - 1);
    }

    #[test]
    fn test_mutate_growth_without_probabilities() {
        let options = EvolverOptions {
            mutation_grow_chance: 1.,
            mutation_grow_probabilities: BTreeMap::new(),
            ..EvolverOptions::new(vec![3, 3, 2])
        };
        let mut evolver = seeded(options, 9);
        let specimen = evolver.initial_specimen();
        assert_eq!(evolver.mutate(&specimen), specimen);
    }

    #[test]
    fn test_mutate_keeps_removed_edges_removed() {
        let options = EvolverOptions {
            mutation_grow_chance: 1.,
            mutation_grow_probabilities: BTreeMap::from([(-1, 1.)]),
            mutation_weight_chance: 1.,
            ..EvolverOptions::new(vec![3, 3, 2])
        };
        let mut evolver = seeded(options, 10);
        for _ in 0..20 {
            let specimen = evolver.initial_specimen();
            let mutated = evolver.mutate(&specimen);
            assert_eq!(mutated.edge_count(), specimen.edge_count() - 1);
            let kept = specimen.edges_where(|edge| specimen.has_connection(edge) && mutated.has_connection(edge));
            assert_eq!(kept.len(), mutated.edge_count());
        }
    }

    #[test]
    fn test_mutate_weights_stay_in_range() {
        let options = EvolverOptions {
            mutation_weight_chance: 1.,
            mutation_weight_stddev: 5.,
            ..EvolverOptions::new(vec![4, 4, 4])
        };
        let mut evolver = seeded(options, 8);
        let specimen = evolver.initial_specimen();
        let mutated = evolver.mutate(&specimen);
        assert_eq!(mutated.edge_count(), specimen.edge_count());
        for edge in mutated.edges_where(|edge| mutated.has_connection(edge)) {
            let weight = mutated.connection_weight(&edge).unwrap();
            assert!((-1. ..=1.).contains(&weight));
        }
    }
}
