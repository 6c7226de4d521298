use rand::SeedableRng;
use rand::rngs::StdRng;

use evoproc::evolution::{evolution_with_rng, terminate_after, Evolver, NaturalSelectionStrategy, Options};
use evoproc::simple_network::SimpleNetwork;
use evoproc::simple_network::constant_evolver::{ConstantEvolverOptions, ConstantNetworkEvolver, MateStrategy};
use evoproc::simple_network::evolver::{EvolverOptions, SimpleNetworkEvolver};


#[test]
fn test_mate_complete_with_empty_network() {
    let options = EvolverOptions::new(vec![20000, 1]);
    let mut evolver = SimpleNetworkEvolver::with_rng(options, StdRng::seed_from_u64(10)).unwrap();
    let empty = SimpleNetwork::new(&[20000, 1]).unwrap();
    let mut complete = empty.clone();
    for edge in complete.all_edges() {
        complete.add_connection(&edge, 1.);
    }
    let child = evolver.mate(&complete, &empty);
    let inherited = child.edge_count();
    let ratio = inherited as f64 / (20000 - inherited) as f64;
    assert!((ratio - 1.).abs() < 0.1, "ratio {ratio}");
}


#[test]
fn test_network_evolution() {
    let options = EvolverOptions {
        mutation_grow_chance: 0.5,
        mutation_weight_chance: 0.5,
        mutation_weight_stddev: 0.2,
        ..EvolverOptions::new(vec![2, 3, 1])
    };
    let mut evolver = SimpleNetworkEvolver::with_rng(options, StdRng::seed_from_u64(11)).unwrap();
    let error = |network: &SimpleNetwork| {
        let output = network.forward(&[1., 1.]).unwrap()[0];
        (output - 0.5).abs()
    };
    let options = Options::new(NaturalSelectionStrategy::KillPreciseWorst, 8, 2)
        .with_termination(terminate_after(10));
    let result = evolution_with_rng(&mut evolver, |network: &SimpleNetwork| -error(network), options, &mut StdRng::seed_from_u64(12))
        .unwrap();
    assert_eq!(result.len(), 8);
    assert!(result.iter().all(|network| network.layer_sizes() == vec![2, 3, 1]));
    let errors: Vec<f64> = result.iter().map(error).collect();
    assert!(errors.windows(2).all(|pair| pair[0] <= pair[1]));
    for network in &result {
        for edge in network.edges_where(|edge| network.has_connection(edge)) {
            assert!((-1. ..=1.).contains(&network.connection_weight(&edge).unwrap()));
        }
    }
}


#[test]
fn test_constant_network_evolution() {
    let options = ConstantEvolverOptions {
        mate_strategy: MateStrategy::RandomMerge,
        ..ConstantEvolverOptions::new(vec![2, 2, 1])
    };
    let mut evolver = ConstantNetworkEvolver::with_rng(options, StdRng::seed_from_u64(13)).unwrap();
    let options = Options::new(NaturalSelectionStrategy::KillPreciseWorst, 6, 1)
        .with_termination(terminate_after(4));
    let fitness = |network: &SimpleNetwork| -network.forward(&[1., -1.]).unwrap()[0].abs();
    let result = evolution_with_rng(&mut evolver, fitness, options, &mut StdRng::seed_from_u64(14)).unwrap();
    assert_eq!(result.len(), 6);
    assert!(result.iter().all(|network| network.edge_count() == 2 * 2 + 2));
}
