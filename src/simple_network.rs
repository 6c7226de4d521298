//! Definition of the `SimpleNetwork` struct.
//!
//! A `SimpleNetwork` has a fixed number of layers with a fixed number of nodes each. Only nodes on
//! adjacent layers can be connected. It serves as a reference specimen type for the evolutionary
//! process; see [`evolver::SimpleNetworkEvolver`].

pub mod constant_evolver;
pub mod evolver;

use std::fmt::{self, Display};
use std::fs::read_to_string;
use std::path::Path;

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::activation::Activation;
use crate::evolution::LoadError;
use crate::utils::random::WeightError;


/// Error that may occur when constructing or running a `SimpleNetwork`.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum NetworkError {
    #[error("a network needs at least two layers, got {0}")]
    TooFewLayers(usize),
    #[error("layer {0} has no nodes")]
    EmptyLayer(usize),
    #[error("the connections leaving layer {0} do not match the layer sizes")]
    InconsistentLayer(usize),
    #[error("expected an input of size {expected}, got {actual}")]
    InputSize { expected: usize, actual: usize },
    #[error("invalid standard deviation for weight mutation: {0}")]
    InvalidStddev(f64),
    #[error("invalid growth probabilities: {0}")]
    InvalidGrowthProbabilities(#[from] WeightError),
}


/// A node represented by the index of its layer and its own index inside the layer.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Node {
    pub layer: usize,
    pub index: usize,
}


impl Node {
    pub fn new(layer: usize, index: usize) -> Self {
        Self { layer, index }
    }
}


/// A directed edge from a node to a node on the following layer.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Edge {
    pub from: Node,
    pub to: Node,
}


impl Edge {
    pub fn new(from: Node, to: Node) -> Self {
        Self { from, to }
    }

    /// Edge from node `from_index` on layer `from_layer` to node `to_index` on the next layer.
    pub fn between(from_layer: usize, from_index: usize, to_index: usize) -> Self {
        Self::new(Node::new(from_layer, from_index), Node::new(from_layer + 1, to_index))
    }
}


impl Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.from.layer, self.from.index, self.to.layer, self.to.index)
    }
}


/// Connections between one layer (rows) and the next (columns).
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
struct Connections {
    connectivity: Array2<bool>,
    weights: Array2<f64>,
}


impl Connections {
    fn new(size: usize, next_size: usize) -> Self {
        Self {
            connectivity: Array2::from_elem((size, next_size), false),
            weights: Array2::zeros((size, next_size)),
        }
    }
}


/// Network of fixed size with nodes that pass values to the next layer.
///
/// Derives the `Deserialize` and `Serialize` traits from `serde`. Deserialized networks are checked
/// for consistent layer sizes.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(try_from = "NetworkData")]
pub struct SimpleNetwork {
    /// Connections leaving each layer except the output layer, ordered from the input layer.
    layers: Vec<Connections>,

    /// Applied to the values of every non-input node.
    activation: Activation,
}


/// Unchecked twin of `SimpleNetwork` used during deserialization.
#[derive(Deserialize)]
struct NetworkData {
    layers: Vec<Connections>,
    #[serde(default)]
    activation: Activation,
}


impl TryFrom<NetworkData> for SimpleNetwork {
    type Error = NetworkError;

    fn try_from(data: NetworkData) -> Result<Self, Self::Error> {
        if data.layers.is_empty() {
            return Err(NetworkError::TooFewLayers(data.layers.len() + 1));
        }
        for (layer, connections) in data.layers.iter().enumerate() {
            let (rows, cols) = connections.weights.dim();
            if connections.connectivity.dim() != (rows, cols) {
                return Err(NetworkError::InconsistentLayer(layer));
            }
            if rows == 0 {
                return Err(NetworkError::EmptyLayer(layer));
            }
            if cols == 0 {
                return Err(NetworkError::EmptyLayer(layer + 1));
            }
            let next_rows = data.layers.get(layer + 1).map(|next| next.weights.nrows());
            if next_rows.is_some_and(|next_rows| next_rows != cols) {
                return Err(NetworkError::InconsistentLayer(layer));
            }
        }
        Ok(Self { layers: data.layers, activation: data.activation })
    }
}


impl SimpleNetwork {
    /// Constructs a new network without any connections.
    ///
    /// # Arguments
    /// * `layer_sizes` - Number of nodes on each layer. The first layer is the input, the last
    ///                   layer is the output.
    ///
    /// # Errors
    /// If there are fewer than two layers or a layer has no nodes.
    pub fn new(layer_sizes: &[usize]) -> Result<Self, NetworkError> {
        if layer_sizes.len() < 2 {
            return Err(NetworkError::TooFewLayers(layer_sizes.len()));
        }
        if let Some(layer) = layer_sizes.iter().position(|&size| size == 0) {
            return Err(NetworkError::EmptyLayer(layer));
        }
        let layers = layer_sizes.windows(2)
                                .map(|pair| Connections::new(pair[0], pair[1]))
                                .collect();
        Ok(Self { layers, activation: Activation::default() })
    }

    /// Replaces the activation function.
    pub fn with_activation(mut self, activation: Activation) -> Self {
        self.activation = activation;
        self
    }

    pub fn activation(&self) -> &Activation {
        &self.activation
    }

    /// Parses a network from a json string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load a network from a json file
    ///
    /// # Arguments
    /// * `path` - path to the json file
    ///
    /// # Returns
    /// A new `SimpleNetwork` instance or a `LoadError`
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        return Ok(Self::from_json(read_to_string(path)?.as_str())?);
    }

    /// Returns a copy of the network with the same layers and activation but without connections.
    pub fn disconnected(&self) -> Self {
        let layers = self.layers.iter()
                                .map(|connections| Connections::new(connections.weights.nrows(), connections.weights.ncols()))
                                .collect();
        Self { layers, activation: self.activation.clone() }
    }

    /// Returns the number of layers (including input and output).
    pub fn layer_count(&self) -> usize {
        self.layers.len() + 1
    }

    /// Returns the number of nodes on a layer.
    ///
    /// # Panics
    /// If the layer does not exist.
    pub fn layer_size(&self, layer: usize) -> usize {
        assert!(layer < self.layer_count(), "layer {layer} does not exist");
        if layer == self.layers.len() {
            self.layers[layer - 1].weights.ncols()
        } else {
            self.layers[layer].weights.nrows()
        }
    }

    /// Returns the number of nodes on every layer, starting with the input layer.
    pub fn layer_sizes(&self) -> Vec<usize> {
        (0..self.layer_count()).map(|layer| self.layer_size(layer)).collect()
    }

    /// Returns whether there is a connection between two nodes.
    pub fn has_connection(&self, edge: &Edge) -> bool {
        self.assert_edge_is_valid(edge);
        self.layers[edge.from.layer].connectivity[[edge.from.index, edge.to.index]]
    }

    /// Returns the weight of a connection or `None` if the nodes are not connected.
    pub fn connection_weight(&self, edge: &Edge) -> Option<f64> {
        if !self.has_connection(edge) {
            return None;
        }
        Some(self.layers[edge.from.layer].weights[[edge.from.index, edge.to.index]])
    }

    /// Adds a connection to the network. If it already exists, the weight is updated.
    pub fn add_connection(&mut self, edge: &Edge, weight: f64) {
        self.assert_edge_is_valid(edge);
        let connections = &mut self.layers[edge.from.layer];
        connections.connectivity[[edge.from.index, edge.to.index]] = true;
        connections.weights[[edge.from.index, edge.to.index]] = weight;
    }

    /// Removes a connection from the network. Nothing happens if it does not exist.
    pub fn remove_connection(&mut self, edge: &Edge) {
        self.assert_edge_is_valid(edge);
        let connections = &mut self.layers[edge.from.layer];
        connections.connectivity[[edge.from.index, edge.to.index]] = false;
        connections.weights[[edge.from.index, edge.to.index]] = 0.;
    }

    /// Returns the number of existing connections.
    pub fn edge_count(&self) -> usize {
        self.layers.iter()
                   .map(|connections| connections.connectivity.iter().filter(|&&connected| connected).count())
                   .sum()
    }

    /// Runs the network on some input and returns the values of the output layer.
    ///
    /// Each layer's values are multiplied with the weights of the connections leaving it.
    /// The activation function is then applied to every resulting value.
    ///
    /// # Errors
    /// If the input size does not match the size of the input layer.
    pub fn forward(&self, input: &[f64]) -> Result<Vec<f64>, NetworkError> {
        let expected = self.layer_size(0);
        if input.len() != expected {
            return Err(NetworkError::InputSize { expected, actual: input.len() });
        }
        let mut values = Array1::from(input.to_vec());
        for connections in &self.layers {
            values = values.dot(&connections.weights).mapv(|value| self.activation.call(value));
        }
        Ok(values.to_vec())
    }

    /// Returns a list of all edges that can possibly exist between the nodes of this network.
    pub fn all_edges(&self) -> Vec<Edge> {
        self.edges_where(|_| true)
    }

    /// Returns all possible edges for which `predicate` is `true`.
    pub fn edges_where<P: FnMut(&Edge) -> bool>(&self, mut predicate: P) -> Vec<Edge> {
        let mut edges = Vec::new();
        for (layer, connections) in self.layers.iter().enumerate() {
            let (rows, cols) = connections.weights.dim();
            for from_index in 0..rows {
                for to_index in 0..cols {
                    let edge = Edge::between(layer, from_index, to_index);
                    if predicate(&edge) {
                        edges.push(edge);
                    }
                }
            }
        }
        edges
    }

    /// Returns all nodes on a certain layer.
    pub fn nodes_on_layer(&self, layer: usize) -> Vec<Node> {
        (0..self.layer_size(layer)).map(|index| Node::new(layer, index)).collect()
    }

    /// Asserts that the edge connects two existing nodes on adjacent layers.
    fn assert_edge_is_valid(&self, edge: &Edge) {
        self.assert_node_is_valid(&edge.from);
        self.assert_node_is_valid(&edge.to);
        assert_eq!(edge.from.layer + 1, edge.to.layer, "edge {edge} does not connect adjacent layers");
    }

    fn assert_node_is_valid(&self, node: &Node) {
        assert!(
            node.index < self.layer_size(node.layer),
            "node {} does not exist on layer {}", node.index, node.layer,
        );
    }
}
