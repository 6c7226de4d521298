//! Definition of the `Activation` struct and the most common activation functions.

use std::fmt::{self, Debug};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde::de::Error as DeError;
use thiserror::Error;


type Func = fn(f64) -> f64;


/// Error returned when looking up an activation function by an unknown name.
#[derive(Clone, Debug, Error, PartialEq)]
#[error("unknown activation function `{0}`")]
pub struct UnknownActivation(pub String);


/// Convenience struct to store an activation function together with its name.
///
/// This is used in the `SimpleNetwork` struct, where it is applied to every node value.
/// Facilitates (de-)serialization: an activation is serialized as its name.
#[derive(Clone)]
pub struct Activation {
    name: String,
    function: Func,
}


/// Methods for convenient construction and calling.
impl Activation {
    /// Basic constructor to manually define all fields.
    pub fn new<S: Into<String>>(name: S, function: Func) -> Self {
        Self { name: name.into(), function }
    }

    /// Convenience constructor for known/available activation functions.
    ///
    /// Pre-defined functions are determined from hard-coded names:
    /// - `identity`
    /// - `sigmoid`
    /// - `relu`
    /// - `tanh`
    pub fn from_name<S: Into<String>>(name: S) -> Result<Self, UnknownActivation> {
        let name: String = name.into();
        let function: Func = match name.as_str() {
            "identity" => identity,
            "sigmoid" => sigmoid,
            "relu" => relu,
            "tanh" => f64::tanh,
            _ => return Err(UnknownActivation(name)),
        };
        Ok(Self { name, function })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Proxy for the actual activation function.
    pub fn call(&self, number: f64) -> f64 {
        (self.function)(number)
    }
}


impl Default for Activation {
    fn default() -> Self {
        Self::new("identity", identity)
    }
}


/// Activations are considered equal if their names are.
impl PartialEq for Activation {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}


impl Debug for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Activation").field(&self.name).finish()
    }
}


/// Allows `serde` to serialize `Activation` objects.
impl Serialize for Activation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name)
    }
}


/// Allows `serde` to deserialize to `Activation` objects.
impl<'de> Deserialize<'de> for Activation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Self::from_name(String::deserialize(deserializer)?).map_err(DeError::custom)
    }
}


/// Passes the number through unchanged.
pub fn identity(number: f64) -> f64 {
    number
}


/// Sigmoid function for a scalar/number.
pub fn sigmoid(number: f64) -> f64 {
    1. / (1. + (-number).exp())
}


/// Rectified Linear Unit (RELU) activation function for a scalar/number.
pub fn relu(number: f64) -> f64 {
    if number < 0. { 0. } else { number }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        let activation = Activation::from_name("relu").unwrap();
        assert_eq!(activation.name(), "relu");
        assert_eq!(activation.call(-1.), 0.);
        assert_eq!(activation.call(2.), 2.);
        assert_eq!(Activation::from_name("softmax"), Err(UnknownActivation("softmax".to_owned())));
    }

    #[test]
    fn test_sigmoid() {
        assert_eq!(sigmoid(0.), 0.5);
        assert_eq!(sigmoid(36.), 0.9999999999999998);
    }

    #[test]
    fn test_serde() {
        let activation = Activation::from_name("tanh").unwrap();
        assert_eq!(serde_json::to_string(&activation).unwrap(), "\"tanh\"");
        let deserialized: Activation = serde_json::from_str(" \"sigmoid\" ").unwrap();
        assert_eq!(deserialized.call(0.), 0.5);
        assert!(serde_json::from_str::<Activation>("\"softmax\"").is_err());
    }

    #[test]
    fn test_default_is_identity() {
        let activation = Activation::default();
        assert_eq!(activation, Activation::from_name("identity").unwrap());
        assert_eq!(activation.call(-3.5), -3.5);
    }
}
