use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::{HiddenUnit, InputUnit, Layer, NetKind, Network, OutputUnit, Rect};
use crate::{KeyIdentifier, NetErr, Result};

/// Everything needed to create a fresh network.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NetworkSpec {
    #[serde(default)]
    pub name: String,
    pub kind: NetKind,
    pub input_width: usize,
    pub input_height: usize,
    pub hidden_layers: usize,
    pub hidden_units: usize,
    pub outputs: Vec<KeyIdentifier>,
    #[serde(default)]
    pub region: Option<Rect>,
    #[serde(default)]
    pub focus: Option<Rect>,
}

/// How the weights and biases of a fresh network are generated.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ParamInit {
    /// Uniform in `[low, high)`.
    Uniform { low: f64, high: f64 },
    Constant(f64),
}

impl Default for ParamInit {
    fn default() -> Self {
        ParamInit::Uniform { low: -1., high: 1. }
    }
}

impl ParamInit {
    fn sample<R: Rng>(&self, rng: &mut R) -> f64 {
        match *self {
            ParamInit::Uniform { low, high } => rng.random_range(low..high),
            ParamInit::Constant(value) => value,
        }
    }

    fn validate(&self, what: &str) -> Result<()> {
        match *self {
            ParamInit::Uniform { low, high } if !(low < high) => Err(NetErr::InvalidGeometry(
                format!("{what} range [{low}, {high}) is empty"),
            )),
            _ => Ok(()),
        }
    }
}

/// Builds fresh `Network`s out of a `NetworkSpec`.
pub struct NetworkBuilder {
    weights: ParamInit,
    biases: ParamInit,
    rng: StdRng,
}

impl Default for NetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkBuilder {
    /// Creates a new `NetworkBuilder` drawing weights and biases uniformly from `[-1, 1)`.
    pub fn new() -> Self {
        Self {
            weights: ParamInit::default(),
            biases: ParamInit::default(),
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn weights(mut self, init: ParamInit) -> Self {
        self.weights = init;
        self
    }

    pub fn biases(mut self, init: ParamInit) -> Self {
        self.biases = init;
        self
    }

    /// Builds a new network following `spec`.
    ///
    /// # Arguments
    /// * `spec` - The geometry, kind and output labels of the network.
    ///
    /// # Returns
    /// The network or a configuration error if the geometry is unusable.
    pub fn build(&mut self, spec: &NetworkSpec) -> Result<Network> {
        self.weights.validate("weight")?;
        self.biases.validate("bias")?;

        if spec.hidden_layers == 0 || spec.hidden_units == 0 {
            return Err(NetErr::InvalidGeometry(format!(
                "needs at least one hidden layer of one unit, got {} layers of {} units",
                spec.hidden_layers, spec.hidden_units
            )));
        }

        let outputs: Vec<_> = spec
            .outputs
            .iter()
            .map(|&key| OutputUnit::new(key, self.biases.sample(&mut self.rng)))
            .collect();

        let hidden = (0..spec.hidden_layers)
            .map(|l| {
                let next = if l + 1 == spec.hidden_layers {
                    outputs.len()
                } else {
                    spec.hidden_units
                };

                let units = (0..spec.hidden_units)
                    .map(|_| {
                        let bias = self.biases.sample(&mut self.rng);
                        HiddenUnit::new(bias, self.draw(next))
                    })
                    .collect();

                Layer::new(units)
            })
            .collect();

        let inputs = (0..spec.input_width * spec.input_height)
            .map(|_| InputUnit::new(self.draw(spec.hidden_units)))
            .collect();

        let mut net = Network::from_parts(
            spec.name.clone(),
            spec.kind,
            spec.input_width,
            spec.input_height,
            inputs,
            hidden,
            outputs,
        )?;

        if let Some(region) = spec.region {
            net.set_region(region);
        }
        net.set_focus(spec.focus);

        Ok(net)
    }

    fn draw(&mut self, n: usize) -> Vec<f64> {
        (0..n).map(|_| self.weights.sample(&mut self.rng)).collect()
    }
}
