use crate::{KeyIdentifier, NetErr, Result};

/// Checks `index` against `len`, naming `what` in the error.
pub(crate) fn check_index(what: &'static str, index: usize, len: usize) -> Result<usize> {
    if index < len {
        Ok(index)
    } else {
        Err(NetErr::IndexOutOfRange { what, index, len })
    }
}

/// A pixel of the sampled grid. Holds one outgoing weight per unit of the first hidden layer.
#[derive(Clone, Debug, PartialEq)]
pub struct InputUnit {
    weights: Box<[f64]>,
    value: f64,
}

impl InputUnit {
    pub fn new(weights: Vec<f64>) -> Self {
        Self {
            weights: weights.into_boxed_slice(),
            value: 0.,
        }
    }

    /// The last sampled raw intensity, in the `0..=255` domain.
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn set_value(&mut self, value: f64) {
        self.value = value;
    }

    /// The intensity as the forward pass consumes it, in `[0, 1]`.
    pub fn normalized(&self) -> f64 {
        self.value / 255.
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn weight(&self, k: usize) -> Result<f64> {
        let k = check_index("input weight", k, self.weights.len())?;
        Ok(self.weights[k])
    }

    pub fn set_weight(&mut self, k: usize, weight: f64) -> Result<()> {
        let k = check_index("input weight", k, self.weights.len())?;
        self.weights[k] = weight;
        Ok(())
    }

    pub(crate) fn weights_mut(&mut self) -> &mut [f64] {
        &mut self.weights
    }
}

/// A unit of a hidden layer. Its weight count is the width of the layer that follows it.
#[derive(Clone, Debug, PartialEq)]
pub struct HiddenUnit {
    weights: Box<[f64]>,
    bias: f64,
    value: f64,
    error: f64,
}

impl HiddenUnit {
    pub fn new(bias: f64, weights: Vec<f64>) -> Self {
        Self {
            weights: weights.into_boxed_slice(),
            bias,
            value: 0.,
            error: 0.,
        }
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    pub fn set_bias(&mut self, bias: f64) {
        self.bias = bias;
    }

    /// The post activation value of the last forward pass.
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn set_value(&mut self, value: f64) {
        self.value = value;
    }

    /// The delta computed by the last backward pass.
    pub fn error(&self) -> f64 {
        self.error
    }

    pub fn set_error(&mut self, error: f64) {
        self.error = error;
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn weight(&self, k: usize) -> Result<f64> {
        let k = check_index("hidden weight", k, self.weights.len())?;
        Ok(self.weights[k])
    }

    pub fn set_weight(&mut self, k: usize, weight: f64) -> Result<()> {
        let k = check_index("hidden weight", k, self.weights.len())?;
        self.weights[k] = weight;
        Ok(())
    }

    pub(crate) fn weights_mut(&mut self) -> &mut [f64] {
        &mut self.weights
    }
}

/// An ordered run of hidden units whose width never changes after construction.
#[derive(Clone, Debug, PartialEq)]
pub struct Layer {
    units: Vec<HiddenUnit>,
}

impl Layer {
    pub fn new(units: Vec<HiddenUnit>) -> Self {
        Self { units }
    }

    pub fn size(&self) -> usize {
        self.units.len()
    }

    pub fn units(&self) -> &[HiddenUnit] {
        &self.units
    }

    pub fn units_mut(&mut self) -> &mut [HiddenUnit] {
        &mut self.units
    }

    pub fn unit(&self, n: usize) -> Result<&HiddenUnit> {
        let n = check_index("hidden unit", n, self.units.len())?;
        Ok(&self.units[n])
    }

    pub fn unit_mut(&mut self, n: usize) -> Result<&mut HiddenUnit> {
        let n = check_index("hidden unit", n, self.units.len())?;
        Ok(&mut self.units[n])
    }
}

/// A unit of the output layer, bound to the action it stands for.
#[derive(Clone, Debug, PartialEq)]
pub struct OutputUnit {
    label: KeyIdentifier,
    bias: f64,
    value: f64,
    error: f64,
}

impl OutputUnit {
    pub fn new(label: KeyIdentifier, bias: f64) -> Self {
        Self {
            label,
            bias,
            value: 0.,
            error: 0.,
        }
    }

    pub fn label(&self) -> KeyIdentifier {
        self.label
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    pub fn set_bias(&mut self, bias: f64) {
        self.bias = bias;
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn set_value(&mut self, value: f64) {
        self.value = value;
    }

    pub fn error(&self) -> f64 {
        self.error
    }

    pub fn set_error(&mut self, error: f64) {
        self.error = error;
    }
}
