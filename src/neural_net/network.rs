use std::{collections::HashSet, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::unit::{check_index, HiddenUnit, InputUnit, Layer, OutputUnit};
use crate::{KeyIdentifier, NetErr, Result};

/// How a network gets its training signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetKind {
    /// Imitates the key a human is pressing.
    Supervised,
    /// Learns from a scalar reward sent by an external program.
    Reinforcement,
}

impl NetKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NetKind::Supervised => "supervised",
            NetKind::Reinforcement => "reinforcement",
        }
    }
}

impl fmt::Display for NetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NetKind {
    type Err = NetErr;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "supervised" => Ok(NetKind::Supervised),
            "reinforcement" => Ok(NetKind::Reinforcement),
            other => Err(NetErr::InvalidGeometry(format!(
                "unknown network kind '{other}'"
            ))),
        }
    }
}

/// A screen rectangle in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// The pixel at the middle of the rectangle.
    pub fn center(&self) -> (i32, i32) {
        let half = |len: u32| i32::try_from(len / 2).unwrap_or(i32::MAX);
        (
            self.x.saturating_add(half(self.width)),
            self.y.saturating_add(half(self.height)),
        )
    }
}

/// Trained time in whole seconds, displayed as hours, minutes and seconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrainedTime(pub u64);

impl fmt::Display for TrainedTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.0;
        write!(f, "H:{} M:{} S:{}", secs / 3600, secs % 3600 / 60, secs % 60)
    }
}

/// The aggregate root: a dense feedforward network from a grid of pixels to a set of actions.
///
/// Layer widths are fixed once built. Every input unit carries one weight per unit of the
/// first hidden layer and every hidden unit one weight per unit of its successor layer, the
/// last hidden layer pointing at the outputs.
#[derive(Clone, Debug, PartialEq)]
pub struct Network {
    name: String,
    kind: NetKind,
    input_width: usize,
    input_height: usize,
    region: Rect,
    focus: Option<Rect>,
    trained_secs: u64,
    inputs: Vec<InputUnit>,
    hidden: Vec<Layer>,
    outputs: Vec<OutputUnit>,
}

impl Network {
    /// Assembles a network from already built units, checking every structural invariant.
    ///
    /// # Arguments
    /// * `name` - The network's name, also its checkpoint's name.
    /// * `kind` - Supervised or reinforcement.
    /// * `input_width` - Width of the sampled grid.
    /// * `input_height` - Height of the sampled grid.
    /// * `inputs` - `input_width * input_height` input units.
    /// * `hidden` - At least one hidden layer.
    /// * `outputs` - At least one output unit, labels pairwise distinct.
    ///
    /// # Returns
    /// The network, or the first violated invariant.
    pub fn from_parts(
        name: impl Into<String>,
        kind: NetKind,
        input_width: usize,
        input_height: usize,
        inputs: Vec<InputUnit>,
        hidden: Vec<Layer>,
        outputs: Vec<OutputUnit>,
    ) -> Result<Self> {
        let net = Self {
            name: name.into(),
            kind,
            input_width,
            input_height,
            region: Rect::new(0, 0, input_width as u32, input_height as u32),
            focus: None,
            trained_secs: 0,
            inputs,
            hidden,
            outputs,
        };

        net.validate()?;
        Ok(net)
    }

    fn validate(&self) -> Result<()> {
        if self.input_width == 0 || self.input_height == 0 {
            return Err(NetErr::InvalidGeometry(format!(
                "input grid must be at least 1x1, got {}x{}",
                self.input_width, self.input_height
            )));
        }

        let expected = self.input_width * self.input_height;
        if self.inputs.len() != expected {
            return Err(NetErr::InvalidGeometry(format!(
                "a {}x{} grid needs {expected} input units, got {}",
                self.input_width,
                self.input_height,
                self.inputs.len()
            )));
        }

        if self.hidden.is_empty() {
            return Err(NetErr::InvalidGeometry(
                "a network needs at least one hidden layer".into(),
            ));
        }

        if let Some(i) = self.hidden.iter().position(|layer| layer.size() == 0) {
            return Err(NetErr::InvalidGeometry(format!("hidden layer {i} is empty")));
        }

        if self.outputs.is_empty() {
            return Err(NetErr::EmptyOutputs);
        }

        let mut seen = HashSet::with_capacity(self.outputs.len());
        for output in &self.outputs {
            if !seen.insert(output.label()) {
                return Err(NetErr::DuplicateLabel(output.label()));
            }
        }

        let first = self.hidden[0].size();
        if let Some(i) = self.inputs.iter().position(|u| u.weights().len() != first) {
            return Err(NetErr::InvalidGeometry(format!(
                "input unit {i} has {} weights, the first hidden layer has {first} units",
                self.inputs[i].weights().len()
            )));
        }

        for (l, layer) in self.hidden.iter().enumerate() {
            let next = self.successor_width(l);
            if let Some(n) = layer.units().iter().position(|u| u.weights().len() != next) {
                return Err(NetErr::InvalidGeometry(format!(
                    "hidden unit {n} of layer {l} has {} weights, its successor has {next} units",
                    layer.units()[n].weights().len()
                )));
            }
        }

        Ok(())
    }

    /// The width of whatever follows hidden layer `l`.
    fn successor_width(&self, l: usize) -> usize {
        self.hidden
            .get(l + 1)
            .map_or(self.outputs.len(), |next| next.size())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn kind(&self) -> NetKind {
        self.kind
    }

    pub fn set_kind(&mut self, kind: NetKind) {
        self.kind = kind;
    }

    pub fn input_width(&self) -> usize {
        self.input_width
    }

    pub fn input_height(&self) -> usize {
        self.input_height
    }

    pub fn region(&self) -> Rect {
        self.region
    }

    pub fn set_region(&mut self, region: Rect) {
        self.region = region;
    }

    pub fn focus(&self) -> Option<Rect> {
        self.focus
    }

    /// Sets the focus region, an empty rectangle clears it.
    pub fn set_focus(&mut self, focus: Option<Rect>) {
        self.focus = focus.filter(|rect| !rect.is_empty());
    }

    pub fn trained_secs(&self) -> u64 {
        self.trained_secs
    }

    pub fn trained_time(&self) -> TrainedTime {
        TrainedTime(self.trained_secs)
    }

    pub fn set_trained_secs(&mut self, secs: u64) {
        self.trained_secs = secs;
    }

    pub fn add_trained_secs(&mut self, secs: u64) {
        self.trained_secs = self.trained_secs.saturating_add(secs);
    }

    pub fn inputs(&self) -> &[InputUnit] {
        &self.inputs
    }

    pub fn hidden_layers(&self) -> &[Layer] {
        &self.hidden
    }

    pub fn outputs(&self) -> &[OutputUnit] {
        &self.outputs
    }

    pub fn input(&self, i: usize) -> Result<&InputUnit> {
        let i = check_index("input unit", i, self.inputs.len())?;
        Ok(&self.inputs[i])
    }

    pub fn input_mut(&mut self, i: usize) -> Result<&mut InputUnit> {
        let i = check_index("input unit", i, self.inputs.len())?;
        Ok(&mut self.inputs[i])
    }

    pub fn layer(&self, l: usize) -> Result<&Layer> {
        let l = check_index("hidden layer", l, self.hidden.len())?;
        Ok(&self.hidden[l])
    }

    pub fn layer_mut(&mut self, l: usize) -> Result<&mut Layer> {
        let l = check_index("hidden layer", l, self.hidden.len())?;
        Ok(&mut self.hidden[l])
    }

    pub fn hidden_unit(&self, l: usize, n: usize) -> Result<&HiddenUnit> {
        self.layer(l)?.unit(n)
    }

    pub fn hidden_unit_mut(&mut self, l: usize, n: usize) -> Result<&mut HiddenUnit> {
        self.layer_mut(l)?.unit_mut(n)
    }

    pub fn output(&self, o: usize) -> Result<&OutputUnit> {
        let o = check_index("output unit", o, self.outputs.len())?;
        Ok(&self.outputs[o])
    }

    pub fn output_mut(&mut self, o: usize) -> Result<&mut OutputUnit> {
        let o = check_index("output unit", o, self.outputs.len())?;
        Ok(&mut self.outputs[o])
    }

    /// Position of the output unit labeled `key`, if any.
    pub fn output_index(&self, key: KeyIdentifier) -> Option<usize> {
        self.outputs.iter().position(|o| o.label() == key)
    }

    pub fn labels(&self) -> impl Iterator<Item = KeyIdentifier> + '_ {
        self.outputs.iter().map(|o| o.label())
    }

    /// Writes a freshly sampled grid of intensities into the input units, row major.
    ///
    /// # Returns
    /// An `InputSizeMismatch` error if the grid doesn't match the network's geometry.
    pub fn set_inputs(&mut self, intensities: &[u8]) -> Result<()> {
        if intensities.len() != self.inputs.len() {
            return Err(NetErr::InputSizeMismatch {
                got: intensities.len(),
                expected: self.inputs.len(),
            });
        }

        self.inputs
            .iter_mut()
            .zip(intensities)
            .for_each(|(unit, &v)| unit.set_value(v as f64));

        Ok(())
    }

    /// The output unit with the highest activation, the first one on ties.
    pub fn most_activated(&self) -> &OutputUnit {
        let mut best = &self.outputs[0];
        for output in &self.outputs[1..] {
            if output.value() > best.value() {
                best = output;
            }
        }

        best
    }

    pub(crate) fn parts_mut(&mut self) -> (&mut [InputUnit], &mut [Layer], &mut [OutputUnit]) {
        (&mut self.inputs, &mut self.hidden, &mut self.outputs)
    }
}
