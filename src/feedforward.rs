use crate::neural_net::{HiddenUnit, Network, Sigmoid};

/// A model that can turn its current inputs into activations.
pub trait Feedforward {
    /// Recomputes every activation from the current inputs, weights and biases.
    fn forward(&mut self);
}

impl Feedforward for Network {
    fn forward(&mut self) {
        propagate(self);
    }
}

/// Makes a forward pass through `net`, writing each unit's post activation `value`.
///
/// The first hidden layer consumes the inputs normalized to `[0, 1]`, every other layer
/// consumes the activations of the layer before it. No state other than the inputs, weights
/// and biases takes part, so equal networks always produce bit identical activations.
pub fn propagate(net: &mut Network) {
    let (inputs, hidden, outputs) = net.parts_mut();

    for (n, unit) in hidden[0].units_mut().iter_mut().enumerate() {
        let z = inputs
            .iter()
            .fold(0., |acc, input| acc + input.normalized() * input.weights()[n]);

        unit.set_value(Sigmoid::f(z + unit.bias()));
    }

    for l in 1..hidden.len() {
        let (done, rest) = hidden.split_at_mut(l);
        let prev = done[l - 1].units();

        for (n, unit) in rest[0].units_mut().iter_mut().enumerate() {
            unit.set_value(Sigmoid::f(weighted_sum(prev, n) + unit.bias()));
        }
    }

    let last = hidden[hidden.len() - 1].units();
    for (o, output) in outputs.iter_mut().enumerate() {
        output.set_value(Sigmoid::f(weighted_sum(last, o) + output.bias()));
    }
}

fn weighted_sum(prev: &[HiddenUnit], n: usize) -> f64 {
    prev.iter()
        .fold(0., |acc, unit| acc + unit.value() * unit.weights()[n])
}
