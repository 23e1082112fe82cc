use crate::{
    neural_net::{Network, Sigmoid},
    optimizer::{Optimizer, TrainingSignal},
    NetErr, Result,
};

/// Online gradient descent: one backward pass and update per training tick.
#[derive(Clone, Copy, Debug)]
pub struct Sgd {
    eta: f64,
}

impl Sgd {
    /// Creates a new `Sgd` optimizer.
    ///
    /// # Arguments
    /// * `eta` - The learning rate, scales every update.
    pub fn new(eta: f64) -> Self {
        Self { eta }
    }

    pub fn learning_rate(&self) -> f64 {
        self.eta
    }

    /// Computes every unit's error signal and moves biases and weights along it.
    ///
    /// Output errors come first. Hidden layers are then processed from the last to the
    /// first, each one reading the freshly computed errors of its successor, so the order
    /// can't be changed. A unit's error is computed with its weights before they move, and
    /// each weight moves by `eta * successor_error * value` using the unit's own activation.
    /// Input weights move by the raw intensity, not the normalized one the forward pass uses.
    pub fn backprop(&self, net: &mut Network, signal: TrainingSignal) -> Result<()> {
        let target = net
            .output_index(signal.target)
            .ok_or_else(|| NetErr::UnknownLabel(signal.target.to_string()))?;

        let eta = self.eta;
        let (inputs, hidden, outputs) = net.parts_mut();

        for (o, output) in outputs.iter_mut().enumerate() {
            let value = output.value();
            let wanted = if o == target {
                signal.reward * (1. - value)
            } else {
                0. - value
            };

            let error = wanted * Sigmoid::df_from_output(value);
            output.set_error(error);
            output.set_bias(output.bias() + eta * error);
        }

        let mut next_errors: Vec<f64> = outputs.iter().map(|o| o.error()).collect();

        for layer in hidden.iter_mut().rev() {
            for unit in layer.units_mut() {
                let value = unit.value();
                let error = unit
                    .weights()
                    .iter()
                    .zip(&next_errors)
                    .fold(0., |acc, (w, e)| acc + e * w * Sigmoid::df_from_output(value));

                unit.set_error(error);
                unit.set_bias(unit.bias() + eta * error);

                for (w, e) in unit.weights_mut().iter_mut().zip(&next_errors) {
                    *w += eta * e * value;
                }
            }

            next_errors.clear();
            next_errors.extend(layer.units().iter().map(|u| u.error()));
        }

        for input in inputs.iter_mut() {
            let value = input.value();
            for (w, e) in input.weights_mut().iter_mut().zip(&next_errors) {
                *w += eta * e * value;
            }
        }

        Ok(())
    }
}

impl Optimizer for Sgd {
    fn step(&self, net: &mut Network, signal: TrainingSignal) -> Result<()> {
        self.backprop(net, signal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        feedforward::Feedforward,
        neural_net::{NetKind, NetworkBuilder, NetworkSpec, ParamInit},
        KeyIdentifier,
    };

    fn zeroed(layers: usize, units: usize, outputs: Vec<KeyIdentifier>) -> Network {
        let spec = NetworkSpec {
            name: "sgd".into(),
            kind: NetKind::Supervised,
            input_width: 2,
            input_height: 1,
            hidden_layers: layers,
            hidden_units: units,
            outputs,
            region: None,
            focus: None,
        };

        NetworkBuilder::new()
            .weights(ParamInit::Constant(0.))
            .biases(ParamInit::Constant(0.))
            .build(&spec)
            .unwrap()
    }

    #[test]
    fn one_supervised_step_matches_formulas() {
        let mut net = zeroed(1, 2, vec![KeyIdentifier::A, KeyIdentifier::B]);
        net.set_inputs(&[40, 200]).unwrap();
        net.forward();
        assert_eq!(net.output(0).unwrap().value(), 0.5);
        assert_eq!(net.output(1).unwrap().value(), 0.5);

        Sgd::new(1.)
            .backprop(&mut net, TrainingSignal::supervised(KeyIdentifier::A))
            .unwrap();

        let error_a = 1. * (1. - 0.5) * 0.5 * (1. - 0.5);
        let error_b = (0. - 0.5) * 0.5 * (1. - 0.5);
        assert!((net.output(0).unwrap().error() - error_a).abs() < 1e-9);
        assert!((net.output(1).unwrap().error() - error_b).abs() < 1e-9);
        assert!((net.output(0).unwrap().bias() - 0.125).abs() < 1e-9);
        assert!((net.output(1).unwrap().bias() + 0.125).abs() < 1e-9);

        // Zero weights carry no error back.
        for unit in net.hidden_layers()[0].units() {
            assert!(unit.error().abs() < 1e-9);
            assert!(unit.bias().abs() < 1e-9);
            assert!((unit.weight(0).unwrap() - error_a * 0.5).abs() < 1e-9);
            assert!((unit.weight(1).unwrap() - error_b * 0.5).abs() < 1e-9);
        }
    }

    #[test]
    fn hidden_error_uses_successor_weights() {
        let mut net = zeroed(2, 1, vec![KeyIdentifier::A]);
        net.hidden_unit_mut(0, 0).unwrap().set_weight(0, 2.).unwrap();
        net.hidden_unit_mut(1, 0).unwrap().set_weight(0, 3.).unwrap();
        net.set_inputs(&[255, 255]).unwrap();
        net.forward();

        let h0 = net.hidden_unit(0, 0).unwrap().value();
        let h1 = net.hidden_unit(1, 0).unwrap().value();
        let out = net.output(0).unwrap().value();

        Sgd::new(0.1)
            .backprop(&mut net, TrainingSignal::supervised(KeyIdentifier::A))
            .unwrap();

        let e_out = (1. - out) * out * (1. - out);
        let e_h1 = e_out * 3. * h1 * (1. - h1);
        let e_h0 = e_h1 * 2. * h0 * (1. - h0);

        assert!((net.hidden_unit(1, 0).unwrap().error() - e_h1).abs() < 1e-12);
        assert!((net.hidden_unit(0, 0).unwrap().error() - e_h0).abs() < 1e-12);
        assert!((net.hidden_unit(1, 0).unwrap().weight(0).unwrap() - (3. + 0.1 * e_out * h1)).abs() < 1e-12);
        assert!((net.hidden_unit(0, 0).unwrap().weight(0).unwrap() - (2. + 0.1 * e_h1 * h0)).abs() < 1e-12);
        assert!((net.input(0).unwrap().weight(0).unwrap() - 0.1 * e_h0 * 255.).abs() < 1e-12);
    }

    #[test]
    fn repeated_training_pulls_target_up_and_others_down() {
        let mut net = zeroed(1, 2, vec![KeyIdentifier::A, KeyIdentifier::B, KeyIdentifier::C]);
        let sgd = Sgd::new(0.1);
        net.set_inputs(&[90, 180]).unwrap();
        net.forward();

        let mut last: Vec<f64> = net.outputs().iter().map(|o| o.value()).collect();
        for _ in 0..50 {
            sgd.step(&mut net, TrainingSignal::supervised(KeyIdentifier::B))
                .unwrap();
            net.forward();

            let now: Vec<f64> = net.outputs().iter().map(|o| o.value()).collect();
            assert!(now[1] > last[1]);
            assert!(now[0] < last[0]);
            assert!(now[2] < last[2]);
            last = now;
        }
    }

    #[test]
    fn negative_reward_pushes_target_down() {
        let mut net = zeroed(1, 2, vec![KeyIdentifier::A, KeyIdentifier::B]);
        net.set_inputs(&[10, 10]).unwrap();
        net.forward();

        Sgd::new(0.5)
            .step(&mut net, TrainingSignal::reinforcement(KeyIdentifier::A, -1.))
            .unwrap();
        net.forward();

        assert!(net.output(0).unwrap().value() < 0.5);
    }

    #[test]
    fn single_unit_network_trains() {
        let spec = NetworkSpec {
            name: "one".into(),
            kind: NetKind::Supervised,
            input_width: 1,
            input_height: 1,
            hidden_layers: 1,
            hidden_units: 1,
            outputs: vec![KeyIdentifier::Space],
            region: None,
            focus: None,
        };
        let mut net = NetworkBuilder::new().seed(9).build(&spec).unwrap();
        net.set_inputs(&[128]).unwrap();

        for _ in 0..10 {
            net.forward();
            Sgd::new(0.5)
                .step(&mut net, TrainingSignal::supervised(KeyIdentifier::Space))
                .unwrap();
        }
    }

    #[test]
    fn unknown_target_is_rejected() {
        let mut net = zeroed(1, 1, vec![KeyIdentifier::A]);
        net.forward();

        let err = Sgd::new(0.5)
            .step(&mut net, TrainingSignal::supervised(KeyIdentifier::Z))
            .unwrap_err();
        assert!(matches!(err, NetErr::UnknownLabel(_)));
    }
}
