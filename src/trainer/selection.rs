use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{neural_net::Network, KeyIdentifier};

/// How the action to emit is picked from the output activations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Selection {
    /// The most activated output.
    #[default]
    Greedy,
    /// Every activation is scaled by a uniform draw in `[0, 1)` and the largest product wins.
    Weighted,
}

impl Selection {
    pub fn choose<R: Rng>(self, net: &Network, rng: &mut R) -> KeyIdentifier {
        match self {
            Selection::Greedy => net.most_activated().label(),
            Selection::Weighted => {
                let mut best = None;
                for output in net.outputs() {
                    let chance = rng.random::<f64>() * output.value();
                    match best {
                        Some((_, top)) if chance <= top => {}
                        _ => best = Some((output.label(), chance)),
                    }
                }

                best.map_or_else(|| net.most_activated().label(), |(label, _)| label)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::{
        feedforward::Feedforward,
        neural_net::{NetKind, NetworkBuilder, NetworkSpec, ParamInit},
    };

    fn net_favoring_b() -> Network {
        let spec = NetworkSpec {
            name: "sel".into(),
            kind: NetKind::Reinforcement,
            input_width: 1,
            input_height: 1,
            hidden_layers: 1,
            hidden_units: 1,
            outputs: vec![KeyIdentifier::A, KeyIdentifier::B],
            region: None,
            focus: None,
        };

        let mut net = NetworkBuilder::new()
            .weights(ParamInit::Constant(0.))
            .biases(ParamInit::Constant(0.))
            .build(&spec)
            .unwrap();
        net.output_mut(0).unwrap().set_bias(-40.);
        net.output_mut(1).unwrap().set_bias(4.);
        net.forward();
        net
    }

    #[test]
    fn greedy_picks_most_activated() {
        let net = net_favoring_b();
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(Selection::Greedy.choose(&net, &mut rng), KeyIdentifier::B);
    }

    #[test]
    fn weighted_never_picks_a_silent_output() {
        let net = net_favoring_b();
        let mut rng = StdRng::seed_from_u64(0);

        // An activation of ~4e-18 can't beat ~0.98 times a draw unless the draw is tiny.
        let picks = (0..100)
            .filter(|_| Selection::Weighted.choose(&net, &mut rng) == KeyIdentifier::B)
            .count();
        assert!(picks >= 99);
    }
}
