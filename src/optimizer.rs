use crate::{neural_net::NetKind, neural_net::Network, KeyIdentifier, Result};

/// What one backward pass trains towards: the output labeled `target`, scaled by `reward`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrainingSignal {
    pub target: KeyIdentifier,
    pub reward: f64,
}

impl TrainingSignal {
    /// Imitation of the key being pressed, always at full strength.
    pub fn supervised(target: KeyIdentifier) -> Self {
        Self { target, reward: 1. }
    }

    /// Reinforcement of the action the network emitted.
    pub fn reinforcement(target: KeyIdentifier, reward: f64) -> Self {
        Self { target, reward }
    }
}

/// Decides, tick by tick, whether and towards what a network is trained.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LabelPolicy {
    /// Train only while a watched key is held down.
    Supervised,
    /// Train every tick on the network's own last action, scaled by the latest reward.
    Reinforcement,
}

impl From<NetKind> for LabelPolicy {
    fn from(kind: NetKind) -> Self {
        match kind {
            NetKind::Supervised => LabelPolicy::Supervised,
            NetKind::Reinforcement => LabelPolicy::Reinforcement,
        }
    }
}

impl LabelPolicy {
    /// Picks this tick's training signal.
    ///
    /// # Arguments
    /// * `pressed` - The key the human is holding, `None` when nothing is held.
    /// * `emitted` - The action the network emitted most recently.
    /// * `reward` - The latest reward received from the external program.
    ///
    /// # Returns
    /// The signal to train on, or `None` if this tick must not train.
    pub fn signal(
        self,
        pressed: Option<KeyIdentifier>,
        emitted: Option<KeyIdentifier>,
        reward: f64,
    ) -> Option<TrainingSignal> {
        match self {
            LabelPolicy::Supervised => pressed.map(TrainingSignal::supervised),
            LabelPolicy::Reinforcement => {
                emitted.map(|target| TrainingSignal::reinforcement(target, reward))
            }
        }
    }
}

/// Updates a network's parameters from its last forward pass.
pub trait Optimizer {
    /// Makes one backward pass on `net` and applies the resulting update.
    ///
    /// # Returns
    /// An error if `signal` names a label that isn't one of `net`'s outputs.
    fn step(&self, net: &mut Network, signal: TrainingSignal) -> Result<()>;
}
