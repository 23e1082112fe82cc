pub mod feedforward;
pub mod headless;
pub mod neural_net;
pub mod optimizer;
pub mod persistence;
pub mod sgd;
pub mod trainer;

mod error;
mod key;

pub use error::{NetErr, Result};
pub use key::KeyIdentifier;
pub use neural_net::{NetKind, Network, NetworkBuilder, NetworkSpec};
pub use persistence::NetworkStore;
