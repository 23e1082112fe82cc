mod activation;
mod builder;
mod network;
mod unit;

pub use activation::Sigmoid;
pub use builder::{NetworkBuilder, NetworkSpec, ParamInit};
pub use network::{NetKind, Network, Rect, TrainedTime};
pub use unit::{HiddenUnit, InputUnit, Layer, OutputUnit};
