pub mod codec;
mod store;

pub use codec::{decode, encode};
pub use store::NetworkStore;
