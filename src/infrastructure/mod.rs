pub mod key_gate;

pub use key_gate::{KeyGate, StaticKeyGate};
