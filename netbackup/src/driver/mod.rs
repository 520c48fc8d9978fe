//! Device interaction: the capture automaton and output sanitizing.

mod automaton;
mod response;
mod sanitize;

pub use automaton::{Automaton, State};
pub use response::Capture;
pub use sanitize::sanitize;
