//! Channel layer: output accumulation, pattern helpers and polling.

mod buffer;
pub mod patterns;
mod poll;

pub use buffer::CaptureBuffer;
pub use poll::{Poll, poll_chunk};
