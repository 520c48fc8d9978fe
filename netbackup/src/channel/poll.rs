//! Poll-with-deadline read primitive shared by every capture path.

use std::time::Duration;

use log::trace;

use crate::error::Result;
use crate::transport::SessionTransport;

/// Outcome of one polling cycle.
#[derive(Debug, PartialEq, Eq)]
pub enum Poll {
    /// New data arrived.
    Data(Vec<u8>),

    /// Nothing arrived within the polling interval.
    Idle,

    /// The stream ended and nothing is left to read.
    Closed,
}

/// Wait up to `wait` for output and take at most `max_bytes` of it.
///
/// Buffered data is always drained before end-of-stream is reported.
pub async fn poll_chunk(
    transport: &mut dyn SessionTransport,
    wait: Duration,
    max_bytes: usize,
) -> Result<Poll> {
    if transport.is_data_available() || transport.poll(wait).await? {
        let chunk = transport.receive(max_bytes);
        trace!("poll: {} bytes", chunk.len());
        return Ok(Poll::Data(chunk));
    }

    if transport.is_eof() {
        Ok(Poll::Closed)
    } else {
        Ok(Poll::Idle)
    }
}
