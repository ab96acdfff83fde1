//! Whole-buffer JSON framing for the bridge wire protocol.
//!
//! The wire format carries no length prefix and no delimiter: a message ends
//! wherever one complete JSON value ends. [`FramedReader`] accumulates raw
//! bytes per connection and re-attempts a full parse after every chunk.
//! Incomplete input is invisible to the peer; the reader simply asks for
//! more data. No maximum buffer size is enforced.

use bytes::BytesMut;
use log::debug;
use thiserror::Error;

use crate::command::Command;

/// Maximum number of payload bytes quoted in diagnostics.
const SNIPPET_LEN: usize = 200;

/// Errors that make a byte stream unrecoverable.
///
/// Incomplete JSON is not an error at this layer. A syntax error that more
/// input cannot repair is: once the accumulator holds malformed data, every
/// later parse attempt would fail at the same offset, so the connection must
/// close.
#[derive(Debug, Error)]
pub enum FrameError {
    /// The accumulator contains JSON that no further bytes can complete.
    #[error("malformed request: {source} (payload snippet: {snippet:?})")]
    Malformed {
        /// Underlying parse failure.
        #[source]
        source: serde_json::Error,
        /// Leading bytes of the offending payload, for desync diagnosis.
        snippet: String,
    },
}

/// Per-connection accumulator yielding one decoded [`Command`] at a time.
#[derive(Debug, Default)]
pub struct FramedReader {
    buf: BytesMut,
}

impl FramedReader {
    /// Create an empty reader.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Append `chunk` and attempt to parse the whole accumulator.
    ///
    /// Returns `Ok(Some(command))` once a complete JSON value has arrived.
    /// The accumulator is then cleared in its entirety: pipelining is
    /// forbidden by the wire contract, so any bytes after the parsed value
    /// are discarded, never delivered as part of the next command.
    ///
    /// Returns `Ok(None)` while the buffered input is an incomplete prefix
    /// of a JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::Malformed`] when the buffered input can never
    /// become valid JSON, including invalid UTF-8.
    pub fn push(&mut self, chunk: &[u8]) -> Result<Option<Command>, FrameError> {
        self.buf.extend_from_slice(chunk);

        let mut values = serde_json::Deserializer::from_slice(&self.buf).into_iter::<Command>();
        let first = values.next();
        let consumed = values.byte_offset();
        drop(values);

        match first {
            // Whitespace-only buffer: nothing to parse yet.
            None => Ok(None),
            Some(Ok(command)) => {
                let trailing = self.buf.len() - consumed;
                if trailing > 0 {
                    debug!("discarding {trailing} trailing bytes after a complete request");
                }
                self.buf.clear();
                Ok(Some(command))
            }
            Some(Err(source)) if source.is_eof() => Ok(None),
            Some(Err(source)) => Err(FrameError::Malformed {
                source,
                snippet: snippet(&self.buf),
            }),
        }
    }

    /// Number of bytes currently accumulated.
    #[must_use]
    pub fn buffered(&self) -> usize { self.buf.len() }
}

/// Quote the leading bytes of `payload` for error messages.
pub(crate) fn snippet(payload: &[u8]) -> String {
    let end = payload.len().min(SNIPPET_LEN);
    String::from_utf8_lossy(&payload[..end]).into_owned()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn complete_value_in_one_chunk_is_decoded() {
        let mut reader = FramedReader::new();
        let decoded = reader
            .push(br#"{"type":"get_session_info","params":{}}"#)
            .expect("push");
        let command = decoded.expect("complete command");
        assert_eq!(command.kind, "get_session_info");
        assert_eq!(reader.buffered(), 0);
    }

    #[test]
    fn split_chunks_accumulate_until_complete() {
        let mut reader = FramedReader::new();
        assert!(reader.push(br#"{"type":"set_te"#).expect("push").is_none());
        assert!(reader.buffered() > 0);
        let decoded = reader
            .push(br#"mpo","params":{"tempo":92.5}}"#)
            .expect("push")
            .expect("complete command");
        assert_eq!(decoded.kind, "set_tempo");
        assert_eq!(decoded.params["tempo"], 92.5);
    }

    #[test]
    fn chunk_boundary_may_split_a_multibyte_character() {
        let mut reader = FramedReader::new();
        let payload = r#"{"type":"set_track_name","params":{"name":"Pad é"}}"#.as_bytes();
        let split = payload.len() - 4; // inside the two-byte "é"
        assert!(reader.push(&payload[..split]).expect("push").is_none());
        let decoded = reader
            .push(&payload[split..])
            .expect("push")
            .expect("complete command");
        assert_eq!(decoded.params["name"], "Pad é");
    }

    #[test]
    fn trailing_bytes_after_complete_value_are_discarded() {
        let mut reader = FramedReader::new();
        let pipelined =
            br#"{"type":"start_playback","params":{}}{"type":"stop_playback","params":{}}"#;
        let first = reader.push(pipelined).expect("push").expect("first command");
        assert_eq!(first.kind, "start_playback");
        // The second request was dropped with the rest of the buffer; new
        // input starts from a clean accumulator.
        assert_eq!(reader.buffered(), 0);
        let next = reader
            .push(br#"{"type":"get_session_info","params":{}}"#)
            .expect("push")
            .expect("next command");
        assert_eq!(next.kind, "get_session_info");
    }

    #[rstest]
    #[case::not_json(b"hello there".as_slice())]
    #[case::wrong_shape(br#"[1,2,3]"#.as_slice())]
    #[case::invalid_utf8(&[0x7b, 0x22, 0xff, 0xfe][..])]
    fn unrecoverable_input_is_malformed(#[case] chunk: &[u8]) {
        let mut reader = FramedReader::new();
        let err = reader.push(chunk).expect_err("malformed");
        assert!(matches!(err, FrameError::Malformed { .. }));
    }

    #[test]
    fn whitespace_only_buffer_is_incomplete() {
        let mut reader = FramedReader::new();
        assert!(reader.push(b"  \n\t").expect("push").is_none());
    }

    #[test]
    fn malformed_error_quotes_a_snippet() {
        let mut reader = FramedReader::new();
        let err = reader.push(b"garbage bytes").expect_err("malformed");
        assert!(err.to_string().contains("garbage bytes"));
    }
}
