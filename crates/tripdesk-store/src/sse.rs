//! Minimal Server-Sent Events framing for the push channel.
//!
//! Only `data:` frames are used by the TripDesk API; everything else
//! (comments, event names, retry hints) is ignored. Frames that fail
//! [`ChangeEvent`] validation are dropped with a debug log rather than
//! killing the stream.

use futures::{Stream, StreamExt};

use tripdesk_types::ChangeEvent;

/// Byte-stream line assembler. SSE frames arrive in arbitrary chunk
/// boundaries; this buffers until a full line is available.
pub(crate) struct LineBuffer {
    buf: Vec<u8>,
}

impl LineBuffer {
    pub(crate) fn new() -> Self {
        Self { buf: Vec::new() }
    }

    pub(crate) fn extend(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Next complete line, without its terminator. `\r\n` and `\n` both end
    /// a line.
    pub(crate) fn next_line(&mut self) -> Option<String> {
        let pos = self.buf.iter().position(|&b| b == b'\n')?;
        let raw: Vec<u8> = self.buf.drain(..=pos).collect();
        let line = String::from_utf8_lossy(&raw);
        Some(line.trim_end_matches(['\n', '\r']).to_string())
    }
}

/// Parse one SSE line into a change event, if it carries one.
pub(crate) fn parse_frame(line: &str) -> Option<ChangeEvent> {
    let data = line.strip_prefix("data:")?.trim_start();
    match serde_json::from_str::<ChangeEvent>(data) {
        Ok(event) => Some(event),
        Err(e) => {
            tracing::debug!(error = %e, frame = data, "dropping malformed event frame");
            None
        }
    }
}

/// Decode a response body into validated change events.
pub(crate) fn change_events(
    response: reqwest::Response,
) -> impl Stream<Item = ChangeEvent> + Send {
    async_stream::stream! {
        let mut chunks = Box::pin(response.bytes_stream());
        let mut buffer = LineBuffer::new();
        loop {
            match chunks.next().await {
                Some(Ok(bytes)) => {
                    buffer.extend(&bytes);
                    while let Some(line) = buffer.next_line() {
                        if let Some(event) = parse_frame(&line) {
                            yield event;
                        }
                    }
                }
                Some(Err(e)) => {
                    tracing::debug!(error = %e, "event stream read failed");
                    break;
                }
                None => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_buffer_reassembles_split_chunks() {
        let mut buffer = LineBuffer::new();
        buffer.extend(b"data: {\"type\":");
        assert_eq!(buffer.next_line(), None);

        buffer.extend(b"\"list_updated\"}\r\ndata:");
        assert_eq!(
            buffer.next_line(),
            Some("data: {\"type\":\"list_updated\"}".to_string())
        );
        assert_eq!(buffer.next_line(), None);
    }

    #[test]
    fn parse_frame_accepts_valid_events() {
        let event = parse_frame(r#"data: {"type":"refresh_unread"}"#);
        assert_eq!(event, Some(ChangeEvent::RefreshUnread));
    }

    #[test]
    fn parse_frame_ignores_non_data_lines() {
        assert_eq!(parse_frame(": keep-alive"), None);
        assert_eq!(parse_frame("event: message"), None);
        assert_eq!(parse_frame(""), None);
    }

    #[test]
    fn parse_frame_drops_malformed_payloads() {
        assert_eq!(parse_frame("data: {\"type\":\"promo_banner\"}"), None);
        assert_eq!(parse_frame("data: not-json"), None);
    }
}
