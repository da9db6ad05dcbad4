//! Server-sent event decoding for streamed completions.

use crate::error::{LlmccError, Result};
use futures::StreamExt;

/// Whether the consumer wants more events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Done,
}

/// Incremental `text/event-stream` decoder.
///
/// Buffers raw bytes so a UTF-8 sequence split across network chunks is
/// decoded only once the full line has arrived. The `data:` lines of one
/// event are joined with `\n` and yielded when the blank line ending the
/// event is seen.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    data: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a body chunk, returning the payload of every completed event
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);

        let mut payloads = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(payload) = self.handle_line(&line) {
                payloads.push(payload);
            }
        }
        payloads
    }

    /// Flush an event cut off by the end of the body
    pub fn finish(&mut self) -> Option<String> {
        let line = std::mem::take(&mut self.buffer);
        if let Some(data) = data_field(&line) {
            self.data.push(data);
        }
        self.dispatch()
    }

    fn handle_line(&mut self, line: &[u8]) -> Option<String> {
        if line.iter().all(|&b| b == b'\n' || b == b'\r') {
            return self.dispatch();
        }
        if let Some(data) = data_field(line) {
            self.data.push(data);
        }
        None
    }

    fn dispatch(&mut self) -> Option<String> {
        if self.data.is_empty() {
            return None;
        }
        let payload = self.data.join("\n");
        self.data.clear();
        Some(payload)
    }
}

fn data_field(line: &[u8]) -> Option<String> {
    let line = String::from_utf8_lossy(line);
    let line = line.trim_end_matches(['\n', '\r']);

    // Payloads carry their own `type`, so only `data:` lines matter
    let data = line.strip_prefix("data:")?;
    Some(data.strip_prefix(' ').unwrap_or(data).to_string())
}

/// Read an HTTP response as an event stream, handing every `data:` payload
/// to `on_data` until it returns [`Flow::Done`] or the body ends.
pub async fn drain<F>(response: reqwest::Response, mut on_data: F) -> Result<()>
where
    F: FnMut(&str) -> Result<Flow>,
{
    let response = check_status(response).await?;
    let mut stream = response.bytes_stream();
    let mut decoder = SseDecoder::new();

    while let Some(chunk) = stream.next().await {
        let bytes = chunk?;
        for data in decoder.push(&bytes) {
            if on_data(&data)? == Flow::Done {
                return Ok(());
            }
        }
    }

    if let Some(data) = decoder.finish() {
        on_data(&data)?;
    }
    Ok(())
}

/// Turn a non-success status into an API error carrying the response body
pub async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    tracing::error!(target: "llm", status = %status, error = %body, "LLM call returned error");
    Err(LlmccError::Api { status, body })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yields_event_payloads() {
        let mut decoder = SseDecoder::new();
        let payloads =
            decoder.push(b"event: ping\ndata: {\"a\":1}\n\n: keep-alive\n\ndata:[DONE]\n\n");
        assert_eq!(payloads, vec!["{\"a\":1}".to_string(), "[DONE]".to_string()]);
    }

    #[test]
    fn test_event_waits_for_blank_line() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"data: hel").is_empty());
        assert!(decoder.push(b"lo\r\n").is_empty());
        assert_eq!(decoder.push(b"\r\n"), vec!["hello".to_string()]);
    }

    #[test]
    fn test_multiline_data_is_joined() {
        let mut decoder = SseDecoder::new();
        let payloads = decoder.push(b"data: {\"text\":\ndata: \"hi\"}\n\ndata: next\n\n");
        assert_eq!(
            payloads,
            vec!["{\"text\":\n\"hi\"}".to_string(), "next".to_string()]
        );
        let value: serde_json::Value = serde_json::from_str(&payloads[0]).unwrap();
        assert_eq!(value["text"], "hi");
    }

    #[test]
    fn test_multibyte_split_across_chunks() {
        let line = "data: héllo\n\n".as_bytes();
        // split inside the two-byte 'é'
        let (head, tail) = line.split_at(8);

        let mut decoder = SseDecoder::new();
        assert!(decoder.push(head).is_empty());
        assert_eq!(decoder.push(tail), vec!["héllo".to_string()]);
    }

    #[test]
    fn test_finish_flushes_unterminated_event() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"data: one\ndata: tail").is_empty());
        assert_eq!(decoder.finish(), Some("one\ntail".to_string()));
        assert_eq!(decoder.finish(), None);
    }
}
