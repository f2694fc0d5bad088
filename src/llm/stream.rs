use anyhow::Result;
use futures::{Stream, StreamExt};
use std::pin::Pin;
use tracing::{debug, warn};

use crate::llm::ChatError;
use crate::llm::client_core::OllamaClient;
use crate::llm::tool_def::ToolDef;
use crate::llm::types::{ChatMessage, ChatRequest, StreamChunk};

pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<StreamChunk>> + Send>>;

impl OllamaClient {
    /// Open one streamed chat turn. Fails on connect errors and non-success
    /// statuses; mid-stream transport errors surface as stream items.
    pub async fn chat_stream(
        &self,
        model: &str,
        messages: &[ChatMessage],
        tools: &[ToolDef],
    ) -> Result<ChunkStream> {
        let url = self.endpoint();
        let req = ChatRequest {
            model,
            messages,
            stream: true,
            tools,
        };

        if let Ok(payload) = serde_json::to_string_pretty(&req) {
            debug!(payload=%payload, endpoint=%url, "sending chat payload (stream)");
        }

        let resp = self
            .inner
            .post(url)
            .json(&req)
            .send()
            .await
            .map_err(|e| ChatError::from_send(url, e))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(ChatError::Status { status, body }.into());
        }

        let bytes = resp.bytes_stream().map(|r| r.map_err(ChatError::Body));
        Ok(Box::pin(decode_ndjson(bytes)))
    }
}

/// Turn a byte stream into parsed NDJSON fragments.
///
/// Lines that are not valid UTF-8 or not valid JSON are dropped with a
/// warning; only errors of the underlying byte stream end the stream.
pub fn decode_ndjson<S, B, E>(bytes: S) -> impl Stream<Item = Result<StreamChunk>> + Send
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: std::error::Error + Send + Sync + 'static,
{
    async_stream::try_stream! {
        futures::pin_mut!(bytes);
        let mut decoder = NdjsonDecoder::new();
        while let Some(chunk) = bytes.next().await {
            let chunk = chunk.map_err(anyhow::Error::new)?;
            for parsed in decoder.push(chunk.as_ref()) {
                yield parsed;
            }
        }
        if let Some(parsed) = decoder.finish() {
            yield parsed;
        }
    }
}

// Reassembles lines split across network reads
#[derive(Debug, Default)]
pub struct NdjsonDecoder {
    buf: Vec<u8>,
}

impl NdjsonDecoder {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    pub fn push(&mut self, bytes: &[u8]) -> Vec<StreamChunk> {
        self.buf.extend_from_slice(bytes);
        let mut out = Vec::new();
        while let Some(pos) = self.buf.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buf.drain(..=pos).collect();
            if let Some(chunk) = parse_line(&line) {
                out.push(chunk);
            }
        }
        out
    }

    /// Decode whatever is left once the body ends without a trailing newline.
    pub fn finish(&mut self) -> Option<StreamChunk> {
        let rest = std::mem::take(&mut self.buf);
        parse_line(&rest)
    }
}

fn parse_line(line: &[u8]) -> Option<StreamChunk> {
    let Ok(s) = std::str::from_utf8(line) else {
        warn!(len = line.len(), "skipping non utf-8 stream line");
        return None;
    };
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    debug!(response_chunk=%s, "llm chat_stream response");
    match serde_json::from_str::<StreamChunk>(s) {
        Ok(chunk) => Some(chunk),
        Err(e) => {
            warn!(payload = s, error = %e, "failed to parse stream chunk");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reassembles_lines_split_across_reads() {
        let mut d = NdjsonDecoder::new();
        assert!(d.push(br#"{"message":{"content":"Hel"#).is_empty());
        let out = d.push(b"lo\"},\"done\":false}\n{\"done\":true}\n");
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].message.as_ref().unwrap().content, "Hello");
        assert!(out[1].done);
        assert!(d.finish().is_none());
    }

    #[test]
    fn skips_garbage_and_blank_lines() {
        let mut d = NdjsonDecoder::new();
        let out = d.push(b"\n   \nnot json\n{\"done\":false}\n\xff\xfe\n");
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn finish_decodes_unterminated_tail() {
        let mut d = NdjsonDecoder::new();
        assert!(d.push(br#"{"message":{"content":"tail"},"done":false}"#).is_empty());
        let last = d.finish().unwrap();
        assert_eq!(last.message.unwrap().content, "tail");
    }

    #[tokio::test]
    async fn decode_stream_propagates_transport_errors() {
        let parts: Vec<std::result::Result<Vec<u8>, std::io::Error>> = vec![
            Ok(b"{\"done\":false}\n".to_vec()),
            Err(std::io::Error::other("reset")),
        ];
        let s = decode_ndjson(futures::stream::iter(parts));
        futures::pin_mut!(s);
        assert!(s.next().await.unwrap().is_ok());
        assert!(s.next().await.unwrap().is_err());
    }
}
