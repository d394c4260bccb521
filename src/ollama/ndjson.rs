use bytes::{Bytes, BytesMut};
use futures::stream::{Stream, StreamExt};
use serde::de::DeserializeOwned;

use super::error::ProviderError;

/// Incremental parser for newline-delimited JSON bodies.
///
/// Bytes are buffered until a full line arrives, so multi-byte characters
/// split across network chunks decode correctly.
pub struct NdjsonParser {
    buffer: BytesMut,
}

impl NdjsonParser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::new(),
        }
    }

    pub fn process_chunk<T: DeserializeOwned>(&mut self, chunk: &[u8]) -> Vec<Result<T, ProviderError>> {
        self.buffer.extend_from_slice(chunk);

        let mut items = Vec::new();

        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line = self.buffer.split_to(pos + 1);
            if let Some(item) = Self::decode_line(&line) {
                items.push(item);
            }
        }

        items
    }

    /// Decodes whatever is left in the buffer once the body has ended.
    pub fn finish<T: DeserializeOwned>(&mut self) -> Option<Result<T, ProviderError>> {
        let rest = self.buffer.split();
        Self::decode_line(&rest)
    }

    fn decode_line<T: DeserializeOwned>(line: &[u8]) -> Option<Result<T, ProviderError>> {
        let text = match std::str::from_utf8(line) {
            Ok(text) => text.trim(),
            Err(e) => return Some(Err(ProviderError::ParseError(e.to_string()))),
        };

        if text.is_empty() {
            return None;
        }

        Some(
            serde_json::from_str(text)
                .map_err(|e| ProviderError::ParseError(format!("{e}: {text}"))),
        )
    }

    pub fn parse_stream<S, T>(byte_stream: S) -> impl Stream<Item = Result<T, ProviderError>>
    where
        S: Stream<Item = Result<Bytes, reqwest::Error>> + Unpin,
        T: DeserializeOwned,
    {
        byte_stream
            .map(Some)
            .chain(futures::stream::once(async { None }))
            .scan(Self::new(), |parser, result| {
                let items: Vec<Result<T, ProviderError>> = match result {
                    Some(Ok(bytes)) => parser.process_chunk(&bytes),
                    Some(Err(e)) => vec![Err(ProviderError::StreamError(e.to_string()))],
                    None => parser.finish().into_iter().collect(),
                };
                futures::future::ready(Some(items))
            })
            .flat_map(futures::stream::iter)
    }
}

impl Default for NdjsonParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Line {
        n: u32,
    }

    #[test]
    fn parses_complete_lines() {
        let mut parser = NdjsonParser::new();
        let items: Vec<Result<Line, _>> = parser.process_chunk(b"{\"n\":1}\n{\"n\":2}\n");

        let values: Vec<u32> = items.into_iter().map(|r| r.unwrap().n).collect();
        assert_eq!(values, vec![1, 2]);
    }

    #[test]
    fn buffers_partial_lines() {
        let mut parser = NdjsonParser::new();

        let first: Vec<Result<Line, _>> = parser.process_chunk(b"{\"n\":");
        assert!(first.is_empty());

        let second: Vec<Result<Line, _>> = parser.process_chunk(b"7}\n");
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].as_ref().unwrap().n, 7);
    }

    #[test]
    fn multibyte_characters_survive_chunk_boundaries() {
        #[derive(Deserialize)]
        struct Text {
            s: String,
        }

        let line = "{\"s\":\"héllo\"}\n".as_bytes();
        let split_at = line.iter().position(|b| *b == 0xC3).unwrap() + 1;

        let mut parser = NdjsonParser::new();
        let first: Vec<Result<Text, _>> = parser.process_chunk(&line[..split_at]);
        let second: Vec<Result<Text, _>> = parser.process_chunk(&line[split_at..]);

        assert!(first.is_empty());
        assert_eq!(second[0].as_ref().unwrap().s, "héllo");
    }

    #[test]
    fn skips_blank_lines_and_reports_bad_json() {
        let mut parser = NdjsonParser::new();
        let items: Vec<Result<Line, _>> = parser.process_chunk(b"\n\r\nnot json\n");

        assert_eq!(items.len(), 1);
        assert!(matches!(items[0], Err(ProviderError::ParseError(_))));
    }

    #[test]
    fn finish_flushes_unterminated_line() {
        let mut parser = NdjsonParser::new();
        let items: Vec<Result<Line, _>> = parser.process_chunk(b"{\"n\":3}");
        assert!(items.is_empty());

        let last: Option<Result<Line, _>> = parser.finish();
        assert_eq!(last.unwrap().unwrap().n, 3);
    }

    #[tokio::test]
    async fn parse_stream_yields_in_order() {
        let chunks: Vec<Result<Bytes, reqwest::Error>> = vec![
            Ok(Bytes::from_static(b"{\"n\":1}\n{\"n\"")),
            Ok(Bytes::from_static(b":2}\n{\"n\":3}")),
        ];

        let parsed: Vec<u32> = NdjsonParser::parse_stream::<_, Line>(futures::stream::iter(chunks))
            .map(|r| r.unwrap().n)
            .collect()
            .await;

        assert_eq!(parsed, vec![1, 2, 3]);
    }
}
