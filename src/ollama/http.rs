use bytes::Bytes;
use futures::stream::BoxStream;
use futures::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::RetryTransientMiddleware;
use reqwest_retry::policies::ExponentialBackoff;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::error::ProviderError;

pub type ByteStream = BoxStream<'static, Result<Bytes, reqwest::Error>>;

/// Transport settings. There is deliberately no overall request timeout:
/// generations and model pulls stream for as long as the server sends.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub connect_timeout: Duration,
    pub max_retries: u32,
    pub retry_bounds: (Duration, Duration),
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            max_retries: 2,
            retry_bounds: (Duration::from_millis(250), Duration::from_secs(5)),
        }
    }
}

impl HttpConfig {
    #[must_use]
    pub const fn without_retries(mut self) -> Self {
        self.max_retries = 0;
        self
    }
}

/// HTTP access to one server, with retries on transient connection
/// failures. Paths are joined onto the base URL.
#[derive(Clone)]
pub struct HttpClient {
    inner: ClientWithMiddleware,
    base_url: String,
}

impl HttpClient {
    pub fn new(base_url: &str, config: &HttpConfig) -> Result<Self, ProviderError> {
        let base_url = normalize_base_url(base_url)?;

        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .user_agent(concat!("ollama-chat/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ProviderError::Configuration(format!("cannot build HTTP client: {e}")))?;

        let (min_delay, max_delay) = config.retry_bounds;
        let retry_policy = ExponentialBackoff::builder()
            .retry_bounds(min_delay, max_delay)
            .build_with_max_retries(config.max_retries);

        Ok(Self {
            inner: ClientBuilder::new(client)
                .with(RetryTransientMiddleware::new_with_policy(retry_policy))
                .build(),
            base_url,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ProviderError> {
        let response = self.inner.get(self.url(path)).send().await?;
        Ok(ensure_success(response).await?.json().await?)
    }

    /// POSTs `body` and hands back the raw response body as it arrives.
    pub async fn post_streaming<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ByteStream, ProviderError> {
        let response = self
            .inner
            .post(self.url(path))
            .header(CONTENT_TYPE, "application/json")
            .body(json_body(body)?)
            .send()
            .await?;
        Ok(ensure_success(response).await?.bytes_stream().boxed())
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

fn json_body<B: Serialize>(body: &B) -> Result<Vec<u8>, ProviderError> {
    serde_json::to_vec(body).map_err(|e| ProviderError::Configuration(format!("unencodable request: {e}")))
}

async fn ensure_success(response: Response) -> Result<Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ProviderError::from_response(status.as_u16(), &body))
}

fn normalize_base_url(raw: &str) -> Result<String, ProviderError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ProviderError::Configuration("server URL must not be empty".into()));
    }
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.to_string())
    } else if trimmed.contains("://") {
        Err(ProviderError::Configuration(format!("unsupported scheme in {trimmed}")))
    } else {
        Ok(format!("http://{trimmed}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalized() {
        assert_eq!(normalize_base_url("http://localhost:11434/").unwrap(), "http://localhost:11434");
        assert_eq!(normalize_base_url(" gpu-box:11434 ").unwrap(), "http://gpu-box:11434");
        assert!(normalize_base_url("").is_err());
        assert!(normalize_base_url("ftp://host").is_err());
    }

    #[test]
    fn paths_join_onto_base() {
        let client = HttpClient::new("http://127.0.0.1:11434/", &HttpConfig::default()).unwrap();
        assert_eq!(client.url("/api/tags"), "http://127.0.0.1:11434/api/tags");
        assert!(format!("{client:?}").contains("127.0.0.1"));
    }

    /// Accepts one connection, answers with `reply` and returns the raw request.
    async fn serve_once(listener: tokio::net::TcpListener, reply: &'static str) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            request.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&request).to_string();
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text
                    .lines()
                    .find_map(|l| l.to_ascii_lowercase().strip_prefix("content-length:").map(|v| v.trim().parse::<usize>().unwrap()))
                    .unwrap_or(0);
                if request.len() >= end + 4 + length {
                    break;
                }
            }
            if n == 0 {
                break;
            }
        }

        let response = format!(
            "HTTP/1.1 200 OK\r\ncontent-type: application/x-ndjson\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{reply}",
            reply.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        String::from_utf8(request).unwrap()
    }

    #[tokio::test]
    async fn streaming_post_sends_json_body() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(serve_once(listener, "{\"done\":true}\n"));

        let client = HttpClient::new(&format!("http://{addr}"), &HttpConfig::default().without_retries()).unwrap();
        let mut stream = client
            .post_streaming("/api/chat", &serde_json::json!({ "model": "llama3", "stream": true }))
            .await
            .unwrap();
        let mut body = Vec::new();
        while let Some(chunk) = stream.next().await {
            body.extend_from_slice(&chunk.unwrap());
        }

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/chat "));
        assert!(request.to_ascii_lowercase().contains("content-type: application/json"));
        assert!(request.ends_with(r#"{"model":"llama3","stream":true}"#));
        assert_eq!(body, b"{\"done\":true}\n");
    }
}
