use super::{ProgressCallback, ProgressEvent, Transport};
use crate::config::ClientConfig;
use crate::error::TransportError;
use crate::upload::CandidateFile;
use async_trait::async_trait;
use futures::{stream, Stream};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, ClientBuilder, Response};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

const CHUNK_SIZE: usize = 64 * 1024;

/// reqwest-backed transport with a base URL, default headers and a default
/// timeout that each call may override.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    config: ClientConfig,
}

impl HttpClient {
    pub fn new(config: ClientConfig) -> Result<Self, TransportError> {
        Self::from_builder(Self::builder(&config), config)
    }

    fn builder(config: &ClientConfig) -> ClientBuilder {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        Client::builder()
            .default_headers(headers)
            .timeout(config.default_timeout)
    }

    fn from_builder(builder: ClientBuilder, config: ClientConfig) -> Result<Self, TransportError> {
        let client = builder
            .build()
            .map_err(|e| TransportError::Other(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn read_json(response: Response) -> Result<Value, TransportError> {
        let status = response.status();
        if status.is_success() {
            return response
                .json::<Value>()
                .await
                .map_err(|e| TransportError::Malformed(e.to_string()));
        }

        let detail = response
            .json::<Value>()
            .await
            .ok()
            .and_then(|body| body.get("detail").and_then(Value::as_str).map(str::to_string));
        Err(TransportError::from_status(status.as_u16(), detail))
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::Connect
    } else if err.is_decode() {
        TransportError::Malformed(err.to_string())
    } else {
        TransportError::Other(err.to_string())
    }
}

/// Streams the content in fixed chunks, reporting each chunk as it is pulled
/// by the connection.
fn progress_chunks(
    file: &CandidateFile,
    on_progress: ProgressCallback,
) -> impl Stream<Item = Result<Vec<u8>, std::io::Error>> + Send + Sync + 'static {
    let content = file.content();
    let total = content.len() as u64;
    let bounds: Vec<(usize, usize)> = (0..content.len())
        .step_by(CHUNK_SIZE)
        .map(|start| (start, (start + CHUNK_SIZE).min(content.len())))
        .collect();

    stream::iter(bounds.into_iter().map(move |(start, end)| {
        on_progress(ProgressEvent {
            sent: end as u64,
            total,
        });
        Ok(content[start..end].to_vec())
    }))
}

#[async_trait]
impl Transport for HttpClient {
    async fn upload_file(
        &self,
        path: &str,
        file: &CandidateFile,
        timeout: Duration,
        on_progress: ProgressCallback,
    ) -> Result<Value, TransportError> {
        let url = self.config.endpoint(path);
        let length = file.content().len() as u64;
        debug!(file = %file.name, %url, length, "Sending upload request");

        let body = Body::wrap_stream(progress_chunks(file, on_progress));
        let part = Part::stream_with_length(body, length)
            .file_name(file.name.clone());
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .timeout(timeout)
            .send()
            .await
            .map_err(classify)?;

        Self::read_json(response).await
    }

    async fn post_json(
        &self,
        path: &str,
        body: &Value,
        timeout: Duration,
    ) -> Result<Value, TransportError> {
        let url = self.config.endpoint(path);
        debug!(%url, timeout_secs = timeout.as_secs(), "Sending JSON request");

        let response = self
            .client
            .post(&url)
            .json(body)
            .timeout(timeout)
            .send()
            .await
            .map_err(classify)?;

        Self::read_json(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::transport::{ANALYZE_MULTI_PATH, UPLOAD_PATH};
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    struct CannedResponse {
        status: &'static str,
        content_type: &'static str,
        body: &'static str,
        delay: Duration,
    }

    impl CannedResponse {
        fn json(status: &'static str, body: &'static str) -> Self {
            Self {
                status,
                content_type: "application/json",
                body,
                delay: Duration::ZERO,
            }
        }
    }

    fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
        haystack.windows(needle.len()).position(|w| w == needle)
    }

    fn request_complete(raw: &[u8]) -> bool {
        let Some(head_end) = find(raw, b"\r\n\r\n") else {
            return false;
        };
        let head = String::from_utf8_lossy(&raw[..head_end]).to_ascii_lowercase();
        let body = &raw[head_end + 4..];
        if head.contains("transfer-encoding: chunked") {
            return find(body, b"0\r\n\r\n").is_some();
        }
        let length = head
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        body.len() >= length
    }

    /// Accepts one connection, reads the whole request, and answers with
    /// `response`. The join handle yields the raw request bytes.
    async fn serve_once(response: CannedResponse) -> (ClientConfig, JoinHandle<Vec<u8>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 8192];
            while !request_complete(&raw) {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                raw.extend_from_slice(&buf[..n]);
            }

            tokio::time::sleep(response.delay).await;
            let reply = format!(
                "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                response.status,
                response.content_type,
                response.body.len(),
                response.body
            );
            let _ = socket.write_all(reply.as_bytes()).await;
            let _ = socket.shutdown().await;
            raw
        });

        let config = ClientConfig::default().with_base_url(format!("http://{}", addr));
        (config, handle)
    }

    fn local_client(config: ClientConfig) -> HttpClient {
        HttpClient::from_builder(HttpClient::builder(&config).no_proxy(), config).unwrap()
    }

    #[test]
    fn builds_from_default_config() {
        let client = HttpClient::new(ClientConfig::default()).unwrap();
        assert_eq!(client.config().endpoint(UPLOAD_PATH), "http://localhost:8000/upload/");
    }

    #[tokio::test]
    async fn body_reports_cumulative_progress_per_chunk() {
        use futures::TryStreamExt;

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let file = CandidateFile::new("paper.pdf", vec![0u8; CHUNK_SIZE * 2 + 10]);
        let chunks: Vec<Vec<u8>> =
            progress_chunks(&file, Arc::new(move |event: ProgressEvent| sink.lock().unwrap().push(event)))
                .try_collect()
                .await
                .unwrap();
        assert_eq!(chunks.len(), 3);

        let sent: Vec<u64> = seen.lock().unwrap().iter().map(|e| e.sent).collect();
        let total = file.size_bytes;
        assert_eq!(sent, [CHUNK_SIZE as u64, CHUNK_SIZE as u64 * 2, total]);
    }

    #[tokio::test]
    async fn slow_server_maps_to_timeout() {
        let (config, _server) = serve_once(CannedResponse {
            delay: Duration::from_secs(5),
            ..CannedResponse::json("200 OK", "{}")
        })
        .await;
        let client = local_client(config);

        let err = client
            .post_json(ANALYZE_MULTI_PATH, &json!({ "file_ids": ["f1"] }), Duration::from_millis(100))
            .await
            .unwrap_err();
        assert_eq!(err, TransportError::Timeout);
    }

    #[tokio::test]
    async fn bad_request_surfaces_server_detail() {
        let (config, server) =
            serve_once(CannedResponse::json("400 Bad Request", r#"{"detail":"Only PDF and image files are allowed"}"#))
                .await;
        let client = local_client(config);

        let err = client
            .post_json(ANALYZE_MULTI_PATH, &json!({ "file_ids": ["f1"] }), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            TransportError::Status {
                status: 400,
                message: "Only PDF and image files are allowed".to_string()
            }
        );

        let request = String::from_utf8(server.await.unwrap()).unwrap();
        assert!(request.starts_with("POST /analyze/multi HTTP/1.1"));
        assert!(request.to_ascii_lowercase().contains("accept: application/json"));
        assert!(request.contains(r#"{"file_ids":["f1"]}"#));
    }

    #[tokio::test]
    async fn non_json_success_is_malformed() {
        let (config, _server) = serve_once(CannedResponse {
            content_type: "text/html",
            ..CannedResponse::json("200 OK", "<html>proxy error</html>")
        })
        .await;
        let client = local_client(config);

        let err = client
            .post_json(ANALYZE_MULTI_PATH, &json!({ "file_ids": ["f1"] }), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Malformed(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn upload_sends_multipart_file_field() {
        let (config, server) =
            serve_once(CannedResponse::json("200 OK", r#"{"file_id":"abc","filename":"paper.pdf"}"#)).await;
        let client = local_client(config);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let file = CandidateFile::new("paper.pdf", b"%PDF-1.4 exam".to_vec());

        let reply = client
            .upload_file(
                UPLOAD_PATH,
                &file,
                Duration::from_secs(5),
                Arc::new(move |event: ProgressEvent| sink.lock().unwrap().push(event)),
            )
            .await
            .unwrap();
        assert_eq!(reply, json!({ "file_id": "abc", "filename": "paper.pdf" }));

        let request = String::from_utf8_lossy(&server.await.unwrap()).to_string();
        assert!(request.starts_with("POST /upload/ HTTP/1.1"));
        assert!(request.contains("multipart/form-data; boundary="));
        assert!(request.contains(r#"name="file""#));
        assert!(request.contains(r#"filename="paper.pdf""#));
        assert!(request.contains("%PDF-1.4 exam"));

        let last = *seen.lock().unwrap().last().unwrap();
        assert_eq!(last.sent, last.total);
        assert_eq!(last.total, file.size_bytes);
    }
}
