//! Request/response plumbing for the chat-completion endpoint.
//!
//! A submission produces exactly one [`CompletionResult`]. Every failure mode
//! is a [`CompletionError`] whose [`user_message`](CompletionError::user_message)
//! is what ends up in the transcript; nothing here is retried.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::api::{ChatCompletionResponse, ChatRequest};
use crate::core::constants::{
    EMPTY_REPLY_FALLBACK, GENERIC_API_ERROR_MESSAGE, MISSING_API_KEY_MESSAGE,
    TRANSPORT_FAILURE_MESSAGE,
};
use crate::utils::url::construct_api_url;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Why a submission did not produce a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionError {
    /// No API key was configured; no request was sent.
    MissingCredential,
    /// The request never produced a usable HTTP response.
    Transport(String),
    /// The endpoint answered with a non-success status.
    Status { status: u16, message: Option<String> },
}

impl CompletionError {
    /// Text shown to the user as a bot message.
    pub fn user_message(&self) -> String {
        match self {
            CompletionError::MissingCredential => MISSING_API_KEY_MESSAGE.to_string(),
            CompletionError::Transport(_) => TRANSPORT_FAILURE_MESSAGE.to_string(),
            CompletionError::Status { message, .. } => message
                .clone()
                .unwrap_or_else(|| GENERIC_API_ERROR_MESSAGE.to_string()),
        }
    }
}

impl fmt::Display for CompletionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompletionError::MissingCredential => write!(f, "API key is not configured"),
            CompletionError::Transport(detail) => write!(f, "transport failure: {detail}"),
            CompletionError::Status {
                status,
                message: Some(message),
            } => write!(f, "API returned status {status}: {message}"),
            CompletionError::Status {
                status,
                message: None,
            } => write!(f, "API returned status {status}"),
        }
    }
}

impl std::error::Error for CompletionError {}

/// `Ok(None)` means the endpoint answered successfully but without usable text.
pub type CompletionResult = Result<Option<String>, CompletionError>;

/// Bot text for a resolved submission.
pub fn reply_text(result: &CompletionResult) -> String {
    match result {
        Ok(Some(text)) => text.clone(),
        Ok(None) => EMPTY_REPLY_FALLBACK.to_string(),
        Err(err) => err.user_message(),
    }
}

/// Pull `error.message` out of an error response body.
pub fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body.trim()).ok()?;
    value
        .pointer("/error/message")
        .and_then(|message| message.as_str())
        .filter(|message| !message.is_empty())
        .map(str::to_owned)
}

#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, api_key: &str, request: &ChatRequest) -> CompletionResult;
}

/// [`CompletionClient`] backed by `reqwest`, speaking the OpenAI
/// `chat/completions` dialect.
#[derive(Clone)]
pub struct HttpCompletionClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCompletionClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn endpoint(&self) -> String {
        construct_api_url(&self.base_url, "chat/completions")
    }
}

#[async_trait]
impl CompletionClient for HttpCompletionClient {
    async fn complete(&self, api_key: &str, request: &ChatRequest) -> CompletionResult {
        let endpoint = self.endpoint();
        debug!(
            %endpoint,
            model = %request.model,
            messages = request.messages.len(),
            "sending completion request"
        );

        let response = self
            .client
            .post(&endpoint)
            .header("Authorization", format!("Bearer {api_key}"))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| CompletionError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CompletionError::Transport(e.to_string()))?;
        debug!(status = status.as_u16(), bytes = body.len(), "completion response");

        if !status.is_success() {
            return Err(CompletionError::Status {
                status: status.as_u16(),
                message: extract_error_message(&body),
            });
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&body)
            .map_err(|e| CompletionError::Transport(format!("response body is not JSON: {e}")))?;
        Ok(parsed.first_reply())
    }
}

/// Everything needed to run one submission off the UI thread.
pub struct CompletionParams {
    pub client: Arc<dyn CompletionClient>,
    pub api_key: String,
    pub request: ChatRequest,
    pub request_id: u64,
    pub cancel_token: CancellationToken,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionOutcome {
    pub request_id: u64,
    pub result: CompletionResult,
}

/// Run the request. Returns `None` only when the session cancelled it.
pub async fn run_completion(params: CompletionParams) -> Option<CompletionOutcome> {
    let CompletionParams {
        client,
        api_key,
        request,
        request_id,
        cancel_token,
    } = params;

    tokio::select! {
        biased;
        _ = cancel_token.cancelled() => {
            debug!(request_id, "completion request cancelled");
            None
        }
        result = client.complete(&api_key, &request) => {
            if let Err(err) = &result {
                warn!(request_id, error = %err, "completion request failed");
            }
            Some(CompletionOutcome { request_id, result })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ChatMessage;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    struct CapturedRequest {
        request_line: String,
        headers: Vec<(String, String)>,
        body: serde_json::Value,
    }

    impl CapturedRequest {
        fn header(&self, name: &str) -> Option<&str> {
            self.headers
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.as_str())
        }
    }

    async fn read_http_request(stream: &mut TcpStream) -> CapturedRequest {
        let mut buffer = Vec::new();
        let mut chunk = [0_u8; 1024];
        let header_end = loop {
            let read = stream.read(&mut chunk).await.expect("read request");
            assert!(read > 0, "client closed before sending headers");
            buffer.extend_from_slice(&chunk[..read]);
            if let Some(pos) = buffer.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };

        let head = String::from_utf8_lossy(&buffer[..header_end]).to_string();
        let mut lines = head.split("\r\n");
        let request_line = lines.next().unwrap_or_default().to_string();
        let headers: Vec<(String, String)> = lines
            .filter_map(|line| line.split_once(':'))
            .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
            .collect();
        let content_length = headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, v)| v.parse::<usize>().ok())
            .unwrap_or(0);

        let mut body = buffer[header_end..].to_vec();
        while body.len() < content_length {
            let read = stream.read(&mut chunk).await.expect("read body");
            assert!(read > 0, "client closed mid-body");
            body.extend_from_slice(&chunk[..read]);
        }
        body.truncate(content_length);

        CapturedRequest {
            request_line,
            headers,
            body: serde_json::from_slice(&body).expect("request body is json"),
        }
    }

    /// Serve a single canned response and hand back what the client sent.
    async fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<CapturedRequest>) {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("listener should bind");
        let addr = listener.local_addr().expect("local addr");
        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.expect("accept");
            let captured = read_http_request(&mut stream).await;
            let response = format!(
                "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\n\
                 content-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            stream
                .write_all(response.as_bytes())
                .await
                .expect("write response");
            captured
        });
        (format!("http://{addr}/v1"), handle)
    }

    fn test_client(base_url: &str) -> HttpCompletionClient {
        let client = reqwest::Client::builder()
            .no_proxy()
            .build()
            .expect("client");
        HttpCompletionClient::with_client(client, base_url)
    }

    fn request_for(texts: &[&str]) -> ChatRequest {
        ChatRequest {
            model: "test-model".to_string(),
            messages: texts.iter().map(|t| ChatMessage::new("user", *t)).collect(),
            temperature: 0.7,
        }
    }

    #[tokio::test]
    async fn posts_payload_with_bearer_credential() {
        let (base_url, server) = serve_once(
            "200 OK",
            r#"{"choices":[{"message":{"role":"assistant","content":" B "}}]}"#,
        )
        .await;

        let result = test_client(&base_url)
            .complete("sk-test", &request_for(&["A"]))
            .await;
        assert_eq!(result, Ok(Some("B".to_string())));

        let captured = server.await.expect("server task");
        assert_eq!(captured.request_line, "POST /v1/chat/completions HTTP/1.1");
        assert_eq!(captured.header("authorization"), Some("Bearer sk-test"));
        assert_eq!(captured.header("content-type"), Some("application/json"));
        assert_eq!(captured.body["model"], "test-model");
        assert_eq!(
            captured.body["messages"],
            serde_json::json!([{"role": "user", "content": "A"}])
        );
        let temperature = captured.body["temperature"].as_f64().expect("temperature");
        assert!((temperature - 0.7).abs() < 1e-6);
    }

    #[tokio::test]
    async fn success_without_choices_is_an_empty_reply() {
        let (base_url, server) = serve_once("200 OK", r#"{"choices":[]}"#).await;
        let result = test_client(&base_url)
            .complete("sk-test", &request_for(&["A"]))
            .await;
        server.await.expect("server task");

        assert_eq!(result, Ok(None));
        assert_eq!(reply_text(&result), EMPTY_REPLY_FALLBACK);
    }

    #[tokio::test]
    async fn odd_but_valid_json_success_bodies_get_the_fallback_reply() {
        for body in [
            r#"{"choices":null}"#,
            r#"{"choices":{}}"#,
            r#"{"choices":[null]}"#,
        ] {
            let (base_url, server) = serve_once("200 OK", body).await;
            let result = test_client(&base_url)
                .complete("sk-test", &request_for(&["A"]))
                .await;
            server.await.expect("server task");

            assert_eq!(result, Ok(None), "body={body}");
            assert_eq!(reply_text(&result), EMPTY_REPLY_FALLBACK, "body={body}");
        }
    }

    #[tokio::test]
    async fn error_status_surfaces_api_message() {
        let (base_url, server) = serve_once(
            "429 Too Many Requests",
            r#"{"error":{"message":"rate limited","type":"requests"}}"#,
        )
        .await;
        let result = test_client(&base_url)
            .complete("sk-test", &request_for(&["A"]))
            .await;
        server.await.expect("server task");

        assert_eq!(
            result,
            Err(CompletionError::Status {
                status: 429,
                message: Some("rate limited".to_string()),
            })
        );
        assert_eq!(reply_text(&result), "rate limited");
    }

    #[tokio::test]
    async fn error_status_with_unparsable_body_uses_generic_text() {
        let (base_url, server) = serve_once("502 Bad Gateway", "<html>upstream</html>").await;
        let result = test_client(&base_url)
            .complete("sk-test", &request_for(&["A"]))
            .await;
        server.await.expect("server task");

        assert_eq!(reply_text(&result), GENERIC_API_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn non_json_success_body_is_a_transport_failure() {
        let (base_url, server) = serve_once("200 OK", "not json").await;
        let result = test_client(&base_url)
            .complete("sk-test", &request_for(&["A"]))
            .await;
        server.await.expect("server task");

        assert!(matches!(result, Err(CompletionError::Transport(_))));
        assert_eq!(reply_text(&result), TRANSPORT_FAILURE_MESSAGE);
    }

    #[tokio::test]
    async fn connection_refused_is_a_transport_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        drop(listener);

        let result = test_client(&format!("http://{addr}/v1"))
            .complete("sk-test", &request_for(&["A"]))
            .await;
        assert!(matches!(result, Err(CompletionError::Transport(_))));
    }

    #[test]
    fn extract_error_message_requires_nested_message() {
        assert_eq!(
            extract_error_message(r#"{"error":{"message":"rate limited"}}"#).as_deref(),
            Some("rate limited")
        );
        assert_eq!(extract_error_message(r#"{"error":"flat"}"#), None);
        assert_eq!(extract_error_message(r#"{"error":{"message":""}}"#), None);
        assert_eq!(extract_error_message("oops"), None);
    }

    #[test]
    fn missing_credential_has_configuration_notice() {
        let result: CompletionResult = Err(CompletionError::MissingCredential);
        assert_eq!(reply_text(&result), MISSING_API_KEY_MESSAGE);
    }

    struct NeverCompletes;

    #[async_trait]
    impl CompletionClient for NeverCompletes {
        async fn complete(&self, _api_key: &str, _request: &ChatRequest) -> CompletionResult {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn cancelled_requests_produce_no_outcome() {
        let cancel_token = CancellationToken::new();
        cancel_token.cancel();
        let outcome = run_completion(CompletionParams {
            client: Arc::new(NeverCompletes),
            api_key: "sk-test".to_string(),
            request: request_for(&["A"]),
            request_id: 7,
            cancel_token,
        })
        .await;
        assert!(outcome.is_none());
    }
}
