//! HTTP implementation of the LedgerGateway trait.
//!
//! Speaks the REST surface of an InterlockLedger-style node:
//!
//! | Operation      | Request                                   |
//! |----------------|-------------------------------------------|
//! | `list_chains`  | `GET {base}/chain`                        |
//! | `submit`       | `POST {base}/records@{chain}`             |
//! | `fetch_record` | `GET {base}/records@{chain}/{serial}`     |
//! | `list_records` | `GET {base}/records@{chain}?page=&pageSize=` |
//!
//! Client-certificate TLS setup is left to the deployment; this adapter only
//! needs a base URL the node answers on.

use std::time::Duration;

use anchorcert_core::record::encode_payload;
use anchorcert_core::{ChainId, ChainInfo, LedgerRecord, Serial, Submission};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{LedgerError, Result};
use crate::traits::LedgerGateway;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default application id for submitted records.
pub const DEFAULT_APPLICATION_ID: u64 = 8;

/// Configuration for [`HttpLedger`].
#[derive(Debug, Clone)]
pub struct HttpLedgerConfig {
    /// Node base URL, without a trailing slash.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Application id sent with every submission.
    pub application_id: u64,
}

impl HttpLedgerConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: DEFAULT_TIMEOUT,
            application_id: DEFAULT_APPLICATION_ID,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_application_id(mut self, application_id: u64) -> Self {
        self.application_id = application_id;
        self
    }

    /// Read `LEDGER_BASE_URL`, `LEDGER_TIMEOUT_SECS` and `LEDGER_APPLICATION_ID`.
    ///
    /// Only the base URL is required.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let base_url = lookup("LEDGER_BASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| LedgerError::Config("LEDGER_BASE_URL is not set".to_string()))?;
        let mut config = Self::new(base_url.trim());

        if let Some(secs) = lookup("LEDGER_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                LedgerError::Config(format!("LEDGER_TIMEOUT_SECS is not a number: {secs:?}"))
            })?;
            config.timeout = Duration::from_secs(secs);
        }

        if let Some(id) = lookup("LEDGER_APPLICATION_ID") {
            config.application_id = id.trim().parse().map_err(|_| {
                LedgerError::Config(format!("LEDGER_APPLICATION_ID is not a number: {id:?}"))
            })?;
        }

        Ok(config)
    }

    fn chains_url(&self) -> String {
        format!("{}/chain", self.base_url)
    }

    fn records_url(&self, chain_id: &ChainId) -> String {
        format!("{}/records@{}", self.base_url, chain_id)
    }

    fn record_url(&self, chain_id: &ChainId, serial: Serial) -> String {
        format!("{}/records@{}/{}", self.base_url, chain_id, serial)
    }
}

/// Body of a record submission.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitRequest {
    application_id: u64,
    payload_bytes: String,
}

/// REST ledger gateway.
pub struct HttpLedger {
    client: Client,
    config: HttpLedgerConfig,
}

impl HttpLedger {
    pub fn new(config: HttpLedgerConfig) -> Result<Self> {
        if config.base_url.is_empty() {
            return Err(LedgerError::Config("base URL is empty".to_string()));
        }
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LedgerError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    /// Use a preconfigured client, e.g. one carrying a client certificate.
    pub fn with_client(client: Client, config: HttpLedgerConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &HttpLedgerConfig {
        &self.config
    }
}

#[async_trait]
impl LedgerGateway for HttpLedger {
    async fn list_chains(&self) -> Result<Vec<ChainInfo>> {
        let url = self.config.chains_url();
        debug!(%url, "listing chains");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        parse_chains(status, &body)
    }

    async fn submit(&self, chain_id: &ChainId, envelope: &[u8]) -> Result<Submission> {
        let url = self.config.records_url(chain_id);
        debug!(%url, bytes = envelope.len(), "submitting record");

        let request = SubmitRequest {
            application_id: self.config.application_id,
            payload_bytes: encode_payload(envelope),
        };
        let response = self.client.post(&url).json(&request).send().await?;
        let status = response.status();
        let body = response.text().await?;
        parse_submission(status, &body)
    }

    async fn fetch_record(
        &self,
        chain_id: &ChainId,
        serial: Serial,
    ) -> Result<Option<LedgerRecord>> {
        let url = self.config.record_url(chain_id, serial);
        debug!(%url, "fetching record");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        parse_record(status, &body)
    }

    async fn list_records(
        &self,
        chain_id: &ChainId,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<LedgerRecord>> {
        let url = self.config.records_url(chain_id);
        debug!(%url, page, page_size, "listing records");

        let response = self
            .client
            .get(&url)
            .query(&[("page", page), ("pageSize", page_size)])
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        parse_records(status, &body)
    }
}

fn parse_json<T: DeserializeOwned>(body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| LedgerError::MalformedResponse(e.to_string()))
}

fn parse_chains(status: StatusCode, body: &str) -> Result<Vec<ChainInfo>> {
    if !status.is_success() {
        warn!(status = status.as_u16(), "chain listing failed");
        return Err(LedgerError::UnexpectedStatus {
            status: status.as_u16(),
            body: body.to_string(),
        });
    }
    parse_json(body)
}

fn parse_submission(status: StatusCode, body: &str) -> Result<Submission> {
    if !status.is_success() {
        warn!(status = status.as_u16(), "submission rejected");
        return Err(LedgerError::Submission {
            status: status.as_u16(),
            body: body.to_string(),
        });
    }
    parse_json(body)
}

fn parse_record(status: StatusCode, body: &str) -> Result<Option<LedgerRecord>> {
    if status == StatusCode::NOT_FOUND {
        return Ok(None);
    }
    if !status.is_success() {
        return Err(LedgerError::UnexpectedStatus {
            status: status.as_u16(),
            body: body.to_string(),
        });
    }
    parse_json(body).map(Some)
}

/// Record listings come either paged or as a bare array.
#[derive(Deserialize)]
#[serde(untagged)]
enum RecordsBody {
    Page { items: Vec<LedgerRecord> },
    List(Vec<LedgerRecord>),
}

fn parse_records(status: StatusCode, body: &str) -> Result<Vec<LedgerRecord>> {
    if !status.is_success() {
        warn!(status = status.as_u16(), "record listing failed");
        return Err(LedgerError::UnexpectedStatus {
            status: status.as_u16(),
            body: body.to_string(),
        });
    }
    Ok(match parse_json(body)? {
        RecordsBody::Page { items } => items,
        RecordsBody::List(items) => items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_config_urls() {
        let config = HttpLedgerConfig::new("https://node.example:32020/");
        let chain = ChainId::from("V6Ge5NDq");
        assert_eq!(config.chains_url(), "https://node.example:32020/chain");
        assert_eq!(
            config.records_url(&chain),
            "https://node.example:32020/records@V6Ge5NDq"
        );
        assert_eq!(
            config.record_url(&chain, 42),
            "https://node.example:32020/records@V6Ge5NDq/42"
        );
    }

    #[test]
    fn test_config_from_env_values() {
        let config = HttpLedgerConfig::from_lookup(lookup(&[
            ("LEDGER_BASE_URL", "https://node:32020"),
            ("LEDGER_TIMEOUT_SECS", "5"),
            ("LEDGER_APPLICATION_ID", "13"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "https://node:32020");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.application_id, 13);
    }

    #[test]
    fn test_config_from_env_defaults_and_errors() {
        let config =
            HttpLedgerConfig::from_lookup(lookup(&[("LEDGER_BASE_URL", "http://x")])).unwrap();
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert_eq!(config.application_id, DEFAULT_APPLICATION_ID);

        assert!(matches!(
            HttpLedgerConfig::from_lookup(lookup(&[])),
            Err(LedgerError::Config(_))
        ));
        assert!(matches!(
            HttpLedgerConfig::from_lookup(lookup(&[
                ("LEDGER_BASE_URL", "http://x"),
                ("LEDGER_TIMEOUT_SECS", "soon"),
            ])),
            Err(LedgerError::Config(_))
        ));
    }

    #[test]
    fn test_new_rejects_empty_base() {
        assert!(matches!(
            HttpLedger::new(HttpLedgerConfig::new("")),
            Err(LedgerError::Config(_))
        ));
    }

    #[test]
    fn test_submit_request_shape() {
        let request = SubmitRequest {
            application_id: 8,
            payload_bytes: encode_payload(b"{}"),
        };
        assert_eq!(
            serde_json::to_string(&request).unwrap(),
            r#"{"applicationId":8,"payloadBytes":"e30="}"#
        );
    }

    #[test]
    fn test_parse_chains() {
        let chains = parse_chains(
            StatusCode::OK,
            r#"[{"id":"a","name":"A","lastRecord":41},{"id":"b","name":"B","lastRecord":3}]"#,
        )
        .unwrap();
        assert_eq!(chains.len(), 2);
        assert_eq!(chains[0].id, ChainId::from("a"));

        assert!(matches!(
            parse_chains(StatusCode::UNAUTHORIZED, "no cert"),
            Err(LedgerError::UnexpectedStatus { status: 401, .. })
        ));
        assert!(matches!(
            parse_chains(StatusCode::OK, "<html>"),
            Err(LedgerError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_parse_submission() {
        let submission = parse_submission(
            StatusCode::CREATED,
            r#"{"serial":42,"network":"Minerva","reference":"Minerva:a@42"}"#,
        )
        .unwrap();
        assert_eq!(submission.serial, 42);

        let err = parse_submission(StatusCode::BAD_REQUEST, "bad payload").unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Submission { status: 400, ref body } if body == "bad payload"
        ));
    }

    #[test]
    fn test_parse_record_not_found_is_none() {
        assert!(parse_record(StatusCode::NOT_FOUND, "").unwrap().is_none());

        let record = parse_record(
            StatusCode::OK,
            r#"{"serial":42,"hash":"ABCD1234","payloadBytes":"e30="}"#,
        )
        .unwrap()
        .unwrap();
        assert_eq!(record.serial, 42);

        assert!(matches!(
            parse_record(StatusCode::INTERNAL_SERVER_ERROR, "boom"),
            Err(LedgerError::UnexpectedStatus { status: 500, .. })
        ));
    }

    #[test]
    fn test_parse_records_page_and_array() {
        let page = parse_records(
            StatusCode::OK,
            r#"{"items":[{"serial":1,"hash":"AA","payloadBytes":"e30="},{"serial":2,"hash":"BB","payloadBytes":"e30="}],"page":0,"pageSize":2,"totalNumberOfPages":3}"#,
        )
        .unwrap();
        assert_eq!(page.iter().map(|r| r.serial).collect::<Vec<_>>(), [1, 2]);

        let list =
            parse_records(StatusCode::OK, r#"[{"serial":7,"hash":"CC","payloadBytes":""}]"#).unwrap();
        assert_eq!(list[0].serial, 7);

        assert!(parse_records(StatusCode::OK, r#"{"items":[]}"#).unwrap().is_empty());
        assert!(matches!(
            parse_records(StatusCode::NOT_FOUND, "no chain"),
            Err(LedgerError::UnexpectedStatus { status: 404, .. })
        ));
        assert!(matches!(
            parse_records(StatusCode::OK, r#"{"serial":1}"#),
            Err(LedgerError::MalformedResponse(_))
        ));
    }

    /// Answer one HTTP request with a canned response and hand back the raw
    /// request text.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                if request_complete(&request) {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8(request).unwrap()
        });

        (base, handle)
    }

    fn request_complete(request: &[u8]) -> bool {
        let text = String::from_utf8_lossy(request);
        let Some(end) = text.find("\r\n\r\n") else {
            return false;
        };
        let length = text[..end]
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        request.len() >= end + 4 + length
    }

    fn loopback_ledger(base: &str) -> HttpLedger {
        let client = Client::builder().no_proxy().build().unwrap();
        HttpLedger::with_client(client, HttpLedgerConfig::new(base))
    }

    #[tokio::test]
    async fn test_submit_sends_payload_to_chain() {
        let (base, server) = serve_once(
            "201 Created",
            r#"{"serial":42,"network":"Minerva","reference":"Minerva:chain-a@42"}"#,
        )
        .await;

        let submission = loopback_ledger(&base)
            .submit(&ChainId::from("chain-a"), b"{}")
            .await
            .unwrap();
        assert_eq!(submission.serial, 42);

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /records@chain-a HTTP/1.1\r\n"), "{request}");
        assert!(request.ends_with(r#"{"applicationId":8,"payloadBytes":"e30="}"#), "{request}");
    }

    #[tokio::test]
    async fn test_fetch_record_requests_serial() {
        let (base, server) = serve_once(
            "200 OK",
            r#"{"serial":42,"hash":"ABCD1234","payloadBytes":"e30="}"#,
        )
        .await;

        let record = loopback_ledger(&base)
            .fetch_record(&ChainId::from("chain-a"), 42)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.decode_payload().unwrap(), b"{}");

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /records@chain-a/42 HTTP/1.1\r\n"), "{request}");
    }

    #[tokio::test]
    async fn test_list_records_sends_paging_query() {
        let (base, server) = serve_once(
            "200 OK",
            r#"{"items":[{"serial":3,"hash":"AA","payloadBytes":""}],"page":1,"pageSize":2}"#,
        )
        .await;

        let records = loopback_ledger(&base)
            .list_records(&ChainId::from("chain-a"), 1, 2)
            .await
            .unwrap();
        assert_eq!(records.len(), 1);

        let request = server.await.unwrap();
        assert!(
            request.starts_with("GET /records@chain-a?page=1&pageSize=2 HTTP/1.1\r\n"),
            "{request}"
        );
    }

    #[tokio::test]
    async fn test_list_chains_over_loopback() {
        let (base, server) = serve_once("401 Unauthorized", "client certificate required").await;

        let err = loopback_ledger(&base).list_chains().await.unwrap_err();
        assert!(matches!(
            err,
            LedgerError::UnexpectedStatus { status: 401, ref body } if body == "client certificate required"
        ));

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /chain HTTP/1.1\r\n"), "{request}");
    }

    #[tokio::test]
    async fn test_unreachable_node_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let err = loopback_ledger(&base)
            .fetch_record(&ChainId::from("chain-a"), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Transport(_)), "{err:?}");
    }
}
