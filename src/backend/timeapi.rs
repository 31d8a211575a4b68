//! Zone conversion through the timeapi.io REST endpoint.
use crate::conversion::{ConversionError, Converted, ZoneConverter};
use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::NaiveDateTime;
use getset::{CopyGetters, Getters};
use http_body_util::{BodyExt, Full};
use hyper::{
    header::{CONTENT_TYPE, HeaderValue},
    Method, Request, StatusCode, Uri,
};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use rustls::{crypto::ring, ClientConfig, RootCertStore};
use serde::{Deserialize, Serialize};
use std::{sync::Arc, time::Duration};
use tokio::time;
use tracing::{debug, warn};
use webpki_roots::TLS_SERVER_ROOTS;

type HttpClient = Client<HttpsConnector<HttpConnector>, Full<Bytes>>;

/// The public conversion endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://timeapi.io/api/conversion/converttimezone";

/// The format the endpoint expects for the naive source timestamp.
const REQUEST_DATE_TIME: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConvertRequest<'a> {
    from_time_zone: &'a str,
    date_time: String,
    to_time_zone: &'a str,
    dst_ambiguity: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConvertResponse {
    conversion_result: Option<ConversionPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConversionPayload {
    time: Option<String>,
    date_time: Option<String>,
}

#[derive(CopyGetters, Debug, Getters)]
/// HTTP client for the conversion endpoint.
pub struct TimeApi {
    client: HttpClient,

    #[getset(get = "pub")]
    /// Target of every conversion request.
    endpoint: Uri,

    #[getset(get_copy = "pub")]
    /// Upper bound for a whole request including the response body.
    timeout: Duration,
}

fn failed<S: Into<String>>(reason: S) -> ConversionError {
    ConversionError::ConversionFailed(reason.into())
}

impl TimeApi {
    /// Create a new client for the provided endpoint.
    pub fn new(endpoint: Uri, timeout: Duration) -> Result<Self> {
        let https = HttpsConnectorBuilder::new()
            .with_tls_config(Self::tls_config()?)
            .https_or_http()
            .enable_http1()
            .build();
        let client = Client::builder(TokioExecutor::new()).build(https);

        Ok(Self {
            client,
            endpoint,
            timeout,
        })
    }

    fn tls_config() -> Result<ClientConfig> {
        let mut root_certificates = RootCertStore::empty();
        root_certificates
            .roots
            .extend(TLS_SERVER_ROOTS.iter().cloned());

        Ok(
            ClientConfig::builder_with_provider(Arc::new(ring::default_provider()))
                .with_safe_default_protocol_versions()
                .context("select TLS protocol versions")?
                .with_root_certificates(root_certificates)
                .with_no_client_auth(),
        )
    }

    async fn post(&self, body: Vec<u8>) -> Result<(StatusCode, Bytes), ConversionError> {
        let request = Request::builder()
            .method(Method::POST)
            .uri(self.endpoint().clone())
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .body(Full::new(Bytes::from(body)))
            .map_err(|e| failed(format!("build request: {e}")))?;

        let response = self
            .client
            .request(request)
            .await
            .map_err(|e| failed(format!("send request: {e}")))?;
        let status = response.status();
        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|e| failed(format!("read response body: {e}")))?
            .to_bytes();

        Ok((status, body))
    }
}

#[async_trait]
impl ZoneConverter for TimeApi {
    async fn convert(
        &self,
        from_zone: &str,
        at: NaiveDateTime,
        to_zone: &str,
    ) -> Result<Converted, ConversionError> {
        let body = serde_json::to_vec(&ConvertRequest {
            from_time_zone: from_zone,
            date_time: at.format(REQUEST_DATE_TIME).to_string(),
            to_time_zone: to_zone,
            dst_ambiguity: "",
        })
        .map_err(|e| failed(format!("serialize request: {e}")))?;

        debug!("POST {} for {} -> {}", self.endpoint(), from_zone, to_zone);
        let (status, body) = time::timeout(self.timeout(), self.post(body))
            .await
            .map_err(|_| failed(format!("no response within {:?}", self.timeout())))??;

        if !status.is_success() {
            warn!(
                "Error converting time, status {}: {}",
                status,
                String::from_utf8_lossy(&body)
            );
            return Err(failed(format!("unexpected status {status}")));
        }

        parse_response(&body)
    }
}

fn parse_response(body: &[u8]) -> Result<Converted, ConversionError> {
    let response: ConvertResponse =
        serde_json::from_slice(body).map_err(|e| failed(format!("decode response: {e}")))?;
    let payload = response
        .conversion_result
        .ok_or_else(|| failed("response has no conversion result"))?;

    let time = payload
        .time
        .ok_or_else(|| failed("conversion result has no time"))?;
    let date_time = payload
        .date_time
        .ok_or_else(|| failed("conversion result has no date time"))?;

    Ok(Converted {
        time,
        date_time: parse_date_time(&date_time)?,
    })
}

fn parse_date_time(s: &str) -> Result<NaiveDateTime, ConversionError> {
    s.parse::<NaiveDateTime>()
        .or_else(|_| NaiveDateTime::parse_from_str(s, REQUEST_DATE_TIME))
        .map_err(|e| failed(format!("parse date time '{s}': {e}")))
}
