use std::thread;
use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::PmcId;
use crate::error::MishmashError;

pub const EUTILS_BASE: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";

// esearch caps retmax at 10000.
const SRA_SEARCH_RETMAX: &str = "10000";

pub trait ArticleFetcher: Send + Sync {
    fn fetch_article(&self, id: PmcId) -> Result<String, MishmashError>;
}

pub trait RecordCounter: Send + Sync {
    fn count_records(&self, accession: &str) -> Result<u64, MishmashError>;
}

pub trait SraMetadataFetcher: Send + Sync {
    fn search_sra(&self, accession: &str) -> Result<Vec<String>, MishmashError>;
    fn fetch_sra_packages(&self, uids: &[String]) -> Result<String, MishmashError>;
}

#[derive(Debug, Clone)]
pub struct EutilsOptions {
    pub api_key: Option<String>,
    pub email: Option<String>,
    pub tool: String,
    pub max_retries: usize,
    pub retry_delay: Duration,
    pub timeout: Duration,
}

impl Default for EutilsOptions {
    fn default() -> Self {
        Self {
            api_key: None,
            email: None,
            tool: "mishmash".to_string(),
            max_retries: 3,
            retry_delay: Duration::from_millis(200),
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Clone)]
pub struct EutilsHttpClient {
    client: Client,
    base_url: String,
    options: EutilsOptions,
}

impl EutilsHttpClient {
    pub fn new(options: EutilsOptions) -> Result<Self, MishmashError> {
        Self::with_base_url(EUTILS_BASE, options)
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        options: EutilsOptions,
    ) -> Result<Self, MishmashError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("mishmash/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| MishmashError::Configuration(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(options.timeout)
            .build()
            .map_err(|err| MishmashError::EutilsHttp(err.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            options,
        })
    }

    fn request(&self, endpoint: &str, params: &[(&str, &str)]) -> RequestBuilder {
        let url = format!("{}/{endpoint}", self.base_url);
        let mut request = self.client.get(url).query(params);
        request = request.query(&[("tool", self.options.tool.as_str())]);
        if let Some(email) = &self.options.email {
            request = request.query(&[("email", email.as_str())]);
        }
        if let Some(api_key) = &self.options.api_key {
            request = request.query(&[("api_key", api_key.as_str())]);
        }
        request
    }

    fn send_with_retries<F>(&self, what: &str, mut make_req: F) -> Result<Response, MishmashError>
    where
        F: FnMut() -> RequestBuilder,
    {
        let max_retries = self.options.max_retries;
        let mut attempt = 0usize;
        loop {
            let response = make_req().send();
            match response {
                Ok(resp) => {
                    let status = resp.status().as_u16();
                    if attempt < max_retries && is_retryable_status(status) {
                        warn!(status, attempt, "{what}: retrying");
                        self.backoff(attempt);
                        attempt += 1;
                        continue;
                    }
                    if !resp.status().is_success() {
                        let message = resp
                            .text()
                            .unwrap_or_else(|_| format!("{what} failed"));
                        return Err(MishmashError::EutilsStatus { status, message });
                    }
                    return Ok(resp);
                }
                Err(err) => {
                    if attempt < max_retries && is_retryable_error(&err) {
                        warn!(attempt, "{what}: {err}; retrying");
                        self.backoff(attempt);
                        attempt += 1;
                        continue;
                    }
                    return Err(MishmashError::EutilsHttp(format!("{what}: {err}")));
                }
            }
        }
    }

    fn backoff(&self, attempt: usize) {
        thread::sleep(self.options.retry_delay * (attempt as u32 + 1));
    }
}

impl ArticleFetcher for EutilsHttpClient {
    fn fetch_article(&self, id: PmcId) -> Result<String, MishmashError> {
        let id_param = id.to_string();
        debug!(pmc_id = %id, "fetching article");
        let response = self.send_with_retries(&format!("efetch PMC{id}"), || {
            self.request("efetch.fcgi", &[("db", "pmc"), ("id", id_param.as_str())])
        })?;
        response
            .text()
            .map_err(|err| MishmashError::EutilsHttp(format!("efetch PMC{id}: {err}")))
    }
}

impl RecordCounter for EutilsHttpClient {
    fn count_records(&self, accession: &str) -> Result<u64, MishmashError> {
        debug!(accession, "counting SRA records");
        let response = self.send_with_retries(&format!("esearch {accession}"), || {
            self.request(
                "esearch.fcgi",
                &[("db", "sra"), ("term", accession), ("retmode", "json")],
            )
        })?;
        let payload: Value = response
            .json()
            .map_err(|err| MishmashError::EutilsResponse(format!("esearch {accession}: {err}")))?;
        parse_esearch_count(&payload)
    }
}

impl SraMetadataFetcher for EutilsHttpClient {
    fn search_sra(&self, accession: &str) -> Result<Vec<String>, MishmashError> {
        debug!(accession, "searching SRA uids");
        let response = self.send_with_retries(&format!("esearch {accession}"), || {
            self.request(
                "esearch.fcgi",
                &[
                    ("db", "sra"),
                    ("term", accession),
                    ("retmode", "json"),
                    ("retmax", SRA_SEARCH_RETMAX),
                ],
            )
        })?;
        let payload: Value = response
            .json()
            .map_err(|err| MishmashError::EutilsResponse(format!("esearch {accession}: {err}")))?;
        parse_esearch_ids(&payload)
    }

    fn fetch_sra_packages(&self, uids: &[String]) -> Result<String, MishmashError> {
        let id_param = uids.join(",");
        debug!(uids = uids.len(), "fetching SRA metadata");
        let what = format!("efetch sra ({} uids)", uids.len());
        let response = self.send_with_retries(&what, || {
            self.request(
                "efetch.fcgi",
                &[
                    ("db", "sra"),
                    ("id", id_param.as_str()),
                    ("rettype", "xml"),
                    ("retmode", "xml"),
                ],
            )
        })?;
        response
            .text()
            .map_err(|err| MishmashError::EutilsHttp(format!("{what}: {err}")))
    }
}

// E-utilities reports the count as a string.
pub fn parse_esearch_count(payload: &Value) -> Result<u64, MishmashError> {
    let count = &payload["esearchresult"]["count"];
    if let Some(value) = count.as_str() {
        return value
            .trim()
            .parse::<u64>()
            .map_err(|err| MishmashError::EutilsResponse(format!("invalid count {value:?}: {err}")));
    }
    if let Some(value) = count.as_u64() {
        return Ok(value);
    }
    let reason = payload["esearchresult"]["ERROR"]
        .as_str()
        .or_else(|| payload["error"].as_str())
        .unwrap_or("missing esearchresult.count");
    Err(MishmashError::EutilsResponse(reason.to_string()))
}

pub fn parse_esearch_ids(payload: &Value) -> Result<Vec<String>, MishmashError> {
    let Some(ids) = payload["esearchresult"]["idlist"].as_array() else {
        let reason = payload["esearchresult"]["ERROR"]
            .as_str()
            .or_else(|| payload["error"].as_str())
            .unwrap_or("missing esearchresult.idlist");
        return Err(MishmashError::EutilsResponse(reason.to_string()));
    };
    Ok(ids
        .iter()
        .filter_map(|id| match id {
            Value::String(id) => Some(id.clone()),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        })
        .collect())
}

fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

fn is_retryable_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request()
}
