//! Bybit v5 kline provider.
//!
//! Fetches candles from `GET /v5/market/kline`. One attempt per call with a
//! client-level timeout; failures are classified into [`FetchCause`] and
//! handed back to the caller. No retries and no backoff.
//!
//! Bybit returns the list newest-first. Nothing here relies on that; ordering
//! is the normalizer's job.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::provider::{FetchCause, KlineProvider, KlineRequest, RawCandle};

/// Largest page the kline endpoint serves.
const MAX_LIMIT: i64 = 1000;

/// Connection settings for [`BybitProvider`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BybitConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for BybitConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.bybit.com".into(),
            request_timeout_secs: 10,
        }
    }
}

/// `/v5/market/kline` response envelope.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KlineResponse {
    ret_code: i64,
    #[serde(default)]
    ret_msg: String,
    result: Option<KlineResult>,
}

#[derive(Debug, Deserialize)]
struct KlineResult {
    list: Option<Vec<RawCandle>>,
}

/// Bybit market-data provider (public endpoints, no authentication).
pub struct BybitProvider {
    client: reqwest::blocking::Client,
    base_url: String,
    timeout_secs: u64,
}

impl BybitProvider {
    pub fn new(config: &BybitConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(concat!("vollab/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout_secs: config.request_timeout_secs,
        })
    }

    /// Build the kline URL for a request.
    fn kline_url(&self, request: &KlineRequest) -> String {
        format!(
            "{}/v5/market/kline?category={}&symbol={}&interval={}&start={}&end={}&limit={}",
            self.base_url,
            request.category.as_str(),
            request.symbol,
            request.resolution.as_str(),
            request.window.start_ms(),
            request.window.end_ms(),
            MAX_LIMIT,
        )
    }

    /// Symbols go into the query string verbatim, so only ticker characters pass.
    fn check_symbol(request: &KlineRequest) -> Result<(), FetchCause> {
        let ok = request
            .symbol
            .as_str()
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if ok {
            Ok(())
        } else {
            Err(FetchCause::InvalidRequest(format!(
                "symbol '{}' contains characters outside [A-Za-z0-9._-]",
                request.symbol
            )))
        }
    }

    /// Parse a kline response body into raw candles.
    pub(crate) fn parse_response(body: &str) -> Result<Vec<RawCandle>, FetchCause> {
        let resp: KlineResponse = serde_json::from_str(body)
            .map_err(|e| FetchCause::MalformedResponse(format!("invalid kline payload: {e}")))?;

        if resp.ret_code != 0 {
            return Err(FetchCause::ProviderRejected {
                code: resp.ret_code,
                message: resp.ret_msg,
            });
        }

        let list = resp
            .result
            .and_then(|r| r.list)
            .ok_or_else(|| FetchCause::MalformedResponse("missing result.list".into()))?;

        if list.is_empty() {
            return Err(FetchCause::EmptyData);
        }

        Ok(list)
    }

    fn classify(&self, err: reqwest::Error) -> FetchCause {
        if err.is_timeout() {
            FetchCause::Timeout {
                timeout_secs: self.timeout_secs,
            }
        } else {
            FetchCause::NetworkUnreachable(err.to_string())
        }
    }
}

impl KlineProvider for BybitProvider {
    fn name(&self) -> &str {
        "bybit"
    }

    fn fetch_window(&self, request: &KlineRequest) -> Result<Vec<RawCandle>, FetchCause> {
        Self::check_symbol(request)?;

        if request.expected_candles() > MAX_LIMIT {
            tracing::warn!(
                symbol = %request.symbol,
                expected = request.expected_candles(),
                limit = MAX_LIMIT,
                "lookback exceeds one kline page; only the newest candles are returned"
            );
        }

        let url = self.kline_url(request);
        tracing::debug!(symbol = %request.symbol, %url, "requesting klines");

        let resp = self.client.get(&url).send().map_err(|e| self.classify(e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchCause::HttpStatus {
                status: status.as_u16(),
            });
        }

        let body = resp.text().map_err(|e| self.classify(e))?;
        Self::parse_response(&body)
    }
}
