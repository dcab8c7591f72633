//! Yahoo Finance chart API client.
//!
//! Fetches daily bars from the v8 chart endpoint and maps them to
//! [`PriceRow`]s, keeping the adjusted close when the payload carries it.

use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use reqwest::{StatusCode, Url};
use serde::Deserialize;

use super::PriceSource;
use crate::error::PriceError;
use crate::series::PriceRow;

/// Public chart endpoint.
pub const DEFAULT_YAHOO_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    #[serde(default)]
    meta: Option<ChartMeta>,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteData>,
    #[serde(default)]
    adjclose: Option<Vec<AdjCloseData>>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseData {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

/// Yahoo Finance price source.
#[derive(Debug, Clone)]
pub struct YahooPriceSource {
    base_url: Url,
    client: reqwest::Client,
    timeout: Duration,
}

impl YahooPriceSource {
    /// Create a client against `base_url` with a per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, PriceError> {
        let base_url = Url::parse(base_url).map_err(|e| {
            PriceError::Unreachable(format!("Invalid base URL {}: {}", base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(PriceError::Unreachable(format!(
                "Base URL cannot carry a path: {}",
                base_url
            )));
        }

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| PriceError::Unreachable(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url,
            client,
            timeout,
        })
    }

    /// Create a client against the public endpoint.
    pub fn with_timeout(timeout: Duration) -> Result<Self, PriceError> {
        Self::new(DEFAULT_YAHOO_BASE_URL, timeout)
    }

    fn build_url(&self, ticker: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(ticker);
        }
        url.query_pairs_mut()
            .append_pair("period1", &start.timestamp().to_string())
            .append_pair("period2", &end.timestamp().to_string())
            .append_pair("interval", "1d")
            .append_pair("events", "div,split");
        url
    }

    fn map_transport_error(&self, err: reqwest::Error) -> PriceError {
        if err.is_timeout() {
            PriceError::Timeout(self.timeout)
        } else {
            PriceError::Unreachable(err.to_string())
        }
    }
}

/// Decode a chart payload into rows.
fn parse_chart(ticker: &str, status: StatusCode, body: &str) -> Result<Vec<PriceRow>, PriceError> {
    let response: ChartResponse = match serde_json::from_str(body) {
        Ok(response) => response,
        Err(_) if status == StatusCode::NOT_FOUND => {
            return Err(PriceError::UnknownTicker(ticker.to_string()))
        }
        Err(_) if !status.is_success() => {
            return Err(PriceError::Unreachable(format!(
                "Price source returned HTTP {}",
                status
            )))
        }
        Err(e) => return Err(PriceError::Malformed(e.to_string())),
    };

    if let Some(error) = response.chart.error {
        if status == StatusCode::NOT_FOUND || error.code.eq_ignore_ascii_case("Not Found") {
            return Err(PriceError::UnknownTicker(ticker.to_string()));
        }
        return Err(PriceError::Unreachable(format!(
            "{}: {}",
            error.code, error.description
        )));
    }

    if !status.is_success() {
        return Err(PriceError::Unreachable(format!(
            "Price source returned HTTP {}",
            status
        )));
    }

    let data = match response.chart.result.as_deref() {
        Some([first, ..]) => first,
        _ => return Err(PriceError::UnknownTicker(ticker.to_string())),
    };

    let offset = data.meta.as_ref().and_then(|m| m.gmtoffset).unwrap_or(0);
    let closes = data.indicators.quote.first().map(|q| q.close.as_slice());
    let adj_closes = data
        .indicators
        .adjclose
        .as_ref()
        .and_then(|a| a.first())
        .map(|a| a.adjclose.as_slice());

    let mut rows = Vec::with_capacity(data.timestamp.len());
    for (i, ts) in data.timestamp.iter().enumerate() {
        let date = trading_date(*ts, offset)
            .ok_or_else(|| PriceError::Malformed(format!("Invalid timestamp: {}", ts)))?;
        rows.push(PriceRow {
            date,
            close: closes.and_then(|c| c.get(i).copied().flatten()),
            adj_close: adj_closes.and_then(|a| a.get(i).copied().flatten()),
        });
    }

    Ok(rows)
}

/// Exchange-local calendar date of a bar timestamp.
fn trading_date(timestamp: i64, gmt_offset: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(timestamp + gmt_offset, 0).map(|dt| dt.date_naive())
}

#[async_trait::async_trait]
impl PriceSource for YahooPriceSource {
    async fn fetch(
        &self,
        ticker: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<PriceRow>, PriceError> {
        let url = self.build_url(ticker, start, end);
        tracing::debug!(ticker, url = %url, "Requesting Yahoo chart");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        parse_chart(ticker, status, &body)
    }

    fn name(&self) -> &'static str {
        "yahoo"
    }
}
