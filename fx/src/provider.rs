//! Rate provider trait and the ECB reference rate feed.

use async_trait::async_trait;
use chrono::NaiveDate;
use eurofx_common::{Currency, RateTable, RateTableBuilder};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use reqwest::header::ACCEPT;
use reqwest::Client;
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::{debug, info, instrument, warn};

use crate::error::{FxError, FxResult};

/// Daily euro foreign exchange reference rates published by the ECB.
pub const ECB_DAILY_FEED_URL: &str = "https://www.ecb.europa.eu/stats/eurofxref/eurofxref-daily.xml";

/// Trait for sources of base-relative rate tables.
#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Get the provider name.
    fn name(&self) -> &str;

    /// Fetch a fresh rate table. Every call hits the source again.
    async fn fetch_rates(&self) -> FxResult<RateTable>;
}

/// Provider reading the ECB daily XML feed.
pub struct EcbRateProvider {
    client: Client,
    feed_url: String,
    base: Currency,
}

impl EcbRateProvider {
    /// Create a provider for the public ECB feed.
    pub fn new() -> Self {
        Self::with_feed_url(ECB_DAILY_FEED_URL)
    }

    /// Create a provider for a feed served from another URL.
    pub fn with_feed_url(feed_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            feed_url: feed_url.into(),
            base: Currency::eur(),
        }
    }

    /// Use a preconfigured HTTP client.
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Get the feed URL.
    pub fn feed_url(&self) -> &str {
        &self.feed_url
    }
}

impl Default for EcbRateProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RateProvider for EcbRateProvider {
    fn name(&self) -> &str {
        "ECB"
    }

    #[instrument(skip(self))]
    async fn fetch_rates(&self) -> FxResult<RateTable> {
        debug!(url = %self.feed_url, "Fetching reference rates");

        let response = self
            .client
            .get(&self.feed_url)
            .header(ACCEPT, "application/xml")
            .send()
            .await
            .map_err(|e| FxError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %self.feed_url, status = %status, "Rate feed request failed");
            return Err(FxError::HttpStatus(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FxError::Network(e.to_string()))?;

        let table = parse_rate_feed(&body, self.base.clone())?;

        info!(
            currencies = table.len(),
            as_of = ?table.as_of(),
            "Fetched reference rates"
        );

        Ok(table)
    }
}

/// Parse a rate feed document.
///
/// Every element carrying both a `currency` and a `rate` attribute adds one
/// entry; other elements are ignored. Entries with an unusable code or a
/// non-positive rate are dropped. A `time` attribute, if present, becomes the
/// table date. The base currency is always set to one.
pub fn parse_rate_feed(xml: &str, base: Currency) -> FxResult<RateTable> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut builder = RateTable::builder(base);
    let mut depth: usize = 0;
    let mut saw_element = false;

    loop {
        let event = reader.read_event().map_err(|e| {
            FxError::Parse(format!("at byte {}: {}", reader.buffer_position(), e))
        })?;

        match event {
            Event::Start(element) => {
                depth += 1;
                saw_element = true;
                read_rate_element(&element, &mut builder)?;
            }
            Event::Empty(element) => {
                saw_element = true;
                read_rate_element(&element, &mut builder)?;
            }
            Event::End(_) => {
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_element {
        return Err(FxError::Parse("document contains no elements".to_string()));
    }

    if depth != 0 {
        return Err(FxError::Parse("unexpected end of document".to_string()));
    }

    debug!(entries = builder.len(), "Parsed rate feed");
    Ok(builder.build())
}

fn read_rate_element(
    element: &BytesStart<'_>,
    builder: &mut RateTableBuilder,
) -> FxResult<()> {
    let mut currency = None;
    let mut rate = None;

    for attr in element.attributes() {
        let attr = attr.map_err(|e| FxError::Parse(e.to_string()))?;
        let value = attr
            .unescape_value()
            .map_err(|e| FxError::Parse(e.to_string()))?;

        match attr.key.local_name().as_ref() {
            b"currency" => currency = Some(value.into_owned()),
            b"rate" => rate = Some(value.into_owned()),
            b"time" => match NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d") {
                Ok(date) => {
                    builder.as_of(date);
                }
                Err(_) => debug!(time = %value, "Ignoring unparseable feed date"),
            },
            _ => {}
        }
    }

    let (Some(code), Some(rate)) = (currency, rate) else {
        return Ok(());
    };

    let rate = match parse_decimal(&rate) {
        Some(value) => value,
        None if is_finite_number(&rate) => {
            warn!(currency = %code, rate = %rate, "Skipping rate outside decimal range");
            return Ok(());
        }
        None => {
            return Err(FxError::Parse(format!("invalid rate {:?} for {}", rate, code)));
        }
    };

    let currency = match Currency::parse(&code) {
        Ok(currency) => currency,
        Err(e) => {
            warn!(error = %e, "Skipping feed entry");
            return Ok(());
        }
    };

    if let Err(e) = builder.insert(currency, rate) {
        warn!(error = %e, "Skipping feed entry");
    }

    Ok(())
}

fn parse_decimal(value: &str) -> Option<Decimal> {
    let value = value.trim();
    Decimal::from_str(value)
        .or_else(|_| Decimal::from_scientific(value))
        .ok()
}

fn is_finite_number(value: &str) -> bool {
    value.trim().parse::<f64>().is_ok_and(f64::is_finite)
}

/// Provider returning a fixed table, for tests and offline use.
#[cfg(any(test, feature = "test-utils"))]
pub struct StaticRateProvider {
    table: Option<RateTable>,
}

#[cfg(any(test, feature = "test-utils"))]
impl StaticRateProvider {
    /// Create a provider that always returns `table`.
    pub fn new(table: RateTable) -> Self {
        Self { table: Some(table) }
    }

    /// Create a provider whose fetches always fail.
    pub fn unavailable() -> Self {
        Self { table: None }
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl RateProvider for StaticRateProvider {
    fn name(&self) -> &str {
        "STATIC"
    }

    async fn fetch_rates(&self) -> FxResult<RateTable> {
        self.table
            .clone()
            .ok_or_else(|| FxError::Network("static provider has no rates".to_string()))
    }
}
