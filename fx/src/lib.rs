//! EuroFX Engine
//!
//! Reference-rate currency conversion with a tiered service fee.
//!
//! # Features
//!
//! - Daily ECB reference rates fetched over HTTP and parsed from XML
//! - Cross-rate conversion through the base currency
//! - Multiplicatively decaying fee tiers on the base-currency amount
//!
//! # Example
//!
//! ```rust,ignore
//! use eurofx_fx::{ConversionEngine, ConversionRequest, EcbRateProvider, RateProvider};
//! use eurofx_common::Currency;
//!
//! let table = EcbRateProvider::new().fetch_rates().await?;
//! let engine = ConversionEngine::default();
//!
//! let request = ConversionRequest::new(Currency::usd(), Currency::gbp(), dec!(100));
//! let quote = engine.quote(&request, &table)?;
//! println!("{} (fee {})", quote.converted, quote.fee);
//! ```

pub mod engine;
pub mod provider;
pub mod fee;
pub mod conversion;
pub mod error;

pub use engine::{ConversionEngine, FxEngineConfig};
pub use provider::{parse_rate_feed, EcbRateProvider, RateProvider, ECB_DAILY_FEED_URL};
#[cfg(any(test, feature = "test-utils"))]
pub use provider::StaticRateProvider;
pub use fee::FeeSchedule;
pub use conversion::{ConversionQuote, ConversionRequest};
pub use error::{FxError, FxResult};
