//! PTAX Rate Engine
//!
//! Resolves the official daily BRL exchange rates (PTAX) published by the
//! Banco Central do Brasil and converts amounts between currencies using them.
//!
//! # Features
//!
//! - Backward date walk over weekends, holidays and outages
//! - Per-attempt timeouts
//! - Rate set caching with configurable TTL
//! - Buy/sell and cross-rate conversions through BRL
//!
//! # Example
//!
//! ```rust,ignore
//! use ptax_fx::{ConvertOptions, PtaxConfig, PtaxEngine};
//! use rust_decimal_macros::dec;
//!
//! let engine = PtaxEngine::new(PtaxConfig::default())?;
//!
//! // Latest USD quote
//! let usd = engine.get_rate("USD", &engine.default_options()).await?;
//!
//! // 100 EUR in USD at the sell rate
//! let options = ConvertOptions::from(engine.default_options());
//! let conversion = engine.convert(dec!(100), "EUR", "USD", &options).await?;
//! ```

pub mod engine;
pub mod feed;
pub mod cache;
pub mod config;
pub mod conversion;
pub mod parser;
pub mod error;

pub use engine::{ConvertOptions, PtaxEngine, ResolveOptions, ResolvedRates};
pub use feed::{FeedResponse, FeedTransport, ReqwestTransport, TransportError};
pub use cache::{Clock, ManualClock, RateCache, SharedRateCache, SystemClock};
pub use config::PtaxConfig;
pub use conversion::{Conversion, ConversionRequest};
pub use parser::parse_feed;
pub use error::{PtaxError, PtaxResult};

#[cfg(any(test, feature = "test-utils"))]
pub use feed::{MockFeedTransport, MockResponse};

pub use ptax_common::{Currency, CurrencyKind, PtaxRate, RateKind, RateSet};
