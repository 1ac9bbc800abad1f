//! Main PTAX engine implementation.
//!
//! Resolution walks backwards one calendar day at a time from the requested
//! date until the feed yields a non-empty rate set or the lookback bound is
//! used up. Missing files, transport failures and timeouts are expected (the
//! feed has no weekend or holiday files) and only cost one day of the bound.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use ptax_common::{
    constants, format_date_key, previous_day, Currency, PtaxRate, RateKind, RateSet,
};
use rust_decimal::Decimal;
use tracing::{debug, info, instrument, warn};

use crate::cache::{Clock, RateCache, SharedRateCache, SystemClock};
use crate::config::PtaxConfig;
use crate::conversion::{self, Conversion, ConversionRequest};
use crate::error::{PtaxError, PtaxResult};
use crate::feed::{feed_url, FeedTransport, ReqwestTransport, TransportError};
use crate::parser::parse_feed;

/// Per-call resolution options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Calendar days to try, including the start date.
    pub max_retries: u32,
    /// Timeout for each feed request.
    pub timeout: Duration,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            max_retries: constants::DEFAULT_MAX_RETRIES,
            timeout: Duration::from_millis(constants::DEFAULT_TIMEOUT_MS),
        }
    }
}

impl ResolveOptions {
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Options for conversions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvertOptions {
    pub resolve: ResolveOptions,
    pub rate_kind: RateKind,
}

impl ConvertOptions {
    pub fn with_rate_kind(mut self, rate_kind: RateKind) -> Self {
        self.rate_kind = rate_kind;
        self
    }
}

impl From<ResolveOptions> for ConvertOptions {
    fn from(resolve: ResolveOptions) -> Self {
        Self {
            resolve,
            rate_kind: RateKind::default(),
        }
    }
}

/// A rate set together with the date it was found for.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRates {
    pub rates: RateSet,
    pub date: NaiveDate,
}

/// Outcome of a single feed attempt.
#[derive(Debug)]
enum AttemptOutcome {
    Success(RateSet),
    NoData,
    TransientFailure(String),
}

/// The main PTAX engine.
pub struct PtaxEngine {
    transport: Arc<dyn FeedTransport>,
    cache: SharedRateCache,
    clock: Arc<dyn Clock>,
    base_url: String,
    defaults: ResolveOptions,
}

impl PtaxEngine {
    /// Create an engine that fetches over HTTP.
    pub fn new(config: PtaxConfig) -> Result<Self, TransportError> {
        let transport = Arc::new(ReqwestTransport::new(&config.user_agent)?);
        Ok(Self::with_transport(transport, config))
    }

    /// Create an engine over a custom transport.
    pub fn with_transport(transport: Arc<dyn FeedTransport>, config: PtaxConfig) -> Self {
        let ttl = chrono::Duration::from_std(config.cache_ttl)
            .unwrap_or_else(|_| constants::cache_ttl());
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let cache = Arc::new(RateCache::with_clock(ttl, clock.clone()));
        Self::with_parts(transport, cache, clock, config)
    }

    /// Create an engine from explicit collaborators.
    pub fn with_parts(
        transport: Arc<dyn FeedTransport>,
        cache: SharedRateCache,
        clock: Arc<dyn Clock>,
        config: PtaxConfig,
    ) -> Self {
        Self {
            transport,
            cache,
            clock,
            defaults: config.resolve_options(),
            base_url: config.base_url,
        }
    }

    /// Options used when a caller has none of its own.
    pub fn default_options(&self) -> ResolveOptions {
        self.defaults
    }

    pub fn cache(&self) -> &SharedRateCache {
        &self.cache
    }

    /// Today according to the engine's clock.
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Find the most recent rate set at or before `target`.
    #[instrument(skip(self, options), fields(max_retries = options.max_retries))]
    pub async fn resolve(
        &self,
        target: NaiveDate,
        options: &ResolveOptions,
    ) -> PtaxResult<ResolvedRates> {
        let mut candidate = target;

        for attempt in 1..=options.max_retries {
            let key = format_date_key(candidate);

            if let Some(rates) = self.cache.get(&key) {
                debug!(date = %candidate, "Using cached rates");
                return Ok(ResolvedRates {
                    rates,
                    date: candidate,
                });
            }

            match self.attempt(candidate, options.timeout).await {
                AttemptOutcome::Success(rates) => {
                    info!(
                        date = %candidate,
                        attempt,
                        currencies = rates.len(),
                        "Resolved PTAX rates"
                    );
                    self.cache.put(key, rates.clone());
                    return Ok(ResolvedRates {
                        rates,
                        date: candidate,
                    });
                }
                AttemptOutcome::NoData => {
                    debug!(date = %candidate, attempt, "No PTAX data for date");
                }
                AttemptOutcome::TransientFailure(reason) => {
                    warn!(date = %candidate, attempt, error = %reason, "Feed request failed");
                }
            }

            candidate = match previous_day(candidate) {
                Some(day) => day,
                None => break,
            };
        }

        Err(PtaxError::DataUnavailable {
            days: options.max_retries,
        })
    }

    async fn attempt(&self, date: NaiveDate, timeout: Duration) -> AttemptOutcome {
        let url = feed_url(&self.base_url, date);
        debug!(url = %url, transport = self.transport.name(), "Fetching feed");

        let response = match tokio::time::timeout(timeout, self.transport.get(&url, timeout)).await
        {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => return AttemptOutcome::TransientFailure(e.to_string()),
            Err(_) => {
                return AttemptOutcome::TransientFailure(
                    TransportError::Timeout(timeout).to_string(),
                )
            }
        };

        if !response.is_success() {
            debug!(status = response.status, "Feed returned non-success status");
            return AttemptOutcome::NoData;
        }

        let rates = parse_feed(&response.body);
        if rates.is_empty() {
            AttemptOutcome::NoData
        } else {
            AttemptOutcome::Success(rates)
        }
    }

    /// Rates for the most recent date with data, starting from today.
    pub async fn resolve_latest(&self, options: &ResolveOptions) -> PtaxResult<RateSet> {
        Ok(self.resolve(self.today(), options).await?.rates)
    }

    /// Rates for `date`, or the closest earlier date with data.
    pub async fn resolve_for_date(
        &self,
        date: NaiveDate,
        options: &ResolveOptions,
    ) -> PtaxResult<RateSet> {
        Ok(self.resolve(date, options).await?.rates)
    }

    /// Drop every cached rate set.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Latest record for one currency.
    pub async fn get_rate(&self, code: &str, options: &ResolveOptions) -> PtaxResult<PtaxRate> {
        let rates = self.resolve_latest(options).await?;
        conversion::find_rate(&rates, code).cloned()
    }

    /// Currency codes in the latest rate set, sorted.
    pub async fn supported_currencies(&self, options: &ResolveOptions) -> PtaxResult<Vec<Currency>> {
        let rates = self.resolve_latest(options).await?;
        Ok(rates.currencies())
    }

    /// Convert `amount` between two currencies using the latest rates.
    #[instrument(skip(self, options), fields(rate_kind = %options.rate_kind))]
    pub async fn convert(
        &self,
        amount: Decimal,
        from: &str,
        to: &str,
        options: &ConvertOptions,
    ) -> PtaxResult<Conversion> {
        let rates = self.resolve_latest(&options.resolve).await?;
        let request =
            ConversionRequest::new(amount, from, to).with_rate_kind(options.rate_kind);

        let conversion = conversion::convert(&rates, &request, self.today())?;

        info!(
            result = %conversion.result,
            rate = %conversion.rate,
            rate_kind = %conversion.rate_kind,
            date = %conversion.date,
            "Conversion completed"
        );

        Ok(conversion)
    }
}
