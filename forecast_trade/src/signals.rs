//! Rule-based trading signals
//!
//! Turns a point forecast plus trend and valuation indicators into one of a
//! fixed set of recommendations. Rules are evaluated in order and the first
//! match wins; they overlap, so the order is part of the policy.

use crate::confidence::Interval;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimum forecast variation (%) for a trend buy
pub const TREND_MIN_VARIATION_PCT: f64 = 1.5;
/// Price-to-book must stay below this for a trend buy
pub const TREND_MAX_PRICE_TO_BOOK: f64 = 1.1;
/// RSI below this marks the asset as cheap
pub const CHEAP_RSI: f64 = 35.0;
/// Price-to-book below this marks the asset as cheap
pub const CHEAP_PRICE_TO_BOOK: f64 = 0.95;
/// A cheap asset is a value buy while the forecast variation (%) stays above this
pub const VALUE_MIN_VARIATION_PCT: f64 = -1.0;
/// Forecast variation (%) below this raises a sell alert
pub const ALERT_MAX_VARIATION_PCT: f64 = -2.5;

/// Discrete trading recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    /// Forecast up, fairly valued, above the long average
    BuyTrend,
    /// Discounted asset without a meaningful forecast drop
    BuyValue,
    /// Forecast drop, or below trend without being cheap
    SellAlert,
    /// None of the above
    Neutral,
}

impl Recommendation {
    /// Short status label
    pub fn label(&self) -> &'static str {
        match self {
            Recommendation::BuyTrend => "BUY (Trend)",
            Recommendation::BuyValue => "BUY (Value)",
            Recommendation::SellAlert => "SELL/ALERT",
            Recommendation::Neutral => "NEUTRAL",
        }
    }

    /// Fixed explanation attached to the recommendation
    pub fn rationale(&self) -> &'static str {
        match self {
            Recommendation::BuyTrend => "Uptrend confirmed.",
            Recommendation::BuyValue => "Asset trading at a discount.",
            Recommendation::SellAlert => "Risk of decline or out of trend.",
            Recommendation::Neutral => "Wait for a better entry.",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Thresholds used by [`SignalClassifier`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalThresholds {
    pub trend_min_variation_pct: f64,
    pub trend_max_price_to_book: f64,
    pub cheap_rsi: f64,
    pub cheap_price_to_book: f64,
    pub value_min_variation_pct: f64,
    pub alert_max_variation_pct: f64,
}

impl Default for SignalThresholds {
    fn default() -> Self {
        Self {
            trend_min_variation_pct: TREND_MIN_VARIATION_PCT,
            trend_max_price_to_book: TREND_MAX_PRICE_TO_BOOK,
            cheap_rsi: CHEAP_RSI,
            cheap_price_to_book: CHEAP_PRICE_TO_BOOK,
            value_min_variation_pct: VALUE_MIN_VARIATION_PCT,
            alert_max_variation_pct: ALERT_MAX_VARIATION_PCT,
        }
    }
}

/// Everything the classifier looks at
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalInputs {
    pub current: f64,
    pub target: f64,
    pub interval: Interval,
    pub moving_average_200: f64,
    pub rsi: f64,
    pub price_to_book: f64,
}

/// Classified signal with the quantities that decided it
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Signal {
    pub recommendation: Recommendation,
    pub rationale: &'static str,
    /// `(target / current - 1) * 100`
    pub variation_pct: f64,
    /// Current price above the 200-day average
    pub trend_up: bool,
    /// RSI or price-to-book below its cheapness threshold
    pub cheap: bool,
}

/// Forecast variation in percent
pub fn variation_pct(current: f64, target: f64) -> f64 {
    (target / current - 1.0) * 100.0
}

/// Applies the ordered recommendation rules
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SignalClassifier {
    thresholds: SignalThresholds,
}

impl SignalClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_thresholds(thresholds: SignalThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &SignalThresholds {
        &self.thresholds
    }

    /// Classify a forecast
    pub fn classify(&self, inputs: &SignalInputs) -> Signal {
        let t = &self.thresholds;
        let variation_pct = variation_pct(inputs.current, inputs.target);
        let trend_up = inputs.current > inputs.moving_average_200;
        let cheap = inputs.rsi < t.cheap_rsi || inputs.price_to_book < t.cheap_price_to_book;

        let recommendation = if variation_pct > t.trend_min_variation_pct
            && inputs.price_to_book < t.trend_max_price_to_book
            && trend_up
        {
            Recommendation::BuyTrend
        } else if cheap && variation_pct > t.value_min_variation_pct {
            Recommendation::BuyValue
        } else if variation_pct < t.alert_max_variation_pct || (!trend_up && !cheap) {
            Recommendation::SellAlert
        } else {
            Recommendation::Neutral
        };

        Signal {
            recommendation,
            rationale: recommendation.rationale(),
            variation_pct,
            trend_up,
            cheap,
        }
    }
}
