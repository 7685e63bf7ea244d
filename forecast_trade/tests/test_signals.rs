use forecast_trade::signals::{SignalThresholds, ALERT_MAX_VARIATION_PCT, CHEAP_RSI};
use forecast_trade::{Interval, Recommendation, SignalClassifier, SignalInputs};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn scenario(current: f64, target: f64, moving_average_200: f64, rsi: f64, price_to_book: f64) -> SignalInputs {
    SignalInputs {
        current,
        target,
        interval: Interval::new(target - 0.1, target + 0.1),
        moving_average_200,
        rsi,
        price_to_book,
    }
}

#[rstest]
#[case::uptrend(scenario(10.0, 10.20, 9.0, 50.0, 1.05), Recommendation::BuyTrend)]
#[case::oversold(scenario(10.0, 9.95, 9.0, 30.0, 1.2), Recommendation::BuyValue)]
#[case::forecast_drop(scenario(10.0, 9.60, 11.0, 60.0, 1.5), Recommendation::SellAlert)]
#[case::flat(scenario(10.0, 10.05, 9.0, 60.0, 1.5), Recommendation::Neutral)]
#[case::below_trend_not_cheap(scenario(10.0, 10.05, 11.0, 60.0, 1.5), Recommendation::SellAlert)]
#[case::discount_on_book(scenario(10.0, 9.95, 11.0, 60.0, 0.9), Recommendation::BuyValue)]
#[case::cheap_but_dropping(scenario(10.0, 9.5, 9.0, 30.0, 1.5), Recommendation::SellAlert)]
#[case::cheap_small_drop(scenario(10.0, 9.8, 11.0, 30.0, 1.5), Recommendation::Neutral)]
fn test_classification(#[case] inputs: SignalInputs, #[case] expected: Recommendation) {
    let signal = SignalClassifier::new().classify(&inputs);
    assert_eq!(signal.recommendation, expected);
    assert_eq!(signal.rationale, expected.rationale());
}

#[test]
fn test_first_matching_rule_wins() {
    // trend and value rules both match; the trend rule comes first
    let signal = SignalClassifier::new().classify(&scenario(10.0, 10.20, 9.0, 50.0, 0.9));
    assert!(signal.trend_up);
    assert!(signal.cheap);
    assert_eq!(signal.recommendation, Recommendation::BuyTrend);
}

#[test]
fn test_signal_reports_decision_inputs() {
    let signal = SignalClassifier::new().classify(&scenario(10.0, 10.20, 9.0, 50.0, 1.05));
    assert!((signal.variation_pct - 2.0).abs() < 1e-9);
    assert!(signal.trend_up);
    assert!(!signal.cheap);
}

#[test]
fn test_classification_is_pure() {
    let classifier = SignalClassifier::new();
    let inputs = scenario(10.0, 9.60, 11.0, 60.0, 1.5);
    assert_eq!(classifier.classify(&inputs), classifier.classify(&inputs));
}

#[test]
fn test_thresholds_are_strict() {
    let classifier = SignalClassifier::new();

    // price-to-book exactly at the trend limit does not qualify
    let at_limit = classifier.classify(&scenario(10.0, 10.20, 9.0, 50.0, 1.1));
    assert_eq!(at_limit.recommendation, Recommendation::Neutral);

    // RSI exactly at the cheap limit is not cheap
    let at_rsi = classifier.classify(&scenario(10.0, 10.05, 11.0, CHEAP_RSI, 1.5));
    assert!(!at_rsi.cheap);
    assert_eq!(at_rsi.recommendation, Recommendation::SellAlert);

    // current price equal to the moving average is not an uptrend
    let flat_trend = classifier.classify(&scenario(10.0, 10.20, 10.0, 50.0, 1.0));
    assert!(!flat_trend.trend_up);
    assert_eq!(flat_trend.recommendation, Recommendation::SellAlert);
}

#[test]
fn test_alert_threshold_boundary() {
    let classifier = SignalClassifier::new();
    let current = 10.0;
    let target = current * (1.0 + (ALERT_MAX_VARIATION_PCT - 0.01) / 100.0);
    let signal = classifier.classify(&scenario(current, target, 9.0, 60.0, 1.5));
    assert_eq!(signal.recommendation, Recommendation::SellAlert);
}

#[test]
fn test_custom_thresholds() {
    let classifier = SignalClassifier::with_thresholds(SignalThresholds {
        trend_min_variation_pct: 0.1,
        ..SignalThresholds::default()
    });
    let signal = classifier.classify(&scenario(10.0, 10.05, 9.0, 60.0, 1.0));
    assert_eq!(signal.recommendation, Recommendation::BuyTrend);
    assert_eq!(classifier.thresholds().trend_min_variation_pct, 0.1);
}

#[test]
fn test_labels_and_rationales() {
    let expected = [
        (Recommendation::BuyTrend, "BUY (Trend)", "Uptrend confirmed."),
        (Recommendation::BuyValue, "BUY (Value)", "Asset trading at a discount."),
        (Recommendation::SellAlert, "SELL/ALERT", "Risk of decline or out of trend."),
        (Recommendation::Neutral, "NEUTRAL", "Wait for a better entry."),
    ];
    for (recommendation, label, rationale) in expected {
        assert_eq!(recommendation.label(), label);
        assert_eq!(recommendation.to_string(), label);
        assert_eq!(recommendation.rationale(), rationale);
    }
}

#[test]
fn test_recommendation_serializes_as_screaming_snake_case() {
    let json = serde_json::to_string(&Recommendation::BuyTrend).unwrap();
    assert_eq!(json, "\"BUY_TREND\"");
}
