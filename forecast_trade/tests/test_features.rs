use chrono::NaiveDate;
use forecast_trade::features::{
    FeaturePipeline, MIN_HISTORY, MOVING_AVERAGE_WINDOW, RSI_PERIOD, VOLATILITY_WINDOW,
};
use forecast_trade::utils::generate_test_history;
use forecast_trade::{ForecastError, PriceHistory};
use rstest::rstest;
use trade_math::{rolling_volatility_series, rsi_series, sma_series, warm_up_len};

fn history(len: usize) -> PriceHistory {
    generate_test_history(len, 50.0, 0.01, 3).unwrap()
}

#[rstest]
#[case(0)]
#[case(1)]
#[case(150)]
#[case(199)]
fn test_short_history_is_rejected(#[case] len: usize) {
    let closes = vec![10.0; len];
    let start = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
    let short = PriceHistory::from_closes(start, &closes).unwrap();

    let err = FeaturePipeline::new().compute(&short, 10).unwrap_err();
    assert!(matches!(
        err,
        ForecastError::InsufficientHistory { required: 200, actual } if actual == len
    ));
}

#[rstest]
#[case(1)]
#[case(7)]
#[case(42)]
fn test_indicator_warm_up_lengths(#[case] seed: u64) {
    let closes = generate_test_history(400, 30.0, 0.02, seed).unwrap().closes();

    let rsi = rsi_series(&closes, RSI_PERIOD).unwrap();
    let volatility = rolling_volatility_series(&closes, VOLATILITY_WINDOW).unwrap();
    let moving_average = sma_series(&closes, MOVING_AVERAGE_WINDOW).unwrap();

    assert_eq!(warm_up_len(&rsi), 13);
    assert_eq!(warm_up_len(&volatility), 19);
    assert_eq!(warm_up_len(&moving_average), 199);

    assert!(rsi[13..].iter().all(Option::is_some));
    assert!(volatility[19..].iter().all(Option::is_some));
    assert!(moving_average[199..].iter().all(Option::is_some));
}

#[test]
fn test_rows_start_when_moving_average_is_defined() {
    let history = history(300);
    let rows = FeaturePipeline::indicator_rows(&history).unwrap();

    assert_eq!(rows.len(), 300 - (MOVING_AVERAGE_WINDOW - 1));
    assert_eq!(rows[0].date, history.points()[199].date);
    assert_eq!(rows.last().unwrap().date, history.last().unwrap().date);

    // moving average of the first retained row covers the first 200 closes
    let closes = history.closes();
    let expected = closes[..200].iter().sum::<f64>() / 200.0;
    assert!((rows[0].moving_average_200 - expected).abs() < 1e-9);

    for row in &rows {
        assert!((0.0..=100.0).contains(&row.rsi));
        assert!(row.volatility >= 0.0);
    }
}

#[test]
fn test_target_shifts_within_retained_rows() {
    let history = history(300);
    let horizon = 10;
    let rows = FeaturePipeline::indicator_rows(&history).unwrap();
    let frame = FeaturePipeline::new().compute(&history, horizon).unwrap();

    assert_eq!(frame.training.len(), rows.len() - horizon);
    assert_eq!(frame.retained_closes.len(), rows.len());

    for (j, sample) in frame.training.samples().iter().enumerate() {
        assert_eq!(sample.row, rows[j]);
        assert_eq!(sample.target, rows[j + horizon].close);
    }

    // the latest row has no target but is still returned
    assert_eq!(frame.latest, *rows.last().unwrap());
}

#[test]
fn test_training_order_is_chronological() {
    let frame = FeaturePipeline::new().compute(&history(320), 7).unwrap();
    let dates: Vec<_> = frame.training.samples().iter().map(|s| s.row.date).collect();
    assert!(dates.windows(2).all(|w| w[0] < w[1]));
    assert!(frame.latest.date > *dates.last().unwrap());
}

#[test]
fn test_minimum_history_leaves_no_training_rows() {
    let frame = FeaturePipeline::new()
        .compute(&history(MIN_HISTORY), 1)
        .unwrap();

    assert!(frame.training.is_empty());
    assert_eq!(frame.retained_closes.len(), 1);
    assert_eq!(frame.latest.close, frame.retained_closes[0]);
}

#[test]
fn test_horizon_longer_than_rows_leaves_no_training_rows() {
    let frame = FeaturePipeline::new().compute(&history(250), 60).unwrap();
    assert!(frame.training.is_empty());
}

#[test]
fn test_zero_horizon_is_rejected() {
    let err = FeaturePipeline::new().compute(&history(250), 0).unwrap_err();
    assert!(matches!(err, ForecastError::InvalidParameter(_)));
}

#[test]
fn test_feature_vector_order() {
    let frame = FeaturePipeline::new().compute(&history(260), 5).unwrap();
    let row = frame.latest;
    assert_eq!(row.features(), [row.close, row.rsi, row.volatility]);
    assert_eq!(frame.training.features().len(), frame.training.targets().len());
}
