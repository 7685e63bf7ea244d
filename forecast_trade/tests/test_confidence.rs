use approx::assert_relative_eq;
use forecast_trade::{ConfidenceEstimator, ForecastError, Interval};

#[test]
fn test_interval_is_point_plus_minus_population_std() {
    let estimator = ConfidenceEstimator::new();
    let interval = estimator.estimate(&[1.0, 2.0, 3.0, 4.0], 2.5).unwrap();

    let sigma = 1.25_f64.sqrt();
    assert_relative_eq!(interval.low, 2.5 - sigma, epsilon = 1e-12);
    assert_relative_eq!(interval.high, 2.5 + sigma, epsilon = 1e-12);
    assert_relative_eq!(interval.width(), 2.0 * sigma, epsilon = 1e-12);
}

#[test]
fn test_interval_brackets_the_point() {
    let estimator = ConfidenceEstimator::new();
    let predictions = [10.2, 9.8, 10.5, 10.1, 9.9, 10.4];
    let point = predictions.iter().sum::<f64>() / predictions.len() as f64;
    let interval = estimator.estimate(&predictions, point).unwrap();

    assert!(interval.low <= point);
    assert!(point <= interval.high);
    assert!(interval.contains(point));
}

#[test]
fn test_agreeing_estimators_collapse_the_interval() {
    let interval = ConfidenceEstimator::new()
        .estimate(&[7.25; 100], 7.25)
        .unwrap();
    assert_eq!(interval, Interval::point(7.25));
    assert_eq!(interval.width(), 0.0);
}

#[test]
fn test_single_estimator_has_zero_dispersion() {
    assert_eq!(ConfidenceEstimator::dispersion(&[3.0]), 0.0);
    assert_eq!(ConfidenceEstimator::dispersion(&[]), 0.0);
}

#[test]
fn test_empty_predictions_are_rejected() {
    let err = ConfidenceEstimator::new().estimate(&[], 1.0).unwrap_err();
    assert!(matches!(err, ForecastError::InvalidParameter(_)));
}

#[test]
fn test_non_finite_predictions_are_rejected() {
    let estimator = ConfidenceEstimator::new();
    assert!(matches!(
        estimator.estimate(&[1.0, f64::NAN], 1.0),
        Err(ForecastError::InvalidData(_))
    ));
    assert!(matches!(
        estimator.estimate(&[1.0, 2.0], f64::INFINITY),
        Err(ForecastError::InvalidData(_))
    ));
}
