use kira_hdxqc::math::stats::{descending_ranks, iqr, mean, median, pearson, quantile, variance};

#[test]
fn mean_and_variance_basic() {
    assert_eq!(mean(&[1.0, 2.0, 3.0, 4.0]), Some(2.5));
    let v = variance(&[1.0, 2.0, 3.0, 4.0]).unwrap();
    assert!((v - 5.0 / 3.0).abs() < 1e-12);
}

#[test]
fn undersized_inputs_are_undefined() {
    assert_eq!(mean(&[]), None);
    assert_eq!(variance(&[1.0]), None);
    assert_eq!(median(&mut []), None);
    assert_eq!(pearson(&[1.0], &[2.0]), None);
}

#[test]
fn median_odd_even() {
    let mut v1 = vec![3.0, 1.0, 2.0];
    assert_eq!(median(&mut v1), Some(2.0));
    let mut v2 = vec![4.0, 1.0, 2.0, 3.0];
    assert_eq!(median(&mut v2), Some(2.5));
}

#[test]
fn quantile_interpolates_linearly() {
    let mut v: Vec<f64> = (1..=10).map(|i| i as f64).collect();
    let q = quantile(&mut v, 0.95).unwrap();
    assert!((q - 9.55).abs() < 1e-9);
    assert_eq!(quantile(&mut v, 0.0), Some(1.0));
    assert_eq!(quantile(&mut v, 1.0), Some(10.0));
    assert_eq!(quantile(&mut v, 1.5), None);
}

#[test]
fn iqr_of_small_sample() {
    let mut v = vec![1.5, -1.0, 0.0, 1.0, 0.0];
    assert_eq!(iqr(&mut v), Some(1.0));
}

#[test]
fn pearson_signs_and_constant_input() {
    let x = [1.0, 2.0, 3.0, 4.0];
    let up = pearson(&x, &[2.0, 4.0, 6.0, 8.0]).unwrap();
    let down = pearson(&x, &[8.0, 6.0, 4.0, 2.0]).unwrap();
    assert!((up - 1.0).abs() < 1e-12);
    assert!((down + 1.0).abs() < 1e-12);
    assert_eq!(pearson(&x, &[3.0, 3.0, 3.0, 3.0]), None);
}

#[test]
fn descending_ranks_break_ties_towards_later_elements() {
    assert_eq!(descending_ranks(&[1.0, 3.0, 2.0]), vec![3, 1, 2]);
    assert_eq!(descending_ranks(&[5.0, 5.0]), vec![2, 1]);
    assert_eq!(descending_ranks(&[0.0, 0.0, 0.0]), vec![3, 2, 1]);
}
