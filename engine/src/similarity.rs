use crate::error::ErrorKind;
use controller::Score;
use num_traits::float::Float;
use std::convert::TryFrom;
use std::ops::AddAssign;

/// Pearson correlation between the first and second elements of `pairs`.
///
/// Symmetric: swapping every `(x, y)` into `(y, x)` yields the same value.
/// Fails when there are fewer than two pairs or when either side has no
/// variance, in both cases the correlation isn't defined.
pub fn pearson_correlation<V>(pairs: &[(V, V)]) -> Result<V, ErrorKind>
where
    V: Float + AddAssign,
{
    match pairs.len() {
        0 => return Err(ErrorKind::NoMatchingRatings),
        1 => return Err(ErrorKind::NotEnoughPairs),
        _ => {}
    }

    let n = V::from(pairs.len()).ok_or(ErrorKind::ConvertType)?;

    let mut mean_x = V::zero();
    let mut mean_y = V::zero();

    for (x, y) in pairs {
        mean_x += *x;
        mean_y += *y;
    }

    let mean_x = mean_x / n;
    let mean_y = mean_y / n;

    let mut cov = V::zero();
    let mut std_dev_x = V::zero();
    let mut std_dev_y = V::zero();

    for (x, y) in pairs {
        cov += (*x - mean_x) * (*y - mean_y);
        std_dev_x += (*x - mean_x).powi(2);
        std_dev_y += (*y - mean_y).powi(2);
    }

    if std_dev_x.is_zero() || std_dev_y.is_zero() {
        return Err(ErrorKind::IndeterminateForm);
    }

    let pearson = cov / (std_dev_x.sqrt() * std_dev_y.sqrt());
    if pearson.is_nan() || pearson.is_infinite() {
        Err(ErrorKind::IndeterminateForm)
    } else {
        // Rounding may push it slightly past the bounds
        Ok(pearson.max(-V::one()).min(V::one()))
    }
}

/// Pearson correlation over integer scores.
///
/// Sums are exact in `i64`, so a covariance that is zero stays zero and only
/// the final division is done in floating point.
pub fn pearson_exact(pairs: &[(Score, Score)]) -> Result<f64, ErrorKind> {
    match pairs.len() {
        0 => return Err(ErrorKind::NoMatchingRatings),
        1 => return Err(ErrorKind::NotEnoughPairs),
        _ => {}
    }

    let n = i64::try_from(pairs.len()).map_err(|_| ErrorKind::ConvertType)?;

    let (mut sum_x, mut sum_y) = (0_i64, 0_i64);
    let (mut sum_xx, mut sum_yy, mut sum_xy) = (0_i64, 0_i64, 0_i64);

    for (x, y) in pairs {
        let (x, y) = (i64::from(*x), i64::from(*y));

        sum_x += x;
        sum_y += y;
        sum_xx += x * x;
        sum_yy += y * y;
        sum_xy += x * y;
    }

    let cov = n * sum_xy - sum_x * sum_y;
    let var_x = n * sum_xx - sum_x * sum_x;
    let var_y = n * sum_yy - sum_y * sum_y;

    if var_x == 0 || var_y == 0 {
        return Err(ErrorKind::IndeterminateForm);
    }

    if cov == 0 {
        return Ok(0.0);
    }

    let pearson = cov as f64 / ((var_x as f64).sqrt() * (var_y as f64).sqrt());

    // Rounding may push it slightly past the bounds
    Ok(pearson.max(-1.0).min(1.0))
}

/// Similarity between two users given their paired scores, `None` when it
/// can't be computed
pub fn pearson(pairs: &[(Score, Score)]) -> Option<f64> {
    match pearson_exact(pairs) {
        Ok(similarity) => Some(similarity),
        Err(e) => {
            log::trace!("No similarity for {} pairs: {}", pairs.len(), e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::*;

    #[test]
    fn identical_sequences_correlate_perfectly() {
        let pairs = [(1, 1), (3, 3), (5, 5), (2, 2)];
        assert_approx_eq!(pearson(&pairs).unwrap(), 1.0);
    }

    #[test]
    fn shifted_sequences_correlate_perfectly() {
        let pairs = [(1, 2), (2, 3), (3, 4)];
        assert_approx_eq!(pearson(&pairs).unwrap(), 1.0);
    }

    #[test]
    fn reversed_sequences_anticorrelate() {
        let pairs = [(1, 5), (2, 4), (3, 3), (4, 2), (5, 1)];
        assert_approx_eq!(pearson(&pairs).unwrap(), -1.0);
    }

    #[test]
    fn swapping_sides_keeps_value() {
        let pairs = [(1, 2), (4, 3), (5, 5), (2, 4), (3, 1)];
        let swapped: Vec<_> = pairs.iter().map(|(x, y)| (*y, *x)).collect();

        let a = pearson(&pairs).unwrap();
        let b = pearson(&swapped).unwrap();

        assert_approx_eq!(a, b);
        assert_approx_eq!(a, 0.5);
    }

    #[test]
    fn known_value() {
        // x = [1, 2, 3, 4], y = [2, 1, 4, 3]
        let pairs = [(1., 2.), (2., 1.), (3., 4.), (4., 3.)];
        assert_approx_eq!(pearson_correlation(&pairs).unwrap(), 0.6);
    }

    #[test]
    fn too_few_pairs_is_undefined() {
        let empty: [(f64, f64); 0] = [];

        assert_eq!(pearson_correlation(&empty), Err(ErrorKind::NoMatchingRatings));
        assert_eq!(
            pearson_correlation(&[(3.0, 4.0)]),
            Err(ErrorKind::NotEnoughPairs)
        );

        assert!(pearson(&[]).is_none());
        assert!(pearson(&[(3, 4)]).is_none());
    }

    #[test]
    fn zero_variance_is_undefined() {
        assert_eq!(
            pearson_correlation(&[(3.0, 1.0), (3.0, 2.0), (3.0, 5.0)]),
            Err(ErrorKind::IndeterminateForm)
        );

        assert!(pearson(&[(1, 4), (2, 4), (5, 4)]).is_none());
    }

    #[test]
    fn uncorrelated_scores_are_exactly_zero() {
        // n * sum(xy) == sum(x) * sum(y), floats alone would leave a residue
        let pairs = [(5, 5), (1, 2), (1, 3), (2, 5), (5, 1), (4, 3)];

        assert_eq!(pearson_exact(&pairs), Ok(0.0));
        assert_eq!(pearson(&pairs), Some(0.0));
    }

    #[test]
    fn exact_and_generic_forms_agree() {
        let pairs = [(1, 2), (2, 4), (3, 5), (4, 4), (5, 5), (1, 1), (2, 3)];
        let floats: Vec<_> = pairs
            .iter()
            .map(|(x, y)| (f64::from(*x), f64::from(*y)))
            .collect();

        assert_approx_eq!(pearson(&pairs).unwrap(), pearson_correlation(&floats).unwrap());
    }

    #[test]
    fn result_stays_in_range() {
        let pairs = [(1, 2), (2, 4), (3, 5), (4, 4), (5, 5), (1, 1), (2, 3)];
        let similarity = pearson(&pairs).unwrap();

        assert!((-1.0..=1.0).contains(&similarity));
    }
}
