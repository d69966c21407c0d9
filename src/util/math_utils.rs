/**
Calculates the `q`-th quantile of a slice of f64 values using linear
interpolation between the closest ranks (the `(n - 1) * q` position).
Non-finite values are ignored.

## Arguments
- `values`: A slice of f64 values, in any order.
- `q`: The quantile to compute, in `[0, 1]`.

## Returns
The quantile, or `None` if no finite value is present or `q` is out of range.
 */
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if !(0.0..=1.0).contains(&q) {
        return None;
    }
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(|a, b| a.total_cmp(b));

    let position = (sorted.len() - 1) as f64 * q;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/**
Calculates the arithmetic mean of the defined values.

## Returns
The mean, or `None` if there are no defined values.
 */
pub fn mean(values: &[Option<f64>]) -> Option<f64> {
    let (sum, count) = values
        .iter()
        .flatten()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/**
Calculates the sample standard deviation (n - 1 denominator) of the defined values.

## Returns
The standard deviation, or `None` if fewer than two values are defined.
 */
pub fn sample_std_deviation(values: &[Option<f64>]) -> Option<f64> {
    let defined: Vec<f64> = values.iter().flatten().copied().collect();
    let n = defined.len();
    if n < 2 {
        return None;
    }

    let mean = defined.iter().sum::<f64>() / n as f64;
    let variance = defined
        .iter()
        .map(|value| {
            let diff = mean - value;
            diff * diff
        })
        .sum::<f64>()
        / (n - 1) as f64;

    Some(variance.sqrt())
}
