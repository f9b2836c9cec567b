/// Computes the arithmetic mean of a slice of values. Returns 0.0 for empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Returns the `(max, min)` points of an ordered series, or `None` when empty.
///
/// Ties keep the earliest point, so callers must pass the series in
/// ascending key order.
pub fn extrema<K, I>(points: I) -> Option<((K, usize), (K, usize))>
where
    K: Copy,
    I: IntoIterator<Item = (K, usize)>,
{
    let mut iter = points.into_iter();
    let first = iter.next()?;

    Some(iter.fold((first, first), |(max, min), point| {
        let max = if point.1 > max.1 { point } else { max };
        let min = if point.1 < min.1 { point } else { min };
        (max, min)
    }))
}
