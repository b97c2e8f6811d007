//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::float::FloatCore;
use num_traits::Float;
use ordered_float::OrderedFloat;

/// Return the median of a slice of values by the index convention.
///
/// The returned value is the element at sorted index `n / 2` (integer
/// division). For an even number of values this selects a single central
/// element rather than averaging the two middle values.
///
/// NaN values sort greatest (see [`ordered_float::OrderedFloat`]). Returns
/// `None` if the slice is empty.
pub fn lower_median<T>(values: &[T]) -> Option<T>
where
    T: Float + FloatCore,
{
    if values.is_empty() {
        return None;
    }

    let mut sorted: Vec<OrderedFloat<T>> = values.iter().map(|v| OrderedFloat(*v)).collect();
    sorted.sort();

    Some(sorted[sorted.len() / 2].into_inner())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_lower_median() {
        // Odd number of values is the true median
        assert_eq!(lower_median(&[5f64, 1f64, 4f64, 2f64, 3f64]), Some(3f64));

        // Even number of values selects sorted index n/2, not the average of
        // the two central elements
        assert_eq!(lower_median(&[4f64, 1f64, 3f64, 2f64]), Some(3f64));

        // Degenerate cases
        assert_eq!(lower_median(&[7f64]), Some(7f64));
        assert_eq!(lower_median::<f64>(&[]), None);
    }
}
