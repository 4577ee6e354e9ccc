use crate::config::{PRICE_RANGE_COUNT, PRICE_RANGE_WIDTH};

/// Index of the bar-chart range a price falls into.
///
/// Ranges are labelled `0-100`, `101-200`, ..., `801-900`, `901-above`, and
/// the labels are inclusive on the integer upper end: 100 belongs to the
/// first range, 101 starts the second. Fractional prices between two labels
/// (e.g. 100.5) stay in the lower range, so every price lands in exactly one
/// range. Negative prices are counted in range 0.
pub fn range_index(price: f64) -> usize {
    let idx = ((price - 1.0) / PRICE_RANGE_WIDTH).floor();
    if idx.is_nan() || idx < 0.0 {
        0
    } else {
        (idx as usize).min(PRICE_RANGE_COUNT - 1)
    }
}

/// Count prices per range.
pub fn histogram<I>(prices: I) -> Vec<i64>
where
    I: IntoIterator<Item = f64>,
{
    let mut counts = vec![0i64; PRICE_RANGE_COUNT];
    for price in prices {
        counts[range_index(price)] += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_follow_the_labels() {
        assert_eq!(range_index(0.0), 0);
        assert_eq!(range_index(100.0), 0);
        assert_eq!(range_index(100.5), 0);
        assert_eq!(range_index(101.0), 1);
        assert_eq!(range_index(150.0), 1);
        assert_eq!(range_index(200.0), 1);
        assert_eq!(range_index(201.0), 2);
        assert_eq!(range_index(900.0), 8);
        assert_eq!(range_index(900.99), 8);
        assert_eq!(range_index(901.0), 9);
        assert_eq!(range_index(12_000.0), 9);
    }

    #[test]
    fn out_of_domain_prices_go_to_the_first_range() {
        assert_eq!(range_index(-5.0), 0);
        assert_eq!(range_index(f64::NAN), 0);
    }

    #[test]
    fn histogram_counts_every_price_once() {
        let prices = [0.0, 100.0, 101.0, 329.85, 999.0, 55.0, 901.0];
        let counts = histogram(prices);
        assert_eq!(counts, vec![3, 1, 0, 1, 0, 0, 0, 0, 0, 2]);
        assert_eq!(counts.iter().sum::<i64>(), prices.len() as i64);
    }

    #[test]
    fn empty_histogram_is_ten_zeros() {
        assert_eq!(histogram(std::iter::empty()), vec![0; PRICE_RANGE_COUNT]);
    }
}
