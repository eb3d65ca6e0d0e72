//! Sorts that only hand back their result.

/// Distribute values into `n` equal-width buckets, sort each, concatenate.
pub fn bucket_sort(input: &[f64]) -> Vec<f64> {
    let n = input.len();
    let (min, max) = input
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    if n < 2 || min == max {
        return input.to_vec();
    }

    let mut buckets: Vec<Vec<f64>> = vec![Vec::new(); n];
    let width = max - min;
    for &value in input {
        let slot = (((value - min) / width) * (n - 1) as f64) as usize;
        buckets[slot.min(n - 1)].push(value);
    }
    for bucket in &mut buckets {
        bucket.sort_by(f64::total_cmp);
    }
    buckets.into_iter().flatten().collect()
}

/// The standard library's stable sort.
pub fn builtin_sort(input: &[f64]) -> Vec<f64> {
    let mut out = input.to_vec();
    out.sort_by(f64::total_cmp);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_sort_handles_spread_and_duplicates() {
        let input = [0.42, 32.0, -5.0, 0.42, 7.0, 1000.0, 3.0];
        assert_eq!(bucket_sort(&input), builtin_sort(&input));
    }

    #[test]
    fn bucket_sort_constant_input() {
        assert_eq!(bucket_sort(&[2.0, 2.0]), vec![2.0, 2.0]);
    }
}
