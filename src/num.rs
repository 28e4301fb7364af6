//! Numeric helpers.

use std::cmp::Ordering;

/// An `f32` that implements [`Ord`] via [`f32::total_cmp`].
///
/// Useful for `max_by_key`/`sort_by_key` on confidence values.
#[derive(Debug, Clone, Copy)]
pub struct TotalF32(pub f32);

impl PartialEq for TotalF32 {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for TotalF32 {}

impl PartialOrd for TotalF32 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TotalF32 {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Applies the standard sigmoid/logistic function to the input.
pub fn sigmoid(v: f32) -> f32 {
    1.0 / (1.0 + (-v).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_order() {
        let mut values = [TotalF32(0.5), TotalF32(-1.0), TotalF32(f32::NAN), TotalF32(0.0)];
        values.sort();
        assert_eq!(values[0].0, -1.0);
        assert_eq!(values[1].0, 0.0);
        assert_eq!(values[2].0, 0.5);
        assert!(values[3].0.is_nan());
    }

    #[test]
    fn sigmoid_range() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(20.0) > 0.99);
        assert!(sigmoid(-20.0) < 0.01);
    }
}
