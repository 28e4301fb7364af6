//! Iterator helpers.

use std::iter::Zip;

/// Like [`Iterator::zip`], but panics when both sides don't have the same length.
#[track_caller]
pub fn zip_exact<A, B>(a: A, b: B) -> Zip<A::IntoIter, B::IntoIter>
where
    A: IntoIterator,
    B: IntoIterator,
    A::IntoIter: ExactSizeIterator,
    B::IntoIter: ExactSizeIterator,
{
    let (a, b) = (a.into_iter(), b.into_iter());
    assert_eq!(
        a.len(),
        b.len(),
        "`zip_exact` called on iterators with different lengths"
    );
    a.zip(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zips_equal_lengths() {
        let sum: i32 = zip_exact([1, 2, 3], [4, 5, 6]).map(|(a, b)| a * b).sum();
        assert_eq!(sum, 32);
    }

    #[test]
    #[should_panic]
    fn panics_on_mismatch() {
        zip_exact([1, 2], [1]).for_each(drop);
    }
}
