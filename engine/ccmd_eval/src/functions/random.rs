//! Randomness for `randInt` and `shuffle`, from the operating system.

use crate::errors::{invalid_argument, FnError};

/// A uniform value in `0..bound`. `bound` must be non-zero.
pub(super) fn below(bound: u64) -> Result<u64, FnError> {
    if bound == 0 {
        return Err(invalid_argument("empty range"));
    }
    // Reject the biased tail so every residue is equally likely.
    let zone = u64::MAX - (u64::MAX % bound);
    loop {
        let raw = getrandom::u64().map_err(|e| FnError::new(format!("no randomness: {e}")))?;
        if raw < zone {
            return Ok(raw % bound);
        }
    }
}

/// Fisher-Yates shuffle in place.
pub(super) fn shuffle<T>(items: &mut [T]) -> Result<(), FnError> {
    for i in (1..items.len()).rev() {
        let j = below(i as u64 + 1)? as usize;
        items.swap(i, j);
    }
    Ok(())
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use super::*;

    #[test]
    fn test_below_stays_in_range() {
        for _ in 0..200 {
            assert!(below(3).unwrap() < 3);
        }
        assert_eq!(below(1).unwrap(), 0);
        assert!(below(0).is_err());
    }

    #[test]
    fn test_shuffle_is_a_permutation() {
        let mut items: Vec<u32> = (0..50).collect();
        shuffle(&mut items).unwrap();
        items.sort_unstable();
        assert_eq!(items, (0..50).collect::<Vec<_>>());
    }
}
