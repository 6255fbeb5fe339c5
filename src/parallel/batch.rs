//! Attempt index chunks for batch runs that report progress between chunks.

use std::ops::Range;

/// Split attempt indices `0..attempts` into at most `chunks` contiguous ranges. Earlier chunks
/// take the remainder, so sizes differ by at most one and no range is empty.
///
/// ```
/// # use groupdraw::parallel::attempt_chunks;
/// assert_eq!(attempt_chunks(10, 3), vec![0..4, 4..7, 7..10]);
/// ```
pub fn attempt_chunks(attempts: usize, chunks: usize) -> Vec<Range<usize>> {
    if attempts == 0 || chunks == 0 {
        return Vec::new();
    }
    let chunks = chunks.min(attempts);
    let (base, remainder) = (attempts / chunks, attempts % chunks);
    let mut start = 0;
    (0..chunks)
        .map(|index| {
            let end = start + base + usize::from(index < remainder);
            let chunk = start..end;
            start = end;
            chunk
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunks_cover_every_attempt_once() {
        let chunks = attempt_chunks(1000, 40);
        assert_eq!(chunks.len(), 40);
        assert_eq!(chunks.first(), Some(&(0..25)));
        assert_eq!(chunks.last(), Some(&(975..1000)));
        assert!(chunks.windows(2).all(|pair| pair[0].end == pair[1].start));
    }

    #[test]
    fn small_batches_get_one_attempt_per_chunk() {
        assert_eq!(attempt_chunks(3, 40), vec![0..1, 1..2, 2..3]);
    }

    #[test]
    fn nothing_to_split() {
        assert!(attempt_chunks(0, 40).is_empty());
        assert!(attempt_chunks(12, 0).is_empty());
    }
}
