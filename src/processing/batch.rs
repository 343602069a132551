//! Splitting the record list into batches.

use std::num::NonZeroUsize;

/// Split `items` into consecutive slices of `batch_size` (the last may be shorter).
///
/// Lazy and order preserving; calling it again on the same slice restarts
/// from the beginning.
pub fn prepare_batches<T>(items: &[T], batch_size: NonZeroUsize) -> std::slice::Chunks<'_, T> {
    items.chunks(batch_size.get())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn test_concatenation_reproduces_input() {
        let items: Vec<u32> = (0..23).collect();
        for n in 1..=30 {
            let joined: Vec<u32> = prepare_batches(&items, size(n)).flatten().copied().collect();
            assert_eq!(joined, items, "batch size {n}");
        }
    }

    #[test]
    fn test_last_batch_shorter() {
        let items = ["a", "b", "c", "d", "e"];
        let lens: Vec<usize> = prepare_batches(&items, size(2)).map(|b| b.len()).collect();
        assert_eq!(lens, vec![2, 2, 1]);
    }

    #[test]
    fn test_empty_input() {
        let items: [u8; 0] = [];
        assert_eq!(prepare_batches(&items, size(500)).count(), 0);
    }

    #[test]
    fn test_restartable() {
        let items = [1, 2, 3];
        let first: Vec<&[i32]> = prepare_batches(&items, size(2)).collect();
        let second: Vec<&[i32]> = prepare_batches(&items, size(2)).collect();
        assert_eq!(first, second);
    }
}
