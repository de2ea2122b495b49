/// Partitions the selection into one batch per start index: a sliding window
/// of width `window_size` with stride 1. Adjacent output frames therefore
/// share most of their source images, which smooths brightness transitions
/// between frames in the final video.
///
/// Trailing windows shorter than `window_size` are still emitted, so no
/// selected image is silently dropped; the averaging step divides by the
/// count actually present.
#[must_use]
pub fn batch<T: Clone>(selection: &[T], window_size: usize) -> Vec<Vec<T>> {
    if window_size == 0 {
        return Vec::new();
    }
    (0..selection.len())
        .map(|start| selection[start..(start + window_size).min(selection.len())].to_vec())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_batch_per_start_index() {
        let selection: Vec<usize> = (0..10).collect();
        let batches = batch(&selection, 5);
        assert_eq!(batches.len(), 10);
        for (start, members) in batches.iter().enumerate() {
            assert_eq!(members.len(), 5.min(10 - start));
            assert_eq!(members[0], start);
        }
    }

    #[test]
    fn test_trailing_partial_windows_are_emitted() {
        let selection: Vec<usize> = (0..4).collect();
        let batches = batch(&selection, 3);
        assert_eq!(batches.len(), 4);
        assert_eq!(batches[2], vec![2, 3]);
        assert_eq!(batches[3], vec![3]);
    }

    #[test]
    fn test_first_members_reproduce_selection() {
        let selection: Vec<usize> = (0..57).collect();
        let batches = batch(&selection, 12);
        let firsts: Vec<usize> = batches.iter().map(|b| b[0]).collect();
        assert_eq!(firsts, selection);
    }

    #[test]
    fn test_window_larger_than_selection() {
        let selection: Vec<usize> = (0..3).collect();
        let batches = batch(&selection, 10);
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0], vec![0, 1, 2]);
    }

    #[test]
    fn test_empty_selection_and_zero_window() {
        assert!(batch::<usize>(&[], 5).is_empty());
        assert!(batch(&[1, 2, 3], 0).is_empty());
    }
}
