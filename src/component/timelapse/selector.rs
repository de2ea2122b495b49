/// Subsampling stride that brings `available` images down to roughly
/// `target_frame_count` output frames. Never below 1, so a thin image set
/// degrades to keeping everything instead of failing.
#[must_use]
pub fn step_size(available: usize, target_frame_count: usize) -> usize {
    if target_frame_count == 0 {
        return 1;
    }
    let step = (available as f64 / target_frame_count as f64).round() as usize;
    step.max(1)
}

/// Takes every `step`-th element starting at index 0, preserving order.
/// Pure and deterministic: the same input set always yields the same
/// selection regardless of how the filter phase scheduled its work.
#[must_use]
pub fn select<T: Clone>(sorted: &[T], target_frame_count: usize) -> Vec<T> {
    let step = step_size(sorted.len(), target_frame_count);
    sorted.iter().step_by(step).cloned().collect()
}
