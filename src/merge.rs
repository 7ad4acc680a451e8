/// Merge two descending sequences into one descending sequence.
///
/// Sortedness is checked in debug builds only: release builds do not verify
/// it and return an unspecified order for unsorted input.
///
/// Used to fold normalized per-source lists into one ranking. On equal
/// elements the one from `a` comes first.
///
/// # Panics
///
/// In debug builds, panics if either input is not sorted descending.
pub fn merge_sorted<T: PartialOrd>(a: Vec<T>, b: Vec<T>) -> Vec<T> {
    debug_assert!(is_descending(&a), "left input of merge_sorted is not sorted descending");
    debug_assert!(is_descending(&b), "right input of merge_sorted is not sorted descending");

    let mut merged = Vec::with_capacity(a.len() + b.len());
    let mut left = a.into_iter().peekable();
    let mut right = b.into_iter().peekable();

    loop {
        let take_right = match (left.peek(), right.peek()) {
            (Some(l), Some(r)) => r > l,
            (Some(_), None) => false,
            (None, Some(_)) => true,
            (None, None) => break,
        };
        let next = if take_right { right.next() } else { left.next() };
        merged.extend(next);
    }

    merged
}

fn is_descending<T: PartialOrd>(items: &[T]) -> bool {
    items.windows(2).all(|w| !(w[0] < w[1]))
}
