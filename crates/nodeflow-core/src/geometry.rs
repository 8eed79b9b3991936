//! Pure spacing helpers used by the layout engine.

/// Returns the centre of the `index`-th of `count` equal segments of `[start, end]`.
///
/// Points are segment centres, not boundaries, so for `index < count` none
/// lands on `start` or `end`.
///
/// Indices past `count` continue at the same spacing, so callers that need
/// more slots than segments get points beyond `end` rather than a panic.
/// A `count` of zero has no segments and yields `start`.
///
/// ```
/// use nodeflow_core::distribute;
///
/// assert_eq!(distribute(0.0, 900.0, 3, 0), 150.0);
/// assert_eq!(distribute(0.0, 900.0, 3, 1), 450.0);
/// assert_eq!(distribute(0.0, 900.0, 3, 2), 750.0);
/// ```
#[inline]
pub fn distribute(start: f64, end: f64, count: usize, index: usize) -> f64 {
    if count == 0 {
        return start;
    }
    let step = (end - start) / count as f64;
    start + step * (index as f64 + 0.5)
}
