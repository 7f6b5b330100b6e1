//! Delta encoding of the numeric columns.
//!
//! Each section is an independent chain: the running total starts at 0 for
//! the first value of every section, so the first delta is the raw value.
//! Values are widened to `i128` so that the difference between any two `u64`
//! values is representable.

/// Replace each value with its difference from the previous value.
pub fn encode<I>(values: I) -> Vec<i128>
where
    I: IntoIterator<Item = i128>,
{
    values
        .into_iter()
        .scan(0i128, |prev, value| {
            let delta = value - *prev;
            *prev = value;
            Some(delta)
        })
        .collect()
}

/// Replace each delta with the running total of all deltas up to it.
///
/// Returns `None` if the running total overflows.
pub fn decode<I>(deltas: I) -> Option<Vec<i128>>
where
    I: IntoIterator<Item = i128>,
{
    let mut total = 0i128;
    deltas
        .into_iter()
        .map(|delta| {
            total = total.checked_add(delta)?;
            Some(total)
        })
        .collect()
}
