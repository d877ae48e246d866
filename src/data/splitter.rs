// ============================================================
// Layer 4 — Chronological Splitter
// ============================================================
// Splits an ordered series into three contiguous blocks:
//
//   |──────── train ────────|── validation ──|── test ──|
//   oldest                                        newest
//
// Unlike a shuffled split, nothing from the future ends up in
// the training block, so validation and test scores measure
// genuine out-of-sample forecasting.
//
// Whatever is left after train + validation is the test block;
// fractions summing to 1.0 mean "no test partition".

/// Split `items` into (train, validation, test), keeping order.
///
/// # Example
/// ```ignore
/// let (train, val, test) = split_chronological((0..100).collect(), 0.7, 0.15);
/// // train = 0..70, val = 70..85, test = 85..100
/// ```
pub fn split_chronological<T>(
    mut items:           Vec<T>,
    train_fraction:      f64,
    validation_fraction: f64,
) -> (Vec<T>, Vec<T>, Vec<T>) {
    let total     = items.len();
    let train_end = ((total as f64) * train_fraction).round() as usize;
    let val_end   = ((total as f64) * (train_fraction + validation_fraction)).round() as usize;

    // Clamp to valid range to avoid panics on tiny datasets
    let train_end = train_end.min(total);
    let val_end   = val_end.clamp(train_end, total);

    let test       = items.split_off(val_end);
    let validation = items.split_off(train_end);

    tracing::debug!(
        "Chronological split: {} train, {} validation, {} test",
        items.len(),
        validation.len(),
        test.len(),
    );

    (items, validation, test)
}
