use crate::amount::Amount;

/// Fallback monthly rent used whenever the stored value is unusable.
pub const DEFAULT_RENT: f64 = 50_000.0;

/// The persisted rent can be zero, negative or garbage after a bad edit
/// or import. Every consumer goes through this repair instead of
/// trusting the raw value; the storage layer applies the same rule once
/// more at load time.
pub fn effective_rent(raw: Amount) -> Amount {
    let value = raw.inner();
    if value.is_finite() && value > 0.0 {
        raw
    } else {
        Amount::new(DEFAULT_RENT)
    }
}
