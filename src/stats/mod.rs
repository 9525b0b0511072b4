//! Pure derivations over one owner's cycle history. Nothing here touches
//! storage or the clock.

pub mod calendar;
pub mod predictor;
pub mod symptoms;

pub use calendar::month_view;
pub use predictor::predict;
pub use symptoms::aggregate;

/// Integer division rounded half-up. Both operands are non-negative.
pub(crate) fn div_round_half_up(numerator: u64, denominator: u64) -> u64 {
    (2 * numerator + denominator) / (2 * denominator)
}
