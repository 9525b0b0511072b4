use chrono::{Days, NaiveDate};

use super::div_round_half_up;
use crate::models::{CycleRecord, PredictedCycle, Prediction};

pub const PREDICTED_CYCLES: u8 = 3;

/// Averages the gaps between recorded start dates and projects the next
/// three starts from the most recent one.
///
/// Returns `None` when there are fewer than two records, which callers
/// show as "no prediction yet". Input order does not matter.
pub fn predict(history: &[CycleRecord]) -> Option<Prediction> {
    predict_from_starts(history.iter().map(|c| c.start_date).collect())
}

fn predict_from_starts(mut starts: Vec<NaiveDate>) -> Option<Prediction> {
    if starts.len() < 2 {
        return None;
    }
    starts.sort_unstable_by(|a, b| b.cmp(a));

    let total_days: u64 = starts
        .windows(2)
        .map(|pair| (pair[0] - pair[1]).num_days().unsigned_abs())
        .sum();
    let intervals = (starts.len() - 1) as u64;
    let average = div_round_half_up(total_days, intervals);

    let last_start = starts[0];
    let predictions = (1..=PREDICTED_CYCLES)
        .map(|cycle_number| {
            let offset = average.checked_mul(u64::from(cycle_number))?;
            let date = last_start.checked_add_days(Days::new(offset))?;
            Some(PredictedCycle { date, cycle_number })
        })
        .collect::<Option<Vec<_>>>()?;

    Some(Prediction {
        average_cycle_length: u32::try_from(average).ok()?,
        predictions,
    })
}
