use std::collections::HashSet;

use chrono::{Datelike, NaiveDate};

use crate::models::{CalendarDay, CycleRecord, MonthView, Prediction};

/// Marks every day of `year`/`month` with whether a logged cycle or a
/// predicted cycle starts on it. `None` for a month chrono cannot build.
pub fn month_view(
    year: i32,
    month: u32,
    today: NaiveDate,
    history: &[CycleRecord],
    prediction: Option<&Prediction>,
) -> Option<MonthView> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;

    let logged: HashSet<NaiveDate> = history.iter().map(|c| c.start_date).collect();
    let predicted: HashSet<NaiveDate> = prediction
        .map(|p| p.predictions.iter().map(|p| p.date).collect())
        .unwrap_or_default();

    let days = first
        .iter_days()
        .take_while(|d| d.month() == month)
        .map(|date| CalendarDay {
            date,
            day: date.day(),
            has_period: logged.contains(&date),
            is_predicted: predicted.contains(&date),
            is_today: date == today,
        })
        .collect();

    Some(MonthView {
        year,
        month,
        first_weekday: first.weekday().num_days_from_sunday(),
        days,
    })
}
