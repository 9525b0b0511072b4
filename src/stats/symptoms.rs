use std::collections::HashMap;

use super::div_round_half_up;
use crate::models::{CycleRecord, SymptomStat};

/// Per-symptom counts across the cycles that recorded symptoms at all.
///
/// A record with `symptoms: Some(vec![])` still counts towards the
/// denominator. Labels come out in first-seen order. Nothing is returned
/// when no record carries a symptom list.
pub fn aggregate(history: &[CycleRecord]) -> Vec<SymptomStat> {
    let mut considered: u64 = 0;
    let mut counts: Vec<(&str, u64)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for symptoms in history.iter().filter_map(|c| c.symptoms.as_deref()) {
        considered += 1;
        for label in symptoms {
            let slot = *index.entry(label.as_str()).or_insert_with(|| {
                counts.push((label.as_str(), 0));
                counts.len() - 1
            });
            counts[slot].1 += 1;
        }
    }

    if considered == 0 {
        return Vec::new();
    }

    counts
        .into_iter()
        .map(|(symptom, count)| SymptomStat {
            symptom: symptom.to_string(),
            count: u32::try_from(count).unwrap_or(u32::MAX),
            percentage: u32::try_from(div_round_half_up(100 * count, considered))
                .unwrap_or(u32::MAX),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    fn record(symptoms: Option<&[&str]>) -> CycleRecord {
        CycleRecord {
            id: Uuid::new_v4(),
            owner: Uuid::nil(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: None,
            symptoms: symptoms.map(|s| s.iter().map(|l| l.to_string()).collect()),
            notes: None,
            flow: None,
            created_at: Utc::now(),
        }
    }

    fn stat(symptom: &str, count: u32, percentage: u32) -> SymptomStat {
        SymptomStat {
            symptom: symptom.to_string(),
            count,
            percentage,
        }
    }

    #[test]
    fn counts_against_cycles_with_symptoms() {
        let history = [
            record(Some(&["cramps", "fatigue"])),
            record(Some(&["cramps"])),
            record(None),
        ];
        assert_eq!(
            aggregate(&history),
            vec![stat("cramps", 2, 100), stat("fatigue", 1, 50)]
        );
    }

    #[test]
    fn no_symptom_lists_yields_nothing() {
        assert!(aggregate(&[]).is_empty());
        assert!(aggregate(&[record(None), record(None)]).is_empty());
    }

    #[test]
    fn empty_list_counts_towards_denominator() {
        let history = [record(Some(&["headache"])), record(Some(&[]))];
        assert_eq!(aggregate(&history), vec![stat("headache", 1, 50)]);
    }

    #[test]
    fn only_empty_lists_yields_nothing() {
        assert!(aggregate(&[record(Some(&[]))]).is_empty());
    }

    #[test]
    fn first_seen_order() {
        let history = [
            record(Some(&["bloating"])),
            record(Some(&["back pain", "bloating"])),
            record(Some(&["mood swings"])),
        ];
        let labels: Vec<String> = aggregate(&history).into_iter().map(|s| s.symptom).collect();
        assert_eq!(labels, vec!["bloating", "back pain", "mood swings"]);
    }

    #[test]
    fn percentage_rounds_half_up() {
        let history = [
            record(Some(&["cramps"])),
            record(Some(&["cramps"])),
            record(Some(&[])),
        ];
        assert_eq!(aggregate(&history), vec![stat("cramps", 2, 67)]);

        let history = [
            record(Some(&["cramps"])),
            record(Some(&[])),
            record(Some(&[])),
            record(Some(&[])),
            record(Some(&[])),
            record(Some(&[])),
            record(Some(&[])),
            record(Some(&[])),
        ];
        // 12.5%
        assert_eq!(aggregate(&history), vec![stat("cramps", 1, 13)]);
    }

    #[test]
    fn repeated_label_in_one_record_counts_twice() {
        let history = [record(Some(&["cramps", "cramps"]))];
        assert_eq!(aggregate(&history), vec![stat("cramps", 2, 200)]);
    }

    #[test]
    fn repeated_calls_do_not_accumulate() {
        let history = [record(Some(&["fatigue"]))];
        assert_eq!(aggregate(&history), aggregate(&history));
        assert_eq!(aggregate(&history), vec![stat("fatigue", 1, 100)]);
    }
}
