use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;
use itertools::Itertools;

/// visitor counts for one cell, derived from (device, day) sightings.
///
/// a device is a recurring visitor when it was sighted at the cell on more
/// than one distinct UTC calendar day; several sightings within one day are
/// a single occasion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitorStats {
    pub distinct_visitors: u64,
    pub recurring_visitors: u64,
    pub active_days: u64,
}

impl VisitorStats {
    pub fn from_sightings<'a, I>(sightings: I) -> VisitorStats
    where
        I: IntoIterator<Item = (&'a str, NaiveDate)>,
    {
        let days_by_device: HashMap<&str, Vec<NaiveDate>> =
            sightings.into_iter().into_group_map();
        let mut all_days: BTreeSet<NaiveDate> = BTreeSet::new();
        let mut recurring: u64 = 0;
        for days in days_by_device.values() {
            if days.iter().unique().count() > 1 {
                recurring += 1;
            }
            all_days.extend(days.iter().copied());
        }
        VisitorStats {
            distinct_visitors: days_by_device.len() as u64,
            recurring_visitors: recurring,
            active_days: all_days.len() as u64,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn day(ordinal: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, ordinal).unwrap()
    }

    #[test]
    fn test_empty_sightings() {
        let stats = VisitorStats::from_sightings(std::iter::empty());
        assert_eq!(stats, VisitorStats::default());
    }

    #[test]
    fn test_same_day_sightings_are_one_occasion() {
        let stats = VisitorStats::from_sightings(vec![
            ("device-a", day(1)),
            ("device-a", day(1)),
            ("device-a", day(1)),
        ]);
        assert_eq!(stats.distinct_visitors, 1);
        assert_eq!(stats.recurring_visitors, 0);
        assert_eq!(stats.active_days, 1);
    }

    #[test]
    fn test_recurring_requires_multiple_days() {
        let stats = VisitorStats::from_sightings(vec![
            ("device-a", day(1)),
            ("device-a", day(2)),
            ("device-b", day(2)),
            ("device-c", day(3)),
            ("device-c", day(5)),
        ]);
        assert_eq!(stats.distinct_visitors, 3);
        assert_eq!(stats.recurring_visitors, 2);
        assert_eq!(stats.active_days, 4);
    }

    #[test]
    fn test_recurring_bounded_by_distinct() {
        let stats = VisitorStats::from_sightings(vec![
            ("device-a", day(1)),
            ("device-a", day(2)),
            ("device-b", day(1)),
            ("device-b", day(3)),
        ]);
        assert!(stats.recurring_visitors <= stats.distinct_visitors);
        assert_eq!(stats.recurring_visitors, 2);
    }
}
