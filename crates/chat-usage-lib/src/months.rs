use crate::data_structures::{MonthKey, MonthlyUsage};
use chrono::Datelike;

/// Every calendar month from `start` through `end`, both inclusive.
pub fn month_range(start: MonthKey, end: MonthKey) -> Vec<MonthKey> {
    let mut months = Vec::new();
    let mut current = start;

    while current <= end {
        months.push(current);
        current = current.succ();
    }

    months
}

/// Same as [`month_range`], with the bounds given as any day inside the month.
pub fn months_between<D: Datelike>(start: &D, end: &D) -> Vec<MonthKey> {
    month_range(MonthKey::from_date(start), MonthKey::from_date(end))
}

/// The gap-free month axis covering both usage maps and reaching at least `today`.
///
/// Returns `None` when neither map has any month.
pub fn report_months<D: Datelike>(
    input: &MonthlyUsage,
    output: &MonthlyUsage,
    today: &D,
) -> Option<Vec<MonthKey>> {
    let start = match (input.earliest(), output.earliest()) {
        (Some(a), Some(b)) => a.min(b),
        (Some(a), None) | (None, Some(a)) => a,
        (None, None) => return None,
    };
    let latest = input.latest().max(output.latest())?;
    let end = latest.max(MonthKey::from_date(today));

    Some(month_range(start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn key(year: i32, month: u32) -> MonthKey {
        MonthKey::new(year, month).unwrap()
    }

    #[test]
    fn test_single_month() {
        assert_eq!(month_range(key(2024, 5), key(2024, 5)), vec![key(2024, 5)]);
    }

    #[test]
    fn test_year_rollover() {
        let months: Vec<String> = month_range(key(2023, 11), key(2024, 2))
            .iter()
            .map(|m| m.to_string())
            .collect();
        assert_eq!(months, vec!["2023-11", "2023-12", "2024-01", "2024-02"]);
    }

    #[test]
    fn test_end_before_start_is_empty() {
        assert!(month_range(key(2024, 2), key(2023, 11)).is_empty());
    }

    #[test]
    fn test_any_day_of_month() {
        let start = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(months_between(&start, &end), vec![key(2023, 12), key(2024, 1)]);
    }

    #[test]
    fn test_report_months_extends_to_today() {
        let mut input = MonthlyUsage::new();
        input.add(key(2024, 1), 10);
        let output = MonthlyUsage::new();
        let today = NaiveDate::from_ymd_opt(2024, 4, 20).unwrap();

        let months = report_months(&input, &output, &today).unwrap();
        assert_eq!(months, month_range(key(2024, 1), key(2024, 4)));
    }

    #[test]
    fn test_report_months_keeps_future_data() {
        let mut input = MonthlyUsage::new();
        input.add(key(2024, 2), 1);
        let mut output = MonthlyUsage::new();
        output.add(key(2024, 6), 1);
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();

        let months = report_months(&input, &output, &today).unwrap();
        assert_eq!(months.first(), Some(&key(2024, 2)));
        assert_eq!(months.last(), Some(&key(2024, 6)));
        assert_eq!(months.len(), 5);
    }

    #[test]
    fn test_report_months_empty() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert!(report_months(&MonthlyUsage::new(), &MonthlyUsage::new(), &today).is_none());
    }
}
