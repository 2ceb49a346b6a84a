//! Month-aligned monthly and cumulative figures, and their text tables.

use crate::calculator::Calculator;
use crate::data_structures::{MonthKey, MonthlyRow, MonthlyUsage};
use crate::months::report_months;
use anyhow::Result;
use chrono::Datelike;
use serde::Serialize;

const MONTH_WIDTH: usize = 10;
const COLUMN_WIDTH: usize = 15;

const MONTHLY_HEADERS: [&str; 4] = ["Month", "Input Tokens", "Output Tokens", "Cost (USD)"];
const CUMULATIVE_HEADERS: [&str; 4] = [
    "Month",
    "Cumulative Input Tokens",
    "Cumulative Output Tokens",
    "Cumulative Cost (USD)",
];

#[derive(Debug, Clone, Serialize)]
pub struct UsageReport {
    monthly: Vec<MonthlyRow>,
    cumulative: Vec<MonthlyRow>,
    total_cost: f64,
    total_tokens: u64,
}

impl UsageReport {
    /// Fails when neither map holds a single dated message.
    pub fn build<D: Datelike>(
        input: &MonthlyUsage,
        output: &MonthlyUsage,
        calculator: &Calculator,
        today: &D,
    ) -> Result<Self> {
        let months = report_months(input, output, today).ok_or_else(|| {
            anyhow::anyhow!("No dated messages found in export, nothing to report")
        })?;

        let monthly: Vec<MonthlyRow> = months
            .into_iter()
            .map(|month| {
                let input_tokens = input.get(&month);
                let output_tokens = output.get(&month);
                MonthlyRow::new(
                    month,
                    input_tokens,
                    output_tokens,
                    calculator.calculate_cost(input_tokens, output_tokens),
                )
            })
            .collect();
        let cumulative = calculator.calculate_cumulative(&monthly);

        Ok(Self {
            total_cost: calculator.calculate_total_cost(&monthly),
            total_tokens: calculator.calculate_total_tokens(&monthly),
            monthly,
            cumulative,
        })
    }

    pub fn monthly(&self) -> &[MonthlyRow] {
        &self.monthly
    }

    pub fn cumulative(&self) -> &[MonthlyRow] {
        &self.cumulative
    }

    pub fn months(&self) -> Vec<MonthKey> {
        self.monthly.iter().map(|row| row.month()).collect()
    }

    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    pub fn total_tokens(&self) -> u64 {
        self.total_tokens
    }

    pub fn monthly_table(&self) -> String {
        render_table(&MONTHLY_HEADERS, &self.monthly)
    }

    pub fn cumulative_table(&self) -> String {
        render_table(&CUMULATIVE_HEADERS, &self.cumulative)
    }

    /// Both tables separated by a blank line.
    pub fn render(&self) -> String {
        format!("{}\n{}", self.monthly_table(), self.cumulative_table())
    }
}

fn render_table(headers: &[&str; 4], rows: &[MonthlyRow]) -> String {
    let mut out = table_line(headers[0], headers[1], headers[2], headers[3]);

    for row in rows {
        out.push_str(&table_line(
            &row.month().to_string(),
            &format_number(row.input_tokens()),
            &format_number(row.output_tokens()),
            &format_cost(row.cost_usd()),
        ));
    }

    out
}

/// One newline-terminated table line; wider values overflow their column.
fn table_line(month: &str, input: &str, output: &str, cost: &str) -> String {
    format!(
        "{:<mw$}{:>cw$}{:>cw$}{:>cw$}\n",
        month,
        input,
        output,
        cost,
        mw = MONTH_WIDTH,
        cw = COLUMN_WIDTH
    )
}

pub fn format_number(n: u64) -> String {
    group_thousands(&n.to_string())
}

/// Two decimals with thousands separators, e.g. `1,234.50`.
pub fn format_cost(cost: f64) -> String {
    let fixed = format!("{:.2}", cost);
    let (sign, unsigned) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };
    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, "00"));
    format!("{}{}.{}", sign, group_thousands(whole), fraction)
}

fn group_thousands(digits: &str) -> String {
    let mut result = String::new();
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn key(year: i32, month: u32) -> MonthKey {
        MonthKey::new(year, month).unwrap()
    }

    fn march_2024() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    #[test]
    fn test_fills_missing_months() {
        let calculator = Calculator::default();
        let mut input = MonthlyUsage::new();
        input.add(key(2024, 1), 2);
        let mut output = MonthlyUsage::new();
        output.add(key(2024, 3), 3);

        let report = UsageReport::build(&input, &output, &calculator, &march_2024()).unwrap();

        let monthly: Vec<(String, u64, u64)> = report
            .monthly()
            .iter()
            .map(|r| (r.month().to_string(), r.input_tokens(), r.output_tokens()))
            .collect();
        assert_eq!(
            monthly,
            vec![
                ("2024-01".to_string(), 2, 0),
                ("2024-02".to_string(), 0, 0),
                ("2024-03".to_string(), 0, 3),
            ]
        );
        assert_eq!(report.monthly()[0].cost_usd(), calculator.calculate_cost(2, 0));
        assert_eq!(report.monthly()[1].cost_usd(), 0.0);
        assert_eq!(report.monthly()[2].cost_usd(), calculator.calculate_cost(0, 3));

        let cumulative_input: Vec<u64> = report.cumulative().iter().map(|r| r.input_tokens()).collect();
        let cumulative_output: Vec<u64> = report.cumulative().iter().map(|r| r.output_tokens()).collect();
        assert_eq!(cumulative_input, vec![2, 2, 2]);
        assert_eq!(cumulative_output, vec![0, 0, 3]);
        assert_eq!(report.total_tokens(), 5);
    }

    #[test]
    fn test_totals_match_last_cumulative_row() {
        let calculator = Calculator::default();
        let mut input = MonthlyUsage::new();
        input.add(key(2024, 1), 1_000);
        input.add(key(2024, 3), 250);
        let mut output = MonthlyUsage::new();
        output.add(key(2024, 2), 4_000);

        let report = UsageReport::build(&input, &output, &calculator, &march_2024()).unwrap();
        let last = report.cumulative().last().unwrap();

        assert_eq!(report.total_tokens(), 5_250);
        assert_eq!(report.total_tokens(), last.total_tokens());
        assert!((report.total_cost() - last.cost_usd()).abs() < 1e-12);
        assert!((report.total_cost() - calculator.calculate_cost(1_250, 4_000)).abs() < 1e-12);
    }

    #[test]
    fn test_empty_usage_is_an_error() {
        let result = UsageReport::build(
            &MonthlyUsage::new(),
            &MonthlyUsage::new(),
            &Calculator::default(),
            &march_2024(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
    }

    #[test]
    fn test_format_cost() {
        assert_eq!(format_cost(0.0), "0.00");
        assert_eq!(format_cost(0.00001), "0.00");
        assert_eq!(format_cost(12.346), "12.35");
        assert_eq!(format_cost(1234.5), "1,234.50");
        assert_eq!(format_cost(1234567.891), "1,234,567.89");
    }

    #[test]
    fn test_table_layout() {
        let calculator = Calculator::default();
        let mut input = MonthlyUsage::new();
        input.add(key(2024, 2), 1_234_567);
        let mut output = MonthlyUsage::new();
        output.add(key(2024, 3), 5);

        let report = UsageReport::build(&input, &output, &calculator, &march_2024()).unwrap();
        let table = report.monthly_table();
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(
            lines[0],
            "Month        Input Tokens  Output Tokens     Cost (USD)"
        );
        assert_eq!(
            lines[1],
            "2024-02         1,234,567              0           6.17"
        );
        assert_eq!(
            lines[2],
            "2024-03                 0              5           0.00"
        );
        assert!(lines.iter().all(|line| line.len() == 55));
        assert!(table.ends_with('\n'));
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_cumulative_headers_are_not_truncated() {
        let mut input = MonthlyUsage::new();
        input.add(key(2024, 3), 1);

        let report =
            UsageReport::build(&input, &MonthlyUsage::new(), &Calculator::default(), &march_2024())
                .unwrap();
        let table = report.cumulative_table();
        let header = table.lines().next().unwrap();

        assert_eq!(
            header,
            "Month     Cumulative Input TokensCumulative Output TokensCumulative Cost (USD)"
        );
        assert!(report.render().contains("\n\nMonth"));
    }
}
