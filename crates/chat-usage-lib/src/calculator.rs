use crate::data_structures::MonthlyRow;
use crate::pricing::PricingConfig;

const TOKENS_PER_MILLION: f64 = 1_000_000.0;

pub struct Calculator {
    input_cost_per_million: f64,
    output_cost_per_million: f64,
}

impl Calculator {
    pub fn new(config: &PricingConfig) -> Self {
        Self {
            input_cost_per_million: config.input_cost_per_million(),
            output_cost_per_million: config.output_cost_per_million(),
        }
    }

    pub fn calculate_cost(&self, input_tokens: u64, output_tokens: u64) -> f64 {
        (input_tokens as f64 * self.input_cost_per_million
            + output_tokens as f64 * self.output_cost_per_million)
            / TOKENS_PER_MILLION
    }

    /// Running totals of every numeric column; cost is the running sum of the row costs.
    pub fn calculate_cumulative(&self, rows: &[MonthlyRow]) -> Vec<MonthlyRow> {
        let mut input_tokens = 0;
        let mut output_tokens = 0;
        let mut cost_usd = 0.0;

        rows.iter()
            .map(|row| {
                input_tokens += row.input_tokens();
                output_tokens += row.output_tokens();
                cost_usd += row.cost_usd();
                MonthlyRow::new(row.month(), input_tokens, output_tokens, cost_usd)
            })
            .collect()
    }

    pub fn calculate_total_cost(&self, rows: &[MonthlyRow]) -> f64 {
        rows.iter().map(|row| row.cost_usd()).sum()
    }

    pub fn calculate_total_tokens(&self, rows: &[MonthlyRow]) -> u64 {
        rows.iter().map(|row| row.total_tokens()).sum()
    }
}

impl Default for Calculator {
    fn default() -> Self {
        Self::new(&PricingConfig::default())
    }
}
