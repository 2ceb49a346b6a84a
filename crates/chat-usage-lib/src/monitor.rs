use crate::calculator::Calculator;
use crate::data_structures::{ConversationExport, MonthlyUsage};
use crate::extractor::UsageExtractor;
use crate::loader::DataLoader;
use crate::pricing::PricingConfig;
use crate::report::UsageReport;
use crate::tokenizer::Tokenizer;
use anyhow::Result;
use chrono::{Datelike, Local, TimeZone};
use std::path::Path;

pub struct UsageMonitor {
    input_usage: MonthlyUsage,
    output_usage: MonthlyUsage,
    pricing: PricingConfig,
    calculator: Calculator,
    extractor: UsageExtractor,
    loader: DataLoader,
}

impl UsageMonitor {
    pub fn new(pricing: PricingConfig) -> Self {
        Self {
            input_usage: MonthlyUsage::new(),
            output_usage: MonthlyUsage::new(),
            calculator: Calculator::new(&pricing),
            extractor: UsageExtractor::new(Tokenizer::new(&pricing)),
            loader: DataLoader::new(),
            pricing,
        }
    }

    pub fn load_data<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let export = self.loader.load_from_file(path)?;
        self.ingest(&export);
        Ok(())
    }

    /// Replaces the current usage with the export's, bucketed in local time.
    pub fn ingest(&mut self, export: &ConversationExport) {
        self.ingest_in(export, &Local);
    }

    pub fn ingest_in<Tz: TimeZone>(&mut self, export: &ConversationExport, tz: &Tz) {
        let (input, output) = self.extractor.extract_in(export, tz);
        self.input_usage = input;
        self.output_usage = output;
    }

    pub fn report(&self) -> Result<UsageReport> {
        self.report_at(&Local::now().date_naive())
    }

    pub fn report_at<D: Datelike>(&self, today: &D) -> Result<UsageReport> {
        UsageReport::build(&self.input_usage, &self.output_usage, &self.calculator, today)
    }

    pub fn input_usage(&self) -> &MonthlyUsage {
        &self.input_usage
    }

    pub fn output_usage(&self) -> &MonthlyUsage {
        &self.output_usage
    }

    pub fn pricing(&self) -> &PricingConfig {
        &self.pricing
    }

    pub fn calculate_cost(&self, input_tokens: u64, output_tokens: u64) -> f64 {
        self.calculator.calculate_cost(input_tokens, output_tokens)
    }

    pub fn clear_data(&mut self) {
        self.input_usage = MonthlyUsage::new();
        self.output_usage = MonthlyUsage::new();
    }

    pub fn is_empty(&self) -> bool {
        self.input_usage.is_empty() && self.output_usage.is_empty()
    }
}

impl Default for UsageMonitor {
    fn default() -> Self {
        Self::new(PricingConfig::default())
    }
}
