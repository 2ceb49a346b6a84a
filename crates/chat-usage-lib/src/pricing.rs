use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_MODEL: &str = "gpt-4o";

/// See https://openai.com/api/pricing/
pub const COST_INPUT_TOKEN: f64 = 5.0; // $ per 1M input tokens
pub const COST_OUTPUT_TOKEN: f64 = 15.0; // $ per 1M output tokens
pub const COST_BASE_IMAGE: u64 = 85; // tokens per image
pub const COST_IMAGE_TILE: u64 = 170; // tokens per 512x512 tile

/// Immutable pricing and tokenizer settings for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    input_cost_per_million: f64,
    output_cost_per_million: f64,
    base_image_tokens: u64,
    image_tile_tokens: u64,
    model: String,
}

impl PricingConfig {
    pub fn new(
        input_cost_per_million: f64,
        output_cost_per_million: f64,
        base_image_tokens: u64,
        image_tile_tokens: u64,
        model: impl Into<String>,
    ) -> Self {
        Self {
            input_cost_per_million,
            output_cost_per_million,
            base_image_tokens,
            image_tile_tokens,
            model: model.into(),
        }
    }

    /// Reads a JSON object holding any subset of the fields; the rest keep their defaults.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).with_context(|| {
            format!("Failed to read pricing config: {}", path.as_ref().display())
        })?;

        serde_json::from_str(&content).with_context(|| {
            format!("Failed to parse pricing config: {}", path.as_ref().display())
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn input_cost_per_million(&self) -> f64 {
        self.input_cost_per_million
    }

    pub fn output_cost_per_million(&self) -> f64 {
        self.output_cost_per_million
    }

    pub fn base_image_tokens(&self) -> u64 {
        self.base_image_tokens
    }

    pub fn image_tile_tokens(&self) -> u64 {
        self.image_tile_tokens
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self::new(
            COST_INPUT_TOKEN,
            COST_OUTPUT_TOKEN,
            COST_BASE_IMAGE,
            COST_IMAGE_TILE,
            DEFAULT_MODEL,
        )
    }
}
