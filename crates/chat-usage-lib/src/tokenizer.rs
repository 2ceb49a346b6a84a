use crate::data_structures::{ContentPart, ImageDescriptor};
use crate::pricing::PricingConfig;
use tiktoken_rs::CoreBPE;
use tracing::warn;

const TILE_AREA: f64 = 512.0 * 512.0;

/// Estimates tokens for content parts with the BPE encoder of one model.
pub struct Tokenizer {
    model: String,
    encoder: Option<CoreBPE>,
    base_image_tokens: u64,
    image_tile_tokens: u64,
}

impl Tokenizer {
    pub fn new(config: &PricingConfig) -> Self {
        Self::for_model(config, config.model())
    }

    pub fn for_model(config: &PricingConfig, model: &str) -> Self {
        let encoder = match tiktoken_rs::get_bpe_from_model(model) {
            Ok(bpe) => Some(bpe),
            Err(e) => {
                warn!(model, error = %e, "No tokenizer registered for model, text will count as 0 tokens");
                None
            }
        };

        Self {
            model: model.to_string(),
            encoder,
            base_image_tokens: config.base_image_tokens(),
            image_tile_tokens: config.image_tile_tokens(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn has_encoder(&self) -> bool {
        self.encoder.is_some()
    }

    pub fn count(&self, part: &ContentPart) -> u64 {
        if let ContentPart::Text(text) = part {
            if let Some(encoder) = &self.encoder {
                return encoder.encode_ordinary(text).len() as u64;
            }
        }

        match part {
            ContentPart::Image(image) => self.image_tokens(image),
            ContentPart::Text(_) => {
                warn!(model = %self.model, "Error tokenizing text: no tokenizer for model");
                0
            }
            ContentPart::Other(value) => {
                warn!(model = %self.model, %value, "Error tokenizing text: unsupported content part");
                0
            }
        }
    }

    /// Flat base cost plus one tile charge per full 512x512 area.
    /// Negative areas are charged no tiles.
    pub fn image_tokens(&self, image: &ImageDescriptor) -> u64 {
        let tiles = (image.width * image.height / TILE_AREA).floor().max(0.0) as u64;
        self.base_image_tokens + self.image_tile_tokens.saturating_mul(tiles)
    }
}
