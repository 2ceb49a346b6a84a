use crate::data_structures::{ConversationExport, Message, MonthKey, MonthlyUsage};
use crate::tokenizer::Tokenizer;
use chrono::{DateTime, Local, TimeZone};
use tracing::debug;

/// Which usage map a message's tokens go to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
    Ignored,
}

impl Direction {
    pub fn from_role(role: Option<&str>) -> Self {
        match role {
            Some("user") => Direction::Input,
            Some("assistant") => Direction::Output,
            _ => Direction::Ignored,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionStats {
    pub conversations: usize,
    pub counted_messages: usize,
    pub skipped_nodes: usize,
}

pub struct UsageExtractor {
    tokenizer: Tokenizer,
}

impl UsageExtractor {
    pub fn new(tokenizer: Tokenizer) -> Self {
        Self { tokenizer }
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    /// Buckets tokens by the local-time month of each message.
    pub fn extract(&self, export: &ConversationExport) -> (MonthlyUsage, MonthlyUsage) {
        self.extract_in(export, &Local)
    }

    pub fn extract_in<Tz: TimeZone>(
        &self,
        export: &ConversationExport,
        tz: &Tz,
    ) -> (MonthlyUsage, MonthlyUsage) {
        let mut input = MonthlyUsage::new();
        let mut output = MonthlyUsage::new();
        let mut stats = ExtractionStats {
            conversations: export.len(),
            ..Default::default()
        };

        for conversation in export {
            for node in conversation.nodes() {
                let counted = node
                    .and_then(|node| node.message())
                    .map(|message| self.add_message(message, tz, &mut input, &mut output))
                    .unwrap_or(false);

                if counted {
                    stats.counted_messages += 1;
                } else {
                    stats.skipped_nodes += 1;
                }
            }
        }

        debug!(
            conversations = stats.conversations,
            counted_messages = stats.counted_messages,
            skipped_nodes = stats.skipped_nodes,
            "Extracted monthly token usage"
        );

        (input, output)
    }

    /// Returns false when the message carries no usable data.
    fn add_message<Tz: TimeZone>(
        &self,
        message: &Message,
        tz: &Tz,
        input: &mut MonthlyUsage,
        output: &mut MonthlyUsage,
    ) -> bool {
        // A zero timestamp counts as missing.
        let Some(create_time) = message.create_time().filter(|t| *t != 0.0) else {
            return false;
        };
        let Some(parts) = message.parts().filter(|p| !p.is_empty()) else {
            return false;
        };
        if parts[0].is_blank() {
            return false;
        }
        let Some(month) = month_of(create_time, tz) else {
            return false;
        };

        let direction = Direction::from_role(message.role());
        for part in parts {
            let tokens = self.tokenizer.count(part);
            match direction {
                Direction::Input => input.add(month, tokens),
                Direction::Output => output.add(month, tokens),
                Direction::Ignored => {}
            }
        }

        true
    }
}

fn month_of<Tz: TimeZone>(epoch_seconds: f64, tz: &Tz) -> Option<MonthKey> {
    if !epoch_seconds.is_finite() {
        return None;
    }

    let secs = epoch_seconds.floor();
    let nanos = ((epoch_seconds - secs) * 1e9) as u32;
    let utc = DateTime::from_timestamp(secs as i64, nanos.min(999_999_999))?;
    Some(MonthKey::from_date(&utc.with_timezone(tz)))
}
