pub mod calculator;
pub mod data_structures;
pub mod extractor;
pub mod loader;
pub mod monitor;
pub mod months;
pub mod pricing;
pub mod report;
pub mod tokenizer;

pub use calculator::Calculator;
pub use data_structures::{
    ContentPart, Conversation, ConversationExport, ImageDescriptor, Message, MessageNode,
    MonthKey, MonthlyRow, MonthlyUsage,
};
pub use extractor::UsageExtractor;
pub use loader::{DataLoader, DEFAULT_EXPORT_PATH};
pub use monitor::UsageMonitor;
pub use months::month_range;
pub use pricing::PricingConfig;
pub use report::UsageReport;
pub use tokenizer::Tokenizer;

pub use anyhow::Result;

pub mod prelude {
    pub use crate::data_structures::{MonthKey, MonthlyRow, MonthlyUsage};
    pub use crate::monitor::UsageMonitor;
    pub use crate::pricing::PricingConfig;
    pub use crate::report::UsageReport;
    pub use anyhow::Result;
}
