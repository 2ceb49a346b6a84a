use chrono::Datelike;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Top-level export file: a JSON array of conversations.
pub type ConversationExport = Vec<Conversation>;

#[derive(Debug, Clone, Deserialize)]
pub struct Conversation {
    /// `None` for entries that are not a node object (e.g. `null`).
    #[serde(deserialize_with = "lenient_nodes")]
    mapping: HashMap<String, Option<MessageNode>>,
}

impl Conversation {
    pub fn new(mapping: HashMap<String, MessageNode>) -> Self {
        Self {
            mapping: mapping.into_iter().map(|(id, node)| (id, Some(node))).collect(),
        }
    }

    /// Every mapping entry, malformed ones included as `None`.
    pub fn nodes(&self) -> impl Iterator<Item = Option<&MessageNode>> {
        self.mapping.values().map(Option::as_ref)
    }

    pub fn node_count(&self) -> usize {
        self.mapping.len()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageNode {
    #[serde(default, deserialize_with = "lenient")]
    message: Option<Message>,
}

impl MessageNode {
    pub fn new(message: Option<Message>) -> Self {
        Self { message }
    }

    pub fn message(&self) -> Option<&Message> {
        self.message.as_ref()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Message {
    #[serde(default, deserialize_with = "lenient")]
    author: Option<Author>,
    #[serde(default, deserialize_with = "lenient")]
    create_time: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    content: Option<Content>,
}

impl Message {
    pub fn new(role: Option<&str>, create_time: Option<f64>, parts: Option<Vec<ContentPart>>) -> Self {
        Self {
            author: Some(Author {
                role: role.map(str::to_string),
            }),
            create_time,
            content: Some(Content { parts }),
        }
    }

    pub fn role(&self) -> Option<&str> {
        self.author.as_ref().and_then(|a| a.role.as_deref())
    }

    pub fn create_time(&self) -> Option<f64> {
        self.create_time
    }

    pub fn parts(&self) -> Option<&[ContentPart]> {
        self.content.as_ref().and_then(|c| c.parts.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct Author {
    #[serde(default, deserialize_with = "lenient")]
    role: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct Content {
    #[serde(default, deserialize_with = "lenient")]
    parts: Option<Vec<ContentPart>>,
}

/// One unit of `content.parts`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ContentPart {
    Text(String),
    Image(ImageDescriptor),
    Other(Value),
}

impl ContentPart {
    /// Empty strings, `null`, `false`, zero and empty containers count as blank.
    pub fn is_blank(&self) -> bool {
        match self {
            ContentPart::Text(text) => text.is_empty(),
            ContentPart::Image(_) => false,
            ContentPart::Other(value) => match value {
                Value::Null => true,
                Value::Bool(b) => !b,
                Value::Number(n) => n.as_f64() == Some(0.0),
                Value::String(s) => s.is_empty(),
                Value::Array(a) => a.is_empty(),
                Value::Object(o) => o.is_empty(),
            },
        }
    }
}

/// Any JSON object carrying numeric `width` and `height`; other keys are ignored.
/// Integers and floats are both accepted.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ImageDescriptor {
    pub width: f64,
    pub height: f64,
}

impl ImageDescriptor {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Deserializes an optional field, turning a value of the wrong shape into `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// Deserializes a conversation mapping, keeping entries that are not a node as `None`.
fn lenient_nodes<'de, D>(deserializer: D) -> Result<HashMap<String, Option<MessageNode>>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = HashMap::<String, Value>::deserialize(deserializer)?;
    Ok(entries
        .into_iter()
        .map(|(id, value)| (id, serde_json::from_value(value).ok()))
        .collect())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn from_date<D: Datelike>(date: &D) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn succ(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Sparse token totals per month.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonthlyUsage {
    tokens: BTreeMap<MonthKey, u64>,
}

impl MonthlyUsage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, month: MonthKey, tokens: u64) {
        *self.tokens.entry(month).or_insert(0) += tokens;
    }

    pub fn get(&self, month: &MonthKey) -> u64 {
        self.tokens.get(month).copied().unwrap_or(0)
    }

    pub fn months(&self) -> impl Iterator<Item = MonthKey> + '_ {
        self.tokens.keys().copied()
    }

    pub fn earliest(&self) -> Option<MonthKey> {
        self.tokens.keys().next().copied()
    }

    pub fn latest(&self) -> Option<MonthKey> {
        self.tokens.keys().next_back().copied()
    }

    pub fn total(&self) -> u64 {
        self.tokens.values().sum()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyRow {
    month: MonthKey,
    input_tokens: u64,
    output_tokens: u64,
    cost_usd: f64,
}

impl MonthlyRow {
    pub fn new(month: MonthKey, input_tokens: u64, output_tokens: u64, cost_usd: f64) -> Self {
        Self {
            month,
            input_tokens,
            output_tokens,
            cost_usd,
        }
    }

    pub fn month(&self) -> MonthKey {
        self.month
    }

    pub fn input_tokens(&self) -> u64 {
        self.input_tokens
    }

    pub fn output_tokens(&self) -> u64 {
        self.output_tokens
    }

    pub fn cost_usd(&self) -> f64 {
        self.cost_usd
    }

    pub fn total_tokens(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_month_key_display() {
        assert_eq!(MonthKey::new(2024, 3).unwrap().to_string(), "2024-03");
        assert_eq!(MonthKey::new(987, 11).unwrap().to_string(), "0987-11");
        assert!(MonthKey::new(2024, 13).is_none());
        assert!(MonthKey::new(2024, 0).is_none());
    }

    #[test]
    fn test_month_key_succ_rolls_over_year() {
        let december = MonthKey::new(2023, 12).unwrap();
        assert_eq!(december.succ(), MonthKey::new(2024, 1).unwrap());
    }

    #[test]
    fn test_content_part_shapes() {
        let parts: Vec<ContentPart> = serde_json::from_value(json!([
            "hello",
            {"content_type": "image_asset_pointer", "width": 512, "height": 256},
            {"content_type": "audio"},
            null
        ]))
        .unwrap();

        assert_eq!(parts[0], ContentPart::Text("hello".to_string()));
        assert_eq!(parts[1], ContentPart::Image(ImageDescriptor::new(512.0, 256.0)));
        assert!(matches!(parts[2], ContentPart::Other(_)));
        assert!(parts[3].is_blank());
    }

    #[test]
    fn test_blank_parts() {
        assert!(ContentPart::Text(String::new()).is_blank());
        assert!(ContentPart::Other(json!({})).is_blank());
        assert!(ContentPart::Other(json!(0)).is_blank());
        assert!(!ContentPart::Other(json!({"a": 1})).is_blank());
        assert!(!ContentPart::Image(ImageDescriptor::new(0.0, 0.0)).is_blank());
    }

    #[test]
    fn test_wrongly_typed_fields_become_none() {
        let node: MessageNode = serde_json::from_value(json!({
            "message": {
                "author": {"role": 7},
                "create_time": "yesterday",
                "content": {"parts": "not a list"}
            }
        }))
        .unwrap();

        let message = node.message().unwrap();
        assert_eq!(message.role(), None);
        assert_eq!(message.create_time(), None);
        assert!(message.parts().is_none());
    }

    #[test]
    fn test_float_image_dimensions() {
        let parts: Vec<ContentPart> = serde_json::from_value(json!([
            {"content_type": "image_asset_pointer", "width": 1024.0, "height": 768.5}
        ]))
        .unwrap();

        assert_eq!(parts[0], ContentPart::Image(ImageDescriptor::new(1024.0, 768.5)));
    }

    #[test]
    fn test_malformed_mapping_entries_are_kept_as_none() {
        let conversation: Conversation = serde_json::from_value(json!({
            "mapping": {
                "a": null,
                "b": 42,
                "c": {"message": null}
            }
        }))
        .unwrap();

        assert_eq!(conversation.node_count(), 3);
        assert_eq!(conversation.nodes().filter(|node| node.is_none()).count(), 2);
    }

    #[test]
    fn test_mapping_must_be_an_object() {
        let result: Result<Conversation, _> = serde_json::from_value(json!({"mapping": null}));
        assert!(result.is_err());
    }

    #[test]
    fn test_null_message() {
        let node: MessageNode = serde_json::from_value(json!({"message": null})).unwrap();
        assert!(node.message().is_none());
    }

    #[test]
    fn test_monthly_usage_accumulates() {
        let mut usage = MonthlyUsage::new();
        let jan = MonthKey::new(2024, 1).unwrap();
        let mar = MonthKey::new(2024, 3).unwrap();
        usage.add(mar, 5);
        usage.add(jan, 2);
        usage.add(mar, 1);

        assert_eq!(usage.get(&mar), 6);
        assert_eq!(usage.get(&MonthKey::new(2024, 2).unwrap()), 0);
        assert_eq!(usage.earliest(), Some(jan));
        assert_eq!(usage.latest(), Some(mar));
        assert_eq!(usage.total(), 8);
    }
}
