//! Configuration schema for the lost & found assistant.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Root config for the lost & found assistant.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LostFoundConfig {
    #[serde(default, rename = "$schema")]
    pub schema: Option<String>,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub flows: FlowsConfig,
}

impl LostFoundConfig {
    /// Start building a config programmatically with defaults applied.
    pub fn builder() -> LostFoundConfigBuilder {
        LostFoundConfigBuilder::new()
    }
}

/// Builder for assembling a `LostFoundConfig` in code.
#[derive(Debug, Default, Clone)]
pub struct LostFoundConfigBuilder {
    config: LostFoundConfig,
}

impl LostFoundConfigBuilder {
    /// Create a new builder seeded with default config values.
    pub fn new() -> Self {
        Self {
            config: LostFoundConfig::default(),
        }
    }

    /// Replace the store configuration.
    pub fn store(mut self, store: StoreConfig) -> Self {
        self.config.store = store;
        self
    }

    /// Replace the chat timing configuration.
    pub fn chat(mut self, chat: ChatConfig) -> Self {
        self.config.chat = chat;
        self
    }

    /// Replace the intake flow definitions.
    pub fn flows(mut self, flows: FlowsConfig) -> Self {
        self.config.flows = flows;
        self
    }

    /// Finalize and return the built `LostFoundConfig`.
    pub fn build(self) -> LostFoundConfig {
        self.config
    }
}

/// Where collections are persisted.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StoreConfig {
    /// Data directory; resolved by the caller when unset.
    #[serde(default)]
    pub path: Option<String>,
}

/// Cosmetic reply latency for the chat front end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    #[serde(default = "default_reply_delay_ms")]
    pub reply_delay_ms: u64,
    #[serde(default = "default_summary_delay_ms")]
    pub summary_delay_ms: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            reply_delay_ms: default_reply_delay_ms(),
            summary_delay_ms: default_summary_delay_ms(),
        }
    }
}

/// Default delay before a prompt is shown.
fn default_reply_delay_ms() -> u64 {
    1000
}

/// Default delay before a report summary is shown.
fn default_summary_delay_ms() -> u64 {
    1500
}

/// Record field an intake step fills in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FieldKey {
    Name,
    Location,
    Date,
    Description,
    ContactInfo,
}

impl FieldKey {
    /// Return the config spelling of the field.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKey::Name => "name",
            FieldKey::Location => "location",
            FieldKey::Date => "date",
            FieldKey::Description => "description",
            FieldKey::ContactInfo => "contact_info",
        }
    }

    /// Parse the config spelling of a field.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "name" => Some(FieldKey::Name),
            "location" => Some(FieldKey::Location),
            "date" => Some(FieldKey::Date),
            "description" => Some(FieldKey::Description),
            "contact_info" => Some(FieldKey::ContactInfo),
            _ => None,
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One question in an intake flow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FlowStepConfig {
    /// Field the answer is stored in.
    pub field: FieldKey,
    /// Question shown to the user.
    pub prompt: String,
    /// Label used for this field in the completion summary.
    pub label: String,
}

impl FlowStepConfig {
    fn new(field: FieldKey, prompt: &str, label: &str) -> Self {
        Self {
            field,
            prompt: prompt.to_string(),
            label: label.to_string(),
        }
    }
}

/// Ordered question list plus the surrounding bot copy for one report kind.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FlowConfig {
    /// Message shown when a conversation opens.
    pub greeting: String,
    /// Heading of the completion summary.
    pub summary_title: String,
    /// Label printed before the short record identifier.
    pub reference_label: String,
    /// Closing line of the completion summary.
    pub summary_footer: String,
    /// Questions, asked in order.
    pub steps: Vec<FlowStepConfig>,
}

impl FlowConfig {
    /// Default five-step flow used when a student reports a lost item.
    pub fn default_lost() -> Self {
        Self {
            greeting: "مرحبا بك في بوت المفقودات بجامعة أم القرى! كيف يمكنني مساعدتك؟"
                .to_string(),
            summary_title: "تم استلام طلبك بنجاح! ملخص البيانات:".to_string(),
            reference_label: "رقم البلاغ".to_string(),
            summary_footer: "سيتم مراجعة طلبك من قبل المسؤول، وسيتم التواصل معك في حال العثور على العنصر المفقود."
                .to_string(),
            steps: vec![
                FlowStepConfig::new(
                    FieldKey::Name,
                    "ما هو اسم العنصر المفقود؟",
                    "العنصر المفقود",
                ),
                FlowStepConfig::new(
                    FieldKey::Location,
                    "أين فقدت هذا العنصر؟ (المبنى، القاعة، إلخ)",
                    "المكان",
                ),
                FlowStepConfig::new(
                    FieldKey::Date,
                    "متى فقدت هذا العنصر؟ (التاريخ التقريبي)",
                    "التاريخ",
                ),
                FlowStepConfig::new(
                    FieldKey::Description,
                    "هل يمكنك إعطاء وصف مفصل للعنصر المفقود؟ (اللون، الشكل، أي علامات مميزة)",
                    "الوصف",
                ),
                FlowStepConfig::new(
                    FieldKey::ContactInfo,
                    "كيف يمكننا التواصل معك؟ (الرجاء تقديم رقم الهاتف أو البريد الإلكتروني)",
                    "معلومات الاتصال",
                ),
            ],
        }
    }

    /// Default four-step flow used by staff to log a found item.
    pub fn default_found() -> Self {
        Self {
            greeting: "مرحبا بك في بوت إدخال الموجودات! الرجاء وصف العنصر الذي تم العثور عليه."
                .to_string(),
            summary_title: "تم إدخال العنصر بنجاح! ملخص البيانات:".to_string(),
            reference_label: "رقم العنصر".to_string(),
            summary_footer:
                "تم إضافة العنصر إلى قائمة الموجودات. هل تريد إضافة عنصر آخر تم العثور عليه؟"
                    .to_string(),
            steps: vec![
                FlowStepConfig::new(
                    FieldKey::Name,
                    "ما هو اسم العنصر الذي تم العثور عليه؟",
                    "العنصر",
                ),
                FlowStepConfig::new(
                    FieldKey::Location,
                    "أين تم العثور على هذا العنصر؟ (المبنى، القاعة، إلخ)",
                    "المكان",
                ),
                FlowStepConfig::new(
                    FieldKey::Date,
                    "متى تم العثور على هذا العنصر؟ (التاريخ التقريبي)",
                    "التاريخ",
                ),
                FlowStepConfig::new(
                    FieldKey::Description,
                    "هل يمكنك إعطاء وصف مفصل للعنصر؟ (اللون، الشكل، أي علامات مميزة)",
                    "الوصف",
                ),
            ],
        }
    }
}

/// Intake flows for both report kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowsConfig {
    #[serde(default = "FlowConfig::default_lost")]
    pub lost: FlowConfig,
    #[serde(default = "FlowConfig::default_found")]
    pub found: FlowConfig,
}

impl Default for FlowsConfig {
    fn default() -> Self {
        Self {
            lost: FlowConfig::default_lost(),
            found: FlowConfig::default_found(),
        }
    }
}
