//! Intake flow definitions consumed by the state machine.

use crate::types::ReportKind;
use lostfound_config::{FieldKey, FlowConfig, LostFoundConfig};

/// One question of a flow and the field its answer fills.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowStep {
    pub field: FieldKey,
    pub prompt: String,
    /// Label shown next to the answer in the summary.
    pub label: String,
}

/// Ordered question list for one report kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeFlow {
    kind: ReportKind,
    greeting: String,
    summary_title: String,
    reference_label: String,
    summary_footer: String,
    steps: Vec<FlowStep>,
}

impl IntakeFlow {
    /// Build a flow from its config block.
    pub fn from_config(kind: ReportKind, config: &FlowConfig) -> Self {
        Self {
            kind,
            greeting: config.greeting.clone(),
            summary_title: config.summary_title.clone(),
            reference_label: config.reference_label.clone(),
            summary_footer: config.summary_footer.clone(),
            steps: config
                .steps
                .iter()
                .map(|step| FlowStep {
                    field: step.field,
                    prompt: step.prompt.clone(),
                    label: step.label.clone(),
                })
                .collect(),
        }
    }

    /// Lost-item flow from the effective config.
    pub fn lost(config: &LostFoundConfig) -> Self {
        Self::from_config(ReportKind::Lost, &config.flows.lost)
    }

    /// Found-item flow from the effective config.
    pub fn found(config: &LostFoundConfig) -> Self {
        Self::from_config(ReportKind::Found, &config.flows.found)
    }

    pub fn kind(&self) -> ReportKind {
        self.kind
    }

    pub fn greeting(&self) -> &str {
        &self.greeting
    }

    pub fn steps(&self) -> &[FlowStep] {
        &self.steps
    }

    /// Number of answers needed to complete the flow.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Prompt for step `index`, if the flow has one.
    pub fn prompt(&self, index: usize) -> Option<&str> {
        self.steps.get(index).map(|step| step.prompt.as_str())
    }

    /// Render the completion summary for a finished record.
    ///
    /// Fields appear in step order, followed by the short reference number.
    pub fn render_summary<'a>(
        &self,
        value_of: impl Fn(FieldKey) -> &'a str,
        reference: &str,
    ) -> String {
        let mut lines = vec![format!("**{}**", self.summary_title), String::new()];
        for step in &self.steps {
            lines.push(format!("**{}:** {}", step.label, value_of(step.field)));
        }
        lines.push(String::new());
        lines.push(format!("**{}:** #{}", self.reference_label, reference));
        if !self.summary_footer.is_empty() {
            lines.push(String::new());
            lines.push(self.summary_footer.clone());
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::IntakeFlow;
    use crate::types::ReportKind;
    use lostfound_config::{FieldKey, LostFoundConfig};
    use pretty_assertions::assert_eq;

    #[test]
    fn default_flows_follow_config_order() {
        let config = LostFoundConfig::default();
        let lost = IntakeFlow::lost(&config);
        let found = IntakeFlow::found(&config);
        assert_eq!(lost.kind(), ReportKind::Lost);
        assert_eq!(
            lost.steps().iter().map(|step| step.field).collect::<Vec<_>>(),
            vec![
                FieldKey::Name,
                FieldKey::Location,
                FieldKey::Date,
                FieldKey::Description,
                FieldKey::ContactInfo,
            ]
        );
        assert_eq!(found.len(), 4);
        assert_eq!(found.prompt(4), None);
    }

    #[test]
    fn summary_lists_every_step_and_reference() {
        let flow = IntakeFlow::found(&LostFoundConfig::default());
        let summary = flow.render_summary(
            |field| match field {
                FieldKey::Name => "دفتر",
                FieldKey::Location => "المكتبة",
                FieldKey::Date => "أمس",
                FieldKey::Description => "أغلفة زرقاء",
                FieldKey::ContactInfo => "",
            },
            "1a2b3c4d",
        );
        for value in ["دفتر", "المكتبة", "أمس", "أغلفة زرقاء", "#1a2b3c4d"] {
            assert!(summary.contains(value), "missing {value} in {summary}");
        }
    }
}
