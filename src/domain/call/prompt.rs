//! Prompt templates per scenario.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::errors::CallError;
use super::scenario::Scenario;

/// Prepended to every template's instructions.
pub const PRIVACY_PREAMBLE: &str = "You are a HIPAA-compliant healthcare assistant. \
Never share PHI, always verify consent, and maintain patient privacy.";

/// Speaker of a few-shot example turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExampleRole {
    Caller,
    Agent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExampleTurn {
    pub role: ExampleRole,
    pub text: String,
}

impl ExampleTurn {
    pub fn caller(text: impl Into<String>) -> Self {
        Self {
            role: ExampleRole::Caller,
            text: text.into(),
        }
    }

    pub fn agent(text: impl Into<String>) -> Self {
        Self {
            role: ExampleRole::Agent,
            text: text.into(),
        }
    }
}

/// Structured prompt for one scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptTemplate {
    pub scenario: Scenario,
    pub system_instructions: String,
    #[serde(default)]
    pub example_turns: Vec<ExampleTurn>,
}

impl PromptTemplate {
    /// Instructions with the privacy preamble applied.
    pub fn system_prompt(&self) -> String {
        format!("{}\n\n{}", PRIVACY_PREAMBLE, self.system_instructions.trim())
    }
}

/// Failure building a template store.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum PromptStoreError {
    #[error("Duplicate template for scenario {0}")]
    DuplicateScenario(Scenario),

    #[error("Invalid template file: {0}")]
    Parse(String),
}

/// Read-only lookup from scenario to template.
#[derive(Debug, Clone)]
pub struct PromptTemplateStore {
    templates: HashMap<Scenario, PromptTemplate>,
}

impl PromptTemplateStore {
    /// Store holding the built-in template for every scenario.
    pub fn built_in() -> Self {
        let templates = Scenario::ALL
            .into_iter()
            .map(|scenario| (scenario, templates::for_scenario(scenario)))
            .collect();
        Self { templates }
    }

    /// Store holding exactly the given templates. Scenario keys must be unique.
    pub fn from_templates(list: Vec<PromptTemplate>) -> Result<Self, PromptStoreError> {
        let mut templates = HashMap::with_capacity(list.len());
        for template in list {
            let scenario = template.scenario;
            if templates.insert(scenario, template).is_some() {
                return Err(PromptStoreError::DuplicateScenario(scenario));
            }
        }
        Ok(Self { templates })
    }

    /// Parse a YAML list of templates.
    pub fn parse_yaml(yaml: &str) -> Result<Vec<PromptTemplate>, PromptStoreError> {
        serde_yaml::from_str(yaml).map_err(|e| PromptStoreError::Parse(e.to_string()))
    }

    /// Built-in templates with the given ones replacing their scenarios.
    pub fn built_in_with_overrides(overrides: Vec<PromptTemplate>) -> Result<Self, PromptStoreError> {
        let overrides = Self::from_templates(overrides)?;
        let mut store = Self::built_in();
        store.templates.extend(overrides.templates);
        Ok(store)
    }

    pub fn get(&self, scenario: Scenario) -> Result<&PromptTemplate, CallError> {
        self.templates
            .get(&scenario)
            .ok_or_else(|| CallError::UnknownScenario(scenario.to_string()))
    }

    /// Look up by wire tag, rejecting tags outside the scenario set.
    pub fn get_by_tag(&self, tag: &str) -> Result<&PromptTemplate, CallError> {
        let scenario: Scenario = tag
            .parse()
            .map_err(|_| CallError::UnknownScenario(tag.to_string()))?;
        self.get(scenario)
    }

    /// Scenarios with a template, in declaration order.
    pub fn scenarios(&self) -> Vec<Scenario> {
        let mut scenarios: Vec<Scenario> = self.templates.keys().copied().collect();
        scenarios.sort();
        scenarios
    }
}

impl Default for PromptTemplateStore {
    fn default() -> Self {
        Self::built_in()
    }
}

/// Built-in templates
pub mod templates {
    use super::*;

    pub fn for_scenario(scenario: Scenario) -> PromptTemplate {
        match scenario {
            Scenario::BillingInquiry => billing_inquiry(),
            Scenario::InsuranceVerification => insurance_verification(),
            Scenario::AppointmentScheduling => appointment_scheduling(),
        }
    }

    pub fn billing_inquiry() -> PromptTemplate {
        PromptTemplate {
            scenario: Scenario::BillingInquiry,
            system_instructions: "You are a helpful healthcare billing assistant on a phone call. \
Help patients understand their medical bills, explain charges and payment options, \
verify insurance details and set up payment arrangements. Ask one specific question \
at a time when you need more information. Offer to connect the caller with a human \
agent when an issue is complex. Only ask for the information the task requires."
                .to_string(),
            example_turns: vec![
                ExampleTurn::caller("Why is my bill so high this month?"),
                ExampleTurn::agent(
                    "I can help with that. Could you tell me which charge on the statement you'd like me to look at?",
                ),
                ExampleTurn::caller("Can I pay it in parts?"),
                ExampleTurn::agent(
                    "Yes, we offer monthly payment plans. Would you like me to walk you through the options?",
                ),
            ],
        }
    }

    pub fn insurance_verification() -> PromptTemplate {
        PromptTemplate {
            scenario: Scenario::InsuranceVerification,
            system_instructions: "You are a healthcare insurance verification specialist on a phone call. \
Verify insurance eligibility, check coverage for specific procedures, explain benefits \
and limitations, handle pre-authorization questions and give claim status updates. \
Be professional and clear. For complex insurance issues, offer human assistance."
                .to_string(),
            example_turns: vec![
                ExampleTurn::caller("Is my MRI covered?"),
                ExampleTurn::agent(
                    "Let me check that for you. Which insurance plan is the procedure being billed to?",
                ),
            ],
        }
    }

    pub fn appointment_scheduling() -> PromptTemplate {
        PromptTemplate {
            scenario: Scenario::AppointmentScheduling,
            system_instructions: "You are a healthcare appointment scheduler on a phone call. \
Find available appointment slots, confirm appointment details, note whether insurance \
coverage needs verifying, and handle rescheduling requests. Be friendly and efficient, \
and confirm every detail back to the caller."
                .to_string(),
            example_turns: vec![
                ExampleTurn::caller("I need to move my appointment next week."),
                ExampleTurn::agent(
                    "Of course. What day and time works better for you?",
                ),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_in_store_covers_every_scenario() {
        let store = PromptTemplateStore::built_in();
        for scenario in Scenario::ALL {
            let template = store.get(scenario).unwrap();
            assert_eq!(template.scenario, scenario);
            assert!(!template.example_turns.is_empty());
        }
        assert_eq!(store.scenarios(), Scenario::ALL.to_vec());
    }

    #[test]
    fn system_prompt_carries_privacy_preamble() {
        let prompt = templates::billing_inquiry().system_prompt();
        assert!(prompt.starts_with(PRIVACY_PREAMBLE));
        assert!(prompt.contains("billing assistant"));
    }

    #[test]
    fn missing_scenario_is_unknown() {
        let store = PromptTemplateStore::from_templates(vec![templates::billing_inquiry()]).unwrap();
        assert_eq!(
            store.get(Scenario::AppointmentScheduling),
            Err(CallError::UnknownScenario("appointment_scheduling".to_string()))
        );
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let store = PromptTemplateStore::built_in();
        assert!(matches!(
            store.get_by_tag("dental_cleaning"),
            Err(CallError::UnknownScenario(tag)) if tag == "dental_cleaning"
        ));
        assert!(store.get_by_tag("billing_inquiry").is_ok());
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let result = PromptTemplateStore::from_templates(vec![
            templates::billing_inquiry(),
            templates::billing_inquiry(),
        ]);
        assert_eq!(
            result.err(),
            Some(PromptStoreError::DuplicateScenario(Scenario::BillingInquiry))
        );
    }

    #[test]
    fn yaml_overrides_replace_built_ins() {
        let yaml = r#"
- scenario: billing_inquiry
  system_instructions: Custom billing instructions.
  example_turns:
    - role: caller
      text: What do I owe?
    - role: agent
      text: Let me look that up.
"#;
        let overrides = PromptTemplateStore::parse_yaml(yaml).unwrap();
        let store = PromptTemplateStore::built_in_with_overrides(overrides).unwrap();

        let billing = store.get(Scenario::BillingInquiry).unwrap();
        assert_eq!(billing.system_instructions, "Custom billing instructions.");
        assert_eq!(billing.example_turns[1].role, ExampleRole::Agent);
        assert_eq!(
            store.get(Scenario::InsuranceVerification).unwrap(),
            &templates::insurance_verification()
        );
    }

    #[test]
    fn yaml_with_unknown_scenario_fails_to_parse() {
        let yaml = "- scenario: tax_filing\n  system_instructions: nope\n";
        assert!(matches!(
            PromptTemplateStore::parse_yaml(yaml),
            Err(PromptStoreError::Parse(_))
        ));
    }
}
