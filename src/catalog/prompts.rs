//! Prompt templates for the nine assessment operations.
//!
//! Record fields are substituted verbatim. A hostile control description can
//! therefore steer the model ("prompt injection"); the inventory is trusted
//! input today, see DESIGN.md before pointing this at untrusted data.

/// The six completeness elements every control description is tested against.
pub const ELEMENTS: [&str; 6] = ["When", "Why", "Who", "What", "Where", "How"];

pub const SYSTEM_JSON: &str = "Respond only with the JSON object.";
pub const SYSTEM_LIST: &str = "Respond only with the numbered list.";

pub fn completeness(control_desc: &str) -> String {
    format!(
        r#"You are the world's best professional auditor with decades of experience testing control descriptions for completeness.

Given the following control description, evaluate it for the presence of six key elements: {elements}.

For each element:
- If present, list it with a short clause (<20 words) referencing how it's reflected in the description.
- If missing, explain briefly why it's considered missing (e.g., "no timeline or frequency mentioned").

Then suggest improvements for each missing element based on the description.

Return valid JSON in this format:
{{
  "present": {{
    "Who": "...",
    "What": "..."
  }},
  "missing": {{
    "When": "No timeline stated",
    "Where": "No tool or system mentioned"
  }},
  "suggestions": {{
    "When": "Suggest adding a specific timeline or frequency for review"
  }}
}}

Control Description:
"""{control_desc}"""

JSON:
"#,
        elements = ELEMENTS.join(", "),
        control_desc = control_desc
    )
}

pub fn objective_fit(risk_desc: &str, control_desc: &str) -> String {
    format!(
        r#"Given the following risk description and control description, answer:
1. Is the control, as designed, able to mitigate the risk? (Yes/No)
2. Briefly explain your reasoning (1-2 sentences).

Risk Description:
{risk_desc}

Control Description:
{control_desc}

Respond in JSON:
{{
  "answer": "Yes or No",
  "explanation": "..."
}}
"#
    )
}

pub fn execution_fit(automation: &str, risk_desc: &str, control_desc: &str) -> String {
    format!(
        r#"Given the automation type (Automated/Semi-Auto/Manual), risk description, and control description, answer:
1. Is the control execution appropriate based on the control description and risk description? (Yes/No)
2. Briefly explain your reasoning (1-2 sentences).

Automation: {automation}
Risk Description: {risk_desc}
Control Description: {control_desc}

Respond in JSON:
{{
  "answer": "Yes or No",
  "explanation": "..."
}}
"#
    )
}

pub fn type_fit(control_type: &str, risk_desc: &str, control_desc: &str) -> String {
    format!(
        r#"Given the control type (Detective/Preventive), risk description, and control description, answer:
1. Is the control type appropriate based on control description and adequate for the risk it addresses? (Yes/No)
2. Briefly explain your reasoning (1-2 sentences).

Type: {control_type}
Risk Description: {risk_desc}
Control Description: {control_desc}

Respond in JSON:
{{
  "answer": "Yes or No",
  "explanation": "..."
}}
"#
    )
}

pub fn frequency_fit(frequency: &str, risk_desc: &str, control_desc: &str) -> String {
    format!(
        r#"Given the operation frequency, risk description, and control description, answer:
1. Is the control frequency appropriate based on the control description and adequate for the associated risk? (Yes/No)
2. Briefly explain your reasoning (1-2 sentences).

Frequency: {frequency}
Risk Description: {risk_desc}
Control Description: {control_desc}

Respond in JSON:
{{
  "answer": "Yes or No",
  "explanation": "..."
}}
"#
    )
}

pub fn dependencies(control_desc: &str) -> String {
    format!(
        r#"Given the control description, extract the names of any systems or data sources mentioned. List only the system or data source names (comma-separated if more than one). If none are mentioned, return "None found".

Control Description: {control_desc}

Respond in JSON:
{{
  "systems": "..."
}}
"#
    )
}

pub fn segregation(control_desc: &str) -> String {
    format!(
        r#"Given the following control description, answer:
1. Does the control ensure that no single individual has end-to-end responsibility for critical transactions, i.e. proper segregation of duties? (Yes/No)
2. Briefly explain your reasoning (1-2 sentences).

Control Description:
{control_desc}

Respond in JSON:
{{
  "answer": "Yes or No",
  "explanation": "..."
}}
"#
    )
}

/// Synthesizes the five prior judgments plus the completeness breakdown.
/// Must not be rendered before those operations have produced results.
pub fn overall_rating(signals: &super::RatingSignals<'_>) -> String {
    format!(
        r#"Given the following analysis of a control, provide an overall rating as one of the following: Effective, Partially effective, Ineffective. Consider all the information below:
- Control objective: {objective}
- Execution appropriateness: {execution}
- Type adequacy: {control_type}
- Frequency appropriateness: {frequency}
- System/data dependencies: {systems}
- Present: {present}
- Missing: {missing}

Return a JSON object:
{{
  "rating": "Effective, Partially effective, or Ineffective",
  "explanation": "..."
}}
"#,
        objective = signals.objective,
        execution = signals.execution,
        control_type = signals.control_type,
        frequency = signals.frequency,
        systems = signals.systems,
        present = signals.present,
        missing = signals.missing,
    )
}

pub fn evidence(control_desc: &str) -> String {
    format!(
        r#"You are the world's best professional auditor with decades of experience testing control descriptions for completeness.

Given the following control description, list the types of evidence an auditor or tester would expect to see to verify the control's operation. List each expected evidence as a separate numbered point (1., 2., 3., etc.).

Control Description:
{control_desc}

Respond with a numbered list of expected evidence types only.
"#
    )
}
