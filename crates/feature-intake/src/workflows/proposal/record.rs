use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::scoring::{rice_score, RiceInputs};

/// Every settable field of a proposal, named as it appears on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldName {
    Title,
    Description,
    Problem,
    CurrentSolution,
    ProposedSolution,
    Beneficiaries,
    Alternatives,
    Reach,
    Impact,
    Confidence,
    Effort,
}

impl FieldName {
    pub const ALL: [Self; 11] = [
        Self::Title,
        Self::Description,
        Self::Problem,
        Self::CurrentSolution,
        Self::ProposedSolution,
        Self::Beneficiaries,
        Self::Alternatives,
        Self::Reach,
        Self::Impact,
        Self::Confidence,
        Self::Effort,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Description => "description",
            Self::Problem => "problem",
            Self::CurrentSolution => "currentSolution",
            Self::ProposedSolution => "proposedSolution",
            Self::Beneficiaries => "beneficiaries",
            Self::Alternatives => "alternatives",
            Self::Reach => "reach",
            Self::Impact => "impact",
            Self::Confidence => "confidence",
            Self::Effort => "effort",
        }
    }

    pub const fn snake_case(self) -> &'static str {
        match self {
            Self::CurrentSolution => "current_solution",
            Self::ProposedSolution => "proposed_solution",
            other => other.as_str(),
        }
    }

    pub const fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::Reach | Self::Impact | Self::Confidence | Self::Effort
        )
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldName {
    type Err = RecordError;

    /// Accepts the camelCase wire names as well as their snake_case spelling.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == raw || field.snake_case() == raw)
            .ok_or_else(|| RecordError::UnknownField(raw.to_string()))
    }
}

/// A raw value coming from an input control or a JSON payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldInput {
    Number(f64),
    Text(String),
}

impl From<&str> for FieldInput {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldInput {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for FieldInput {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<u32> for FieldInput {
    fn from(value: u32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl FieldInput {
    fn into_text(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Number(number) => number.to_string(),
        }
    }

    /// Blank text clears the field back to its unset default.
    fn into_number(self, field: FieldName) -> Result<f64, RecordError> {
        let number = match self {
            Self::Number(number) => number,
            Self::Text(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    return Ok(0.0);
                }
                trimmed
                    .parse::<f64>()
                    .map_err(|_| RecordError::InvalidValue {
                        field,
                        value: text.clone(),
                    })?
            }
        };

        if number.is_finite() {
            Ok(number)
        } else {
            Err(RecordError::InvalidValue {
                field,
                value: number.to_string(),
            })
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecordError {
    #[error("unknown proposal field '{0}'")]
    UnknownField(String),
    #[error("field '{field}' expects a number, got '{value}'")]
    InvalidValue { field: FieldName, value: String },
}

/// Notification delivered to observers after every successful `set`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordChange {
    pub field: FieldName,
    pub rice_score: f64,
}

type Observer = Box<dyn FnMut(&RecordChange) + Send>;

enum Slot<'a> {
    Text(&'a mut String),
    Number(&'a mut f64),
}

/// The proposal being edited. Text fields default to empty, numeric fields to zero.
#[derive(Default)]
pub struct FormRecord {
    title: String,
    description: String,
    problem: String,
    current_solution: String,
    proposed_solution: String,
    beneficiaries: String,
    alternatives: String,
    reach: f64,
    impact: f64,
    confidence: f64,
    effort: f64,
    submitted_at: Option<DateTime<Utc>>,
    observers: Vec<Observer>,
}

impl fmt::Debug for FormRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormRecord")
            .field("title", &self.title)
            .field("rice_inputs", &self.rice_inputs())
            .field("submitted_at", &self.submitted_at)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

impl FormRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field by its wire name.
    pub fn set(&mut self, field: &str, value: impl Into<FieldInput>) -> Result<(), RecordError> {
        let field = field.parse::<FieldName>()?;
        self.set_field(field, value)
    }

    /// Set a field, coercing text into a number for the scoring fields. On error the previous
    /// value is kept.
    pub fn set_field(
        &mut self,
        field: FieldName,
        value: impl Into<FieldInput>,
    ) -> Result<(), RecordError> {
        let value = value.into();
        match self.slot(field) {
            Slot::Number(slot) => *slot = value.into_number(field)?,
            Slot::Text(slot) => *slot = value.into_text(),
        }

        self.notify(field);
        Ok(())
    }

    /// Register a callback fired after each successful mutation with the re-derived score.
    pub fn subscribe<F>(&mut self, observer: F)
    where
        F: FnMut(&RecordChange) + Send + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    pub fn text(&self, field: FieldName) -> Option<&str> {
        match field {
            FieldName::Title => Some(&self.title),
            FieldName::Description => Some(&self.description),
            FieldName::Problem => Some(&self.problem),
            FieldName::CurrentSolution => Some(&self.current_solution),
            FieldName::ProposedSolution => Some(&self.proposed_solution),
            FieldName::Beneficiaries => Some(&self.beneficiaries),
            FieldName::Alternatives => Some(&self.alternatives),
            _ => None,
        }
    }

    pub fn number(&self, field: FieldName) -> Option<f64> {
        match field {
            FieldName::Reach => Some(self.reach),
            FieldName::Impact => Some(self.impact),
            FieldName::Confidence => Some(self.confidence),
            FieldName::Effort => Some(self.effort),
            _ => None,
        }
    }

    pub fn rice_inputs(&self) -> RiceInputs {
        RiceInputs::new(self.reach, self.impact, self.confidence, self.effort)
    }

    pub fn rice_score(&self) -> f64 {
        rice_score(self.reach, self.impact, self.confidence, self.effort)
    }

    pub fn submitted_at(&self) -> Option<DateTime<Utc>> {
        self.submitted_at
    }

    pub fn mark_submitted(&mut self, at: DateTime<Utc>) {
        self.submitted_at = Some(at);
    }

    /// Copy every field out, re-deriving the score from the current factors.
    pub fn snapshot(&self) -> FormSnapshot {
        FormSnapshot {
            title: self.title.clone(),
            description: self.description.clone(),
            problem: self.problem.clone(),
            current_solution: self.current_solution.clone(),
            proposed_solution: self.proposed_solution.clone(),
            beneficiaries: self.beneficiaries.clone(),
            alternatives: self.alternatives.clone(),
            reach: self.reach,
            impact: self.impact,
            confidence: self.confidence,
            effort: self.effort,
            rice_score: self.rice_score(),
            submitted_at: self.submitted_at,
        }
    }

    fn slot(&mut self, field: FieldName) -> Slot<'_> {
        match field {
            FieldName::Title => Slot::Text(&mut self.title),
            FieldName::Description => Slot::Text(&mut self.description),
            FieldName::Problem => Slot::Text(&mut self.problem),
            FieldName::CurrentSolution => Slot::Text(&mut self.current_solution),
            FieldName::ProposedSolution => Slot::Text(&mut self.proposed_solution),
            FieldName::Beneficiaries => Slot::Text(&mut self.beneficiaries),
            FieldName::Alternatives => Slot::Text(&mut self.alternatives),
            FieldName::Reach => Slot::Number(&mut self.reach),
            FieldName::Impact => Slot::Number(&mut self.impact),
            FieldName::Confidence => Slot::Number(&mut self.confidence),
            FieldName::Effort => Slot::Number(&mut self.effort),
        }
    }

    fn notify(&mut self, field: FieldName) {
        if self.observers.is_empty() {
            return;
        }
        let change = RecordChange {
            field,
            rice_score: self.rice_score(),
        };
        for observer in &mut self.observers {
            observer(&change);
        }
    }
}

/// Immutable copy of a record handed to the submission pipeline and to renderers.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSnapshot {
    pub title: String,
    pub description: String,
    pub problem: String,
    pub current_solution: String,
    pub proposed_solution: String,
    pub beneficiaries: String,
    pub alternatives: String,
    pub reach: f64,
    pub impact: f64,
    pub confidence: f64,
    pub effort: f64,
    pub rice_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
}

impl FormSnapshot {
    pub fn rice_inputs(&self) -> RiceInputs {
        RiceInputs::new(self.reach, self.impact, self.confidence, self.effort)
    }
}
