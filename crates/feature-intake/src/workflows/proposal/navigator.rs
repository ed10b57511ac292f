use serde::Serialize;

use super::record::FieldName;

/// A named group of fields shown together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub name: String,
    pub label: String,
    pub fields: Vec<FieldName>,
}

impl Section {
    pub fn new(name: impl Into<String>, label: impl Into<String>, fields: Vec<FieldName>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            fields,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavigationError {
    #[error("unknown section '{0}'")]
    UnknownSection(String),
    #[error("a navigator needs at least one section")]
    NoSections,
    #[error("section '{0}' is configured more than once")]
    DuplicateSection(String),
}

/// Tab-style selector over the configured sections.
///
/// Every section can be reached from every other one; there is no terminal state. The navigator
/// only knows which field names a section exposes, never their values.
#[derive(Debug, Clone)]
pub struct SectionNavigator {
    sections: Vec<Section>,
    active: usize,
}

impl SectionNavigator {
    pub fn new(sections: Vec<Section>) -> Result<Self, NavigationError> {
        if sections.is_empty() {
            return Err(NavigationError::NoSections);
        }

        for (index, section) in sections.iter().enumerate() {
            if sections[..index]
                .iter()
                .any(|earlier| earlier.name == section.name)
            {
                return Err(NavigationError::DuplicateSection(section.name.clone()));
            }
        }

        Ok(Self {
            sections,
            active: 0,
        })
    }

    /// Intake → problem → scoring → solution → summary.
    pub fn standard() -> Self {
        Self {
            sections: standard_sections(),
            active: 0,
        }
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn active(&self) -> &Section {
        &self.sections[self.active]
    }

    pub fn active_name(&self) -> &str {
        &self.active().name
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    /// Switch to `name`. On failure the active section stays where it was.
    pub fn go_to(&mut self, name: &str) -> Result<&Section, NavigationError> {
        let index = self
            .sections
            .iter()
            .position(|section| section.name == name)
            .ok_or_else(|| NavigationError::UnknownSection(name.to_string()))?;
        self.active = index;
        Ok(&self.sections[index])
    }

    /// Move to the following section, staying put on the last one.
    pub fn next(&mut self) -> &Section {
        if self.active + 1 < self.sections.len() {
            self.active += 1;
        }
        self.active()
    }

    /// Move to the preceding section, staying put on the first one.
    pub fn previous(&mut self) -> &Section {
        self.active = self.active.saturating_sub(1);
        self.active()
    }

    pub fn is_editable(&self, field: FieldName) -> bool {
        self.active().fields.contains(&field)
    }

    pub fn section_of(&self, field: FieldName) -> Option<&Section> {
        self.sections
            .iter()
            .find(|section| section.fields.contains(&field))
    }
}

fn standard_sections() -> Vec<Section> {
    vec![
        Section::new(
            "intake",
            "Feature Overview",
            vec![FieldName::Title, FieldName::Description],
        ),
        Section::new(
            "problem",
            "Problem Statement",
            vec![
                FieldName::Problem,
                FieldName::CurrentSolution,
                FieldName::Beneficiaries,
            ],
        ),
        Section::new(
            "scoring",
            "RICE Scoring",
            vec![
                FieldName::Reach,
                FieldName::Impact,
                FieldName::Confidence,
                FieldName::Effort,
            ],
        ),
        Section::new(
            "solution",
            "Proposed Solution",
            vec![FieldName::ProposedSolution, FieldName::Alternatives],
        ),
        Section::new("summary", "Review & Submit", Vec::new()),
    ]
}
