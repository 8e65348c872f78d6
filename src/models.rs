use serde::{Deserialize, Serialize};

/// Sentinel `type` assigned to rows the user adds by hand, so the
/// refinement service knows which rows still need to be filled in.
pub const USER_ADDED_TYPE: &str = "user_added_field";

/// Placeholder description for user-added rows.
pub const USER_ADDED_DESCRIPTION: &str = "New variable added by user. Run refine to fill details.";

/// A single extracted variable as returned by the analysis service.
///
/// Every field defaults to an empty string so partially-filled rows
/// (common right after the user adds one) survive the round trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableRecord {
    #[serde(default)]
    pub field_name: String,
    #[serde(default)]
    pub value: String,
    #[serde(rename = "type", default)]
    pub var_type: String,
    #[serde(default)]
    pub description: String,
}

impl VariableRecord {
    /// Blank row appended by the add-variable action. The sentinel type
    /// and placeholder description tell the backend to complete it.
    pub fn user_added() -> Self {
        Self {
            field_name: String::new(),
            value: String::new(),
            var_type: USER_ADDED_TYPE.to_string(),
            description: USER_ADDED_DESCRIPTION.to_string(),
        }
    }

    pub fn field(&self, field: VariableField) -> &str {
        match field {
            VariableField::FieldName => &self.field_name,
            VariableField::Value => &self.value,
            VariableField::Type => &self.var_type,
            VariableField::Description => &self.description,
        }
    }

    /// Copy of this record with one field replaced. Edits never mutate
    /// the existing record in place.
    pub fn with_field(&self, field: VariableField, value: impl Into<String>) -> Self {
        let mut record = self.clone();
        let value = value.into();
        match field {
            VariableField::FieldName => record.field_name = value,
            VariableField::Value => record.value = value,
            VariableField::Type => record.var_type = value,
            VariableField::Description => record.description = value,
        }
        record
    }
}

/// The four editable columns of a variable row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableField {
    FieldName,
    Value,
    Type,
    Description,
}

impl VariableField {
    pub const ALL: [VariableField; 4] = [
        VariableField::FieldName,
        VariableField::Value,
        VariableField::Type,
        VariableField::Description,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            VariableField::FieldName => "Field Name",
            VariableField::Value => "Value",
            VariableField::Type => "Type",
            VariableField::Description => "Description",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            VariableField::FieldName => VariableField::Value,
            VariableField::Value => VariableField::Type,
            VariableField::Type => VariableField::Description,
            VariableField::Description => VariableField::FieldName,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            VariableField::FieldName => VariableField::Description,
            VariableField::Value => VariableField::FieldName,
            VariableField::Type => VariableField::Value,
            VariableField::Description => VariableField::Type,
        }
    }
}

/// Successful response from the analysis endpoint.
///
/// `document_text` is kept around for the whole session so later refine
/// calls see exactly the text the variables were extracted from; it is
/// never shown to the user. The backend also returns bookkeeping fields
/// (`content_type`, `size_bytes`) which serde ignores here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default)]
    pub document_text: String,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub variables: Vec<VariableRecord>,
}

/// Request body for the refinement endpoint.
#[derive(Debug, Serialize)]
pub struct RefineRequest<'a> {
    pub document_text: &'a str,
    pub current_variables: &'a [VariableRecord],
}

/// Response from the refinement endpoint. Only the refined variable
/// list is consumed; any extra fields are ignored.
#[derive(Debug, Deserialize)]
pub struct RefineResponse {
    #[serde(default)]
    pub variables: Vec<VariableRecord>,
}
