//! Form validation
//!
//! Markup-declared constraints (`required`, `type=email`, `minlength`) for
//! individual fields, the composite chat check, and the inline error
//! presentation shared by every form family.

use folio_dom::{Document, NodeId};

use crate::util::validate_email;

/// Controls considered when validating a whole form
const FIELD_SELECTOR: &str = "input, textarea, select";

/// Why a field is invalid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    Required,
    InvalidEmail,
    TooShort { min: usize },
}

impl FieldError {
    /// User-facing message
    pub fn message(&self) -> String {
        match self {
            Self::Required => "This field is required".to_string(),
            Self::InvalidEmail => "Please enter a valid email address".to_string(),
            Self::TooShort { min } => format!("Please enter at least {min} characters"),
        }
    }
}

/// Constraints declared on a field's markup
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldRules {
    pub required: bool,
    pub email: bool,
    pub min_length: Option<usize>,
}

impl FieldRules {
    pub fn from_element(doc: &Document, field: NodeId) -> Self {
        Self {
            required: doc.has_attribute(field, "required"),
            email: doc
                .attribute(field, "type")
                .is_some_and(|t| t.eq_ignore_ascii_case("email")),
            min_length: doc
                .attribute(field, "minlength")
                .and_then(|v| v.trim().parse().ok()),
        }
    }

    /// Check a raw value. The first failing rule wins.
    ///
    /// Every rule sees the trimmed value. An email field is checked
    /// against the format even when it is optional and empty.
    pub fn check(&self, value: &str) -> Result<(), FieldError> {
        let trimmed = value.trim();
        if self.required && trimmed.is_empty() {
            return Err(FieldError::Required);
        }
        if self.email && !validate_email(trimmed) {
            return Err(FieldError::InvalidEmail);
        }
        if let Some(min) = self.min_length {
            if trimmed.chars().count() < min {
                return Err(FieldError::TooShort { min });
            }
        }
        Ok(())
    }
}

/// Validate one field against its markup constraints
pub fn validate_field(doc: &Document, field: NodeId) -> Result<(), FieldError> {
    FieldRules::from_element(doc, field).check(&doc.value(field))
}

/// Fields of a form that take part in validation
pub fn form_fields(doc: &Document, form: NodeId) -> Vec<NodeId> {
    doc.query_selector_all_within(form, FIELD_SELECTOR)
        .unwrap_or_default()
        .into_iter()
        .filter(|&field| {
            !matches!(
                doc.attribute(field, "type").as_deref(),
                Some("submit" | "button" | "hidden" | "reset")
            )
        })
        .collect()
}

/// Validate every field of a form, marking each one. Returns the failures.
pub fn validate_form(doc: &mut Document, form: NodeId) -> Vec<(NodeId, FieldError)> {
    let mut failures = Vec::new();
    for field in form_fields(doc, form) {
        match validate_field(doc, field) {
            Ok(()) => clear_field(doc, field),
            Err(error) => {
                mark_field(doc, field, error);
                failures.push((field, error));
            }
        }
    }
    failures
}

/// Show a field as invalid, with its message in a linked `.field-error`
pub fn mark_field(doc: &mut Document, field: NodeId, error: FieldError) {
    doc.add_class(field, "error");
    doc.set_attribute(field, "aria-invalid", "true");

    let message = match error_message_node(doc, field) {
        Some(node) => node,
        None => {
            let id = format!("field-error-{}", field.index());
            let node = doc
                .build("span")
                .id(&id)
                .class("field-error")
                .attr("role", "alert")
                .finish();
            doc.insert_after(field, node);
            doc.set_attribute(field, "aria-describedby", &id);
            node
        }
    };
    doc.remove_attribute(message, "hidden");
    doc.set_text_content(message, &error.message());
}

/// Drop the invalid state from a field
pub fn clear_field(doc: &mut Document, field: NodeId) {
    doc.remove_class(field, "error");
    doc.remove_attribute(field, "aria-invalid");
    if let Some(message) = error_message_node(doc, field) {
        doc.set_text_content(message, "");
        doc.set_attribute(message, "hidden", "");
    }
}

fn error_message_node(doc: &Document, field: NodeId) -> Option<NodeId> {
    let id = doc.attribute(field, "aria-describedby")?;
    doc.get_element_by_id(&id)
        .filter(|&node| doc.has_class(node, "field-error"))
}

/// Values submitted through the chat form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatSubmission {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl ChatSubmission {
    /// Read the `name`, `email` and `message` controls of a chat form
    pub fn read(doc: &Document, form: NodeId) -> Self {
        let value = |name: &str| {
            doc.query_selector_within(form, &format!("[name={name}]"))
                .ok()
                .flatten()
                .map(|field| doc.value(field))
                .unwrap_or_default()
        };
        Self {
            name: value("name"),
            email: value("email"),
            message: value("message"),
        }
    }
}

/// Chat field names, as used in `name` attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatField {
    Name,
    Email,
    Message,
}

impl ChatField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Message => "message",
        }
    }
}

/// Minimum lengths for the composite chat check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatLimits {
    pub name_min: usize,
    pub message_min: usize,
}

impl Default for ChatLimits {
    fn default() -> Self {
        Self {
            name_min: 2,
            message_min: 10,
        }
    }
}

/// Composite chat check; lengths are counted in characters after trimming
pub fn validate_chat(submission: &ChatSubmission, limits: ChatLimits) -> Vec<(ChatField, FieldError)> {
    let mut errors = Vec::new();
    if submission.name.trim().chars().count() < limits.name_min {
        errors.push((ChatField::Name, FieldError::TooShort { min: limits.name_min }));
    }
    if !validate_email(submission.email.trim()) {
        errors.push((ChatField::Email, FieldError::InvalidEmail));
    }
    if submission.message.trim().chars().count() < limits.message_min {
        errors.push((
            ChatField::Message,
            FieldError::TooShort {
                min: limits.message_min,
            },
        ));
    }
    errors
}
