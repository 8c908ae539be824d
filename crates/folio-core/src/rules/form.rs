//! Contact form validation and submission.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::{require_id, set_class};
use crate::config::FormConfig;
use crate::dom::{Document, NodeId};
use crate::error::{FolioError, FolioResult};
use crate::events::Reaction;

/// One non-blank, `@`-free run, an `@`, another run, a dot and a final run
const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern is a valid regex"))
}

pub fn is_valid_email(value: &str) -> bool {
    email_regex().is_match(value)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Name,
    Email,
    Subject,
    Message,
}

impl Field {
    pub const ALL: [Field; 4] = [Field::Name, Field::Email, Field::Subject, Field::Message];

    /// Element id of the control
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Subject => "subject",
            Field::Message => "message",
        }
    }

    pub fn error_id(&self, config: &FormConfig) -> String {
        format!("{}{}", self.as_str(), config.error_suffix)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = FolioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| FolioError::Serialization(format!("unknown form field {:?}", s)))
    }
}

/// Why a field value was rejected
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FieldError {
    #[error("required field is empty")]
    RequiredFieldEmpty,
    #[error("email address is malformed")]
    InvalidEmailFormat,
    #[error("message is too short")]
    MessageTooShort,
}

impl FieldError {
    /// Text shown to the visitor
    pub fn message<'a>(&self, config: &'a FormConfig) -> &'a str {
        match self {
            FieldError::RequiredFieldEmpty => &config.required_text,
            FieldError::InvalidEmailFormat => &config.email_text,
            FieldError::MessageTooShort => &config.too_short_text,
        }
    }
}

/// Length as a browser reports it: UTF-16 code units, so characters
/// outside the BMP count twice
pub fn text_length(value: &str) -> usize {
    value.encode_utf16().count()
}

/// Check one field value.
///
/// Emptiness and message length use the trimmed value; the email pattern
/// is matched against the value as entered.
pub fn validate_field(
    field: Field,
    value: &str,
    min_message_len: usize,
) -> Result<(), FieldError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FieldError::RequiredFieldEmpty);
    }
    match field {
        Field::Email if !is_valid_email(value) => Err(FieldError::InvalidEmailFormat),
        Field::Message if text_length(trimmed) < min_message_len => {
            Err(FieldError::MessageTooShort)
        }
        _ => Ok(()),
    }
}

/// Last computed validation result for a field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldStatus {
    pub error: Option<FieldError>,
    /// Displayed message; empty when valid
    pub message: String,
}

impl FieldStatus {
    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitOutcome {
    /// Acknowledged locally; the form was reset
    Submitted,
    /// Blocked before the overall validity check
    TermsNotAccepted,
    Invalid(Vec<(Field, FieldError)>),
}

#[derive(Debug, Clone)]
struct FieldControl {
    input: NodeId,
    error_display: Option<NodeId>,
}

#[derive(Debug, Clone)]
pub struct ContactForm {
    form: NodeId,
    controls: BTreeMap<Field, FieldControl>,
    terms: NodeId,
    status: BTreeMap<Field, FieldStatus>,
    config: FormConfig,
}

impl ContactForm {
    pub fn bind<D: Document>(doc: &mut D, config: &FormConfig) -> FolioResult<Self> {
        let form = require_id(doc, &config.form_id)?;
        let terms = require_id(doc, &config.terms_id)?;
        let mut controls = BTreeMap::new();
        for field in Field::ALL {
            let input = require_id(doc, field.as_str())?;
            let error_id = field.error_id(config);
            let error_display = doc.element_by_id(&error_id);
            if error_display.is_none() {
                warn!(%field, id = %error_id, "No error display for field");
            }
            controls.insert(field, FieldControl { input, error_display });
        }
        Ok(Self {
            form,
            controls,
            terms,
            status: Field::ALL.into_iter().map(|f| (f, FieldStatus::default())).collect(),
            config: config.clone(),
        })
    }

    pub fn status(&self, field: Field) -> &FieldStatus {
        // Every field gets an entry at bind
        &self.status[&field]
    }

    pub fn field_for(&self, node: NodeId) -> Option<Field> {
        self.controls
            .iter()
            .find(|(_, control)| control.input == node)
            .map(|(field, _)| *field)
    }

    /// Revalidate the field that lost focus
    pub fn on_blur<D: Document>(&mut self, doc: &mut D, target: NodeId) -> Reaction {
        if let Some(field) = self.field_for(target) {
            self.validate(doc, field);
        }
        Reaction::none()
    }

    pub fn on_submit<D: Document>(&mut self, doc: &mut D, target: NodeId) -> Reaction {
        if !doc.contains(self.form, target) {
            return Reaction::none();
        }

        let failures: Vec<(Field, FieldError)> = Field::ALL
            .into_iter()
            .filter_map(|field| self.validate(doc, field).err().map(|e| (field, e)))
            .collect();

        let outcome = if !doc.checked(self.terms) {
            doc.alert(&self.config.terms_alert);
            SubmitOutcome::TermsNotAccepted
        } else if !failures.is_empty() {
            SubmitOutcome::Invalid(failures)
        } else {
            doc.alert(&self.config.success_alert);
            self.clear(doc);
            SubmitOutcome::Submitted
        };
        info!(?outcome, "Contact form submitted");

        Reaction {
            submission: Some(outcome),
            ..Reaction::prevented()
        }
    }

    /// Reset every control and clear every error display
    pub fn clear<D: Document>(&mut self, doc: &mut D) {
        doc.reset_form(self.form);
        clear_error_displays(doc, &self.config);
        for status in self.status.values_mut() {
            *status = FieldStatus::default();
        }
        debug!("Contact form cleared");
    }

    fn validate<D: Document>(&mut self, doc: &mut D, field: Field) -> Result<(), FieldError> {
        let control = &self.controls[&field];
        let result = validate_field(field, &doc.value(control.input), self.config.min_message_len);
        let status = FieldStatus {
            error: result.err(),
            message: result
                .err()
                .map(|e| e.message(&self.config).to_string())
                .unwrap_or_default(),
        };
        if let Some(display) = control.error_display {
            doc.set_text(display, &status.message);
            set_class(doc, display, &self.config.shown_class, !status.is_valid());
        }
        self.status.insert(field, status);
        result
    }
}

/// Empty every error display in the document and hide it
pub fn clear_error_displays<D: Document + ?Sized>(doc: &mut D, config: &FormConfig) {
    for display in doc.query_all(&config.error_messages) {
        doc.set_text(display, "");
        doc.remove_class(display, &config.shown_class);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{ElementSpec, MemoryDocument};

    fn page() -> MemoryDocument {
        let mut doc = MemoryDocument::new();
        let body = doc.body();
        let mut form = ElementSpec::new("form").id("contactForm");
        for field in ["name", "email", "subject"] {
            form = form
                .child(ElementSpec::new("input").id(field))
                .child(
                    ElementSpec::new("span")
                        .id(format!("{}Error", field))
                        .class("error-message"),
                );
        }
        form = form
            .child(ElementSpec::new("textarea").id("message"))
            .child(ElementSpec::new("span").id("messageError").class("error-message"))
            .child(ElementSpec::new("input").id("terms").attr("type", "checkbox"))
            .child(ElementSpec::new("button").id("send").attr("type", "submit"));
        doc.append(body, form);
        doc
    }

    fn fill(doc: &mut MemoryDocument, values: [&str; 4]) {
        for (field, value) in Field::ALL.into_iter().zip(values) {
            let node = doc.element_by_id(field.as_str()).unwrap();
            doc.set_value(node, value);
        }
    }

    fn id(doc: &MemoryDocument, id: &str) -> NodeId {
        doc.element_by_id(id).unwrap()
    }

    #[test]
    fn test_validate_field_rules() {
        assert_eq!(validate_field(Field::Name, "   ", 10), Err(FieldError::RequiredFieldEmpty));
        assert_eq!(validate_field(Field::Name, " Ada ", 10), Ok(()));
        assert_eq!(validate_field(Field::Email, "bad@", 10), Err(FieldError::InvalidEmailFormat));
        assert_eq!(validate_field(Field::Email, "a@b.co", 10), Ok(()));
        // Pattern sees surrounding whitespace
        assert_eq!(
            validate_field(Field::Email, " a@b.co", 10),
            Err(FieldError::InvalidEmailFormat)
        );
        assert_eq!(
            validate_field(Field::Message, "  too short ", 10),
            Err(FieldError::MessageTooShort)
        );
        assert_eq!(validate_field(Field::Message, "long enough text", 10), Ok(()));
        assert_eq!(validate_field(Field::Subject, "", 10), Err(FieldError::RequiredFieldEmpty));
    }

    #[test]
    fn test_message_length_counts_utf16_units() {
        assert_eq!(text_length("😀"), 2);
        assert_eq!(text_length("é"), 1);
        // Five astral emoji are ten code units
        assert_eq!(validate_field(Field::Message, "😀😀😀😀😀", 10), Ok(()));
        assert_eq!(
            validate_field(Field::Message, " 😀😀😀😀 ", 10),
            Err(FieldError::MessageTooShort)
        );
        assert_eq!(
            validate_field(Field::Message, "ééééééééé", 10),
            Err(FieldError::MessageTooShort)
        );
    }

    #[test]
    fn test_blur_renders_and_clears() {
        let mut doc = page();
        let mut form = ContactForm::bind(&mut doc, &FormConfig::default()).unwrap();
        let email = id(&doc, "email");
        let display = id(&doc, "emailError");

        doc.set_value(email, "bad@");
        form.on_blur(&mut doc, email);
        assert_eq!(form.status(Field::Email).error, Some(FieldError::InvalidEmailFormat));
        assert_eq!(doc.text(display), "Please enter a valid email");
        assert!(doc.has_class(display, "show"));

        doc.set_value(email, "me@example.com");
        form.on_blur(&mut doc, email);
        assert!(form.status(Field::Email).is_valid());
        assert_eq!(doc.text(display), "");
        assert!(!doc.has_class(display, "show"));
    }

    #[test]
    fn test_invalid_email_does_not_reset() {
        let mut doc = page();
        let mut form = ContactForm::bind(&mut doc, &FormConfig::default()).unwrap();
        fill(&mut doc, ["Ada", "bad@", "Hello", "A long enough message"]);
        let terms = id(&doc, "terms");
        doc.set_checked(terms, true);

        let send = id(&doc, "send");
        let reaction = form.on_submit(&mut doc, send);
        assert!(reaction.prevent_default);
        assert_eq!(
            reaction.submission,
            Some(SubmitOutcome::Invalid(vec![(Field::Email, FieldError::InvalidEmailFormat)]))
        );
        assert_eq!(doc.value(id(&doc, "name")), "Ada");
        assert!(doc.alerts().is_empty());
    }

    #[test]
    fn test_terms_checked_before_validity() {
        let mut doc = page();
        let mut form = ContactForm::bind(&mut doc, &FormConfig::default()).unwrap();
        fill(&mut doc, ["", "", "", ""]);
        let send = id(&doc, "send");
        let reaction = form.on_submit(&mut doc, send);

        assert_eq!(reaction.submission, Some(SubmitOutcome::TermsNotAccepted));
        assert_eq!(doc.alerts(), ["Please agree to the terms and privacy policy"]);
        // Field errors are still rendered
        assert_eq!(form.status(Field::Name).error, Some(FieldError::RequiredFieldEmpty));
        assert!(doc.has_class(id(&doc, "messageError"), "show"));
    }

    #[test]
    fn test_successful_submit_resets() {
        let mut doc = page();
        let mut form = ContactForm::bind(&mut doc, &FormConfig::default()).unwrap();
        fill(&mut doc, ["Ada", "ada@example.com", "Hello", "A long enough message"]);
        let terms = id(&doc, "terms");
        doc.set_checked(terms, true);

        let send = id(&doc, "send");
        let reaction = form.on_submit(&mut doc, send);
        assert_eq!(reaction.submission, Some(SubmitOutcome::Submitted));
        assert_eq!(doc.alerts(), ["Thank you for your message! I will get back to you soon."]);
        for field in Field::ALL {
            assert_eq!(doc.value(id(&doc, field.as_str())), "");
            assert!(form.status(field).is_valid());
        }
        assert!(!doc.checked(terms));
    }

    #[test]
    fn test_submit_outside_form_ignored() {
        let mut doc = page();
        let mut form = ContactForm::bind(&mut doc, &FormConfig::default()).unwrap();
        let body = doc.body();
        assert_eq!(form.on_submit(&mut doc, body), Reaction::none());
    }

    #[test]
    fn test_parse_field() {
        assert_eq!("email".parse::<Field>().unwrap(), Field::Email);
        assert!("phone".parse::<Field>().is_err());
        assert_eq!(Field::Message.error_id(&FormConfig::default()), "messageError");
    }
}
