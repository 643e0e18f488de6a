use crate::form_data::FieldMap;
use thiserror::Error;

pub const SUBJECT_FIELD: &str = "subject";
pub const MESSAGE_FIELD: &str = "message";

/// A submission known to carry every required field with a non-empty value.
///
/// Only [`Validator::validate`] produces one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactInfo {
    subject: String,
    message: String,
    fields: FieldMap,
}

impl ContactInfo {
    #[cfg(test)]
    pub(crate) fn subject(&self) -> &str {
        &self.subject
    }

    #[cfg(test)]
    pub(crate) fn message(&self) -> &str {
        &self.message
    }

    #[cfg(test)]
    /// Fields other than the subject and message.
    pub(crate) fn metadata(&self) -> &FieldMap {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        match name {
            SUBJECT_FIELD => Some(&self.subject),
            MESSAGE_FIELD => Some(&self.message),
            _ => self.fields.get(name).map(String::as_str),
        }
    }

    pub fn into_parts(self) -> (String, String, FieldMap) {
        (self.subject, self.message, self.fields)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Missing required fields in form data")]
pub struct ValidationError {
    pub required: Vec<String>,
    pub received: FieldMap,
}

pub struct Validator {
    required_fields: Vec<String>,
}

impl Validator {
    /// Requires `subject` and `message` plus any `extra_fields`.
    pub fn new<S: Into<String>>(extra_fields: impl IntoIterator<Item = S>) -> Self {
        let mut required_fields = vec![SUBJECT_FIELD.to_string(), MESSAGE_FIELD.to_string()];
        for field in extra_fields.into_iter().map(Into::into) {
            if !required_fields.contains(&field) {
                required_fields.push(field);
            }
        }
        Self { required_fields }
    }

    #[cfg(test)]
    pub(crate) fn required_fields(&self) -> &[String] {
        &self.required_fields
    }

    pub fn validate(&self, fields: FieldMap) -> Result<ContactInfo, ValidationError> {
        let is_present = |name: &String| fields.get(name).is_some_and(|value| !value.is_empty());
        if !self.required_fields.iter().all(is_present) {
            return Err(self.error(fields));
        }

        let mut remaining = fields.clone();
        remaining.retain(|_, value| !value.is_empty());
        let (Some(subject), Some(message)) = (
            remaining.remove(SUBJECT_FIELD),
            remaining.remove(MESSAGE_FIELD),
        ) else {
            return Err(self.error(fields));
        };
        Ok(ContactInfo {
            subject,
            message,
            fields: remaining,
        })
    }

    fn error(&self, received: FieldMap) -> ValidationError {
        ValidationError {
            required: self.required_fields.clone(),
            received,
        }
    }
}
