use crate::validation::ContactInfo;

/// Flags submissions which fill in a field that legitimate visitors never see.
pub struct SpamFilter {
    honeypot_fields: Vec<String>,
}

impl SpamFilter {
    pub fn new<S: Into<String>>(honeypot_fields: impl IntoIterator<Item = S>) -> Self {
        Self {
            honeypot_fields: honeypot_fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_spam(&self, info: &ContactInfo) -> bool {
        self.honeypot_fields
            .iter()
            .any(|field| info.get(field).is_some_and(|value| !value.is_empty()))
    }
}
