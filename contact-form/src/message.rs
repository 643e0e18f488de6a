use crate::validation::ContactInfo;
use std::borrow::Cow;

pub const DEFAULT_SEPARATOR: &str = "\n\n";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub subject: String,
    pub body: String,
}

/// Renders a submission as a notification: one `name: value` line per metadata field, sorted by
/// name, then the separator, then the message. Without metadata the body is just the message.
pub struct MessageFormatter {
    separator: Cow<'static, str>,
}

impl MessageFormatter {
    pub fn new(separator: impl Into<Cow<'static, str>>) -> Self {
        Self {
            separator: separator.into(),
        }
    }

    pub fn format(&self, info: ContactInfo) -> OutboundMessage {
        let (subject, message, metadata) = info.into_parts();
        if metadata.is_empty() {
            return OutboundMessage {
                subject,
                body: message,
            };
        }
        let metadata_block = metadata
            .iter()
            .map(|(name, value)| format!("{name}: {value}"))
            .collect::<Vec<_>>()
            .join("\n");
        OutboundMessage {
            subject,
            body: format!("{metadata_block}{}{message}", self.separator),
        }
    }
}

impl Default for MessageFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_SEPARATOR)
    }
}
