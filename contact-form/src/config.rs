use lambda_http::http::HeaderValue;
use thiserror::Error;

const ALLOWED_ORIGIN_VARIABLES: [&str; 2] = ["ALLOWED_ORIGIN", "ALLOW_ORIGIN"];
const REQUIRED_FIELDS_VARIABLE: &str = "REQUIRED_FIELDS";
const HONEYPOT_FIELDS_VARIABLE: &str = "HONEYPOT_FIELDS";
const TOPIC_ARN_VARIABLE: &str = "SNS_TOPIC_ARN";
const QUERY_FALLBACK_VARIABLE: &str = "POST_QUERY_FALLBACK";

/// Whether a POST without a body may be answered from its query string instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryFallback {
    #[default]
    Enabled,
    Disabled,
}

/// Operator settings, read once at cold start and handed to each component.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub allowed_origin: Option<HeaderValue>,
    pub required_fields: Vec<String>,
    pub honeypot_fields: Vec<String>,
    pub topic_arn: Option<String>,
    pub query_fallback: QueryFallback,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{variable} is not a valid header value: {value:?}")]
    InvalidOrigin {
        variable: &'static str,
        value: String,
    },
    #[error("{variable} must be true or false, got {value:?}")]
    InvalidFlag {
        variable: &'static str,
        value: String,
    },
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        // Unset and empty variables are treated the same.
        let lookup = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let allowed_origin = ALLOWED_ORIGIN_VARIABLES
            .into_iter()
            .find_map(|variable| lookup(variable).map(|value| (variable, value)))
            .map(|(variable, value)| {
                HeaderValue::from_str(&value)
                    .map_err(|_| ConfigError::InvalidOrigin { variable, value })
            })
            .transpose()?;

        let query_fallback = match lookup(QUERY_FALLBACK_VARIABLE) {
            None => QueryFallback::default(),
            Some(value) => parse_query_fallback(value)?,
        };

        Ok(Self {
            allowed_origin,
            required_fields: lookup(REQUIRED_FIELDS_VARIABLE)
                .map(|value| split_list(&value))
                .unwrap_or_default(),
            honeypot_fields: lookup(HONEYPOT_FIELDS_VARIABLE)
                .map(|value| split_list(&value))
                .unwrap_or_default(),
            topic_arn: lookup(TOPIC_ARN_VARIABLE),
            query_fallback,
        })
    }
}

fn parse_query_fallback(value: String) -> Result<QueryFallback, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(QueryFallback::Enabled),
        "false" | "0" | "no" | "off" => Ok(QueryFallback::Disabled),
        _ => Err(ConfigError::InvalidFlag {
            variable: QUERY_FALLBACK_VARIABLE,
            value,
        }),
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}
