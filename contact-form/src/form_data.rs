//! Extraction of submitted form fields from query strings and encoded bodies.

use crate::config::QueryFallback;
use futures_util::{future, stream};
use lambda_http::{
    http::{header::CONTENT_TYPE, HeaderMap, Method},
    Body, Request, RequestExt,
};
use mime::Mime;
use multer::Multipart;
use std::{
    collections::{BTreeMap, HashMap},
    convert::Infallible,
};
use thiserror::Error;
use tracing::info;

/// Submitted fields by name. Ordered so that rendering is deterministic.
pub type FieldMap = BTreeMap<String, String>;

/// Query string parameters as delivered by the gateway, where a value may be absent.
pub type QueryParameters = HashMap<String, Option<String>>;

/// The parts of an invocation the form pipeline looks at.
#[derive(Debug, Clone)]
pub struct RawRequest {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<String>,
    pub query: Option<QueryParameters>,
}

impl RawRequest {
    pub fn from_event(event: &Request) -> Self {
        let body = match event.body() {
            Body::Empty => None,
            Body::Text(text) => Some(text.clone()),
            Body::Binary(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
        }
        .filter(|body| !body.is_empty());
        // The gateway reports a missing query string as null, which arrives here as an empty map.
        let query: QueryParameters = event
            .query_string_parameters()
            .iter()
            .map(|(name, value)| (name.to_string(), Some(value.to_string())))
            .collect();
        Self {
            method: event.method().clone(),
            headers: event.headers().clone(),
            body,
            query: (!query.is_empty()).then_some(query),
        }
    }

    pub(crate) fn log_arrival(&self) {
        info!(
            method = %self.method,
            content_type = ?self.headers.get(CONTENT_TYPE),
            has_body = self.body.is_some(),
            has_query = self.query.is_some(),
            "Received form submission"
        );
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Missing Content-Type")]
    MissingContentType,
    #[error("Unsupported content type: {0}")]
    UnsupportedContentType(String),
    #[error("Malformed multipart body: {0}")]
    Multipart(String),
}

impl ParseError {
    fn multipart(error: multer::Error) -> Self {
        ParseError::Multipart(error.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormDataError {
    #[error("Missing query string parameters")]
    MissingQuery,
    #[error("Missing form data")]
    MissingFormData,
    #[error("Missing body")]
    MissingBody,
    #[error("{0}")]
    Parse(#[from] ParseError),
    #[error("Bad request")]
    UnsupportedMethod(Method),
}

/// Decodes a `multipart/form-data` or `application/x-www-form-urlencoded` body.
///
/// When a field name repeats, the last occurrence wins.
pub async fn parse_form_body(body: &str, headers: &HeaderMap) -> Result<FieldMap, ParseError> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .ok_or(ParseError::MissingContentType)?
        .to_str()
        .map_err(|_| ParseError::UnsupportedContentType("(not ASCII)".into()))?;
    let mime: Mime = content_type
        .parse()
        .map_err(|_| ParseError::UnsupportedContentType(content_type.into()))?;

    if mime.type_() == mime::MULTIPART && mime.subtype() == mime::FORM_DATA {
        parse_multipart(body, content_type).await
    } else if mime.type_() == mime::APPLICATION && mime.subtype() == mime::WWW_FORM_URLENCODED {
        Ok(parse_urlencoded(body))
    } else {
        Err(ParseError::UnsupportedContentType(
            mime.essence_str().into(),
        ))
    }
}

async fn parse_multipart(body: &str, content_type: &str) -> Result<FieldMap, ParseError> {
    let boundary = multer::parse_boundary(content_type).map_err(ParseError::multipart)?;
    let stream = stream::once(future::ready(Ok::<_, Infallible>(body.to_owned())));
    let mut multipart = Multipart::new(stream, boundary);

    let mut fields = FieldMap::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(ParseError::multipart)?
    {
        // File uploads are not form fields.
        if field.file_name().is_some() {
            continue;
        }
        let Some(name) = field.name().map(String::from) else {
            continue;
        };
        let value = field.text().await.map_err(ParseError::multipart)?;
        fields.insert(name, value);
    }
    Ok(fields)
}

fn parse_urlencoded(body: &str) -> FieldMap {
    url::form_urlencoded::parse(body.as_bytes())
        .into_owned()
        .collect()
}

/// Replaces absent query values with the empty string.
pub fn normalize_query(parameters: &QueryParameters) -> FieldMap {
    parameters
        .iter()
        .map(|(name, value)| (name.clone(), value.clone().unwrap_or_default()))
        .collect()
}

pub struct FormDataExtractor {
    query_fallback: QueryFallback,
}

impl FormDataExtractor {
    pub fn new(query_fallback: QueryFallback) -> Self {
        Self { query_fallback }
    }

    pub async fn extract(&self, request: &RawRequest) -> Result<FieldMap, FormDataError> {
        match request.method {
            Method::GET => request
                .query
                .as_ref()
                .map(normalize_query)
                .ok_or(FormDataError::MissingQuery),
            Method::POST => match (&request.body, &request.query, self.query_fallback) {
                (Some(body), _, _) => Ok(parse_form_body(body, &request.headers).await?),
                (None, Some(query), QueryFallback::Enabled) => Ok(normalize_query(query)),
                (None, None, QueryFallback::Enabled) => Err(FormDataError::MissingFormData),
                (None, _, QueryFallback::Disabled) => Err(FormDataError::MissingBody),
            },
            _ => Err(FormDataError::UnsupportedMethod(request.method.clone())),
        }
    }
}
