use lambda_http::{
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE,
        },
        HeaderMap, HeaderValue, StatusCode,
    },
    Body, Response,
};
use serde_json::{Map, Value};

pub const SUCCESS_MESSAGE: &str = "Message received";
pub const SERVER_ERROR_MESSAGE: &str = "Server Error";

const ALLOWED_HEADERS: &str = "Content-Type";
const ALLOWED_METHODS: &str = "GET,POST,OPTIONS";
const JSON_CONTENT_TYPE: &str = "application/json";

/// A JSON response body, which always carries a `message`.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseBody {
    message: String,
    extra: Map<String, Value>,
}

impl ResponseBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            extra: Map::new(),
        }
    }

    /// Adds a field next to `message`. The `message` key itself cannot be replaced.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn to_json(&self) -> Value {
        let mut object = self.extra.clone();
        object.insert("message".into(), Value::String(self.message.clone()));
        Value::Object(object)
    }
}

impl From<&str> for ResponseBody {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for ResponseBody {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

#[derive(Debug, Clone)]
pub struct ResponseEnvelope {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: ResponseBody,
}

impl ResponseEnvelope {
    pub fn into_response(self) -> Response<Body> {
        let mut response = Response::new(Body::Text(self.body.to_json().to_string()));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

impl From<ResponseEnvelope> for Response<Body> {
    fn from(envelope: ResponseEnvelope) -> Self {
        envelope.into_response()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResponseBuilder {
    allowed_origin: Option<HeaderValue>,
}

impl ResponseBuilder {
    pub fn new(allowed_origin: Option<HeaderValue>) -> Self {
        Self { allowed_origin }
    }

    pub fn build(&self, status: StatusCode, body: impl Into<ResponseBody>) -> ResponseEnvelope {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        if let Some(origin) = &self.allowed_origin {
            headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
            headers.insert(
                ACCESS_CONTROL_ALLOW_HEADERS,
                HeaderValue::from_static(ALLOWED_HEADERS),
            );
            headers.insert(
                ACCESS_CONTROL_ALLOW_METHODS,
                HeaderValue::from_static(ALLOWED_METHODS),
            );
        }
        ResponseEnvelope {
            status,
            headers,
            body: body.into(),
        }
    }

    pub fn success(&self) -> ResponseEnvelope {
        self.build(StatusCode::OK, SUCCESS_MESSAGE)
    }
}
