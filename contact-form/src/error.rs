use crate::{
    form_data::FormDataError,
    publisher::PublishError,
    response::{ResponseBody, ResponseBuilder, ResponseEnvelope, SERVER_ERROR_MESSAGE},
    validation::ValidationError,
};
use lambda_http::http::StatusCode;
use serde_json::json;
use std::any::Any;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ContactFormError {
    #[error(transparent)]
    FormData(#[from] FormDataError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Publish(#[from] PublishError),
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl ContactFormError {
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let description = if let Some(message) = payload.downcast_ref::<&str>() {
            message.to_string()
        } else if let Some(message) = payload.downcast_ref::<String>() {
            message.clone()
        } else {
            "(panic without message)".into()
        };
        ContactFormError::Unknown(description)
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ContactFormError::FormData(_) | ContactFormError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            ContactFormError::Publish(_) | ContactFormError::Unknown(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn log(&self) {
        match self {
            ContactFormError::FormData(error) => {
                error!("Client error processing contact form: {error}");
            }
            ContactFormError::Validation(ValidationError { required, received }) => {
                error!(?required, ?received, "Client error processing contact form: {}", self);
            }
            ContactFormError::Publish(error) => {
                error!("Internal error processing contact form: {error}");
            }
            ContactFormError::Unknown(description) => {
                error!("Internal error processing contact form: {description}");
            }
        }
    }

    /// Client faults describe themselves. Internal failures only ever say "Server Error".
    pub fn into_envelope(self, responses: &ResponseBuilder) -> ResponseEnvelope {
        let status = self.status();
        match self {
            ContactFormError::FormData(error) => responses.build(status, error.to_string()),
            ContactFormError::Validation(error) => {
                let body = ResponseBody::new(error.to_string())
                    .with("required", json!(error.required))
                    .with("received", json!(error.received));
                responses.build(status, body)
            }
            ContactFormError::Publish(_) | ContactFormError::Unknown(_) => {
                responses.build(status, SERVER_ERROR_MESSAGE)
            }
        }
    }
}
