use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Form, Router,
};
use log::debug;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};
use tokio::net::TcpListener;

pub const FAKE_TOPIC_ARN: &str = "arn:aws:sns:eu-north-1:000000000000:contact-form";
const FAKE_REQUEST_ID: &str = "f0b8e5a4-1c57-4a1e-9d0b-000000000000";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublishedMessage {
    pub topic_arn: String,
    pub subject: Option<String>,
    pub message: String,
}

/// Answers SNS `Publish` calls made over the query protocol and remembers what was published.
#[derive(Clone, Default)]
pub struct FakeSns {
    published: Arc<Mutex<Vec<PublishedMessage>>>,
    reject_publish: bool,
}

impl FakeSns {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reject_publish(self) -> Self {
        Self {
            reject_publish: true,
            ..self
        }
    }

    /// Starts serving on an ephemeral local port and returns the endpoint URL.
    pub async fn serve(&self) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let app = Router::new()
            .route("/", post(handle_action))
            .with_state(self.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{address}")
    }

    pub fn published(&self) -> Vec<PublishedMessage> {
        self.published.lock().unwrap().clone()
    }

    /// Points the AWS SDK at `endpoint_url` with static test credentials.
    pub fn setup_environment(endpoint_url: &str) {
        std::env::set_var("AWS_ENDPOINT_URL", endpoint_url);
        std::env::set_var("AWS_REGION", "eu-north-1");
        std::env::set_var("AWS_ACCESS_KEY_ID", "AKIDFAKEACCESSKEY");
        std::env::set_var("AWS_SECRET_ACCESS_KEY", "fake-secret-key");
    }
}

async fn handle_action(
    State(state): State<FakeSns>,
    Form(params): Form<HashMap<String, String>>,
) -> Response {
    debug!("Got SNS request {params:?}");
    if params.get("Action").map(String::as_str) != Some("Publish") {
        return error_response(StatusCode::BAD_REQUEST, "InvalidAction", "Unsupported action");
    }
    if state.reject_publish {
        return error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "InternalError",
            "Publishing is disabled",
        );
    }
    let (Some(topic_arn), Some(message)) = (params.get("TopicArn"), params.get("Message")) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "InvalidParameter",
            "TopicArn and Message are required",
        );
    };
    let mut published = state.published.lock().unwrap();
    published.push(PublishedMessage {
        topic_arn: topic_arn.clone(),
        subject: params.get("Subject").cloned(),
        message: message.clone(),
    });
    let message_id = format!("00000000-0000-0000-0000-{:012}", published.len());
    drop(published);

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/xml")],
        format!(
            r#"<PublishResponse xmlns="http://sns.amazonaws.com/doc/2010-03-31/">
  <PublishResult>
    <MessageId>{message_id}</MessageId>
  </PublishResult>
  <ResponseMetadata>
    <RequestId>{FAKE_REQUEST_ID}</RequestId>
  </ResponseMetadata>
</PublishResponse>"#
        ),
    )
        .into_response()
}

fn error_response(status: StatusCode, code: &str, message: &str) -> Response {
    let error_type = if status.is_client_error() {
        "Sender"
    } else {
        "Receiver"
    };
    (
        status,
        [(header::CONTENT_TYPE, "text/xml")],
        format!(
            r#"<ErrorResponse xmlns="http://sns.amazonaws.com/doc/2010-03-31/">
  <Error>
    <Type>{error_type}</Type>
    <Code>{code}</Code>
    <Message>{message}</Message>
  </Error>
  <RequestId>{FAKE_REQUEST_ID}</RequestId>
</ErrorResponse>"#
        ),
    )
        .into_response()
}
