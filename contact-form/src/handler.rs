use crate::{
    config::Config,
    error::ContactFormError,
    form_data::{FormDataExtractor, RawRequest},
    message::MessageFormatter,
    publisher::Publisher,
    response::{ResponseBody, ResponseBuilder, ResponseEnvelope},
    spam::SpamFilter,
    validation::Validator,
};
use futures_util::FutureExt;
use lambda_http::{http::StatusCode, Body, Error, Request, Response};
use serde_json::json;
use std::panic::AssertUnwindSafe;
use tracing::{info, warn};

pub const ECHO_MESSAGE: &str = "Form data received";

enum Submission {
    Delivered,
    Spam,
}

/// Validates a contact form submission and publishes it as a notification.
///
/// Every request is answered with an envelope; nothing is returned to the runtime as an error.
pub struct ContactFormHandler<PublisherT: Publisher> {
    extractor: FormDataExtractor,
    validator: Validator,
    spam_filter: SpamFilter,
    formatter: MessageFormatter,
    responses: ResponseBuilder,
    publisher: PublisherT,
}

impl<PublisherT: Publisher> ContactFormHandler<PublisherT> {
    pub fn new(config: &Config, publisher: PublisherT) -> Self {
        Self {
            extractor: FormDataExtractor::new(config.query_fallback),
            validator: Validator::new(config.required_fields.iter().cloned()),
            spam_filter: SpamFilter::new(config.honeypot_fields.iter().cloned()),
            formatter: MessageFormatter::default(),
            responses: ResponseBuilder::new(config.allowed_origin.clone()),
            publisher,
        }
    }

    pub async fn handle(&self, event: Request) -> Result<Response<Body>, Error> {
        Ok(self.respond(RawRequest::from_event(&event)).await.into_response())
    }

    pub async fn respond(&self, request: RawRequest) -> ResponseEnvelope {
        request.log_arrival();
        let outcome = AssertUnwindSafe(self.process_submission(&request))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(ContactFormError::from_panic(panic)));
        match outcome {
            Ok(Submission::Delivered) | Ok(Submission::Spam) => self.responses.success(),
            Err(error) => {
                error.log();
                error.into_envelope(&self.responses)
            }
        }
    }

    async fn process_submission(&self, request: &RawRequest) -> Result<Submission, ContactFormError> {
        let fields = self.extractor.extract(request).await?;
        let info = self.validator.validate(fields)?;
        if self.spam_filter.is_spam(&info) {
            // The submitter is told the message arrived.
            warn!(fields = ?info, "Detected spam, dropping submission");
            return Ok(Submission::Spam);
        }
        let message = self.formatter.format(info);
        self.publisher.publish(&message).await?;
        info!(subject = %message.subject, "Delivered contact form message");
        Ok(Submission::Delivered)
    }
}

/// Parses a submission and sends the fields straight back, without validating or publishing.
///
/// The fields are wrapped in the usual envelope as `{"message": "Form data received", "fields": {..}}`
/// rather than returned as a bare object, and CORS headers follow the configured origin.
pub struct EchoFormHandler {
    extractor: FormDataExtractor,
    responses: ResponseBuilder,
}

impl EchoFormHandler {
    pub fn new(config: &Config) -> Self {
        Self {
            extractor: FormDataExtractor::new(config.query_fallback),
            responses: ResponseBuilder::new(config.allowed_origin.clone()),
        }
    }

    pub async fn handle(&self, event: Request) -> Result<Response<Body>, Error> {
        Ok(self.respond(RawRequest::from_event(&event)).await.into_response())
    }

    pub async fn respond(&self, request: RawRequest) -> ResponseEnvelope {
        request.log_arrival();
        match self.extractor.extract(&request).await {
            Ok(fields) => self.responses.build(
                StatusCode::OK,
                ResponseBody::new(ECHO_MESSAGE).with("fields", json!(fields)),
            ),
            Err(error) => {
                let error = ContactFormError::from(error);
                error.log();
                error.into_envelope(&self.responses)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ContactFormHandler, EchoFormHandler};
    use crate::{
        config::{Config, QueryFallback},
        form_data::{QueryParameters, RawRequest},
        message::OutboundMessage,
        publisher::test_support::FakePublisher,
        response::ResponseEnvelope,
    };
    use googletest::prelude::*;
    use lambda_http::{
        http::{header::CONTENT_TYPE, HeaderMap, HeaderValue, Method},
        Body, Request, RequestExt,
    };
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use test_support::{
        forms::{
            multipart_body, MULTIPART_BODY, MULTIPART_CONTENT_TYPE, URLENCODED_BODY,
            URLENCODED_CONTENT_TYPE,
        },
        setup_logging,
    };

    const EXPECTED_BODY: &str =
        "email: jane@example.net\nname: Jane Doe\n\nI would like to inquire about your services.";

    fn handler(config: Config) -> ContactFormHandler<FakePublisher> {
        setup_logging();
        ContactFormHandler::new(&config, FakePublisher::default())
    }

    fn honeypot_config() -> Config {
        Config {
            honeypot_fields: vec!["honeypot".into()],
            ..Default::default()
        }
    }

    fn expected_message() -> OutboundMessage {
        OutboundMessage {
            subject: "Email Subject".into(),
            body: EXPECTED_BODY.into(),
        }
    }

    fn get(parameters: &[(&str, Option<&str>)]) -> RawRequest {
        RawRequest {
            method: Method::GET,
            headers: HeaderMap::new(),
            body: None,
            query: Some(query(parameters)),
        }
    }

    fn post(content_type: &'static str, body: &str) -> RawRequest {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        RawRequest {
            method: Method::POST,
            headers,
            body: Some(body.into()),
            query: None,
        }
    }

    fn query(parameters: &[(&str, Option<&str>)]) -> QueryParameters {
        parameters
            .iter()
            .map(|(name, value)| (name.to_string(), value.map(String::from)))
            .collect()
    }

    fn sample_query() -> Vec<(&'static str, Option<&'static str>)> {
        vec![
            ("name", Some("Jane Doe")),
            ("email", Some("jane@example.net")),
            ("subject", Some("Email Subject")),
            (
                "message",
                Some("I would like to inquire about your services."),
            ),
        ]
    }

    fn status_and_body(envelope: &ResponseEnvelope) -> (u16, Value) {
        (envelope.status.as_u16(), envelope.body.to_json())
    }

    #[googletest::test]
    #[tokio::test]
    async fn publishes_get_submission() {
        let subject = handler(Config::default());

        let envelope = subject.respond(get(&sample_query())).await;

        expect_that!(
            status_and_body(&envelope),
            eq((200, json!({"message": "Message received"})))
        );
        expect_that!(subject.publisher.published(), eq(vec![expected_message()]));
    }

    #[googletest::test]
    #[tokio::test]
    async fn publishes_multipart_submission() {
        let subject = handler(Config::default());

        let envelope = subject
            .respond(post(MULTIPART_CONTENT_TYPE, MULTIPART_BODY))
            .await;

        expect_that!(envelope.status.as_u16(), eq(200));
        expect_that!(subject.publisher.published(), eq(vec![expected_message()]));
    }

    #[googletest::test]
    #[tokio::test]
    async fn publishes_urlencoded_submission() {
        let subject = handler(Config::default());

        let envelope = subject
            .respond(post(URLENCODED_CONTENT_TYPE, URLENCODED_BODY))
            .await;

        expect_that!(envelope.status.as_u16(), eq(200));
        expect_that!(subject.publisher.published(), eq(vec![expected_message()]));
    }

    #[tokio::test]
    async fn publishes_message_alone_without_metadata() -> Result<()> {
        let subject = handler(Config::default());

        subject
            .respond(get(&[("subject", Some("Subj")), ("message", Some("Something"))]))
            .await;

        verify_that!(
            subject.publisher.published(),
            eq(vec![OutboundMessage {
                subject: "Subj".into(),
                body: "Something".into(),
            }])
        )
    }

    #[googletest::test]
    #[tokio::test]
    async fn silently_drops_spam() {
        let subject = handler(honeypot_config());
        let mut parameters = sample_query();
        parameters.push(("honeypot", Some("spam")));

        let envelope = subject.respond(get(&parameters)).await;

        expect_that!(
            status_and_body(&envelope),
            eq((200, json!({"message": "Message received"})))
        );
        expect_that!(subject.publisher.published(), empty());
    }

    #[googletest::test]
    #[tokio::test]
    async fn silently_drops_spam_in_multipart_body() {
        let subject = handler(honeypot_config());
        let body = multipart_body(&[
            ("subject", "Cheap pills"),
            ("message", "Buy now"),
            ("honeypot", "spam"),
        ]);

        let envelope = subject.respond(post(MULTIPART_CONTENT_TYPE, &body)).await;

        expect_that!(envelope.status.as_u16(), eq(200));
        expect_that!(subject.publisher.published(), empty());
    }

    #[tokio::test]
    async fn publishes_when_honeypot_is_empty() -> Result<()> {
        let subject = handler(honeypot_config());
        let mut parameters = sample_query();
        parameters.push(("honeypot", None));

        subject.respond(get(&parameters)).await;

        verify_that!(subject.publisher.published(), eq(vec![expected_message()]))
    }

    #[googletest::test]
    #[tokio::test]
    async fn rejects_post_without_body_or_query() {
        let subject = handler(Config::default());
        let request = RawRequest {
            body: None,
            ..post(URLENCODED_CONTENT_TYPE, "")
        };

        let envelope = subject.respond(request).await;

        expect_that!(
            status_and_body(&envelope),
            eq((400, json!({"message": "Missing form data"})))
        );
        expect_that!(subject.publisher.published(), empty());
    }

    #[googletest::test]
    #[tokio::test]
    async fn rejects_post_without_body_when_query_fallback_is_disabled() {
        let subject = handler(Config {
            query_fallback: QueryFallback::Disabled,
            ..Default::default()
        });
        let request = RawRequest {
            method: Method::POST,
            ..get(&sample_query())
        };

        let envelope = subject.respond(request).await;

        expect_that!(
            status_and_body(&envelope),
            eq((400, json!({"message": "Missing body"})))
        );
        expect_that!(subject.publisher.published(), empty());
    }

    #[tokio::test]
    async fn publishes_post_query_when_body_is_missing() -> Result<()> {
        let subject = handler(Config::default());
        let request = RawRequest {
            method: Method::POST,
            ..get(&sample_query())
        };

        subject.respond(request).await;

        verify_that!(subject.publisher.published(), eq(vec![expected_message()]))
    }

    #[googletest::test]
    #[tokio::test]
    async fn rejects_empty_message() {
        let subject = handler(Config::default());

        let envelope = subject
            .respond(post(URLENCODED_CONTENT_TYPE, "subject=Subj&message="))
            .await;

        expect_that!(
            status_and_body(&envelope),
            eq((
                400,
                json!({
                    "message": "Missing required fields in form data",
                    "required": ["subject", "message"],
                    "received": {"subject": "Subj", "message": ""},
                })
            ))
        );
        expect_that!(subject.publisher.published(), empty());
    }

    #[googletest::test]
    #[tokio::test]
    async fn enforces_configured_required_fields() {
        let subject = handler(Config {
            required_fields: vec!["email".into()],
            ..Default::default()
        });

        let envelope = subject
            .respond(get(&[("subject", Some("Subj")), ("message", Some("Something"))]))
            .await;

        expect_that!(envelope.status.as_u16(), eq(400));
        expect_that!(
            envelope.body.to_json()["required"].clone(),
            eq(json!(["subject", "message", "email"]))
        );
        expect_that!(subject.publisher.published(), empty());
    }

    #[tokio::test]
    async fn rejects_get_without_query() -> Result<()> {
        let subject = handler(Config::default());
        let request = RawRequest {
            query: None,
            ..get(&[])
        };

        verify_that!(
            status_and_body(&subject.respond(request).await),
            eq((400, json!({"message": "Missing query string parameters"})))
        )
    }

    #[tokio::test]
    async fn rejects_other_methods() -> Result<()> {
        let subject = handler(Config::default());
        let request = RawRequest {
            method: Method::PUT,
            ..post(URLENCODED_CONTENT_TYPE, URLENCODED_BODY)
        };

        verify_that!(
            status_and_body(&subject.respond(request).await),
            eq((400, json!({"message": "Bad request"})))
        )
    }

    #[tokio::test]
    async fn rejects_unsupported_content_type() -> Result<()> {
        let subject = handler(Config::default());

        verify_that!(
            status_and_body(&subject.respond(post("text/plain", "hello")).await),
            eq((400, json!({"message": "Unsupported content type: text/plain"})))
        )
    }

    #[tokio::test]
    async fn returns_server_error_when_publishing_fails() -> Result<()> {
        setup_logging();
        let subject = ContactFormHandler::new(&Config::default(), FakePublisher::failing());

        verify_that!(
            status_and_body(&subject.respond(get(&sample_query())).await),
            eq((500, json!({"message": "Server Error"})))
        )
    }

    #[googletest::test]
    #[tokio::test]
    async fn adds_cors_headers_to_errors_when_origin_is_configured() {
        let subject = handler(Config {
            allowed_origin: Some(HeaderValue::from_static("https://example.net")),
            ..Default::default()
        });

        let envelope = subject.respond(post("text/plain", "hello")).await;

        expect_that!(envelope.status.as_u16(), eq(400));
        expect_that!(
            envelope.headers.get("Access-Control-Allow-Origin"),
            some(eq("https://example.net"))
        );
    }

    #[googletest::test]
    #[tokio::test]
    async fn handles_lambda_request() {
        let subject = handler(Config::default());
        let mut event = Request::new(Body::Empty).with_query_string_parameters(HashMap::from([
            ("subject".to_string(), "Subj".to_string()),
            ("message".to_string(), "Something".to_string()),
        ]));
        *event.method_mut() = Method::GET;

        let response = subject.handle(event).await.unwrap();

        expect_that!(response.status().as_u16(), eq(200));
        expect_that!(
            response.body(),
            points_to(matches_pattern!(Body::Text(eq(
                "{\"message\":\"Message received\"}"
            ))))
        );
        expect_that!(
            subject.publisher.published(),
            eq(vec![OutboundMessage {
                subject: "Subj".into(),
                body: "Something".into(),
            }])
        );
    }

    #[googletest::test]
    #[tokio::test]
    async fn handles_lambda_request_without_form_data() {
        let subject = handler(Config::default());
        let mut event = Request::new(Body::Empty);
        *event.method_mut() = Method::POST;

        let response = subject.handle(event).await.unwrap();

        expect_that!(response.status().as_u16(), eq(400));
        expect_that!(
            response.body(),
            points_to(matches_pattern!(Body::Text(eq(
                "{\"message\":\"Missing form data\"}"
            ))))
        );
        expect_that!(subject.publisher.published(), empty());
    }

    #[tokio::test]
    async fn echoes_parsed_fields() -> Result<()> {
        let subject = EchoFormHandler::new(&Config::default());

        let envelope = subject
            .respond(post(MULTIPART_CONTENT_TYPE, MULTIPART_BODY))
            .await;

        verify_that!(
            status_and_body(&envelope),
            eq((
                200,
                json!({
                    "message": "Form data received",
                    "fields": {
                        "name": "Jane Doe",
                        "email": "jane@example.net",
                        "subject": "Email Subject",
                        "message": "I would like to inquire about your services.",
                    },
                })
            ))
        )
    }

    #[tokio::test]
    async fn echo_reports_missing_body() -> Result<()> {
        let subject = EchoFormHandler::new(&Config {
            query_fallback: QueryFallback::Disabled,
            ..Default::default()
        });
        let request = RawRequest {
            body: None,
            ..post(URLENCODED_CONTENT_TYPE, "")
        };

        verify_that!(
            status_and_body(&subject.respond(request).await),
            eq((400, json!({"message": "Missing body"})))
        )
    }
}
