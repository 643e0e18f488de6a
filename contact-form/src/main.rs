use anyhow::Context;
use contact_form::{
    config::Config, handler::ContactFormHandler, init_tracing, publisher::SnsPublisher,
};
use lambda_http::{run, service_fn, Error};

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();

    let config = Config::from_env().context("Invalid configuration")?;
    let topic_arn = config
        .topic_arn
        .clone()
        .context("SNS_TOPIC_ARN must be set")?;
    let handler = ContactFormHandler::new(&config, SnsPublisher::new(topic_arn));
    run(service_fn(|event| handler.handle(event))).await
}
