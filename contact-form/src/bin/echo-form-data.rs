use anyhow::Context;
use contact_form::{config::Config, handler::EchoFormHandler, init_tracing};
use lambda_http::{run, service_fn, Error};

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();

    let config = Config::from_env().context("Invalid configuration")?;
    let handler = EchoFormHandler::new(&config);
    run(service_fn(|event| handler.handle(event))).await
}
