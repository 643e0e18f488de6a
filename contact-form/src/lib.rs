//! Serverless handlers which accept contact form submissions, filter out spam and publish the
//! result as a notification.

pub mod config;
pub mod error;
pub mod form_data;
pub mod handler;
pub mod message;
pub mod publisher;
pub mod response;
pub mod spam;
pub mod validation;

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .without_time()
        .init();
}
