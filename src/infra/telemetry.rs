use std::sync::Once;

use metrics::{Unit, describe_counter};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

pub const CONTACT_SUBMISSIONS_TOTAL: &str = "yalors_contact_submissions_total";
pub const CONTACT_DELIVERY_FAILURES_TOTAL: &str = "yalors_contact_delivery_failures_total";
pub const CHAT_PROXY_FAILURES_TOTAL: &str = "yalors_chat_proxy_failures_total";

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            CONTACT_SUBMISSIONS_TOTAL,
            Unit::Count,
            "Total number of accepted contact form submissions."
        );
        describe_counter!(
            CONTACT_DELIVERY_FAILURES_TOTAL,
            Unit::Count,
            "Contact submissions whose email or log write failed, labelled by sink."
        );
        describe_counter!(
            CHAT_PROXY_FAILURES_TOTAL,
            Unit::Count,
            "Chat messages that could not be relayed to the workflow webhook."
        );
    });
}
