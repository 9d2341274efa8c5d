//! `sns-publish`: publish one message to an SNS topic.

use crate::cancel::cancellable;
use crate::cli::{load_sdk_config, require, CommonArgs, ConfigError};
use crate::output::PublishView;
use crate::segment::SegmentTracer;
use crate::yaml::output_as_yaml;
use anyhow::Context;
use aws_sdk_sns::operation::publish::builders::PublishFluentBuilder;
use clap::Args;
use opentelemetry::trace::Tracer;
use std::io::Write;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[derive(Debug, Clone, Default, Args)]
pub struct PublishArgs {
    /// topic arn
    #[arg(long)]
    pub topic: Option<String>,

    /// message to publish
    #[arg(long)]
    pub message: Option<String>,

    /// Subject, used when the message is delivered as email
    #[arg(long)]
    pub subject: Option<String>,
}

impl PublishArgs {
    /// The topic ARN, or the configuration error for its absence.
    pub fn topic(&self) -> Result<&str, ConfigError> {
        require(self.topic.as_deref(), "topic")
    }

    /// Checks the required flags.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.topic().map(|_| ())
    }

    /// Fills in the request fields from the flags.
    pub fn apply(&self, topic: &str, request: PublishFluentBuilder) -> PublishFluentBuilder {
        request
            .topic_arn(topic)
            .set_message(self.message.clone())
            .set_subject(self.subject.clone().filter(|s| !s.is_empty()))
    }
}

/// Publishes inside a segment named `app` and prints the response.
pub async fn publish<T, W>(
    client: &aws_sdk_sns::Client,
    args: &PublishArgs,
    tracer: &SegmentTracer<T>,
    app: &str,
    token: &CancellationToken,
    out: W,
) -> anyhow::Result<()>
where
    T: Tracer,
    T::Span: Send + Sync + 'static,
    W: Write,
{
    let topic = args.topic()?;

    let segment = tracer.begin_segment(app.to_owned());
    info!(trace_id = %segment.trace_id(), topic, "publishing message");

    let result = async {
        let request = args
            .apply(topic, client.publish())
            .customize()
            .interceptor(segment.interceptor());
        let output = cancellable(token, request.send()).await.context("Publish")?;
        output_as_yaml(&PublishView::from(&output), out)
    }
    .await;

    segment.close(result.as_ref().err());
    result
}

/// The whole command.
pub async fn run<T>(
    args: &PublishArgs,
    common: &CommonArgs,
    app: &str,
    tracer: &SegmentTracer<T>,
    token: &CancellationToken,
) -> anyhow::Result<()>
where
    T: Tracer,
    T::Span: Send + Sync + 'static,
{
    args.validate()?;

    let config = load_sdk_config(common).await;
    let client = aws_sdk_sns::Client::new(&config);
    publish(&client, args, tracer, app, token, std::io::stdout()).await
}
