//! `sqs-subscribe`: long-poll a queue, print each receive, delete each message.

use crate::cancel::{cancellable, is_shutdown};
use crate::cli::{load_sdk_config, require, CommonArgs, ConfigError};
use crate::output::ReceiveMessageView;
use crate::segment::{Segment, SegmentTracer};
use crate::yaml::output_as_yaml;
use anyhow::Context as _;
use aws_sdk_sqs::operation::receive_message::ReceiveMessageOutput;
use aws_sdk_sqs::types::{Message, MessageSystemAttributeName};
use clap::Args;
use opentelemetry::trace::Tracer;
use opentelemetry::Context;
use opentelemetry_aws_xray::{SqsMessageSystemAttributesExtractor, TraceHeaderInterceptor};
use std::future::Future;
use std::io::Write;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Most messages a single receive may return.
pub const MAX_MESSAGES: i32 = 10;

#[derive(Debug, Clone, Args)]
pub struct SubscribeArgs {
    /// queue URL
    #[arg(long)]
    pub queue_url: Option<String>,

    /// Long-poll wait per receive, in seconds
    #[arg(long, default_value_t = 20, value_parser = clap::value_parser!(i32).range(0..=20))]
    pub wait_time_seconds: i32,

    /// Visibility timeout for received messages, in seconds; queue default when unset
    #[arg(long)]
    pub visibility_timeout: Option<i32>,
}

impl SubscribeArgs {
    /// The queue URL, or the configuration error for its absence.
    pub fn validate(&self) -> Result<&str, ConfigError> {
        require(self.queue_url.as_deref(), "queue-url")
    }
}

/// The two queue operations the poll loop needs.
///
/// `cx` is the trace context the call runs in; implementations propagate it
/// to the service.
pub trait MessageQueue {
    fn queue_url(&self) -> &str;

    fn receive(
        &self,
        cx: &Context,
        token: &CancellationToken,
    ) -> impl Future<Output = anyhow::Result<ReceiveMessageOutput>> + Send;

    fn delete(
        &self,
        receipt_handle: &str,
        cx: &Context,
        token: &CancellationToken,
    ) -> impl Future<Output = anyhow::Result<()>> + Send;
}

/// [`MessageQueue`] over the SQS API.
pub struct SqsQueue {
    client: aws_sdk_sqs::Client,
    queue_url: String,
    wait_time_seconds: i32,
    visibility_timeout: Option<i32>,
}

impl SqsQueue {
    pub fn new(client: aws_sdk_sqs::Client, queue_url: impl Into<String>, args: &SubscribeArgs) -> Self {
        Self {
            client,
            queue_url: queue_url.into(),
            wait_time_seconds: args.wait_time_seconds,
            visibility_timeout: args.visibility_timeout,
        }
    }
}

impl MessageQueue for SqsQueue {
    fn queue_url(&self) -> &str {
        &self.queue_url
    }

    async fn receive(&self, cx: &Context, token: &CancellationToken) -> anyhow::Result<ReceiveMessageOutput> {
        let request = self
            .client
            .receive_message()
            .queue_url(&self.queue_url)
            .max_number_of_messages(MAX_MESSAGES)
            .message_system_attribute_names(MessageSystemAttributeName::All)
            .message_attribute_names("All")
            .wait_time_seconds(self.wait_time_seconds)
            .set_visibility_timeout(self.visibility_timeout)
            .customize()
            .interceptor(TraceHeaderInterceptor::new(cx.clone()));
        cancellable(token, request.send()).await.context("ReceiveMessage")
    }

    async fn delete(&self, receipt_handle: &str, cx: &Context, token: &CancellationToken) -> anyhow::Result<()> {
        let request = self
            .client
            .delete_message()
            .queue_url(&self.queue_url)
            .receipt_handle(receipt_handle)
            .customize()
            .interceptor(TraceHeaderInterceptor::new(cx.clone()));
        cancellable(token, request.send()).await.context("DeleteMessage")?;
        Ok(())
    }
}

/// Receives, prints and acknowledges messages until cancelled.
pub struct Subscriber<Q, T> {
    queue: Q,
    tracer: SegmentTracer<T>,
    name: String,
}

impl<Q, T> Subscriber<Q, T>
where
    Q: MessageQueue,
    T: Tracer,
    T::Span: Send + Sync + 'static,
{
    /// `name` is the segment name for message handling; polling segments
    /// are named `{name}-polling`.
    pub fn new(queue: Q, tracer: SegmentTracer<T>, name: impl Into<String>) -> Self {
        Self {
            queue,
            tracer,
            name: name.into(),
        }
    }

    /// Polls until `token` is cancelled or a receive/delete fails.
    ///
    /// A cancellation observed while `token` itself is cancelled is a clean
    /// shutdown: the loop returns `Ok(())` and the polling segment is not
    /// marked as failed. Every other error is returned.
    pub async fn polling<W: Write>(&self, token: &CancellationToken, out: &mut W) -> anyhow::Result<()> {
        info!("polling messages from {}", self.queue.queue_url());

        loop {
            let segment = self.tracer.begin_segment(format!("{}-polling", self.name));
            match self.poll_once(&segment, token, out).await {
                Ok(()) => segment.close(None),
                Err(err) if is_shutdown(&err, token) => {
                    segment.close(None);
                    return Ok(());
                }
                Err(err) => {
                    segment.close(Some(&err));
                    return Err(err);
                }
            }
        }
    }

    async fn poll_once<W: Write>(
        &self,
        segment: &Segment,
        token: &CancellationToken,
        out: &mut W,
    ) -> anyhow::Result<()> {
        let output = self.queue.receive(segment.context(), token).await?;
        output_as_yaml(&ReceiveMessageView::from(&output), &mut *out)?;

        let messages = output.messages();
        info!(trace_id = %segment.trace_id(), "{} messages", messages.len());

        for msg in messages {
            self.on_message(segment, msg, token).await?;
        }
        Ok(())
    }

    /// Deletes one message.
    ///
    /// A message carrying `AWSTraceHeader` is handled in its own segment
    /// continuing the producer's trace; otherwise the delete runs in the
    /// polling segment.
    pub async fn on_message(
        &self,
        polling: &Segment,
        msg: &Message,
        token: &CancellationToken,
    ) -> anyhow::Result<()> {
        let message_id = msg
            .message_id()
            .filter(|id| !id.is_empty())
            .context("received message without a message id")?;
        let receipt_handle = msg
            .receipt_handle()
            .filter(|handle| !handle.is_empty())
            .with_context(|| format!("message {message_id} has no receipt handle"))?;

        let trace_header = msg
            .attributes()
            .and_then(|attrs| SqsMessageSystemAttributesExtractor(attrs).trace_header());

        let Some(trace_header) = trace_header else {
            info!(message_id, "delete {receipt_handle}");
            return self.queue.delete(receipt_handle, polling.context(), token).await;
        };

        let segment = self.tracer.segment_from_header(self.name.clone(), trace_header);
        info!(message_id, trace_id = %segment.trace_id(), "delete {receipt_handle}");
        let result = self.queue.delete(receipt_handle, segment.context(), token).await;
        segment.close(result.as_ref().err());
        result
    }
}

/// The whole command.
pub async fn run<T>(
    args: &SubscribeArgs,
    common: &CommonArgs,
    app: &str,
    tracer: SegmentTracer<T>,
    token: &CancellationToken,
) -> anyhow::Result<()>
where
    T: Tracer,
    T::Span: Send + Sync + 'static,
{
    let queue_url = args.validate()?;

    let config = load_sdk_config(common).await;
    let queue = SqsQueue::new(aws_sdk_sqs::Client::new(&config), queue_url, args);
    Subscriber::new(queue, tracer, app)
        .polling(token, &mut std::io::stdout())
        .await
}
