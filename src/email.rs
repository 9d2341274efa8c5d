//! `ses-send-raw-email`: build a text/plain message and send it with SES.

use crate::cancel::cancellable;
use crate::cli::{load_sdk_config, require, CommonArgs, ConfigError};
use crate::output::SendRawEmailView;
use crate::segment::SegmentTracer;
use crate::yaml::output_as_yaml;
use anyhow::Context;
use aws_sdk_ses::primitives::Blob;
use aws_sdk_ses::types::RawMessage;
use clap::Args;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::Message;
use opentelemetry::trace::Tracer;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, Default, Args)]
pub struct SendRawEmailArgs {
    /// /path/to/mail-body.txt
    #[arg(long)]
    pub body: Option<PathBuf>,

    /// From address
    #[arg(long)]
    pub from: Option<String>,

    /// To address (repeatable)
    #[arg(long)]
    pub to: Vec<String>,

    /// Cc address (repeatable)
    #[arg(long)]
    pub cc: Vec<String>,

    /// Bcc address (repeatable)
    #[arg(long)]
    pub bcc: Vec<String>,

    /// Subject
    #[arg(long)]
    pub subject: Option<String>,

    /// Message-ID; generated from the From domain when omitted
    #[arg(long)]
    pub message_id: Option<String>,

    /// SES configuration set
    #[arg(long)]
    pub configuration_set: Option<String>,
}

impl SendRawEmailArgs {
    /// Checks the required flags; returns the body path.
    pub fn validate(&self) -> Result<&Path, ConfigError> {
        let body_path = self
            .body
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or(ConfigError::Missing("body"))?;
        require(self.from.as_deref(), "from")?;
        Ok(body_path)
    }
}

/// A message ready to hand to SES.
#[derive(Debug, Clone)]
pub struct OutboundEmail {
    pub message: Message,
    /// Bare addresses of every To, Cc and Bcc recipient.
    pub destinations: Vec<String>,
    pub message_id: String,
}

impl OutboundEmail {
    /// RFC 5322 bytes, as sent.
    pub fn formatted(&self) -> Vec<u8> {
        self.message.formatted()
    }
}

/// Parses every address in `addresses`, failing on the first malformed one.
pub fn parse_addresses(field: &'static str, addresses: &[String]) -> Result<Vec<Mailbox>, ConfigError> {
    addresses
        .iter()
        .map(|address| {
            address
                .parse::<Mailbox>()
                .map_err(|source| ConfigError::InvalidAddress {
                    field,
                    address: address.clone(),
                    source,
                })
        })
        .collect()
}

/// `<{uuid}@{domain}>`
pub fn generate_message_id(domain: &str) -> String {
    format!("<{}@{}>", Uuid::new_v4(), domain)
}

/// Builds the outbound message from flags and the body text.
///
/// Bcc recipients go to the destination list only; lettre drops the Bcc
/// header when formatting.
pub fn build_email(args: &SendRawEmailArgs, body: String) -> Result<OutboundEmail, ConfigError> {
    let from_raw = require(args.from.as_deref(), "from")?;
    let from = from_raw
        .parse::<Mailbox>()
        .map_err(|source| ConfigError::InvalidAddress {
            field: "From",
            address: from_raw.to_owned(),
            source,
        })?;

    let to = parse_addresses("To", &args.to)?;
    let cc = parse_addresses("Cc", &args.cc)?;
    let bcc = parse_addresses("Bcc", &args.bcc)?;

    let message_id = match args.message_id.as_deref().filter(|id| !id.is_empty()) {
        Some(id) => id.to_owned(),
        None => generate_message_id(from.email.domain()),
    };

    let destinations = to
        .iter()
        .chain(&cc)
        .chain(&bcc)
        .map(|mailbox| mailbox.email.to_string())
        .collect();

    let mut builder = Message::builder()
        .from(from)
        .message_id(Some(message_id.clone()));
    if let Some(subject) = args.subject.as_deref().filter(|s| !s.is_empty()) {
        builder = builder.subject(subject);
    }
    for mailbox in to {
        builder = builder.to(mailbox);
    }
    for mailbox in cc {
        builder = builder.cc(mailbox);
    }
    for mailbox in bcc {
        builder = builder.bcc(mailbox);
    }
    let message = builder.header(ContentType::TEXT_PLAIN).body(body)?;

    Ok(OutboundEmail {
        message,
        destinations,
        message_id,
    })
}

/// Validates flags, reads the body file and builds the message.
pub fn prepare(args: &SendRawEmailArgs) -> anyhow::Result<OutboundEmail> {
    let body_path = args.validate()?;

    let body = std::fs::read_to_string(body_path)
        .with_context(|| format!("reading {}", body_path.display()))?;
    Ok(build_email(args, body)?)
}

/// Sends `email` inside a segment named `app` and prints the response.
pub async fn send<T, W>(
    client: &aws_sdk_ses::Client,
    email: &OutboundEmail,
    configuration_set: Option<&str>,
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
    let raw = RawMessage::builder()
        .data(Blob::new(email.formatted()))
        .build()
        .context("building raw message")?;

    let segment = tracer.begin_segment(app.to_owned());
    info!(
        trace_id = %segment.trace_id(),
        message_id = %email.message_id,
        destinations = email.destinations.len(),
        "sending raw email"
    );

    let result = async {
        let request = client
            .send_raw_email()
            .raw_message(raw)
            .set_destinations(Some(email.destinations.clone()))
            .set_configuration_set_name(configuration_set.filter(|s| !s.is_empty()).map(str::to_owned))
            .customize()
            .interceptor(segment.interceptor());
        let output = cancellable(token, request.send())
            .await
            .context("SendRawEmail")?;
        output_as_yaml(&SendRawEmailView::from(&output), out)
    }
    .await;

    segment.close(result.as_ref().err());
    result
}

/// The whole command: the message is built and previewed on stderr before
/// any AWS call is made.
pub async fn run<T>(
    args: &SendRawEmailArgs,
    common: &CommonArgs,
    app: &str,
    tracer: &SegmentTracer<T>,
    token: &CancellationToken,
) -> anyhow::Result<()>
where
    T: Tracer,
    T::Span: Send + Sync + 'static,
{
    let email = prepare(args)?;
    std::io::stderr()
        .write_all(&email.formatted())
        .context("writing message preview")?;

    let config = load_sdk_config(common).await;
    let client = aws_sdk_ses::Client::new(&config);
    send(
        &client,
        &email,
        args.configuration_set.as_deref(),
        tracer,
        app,
        token,
        std::io::stdout(),
    )
    .await
}
