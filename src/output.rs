//! Serializable views of SDK responses.
//!
//! The Rust SDK output types do not implement `Serialize`, so each command's
//! response is copied into one of these before being printed. Field names
//! follow the service API (`MessageId`, `MD5OfBody`, ...).

use aws_sdk_ses::operation::send_raw_email::SendRawEmailOutput;
use aws_sdk_sns::operation::publish::PublishOutput;
use aws_sdk_sqs::operation::receive_message::ReceiveMessageOutput;
use aws_sdk_sqs::primitives::Blob;
use aws_sdk_sqs::types::{Message, MessageAttributeValue};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResultMetadata {
    pub request_id: Option<String>,
}

impl ResultMetadata {
    fn of(output: &impl aws_sdk_sqs::operation::RequestId) -> Self {
        Self {
            request_id: output.request_id().map(str::to_owned),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SendRawEmailView {
    pub message_id: String,
    pub result_metadata: ResultMetadata,
}

impl From<&SendRawEmailOutput> for SendRawEmailView {
    fn from(output: &SendRawEmailOutput) -> Self {
        Self {
            message_id: output.message_id().to_owned(),
            result_metadata: ResultMetadata::of(output),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PublishView {
    pub message_id: Option<String>,
    pub sequence_number: Option<String>,
    pub result_metadata: ResultMetadata,
}

impl From<&PublishOutput> for PublishView {
    fn from(output: &PublishOutput) -> Self {
        Self {
            message_id: output.message_id().map(str::to_owned),
            sequence_number: output.sequence_number().map(str::to_owned),
            result_metadata: ResultMetadata::of(output),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReceiveMessageView {
    pub messages: Vec<MessageView>,
    pub result_metadata: ResultMetadata,
}

impl From<&ReceiveMessageOutput> for ReceiveMessageView {
    fn from(output: &ReceiveMessageOutput) -> Self {
        Self {
            messages: output.messages().iter().map(MessageView::from).collect(),
            result_metadata: ResultMetadata::of(output),
        }
    }
}

/// One received message.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct MessageView {
    pub attributes: Option<BTreeMap<String, String>>,
    pub body: Option<String>,
    #[serde(rename = "MD5OfBody")]
    pub md5_of_body: Option<String>,
    #[serde(rename = "MD5OfMessageAttributes")]
    pub md5_of_message_attributes: Option<String>,
    pub message_attributes: Option<BTreeMap<String, MessageAttributeView>>,
    pub message_id: Option<String>,
    pub receipt_handle: Option<String>,
}

impl From<&Message> for MessageView {
    fn from(message: &Message) -> Self {
        Self {
            attributes: message.attributes().map(|attrs| {
                attrs
                    .iter()
                    .map(|(name, value)| (name.as_str().to_owned(), value.clone()))
                    .collect()
            }),
            body: message.body().map(str::to_owned),
            md5_of_body: message.md5_of_body().map(str::to_owned),
            md5_of_message_attributes: message.md5_of_message_attributes().map(str::to_owned),
            message_attributes: message.message_attributes().map(|attrs| {
                attrs
                    .iter()
                    .map(|(name, value)| (name.clone(), MessageAttributeView::from(value)))
                    .collect()
            }),
            message_id: message.message_id().map(str::to_owned),
            receipt_handle: message.receipt_handle().map(str::to_owned),
        }
    }
}

/// A user message attribute. Binary values are rendered as base64.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct MessageAttributeView {
    pub binary_list_values: Vec<String>,
    pub binary_value: Option<String>,
    pub data_type: String,
    pub string_list_values: Vec<String>,
    pub string_value: Option<String>,
}

impl From<&MessageAttributeValue> for MessageAttributeView {
    fn from(value: &MessageAttributeValue) -> Self {
        Self {
            binary_list_values: value.binary_list_values().iter().map(encode_blob).collect(),
            binary_value: value.binary_value().map(encode_blob),
            data_type: value.data_type().to_owned(),
            string_list_values: value.string_list_values().to_vec(),
            string_value: value.string_value().map(str::to_owned),
        }
    }
}

fn encode_blob(blob: &Blob) -> String {
    use base64::{engine::general_purpose::STANDARD, Engine};
    STANDARD.encode(blob.as_ref())
}
