//! Message data flowing from the mailbox into a scan batch.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use crate::indicators::IndicatorSet;
use crate::mailbox::{SeqNum, Uid};

/// A message as fetched from the server, before normalization.
#[derive(Debug, Clone)]
pub struct RawMessage {
    /// Sequence number in the folder selection it was fetched from.
    pub seq: SeqNum,
    /// Persistent UID, if the UID fetch succeeded.
    pub uid: Option<Uid>,
    /// Folder the message was found in.
    pub folder: String,
    /// Full RFC 822 content. Empty when the content fetch failed.
    pub bytes: Vec<u8>,
}

/// The normalized unit of triage: headers, bodies, indicators and the
/// ancillary features handed to the classifier.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRecord {
    pub uid: Option<Uid>,
    pub folder: String,

    pub message_id: String,
    pub date: Option<DateTime<FixedOffset>>,
    pub subject: String,
    pub sender: String,
    pub to: String,
    pub x_priority: String,
    pub x_virus_scanned: String,
    pub content_length: String,

    /// Preferred body: the HTML part when present, otherwise plain text.
    pub raw_body: String,
    /// Plain text part, or the visible text of the HTML part when there is none.
    pub body_text: String,
    /// Visible text of the HTML part; empty without one.
    pub body_html_stripped: String,
    pub content_encoding: String,

    pub indicators: IndicatorSet,

    pub attachment_count: usize,
    pub attachment_names: Vec<String>,
    pub byte_length: usize,
    pub is_html: bool,
    pub has_script: bool,
    pub has_css: bool,
    pub embedded_images: Vec<String>,

    /// The message could not be fetched or parsed; fields hold defaults.
    pub degraded: bool,
}

impl MessageRecord {
    /// A record carrying nothing but its origin, for messages whose content
    /// could not be retrieved.
    pub fn placeholder(uid: Option<Uid>, folder: &str) -> Self {
        Self {
            uid,
            folder: folder.to_string(),
            degraded: true,
            ..Default::default()
        }
    }

    /// Subject for display, never empty.
    pub fn display_subject(&self) -> &str {
        if self.subject.trim().is_empty() {
            "No subject"
        } else {
            &self.subject
        }
    }

    /// Sender for display, never empty.
    pub fn display_sender(&self) -> &str {
        if self.sender.trim().is_empty() {
            "unknown sender"
        } else {
            &self.sender
        }
    }
}
