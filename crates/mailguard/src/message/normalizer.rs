//! Turns fetched messages into [`MessageRecord`]s.

use chrono::DateTime;
use log::debug;
use mail_parser::{Message, MessageParser, MessagePart, MimeHeaders, PartType};

use crate::indicators::{
    collapse_whitespace, decode_mime_words, extract_indicators, extract_indicators_from_bytes,
    inspect, visible_text,
};

use super::record::{MessageRecord, RawMessage};

/// Normalizes raw messages. Never fails: unparsable input yields a degraded
/// record built from the raw bytes.
#[derive(Debug, Clone, Default)]
pub struct MessageNormalizer;

impl MessageNormalizer {
    pub fn new() -> Self {
        Self
    }

    pub fn normalize(&self, raw: &RawMessage) -> MessageRecord {
        if raw.bytes.is_empty() {
            return self.degraded(raw);
        }

        match MessageParser::default().parse(&raw.bytes) {
            Some(message) => self.from_parsed(raw, &message),
            None => {
                debug!(
                    "Could not parse message seq={} in '{}', using raw bytes",
                    raw.seq, raw.folder
                );
                self.degraded(raw)
            }
        }
    }

    fn from_parsed(&self, raw: &RawMessage, message: &Message) -> MessageRecord {
        let plain = first_body_part(message, |part| match &part.body {
            PartType::Text(text) => Some(text.as_ref()),
            _ => None,
        });
        let html = first_body_part(message, |part| match &part.body {
            PartType::Html(html) => Some(html.as_ref()),
            _ => None,
        });

        let plain_text = plain.map(|(_, text)| text.trim()).unwrap_or_default();
        let html_source = html.map(|(_, html)| html).unwrap_or_default();
        let body_html_stripped = if html_source.is_empty() {
            String::new()
        } else {
            visible_text(html_source)
        };

        let body_text = if plain_text.is_empty() {
            body_html_stripped.clone()
        } else {
            plain_text.to_string()
        };
        let raw_body = if html_source.is_empty() {
            plain_text.to_string()
        } else {
            html_source.to_string()
        };

        let indicators = extract_indicators(plain_text).union(&extract_indicators(html_source));
        let facts = inspect(html_source);

        let content_encoding = html
            .or(plain)
            .and_then(|(part, _)| part.content_transfer_encoding())
            .unwrap_or("NA")
            .to_string();

        let attachment_names: Vec<String> = message
            .attachments()
            .filter_map(|part| part.attachment_name().map(str::to_string))
            .collect();

        let record = MessageRecord {
            uid: raw.uid,
            folder: raw.folder.clone(),
            message_id: message
                .message_id()
                .map(|id| id.trim_matches(|c| c == '<' || c == '>').to_string())
                .unwrap_or_default(),
            date: message
                .date()
                .and_then(|d| DateTime::parse_from_rfc3339(&d.to_rfc3339()).ok()),
            subject: message.subject().map(decode_mime_words).unwrap_or_default(),
            sender: message
                .from()
                .and_then(|addr| addr.first().map(format_address))
                .unwrap_or_default(),
            to: message
                .to()
                .and_then(|addr| addr.first().map(format_address))
                .unwrap_or_default(),
            x_priority: header_text(message, "X-Priority"),
            x_virus_scanned: header_text(message, "X-Virus-Scanned"),
            content_length: header_text(message, "Content-Length"),
            raw_body,
            body_text,
            body_html_stripped,
            content_encoding,
            indicators,
            attachment_count: message.attachment_count(),
            attachment_names,
            byte_length: raw.bytes.len(),
            is_html: facts.is_html,
            has_script: facts.has_script,
            has_css: facts.has_css,
            embedded_images: facts.embedded_images,
            degraded: false,
        };

        debug!(
            "Normalized UID={:?} subject={:?}: {} urls, {} ips, {} attachments",
            record.uid,
            record.subject,
            record.indicators.urls().len(),
            record.indicators.ips().len(),
            record.attachment_count
        );
        record
    }

    fn degraded(&self, raw: &RawMessage) -> MessageRecord {
        let text = String::from_utf8_lossy(&raw.bytes);
        MessageRecord {
            body_text: collapse_whitespace(&text),
            raw_body: text.into_owned(),
            indicators: extract_indicators_from_bytes(&raw.bytes),
            byte_length: raw.bytes.len(),
            ..MessageRecord::placeholder(raw.uid, &raw.folder)
        }
    }
}

/// Finds the first non-attachment part accepted by `select`.
fn first_body_part<'m, F>(
    message: &'m Message<'m>,
    select: F,
) -> Option<(&'m MessagePart<'m>, &'m str)>
where
    F: Fn(&'m MessagePart<'m>) -> Option<&'m str>,
{
    message
        .parts
        .iter()
        .filter(|part| !is_attachment(part))
        .find_map(|part| select(part).map(|body| (part, body)))
}

fn is_attachment(part: &MessagePart) -> bool {
    part.content_disposition()
        .is_some_and(|disposition| disposition.ctype().eq_ignore_ascii_case("attachment"))
}

fn header_text(message: &Message, name: &'static str) -> String {
    message
        .header_raw(name)
        .map(|value| collapse_whitespace(value))
        .unwrap_or_default()
}

/// Formats an email address for display.
/// If the address has a display name, formats as "Name <email@example.com>".
/// Otherwise, returns just the email address.
fn format_address(addr: &mail_parser::Addr) -> String {
    if let Some(name) = addr.name() {
        format!("{} <{}>", name, addr.address().unwrap_or_default())
    } else {
        addr.address().unwrap_or_default().to_string()
    }
}
