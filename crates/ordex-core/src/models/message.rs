//! Raw message model consumed by the extraction strategies.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::rules::dates::parse_header_date;

/// A raw vendor notification message.
///
/// Produced by the mailbox collaborator (or read from disk by the
/// CLI). The sender address is owned by that collaborator and is not
/// re-validated here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawMessage {
    /// Sender address, possibly with a display-name wrapper.
    pub sender: String,

    /// Subject line, used for subtype routing.
    pub subject: String,

    /// Parsed `Date:` header, the fallback purchase timestamp.
    pub date: Option<NaiveDateTime>,

    /// Raw (still encoded) message body.
    pub body: String,

    /// Attachment filename -> binary content.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attachments: BTreeMap<String, Vec<u8>>,
}

impl RawMessage {
    /// Create a message with the routing fields set.
    pub fn new(
        sender: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            sender: sender.into(),
            subject: subject.into(),
            date: None,
            body: body.into(),
            attachments: BTreeMap::new(),
        }
    }

    /// Set the date header.
    pub fn with_date(mut self, date: NaiveDateTime) -> Self {
        self.date = Some(date);
        self
    }

    /// Attach binary content under a filename.
    pub fn with_attachment(mut self, name: impl Into<String>, data: Vec<u8>) -> Self {
        self.attachments.insert(name.into(), data);
        self
    }

    /// Parse a stored message: a header block (`From:`, `Subject:`,
    /// `Date:`) up to the first blank line, then the body verbatim.
    ///
    /// Unknown headers are ignored; a message with no header block is
    /// treated as all body.
    pub fn parse(raw: &str) -> Self {
        let mut msg = RawMessage::default();
        let mut body_lines: Vec<&str> = Vec::new();
        let mut in_body = false;

        for line in raw.lines() {
            if in_body {
                body_lines.push(line);
                continue;
            }
            if line.trim().is_empty() {
                in_body = true;
                continue;
            }
            if let Some(value) = header_value(line, "From") {
                msg.sender = extract_address(value);
            } else if let Some(value) = header_value(line, "Subject") {
                msg.subject = value.trim().to_string();
            } else if let Some(value) = header_value(line, "Date") {
                msg.date = parse_header_date(value);
            } else if !line.contains(':') {
                // Not a header block after all; everything is body.
                body_lines.push(line);
                in_body = true;
            }
        }

        msg.body = body_lines.join("\n");
        msg
    }
}

fn header_value<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    let (key, value) = line.split_once(':')?;
    if key.trim().eq_ignore_ascii_case(name) {
        Some(value)
    } else {
        None
    }
}

/// Pull the bare address out of a `Name <addr>` header value.
fn extract_address(value: &str) -> String {
    let value = value.trim();
    match (value.find('<'), value.find('>')) {
        (Some(start), Some(end)) if start < end => value[start + 1..end].trim().to_string(),
        _ => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_parse_header_block() {
        let raw = "From: Amazon <shipment-tracking@amazon.ca>\n\
                   Subject: Your package has shipped\n\
                   Date: Tue, 07 May 2019 10:15:00 -0400\n\
                   \n\
                   Order #123-4567890-1234567\n\
                   body text";

        let msg = RawMessage::parse(raw);
        assert_eq!(msg.sender, "shipment-tracking@amazon.ca");
        assert_eq!(msg.subject, "Your package has shipped");
        assert_eq!(
            msg.date,
            NaiveDate::from_ymd_opt(2019, 5, 7).and_then(|d| d.and_hms_opt(10, 15, 0))
        );
        assert!(msg.body.contains("Order #123-4567890-1234567"));
    }

    #[test]
    fn test_parse_without_headers() {
        let msg = RawMessage::parse("just a body with no headers");
        assert!(msg.sender.is_empty());
        assert_eq!(msg.body, "just a body with no headers");
    }

    #[test]
    fn test_extract_bare_address() {
        assert_eq!(extract_address(" help@ebgames.ca "), "help@ebgames.ca");
        assert_eq!(extract_address("EB Games <help@ebgames.ca>"), "help@ebgames.ca");
    }
}
