//! Response body decoding into [`RawRecord`]s.
//!
//! Two payload shapes are understood: a JSON array of string-valued objects,
//! and an XML property list whose root is an `<array>` of `<dict>` elements
//! holding `<key>`/`<string>` pairs. Anything else is a decode failure.

use std::mem;

use quick_xml::Reader;
use quick_xml::events::Event;
use serde::{Deserialize, Serialize};

use crate::LoadError;
use crate::flavor::RawRecord;

/// Wire format of a flavor list payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadFormat {
    /// Sniff from the first non-whitespace byte.
    #[default]
    Auto,
    Json,
    Plist,
}

impl PayloadFormat {
    /// Pick a format from an HTTP `Content-Type` value.
    pub fn from_content_type(content_type: &str) -> Self {
        let ct = content_type.to_ascii_lowercase();
        if ct.contains("json") {
            PayloadFormat::Json
        } else if ct.contains("xml") || ct.contains("plist") {
            PayloadFormat::Plist
        } else {
            PayloadFormat::Auto
        }
    }

    /// Pick a format from a file extension.
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "json" => PayloadFormat::Json,
            "plist" | "xml" => PayloadFormat::Plist,
            _ => PayloadFormat::Auto,
        }
    }
}

/// Decode a payload into raw records.
pub fn decode_records(body: &[u8], format: PayloadFormat) -> Result<Vec<RawRecord>, LoadError> {
    match format {
        PayloadFormat::Json => decode_json(body),
        PayloadFormat::Plist => decode_plist(body),
        PayloadFormat::Auto => match sniff(body) {
            Some(b'[') => decode_json(body),
            Some(b'<') => decode_plist(body),
            Some(other) => Err(LoadError::Decode(format!(
                "unrecognized payload starting with {:?}",
                other as char
            ))),
            None => Err(LoadError::Decode("empty payload".into())),
        },
    }
}

/// First significant byte, skipping a UTF-8 BOM and whitespace.
fn sniff(body: &[u8]) -> Option<u8> {
    let body = body.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(body);
    body.iter().copied().find(|b| !b.is_ascii_whitespace())
}

fn decode_json(body: &[u8]) -> Result<Vec<RawRecord>, LoadError> {
    serde_json::from_slice(body)
        .map_err(|e| LoadError::Decode(format!("expected a JSON array of string maps: {e}")))
}

/// Which text node we're currently reading.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Reading {
    Key,
    Value,
}

fn decode_plist(body: &[u8]) -> Result<Vec<RawRecord>, LoadError> {
    let mut xml = Reader::from_reader(body);
    xml.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut records = Vec::new();

    // State
    let mut in_array = false;
    let mut saw_array = false;
    let mut current: Option<RawRecord> = None;
    let mut pending_key: Option<String> = None;
    let mut reading: Option<Reading> = None;
    let mut text = String::new();

    let unexpected = |name: &[u8]| {
        LoadError::Decode(format!(
            "unexpected <{}> in flavor plist",
            String::from_utf8_lossy(name)
        ))
    };

    loop {
        match xml.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name = e.name();
                match name.as_ref() {
                    b"plist" if !saw_array => {}
                    b"array" if !saw_array => {
                        in_array = true;
                        saw_array = true;
                    }
                    b"dict" if in_array && current.is_none() => current = Some(RawRecord::new()),
                    b"key" if current.is_some() && pending_key.is_none() && reading.is_none() => {
                        reading = Some(Reading::Key);
                        text.clear();
                    }
                    b"string" if pending_key.is_some() && reading.is_none() => {
                        reading = Some(Reading::Value);
                        text.clear();
                    }
                    other => return Err(unexpected(other)),
                }
            }
            Ok(Event::Empty(ref e)) => {
                let name = e.name();
                match name.as_ref() {
                    b"array" if !saw_array => saw_array = true,
                    b"dict" if in_array && current.is_none() => records.push(RawRecord::new()),
                    b"key" if current.is_some() && pending_key.is_none() && reading.is_none() => {
                        pending_key = Some(String::new());
                    }
                    b"string" if reading.is_none() => {
                        if let (Some(record), Some(key)) = (current.as_mut(), pending_key.take()) {
                            record.insert(key, String::new());
                        } else {
                            return Err(unexpected(name.as_ref()));
                        }
                    }
                    other => return Err(unexpected(other)),
                }
            }
            Ok(Event::Text(e)) => {
                if reading.is_none() {
                    return Err(LoadError::Decode(
                        "unexpected text outside <key>/<string>".into(),
                    ));
                }
                let unescaped = e
                    .unescape()
                    .map_err(|e| LoadError::Decode(format!("bad XML text: {e}")))?;
                text.push_str(&unescaped);
            }
            Ok(Event::CData(e)) => {
                if reading.is_none() {
                    return Err(LoadError::Decode("unexpected CDATA".into()));
                }
                text.push_str(&String::from_utf8_lossy(&e));
            }
            Ok(Event::End(ref e)) => {
                let name = e.name();
                match name.as_ref() {
                    b"key" if reading == Some(Reading::Key) => {
                        pending_key = Some(mem::take(&mut text));
                        reading = None;
                    }
                    b"string" if reading == Some(Reading::Value) => {
                        if let (Some(record), Some(key)) = (current.as_mut(), pending_key.take()) {
                            record.insert(key, mem::take(&mut text));
                        }
                        reading = None;
                    }
                    b"dict" => {
                        if let Some(key) = pending_key.take() {
                            return Err(LoadError::Decode(format!(
                                "key {key:?} has no <string> value"
                            )));
                        }
                        if let Some(record) = current.take() {
                            records.push(record);
                        }
                    }
                    b"array" => in_array = false,
                    b"plist" => {}
                    other => return Err(unexpected(other)),
                }
            }
            Ok(Event::Eof) => break,
            // Declarations, doctype, comments, processing instructions
            Ok(_) => {}
            Err(e) => {
                return Err(LoadError::Decode(format!(
                    "XML error at position {}: {e}",
                    xml.buffer_position()
                )));
            }
        }
        buf.clear();
    }

    if !saw_array {
        return Err(LoadError::Decode("plist root is not an <array>".into()));
    }
    Ok(records)
}
