//! Reader for the XML export produced by SMS backup apps:
//! `<smses><sms address=".." date=".." body=".." /></smses>`.

use momo_core::SmsRecord;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed XML at byte {position}: {source}")]
    Xml {
        position: u64,
        #[source]
        source: quick_xml::Error,
    },
}

/// A single `<sms>` element that could not be turned into a record.
/// `index` is the 1-based position of the element in the document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("sms #{index}: invalid date '{value}'")]
    InvalidDate { index: usize, value: String },
    #[error("sms #{index}: malformed attribute: {reason}")]
    MalformedAttribute { index: usize, reason: String },
}

#[derive(Debug, Default)]
pub struct ParsedBackup {
    pub records: Vec<SmsRecord>,
    pub rejected: Vec<RecordError>,
}

/// Parse a whole backup document. Only a broken document is an error;
/// bad individual elements land in [`ParsedBackup::rejected`].
pub fn parse_backup(xml: &str) -> Result<ParsedBackup, ImportError> {
    let mut reader = Reader::from_str(xml);
    let mut parsed = ParsedBackup::default();
    let mut index = 0usize;

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(source) => {
                return Err(ImportError::Xml {
                    position: reader.buffer_position() as u64,
                    source,
                })
            }
        };
        match event {
            Event::Start(e) | Event::Empty(e) if e.name().as_ref() == b"sms" => {
                index += 1;
                match read_sms(&e, index) {
                    Ok(record) => parsed.records.push(record),
                    Err(err) => parsed.rejected.push(err),
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(parsed)
}

fn read_sms(e: &BytesStart<'_>, index: usize) -> Result<SmsRecord, RecordError> {
    let malformed = |reason: String| RecordError::MalformedAttribute { index, reason };

    let mut address = String::new();
    let mut body = String::new();
    let mut date = None;

    for attr in e.attributes() {
        let attr = attr.map_err(|err| malformed(err.to_string()))?;
        let value = attr
            .unescape_value()
            .map_err(|err| malformed(err.to_string()))?;
        match attr.key.as_ref() {
            b"address" => address = value.into_owned(),
            b"body" => body = value.into_owned(),
            b"date" => date = Some(value.into_owned()),
            _ => {}
        }
    }

    // An absent date means the epoch; only unparseable values are rejected.
    let raw = date.unwrap_or_else(|| "0".to_string());
    let date_ms = raw
        .trim()
        .parse::<i64>()
        .map_err(|_| RecordError::InvalidDate { index, value: raw.clone() })?;

    Ok(SmsRecord { address, date_ms, body })
}
