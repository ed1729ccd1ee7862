//! CFDI 4.0 document parsing.
//!
//! Extracts the handful of attributes the spreadsheet needs from one
//! invoice document. Documents come from many different invoicing systems
//! and pre-stamping drafts may lack the fiscal stamp entirely, so any
//! failure collapses to the uniform [`ParseOutcome::Unparsable`] marker
//! instead of aborting the batch.

use std::borrow::Cow;
use std::path::Path;

use chrono::NaiveDateTime;
use quick_xml::NsReader;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use thiserror::Error;

use crate::diagnostics::DiagnosticLog;
use crate::record::{InvoiceFields, ParseOutcome};

/// Main CFDI 4.0 namespace carrying the invoice body.
pub const CFDI_NAMESPACE: &str = "http://www.sat.gob.mx/cfd/4";

/// Namespace of the tax authority's digital stamp.
pub const STAMP_NAMESPACE: &str = "http://www.sat.gob.mx/TimbreFiscalDigital";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const DISPLAY_DATE_FORMAT: &str = "%d/%m/%Y";

/// Reasons a document fails to parse into [`InvoiceFields`].
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid XML: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("missing element {0}")]
    MissingElement(&'static str),
    #[error("missing attribute {0}")]
    MissingAttribute(&'static str),
    #[error("invalid timestamp '{0}'")]
    InvalidTimestamp(String),
}

/// Parse one CFDI document into its five extracted fields.
///
/// Reads `Fecha` and `Total` from the root element, `Nombre` and `Rfc`
/// from the `Emisor` child, and `UUID` from the `TimbreFiscalDigital`
/// stamp anywhere in the subtree.
///
/// # Errors
/// Returns a [`ParseError`] for malformed XML, a missing element or
/// attribute, or a timestamp that does not match `YYYY-MM-DDTHH:MM:SS`.
pub fn parse_invoice(path: &Path) -> Result<InvoiceFields, ParseError> {
    let mut reader = NsReader::from_file(path)?;
    let mut buf = Vec::new();
    let mut raw = RawFields::default();
    let mut depth = 0_usize;

    loop {
        match reader.read_resolved_event_into(&mut buf)? {
            (ns, Event::Start(element)) => {
                raw.visit(&ns, &element, depth);
                depth += 1;
            }
            (ns, Event::Empty(element)) => raw.visit(&ns, &element, depth),
            (_, Event::End(_)) => depth = depth.saturating_sub(1),
            (_, Event::Eof) => break,
            _ => {}
        }
        buf.clear();
    }

    raw.into_fields()
}

/// Parse one document, collapsing any failure to the uniform marker after
/// recording it in the diagnostic log with the offending file path.
pub fn parse_or_marker(path: &Path, log: &mut dyn DiagnosticLog) -> ParseOutcome {
    match parse_invoice(path) {
        Ok(fields) => ParseOutcome::Parsed(fields),
        Err(error) => {
            log.record(path, &error.to_string());
            ParseOutcome::Unparsable
        }
    }
}

/// Attribute values collected while streaming through one document.
#[derive(Debug, Default)]
struct RawFields {
    fecha: Option<String>,
    total: Option<String>,
    issuer_name: Option<String>,
    issuer_tax_id: Option<String>,
    stamp_uuid: Option<String>,
    saw_root: bool,
    saw_issuer: bool,
    saw_stamp: bool,
}

impl RawFields {
    fn visit(&mut self, ns: &ResolveResult, element: &BytesStart, depth: usize) {
        if depth == 0 {
            self.saw_root = true;
            for attr in element.attributes().flatten() {
                match attr.key.as_ref() {
                    b"Fecha" => self.fecha = Some(attr_value(&attr)),
                    b"Total" => self.total = Some(attr_value(&attr)),
                    _ => {}
                }
            }
        } else if depth == 1 && is_ns(ns, CFDI_NAMESPACE) && element.local_name().as_ref() == b"Emisor" {
            self.saw_issuer = true;
            for attr in element.attributes().flatten() {
                match attr.key.as_ref() {
                    b"Nombre" => self.issuer_name = Some(attr_value(&attr)),
                    b"Rfc" => self.issuer_tax_id = Some(attr_value(&attr)),
                    _ => {}
                }
            }
        } else if is_ns(ns, STAMP_NAMESPACE) && element.local_name().as_ref() == b"TimbreFiscalDigital" {
            self.saw_stamp = true;
            for attr in element.attributes().flatten() {
                if attr.key.as_ref() == b"UUID" {
                    self.stamp_uuid = Some(attr_value(&attr));
                }
            }
        }
    }

    fn into_fields(self) -> Result<InvoiceFields, ParseError> {
        if !self.saw_root {
            return Err(ParseError::MissingElement("Comprobante"));
        }
        if !self.saw_issuer {
            return Err(ParseError::MissingElement("Emisor"));
        }
        if !self.saw_stamp {
            return Err(ParseError::MissingElement("TimbreFiscalDigital"));
        }

        let fecha = self.fecha.ok_or(ParseError::MissingAttribute("Fecha"))?;
        let issue_date = NaiveDateTime::parse_from_str(&fecha, TIMESTAMP_FORMAT)
            .map_err(|_| ParseError::InvalidTimestamp(fecha.clone()))?
            .format(DISPLAY_DATE_FORMAT)
            .to_string();
        let total = self.total.ok_or(ParseError::MissingAttribute("Total"))?;
        let issuer_name = self.issuer_name.ok_or(ParseError::MissingAttribute("Nombre"))?;
        let issuer_tax_id = self.issuer_tax_id.ok_or(ParseError::MissingAttribute("Rfc"))?;
        let stamp_uuid = self.stamp_uuid.ok_or(ParseError::MissingAttribute("UUID"))?;
        // Only the leading segment of the stamp UUID is kept.
        let uuid = stamp_uuid.split('-').next().unwrap_or_default().to_string();

        Ok(InvoiceFields {
            uuid,
            issue_date,
            issuer_tax_id,
            issuer_name,
            total,
        })
    }
}

fn is_ns(ns: &ResolveResult, expected: &str) -> bool {
    matches!(ns, ResolveResult::Bound(Namespace(bound)) if *bound == expected.as_bytes())
}

fn attr_value(attr: &Attribute) -> String {
    attr.unescape_value()
        .map_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned(), Cow::into_owned)
}


#[cfg(test)]
mod test_parse_or_marker {
    use super::*;

    use crate::diagnostics::MemoryLog;

    #[test]
    fn valid_document_yields_parsed_outcome_without_log_entry() {
        let mut log = MemoryLog::default();
        let outcome = parse_or_marker(Path::new("tests/fixtures/cfdi_sample.xml"), &mut log);

        assert!(matches!(outcome, ParseOutcome::Parsed(_)));
        assert!(log.entries.is_empty());
    }

    #[test]
    fn failure_yields_marker_and_one_log_entry_with_path() {
        let mut log = MemoryLog::default();
        let path = Path::new("tests/fixtures/not_an_invoice.xml");

        let outcome = parse_or_marker(path, &mut log);

        assert_eq!(outcome, ParseOutcome::Unparsable);
        assert_eq!(log.entries.len(), 1);
        assert_eq!(log.entries[0].0, path);
    }

    #[test]
    fn caller_cannot_distinguish_failure_kinds() {
        let mut log = MemoryLog::default();
        let corrupt = parse_or_marker(Path::new("tests/fixtures/not_an_invoice.xml"), &mut log);
        let unstamped = parse_or_marker(Path::new("tests/fixtures/cfdi_no_stamp.xml"), &mut log);

        assert_eq!(corrupt, unstamped);
        assert_eq!(log.entries.len(), 2);
    }
}
