//! Invoice record types and ordering.

use std::fmt;

/// Column headers for the rendered table and the Excel sheet.
pub static HEADERS: [&str; 6] = ["UUID", "Fecha", "RFC", "Nombre", "Tipo de Gasto", "Total"];

/// Expense label for invoices that sit directly in a root directory
/// without any subdirectories.
pub const DEFAULT_EXPENSE_TYPE: &str = "Gasolina";

/// The five fields extracted from one CFDI document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceFields {
    /// Leading segment of the fiscal stamp UUID, up to the first hyphen.
    pub uuid: String,
    /// Issue date reformatted to `DD/MM/YYYY`.
    pub issue_date: String,
    /// Issuer RFC tax id.
    pub issuer_tax_id: String,
    /// Issuer display name.
    pub issuer_name: String,
    /// Invoice total, kept as the raw decimal string token.
    pub total: String,
}

/// Result of parsing one XML document.
///
/// A document either yields all five fields or nothing at all;
/// there is no partially populated state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    Parsed(InvoiceFields),
    Unparsable,
}

/// One row of the final dataset: the parse outcome plus the expense label
/// resolved from the containing folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceRecord {
    pub outcome: ParseOutcome,
    pub expense_type: String,
}

impl InvoiceRecord {
    /// The parsed fields, or `None` for a failure marker.
    #[must_use]
    pub fn fields(&self) -> Option<&InvoiceFields> {
        match &self.outcome {
            ParseOutcome::Parsed(fields) => Some(fields),
            ParseOutcome::Unparsable => None,
        }
    }

    /// Sort key: totals and dates compare as plain strings.
    /// Failure markers yield `None` keys and order before any parsed row.
    fn sort_key(&self) -> (Option<&str>, Option<&str>) {
        self.fields()
            .map_or((None, None), |fields| (Some(fields.total.as_str()), Some(fields.issue_date.as_str())))
    }

    /// The six display columns; failure markers render as empty cells.
    #[must_use]
    pub fn columns(&self) -> [&str; 6] {
        match self.fields() {
            Some(fields) => [
                &fields.uuid,
                &fields.issue_date,
                &fields.issuer_tax_id,
                &fields.issuer_name,
                &self.expense_type,
                &fields.total,
            ],
            None => ["", "", "", "", &self.expense_type, ""],
        }
    }
}

impl fmt::Display for InvoiceRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.fields() {
            Some(fields) => write!(
                f,
                "{}   {}   {:>10}   {}   {}   {}",
                fields.uuid, fields.issue_date, fields.total, fields.issuer_tax_id, fields.issuer_name, self.expense_type
            ),
            None => write!(f, "<unparsable>   {}", self.expense_type),
        }
    }
}

/// Order records by `(total, issue date)` ascending, keeping the relative
/// order of rows with equal keys.
///
/// Both keys compare as strings, not as numbers or calendar dates:
/// `"100.00"` sorts before `"20.00"`, and dates compare as the already
/// reformatted `DD/MM/YYYY` strings.
pub fn sort_records(records: &mut [InvoiceRecord]) {
    records.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
}

#[cfg(test)]
mod test_invoice_record {
    use super::*;

    fn parsed(total: &str, issue_date: &str) -> InvoiceRecord {
        InvoiceRecord {
            outcome: ParseOutcome::Parsed(InvoiceFields {
                uuid: "1234abcd".to_string(),
                issue_date: issue_date.to_string(),
                issuer_tax_id: "ACM010101AAA".to_string(),
                issuer_name: "ACME".to_string(),
                total: total.to_string(),
            }),
            expense_type: "Comida".to_string(),
        }
    }

    fn marker(expense_type: &str) -> InvoiceRecord {
        InvoiceRecord {
            outcome: ParseOutcome::Unparsable,
            expense_type: expense_type.to_string(),
        }
    }

    #[test]
    fn columns_for_parsed_record() {
        let record = parsed("150.00", "01/03/2024");
        assert_eq!(
            record.columns(),
            ["1234abcd", "01/03/2024", "ACM010101AAA", "ACME", "Comida", "150.00"]
        );
    }

    #[test]
    fn columns_for_failure_marker_are_empty_except_label() {
        let record = marker("Gasolina");
        assert_eq!(record.columns(), ["", "", "", "", "Gasolina", ""]);
    }

    #[test]
    fn fields_returns_none_for_marker() {
        assert!(marker("Gasolina").fields().is_none());
        assert!(parsed("1.00", "01/01/2024").fields().is_some());
    }

    #[test]
    fn display_includes_key_fields() {
        let text = parsed("150.00", "01/03/2024").to_string();
        assert!(text.contains("1234abcd"));
        assert!(text.contains("01/03/2024"));
        assert!(text.contains("150.00"));
        assert!(text.contains("Comida"));
    }
}
