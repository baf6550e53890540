//! CSV/JSON import and export boundary.
//!
//! Import is the lenient edge of the system: free-text rows are coerced into
//! typed payloads with defaulting (unknown status falls back to the first
//! enum value, missing referral to `N`, unparsable numbers to 0). Everything
//! past this boundary is typed.

use std::collections::HashMap;
use std::io;

use serde::Serialize;

use crate::error::Result;
use crate::models::{
    Application, ApplicationStatus, CompanyResearch, ContactStatus, NetworkingContact, Payload,
    PrepEntry, Record, Referral, StarStory, CONFIDENCE_MAX, CONFIDENCE_MIN,
};

/// Export output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

/// Render records as pretty-printed JSON, envelope included
pub fn render_json_export<P: Payload>(records: &[Record<P>]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(records)
}

/// Render records as CSV with a stable column order: envelope columns first,
/// then the payload's declared headers.
pub fn render_csv_export<P: Payload>(records: &[Record<P>]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut headers = vec!["id", "created_at", "updated_at"];
    headers.extend_from_slice(P::CSV_HEADERS);
    writer.write_record(&headers)?;

    for record in records {
        let fields = serde_json::to_value(&record.payload)?;
        let mut row = vec![
            record.id.to_string(),
            record.created_at.to_string(),
            record.updated_at.to_string(),
        ];
        for header in P::CSV_HEADERS {
            row.push(display_value(fields.get(*header)));
        }
        writer.write_record(&row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|error| crate::Error::InvalidInput(error.to_string()))?;
    String::from_utf8(bytes).map_err(|error| crate::Error::InvalidInput(error.to_string()))
}

/// Render records in the selected format
pub fn render_export<P: Payload>(records: &[Record<P>], format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Json => Ok(render_json_export(records)?),
        ExportFormat::Csv => render_csv_export(records),
    }
}

/// Build a deterministic default file name for export flows
#[must_use]
pub fn suggested_export_file_name(
    collection: &str,
    format: ExportFormat,
    timestamp_ms: i64,
) -> String {
    format!(
        "jobtrail-{collection}-{timestamp_ms}.{}",
        format.extension()
    )
}

fn display_value(value: Option<&serde_json::Value>) -> String {
    match value {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Number(n)) => n.to_string(),
        Some(serde_json::Value::Bool(b)) => b.to_string(),
        Some(other) => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Import
// ---------------------------------------------------------------------------

/// One parsed CSV row, keyed by normalized header name
type Row = HashMap<String, String>;

/// Normalize a header for lookup: lowercase, alphanumerics only, so
/// `Next Step`, `next_step`, and `nextStep` all address the same column.
fn normalize_header(header: &str) -> String {
    header
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn read_rows(reader: impl io::Read) -> Result<Vec<Row>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(normalize_header)
        .collect();

    let mut rows = Vec::new();
    for result in csv_reader.records() {
        let record = result?;
        let mut row = Row::new();
        for (index, value) in record.iter().enumerate() {
            if let Some(header) = headers.get(index) {
                row.insert(header.clone(), value.to_string());
            }
        }
        rows.push(row);
    }
    Ok(rows)
}

fn text(row: &Row, key: &str) -> String {
    row.get(key).cloned().unwrap_or_default()
}

/// First non-empty value among aliases of the same column
fn text_any(row: &Row, keys: &[&str]) -> String {
    keys.iter()
        .map(|key| text(row, key))
        .find(|value| !value.is_empty())
        .unwrap_or_default()
}

/// Parse a numeric column, falling back to 0
fn number(row: &Row, key: &str) -> i64 {
    text(row, key).parse().unwrap_or(0)
}

/// Import applications from CSV, applying the defaulting rules
pub fn import_applications(reader: impl io::Read) -> Result<Vec<Application>> {
    Ok(read_rows(reader)?
        .into_iter()
        .map(|row| Application {
            company: text(&row, "company"),
            role: text(&row, "role"),
            link: text(&row, "link"),
            date: text(&row, "date"),
            status: ApplicationStatus::from_loose(&text(&row, "status")),
            location: text(&row, "location"),
            recruiter: text(&row, "recruiter"),
            referral: Referral::from_loose(&text(&row, "referral")),
            next_step: text(&row, "nextstep"),
            notes: text(&row, "notes"),
        })
        .collect())
}

/// Import prep entries from CSV
pub fn import_prep_entries(reader: impl io::Read) -> Result<Vec<PrepEntry>> {
    Ok(read_rows(reader)?
        .into_iter()
        .map(|row| PrepEntry {
            date: text(&row, "date"),
            topic: text(&row, "topic"),
            problems: text(&row, "problems"),
            time_minutes: text_any(&row, &["timeminutes", "time"]).parse().unwrap_or(0),
            confidence: number(&row, "confidence").clamp(CONFIDENCE_MIN, CONFIDENCE_MAX),
            notes: text(&row, "notes"),
        })
        .collect())
}

/// Import company research from CSV
pub fn import_companies(reader: impl io::Read) -> Result<Vec<CompanyResearch>> {
    Ok(read_rows(reader)?
        .into_iter()
        .map(|row| CompanyResearch {
            company: text(&row, "company"),
            what_they_do: text(&row, "whattheydo"),
            values: text(&row, "values"),
            why: text(&row, "why"),
            questions: text(&row, "questions"),
            news: text(&row, "news"),
        })
        .collect())
}

/// Import networking contacts from CSV
pub fn import_contacts(reader: impl io::Read) -> Result<Vec<NetworkingContact>> {
    Ok(read_rows(reader)?
        .into_iter()
        .map(|row| NetworkingContact {
            name: text(&row, "name"),
            company: text(&row, "company"),
            role: text(&row, "role"),
            date: text(&row, "date"),
            status: ContactStatus::from_loose(&text(&row, "status")),
            referral: Referral::from_loose(&text(&row, "referral")),
            notes: text(&row, "notes"),
        })
        .collect())
}

/// Import STAR stories from CSV
pub fn import_stories(reader: impl io::Read) -> Result<Vec<StarStory>> {
    Ok(read_rows(reader)?
        .into_iter()
        .map(|row| StarStory {
            title: text(&row, "title"),
            situation: text(&row, "situation"),
            task: text(&row, "task"),
            action: text(&row, "action"),
            result: text(&row, "result"),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecordId;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_import_applications_defaults_status_and_referral() {
        let csv = "company,role,status,referral\n\
                   Acme,Engineer,interview,Y\n\
                   Globex,Analyst,ghosted,\n";
        let apps = import_applications(csv.as_bytes()).unwrap();

        assert_eq!(apps.len(), 2);
        assert_eq!(apps[0].status, ApplicationStatus::Interview);
        assert_eq!(apps[0].referral, Referral::Y);
        // Unknown status and missing referral fall back to defaults.
        assert_eq!(apps[1].status, ApplicationStatus::Saved);
        assert_eq!(apps[1].referral, Referral::N);
    }

    #[test]
    fn test_import_applications_accepts_header_spelling_variants() {
        let csv = "Company,Role,Next Step\nAcme,Engineer,phone screen\n";
        let apps = import_applications(csv.as_bytes()).unwrap();
        assert_eq!(apps[0].next_step, "phone screen");
    }

    #[test]
    fn test_import_prep_coerces_numbers() {
        let csv = "date,topic,time,confidence\n\
                   2026-01-05,graphs,45,7\n\
                   2026-01-06,dp,lots,99\n";
        let entries = import_prep_entries(csv.as_bytes()).unwrap();

        assert_eq!(entries[0].time_minutes, 45);
        assert_eq!(entries[0].confidence, 7);
        // Garbage time parses to 0; confidence clamps into range.
        assert_eq!(entries[1].time_minutes, 0);
        assert_eq!(entries[1].confidence, CONFIDENCE_MAX);
    }

    #[test]
    fn test_import_contacts() {
        let csv = "name,company,status,referral\nJordan,Acme,responded,yes\n";
        let contacts = import_contacts(csv.as_bytes()).unwrap();
        assert_eq!(contacts[0].status, ContactStatus::Responded);
        assert_eq!(contacts[0].referral, Referral::Y);
    }

    fn record(company: &str, created_at: i64) -> Record<Application> {
        Record {
            id: RecordId::new(),
            owner_id: "u1".to_string(),
            created_at,
            updated_at: created_at,
            payload: Application {
                company: company.to_string(),
                role: "Engineer".to_string(),
                status: ApplicationStatus::Applied,
                ..Application::default()
            },
        }
    }

    #[test]
    fn test_csv_export_has_stable_columns() {
        let records = vec![record("Acme", 100)];
        let rendered = render_csv_export(&records).unwrap();

        let mut lines = rendered.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("id,created_at,updated_at,company,role"));
        let row = lines.next().unwrap();
        assert!(row.contains("Acme"));
        assert!(row.contains("Applied"));
    }

    #[test]
    fn test_csv_export_roundtrips_through_import() {
        let records = vec![record("Acme", 100), record("Globex", 200)];
        let rendered = render_csv_export(&records).unwrap();

        let imported = import_applications(rendered.as_bytes()).unwrap();
        assert_eq!(imported.len(), 2);
        assert_eq!(imported[0].company, "Acme");
        assert_eq!(imported[0].status, ApplicationStatus::Applied);
    }

    #[test]
    fn test_json_export_includes_envelope() {
        let rendered = render_json_export(&[record("Acme", 100)]).unwrap();
        assert!(rendered.contains("\"owner_id\": \"u1\""));
        assert!(rendered.contains("\"company\": \"Acme\""));
    }

    #[test]
    fn test_suggested_export_file_name() {
        assert_eq!(
            suggested_export_file_name("applications", ExportFormat::Csv, 123),
            "jobtrail-applications-123.csv"
        );
        assert_eq!(
            suggested_export_file_name("stories", ExportFormat::Json, 456),
            "jobtrail-stories-456.json"
        );
    }
}
