//! Report exporters - CSV, JSON, Markdown
//!
//! Every report is a titled table plus key/value summary lines; an
//! exporter turns that shape into one output format.

use std::fmt;

/// Trait for exporting reports to different formats
pub trait ReportExporter {
    /// Render the whole report
    fn export(&self, report: &dyn ReportData) -> String;

    /// File extension, without the dot
    fn extension(&self) -> &'static str;

    fn mime_type(&self) -> &'static str;
}

/// Tabular data that any exporter can render
pub trait ReportData {
    fn title(&self) -> &str;

    /// Column headers
    fn headers(&self) -> Vec<String>;

    /// One entry per row, aligned with `headers`
    fn rows(&self) -> Vec<Vec<String>>;

    /// Summary statistics as key-value pairs
    fn summary(&self) -> Vec<(String, String)>;
}

/// Output format selectable by name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Csv,
    Json,
    Markdown,
}

impl ReportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportFormat::Csv => "csv",
            ReportFormat::Json => "json",
            ReportFormat::Markdown => "markdown",
        }
    }

    /// Parse, case-insensitive; `md` is accepted for Markdown
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Some(ReportFormat::Csv),
            "json" => Some(ReportFormat::Json),
            "markdown" | "md" => Some(ReportFormat::Markdown),
            _ => None,
        }
    }

    /// Exporter with default settings
    pub fn exporter(&self) -> Box<dyn ReportExporter> {
        match self {
            ReportFormat::Csv => Box::new(CsvExporter::new()),
            ReportFormat::Json => Box::new(JsonExporter::new()),
            ReportFormat::Markdown => Box::new(MarkdownExporter::new()),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// CSV Exporter
// ============================================================================

/// CSV exporter. Only the table is written; summaries are left out.
pub struct CsvExporter {
    delimiter: char,
    include_header: bool,
}

impl Default for CsvExporter {
    fn default() -> Self {
        Self {
            delimiter: ',',
            include_header: true,
        }
    }
}

impl CsvExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn without_header(mut self) -> Self {
        self.include_header = false;
        self
    }

    fn field(&self, value: &str) -> String {
        let needs_quotes = value.contains(self.delimiter)
            || value.contains('"')
            || value.contains('\n')
            || value.contains('\r');
        if needs_quotes {
            format!("\"{}\"", value.replace('"', "\"\""))
        } else {
            value.to_string()
        }
    }

    fn line(&self, fields: &[String]) -> String {
        let sep = self.delimiter.to_string();
        let cells: Vec<String> = fields.iter().map(|f| self.field(f)).collect();
        format!("{}\n", cells.join(&sep))
    }
}

impl ReportExporter for CsvExporter {
    fn export(&self, report: &dyn ReportData) -> String {
        let mut output = String::new();
        if self.include_header {
            output.push_str(&self.line(&report.headers()));
        }
        for row in report.rows() {
            output.push_str(&self.line(&row));
        }
        output
    }

    fn extension(&self) -> &'static str {
        "csv"
    }

    fn mime_type(&self) -> &'static str {
        "text/csv"
    }
}

// ============================================================================
// JSON Exporter
// ============================================================================

/// JSON exporter: `{ "title", "summary": {..}, "data": [{header: value}] }`
pub struct JsonExporter {
    pretty: bool,
}

impl Default for JsonExporter {
    fn default() -> Self {
        Self { pretty: true }
    }
}

impl JsonExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compact(mut self) -> Self {
        self.pretty = false;
        self
    }

    fn to_value(report: &dyn ReportData) -> serde_json::Value {
        use serde_json::{Map, Value};

        let headers = report.headers();
        let data: Vec<Value> = report
            .rows()
            .into_iter()
            .map(|row| {
                let record: Map<String, Value> = headers
                    .iter()
                    .cloned()
                    .zip(row.into_iter().map(Value::String))
                    .collect();
                Value::Object(record)
            })
            .collect();

        let summary: Map<String, Value> = report
            .summary()
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect();

        serde_json::json!({
            "title": report.title(),
            "summary": summary,
            "data": data,
        })
    }
}

impl ReportExporter for JsonExporter {
    fn export(&self, report: &dyn ReportData) -> String {
        let value = Self::to_value(report);
        let rendered = if self.pretty {
            serde_json::to_string_pretty(&value)
        } else {
            serde_json::to_string(&value)
        };
        // a Value built from strings always serializes
        rendered.unwrap_or_default()
    }

    fn extension(&self) -> &'static str {
        "json"
    }

    fn mime_type(&self) -> &'static str {
        "application/json"
    }
}

// ============================================================================
// Markdown Exporter
// ============================================================================

/// Markdown exporter with a summary list and a data table
pub struct MarkdownExporter {
    include_summary: bool,
}

impl Default for MarkdownExporter {
    fn default() -> Self {
        Self {
            include_summary: true,
        }
    }
}

impl MarkdownExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn without_summary(mut self) -> Self {
        self.include_summary = false;
        self
    }

    fn cell(value: &str) -> String {
        value.replace('|', "\\|").replace('\n', " ")
    }

    fn table_row(cells: &[String]) -> String {
        let cells: Vec<String> = cells.iter().map(|c| Self::cell(c)).collect();
        format!("| {} |\n", cells.join(" | "))
    }
}

impl ReportExporter for MarkdownExporter {
    fn export(&self, report: &dyn ReportData) -> String {
        let mut output = format!("# {}\n\n", report.title());

        if self.include_summary {
            output.push_str("## Summary\n\n");
            for (key, value) in report.summary() {
                output.push_str(&format!("- **{}**: {}\n", key, value));
            }
            output.push('\n');
        }

        output.push_str("## Data\n\n");
        let headers = report.headers();
        let rows = report.rows();
        if rows.is_empty() {
            output.push_str("_No records._\n");
            return output;
        }

        output.push_str(&Self::table_row(&headers));
        let separator: Vec<String> = headers.iter().map(|_| "---".to_string()).collect();
        output.push_str(&format!("| {} |\n", separator.join(" | ")));
        for row in rows {
            output.push_str(&Self::table_row(&row));
        }
        output
    }

    fn extension(&self) -> &'static str {
        "md"
    }

    fn mime_type(&self) -> &'static str {
        "text/markdown"
    }
}
