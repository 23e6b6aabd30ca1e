//! # Chama Reports
//!
//! Report generation for the savings group in CSV, JSON and Markdown.
//!
//! ## Exporters
//!
//! - [`CsvExporter`] - CSV with quoting
//! - [`JsonExporter`] - JSON, pretty or compact
//! - [`MarkdownExporter`] - Markdown tables
//!
//! ## Reports
//!
//! - [`GroupSummaryReport`] - contributions, outstanding, headroom, loan counts
//! - [`ArrearsReport`] - members holding defaulted loans
//! - [`LoanBookReport`] - every loan with its member
//! - [`MemberReport`] - members with savings and borrowing
//!
//! ## Example
//!
//! ```rust,ignore
//! use chama_reports::{GroupSummaryReport, ReportExporter, ReportFormat};
//!
//! let report = GroupSummaryReport::new(solvency.group_summary().await?);
//! let output = ReportFormat::Markdown.exporter().export(&report);
//! ```

pub mod exporters;
pub mod group_reports;

pub use exporters::{
    CsvExporter, JsonExporter, MarkdownExporter, ReportData, ReportExporter, ReportFormat,
};

pub use group_reports::{
    ArrearsReport, GroupSummaryReport, LoanBookReport, LoanBookRow, MemberReport, MemberRow,
};
