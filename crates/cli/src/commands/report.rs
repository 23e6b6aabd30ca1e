//! Report generation

use anyhow::{Context, Result};
use chama_business::{ContributionService, LoanService, MemberService, ServiceContext, SolvencyService};
use chama_reports::{
    ArrearsReport, GroupSummaryReport, LoanBookReport, MemberReport, ReportData, ReportExporter,
};
use std::path::Path;

use crate::{ReportFormatArg, ReportKind};

/// Build the report data for `kind`
pub async fn build(ctx: &ServiceContext, kind: ReportKind) -> Result<Box<dyn ReportData>> {
    let now = ctx.now();
    let report: Box<dyn ReportData> = match kind {
        ReportKind::Summary => {
            let summary = SolvencyService::new(ctx).group_summary().await?;
            Box::new(GroupSummaryReport::new(summary))
        }
        ReportKind::Arrears => {
            let entries = SolvencyService::new(ctx).members_in_arrears().await?;
            Box::new(ArrearsReport::new(entries, now))
        }
        ReportKind::Loans => {
            let loans = LoanService::new(ctx).list().await?;
            let members = MemberService::new(ctx).list().await?;
            Box::new(LoanBookReport::build(&loans, &members, now))
        }
        ReportKind::Members => {
            let members = MemberService::new(ctx).list().await?;
            let contributions = ContributionService::new(ctx).list_all().await?;
            let loans = LoanService::new(ctx).list().await?;
            Box::new(MemberReport::build(&members, &contributions, &loans, now))
        }
    };
    Ok(report)
}

/// Render a report to stdout or a file
pub async fn generate(
    ctx: &ServiceContext,
    kind: ReportKind,
    format: ReportFormatArg,
    output: Option<&Path>,
) -> Result<()> {
    let report = build(ctx, kind).await?;
    let exporter: Box<dyn ReportExporter> = format.to_format().exporter();
    let rendered = exporter.export(report.as_ref());

    match output {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            println!(
                "✅ {} written to {} ({})",
                report.title(),
                path.display(),
                exporter.mime_type()
            );
        }
        None => print!("{}", rendered),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chama_core::{FixedClock, LendingPolicy, LoanPlan};
    use chama_persistence::Database;
    use chrono::{Duration, NaiveDate};
    use rust_decimal::Decimal;
    use std::sync::Arc;
    use tempfile::TempDir;

    async fn seeded() -> (ServiceContext, Arc<FixedClock>) {
        let now = NaiveDate::from_ymd_opt(2026, 7, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let clock = Arc::new(FixedClock::new(now));
        let db = Database::in_memory().await.unwrap();
        let ctx = ServiceContext::from_parts(db.pool().clone(), clock.clone(), LendingPolicy::default());

        let member = MemberService::new(&ctx)
            .register_joined("Wanjiru", "0712345678", now - Duration::days(90))
            .await
            .unwrap();
        ContributionService::new(&ctx)
            .record(member.id, Decimal::new(1000, 0))
            .await
            .unwrap();
        LoanService::new(&ctx)
            .issue(member.id, Decimal::new(500, 0), LoanPlan::OneMonth)
            .await
            .unwrap();
        (ctx, clock)
    }

    #[tokio::test]
    async fn test_arrears_report_after_due_date() {
        let (ctx, clock) = seeded().await;
        let report = build(&ctx, ReportKind::Arrears).await.unwrap();
        assert!(report.rows().is_empty());

        clock.advance(Duration::days(45));
        let report = build(&ctx, ReportKind::Arrears).await.unwrap();
        assert_eq!(report.rows().len(), 1);
        assert_eq!(report.rows()[0][1], "Wanjiru");
    }

    #[tokio::test]
    async fn test_report_written_to_file() {
        let (ctx, _clock) = seeded().await;
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("loans.csv");

        generate(&ctx, ReportKind::Loans, ReportFormatArg::Csv, Some(&path))
            .await
            .unwrap();
        let csv = std::fs::read_to_string(&path).unwrap();
        assert!(csv.starts_with("Loan ID,Member ID,Member,Principal"));
        assert!(csv.contains("Wanjiru,500.00,2.00,510.00"));
    }

    #[tokio::test]
    async fn test_member_and_summary_reports() {
        let (ctx, _clock) = seeded().await;

        let members = build(&ctx, ReportKind::Members).await.unwrap();
        assert_eq!(members.rows()[0][5], "1000.00");
        assert_eq!(members.rows()[0][7], "510.00");

        let summary = build(&ctx, ReportKind::Summary).await.unwrap();
        let rows = summary.rows();
        assert!(rows.contains(&vec!["Outstanding".to_string(), "510.00".to_string()]));
        assert!(rows.contains(&vec!["Lending headroom".to_string(), "490.00".to_string()]));
    }
}
