//! Group reports - summary, arrears, loan book, member register
//!
//! Each report is built from values the business services already
//! returned, so loan statuses here are effective statuses.

use chama_business::{ArrearsEntry, GroupSummary};
use chama_core::{format_money, Contribution, Loan, Member, CURRENCY_CODE};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::exporters::ReportData;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn timestamp(at: NaiveDateTime) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

fn amount(value: Decimal) -> String {
    format!("{:.2}", value)
}

// ============================================================================
// Group Summary
// ============================================================================

/// Group-wide position as a two-column table
#[derive(Debug, Clone)]
pub struct GroupSummaryReport {
    pub title: String,
    pub summary: GroupSummary,
}

impl GroupSummaryReport {
    pub fn new(summary: GroupSummary) -> Self {
        Self {
            title: "Group Summary".to_string(),
            summary,
        }
    }
}

impl ReportData for GroupSummaryReport {
    fn title(&self) -> &str {
        &self.title
    }

    fn headers(&self) -> Vec<String> {
        vec!["Metric".to_string(), "Value".to_string()]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        let s = &self.summary;
        [
            ("Members", s.member_count.to_string()),
            ("Contributions", amount(s.contribution_total)),
            ("Outstanding", amount(s.outstanding_total)),
            ("Lending headroom", amount(s.lending_headroom)),
            ("Active loans", s.loans.active.to_string()),
            ("Defaulted loans", s.loans.defaulted.to_string()),
            ("Paid loans", s.loans.paid.to_string()),
        ]
        .into_iter()
        .map(|(k, v)| vec![k.to_string(), v])
        .collect()
    }

    fn summary(&self) -> Vec<(String, String)> {
        vec![
            ("Currency".to_string(), CURRENCY_CODE.to_string()),
            ("As Of".to_string(), timestamp(self.summary.as_of)),
        ]
    }
}

// ============================================================================
// Arrears
// ============================================================================

/// Members holding defaulted loans
#[derive(Debug, Clone)]
pub struct ArrearsReport {
    pub title: String,
    pub entries: Vec<ArrearsEntry>,
    pub generated_at: NaiveDateTime,
}

impl ArrearsReport {
    pub fn new(entries: Vec<ArrearsEntry>, generated_at: NaiveDateTime) -> Self {
        Self {
            title: "Members in Arrears".to_string(),
            entries,
            generated_at,
        }
    }

    pub fn total_in_arrears(&self) -> Decimal {
        self.entries.iter().map(|e| e.balance).sum()
    }
}

impl ReportData for ArrearsReport {
    fn title(&self) -> &str {
        &self.title
    }

    fn headers(&self) -> Vec<String> {
        ["Member ID", "Name", "Phone", "Loan ID", "Balance", "Due", "Days Overdue"]
            .iter()
            .map(|h| h.to_string())
            .collect()
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.entries
            .iter()
            .map(|e| {
                vec![
                    e.member_id.to_string(),
                    e.member_name.clone(),
                    e.phone.clone(),
                    e.loan_id.to_string(),
                    amount(e.balance),
                    timestamp(e.due_at),
                    e.days_overdue.to_string(),
                ]
            })
            .collect()
    }

    fn summary(&self) -> Vec<(String, String)> {
        vec![
            ("Loans in Arrears".to_string(), self.entries.len().to_string()),
            ("Total in Arrears".to_string(), format_money(self.total_in_arrears())),
            ("Generated At".to_string(), timestamp(self.generated_at)),
        ]
    }
}

// ============================================================================
// Loan Book
// ============================================================================

#[derive(Debug, Clone)]
pub struct LoanBookRow {
    pub loan: Loan,
    pub member_name: String,
}

/// Every loan with its member
#[derive(Debug, Clone)]
pub struct LoanBookReport {
    pub title: String,
    pub rows: Vec<LoanBookRow>,
    pub generated_at: NaiveDateTime,
}

impl LoanBookReport {
    /// Join loans to member names; loans of unknown members show `#id`
    pub fn build(loans: &[Loan], members: &[Member], generated_at: NaiveDateTime) -> Self {
        let names: HashMap<i64, &str> = members.iter().map(|m| (m.id, m.name.as_str())).collect();
        let rows = loans
            .iter()
            .map(|loan| LoanBookRow {
                loan: loan.clone(),
                member_name: names
                    .get(&loan.member_id)
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| format!("#{}", loan.member_id)),
            })
            .collect();

        Self {
            title: "Loan Book".to_string(),
            rows,
            generated_at,
        }
    }

    pub fn total_principal(&self) -> Decimal {
        self.rows.iter().map(|r| r.loan.principal).sum()
    }

    pub fn total_outstanding(&self) -> Decimal {
        self.rows
            .iter()
            .filter(|r| r.loan.status.is_outstanding())
            .map(|r| r.loan.balance)
            .sum()
    }
}

impl ReportData for LoanBookReport {
    fn title(&self) -> &str {
        &self.title
    }

    fn headers(&self) -> Vec<String> {
        [
            "Loan ID", "Member ID", "Member", "Principal", "Rate %", "Balance", "Issued", "Due",
            "Status",
        ]
        .iter()
        .map(|h| h.to_string())
        .collect()
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|r| {
                let loan = &r.loan;
                vec![
                    loan.id.to_string(),
                    loan.member_id.to_string(),
                    r.member_name.clone(),
                    amount(loan.principal),
                    amount(loan.interest_rate),
                    amount(loan.balance),
                    timestamp(loan.issued_at),
                    timestamp(loan.due_at),
                    loan.status.as_str().to_string(),
                ]
            })
            .collect()
    }

    fn summary(&self) -> Vec<(String, String)> {
        vec![
            ("Total Loans".to_string(), self.rows.len().to_string()),
            ("Total Principal".to_string(), format_money(self.total_principal())),
            ("Total Outstanding".to_string(), format_money(self.total_outstanding())),
            ("Generated At".to_string(), timestamp(self.generated_at)),
        ]
    }
}

// ============================================================================
// Member Register
// ============================================================================

#[derive(Debug, Clone)]
pub struct MemberRow {
    pub member: Member,
    pub contributed: Decimal,
    pub loan_count: usize,
    pub outstanding: Decimal,
}

/// Members with their savings and borrowing
#[derive(Debug, Clone)]
pub struct MemberReport {
    pub title: String,
    pub rows: Vec<MemberRow>,
    pub generated_at: NaiveDateTime,
}

impl MemberReport {
    pub fn build(
        members: &[Member],
        contributions: &[Contribution],
        loans: &[Loan],
        generated_at: NaiveDateTime,
    ) -> Self {
        let mut contributed: HashMap<i64, Decimal> = HashMap::new();
        for c in contributions {
            *contributed.entry(c.member_id).or_default() += c.amount;
        }

        let rows = members
            .iter()
            .map(|member| {
                let own: Vec<&Loan> = loans.iter().filter(|l| l.member_id == member.id).collect();
                MemberRow {
                    member: member.clone(),
                    contributed: contributed.get(&member.id).copied().unwrap_or_default(),
                    loan_count: own.len(),
                    outstanding: own
                        .iter()
                        .filter(|l| l.status.is_outstanding())
                        .map(|l| l.balance)
                        .sum(),
                }
            })
            .collect();

        Self {
            title: "Member Register".to_string(),
            rows,
            generated_at,
        }
    }
}

impl ReportData for MemberReport {
    fn title(&self) -> &str {
        &self.title
    }

    fn headers(&self) -> Vec<String> {
        ["ID", "Name", "Phone", "Joined", "Status", "Contributed", "Loans", "Outstanding"]
            .iter()
            .map(|h| h.to_string())
            .collect()
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|r| {
                vec![
                    r.member.id.to_string(),
                    r.member.name.clone(),
                    r.member.phone.to_string(),
                    timestamp(r.member.join_date),
                    r.member.status.as_str().to_string(),
                    amount(r.contributed),
                    r.loan_count.to_string(),
                    amount(r.outstanding),
                ]
            })
            .collect()
    }

    fn summary(&self) -> Vec<(String, String)> {
        let active = self.rows.iter().filter(|r| r.member.is_active()).count();
        let saved: Decimal = self.rows.iter().map(|r| r.contributed).sum();
        vec![
            ("Total Members".to_string(), self.rows.len().to_string()),
            ("Active Members".to_string(), active.to_string()),
            ("Total Contributed".to_string(), format_money(saved)),
            ("Generated At".to_string(), timestamp(self.generated_at)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exporters::{CsvExporter, MarkdownExporter, ReportExporter};
    use chama_business::LoanCounts;
    use chama_core::{LoanStatus, MemberStatus, PhoneNumber};
    use chrono::{Duration, NaiveDate};
    use rust_decimal_macros::dec;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, 15)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn member(id: i64, name: &str, phone: &str) -> Member {
        Member {
            id,
            name: name.to_string(),
            phone: PhoneNumber::parse(phone).unwrap(),
            join_date: now() - Duration::days(100),
            status: MemberStatus::Active,
        }
    }

    fn loan(id: i64, member_id: i64, balance: Decimal, status: LoanStatus) -> Loan {
        Loan {
            id,
            member_id,
            principal: dec!(1000),
            issued_at: now() - Duration::days(40),
            due_at: now() - Duration::days(10),
            interest_rate: dec!(2.00),
            balance,
            status,
        }
    }

    #[test]
    fn test_summary_report_rows() {
        let report = GroupSummaryReport::new(GroupSummary {
            as_of: now(),
            member_count: 3,
            contribution_total: dec!(5000),
            outstanding_total: dec!(1020),
            lending_headroom: dec!(3980),
            loans: LoanCounts {
                active: 1,
                paid: 2,
                defaulted: 0,
            },
        });

        let csv = CsvExporter::new().export(&report);
        assert!(csv.contains("Contributions,5000.00"));
        assert!(csv.contains("Lending headroom,3980.00"));
        assert!(csv.contains("Paid loans,2"));
        assert_eq!(report.summary()[1].1, "2026-08-15 09:00:00");
    }

    #[test]
    fn test_arrears_report_totals() {
        let entries = vec![ArrearsEntry {
            member_id: 1,
            member_name: "Wanjiru".to_string(),
            phone: "+254712345678".to_string(),
            loan_id: 9,
            balance: dec!(510),
            due_at: now() - Duration::days(5),
            days_overdue: 5,
        }];
        let report = ArrearsReport::new(entries, now());

        assert_eq!(report.total_in_arrears(), dec!(510));
        let md = MarkdownExporter::new().export(&report);
        assert!(md.contains("# Members in Arrears"));
        assert!(md.contains("- **Total in Arrears**: KES 510.00"));
        assert!(md.contains("| 1 | Wanjiru | +254712345678 | 9 | 510.00 |"));
    }

    #[test]
    fn test_loan_book_joins_member_names() {
        let members = vec![member(1, "Wanjiru", "0712345678")];
        let loans = vec![
            loan(1, 1, dec!(0), LoanStatus::Paid),
            loan(2, 7, dec!(300), LoanStatus::Defaulted),
        ];
        let report = LoanBookReport::build(&loans, &members, now());

        assert_eq!(report.rows[0].member_name, "Wanjiru");
        assert_eq!(report.rows[1].member_name, "#7");
        assert_eq!(report.total_principal(), dec!(2000));
        assert_eq!(report.total_outstanding(), dec!(300));
        assert_eq!(report.rows()[1][8], "DEFAULTED");
    }

    #[test]
    fn test_member_report_aggregates() {
        let members = vec![
            member(1, "Wanjiru", "0712345678"),
            member(2, "Otieno", "0722000000"),
        ];
        let contributions = vec![
            Contribution { id: 1, member_id: 1, amount: dec!(100), date: now() },
            Contribution { id: 2, member_id: 1, amount: dec!(250.50), date: now() },
        ];
        let loans = vec![loan(1, 1, dec!(400), LoanStatus::Active)];
        let report = MemberReport::build(&members, &contributions, &loans, now());

        let rows = report.rows();
        assert_eq!(rows[0][5], "350.50");
        assert_eq!(rows[0][6], "1");
        assert_eq!(rows[0][7], "400.00");
        assert_eq!(rows[1][5], "0.00");
        assert_eq!(report.summary()[2].1, "KES 350.50");
    }
}
