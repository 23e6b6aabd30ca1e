//! Chama CLI - savings group operations from the command line
//!
//! Usage:
//! ```bash
//! chama init
//! chama member create --name "Wanjiru Kamau" --phone 0712345678
//! chama contribute 1 500
//! chama loan issue 1 1000 --plan 6-months
//! chama loan repay 1 250
//! chama report arrears --format markdown --output arrears.md
//! ```

use chama_business::BusinessError;
use clap::{Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;
mod db;

use commands::{contribution, loan, member, report};

/// Chama - savings group ledger: members, contributions, loans
#[derive(Parser)]
#[command(name = "chama")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Database file path
    #[arg(long, default_value = "data/chama.db", global = true)]
    pub db: PathBuf,

    /// Lending policy JSON file (tenure days, exposure multiple)
    #[arg(long, env = "CHAMA_POLICY", global = true)]
    pub policy: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize database with schema
    Init {
        /// Delete the existing database first
        #[arg(long)]
        force: bool,
    },

    /// Show database status and group position
    Status,

    /// Member management
    Member {
        #[command(subcommand)]
        action: MemberAction,
    },

    /// Record a contribution for today
    Contribute {
        /// Member ID
        member_id: i64,
        /// Amount in KES
        #[arg(allow_negative_numbers = true)]
        amount: Decimal,
    },

    /// Contribution records
    Contribution {
        #[command(subcommand)]
        action: ContributionAction,
    },

    /// Loan issuance, repayment and queries
    Loan {
        #[command(subcommand)]
        action: LoanAction,
    },

    /// Generate reports
    Report {
        /// Report type
        kind: ReportKind,
        /// Report format
        #[arg(long, default_value = "markdown")]
        format: ReportFormatArg,
        /// Output file path (stdout when omitted)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum MemberAction {
    /// Register a new member
    Create {
        /// Full name
        #[arg(long, short)]
        name: String,
        /// Phone: +2547XXXXXXXX, 07XXXXXXXX or 7XXXXXXXX
        #[arg(long, short)]
        phone: String,
        /// Join date (YYYY-MM-DD), defaults to now
        #[arg(long)]
        joined: Option<chrono::NaiveDate>,
    },
    /// List members
    List {
        /// Only ACTIVE members
        #[arg(long)]
        active: bool,
    },
    /// Show member details
    Show {
        /// Member ID
        member_id: i64,
    },
    /// Find a member by phone
    Find {
        #[arg(long, short)]
        phone: String,
    },
    /// Change member status
    SetStatus {
        /// Member ID
        member_id: i64,
        status: MemberStatusArg,
    },
    /// Delete a member without contributions or loans
    Delete {
        /// Member ID
        member_id: i64,
    },
}

#[derive(Subcommand)]
pub enum ContributionAction {
    /// List contributions
    List {
        /// Only this member's
        #[arg(long, short)]
        member: Option<i64>,
    },
    /// Delete a contribution record
    Delete {
        /// Contribution ID
        contribution_id: i64,
    },
}

#[derive(Subcommand)]
pub enum LoanAction {
    /// Issue a loan
    Issue {
        /// Member ID
        member_id: i64,
        /// Principal in KES
        #[arg(allow_negative_numbers = true)]
        amount: Decimal,
        /// Repayment plan
        #[arg(long)]
        plan: PlanArg,
    },
    /// Repay part or all of a loan
    Repay {
        /// Loan ID
        loan_id: i64,
        /// Amount in KES
        #[arg(allow_negative_numbers = true)]
        amount: Decimal,
    },
    /// List loans
    List {
        /// Only this member's
        #[arg(long, short)]
        member: Option<i64>,
        /// Filter by status
        #[arg(long, short)]
        status: Option<LoanStatusArg>,
    },
    /// Show a loan with its repayments
    Show {
        /// Loan ID
        loan_id: i64,
    },
    /// Delete a loan and its repayments
    Delete {
        /// Loan ID
        loan_id: i64,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum MemberStatusArg {
    Active,
    Inactive,
    Suspended,
}

impl MemberStatusArg {
    pub fn to_core_type(&self) -> chama_core::MemberStatus {
        match self {
            MemberStatusArg::Active => chama_core::MemberStatus::Active,
            MemberStatusArg::Inactive => chama_core::MemberStatus::Inactive,
            MemberStatusArg::Suspended => chama_core::MemberStatus::Suspended,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum PlanArg {
    #[value(name = "1-month", alias = "1_month")]
    OneMonth,
    #[value(name = "6-months", alias = "6_months")]
    SixMonths,
    #[value(name = "12-months", alias = "12_months")]
    TwelveMonths,
}

impl PlanArg {
    pub fn to_core_type(&self) -> chama_core::LoanPlan {
        match self {
            PlanArg::OneMonth => chama_core::LoanPlan::OneMonth,
            PlanArg::SixMonths => chama_core::LoanPlan::SixMonths,
            PlanArg::TwelveMonths => chama_core::LoanPlan::TwelveMonths,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LoanStatusArg {
    Active,
    Paid,
    Defaulted,
}

impl LoanStatusArg {
    pub fn to_core_type(&self) -> chama_core::LoanStatus {
        match self {
            LoanStatusArg::Active => chama_core::LoanStatus::Active,
            LoanStatusArg::Paid => chama_core::LoanStatus::Paid,
            LoanStatusArg::Defaulted => chama_core::LoanStatus::Defaulted,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ReportFormatArg {
    Csv,
    Json,
    Markdown,
}

impl ReportFormatArg {
    pub fn to_format(&self) -> chama_reports::ReportFormat {
        match self {
            ReportFormatArg::Csv => chama_reports::ReportFormat::Csv,
            ReportFormatArg::Json => chama_reports::ReportFormat::Json,
            ReportFormatArg::Markdown => chama_reports::ReportFormat::Markdown,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ReportKind {
    Summary,
    Arrears,
    Loans,
    Members,
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Init { force } => {
            db::init_database(&cli.db, force).await?;
            println!("✅ Database initialized at {:?}", cli.db);
        }

        Commands::Status => {
            db::show_status(&cli.db).await?;
        }

        Commands::Member { action } => {
            let (database, ctx) = db::open(&cli.db, cli.policy.as_deref()).await?;
            member::handle(&ctx, action).await?;
            database.close().await;
        }

        Commands::Contribute { member_id, amount } => {
            let (database, ctx) = db::open(&cli.db, cli.policy.as_deref()).await?;
            contribution::contribute(&ctx, member_id, amount).await?;
            database.close().await;
        }

        Commands::Contribution { action } => {
            let (database, ctx) = db::open(&cli.db, cli.policy.as_deref()).await?;
            contribution::handle(&ctx, action).await?;
            database.close().await;
        }

        Commands::Loan { action } => {
            let (database, ctx) = db::open(&cli.db, cli.policy.as_deref()).await?;
            loan::handle(&ctx, action).await?;
            database.close().await;
        }

        Commands::Report {
            kind,
            format,
            output,
        } => {
            let (database, ctx) = db::open(&cli.db, cli.policy.as_deref()).await?;
            report::generate(&ctx, kind, format, output.as_deref()).await?;
            database.close().await;
        }
    }

    Ok(())
}

/// Render a failure as `[kind] reason`
fn describe_failure(err: &anyhow::Error) -> String {
    match err.downcast_ref::<BusinessError>() {
        Some(business) => format!("[{}] {}", business.kind(), business.reason()),
        None => format!("{:#}", err),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error = ?err, "Command failed");
            eprintln!("❌ {}", describe_failure(&err));
            ExitCode::FAILURE
        }
    }
}
