//! Database initialization, status and the service context

use anyhow::{bail, Context, Result};
use chama_business::{ServiceContext, SolvencyService};
use chama_core::{format_money, LendingPolicy};
use chama_persistence::{ContributionRepo, Database, LoanRepo, MemberRepo, RepaymentRepo};
use std::path::Path;
use tracing::info;

fn database_url(db_path: &Path) -> String {
    format!("sqlite:{}", db_path.display())
}

/// Create the database file and apply migrations
pub async fn init_database(db_path: &Path, force: bool) -> Result<()> {
    if force && db_path.exists() {
        std::fs::remove_file(db_path).context("Failed to remove existing database")?;
        println!("🗑️  Removed existing database");
    }
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    println!("📦 Applying schema...");
    let db = Database::init_with_migrations(&database_url(db_path))
        .await
        .context("Failed to initialize database")?;
    db.close().await;

    info!(path = %db_path.display(), "Database initialized");
    Ok(())
}

/// Open an initialized database
pub async fn connect(db_path: &Path) -> Result<Database> {
    if !db_path.exists() {
        bail!(
            "Database not found at {}. Run 'chama init' first.",
            db_path.display()
        );
    }
    Database::new(&database_url(db_path))
        .await
        .context("Failed to connect to database")
}

/// Default policy, or the one in `path`
pub fn load_policy(path: Option<&Path>) -> Result<LendingPolicy> {
    match path {
        Some(path) => {
            let policy = LendingPolicy::from_file(path)?;
            info!(
                path = %path.display(),
                min_tenure_days = policy.min_tenure_days,
                exposure_multiple = %policy.exposure_multiple,
                "Lending policy loaded"
            );
            Ok(policy)
        }
        None => Ok(LendingPolicy::default()),
    }
}

/// Database plus a service context over it
pub async fn open(db_path: &Path, policy: Option<&Path>) -> Result<(Database, ServiceContext)> {
    let policy = load_policy(policy)?;
    let db = connect(db_path).await?;
    let ctx = ServiceContext::new(&db).with_policy(policy);
    Ok((db, ctx))
}

/// Show database status
pub async fn show_status(db_path: &Path) -> Result<()> {
    if !db_path.exists() {
        println!("❌ Database not found at {:?}", db_path);
        println!("   Run 'chama init' to create the database");
        return Ok(());
    }

    let db = connect(db_path).await?;
    let pool = db.pool();

    println!("📊 Database Status");
    println!("   Path: {:?}", db_path);
    println!();
    println!("   Members:       {}", MemberRepo::count(pool).await?);
    println!("   Contributions: {}", ContributionRepo::count(pool).await?);
    println!("   Loans:         {}", LoanRepo::count(pool).await?);
    println!("   Repayments:    {}", RepaymentRepo::count(pool).await?);

    let ctx = ServiceContext::new(&db);
    let summary = SolvencyService::new(&ctx).group_summary().await?;
    println!();
    println!("   Group savings: {}", format_money(summary.contribution_total));
    println!("   Outstanding:   {}", format_money(summary.outstanding_total));
    println!("   Headroom:      {}", format_money(summary.lending_headroom));

    db.close().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_connect_requires_init() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("chama.db");

        let err = connect(&path).await.unwrap_err();
        assert!(err.to_string().contains("chama init"));

        init_database(&path, false).await.unwrap();
        let db = connect(&path).await.unwrap();
        assert_eq!(MemberRepo::count(db.pool()).await.unwrap(), 0);
        db.close().await;
    }

    #[tokio::test]
    async fn test_force_init_resets_data() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chama.db");
        init_database(&path, false).await.unwrap();

        let (db, ctx) = open(&path, None).await.unwrap();
        chama_business::MemberService::new(&ctx)
            .register("Wanjiru", "0712345678")
            .await
            .unwrap();
        db.close().await;

        init_database(&path, true).await.unwrap();
        let db = connect(&path).await.unwrap();
        assert_eq!(MemberRepo::count(db.pool()).await.unwrap(), 0);
        db.close().await;
    }

    #[test]
    fn test_policy_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("policy.json");
        std::fs::write(&path, r#"{ "min_tenure_days": 30 }"#).unwrap();

        let policy = load_policy(Some(&path)).unwrap();
        assert_eq!(policy.min_tenure_days, 30);
        assert_eq!(policy.exposure_multiple, LendingPolicy::default().exposure_multiple);
        assert_eq!(load_policy(None).unwrap(), LendingPolicy::default());
    }
}
