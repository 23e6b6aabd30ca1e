//! Contribution commands

use anyhow::Result;
use chama_business::{ContributionService, ServiceContext};
use chama_core::{format_money, Contribution};
use rust_decimal::Decimal;

use crate::ContributionAction;

/// Record a contribution
pub async fn contribute(ctx: &ServiceContext, member_id: i64, amount: Decimal) -> Result<()> {
    let service = ContributionService::new(ctx);
    let receipt = service.record(member_id, amount).await?;
    let total = service.total_for_member(member_id).await?;

    if receipt.merged {
        println!("✅ Added to today's contribution!");
    } else {
        println!("✅ Contribution recorded!");
    }
    println!("   Record:    #{}", receipt.contribution.id);
    println!("   Amount:    {}", format_money(receipt.amount));
    println!("   Today:     {}", format_money(receipt.contribution.amount));
    println!("   Total:     {}", format_money(total));
    Ok(())
}

/// Handle contribution subcommands
pub async fn handle(ctx: &ServiceContext, action: ContributionAction) -> Result<()> {
    let service = ContributionService::new(ctx);

    match action {
        ContributionAction::List { member } => {
            let contributions = match member {
                Some(member_id) => service.list_for_member(member_id).await?,
                None => service.list_all().await?,
            };
            list_contributions(&contributions);
        }
        ContributionAction::Delete { contribution_id } => {
            let deleted = service.delete(contribution_id).await?;
            println!(
                "✅ Deleted contribution #{} ({} from member #{})",
                deleted.id,
                format_money(deleted.amount),
                deleted.member_id
            );
        }
    }

    Ok(())
}

fn list_contributions(contributions: &[Contribution]) {
    if contributions.is_empty() {
        println!("No contributions found");
        return;
    }

    println!("{:<6} {:<8} {:>14} {:<20}", "ID", "Member", "Amount", "Date");
    println!("{}", "-".repeat(52));
    for c in contributions {
        println!(
            "{:<6} {:<8} {:>14} {:<20}",
            c.id,
            c.member_id,
            format!("{:.2}", c.amount),
            c.date
        );
    }
    let total = chama_core::contribution::total(contributions);
    println!();
    println!("Total: {} over {} record(s)", format_money(total), contributions.len());
}
