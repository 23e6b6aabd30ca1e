//! Loan commands

use anyhow::Result;
use chama_business::{LoanService, ServiceContext};
use chama_core::{format_money, Loan};

use crate::LoanAction;

/// Handle loan subcommands
pub async fn handle(ctx: &ServiceContext, action: LoanAction) -> Result<()> {
    let service = LoanService::new(ctx);

    match action {
        LoanAction::Issue {
            member_id,
            amount,
            plan,
        } => {
            let plan = plan.to_core_type();
            let loan = service.issue(member_id, amount, plan).await?;
            println!("✅ Loan issued!");
            println!("   Loan:      #{}", loan.id);
            println!("   Member:    #{}", loan.member_id);
            println!("   Plan:      {}", plan);
            println!("   Principal: {}", format_money(loan.principal));
            println!("   Interest:  {}", format_money(loan.interest()));
            println!("   Balance:   {}", format_money(loan.balance));
            println!("   Due:       {}", loan.due_at);
        }
        LoanAction::Repay { loan_id, amount } => {
            let receipt = service.repay(loan_id, amount).await?;
            let outcome = &receipt.outcome;
            println!("✅ Repayment applied!");
            println!("   Repayment: #{}", receipt.repayment.id);
            println!("   Amount:    {}", format_money(outcome.amount));
            println!("   Balance:   {} -> {}", outcome.previous_balance, outcome.balance);
            println!("   Status:    {}", outcome.status);
            if outcome.is_paid_off() {
                println!("🎉 Loan #{} is fully paid", loan_id);
            }
        }
        LoanAction::List { member, status } => {
            let status = status.map(|s| s.to_core_type());
            let loans = match (member, status) {
                (Some(member_id), None) => service.for_member(member_id).await?,
                (Some(member_id), Some(status)) => {
                    let mut loans = service.for_member(member_id).await?;
                    loans.retain(|loan| loan.status == status);
                    loans
                }
                (None, Some(status)) => service.by_status(status).await?,
                (None, None) => service.list().await?,
            };
            list_loans(&loans);
        }
        LoanAction::Show { loan_id } => {
            let loan = service.get(loan_id).await?;
            let repayments = service.repayments(loan_id).await?;

            println!("💳 {}", loan);
            println!("   Issued:    {}", loan.issued_at);
            println!("   Due:       {}", loan.due_at);
            println!("   Rate:      {}%", loan.interest_rate);
            println!("   Principal: {}", format_money(loan.principal));
            println!("   Balance:   {}", format_money(loan.balance));
            println!("   Status:    {}", loan.status);
            if repayments.is_empty() {
                println!("   Repayments: none");
            } else {
                println!("   Repayments:");
                for r in &repayments {
                    println!("     #{:<5} {:>12} at {}", r.id, format!("{:.2}", r.amount), r.paid_at);
                }
            }
        }
        LoanAction::Delete { loan_id } => {
            let deletion = service.delete(loan_id).await?;
            println!(
                "✅ Deleted loan #{} with {} repayment(s)",
                deletion.loan.id, deletion.repayments_removed
            );
        }
    }

    Ok(())
}

fn list_loans(loans: &[Loan]) {
    if loans.is_empty() {
        println!("No loans found");
        return;
    }

    println!(
        "{:<6} {:<8} {:>12} {:>12} {:<12} {:<10}",
        "ID", "Member", "Principal", "Balance", "Due", "Status"
    );
    println!("{}", "-".repeat(64));
    for loan in loans {
        println!(
            "{:<6} {:<8} {:>12} {:>12} {:<12} {:<10}",
            loan.id,
            loan.member_id,
            format!("{:.2}", loan.principal),
            format!("{:.2}", loan.balance),
            loan.due_at.date(),
            loan.status.as_str()
        );
    }
    println!();
    println!("Total: {} loan(s)", loans.len());
}
