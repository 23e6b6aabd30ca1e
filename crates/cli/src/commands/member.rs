//! Member management commands

use anyhow::Result;
use chama_business::{ContributionService, LoanService, MemberService, ServiceContext};
use chama_core::{format_money, Member};
use chrono::NaiveTime;

use crate::MemberAction;

/// Handle member subcommands
pub async fn handle(ctx: &ServiceContext, action: MemberAction) -> Result<()> {
    let service = MemberService::new(ctx);

    match action {
        MemberAction::Create { name, phone, joined } => {
            let member = match joined {
                Some(date) => {
                    service
                        .register_joined(&name, &phone, date.and_time(NaiveTime::MIN))
                        .await?
                }
                None => service.register(&name, &phone).await?,
            };
            println!("✅ Member registered:");
            print_member(&member);
        }
        MemberAction::List { active } => {
            let members = if active {
                service.list_active().await?
            } else {
                service.list().await?
            };
            list_members(&members);
        }
        MemberAction::Show { member_id } => {
            let member = service.get(member_id).await?;
            show_member(ctx, &member).await?;
        }
        MemberAction::Find { phone } => match service.find_by_phone(&phone).await? {
            Some(member) => show_member(ctx, &member).await?,
            None => println!("No member with phone {}", phone.trim()),
        },
        MemberAction::SetStatus { member_id, status } => {
            let member = service.set_status(member_id, status.to_core_type()).await?;
            println!("✅ Member #{} is now {}", member.id, member.status);
        }
        MemberAction::Delete { member_id } => {
            let member = service.delete(member_id).await?;
            println!("✅ Deleted member #{} ({})", member.id, member.name);
        }
    }

    Ok(())
}

fn print_member(member: &Member) {
    println!("   ID:      {}", member.id);
    println!("   Name:    {}", member.name);
    println!("   Phone:   {}", member.phone);
    println!("   Joined:  {}", member.join_date);
    println!("   Status:  {}", member.status);
}

fn list_members(members: &[Member]) {
    if members.is_empty() {
        println!("No members found");
        return;
    }

    println!("{:<6} {:<24} {:<15} {:<12} {:<10}", "ID", "Name", "Phone", "Joined", "Status");
    println!("{}", "-".repeat(70));
    for m in members {
        println!(
            "{:<6} {:<24} {:<15} {:<12} {:<10}",
            m.id,
            m.name,
            m.phone.as_str(),
            m.join_date.date(),
            m.status.as_str()
        );
    }
    println!();
    println!("Total: {} member(s)", members.len());
}

/// Details with savings and loans
async fn show_member(ctx: &ServiceContext, member: &Member) -> Result<()> {
    let total = ContributionService::new(ctx).total_for_member(member.id).await?;
    let loans = LoanService::new(ctx).for_member(member.id).await?;

    println!("👤 {}", member.name);
    print_member(member);
    println!("   Tenure:  {} day(s)", member.tenure_days(ctx.now()));
    println!("   Saved:   {}", format_money(total));
    println!("   Cap:     {}", format_money(ctx.policy().individual_cap(total)));

    if loans.is_empty() {
        println!("   Loans:   none");
    } else {
        println!("   Loans:");
        for loan in &loans {
            println!(
                "     #{:<5} principal {:>12} balance {:>12} due {} {}",
                loan.id,
                format!("{:.2}", loan.principal),
                format!("{:.2}", loan.balance),
                loan.due_at.date(),
                loan.status
            );
        }
    }
    Ok(())
}
