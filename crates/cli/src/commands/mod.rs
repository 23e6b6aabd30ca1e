//! Subcommand handlers

pub mod contribution;
pub mod loan;
pub mod member;
pub mod report;
