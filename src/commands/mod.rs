//! CLI subcommands

pub mod build;
pub mod check_email;
pub mod clean;
pub mod init;
pub mod list;
pub mod new;
