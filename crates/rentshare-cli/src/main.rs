//! Rentshare CLI
//!
//! Command-line surface over `rentshare-core`: registry, rent records,
//! versioned ownership percentages, fee recalculation and reports.

mod app;
mod cli;
mod commands;
mod config;
mod constants;
mod errors;
mod helpers;
mod output;
mod ui;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::app::AppContext;
use crate::cli::{Cli, Commands};

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let ctx = AppContext::new(&cli);

    if let Err(err) = run(&ctx) {
        let (code, hint) = errors::classify(&err);
        ui::print_error(ctx.ui(), &err.to_string(), hint.as_deref());
        std::process::exit(code);
    }
}

/// Log to stderr so diagnostics never mix with JSON on stdout.
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn run(ctx: &AppContext) -> anyhow::Result<()> {
    match &ctx.cli().command {
        Commands::Init(args) => commands::handle_init(ctx, args),
        Commands::Property { command } => commands::handle_property(ctx, command),
        Commands::Owner { command } => commands::handle_owner(ctx, command),
        Commands::Rent { command } => commands::handle_rent(ctx, command),
        Commands::Share { command } => commands::handle_share(ctx, command),
        Commands::Recalculate(args) => commands::handle_recalculate(ctx, args),
        Commands::Report { command } => commands::handle_report(ctx, command),
        Commands::Check => commands::handle_check(ctx),
    }
}
