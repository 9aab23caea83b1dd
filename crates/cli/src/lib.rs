pub mod client;
pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "palmsure",
    about = "Palmsure operator CLI",
    long_about = "Submit contact messages and quote requests to a running palmsure-server, inspect configuration, and run readiness checks.",
    after_help = "Examples:\n  palmsure doctor --json\n  palmsure config\n  palmsure contact --full-name \"Jane Doe\" --email jane@x.com --message \"Hello\"\n  palmsure quote --category vehicle --first-name Sam --last-name Nkosi --email sam@x.com --phone \"021 555 0000\" --vehicle-make Toyota --vehicle-model Corolla --vehicle-year 2021"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Submit a contact-form message through the notification endpoint")]
    Contact(commands::contact::ContactArgs),
    #[command(about = "Drive the quote wizard step by step and submit a quote request")]
    Quote(commands::quote::QuoteArgs),
    #[command(about = "Validate config, mail transport readiness, and server reachability")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Contact(args) => commands::contact::run(args),
        Command::Quote(args) => commands::quote::run(args),
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
