use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod clients;
mod config;
mod error;
mod format;
mod http;
mod identity;
mod init;
mod invoice;
mod invoices;
mod log;
mod models;
mod projects;
mod services;
mod setup;
mod time_entries;
mod timer;
mod weekly;

use cli::{Cli, Commands};
use error::Error;
use invoice::InvoiceOptions;
use log::LogOptions;
use timer::StartOptions;

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    if let Err(err) = run(&cli) {
        match err {
            Error::Unauthorized { .. } => {
                eprintln!("Error: token expired. Run `freshlog setup` to re-authenticate.");
            }
            other => eprintln!("Error: {other}"),
        }
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), Error> {
    match &cli.command {
        Commands::Setup => setup::run_setup(),
        Commands::Refresh => setup::run_refresh(),
        Commands::Weekly { week_of, json } => {
            let cfg = config::load()?;
            let client = http::api_client(&cfg);
            let summary = weekly::run_weekly(&client, &cfg, *week_of)?;
            if *json {
                println!("{}", format::json(&summary)?);
            } else {
                println!("{}", format::table(&summary));
            }
            Ok(())
        }
        Commands::Clients => {
            let cfg = config::load()?;
            let client = http::api_client(&cfg);
            println!("{}", clients::run_clients(&client, &cfg.account_id)?);
            Ok(())
        }
        Commands::Invoice {
            client_id,
            rate,
            currency,
            dry_run,
            notes,
        } => {
            let cfg = config::load()?;
            let client = http::api_client(&cfg);
            let options = InvoiceOptions {
                rate: rate.clone(),
                currency: currency.clone(),
                dry_run: *dry_run,
                notes: notes.clone(),
            };
            println!("{}", invoice::run_invoice(&client, &cfg, *client_id, &options)?);
            Ok(())
        }
        Commands::Log {
            message,
            duration,
            client,
            project,
            service,
            no_billable,
        } => {
            let options = LogOptions {
                message: message.clone(),
                duration: duration.clone(),
                client: *client,
                project: *project,
                service: *service,
                no_billable: *no_billable,
            };
            println!("{}", log::run_log(&options)?);
            Ok(())
        }
        Commands::Start {
            message,
            client,
            project,
            service,
            no_billable,
        } => {
            let options = StartOptions {
                message: message.clone(),
                client: *client,
                project: *project,
                service: *service,
                no_billable: *no_billable,
            };
            println!("{}", timer::run_start(&options)?);
            Ok(())
        }
        Commands::Stop { message } => {
            println!("{}", timer::run_stop(message.as_deref())?);
            Ok(())
        }
        Commands::Status => {
            println!("{}", timer::run_timer_status()?);
            Ok(())
        }
        Commands::Init => {
            println!("{}", init::run_init()?);
            Ok(())
        }
    }
}
