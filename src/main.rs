//! hotel-desk - query a hotel booking API from the terminal
//!
//! Logs go to stderr; command output (JSON or a normalized date) goes to
//! stdout.

use std::process::ExitCode;

use chrono::Local;
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hotel_desk::api::{ApiClient, ReqwestTransport};
use hotel_desk::cli::{parse_today_arg, Cli, Command};
use hotel_desk::config::ClientConfig;
use hotel_desk::data::{bookable_room_types, sort_by_price};
use hotel_desk::dates::{self, StayRequest};

type BoxError = Box<dyn std::error::Error>;

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hotel_desk=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn print_json<T: Serialize>(value: &T) -> Result<(), BoxError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn connect() -> Result<ApiClient<ReqwestTransport>, BoxError> {
    let config = ClientConfig::from_env()?;
    tracing::info!(base_url = %config.base_url, user = %config.username, "configuration loaded");
    Ok(ApiClient::connect(config)?)
}

async fn run(cli: Cli) -> Result<(), BoxError> {
    let today = parse_today_arg(cli.today.as_deref())?.unwrap_or_else(|| Local::now().date_naive());

    match cli.command {
        Command::ParseDate { expression } => {
            println!("{}", dates::parse(&expression, today));
        }
        Command::CheckStay {
            check_in,
            check_out,
            adults,
            children,
        } => {
            let stay = StayRequest::new(check_in, check_out, adults, children).validate(today)?;
            print_json(&stay)?;
        }
        Command::Ping => {
            let connected = connect()?.ensure_connected().await;
            println!("{}", if connected { "connected" } else { "unreachable" });
            if !connected {
                return Err("could not authenticate against the booking API".into());
            }
        }
        Command::RoomTypes => {
            let room_types = bookable_room_types(connect()?.room_types().await?);
            print_json(&room_types)?;
        }
        Command::RoomType { id } => {
            print_json(&connect()?.room_type(id).await?)?;
        }
        Command::Rooms => {
            print_json(&connect()?.rooms().await?)?;
        }
        Command::Availability {
            check_in,
            check_out,
            adults,
            children,
        } => {
            // Validate before touching the network
            let stay = StayRequest::new(check_in, check_out, adults, children).validate(today)?;
            tracing::info!(check_in = %stay.check_in, check_out = %stay.check_out, "searching availability");
            let mut availabilities = connect()?.availability(&stay).await?;
            sort_by_price(&mut availabilities);
            print_json(&availabilities)?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}
