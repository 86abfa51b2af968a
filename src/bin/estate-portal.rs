//! estate-portal: tenant front end for the rental API
//!
//! Usage:
//!   estate-portal register -n "Priya" -e priya@example.com --phone 555-0100 -p secret
//!   estate-portal towers
//!   estate-portal units 2 --status available
//!   estate-portal book 14 --tower 2 --months 6
//!   estate-portal my-bookings

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use tracing::{debug, error};

use estate_console::console::{
    auth_failure_message, render_amenities, render_bookings, render_identity, render_towers,
    render_units, AppContext,
};
use estate_console::error::{ConsoleError, CrudError};
use estate_console::logging::init_logging;
use estate_console::models::{
    filter_by_status, Credentials, RecordId, Registration, UnitStatus,
};
use estate_console::router::View;
use estate_console::screens::{active_amenities, UnitBrowser, BOOKING_SUBMITTED};
use estate_console::{AppProfile, ClientConfig};

#[derive(Parser)]
#[command(name = "estate-portal")]
#[command(about = "Tenant portal for the rental API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, global = true)]
    url: Option<String>,

    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    Register {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        email: String,
        #[arg(long)]
        phone: String,
        #[arg(short, long)]
        password: String,
    },
    Logout,
    Whoami,
    Towers,
    /// Units of one tower
    Units {
        tower_id: RecordId,
        #[arg(short, long)]
        status: Option<UnitStatus>,
    },
    /// Request a booking for a unit
    Book {
        unit_id: RecordId,
        /// Tower the unit belongs to
        #[arg(short, long)]
        tower: RecordId,
        /// Move-in date (YYYY-MM-DD), defaults to tomorrow
        #[arg(long)]
        move_in: Option<NaiveDate>,
        /// Lease length in months
        #[arg(short, long)]
        months: Option<u32>,
    },
    Amenities,
    MyBookings,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = ClientConfig::from_env().with_overrides(cli.url, cli.data_dir);

    let _log_guard = match init_logging(&config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("warning: {e}");
            None
        }
    };

    let mut ctx = match AppContext::open(AppProfile::Tenant, config) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let registering = matches!(cli.command, Commands::Register { .. });
    match run(&mut ctx, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(ConsoleError::Auth(e)) => {
            eprintln!(
                "Error: {}",
                auth_failure_message(AppProfile::Tenant, registering, &e)
            );
            ExitCode::FAILURE
        }
        // booking failures are printed from the form
        Err(ConsoleError::Crud(_)) => ExitCode::FAILURE,
        Err(ConsoleError::LoginRequired { return_url }) => {
            eprintln!(
                "Error: login required to open {}. Run `estate-portal login` first.",
                return_url.as_deref().unwrap_or("this view")
            );
            ExitCode::FAILURE
        }
        Err(e) => {
            error!(error = %e, "command failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(ctx: &mut AppContext, command: Commands) -> Result<(), ConsoleError> {
    let mut out = io::stdout().lock();

    match command {
        Commands::Login { email, password } => {
            let navigation = ctx.login(&Credentials::new(email, password)).await?;
            if let Some(identity) = ctx.session.current_identity() {
                println!("Welcome, {}!", identity.name);
            }
            debug!(view = %navigation.view(), "post-login view");
        }
        Commands::Register {
            name,
            email,
            phone,
            password,
        } => {
            ctx.register(&Registration {
                name,
                email,
                phone,
                password,
            })
            .await?;
            if let Some(identity) = ctx.session.current_identity() {
                println!("Account created. Welcome, {}!", identity.name);
            }
        }
        Commands::Logout => {
            ctx.logout();
            println!("Logged out.");
        }
        Commands::Whoami => {
            ctx.enter(&View::Towers.path())?;
            let identity = ctx.api.me().await?;
            render_identity(&mut out, &identity)?;
        }
        Commands::Towers => {
            ctx.enter(&View::Towers.path())?;
            let towers = ctx.api.list_towers().await?;
            render_towers(&mut out, &towers)?;
        }
        Commands::Units { tower_id, status } => {
            ctx.enter(&View::Units { tower_id: Some(tower_id) }.path())?;
            let mut browser = UnitBrowser::new(tower_id);
            let units = browser.load(&ctx.api).await?;
            match status {
                Some(status) => {
                    let shown: Vec<_> = filter_by_status(units, status).into_iter().cloned().collect();
                    render_units(&mut out, &shown)?;
                }
                None => render_units(&mut out, units)?,
            }
        }
        Commands::Book {
            unit_id,
            tower,
            move_in,
            months,
        } => {
            ctx.enter(&View::Units { tower_id: Some(tower) }.path())?;
            let today = Local::now().date_naive();
            let mut browser = UnitBrowser::new(tower);
            browser.load(&ctx.api).await?;
            if !browser.open(unit_id, today) {
                return Err(ConsoleError::NotFound {
                    entity: "unit",
                    id: unit_id,
                });
            }
            if let Some(request) = browser.request_mut() {
                if let Some(date) = move_in {
                    request.requested_move_in_date = date;
                }
                if let Some(months) = months {
                    request.lease_duration = months;
                }
            }

            match browser.submit(&ctx.api, today).await {
                Ok(next) => {
                    println!("{BOOKING_SUBMITTED}");
                    let view = ctx.enter(&next.path())?;
                    debug!(%view, "moved after booking");
                    let bookings = ctx.api.list_bookings(None).await?;
                    render_bookings(&mut out, &bookings)?;
                }
                Err(e) => {
                    let message = browser
                        .modal()
                        .and_then(|m| m.message.clone())
                        .unwrap_or_else(|| e.to_string());
                    eprintln!("Error: {message}");
                    return Err(shown(e));
                }
            }
        }
        Commands::Amenities => {
            ctx.enter(&View::Amenities.path())?;
            let amenities = active_amenities(ctx.api.list_amenities().await?);
            render_amenities(&mut out, &amenities)?;
        }
        Commands::MyBookings => {
            ctx.enter(&View::MyBookings.path())?;
            let bookings = ctx.api.list_bookings(None).await?;
            render_bookings(&mut out, &bookings)?;
        }
    }

    Ok(())
}

/// Mark an error the form already displayed.
fn shown(err: ConsoleError) -> ConsoleError {
    match err {
        ConsoleError::Api(e) => CrudError::Api(e).into(),
        ConsoleError::Validation(e) => CrudError::Validation(e).into(),
        other => other,
    }
}
