//! estate-admin: administrator console for the rental API
//!
//! Every command opens the local session store, passes the route guard for
//! its view, then talks to the backend with the stored bearer token.
//!
//! Usage:
//!   estate-admin login -e admin@example.com -p secret
//!   estate-admin dashboard
//!   estate-admin units add --number A-101 --rent 12000
//!   estate-admin towers show 3
//!   estate-admin bookings approve 7 --comments "Welcome"

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::slice;

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use tracing::{debug, error};

use estate_console::api::UnitQuery;
use estate_console::auth::peek_claims;
use estate_console::console::{
    auth_failure_message, render_amenities, render_bookings, render_identity, render_leases,
    render_overview, render_payments, render_stats, render_towers, render_units, AppContext,
    TerminalDialog,
};
use estate_console::crud::{CrudController, DeleteOutcome, Entity, FilteredUnits, SaveOutcome};
use estate_console::drafts::{AmenityDraft, TowerDraft, UnitDraft};
use estate_console::error::{ConsoleError, CrudError};
use estate_console::logging::init_logging;
use estate_console::models::{
    Amenity, BookingStatus, Credentials, LeaseStatus, RecordId, Tower, Unit, UnitStatus,
};
use estate_console::router::View;
use estate_console::screens::{BookingReview, Overview, ReviewAction};
use estate_console::{AppProfile, ClientConfig};

#[derive(Parser)]
#[command(name = "estate-admin")]
#[command(about = "Admin console for the rental API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// API base URL (overrides ESTATE_API_URL)
    #[arg(short, long, global = true)]
    url: Option<String>,

    /// Directory of the local session store (overrides ESTATE_DATA_DIR)
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
    Logout,
    /// Show the stored identity and token expiry
    Whoami {
        /// Ask the backend (`/auth/me`) instead of reading the local store
        #[arg(long)]
        remote: bool,
    },
    /// Summary figures
    Dashboard {
        /// Compute from the raw lists instead of `/stats`
        #[arg(long)]
        computed: bool,
    },
    Towers {
        #[command(subcommand)]
        action: TowerAction,
    },
    Units {
        #[command(subcommand)]
        action: UnitAction,
    },
    Amenities {
        #[command(subcommand)]
        action: AmenityAction,
    },
    Bookings {
        #[command(subcommand)]
        action: BookingAction,
    },
    Leases {
        #[command(subcommand)]
        action: LeaseAction,
    },
    Payments,
}

#[derive(Subcommand)]
enum TowerAction {
    List,
    Show {
        id: RecordId,
    },
    Add(TowerFields),
    Edit {
        id: RecordId,
        #[command(flatten)]
        fields: TowerFields,
    },
    Delete {
        id: RecordId,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Args)]
struct TowerFields {
    #[arg(short, long)]
    name: Option<String>,
    #[arg(short, long)]
    address: Option<String>,
    #[arg(short, long)]
    floors: Option<i32>,
    #[arg(short, long)]
    description: Option<String>,
}

impl TowerFields {
    fn apply(self, draft: &mut TowerDraft) {
        if let Some(name) = self.name {
            draft.name = name;
        }
        if let Some(address) = self.address {
            draft.address = address;
        }
        if let Some(floors) = self.floors {
            draft.total_floors = Some(floors);
        }
        if let Some(description) = self.description {
            draft.description = Some(description);
        }
    }
}

#[derive(Subcommand)]
enum UnitAction {
    List {
        #[arg(short, long)]
        tower: Option<RecordId>,
        #[arg(short, long)]
        status: Option<UnitStatus>,
        #[arg(short, long)]
        bedrooms: Option<i32>,
    },
    Show {
        id: RecordId,
    },
    Add(UnitFields),
    Edit {
        id: RecordId,
        #[command(flatten)]
        fields: UnitFields,
    },
    Delete {
        id: RecordId,
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Args)]
struct UnitFields {
    /// Tower id; `add` defaults to the first tower
    #[arg(short, long)]
    tower: Option<RecordId>,
    #[arg(short, long)]
    number: Option<String>,
    #[arg(long)]
    floor: Option<i32>,
    #[arg(long)]
    bedrooms: Option<i32>,
    #[arg(long)]
    bathrooms: Option<i32>,
    #[arg(long)]
    size: Option<i32>,
    #[arg(short, long)]
    rent: Option<f64>,
    #[arg(short, long)]
    status: Option<UnitStatus>,
    #[arg(short, long)]
    description: Option<String>,
}

impl UnitFields {
    fn apply(self, draft: &mut UnitDraft) {
        if self.tower.is_some() {
            draft.tower_id = self.tower;
        }
        if let Some(number) = self.number {
            draft.unit_number = number;
        }
        draft.floor = self.floor.or(draft.floor);
        draft.bedrooms = self.bedrooms.or(draft.bedrooms);
        draft.bathrooms = self.bathrooms.or(draft.bathrooms);
        draft.size_sqft = self.size.or(draft.size_sqft);
        draft.rent_amount = self.rent.or(draft.rent_amount);
        if let Some(status) = self.status {
            draft.status = status;
        }
        if let Some(description) = self.description {
            draft.description = Some(description);
        }
    }
}

#[derive(Subcommand)]
enum AmenityAction {
    List,
    Show {
        id: RecordId,
    },
    Add(AmenityFields),
    Edit {
        id: RecordId,
        #[command(flatten)]
        fields: AmenityFields,
    },
    Delete {
        id: RecordId,
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Args)]
struct AmenityFields {
    #[arg(short, long)]
    name: Option<String>,
    #[arg(short, long)]
    description: Option<String>,
    /// e.g. "6:00 AM - 10:00 PM"
    #[arg(long)]
    hours: Option<String>,
    #[arg(long)]
    active: Option<bool>,
}

impl AmenityFields {
    fn apply(self, draft: &mut AmenityDraft) {
        if let Some(name) = self.name {
            draft.name = name;
        }
        if let Some(description) = self.description {
            draft.description = Some(description);
        }
        if let Some(hours) = self.hours {
            draft.availability_hours = Some(hours);
        }
        if let Some(active) = self.active {
            draft.is_active = active;
        }
    }
}

#[derive(Subcommand)]
enum BookingAction {
    List {
        #[arg(short, long)]
        status: Option<BookingStatus>,
    },
    Show {
        id: RecordId,
    },
    Approve {
        id: RecordId,
        #[arg(short, long)]
        comments: Option<String>,
    },
    Reject {
        id: RecordId,
        #[arg(short, long)]
        comments: Option<String>,
    },
}

#[derive(Subcommand)]
enum LeaseAction {
    List {
        #[arg(short, long)]
        status: Option<LeaseStatus>,
    },
    Show {
        id: RecordId,
    },
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

    let mut ctx = match AppContext::open(AppProfile::Admin, config) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    match run(&mut ctx, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

fn report(err: &ConsoleError) {
    match err {
        // already shown through the dialog
        ConsoleError::Crud(CrudError::Api(_) | CrudError::Validation(_)) => {}
        ConsoleError::Auth(e) => eprintln!(
            "Error: {}",
            auth_failure_message(AppProfile::Admin, false, e)
        ),
        ConsoleError::LoginRequired { .. } => {
            eprintln!("Error: {err}. Run `estate-admin login` first.")
        }
        other => {
            error!(error = %other, "command failed");
            eprintln!("Error: {other}");
        }
    }
}

async fn run(ctx: &mut AppContext, command: Commands) -> Result<(), ConsoleError> {
    let mut out = io::stdout().lock();

    match command {
        Commands::Login { email, password } => {
            let navigation = ctx.login(&Credentials::new(email, password)).await?;
            if let Some(identity) = ctx.session.current_identity() {
                println!("Logged in as {} ({})", identity.name, identity.role);
            }
            debug!(view = %navigation.view(), "post-login view");
        }
        Commands::Logout => {
            ctx.logout();
            println!("Logged out.");
        }
        Commands::Whoami { remote } => {
            ctx.enter("/dashboard")?;
            if remote {
                let identity = ctx.api.me().await?;
                render_identity(&mut out, &identity)?;
            } else if let Some(identity) = ctx.session.current_identity() {
                render_identity(&mut out, identity)?;
            }
            if let Some(token) = ctx.session.token() {
                match peek_claims(&token) {
                    Ok(claims) => match claims.expires_at() {
                        Some(at) if claims.is_expired_at(Utc::now()) => {
                            println!("Token expired at {at}; log in again.")
                        }
                        Some(at) => println!("Token valid until {at}"),
                        None => println!("Token has no expiry"),
                    },
                    Err(e) => debug!(error = %e, "token is not a readable JWT"),
                }
            }
        }
        Commands::Dashboard { computed } => {
            ctx.enter(&View::Dashboard.path())?;
            if computed {
                let overview = Overview::gather(&ctx.api).await?;
                render_overview(&mut out, &overview)?;
            } else {
                let stats = ctx.api.stats().await?;
                render_stats(&mut out, &stats)?;
            }
        }
        Commands::Towers { action } => {
            ctx.enter(&View::Towers.path())?;
            let dialog = TerminalDialog::default();
            let mut screen = CrudController::<Tower>::new();
            match action {
                TowerAction::List => {
                    let towers = screen.load(&ctx.api).await?;
                    render_towers(&mut out, towers)?;
                }
                TowerAction::Show { id } => {
                    let tower = ctx.api.get_tower(id).await?;
                    render_towers(&mut out, slice::from_ref(&tower))?;
                }
                TowerAction::Add(fields) => {
                    screen.open_add();
                    if let Some(draft) = screen.draft_mut() {
                        fields.apply(draft);
                    }
                    report_save(screen.save(&ctx.api, &dialog).await?);
                    render_towers(&mut out, screen.items())?;
                }
                TowerAction::Edit { id, fields } => {
                    open_edit(&mut screen, &ctx.api, id).await?;
                    if let Some(draft) = screen.draft_mut() {
                        fields.apply(draft);
                    }
                    report_save(screen.save(&ctx.api, &dialog).await?);
                    render_towers(&mut out, screen.items())?;
                }
                TowerAction::Delete { id, yes } => {
                    let outcome = screen.delete(&ctx.api, &TerminalDialog::new(yes), id).await?;
                    report_delete(outcome);
                }
            }
        }
        Commands::Units { action } => {
            ctx.enter(&View::Units { tower_id: None }.path())?;
            let dialog = TerminalDialog::default();
            let mut screen = CrudController::<Unit>::new();
            match action {
                UnitAction::List {
                    tower,
                    status,
                    bedrooms,
                } => {
                    let filtered = FilteredUnits {
                        api: &ctx.api,
                        query: UnitQuery {
                            tower_id: tower,
                            status,
                            bedrooms,
                        },
                    };
                    let units = screen.load(&filtered).await?;
                    render_units(&mut out, units)?;
                }
                UnitAction::Show { id } => {
                    let unit = ctx.api.get_unit(id).await?;
                    render_units(&mut out, slice::from_ref(&unit))?;
                }
                UnitAction::Add(fields) => {
                    let towers = ctx.api.list_towers().await?;
                    screen.open_add_with(UnitDraft::for_tower(towers.first().map(|t| t.id)));
                    if let Some(draft) = screen.draft_mut() {
                        fields.apply(draft);
                    }
                    report_save(screen.save(&ctx.api, &dialog).await?);
                    render_units(&mut out, screen.items())?;
                }
                UnitAction::Edit { id, fields } => {
                    open_edit(&mut screen, &ctx.api, id).await?;
                    if let Some(draft) = screen.draft_mut() {
                        fields.apply(draft);
                    }
                    report_save(screen.save(&ctx.api, &dialog).await?);
                    render_units(&mut out, screen.items())?;
                }
                UnitAction::Delete { id, yes } => {
                    let outcome = screen.delete(&ctx.api, &TerminalDialog::new(yes), id).await?;
                    report_delete(outcome);
                }
            }
        }
        Commands::Amenities { action } => {
            ctx.enter(&View::Amenities.path())?;
            let dialog = TerminalDialog::default();
            let mut screen = CrudController::<Amenity>::new();
            match action {
                AmenityAction::List => {
                    let amenities = screen.load(&ctx.api).await?;
                    render_amenities(&mut out, amenities)?;
                }
                AmenityAction::Show { id } => {
                    let amenity = ctx.api.get_amenity(id).await?;
                    render_amenities(&mut out, slice::from_ref(&amenity))?;
                }
                AmenityAction::Add(fields) => {
                    screen.open_add();
                    if let Some(draft) = screen.draft_mut() {
                        fields.apply(draft);
                    }
                    report_save(screen.save(&ctx.api, &dialog).await?);
                    render_amenities(&mut out, screen.items())?;
                }
                AmenityAction::Edit { id, fields } => {
                    open_edit(&mut screen, &ctx.api, id).await?;
                    if let Some(draft) = screen.draft_mut() {
                        fields.apply(draft);
                    }
                    report_save(screen.save(&ctx.api, &dialog).await?);
                    render_amenities(&mut out, screen.items())?;
                }
                AmenityAction::Delete { id, yes } => {
                    let outcome = screen.delete(&ctx.api, &TerminalDialog::new(yes), id).await?;
                    report_delete(outcome);
                }
            }
        }
        Commands::Bookings { action } => {
            ctx.enter(&View::Bookings.path())?;
            let mut review = BookingReview::new();
            match action {
                BookingAction::List { status } => {
                    let bookings = review.load(&ctx.api, status).await?;
                    render_bookings(&mut out, bookings)?;
                }
                BookingAction::Show { id } => {
                    let booking = ctx.api.get_booking(id).await?;
                    render_bookings(&mut out, slice::from_ref(&booking))?;
                }
                BookingAction::Approve { id, comments } => {
                    review_booking(&mut review, ctx, id, ReviewAction::Approve, comments).await?;
                    render_bookings(&mut out, review.bookings())?;
                }
                BookingAction::Reject { id, comments } => {
                    review_booking(&mut review, ctx, id, ReviewAction::Reject, comments).await?;
                    render_bookings(&mut out, review.bookings())?;
                }
            }
        }
        Commands::Leases { action } => {
            ctx.enter(&View::Leases.path())?;
            match action {
                LeaseAction::List { status } => {
                    let leases = ctx.api.list_leases(status).await?;
                    render_leases(&mut out, &leases)?;
                }
                LeaseAction::Show { id } => {
                    let lease = ctx.api.get_lease(id).await?;
                    render_leases(&mut out, slice::from_ref(&lease))?;
                }
            }
        }
        Commands::Payments => {
            ctx.enter(&View::Leases.path())?;
            let payments = ctx.api.list_payments().await?;
            render_payments(&mut out, &payments)?;
        }
    }

    Ok(())
}

/// Load the list and open the edit modal for `id`.
async fn open_edit<E>(
    screen: &mut CrudController<E>,
    api: &estate_console::ApiClient,
    id: RecordId,
) -> Result<(), ConsoleError>
where
    E: Entity,
{
    screen.load(api).await?;
    let record = screen.find(id).cloned().ok_or(ConsoleError::NotFound {
        entity: <E::Draft as estate_console::drafts::Draft>::ENTITY,
        id,
    })?;
    screen.open_edit(&record);
    Ok(())
}

async fn review_booking(
    review: &mut BookingReview,
    ctx: &AppContext,
    id: RecordId,
    action: ReviewAction,
    comments: Option<String>,
) -> Result<(), ConsoleError> {
    review.load(&ctx.api, None).await?;
    if !review.open(id, action) {
        return Err(ConsoleError::NotFound {
            entity: "pending booking",
            id,
        });
    }
    if let Some(comments) = comments {
        review.set_comments(comments);
    }
    review
        .submit(&ctx.api, &TerminalDialog::default())
        .await
        .map_err(CrudError::from)?;
    println!("Booking {id} {}.", match action {
        ReviewAction::Approve => "approved",
        ReviewAction::Reject => "rejected",
    });
    Ok(())
}

fn report_save(outcome: SaveOutcome) {
    match outcome {
        SaveOutcome::Created => println!("Created."),
        SaveOutcome::Updated(id) => println!("Updated {id}."),
    }
}

fn report_delete(outcome: DeleteOutcome) {
    match outcome {
        DeleteOutcome::Deleted(id) => println!("Deleted {id}."),
        DeleteOutcome::Cancelled => println!("Cancelled."),
    }
}
