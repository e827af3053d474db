use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use servicebook::config::ClientConfig;
use servicebook::controllers::{AdminDashboard, AdminView, AuthController, LoginRole, UserDashboard, UserView};
use servicebook::devserver;
use servicebook::models::{BookingForm, Credentials, Registration, ServiceType, StatusMessage};
use servicebook::services::api::BookingApi;
use servicebook::services::confirm::{Confirm, StdinConfirm};
use servicebook::services::lifecycle::{badge_class, StatusFilter};
use servicebook::state::AppState;

#[derive(Parser)]
#[command(name = "servicebook", version, about = "Vehicle service booking client")]
struct Cli {
    /// Answer yes to every confirmation prompt
    #[arg(long, global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a customer account
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        phone: String,
    },
    /// Log in as a customer
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Log in as an administrator
    AdminLogin {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the stored customer (or, with --admin, administrator) session
    Logout {
        #[arg(long)]
        admin: bool,
    },
    /// List your bookings
    Bookings,
    /// Book a service
    Book {
        #[arg(long)]
        bike_model: String,
        #[arg(long)]
        service_type: String,
        /// Booking date as YYYY-MM-DD
        #[arg(long)]
        date: String,
    },
    /// Cancel one of your pending bookings
    Cancel { id: i64 },
    /// Show the current status of a booking
    Status { id: i64 },
    /// Administrator commands
    #[command(subcommand)]
    Admin(AdminCommand),
    /// Run the in-memory development API
    DevServer {
        #[arg(long)]
        port: Option<u16>,
    },
}

#[derive(Subcommand)]
enum AdminCommand {
    /// List all bookings, optionally only one status
    List {
        #[arg(long, default_value = "ALL")]
        status: String,
    },
    /// Move a booking to PENDING, APPROVED, COMPLETED or CANCELLED
    SetStatus { id: i64, status: String },
    /// Delete a booking in any status
    Delete { id: i64 },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ClientConfig::from_env();

    let state = AppState::open(config)?;
    let confirm: Arc<dyn Confirm> = Arc::new(StdinConfirm { assume_yes: cli.yes });
    let window = state.config.message_clear_after;

    match cli.command {
        Command::Register {
            name,
            email,
            password,
            phone,
        } => {
            let auth = AuthController::new(state.anonymous_api()?, state.session.clone());
            let registration = Registration {
                name,
                email,
                password,
                phone,
            };
            report(auth.register(&registration).await)
        }
        Command::Login { email, password } => {
            let auth = AuthController::new(state.anonymous_api()?, state.session.clone());
            report(auth.login_user(&Credentials { email, password }).await)
        }
        Command::AdminLogin { email, password } => {
            let auth = AuthController::new(state.anonymous_api()?, state.session.clone());
            report(auth.login_admin(&Credentials { email, password }).await)
        }
        Command::Logout { admin } => {
            let auth = AuthController::new(state.anonymous_api()?, state.session.clone());
            let role = if admin { LoginRole::Admin } else { LoginRole::User };
            report(auth.logout(role))
        }
        Command::Bookings => {
            let dashboard = UserDashboard::new(state.user_api()?, &state.session, confirm)
                .with_message_window(window);
            dashboard.refresh().await;
            print_user_view(&dashboard.view());
            exit_status(dashboard.view().message)
        }
        Command::Book {
            bike_model,
            service_type,
            date,
        } => {
            let dashboard = UserDashboard::new(state.user_api()?, &state.session, confirm)
                .with_message_window(window);
            dashboard.set_form(BookingForm {
                bike_model,
                service_type,
                booking_date: date,
            });
            dashboard.submit_booking().await;
            print_user_view(&dashboard.view());
            exit_status(dashboard.view().message)
        }
        Command::Cancel { id } => {
            let dashboard = UserDashboard::new(state.user_api()?, &state.session, confirm)
                .with_message_window(window);
            dashboard.refresh().await;
            dashboard.cancel(id).await;
            print_user_view(&dashboard.view());
            exit_status(dashboard.view().message)
        }
        Command::Status { id } => {
            let api = state.user_api()?;
            match api.status_of(id).await {
                Ok(status) => {
                    println!(
                        "Booking #{id}: {status} ({})",
                        badge_class(Some(&status)).css_class()
                    );
                    Ok(())
                }
                Err(e) => anyhow::bail!(e.user_message("Failed to load booking status")),
            }
        }
        Command::Admin(cmd) => {
            let dashboard =
                AdminDashboard::new(state.admin_api()?, &state.session).with_message_window(window);
            match cmd {
                AdminCommand::List { status } => {
                    let filter = StatusFilter::parse(&status)
                        .ok_or_else(|| anyhow::anyhow!("unknown status filter: {status}"))?;
                    dashboard.set_filter(filter);
                    dashboard.refresh().await;
                }
                AdminCommand::SetStatus { id, status } => {
                    dashboard.set_status(id, &status).await;
                }
                AdminCommand::Delete { id } => {
                    dashboard.request_delete(id);
                    let prompt = dashboard.view().delete_prompt().unwrap_or_default();
                    if confirm.confirm(&prompt) {
                        dashboard.confirm_delete().await;
                    } else {
                        dashboard.cancel_delete_request();
                        dashboard.refresh().await;
                    }
                }
            }
            print_admin_view(&dashboard.view());
            exit_status(dashboard.view().message)
        }
        Command::DevServer { port } => {
            let port = port.unwrap_or(state.config.dev_port);
            devserver::serve(&state.config, port).await
        }
    }
}

fn report(message: StatusMessage) -> anyhow::Result<()> {
    exit_status(Some(message))
}

fn exit_status(message: Option<StatusMessage>) -> anyhow::Result<()> {
    match message {
        Some(m) if m.is_error() => anyhow::bail!(m.text),
        Some(m) => {
            println!("{}", m.text);
            Ok(())
        }
        None => Ok(()),
    }
}

fn print_user_view(view: &UserView) {
    if let Some(email) = &view.email {
        println!("Signed in as {email}");
    }
    println!(
        "Total: {}  Pending: {}  Completed: {}",
        view.total, view.pending, view.completed
    );

    if view.is_empty() {
        println!("No bookings yet. Book your first service with `servicebook book`.");
        println!(
            "Service types: {}",
            ServiceType::CATALOG.map(|s| s.as_str()).join(", ")
        );
        return;
    }

    let cancellable = view.cancellable_ids();
    for row in &view.rows {
        let b = &row.booking;
        let hint = if cancellable.contains(&b.id) {
            "  (cancellable)"
        } else {
            ""
        };
        println!(
            "#{:<5} {:<10} {:<16} {:<20} {}  [{}]{hint}",
            b.id,
            b.display_date(),
            b.bike_model,
            b.service_type,
            b.display_status(),
            row.badge.name(),
        );
    }
}

fn print_admin_view(view: &AdminView) {
    let s = view.stats;
    println!(
        "Total: {}  Pending: {}  Approved: {}  Completed: {}  Cancelled: {}",
        s.total, s.pending, s.approved, s.completed, s.cancelled
    );
    match view.showing() {
        Some(showing) => println!("Filter: {} {showing}", view.filter.as_str()),
        None => println!("Filter: {}", view.filter.as_str()),
    }

    if let Some(empty) = view.empty_state() {
        println!("{empty}");
        return;
    }

    for row in &view.rows {
        let b = &row.booking;
        let owner = b.user.clone().unwrap_or_default();
        println!(
            "#{:<5} {:<20} {:<24} {:<16} {:<20} {:<10} {}  [{}]",
            b.id,
            owner.name.as_deref().unwrap_or("N/A"),
            owner.email.as_deref().unwrap_or(""),
            b.bike_model,
            b.service_type,
            b.display_date(),
            b.display_status(),
            row.badge.name(),
        );
    }
}
