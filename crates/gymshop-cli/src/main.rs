mod account;
mod cart;
mod shop;

use std::sync::Arc;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use gymshop_client::{Session, StorefrontClient};
use gymshop_core::{AppConfig, JsonFileStore, KeyValueStore};
use gymshop_storefront::{Notifier, TracingNotifier};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "gymshop")]
#[command(about = "Gym storefront command line client")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Sign in and store the session locally
    Login {
        #[arg(long)]
        email: String,
        /// Read from `GYMSHOP_PASSWORD` when omitted
        #[arg(long, env = "GYMSHOP_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Sign out and wipe the local session
    Logout,
    /// Browse the service catalog
    Services {
        #[command(subcommand)]
        command: ServicesCommands,
    },
    /// Inspect and edit the cart
    Cart {
        #[command(subcommand)]
        command: CartCommands,
    },
    /// Check availability and book a service
    Booking {
        #[command(subcommand)]
        command: BookingCommands,
    },
    /// Manage delivery addresses
    Addresses {
        #[command(subcommand)]
        command: AddressCommands,
    },
    /// Finish a checkout from a gateway return URL
    Payment {
        #[command(subcommand)]
        command: PaymentCommands,
    },
}

#[derive(Debug, Subcommand)]
enum ServicesCommands {
    /// One page of services
    List {
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value = "1")]
        page: u32,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Detail of one service with its variants and staff
    Show { id: i64 },
}

#[derive(Debug, Subcommand)]
enum CartCommands {
    Show,
    /// Include one row in checkout
    Select { id: i64 },
    /// Exclude one row from checkout
    Unselect { id: i64 },
    SelectAll,
    UnselectAll,
    /// Set a row's quantity
    Qty { id: i64, quantity: i64 },
    Remove { id: i64 },
}

#[derive(Debug, Subcommand)]
enum BookingCommands {
    /// Days with open capacity in a month
    Days {
        service: i64,
        year: i32,
        month: u32,
        #[arg(long)]
        variant: Option<i64>,
        #[arg(long)]
        staff: Option<i64>,
    },
    /// Open time slots on a day (YYYY-MM-DD)
    Slots {
        service: i64,
        date: NaiveDate,
        #[arg(long)]
        variant: Option<i64>,
        #[arg(long)]
        staff: Option<i64>,
    },
    /// Book the slot at `slot` (index from `booking slots`)
    Book {
        service: i64,
        date: NaiveDate,
        slot: usize,
        #[arg(long)]
        variant: Option<i64>,
        #[arg(long)]
        size: Option<i64>,
        #[arg(long)]
        staff: Option<i64>,
        #[arg(long, default_value = "1")]
        quantity: i64,
    },
}

#[derive(Debug, Subcommand)]
enum AddressCommands {
    List,
    SetDefault { id: i64 },
    Delete { id: i64 },
}

#[derive(Debug, Subcommand)]
enum PaymentCommands {
    /// Verify a VNPay return URL and create the order when paid
    VnpayReturn { url: String },
    /// Verify a MoMo return URL and create the order when paid
    MomoReturn { url: String },
    /// List checkouts still waiting for a gateway return
    Pending,
}

/// Everything a command handler needs.
pub(crate) struct App {
    pub(crate) config: AppConfig,
    pub(crate) client: Arc<StorefrontClient>,
    pub(crate) notifier: Arc<dyn Notifier>,
    pub(crate) store: Arc<dyn KeyValueStore>,
}

impl App {
    fn build(config: AppConfig) -> anyhow::Result<Self> {
        let store: Arc<dyn KeyValueStore> = Arc::new(
            JsonFileStore::open(&config.state_path)
                .with_context(|| format!("opening state file {}", config.state_path.display()))?,
        );
        tracing::debug!(state_path = %config.state_path.display(), "state store opened");
        let session = Session::new(Arc::clone(&store));
        let client = StorefrontClient::from_config(&config, session)
            .context("building storefront client")?;
        Ok(Self {
            config,
            client: Arc::new(client),
            notifier: Arc::new(TracingNotifier),
            store,
        })
    }

    pub(crate) fn customer_id(&self) -> anyhow::Result<i64> {
        self.client
            .require_customer_id()
            .context("not signed in; run `gymshop login` first")
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = gymshop_core::load_app_config().context("loading configuration")?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let Some(command) = cli.command else {
        println!("gymshop ready against {} ({})", config.api_base_url, config.env);
        return Ok(());
    };

    let app = App::build(config)?;
    match command {
        Commands::Login { email, password } => account::login(&app, &email, &password).await,
        Commands::Logout => account::logout(&app).await,
        Commands::Services { command } => match command {
            ServicesCommands::List {
                search,
                page,
                limit,
            } => shop::list_services(&app, search.as_deref(), page, limit).await,
            ServicesCommands::Show { id } => shop::show_service(&app, id).await,
        },
        Commands::Cart { command } => cart::run(&app, command).await,
        Commands::Booking { command } => match command {
            BookingCommands::Days {
                service,
                year,
                month,
                variant,
                staff,
            } => shop::available_days(&app, service, year, month, variant, staff).await,
            BookingCommands::Slots {
                service,
                date,
                variant,
                staff,
            } => shop::available_slots(&app, service, date, variant, staff).await,
            BookingCommands::Book {
                service,
                date,
                slot,
                variant,
                size,
                staff,
                quantity,
            } => {
                let choice = shop::BookingChoice {
                    service,
                    date,
                    slot,
                    variant,
                    size,
                    staff,
                    quantity,
                };
                shop::book(&app, &choice).await
            }
        },
        Commands::Addresses { command } => match command {
            AddressCommands::List => account::list_addresses(&app).await,
            AddressCommands::SetDefault { id } => account::set_default_address(&app, id).await,
            AddressCommands::Delete { id } => account::delete_address(&app, id).await,
        },
        Commands::Payment { command } => match command {
            PaymentCommands::VnpayReturn { url } => account::payment_return(&app, &url, false).await,
            PaymentCommands::MomoReturn { url } => account::payment_return(&app, &url, true).await,
            PaymentCommands::Pending => account::pending_payments(&app),
        },
    }
}

#[cfg(test)]
mod tests;
