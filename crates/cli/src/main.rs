//! Giftshop CLI - Cart, wishlist and address tools.
//!
//! # Usage
//!
//! ```bash
//! # Browse the location table from a local file
//! gs-cli address states --file addressData.json
//! gs-cli address areas "Tamil Nadu" Chennai --file addressData.json
//!
//! # Work with the signed-in user's cart (needs GIFTSHOP_API_BASE_URL)
//! gs-cli cart show
//! gs-cli cart add 65f1c0ffee0000000000abcd -q 2
//! gs-cli cart clear
//!
//! # Wishlist
//! gs-cli wishlist toggle 65f1c0ffee0000000000abcd
//! ```
//!
//! # Commands
//!
//! - `address` - Cascading state/district/area lookups and address validation
//! - `cart` - Show and mutate the cart
//! - `wishlist` - Show and mutate the wishlist
//! - `whoami` - Show the signed-in user

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use giftshop_client::ClientConfig;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::CliError;

#[derive(Parser)]
#[command(name = "gs-cli")]
#[command(author, version, about = "Giftshop storefront CLI tools")]
struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up states, districts and areas
    Address {
        /// Read the location table from this file instead of the API
        #[arg(short, long, global = true)]
        file: Option<PathBuf>,

        #[command(subcommand)]
        action: AddressAction,
    },
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Manage the wishlist
    Wishlist {
        #[command(subcommand)]
        action: WishlistAction,
    },
    /// Show the signed-in user
    Whoami,
}

#[derive(Subcommand)]
enum AddressAction {
    /// List states
    States,
    /// List districts of a state
    Districts {
        /// State name
        state: String,
    },
    /// List areas of a district
    Areas {
        /// State name
        state: String,
        /// District name
        district: String,
    },
    /// Check that an address is complete and known
    Validate {
        #[arg(long)]
        state: String,
        #[arg(long)]
        district: String,
        #[arg(long)]
        area: String,
        #[arg(long)]
        pincode: String,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart lines and totals
    Show,
    /// Add a product
    Add {
        /// Product id
        product_id: String,
        /// Quantity to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Set the quantity of a product
    Update {
        /// Product id
        product_id: String,
        /// New quantity
        quantity: u32,
    },
    /// Remove a product
    Remove {
        /// Product id
        product_id: String,
    },
    /// Remove everything
    Clear,
}

#[derive(Subcommand)]
enum WishlistAction {
    /// Show saved products
    Show,
    /// Save a product
    Add {
        /// Product id
        product_id: String,
    },
    /// Remove a saved product
    Remove {
        /// Product id
        product_id: String,
    },
    /// Check whether a product is saved
    Check {
        /// Product id
        product_id: String,
    },
    /// Save or unsave a product
    Toggle {
        /// Product id
        product_id: String,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(dsn: Option<&str>) -> Option<sentry::ClientInitGuard> {
    let dsn = dsn?;

    let guard = sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // The DSN is read directly so address lookups from a file work without API config
    let sentry_dsn = std::env::var("SENTRY_DSN").ok();
    let _sentry_guard = init_sentry(sentry_dsn.as_deref());

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "giftshop_client=info,giftshop_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let output = commands::Output { json: cli.json };

    match cli.command {
        Commands::Address { file, action } => {
            let resolver = match file {
                Some(path) => commands::address::from_file(&path).await,
                None => commands::address::from_api(ClientConfig::from_env()?).await?,
            };
            match action {
                AddressAction::States => commands::address::states(&resolver, output)?,
                AddressAction::Districts { state } => {
                    commands::address::districts(&resolver, &state, output)?;
                }
                AddressAction::Areas { state, district } => {
                    commands::address::areas(&resolver, &state, &district, output)?;
                }
                AddressAction::Validate {
                    state,
                    district,
                    area,
                    pincode,
                } => {
                    commands::address::validate(&resolver, [state, district, area, pincode])?;
                }
            }
        }
        Commands::Cart { action } => {
            let session = commands::start_session()?;
            match action {
                CartAction::Show => commands::cart::show(&session, output).await?,
                CartAction::Add {
                    product_id,
                    quantity,
                } => commands::cart::add(&session, &product_id, quantity).await?,
                CartAction::Update {
                    product_id,
                    quantity,
                } => commands::cart::update(&session, &product_id, quantity).await?,
                CartAction::Remove { product_id } => {
                    commands::cart::remove(&session, &product_id).await?;
                }
                CartAction::Clear => commands::cart::clear(&session).await?,
            }
        }
        Commands::Wishlist { action } => {
            let session = commands::start_session()?;
            match action {
                WishlistAction::Show => commands::wishlist::show(&session, output).await?,
                WishlistAction::Add { product_id } => {
                    commands::wishlist::add(&session, &product_id).await?;
                }
                WishlistAction::Remove { product_id } => {
                    commands::wishlist::remove(&session, &product_id).await?;
                }
                WishlistAction::Check { product_id } => {
                    commands::wishlist::check(&session, &product_id, output).await?;
                }
                WishlistAction::Toggle { product_id } => {
                    commands::wishlist::toggle(&session, &product_id).await?;
                }
            }
        }
        Commands::Whoami => {
            let session = commands::start_session()?;
            commands::whoami(&session, output).await?;
        }
    }
    Ok(())
}
