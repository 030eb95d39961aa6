//! Diamant Rouge CLI - shop the storefront from a terminal, and run migrations.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! dr-cli migrate
//!
//! # Browse the catalog
//! dr-cli products list --category rings --materials gold,platinum --sort price-asc
//! dr-cli products search rubis
//!
//! # Fill a guest cart, then sign in: the guest cart merges into the account
//! dr-cli cart add 7 --quantity 2
//! dr-cli login -e shopper@example.com
//!
//! # Wishlist, profile and order history (signed in only)
//! dr-cli wishlist add 7
//! dr-cli profile preferences --metals "or rose,platine" --ring-size 52
//! dr-cli orders
//! ```
//!
//! # Environment Variables
//!
//! - `DR_API_BASE_URL` - Storefront base URL
//! - `DR_DATA_DIR` - Where the guest cart and session cookie are kept
//! - `DR_LOCALE` - Locale for product names
//! - `DR_PASSWORD` - Password used when `--password` is not given
//! - `STOREFRONT_DATABASE_URL` - Only for `migrate`

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use diamant_rouge_client::ClientConfig;
use diamant_rouge_core::{PreferencesUpdate, ShippingAddress};

mod commands;
mod error;
mod output;
mod session;
mod shopper;

use commands::products::ListOptions;
use error::CliError;
use shopper::Shopper;

#[derive(Parser)]
#[command(name = "dr-cli")]
#[command(author, version, about = "Diamant Rouge storefront CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run storefront database migrations
    Migrate,
    /// Sign in; the guest cart is merged into the account
    Login {
        #[arg(short, long)]
        email: String,
        /// Falls back to `DR_PASSWORD`
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Create an account and sign in
    Register {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Sign out
    Logout,
    /// Show who is signed in
    Whoami,
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
    /// Browse the catalog
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
    /// Show or edit the account profile
    Profile {
        #[command(subcommand)]
        action: Option<ProfileAction>,
    },
    /// List past orders, newest first
    Orders,
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart
    Show,
    /// Add units of a product
    Add {
        product: i32,
        #[arg(short, long)]
        variation: Option<i32>,
        #[arg(short, long, default_value_t = 1)]
        quantity: i64,
    },
    /// Remove a line
    Remove {
        product: i32,
        #[arg(short, long)]
        variation: Option<i32>,
    },
    /// Overwrite a line quantity
    Set {
        product: i32,
        #[arg(short, long)]
        variation: Option<i32>,
        #[arg(short, long)]
        quantity: i64,
    },
    /// Empty the cart
    Clear,
    /// Continue to checkout (signs in first when needed)
    Checkout,
}

#[derive(Subcommand)]
enum WishlistAction {
    /// Show the wishlist
    Show,
    /// Add a product
    Add { product: i32 },
    /// Remove a product
    Remove { product: i32 },
    /// Add a product if absent, remove it if present
    Toggle { product: i32 },
}

#[derive(Subcommand)]
enum ProductsAction {
    /// List products with optional filters
    List {
        #[arg(short, long)]
        category: Option<String>,
        /// Comma-separated, any-of
        #[arg(long, value_delimiter = ',')]
        materials: Vec<String>,
        /// Comma-separated, any-of
        #[arg(long, value_delimiter = ',')]
        gem_types: Vec<String>,
        #[arg(long)]
        min_price: Option<Decimal>,
        #[arg(long)]
        max_price: Option<Decimal>,
        /// `price-asc`, `price-desc`, `latest` or `featured`
        #[arg(short, long)]
        sort: Option<String>,
    },
    /// Search product names and descriptions
    Search {
        query: String,
        #[arg(short, long, default_value_t = 10)]
        limit: u32,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Show the profile
    Show,
    /// Replace the shipping address; fields left out are cleared
    Address {
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        postal_code: Option<String>,
        #[arg(long)]
        country: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
    /// Update jewelry preferences; lists left out are kept, sizes left out are cleared
    Preferences {
        /// Comma-separated
        #[arg(long, value_delimiter = ',')]
        metals: Option<Vec<String>>,
        /// Comma-separated
        #[arg(long, value_delimiter = ',')]
        gemstones: Option<Vec<String>>,
        #[arg(long)]
        ring_size: Option<String>,
        #[arg(long)]
        bracelet_size: Option<String>,
        #[arg(long)]
        necklace_length: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    if matches!(cli.command, Commands::Migrate) {
        return commands::migrate::storefront().await;
    }

    let mut shopper = Shopper::restore(ClientConfig::from_env()?).await?;

    match cli.command {
        Commands::Migrate => {}
        Commands::Login { email, password } => {
            commands::account::login(&mut shopper, &email, password).await?;
        }
        Commands::Register { email, password } => {
            commands::account::register(&mut shopper, &email, password).await?;
        }
        Commands::Logout => commands::account::logout(&mut shopper).await?,
        Commands::Whoami => commands::account::whoami(&shopper),
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&shopper).await,
            CartAction::Add {
                product,
                variation,
                quantity,
            } => commands::cart::add(&shopper, product, variation, quantity).await?,
            CartAction::Remove { product, variation } => {
                commands::cart::remove(&shopper, product, variation).await?;
            }
            CartAction::Set {
                product,
                variation,
                quantity,
            } => commands::cart::set(&shopper, product, variation, quantity).await?,
            CartAction::Clear => commands::cart::clear(&shopper).await?,
            CartAction::Checkout => commands::cart::checkout(&shopper).await,
        },
        Commands::Wishlist { action } => match action {
            WishlistAction::Show => commands::wishlist::show(&shopper).await?,
            WishlistAction::Add { product } => commands::wishlist::add(&shopper, product).await?,
            WishlistAction::Remove { product } => {
                commands::wishlist::remove(&shopper, product).await?;
            }
            WishlistAction::Toggle { product } => {
                commands::wishlist::toggle(&shopper, product).await?;
            }
        },
        Commands::Products { action } => match action {
            ProductsAction::List {
                category,
                materials,
                gem_types,
                min_price,
                max_price,
                sort,
            } => {
                let options = ListOptions {
                    category,
                    materials,
                    gem_types,
                    min_price,
                    max_price,
                    sort,
                };
                commands::products::list(&shopper, options).await?;
            }
            ProductsAction::Search { query, limit } => {
                commands::products::search(&shopper, &query, limit).await?;
            }
        },
        Commands::Profile { action } => match action.unwrap_or(ProfileAction::Show) {
            ProfileAction::Show => commands::profile::show(&shopper).await?,
            ProfileAction::Address {
                address,
                city,
                postal_code,
                country,
                phone,
            } => {
                let address = ShippingAddress {
                    address,
                    city,
                    postal_code,
                    country,
                    phone_number: phone,
                };
                commands::profile::set_address(&shopper, address).await?;
            }
            ProfileAction::Preferences {
                metals,
                gemstones,
                ring_size,
                bracelet_size,
                necklace_length,
            } => {
                let update = PreferencesUpdate {
                    preferred_metals: metals,
                    preferred_gemstones: gemstones,
                    ring_size,
                    bracelet_size,
                    necklace_length,
                };
                commands::profile::set_preferences(&shopper, update).await?;
            }
        },
        Commands::Orders => commands::profile::orders(&shopper).await?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_materials_split_on_commas() {
        let cli = Cli::parse_from([
            "dr-cli", "products", "list", "--materials", "gold,platinum", "--min-price", "100",
        ]);
        let Commands::Products {
            action:
                ProductsAction::List {
                    materials,
                    min_price,
                    ..
                },
        } = cli.command
        else {
            panic!("expected products list");
        };
        assert_eq!(materials, vec!["gold", "platinum"]);
        assert_eq!(min_price, Some(Decimal::new(100, 0)));
    }

    #[test]
    fn test_preference_lists_are_optional() {
        let cli = Cli::parse_from([
            "dr-cli", "profile", "preferences", "--gemstones", "rubis,saphir", "--ring-size", "52",
        ]);
        let Commands::Profile {
            action:
                Some(ProfileAction::Preferences {
                    metals,
                    gemstones,
                    ring_size,
                    ..
                }),
        } = cli.command
        else {
            panic!("expected profile preferences");
        };
        assert_eq!(metals, None);
        assert_eq!(gemstones, Some(vec!["rubis".to_string(), "saphir".to_string()]));
        assert_eq!(ring_size.as_deref(), Some("52"));
    }

    #[test]
    fn test_bare_profile_shows() {
        let cli = Cli::parse_from(["dr-cli", "profile"]);
        assert!(matches!(cli.command, Commands::Profile { action: None }));
    }
}
