//! Panier CLI - Drive the cart from a terminal.
//!
//! Each invocation is one "page session": the cart is restored from file
//! storage, one intent is applied, the panel is printed and the cart is saved.
//!
//! # Usage
//!
//! ```bash
//! # Add a product (adding the same title again bumps its quantity)
//! panier add --title "Affiche Casablanca" --price "12,50 €" --image https://example.com/a.jpg
//!
//! # Adjust or drop the line at a display position
//! panier increment 0
//! panier decrement 0
//! panier remove 0
//!
//! # Print the cart, or start checkout
//! panier show
//! panier checkout
//! ```
//!
//! Configuration comes from `PANIER_*` environment variables (see
//! `panier_cart::config`); logs go to stderr and honour `RUST_LOG`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use panier_cart::{CartConfig, LogFormat};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "panier")]
#[command(author, version, about = "Panier shopping cart")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
enum Command {
    /// Add one unit of a product
    Add {
        /// Product title (unique key within the cart)
        #[arg(short, long)]
        title: String,

        /// Unit price as displayed, e.g. "12,50 €"
        #[arg(short, long)]
        price: String,

        /// Product image URL
        #[arg(short, long, default_value = "")]
        image: String,
    },
    /// Add one unit to the line at INDEX
    Increment {
        /// Display position, starting at 0
        index: usize,
    },
    /// Remove one unit from the line at INDEX (the last unit removes the line)
    Decrement {
        /// Display position, starting at 0
        index: usize,
    },
    /// Remove the line at INDEX
    Remove {
        /// Display position, starting at 0
        index: usize,
    },
    /// Print the cart
    Show,
    /// Proceed to payment
    Checkout,
}

/// Initialize tracing with `EnvFilter`, writing to stderr.
///
/// Defaults to info level for our crates if `RUST_LOG` is not set.
fn init_tracing(format: LogFormat) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "panier_cart=info,panier_cli=info".into());

    let registry = tracing_subscriber::registry().with(env_filter);
    match format {
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

fn main() {
    let cli = Cli::parse();

    let config = match CartConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            // No subscriber yet: fall back to the default one for this message.
            tracing_subscriber::fmt().with_writer(std::io::stderr).init();
            tracing::error!("Invalid configuration: {e}");
            std::process::exit(2);
        }
    };

    init_tracing(config.log_format);

    if let Err(e) = commands::run(&config, cli.command, &mut std::io::stdout().lock()) {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
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
    fn test_parse_add() {
        let cli = Cli::try_parse_from([
            "panier", "add", "--title", "Widget", "--price", "5,00 €", "--image", "img.png",
        ]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Command::Add { ref title, ref price, ref image })
                if title == "Widget" && price == "5,00 €" && image == "img.png"
        ));
    }

    #[test]
    fn test_parse_index_commands() {
        for (name, expected) in [
            ("increment", Command::Increment { index: 2 }),
            ("decrement", Command::Decrement { index: 2 }),
            ("remove", Command::Remove { index: 2 }),
        ] {
            let cli = Cli::try_parse_from(["panier", name, "2"]);
            assert_eq!(cli.map(|c| c.command).ok(), Some(expected));
        }
    }

    #[test]
    fn test_parse_rejects_negative_index() {
        assert!(Cli::try_parse_from(["panier", "remove", "-1"]).is_err());
    }
}
