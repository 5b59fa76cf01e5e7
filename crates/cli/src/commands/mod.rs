//! Command execution against a file-backed cart.

use std::io::{self, Write};

use panier_cart::{
    CartConfig, CartController, CartError, CartIntent, CartStore, CheckoutOutcome,
    DispatchOutcome, FileStorage, LatestView, TracingNotifier,
};
use thiserror::Error;

use crate::Command;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    /// Cart operation failed.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Writing to the terminal failed.
    #[error("Output error: {0}")]
    Output(#[from] io::Error),
}

type Controller = CartController<FileStorage, LatestView, TracingNotifier>;

/// Run one session: restore, apply `command`, print the panel.
///
/// # Errors
///
/// Returns an error if the cart cannot be restored or saved, the index does
/// not name a line, or output fails.
pub(crate) fn run(
    config: &CartConfig,
    command: Command,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let store = CartStore::new(FileStorage::new(config.storage_dir.clone()))
        .with_key(config.storage_key.clone())
        .with_currency(config.currency);
    let mut controller = Controller::new(store, LatestView::new(), TracingNotifier);
    controller.init()?;
    controller.open();

    if let Some(intent) = intent_for(&controller, command)? {
        if let DispatchOutcome::Checkout(CheckoutOutcome::Redirect) = controller.dispatch(intent)? {
            writeln!(out, "Checkout: redirecting to payment")?;
        }
    }

    let view = controller.view();
    write!(out, "{view}")?;
    Ok(())
}

/// Translate a command into an intent, resolving positions to line IDs.
fn intent_for(controller: &Controller, command: Command) -> Result<Option<CartIntent>, CliError> {
    let intent = match command {
        Command::Add {
            title,
            price,
            image,
        } => CartIntent::add(title, price, image),
        Command::Increment { index } => CartIntent::Increment(controller.line_at(index)?),
        Command::Decrement { index } => CartIntent::Decrement(controller.line_at(index)?),
        Command::Remove { index } => CartIntent::Remove(controller.line_at(index)?),
        Command::Checkout => CartIntent::Checkout,
        Command::Show => return Ok(None),
    };
    Ok(Some(intent))
}
