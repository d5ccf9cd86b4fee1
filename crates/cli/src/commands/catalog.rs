//! Catalog commands.

use std::io::Write;
use std::path::Path;

use quickcart_storefront::catalog::Catalog;
use tracing::info;

use super::{CliError, ShopArgs};

/// Validate a catalog file.
///
/// # Errors
///
/// Returns an error if the file is unreadable, malformed, empty or has
/// duplicate product ids.
pub fn check(path: &Path, out: &mut impl Write) -> Result<(), CliError> {
    info!(path = %path.display(), "Checking catalog");
    let catalog = Catalog::from_file(path)?;
    writeln!(out, "{}: {} products OK", path.display(), catalog.len())?;
    Ok(())
}

/// Print every product in the configured catalog.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded or output fails.
pub fn list(shop: &ShopArgs, out: &mut impl Write) -> Result<(), CliError> {
    let catalog = shop.load_catalog()?;
    for product in catalog.products() {
        writeln!(
            out,
            "{:>6}  {:<24} {}",
            product.id,
            product.title,
            product.price.display(shop.currency)
        )?;
    }
    Ok(())
}
