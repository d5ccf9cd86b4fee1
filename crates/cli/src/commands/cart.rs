//! Persisted cart commands.

use std::io::Write;

use tracing::info;

use super::{CliError, ShopArgs};

/// Print the persisted cart.
///
/// # Errors
///
/// Returns an error if the shop state cannot be opened or output fails.
pub fn show(args: &ShopArgs, out: &mut impl Write) -> Result<(), CliError> {
    let shop = args.open_shop()?;
    let cart = shop.cart();

    if cart.is_empty() {
        writeln!(out, "Cart is empty")?;
        return Ok(());
    }

    for line in cart.lines() {
        let product = line.product();
        writeln!(
            out,
            "{:>4} x {:<24} {}",
            line.quantity(),
            product.title,
            line.line_total().display(args.currency)
        )?;
    }
    writeln!(
        out,
        "{} items, subtotal {}",
        cart.item_count(),
        cart.subtotal().display(args.currency)
    )?;
    Ok(())
}

/// Empty the persisted cart.
///
/// # Errors
///
/// Returns an error if the shop state cannot be opened or output fails.
pub fn clear(args: &ShopArgs, out: &mut impl Write) -> Result<(), CliError> {
    let mut shop = args.open_shop()?;
    let lines = shop.cart().line_count();
    shop.clear_cart();

    info!(lines, data_dir = %args.data_dir.display(), "Cart cleared");
    writeln!(out, "Removed {lines} cart lines")?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::commands::test_support::shop_args;

    fn output(f: impl FnOnce(&mut Vec<u8>) -> Result<(), CliError>) -> String {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_show_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let args = shop_args(dir.path());

        let mut shop = args.open_shop().unwrap();
        shop.add_to_cart("1", 2).unwrap();
        shop.add_to_cart("2", 1).unwrap();
        drop(shop);

        let shown = output(|out| show(&args, out));
        assert!(shown.contains("Shoe"));
        assert!(shown.ends_with("3 items, subtotal ₹ 499\n"));

        assert_eq!(output(|out| clear(&args, out)), "Removed 2 cart lines\n");
        assert_eq!(output(|out| show(&args, out)), "Cart is empty\n");
    }
}
