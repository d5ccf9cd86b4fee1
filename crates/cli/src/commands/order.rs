//! Last-order commands.

use std::io::Write;

use quickcart_storefront::config::OrderApiConfig;
use quickcart_storefront::order::Order;
use quickcart_storefront::services::OrderApiClient;
use quickcart_storefront::storage::{self, keys};
use tracing::info;

use super::{CliError, ShopArgs};

/// Print the last order.
///
/// # Errors
///
/// Returns [`CliError::NoOrder`] if there is no usable order record.
pub fn show(args: &ShopArgs, json: bool, out: &mut impl Write) -> Result<(), CliError> {
    let order = args.open_shop()?.last_order().ok_or(CliError::NoOrder)?;

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&order)?)?;
        return Ok(());
    }

    write_summary(&order, args, out)
}

fn write_summary(order: &Order, args: &ShopArgs, out: &mut impl Write) -> Result<(), CliError> {
    let id = order.order_id.as_ref().map_or("(local only)", |id| id.as_str());
    writeln!(out, "Order {id} placed {}", order.created_at.to_rfc3339())?;
    for line in order.items.lines() {
        writeln!(
            out,
            "{:>4} x {:<24} {}",
            line.quantity,
            line.title,
            line.line_total().display(args.currency)
        )?;
    }
    writeln!(out, "Total {}", order.total.display(args.currency))?;
    writeln!(
        out,
        "Ship to {} <{}>, {}",
        order.shipping.name,
        order.shipping.email,
        order.shipping.full_address()
    )?;
    Ok(())
}

/// Send the last order to the order backend again and record the id it
/// returns.
///
/// # Errors
///
/// Returns an error if no backend is configured, there is no order, or the
/// backend rejects the order.
pub async fn resend(
    args: &ShopArgs,
    api: Option<&OrderApiConfig>,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let client = OrderApiClient::new(api.ok_or(CliError::NoOrderApi)?)?;

    let mut order = args.open_shop()?.last_order().ok_or(CliError::NoOrder)?;
    let order_id = client.create_order(&order).await?;
    info!(order_id = ?order_id, total = %order.total, "Order resent");

    if order_id.is_some() {
        order.order_id = order_id;
        storage::save_json(&args.storage()?, keys::LAST_ORDER, &order)?;
    }

    let id = order.order_id.as_ref().map_or("(no id returned)", |id| id.as_str());
    writeln!(out, "Order sent: {id}")?;
    Ok(())
}
