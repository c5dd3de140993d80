//! Cart commands.

use giftshop_client::Session;

use super::{CliError, Output, product_id, report_failure};

/// Print cart lines and totals.
pub async fn show(session: &Session, output: Output) -> Result<(), CliError> {
    let snapshot = session.cart().snapshot().await?;

    if output.json {
        return output.print_json(&snapshot);
    }
    if snapshot.is_empty() {
        output.print_lines(["Cart is empty"]);
        return Ok(());
    }

    let rows = snapshot.lines.iter().map(|line| {
        let price = line
            .line_price()
            .map_or_else(|| "price unavailable".to_string(), |p| p.to_string());
        format!(
            "{}  {:>3} x {:<40} {price}",
            line.product_id, line.quantity, line.product.name
        )
    });
    output.print_lines(rows);
    output.print_lines([format!(
        "{} items, total {}",
        snapshot.totals.total_items, snapshot.totals.total_price
    )]);
    Ok(())
}

/// Add `quantity` units of a product.
pub async fn add(session: &Session, raw_id: &str, quantity: u32) -> Result<(), CliError> {
    let id = product_id(raw_id)?;
    let events = session.subscribe();
    if let Err(notice) = session.cart().add_item(&id, quantity).await {
        return Err(report_failure(notice, events).await);
    }
    tracing::info!(product_id = %id, quantity, "Added to cart");
    Ok(())
}

/// Set the quantity of a product.
pub async fn update(session: &Session, raw_id: &str, quantity: u32) -> Result<(), CliError> {
    let id = product_id(raw_id)?;
    let events = session.subscribe();
    if let Err(notice) = session.cart().update_quantity(&id, quantity).await {
        return Err(report_failure(notice, events).await);
    }
    tracing::info!(product_id = %id, quantity, "Cart quantity updated");
    Ok(())
}

/// Remove a product.
pub async fn remove(session: &Session, raw_id: &str) -> Result<(), CliError> {
    let id = product_id(raw_id)?;
    let events = session.subscribe();
    if let Err(notice) = session.cart().remove_item(&id).await {
        return Err(report_failure(notice, events).await);
    }
    tracing::info!(product_id = %id, "Removed from cart");
    Ok(())
}

/// Remove every line.
pub async fn clear(session: &Session) -> Result<(), CliError> {
    let events = session.subscribe();
    if let Err(notice) = session.cart().clear_cart().await {
        return Err(report_failure(notice, events).await);
    }
    tracing::info!("Cart cleared");
    Ok(())
}
