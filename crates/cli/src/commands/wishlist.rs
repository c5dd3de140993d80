//! Wishlist commands.

use giftshop_client::Session;

use super::{CliError, Output, product_id, report_failure};

/// Print saved products.
pub async fn show(session: &Session, output: Output) -> Result<(), CliError> {
    let entries = session.wishlist().entries().await?;

    if output.json {
        return output.print_json(&*entries);
    }
    if entries.is_empty() {
        output.print_lines(["Wishlist is empty"]);
        return Ok(());
    }

    output.print_lines(entries.iter().map(|entry| {
        let name = entry.product.as_ref().map_or("", |p| p.name.as_str());
        format!("{}  {name}", entry.product_id)
    }));
    Ok(())
}

/// Save a product.
pub async fn add(session: &Session, raw_id: &str) -> Result<(), CliError> {
    let id = product_id(raw_id)?;
    let events = session.subscribe();
    if let Err(notice) = session.wishlist().add(&id).await {
        return Err(report_failure(notice, events).await);
    }
    tracing::info!(product_id = %id, "Saved to wishlist");
    Ok(())
}

/// Remove a saved product.
pub async fn remove(session: &Session, raw_id: &str) -> Result<(), CliError> {
    let id = product_id(raw_id)?;
    let events = session.subscribe();
    if let Err(notice) = session.wishlist().remove(&id).await {
        return Err(report_failure(notice, events).await);
    }
    tracing::info!(product_id = %id, "Removed from wishlist");
    Ok(())
}

/// Report whether a product is saved.
pub async fn check(session: &Session, raw_id: &str, output: Output) -> Result<(), CliError> {
    let id = product_id(raw_id)?;
    let present = session.wishlist().contains(&id).await?;
    tracing::debug!(product_id = %id, present, "Wishlist check");
    if output.json {
        return output.print_json(&serde_json::json!({ "isInWishlist": present }));
    }
    output.print_lines([present]);
    Ok(())
}

/// Save or unsave a product.
pub async fn toggle(session: &Session, raw_id: &str) -> Result<(), CliError> {
    let id = product_id(raw_id)?;
    let events = session.subscribe();
    match session.wishlist().toggle(&id).await {
        Ok(true) => tracing::info!(product_id = %id, "Saved to wishlist"),
        Ok(false) => tracing::info!(product_id = %id, "Removed from wishlist"),
        Err(notice) => return Err(report_failure(notice, events).await),
    }
    Ok(())
}
