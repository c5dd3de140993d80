//! Address lookups over the location table.

use std::path::Path;

use giftshop_client::{AddressResolver, ClientConfig, LoadState, Session};
use giftshop_core::{AddressField, AddressSelection};

use super::{CliError, Output};

/// Resolver loaded from a local `addressData.json`.
pub async fn from_file(path: &Path) -> AddressResolver {
    let resolver = AddressResolver::new();
    resolver.load_from_file(path).await;
    resolver
}

/// Resolver loaded from the configured address data URL.
pub async fn from_api(config: ClientConfig) -> Result<AddressResolver, CliError> {
    let session = Session::start(config)?;
    session.load_address_data().await;
    Ok(session.address().clone())
}

fn ensure_ready(resolver: &AddressResolver) -> Result<(), CliError> {
    match resolver.load_state() {
        LoadState::Ready(_) => Ok(()),
        LoadState::Error(message) => Err(CliError::AddressData(message)),
        LoadState::Loading => Err(CliError::AddressData("still loading".to_string())),
    }
}

fn print_names(names: &[String], output: Output) -> Result<(), CliError> {
    if output.json {
        return output.print_json(&names);
    }
    output.print_lines(names);
    Ok(())
}

/// List every state.
pub fn states(resolver: &AddressResolver, output: Output) -> Result<(), CliError> {
    ensure_ready(resolver)?;
    print_names(&resolver.list_states(), output)
}

/// List the districts of `state`.
pub fn districts(resolver: &AddressResolver, state: &str, output: Output) -> Result<(), CliError> {
    ensure_ready(resolver)?;
    let names = resolver.list_districts(state);
    if names.is_empty() {
        tracing::warn!(state, "No districts found");
    }
    print_names(&names, output)
}

/// List the areas of `district` in `state`.
pub fn areas(
    resolver: &AddressResolver,
    state: &str,
    district: &str,
    output: Output,
) -> Result<(), CliError> {
    ensure_ready(resolver)?;
    let names = resolver.list_areas(state, district);
    if names.is_empty() {
        tracing::warn!(state, district, "No areas found");
    }
    print_names(&names, output)
}

/// Validate a full address, entered field by field from the top down.
pub fn validate(resolver: &AddressResolver, values: [String; 4]) -> Result<(), CliError> {
    ensure_ready(resolver)?;

    let fields = [
        AddressField::State,
        AddressField::District,
        AddressField::Area,
        AddressField::Pincode,
    ];
    let selection = fields
        .into_iter()
        .zip(values)
        .fold(AddressSelection::default(), |sel, (field, value)| {
            resolver.apply_field_change(&sel, field, &value)
        });

    resolver.validate(&selection)?;
    tracing::info!(
        state = %selection.state,
        district = %selection.district,
        area = %selection.area,
        pincode = %selection.pincode,
        "Address is valid"
    );
    Ok(())
}
