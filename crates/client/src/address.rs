//! Cascading location picker over the static location table.
//!
//! The resolver starts out [`LoadState::Loading`] and settles into either
//! [`LoadState::Ready`] or [`LoadState::Error`]. Lookups never fail: until
//! the table is ready, and for unknown names, every list is empty.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::instrument;
use url::Url;

use giftshop_core::{AddressError, AddressField, AddressSelection, LocationTable};

use crate::http::ApiClient;

/// Load status of the location table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    /// The table has not arrived yet.
    Loading,
    /// The table could not be loaded.
    Error(String),
    /// The table is available.
    Ready(Arc<LocationTable>),
}

impl LoadState {
    /// Whether the table is available.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// Error message, if loading failed.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message),
            _ => None,
        }
    }

    /// Build the state for a fetched document body.
    fn from_body(body: &str) -> Self {
        match LocationTable::from_json(body) {
            Ok(table) if table.is_empty() => {
                Self::Error("address data contains no states".to_string())
            }
            Ok(table) => Self::Ready(Arc::new(table)),
            Err(e) => Self::Error(format!("malformed address data: {e}")),
        }
    }
}

/// Answers cascading state/district/area queries for the address form.
#[derive(Debug, Clone)]
pub struct AddressResolver {
    state: Arc<watch::Sender<LoadState>>,
}

impl Default for AddressResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl AddressResolver {
    /// A resolver in the `Loading` state.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = watch::channel(LoadState::Loading);
        Self {
            state: Arc::new(tx),
        }
    }

    /// A resolver that is already `Ready` with `table`.
    #[must_use]
    pub fn with_table(table: LocationTable) -> Self {
        let resolver = Self::new();
        resolver.set(if table.is_empty() {
            LoadState::Error("address data contains no states".to_string())
        } else {
            LoadState::Ready(Arc::new(table))
        });
        resolver
    }

    fn set(&self, state: LoadState) {
        match &state {
            LoadState::Ready(table) => tracing::info!(states = table.len(), "Address data ready"),
            LoadState::Error(message) => tracing::error!(error = %message, "Address data unavailable"),
            LoadState::Loading => {}
        }
        self.state.send_replace(state);
    }

    /// Current load status.
    #[must_use]
    pub fn load_state(&self) -> LoadState {
        self.state.borrow().clone()
    }

    /// Watch load-status changes.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<LoadState> {
        self.state.subscribe()
    }

    fn table(&self) -> Option<Arc<LocationTable>> {
        match &*self.state.borrow() {
            LoadState::Ready(table) => Some(Arc::clone(table)),
            _ => None,
        }
    }

    /// Load from a JSON document already in memory.
    pub fn load_from_str(&self, body: &str) {
        self.set(LoadState::from_body(body));
    }

    /// Load from a JSON file on disk.
    pub async fn load_from_file(&self, path: &Path) {
        self.set(LoadState::Loading);
        match tokio::fs::read_to_string(path).await {
            Ok(body) => self.load_from_str(&body),
            Err(e) => self.set(LoadState::Error(format!(
                "failed to read {}: {e}",
                path.display()
            ))),
        }
    }

    /// Fetch `addressData.json` and load it.
    #[instrument(skip(self, api), fields(url = %url))]
    pub async fn load_from_url(&self, api: &ApiClient, url: &Url) {
        self.set(LoadState::Loading);
        match api.get_text(url).await {
            Ok(body) => self.load_from_str(&body),
            Err(e) => self.set(LoadState::Error(format!("failed to fetch address data: {e}"))),
        }
    }

    /// State names in table order.
    #[must_use]
    pub fn list_states(&self) -> Vec<String> {
        self.table().map(|t| t.state_names()).unwrap_or_default()
    }

    /// District names for `state`; empty if unknown or unselected.
    #[must_use]
    pub fn list_districts(&self, state: &str) -> Vec<String> {
        self.table()
            .map(|t| t.district_names(state))
            .unwrap_or_default()
    }

    /// Area names for `(state, district)`; empty if unknown or unselected.
    #[must_use]
    pub fn list_areas(&self, state: &str, district: &str) -> Vec<String> {
        self.table()
            .map(|t| t.area_names(state, district))
            .unwrap_or_default()
    }

    /// Apply a field edit, clearing every field below it.
    #[must_use]
    pub fn apply_field_change(
        &self,
        current: &AddressSelection,
        field: AddressField,
        value: &str,
    ) -> AddressSelection {
        current.with_field(field, value)
    }

    /// Check a complete selection against the table.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError`] if a field is missing or unknown, or the
    /// table has not loaded (reported as an unknown state).
    pub fn validate(&self, selection: &AddressSelection) -> Result<(), AddressError> {
        let table = self.table().unwrap_or_default();
        selection.validate(&table)
    }
}
