//! Static location table backing the cascading address picker.
//!
//! The table is published as `addressData.json`, an object keyed by arbitrary
//! state codes:
//!
//! ```json
//! {
//!   "KA": {
//!     "statename": "Karnataka",
//!     "districts": [
//!       { "districtname": "Bengaluru Urban", "areas": [{ "areaname": "Indiranagar" }] }
//!     ]
//!   }
//! }
//! ```
//!
//! Iteration order is the order the states appear in the document. All name
//! lookups are case-insensitive and never fail: unknown names yield empty
//! sequences.

use core::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An area (locality) within a district.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Area {
    /// Display name of the area.
    #[serde(rename = "areaname")]
    pub name: String,
}

/// A district and its areas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct District {
    /// Display name of the district.
    #[serde(rename = "districtname")]
    pub name: String,
    /// Areas in document order.
    #[serde(default)]
    pub areas: Vec<Area>,
}

/// A state and its districts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    /// Display name of the state.
    #[serde(rename = "statename")]
    pub name: String,
    /// Districts in document order.
    #[serde(default)]
    pub districts: Vec<District>,
}

/// Compare two display names the way the picker does.
#[must_use]
pub fn names_match(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

/// Immutable state -> district -> area lookup table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationTable {
    states: Vec<(String, State)>,
}

impl LocationTable {
    /// Build a table from `(code, state)` pairs, keeping their order.
    #[must_use]
    pub fn new(states: Vec<(String, State)>) -> Self {
        Self { states }
    }

    /// Parse the `addressData.json` document.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not a JSON object of states.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    /// Number of states in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether the table has no states at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Iterate `(code, state)` pairs in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &State)> {
        self.states.iter().map(|(code, state)| (code.as_str(), state))
    }

    /// Find a state by display name.
    #[must_use]
    pub fn state(&self, name: &str) -> Option<&State> {
        if name.is_empty() {
            return None;
        }
        self.states
            .iter()
            .map(|(_, state)| state)
            .find(|state| names_match(&state.name, name))
    }

    /// Find a district by state and district display names.
    #[must_use]
    pub fn district(&self, state: &str, district: &str) -> Option<&District> {
        if district.is_empty() {
            return None;
        }
        self.state(state)?
            .districts
            .iter()
            .find(|d| names_match(&d.name, district))
    }

    /// State names in table order.
    #[must_use]
    pub fn state_names(&self) -> Vec<String> {
        self.states.iter().map(|(_, s)| s.name.clone()).collect()
    }

    /// District names for `state`, or empty if the state is unknown or unset.
    #[must_use]
    pub fn district_names(&self, state: &str) -> Vec<String> {
        self.state(state)
            .map(|s| s.districts.iter().map(|d| d.name.clone()).collect())
            .unwrap_or_default()
    }

    /// Area names for `(state, district)`, or empty if either is unknown or unset.
    #[must_use]
    pub fn area_names(&self, state: &str, district: &str) -> Vec<String> {
        self.district(state, district)
            .map(|d| d.areas.iter().map(|a| a.name.clone()).collect())
            .unwrap_or_default()
    }

    /// Whether `area` exists under `(state, district)`.
    #[must_use]
    pub fn has_area(&self, state: &str, district: &str, area: &str) -> bool {
        !area.is_empty()
            && self
                .district(state, district)
                .is_some_and(|d| d.areas.iter().any(|a| names_match(&a.name, area)))
    }
}

impl<'de> Deserialize<'de> for LocationTable {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct TableVisitor;

        impl<'de> Visitor<'de> for TableVisitor {
            type Value = LocationTable;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object mapping state codes to states")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut states = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((code, state)) = map.next_entry::<String, State>()? {
                    states.push((code, state));
                }
                Ok(LocationTable { states })
            }
        }

        deserializer.deserialize_map(TableVisitor)
    }
}

impl Serialize for LocationTable {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(self.states.iter().map(|(code, state)| (code, state)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "TN": {
            "statename": "Tamil Nadu",
            "districts": [
                { "districtname": "Chennai", "areas": [{ "areaname": "Adyar" }, { "areaname": "T. Nagar" }] },
                { "districtname": "Nilgiris", "areas": [] }
            ]
        },
        "AP": {
            "statename": "Andhra Pradesh",
            "districts": [{ "districtname": "Guntur", "areas": [{ "areaname": "Tenali" }] }]
        }
    }"#;

    #[test]
    fn test_document_order_is_preserved() {
        let table = LocationTable::from_json(SAMPLE).unwrap();
        assert_eq!(table.state_names(), vec!["Tamil Nadu", "Andhra Pradesh"]);
        let codes: Vec<_> = table.iter().map(|(code, _)| code).collect();
        assert_eq!(codes, vec!["TN", "AP"]);
    }

    #[test]
    fn test_lookups_ignore_case() {
        let table = LocationTable::from_json(SAMPLE).unwrap();
        assert_eq!(table.district_names("tamil nadu"), vec!["Chennai", "Nilgiris"]);
        assert_eq!(table.area_names("TAMIL NADU", "chennai"), vec!["Adyar", "T. Nagar"]);
        assert!(table.has_area("Tamil Nadu", "Chennai", "adyar"));
    }

    #[test]
    fn test_unknown_names_yield_empty() {
        let table = LocationTable::from_json(SAMPLE).unwrap();
        assert!(table.district_names("").is_empty());
        assert!(table.district_names("Kerala").is_empty());
        assert!(table.area_names("Tamil Nadu", "").is_empty());
        assert!(table.area_names("Tamil Nadu", "Guntur").is_empty());
    }

    #[test]
    fn test_areas_non_empty_iff_district_has_areas() {
        let table = LocationTable::from_json(SAMPLE).unwrap();
        for (_, state) in table.iter() {
            for district in &state.districts {
                let areas = table.area_names(&state.name, &district.name);
                assert_eq!(areas.is_empty(), district.areas.is_empty());
            }
        }
    }

    #[test]
    fn test_missing_areas_field_defaults_to_empty() {
        let table =
            LocationTable::from_json(r#"{"X": {"statename": "X", "districts": [{"districtname": "Y"}]}}"#)
                .unwrap();
        assert!(table.area_names("X", "Y").is_empty());
    }

    #[test]
    fn test_malformed_documents_are_rejected() {
        assert!(LocationTable::from_json("").is_err());
        assert!(LocationTable::from_json("[]").is_err());
        assert!(LocationTable::from_json(r#"{"X": {"districts": []}}"#).is_err());
    }
}
