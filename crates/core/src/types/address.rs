//! Address selection with cascading field resets.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::location::LocationTable;

/// Length of an Indian postal index number.
pub const PINCODE_LENGTH: usize = 6;

/// A field of the address picker, ordered from ancestor to descendant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressField {
    State,
    District,
    Area,
    Pincode,
}

impl fmt::Display for AddressField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::State => write!(f, "state"),
            Self::District => write!(f, "district"),
            Self::Area => write!(f, "area"),
            Self::Pincode => write!(f, "pincode"),
        }
    }
}

impl FromStr for AddressField {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "state" => Ok(Self::State),
            "district" => Ok(Self::District),
            "area" => Ok(Self::Area),
            "pincode" => Ok(Self::Pincode),
            _ => Err(AddressError::UnknownField(s.to_owned())),
        }
    }
}

/// Errors reported when an address selection is checked for completeness.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// The field name is not one of state, district, area or pincode.
    #[error("invalid address field: {0}")]
    UnknownField(String),
    /// A required field is empty.
    #[error("{0} is required")]
    Missing(AddressField),
    /// The named state is not in the location table.
    #[error("unknown state: {0}")]
    UnknownState(String),
    /// The named district is not in the selected state.
    #[error("unknown district {district} in {state}")]
    UnknownDistrict {
        /// Selected state.
        state: String,
        /// Rejected district.
        district: String,
    },
    /// The named area is not in the selected district.
    #[error("unknown area {area} in {district}")]
    UnknownArea {
        /// Selected district.
        district: String,
        /// Rejected area.
        area: String,
    },
    /// The pincode is not six digits.
    #[error("pincode must be {PINCODE_LENGTH} digits and cannot start with 0")]
    InvalidPincode,
}

/// Current values of the cascading address picker.
///
/// Empty strings mean "not selected".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressSelection {
    pub state: String,
    pub district: String,
    pub area: String,
    pub pincode: String,
}

impl AddressSelection {
    /// Return a new selection with `field` set to `value` and every descendant
    /// field cleared.
    ///
    /// ```
    /// use giftshop_core::{AddressField, AddressSelection};
    ///
    /// let sel = AddressSelection {
    ///     state: "Kerala".into(),
    ///     district: "Ernakulam".into(),
    ///     area: "Kakkanad".into(),
    ///     pincode: "682030".into(),
    /// };
    /// let next = sel.with_field(AddressField::District, "Idukki");
    /// assert_eq!(next.state, "Kerala");
    /// assert_eq!(next.district, "Idukki");
    /// assert!(next.area.is_empty() && next.pincode.is_empty());
    /// ```
    #[must_use]
    pub fn with_field(&self, field: AddressField, value: &str) -> Self {
        let value = value.to_owned();
        match field {
            AddressField::State => Self {
                state: value,
                ..Self::default()
            },
            AddressField::District => Self {
                state: self.state.clone(),
                district: value,
                ..Self::default()
            },
            AddressField::Area => Self {
                state: self.state.clone(),
                district: self.district.clone(),
                area: value,
                pincode: String::new(),
            },
            AddressField::Pincode => Self {
                pincode: value,
                ..self.clone()
            },
        }
    }

    /// Value of a single field.
    #[must_use]
    pub fn get(&self, field: AddressField) -> &str {
        match field {
            AddressField::State => &self.state,
            AddressField::District => &self.district,
            AddressField::Area => &self.area,
            AddressField::Pincode => &self.pincode,
        }
    }

    /// Check that every field is filled in, that each name exists under its
    /// parent in `table`, and that the pincode is well formed.
    ///
    /// # Errors
    ///
    /// Returns the first problem found, checking ancestors before descendants.
    pub fn validate(&self, table: &LocationTable) -> Result<(), AddressError> {
        for field in [
            AddressField::State,
            AddressField::District,
            AddressField::Area,
            AddressField::Pincode,
        ] {
            if self.get(field).trim().is_empty() {
                return Err(AddressError::Missing(field));
            }
        }

        if table.state(&self.state).is_none() {
            return Err(AddressError::UnknownState(self.state.clone()));
        }
        if table.district(&self.state, &self.district).is_none() {
            return Err(AddressError::UnknownDistrict {
                state: self.state.clone(),
                district: self.district.clone(),
            });
        }
        if !table.has_area(&self.state, &self.district, &self.area) {
            return Err(AddressError::UnknownArea {
                district: self.district.clone(),
                area: self.area.clone(),
            });
        }
        if !is_valid_pincode(&self.pincode) {
            return Err(AddressError::InvalidPincode);
        }

        Ok(())
    }
}

/// Whether `s` is a six-digit pincode that does not start with zero.
#[must_use]
pub fn is_valid_pincode(s: &str) -> bool {
    let s = s.trim();
    s.len() == PINCODE_LENGTH
        && s.bytes().all(|b| b.is_ascii_digit())
        && !s.starts_with('0')
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn full() -> AddressSelection {
        AddressSelection {
            state: "Tamil Nadu".to_string(),
            district: "Chennai".to_string(),
            area: "Adyar".to_string(),
            pincode: "600020".to_string(),
        }
    }

    fn table() -> LocationTable {
        LocationTable::from_json(
            r#"{"TN": {"statename": "Tamil Nadu", "districts": [
                {"districtname": "Chennai", "areas": [{"areaname": "Adyar"}]}
            ]}}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_state_change_clears_everything_below() {
        for start in [AddressSelection::default(), full()] {
            let next = start.with_field(AddressField::State, "Kerala");
            assert_eq!(
                next,
                AddressSelection {
                    state: "Kerala".to_string(),
                    ..AddressSelection::default()
                }
            );
        }
    }

    #[test]
    fn test_district_change_keeps_state() {
        let next = full().with_field(AddressField::District, "Madurai");
        assert_eq!(next.state, "Tamil Nadu");
        assert_eq!(next.district, "Madurai");
        assert_eq!(next.area, "");
        assert_eq!(next.pincode, "");
    }

    #[test]
    fn test_area_change_clears_pincode_only() {
        let next = full().with_field(AddressField::Area, "Mylapore");
        assert_eq!(next.district, "Chennai");
        assert_eq!(next.area, "Mylapore");
        assert_eq!(next.pincode, "");
    }

    #[test]
    fn test_pincode_change_touches_nothing_else() {
        let next = full().with_field(AddressField::Pincode, "600004");
        assert_eq!(next, AddressSelection { pincode: "600004".to_string(), ..full() });
    }

    #[test]
    fn test_field_from_str() {
        assert_eq!("District".parse::<AddressField>(), Ok(AddressField::District));
        assert_eq!(
            "city".parse::<AddressField>(),
            Err(AddressError::UnknownField("city".to_string()))
        );
    }

    #[test]
    fn test_validate_complete_selection() {
        assert_eq!(full().validate(&table()), Ok(()));
    }

    #[test]
    fn test_validate_reports_first_problem() {
        let sel = full().with_field(AddressField::District, "Chennai");
        assert_eq!(
            sel.validate(&table()),
            Err(AddressError::Missing(AddressField::Area))
        );

        let sel = AddressSelection {
            state: "Kerala".to_string(),
            ..full()
        };
        assert!(matches!(
            sel.validate(&table()),
            Err(AddressError::UnknownState(_))
        ));

        let sel = AddressSelection {
            pincode: "012345".to_string(),
            ..full()
        };
        assert_eq!(sel.validate(&table()), Err(AddressError::InvalidPincode));
    }

    #[test]
    fn test_pincode_shape() {
        assert!(is_valid_pincode("560001"));
        assert!(!is_valid_pincode("56000"));
        assert!(!is_valid_pincode("56000a"));
        assert!(!is_valid_pincode("060001"));
    }
}
