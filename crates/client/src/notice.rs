//! User-facing notices produced at the mutation boundary.
//!
//! Every failed mutation is turned into exactly one [`Notice`]. The backend
//! may send a structured `code`; when it does, the code decides the class.
//! Otherwise the `message` is matched case-insensitively against known
//! phrases. Anything unrecognized becomes a generic notice carrying the raw
//! server message.

use core::fmt;

use reqwest::StatusCode;
use serde::Serialize;
use thiserror::Error;

use crate::error::ApiError;

/// Which mutation produced the error. Each one recognizes a different set of
/// validation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    AddToCart,
    UpdateCartQuantity,
    RemoveFromCart,
    ClearCart,
    AddToWishlist,
    RemoveFromWishlist,
}

impl MutationKind {
    /// Stable name used in logs and breadcrumbs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AddToCart => "cart.add",
            Self::UpdateCartQuantity => "cart.update",
            Self::RemoveFromCart => "cart.remove",
            Self::ClearCart => "cart.clear",
            Self::AddToWishlist => "wishlist.add",
            Self::RemoveFromWishlist => "wishlist.remove",
        }
    }

    /// Whether this mutation can fail with the given validation class.
    #[must_use]
    pub const fn recognizes(&self, kind: NoticeKind) -> bool {
        match kind {
            NoticeKind::Unauthorized | NoticeKind::NotFound | NoticeKind::Generic => true,
            NoticeKind::InsufficientStock | NoticeKind::MinimumOrderQuantity => {
                matches!(self, Self::AddToCart | Self::UpdateCartQuantity)
            }
            NoticeKind::BelowMinimum => matches!(self, Self::UpdateCartQuantity),
            NoticeKind::InvalidIdentifier => {
                !matches!(self, Self::RemoveFromCart | Self::ClearCart)
            }
        }
    }
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse error taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// The session expired; the UI must send the user to the login page.
    Unauthorized,
    /// The request was rejected for a reason the user can fix.
    ValidationFailure,
    /// The target no longer exists.
    NotFound,
    /// Anything else.
    Unknown,
}

/// Fine-grained notice class; each one has its own title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Unauthorized,
    InsufficientStock,
    MinimumOrderQuantity,
    BelowMinimum,
    InvalidIdentifier,
    NotFound,
    Generic,
}

impl NoticeKind {
    /// Category this notice belongs to.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Unauthorized => ErrorCategory::Unauthorized,
            Self::InsufficientStock
            | Self::MinimumOrderQuantity
            | Self::BelowMinimum
            | Self::InvalidIdentifier => ErrorCategory::ValidationFailure,
            Self::NotFound => ErrorCategory::NotFound,
            Self::Generic => ErrorCategory::Unknown,
        }
    }

    /// Notification title shown to the user.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::Unauthorized => "Session Expired",
            Self::InsufficientStock => "Limited Stock Available",
            Self::MinimumOrderQuantity => "Minimum Order Quantity",
            Self::BelowMinimum => "Cannot Reduce Quantity",
            Self::InvalidIdentifier => "Invalid Product",
            Self::NotFound => "Not Found",
            Self::Generic => "Something Went Wrong",
        }
    }

    /// Structured code the backend may send for this class.
    const fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::InsufficientStock => "INSUFFICIENT_STOCK",
            Self::MinimumOrderQuantity => "MIN_ORDER_QUANTITY",
            Self::BelowMinimum => "BELOW_MIN_ORDER_QUANTITY",
            Self::InvalidIdentifier => "INVALID_ID",
            Self::NotFound => "NOT_FOUND",
            Self::Generic => "UNKNOWN",
        }
    }

    fn from_code(code: &str) -> Option<Self> {
        [
            Self::Unauthorized,
            Self::InsufficientStock,
            Self::MinimumOrderQuantity,
            Self::BelowMinimum,
            Self::InvalidIdentifier,
            Self::NotFound,
        ]
        .into_iter()
        .find(|kind| kind.code().eq_ignore_ascii_case(code))
    }
}

/// Phrases matched against lowercased server messages, checked in order.
///
/// "below minimum" is checked before the broader minimum-order phrases so
/// an update rejected for going under the minimum is not reported as a
/// plain minimum-order violation.
const MESSAGE_RULES: &[(&str, NoticeKind)] = &[
    ("insufficient stock", NoticeKind::InsufficientStock),
    ("out of stock", NoticeKind::InsufficientStock),
    ("cannot reduce", NoticeKind::BelowMinimum),
    ("below minimum", NoticeKind::BelowMinimum),
    ("minimum order quantity", NoticeKind::MinimumOrderQuantity),
    ("minimum quantity", NoticeKind::MinimumOrderQuantity),
    ("invalid product id", NoticeKind::InvalidIdentifier),
    ("invalid id", NoticeKind::InvalidIdentifier),
    ("cast to objectid failed", NoticeKind::InvalidIdentifier),
];

/// A classified, user-facing notification.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{title}: {message}")]
pub struct Notice {
    /// Classification.
    pub kind: NoticeKind,
    /// Short title.
    pub title: &'static str,
    /// Detail line (the server message for generic notices).
    pub message: String,
    /// Mutation that failed.
    pub mutation: MutationKind,
}

impl Notice {
    /// Build a notice of the given kind with its standard title.
    #[must_use]
    pub fn new(kind: NoticeKind, mutation: MutationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            title: kind.title(),
            message: message.into(),
            mutation,
        }
    }

    /// Classify an API error raised by `mutation`.
    #[must_use]
    pub fn classify(mutation: MutationKind, err: &ApiError) -> Self {
        let kind = classify_kind(mutation, err);
        let message = match kind {
            NoticeKind::Unauthorized => "Please log in again to continue.".to_string(),
            _ => err
                .server_message()
                .filter(|m| !m.trim().is_empty())
                .map_or_else(|| err.to_string(), str::to_owned),
        };
        Self::new(kind, mutation, message)
    }

    /// Coarse category of this notice.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        self.kind.category()
    }
}

fn classify_kind(mutation: MutationKind, err: &ApiError) -> NoticeKind {
    if err.is_unauthorized() {
        return NoticeKind::Unauthorized;
    }
    if let Some(kind) = err.code().and_then(NoticeKind::from_code)
        && mutation.recognizes(kind)
    {
        return kind;
    }

    if let Some(message) = err.server_message() {
        let lower = message.to_lowercase();
        if let Some(kind) = MESSAGE_RULES
            .iter()
            .find(|(phrase, kind)| lower.contains(phrase) && mutation.recognizes(*kind))
            .map(|(_, kind)| *kind)
        {
            return kind;
        }
    }

    if err.status() == Some(StatusCode::NOT_FOUND) {
        return NoticeKind::NotFound;
    }

    NoticeKind::Generic
}
