//! Sentry context for client operations.
//!
//! All functions are no-ops when Sentry has not been initialized, so the
//! library can call them unconditionally.

use giftshop_core::User;

use crate::notice::{MutationKind, Notice};

/// Set the Sentry user context.
///
/// Called after the current user has been fetched.
pub fn set_sentry_user(user: &User) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user.id.to_string()),
            email: Some(user.email.clone()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Called on logout and when the session expires.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Record a breadcrumb for a mutation attempt.
pub fn mutation_breadcrumb(mutation: MutationKind, data: &[(&str, String)]) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(mutation.as_str().to_string()),
        message: Some(format!("{mutation} requested")),
        level: sentry::Level::Info,
        ..Default::default()
    };

    for (key, value) in data {
        breadcrumb
            .data
            .insert((*key).to_string(), serde_json::Value::String(value.clone()));
    }

    sentry::add_breadcrumb(breadcrumb);
}

/// Record a breadcrumb for a failed mutation.
pub fn notice_breadcrumb(notice: &Notice) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(notice.mutation.as_str().to_string()),
        message: Some(notice.to_string()),
        level: sentry::Level::Warning,
        ..Default::default()
    };
    breadcrumb.data.insert(
        "kind".to_string(),
        serde_json::to_value(notice.kind).unwrap_or(serde_json::Value::Null),
    );

    sentry::add_breadcrumb(breadcrumb);
}
