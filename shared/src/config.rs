use once_cell::sync::Lazy;
use std::env;

/// The canonical admin allow-list, read once at process start from the
/// `ADMIN_EMAILS` environment variable (comma-separated). Entries are
/// lowercased on load so membership checks are a plain equality test.
///
/// This is deliberately configuration rather than code: every service shares
/// this one list.
static ADMIN_EMAILS: Lazy<Vec<String>> = Lazy::new(|| {
    env::var("ADMIN_EMAILS")
        .unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
});

/// Whether the given email belongs to an admin. Exact match after lowercasing.
pub fn is_admin(email: &str) -> bool {
    let email = email.to_lowercase();
    ADMIN_EMAILS.iter().any(|admin| admin == &email)
}

/// Reads a table name from the environment, falling back to the conventional
/// default used by the provisioning templates.
pub fn table_name(env_var: &str, default: &str) -> String {
    env::var(env_var).unwrap_or_else(|_| default.to_string())
}
