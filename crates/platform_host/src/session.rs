//! Per-user scoping for persisted storage keys.

/// Identifies whose persisted data a storage key belongs to.
///
/// Layout and geometry keys embed the signed-in user so that switching
/// accounts on one machine never restores another user's window
/// arrangement. With no user context the unscoped base key is used, which
/// is also what pre-login sessions read and write.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserScope {
    user: Option<String>,
}

impl UserScope {
    /// Scope with no user context; keys stay unscoped.
    pub fn anonymous() -> Self {
        Self { user: None }
    }

    /// Scope for an authenticated user id.
    ///
    /// Ids are normalized for key embedding: surrounding whitespace is
    /// trimmed and characters outside `[A-Za-z0-9._-]` are replaced with
    /// `-`. An id that normalizes to empty falls back to anonymous.
    pub fn for_user(id: impl AsRef<str>) -> Self {
        let normalized: String = id
            .as_ref()
            .trim()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '-'
                }
            })
            .collect();
        if normalized.is_empty() {
            Self::anonymous()
        } else {
            Self {
                user: Some(normalized),
            }
        }
    }

    /// The normalized user id, when one exists.
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// Derives the storage key for `base` under this scope.
    pub fn scoped_key(&self, base: &str) -> String {
        match &self.user {
            Some(user) => format!("{base}.u-{user}"),
            None => base.to_string(),
        }
    }
}
