use std::collections::HashSet;

/// Canonical `module:action` permission name.
pub fn permission_name(module: &str, action: &str) -> String {
    format!("{}:{}", module, action)
}

/// Effective permission set computed for one user.
///
/// Superusers resolve to `Wildcard` instead of a materialized set, so the
/// result stays valid when permissions are added to the catalog later and
/// resolution stays O(1) for them. Everyone else gets the explicit union of
/// their active roles' grants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedPermissions {
    /// Matches every permission name, current and future.
    Wildcard,
    /// Explicit union of permission names. May be empty.
    Explicit(HashSet<String>),
}

impl ResolvedPermissions {
    pub fn empty() -> Self {
        ResolvedPermissions::Explicit(HashSet::new())
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, ResolvedPermissions::Wildcard)
    }

    /// Whether the set grants the given permission name.
    pub fn contains(&self, name: &str) -> bool {
        match self {
            ResolvedPermissions::Wildcard => true,
            ResolvedPermissions::Explicit(names) => names.contains(name),
        }
    }

    /// Number of explicit grants; superusers report 0 since nothing is materialized.
    pub fn len(&self) -> usize {
        match self {
            ResolvedPermissions::Wildcard => 0,
            ResolvedPermissions::Explicit(names) => names.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            ResolvedPermissions::Wildcard => false,
            ResolvedPermissions::Explicit(names) => names.is_empty(),
        }
    }
}

impl FromIterator<String> for ResolvedPermissions {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        ResolvedPermissions::Explicit(iter.into_iter().collect())
    }
}
