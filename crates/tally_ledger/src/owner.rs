//! Owners and storage keys.

use core::fmt;

/// Namespace a resource belongs to.
///
/// Kinds are identified by name: `Other("user")` is the same namespace as
/// [`OwnerKind::User`], and [`OwnerKind::from_name`] folds such names into the
/// built-in variants.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OwnerKind {
    /// A bot user.
    User,
    /// A chat (group, channel or private dialog).
    Chat,
    /// The bot-wide namespace.
    Global,
    /// Any other entity type, by name.
    Other(String),
}

impl OwnerKind {
    /// Maps a namespace name to a kind, preferring the built-in variants.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "user" => Self::User,
            "chat" => Self::Chat,
            "global" => Self::Global,
            other => Self::Other(other.to_string()),
        }
    }

    /// Returns the namespace name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::User => "user",
            Self::Chat => "chat",
            Self::Global => "global",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for OwnerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The owner of a resource: a kind plus an id within that kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Owner {
    kind: OwnerKind,
    id: String,
}

impl Owner {
    /// Creates an owner. `Other` kinds naming a built-in are normalized.
    #[must_use]
    pub fn new(kind: OwnerKind, id: impl Into<String>) -> Self {
        let kind = match kind {
            OwnerKind::Other(name) => OwnerKind::from_name(&name),
            builtin => builtin,
        };
        Self {
            kind,
            id: id.into(),
        }
    }

    /// Returns the owner kind.
    #[must_use]
    pub fn kind(&self) -> &OwnerKind {
        &self.kind
    }

    /// Returns the owner id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// Storage key of one resource.
///
/// Built as `prefix + kind + "_" + id + "_" + name`, with `%` and `_`
/// percent-escaped inside each component. Distinct `(kind, id, name)`
/// tuples therefore never share a key, and no resource key ends in an
/// unescaped `_growth`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceKey(String);

impl ResourceKey {
    /// Derives the key for `name` owned by `owner`.
    #[must_use]
    pub fn namespace(prefix: &str, owner: &Owner, name: &str) -> Self {
        let mut key = String::with_capacity(prefix.len() + owner.id.len() + name.len() + 16);
        key.push_str(prefix);
        push_escaped(&mut key, owner.kind.as_str());
        key.push('_');
        push_escaped(&mut key, &owner.id);
        key.push('_');
        push_escaped(&mut key, name);
        Self(key)
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ResourceKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn push_escaped(out: &mut String, component: &str) {
    for ch in component.chars() {
        match ch {
            '%' => out.push_str("%25"),
            '_' => out.push_str("%5F"),
            other => out.push(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(kind: OwnerKind, id: &str, name: &str) -> String {
        ResourceKey::namespace("ResourcesLib_", &Owner::new(kind, id), name)
            .as_str()
            .to_string()
    }

    #[test]
    fn plain_components_keep_legacy_layout() {
        assert_eq!(
            key(OwnerKind::User, "42", "coins"),
            "ResourcesLib_user_42_coins"
        );
        assert_eq!(
            key(OwnerKind::Global, "global", "jackpot"),
            "ResourcesLib_global_global_jackpot"
        );
    }

    #[test]
    fn underscores_cannot_shift_between_components() {
        let a = key(OwnerKind::User, "a_b", "c");
        let b = key(OwnerKind::User, "a", "b_c");
        assert_ne!(a, b);
        assert_eq!(a, "ResourcesLib_user_a%5Fb_c");
    }

    #[test]
    fn resource_key_never_looks_like_growth_key() {
        let coins = key(OwnerKind::User, "1", "coins");
        let tricky = key(OwnerKind::User, "1", "coins_growth");
        assert_ne!(tricky, format!("{coins}_growth"));
    }

    #[test]
    fn percent_is_escaped_too() {
        assert_eq!(
            key(OwnerKind::Chat, "5%5F", "x"),
            "ResourcesLib_chat_5%255F_x"
        );
    }

    #[test]
    fn other_kinds_fold_into_builtins() {
        let owner = Owner::new(OwnerKind::Other("chat".into()), "9");
        assert_eq!(owner.kind(), &OwnerKind::Chat);

        let clan = Owner::new(OwnerKind::Other("clan".into()), "9");
        assert_eq!(clan.kind().as_str(), "clan");
        assert_eq!(clan.to_string(), "clan:9");
    }
}
