use std::collections::HashSet;

/// The set of tag names a [BBParser][super::BBParser] substitutes.
///
/// Names are stored trimmed and lower-cased, empty names are dropped and duplicates collapse.
/// Lookups are ASCII case-insensitive, since a tag name in a document can only ever contain
/// `[0-9A-Za-z_-]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagRegistry {
    names: HashSet<String>,
}

impl TagRegistry {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names.into_iter().collect()
    }

    /// Returns the canonical (lower-case) form of `name` if it is registered.
    pub fn lookup(&self, name: &str) -> Option<&str> {
        if name.is_empty() {
            return None;
        }

        self.names
            .get(name.to_ascii_lowercase().as_str())
            .map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterates the canonical names in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl<S> FromIterator<S> for TagRegistry
where
    S: AsRef<str>,
{
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let names = iter
            .into_iter()
            .map(|x| x.as_ref().trim().to_lowercase())
            .filter(|x| !x.is_empty())
            .collect();

        Self { names }
    }
}
