use smallvec::SmallVec;

/// Ordered name→raw-value pairs captured by a trie lookup. Keys borrow from
/// the trie, values from the request path; nothing is copied on the lookup
/// path. The sink can be reused across lookups via [`RouteParams::clear`].
#[derive(Debug, Clone, Default)]
pub struct RouteParams<'k, 'v> {
    entries: SmallVec<[(&'k str, &'v str); 4]>,
}

impl<'k, 'v> RouteParams<'k, 'v> {
    pub fn new() -> Self {
        Self {
            entries: SmallVec::new(),
        }
    }

    pub(crate) fn push(&mut self, key: &'k str, value: &'v str) {
        self.entries.push((key, value));
    }

    /// The value of the first parameter with the given name.
    pub fn get(&self, name: &str) -> Option<&'v str> {
        self.entries
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'k str, &'v str)> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
