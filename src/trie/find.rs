use memchr::memchr;
use smallvec::SmallVec;

use super::PathTrie;
use crate::params::RouteParams;
use crate::types::NodeId;

impl<H> PathTrie<H> {
    /// Read-only lookup. On a match, fills `params` with name→raw-value
    /// pairs in the order the trie captured them and returns the handlers.
    pub fn find<'t, 'p>(
        &'t self,
        path: &'p str,
        params: &mut RouteParams<'t, 'p>,
    ) -> Option<&'t H> {
        tracing::event!(tracing::Level::TRACE, operation = "find", path = %path);

        let mut captures: SmallVec<[&'p str; 4]> = SmallVec::new();
        let id = self.find_in(&self.roots, path, &mut captures)?;
        let node = self.node(id);

        for (i, value) in captures.iter().enumerate() {
            match node.param_names.get(i) {
                Some(name) => params.push(name, value),
                None => {
                    // a capture beyond the named list belongs to the wildcard
                    if let Some(wildcard) = &node.wildcard_param {
                        params.push(wildcard, value);
                    }
                }
            }
        }

        node.handlers.as_ref()
    }

    fn find_in<'t, 'p>(
        &'t self,
        siblings: &[NodeId],
        path: &'p str,
        captures: &mut SmallVec<[&'p str; 4]>,
    ) -> Option<NodeId> {
        for &id in siblings {
            let node = self.node(id);

            if node.is_root_wildcard() {
                if node.handlers.is_some() && path.len() > 1 && path.starts_with('/') {
                    captures.push(&path[1..]);
                    return Some(id);
                }
                continue;
            }

            if node.is_placeholder() {
                if path.is_empty() {
                    continue;
                }
                match memchr(b'/', path.as_bytes()) {
                    None => {
                        if node.handlers.is_some() {
                            captures.push(path);
                            return Some(id);
                        }
                    }
                    Some(0) => {}
                    Some(end) => {
                        captures.push(&path[..end]);
                        if let Some(found) = self.find_in(&node.children, &path[end..], captures) {
                            return Some(found);
                        }
                        captures.pop();
                    }
                }
                continue;
            }

            if !path.starts_with(node.text.as_str()) {
                continue;
            }
            let rest = &path[node.text.len()..];

            if rest.is_empty() {
                // an exact text match still needs handlers; prefix-split
                // parents exist purely to host deeper children
                if node.handlers.is_some() {
                    return Some(id);
                }
                continue;
            }

            if let Some(found) = self.find_in(&node.children, rest, captures) {
                return Some(found);
            }

            // descent failed: a '/'-terminated wildcard leaf swallows the
            // remainder, unless it is an ambiguous root
            if node.handlers.is_some()
                && node.wildcard_param.is_some()
                && node.text.ends_with('/')
                && !(node.is_root() && (node.text == "/" || !node.children.is_empty()))
            {
                captures.push(rest);
                return Some(id);
            }
        }

        None
    }
}
