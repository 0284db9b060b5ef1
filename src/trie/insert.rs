use std::cmp::Ordering;

use smallvec::SmallVec;

use super::error::{TrieError, TrieResult};
use super::node::{Node, NodeFlags, PLACEHOLDER};
use super::{PathTrie, Slot};
use crate::types::NodeId;

/// The payload carried down an insertion: the names recorded during path
/// reduction and the handlers to attach at the terminal node.
struct RouteLeaf<H> {
    wildcard_param: Option<String>,
    param_names: Vec<String>,
    handlers: H,
}

impl<H> PathTrie<H> {
    /// Registers one route path. Dynamic segments arrive as `:name`, a
    /// trailing wildcard as `*name`; both are reduced before insertion.
    /// Fails with [`TrieError::DuplicateRoute`] when another registration
    /// already holds handlers at the same trie path.
    pub fn add(&mut self, path: &str, handlers: H) -> TrieResult<()> {
        tracing::event!(tracing::Level::TRACE, operation = "add", path = %path);

        if !path.starts_with('/') {
            return Err(TrieError::InvalidPath {
                path: path.to_string(),
            });
        }

        let (reduced, wildcard_param, param_names) = reduce_path(path)?;
        let leaf = RouteLeaf {
            wildcard_param,
            param_names,
            handlers,
        };

        if reduced == "/" && leaf.wildcard_param.is_some() {
            self.add_root_wildcard(leaf, path)?;
        } else {
            self.add_in(Slot::Roots, &reduced, leaf, true, path)?;
        }

        self.routes += 1;
        self.prioritize();
        Ok(())
    }

    fn add_root_wildcard(&mut self, leaf: RouteLeaf<H>, full: &str) -> TrieResult<()> {
        let existing = self
            .roots
            .iter()
            .copied()
            .find(|&id| self.node(id).is_root_wildcard());
        match existing {
            Some(id) => self.attach(id, leaf, full),
            None => {
                let id = self.alloc(Node {
                    text: "/".to_string(),
                    wildcard_param: leaf.wildcard_param,
                    param_names: leaf.param_names,
                    children: SmallVec::new(),
                    handlers: Some(leaf.handlers),
                    flags: NodeFlags::ROOT | NodeFlags::ROOT_WILDCARD,
                });
                self.roots.push(id);
                Ok(())
            }
        }
    }

    fn add_in(
        &mut self,
        slot: Slot,
        path: &str,
        leaf: RouteLeaf<H>,
        root: bool,
        full: &str,
    ) -> TrieResult<()> {
        debug_assert!(!path.is_empty());

        // A placeholder never merges with literal text; it is its own node.
        if let Some(rest) = path.strip_prefix(':') {
            let existing = self
                .siblings(slot)
                .iter()
                .copied()
                .find(|&id| self.node(id).is_placeholder());
            let id = match existing {
                Some(id) => id,
                None => {
                    let id = self.alloc(Node::bare(PLACEHOLDER.to_string(), root_flag(root)));
                    self.siblings_mut(slot).push(id);
                    id
                }
            };
            return if rest.is_empty() {
                self.attach(id, leaf, full)
            } else {
                self.add_in(Slot::Child(id), rest, leaf, false, full)
            };
        }

        let chunk_end = path.find(':').unwrap_or(path.len());
        let chunk = &path[..chunk_end];
        let rest = &path[chunk_end..];

        let sibling_ids: SmallVec<[NodeId; 4]> = self.siblings(slot).clone();
        for id in sibling_ids {
            let node = self.node(id);
            if node.is_placeholder() || node.is_root_wildcard() {
                continue;
            }

            let text_len = node.text.len();
            let common = common_prefix_len(&node.text, chunk);
            if common == 0 {
                continue;
            }

            if common < text_len && common < chunk.len() {
                // divergence inside both texts: split the node and grow a
                // fresh branch for the new suffix
                self.split_at(id, common);
                let branch = self.alloc_chain(&path[common..], leaf);
                self.node_mut(id).children.push(branch);
                return Ok(());
            }

            if common == chunk.len() && common < text_len {
                // the chunk is a strict prefix of the node text: shrink the
                // node into a parent holding only the chunk
                self.split_at(id, common);
                return if rest.is_empty() {
                    self.attach(id, leaf, full)
                } else {
                    self.add_in(Slot::Child(id), rest, leaf, false, full)
                };
            }

            if common == text_len && common < path.len() {
                if self.node(id).wildcard_param.is_some() {
                    // wildcard leaves take no descendants; a longer route
                    // sharing the prefix becomes a sibling instead
                    continue;
                }
                return self.add_in(Slot::Child(id), &path[common..], leaf, false, full);
            }

            // exact match
            return self.attach(id, leaf, full);
        }

        // no sibling shares a prefix: append a fresh branch
        let id = self.alloc_chain(path, leaf);
        if root {
            self.node_mut(id).flags.insert(NodeFlags::ROOT);
        }
        self.siblings_mut(slot).push(id);
        Ok(())
    }

    fn attach(&mut self, id: NodeId, leaf: RouteLeaf<H>, full: &str) -> TrieResult<()> {
        let node = self.node_mut(id);
        if node.handlers.is_some() {
            return Err(TrieError::DuplicateRoute {
                path: full.to_string(),
            });
        }
        node.handlers = Some(leaf.handlers);
        node.param_names = leaf.param_names;
        node.wildcard_param = leaf.wildcard_param;
        Ok(())
    }

    /// Splits the node at `at` bytes of its text. The node keeps its identity
    /// (and its id in every parent's child list); its payload and children
    /// move into a freshly allocated suffix child.
    fn split_at(&mut self, id: NodeId, at: usize) {
        let node = self.node_mut(id);
        let text = std::mem::take(&mut node.text);
        let children = std::mem::take(&mut node.children);
        let handlers = node.handlers.take();
        let wildcard_param = node.wildcard_param.take();
        let param_names = std::mem::take(&mut node.param_names);

        let suffix = self.alloc(Node {
            text: text[at..].to_string(),
            wildcard_param,
            param_names,
            children,
            handlers,
            flags: NodeFlags::empty(),
        });

        let node = self.node_mut(id);
        node.text = text[..at].to_string();
        node.children.push(suffix);
    }

    /// Allocates a chain of nodes for `path`, alternating literal chunks and
    /// placeholder nodes, with the payload attached at the deepest one.
    /// Returns the head id.
    fn alloc_chain(&mut self, path: &str, leaf: RouteLeaf<H>) -> NodeId {
        let (unit, rest) = split_first_unit(path);
        if rest.is_empty() {
            self.alloc(Node {
                text: unit.to_string(),
                wildcard_param: leaf.wildcard_param,
                param_names: leaf.param_names,
                children: SmallVec::new(),
                handlers: Some(leaf.handlers),
                flags: NodeFlags::empty(),
            })
        } else {
            let child = self.alloc_chain(rest, leaf);
            let mut node = Node::bare(unit.to_string(), NodeFlags::empty());
            node.children.push(child);
            self.alloc(node)
        }
    }

    /// Re-sorts every sibling list: literals before the placeholder before
    /// the root wildcard; literals by descending subtree size, then
    /// descending text length, then ascending text. The length key makes a
    /// longer literal win over a shorter wildcard-carrying prefix regardless
    /// of registration order.
    fn prioritize(&mut self) {
        self.sort_level(Slot::Roots);
    }

    fn sort_level(&mut self, slot: Slot) {
        let mut ids: SmallVec<[NodeId; 4]> = self.siblings(slot).clone();
        ids.sort_by(|&a, &b| self.compare(a, b));
        *self.siblings_mut(slot) = ids.clone();
        for id in ids {
            self.sort_level(Slot::Child(id));
        }
    }

    fn compare(&self, a: NodeId, b: NodeId) -> Ordering {
        let (na, nb) = (self.node(a), self.node(b));
        sort_rank(na)
            .cmp(&sort_rank(nb))
            .then_with(|| self.subtree_size(b).cmp(&self.subtree_size(a)))
            .then_with(|| nb.text.len().cmp(&na.text.len()))
            .then_with(|| na.text.cmp(&nb.text))
    }

    fn subtree_size(&self, id: NodeId) -> usize {
        let node = self.node(id);
        1 + node
            .children
            .iter()
            .map(|&child| self.subtree_size(child))
            .sum::<usize>()
    }
}

fn sort_rank<H>(node: &Node<H>) -> u8 {
    if node.is_root_wildcard() {
        2
    } else if node.is_placeholder() {
        1
    } else {
        0
    }
}

fn root_flag(root: bool) -> NodeFlags {
    if root { NodeFlags::ROOT } else { NodeFlags::empty() }
}

fn common_prefix_len(a: &str, b: &str) -> usize {
    let mut n = a
        .as_bytes()
        .iter()
        .zip(b.as_bytes())
        .take_while(|(x, y)| x == y)
        .count();
    // never split inside a multi-byte character; the shared bytes make the
    // boundary the same in both strings
    while n > 0 && !a.is_char_boundary(n) {
        n -= 1;
    }
    n
}

fn split_first_unit(path: &str) -> (&str, &str) {
    if let Some(rest) = path.strip_prefix(':') {
        (PLACEHOLDER, rest)
    } else {
        let end = path.find(':').unwrap_or(path.len());
        (&path[..end], &path[end..])
    }
}

/// Reduces a `:name`/`*name` shaped path: dynamic segments shrink to the
/// placeholder character with names recorded left-to-right; a wildcard
/// suffix truncates the path and records its name apart.
fn reduce_path(path: &str) -> TrieResult<(String, Option<String>, Vec<String>)> {
    let mut wildcard_param = None;
    let mut working = path;

    if let Some(i) = path.find('*') {
        let name = &path[i + 1..];
        if name.is_empty() || name.contains('/') || i == 0 || path.as_bytes()[i - 1] != b'/' {
            return Err(TrieError::WildcardNotTerminal {
                path: path.to_string(),
            });
        }
        wildcard_param = Some(name.to_string());
        working = &path[..i];
    }

    let mut param_names = Vec::new();
    let mut reduced = String::with_capacity(working.len());
    for (i, segment) in working.split('/').enumerate() {
        if i > 0 {
            reduced.push('/');
        }
        if let Some(name) = segment.strip_prefix(':') {
            if name.is_empty() {
                return Err(TrieError::EmptyParamName {
                    path: path.to_string(),
                });
            }
            param_names.push(name.to_string());
            reduced.push(':');
        } else {
            reduced.push_str(segment);
        }
    }

    Ok((reduced, wildcard_param, param_names))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reduces_dynamic_segments_to_placeholders() {
        let (reduced, wildcard, names) = reduce_path("/users/:id/posts/:slug").expect("reduce");
        assert_eq!(reduced, "/users/:/posts/:");
        assert_eq!(names, vec!["id", "slug"]);
        assert!(wildcard.is_none());
    }

    #[test]
    fn truncates_wildcard_suffix() {
        let (reduced, wildcard, names) = reduce_path("/files/*rest").expect("reduce");
        assert_eq!(reduced, "/files/");
        assert_eq!(wildcard.as_deref(), Some("rest"));
        assert!(names.is_empty());
    }

    #[test]
    fn rejects_non_terminal_wildcard() {
        let err = reduce_path("/files/*rest/x").expect_err("wildcard must be terminal");
        match err {
            TrieError::WildcardNotTerminal { .. } => {}
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn splits_shared_literal_prefixes() {
        let mut trie: PathTrie<u8> = PathTrie::new();
        trie.add("/search", 1).expect("first route");
        trie.add("/support", 2).expect("second route");
        // "/s" parent with two children, plus the two leaves
        assert_eq!(trie.arena.len(), 3);
        assert_eq!(trie.node(trie.roots[0]).text, "/s");
    }
}
