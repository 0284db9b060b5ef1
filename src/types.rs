/// HTTP-style status code attached to a parameter rejection.
pub type ErrorCode = u16;

/// Stable arena index of a trie node.
pub(crate) type NodeId = u32;
