use bitflags::bitflags;
use smallvec::SmallVec;

use crate::types::NodeId;

/// The single-character segment text standing for "one dynamic path
/// component here". Insertion chunks paths at this character, so a node's
/// text is either pure literal text or exactly this placeholder.
pub(crate) const PLACEHOLDER: &str = ":";

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub(crate) struct NodeFlags: u8 {
        const ROOT = 0b0000_0001;
        const ROOT_WILDCARD = 0b0000_0010;
    }
}

pub(crate) struct Node<H> {
    pub(crate) text: String,
    pub(crate) wildcard_param: Option<String>,
    pub(crate) param_names: Vec<String>,
    pub(crate) children: SmallVec<[NodeId; 4]>,
    pub(crate) handlers: Option<H>,
    pub(crate) flags: NodeFlags,
}

impl<H> Node<H> {
    pub(crate) fn bare(text: String, flags: NodeFlags) -> Self {
        Self {
            text,
            wildcard_param: None,
            param_names: Vec::new(),
            children: SmallVec::new(),
            handlers: None,
            flags,
        }
    }

    pub(crate) fn is_placeholder(&self) -> bool {
        self.text == PLACEHOLDER
    }

    pub(crate) fn is_root(&self) -> bool {
        self.flags.contains(NodeFlags::ROOT)
    }

    pub(crate) fn is_root_wildcard(&self) -> bool {
        self.flags.contains(NodeFlags::ROOT_WILDCARD)
    }
}
