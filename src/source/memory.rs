//! In-memory attribute source.

use super::{AttributeSource, Child, SourceError};
use std::collections::HashMap;
use std::io::{self, Cursor};

/// Index of a node inside a [`MemorySource`].
pub type NodeId = usize;

#[derive(Debug, Default)]
struct Node {
    name: String,
    attributes: HashMap<String, String>,
    driver: Option<String>,
    children: Vec<NodeId>,
    descriptors: Option<Vec<u8>>,
    unlistable: bool,
}

/// Attribute source backed by an in-memory tree of named nodes.
///
/// Mirrors the sysfs layout: a device node has interface and `ep_XX`
/// children, and attribute names containing `/` walk into child nodes.
#[derive(Debug, Default)]
pub struct MemorySource {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
}

impl MemorySource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a top-level device node.
    pub fn add_device(&mut self, name: impl Into<String>) -> NodeId {
        let id = self.insert(name.into());
        self.roots.push(id);
        id
    }

    /// Add a child node below `parent`.
    pub fn add_child(&mut self, parent: NodeId, name: impl Into<String>) -> NodeId {
        let id = self.insert(name.into());
        self.nodes[parent].children.push(id);
        id
    }

    /// Set an attribute on a node.
    pub fn set(&mut self, node: NodeId, name: impl Into<String>, value: impl Into<String>) {
        self.nodes[node].attributes.insert(name.into(), value.into());
    }

    /// Bind a driver name to a node.
    pub fn set_driver(&mut self, node: NodeId, driver: impl Into<String>) {
        self.nodes[node].driver = Some(driver.into());
    }

    /// Attach a raw descriptor stream to a node.
    pub fn set_descriptors(&mut self, node: NodeId, bytes: impl Into<Vec<u8>>) {
        self.nodes[node].descriptors = Some(bytes.into());
    }

    /// Make child listing of a node fail.
    pub fn fail_children(&mut self, node: NodeId) {
        self.nodes[node].unlistable = true;
    }

    /// Top-level device nodes in insertion order.
    pub fn devices(&self) -> Vec<Child<NodeId>> {
        self.roots
            .iter()
            .map(|&id| Child {
                name: self.nodes[id].name.clone(),
                handle: id,
            })
            .collect()
    }

    fn insert(&mut self, name: String) -> NodeId {
        self.nodes.push(Node {
            name,
            ..Node::default()
        });
        self.nodes.len() - 1
    }
}

impl AttributeSource for MemorySource {
    type Handle = NodeId;
    type Stream = Cursor<Vec<u8>>;

    fn attribute(&self, handle: &NodeId, name: &str) -> Option<String> {
        let mut node = self.nodes.get(*handle)?;
        let mut parts = name.split('/').peekable();
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                return node.attributes.get(part).cloned();
            }
            let next = node
                .children
                .iter()
                .map(|&id| &self.nodes[id])
                .find(|child| child.name == part)?;
            node = next;
        }
        None
    }

    fn driver(&self, handle: &NodeId) -> Option<String> {
        self.nodes.get(*handle)?.driver.clone()
    }

    fn children(&self, handle: &NodeId) -> Result<Vec<Child<NodeId>>, SourceError> {
        let node = self.nodes.get(*handle).ok_or_else(|| SourceError::Children {
            handle: format!("node {}", handle),
            source: io::Error::from(io::ErrorKind::NotFound),
        })?;

        if node.unlistable {
            return Err(SourceError::Children {
                handle: node.name.clone(),
                source: io::Error::from(io::ErrorKind::PermissionDenied),
            });
        }

        Ok(node
            .children
            .iter()
            .map(|&id| Child {
                name: self.nodes[id].name.clone(),
                handle: id,
            })
            .collect())
    }

    fn descriptors(&self, handle: &NodeId) -> Result<Cursor<Vec<u8>>, SourceError> {
        let node = self.nodes.get(*handle);
        match node.and_then(|n| n.descriptors.clone()) {
            Some(bytes) => Ok(Cursor::new(bytes)),
            None => Err(SourceError::Descriptors {
                handle: node
                    .map(|n| n.name.clone())
                    .unwrap_or_else(|| format!("node {}", handle)),
                source: io::Error::from(io::ErrorKind::NotFound),
            }),
        }
    }
}
