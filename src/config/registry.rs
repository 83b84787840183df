use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::backends::local::{JsonExtractorOperation, StreamInOperation, StreamOutOperation};
use crate::engine::NodeKind;
use crate::traits::{InitOperation, LoadInputOperation, MainOperation};

/// Behaviors bound to one node kind: main, optional input loader, optional initializer
#[derive(Clone)]
pub struct OperationSet {
    pub main: Arc<dyn MainOperation>,
    pub load_input: Option<Arc<dyn LoadInputOperation>>,
    pub init_node: Option<Arc<dyn InitOperation>>,
}

impl OperationSet {
    pub fn new(main: Arc<dyn MainOperation>) -> Self {
        Self {
            main,
            load_input: None,
            init_node: None,
        }
    }

    pub fn with_load_input(mut self, load_input: Arc<dyn LoadInputOperation>) -> Self {
        self.load_input = Some(load_input);
        self
    }

    pub fn with_init_node(mut self, init_node: Arc<dyn InitOperation>) -> Self {
        self.init_node = Some(init_node);
        self
    }
}

impl fmt::Debug for OperationSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationSet")
            .field("main", &self.main.name())
            .field("load_input", &self.load_input.is_some())
            .field("init_node", &self.init_node.is_some())
            .finish()
    }
}

/// Maps node kinds to their operation sets.
///
/// Assembled once through [`OperationRegistryBuilder`] and read-only after
/// that; graphs look operations up here while they are being built.
#[derive(Clone, Default)]
pub struct OperationRegistry {
    entries: HashMap<NodeKind, OperationSet>,
}

impl OperationRegistry {
    pub fn builder() -> OperationRegistryBuilder {
        OperationRegistryBuilder::default()
    }

    /// Registry holding only the in-process kinds
    pub fn with_builtins() -> Self {
        Self::builder().builtins().build()
    }

    /// Operation set bound to `kind`, if any
    pub fn resolve(&self, kind: NodeKind) -> Option<&OperationSet> {
        self.entries.get(&kind)
    }

    pub fn contains(&self, kind: NodeKind) -> bool {
        self.entries.contains_key(&kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = &NodeKind> {
        self.entries.keys()
    }
}

impl fmt::Debug for OperationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationRegistry")
            .field("kind_count", &self.entries.len())
            .field("kinds", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[derive(Default)]
pub struct OperationRegistryBuilder {
    entries: HashMap<NodeKind, OperationSet>,
}

impl OperationRegistryBuilder {
    /// Bind `kind` to `operations`, replacing any previous binding
    pub fn register(mut self, kind: NodeKind, operations: OperationSet) -> Self {
        self.entries.insert(kind, operations);
        self
    }

    /// Register the kinds implemented by the local backend
    pub fn builtins(self) -> Self {
        let stream_in = Arc::new(StreamInOperation);
        self.register(
            NodeKind::StreamIn,
            OperationSet::new(stream_in.clone()).with_load_input(stream_in),
        )
        .register(NodeKind::StreamOut, OperationSet::new(Arc::new(StreamOutOperation)))
        .register(
            NodeKind::JsonExtractor,
            OperationSet::new(Arc::new(JsonExtractorOperation)),
        )
    }

    pub fn build(self) -> OperationRegistry {
        OperationRegistry {
            entries: self.entries,
        }
    }
}
