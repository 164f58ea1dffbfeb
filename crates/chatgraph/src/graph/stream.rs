//! Stream events emitted by `CompiledStateGraph::stream`.

/// What each stream event carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamMode {
    /// One event per node: the node id and the state it produced.
    #[default]
    Updates,
    /// The full state: once before the first node, then after every node.
    Values,
}

/// One event of a streaming run.
#[derive(Debug, Clone)]
pub enum StreamEvent<S> {
    Updates { node: String, state: S },
    Values(S),
}

impl<S> StreamEvent<S> {
    /// State carried by the event, whatever the mode.
    pub fn state(&self) -> &S {
        match self {
            StreamEvent::Updates { state, .. } | StreamEvent::Values(state) => state,
        }
    }

    /// Node that produced the event; `None` in values mode.
    pub fn node(&self) -> Option<&str> {
        match self {
            StreamEvent::Updates { node, .. } => Some(node),
            StreamEvent::Values(_) => None,
        }
    }

    pub fn into_state(self) -> S {
        match self {
            StreamEvent::Updates { state, .. } | StreamEvent::Values(state) => state,
        }
    }
}
