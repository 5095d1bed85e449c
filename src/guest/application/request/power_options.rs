use crate::core::application::orchestration::ExecutionOptions;

/// Options shared by all power actions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PowerOptions {
    /// Only guests on this node. Default: all nodes.
    pub node: Option<String>,
    pub execution: ExecutionOptions,
}
