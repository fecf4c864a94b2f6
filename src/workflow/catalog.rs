/// Immutable workflow catalog
///
/// Holds the workflows handed to the playground at startup, in the order they
/// were supplied, plus an identifier index built once so lookups don't rescan.

use crate::workflow::types::Workflow;
use std::{collections::HashMap, sync::Arc};

/// Read-only collection of workflows shared by all requests
pub struct WorkflowCatalog {
    /// Workflows in registration order (used for listings)
    workflows: Vec<Arc<dyn Workflow>>,

    /// Key: workflow_id, Value: position of the first workflow with that ID
    index: HashMap<String, usize>,
}

impl WorkflowCatalog {
    /// Build the catalog and its lookup index
    ///
    /// When two workflows share an ID the first one wins, matching a linear scan.
    pub fn new(workflows: Vec<Arc<dyn Workflow>>) -> Self {
        let mut index = HashMap::with_capacity(workflows.len());

        for (position, workflow) in workflows.iter().enumerate() {
            let workflow_id = workflow.workflow_id();
            if index.contains_key(workflow_id) {
                tracing::warn!(
                    "⚠️ Duplicate workflow id '{}' at position {}; keeping the first registration",
                    workflow_id,
                    position
                );
                continue;
            }
            index.insert(workflow_id.to_string(), position);
        }

        tracing::info!("Initialized workflow catalog with {} workflows", workflows.len());

        Self { workflows, index }
    }

    /// Get a workflow by ID
    pub fn get(&self, workflow_id: &str) -> Option<&Arc<dyn Workflow>> {
        self.index
            .get(workflow_id)
            .and_then(|&position| self.workflows.get(position))
    }

    /// All workflows in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Workflow>> {
        self.workflows.iter()
    }

    pub fn len(&self) -> usize {
        self.workflows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workflows.is_empty()
    }
}

impl std::fmt::Debug for WorkflowCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.workflows.iter().map(|w| w.workflow_id()))
            .finish()
    }
}
