//! Workflow store - JSON-file persistence for the workflow list
//!
//! The store owns list-level identity, ordering, and durability; the wizard
//! core never touches it directly and only ever hands back whole Workflow
//! values. Records are kept in one JSON file, written atomically via a
//! temp-file rename.

use eyre::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::domain::{Workflow, id_matches};

/// The main workflow store
pub struct WorkflowStore {
    /// Path of the JSON file holding the list
    file_path: PathBuf,

    /// In-memory list, newest first
    workflows: Vec<Workflow>,
}

impl WorkflowStore {
    /// Open a store, loading the list if the file exists
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file_path = path.as_ref().to_path_buf();

        let workflows = if file_path.exists() {
            let content = fs::read_to_string(&file_path).context("Failed to read workflow store")?;
            serde_json::from_str(&content).context("Failed to parse workflow store")?
        } else {
            Vec::new()
        };

        debug!(path = %file_path.display(), count = workflows.len(), "Opened workflow store");
        Ok(Self { file_path, workflows })
    }

    /// All workflows, newest first
    pub fn list(&self) -> &[Workflow] {
        &self.workflows
    }

    /// Look up a workflow by exact ID
    pub fn get(&self, id: &str) -> Option<&Workflow> {
        self.workflows.iter().find(|w| w.id == id)
    }

    /// Resolve a partial reference (hex prefix or slug fragment)
    ///
    /// Returns:
    /// - Ok(Some(workflow)) if exactly one match
    /// - Ok(None) if no matches
    /// - Err with candidate IDs if ambiguous
    pub fn resolve(&self, reference: &str) -> std::result::Result<Option<&Workflow>, Vec<String>> {
        let matches: Vec<&Workflow> = self
            .workflows
            .iter()
            .filter(|w| id_matches(&w.id, reference))
            .collect();

        match matches.len() {
            0 => Ok(None),
            1 => Ok(Some(matches[0])),
            _ => Err(matches.iter().map(|w| w.id.clone()).collect()),
        }
    }

    /// Insert or replace a workflow by ID and persist
    pub fn upsert(&mut self, workflow: Workflow) -> Result<()> {
        match self.workflows.iter_mut().find(|w| w.id == workflow.id) {
            Some(slot) => *slot = workflow,
            None => self.workflows.insert(0, workflow),
        }
        self.save()
    }

    /// Remove a workflow by ID and persist; returns whether it existed
    pub fn remove(&mut self, id: &str) -> Result<bool> {
        let before = self.workflows.len();
        self.workflows.retain(|w| w.id != id);
        let removed = self.workflows.len() != before;
        if removed {
            self.save()?;
            info!(%id, "Workflow removed");
        }
        Ok(removed)
    }

    /// Write the list atomically: serialize to a sibling temp file, then
    /// rename over the target so readers never see a torn file.
    fn save(&self) -> Result<()> {
        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent).context("Failed to create store directory")?;
        }

        let content = serde_json::to_string_pretty(&self.workflows).context("Failed to serialize workflows")?;

        let tmp_path = self.file_path.with_extension("json.tmp");
        fs::write(&tmp_path, content).context("Failed to write workflow store")?;
        fs::rename(&tmp_path, &self.file_path).context("Failed to replace workflow store")?;

        debug!(count = self.workflows.len(), "Workflow store saved");
        Ok(())
    }
}
