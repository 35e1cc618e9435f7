//! Script execution against a catalog.
//!
//! [`ScriptRunner`] walks a loaded [`ScriptSet`] in category order and
//! executes every statement of every file. By default each file runs in its
//! own transaction: the first failing statement rolls the file back and
//! stops the run. Files committed before the failure stay applied.

use std::collections::BTreeMap;

use dbmeta_core::ScriptCategory;
use dbmeta_scripts::{RawScript, ScriptSet};

use crate::catalog::Catalog;
use crate::error::{CatalogError, Result};

/// Options for a script run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Wrap each file in one transaction. When `false`, statements run in
    /// the catalog's autocommit mode.
    pub transaction_per_file: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            transaction_per_file: true,
        }
    }
}

/// Counts for one category of a completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryCounts {
    pub files: usize,
    pub statements: usize,
}

/// Summary of a completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub categories: BTreeMap<ScriptCategory, CategoryCounts>,
}

impl RunReport {
    pub fn files(&self) -> usize {
        self.categories.values().map(|c| c.files).sum()
    }

    pub fn statements(&self) -> usize {
        self.categories.values().map(|c| c.statements).sum()
    }

    /// Counts for one category; zero if nothing ran.
    pub fn category(&self, category: ScriptCategory) -> CategoryCounts {
        self.categories.get(&category).copied().unwrap_or_default()
    }
}

/// Outcome of executing one file.
enum FileOutcome {
    Applied { statements: usize },
    Failed { statement: usize, error: CatalogError },
}

/// Executes script sets against a catalog.
pub struct ScriptRunner<'a, C: Catalog> {
    catalog: &'a mut C,
    options: RunOptions,
}

impl<'a, C: Catalog> ScriptRunner<'a, C> {
    pub fn new(catalog: &'a mut C) -> Self {
        Self::with_options(catalog, RunOptions::default())
    }

    pub fn with_options(catalog: &'a mut C, options: RunOptions) -> Self {
        Self { catalog, options }
    }

    /// Runs every script of `set` in order.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::ScriptExecution`] for the first failing
    /// statement, after its file's transaction has been rolled back.
    pub fn run(&mut self, set: &ScriptSet) -> Result<RunReport> {
        let mut report = RunReport::default();
        for script in set.scripts() {
            let applied = self.run_script(script)?;
            let counts = report.categories.entry(script.category).or_default();
            counts.files += 1;
            counts.statements += applied;
        }
        tracing::info!(
            root = %set.root().display(),
            files = report.files(),
            statements = report.statements(),
            "script run complete"
        );
        Ok(report)
    }

    /// Runs one script, returning the number of statements executed.
    pub fn run_script(&mut self, script: &RawScript) -> Result<usize> {
        let transactional = self.options.transaction_per_file;
        if transactional {
            self.catalog.begin()?;
        }

        match self.execute_statements(script) {
            FileOutcome::Applied { statements } => {
                if transactional {
                    self.catalog.commit()?;
                }
                tracing::info!(
                    category = %script.category,
                    file = %script.file_name,
                    statements,
                    "executed script"
                );
                Ok(statements)
            }
            FileOutcome::Failed { statement, error } => {
                if transactional && self.catalog.in_transaction() {
                    if let Err(rollback) = self.catalog.rollback() {
                        tracing::warn!(file = %script.file_name, error = %rollback, "rollback failed");
                    }
                }
                Err(CatalogError::ScriptExecution {
                    category: script.category,
                    file: script.file_name.clone(),
                    statement,
                    source: Box::new(error),
                })
            }
        }
    }

    fn execute_statements(&mut self, script: &RawScript) -> FileOutcome {
        let batch = script.statements();
        for (index, statement) in batch.iter().enumerate() {
            tracing::debug!(file = %script.file_name, index = index + 1, "executing statement");
            if let Err(error) = self.catalog.execute(statement) {
                return FileOutcome::Failed {
                    statement: index + 1,
                    error,
                };
            }
        }
        FileOutcome::Applied {
            statements: batch.len(),
        }
    }
}
