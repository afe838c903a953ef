//! Model include/exclude filtering
//!
//! Model short names are often families: the 30 SAWS-ASPECS flavours all
//! contain "ASPECS", so including "ASPECS" keeps every flavour. Matching is
//! by literal substring; names such as "Model+X(1)" carry no pattern
//! syntax.
//!
//! Rules:
//!
//! 1. `Include::All` keeps the table as it is.
//! 2. Otherwise every model whose name contains none of the include
//!    fragments is excluded by name.
//! 3. Each explicit exclude fragment removes models containing it, unless
//!    the model also contains any more specific include fragment that
//!    itself contains the exclude fragment (`include=["ModelA-v2"]`,
//!    `exclude=["ModelA"]` keeps "ModelA-v2").
//! 4. Empty exclude fragments are ignored.

use crate::error::Result;
use crate::table::Table;
use tracing::info;

pub const MODEL_COLUMN: &str = "Model";

/// Sentinel spelling of [`Include::All`] on the command line
pub const ALL_MODELS: &str = "All";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Include {
    All,
    Matching(Vec<String>),
}

impl Include {
    /// `["All"]` (or nothing) means every model.
    pub fn from_list(list: &[String]) -> Self {
        match list.first() {
            None => Include::All,
            Some(first) if first == ALL_MODELS => Include::All,
            Some(_) => Include::Matching(list.to_vec()),
        }
    }

    pub fn matches(&self, model: &str) -> bool {
        match self {
            Include::All => true,
            Include::Matching(fragments) => fragments.iter().any(|f| model.contains(f.as_str())),
        }
    }

    /// Include fragments that contain `exclude`
    fn shielding(&self, exclude: &str) -> Vec<&str> {
        match self {
            Include::All => Vec::new(),
            Include::Matching(fragments) => fragments
                .iter()
                .filter(|f| f.contains(exclude))
                .map(String::as_str)
                .collect(),
        }
    }
}

/// One entry of the effective exclude set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exclusion {
    /// User-supplied fragment, matched as a substring
    Fragment(String),
    /// A model that matched no include fragment, matched by full name
    Model(String),
}

impl Exclusion {
    pub fn pattern(&self) -> &str {
        match self {
            Exclusion::Fragment(s) | Exclusion::Model(s) => s,
        }
    }

    fn matches(&self, model: &str) -> bool {
        match self {
            Exclusion::Fragment(f) => model.contains(f.as_str()),
            Exclusion::Model(m) => model == m,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelFilter {
    include: Include,
    exclude: Vec<String>,
}

impl Default for ModelFilter {
    fn default() -> Self {
        Self {
            include: Include::All,
            exclude: Vec::new(),
        }
    }
}

impl ModelFilter {
    pub fn new(include: Include, exclude: Vec<String>) -> Self {
        Self { include, exclude }
    }

    pub fn from_lists(include: &[String], exclude: &[String]) -> Self {
        Self::new(Include::from_list(include), exclude.to_vec())
    }

    pub fn include(&self) -> &Include {
        &self.include
    }

    /// Exclusions implied by the include policy plus the caller's fragments,
    /// computed fresh for the given model names. Empty under `Include::All`.
    pub fn effective_exclude(&self, models: &[String]) -> Vec<Exclusion> {
        if self.include == Include::All {
            return Vec::new();
        }

        let mut out: Vec<Exclusion> = self
            .exclude
            .iter()
            .filter(|e| !e.is_empty())
            .map(|e| Exclusion::Fragment(e.clone()))
            .collect();

        for model in models {
            if !self.include.matches(model) {
                out.push(Exclusion::Model(model.clone()));
            }
        }
        out
    }

    /// Rows whose model survives the policy, in original order.
    pub fn apply(&self, table: &Table) -> Result<Table> {
        if self.include == Include::All {
            return Ok(table.clone());
        }

        let model_col = table.require(MODEL_COLUMN)?;
        let exclusions = self.effective_exclude(&table.unique(model_col));

        let mut kept = table.clone();
        for exclusion in &exclusions {
            let shield = match exclusion {
                Exclusion::Fragment(f) => self.include.shielding(f),
                Exclusion::Model(_) => Vec::new(),
            };
            kept = kept.filter(|row| {
                let name = row[model_col.index()].to_string();
                !exclusion.matches(&name) || shield.iter().any(|s| name.contains(*s))
            });
            info!("Removed model metrics for {}", exclusion.pattern());
        }
        Ok(kept)
    }
}
