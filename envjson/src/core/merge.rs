//! Reconciliation of a local spec against its parent environment.
//!
//! Merge policy (inherit-only):
//! - A local entry marked `inherit` takes the parent's value when the parent
//!   has that key, whatever its local value was.
//! - Every other local entry keeps its own value.
//! - Parent-only keys are never copied into local. The spec file declares the
//!   complete variable surface of the target environment.
//!
//! After inheriting, every `required` entry must be non-empty.

use tracing::{debug, instrument};

use crate::core::env::Env;
use crate::error::SpecError;

/// Bookkeeping of what a successful merge did.
///
/// Lists are in ascending name order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Keys whose value was taken from the parent.
    pub inherited: Vec<String>,
    /// Keys marked `inherit` that the parent did not have.
    pub not_in_parent: Vec<String>,
}

impl Env {
    /// Merge `parent` into `self`, then enforce required variables.
    ///
    /// `parent` is only read. On a missing-required failure the inherit step
    /// has still been applied to `self`.
    #[instrument(skip_all, fields(local = self.len(), parent = parent.len()))]
    pub fn merge(&mut self, parent: &Env) -> Result<MergeReport, SpecError> {
        let report = self.inherit_from(parent);
        debug!(
            inherited = report.inherited.len(),
            not_in_parent = report.not_in_parent.len(),
            "inherit step applied"
        );

        let missing = self.missing_required();
        if !missing.is_empty() {
            debug!(missing = ?missing, "required variables without value");
            return Err(SpecError::MissingRequiredVariable { names: missing });
        }
        Ok(report)
    }

    fn inherit_from(&mut self, parent: &Env) -> MergeReport {
        let mut report = MergeReport::default();
        let inheritable: Vec<String> = self
            .iter()
            .filter(|(_, value)| value.inherit)
            .map(|(name, _)| name.clone())
            .collect();

        for name in inheritable {
            match (parent.get(&name), self.get_mut(&name)) {
                (Some(from_parent), Some(local)) => {
                    local.assign(&from_parent.value);
                    report.inherited.push(name);
                }
                _ => report.not_in_parent.push(name),
            }
        }
        report
    }

    /// Names of `required` entries whose value is empty, sorted.
    pub fn missing_required(&self) -> Vec<String> {
        self.iter()
            .filter(|(_, value)| value.required && value.value.is_empty())
            .map(|(name, _)| name.clone())
            .collect()
    }
}
