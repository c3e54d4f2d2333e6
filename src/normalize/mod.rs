//! Call name normalization (e.g. symbol demangling).
//!
//! A [NameTransform] maps the distinct names of a tree to replacement names.
//! Normalization is all-or-nothing: the tree is only rewritten once the
//! transform has answered with exactly one replacement per name.

mod external;

pub use external::ExternalCommand;

use crate::model::CallTree;
use crate::utils::error::NormalizeError;
use log::{debug, info};
use std::collections::{BTreeSet, HashMap};

/// Maps a list of distinct names to an equal-length list of replacements
pub trait NameTransform {
    fn transform(&self, names: &[String]) -> Result<Vec<String>, NormalizeError>;
}

impl<F> NameTransform for F
where
    F: Fn(&[String]) -> Result<Vec<String>, NormalizeError>,
{
    fn transform(&self, names: &[String]) -> Result<Vec<String>, NormalizeError> {
        self(names)
    }
}

/// Distinct names of all calls reachable from the root, sorted
pub fn distinct_names(tree: &CallTree) -> Vec<String> {
    let names: BTreeSet<&str> = tree.calls().filter_map(|id| tree.name(id)).collect();
    names.into_iter().map(str::to_string).collect()
}

/// Rewrite every call name in `tree` through `transform`
///
/// **Public** - main entry point for name normalization
///
/// # Returns
/// Number of distinct names that were sent to the transform
///
/// # Errors
/// * `NormalizeError::CountMismatch` - The transform dropped or split names
/// * `NormalizeError::EmptyReplacement` - A name was mapped to an empty name
/// * Any error reported by the transform itself
///
/// On error the tree is left untouched.
pub fn normalize_names(
    tree: &mut CallTree,
    transform: &dyn NameTransform,
) -> Result<usize, NormalizeError> {
    let names = distinct_names(tree);
    let replacements = transform.transform(&names)?;

    if replacements.len() != names.len() {
        return Err(NormalizeError::CountMismatch {
            expected: names.len(),
            actual: replacements.len(),
        });
    }

    // Calls must stay named
    if let Some((name, _)) = names
        .iter()
        .zip(&replacements)
        .find(|(_, replacement)| replacement.is_empty())
    {
        return Err(NormalizeError::EmptyReplacement { name: name.clone() });
    }

    let mapping: HashMap<String, String> = names.into_iter().zip(replacements).collect();
    let changed = mapping.iter().filter(|(from, to)| from != to).count();
    tree.rename_calls(&mapping);

    info!(
        "Normalized {} distinct call names ({} changed)",
        mapping.len(),
        changed
    );
    debug!("Name mapping: {:?}", mapping);

    Ok(mapping.len())
}
