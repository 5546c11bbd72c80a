//! create-or-update decision for a single parameter path
use serde::Serialize;

/// Whether a parameter path currently holds a value in the remote store
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Existence {
    Present,
    Absent,
}

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Decision {
    /// Leave the remote value untouched
    Skip,
    /// Declare a write of the candidate value
    ///
    /// `overwrite` is the category's update flag and is passed on to the put action.
    Apply { overwrite: bool },
}

/// A value is written when the path is absent, or when the operator asked to update its category.
pub fn decide(existence: Existence, update_requested: bool) -> Decision {
    match (existence, update_requested) {
        (Existence::Present, false) => Decision::Skip,
        (Existence::Absent, _) | (Existence::Present, true) => Decision::Apply {
            overwrite: update_requested,
        },
    }
}
