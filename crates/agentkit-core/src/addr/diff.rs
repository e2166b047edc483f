//! Address-set reconciliation
//!
//! Computes which addresses must be removed from and added to a live
//! interface so that its address set matches a desired one.

use tracing::debug;

use super::parse::NetAddr;

/// Result of comparing a desired address set against the current one
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressDiff {
    /// Present in `old` but not in `new`, in canonical order
    pub to_delete: Vec<NetAddr>,
    /// Present in `new` but not in `old`, in canonical order
    pub to_add: Vec<NetAddr>,
}

impl AddressDiff {
    /// True when the two sets already match
    pub fn is_empty(&self) -> bool {
        self.to_delete.is_empty() && self.to_add.is_empty()
    }
}

/// Diff a desired address list (`new`) against the current one (`old`)
///
/// Both inputs are sorted into private copies and merged in one pass.
/// Each element of `new` cancels at most one equal element of `old`, so
/// duplicates behave as a multiset difference.
pub fn diff_addresses(new: &[NetAddr], old: &[NetAddr]) -> AddressDiff {
    let mut new = new.to_vec();
    let mut old = old.to_vec();
    new.sort();
    old.sort();

    let mut diff = AddressDiff::default();
    let (mut i, mut j) = (0, 0);

    while i < new.len() && j < old.len() {
        match new[i].cmp(&old[j]) {
            std::cmp::Ordering::Equal => {
                i += 1;
                j += 1;
            }
            std::cmp::Ordering::Less => {
                diff.to_add.push(new[i]);
                i += 1;
            }
            std::cmp::Ordering::Greater => {
                diff.to_delete.push(old[j]);
                j += 1;
            }
        }
    }
    diff.to_add.extend_from_slice(&new[i..]);
    diff.to_delete.extend_from_slice(&old[j..]);

    debug!(
        to_add = diff.to_add.len(),
        to_delete = diff.to_delete.len(),
        "Computed address diff"
    );

    diff
}
