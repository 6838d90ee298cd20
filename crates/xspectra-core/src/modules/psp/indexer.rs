//! Absorber index computation.

use crate::domain::{XsError, XsResult};
use std::collections::BTreeMap;

/// 1-based rank of the absorbing element's ionized key among the
/// lexicographically sorted pseudopotential mapping keys. The downstream
/// solver cites this rank verbatim as `xiabs`.
///
/// `BTreeMap` iteration already yields keys in byte order, which is
/// lexicographic for the ASCII element labels used here.
pub fn absorber_index(pseudo: &BTreeMap<String, String>, element: &str) -> XsResult<usize> {
    let ionized = format!("{element}+");
    pseudo
        .keys()
        .position(|key| *key == ionized)
        .map(|position| position + 1)
        .ok_or_else(|| XsError::UnresolvedAbsorber {
            element: element.to_string(),
        })
}
