use std::collections::HashMap;

use crate::error::{CalError, Result};

pub mod calibrator;
pub mod cllr;
pub mod config;
pub mod dcf;
pub mod key;
pub mod scores;

/// Position of every id, rejecting duplicates.
pub(crate) fn index_ids<'a>(ids: &'a [String], what: &str) -> Result<HashMap<&'a str, usize>> {
    let mut index = HashMap::with_capacity(ids.len());
    for (i, id) in ids.iter().enumerate() {
        if index.insert(id.as_str(), i).is_some() {
            return Err(CalError::MalformedInput(format!(
                "duplicate {what} id: {id}"
            )));
        }
    }
    Ok(index)
}
