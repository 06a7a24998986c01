use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::io::BufRead;
use std::path::Path;

use ndarray::Array2;

use crate::error::{CalError, Result};
use crate::input::open_maybe_gz;
use crate::model::key::{TrialKey, TrialLabel};

/// Reads `enroll<TAB>test<TAB>label` lines; trials never listed stay Unused.
pub fn load_key(path: &Path) -> Result<TrialKey> {
    let reader = open_maybe_gz(path)?;
    let key = parse_key(reader)?;
    tracing::info!(
        path = %path.display(),
        n_enroll = key.enroll_ids().len(),
        n_test = key.test_ids().len(),
        n_target = key.count(TrialLabel::Target),
        n_nontarget = key.count(TrialLabel::NonTarget),
        "loaded trial key"
    );
    Ok(key)
}

pub(crate) fn parse_key<R: BufRead>(mut reader: R) -> Result<TrialKey> {
    let mut enroll_ids: Vec<String> = Vec::new();
    let mut test_ids: Vec<String> = Vec::new();
    let mut enroll_index: HashMap<String, usize> = HashMap::new();
    let mut test_index: HashMap<String, usize> = HashMap::new();
    let mut trials: HashMap<(usize, usize), TrialLabel> = HashMap::new();

    let mut buf = String::new();
    let mut line_no = 0usize;
    loop {
        buf.clear();
        if reader.read_line(&mut buf)? == 0 {
            break;
        }
        line_no += 1;
        let line = buf.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 3 {
            return Err(CalError::MalformedInput(format!(
                "key line {line_no}: expected 3 fields (enroll, test, label), found {}",
                fields.len()
            )));
        }
        let label = TrialLabel::parse(fields[2]).ok_or_else(|| {
            CalError::MalformedInput(format!(
                "key line {line_no}: unknown label {:?}",
                fields[2]
            ))
        })?;
        let row = intern(fields[0], &mut enroll_ids, &mut enroll_index);
        let col = intern(fields[1], &mut test_ids, &mut test_index);

        match trials.entry((row, col)) {
            Entry::Vacant(slot) => {
                slot.insert(label);
            }
            Entry::Occupied(prev) if *prev.get() == label => {
                tracing::warn!(
                    line = line_no,
                    enroll = fields[0],
                    test = fields[1],
                    "duplicate trial in key; keeping first"
                );
            }
            Entry::Occupied(_) => {
                return Err(CalError::MalformedInput(format!(
                    "key line {line_no}: conflicting labels for trial ({}, {})",
                    fields[0], fields[1]
                )));
            }
        }
    }

    let mut labels = Array2::from_elem((enroll_ids.len(), test_ids.len()), TrialLabel::Unused);
    for ((row, col), label) in trials {
        labels[[row, col]] = label;
    }
    TrialKey::new(enroll_ids, test_ids, labels)
}

fn intern(id: &str, ids: &mut Vec<String>, index: &mut HashMap<String, usize>) -> usize {
    if let Some(&i) = index.get(id) {
        return i;
    }
    let i = ids.len();
    ids.push(id.to_string());
    index.insert(id.to_string(), i);
    i
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/key.rs"]
mod tests;
