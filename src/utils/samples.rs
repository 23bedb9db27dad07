use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::PathBuf;

use crate::config::defs::PipelineError;
use crate::utils::fastx::SequenceFile;

/// One sample's input: a single-end file or a forward/reverse pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SampleUnit {
    Single(SequenceFile),
    Paired {
        forward: SequenceFile,
        reverse: SequenceFile,
    },
}

impl SampleUnit {
    pub fn sample_id(&self) -> &str {
        match self {
            SampleUnit::Single(file) => file.sample_id(),
            SampleUnit::Paired { forward, .. } => forward.sample_id(),
        }
    }

    /// Files in argument order: forward (or single) first.
    pub fn files(&self) -> Vec<&SequenceFile> {
        match self {
            SampleUnit::Single(file) => vec![file],
            SampleUnit::Paired { forward, reverse } => vec![forward, reverse],
        }
    }

    pub fn is_paired(&self) -> bool {
        matches!(self, SampleUnit::Paired { .. })
    }
}


/// Partitions the run's files into samples, keeping input order.
///
/// In paired mode only forward reads start a sample; the reverse read comes
/// from `pairs` and is never looked for independently.
///
/// # Arguments
///
/// * `files` - Sequence files of the run.
/// * `paired` - Whether the run is paired-end.
/// * `pairs` - Forward path -> reverse file lookup (only read in paired mode).
///
/// # Returns
/// Vec<SampleUnit>, MissingMate if a forward read has no entry in `pairs`, or
/// DuplicateSample if two units would share a sample ID (and so one output file).
pub fn group_samples(
    files: &[SequenceFile],
    paired: bool,
    pairs: &HashMap<PathBuf, SequenceFile>,
) -> Result<Vec<SampleUnit>, PipelineError> {
    let mut units = Vec::with_capacity(files.len());
    let mut seen: HashMap<&str, &SequenceFile> = HashMap::new();
    for file in files {
        if paired && !file.is_forward() {
            continue;
        }
        match seen.entry(file.sample_id()) {
            Entry::Occupied(first) => {
                return Err(PipelineError::DuplicateSample {
                    sample: file.sample_id().to_string(),
                    first: first.get().path().to_path_buf(),
                    second: file.path().to_path_buf(),
                });
            }
            Entry::Vacant(slot) => {
                slot.insert(file);
            }
        }

        if !paired {
            units.push(SampleUnit::Single(file.clone()));
            continue;
        }
        let reverse = pairs.get(file.path()).ok_or_else(|| PipelineError::MissingMate {
            sample: file.sample_id().to_string(),
            path: file.path().to_path_buf(),
        })?;
        units.push(SampleUnit::Paired {
            forward: file.clone(),
            reverse: reverse.clone(),
        });
    }
    Ok(units)
}
