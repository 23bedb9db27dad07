use seq_io::fastq::Reader as FastqReader;
use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use flate2::read::MultiGzDecoder;
use log::{debug, warn};

use crate::config::defs::{PipelineError, FASTQ_EXTS, FASTQ_TAG, FASTA_TAG, FASTA_EXTS};
use crate::utils::file::{extension_remover, is_gzipped};

/// Read direction, taken from the configured forward/reverse suffix on the file stem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadDirection {
    Forward,
    Reverse,
    Unpaired,
}

/// A discovered sequence file with the attributes derived from its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceFile {
    path: PathBuf,
    sample_id: String,
    direction: ReadDirection,
    extension: String,
}

impl SequenceFile {
    /// Classifies a file by name. Nothing is read from disk.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the file, ideally absolute.
    /// * `fw_suffix` - Forward read token, e.g. `_R1`.
    /// * `rv_suffix` - Reverse read token, e.g. `_R2`.
    ///
    /// # Returns
    /// SequenceFile with sample ID, direction and extension filled in.
    pub fn new(path: PathBuf, fw_suffix: Option<&str>, rv_suffix: Option<&str>) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let (stem, extensions) = extension_remover(&name);

        let fw = fw_suffix.filter(|s| !s.is_empty());
        let rv = rv_suffix.filter(|s| !s.is_empty());
        // Longer token first so `_R1` cannot shadow e.g. `_RR1`.
        let mut candidates = vec![(fw, ReadDirection::Forward), (rv, ReadDirection::Reverse)];
        candidates.sort_by_key(|(s, _)| std::cmp::Reverse(s.map_or(0, str::len)));

        let mut sample_id = stem.clone();
        let mut direction = ReadDirection::Unpaired;
        for (suffix, dir) in candidates {
            if let Some(suffix) = suffix {
                if let Some(prefix) = stem.strip_suffix(suffix) {
                    if !prefix.is_empty() {
                        sample_id = prefix.to_string();
                        direction = dir;
                        break;
                    }
                }
            }
        }

        SequenceFile {
            path,
            sample_id,
            direction,
            extension: extensions.join("."),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn sample_id(&self) -> &str {
        &self.sample_id
    }

    pub fn direction(&self) -> ReadDirection {
        self.direction
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn is_forward(&self) -> bool {
        self.direction == ReadDirection::Forward
    }
}


/// Collects sequence files from explicit paths and directories.
/// Directories are scanned one level deep; hidden files and files without a
/// FASTA/FASTQ extension are skipped there. Results are sorted by path.
///
/// # Arguments
///
/// * `inputs` - Files and/or directories.
/// * `fw_suffix` / `rv_suffix` - Read direction tokens.
///
/// # Returns
/// Vec<SequenceFile>, or ConfigPath if an input does not exist.
pub fn discover_sequence_files(
    inputs: &[PathBuf],
    fw_suffix: Option<&str>,
    rv_suffix: Option<&str>,
) -> Result<Vec<SequenceFile>, PipelineError> {
    let mut paths: Vec<PathBuf> = Vec::new();
    for input in inputs {
        let meta = fs::metadata(input).map_err(|e| PipelineError::ConfigPath {
            path: input.clone(),
            reason: e.to_string(),
        })?;
        if meta.is_dir() {
            for entry in fs::read_dir(input)? {
                let entry = entry?;
                let path = entry.path();
                let name = entry.file_name().to_string_lossy().into_owned();
                if name.starts_with('.') || !path.is_file() {
                    continue;
                }
                if extension_remover(&name).1.is_empty() {
                    debug!("Skipping non-sequence file {:?}", path);
                    continue;
                }
                paths.push(path);
            }
        } else {
            paths.push(input.clone());
        }
    }
    paths.sort();
    paths.dedup();

    Ok(paths
        .into_iter()
        .map(|p| SequenceFile::new(p, fw_suffix, rv_suffix))
        .collect())
}


/// True when the input holds reverse reads, which puts the run in paired mode.
pub fn has_paired_reads(files: &[SequenceFile]) -> bool {
    files.iter().any(|f| f.direction() == ReadDirection::Reverse)
}


/// Builds the forward-file -> reverse-file lookup for a paired run.
/// Every forward read needs exactly one reverse read with the same sample ID
/// and vice versa.
///
/// # Arguments
///
/// * `files` - All files of the run.
///
/// # Returns
/// HashMap keyed by forward path; MissingMate on any unmatched file.
pub fn paired_reads(files: &[SequenceFile]) -> Result<HashMap<PathBuf, SequenceFile>, PipelineError> {
    let mut forwards: BTreeMap<&str, &SequenceFile> = BTreeMap::new();
    let mut reverses: BTreeMap<&str, &SequenceFile> = BTreeMap::new();

    for file in files {
        let slot = match file.direction() {
            ReadDirection::Forward => &mut forwards,
            ReadDirection::Reverse => &mut reverses,
            ReadDirection::Unpaired => {
                return Err(PipelineError::MissingMate {
                    sample: file.sample_id().to_string(),
                    path: file.path().to_path_buf(),
                });
            }
        };
        if let Some(previous) = slot.insert(file.sample_id(), file) {
            return Err(PipelineError::InvalidConfig(format!(
                "Sample {} has more than one {:?} read file: {:?} and {:?}",
                file.sample_id(),
                file.direction(),
                previous.path(),
                file.path()
            )));
        }
    }

    if let Some((sample, rv)) = reverses.iter().find(|(s, _)| !forwards.contains_key(*s)) {
        return Err(PipelineError::MissingMate {
            sample: sample.to_string(),
            path: rv.path().to_path_buf(),
        });
    }

    let mut pairs = HashMap::with_capacity(forwards.len());
    for (sample, fw) in forwards {
        let rv = reverses.get(sample).ok_or_else(|| PipelineError::MissingMate {
            sample: sample.to_string(),
            path: fw.path().to_path_buf(),
        })?;
        pairs.insert(fw.path().to_path_buf(), (*rv).clone());
    }
    Ok(pairs)
}


/// Enum to hold either an uncompressed or gzipped file reader
pub enum FileReader {
    Uncompressed(BufReader<File>),
    Gzipped(MultiGzDecoder<File>),
}

impl Read for FileReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            FileReader::Uncompressed(r) => r.read(buf),
            FileReader::Gzipped(r) => r.read(buf),
        }
    }
}

pub fn fastq_reader(path: &Path) -> io::Result<FastqReader<FileReader>> {
    let file = File::open(path)?;
    let reader = if is_gzipped(path)? {
        FileReader::Gzipped(MultiGzDecoder::new(file))
    } else {
        FileReader::Uncompressed(BufReader::new(file))
    };
    Ok(FastqReader::new(reader))
}


/// Determines if a file is FASTA, FASTQ, or neither from its extension.
///
/// # Returns
/// Option<&str>: FASTQ_TAG, FASTA_TAG or None.
pub fn fastx_filetype(file: &SequenceFile) -> Option<&'static str> {
    let ext = file.extension().split('.').next().unwrap_or("");
    if FASTQ_EXTS.iter().any(|e| e.eq_ignore_ascii_case(ext)) {
        Some(FASTQ_TAG)
    } else if FASTA_EXTS.iter().any(|e| e.eq_ignore_ascii_case(ext)) {
        Some(FASTA_TAG)
    } else {
        None
    }
}


/// Up-front check that the whole input set is FASTQ: by extension, then by
/// parsing the first record of each file.
pub fn require_fastq(files: &[SequenceFile]) -> Result<(), PipelineError> {
    if files.is_empty() {
        return Err(PipelineError::InvalidConfig("No sequence files found in input".to_string()));
    }

    for file in files {
        match fastx_filetype(file) {
            Some(FASTQ_TAG) => {}
            other => {
                return Err(PipelineError::InvalidFastqFormat(format!(
                    "{:?} is {}; FASTQ ({:?}) is required",
                    file.path(),
                    other.unwrap_or("of unknown type"),
                    FASTQ_EXTS
                )));
            }
        }

        let mut reader = fastq_reader(file.path())?;
        match reader.next() {
            Some(Ok(_)) => {}
            Some(Err(e)) => {
                return Err(PipelineError::InvalidFastqFormat(format!("{:?}: {}", file.path(), e)));
            }
            None => warn!("{:?} contains no reads", file.path()),
        }
    }
    Ok(())
}
