use std::borrow::Cow;
use std::fs::File;
use std::io;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::config::defs::{PipelineError, FASTA_EXTS, FASTQ_EXTS, GZIP_EXT};

pub fn is_gzipped(path: &Path) -> io::Result<bool> {
    let mut file = File::open(path)?;
    let mut buffer = [0u8; 2];
    match file.read_exact(&mut buffer) {
        Ok(()) => Ok(buffer == [0x1F, 0x8B]), // Gzip magic bytes
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(e),
    }
}


/// Splits a file name into its stem and its trailing sequence-file extensions.
/// Only known FASTA/FASTQ extensions and a final `gz` are stripped, so dots
/// inside sample names survive.
///
/// # Arguments
///
/// * `name` - Bare file name, e.g. `sampleA_R1.fastq.gz`.
///
/// # Returns
/// (stem, extensions), e.g. ("sampleA_R1", ["fastq", "gz"]).
pub fn extension_remover(name: &str) -> (String, Vec<String>) {
    let mut stem = name;
    let mut extensions = Vec::new();

    if let Some((rest, ext)) = stem.rsplit_once('.') {
        if ext.eq_ignore_ascii_case(GZIP_EXT) && !rest.is_empty() {
            extensions.push(ext.to_string());
            stem = rest;
        }
    }
    if let Some((rest, ext)) = stem.rsplit_once('.') {
        let known = FASTQ_EXTS.iter().chain(FASTA_EXTS.iter()).any(|e| e.eq_ignore_ascii_case(ext));
        if known && !rest.is_empty() {
            extensions.insert(0, ext.to_string());
            stem = rest;
        }
    }

    (stem.to_string(), extensions)
}


/// Builds `<dir>/<sample_id><suffix>.<ext>`.
pub fn sample_file_path(dir: &Path, sample_id: &str, suffix: &str, ext: &str) -> PathBuf {
    dir.join(format!("{}{}.{}", sample_id, suffix, ext))
}


/// Makes a path absolute against the process working directory without
/// touching the filesystem.
pub fn absolute_path(path: &Path) -> Result<PathBuf, PipelineError> {
    std::path::absolute(path)
        .map_err(|e| PipelineError::IOError(format!("Cannot resolve {:?}: {}", path, e)))
}


/// Checks that a configured directory exists and returns its absolute path.
pub fn require_existing_dir(path: &Path) -> Result<PathBuf, PipelineError> {
    let meta = std::fs::metadata(path).map_err(|e| PipelineError::ConfigPath {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    if !meta.is_dir() {
        return Err(PipelineError::ConfigPath {
            path: path.to_path_buf(),
            reason: "not a directory".to_string(),
        });
    }
    absolute_path(path)
}


/// Executables given as a bare name are left to $PATH; anything with a
/// directory component has to exist.
pub fn require_executable(exe: &str) -> Result<(), PipelineError> {
    if exe.trim().is_empty() {
        return Err(PipelineError::MissingConfig("executable"));
    }
    let path = Path::new(exe);
    if path.components().count() > 1 && !path.is_file() {
        return Err(PipelineError::ConfigPath {
            path: path.to_path_buf(),
            reason: "executable not found".to_string(),
        });
    }
    Ok(())
}


/// Quotes a word for POSIX sh. Words made only of safe characters pass through.
pub fn shell_quote(word: &str) -> Cow<'_, str> {
    let safe = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_-./+,:@%=".contains(c));
    if safe {
        Cow::Borrowed(word)
    } else {
        Cow::Owned(format!("'{}'", word.replace('\'', r"'\''")))
    }
}

pub fn shell_quote_path(path: &Path) -> String {
    shell_quote(&path.to_string_lossy()).into_owned()
}
