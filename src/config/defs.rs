use std::path::{Path, PathBuf};
use lazy_static::lazy_static;
use std::collections::HashMap;
use thiserror::Error;

use crate::cli::args::{Arguments, SanitizerKind};

// External software
pub const GZIP_EXT: &str = "gz";
pub const KNEADDATA_TAG: &str = "kneaddata";

lazy_static! {
    /// Minimum (major, minor) release each tool must report.
    pub static ref TOOL_VERSIONS: HashMap<&'static str, (u32, u32)> = {
        let mut m = HashMap::new();
        m.insert(KNEADDATA_TAG, (0, 7));

        m
    };
}

// KneadData flags
pub const KNEADDATA_THREADS_PARAM: &str = "-t";
pub const KNEADDATA_THREADS_LONG_PARAM: &str = "--threads";
pub const KNEADDATA_DB_PARAM: &str = "-db";
pub const KNEADDATA_INPUT_PARAM: &str = "-i";
pub const KNEADDATA_OUTPUT_PARAM: &str = "-o";
pub const KNEADDATA_OUTPUT_PREFIX_PARAM: &str = "--output-prefix";
pub const KNEADDATA_BYPASS_TRIM_PARAM: &str = "--bypass-trim";
pub const KNEADDATA_TRIMMOMATIC_PARAM: &str = "--trimmomatic";

// Container defaults
pub const DOCKER_ENV_MARKER: &str = "/.dockerenv";
pub const DOCKER_DEFAULT_KNEADDATA_DB: &str = "/mnt/efs/db";
pub const DOCKER_TRIMMOMATIC_PATH: &str = "/app/Trimmomatic-0.38";

// Static Filenames
pub const KNEADDATA_FW_OUTPUT_SUFFIX: &str = "_paired_1";
pub const KNEADDATA_RV_OUTPUT_SUFFIX: &str = "_paired_2";
pub const SCRIPT_DIR: &str = "script";
pub const TEMP_DIR: &str = "temp";
pub const OUTPUT_DIR: &str = "output";
pub const MAIN_SCRIPT_PREFIX: &str = "MAIN_";
pub const SCRIPT_EXT: &str = "sh";

pub const FASTA_TAG : &str = "fasta";
pub const FASTQ_TAG : &str = "fastq";
pub const FASTA_EXTS: &[&'static str] = &["fasta", "fa", "fna", "faa", "ffn", "frn"];
pub const FASTQ_EXTS: &[&'static str] = &["fastq", "fq"];


#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Missing required configuration: {0}")]
    MissingConfig(&'static str),

    #[error("Configured path {path:?} is not usable: {reason}")]
    ConfigPath { path: PathBuf, reason: String },

    #[error("No mate found for {path:?} (sample {sample}) in paired-end input")]
    MissingMate { sample: String, path: PathBuf },

    #[error("Sample {sample} is named by both {first:?} and {second:?}")]
    DuplicateSample { sample: String, first: PathBuf, second: PathBuf },

    #[error("Invalid FASTQ input: {0}")]
    InvalidFastqFormat(String),

    #[error("I/O error: {0}")]
    IOError(String),
}

impl From<std::io::Error> for PipelineError {
    fn from(e: std::io::Error) -> Self {
        PipelineError::IOError(e.to_string())
    }
}


/// Everything a sanitizer needs to assemble its scripts. Built once per run and
/// handed to the sanitizer at construction, so nothing reads global state.
#[derive(Debug, Clone, PartialEq)]
pub struct SanitizerConfig {
    pub kind: SanitizerKind,
    pub exe: String,
    pub params: Vec<String>,
    pub dbs: Vec<PathBuf>,
    pub fw_suffix: Option<String>,
    pub rv_suffix: Option<String>,
    pub extension: Option<String>,
    pub threads: usize,
    pub containerized: bool,
    pub temp_dir: PathBuf,
    pub out_dir: PathBuf,
}

impl Default for SanitizerConfig {
    fn default() -> Self {
        SanitizerConfig {
            kind: SanitizerKind::default(),
            exe: KNEADDATA_TAG.to_string(),
            params: Vec::new(),
            dbs: Vec::new(),
            fw_suffix: None,
            rv_suffix: None,
            extension: None,
            threads: 1,
            containerized: false,
            temp_dir: PathBuf::from(TEMP_DIR),
            out_dir: PathBuf::from(OUTPUT_DIR),
        }
    }
}


pub struct RunConfig  {
    pub module_dir: PathBuf,
    pub script_dir: PathBuf,
    pub inputs: Vec<PathBuf>,
    pub batch_size: usize,
    pub check_exe: bool,
    pub sanitizer: SanitizerConfig,
    pub verbose: bool,
}

impl RunConfig {
    /// Resolves parsed arguments into the run configuration.
    ///
    /// # Arguments
    ///
    /// * `args` - Parsed command-line arguments.
    /// * `cwd` - Directory relative paths are resolved against.
    /// * `threads` - Thread count handed to the external tool.
    /// * `containerized` - Whether container default paths apply.
    ///
    /// # Returns
    /// RunConfig, or InvalidConfig if the arguments are unusable.
    pub fn from_args(
        args: Arguments,
        cwd: &Path,
        threads: usize,
        containerized: bool,
    ) -> Result<Self, PipelineError> {
        if args.batch_size == 0 {
            return Err(PipelineError::InvalidConfig("--batch-size must be at least 1".to_string()));
        }
        if threads == 0 {
            return Err(PipelineError::InvalidConfig("--threads must be at least 1".to_string()));
        }

        let module_dir = match &args.module_dir {
            Some(dir) => resolve_against(cwd, dir),
            None => {
                let stamp = chrono::Local::now().format("%Y%m%d");
                cwd.join(format!("{}_{}", args.sanitizer.tag(), stamp))
            }
        };
        let inputs = args.inputs.iter().map(|p| resolve_against(cwd, p)).collect();
        let dbs = args.dbs.iter().map(|p| resolve_against(cwd, p)).collect();

        let sanitizer = SanitizerConfig {
            kind: args.sanitizer,
            exe: args.exe,
            params: args.params,
            dbs,
            fw_suffix: args.fw_suffix,
            rv_suffix: args.rv_suffix,
            extension: args.extension,
            threads,
            containerized,
            temp_dir: module_dir.join(TEMP_DIR),
            out_dir: module_dir.join(OUTPUT_DIR),
        };

        Ok(RunConfig {
            script_dir: module_dir.join(SCRIPT_DIR),
            module_dir,
            inputs,
            batch_size: args.batch_size,
            check_exe: args.check_exe,
            sanitizer,
            verbose: args.verbose,
        })
    }
}

fn resolve_against(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn args(extra: &[&str]) -> Arguments {
        let mut argv = vec!["seqtoid-knead", "-i", "reads"];
        argv.extend_from_slice(extra);
        Arguments::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_from_args_resolves_paths() {
        let cwd = Path::new("/work");
        let config = RunConfig::from_args(args(&["-o", "mod", "--db", "/dbs/human", "--db", "phix"]), cwd, 4, false).unwrap();
        assert_eq!(config.module_dir, PathBuf::from("/work/mod"));
        assert_eq!(config.script_dir, PathBuf::from("/work/mod/script"));
        assert_eq!(config.inputs, vec![PathBuf::from("/work/reads")]);
        assert_eq!(config.sanitizer.dbs, vec![PathBuf::from("/dbs/human"), PathBuf::from("/work/phix")]);
        assert_eq!(config.sanitizer.temp_dir, PathBuf::from("/work/mod/temp"));
        assert_eq!(config.sanitizer.out_dir, PathBuf::from("/work/mod/output"));
        assert_eq!(config.sanitizer.fw_suffix.as_deref(), Some("_R1"));
        assert_eq!(config.sanitizer.extension.as_deref(), Some("fastq"));
        assert!(!config.verbose);
    }

    #[test]
    fn test_from_args_default_module_dir() {
        let config = RunConfig::from_args(args(&[]), Path::new("/work"), 1, false).unwrap();
        let name = config.module_dir.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("kneaddata_"));
        assert_eq!(name.len(), "kneaddata_".len() + 8);
    }

    #[test]
    fn test_from_args_rejects_zero_counts() {
        let zero_batch = RunConfig::from_args(args(&["--batch-size", "0"]), Path::new("/w"), 1, false);
        assert!(matches!(zero_batch, Err(PipelineError::InvalidConfig(_))));
        let zero_threads = RunConfig::from_args(args(&[]), Path::new("/w"), 0, false);
        assert!(matches!(zero_threads, Err(PipelineError::InvalidConfig(_))));
    }

    #[test]
    fn test_params_accept_leading_dashes() {
        let parsed = args(&["--params", "--bypass-trim", "--params", "--max-memory 8g"]);
        assert_eq!(parsed.params, vec!["--bypass-trim", "--max-memory 8g"]);
    }

    #[test]
    fn test_docker_flags_conflict() {
        let argv = ["seqtoid-knead", "-i", "reads", "--docker", "--no-docker"];
        assert!(Arguments::try_parse_from(argv).is_err());
    }
}
