use std::fmt;
use std::path::PathBuf;
use clap::{Parser, ValueEnum};

use crate::config::defs::KNEADDATA_TAG;

/// External decontamination tools scripts can be generated for.
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum SanitizerKind {
    #[default]
    Kneaddata,
}

impl SanitizerKind {
    pub fn tag(&self) -> &'static str {
        match self {
            SanitizerKind::Kneaddata => KNEADDATA_TAG,
        }
    }
}

impl fmt::Display for SanitizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "seqtoid-knead", version, about = "Generate decontamination scripts for per-sample FASTQ files")]
pub struct Arguments {

    #[arg(short = 'i', long = "input", required = true, num_args = 1.., help = "FASTQ files, or directories holding them")]
    pub inputs: Vec<PathBuf>,

    #[arg(short = 'o', long = "out", help = "Module directory for scripts, scratch and output. If not specified, a directory named '<tool>_YYYYMMDD' will be created in the current working directory.")]
    pub module_dir: Option<PathBuf>,

    #[arg(short = 'v', long = "verbose", action)]
    pub verbose: bool,

    #[arg(long, default_value = "kneaddata", value_enum)]
    pub sanitizer: SanitizerKind,

    #[arg(long, default_value = "kneaddata", help = "Executable name or path of the decontamination tool")]
    pub exe: String,

    #[arg(long = "params", allow_hyphen_values = true, help = "Extra parameters passed through to the tool, e.g. --params \"--bypass-trim\"")]
    pub params: Vec<String>,

    #[arg(long = "db", help = "Contaminant database directory; repeat for several")]
    pub dbs: Vec<PathBuf>,

    #[arg(long = "fw-suffix", default_value = "_R1")]
    pub fw_suffix: Option<String>,

    #[arg(long = "rv-suffix", default_value = "_R2")]
    pub rv_suffix: Option<String>,

    #[arg(long = "ext", default_value = "fastq", help = "Extension of the renamed output files")]
    pub extension: Option<String>,

    #[arg(short = 't', long, help = "Threads per tool call; defaults to the physical core count")]
    pub threads: Option<usize>,

    #[arg(long, conflicts_with = "no_docker", help = "Force container defaults for databases and trimming")]
    pub docker: bool,

    #[arg(long = "no-docker", help = "Ignore /.dockerenv when deciding on container defaults")]
    pub no_docker: bool,

    #[arg(long, default_value_t = 8, help = "Samples per worker script")]
    pub batch_size: usize,

    #[arg(long, default_value_t = false, help = "Run the tool's --version and check it before writing scripts")]
    pub check_exe: bool,
}
