/// Functions and structs for turning samples into tool command lines

use std::fmt;
use std::time::Duration;
use anyhow::{anyhow, Result};
use log::debug;

use crate::cli::SanitizerKind;
use crate::config::defs::{PipelineError, SanitizerConfig, TOOL_VERSIONS};
use crate::utils::samples::SampleUnit;


/// Flags handed to the worker function, resolved once per run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParameterSet {
    tokens: Vec<String>,
}

impl ParameterSet {
    pub fn push(&mut self, flag: &str, value: Option<&str>) {
        self.tokens.push(flag.to_string());
        if let Some(value) = value {
            self.tokens.push(value.to_string());
        }
    }

    /// User passthrough entries are kept whole, even when they hold spaces.
    pub fn push_raw(&mut self, raw: &str) {
        let raw = raw.trim();
        if !raw.is_empty() {
            self.tokens.push(raw.to_string());
        }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Whitespace-separated words, splitting passthrough entries.
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().flat_map(|t| t.split_whitespace())
    }

    /// True if a word equals `flag` or is `flag=value`.
    pub fn contains_flag(&self, flag: &str) -> bool {
        self.words().any(|w| {
            w == flag || w.strip_prefix(flag).is_some_and(|rest| rest.starts_with('='))
        })
    }

    /// Values following each occurrence of `flag`, in order.
    pub fn values_of(&self, flag: &str) -> Vec<&str> {
        let words: Vec<&str> = self.words().collect();
        words
            .windows(2)
            .filter(|w| w[0] == flag)
            .map(|w| w[1])
            .collect()
    }

    /// Every token followed by a single space; empty for an empty set.
    pub fn render(&self) -> String {
        self.tokens.iter().map(|t| format!("{} ", t)).collect()
    }
}

impl fmt::Display for ParameterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render().trim_end())
    }
}


/// Shell statements for one sample: the worker call, then the renames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptLines {
    pub sample_id: String,
    pub invocation: String,
    pub moves: Vec<String>,
}

impl ScriptLines {
    pub fn lines(&self) -> Vec<&str> {
        std::iter::once(self.invocation.as_str())
            .chain(self.moves.iter().map(String::as_str))
            .collect()
    }
}


/// Worker function definitions plus one line group per sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptPlan {
    pub tool: &'static str,
    pub params: ParameterSet,
    pub functions: Vec<String>,
    pub samples: Vec<ScriptLines>,
}


/// A decontamination tool that scripts can be generated for.
pub trait Sanitizer {
    fn tag(&self) -> &'static str;

    /// Name of the shell function each sample line calls.
    fn function_name(&self) -> &'static str;

    fn resolve_parameters(&self) -> Result<ParameterSet, PipelineError>;

    fn worker_functions(&self, params: &ParameterSet, paired: bool) -> Result<Vec<String>, PipelineError>;

    fn build_invocation(&self, unit: &SampleUnit) -> Result<ScriptLines, PipelineError>;

    /// One-line description of what the run removes, for the run summary.
    fn summary(&self) -> String;
}


/// Assembles the full script plan. Parameters are resolved once and shared by
/// every sample; any error discards the whole plan.
///
/// # Arguments
///
/// * `sanitizer` - Tool implementation.
/// * `units` - Samples from `group_samples`. Paired mode follows from the
///   units; single and paired units cannot be mixed.
///
/// # Returns
/// ScriptPlan with one ScriptLines per unit, in order.
pub fn build_script_plan(
    sanitizer: &dyn Sanitizer,
    units: &[SampleUnit],
) -> Result<ScriptPlan, PipelineError> {
    let paired = units.iter().any(SampleUnit::is_paired);
    if paired && !units.iter().all(SampleUnit::is_paired) {
        return Err(PipelineError::InvalidConfig(
            "Single-end and paired-end samples cannot share one run".to_string(),
        ));
    }

    let params = sanitizer.resolve_parameters()?;
    debug!("Resolved {} parameters: {}", sanitizer.tag(), params);

    let functions = sanitizer.worker_functions(&params, paired)?;
    let samples = units
        .iter()
        .map(|unit| sanitizer.build_invocation(unit))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ScriptPlan {
        tool: sanitizer.tag(),
        params,
        functions,
        samples,
    })
}


/// Picks the sanitizer named by the configuration.
pub fn sanitizer_for(config: SanitizerConfig) -> Result<Box<dyn Sanitizer>, PipelineError> {
    match config.kind {
        SanitizerKind::Kneaddata => Ok(Box::new(kneaddata::KneadData::new(config)?)),
    }
}


pub mod kneaddata {
    use std::path::PathBuf;
    use log::warn;
    use crate::config::defs::{
        PipelineError, SanitizerConfig, DOCKER_DEFAULT_KNEADDATA_DB, DOCKER_TRIMMOMATIC_PATH,
        FASTQ_TAG, KNEADDATA_BYPASS_TRIM_PARAM, KNEADDATA_DB_PARAM, KNEADDATA_FW_OUTPUT_SUFFIX,
        KNEADDATA_INPUT_PARAM, KNEADDATA_OUTPUT_PARAM, KNEADDATA_OUTPUT_PREFIX_PARAM,
        KNEADDATA_RV_OUTPUT_SUFFIX, KNEADDATA_TAG, KNEADDATA_THREADS_LONG_PARAM,
        KNEADDATA_THREADS_PARAM, KNEADDATA_TRIMMOMATIC_PARAM,
    };
    use crate::utils::file::{absolute_path, require_existing_dir, sample_file_path, shell_quote, shell_quote_path};
    use crate::utils::samples::SampleUnit;
    use super::{ParameterSet, Sanitizer, ScriptLines};

    pub const KNEADDATA_FUNCTION: &str = "knead_sample";

    /// Naming settings the renames depend on, checked when the sanitizer is built.
    #[derive(Debug, Clone)]
    struct Naming {
        fw_suffix: String,
        rv_suffix: String,
        extension: String,
    }

    pub struct KneadData {
        config: SanitizerConfig,
        naming: Naming,
        temp_dir: PathBuf,
        out_dir: PathBuf,
    }

    impl KneadData {
        /// Fails with MissingConfig when a read suffix or the extension is unset,
        /// so no line is ever produced from a half-configured run.
        pub fn new(config: SanitizerConfig) -> Result<Self, PipelineError> {
            if config.exe.trim().is_empty() {
                return Err(PipelineError::MissingConfig("executable"));
            }
            let naming = Naming {
                fw_suffix: required(&config.fw_suffix, "forward read suffix")?,
                rv_suffix: required(&config.rv_suffix, "reverse read suffix")?,
                extension: required(&config.extension, "file extension")?
                    .trim_start_matches('.')
                    .to_string(),
            };
            if naming.extension.is_empty() {
                return Err(PipelineError::MissingConfig("file extension"));
            }
            if naming.fw_suffix == naming.rv_suffix {
                return Err(PipelineError::InvalidConfig(format!(
                    "Forward and reverse read suffix are both {:?}",
                    naming.fw_suffix
                )));
            }
            let temp_dir = absolute_path(&config.temp_dir)?;
            let out_dir = absolute_path(&config.out_dir)?;

            Ok(KneadData { config, naming, temp_dir, out_dir })
        }

        fn database_flags(&self, params: &mut ParameterSet) -> Result<(), PipelineError> {
            if self.config.dbs.is_empty() {
                if self.config.containerized {
                    params.push(KNEADDATA_DB_PARAM, Some(DOCKER_DEFAULT_KNEADDATA_DB));
                } else {
                    warn!("No {} database configured; reads will not be filtered against a reference", KNEADDATA_TAG);
                }
                return Ok(());
            }
            for db in &self.config.dbs {
                let db = require_existing_dir(db)?;
                params.push(KNEADDATA_DB_PARAM, Some(&shell_quote_path(&db)));
            }
            Ok(())
        }

        /// Databases the run filters against, as passed to the tool but unquoted.
        fn databases(&self) -> Vec<PathBuf> {
            if self.config.dbs.is_empty() && self.config.containerized {
                return vec![PathBuf::from(DOCKER_DEFAULT_KNEADDATA_DB)];
            }
            self.config
                .dbs
                .iter()
                .map(|db| absolute_path(db).unwrap_or_else(|_| db.clone()))
                .collect()
        }

        /// Scratch file the tool leaves for a sample; fixed `_paired_N.fastq` naming.
        fn tool_output(&self, sample_id: &str, marker: &str) -> PathBuf {
            sample_file_path(&self.temp_dir, sample_id, marker, FASTQ_TAG)
        }

        fn move_line(&self, sample_id: &str, marker: &str, suffix: &str) -> String {
            let from = self.tool_output(sample_id, marker);
            let to = sample_file_path(&self.out_dir, sample_id, suffix, &self.naming.extension);
            format!("mv {} {}", shell_quote_path(&from), shell_quote_path(&to))
        }
    }

    impl Sanitizer for KneadData {
        fn tag(&self) -> &'static str {
            KNEADDATA_TAG
        }

        fn function_name(&self) -> &'static str {
            KNEADDATA_FUNCTION
        }

        fn resolve_parameters(&self) -> Result<ParameterSet, PipelineError> {
            let mut user = ParameterSet::default();
            for raw in &self.config.params {
                user.push_raw(raw);
            }

            let mut params = ParameterSet::default();
            if !user.contains_flag(KNEADDATA_THREADS_PARAM) && !user.contains_flag(KNEADDATA_THREADS_LONG_PARAM) {
                params.push(KNEADDATA_THREADS_PARAM, Some(&self.config.threads.to_string()));
            }
            for raw in user.tokens() {
                params.push_raw(raw);
            }

            self.database_flags(&mut params)?;

            let trim_set = params.contains_flag(KNEADDATA_BYPASS_TRIM_PARAM)
                || params.contains_flag(KNEADDATA_TRIMMOMATIC_PARAM);
            if !trim_set && self.config.containerized {
                params.push(KNEADDATA_TRIMMOMATIC_PARAM, Some(DOCKER_TRIMMOMATIC_PATH));
            }

            Ok(params)
        }

        fn worker_functions(&self, params: &ParameterSet, paired: bool) -> Result<Vec<String>, PipelineError> {
            let reverse_input = if paired {
                format!("{} \"$3\" ", KNEADDATA_INPUT_PARAM)
            } else {
                String::new()
            };
            let call = format!(
                "{} {}{} \"$1\" {} \"$2\" {}{} {}",
                shell_quote(&self.config.exe),
                params.render(),
                KNEADDATA_OUTPUT_PREFIX_PARAM,
                KNEADDATA_INPUT_PARAM,
                reverse_input,
                KNEADDATA_OUTPUT_PARAM,
                shell_quote_path(&self.temp_dir),
            );
            Ok(vec![format!("{}() {{", KNEADDATA_FUNCTION), call, "}".to_string()])
        }

        fn build_invocation(&self, unit: &SampleUnit) -> Result<ScriptLines, PipelineError> {
            let sample_id = unit.sample_id();
            let mut invocation = format!("{} {}", KNEADDATA_FUNCTION, shell_quote(sample_id));
            for file in unit.files() {
                let path = absolute_path(file.path())?;
                invocation.push(' ');
                invocation.push_str(&shell_quote_path(&path));
            }

            let moves = match unit {
                SampleUnit::Single(_) => vec![self.move_line(sample_id, "", "")],
                SampleUnit::Paired { .. } => vec![
                    self.move_line(sample_id, KNEADDATA_FW_OUTPUT_SUFFIX, &self.naming.fw_suffix),
                    self.move_line(sample_id, KNEADDATA_RV_OUTPUT_SUFFIX, &self.naming.rv_suffix),
                ],
            };

            Ok(ScriptLines {
                sample_id: sample_id.to_string(),
                invocation,
                moves,
            })
        }

        fn summary(&self) -> String {
            format!("Removed contaminants in DB: {:?}", self.databases())
        }
    }

    fn required(value: &Option<String>, what: &'static str) -> Result<String, PipelineError> {
        match value.as_deref().map(str::trim) {
            Some(v) if !v.is_empty() => Ok(v.to_string()),
            _ => Err(PipelineError::MissingConfig(what)),
        }
    }
}


/// Runs `<exe> --version` and returns the reported version string.
///
/// # Arguments
///
/// * `tool` - Tool tag, used for the minimum version lookup.
/// * `exe` - Executable to run.
///
/// # Returns
/// Version string, or an error if the tool cannot be run or is too old.
pub async fn check_version(tool: &str, exe: &str) -> Result<String> {
    let output = tokio::time::timeout(
        Duration::from_secs(30),
        tokio::process::Command::new(exe)
            .arg("--version")
            .stdin(std::process::Stdio::null())
            .output(),
    )
        .await
        .map_err(|_| anyhow!("Timed out waiting for {} --version", exe))?
        .map_err(|e| anyhow!("Failed to spawn {}: {}. Is {} installed?", exe, e, tool))?;

    // Older kneaddata releases print the version on stderr.
    let text = format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    let version = parse_version(&text)
        .ok_or_else(|| anyhow!("Invalid {} --version output: {}", exe, text.trim()))?;

    if let Some(&(major, minor)) = TOOL_VERSIONS.get(tool) {
        let found = version_number(&version)
            .ok_or_else(|| anyhow!("Unparseable {} version: {}", tool, version))?;
        if found < (major, minor) {
            return Err(anyhow!("{} version {} is older than the required {}.{}", tool, version, major, minor));
        }
    }
    Ok(version)
}

/// First word that looks like a version, e.g. `v0.12.0` -> `0.12.0`.
fn parse_version(text: &str) -> Option<String> {
    text.split_whitespace()
        .map(|w| w.trim_start_matches(['v', 'V']))
        .find(|w| w.starts_with(|c: char| c.is_ascii_digit()) && w.contains('.'))
        .map(str::to_string)
}

/// (major, minor) of a dotted version string.
fn version_number(version: &str) -> Option<(u32, u32)> {
    let mut parts = version.split('.');
    let major = parts.next()?.parse().ok()?;
    let minor: String = parts.next()?.chars().take_while(|c| c.is_ascii_digit()).collect();
    Some((major, minor.parse().ok()?))
}


#[cfg(test)]
mod tests {
    use super::*;
    use super::kneaddata::{KneadData, KNEADDATA_FUNCTION};
    use crate::config::defs::KNEADDATA_TAG;
    use crate::utils::fastx::SequenceFile;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn config() -> SanitizerConfig {
        SanitizerConfig {
            fw_suffix: Some("_R1".to_string()),
            rv_suffix: Some("_R2".to_string()),
            extension: Some("fastq".to_string()),
            threads: 4,
            temp_dir: PathBuf::from("/mod/temp"),
            out_dir: PathBuf::from("/mod/output"),
            ..SanitizerConfig::default()
        }
    }

    fn seq(name: &str) -> SequenceFile {
        SequenceFile::new(PathBuf::from("/data").join(name), Some("_R1"), Some("_R2"))
    }

    fn paired(sample: &str) -> SampleUnit {
        SampleUnit::Paired {
            forward: seq(&format!("{}_R1.fastq", sample)),
            reverse: seq(&format!("{}_R2.fastq", sample)),
        }
    }

    #[test]
    fn test_paired_scenario() -> anyhow::Result<()> {
        let knead = KneadData::new(config())?;
        let plan = build_script_plan(&knead, &[paired("sampleA")])?;
        assert_eq!(plan.samples.len(), 1);

        let lines = &plan.samples[0];
        assert_eq!(lines.sample_id, "sampleA");
        assert_eq!(
            lines.invocation,
            format!("{} sampleA /data/sampleA_R1.fastq /data/sampleA_R2.fastq", KNEADDATA_FUNCTION)
        );
        assert_eq!(
            lines.moves,
            vec![
                "mv /mod/temp/sampleA_paired_1.fastq /mod/output/sampleA_R1.fastq".to_string(),
                "mv /mod/temp/sampleA_paired_2.fastq /mod/output/sampleA_R2.fastq".to_string(),
            ]
        );
        assert_eq!(lines.lines()[0], lines.invocation);
        Ok(())
    }

    #[test]
    fn test_single_scenario() -> anyhow::Result<()> {
        let knead = KneadData::new(config())?;
        let unit = SampleUnit::Single(seq("sampleB.fastq"));
        let plan = build_script_plan(&knead, &[unit])?;

        let lines = &plan.samples[0];
        assert_eq!(lines.invocation, format!("{} sampleB /data/sampleB.fastq", KNEADDATA_FUNCTION));
        assert_eq!(lines.moves, vec!["mv /mod/temp/sampleB.fastq /mod/output/sampleB.fastq".to_string()]);
        Ok(())
    }

    #[test]
    fn test_destination_uses_configured_extension() -> anyhow::Result<()> {
        let knead = KneadData::new(SanitizerConfig {
            fw_suffix: Some("_1".to_string()),
            rv_suffix: Some("_2".to_string()),
            extension: Some(".fq".to_string()),
            ..config()
        })?;
        let unit = SampleUnit::Paired {
            forward: SequenceFile::new(PathBuf::from("/data/s_1.fq"), Some("_1"), Some("_2")),
            reverse: SequenceFile::new(PathBuf::from("/data/s_2.fq"), Some("_1"), Some("_2")),
        };
        let lines = knead.build_invocation(&unit)?;
        assert_eq!(lines.moves[0], "mv /mod/temp/s_paired_1.fastq /mod/output/s_1.fq");
        assert_eq!(lines.moves[1], "mv /mod/temp/s_paired_2.fastq /mod/output/s_2.fq");
        Ok(())
    }

    #[test]
    fn test_worker_function() -> anyhow::Result<()> {
        let knead = KneadData::new(config())?;
        let params = knead.resolve_parameters()?;

        let single = knead.worker_functions(&params, false)?;
        assert_eq!(single.len(), 3);
        assert_eq!(single[0], format!("{}() {{", KNEADDATA_FUNCTION));
        assert_eq!(single[1], "kneaddata -t 4 --output-prefix \"$1\" -i \"$2\" -o /mod/temp");
        assert_eq!(single[2], "}");

        let pair = knead.worker_functions(&params, true)?;
        assert_eq!(pair[1], "kneaddata -t 4 --output-prefix \"$1\" -i \"$2\" -i \"$3\" -o /mod/temp");
        Ok(())
    }

    #[test]
    fn test_paired_set_counts() -> anyhow::Result<()> {
        let knead = KneadData::new(config())?;
        let units: Vec<_> = ["a", "b", "c"].iter().map(|s| paired(s)).collect();
        let plan = build_script_plan(&knead, &units)?;
        assert_eq!(plan.samples.len(), 3);
        for lines in &plan.samples {
            // function name, sample ID, forward, reverse
            assert_eq!(lines.invocation.split_whitespace().count(), 4);
            assert_eq!(lines.moves.len(), 2);
            assert!(lines.moves[0].contains("_paired_1"));
            assert!(lines.moves[1].contains("_paired_2"));
        }
        Ok(())
    }

    #[test]
    fn test_plan_is_deterministic() -> anyhow::Result<()> {
        let knead = KneadData::new(config())?;
        let units: Vec<_> = ["x", "y"].iter().map(|s| paired(s)).collect();
        assert_eq!(build_script_plan(&knead, &units)?, build_script_plan(&knead, &units)?);
        Ok(())
    }

    #[test]
    fn test_missing_naming_config_fails_fast() {
        for broken in [
            SanitizerConfig { fw_suffix: None, ..config() },
            SanitizerConfig { rv_suffix: Some("  ".to_string()), ..config() },
            SanitizerConfig { extension: None, ..config() },
            SanitizerConfig { extension: Some(".".to_string()), ..config() },
        ] {
            assert!(matches!(KneadData::new(broken), Err(PipelineError::MissingConfig(_))));
        }
        let same = SanitizerConfig { rv_suffix: Some("_R1".to_string()), ..config() };
        assert!(matches!(KneadData::new(same), Err(PipelineError::InvalidConfig(_))));
    }

    #[test]
    fn test_parameters_idempotent_and_ordered() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let dbs: Vec<PathBuf> = ["human", "phix", "bacteria"]
            .iter()
            .map(|n| {
                let p = dir.path().join(n);
                std::fs::create_dir(&p).map(|_| p)
            })
            .collect::<std::io::Result<_>>()?;
        let knead = KneadData::new(SanitizerConfig {
            dbs: dbs.clone(),
            params: vec!["--bypass-trf".to_string()],
            ..config()
        })?;

        let first = knead.resolve_parameters()?;
        let second = knead.resolve_parameters()?;
        assert_eq!(first.render(), second.render());

        let expected: Vec<String> = dbs.iter().map(|p| p.to_string_lossy().into_owned()).collect();
        assert_eq!(first.values_of("-db"), expected);
        assert_eq!(&first.tokens()[..3], &["-t", "4", "--bypass-trf"]);
        Ok(())
    }

    #[test]
    fn test_missing_database_dir_is_config_error() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let knead = KneadData::new(SanitizerConfig {
            dbs: vec![dir.path().join("absent")],
            ..config()
        })?;
        assert!(matches!(knead.resolve_parameters(), Err(PipelineError::ConfigPath { .. })));
        assert!(build_script_plan(&knead, &[paired("a")]).is_err());
        Ok(())
    }

    #[test]
    fn test_container_defaults() -> anyhow::Result<()> {
        let in_docker = KneadData::new(SanitizerConfig { containerized: true, ..config() })?;
        let params = in_docker.resolve_parameters()?;
        assert_eq!(params.values_of("-db"), vec!["/mnt/efs/db"]);
        assert_eq!(params.values_of("--trimmomatic"), vec!["/app/Trimmomatic-0.38"]);

        let outside = KneadData::new(config())?;
        let params = outside.resolve_parameters()?;
        assert!(params.values_of("-db").is_empty());
        assert!(!params.contains_flag("--trimmomatic"));
        Ok(())
    }

    #[test]
    fn test_trim_flag_not_injected_over_user_choice() -> anyhow::Result<()> {
        let bypass = KneadData::new(SanitizerConfig {
            containerized: true,
            params: vec!["--bypass-trim".to_string()],
            ..config()
        })?;
        assert!(!bypass.resolve_parameters()?.contains_flag("--trimmomatic"));

        let own_trim = KneadData::new(SanitizerConfig {
            containerized: true,
            params: vec!["--trimmomatic /opt/trimmomatic".to_string()],
            ..config()
        })?;
        let params = own_trim.resolve_parameters()?;
        assert_eq!(params.values_of("--trimmomatic"), vec!["/opt/trimmomatic"]);
        Ok(())
    }

    #[test]
    fn test_user_thread_flag_wins() -> anyhow::Result<()> {
        let knead = KneadData::new(SanitizerConfig {
            params: vec!["--threads 2".to_string()],
            ..config()
        })?;
        let params = knead.resolve_parameters()?;
        assert_eq!(params.render(), "--threads 2 ");
        assert_eq!(params.to_string(), "--threads 2");
        Ok(())
    }

    #[test]
    fn test_paths_with_spaces_are_quoted() -> anyhow::Result<()> {
        let knead = KneadData::new(config())?;
        let unit = SampleUnit::Single(SequenceFile::new(PathBuf::from("/my data/s.fastq"), None, None));
        let lines = knead.build_invocation(&unit)?;
        assert_eq!(lines.invocation, format!("{} s '/my data/s.fastq'", KNEADDATA_FUNCTION));
        Ok(())
    }

    #[test]
    fn test_summary_lists_databases() -> anyhow::Result<()> {
        let knead = KneadData::new(SanitizerConfig { containerized: true, ..config() })?;
        assert_eq!(knead.summary(), "Removed contaminants in DB: [\"/mnt/efs/db\"]");
        Ok(())
    }

    #[test]
    fn test_summary_keeps_database_paths_whole() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let db = dir.path().join("human db");
        std::fs::create_dir(&db)?;
        let knead = KneadData::new(SanitizerConfig { dbs: vec![db.clone()], ..config() })?;

        let params = knead.resolve_parameters()?;
        assert!(params.render().contains(&format!("-db '{}'", db.display())));
        assert_eq!(knead.summary(), format!("Removed contaminants in DB: [{:?}]", db));
        Ok(())
    }

    #[test]
    fn test_paired_mode_follows_units() -> anyhow::Result<()> {
        let knead = KneadData::new(config())?;
        let plan = build_script_plan(&knead, &[paired("a"), paired("b")])?;
        assert!(plan.functions[1].contains("-i \"$3\""));

        let single = SampleUnit::Single(seq("c.fastq"));
        let plan = build_script_plan(&knead, std::slice::from_ref(&single))?;
        assert!(!plan.functions[1].contains("\"$3\""));

        let mixed = build_script_plan(&knead, &[paired("a"), single]);
        assert!(matches!(mixed, Err(PipelineError::InvalidConfig(_))));
        Ok(())
    }

    #[test]
    fn test_version_parsing() {
        assert_eq!(parse_version("kneaddata v0.12.0\n"), Some("0.12.0".to_string()));
        assert_eq!(parse_version("no version here"), None);
        assert_eq!(version_number("0.12.0"), Some((0, 12)));
        assert_eq!(version_number("0.7.10"), Some((0, 7)));
        assert!(version_number("0.12.0") > Some((0, 7)));
        assert_eq!(version_number("1"), None);
    }

    #[tokio::test]
    async fn test_check_version_missing_exe() {
        let result = check_version(KNEADDATA_TAG, "/definitely/not/a/kneaddata").await;
        assert!(result.is_err());
    }

    #[test]
    fn test_sanitizer_for_kneaddata() -> anyhow::Result<()> {
        let sanitizer = sanitizer_for(config())?;
        assert_eq!(sanitizer.tag(), SanitizerKind::Kneaddata.tag());
        assert_eq!(sanitizer.function_name(), KNEADDATA_FUNCTION);
        Ok(())
    }
}
