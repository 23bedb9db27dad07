use std::collections::HashMap;
use std::fs;
use log::{debug, info};

use crate::config::defs::{PipelineError, RunConfig};
use crate::utils::command::{build_script_plan, sanitizer_for};
use crate::utils::fastx::{discover_sequence_files, has_paired_reads, paired_reads, require_fastq};
use crate::utils::file::require_executable;
use crate::utils::samples::group_samples;
use crate::utils::script::{write_scripts, ScriptFiles};


/// Generates the decontamination scripts for every sample in the input.
///
/// Configuration is checked first, then the input set, then the whole plan is
/// built in memory; directories and scripts are only written once all of
/// that succeeded.
///
/// # Arguments
///
/// * `config` - RunConfig struct from main.
///
/// # Returns
/// ScriptFiles written under the module's script directory.
pub fn run(config: &RunConfig) -> Result<ScriptFiles, PipelineError> {
    let sanitizer_config = &config.sanitizer;
    require_executable(&sanitizer_config.exe)?;
    let sanitizer = sanitizer_for(sanitizer_config.clone())?;

    let files = discover_sequence_files(
        &config.inputs,
        sanitizer_config.fw_suffix.as_deref(),
        sanitizer_config.rv_suffix.as_deref(),
    )?;
    debug!("Discovered {} sequence files", files.len());
    require_fastq(&files)?;

    let paired = has_paired_reads(&files);
    let pairs = if paired { paired_reads(&files)? } else { HashMap::new() };
    let units = group_samples(&files, paired, &pairs)?;
    info!(
        "Found {} {} samples in {} files",
        units.len(),
        if paired { "paired-end" } else { "single-end" },
        files.len()
    );

    let plan = build_script_plan(sanitizer.as_ref(), &units)?;
    if config.verbose {
        for sample in &plan.samples {
            debug!("{}: {}", sample.sample_id, sample.invocation);
        }
    }

    fs::create_dir_all(&sanitizer_config.temp_dir)?;
    fs::create_dir_all(&sanitizer_config.out_dir)?;
    let scripts = write_scripts(&plan, &config.script_dir, config.batch_size)?;

    info!("{}", sanitizer.summary());
    if sanitizer_config.containerized {
        info!("Container defaults were applied where no path was configured");
    }
    Ok(scripts)
}
