use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use log::{debug, info};
use tempfile::NamedTempFile;

use crate::config::defs::{PipelineError, MAIN_SCRIPT_PREFIX, SCRIPT_EXT};
use crate::utils::command::ScriptPlan;
use crate::utils::file::shell_quote_path;

const SHEBANG: &str = "#!/bin/sh";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptFiles {
    pub main: PathBuf,
    pub workers: Vec<PathBuf>,
}


/// Renders worker scripts, `batch_size` samples each. Every script carries
/// the worker function definitions ahead of its sample lines.
pub fn render_worker_scripts(plan: &ScriptPlan, batch_size: usize) -> Result<Vec<String>, PipelineError> {
    if batch_size == 0 {
        return Err(PipelineError::InvalidConfig("batch size must be at least 1".to_string()));
    }
    if plan.samples.is_empty() {
        return Err(PipelineError::InvalidConfig("No samples to build scripts for".to_string()));
    }

    let header = format!("{}\nset -e\n\n{}\n", SHEBANG, plan.functions.join("\n"));
    Ok(plan
        .samples
        .chunks(batch_size)
        .map(|batch| {
            let mut script = header.clone();
            for sample in batch {
                script.push('\n');
                for line in sample.lines() {
                    script.push_str(line);
                    script.push('\n');
                }
            }
            script
        })
        .collect())
}


/// Main script running each worker in order, stopping at the first failure.
pub fn render_main_script(workers: &[PathBuf]) -> String {
    let mut script = format!("{}\n\n", SHEBANG);
    for worker in workers {
        script.push_str(&format!("sh {} || exit 1\n", shell_quote_path(worker)));
    }
    script
}


/// Writes the worker scripts and the main script into `script_dir`.
/// Everything is staged in temp files first, so an error leaves no script
/// from this run behind.
///
/// # Arguments
///
/// * `plan` - Output of `build_script_plan`.
/// * `script_dir` - Destination directory, created if missing.
/// * `batch_size` - Samples per worker script.
///
/// # Returns
/// ScriptFiles with the written paths.
pub fn write_scripts(plan: &ScriptPlan, script_dir: &Path, batch_size: usize) -> Result<ScriptFiles, PipelineError> {
    let bodies = render_worker_scripts(plan, batch_size)?;
    fs::create_dir_all(script_dir)?;

    let workers: Vec<PathBuf> = (1..=bodies.len())
        .map(|n| script_dir.join(format!("{}_{}.{}", plan.tool, n, SCRIPT_EXT)))
        .collect();
    let main = script_dir.join(format!("{}{}.{}", MAIN_SCRIPT_PREFIX, plan.tool, SCRIPT_EXT));
    let main_body = render_main_script(&workers);

    let mut staged = Vec::with_capacity(bodies.len() + 1);
    for (body, dest) in bodies.iter().zip(&workers).chain(std::iter::once((&main_body, &main))) {
        staged.push((stage(script_dir, body)?, dest.clone()));
    }

    let mut written: Vec<PathBuf> = Vec::with_capacity(staged.len());
    for (tmp, dest) in staged {
        if let Err(e) = tmp.persist(&dest) {
            for path in &written {
                let _ = fs::remove_file(path);
            }
            return Err(PipelineError::IOError(format!("Cannot write {:?}: {}", dest, e.error)));
        }
        debug!("Wrote {:?}", dest);
        written.push(dest);
    }

    info!("Wrote {} worker script(s) and {:?}", workers.len(), main);
    Ok(ScriptFiles { main, workers })
}

fn stage(dir: &Path, body: &str) -> Result<NamedTempFile, PipelineError> {
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(body.as_bytes())?;
    tmp.flush()?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file().set_permissions(fs::Permissions::from_mode(0o755))?;
    }
    Ok(tmp)
}
