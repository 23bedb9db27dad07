use std::env;
use std::io::Write;
use std::time::Instant;

use anyhow::Result;
use log::{LevelFilter, debug, info, error};
use env_logger::Builder;
use seqtoid_knead::cli::parse;
use seqtoid_knead::config::defs::RunConfig;
use seqtoid_knead::utils::command::check_version;
use seqtoid_knead::utils::system::{detect_threads, in_docker_env};
use seqtoid_knead::pipelines::sanitize;


#[tokio::main]
async fn main() -> Result<()> {
    let run_start = Instant::now();

    let args = parse();

    let log_level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    Builder::new()
        .filter_level(log_level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {}: {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .init();

    let dir = env::current_dir()?;
    debug!("The current directory is {:?}", dir);

    let threads = detect_threads(args.threads);
    let containerized = in_docker_env(args.docker, args.no_docker);
    debug!("Using {} threads per sample; containerized: {}", threads, containerized);

    let run_config = match RunConfig::from_args(args, &dir, threads, containerized) {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid arguments: {}", e);
            std::process::exit(1);
        }
    };
    info!("Module directory is {:?}", run_config.module_dir);

    if run_config.check_exe {
        let tool = run_config.sanitizer.kind.tag();
        match check_version(tool, &run_config.sanitizer.exe).await {
            Ok(version) => info!("Found {} version {}", tool, version),
            Err(e) => {
                error!("Executable check failed: {}", e);
                std::process::exit(1);
            }
        }
    }

    match sanitize::run(&run_config) {
        Ok(scripts) => info!("Run {:?} to process all samples", scripts.main),
        Err(e) => {
            error!("Pipeline failed: {} at {} milliseconds.", e, run_start.elapsed().as_millis());
            std::process::exit(1);
        }
    }

    info!("Run complete: {} milliseconds.", run_start.elapsed().as_millis());
    Ok(())
}
