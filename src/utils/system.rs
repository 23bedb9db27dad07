// src/utils/system.rs: System functions

use std::path::Path;

use sysinfo::System;

use crate::config::defs::DOCKER_ENV_MARKER;


/// Thread count for the external tool: the explicit request if given, else
/// the number of physical cores.
///
/// # Arguments
///
/// * `args_threads` - Thread count from the command line, if any.
///
/// # Returns
/// usize, at least 1.
pub fn detect_threads(args_threads: Option<usize>) -> usize {
    match args_threads {
        Some(threads) => threads,
        None => System::physical_core_count().unwrap_or(1).max(1),
    }
}


/// Whether container default paths apply. An explicit flag wins over the
/// `/.dockerenv` marker.
pub fn in_docker_env(force_docker: bool, no_docker: bool) -> bool {
    if force_docker {
        return true;
    }
    if no_docker {
        return false;
    }
    Path::new(DOCKER_ENV_MARKER).exists()
}
