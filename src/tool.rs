//! Purpose: Spawn external modlet processing tools with a filtered view.
//! Exports: `run`.
//! Role: Delegation boundary; the tools themselves are opaque executables.
//! Invariants: Tools only ever see filtered resource locations.
//! Invariants: The child's exit code is propagated unchanged.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process;

use tracing::debug;

use modsift::api::{DirSearch, Error, ErrorKind, Resolver};

pub const MODLET_PATH_ENV: &str = "MODSIFT_MODLET_PATH";
pub const PROVIDER_PATH_ENV: &str = "MODSIFT_PROVIDER_PATH";

/// Resolves the filtered discovery resources, exports their locations to the
/// tool's environment, spawns it, and returns its exit code.
pub fn run(
    resolver: &Resolver<DirSearch>,
    tool: OsString,
    args: Vec<OsString>,
) -> Result<i32, Error> {
    let modlet_path = joined_locations(
        resolver,
        resolver.locations().modlet_location().to_string(),
    )?;
    let provider_path = joined_locations(
        resolver,
        resolver.locations().provider_location().to_string(),
    )?;

    debug!(tool = %tool.to_string_lossy(), "delegating to external tool");
    let status = process::Command::new(&tool)
        .args(&args)
        .env(MODLET_PATH_ENV, &modlet_path)
        .env(PROVIDER_PATH_ENV, &provider_path)
        .status()
        .map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message(format!("failed to launch tool `{}`", tool.to_string_lossy()))
                .with_source(err)
                .with_hint("Check that the tool executable exists and is on PATH.")
        })?;

    Ok(status.code().unwrap_or(1))
}

fn joined_locations(resolver: &Resolver<DirSearch>, name: String) -> Result<OsString, Error> {
    let locations: Vec<PathBuf> = resolver.find_resources(&name).collect();
    std::env::join_paths(&locations).map_err(|err| {
        Error::new(ErrorKind::Internal)
            .with_message("resolved location cannot be joined into a search path")
            .with_resource(name)
            .with_source(err)
    })
}
