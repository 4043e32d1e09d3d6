//! Purpose: Hold top-level CLI command dispatch for `modsift`.
//! Exports: `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap and delegate command execution.
//! Invariants: Commands emit stable stdout formats (JSON by command).
//! Invariants: Resolution semantics live in `api::Resolver`, not here.

use std::io::Write;

use modsift::api::ResourceSearch;

use super::*;

pub(super) fn dispatch_command(
    command: Command,
    resolver: Resolver<DirSearch>,
) -> Result<RunOutcome, Error> {
    match command {
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::aot::generate(shell, &mut cmd, "modsift", &mut io::stdout());
            Ok(RunOutcome::ok())
        }
        Command::Version => {
            emit_json(json!({
                "version": {
                    "name": "modsift",
                    "version": env!("CARGO_PKG_VERSION"),
                }
            }));
            Ok(RunOutcome::ok())
        }
        Command::Resolve { name } => {
            let underlying = resolver.search().find_one(&name);
            match resolver.find_resource(&name) {
                Some(location) => {
                    let filtered = underlying.as_deref() != Some(location.as_path());
                    emit_json(json!({
                        "resource": name,
                        "location": location.display().to_string(),
                        "filtered": filtered,
                    }));
                    Ok(RunOutcome::ok())
                }
                None => Err(not_found(&name, underlying.is_some())),
            }
        }
        Command::List { name } => {
            let locations: Vec<Value> = resolver
                .find_resources(&name)
                .map(|location| json!(location.display().to_string()))
                .collect();
            emit_json(json!({
                "resource": name,
                "count": locations.len(),
                "locations": locations,
            }));
            Ok(RunOutcome::ok())
        }
        Command::Show { name } => {
            let underlying = resolver.search().find_one(&name);
            match resolver.find_resource(&name) {
                Some(location) => {
                    let bytes = std::fs::read(&location).map_err(|err| {
                        Error::new(ErrorKind::Io)
                            .with_message("failed to read resolved resource")
                            .with_resource(&name)
                            .with_path(&location)
                            .with_source(err)
                    })?;
                    io::stdout().write_all(&bytes).map_err(|err| {
                        Error::new(ErrorKind::Io)
                            .with_message("failed to write resource content")
                            .with_resource(&name)
                            .with_source(err)
                    })?;
                    Ok(RunOutcome::ok())
                }
                None => Err(not_found(&name, underlying.is_some())),
            }
        }
        Command::Run { tool, args } => {
            let exit_code = tool::run(&resolver, tool, args)?;
            Ok(RunOutcome::with_code(exit_code))
        }
    }
}

fn not_found(name: &str, filtered_away: bool) -> Error {
    let err = Error::new(ErrorKind::NotFound)
        .with_message("resource not found")
        .with_resource(name);
    if filtered_away {
        err.with_hint("The resource exists but failed filtering; see log output for the cause.")
    } else {
        err.with_hint("Check --search-path and the resource name.")
    }
}
