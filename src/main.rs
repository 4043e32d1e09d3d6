//! Purpose: `modsift` CLI entry point: parse args, bootstrap, dispatch.
//! Role: Binary crate root; commands emit JSON on stdout.
//! Invariants: Non-interactive errors are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `api::to_exit_code`.
//! Invariants: All resource resolution goes through `api::Resolver`.

use std::ffi::OsString;
use std::io::{self, IsTerminal};
use std::path::PathBuf;

use clap::{error::ErrorKind as ClapErrorKind, CommandFactory, Parser, Subcommand, ValueHint};
use clap_complete::aot::Shell;
use serde_json::{json, Map, Value};
use tracing_subscriber::EnvFilter;

mod command_dispatch;
mod tool;

use modsift::api::{
    to_exit_code, DirSearch, DiscoveryLocations, Error, ErrorKind, ExclusionSet, Resolver,
    DEFAULT_MODLET_LOCATION, DEFAULT_PROVIDER_LOCATION,
};

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }

    fn with_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

fn main() {
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err(err) => {
            emit_error(&err);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<RunOutcome, Error> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    Error::new(ErrorKind::Io)
                        .with_message("failed to write help")
                        .with_source(io_err)
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(RunOutcome::with_code(exit_code));
            }
            _ => {
                return Err(Error::new(ErrorKind::Usage)
                    .with_message(clap_error_summary(&err))
                    .with_hint("Run `modsift --help` for usage."));
            }
        },
    };

    init_tracing();

    let exclusions = ExclusionSet::from_specs(
        &cli.provider_excludes,
        &cli.modlet_excludes,
        &cli.schema_excludes,
        &cli.service_excludes,
    );
    let locations = DiscoveryLocations::new(&cli.provider_location, &cli.modlet_location);
    let search = DirSearch::new(cli.search_path.clone());
    let resolver = Resolver::new(search, exclusions, locations);

    command_dispatch::dispatch_command(cli.command, resolver)
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn clap_error_summary(err: &clap::Error) -> String {
    let rendered = err.render().to_string();
    rendered
        .lines()
        .find(|line| !line.trim().is_empty())
        .map(|line| line.trim_start_matches("error: ").to_string())
        .unwrap_or_else(|| "invalid arguments".to_string())
}

#[derive(Parser)]
#[command(
    name = "modsift",
    version,
    about = "Resolve modlet discovery resources with exclusion filtering applied",
    long_about = r#"modsift resolves service provider lists and modlet documents from a
directory search path, rewriting them to honor exclusion rules before any
downstream tool sees them. Resources matching neither discovery location
pass through untouched."#,
    after_help = r#"EXAMPLES
  $ modsift --search-path build/a --search-path build/b resolve meta/modlets.json
  $ modsift --search-path build --modlet-excludes Legacy:Deprecated list meta/modlets.json
  $ modsift --search-path build --provider-excludes org.example.Slow run merge-tool -- --out merged.json

NOTES
  - Exclusion lists are colon-separated and matched by exact string equality.
  - Filtered content is written to a fresh temp file; unchanged resources
    keep their original location."#,
    arg_required_else_help = true
)]
struct Cli {
    #[arg(
        long = "search-path",
        value_hint = ValueHint::DirPath,
        help = "Directory added to the resource search path (repeatable, in order)"
    )]
    search_path: Vec<PathBuf>,
    #[arg(
        long,
        default_value = DEFAULT_PROVIDER_LOCATION,
        help = "Resource name key identifying provider list resources"
    )]
    provider_location: String,
    #[arg(
        long,
        default_value = DEFAULT_MODLET_LOCATION,
        help = "Resource name key identifying modlet document resources"
    )]
    modlet_location: String,
    #[arg(
        long,
        default_value = "",
        help = "Colon-separated provider class names to exclude"
    )]
    provider_excludes: String,
    #[arg(
        long,
        default_value = "",
        help = "Colon-separated modlet names to exclude"
    )]
    modlet_excludes: String,
    #[arg(
        long,
        default_value = "",
        help = "Colon-separated schema context ids to exclude"
    )]
    schema_excludes: String,
    #[arg(
        long,
        default_value = "",
        help = "Colon-separated service classes to exclude"
    )]
    service_excludes: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    #[command(
        about = "Resolve one resource by name",
        after_help = r#"EXAMPLES
  $ modsift --search-path build resolve meta/modlets.json
  $ modsift --search-path build resolve meta/services/modlet-providers"#
    )]
    Resolve {
        #[arg(help = "Resource name, relative to each search path root")]
        name: String,
    },
    #[command(
        about = "List every match for a resource name across the search path",
        after_help = r#"EXAMPLES
  $ modsift --search-path a --search-path b list meta/modlets.json"#
    )]
    List {
        #[arg(help = "Resource name, relative to each search path root")]
        name: String,
    },
    #[command(about = "Print the (possibly filtered) content of a resource")]
    Show {
        #[arg(help = "Resource name, relative to each search path root")]
        name: String,
    },
    #[command(
        about = "Delegate to an external modlet processing tool",
        long_about = r#"Resolves every modlet document and provider list on the search path with
exclusion filtering applied, exports their locations via MODSIFT_MODLET_PATH
and MODSIFT_PROVIDER_PATH, then spawns the tool and propagates its exit code."#,
        after_help = r#"EXAMPLES
  $ modsift --search-path build run merge-tool -- --out merged.json"#
    )]
    Run {
        #[arg(help = "Tool executable to spawn")]
        tool: OsString,
        #[arg(
            trailing_var_arg = true,
            allow_hyphen_values = true,
            help = "Arguments forwarded to the tool"
        )]
        args: Vec<OsString>,
    },
    #[command(about = "Generate shell completions")]
    Completion {
        #[arg(value_enum)]
        shell: Shell,
    },
    #[command(about = "Print version information as JSON")]
    Version,
}

fn emit_json(value: Value) {
    let json = if io::stdout().is_terminal() {
        serde_json::to_string_pretty(&value)
            .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string())
    } else {
        serde_json::to_string(&value)
            .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string())
    };
    println!("{json}");
}

fn error_message(err: &Error) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    match err.kind() {
        ErrorKind::Internal => "internal error".to_string(),
        ErrorKind::Usage => "usage error".to_string(),
        ErrorKind::NotFound => "not found".to_string(),
        ErrorKind::Corrupt => "corrupt data".to_string(),
        ErrorKind::Io => "i/o error".to_string(),
    }
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut cur = std::error::Error::source(err);
    while let Some(source) = cur {
        causes.push(source.to_string());
        cur = source.source();
    }
    causes
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(error_message(err)));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(resource) = err.resource() {
        inner.insert("resource".to_string(), json!(resource));
    }
    if let Some(path) = err.path() {
        inner.insert("path".to_string(), json!(path.display().to_string()));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn error_text(err: &Error) -> String {
    let mut lines = Vec::new();
    lines.push(format!("error: {}", error_message(err)));
    if let Some(hint) = err.hint() {
        lines.push(format!("hint: {hint}"));
    }
    if let Some(resource) = err.resource() {
        lines.push(format!("resource: {resource}"));
    }
    if let Some(path) = err.path() {
        lines.push(format!("path: {}", path.display()));
    }
    for cause in error_causes(err) {
        lines.push(format!("cause: {cause}"));
    }
    lines.join("\n")
}

fn emit_error(err: &Error) {
    if io::stderr().is_terminal() {
        eprintln!("{}", error_text(err));
        return;
    }

    let value = error_json(err);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}
