//! Command-line interface for the NormCode compiler
//!
//! Usage:
//!   normcode compile `<input>` [--concepts `<path>`] [--inferences `<path>`] [--clusters `<path>`]
//!                            [--config `<file>`] [--compact]     - Compile a plan into its tables
//!   normcode reindex `<path>` [--dry-run] [--config `<file>`]     - Rewrite explicit position tags
//!
//! Logs go to stderr and are filtered with `RUST_LOG` (default `normcode_compiler=info`).

use clap::{error::ErrorKind, Arg, ArgAction, ArgMatches, Command};
use normcode_compiler::normcode::config::{CompilerConfig, Loader};
use normcode_compiler::normcode::error::CompileError;
use normcode_compiler::normcode::pipeline::Compiler;
use normcode_compiler::normcode::reindex::reindex;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn config_arg() -> Arg {
    Arg::new("config")
        .long("config")
        .short('c')
        .help("TOML file layered over the defaults and any normcode.toml beside the plan")
}

fn command() -> Command {
    Command::new("normcode")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Compile NormCode plans into concept and inference tables")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("compile")
                .about("Compile a plan into its concept and inference tables")
                .arg(
                    Arg::new("input")
                        .help("Path to the plan")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("concepts")
                        .long("concepts")
                        .help("Concept table output (default: <stem>.concepts.json)"),
                )
                .arg(
                    Arg::new("inferences")
                        .long("inferences")
                        .help("Inference table output (default: <stem>.inferences.json)"),
                )
                .arg(
                    Arg::new("clusters")
                        .long("clusters")
                        .help("Also write the intermediate clusters to this path"),
                )
                .arg(
                    Arg::new("compact")
                        .long("compact")
                        .help("Write compact JSON instead of pretty-printed")
                        .action(ArgAction::SetTrue),
                )
                .arg(config_arg()),
        )
        .subcommand(
            Command::new("reindex")
                .about("Rewrite explicit position tags to match the indentation")
                .arg(
                    Arg::new("path")
                        .help("Path to the plan")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("dry-run")
                        .long("dry-run")
                        .help("Report how many lines would change without writing")
                        .action(ArgAction::SetTrue),
                )
                .arg(config_arg()),
        )
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("normcode_compiler=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let matches = match command().try_get_matches() {
        Ok(matches) => matches,
        Err(e) => {
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    init_logging();

    let result = match matches.subcommand() {
        Some(("compile", compile_matches)) => handle_compile_command(compile_matches),
        Some(("reindex", reindex_matches)) => handle_reindex_command(reindex_matches),
        _ => unreachable!(),
    };

    if let Err(e) = result {
        error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Defaults, then `normcode.toml` beside the plan, then `--config`, then `--compact`.
fn load_config(
    matches: &ArgMatches,
    plan: &Path,
    compact: bool,
) -> Result<CompilerConfig, CompileError> {
    let mut loader = Loader::new().beside_plan(plan);
    if let Some(path) = matches.get_one::<String>("config") {
        loader = loader.with_file(path);
    }
    if compact {
        loader = loader.set_override("output.pretty", false)?;
    }
    Ok(loader.build()?)
}

/// `<dir>/<stem>.<suffix>` next to the input.
fn sibling_output(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "plan".to_string());
    input.with_file_name(format!("{}.{}", stem, suffix))
}

fn output_path(matches: &ArgMatches, name: &str, input: &Path, suffix: &str) -> PathBuf {
    matches
        .get_one::<String>(name)
        .map(PathBuf::from)
        .unwrap_or_else(|| sibling_output(input, suffix))
}

/// Handle the compile command
fn handle_compile_command(matches: &ArgMatches) -> Result<(), CompileError> {
    let input = PathBuf::from(
        matches
            .get_one::<String>("input")
            .expect("input is a required argument"),
    );
    let config = load_config(matches, &input, matches.get_flag("compact"))?;
    let pretty = config.output.pretty;

    let mut compiler = Compiler::new(config);
    let plan = compiler.compile_file(&input)?;

    let concepts = output_path(matches, "concepts", &input, "concepts.json");
    let inferences = output_path(matches, "inferences", &input, "inferences.json");
    plan.write_tables(&concepts, &inferences, pretty)?;
    if let Some(clusters) = matches.get_one::<String>("clusters") {
        plan.write_clusters(Path::new(clusters), pretty)?;
    }

    println!(
        "Wrote {} concepts to {} and {} inferences to {}",
        plan.concepts.len(),
        concepts.display(),
        plan.inferences.len(),
        inferences.display()
    );
    Ok(())
}

/// Handle the reindex command
fn handle_reindex_command(matches: &ArgMatches) -> Result<(), CompileError> {
    let path = PathBuf::from(
        matches
            .get_one::<String>("path")
            .expect("path is a required argument"),
    );
    let config = load_config(matches, &path, false)?;
    let source = fs::read_to_string(&path).map_err(|e| CompileError::reading(&path, e))?;
    let outcome = reindex(&source, config.parser.indent_width);

    if matches.get_flag("dry-run") {
        println!("{} line(s) would be updated", outcome.updated);
        return Ok(());
    }
    if outcome.updated > 0 {
        fs::write(&path, &outcome.text).map_err(|e| CompileError::writing(&path, e))?;
        info!(path = %path.display(), updated = outcome.updated, "reindexed");
    }
    println!("Updated {} line(s)", outcome.updated);
    Ok(())
}
