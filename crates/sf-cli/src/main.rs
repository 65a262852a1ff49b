//! `scholarflow` command line

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use sf_cli::{
    init_tracing, load_config, parse_rbac_document, process_filters, render_manuscripts,
    render_reviews, CapabilityReport,
};
use sf_client::{EditorApi, EnvSession, FetchOptions};
use sf_sanitize::{RenderMode, Sanitizer, SanitizerConfig};
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

fn force_arg() -> Arg {
    Arg::new("force")
        .long("force")
        .action(ArgAction::SetTrue)
        .help("Bypass the request cache")
}

fn cli() -> Command {
    Command::new("scholarflow")
        .version(env!("CARGO_PKG_VERSION"))
        .about("ScholarFlow editorial tooling")
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Client configuration file (TOML)"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::Count)
                .help("Increase log verbosity"),
        )
        .subcommand(
            Command::new("capabilities")
                .about("Derive capability flags from an RBAC context file")
                .arg(
                    Arg::new("file")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("RBAC context JSON, bare or enveloped"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
        .subcommand(
            Command::new("sanitize")
                .about("Sanitize rich text from a file or stdin")
                .arg(
                    Arg::new("file")
                        .value_parser(value_parser!(PathBuf))
                        .help("Input file; stdin when omitted"),
                )
                .arg(
                    Arg::new("escape-only")
                        .long("escape-only")
                        .action(ArgAction::SetTrue)
                        .help("Escape all markup instead of filtering it"),
                ),
        )
        .subcommand(
            Command::new("rbac")
                .about("Fetch the caller's RBAC context and capabilities")
                .arg(force_arg()),
        )
        .subcommand(
            Command::new("process")
                .about("List manuscripts in process")
                .arg(Arg::new("q").long("q").help("Free-text search"))
                .arg(
                    Arg::new("status")
                        .long("status")
                        .action(ArgAction::Append)
                        .help("Workflow status; repeatable"),
                )
                .arg(
                    Arg::new("journal")
                        .long("journal")
                        .action(ArgAction::Append)
                        .help("Journal id; repeatable"),
                )
                .arg(Arg::new("owner").long("owner").help("Owner user id"))
                .arg(
                    Arg::new("overdue")
                        .long("overdue")
                        .action(ArgAction::SetTrue)
                        .help("Only overdue manuscripts"),
                )
                .arg(force_arg()),
        )
        .subcommand(
            Command::new("reviews")
                .about("List review reports of a manuscript")
                .arg(Arg::new("manuscript").required(true).help("Manuscript id"))
                .arg(force_arg()),
        )
}

fn fetch_options(args: &ArgMatches) -> FetchOptions {
    FetchOptions {
        force: args.get_flag("force"),
    }
}

fn strings(args: &ArgMatches, id: &str) -> Vec<String> {
    args.get_many::<String>(id)
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

fn editor_api(matches: &ArgMatches) -> Result<EditorApi> {
    let config = load_config(matches.get_one::<PathBuf>("config").map(PathBuf::as_path))?;
    tracing::info!(base_url = %config.base_url, "using backend");
    let session = Arc::new(EnvSession::new(config.token_env.clone()));
    Ok(EditorApi::from_config(&config, session)?)
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_count("verbose"));

    match matches.subcommand() {
        Some(("capabilities", args)) => {
            let path = args
                .get_one::<PathBuf>("file")
                .context("missing RBAC context file")?;
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("cannot read {}", path.display()))?;
            let report = CapabilityReport::derive(&parse_rbac_document(&text)?);
            if args.get_flag("json") {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", report.render_text());
            }
        }
        Some(("sanitize", args)) => {
            let input = match args.get_one::<PathBuf>("file") {
                Some(path) => std::fs::read_to_string(path)
                    .with_context(|| format!("cannot read {}", path.display()))?,
                None => {
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };
            let mode = if args.get_flag("escape-only") {
                RenderMode::EscapeOnly
            } else {
                RenderMode::Rich
            };
            let sanitizer = Sanitizer::new(SanitizerConfig::default().with_mode(mode));
            println!("{}", sanitizer.sanitize(&input));
        }
        Some(("rbac", args)) => {
            let api = editor_api(&matches)?;
            let context = api.rbac_context(fetch_options(args)).await?;
            println!("{}", serde_json::to_string_pretty(&context)?);
            print!("{}", CapabilityReport::derive(&context).render_text());
        }
        Some(("process", args)) => {
            let api = editor_api(&matches)?;
            let filters = process_filters(
                args.get_one::<String>("q").cloned(),
                strings(args, "status"),
                strings(args, "journal"),
                args.get_one::<String>("owner").cloned(),
                args.get_flag("overdue"),
            );
            let rows = api.manuscripts_in_process(&filters, fetch_options(args)).await?;
            print!("{}", render_manuscripts(&rows));
        }
        Some(("reviews", args)) => {
            let api = editor_api(&matches)?;
            let manuscript = args
                .get_one::<String>("manuscript")
                .context("missing manuscript id")?;
            let rows = api.manuscript_reviews(manuscript, fetch_options(args)).await?;
            print!("{}", render_reviews(&rows, &Sanitizer::default()));
        }
        _ => {}
    }

    Ok(())
}
