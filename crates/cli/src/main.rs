use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command};
use console::style;
use shelfscan_catalog::{DataFormat, SortOrder};
use shelfscan_core::{AppError, ErrorSeverity, RecoveryAction};
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;
mod context;

use context::AppContext;

/// Flags shared by `add` and `update` for editing book fields
fn record_args() -> Vec<Arg> {
    vec![
        Arg::new("title").short('t').long("title").value_name("TITLE").help("Book title"),
        Arg::new("author").short('a').long("author").value_name("AUTHOR").help("Author(s)"),
        Arg::new("publisher").long("publisher").value_name("PUBLISHER").help("Publisher"),
        Arg::new("published").long("published").value_name("DATE").help("Publication date"),
        Arg::new("pages")
            .long("pages")
            .value_name("N")
            .help("Page count")
            .value_parser(clap::value_parser!(u32).range(1..)),
        Arg::new("category").short('c').long("category").value_name("CATEGORY").help("Comma-separated categories"),
        Arg::new("description").long("description").value_name("TEXT").help("Description"),
        Arg::new("isbn").long("isbn").value_name("ISBN").help("ISBN"),
        Arg::new("location").short('l').long("location").value_name("LOCATION").help("Where the book is kept"),
    ]
}

fn id_arg() -> Arg {
    Arg::new("id")
        .required(true)
        .value_name("BOOK_ID")
        .help("Book ID (UUID or unique prefix)")
}

fn json_flag() -> Arg {
    Arg::new("json")
        .long("json")
        .help("Print JSON instead of text")
        .action(ArgAction::SetTrue)
}

fn build_cli() -> Command {
    Command::new("shelfscan")
        .version(env!("CARGO_PKG_VERSION"))
        .author("ShelfScan Team")
        .about("Book barcode scanning and home library catalog")
        .arg(
            Arg::new("config-dir")
                .long("config-dir")
                .value_name("DIR")
                .help("Directory holding config.toml, the catalog and tokens")
                .value_parser(clap::value_parser!(PathBuf))
                .global(true),
        )
        .arg(
            Arg::new("offline")
                .long("offline")
                .help("Use only the local catalog and skip every network service")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("classify")
                .about("Classify a scanned code")
                .arg(Arg::new("code").required(true).value_name("CODE")),
        )
        .subcommand(
            Command::new("convert")
                .about("Recover an ISBN-13 from a Japanese book JAN")
                .arg(Arg::new("code").required(true).value_name("JAN"))
                .arg(
                    Arg::new("explain")
                        .long("explain")
                        .help("List every candidate in trial order")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("plan")
                .about("Show which catalogs would be asked about a code")
                .arg(Arg::new("code").required(true).value_name("CODE")),
        )
        .subcommand(
            Command::new("lookup")
                .about("Look up book metadata for a code")
                .arg(Arg::new("code").required(true).value_name("CODE"))
                .arg(json_flag()),
        )
        .subcommand(
            Command::new("add")
                .about("Add a book, optionally filling details from a scanned code")
                .arg(Arg::new("code").value_name("CODE").help("ISBN or JAN to look up"))
                .args(record_args()),
        )
        .subcommand(
            Command::new("list")
                .about("List cataloged books")
                .arg(
                    Arg::new("sort")
                        .short('s')
                        .long("sort")
                        .value_name("ORDER")
                        .value_parser(SortOrder::NAMES)
                        .default_value("added"),
                )
                .arg(Arg::new("category").short('c').long("category").value_name("CATEGORY"))
                .arg(Arg::new("location").short('l').long("location").value_name("LOCATION"))
                .arg(json_flag()),
        )
        .subcommand(
            Command::new("search")
                .about("Search titles, authors and ISBNs")
                .arg(Arg::new("query").required(true).value_name("QUERY")),
        )
        .subcommand(
            Command::new("show")
                .about("Show one book")
                .arg(id_arg())
                .arg(json_flag()),
        )
        .subcommand(
            Command::new("update")
                .about("Edit a book")
                .arg(id_arg())
                .args(record_args()),
        )
        .subcommand(
            Command::new("delete")
                .about("Delete a book")
                .arg(id_arg())
                .arg(
                    Arg::new("force")
                        .short('f')
                        .long("force")
                        .help("Skip confirmation prompt")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(Command::new("locations").about("List storage locations with book counts"))
        .subcommand(
            Command::new("export")
                .about("Export the catalog")
                .arg(
                    Arg::new("format")
                        .short('f')
                        .long("format")
                        .value_name("FORMAT")
                        .value_parser(["json", "csv"])
                        .default_value("json"),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .value_name("FILE")
                        .help("Output file [default: books_export_<date>.<format>]")
                        .value_parser(clap::value_parser!(PathBuf)),
                ),
        )
        .subcommand(
            Command::new("import")
                .about("Import books from a JSON or CSV export")
                .arg(
                    Arg::new("file")
                        .required(true)
                        .value_name("FILE")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("format")
                        .short('f')
                        .long("format")
                        .value_name("FORMAT")
                        .help("Override the format guessed from the extension")
                        .value_parser(["json", "csv"]),
                ),
        )
        .subcommand(
            Command::new("scan")
                .about("Read a book code from a cover photo")
                .arg(
                    Arg::new("image")
                        .required(true)
                        .value_name("IMAGE")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("lookup")
                        .long("lookup")
                        .help("Look up the detected ISBN")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("auth")
                .about("Manage sign-in for cloud text recognition")
                .subcommand_required(true)
                .subcommand(Command::new("login").about("Sign in through the browser"))
                .subcommand(Command::new("status").about("Show sign-in state"))
                .subcommand(Command::new("logout").about("Forget stored tokens")),
        )
        .subcommand(
            Command::new("status")
                .about("Show catalog and service status")
                .arg(
                    Arg::new("reconnect")
                        .long("reconnect")
                        .help("Try to bring a degraded remote store back online")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("config")
                .about("Manage the configuration file")
                .subcommand_required(true)
                .subcommand(Command::new("init").about("Write a default config file if none exists"))
                .subcommand(Command::new("show").about("Print the effective configuration"))
                .subcommand(Command::new("path").about("Print the config file location")),
        )
}

fn main() -> ExitCode {
    let matches = build_cli().get_matches();

    match run(&matches) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err);
            ExitCode::from(exit_status(&err))
        }
    }
}

fn run(matches: &ArgMatches) -> Result<()> {

    let config_dir = matches.get_one::<PathBuf>("config-dir").cloned();
    let offline = matches.get_flag("offline");
    let ctx = AppContext::load(config_dir, offline)?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(ctx.config.app.log_level.to_string()),
    )
    .init();

    match matches.subcommand() {
        Some(("classify", sub)) => commands::classify_code(sub),
        Some(("convert", sub)) => commands::convert_code(sub),
        Some(("plan", sub)) => commands::show_plan(sub),
        Some(("lookup", sub)) => commands::lookup_code(&ctx, sub),
        Some(("add", sub)) => commands::add_book(&ctx, sub),
        Some(("list", sub)) => commands::list_books(&ctx, sub),
        Some(("search", sub)) => commands::search_books(&ctx, sub),
        Some(("show", sub)) => commands::show_book(&ctx, sub),
        Some(("update", sub)) => commands::update_book(&ctx, sub),
        Some(("delete", sub)) => commands::delete_book(&ctx, sub),
        Some(("locations", _)) => commands::list_locations(&ctx),
        Some(("export", sub)) => commands::export_catalog(&ctx, sub),
        Some(("import", sub)) => commands::import_catalog(&ctx, sub),
        Some(("scan", sub)) => commands::scan_image(&ctx, sub),
        Some(("auth", sub)) => match sub.subcommand() {
            Some(("login", _)) => commands::auth_login(&ctx),
            Some(("status", _)) => commands::auth_status(&ctx),
            Some(("logout", _)) => commands::auth_logout(&ctx),
            _ => anyhow::bail!("Unknown auth command"),
        },
        Some(("status", sub)) => commands::show_status(&ctx, sub),
        Some(("config", sub)) => match sub.subcommand() {
            Some(("init", _)) => commands::config_init(&ctx),
            Some(("show", _)) => commands::config_show(&ctx),
            Some(("path", _)) => commands::config_path(&ctx),
            _ => anyhow::bail!("Unknown config command"),
        },
        _ => {
            build_cli().print_help()?;
            Ok(())
        }
    }
}

/// The shared error behind `err`, when a library produced it
fn app_error(err: &anyhow::Error) -> Option<&AppError> {
    err.chain().find_map(|cause| cause.downcast_ref::<AppError>())
}

fn report_error(err: &anyhow::Error) {
    eprintln!("{} {:#}", style("Error:").red().bold(), err);
    if let Some(app) = app_error(err) {
        eprintln!("  {}", app.user_message());
        if app.recovery_action() != RecoveryAction::UserIntervention {
            eprintln!("  {}", style(app.recovery_action()).dim());
        }
    }
}

/// `EX_TEMPFAIL` for retryable failures, `EX_UNAVAILABLE` for degraded ones
fn exit_status(err: &anyhow::Error) -> u8 {
    match app_error(err).map(AppError::severity) {
        Some(ErrorSeverity::Recoverable) => 75,
        Some(ErrorSeverity::Degraded) => 69,
        Some(ErrorSeverity::Fatal) | None => 1,
    }
}

/// Parses `--format` when given
fn parse_format(value: Option<&String>) -> Option<DataFormat> {
    value.and_then(|v| v.parse().ok())
}
