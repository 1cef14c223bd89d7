use clap::ArgMatches;
use commands::command_argument_builder;
use siteseek::handlers::{handle_crawl, handle_search, init_tracing};
use siteseek_core::print_banner;

mod commands;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");

    // Show banner unless --quiet flag is set
    if !quiet {
        print_banner();
    }

    init_tracing(chosen_command.get_count("verbose"));

    let outcome = match chosen_command.subcommand() {
        Some(("crawl", primary_command)) => {
            handle_crawl(primary_command, is_quiet(quiet, primary_command)).await
        }
        Some(("search", primary_command)) => {
            handle_search(primary_command, is_quiet(quiet, primary_command)).await
        }
        // No subcommand provided, just show the banner
        None => return,
        _ => unreachable!("clap should ensure we don't get here"),
    };

    if let Err(e) = outcome {
        eprintln!("✗ {:#}", e);
        std::process::exit(1);
    }
}

fn is_quiet(global: bool, sub_matches: &ArgMatches) -> bool {
    global || sub_matches.get_flag("quiet")
}

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);
