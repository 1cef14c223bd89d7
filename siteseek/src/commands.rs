use crate::CLAP_STYLING;
use clap::{ArgAction, arg, command};
use url::Url;

/// Flags shared by `crawl` and `search`.
fn with_crawl_args(cmd: clap::Command) -> clap::Command {
    cmd.arg(
        arg!(-u --"url" <URL>)
            .required_unless_present("hosts-file")
            .help("The seed URL to crawl")
            .value_parser(clap::value_parser!(Url))
            .conflicts_with("hosts-file"),
    )
    .arg(
        arg!(-H --"hosts-file" <PATH>)
            .required(false)
            .help("Path to a newline-delimited file of seed URLs")
            .value_parser(clap::value_parser!(std::path::PathBuf))
            .conflicts_with("url"),
    )
    .arg(
        arg!(--"base" <URL>)
            .required(false)
            .help("Scope root for every seed (default: each seed is its own root)")
            .value_parser(clap::value_parser!(Url)),
    )
    .arg(
        arg!(-t --"threads" <NUM_WORKERS>)
            .required(false)
            .help("The number of async workers draining the frontier [default: 10]")
            .value_parser(clap::value_parser!(usize)),
    )
    .arg(
        arg!(--"scope" <MODE>)
            .required(false)
            .help("Scope test: strict (same origin, whole path segments) or prefix (literal string prefix)")
            .value_parser(["strict", "prefix"]),
    )
    .arg(
        arg!(--"timeout" <SECS>)
            .required(false)
            .help("Per-request timeout in seconds [default: 10]")
            .value_parser(clap::value_parser!(u64)),
    )
    .arg(
        arg!(--"crawl-timeout" <SECS>)
            .required(false)
            .help("Stop each crawl after this many seconds")
            .value_parser(clap::value_parser!(u64)),
    )
    .arg(
        arg!(--"user-agent" <AGENT>)
            .required(false)
            .help("User-Agent header sent with every request"),
    )
    .arg(
        arg!(-c --"config" <PATH>)
            .required(false)
            .help("JSON config file; command line flags take precedence"),
    )
    .arg(
        arg!(--"index-failures")
            .required(false)
            .help("Record pages that failed to fetch with empty text")
            .action(ArgAction::SetTrue),
    )
    .arg(
        arg!(-o --"output" <PATH>)
            .required(false)
            .help("Save output to file (default: display to screen)")
            .value_parser(clap::value_parser!(std::path::PathBuf)),
    )
    .arg(
        arg!(-f --"format" <FORMAT>)
            .required(false)
            .help("Output format: text, json")
            .value_parser(["text", "json"])
            .default_value("text"),
    )
    .arg(
        arg!(--"no-progress")
            .required(false)
            .help("Disable the progress spinner")
            .action(ArgAction::SetTrue),
    )
}

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("siteseek")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("siteseek")
        .styles(CLAP_STYLING)
        .arg(
            arg!(-q --"quiet" "Suppress banner and non-essential output")
                .required(false)
                .global(true),
        )
        .arg(
            arg!(-v --"verbose" "Increase log verbosity (-v info, -vv debug, -vvv trace)")
                .action(ArgAction::Count)
                .global(true),
        )
        .subcommand_required(false)
        .subcommand(with_crawl_args(
            command!("crawl").about(
                "Crawl a host or collection of hosts within scope and report what was indexed.",
            ),
        ))
        .subcommand(
            with_crawl_args(command!("search").about(
                "Crawl a host or collection of hosts, then search the collected text for keywords.",
            ))
            .arg(
                arg!(-k --"keyword" <KEYWORD>)
                    .required(true)
                    .help("Keyword to search for; case-insensitive substring match. Repeatable.")
                    .num_args(1..)
                    .action(ArgAction::Append),
            ),
        )
}
