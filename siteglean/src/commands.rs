use crate::CLAP_STYLING;
use clap::{arg, command};
use siteglean_core::openai::{API_KEY_ENV, DEFAULT_MODEL};
use url::Url;

fn crawl_tuning_args(cmd: clap::Command) -> clap::Command {
    cmd.arg(
        arg!(-d --"depth" <DEPTH>)
            .required(false)
            .help("How many links away from the seed to follow (0 = seed only)")
            .value_parser(clap::value_parser!(usize))
            .default_value("3"),
    )
    .arg(
        arg!(-t --"threads" <NUM_WORKERS>)
            .required(false)
            .help("The number of async workers fetching pages concurrently.")
            .value_parser(clap::value_parser!(usize))
            .default_value("5"),
    )
    .arg(
        arg!(--"retries" <ATTEMPTS>)
            .required(false)
            .help("Attempts per page before giving up (404s are never retried)")
            .value_parser(clap::value_parser!(u32))
            .default_value("3"),
    )
    .arg(
        arg!(--"timeout" <SECONDS>)
            .required(false)
            .help("Per-request timeout in seconds")
            .value_parser(clap::value_parser!(u64))
            .default_value("10"),
    )
}

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("siteglean")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("siteglean")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .arg(
            arg!(-v --"verbose" ... "Increase log verbosity (-v debug, -vv trace)")
                .required(false),
        )
        .subcommand_required(false)
        .subcommand(crawl_tuning_args(
            command!("crawl")
                .about("Crawl a host or collection of hosts and report what was fetched.")
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(false)
                        .help("The URL to crawl")
                        .value_parser(clap::value_parser!(Url))
                        .conflicts_with("hosts-file"),
                )
                .arg(
                    arg!(-H --"hosts-file" <PATH>)
                        .required(false)
                        .help("Path to a newline-delimited file of URLs to crawl")
                        .value_parser(clap::value_parser!(std::path::PathBuf))
                        .conflicts_with("url"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save report to file (default: display to screen)")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json, markdown")
                        .value_parser(["text", "json", "markdown"])
                        .default_value("text"),
                ),
        ))
        .subcommand(crawl_tuning_args(
            command!("scrape")
                .about("Crawl a site and keep the pages relevant to your instructions as documents.")
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(true)
                        .help("The URL to start from")
                        .value_parser(clap::value_parser!(Url)),
                )
                .arg(
                    arg!(-i --"instructions" <TEXT>)
                        .required(true)
                        .help("What you are looking for, in plain words"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Write documents as JSON to this file (default: print to stdout)")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(--"offline")
                        .required(false)
                        .help("Use local keyword matching instead of a language model")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"api-key" <KEY>)
                        .required(false)
                        .help("API key for the language model")
                        .env(API_KEY_ENV)
                        .hide_env_values(true),
                )
                .arg(
                    arg!(--"model" <MODEL>)
                        .required(false)
                        .help("Chat model used for keywords and relevance")
                        .default_value(DEFAULT_MODEL),
                ),
        ))
}
