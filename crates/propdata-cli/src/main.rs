//! `propdata` command line tool

use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, Command};
use propdata_cli::{catalog, fixture, inspect, intern_stress, HOST_NAMES};
use propdata_core::{DataConfig, DataService};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("propdata")
        .version(propdata_core::VERSION)
        .about("Inspect the propdata property layer")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .subcommand(
            Command::new("catalog")
                .about("List keys, bundle kinds and host kinds")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
        .subcommand(
            Command::new("inspect")
                .about("Read every property of a sample host")
                .arg(
                    Arg::new("host")
                        .required(true)
                        .value_parser(HOST_NAMES)
                        .help("Sample host to inspect"),
                ),
        )
        .subcommand(
            Command::new("intern-stress")
                .about("Intern values from many threads and check canonical identity")
                .arg(
                    Arg::new("threads")
                        .long("threads")
                        .default_value("8")
                        .value_parser(value_parser!(usize))
                        .help("Worker threads"),
                )
                .arg(
                    Arg::new("iterations")
                        .long("iterations")
                        .default_value("100000")
                        .value_parser(value_parser!(usize))
                        .help("Interning calls"),
                ),
        )
}

fn init_tracing(config: &DataConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let matches = cli().get_matches();

    let config = match matches.get_one::<PathBuf>("config") {
        Some(path) => DataConfig::from_path(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => DataConfig::default(),
    };
    init_tracing(&config);

    let service = DataService::builtin(config).context("building data service")?;

    match matches.subcommand() {
        Some(("catalog", args)) => {
            let catalog = catalog(&service);
            if args.get_flag("json") {
                println!("{}", serde_json::to_string_pretty(&catalog)?);
            } else {
                println!("Keys");
                for key in &catalog.keys {
                    println!("  {} ({}, {}) default {}", key.id, key.shape, key.value_type, key.default);
                }
                println!();
                println!("Data kinds");
                for kind in &catalog.data_kinds {
                    println!("  {} [{}]", kind.id, kind.keys.join(", "));
                }
                println!();
                println!("Host kinds");
                for host in &catalog.host_kinds {
                    println!("  {}: {}", host.lineage.join(" < "), host.keys.join(", "));
                }
                println!();
                println!(
                    "{} value processors, {} data processors",
                    catalog.value_processors, catalog.data_processors
                );
            }
        }
        Some(("inspect", args)) => {
            let Some(name) = args.get_one::<String>("host") else {
                bail!("missing host");
            };
            let Some(host) = fixture(name) else {
                bail!("unknown host {name}");
            };
            let report = inspect(&service, &*host);
            println!("{}", report.lineage.join(" < "));
            for value in &report.values {
                println!("  {value}");
            }
            println!("bundles: {}", report.bundles.join(", "));
        }
        Some(("intern-stress", args)) => {
            let threads = args.get_one::<usize>("threads").copied().unwrap_or(8);
            let iterations = args.get_one::<usize>("iterations").copied().unwrap_or(100_000);

            let report = intern_stress(&service, threads, iterations)?;
            println!("Interning Stress Report:");
            println!("  Threads: {}", report.threads);
            println!("  Iterations: {}", report.iterations);
            println!("  Entries: {}", report.entries);
            println!("  Hits: {}", report.hits);
            println!("  Misses: {}", report.misses);
            println!("  Duplicates: {}", report.duplicates);

            std::process::exit(if report.passed() { 0 } else { 1 });
        }
        _ => unreachable!("subcommand is required"),
    }
    Ok(())
}
