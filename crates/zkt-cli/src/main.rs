//! # zkt CLI entry point
//!
//! Parses arguments, installs the tracing subscriber and dispatches to the
//! subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use zkt_cli::demo::{run_demo, DemoArgs};
use zkt_cli::keygen::{run_keygen, KeygenArgs};

/// Confidential token toolchain: Paillier-encrypted balances with
/// proof-gated registration, mint and transfer.
#[derive(Parser, Debug)]
#[command(name = "zkt", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    /// `RUST_LOG` takes precedence when set.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a YAML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a Paillier key pair and print the public key.
    Keygen(KeygenArgs),

    /// Run register, mint and transfer end to end in-process.
    Demo(DemoArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = match zkt_cli::load_config(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("{e:#}");
            return ExitCode::from(2);
        }
    };
    tracing::debug!(key_bits = config.key_bits, "configuration loaded");

    let result = match cli.command {
        Commands::Keygen(args) => run_keygen(&args, &config),
        Commands::Demo(args) => run_demo(&args, &config),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_keygen_bits() {
        let cli = Cli::try_parse_from(["zkt", "keygen", "--bits", "96"]).unwrap();
        match cli.command {
            Commands::Keygen(args) => assert_eq!(args.bits, Some(96)),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parse_demo_defaults() {
        let cli = Cli::try_parse_from(["zkt", "-vv", "demo"]).unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Demo(args) => {
                assert_eq!(args.mint, 1000);
                assert_eq!(args.transfer, 50);
                assert!(!args.json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_config_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["zkt", "demo", "--config", "zkt.yaml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("zkt.yaml")));
    }
}
