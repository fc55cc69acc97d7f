use clap::{Parser, Subcommand};
use env_logger::Builder;
use log::LevelFilter;

mod asn1parse;
mod find;
mod input;
mod x509cmd;

use input::Inform;

/// dertree command-line tool for inspecting DER structures.
#[derive(Parser)]
#[command(name = "dertree")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Log decoder activity at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dump every element of a DER file.
    Asn1parse {
        /// Input file.
        #[arg(short, long)]
        input: String,
        /// Input format; detected from the content when omitted.
        #[arg(long, value_enum)]
        inform: Option<Inform>,
        /// Maximum nesting depth.
        #[arg(long, default_value_t = dertree_utils::asn1::DEFAULT_MAX_DEPTH)]
        max_depth: usize,
    },
    /// Display an X.509 certificate.
    X509 {
        /// Input file.
        #[arg(short, long)]
        input: String,
        /// Input format; detected from the content when omitted.
        #[arg(long, value_enum)]
        inform: Option<Inform>,
        /// Print full certificate details.
        #[arg(short, long)]
        text: bool,
    },
    /// Show the structure enclosing the first occurrence of an OID.
    Find {
        /// Input file.
        #[arg(short, long)]
        input: String,
        /// Input format; detected from the content when omitted.
        #[arg(long, value_enum)]
        inform: Option<Inform>,
        /// Object identifier in dotted form, e.g. 2.5.4.3.
        #[arg(long)]
        oid: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let mut builder = Builder::from_default_env();
    if cli.verbose {
        builder.filter_level(LevelFilter::Debug);
    } else if std::env::var_os("RUST_LOG").is_none() {
        builder.filter_level(LevelFilter::Warn);
    }
    builder.init();

    let result = match &cli.command {
        Commands::Asn1parse {
            input,
            inform,
            max_depth,
        } => asn1parse::run(input, *inform, *max_depth),
        Commands::X509 {
            input,
            inform,
            text,
        } => x509cmd::run(input, *inform, *text),
        Commands::Find { input, inform, oid } => find::run(input, *inform, oid),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_asn1parse_args() {
        let cli = Cli::try_parse_from([
            "dertree",
            "asn1parse",
            "-i",
            "cert.der",
            "--inform",
            "der",
            "--max-depth",
            "8",
        ])
        .unwrap();
        match cli.command {
            Commands::Asn1parse {
                input,
                inform,
                max_depth,
            } => {
                assert_eq!(input, "cert.der");
                assert_eq!(inform, Some(Inform::Der));
                assert_eq!(max_depth, 8);
            }
            _ => panic!("wrong subcommand"),
        }
    }

    #[test]
    fn test_parse_defaults() {
        let cli = Cli::try_parse_from(["dertree", "-v", "x509", "-i", "c.pem"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::X509 {
                inform: None,
                text: false,
                ..
            }
        ));
        let cli = Cli::try_parse_from(["dertree", "asn1parse", "-i", "x"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Asn1parse { max_depth: 64, .. }
        ));
    }

    #[test]
    fn test_find_requires_oid() {
        assert!(Cli::try_parse_from(["dertree", "find", "-i", "x"]).is_err());
    }
}
