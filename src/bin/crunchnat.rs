//! CLI driver for the CrunchNAT core.
//!
//! A thin collaborator: it parses arguments, calls into [`crunchnat`], and
//! prints the result. It carries no correctness requirements of its own
//! beyond faithfully reporting what the core returns, and its exit code is
//! zero on success and non-zero on any error the core raises.

use std::process::ExitCode;

use clap::{Parser, Subcommand};

use crunchnat::{CrunchNat, Ipv4Address};

#[derive(Parser)]
#[command(
    name = "crunchnat",
    about = "Forward and reverse mapping of ip:port tuples through the CrunchNAT algorithm"
)]
struct Cli {
    /// CrunchNAT algorithm.
    #[arg(short, long, default_value = "secure")]
    algo: String,

    /// External (public) network, in CIDR notation.
    #[arg(value_name = "external/net")]
    external: String,

    /// Internal (private) network, in CIDR notation.
    #[arg(value_name = "internal/net")]
    internal: String,

    /// Prime `p` used by the `secure` algorithm.
    #[arg(long = "secure-p")]
    secure_p: Option<u32>,

    /// Prime `q` used by the `secure` algorithm.
    #[arg(long = "secure-q")]
    secure_q: Option<u32>,

    /// Exponent `e` used by the `secure` algorithm.
    #[arg(long = "secure-e")]
    secure_e: Option<u32>,

    /// Increase logging verbosity (repeatable).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Validate the algorithm against the provided external/internal networks.
    Validate,
    /// Map an internal address to external address:[port list].
    Forward {
        /// Internal host address.
        address: String,
    },
    /// Map an external address:port to an internal address.
    Reverse {
        /// `address:port`, e.g. `192.0.2.0:3600`.
        address_port: String,
    },
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();
}

fn secure_keys(cli: &Cli) -> Option<(u32, u32, u32)> {
    match (cli.secure_p, cli.secure_q, cli.secure_e) {
        (None, None, None) => None,
        (p, q, e) => Some((
            p.unwrap_or(crunchnat::rsa::DEFAULT_P),
            q.unwrap_or(crunchnat::rsa::DEFAULT_Q),
            e.unwrap_or(crunchnat::rsa::DEFAULT_E),
        )),
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let crunch = CrunchNat::new(&cli.external, &cli.internal, &cli.algo, secure_keys(&cli))?;

    match cli.command {
        None => {
            println!("Hosts per external: {}", crunch.hosts_per_external());
            println!("Ports per host: {}", crunch.ports_per_host());
        }
        Some(Command::Validate) => {
            let collisions = crunch.check_forward_collisions();
            if collisions.is_empty() {
                println!("Forward collisions: None");
            } else {
                println!(
                    "Forward collisions: {}",
                    collisions
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(", ")
                );
            }
            let bijective = crunch.check_bijection(None);
            println!("Bijective: {bijective}");
            if !collisions.is_empty() || !bijective {
                anyhow::bail!("parameter validation failed");
            }
        }
        Some(Command::Forward { address }) => {
            let address: Ipv4Address = address
                .parse()
                .map_err(|_| anyhow::anyhow!("invalid internal address: {address}"))?;
            let (external, ports) = crunch.forward(address)?;
            println!("{external}: {:?}", ports.to_vec());
        }
        Some(Command::Reverse { address_port }) => {
            let (address, port) = address_port
                .rsplit_once(':')
                .ok_or_else(|| anyhow::anyhow!("expected address:port, got {address_port:?}"))?;
            let address: Ipv4Address = address
                .parse()
                .map_err(|_| anyhow::anyhow!("invalid external address: {address}"))?;
            let port: u16 = port
                .parse()
                .map_err(|_| anyhow::anyhow!("invalid port: {port}"))?;
            println!("{}", crunch.reverse(address, port)?);
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
