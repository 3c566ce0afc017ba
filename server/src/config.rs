//! Command-line and environment configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use clap::Parser;
use todo_core::ContractKind;

use crate::logging::{LogConfig, LogFormat};

pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Parser)]
#[command(name = "todo-server", version, about = "In-memory todo API server")]
pub struct Cli {
    /// Address to bind.
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: IpAddr,

    #[arg(long, short, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Route table to serve: `patch` or `put`.
    #[arg(long, env = "TODO_CONTRACT", default_value = "patch")]
    pub contract: ContractKind,

    /// Start with an empty store instead of the demo items.
    #[arg(long)]
    pub no_seed: bool,

    /// Log filter directive; `RUST_LOG` takes precedence.
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub contract: ContractKind,
    pub seed: bool,
    pub log: LogConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), DEFAULT_PORT),
            contract: ContractKind::default(),
            seed: true,
            log: LogConfig::default(),
        }
    }
}

impl From<Cli> for ServerConfig {
    fn from(cli: Cli) -> Self {
        Self {
            addr: SocketAddr::new(cli.host, cli.port),
            contract: cli.contract,
            seed: !cli.no_seed,
            log: LogConfig {
                level: cli.log_level,
                format: cli.log_format,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> ServerConfig {
        let argv = std::iter::once("todo-server").chain(args.iter().copied());
        Cli::try_parse_from(argv).unwrap().into()
    }

    #[test]
    fn explicit_flags_override_defaults() {
        let config = parse(&[
            "--host",
            "0.0.0.0",
            "--port",
            "8080",
            "--contract",
            "put",
            "--no-seed",
            "--log-level",
            "debug",
            "--log-format",
            "json",
        ]);
        assert_eq!(config.addr, "0.0.0.0:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(config.contract, ContractKind::Put);
        assert!(!config.seed);
        assert_eq!(config.log.level, "debug");
        assert_eq!(config.log.format, LogFormat::Json);
    }

    #[test]
    fn contract_is_case_insensitive() {
        let config = parse(&["--contract", "PATCH"]);
        assert_eq!(config.contract, ContractKind::Patch);
    }

    #[test]
    fn unknown_contract_is_rejected() {
        let argv = ["todo-server", "--contract", "post"];
        assert!(Cli::try_parse_from(argv).is_err());
    }

    #[test]
    fn default_config_seeds_patch_on_localhost() {
        let config = ServerConfig::default();
        assert_eq!(config.addr.port(), DEFAULT_PORT);
        assert!(config.addr.ip().is_loopback());
        assert_eq!(config.contract, ContractKind::Patch);
        assert!(config.seed);
    }
}
