use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

use alloy::primitives::{utils::format_ether, Address};
use clap::{error::ErrorKind, Args, Parser, Subcommand, ValueEnum};
use eyre::{bail, Result};

use oapp_read::{
    deploy::{deploy_read_app, AppArtifacts, ChainDeployer},
    fee::{FeePolicy, DEFAULT_MARGIN_BPS},
    graph::{self, OmniGraph},
    read::{read_from_env, EXECUTOR_GAS, EXECUTOR_RESPONSE_SIZE, READ_CHANNEL_ID},
    wire::wire_pair,
    Config, OAppRead, ReadPlan,
};

#[derive(Parser)]
#[command(name = "oapp-read")]
#[command(about = "Deploy, wire and exercise lzRead apps on Sepolia and Base Sepolia", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the omni-graph declaration, or validate a graph file
    Graph {
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Deploy the read app and its verifier
    Deploy {
        #[arg(long, value_enum, default_value_t = Target::Both)]
        chain: Target,

        #[arg(long, default_value = "artifacts/contracts/MyOAppRead.sol/MyOAppRead.json")]
        app_artifact: PathBuf,

        #[arg(long, default_value = "artifacts/contracts/Verifier.sol/Verifier.json")]
        verifier_artifact: PathBuf,
    },

    /// Set peers and enable the read channel on both apps, skipping
    /// anything already configured
    Wire {
        #[command(flatten)]
        apps: AppAddresses,

        #[arg(long, default_value_t = READ_CHANNEL_ID)]
        channel: u32,
    },

    /// Send a read request from the Base Sepolia app against the Sepolia app
    Read {
        #[command(flatten)]
        apps: AppAddresses,

        /// Value attached to `send` as a share of the quote, in basis points
        #[arg(long, default_value_t = DEFAULT_MARGIN_BPS)]
        fee_margin_bps: u32,

        /// Quote again right before sending and abort if the fee moved past
        /// the attached value
        #[arg(long)]
        requote: bool,

        #[arg(long, default_value_t = EXECUTOR_GAS)]
        gas: u128,

        #[arg(long, default_value_t = EXECUTOR_RESPONSE_SIZE)]
        response_size: u32,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Target {
    Sepolia,
    BaseSepolia,
    Both,
}

#[derive(Args)]
struct AppAddresses {
    /// App deployed on Sepolia (read target)
    #[arg(long, env = "SEPOLIA_OAPP")]
    sepolia_app: Address,

    /// App deployed on Base Sepolia (sender)
    #[arg(long, env = "BASE_SEPOLIA_OAPP")]
    base_sepolia_app: Address,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async_main())
}

async fn async_main() -> Result<()> {
    let dotenv = dotenvy::dotenv();
    init_logging();

    if let Ok(path) = dotenv {
        tracing::debug!("Loaded .env from {:?}", path);
    }
    let cli = parse_args(std::env::args_os())?;

    match cli.command {
        Command::Graph { file } => graph_command(file.as_deref()),
        Command::Deploy {
            chain,
            app_artifact,
            verifier_artifact,
        } => {
            let config = Config::load()?;
            let artifacts = AppArtifacts::load(&app_artifact, &verifier_artifact)?;
            deploy_command(&config, chain, &artifacts).await
        }
        Command::Wire { apps, channel } => {
            let config = Config::load()?;
            wire_command(&config, &apps, channel).await
        }
        Command::Read {
            apps,
            fee_margin_bps,
            requote,
            gas,
            response_size,
        } => {
            let plan = ReadPlan {
                executor_gas: gas,
                executor_response_size: response_size,
                fee: FeePolicy::new(fee_margin_bps, requote),
                ..ReadPlan::default()
            };
            read_command(&apps, plan).await
        }
    }
}

/// Parses `args`, returning usage errors instead of exiting so they leave
/// `main` like any other error. Help and version output still exit 0.
fn parse_args<I, T>(args: I) -> Result<Cli>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Cli::try_parse_from(args) {
        Ok(cli) => Ok(cli),
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(err) => Err(err.into()),
    }
}

fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,oapp_read=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn graph_command(file: Option<&Path>) -> Result<()> {
    let graph = match file {
        Some(path) => OmniGraph::from_path(path)?,
        None => graph::declaration(),
    };

    let issues = graph.validate();
    if !issues.is_empty() {
        for issue in &issues {
            eprintln!("{issue}");
        }
        bail!("graph has {} issue(s)", issues.len());
    }

    println!("{}", graph.to_json_pretty()?);
    Ok(())
}

async fn deploy_command(config: &Config, target: Target, artifacts: &AppArtifacts) -> Result<()> {
    let delegate = config.signer.address();

    if matches!(target, Target::Sepolia | Target::Both) {
        let deployer = ChainDeployer::new(
            config.sepolia.connect(config.signer.clone())?,
            config.confirmation_timeout,
        );
        let deployed = deploy_read_app(&config.sepolia, &deployer, delegate, artifacts).await?;
        println!(
            "sepolia: app {} verifier {}",
            deployed.app, deployed.verifier
        );
    }

    if matches!(target, Target::BaseSepolia | Target::Both) {
        let deployer = ChainDeployer::new(
            config.base_sepolia.connect(config.signer.clone())?,
            config.confirmation_timeout,
        );
        let deployed =
            deploy_read_app(&config.base_sepolia, &deployer, delegate, artifacts).await?;
        println!(
            "base-sepolia: app {} verifier {}",
            deployed.app, deployed.verifier
        );
    }

    Ok(())
}

async fn wire_command(config: &Config, apps: &AppAddresses, channel: u32) -> Result<()> {
    let sepolia = OAppRead::new(
        config.sepolia.eid,
        apps.sepolia_app,
        config.sepolia.connect(config.signer.clone())?,
        config.confirmation_timeout,
    );
    let base_sepolia = OAppRead::new(
        config.base_sepolia.eid,
        apps.base_sepolia_app,
        config.base_sepolia.connect(config.signer.clone())?,
        config.confirmation_timeout,
    );

    let sent = wire_pair(&sepolia, &base_sepolia, channel, &config.retry).await?;
    println!("wiring complete, {sent} transaction(s) sent");
    Ok(())
}

async fn read_command(apps: &AppAddresses, plan: ReadPlan) -> Result<()> {
    let outcome = read_from_env(
        |key| std::env::var(key).ok(),
        plan,
        |config| -> Result<_> {
            let sender = OAppRead::new(
                config.base_sepolia.eid,
                apps.base_sepolia_app,
                config.base_sepolia.connect(config.signer.clone())?,
                config.confirmation_timeout,
            );
            let target = OAppRead::new(
                config.sepolia.eid,
                apps.sepolia_app,
                config.sepolia.connect(config.signer.clone())?,
                config.confirmation_timeout,
            );
            Ok((sender, target))
        },
    )
    .await?;

    println!("Estimated native fee: {}", format_ether(outcome.quoted.native_fee));
    println!("Attached value: {}", format_ether(outcome.paid));
    println!("Transaction confirmed, hash: {}", outcome.tx_hash);
    println!("Data in sepolia app: {}", outcome.target_data);
    println!("Data in base-sepolia app: {}", outcome.sender_data);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEPOLIA_APP: &str = "0x243B4e190C2dE6ede18b04E5e1412A448fD28292";
    const BASE_SEPOLIA_APP: &str = "0xB0d58E2d42A003e5a5CfCf3766aa7cf4Ea2281c6";

    #[test]
    fn missing_app_address_is_returned_as_error() {
        std::env::remove_var("SEPOLIA_OAPP");

        let err = parse_args(["oapp-read", "read", "--base-sepolia-app", BASE_SEPOLIA_APP])
            .err()
            .expect("parse should fail");
        let clap_err = err.downcast_ref::<clap::Error>().expect("clap error");
        assert_eq!(clap_err.kind(), ErrorKind::MissingRequiredArgument);
        assert!(clap_err.to_string().contains("--sepolia-app"));
    }

    #[test]
    fn malformed_address_is_returned_as_error() {
        let err = parse_args([
            "oapp-read",
            "wire",
            "--sepolia-app",
            "0x1234",
            "--base-sepolia-app",
            BASE_SEPOLIA_APP,
        ])
        .err()
        .expect("parse should fail");
        assert_eq!(
            err.downcast_ref::<clap::Error>().map(|e| e.kind()),
            Some(ErrorKind::ValueValidation)
        );
    }

    #[test]
    fn missing_subcommand_is_returned_as_error() {
        assert!(parse_args(["oapp-read"]).is_err());
    }

    #[test]
    fn read_arguments_reach_the_plan() {
        let cli = parse_args([
            "oapp-read",
            "read",
            "--sepolia-app",
            SEPOLIA_APP,
            "--base-sepolia-app",
            BASE_SEPOLIA_APP,
            "--fee-margin-bps",
            "15000",
            "--requote",
        ])
        .unwrap();

        match cli.command {
            Command::Read {
                apps,
                fee_margin_bps,
                requote,
                gas,
                ..
            } => {
                assert_eq!(apps.sepolia_app.to_string(), SEPOLIA_APP);
                assert_eq!(fee_margin_bps, 15_000);
                assert!(requote);
                assert_eq!(gas, EXECUTOR_GAS);
            }
            _ => panic!("expected the read command"),
        }
    }
}
