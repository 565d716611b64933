use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;
use svgnft::config::{parse_chain_id, NetworkTable, LOCALHOST_CHAIN_ID};
use svgnft::{provision, Artifact, MintJob, RpcClient, SeedContent};

/// Deploy the SVG NFT contract, mint one token from an SVG file and print its token URI
#[derive(Debug, Parser)]
#[command(name = "svgnft", version, about)]
struct Cli {
    /// Target chain id, decimal or 0x hex
    #[arg(long, default_value_t = LOCALHOST_CHAIN_ID, value_parser = parse_chain_id)]
    chain_id: u64,

    /// TOML file with additional or replacement networks
    #[arg(long)]
    config: Option<PathBuf>,

    /// Compiled contract artifact (Hardhat JSON)
    #[arg(long, default_value = "artifacts/SVGNFT.json")]
    artifact: PathBuf,

    /// SVG file to mint
    #[arg(long, default_value = "images/star.svg")]
    svg: PathBuf,

    /// Deployment cache directory for networks that save deployments
    #[arg(long, default_value = "deployments")]
    deployments: PathBuf,
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(&Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let networks = NetworkTable::load(cli.config.as_deref())
        .context("could not load network configuration")?;
    let artifact = Artifact::from_file(&cli.artifact)
        .with_context(|| format!("could not load artifact {}", cli.artifact.display()))?;
    let seed = SeedContent::from_file(&cli.svg)
        .with_context(|| format!("could not read {}", cli.svg.display()))?;
    let job = MintJob::new(artifact, seed).with_deployments_dir(&cli.deployments);

    info!("---------------");
    let outcome = provision(
        &networks,
        cli.chain_id,
        |key| std::env::var(key).ok(),
        RpcClient::from_context,
        &job,
    )?;

    let token_index = outcome.mint.token_index;
    outcome
        .into_result()
        .map(drop)
        .with_context(|| format!("token {token_index} minted but report incomplete"))
}
