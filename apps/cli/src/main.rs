//! KolEscrow CLI
//!
//! Command-line front end for distribution trees, proofs and epoch
//! finalization. Requests are JSON files (`-` reads stdin); results are
//! printed as JSON on stdout, logs go to stderr.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use tracing::info;

use kolescrow_app::{App, AppBuilder};
use kolescrow_crypto::AttesterKeypair;
use kolescrow_finalize::{FinalizationParams, FinalizeRequest, SignRequest};
use kolescrow_merkle::{
    leaf_hash, secure_hash, BuildTreeRequest, GenerateProofRequest, SecureHashInput,
    VerifyRequest, LEAF_TAG,
};

/// KolEscrow - reward pool distribution commitments
#[derive(Parser)]
#[command(name = "kolescrow")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Settings file (defaults to ~/.kolescrow/settings.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Escrow contract address, overriding settings
    #[arg(long, global = true, env = "KOLESCROW_CONTRACT_ADDRESS")]
    contract_address: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the distribution tree: {pool_id, epoch, distribution_data}
    BuildTree {
        /// Request file, or - for stdin
        input: PathBuf,
    },

    /// Generate the inclusion proof for one account
    Proof {
        /// Request file with {pool_id, epoch, distribution_data}, or - for stdin
        input: PathBuf,

        /// Account to prove
        #[arg(short, long)]
        account: String,
    },

    /// Verify an inclusion proof
    Verify {
        /// Verify request file, or - for stdin
        input: PathBuf,
    },

    /// Compute a single leaf encoding stage
    Hash {
        #[command(subcommand)]
        stage: HashStage,
    },

    /// Compute the finalization domain hash
    DomainHash {
        /// Finalization parameters file, or - for stdin
        input: PathBuf,
    },

    /// Sign a message hash with the attester key
    Sign {
        /// Message hash as hex, with or without 0x
        #[arg(short, long)]
        message_hash: String,

        #[arg(long, env = "SIGNER_PRIVATE_KEY", hide_env_values = true)]
        private_key: Option<String>,
    },

    /// Compute the domain hash and sign it
    Finalize {
        /// Finalization request file, or - for stdin
        input: PathBuf,

        #[arg(long, env = "SIGNER_PRIVATE_KEY", hide_env_values = true)]
        private_key: Option<String>,
    },

    /// Show the Ethereum address of the attester key
    Address {
        #[arg(long, env = "SIGNER_PRIVATE_KEY", hide_env_values = true)]
        private_key: Option<String>,
    },
}

#[derive(Subcommand)]
enum HashStage {
    /// Stage one: LEAF_TAG,pool_id,epoch,index,account,shares,amount
    Secure {
        #[arg(long)]
        pool_id: u64,
        #[arg(long)]
        epoch: u64,
        #[arg(long)]
        index: u64,
        #[arg(long)]
        account: String,
        #[arg(long)]
        shares: u128,
        #[arg(long)]
        amount: u128,
        #[arg(long, default_value = LEAF_TAG)]
        leaf_tag: String,
        /// Leading elements to hash
        #[arg(long)]
        fields: Option<usize>,
    },

    /// Stage two: account,secure_hash
    Leaf {
        #[arg(long)]
        account: String,
        #[arg(long)]
        secure_hash: String,
        /// Leading elements to hash
        #[arg(long)]
        fields: Option<usize>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize app with standard startup sequence
    let mut builder = AppBuilder::new()
        .name("kolescrow")
        .version(env!("CARGO_PKG_VERSION"))
        .verbose(cli.verbose);
    if let Some(path) = cli.config {
        builder = builder.config_path(path);
    }
    if let Some(address) = cli.contract_address {
        builder = builder.contract_address(address);
    }
    if !cli.verbose {
        builder = builder.skip_banner();
    }
    let app = builder.build().context("Failed to initialize")?;

    match cli.command {
        Commands::BuildTree { input } => build_tree(&app, &input),
        Commands::Proof { input, account } => proof(&app, &input, account),
        Commands::Verify { input } => verify(&app, &input),
        Commands::Hash { stage } => hash(&app, stage),
        Commands::DomainHash { input } => domain_hash(&app, &input),
        Commands::Sign {
            message_hash,
            private_key,
        } => sign(&app, message_hash, private_key),
        Commands::Finalize { input, private_key } => finalize(&app, &input, private_key),
        Commands::Address { private_key } => address(&app, private_key),
    }
}

// ============================================================================
// Merkle Commands
// ============================================================================

fn build_tree(app: &App, input: &Path) -> Result<()> {
    let request: BuildTreeRequest = read_request(input)?;
    info!(
        "Building tree for pool {} epoch {} ({} records)",
        request.pool_id,
        request.epoch,
        request.distribution_data.len()
    );
    let response = app.distributor().build_tree(request)?;
    print_json(&response)
}

fn proof(app: &App, input: &Path, account: String) -> Result<()> {
    let request: BuildTreeRequest = read_request(input)?;
    let response = app
        .distributor()
        .generate_proof(GenerateProofRequest {
            pool_id: request.pool_id,
            epoch: request.epoch,
            distribution_data: request.distribution_data,
            account,
        })?;
    print_json(&response)
}

fn verify(app: &App, input: &Path) -> Result<()> {
    let request: VerifyRequest = read_request(input)?;
    let response = app.distributor().verify_request(&request)?;
    print_json(&response)
}

fn hash(app: &App, stage: HashStage) -> Result<()> {
    let encoding = *app.distributor().encoding();
    match stage {
        HashStage::Secure {
            pool_id,
            epoch,
            index,
            account,
            shares,
            amount,
            leaf_tag,
            fields,
        } => {
            let input = SecureHashInput {
                leaf_tag: &leaf_tag,
                pool_id,
                epoch,
                index,
                account: &account,
                shares,
                amount,
            };
            let hash = secure_hash(&input, fields.unwrap_or(encoding.secure_hash_fields));
            print_json(&json!({ "secure_hash": hash }))
        }
        HashStage::Leaf {
            account,
            secure_hash,
            fields,
        } => {
            let hash = leaf_hash(&account, &secure_hash, fields.unwrap_or(encoding.leaf_hash_fields));
            print_json(&json!({ "leaf_hash": hash }))
        }
    }
}

// ============================================================================
// Finalization Commands
// ============================================================================

fn domain_hash(app: &App, input: &Path) -> Result<()> {
    let params: FinalizationParams = read_request(input)?;
    let response = app.finalizer()?.domain_hash_request(&params)?;
    print_json(&response)
}

fn sign(app: &App, message_hash: String, private_key: Option<String>) -> Result<()> {
    let request = SignRequest {
        message_hash,
        private_key,
    };
    let response = app.finalizer()?.sign_request(&request, app.signer_key())?;
    print_json(&response)
}

fn finalize(app: &App, input: &Path, private_key: Option<String>) -> Result<()> {
    let mut request: FinalizeRequest = read_request(input)?;
    if request.private_key.is_none() {
        request.private_key = private_key;
    }
    let finalized = app
        .finalizer()?
        .finalize_request(&request, app.signer_key())?;
    print_json(&finalized)
}

fn address(app: &App, private_key: Option<String>) -> Result<()> {
    let key = private_key
        .as_deref()
        .or(app.signer_key())
        .context("No private key: pass --private-key or set SIGNER_PRIVATE_KEY")?;
    let keypair = AttesterKeypair::from_hex(key).context("Invalid private key")?;
    print_json(&json!({ "address": keypair.address_hex() }))
}

// ============================================================================
// I/O
// ============================================================================

fn read_request<T: DeserializeOwned>(input: &Path) -> Result<T> {
    let content = if input == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        buf
    } else {
        std::fs::read_to_string(input)
            .with_context(|| format!("Failed to read {}", input.display()))?
    };
    serde_json::from_str(&content).context("Malformed request JSON")
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
