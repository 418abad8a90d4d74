mod render;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use powledger_core::{
    constants::DEFAULT_DIFFICULTY, pow, Chain, ChainConfig, Clock, FixedClock, MiningStrategy,
    SystemClock,
};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use render::{render_chain, validity_line};

#[derive(Parser, Debug)]
#[command(name = "powledger")]
#[command(about = "Build and audit an in-memory proof-of-work chain")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Mine the two-block demonstration chain, print it and check it
    Demo {
        #[command(flatten)]
        chain: ChainArgs,
    },
    /// Mine each payload, in order, onto a fresh chain
    Mine {
        #[command(flatten)]
        chain: ChainArgs,
        /// Print the chain as JSON instead of text
        #[arg(long)]
        json: bool,
        /// Block payloads
        #[arg(required = true)]
        payloads: Vec<String>,
    },
    /// Print the SHA-256 of an input and its leading zeros
    Hash {
        input: String,
    },
}

#[derive(Args, Debug)]
struct ChainArgs {
    /// Leading zero hex digits required of each mined hash
    #[arg(long, env = "POWLEDGER_DIFFICULTY", default_value_t = DEFAULT_DIFFICULTY)]
    difficulty: usize,

    /// Give up on a block after this many hashes
    #[arg(long, env = "POWLEDGER_MAX_ATTEMPTS")]
    max_attempts: Option<u64>,

    /// Search nonces on all cores
    #[arg(long, env = "POWLEDGER_PARALLEL")]
    parallel: bool,

    /// Stamp every block with this Unix time instead of the wall clock
    #[arg(long)]
    timestamp: Option<u64>,
}

impl ChainArgs {
    fn config(&self) -> ChainConfig {
        let strategy = if self.parallel {
            MiningStrategy::Parallel
        } else {
            MiningStrategy::Sequential
        };
        ChainConfig::default()
            .with_difficulty(self.difficulty)
            .with_max_attempts(self.max_attempts)
            .with_strategy(strategy)
    }
}

fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Demo { chain } => match chain.timestamp {
            Some(ts) => demo(&chain, FixedClock(ts)),
            None => demo(&chain, SystemClock),
        },
        Command::Mine {
            chain,
            json,
            payloads,
        } => match chain.timestamp {
            Some(ts) => mine(&chain, FixedClock(ts), &payloads, json),
            None => mine(&chain, SystemClock, &payloads, json),
        },
        Command::Hash { input } => {
            let hash = pow::sha256_hex(input.as_bytes());
            println!("sha256: {hash}");
            println!("leading zero digits: {}", pow::leading_zero_digits(&hash));
            println!("leading zero bits: {}", pow::leading_zero_bits(&hash));
            Ok(())
        }
    }
}

fn open_chain<C: Clock>(args: &ChainArgs, clock: C) -> Result<Chain<C>> {
    let config = args.config();
    info!(difficulty = config.difficulty, "opening chain");
    Chain::with_clock(config, clock).context("invalid chain configuration")
}

fn demo<C: Clock>(args: &ChainArgs, clock: C) -> Result<()> {
    let mut chain = open_chain(args, clock)?;

    println!("Mining Genesis Block...");
    chain
        .try_append("First Block Data")
        .context("mining the first block")?;
    println!("Mining Second Block...");
    chain
        .try_append("Second Block Data")
        .context("mining the second block")?;

    println!();
    println!("Blockchain:");
    println!("{}", render_chain(&chain));
    println!("{}", validity_line(&chain.validate()));
    Ok(())
}

fn mine<C: Clock>(args: &ChainArgs, clock: C, payloads: &[String], json: bool) -> Result<()> {
    let mut chain = open_chain(args, clock)?;
    for payload in payloads {
        let index = chain.len();
        chain
            .try_append(payload.as_str())
            .with_context(|| format!("mining block #{index}"))?;
    }

    let validity = chain.validate();
    if json {
        let out = serde_json::json!({
            "difficulty": chain.difficulty(),
            "valid": validity.is_ok(),
            "blocks": chain.blocks(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{}", render_chain(&chain));
        println!("{}", validity_line(&validity));
    }
    Ok(())
}
