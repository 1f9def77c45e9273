//! rideproof: command-line driver for the RideProof trip engine.
//!
//! Each invocation:
//!   1. Opens (or initialises) the state database
//!   2. Applies genesis if the DB holds no configuration yet
//!   3. Runs one engine operation as `--caller` at logical time `--height`
//!   4. Prints the result as JSON on stdout
//!
//! A rejected operation prints `{"ok":false,...}` and exits with status 2.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use tracing::{info, warn};

use rideproof_core::error::RideError;
use rideproof_core::types::{CallContext, Identity, LogicalTime, TripId};
use rideproof_genesis::{apply_genesis, GenesisParams};
use rideproof_query::TripQuery;
use rideproof_state::{StateDb, TripEngine, TripStore};

type Engine = TripEngine<StateDb, StateDb>;

#[derive(Parser, Debug)]
#[command(
    name = "rideproof",
    version,
    about = "RideProof — trip verification and reward engine"
)]
struct Args {
    /// Directory for the persistent state database.
    #[arg(long, global = true, default_value = "~/.rideproof/data")]
    data_dir: PathBuf,

    /// Identity making the call.
    #[arg(long, global = true)]
    caller: Option<String>,

    /// Logical time of the call (defaults to current Unix seconds).
    #[arg(long, global = true)]
    height: Option<LogicalTime>,

    /// Path to genesis params JSON (only read on first run).
    #[arg(long, global = true)]
    genesis: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply genesis (if needed) and print the configuration.
    Init,
    /// Propose a new trip.
    Initiate {
        #[arg(long)]
        driver: String,
        /// Comma-separated passenger identities.
        #[arg(long, value_delimiter = ',')]
        passengers: Vec<String>,
        #[arg(long)]
        route: String,
        #[arg(long)]
        start: LogicalTime,
    },
    /// Submit the oracle attestation for a trip (trusted oracle only).
    SubmitOracle {
        trip_id: TripId,
        #[arg(long, action = clap::ArgAction::Set, default_value_t = true)]
        gps_valid: bool,
        #[arg(long)]
        distance: u64,
        #[arg(long)]
        congestion: u32,
        #[arg(long)]
        end: LogicalTime,
    },
    /// Confirm a trip as its driver or a passenger.
    Confirm { trip_id: TripId },
    /// Verify a trip and mint its reward (driver only).
    Verify { trip_id: TripId },
    /// Raise a dispute on a pending trip.
    Dispute {
        trip_id: TripId,
        #[arg(long)]
        reason: String,
    },
    SetOracle { oracle: String },
    SetToken { contract: String },
    SetRate { rate: u64 },
    SetMultiplier { multiplier: u64 },
    SetMaxTrips { max_trips: u64 },
    /// Print a trip record.
    Trip { trip_id: TripId },
    /// Print the latest oracle submission for a trip.
    Oracle { trip_id: TripId },
    /// Print the number of trips created.
    Count,
    /// One-line summary of a trip.
    Describe { trip_id: TripId },
    /// Print every recorded reward mint.
    Mints,
    /// Compute the reward under the current configuration.
    Reward {
        #[arg(long)]
        distance: u64,
        #[arg(long)]
        passengers: usize,
        #[arg(long)]
        congestion: u32,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,rideproof=debug")),
        )
        .init();

    let args = Args::parse();

    // ── State database ────────────────────────────────────────────────────────
    let data_dir = expand_tilde(&args.data_dir);
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("creating data dir {}", data_dir.display()))?;
    let mut db = StateDb::open(&data_dir).context("opening state database")?;

    // ── Genesis if fresh ──────────────────────────────────────────────────────
    if db.get_config().context("reading configuration")?.is_none() {
        info!("fresh database — applying genesis");
        let params = load_genesis_params(args.genesis.as_deref(), args.caller.as_deref())?;
        apply_genesis(&mut db, &params).context("applying genesis")?;
    }

    let engine: Engine = TripEngine::open(db.clone(), db.clone()).context("opening trip engine")?;
    let now = args
        .height
        .unwrap_or_else(|| chrono::Utc::now().timestamp().max(0) as LogicalTime);

    let outcome = execute(&engine, &db, &args, now);
    db.flush().context("flushing state database")?;

    match outcome? {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        Err(e) => {
            warn!(code = e.code(), error = %e, "operation rejected");
            println!("{}", json!({ "ok": false, "code": e.code(), "error": e.to_string() }));
            eprintln!("error {}: {}", e.code(), e);
            std::process::exit(2);
        }
    }
}

/// Run the selected command. The outer `Result` carries usage problems
/// (missing `--caller`); the inner one carries engine rejections.
fn execute(
    engine: &Engine,
    db: &StateDb,
    args: &Args,
    now: LogicalTime,
) -> anyhow::Result<Result<Value, RideError>> {
    let ctx = || -> anyhow::Result<CallContext> {
        let caller = args
            .caller
            .as_deref()
            .context("--caller is required for this command")?;
        Ok(CallContext::new(caller, now))
    };
    let ack = |r: Result<(), RideError>| r.map(|()| json!({ "ok": true, "value": true }));

    let result = match &args.command {
        Command::Init => engine.config().map(|c| json!(c)),
        Command::Initiate { driver, passengers, route, start } => engine
            .initiate_trip(
                &ctx()?,
                Identity::from(driver.as_str()),
                passengers.iter().map(|p| Identity::from(p.as_str())).collect(),
                route.clone(),
                *start,
            )
            .map(|id| json!({ "ok": true, "value": id })),
        Command::SubmitOracle { trip_id, gps_valid, distance, congestion, end } => ack(engine
            .submit_oracle_data(&ctx()?, *trip_id, *gps_valid, *distance, *congestion, *end)),
        Command::Confirm { trip_id } => engine
            .confirm_trip(&ctx()?, *trip_id)
            .map(|n| json!({ "ok": true, "value": true, "confirmations": n })),
        Command::Verify { trip_id } => engine
            .verify_trip(&ctx()?, *trip_id)
            .map(|reward| json!({ "ok": true, "value": reward.to_string() })),
        Command::Dispute { trip_id, reason } => {
            ack(engine.dispute_trip(&ctx()?, *trip_id, reason.clone()))
        }
        Command::SetOracle { oracle } => {
            ack(engine.set_trusted_oracle(&ctx()?, Identity::from(oracle.as_str())))
        }
        Command::SetToken { contract } => {
            ack(engine.set_token_contract(&ctx()?, Identity::from(contract.as_str())))
        }
        Command::SetRate { rate } => ack(engine.set_base_reward_rate(&ctx()?, *rate)),
        Command::SetMultiplier { multiplier } => {
            ack(engine.set_congestion_multiplier(&ctx()?, *multiplier))
        }
        Command::SetMaxTrips { max_trips } => ack(engine.set_max_trips(&ctx()?, *max_trips)),
        Command::Trip { trip_id } => engine
            .get_trip(*trip_id)
            .and_then(|t| t.ok_or(RideError::TripNotFound(*trip_id)))
            .map(|t| json!(t)),
        Command::Oracle { trip_id } => match engine.get_oracle_submission(*trip_id) {
            Ok(Some(s)) => Ok(json!(s)),
            Ok(None) => match engine.get_trip(*trip_id) {
                Ok(Some(_)) => Err(RideError::OracleSubmissionNotFound(*trip_id)),
                Ok(None) => Err(RideError::TripNotFound(*trip_id)),
                Err(e) => Err(e),
            },
            Err(e) => Err(e),
        },
        Command::Count => engine
            .get_trip_count()
            .map(|n| json!({ "ok": true, "value": n })),
        Command::Describe { trip_id } => engine
            .with_store(|s| TripQuery::new(s).describe(*trip_id))?
            .map(Value::String),
        Command::Mints => db.iter_mints().map(|m| json!(m)),
        Command::Reward { distance, passengers, congestion } => engine
            .compute_reward(*distance, *passengers, *congestion)
            .map(|r| json!({ "ok": true, "value": r.to_string() })),
    };
    Ok(result)
}

/// Load genesis parameters from a JSON file, or fall back to making the
/// caller the admin of a default configuration.
fn load_genesis_params(path: Option<&Path>, caller: Option<&str>) -> anyhow::Result<GenesisParams> {
    if let Some(p) = path {
        let json = std::fs::read_to_string(p)
            .with_context(|| format!("reading genesis params from {}", p.display()))?;
        return serde_json::from_str(&json).context("parsing genesis params JSON");
    }
    let admin = caller.context("fresh database needs --genesis <file> or --caller to act as admin")?;
    warn!(admin, "No --genesis provided. Using the caller as admin, oracle and token contract.");
    Ok(GenesisParams::new(Identity::from(admin)))
}

/// Expand a leading `~` to the user's home directory (`HOME` or `USERPROFILE`).
fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Ok(home) = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE")) {
            return PathBuf::from(home).join(stripped);
        }
    }
    path.to_path_buf()
}
