//! End-to-end smoke test for the `rideproof` binary.
//!
//! Runs the built binary against a fresh data directory, walking one trip
//! through its whole lifecycle and checking the JSON each step prints.
//!
//! Run with:
//!   cargo test -p rideproof-node --test smoke

use std::path::PathBuf;
use std::process::{Command, Output};

use serde_json::Value;

const ADMIN: &str = "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM";
const DRIVER: &str = "ST2DRIVER";

// ── Data dir lifecycle ────────────────────────────────────────────────────────

struct DataDir(PathBuf);

impl DataDir {
    fn fresh(name: &str) -> Self {
        let dir = std::env::temp_dir().join(format!("rideproof_smoke_{}", name));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        Self(dir)
    }

    fn db(&self) -> PathBuf {
        self.0.join("db")
    }
}

impl Drop for DataDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

// ── CLI helpers ───────────────────────────────────────────────────────────────

fn run(dir: &DataDir, caller: &str, height: u64, args: &[&str]) -> Output {
    let height = height.to_string();
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_rideproof"));
    cmd.arg("--data-dir")
        .arg(dir.db())
        .args(["--caller", caller, "--height", &height])
        .args(args)
        .env("RUST_LOG", "warn");
    cmd.output().expect("spawn rideproof")
}

fn ok(dir: &DataDir, caller: &str, height: u64, args: &[&str]) -> Value {
    let out = run(dir, caller, height, args);
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(
        out.status.success(),
        "rideproof {:?} failed: stdout={} stderr={}",
        args,
        stdout,
        String::from_utf8_lossy(&out.stderr)
    );
    serde_json::from_str(&stdout).expect("parse stdout JSON")
}

fn rejected(dir: &DataDir, caller: &str, height: u64, args: &[&str]) -> u64 {
    let out = run(dir, caller, height, args);
    assert_eq!(out.status.code(), Some(2), "expected rejection for {:?}", args);
    let v: Value = serde_json::from_slice(&out.stdout).expect("parse rejection JSON");
    assert_eq!(v["ok"], false);
    let code = v["code"].as_u64().unwrap();
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains(&format!("error {code}:")), "stderr lacks code {code}: {stderr}");
    code
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[test]
fn trip_lifecycle_end_to_end() {
    let dir = DataDir::fresh("lifecycle");

    // Fresh DB without --genesis: the caller becomes admin and oracle.
    let cfg = ok(&dir, ADMIN, 0, &["init"]);
    assert_eq!(cfg["admin"], ADMIN);
    assert_eq!(cfg["base_reward_rate"], 10);

    let id = ok(&dir, ADMIN, 0, &[
        "initiate", "--driver", DRIVER, "--passengers", "ST3PASS1,ST4PASS2",
        "--route", "Route A to B", "--start", "100",
    ]);
    assert_eq!(id["value"], 0);

    ok(&dir, ADMIN, 0, &[
        "submit-oracle", "0", "--distance", "50", "--congestion", "80", "--end", "200",
    ]);
    let trip = ok(&dir, ADMIN, 0, &["trip", "0"]);
    assert_eq!(trip["distance"], 50);
    assert_eq!(trip["gps_verified"], true);
    assert_eq!(trip["status"], "pending");

    let c = ok(&dir, "ST3PASS1", 0, &["confirm", "0"]);
    assert_eq!(c["confirmations"], 1);

    let v = ok(&dir, DRIVER, 300, &["verify", "0"]);
    assert_eq!(v["value"], "2600");

    let trip = ok(&dir, ADMIN, 300, &["trip", "0"]);
    assert_eq!(trip["status"], "verified");
    assert_eq!(trip["reward"], 2600);

    let mints = ok(&dir, ADMIN, 300, &["mints"]);
    assert_eq!(mints.as_array().unwrap().len(), 1);
    assert_eq!(mints[0]["request"]["driver"], DRIVER);

    // Terminal: a second verify is refused with TripAlreadyVerified.
    assert_eq!(rejected(&dir, DRIVER, 301, &["verify", "0"]), 108);

    let count = ok(&dir, ADMIN, 301, &["count"]);
    assert_eq!(count["value"], 1);
}

#[test]
fn rejections_carry_contract_codes() {
    let dir = DataDir::fresh("rejections");
    ok(&dir, ADMIN, 0, &["init"]);

    // Driver cannot initiate their own trip.
    assert_eq!(
        rejected(&dir, DRIVER, 0, &[
            "initiate", "--driver", DRIVER, "--passengers", "ST3PASS1",
            "--route", "Route", "--start", "100",
        ]),
        102
    );
    ok(&dir, ADMIN, 0, &[
        "initiate", "--driver", DRIVER, "--passengers", "ST3PASS1",
        "--route", "Route", "--start", "100",
    ]);

    // Untrusted oracle.
    assert_eq!(
        rejected(&dir, "ST5FAKE", 0, &[
            "submit-oracle", "0", "--distance", "50", "--congestion", "80", "--end", "200",
        ]),
        112
    );
    // Non-admin config change.
    assert_eq!(rejected(&dir, "ST5FAKE", 0, &["set-rate", "20"]), 100);
    // Non-positive rate.
    assert_eq!(rejected(&dir, ADMIN, 0, &["set-rate", "0"]), 115);

    // Dispute, then the trip is frozen.
    ok(&dir, "ST3PASS1", 0, &["dispute", "0", "--reason", "Invalid route"]);
    assert_eq!(
        rejected(&dir, "ST3PASS1", 0, &["dispute", "0", "--reason", "Another reason"]),
        113
    );
    let d = ok(&dir, ADMIN, 0, &["describe", "0"]);
    assert!(d.as_str().unwrap().ends_with("Disputed — Invalid route"));

    assert_eq!(rejected(&dir, ADMIN, 0, &["trip", "9"]), 109);
}

#[test]
fn missing_oracle_submission_is_not_a_missing_trip() {
    let dir = DataDir::fresh("oracle_missing");
    ok(&dir, ADMIN, 0, &["init"]);
    ok(&dir, ADMIN, 0, &[
        "initiate", "--driver", DRIVER, "--passengers", "ST3PASS1",
        "--route", "Route", "--start", "100",
    ]);

    assert_eq!(rejected(&dir, ADMIN, 0, &["oracle", "0"]), 123);
    assert_eq!(rejected(&dir, ADMIN, 0, &["oracle", "7"]), 109);

    ok(&dir, ADMIN, 0, &[
        "submit-oracle", "0", "--distance", "50", "--congestion", "80", "--end", "200",
    ]);
    let sub = ok(&dir, ADMIN, 0, &["oracle", "0"]);
    assert_eq!(sub["distance"], 50);
}

#[test]
fn genesis_file_configures_roles() {
    let dir = DataDir::fresh("genesis_file");
    let genesis = dir.0.join("genesis.json");
    std::fs::write(
        &genesis,
        format!(r#"{{"admin":"{ADMIN}","trusted_oracle":"ST9ORACLE","base_reward_rate":20,"max_trips":1}}"#),
    )
    .unwrap();

    let cfg = ok(&dir, ADMIN, 0, &["--genesis", genesis.to_str().unwrap(), "init"]);
    assert_eq!(cfg["trusted_oracle"], "ST9ORACLE");
    assert_eq!(cfg["base_reward_rate"], 20);

    let r = ok(&dir, ADMIN, 0, &["reward", "--distance", "50", "--passengers", "1", "--congestion", "80"]);
    // 50·20 = 1000; 1000·80·2/100 = 1600
    assert_eq!(r["value"], "2600");

    ok(&dir, ADMIN, 0, &[
        "initiate", "--driver", DRIVER, "--passengers", "ST3PASS1",
        "--route", "Route", "--start", "0",
    ]);
    // Capacity of one trip is exhausted until the admin raises it.
    let again = [
        "initiate", "--driver", DRIVER, "--passengers", "ST3PASS1",
        "--route", "Route", "--start", "0",
    ];
    assert_eq!(rejected(&dir, ADMIN, 0, &again), 119);
    ok(&dir, ADMIN, 0, &["set-max-trips", "2"]);
    assert_eq!(ok(&dir, ADMIN, 0, &again)["value"], 1);
}
