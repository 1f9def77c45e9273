use rideproof_core::config::Configuration;
use rideproof_core::error::RideError;
use rideproof_core::trip::{OracleSubmission, Trip};
use rideproof_core::types::{LogicalTime, TripId};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sled::transaction::{ConflictableTransactionError, TransactionError};
use sled::Transactional;
use std::path::Path;

use crate::mint::{MintGateway, MintRecord, MintRequest};
use crate::store::TripStore;

const CONFIG_KEY: &str = "config";

/// Persistent state database backed by sled (pure-Rust, no C dependencies).
///
/// Named trees (analogous to column families):
///   trips               : TripId be8 → bincode(Trip)
///   oracle_submissions  : TripId be8 → bincode(OracleSubmission)
///   mints               : TripId be8 → bincode(MintRecord)
///   meta                : utf8 key bytes → raw bytes
///
/// Cloning is cheap; clones share the same underlying database.
#[derive(Clone)]
pub struct StateDb {
    _db: sled::Db,
    trips: sled::Tree,
    submissions: sled::Tree,
    mints: sled::Tree,
    meta: sled::Tree,
}

fn storage(e: sled::Error) -> RideError {
    RideError::Storage(e.to_string())
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, RideError> {
    bincode::serialize(value).map_err(|e| RideError::Serialization(e.to_string()))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, RideError> {
    bincode::deserialize(bytes).map_err(|e| RideError::Serialization(e.to_string()))
}

impl StateDb {
    /// Open or create the state database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, RideError> {
        let db = sled::open(path).map_err(storage)?;
        let trips       = db.open_tree("trips").map_err(storage)?;
        let submissions = db.open_tree("oracle_submissions").map_err(storage)?;
        let mints       = db.open_tree("mints").map_err(storage)?;
        let meta        = db.open_tree("meta").map_err(storage)?;
        Ok(Self { _db: db, trips, submissions, mints, meta })
    }

    // ── Mints ────────────────────────────────────────────────────────────────

    pub fn get_mint(&self, trip_id: TripId) -> Result<Option<MintRecord>, RideError> {
        match self.mints.get(trip_id.to_be_bytes()).map_err(storage)? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// All mint records in trip-id order.
    pub fn iter_mints(&self) -> Result<Vec<MintRecord>, RideError> {
        let mut out = Vec::new();
        for item in self.mints.iter() {
            let (_, bytes) = item.map_err(storage)?;
            out.push(decode(&bytes)?);
        }
        Ok(out)
    }

    // ── Meta ─────────────────────────────────────────────────────────────────

    pub fn put_meta(&self, key: &str, value: &[u8]) -> Result<(), RideError> {
        self.meta.insert(key.as_bytes(), value).map_err(storage)?;
        Ok(())
    }

    pub fn get_meta(&self, key: &str) -> Result<Option<Vec<u8>>, RideError> {
        self.meta
            .get(key.as_bytes())
            .map(|v| v.map(|iv| iv.to_vec()))
            .map_err(storage)
    }

    /// Flush all pending writes to disk.
    pub fn flush(&self) -> Result<(), RideError> {
        self._db.flush().map_err(storage)?;
        Ok(())
    }
}

impl TripStore for StateDb {
    fn get_trip(&self, id: TripId) -> Result<Option<Trip>, RideError> {
        match self.trips.get(id.to_be_bytes()).map_err(storage)? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    fn put_trip(&mut self, trip: &Trip) -> Result<(), RideError> {
        self.trips.insert(trip.id.to_be_bytes(), encode(trip)?).map_err(storage)?;
        Ok(())
    }

    fn get_submission(&self, trip_id: TripId) -> Result<Option<OracleSubmission>, RideError> {
        match self.submissions.get(trip_id.to_be_bytes()).map_err(storage)? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    fn put_submission(&mut self, submission: &OracleSubmission) -> Result<(), RideError> {
        self.submissions
            .insert(submission.trip_id.to_be_bytes(), encode(submission)?)
            .map_err(storage)?;
        Ok(())
    }

    fn get_config(&self) -> Result<Option<Configuration>, RideError> {
        match self.get_meta(CONFIG_KEY)? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    fn put_config(&mut self, config: &Configuration) -> Result<(), RideError> {
        self.put_meta(CONFIG_KEY, &encode(config)?)
    }

    /// One sled transaction over `trips` and `meta`: either both the trip
    /// and the advanced counter land, or neither does.
    fn put_trip_and_config(&mut self, trip: &Trip, config: &Configuration) -> Result<(), RideError> {
        let key = trip.id.to_be_bytes();
        let trip_bytes = encode(trip)?;
        let config_bytes = encode(config)?;
        (&self.trips, &self.meta)
            .transaction(|(trips, meta)| {
                trips.insert(&key[..], trip_bytes.clone())?;
                meta.insert(CONFIG_KEY.as_bytes(), config_bytes.clone())?;
                Ok::<(), ConflictableTransactionError<()>>(())
            })
            .map_err(|e: TransactionError<()>| RideError::Storage(format!("{:?}", e)))
    }

    fn trip_exists(&self, id: TripId) -> bool {
        self.trips.contains_key(id.to_be_bytes()).unwrap_or(false)
    }
}

/// Ledger-style gateway: every mint is appended to the `mints` tree.
/// A trip is minted at most once. Repeating the exact same request is a
/// no-op, so a verification retried after a failed trip write completes.
impl MintGateway for StateDb {
    fn mint(&self, request: &MintRequest, now: LogicalTime) -> Result<(), RideError> {
        let record = MintRecord::new(request.clone(), now);
        let prev = self
            .mints
            .compare_and_swap(
                request.trip_id.to_be_bytes(),
                None as Option<&[u8]>,
                Some(encode(&record)?),
            )
            .map_err(storage)?;
        if let Err(cas) = prev {
            let existing: Option<MintRecord> = cas.current.as_deref().map(decode).transpose()?;
            if existing.map(|r| r.request == *request).unwrap_or(false) {
                return Ok(());
            }
            return Err(RideError::MintFailed(format!(
                "trip {} already minted",
                request.trip_id
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rideproof_core::types::Identity;

    fn temp_db(name: &str) -> StateDb {
        let dir = std::env::temp_dir().join(format!("rideproof_db_test_{}", name));
        let _ = std::fs::remove_dir_all(&dir);
        StateDb::open(&dir).expect("open temp db")
    }

    fn trip(id: TripId) -> Trip {
        Trip::new(
            id,
            "ST2DRIVER".into(),
            vec![Identity::from("ST3PASS1"), Identity::from("ST4PASS2")],
            "Route A to B".into(),
            100,
            7,
        )
    }

    #[test]
    fn trip_round_trip_and_overwrite() {
        let mut db = temp_db("trip_rt");
        db.put_trip(&trip(0)).unwrap();
        assert_eq!(db.get_trip(0).unwrap(), Some(trip(0)));
        assert!(db.trip_exists(0));
        assert!(!db.trip_exists(1));

        let mut t = trip(0);
        t.distance = 50;
        db.put_trip(&t).unwrap();
        assert_eq!(db.get_trip(0).unwrap().unwrap().distance, 50);
    }

    #[test]
    fn config_lives_in_meta() {
        let mut db = temp_db("config_meta");
        assert_eq!(db.get_config().unwrap(), None);
        let cfg = Configuration::new("ST1ADMIN".into());
        db.put_config(&cfg).unwrap();
        assert_eq!(db.get_config().unwrap(), Some(cfg));
    }

    #[test]
    fn submission_latest_wins() {
        let mut db = temp_db("sub_latest");
        let mut sub = OracleSubmission {
            trip_id: 3,
            oracle: "ST1ORACLE".into(),
            gps_valid: true,
            distance: 10,
            congestion: 5,
            submitted_at: 1,
        };
        db.put_submission(&sub).unwrap();
        sub.distance = 20;
        db.put_submission(&sub).unwrap();
        assert_eq!(db.get_submission(3).unwrap().unwrap().distance, 20);
        assert_eq!(db.get_submission(4).unwrap(), None);
    }

    #[test]
    fn mint_once_per_trip() {
        let db = temp_db("mint_once");
        let req = MintRequest {
            token_contract: "ST1TOKEN".into(),
            trip_id: 0,
            amount: 1300,
            driver: "ST2DRIVER".into(),
            passengers: vec!["ST3PASS1".into()],
        };
        db.mint(&req, 42).unwrap();
        // identical re-request is already done; the original record stays
        db.mint(&req, 43).unwrap();
        let mut other = req.clone();
        other.amount = 9_999;
        assert!(matches!(db.mint(&other, 44), Err(RideError::MintFailed(_))));

        let rec = db.get_mint(0).unwrap().unwrap();
        assert_eq!(rec.request, req);
        assert_eq!(rec.minted_at, 42);
        assert_eq!(db.iter_mints().unwrap().len(), 1);
    }

    #[test]
    fn trip_and_config_written_together() {
        let mut db = temp_db("trip_and_config");
        let mut cfg = Configuration::new("ST1ADMIN".into());
        cfg.next_trip_id = 1;
        db.put_trip_and_config(&trip(0), &cfg).unwrap();
        assert_eq!(db.get_trip(0).unwrap(), Some(trip(0)));
        assert_eq!(db.get_config().unwrap().unwrap().next_trip_id, 1);
    }

    #[test]
    fn reopen_preserves_state() {
        let dir = std::env::temp_dir().join("rideproof_db_test_reopen");
        let _ = std::fs::remove_dir_all(&dir);
        {
            let mut db = StateDb::open(&dir).unwrap();
            db.put_trip(&trip(0)).unwrap();
            db.flush().unwrap();
        }
        let db = StateDb::open(&dir).unwrap();
        assert_eq!(db.get_trip(0).unwrap(), Some(trip(0)));
    }
}
