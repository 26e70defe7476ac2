//! Point-in-time snapshot of the store records the synthesizer reads.

use chrono::{DateTime, Utc};
use octoscope_types::{ObjectOfInterest, Origin, OriginParameter, ScanProfile};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::store::{StoreError, StoreFacade, check_status};

/// One of the four record queries that make up a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordQuery {
    /// Every entity carrying an `object_type`.
    Objects,
    /// Every entity of type `Origin`.
    Origins,
    /// Every entity of type `OriginParameter`.
    OriginParameters,
    /// Every entity of type `ScanProfile`.
    ScanProfiles,
}

impl RecordQuery {
    /// The store query expression for this record set.
    pub const fn expression(self) -> &'static str {
        match self {
            Self::Objects => "{:query {:find [(pull ?var [*])] :where [[?var :object_type]]}}",
            Self::Origins => {
                r#"{:query {:find [(pull ?var [*])] :where [[?var :type "Origin"]]}}"#
            }
            Self::OriginParameters => {
                r#"{:query {:find [(pull ?var [*])] :where [[?var :type "OriginParameter"]]}}"#
            }
            Self::ScanProfiles => {
                r#"{:query {:find [(pull ?var [*])] :where [[?var :type "ScanProfile"]]}}"#
            }
        }
    }

    /// Short name used in logs and decode errors.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Objects => "objects",
            Self::Origins => "origins",
            Self::OriginParameters => "origin parameters",
            Self::ScanProfiles => "scan profiles",
        }
    }
}

/// Raw records of one snapshot at one valid-time.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    /// Objects of interest.
    pub objects: Vec<ObjectOfInterest>,
    /// Origin records.
    pub origins: Vec<Origin>,
    /// Origin parameter records.
    pub origin_parameters: Vec<OriginParameter>,
    /// Scan profile records.
    pub scan_profiles: Vec<ScanProfile>,
}

/// Fetch a full snapshot as of `valid_time`.
///
/// The status endpoint is checked first; if it fails or reports an error
/// no record query is issued.
pub async fn fetch_snapshot<S: StoreFacade>(
    store: &S,
    valid_time: DateTime<Utc>,
) -> Result<Snapshot, StoreError> {
    check_status(store.status().await?)?;

    let (objects, origins, origin_parameters, scan_profiles) = tokio::try_join!(
        fetch_records(store, RecordQuery::Objects, valid_time),
        fetch_records(store, RecordQuery::Origins, valid_time),
        fetch_records(store, RecordQuery::OriginParameters, valid_time),
        fetch_records(store, RecordQuery::ScanProfiles, valid_time),
    )?;

    let snapshot = Snapshot {
        objects,
        origins,
        origin_parameters,
        scan_profiles,
    };
    debug!(
        %valid_time,
        objects = snapshot.objects.len(),
        origins = snapshot.origins.len(),
        origin_parameters = snapshot.origin_parameters.len(),
        scan_profiles = snapshot.scan_profiles.len(),
        "snapshot fetched"
    );
    Ok(snapshot)
}

/// Run one record query, flatten its batches, and decode every record.
async fn fetch_records<S: StoreFacade, T: DeserializeOwned>(
    store: &S,
    which: RecordQuery,
    valid_time: DateTime<Utc>,
) -> Result<Vec<T>, StoreError> {
    let batches = store.query(which.expression(), valid_time).await?;
    batches
        .into_iter()
        .flatten()
        .map(|record| decode(which, record))
        .collect()
}

fn decode<T: DeserializeOwned>(which: RecordQuery, record: Value) -> Result<T, StoreError> {
    serde_json::from_value(record)
        .map_err(|e| StoreError::Decode(format!("malformed record in {}: {e}", which.name())))
}
