//! Graph synthesis: raw snapshot in, consistent node/edge graph out.
//!
//! Synthesis is a total function. A failed fetch becomes a single Error
//! node. Origins pointing at ids missing from the object set produce Fake
//! nodes. Origins without results fan into one shared Null sentinel, so
//! they stay visible instead of silently vanishing.

use std::collections::{BTreeMap, BTreeSet};

use octoscope_types::{
    Edge, FetchFailure, Graph, NULL_SENTINEL_ID, Node, Origin, OriginParameter, ScanProfile,
};
use tracing::{debug, warn};

use crate::snapshot::Snapshot;

/// Which placeholder nodes synthesis may insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SynthesisOptions {
    /// Insert a Fake node for every dangling origin endpoint.
    pub include_fake_nodes: bool,
    /// Route origins without results to the shared Null sentinel.
    pub include_null_sentinel: bool,
}

impl Default for SynthesisOptions {
    fn default() -> Self {
        Self {
            include_fake_nodes: true,
            include_null_sentinel: true,
        }
    }
}

/// One (source, target) pair contributed by an origin.
struct Connector<'a> {
    source: &'a str,
    target: &'a str,
    origin: &'a Origin,
}

/// Synthesize a graph from a fetched snapshot, or from the failure that
/// prevented fetching one.
pub fn synthesize(fetched: Result<&Snapshot, &FetchFailure>, options: SynthesisOptions) -> Graph {
    let snapshot = match fetched {
        Ok(snapshot) => snapshot,
        Err(failure) => {
            debug!(node = %failure.node, "synthesizing error graph");
            return Graph::error(failure.clone());
        }
    };

    let profiles: BTreeMap<&str, &ScanProfile> = snapshot
        .scan_profiles
        .iter()
        .map(|profile| (profile.reference.as_str(), profile))
        .collect();
    let parameters: BTreeMap<&str, &OriginParameter> = snapshot
        .origin_parameters
        .iter()
        .map(|parameter| (parameter.origin_id.as_str(), parameter))
        .collect();

    let mut known: BTreeSet<&str> = BTreeSet::new();
    let mut nodes = Vec::with_capacity(snapshot.objects.len());
    for ooi in &snapshot.objects {
        if !known.insert(ooi.id.as_str()) {
            warn!(id = %ooi.id, "duplicate object in snapshot, keeping the first");
            continue;
        }
        nodes.push(Node::Real {
            ooi: ooi.clone(),
            profile: profiles.get(ooi.id.as_str()).map(|profile| (*profile).clone()),
        });
    }

    let with_null = options.include_null_sentinel
        && snapshot.origins.iter().any(|origin| origin.results.is_empty());
    let connectors = connectors(&snapshot.origins, options.include_null_sentinel);

    let fakes: BTreeSet<&str> = if options.include_fake_nodes {
        connectors
            .iter()
            .flat_map(|connector| [connector.source, connector.target])
            .filter(|id| *id != NULL_SENTINEL_ID && !known.contains(id))
            .collect()
    } else {
        BTreeSet::new()
    };

    let resolves = |id: &str| {
        known.contains(id) || fakes.contains(id) || (with_null && id == NULL_SENTINEL_ID)
    };
    let edges: Vec<Edge> = connectors
        .iter()
        .filter(|connector| resolves(connector.source) && resolves(connector.target))
        .map(|connector| Edge {
            source: connector.source.to_owned(),
            target: connector.target.to_owned(),
            kind: connector.origin.origin_type.clone(),
            info: connector.origin.clone(),
            parameter: parameters
                .get(connector.origin.id.as_str())
                .map(|parameter| (*parameter).clone()),
        })
        .collect();

    let dropped = connectors.len().saturating_sub(edges.len());
    if dropped > 0 {
        debug!(dropped, "dropped edges with unresolved endpoints");
    }

    let fake_count = fakes.len();
    nodes.extend(fakes.into_iter().map(|id| Node::Fake { id: id.to_owned() }));
    if with_null {
        nodes.push(Node::Null);
    }

    debug!(
        nodes = nodes.len(),
        edges = edges.len(),
        fakes = fake_count,
        null = with_null,
        "graph synthesized"
    );

    Graph { nodes, edges }
}

/// Flatten origins into one connector per result. An origin without
/// results contributes a single connector to the Null sentinel when
/// `with_null` is set, and nothing otherwise.
fn connectors(origins: &[Origin], with_null: bool) -> Vec<Connector<'_>> {
    origins
        .iter()
        .flat_map(|origin| {
            let targets: Vec<&str> = if origin.results.is_empty() && with_null {
                vec![NULL_SENTINEL_ID]
            } else {
                origin.results.iter().map(String::as_str).collect()
            };
            targets.into_iter().map(move |target| Connector {
                source: origin.source_id.as_str(),
                target,
                origin,
            })
        })
        .collect()
}
