use crate::sdk::routing::Coord;
use anyhow::{Context, Result};
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

const LANDMARKS_CSV: &str = include_str!("../data/landmarks.csv");
const CLUSTERS_JSON: &str = include_str!("../data/clusters.json");

/// One sightseeing spot in Ho Chi Minh City.
#[derive(Debug, Clone)]
pub struct Landmark {
    pub name: String,
    pub coord: Coord,
}

/// A named group of landmarks. A tour visits exactly one member of
/// every selected cluster.
#[derive(Debug, Clone, Deserialize)]
pub struct ClusterDef {
    pub id: String,
    pub name: String,
    pub members: Vec<String>,
}

/// Per-cluster payload of `/get_clusters`: display name plus one
/// coordinate to pin on a map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterSummary {
    pub name: String,
    pub representative_coord: Coord,
}

/// Static catalogue of landmarks and clusters, embedded in the binary.
pub struct PlaceDb {
    landmarks: HashMap<String, Landmark>,
    clusters: Vec<ClusterDef>,
}

impl PlaceDb {
    pub fn load() -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .delimiter(b',')
            .from_reader(LANDMARKS_CSV.as_bytes());

        let mut landmarks = HashMap::new();
        for result in rdr.records() {
            let record = result.context("Malformed landmark record")?;
            let id = record
                .get(0)
                .context("Missing landmark id in CSV")?
                .trim()
                .to_string();
            let name = record
                .get(1)
                .context("Missing landmark name in CSV")?
                .trim()
                .to_string();
            let lat: f64 = record
                .get(2)
                .context("Missing latitude in CSV")?
                .trim()
                .parse()
                .with_context(|| format!("Bad latitude for landmark {}", id))?;
            let lon: f64 = record
                .get(3)
                .context("Missing longitude in CSV")?
                .trim()
                .parse()
                .with_context(|| format!("Bad longitude for landmark {}", id))?;
            landmarks.insert(id, Landmark { name, coord: (lat, lon) });
        }

        let clusters: Vec<ClusterDef> =
            serde_json::from_str(CLUSTERS_JSON).context("Malformed cluster definitions")?;

        Ok(PlaceDb { landmarks, clusters })
    }

    pub fn landmark(&self, id: &str) -> Option<&Landmark> {
        self.landmarks.get(id)
    }

    /// Exact display-name match, used to spare a geocoding call when
    /// a request endpoint is already in the catalogue.
    pub fn landmark_by_name(&self, name: &str) -> Option<&Landmark> {
        self.landmarks.values().find(|landmark| landmark.name == name)
    }

    pub fn landmark_count(&self) -> usize {
        self.landmarks.len()
    }

    pub fn clusters(&self) -> &[ClusterDef] {
        &self.clusters
    }

    /// Summary of every cluster, keyed by id. The representative
    /// coordinate is the first member's; memberless clusters are
    /// skipped.
    pub fn cluster_summaries(&self) -> BTreeMap<String, ClusterSummary> {
        let mut info = BTreeMap::new();
        for cluster in &self.clusters {
            let Some(first) = cluster.members.first() else {
                continue;
            };
            if let Some(landmark) = self.landmarks.get(first) {
                info.insert(
                    cluster.id.clone(),
                    ClusterSummary {
                        name: cluster.name.clone(),
                        representative_coord: landmark.coord,
                    },
                );
            }
        }
        info
    }

    /// Member landmarks of the requested clusters, in request order,
    /// each landmark at most once. Unknown cluster ids are skipped.
    pub fn points_for_clusters(&self, cluster_ids: &[String]) -> Vec<(String, &Landmark)> {
        let mut seen = HashSet::new();
        let mut points = Vec::new();
        for cluster_id in cluster_ids {
            let Some(cluster) = self.cluster(cluster_id) else {
                continue;
            };
            for member in &cluster.members {
                if seen.contains(member.as_str()) {
                    continue;
                }
                if let Some(landmark) = self.landmarks.get(member) {
                    seen.insert(member.as_str());
                    points.push((member.clone(), landmark));
                }
            }
        }
        points
    }

    /// Cluster membership translated to cost-matrix indices, the form
    /// the solver consumes. `index_of` maps landmark id to its row in
    /// the matrix; members without an index are dropped, and clusters
    /// that end up empty are omitted.
    pub fn solver_clusters(
        &self,
        cluster_ids: &[String],
        index_of: &HashMap<String, usize>,
    ) -> HashMap<String, Vec<usize>> {
        let mut solver_clusters = HashMap::new();
        for cluster_id in cluster_ids {
            let Some(cluster) = self.cluster(cluster_id) else {
                continue;
            };
            let indices: Vec<usize> = cluster
                .members
                .iter()
                .filter_map(|member| index_of.get(member).copied())
                .collect();
            if !indices.is_empty() {
                solver_clusters.insert(cluster.id.clone(), indices);
            }
        }
        solver_clusters
    }

    fn cluster(&self, id: &str) -> Option<&ClusterDef> {
        self.clusters.iter().find(|cluster| cluster.id == id)
    }
}
