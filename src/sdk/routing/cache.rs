use super::provider::{CostMatrices, RouteInfo, RoutingProvider};
use super::{Coord, RoutingError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::{collections::HashMap, fs, io::Result as IoResult, path::Path};
use tokio::sync::Mutex;

/// Disk-backed cache of geocoding lookups, keyed by the raw address
/// string. Nominatim rate limits aggressively, so every resolved
/// address is worth keeping.
#[derive(Serialize, Deserialize, Default)]
pub struct GeoCache {
    geocodes: HashMap<String, Coord>,
}

impl GeoCache {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> IoResult<Self> {
        if path.as_ref().exists() {
            let data = fs::read_to_string(path)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> IoResult<()> {
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)
    }

    pub fn get_geocode(&self, address: &str) -> Option<Coord> {
        self.geocodes.get(address).copied()
    }

    pub fn insert_geocode(&mut self, address: &str, coord: Coord) {
        self.geocodes.insert(address.to_string(), coord);
    }

    pub fn len(&self) -> usize {
        self.geocodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.geocodes.is_empty()
    }
}

/// Delegating provider that answers geocode lookups from the disk
/// backed cache before hitting the network. Matrix and route calls
/// pass straight through.
pub struct CachedProvider<P> {
    inner: P,
    cache: Mutex<GeoCache>,
    path: PathBuf,
}

impl<P> CachedProvider<P> {
    pub fn new(inner: P, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let cache = match GeoCache::load_from_file(&path) {
            Ok(cache) => {
                log::info!(
                    "[CACHE] Loaded {} geocodes from {}",
                    cache.len(),
                    path.display()
                );
                cache
            }
            Err(err) => {
                log::warn!("[CACHE] Could not load {}: {}", path.display(), err);
                GeoCache::default()
            }
        };
        Self {
            inner,
            cache: Mutex::new(cache),
            path,
        }
    }
}

#[async_trait]
impl<P: RoutingProvider> RoutingProvider for CachedProvider<P> {
    async fn geocode(&self, query: &str) -> Result<Option<Coord>, RoutingError> {
        if let Some(coord) = self.cache.lock().await.get_geocode(query) {
            log::debug!("[CACHE HIT] {} → {:?}", query, coord);
            return Ok(Some(coord));
        }
        let resolved = self.inner.geocode(query).await?;
        if let Some(coord) = resolved {
            // snapshot serialized under the lock, disk write after it drops
            let snapshot = {
                let mut cache = self.cache.lock().await;
                cache.insert_geocode(query, coord);
                serde_json::to_string_pretty(&*cache)
            };
            let saved = match snapshot {
                Ok(data) => tokio::fs::write(&self.path, data).await,
                Err(err) => Err(err.into()),
            };
            if let Err(err) = saved {
                log::warn!("[CACHE] Could not save {}: {}", self.path.display(), err);
            }
        }
        Ok(resolved)
    }

    async fn cost_matrix(&self, coords: &[Coord]) -> Result<CostMatrices, RoutingError> {
        self.inner.cost_matrix(coords).await
    }

    async fn route(&self, from: Coord, to: Coord) -> Result<Option<RouteInfo>, RoutingError> {
        self.inner.route(from, to).await
    }
}
