use crate::error::CatalogError;
use crate::models::{EpisodeId, Series, SeriesId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, instrument};

/// Stored series keyed by id, iterated in ascending id order.
#[derive(Debug, Default)]
pub struct Catalog {
    series: BTreeMap<SeriesId, Series>,
    next_series_id: u64,
    next_episode_id: u64,
}

#[derive(Serialize, Deserialize)]
struct Snapshot {
    next_series_id: u64,
    next_episode_id: u64,
    series: Vec<Series>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a snapshot written by [`Catalog::persist`]. A missing file is an
    /// empty catalog.
    #[instrument]
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        if !path.exists() {
            debug!("No catalog at {}, starting empty", path.display());
            return Ok(Self::new());
        }

        let content = std::fs::read_to_string(path)?;
        let snapshot: Snapshot = serde_json::from_str(&content)?;

        let mut catalog = Self {
            series: BTreeMap::new(),
            next_series_id: snapshot.next_series_id,
            next_episode_id: snapshot.next_episode_id,
        };
        for entry in snapshot.series {
            catalog.restore(entry)?;
        }

        info!("Loaded {} series from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    /// Adds one snapshot entry, raising the id counters past every id it
    /// carries so later saves never reuse one.
    fn restore(&mut self, series: Series) -> Result<(), CatalogError> {
        let Some(id) = series.id else {
            return Err(CatalogError::Inconsistent { title: series.title });
        };
        if self.series.contains_key(&id) {
            return Err(CatalogError::DuplicateId(id));
        }
        if self.series.values().any(|stored| stored.title == series.title) {
            return Err(CatalogError::DuplicateTitle(series.title));
        }
        if !series.is_consistent() {
            return Err(CatalogError::Inconsistent { title: series.title });
        }
        series.validate_seasons()?;

        self.next_series_id = self.next_series_id.max(id.0);
        let highest_episode = series.episodes().iter().filter_map(|e| e.id).map(|e| e.0).max();
        if let Some(highest) = highest_episode {
            self.next_episode_id = self.next_episode_id.max(highest);
        }

        self.series.insert(id, series);
        Ok(())
    }

    /// Writes the whole catalog to `path`, replacing it in one rename.
    #[instrument(skip(self))]
    pub fn persist(&self, path: &Path) -> Result<(), CatalogError> {
        let snapshot = Snapshot {
            next_series_id: self.next_series_id,
            next_episode_id: self.next_episode_id,
            series: self.series.values().cloned().collect(),
        };
        let content = serde_json::to_string_pretty(&snapshot)?;

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "catalog".to_string());
        let staging = path.with_file_name(format!(".{}.{}.tmp", file_name, uuid::Uuid::new_v4()));

        std::fs::write(&staging, content)?;
        if let Err(e) = std::fs::rename(&staging, path) {
            let _ = std::fs::remove_file(&staging);
            return Err(e.into());
        }

        debug!("Persisted {} series", self.len());
        Ok(())
    }

    /// Stores a series together with its episodes as one unit.
    ///
    /// A series without an id is inserted and given one; a series with an id
    /// replaces the stored copy. Episodes without an id are numbered here.
    /// Every episode must still fit the series' season count. Nothing is
    /// written if any check fails.
    pub fn save(&mut self, mut series: Series) -> Result<SeriesId, CatalogError> {
        if let Some(id) = series.id {
            if !self.series.contains_key(&id) {
                return Err(CatalogError::UnknownSeries(id));
            }
        }

        if self
            .series
            .values()
            .any(|stored| stored.title == series.title && stored.id != series.id)
        {
            return Err(CatalogError::DuplicateTitle(series.title));
        }

        if series.id.is_none() && !series.episodes().is_empty() {
            return Err(CatalogError::Inconsistent { title: series.title });
        }
        if series.id.is_some() && !series.is_consistent() {
            return Err(CatalogError::Inconsistent { title: series.title });
        }
        series.validate_seasons()?;

        let id = match series.id {
            Some(id) => id,
            None => {
                self.next_series_id += 1;
                let id = SeriesId(self.next_series_id);
                series.id = Some(id);
                id
            }
        };

        let mut next_episode_id = self.next_episode_id;
        for episode in series.episodes_mut().filter(|e| e.id.is_none()) {
            next_episode_id += 1;
            episode.id = Some(EpisodeId(next_episode_id));
        }
        self.next_episode_id = next_episode_id;

        debug!("Saved series {} ({} episodes)", series.title, series.episodes().len());
        self.series.insert(id, series);
        Ok(id)
    }

    pub fn find_all(&self) -> impl Iterator<Item = &Series> {
        self.series.values()
    }

    pub fn find_by_id(&self, id: SeriesId) -> Option<&Series> {
        self.series.get(&id)
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}
