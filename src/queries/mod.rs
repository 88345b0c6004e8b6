use crate::catalog::Catalog;
use crate::genre::Genre;
use crate::models::{Episode, Series, SeriesId};
use serde::Serialize;
use std::cmp::Reverse;

/// Read-only queries over a [`Catalog`].
///
/// Results follow catalog order (ascending series id, then episode order)
/// wherever no other order is requested, and every rating or date ordering
/// is a stable sort, so ties come out in catalog order.
pub struct CatalogQuery<'a> {
    catalog: &'a Catalog,
}

/// An episode found by a cross-series search, with its owner's title.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeMatch<'a> {
    pub series_title: &'a str,
    pub season: u32,
    pub number: Option<u32>,
    pub title: &'a str,
    pub rating: f64,
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Sorts by rating, highest first, keeping the incoming order for ties.
pub fn sort_by_rating_desc(series: &mut [&Series]) {
    series.sort_by(|a, b| b.rating.total_cmp(&a.rating));
}

impl<'a> CatalogQuery<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    pub fn all(&self) -> Vec<&'a Series> {
        self.catalog.find_all().collect()
    }

    /// Every series ordered by genre, then by id.
    pub fn all_by_genre(&self) -> Vec<&'a Series> {
        let mut series = self.all();
        series.sort_by_key(|s| s.genre);
        series
    }

    pub fn by_id(&self, id: SeriesId) -> Option<&'a Series> {
        self.catalog.find_by_id(id)
    }

    /// First series, by id, whose title contains `text` ignoring case.
    pub fn find_by_title_substring(&self, text: &str) -> Option<&'a Series> {
        self.catalog
            .find_all()
            .find(|s| contains_ignore_case(&s.title, text))
    }

    pub fn top_by_rating(&self, n: usize) -> Vec<&'a Series> {
        let mut series = self.all();
        sort_by_rating_desc(&mut series);
        series.truncate(n);
        series
    }

    pub fn by_genre(&self, genre: Genre) -> Vec<&'a Series> {
        self.catalog.find_all().filter(|s| s.genre == genre).collect()
    }

    /// Series with at most `max_seasons` seasons and a rating of at least
    /// `min_rating`.
    pub fn by_seasons_and_rating(&self, max_seasons: u32, min_rating: f64) -> Vec<&'a Series> {
        self.catalog
            .find_all()
            .filter(|s| s.total_seasons <= max_seasons && s.rating >= min_rating)
            .collect()
    }

    pub fn episodes_by_title_substring(&self, text: &str) -> Vec<EpisodeMatch<'a>> {
        self.catalog
            .find_all()
            .flat_map(|series| {
                series
                    .episodes()
                    .iter()
                    .filter(move |e| contains_ignore_case(&e.title, text))
                    .map(move |e| EpisodeMatch {
                        series_title: &series.title,
                        season: e.season,
                        number: e.number,
                        title: &e.title,
                        rating: e.rating,
                    })
            })
            .collect()
    }

    /// Best rated episodes of the stored copy of `series`. A series that was
    /// never saved has none.
    pub fn top_episodes(&self, series: &Series, n: usize) -> Vec<&'a Episode> {
        let Some(stored) = series.id.and_then(|id| self.catalog.find_by_id(id)) else {
            return Vec::new();
        };

        let mut episodes: Vec<_> = stored.episodes().iter().collect();
        episodes.sort_by(|a, b| b.rating.total_cmp(&a.rating));
        episodes.truncate(n);
        episodes
    }

    /// Series ordered by their latest episode release, newest first. Series
    /// without a dated episode are left out.
    pub fn most_recent_by_latest_episode(&self, n: usize) -> Vec<&'a Series> {
        let mut dated: Vec<_> = self
            .catalog
            .find_all()
            .filter_map(|s| s.latest_release().map(|date| (date, s)))
            .collect();
        dated.sort_by_key(|(date, _)| Reverse(*date));
        dated.into_iter().take(n).map(|(_, s)| s).collect()
    }

    pub fn episodes_for_series(&self, id: SeriesId) -> Option<&'a [Episode]> {
        self.catalog.find_by_id(id).map(|s| s.episodes())
    }

    pub fn episodes_for_season(&self, id: SeriesId, season: u32) -> Vec<&'a Episode> {
        self.episodes_for_series(id)
            .unwrap_or_default()
            .iter()
            .filter(|e| e.season == season)
            .collect()
    }
}
