use crate::error::CatalogError;
use crate::genre::Genre;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeriesId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EpisodeId(pub u64);

impl fmt::Display for SeriesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A catalogued show. The series is the sole owner of its episodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    /// Assigned by the catalog on first save.
    pub id: Option<SeriesId>,
    pub title: String,
    pub total_seasons: u32,
    pub rating: f64,
    pub poster: String,
    pub genre: Genre,
    pub cast: String,
    pub synopsis: String,
    #[serde(default)]
    episodes: Vec<Episode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub id: Option<EpisodeId>,
    pub season: u32,
    pub number: Option<u32>,
    pub title: String,
    pub rating: f64,
    pub released: Option<NaiveDate>,
    /// Owning series. Only [`Series::attach`] writes this.
    series: Option<SeriesId>,
}

impl Series {
    pub fn new(
        title: String,
        total_seasons: u32,
        rating: f64,
        poster: String,
        genre: Genre,
        cast: String,
        synopsis: String,
    ) -> Self {
        Self {
            id: None,
            title,
            total_seasons,
            rating,
            poster,
            genre,
            cast,
            synopsis,
            episodes: Vec::new(),
        }
    }

    pub fn episodes(&self) -> &[Episode] {
        &self.episodes
    }

    pub(crate) fn episodes_mut(&mut self) -> impl Iterator<Item = &mut Episode> {
        self.episodes.iter_mut()
    }

    /// Replaces the episode collection, pointing every episode back at this
    /// series.
    ///
    /// Nothing is modified unless every episode passes validation: the series
    /// must already have an identity and every season must lie within
    /// `1..=total_seasons`.
    pub fn attach(&mut self, mut episodes: Vec<Episode>) -> Result<(), CatalogError> {
        let Some(id) = self.id else {
            return Err(CatalogError::Detached(self.title.clone()));
        };

        self.check_seasons(&episodes)?;

        for episode in &mut episodes {
            episode.series = Some(id);
        }
        self.episodes = episodes;

        Ok(())
    }

    /// Fails unless the series has at least one season and every owned
    /// episode lies within `1..=total_seasons`.
    pub fn validate_seasons(&self) -> Result<(), CatalogError> {
        self.check_seasons(&self.episodes)
    }

    fn check_seasons(&self, episodes: &[Episode]) -> Result<(), CatalogError> {
        if self.total_seasons == 0 {
            return Err(CatalogError::NoSeasons(self.title.clone()));
        }

        match episodes
            .iter()
            .find(|e| e.season == 0 || e.season > self.total_seasons)
        {
            Some(episode) => Err(CatalogError::SeasonOutOfRange {
                title: self.title.clone(),
                season: episode.season,
                total_seasons: self.total_seasons,
            }),
            None => Ok(()),
        }
    }

    /// True when every owned episode points back at this series.
    pub fn is_consistent(&self) -> bool {
        self.episodes
            .iter()
            .all(|e| e.series().is_some() && e.series() == self.id)
    }

    pub fn latest_release(&self) -> Option<NaiveDate> {
        self.episodes.iter().filter_map(|e| e.released).max()
    }

    pub fn view(&self) -> SeriesView {
        SeriesView {
            id: self.id,
            title: self.title.clone(),
            total_seasons: self.total_seasons,
            rating: self.rating,
            poster: self.poster.clone(),
            genre: self.genre,
            cast: self.cast.clone(),
            synopsis: self.synopsis.clone(),
        }
    }
}

impl Episode {
    pub fn new(
        season: u32,
        number: Option<u32>,
        title: String,
        rating: f64,
        released: Option<NaiveDate>,
    ) -> Self {
        Self {
            id: None,
            season,
            number,
            title,
            rating,
            released,
            series: None,
        }
    }

    pub fn series(&self) -> Option<SeriesId> {
        self.series
    }

    pub fn view(&self) -> EpisodeView {
        EpisodeView {
            season: self.season,
            title: self.title.clone(),
            number: self.number,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesView {
    pub id: Option<SeriesId>,
    pub title: String,
    pub total_seasons: u32,
    pub rating: f64,
    pub poster: String,
    pub genre: Genre,
    pub cast: String,
    pub synopsis: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeView {
    pub season: u32,
    pub title: String,
    pub number: Option<u32>,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn series(title: &str, total_seasons: u32, rating: f64, genre: Genre) -> Series {
        Series::new(
            title.to_string(),
            total_seasons,
            rating,
            format!("https://img.example/{title}.jpg"),
            genre,
            "Someone, Someone Else".to_string(),
            "Things happen.".to_string(),
        )
    }

    pub(crate) fn episode(season: u32, number: u32, title: &str, rating: f64, released: Option<&str>) -> Episode {
        Episode::new(
            season,
            Some(number),
            title.to_string(),
            rating,
            released.map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap()),
        )
    }

    #[test]
    fn attach_points_every_episode_at_the_series() {
        let mut show = series("Breaking Bad", 2, 9.5, Genre::Drama);
        show.id = Some(SeriesId(7));

        let episodes = vec![
            episode(1, 1, "Pilot", 9.0, Some("2008-01-20")),
            episode(1, 2, "Cat's in the Bag...", 8.6, None),
            episode(2, 1, "Seven Thirty-Seven", 8.7, Some("2009-03-08")),
        ];
        show.attach(episodes.clone()).unwrap();

        assert_eq!(show.episodes().len(), 3);
        assert!(show.is_consistent());
        let expected: Vec<_> = episodes
            .into_iter()
            .map(|mut e| {
                e.series = Some(SeriesId(7));
                e
            })
            .collect();
        assert_eq!(show.episodes(), expected.as_slice());
    }

    #[test]
    fn attach_replaces_instead_of_appending() {
        let mut show = series("Dark", 3, 8.7, Genre::Crime);
        show.id = Some(SeriesId(1));

        show.attach(vec![episode(1, 1, "Secrets", 8.4, None)]).unwrap();
        show.attach(vec![episode(2, 1, "Beginnings and Endings", 8.6, None)]).unwrap();

        assert_eq!(show.episodes().len(), 1);
        assert_eq!(show.episodes()[0].title, "Beginnings and Endings");
    }

    #[test]
    fn attach_rejects_unsaved_series() {
        let mut show = series("Dark", 3, 8.7, Genre::Crime);
        let result = show.attach(vec![episode(1, 1, "Secrets", 8.4, None)]);

        assert!(matches!(result, Err(CatalogError::Detached(_))));
        assert!(show.episodes().is_empty());
    }

    #[test]
    fn attach_rejects_out_of_range_seasons_without_mutating() {
        let mut show = series("Dark", 3, 8.7, Genre::Crime);
        show.id = Some(SeriesId(1));
        show.attach(vec![episode(1, 1, "Secrets", 8.4, None)]).unwrap();

        let result = show.attach(vec![
            episode(3, 1, "Deja-vu", 8.5, None),
            episode(4, 1, "Nowhere", 8.0, None),
        ]);
        assert!(matches!(
            result,
            Err(CatalogError::SeasonOutOfRange { season: 4, total_seasons: 3, .. })
        ));

        let result = show.attach(vec![episode(0, 1, "Special", 7.0, None)]);
        assert!(matches!(result, Err(CatalogError::SeasonOutOfRange { season: 0, .. })));

        assert_eq!(show.episodes().len(), 1);
        assert_eq!(show.episodes()[0].title, "Secrets");
    }

    #[test]
    fn season_check_follows_a_shrunk_season_count() {
        let mut show = series("Dark", 3, 8.7, Genre::Crime);
        show.id = Some(SeriesId(1));
        show.attach(vec![episode(3, 1, "Deja-vu", 8.5, None)]).unwrap();
        assert!(show.validate_seasons().is_ok());

        show.total_seasons = 1;
        assert!(matches!(
            show.validate_seasons(),
            Err(CatalogError::SeasonOutOfRange { season: 3, total_seasons: 1, .. })
        ));

        show.total_seasons = 0;
        assert!(matches!(show.validate_seasons(), Err(CatalogError::NoSeasons(_))));
    }

    #[test]
    fn latest_release_ignores_undated_episodes() {
        let mut show = series("Dark", 3, 8.7, Genre::Crime);
        show.id = Some(SeriesId(1));
        assert_eq!(show.latest_release(), None);

        show.attach(vec![
            episode(1, 1, "Secrets", 8.4, Some("2017-12-01")),
            episode(3, 8, "Paradise", 9.0, Some("2020-06-27")),
            episode(3, 9, "Untitled", 7.0, None),
        ])
        .unwrap();
        assert_eq!(show.latest_release(), NaiveDate::from_ymd_opt(2020, 6, 27));
    }
}
