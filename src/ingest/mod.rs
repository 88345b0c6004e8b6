use crate::error::CatalogError;
use crate::genre::Genre;
use crate::models::{Episode, Series};
use crate::omdb::{EpisodeData, SeasonData, SeriesData};
use chrono::NaiveDate;
use tracing::debug;

/// Builds an unsaved, episode-less series from one OMDb payload.
///
/// Only the first listed genre is kept, and the series must have at least
/// one season. A rating that does not parse is an error; it is never
/// replaced with a default.
pub fn build_series(data: &SeriesData) -> Result<Series, CatalogError> {
    if data.total_seasons == 0 {
        return Err(CatalogError::NoSeasons(data.title.clone()));
    }

    let first_genre = data.genre.split(',').next().unwrap_or_default().trim();
    let genre = Genre::from_external(first_genre)?;
    let rating = parse_rating(&data.rating)?;

    debug!("Built series {} ({}, {})", data.title, genre, rating);

    Ok(Series::new(
        data.title.clone(),
        data.total_seasons,
        rating,
        data.poster.clone(),
        genre,
        data.cast.clone(),
        data.synopsis.clone(),
    ))
}

fn parse_rating(text: &str) -> Result<f64, CatalogError> {
    match text.trim().parse::<f64>() {
        Ok(rating) if rating.is_finite() => Ok(rating),
        _ => Err(CatalogError::RatingParse(text.to_string())),
    }
}

/// Flattens per-season payloads into one episode list, in input order.
///
/// Every episode is stamped with the number of the season record it came
/// from.
pub fn aggregate_episodes(seasons: &[SeasonData]) -> Vec<Episode> {
    seasons
        .iter()
        .flat_map(|season| {
            season
                .episodes
                .iter()
                .map(move |data| build_episode(season.number, data))
        })
        .collect()
}

fn build_episode(season: u32, data: &EpisodeData) -> Episode {
    let number = data.number.as_deref().and_then(|n| n.trim().parse().ok());
    let rating = data
        .rating
        .as_deref()
        .and_then(|r| r.trim().parse::<f64>().ok())
        .filter(|r| r.is_finite())
        .unwrap_or(0.0);
    let released = data
        .released
        .as_deref()
        .and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok());

    Episode::new(season, number, data.title.clone(), rating, released)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series_data(genre: &str, rating: &str) -> SeriesData {
        SeriesData {
            title: "Breaking Bad".to_string(),
            total_seasons: 5,
            rating: rating.to_string(),
            poster: "https://m.media-amazon.com/images/M/bb.jpg".to_string(),
            genre: genre.to_string(),
            cast: "Bryan Cranston, Aaron Paul".to_string(),
            synopsis: "A chemistry teacher turns to crime.".to_string(),
        }
    }

    fn episode_data(title: &str, number: &str, rating: &str, released: &str) -> EpisodeData {
        EpisodeData {
            title: title.to_string(),
            number: Some(number.to_string()),
            rating: Some(rating.to_string()),
            released: Some(released.to_string()),
        }
    }

    #[test]
    fn keeps_only_the_first_genre() {
        let series = build_series(&series_data("Action, Crime, Drama", "9.5")).unwrap();
        assert_eq!(series.genre, Genre::Action);
    }

    #[test]
    fn copies_metadata_verbatim() {
        let data = series_data("Drama", " 9.5 ");
        let series = build_series(&data).unwrap();

        assert_eq!(series.id, None);
        assert_eq!(series.title, data.title);
        assert_eq!(series.total_seasons, 5);
        assert_eq!(series.rating, 9.5);
        assert_eq!(series.poster, data.poster);
        assert_eq!(series.cast, data.cast);
        assert_eq!(series.synopsis, data.synopsis);
        assert!(series.episodes().is_empty());
    }

    #[test]
    fn unparseable_rating_is_fatal() {
        for rating in ["N/A", "", "nine", "NaN", "inf"] {
            match build_series(&series_data("Drama", rating)) {
                Err(CatalogError::RatingParse(text)) => assert_eq!(text, rating),
                other => panic!("expected RatingParse for {rating:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn zero_seasons_is_rejected() {
        let mut data = series_data("Drama", "8.0");
        data.total_seasons = 0;
        let result = build_series(&data);
        assert!(matches!(result, Err(CatalogError::NoSeasons(title)) if title == "Breaking Bad"));
    }

    #[test]
    fn unknown_first_genre_is_fatal() {
        let result = build_series(&series_data("Animation, Action", "8.0"));
        assert!(matches!(result, Err(CatalogError::UnknownGenre(text)) if text == "Animation"));
    }

    #[test]
    fn flattens_seasons_in_input_order() {
        let seasons = vec![
            SeasonData {
                number: 1,
                episodes: vec![
                    episode_data("Pilot", "1", "9.0", "2008-01-20"),
                    episode_data("Cat's in the Bag...", "2", "8.6", "2008-01-27"),
                ],
            },
            SeasonData {
                number: 2,
                episodes: vec![episode_data("Seven Thirty-Seven", "1", "8.7", "2009-03-08")],
            },
        ];

        let episodes = aggregate_episodes(&seasons);
        let summary: Vec<_> = episodes
            .iter()
            .map(|e| (e.season, e.number, e.title.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (1, Some(1), "Pilot"),
                (1, Some(2), "Cat's in the Bag..."),
                (2, Some(1), "Seven Thirty-Seven"),
            ]
        );
        assert!(episodes.iter().all(|e| e.series().is_none()));
    }

    #[test]
    fn season_number_comes_from_the_season_record() {
        let seasons = vec![SeasonData {
            number: 3,
            episodes: vec![episode_data("Fly", "10", "7.8", "2010-05-23")],
        }];
        assert_eq!(aggregate_episodes(&seasons)[0].season, 3);
    }

    #[test]
    fn lenient_episode_fields() {
        let seasons = vec![SeasonData {
            number: 1,
            episodes: vec![
                episode_data("Unaired", "N/A", "N/A", "N/A"),
                EpisodeData {
                    title: "Bare".to_string(),
                    number: None,
                    rating: None,
                    released: None,
                },
            ],
        }];

        for episode in aggregate_episodes(&seasons) {
            assert_eq!(episode.number, None);
            assert_eq!(episode.rating, 0.0);
            assert_eq!(episode.released, None);
        }
    }

    #[test]
    fn no_seasons_means_no_episodes() {
        assert!(aggregate_episodes(&[]).is_empty());
    }
}
