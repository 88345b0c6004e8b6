use crate::models::SeriesId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("no genre matches: {0}")]
    UnknownGenre(String),

    #[error("rating is not a valid number: {0:?}")]
    RatingParse(String),

    #[error("season {season} of '{title}' is outside 1..={total_seasons}")]
    SeasonOutOfRange {
        title: String,
        season: u32,
        total_seasons: u32,
    },

    #[error("series '{0}' has no seasons")]
    NoSeasons(String),

    #[error("snapshot holds series {0} more than once")]
    DuplicateId(SeriesId),

    #[error("series '{0}' has not been saved yet")]
    Detached(String),

    #[error("a series titled '{0}' already exists")]
    DuplicateTitle(String),

    #[error("series {0} is not in the catalog")]
    UnknownSeries(SeriesId),

    #[error("episodes of '{title}' do not point back at their series")]
    Inconsistent { title: String },

    #[error("failed to decode payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("metadata unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
