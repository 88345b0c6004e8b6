use crate::error::CatalogError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// Closed set of genres a series can be filed under.
///
/// Each genre is spelled three ways: by the OMDb API, by a person typing at
/// the command line, and by a frontend building a URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Genre {
    Action,
    Romance,
    Comedy,
    Drama,
    Crime,
    Adventure,
}

/// Which spelling of a genre a piece of text is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Vocabulary {
    External,
    User,
    Frontend,
}

struct Tokens {
    genre: Genre,
    external: &'static str,
    user: &'static str,
    frontend: &'static str,
}

const TOKENS: [Tokens; 6] = [
    Tokens { genre: Genre::Action, external: "Action", user: "Acción", frontend: "accion" },
    Tokens { genre: Genre::Romance, external: "Romance", user: "Romance", frontend: "romance" },
    Tokens { genre: Genre::Comedy, external: "Comedy", user: "Comedia", frontend: "comedia" },
    Tokens { genre: Genre::Drama, external: "Drama", user: "Drama", frontend: "drama" },
    Tokens { genre: Genre::Crime, external: "Crime", user: "Crimen", frontend: "crimen" },
    Tokens { genre: Genre::Adventure, external: "Adventure", user: "Aventura", frontend: "aventura" },
];

type Lookup = HashMap<String, Genre>;

fn build(token: fn(&Tokens) -> &'static str) -> Lookup {
    TOKENS
        .iter()
        .map(|entry| (token(entry).to_lowercase(), entry.genre))
        .collect()
}

static EXTERNAL: LazyLock<Lookup> = LazyLock::new(|| build(|t| t.external));
static USER: LazyLock<Lookup> = LazyLock::new(|| build(|t| t.user));
static FRONTEND: LazyLock<Lookup> = LazyLock::new(|| build(|t| t.frontend));

impl Genre {
    pub fn from_external(text: &str) -> Result<Self, CatalogError> {
        Self::resolve(&EXTERNAL, text)
    }

    pub fn from_user(text: &str) -> Result<Self, CatalogError> {
        Self::resolve(&USER, text)
    }

    pub fn from_frontend(text: &str) -> Result<Self, CatalogError> {
        Self::resolve(&FRONTEND, text)
    }

    pub fn parse(vocabulary: Vocabulary, text: &str) -> Result<Self, CatalogError> {
        match vocabulary {
            Vocabulary::External => Self::from_external(text),
            Vocabulary::User => Self::from_user(text),
            Vocabulary::Frontend => Self::from_frontend(text),
        }
    }

    pub fn token(self, vocabulary: Vocabulary) -> &'static str {
        let entry = &TOKENS[self as usize];
        match vocabulary {
            Vocabulary::External => entry.external,
            Vocabulary::User => entry.user,
            Vocabulary::Frontend => entry.frontend,
        }
    }

    fn resolve(lookup: &Lookup, text: &str) -> Result<Self, CatalogError> {
        lookup
            .get(&text.to_lowercase())
            .copied()
            .ok_or_else(|| CatalogError::UnknownGenre(text.to_string()))
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token(Vocabulary::External))
    }
}
