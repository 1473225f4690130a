use std::fmt;

use chrono::{Datelike, Local, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);
    };
}

id_newtype!(MovieId);

impl fmt::Display for MovieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tt{:07}", self.0)
    }
}

/// Correlates one fetch with the result it eventually delivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(pub Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One recommendable movie as served by the recommender.
///
/// Values are never mutated after decoding; the wire names follow the
/// service's camelCase JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub movie_id: MovieId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub director: String,
    #[serde(default)]
    pub genres: String,
    #[serde(default)]
    pub actor1: String,
    #[serde(default)]
    pub actor2: String,
    #[serde(default)]
    pub actor3: String,
    #[serde(default)]
    pub plot_keywords: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub imdb_score: f64,
}

impl Movie {
    /// Genres are served as a single `|`-separated string.
    pub fn genre_list(&self) -> Vec<&str> {
        split_pipe_list(&self.genres)
    }

    pub fn keyword_list(&self) -> Vec<&str> {
        split_pipe_list(&self.plot_keywords)
    }

    pub fn cast(&self) -> impl Iterator<Item = &str> {
        [&self.actor1, &self.actor2, &self.actor3]
            .into_iter()
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
    }
}

fn split_pipe_list(raw: &str) -> Vec<&str> {
    raw.split('|')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeOfWeek {
    Weekday,
    Weekend,
}

impl TimeOfWeek {
    pub fn from_weekday(day: Weekday) -> Self {
        match day {
            Weekday::Sat | Weekday::Sun => Self::Weekend,
            _ => Self::Weekday,
        }
    }

    pub fn today() -> Self {
        Self::from_weekday(Local::now().weekday())
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Weekday => "Weekday",
            Self::Weekend => "Weekend",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Venue {
    Home,
    Cinema,
}

impl Venue {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Cinema => "Cinema",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Companion {
    Alone,
    Partner,
    Family,
}

impl Companion {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Alone => "Alone",
            Self::Partner => "Partner",
            Self::Family => "Family",
        }
    }
}

/// Viewing situation the recommender tailors its answer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewingContext {
    pub time_of_week: TimeOfWeek,
    pub venue: Venue,
    pub companion: Companion,
}
