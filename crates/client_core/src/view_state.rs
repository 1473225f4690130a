//! Consumer-side view state and the reconciliation of classified results.
//!
//! Collections keep insertion order and never hold two cards for the same
//! [`MovieId`]. Only [`ViewState::reconcile`] mutates them; everything else is
//! read access for rendering.

use std::collections::{BTreeMap, HashSet};

use shared::{
    domain::{Movie, MovieId},
    protocol::{category_label, MovieList, KNOWN_CATEGORIES},
};
use tracing::{debug, warn};

use crate::classify::{ClassifiedResult, Payload};

pub const GENERIC_FAILURE_NOTICE: &str =
    "Could not reach the recommendation service. Please try again.";

const IMDB_TITLE_BASE_URL: &str = "https://www.imdb.com/title/";

/// A movie paired with the image shown for it.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieCard {
    movie: Movie,
    image_ref: String,
}

impl MovieCard {
    fn new(movie: Movie, image_base_url: &str) -> Self {
        let image_ref = format!("{image_base_url}{}.jpg", movie.movie_id);
        Self { movie, image_ref }
    }

    pub fn movie_id(&self) -> MovieId {
        self.movie.movie_id
    }

    pub fn movie(&self) -> &Movie {
        &self.movie
    }

    pub fn image_ref(&self) -> &str {
        &self.image_ref
    }

    pub fn imdb_url(&self) -> String {
        format!("{IMDB_TITLE_BASE_URL}{}/", self.movie.movie_id)
    }
}

#[derive(Debug, Clone, Default)]
pub struct CardCollection {
    cards: Vec<MovieCard>,
    keys: HashSet<MovieId>,
}

impl CardCollection {
    pub fn cards(&self) -> &[MovieCard] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn contains(&self, movie_id: MovieId) -> bool {
        self.keys.contains(&movie_id)
    }

    pub fn keys(&self) -> Vec<MovieId> {
        self.cards.iter().map(MovieCard::movie_id).collect()
    }

    /// Appends cards for movies not yet present, in payload order.
    /// Returns how many were appended.
    fn append_missing(&mut self, movies: &[Movie], image_base_url: &str) -> usize {
        let before = self.cards.len();
        for movie in movies {
            if self.keys.insert(movie.movie_id) {
                self.cards
                    .push(MovieCard::new(movie.clone(), image_base_url));
            }
        }
        self.cards.len() - before
    }

    fn replace_with(&mut self, movies: &[Movie], image_base_url: &str) -> usize {
        self.cards.clear();
        self.keys.clear();
        self.append_missing(movies, image_base_url)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CollectionKey {
    Favourites,
    Category(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileMode {
    /// Clear, then append the whole payload.
    ReplaceAndPopulate,
    /// Append only keys not already present; existing cards stay put.
    MergeAppend,
}

/// Which collections a result updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileTarget {
    Favourites,
    Categories,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcilePlan {
    pub target: ReconcileTarget,
    pub mode: ReconcileMode,
    pub empty_notice: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Domain,
    Transport,
}

/// What the rendering side should react to after a reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    CollectionChanged(CollectionKey),
    NothingFound(String),
    Failure { kind: FailureKind, message: String },
}

#[derive(Debug, Clone)]
pub struct ViewState {
    image_base_url: String,
    favourites: CardCollection,
    categories: BTreeMap<String, CardCollection>,
}

impl ViewState {
    pub fn new(image_base_url: impl Into<String>) -> Self {
        let categories = KNOWN_CATEGORIES
            .iter()
            .map(|key| (key.to_string(), CardCollection::default()))
            .collect();
        Self {
            image_base_url: image_base_url.into(),
            favourites: CardCollection::default(),
            categories,
        }
    }

    pub fn favourites(&self) -> &CardCollection {
        &self.favourites
    }

    pub fn category(&self, key: &str) -> Option<&CardCollection> {
        self.categories.get(key)
    }

    pub fn categories(&self) -> impl Iterator<Item = (&str, &CardCollection)> {
        self.categories
            .iter()
            .map(|(key, collection)| (key.as_str(), collection))
    }

    pub fn collection(&self, key: &CollectionKey) -> Option<&CardCollection> {
        match key {
            CollectionKey::Favourites => Some(&self.favourites),
            CollectionKey::Category(category) => self.categories.get(category),
        }
    }

    pub fn reconcile(&mut self, plan: ReconcilePlan, result: ClassifiedResult) -> Vec<Notice> {
        match result {
            ClassifiedResult::Success(payload) => self.apply_payload(plan, payload),
            ClassifiedResult::Empty => vec![Notice::NothingFound(plan.empty_notice.to_string())],
            ClassifiedResult::DomainError(message) => vec![Notice::Failure {
                kind: FailureKind::Domain,
                message,
            }],
            ClassifiedResult::TransportError(cause) => {
                warn!("view state: fetch failed in transport: {cause}");
                vec![Notice::Failure {
                    kind: FailureKind::Transport,
                    message: GENERIC_FAILURE_NOTICE.to_string(),
                }]
            }
        }
    }

    fn apply_payload(&mut self, plan: ReconcilePlan, payload: Payload) -> Vec<Notice> {
        match (plan.target, payload) {
            (ReconcileTarget::Favourites, Payload::List(movies)) => apply_to_collection(
                &mut self.favourites,
                CollectionKey::Favourites,
                plan,
                &movies,
                &self.image_base_url,
            )
            .into_iter()
            .collect(),
            (ReconcileTarget::Categories, Payload::Categories(categories)) => {
                let mut notices = Vec::new();
                for (key, movies) in categories {
                    let Some(collection) = self.categories.get_mut(&key) else {
                        debug!(category = %key, "view state: ignoring unknown category");
                        continue;
                    };
                    notices.extend(apply_to_collection(
                        collection,
                        CollectionKey::Category(key),
                        plan,
                        &movies,
                        &self.image_base_url,
                    ));
                }
                notices
            }
            (target, _) => {
                warn!(?target, "view state: payload shape does not match target, ignoring");
                Vec::new()
            }
        }
    }
}

fn apply_to_collection(
    collection: &mut CardCollection,
    key: CollectionKey,
    plan: ReconcilePlan,
    movies: &MovieList,
    image_base_url: &str,
) -> Option<Notice> {
    if movies.is_empty() {
        return Some(Notice::NothingFound(match &key {
            CollectionKey::Favourites => plan.empty_notice.to_string(),
            CollectionKey::Category(category) => format!(
                "{}: {}",
                category_label(category),
                plan.empty_notice
            ),
        }));
    }

    let appended = match plan.mode {
        ReconcileMode::ReplaceAndPopulate => collection.replace_with(movies, image_base_url),
        ReconcileMode::MergeAppend => collection.append_missing(movies, image_base_url),
    };
    debug!(?key, appended, total = collection.len(), "view state: reconciled");

    match plan.mode {
        ReconcileMode::ReplaceAndPopulate => Some(Notice::CollectionChanged(key)),
        ReconcileMode::MergeAppend if appended > 0 => Some(Notice::CollectionChanged(key)),
        ReconcileMode::MergeAppend => None,
    }
}

#[cfg(test)]
#[path = "tests/view_state_tests.rs"]
mod tests;
