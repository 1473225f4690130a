use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{Movie, ViewingContext};

pub const FAVOURITES_PATH: &str = "/favourites";
pub const RECOMMENDATIONS_PATH: &str = "/";

pub const PARAM_USER: &str = "u";
pub const PARAM_TIME_OF_WEEK: &str = "t";
pub const PARAM_VENUE: &str = "loc";
pub const PARAM_COMPANION: &str = "comp";

pub const CATEGORY_COLLAB: &str = "collab";
pub const CATEGORY_CONTENT: &str = "content";

/// Categories the recommender answers with, in display order.
pub const KNOWN_CATEGORIES: [&str; 2] = [CATEGORY_COLLAB, CATEGORY_CONTENT];

pub type MovieList = Vec<Movie>;

/// Contextual recommendations keyed by recommender category.
pub type CategorizedMovies = BTreeMap<String, MovieList>;

/// Body of the add-favourites request: plain titles, matched server side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TitleList(pub Vec<String>);

impl TitleList {
    pub fn single(title: impl Into<String>) -> Self {
        Self(vec![title.into()])
    }
}

pub fn category_label(category: &str) -> &str {
    match category {
        CATEGORY_COLLAB => "Others also like",
        CATEGORY_CONTENT => "Similar to your favourites",
        other => other,
    }
}

/// Query parameters of a contextual recommendation request, in wire order.
pub fn context_params(context: &ViewingContext) -> [(&'static str, &'static str); 3] {
    [
        (PARAM_TIME_OF_WEEK, context.time_of_week.as_str()),
        (PARAM_VENUE, context.venue.as_str()),
        (PARAM_COMPANION, context.companion.as_str()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Companion, TimeOfWeek, Venue};

    #[test]
    fn title_list_serializes_as_plain_array() {
        let body = serde_json::to_string(&TitleList::single("Alien")).expect("json");
        assert_eq!(body, r#"["Alien"]"#);
    }

    #[test]
    fn context_params_use_service_tokens() {
        let params = context_params(&ViewingContext {
            time_of_week: TimeOfWeek::Weekend,
            venue: Venue::Cinema,
            companion: Companion::Family,
        });
        assert_eq!(
            params,
            [("t", "Weekend"), ("loc", "Cinema"), ("comp", "Family")]
        );
    }

    #[test]
    fn unknown_category_label_falls_back_to_key() {
        assert_eq!(category_label(CATEGORY_COLLAB), "Others also like");
        assert_eq!(category_label("trending"), "trending");
    }
}
