//! The three recommender operations, each run end to end on a worker task:
//! build the request, execute it, classify the outcome.

use std::sync::Arc;

use shared::{
    domain::ViewingContext,
    error::{MOVIES_NOT_FOUND_PREFIX, NO_FAVOURITES_PREFIX},
    protocol::{context_params, TitleList, FAVOURITES_PATH, RECOMMENDATIONS_PATH},
};
use tracing::{debug, info};

use crate::{
    classify::{ClassifiedResult, Classifier, DomainErrorRule, PayloadShape},
    config::Settings,
    request::{endpoint, RequestBuilder, RequestContext, RequestDescriptor, RequestError},
    transport::{HttpTransport, Transport, TransportFailure},
    view_state::{ReconcileMode, ReconcilePlan, ReconcileTarget},
};

const NO_FAVOURITES_FOUND: &str = "No favourite movies found.";
const NO_MOVIES_ADDED: &str = "None of those movies were added.";
const NO_RECOMMENDATIONS_FOUND: &str = "No recommendations found.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchKind {
    Favourites,
    AddFavourites,
    Recommendations,
}

impl FetchKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Favourites => "fetch_favourites",
            Self::AddFavourites => "add_favourites",
            Self::Recommendations => "fetch_recommendations",
        }
    }

    /// How a result of this kind lands in the view state.
    pub fn plan(self) -> ReconcilePlan {
        match self {
            Self::Favourites => ReconcilePlan {
                target: ReconcileTarget::Favourites,
                mode: ReconcileMode::ReplaceAndPopulate,
                empty_notice: NO_FAVOURITES_FOUND,
            },
            Self::AddFavourites => ReconcilePlan {
                target: ReconcileTarget::Favourites,
                mode: ReconcileMode::MergeAppend,
                empty_notice: NO_MOVIES_ADDED,
            },
            Self::Recommendations => ReconcilePlan {
                target: ReconcileTarget::Categories,
                mode: ReconcileMode::ReplaceAndPopulate,
                empty_notice: NO_RECOMMENDATIONS_FOUND,
            },
        }
    }
}

pub struct RecommenderClient {
    transport: Arc<dyn Transport>,
    server_url: String,
    no_favourites_message: Option<String>,
}

impl RecommenderClient {
    pub fn new(server_url: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            server_url: server_url.into(),
            no_favourites_message: None,
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, TransportFailure> {
        let transport = HttpTransport::new(settings.request_timeout())?;
        Ok(Self::new(settings.server_url.clone(), Arc::new(transport))
            .with_no_favourites_message(settings.no_favourites_message.clone()))
    }

    /// Text shown instead of the service's "No favourite…" rejection.
    pub fn with_no_favourites_message(mut self, message: impl Into<String>) -> Self {
        self.no_favourites_message = Some(message.into());
        self
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    pub fn classifier(&self, kind: FetchKind) -> Classifier {
        match kind {
            FetchKind::Favourites => Classifier::new(PayloadShape::List)
                .with_rule(DomainErrorRule::verbatim(NO_FAVOURITES_PREFIX)),
            FetchKind::AddFavourites => Classifier::new(PayloadShape::List)
                .with_rule(DomainErrorRule::verbatim(MOVIES_NOT_FOUND_PREFIX)),
            FetchKind::Recommendations => {
                let rule = match &self.no_favourites_message {
                    Some(message) => DomainErrorRule::substituted(NO_FAVOURITES_PREFIX, message),
                    None => DomainErrorRule::verbatim(NO_FAVOURITES_PREFIX),
                };
                Classifier::new(PayloadShape::Categories).with_rule(rule)
            }
        }
    }

    pub fn favourites_request(
        &self,
        context: &RequestContext,
    ) -> Result<RequestDescriptor, RequestError> {
        RequestBuilder::get(endpoint(&self.server_url, FAVOURITES_PATH))
            .context(context)
            .build()
    }

    pub fn add_favourites_request(
        &self,
        context: &RequestContext,
        titles: &TitleList,
    ) -> Result<RequestDescriptor, RequestError> {
        RequestBuilder::post(endpoint(&self.server_url, FAVOURITES_PATH))
            .context(context)
            .json_body(titles)?
            .build()
    }

    pub fn recommendations_request(
        &self,
        user: &str,
        viewing: &ViewingContext,
    ) -> Result<RequestDescriptor, RequestError> {
        let context = context_params(viewing)
            .into_iter()
            .fold(RequestContext::new(user), |context, (name, value)| {
                context.with_param(name, value)
            });
        RequestBuilder::get(endpoint(&self.server_url, RECOMMENDATIONS_PATH))
            .context(&context)
            .build()
    }

    pub async fn fetch_favourites(&self, user: &str) -> Option<ClassifiedResult> {
        let request = self.favourites_request(&RequestContext::new(user));
        self.run(FetchKind::Favourites, request).await
    }

    pub async fn add_favourites(&self, user: &str, titles: &TitleList) -> Option<ClassifiedResult> {
        let request = self.add_favourites_request(&RequestContext::new(user), titles);
        self.run(FetchKind::AddFavourites, request).await
    }

    pub async fn fetch_recommendations(
        &self,
        user: &str,
        viewing: &ViewingContext,
    ) -> Option<ClassifiedResult> {
        let request = self.recommendations_request(user, viewing);
        self.run(FetchKind::Recommendations, request).await
    }

    async fn run(
        &self,
        kind: FetchKind,
        request: Result<RequestDescriptor, RequestError>,
    ) -> Option<ClassifiedResult> {
        let outcome = match request {
            Ok(request) => {
                debug!(command = kind.as_str(), url = %request.url, "issuing request");
                self.transport.execute(request).await
            }
            Err(err) => Err(TransportFailure::InvalidRequest(err.to_string())),
        };

        let classified = self.classifier(kind).classify(outcome);
        match &classified {
            Some(result) => info!(
                command = kind.as_str(),
                outcome = outcome_label(result),
                "fetch classified"
            ),
            None => info!(command = kind.as_str(), "fetch produced no result to surface"),
        }
        classified
    }
}

fn outcome_label(result: &ClassifiedResult) -> &'static str {
    match result {
        ClassifiedResult::Success(_) => "success",
        ClassifiedResult::Empty => "empty",
        ClassifiedResult::DomainError(_) => "domain_error",
        ClassifiedResult::TransportError(_) => "transport_error",
    }
}

#[cfg(test)]
#[path = "tests/client_tests.rs"]
mod tests;
