//! Octocrab implementation of the pull request gateway.

use async_trait::async_trait;
use http::{StatusCode, Uri};
use octocrab::{Octocrab, Page};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::github::error::IntakeError;
use crate::github::locator::{PersonalAccessToken, PullRequestId};
use crate::github::models::{
    ApiChangedFile, ApiCommit, ApiPullRequest, ApiReview, PullRequestDetail,
};

use super::PullRequestGateway;
use super::client::build_octocrab_client;
use super::error_mapping::{map_http_error, map_octocrab_error};
use super::http_utils::{diff_headers, extract_github_message};

/// Octocrab-backed gateway for pull request detail and diff text.
pub struct OctocrabPullRequestGateway {
    client: Octocrab,
}

impl OctocrabPullRequestGateway {
    /// Creates a new gateway from an Octocrab client.
    #[must_use]
    pub const fn new(client: Octocrab) -> Self {
        Self { client }
    }

    /// Builds a gateway authenticated with `token` against `api_base`.
    ///
    /// # Errors
    ///
    /// Returns `IntakeError::InvalidUrl` when the base URI cannot be parsed or
    /// `IntakeError::Api` when Octocrab fails to construct a client.
    pub fn for_token(token: &PersonalAccessToken, api_base: &Url) -> Result<Self, IntakeError> {
        Ok(Self::new(build_octocrab_client(token, api_base)?))
    }

    async fn list_all<T: DeserializeOwned>(
        &self,
        path: String,
        operation: &str,
    ) -> Result<Vec<T>, IntakeError> {
        let page = self
            .client
            .get::<Page<T>, _, _>(path, Some(&[("per_page", "100")]))
            .await
            .map_err(|error| map_octocrab_error(operation, &error))?;

        self.client
            .all_pages(page)
            .await
            .map_err(|error| map_octocrab_error(operation, &error))
    }
}

#[async_trait]
impl PullRequestGateway for OctocrabPullRequestGateway {
    async fn pull_request_detail(
        &self,
        id: &PullRequestId,
    ) -> Result<PullRequestDetail, IntakeError> {
        debug!(pull_request = %id, "fetching pull request detail");
        let pull_request = self
            .client
            .get::<ApiPullRequest, _, _>(id.pull_request_path(), None::<&()>)
            .await
            .map_err(|error| map_octocrab_error("pull request", &error))?;
        let commits = self
            .list_all::<ApiCommit>(id.commits_path(), "pull request commits")
            .await?;
        let files = self
            .list_all::<ApiChangedFile>(id.files_path(), "pull request files")
            .await?;
        let reviews = self
            .list_all::<ApiReview>(id.reviews_path(), "pull request reviews")
            .await?;

        pull_request.into_detail(commits, files, reviews)
    }

    async fn pull_request_diff(&self, id: &PullRequestId) -> Result<String, IntakeError> {
        debug!(pull_request = %id, "fetching pull request diff");
        let uri: Uri = id
            .pull_request_path()
            .parse::<Uri>()
            .map_err(|error| IntakeError::InvalidUrl(error.to_string()))?;

        let response = self
            .client
            ._get_with_headers(uri, Some(diff_headers()))
            .await
            .map_err(|error| map_octocrab_error("pull request diff", &error))?;
        let status = response.status();
        let body = self
            .client
            .body_to_string(response)
            .await
            .map_err(|error| map_octocrab_error("pull request diff", &error))?;

        if status == StatusCode::OK {
            Ok(body)
        } else {
            Err(map_http_error(
                "pull request diff",
                status,
                extract_github_message(&body),
            ))
        }
    }
}
