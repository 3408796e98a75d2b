//! Identity wrappers for repositories and pull requests.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use super::error::IntakeError;

/// Default GitHub API base used when none is configured.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Repository owner wrapper to avoid stringly typed parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RepositoryOwner(String);

impl RepositoryOwner {
    /// Validates that the owner is a non-empty path segment.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeError::InvalidRepository`] when the value is empty or
    /// contains a path separator.
    pub fn new(value: &str) -> Result<Self, IntakeError> {
        validate_segment(value)?;
        Ok(Self(value.to_owned()))
    }

    /// Borrow the owner value.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Repository name wrapper to prevent parameter mix-ups.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RepositoryName(String);

impl RepositoryName {
    /// Validates that the name is a non-empty path segment.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeError::InvalidRepository`] when the value is empty or
    /// contains a path separator.
    pub fn new(value: &str) -> Result<Self, IntakeError> {
        validate_segment(value)?;
        Ok(Self(value.to_owned()))
    }

    /// Borrow the repository name.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for RepositoryOwner {
    type Error = IntakeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        validate_segment(&value)?;
        Ok(Self(value))
    }
}

impl From<RepositoryOwner> for String {
    fn from(value: RepositoryOwner) -> Self {
        value.0
    }
}

impl TryFrom<String> for RepositoryName {
    type Error = IntakeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        validate_segment(&value)?;
        Ok(Self(value))
    }
}

impl From<RepositoryName> for String {
    fn from(value: RepositoryName) -> Self {
        value.0
    }
}

/// Owner and name segments are used verbatim as directory names by the
/// artifact store, so anything that could escape the data directory is
/// rejected here.
fn validate_segment(value: &str) -> Result<(), IntakeError> {
    let is_unsafe = value.is_empty()
        || value == "."
        || value == ".."
        || value.contains(['/', '\\'])
        || value.chars().any(char::is_whitespace);
    if is_unsafe {
        return Err(IntakeError::InvalidRepository(value.to_owned()));
    }
    Ok(())
}

/// Pull request number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct PullRequestNumber(u64);

impl PullRequestNumber {
    /// Wraps a positive pull request number.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeError::InvalidPullRequestNumber`] for zero.
    pub const fn new(value: u64) -> Result<Self, IntakeError> {
        if value == 0 {
            return Err(IntakeError::InvalidPullRequestNumber);
        }
        Ok(Self(value))
    }

    /// Returns the numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl TryFrom<u64> for PullRequestNumber {
    type Error = IntakeError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PullRequestNumber> for u64 {
    fn from(value: PullRequestNumber) -> Self {
        value.0
    }
}

impl fmt::Display for PullRequestNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An `owner/repo` pair naming one repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositorySlug {
    owner: RepositoryOwner,
    repository: RepositoryName,
}

impl RepositorySlug {
    /// Creates a slug from separate owner and repository strings.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeError::InvalidRepository`] when either part is empty.
    pub fn new(owner: &str, repository: &str) -> Result<Self, IntakeError> {
        Ok(Self {
            owner: RepositoryOwner::new(owner)?,
            repository: RepositoryName::new(repository)?,
        })
    }

    /// Repository owner.
    #[must_use]
    pub const fn owner(&self) -> &RepositoryOwner {
        &self.owner
    }

    /// Repository name.
    #[must_use]
    pub const fn repository(&self) -> &RepositoryName {
        &self.repository
    }

    /// GitHub search qualifier selecting this repository.
    pub(crate) fn search_qualifier(&self) -> String {
        format!("repo:{self}")
    }

    /// Identity of pull request `number` in this repository.
    #[must_use]
    pub fn pull_request(&self, number: PullRequestNumber) -> PullRequestId {
        PullRequestId::new(self.owner.clone(), self.repository.clone(), number)
    }

    /// Returns true when both slugs name the same GitHub repository.
    ///
    /// GitHub owner and repository names are case-insensitive.
    #[must_use]
    pub fn same_repository(&self, other: &Self) -> bool {
        same_repository(
            (&self.owner, &self.repository),
            (&other.owner, &other.repository),
        )
    }
}

fn same_repository(
    left: (&RepositoryOwner, &RepositoryName),
    right: (&RepositoryOwner, &RepositoryName),
) -> bool {
    same_name(left.0.as_str(), right.0.as_str()) && same_name(left.1.as_str(), right.1.as_str())
}

fn same_name(left: &str, right: &str) -> bool {
    left.bytes()
        .map(|byte| byte.to_ascii_lowercase())
        .eq(right.bytes().map(|byte| byte.to_ascii_lowercase()))
}

impl FromStr for RepositorySlug {
    type Err = IntakeError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        let Some((owner, repository)) = trimmed.split_once('/') else {
            return Err(IntakeError::InvalidRepository(trimmed.to_owned()));
        };
        Self::new(owner, repository)
            .map_err(|_| IntakeError::InvalidRepository(trimmed.to_owned()))
    }
}

impl fmt::Display for RepositorySlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner.as_str(), self.repository.as_str())
    }
}

/// Identity of one pull request across every pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PullRequestId {
    owner: RepositoryOwner,
    repository: RepositoryName,
    number: PullRequestNumber,
}

impl PullRequestId {
    /// Builds an identity from already validated parts.
    #[must_use]
    pub const fn new(
        owner: RepositoryOwner,
        repository: RepositoryName,
        number: PullRequestNumber,
    ) -> Self {
        Self {
            owner,
            repository,
            number,
        }
    }

    /// Builds an identity from raw strings.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeError`] when any component fails validation.
    pub fn parse(owner: &str, repository: &str, number: u64) -> Result<Self, IntakeError> {
        Ok(Self::new(
            RepositoryOwner::new(owner)?,
            RepositoryName::new(repository)?,
            PullRequestNumber::new(number)?,
        ))
    }

    /// Repository owner.
    #[must_use]
    pub const fn owner(&self) -> &RepositoryOwner {
        &self.owner
    }

    /// Repository name.
    #[must_use]
    pub const fn repository(&self) -> &RepositoryName {
        &self.repository
    }

    /// Pull request number.
    #[must_use]
    pub const fn number(&self) -> PullRequestNumber {
        self.number
    }

    /// Returns true when both identities name the same pull request,
    /// ignoring the case of the owner and repository.
    #[must_use]
    pub fn same_pull_request(&self, other: &Self) -> bool {
        self.number == other.number
            && same_repository(
                (&self.owner, &self.repository),
                (&other.owner, &other.repository),
            )
    }

    pub(crate) fn pull_request_path(&self) -> String {
        format!(
            "/repos/{}/{}/pulls/{}",
            self.owner.as_str(),
            self.repository.as_str(),
            self.number.get()
        )
    }

    pub(crate) fn commits_path(&self) -> String {
        format!("{}/commits", self.pull_request_path())
    }

    pub(crate) fn files_path(&self) -> String {
        format!("{}/files", self.pull_request_path())
    }

    pub(crate) fn reviews_path(&self) -> String {
        format!("{}/reviews", self.pull_request_path())
    }
}

impl fmt::Display for PullRequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}#{}",
            self.owner.as_str(),
            self.repository.as_str(),
            self.number
        )
    }
}

/// Parses `owner/repo#number`.
impl FromStr for PullRequestId {
    type Err = IntakeError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        let Some((slug, number)) = trimmed.split_once('#') else {
            return Err(IntakeError::InvalidRepository(trimmed.to_owned()));
        };
        let slug: RepositorySlug = slug.parse()?;
        let number = number
            .trim()
            .parse::<u64>()
            .map_err(|_| IntakeError::InvalidPullRequestNumber)?;
        Ok(slug.pull_request(PullRequestNumber::new(number)?))
    }
}

/// Personal access token wrapper enforcing presence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonalAccessToken(String);

impl PersonalAccessToken {
    /// Validates that the token is non-empty and trims whitespace.
    ///
    /// # Errors
    ///
    /// Returns `IntakeError::MissingToken` when the supplied string is blank.
    pub fn new(token: impl AsRef<str>) -> Result<Self, IntakeError> {
        let trimmed = token.as_ref().trim();
        if trimmed.is_empty() {
            return Err(IntakeError::MissingToken);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the token value.
    #[must_use]
    pub const fn value(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for PersonalAccessToken {
    fn as_ref(&self) -> &str {
        self.value()
    }
}

/// Parses and normalises the GitHub API base URL.
///
/// # Errors
///
/// Returns [`IntakeError::InvalidUrl`] when the value is not an absolute
/// HTTP(S) URL.
pub fn parse_api_base(input: &str) -> Result<Url, IntakeError> {
    let parsed = Url::parse(input.trim())
        .map_err(|error| IntakeError::InvalidUrl(format!("{input}: {error}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(IntakeError::InvalidUrl(format!(
            "{input}: scheme must be http or https"
        )));
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{PullRequestId, RepositorySlug, parse_api_base};
    use crate::github::error::IntakeError;

    #[rstest]
    #[case::plain("octo/widgets", "octo", "widgets")]
    #[case::padded("  octo/widgets ", "octo", "widgets")]
    fn slug_parses_owner_and_repo(
        #[case] input: &str,
        #[case] owner: &str,
        #[case] repo: &str,
    ) {
        let slug: RepositorySlug = input.parse().expect("slug should parse");
        assert_eq!(slug.owner().as_str(), owner);
        assert_eq!(slug.repository().as_str(), repo);
        assert_eq!(slug.search_qualifier(), format!("repo:{owner}/{repo}"));
    }

    #[rstest]
    #[case::missing_separator("widgets")]
    #[case::empty_owner("/widgets")]
    #[case::empty_repo("octo/")]
    #[case::nested("octo/widgets/extra")]
    #[case::dot_dot("../widgets")]
    fn slug_rejects_malformed_input(#[case] input: &str) {
        let result = input.parse::<RepositorySlug>();
        assert!(
            matches!(result, Err(IntakeError::InvalidRepository(_))),
            "expected InvalidRepository for {input:?}, got {result:?}"
        );
    }

    #[test]
    fn identity_rejects_zero_number() {
        let result = PullRequestId::parse("octo", "widgets", 0);
        assert_eq!(result, Err(IntakeError::InvalidPullRequestNumber));
    }

    #[test]
    fn identity_builds_rest_paths() {
        let id = PullRequestId::parse("octo", "widgets", 7).expect("identity should parse");
        assert_eq!(id.pull_request_path(), "/repos/octo/widgets/pulls/7");
        assert_eq!(id.commits_path(), "/repos/octo/widgets/pulls/7/commits");
        assert_eq!(id.files_path(), "/repos/octo/widgets/pulls/7/files");
        assert_eq!(id.reviews_path(), "/repos/octo/widgets/pulls/7/reviews");
        assert_eq!(id.to_string(), "octo/widgets#7");
    }

    #[test]
    fn identity_parses_from_display_form() {
        let id: PullRequestId = "octo/widgets#7".parse().expect("identity should parse");
        assert_eq!(
            id,
            PullRequestId::parse("octo", "widgets", 7).expect("identity should parse")
        );
    }

    #[rstest]
    #[case::no_number("octo/widgets", IntakeError::InvalidRepository("octo/widgets".to_owned()))]
    #[case::not_numeric("octo/widgets#x", IntakeError::InvalidPullRequestNumber)]
    #[case::zero("octo/widgets#0", IntakeError::InvalidPullRequestNumber)]
    #[case::bad_slug("widgets#3", IntakeError::InvalidRepository("widgets".to_owned()))]
    fn identity_rejects_malformed_text(#[case] input: &str, #[case] expected: IntakeError) {
        assert_eq!(input.parse::<PullRequestId>(), Err(expected));
    }

    #[test]
    fn identity_comparison_ignores_repository_case() {
        let lower: PullRequestId = "octo/widgets#5".parse().expect("identity should parse");
        let mixed: PullRequestId = "Octo/Widgets#5".parse().expect("identity should parse");
        let other: PullRequestId = "octo/gadgets#5".parse().expect("identity should parse");

        assert!(lower.same_pull_request(&mixed));
        assert!(!lower.same_pull_request(&other));
    }

    #[rstest]
    #[case::ftp("ftp://example.com")]
    #[case::relative("api.github.com")]
    fn api_base_rejects_non_http(#[case] input: &str) {
        assert!(matches!(
            parse_api_base(input),
            Err(IntakeError::InvalidUrl(_))
        ));
    }
}
