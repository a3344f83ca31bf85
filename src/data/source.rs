use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use thiserror::Error;
use tracing::{info, warn};

use super::filters::FilterSelection;
use super::model::Dataset;
use super::sample::sample_dataset;

const CLUSTERS_PATH: &str = "/cluster/get-clusters";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("authentication required (status {status})")]
    Unauthorized { status: u16 },

    #[error("cluster API error (status {status}): {message}")]
    Http { status: u16, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("invalid cluster payload: {0}")]
    Parse(String),

    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },
}

impl FetchError {
    pub fn from_status(status: StatusCode, body: String) -> Self {
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            Self::Unauthorized {
                status: status.as_u16(),
            }
        } else {
            Self::Http {
                status: status.as_u16(),
                message: body,
            }
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => Self::from_status(status, err.to_string()),
            None => Self::Network(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
    device_id: Option<String>,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        token: Option<String>,
        device_id: Option<String>,
    ) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
            device_id,
        })
    }

    pub fn clusters_url(&self) -> String {
        format!("{}{CLUSTERS_PATH}", self.base_url)
    }

    pub fn fetch_clusters(&self, selection: &FilterSelection) -> Result<Dataset, FetchError> {
        let mut request = self
            .client
            .get(self.clusters_url())
            .query(&selection.query_pairs());
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(device_id) = &self.device_id {
            request = request.header("Device", device_id);
        }

        let resp = request.send()?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(FetchError::from_status(status, body));
        }

        let body = resp.text()?;
        Ok(Dataset::from_json(&body)?)
    }
}

pub enum DataSource {
    Sample,
    File(PathBuf),
    Api(ApiClient),
}

impl DataSource {
    pub fn describe(&self) -> String {
        match self {
            Self::Sample => "built-in sample".to_string(),
            Self::File(path) => path.display().to_string(),
            Self::Api(client) => client.clusters_url(),
        }
    }

    pub fn fetch(&self, selection: &FilterSelection) -> Result<Dataset, FetchError> {
        match self {
            Self::Sample => Ok(filter_locally(sample_dataset(), selection)),
            Self::File(path) => {
                let raw = fs::read_to_string(path).map_err(|err| FetchError::Io {
                    path: path.display().to_string(),
                    message: err.to_string(),
                })?;
                Ok(filter_locally(Dataset::from_json(&raw)?, selection))
            }
            Self::Api(client) => client.fetch_clusters(selection),
        }
    }
}

/// Result of a load, flagged when the sample dataset stands in for real data.
#[derive(Clone, Debug)]
pub struct LoadedData {
    pub dataset: Dataset,
    pub is_sample: bool,
    pub fallback_reason: Option<String>,
}

pub fn load_with_fallback(
    source: &DataSource,
    selection: &FilterSelection,
) -> Result<LoadedData, FetchError> {
    let result = source.fetch(selection);
    let loaded = resolve_fallback(result, selection)?;
    info!(
        source = %source.describe(),
        clusters = loaded.dataset.clusters.len(),
        questions = loaded.dataset.questions.len(),
        sample = loaded.is_sample,
        "cluster dataset loaded"
    );
    Ok(loaded)
}

/// Authentication failures pass through untouched; any other failure is
/// replaced by the sample dataset so the graph stays demonstrable.
pub fn resolve_fallback(
    result: Result<Dataset, FetchError>,
    selection: &FilterSelection,
) -> Result<LoadedData, FetchError> {
    match result {
        Ok(dataset) => Ok(LoadedData {
            dataset,
            is_sample: false,
            fallback_reason: None,
        }),
        Err(err) if err.is_auth() => Err(err),
        Err(err) => {
            warn!(error = %err, "cluster fetch failed; using sample dataset");
            Ok(LoadedData {
                dataset: filter_locally(sample_dataset(), selection),
                is_sample: true,
                fallback_reason: Some(err.to_string()),
            })
        }
    }
}

fn filter_locally(mut dataset: Dataset, selection: &FilterSelection) -> Dataset {
    if !selection.is_empty() {
        dataset
            .questions
            .retain(|question| selection.matches(question));
    }
    dataset
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_statuses_are_classified_as_unauthorized() {
        assert!(FetchError::from_status(StatusCode::UNAUTHORIZED, String::new()).is_auth());
        assert!(FetchError::from_status(StatusCode::FORBIDDEN, String::new()).is_auth());
        let server = FetchError::from_status(StatusCode::BAD_GATEWAY, "upstream".into());
        assert!(!server.is_auth());
        assert_eq!(
            server.to_string(),
            "cluster API error (status 502): upstream"
        );
    }

    #[test]
    fn authentication_failures_are_never_masked_by_sample_data() {
        let result = resolve_fallback(
            Err(FetchError::Unauthorized { status: 401 }),
            &FilterSelection::default(),
        );
        assert!(matches!(result, Err(FetchError::Unauthorized { status: 401 })));
    }

    #[test]
    fn other_failures_fall_back_to_the_sample_dataset() {
        let loaded = resolve_fallback(
            Err(FetchError::Network("connection refused".into())),
            &FilterSelection::default(),
        )
        .expect("fallback succeeds");
        assert!(loaded.is_sample);
        assert!(!loaded.dataset.clusters.is_empty());
        assert!(
            loaded
                .fallback_reason
                .as_deref()
                .is_some_and(|reason| reason.contains("connection refused"))
        );
    }

    #[test]
    fn clusters_url_joins_base_without_double_slash() {
        let client = ApiClient::new("https://pv.example.com/api/", None, None).expect("client");
        assert_eq!(
            client.clusters_url(),
            "https://pv.example.com/api/cluster/get-clusters"
        );
    }

    #[test]
    fn missing_file_reports_io_error() {
        let source = DataSource::File(PathBuf::from("/definitely/not/here.json"));
        let err = source
            .fetch(&FilterSelection::default())
            .expect_err("missing file");
        assert!(matches!(err, FetchError::Io { .. }));
    }

    #[test]
    fn sample_source_applies_filters_locally() {
        let full = DataSource::Sample
            .fetch(&FilterSelection::default())
            .expect("sample");
        let mut selection = FilterSelection::default();
        selection.countries.insert("US".into());
        let filtered = DataSource::Sample.fetch(&selection).expect("sample");

        assert_eq!(filtered.clusters.len(), full.clusters.len());
        assert!(filtered.questions.len() < full.questions.len());
        assert!(
            filtered
                .questions
                .iter()
                .all(|question| question.country_code == "US")
        );
    }
}
