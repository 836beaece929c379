//! HTTP implementation of the content API on top of reqwest

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use super::traits::{ApiResult, ContentApi};
use super::types::{ContentResponse, DeleteContent, PutContent, TreeResponse, WriteResponse};
use crate::config::DEFAULT_BRANCH;
use crate::error::{ApiError, ConfigError};
use crate::logging::*;
use crate::types::{ContentRecord, RepositoryTarget, WriteResult};

const USER_AGENT: &str = concat!("repomirror/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Content API client bound to one repository branch
pub struct HttpContentApi {
	client: Client,
	repo_url: Url,
	branch: String,
}

impl HttpContentApi {
	/// Build a client for `target` against the API rooted at `base_url`
	/// (e.g. `https://api.github.com`).
	pub fn new(base_url: &str, target: &RepositoryTarget) -> Result<Self, ConfigError> {
		let mut repo_url = Url::parse(base_url).map_err(|e| ConfigError::InvalidValue {
			field: "apiBaseUrl",
			message: e.to_string(),
		})?;
		repo_url
			.path_segments_mut()
			.map_err(|_| ConfigError::InvalidValue {
				field: "apiBaseUrl",
				message: format!("'{}' cannot be used as a base URL", base_url),
			})?
			.pop_if_empty()
			.extend(["repos", target.owner.as_str(), target.repo.as_str()]);

		let mut auth = HeaderValue::from_str(&format!("token {}", target.auth_token)).map_err(|_| {
			ConfigError::InvalidValue {
				field: "token",
				message: "token contains characters not allowed in a header".to_string(),
			}
		})?;
		auth.set_sensitive(true);

		let mut headers = HeaderMap::new();
		headers.insert(AUTHORIZATION, auth);
		headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));

		let client = Client::builder()
			.default_headers(headers)
			.user_agent(USER_AGENT)
			.timeout(REQUEST_TIMEOUT)
			.build()
			.map_err(|e| ConfigError::InvalidValue { field: "apiBaseUrl", message: e.to_string() })?;

		Ok(HttpContentApi { client, repo_url, branch: target.branch.clone() })
	}

	fn url_for<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Url {
		let mut url = self.repo_url.clone();
		if let Ok(mut path) = url.path_segments_mut() {
			path.extend(segments.into_iter().filter(|s| !s.is_empty()));
		}
		url
	}

	fn contents_url(&self, path: &str) -> Url {
		self.url_for(std::iter::once("contents").chain(path.split('/')))
	}

	/// Lookups read the configured branch, not the repository default
	fn contents_ref_url(&self, path: &str) -> Url {
		let mut url = self.contents_url(path);
		url.query_pairs_mut().append_pair("ref", &self.branch);
		url
	}

	/// Write body, naming the branch unless it is the default one
	fn on_branch<'a, T: Serialize>(&'a self, body: &'a T) -> OnBranch<'a, T> {
		let branch = Some(self.branch.as_str()).filter(|b| *b != DEFAULT_BRANCH);
		OnBranch { body, branch }
	}

	fn tree_url(&self) -> Url {
		let mut url = self.url_for(["git", "trees"].into_iter().chain(self.branch.split('/')));
		url.query_pairs_mut().append_pair("recursive", "1");
		url
	}
}

/// Write body plus the target branch; bodies for the default branch stay unchanged
#[derive(Serialize)]
struct OnBranch<'a, T> {
	#[serde(flatten)]
	body: &'a T,
	#[serde(skip_serializing_if = "Option::is_none")]
	branch: Option<&'a str>,
}

async fn parse_body<T: DeserializeOwned>(
	response: Response,
	endpoint: &'static str,
) -> ApiResult<T> {
	let body = response.text().await?;
	serde_json::from_str(&body)
		.map_err(|e| ApiError::UnexpectedResponse { endpoint, message: e.to_string() })
}

async fn status_error(response: Response) -> ApiError {
	let status = response.status().as_u16();
	let body = response.text().await.unwrap_or_default();
	ApiError::Status { status, body }
}

#[async_trait]
impl ContentApi for HttpContentApi {
	async fn list_tree(&self) -> ApiResult<TreeResponse> {
		let url = self.tree_url();
		debug!("GET {}", url);
		let response = self.client.get(url).send().await?;
		match response.status() {
			StatusCode::OK => {
				parse_body(response, "tree").await
			}
			// An empty repository has no branch to list; the store answers 409 for it
			StatusCode::NOT_FOUND | StatusCode::CONFLICT => {
				Err(ApiError::NotFound { path: self.branch.clone() })
			}
			_ => Err(status_error(response).await),
		}
	}

	async fn get_content(&self, path: &str) -> ApiResult<ContentRecord> {
		let url = self.contents_ref_url(path);
		debug!("GET {}", url);
		let response = self.client.get(url).send().await?;
		match response.status() {
			StatusCode::OK => {
				let content: ContentResponse = parse_body(response, "contents").await?;
				content.into_record()
			}
			StatusCode::NOT_FOUND => Err(ApiError::NotFound { path: path.to_string() }),
			_ => Err(status_error(response).await),
		}
	}

	async fn put_content(&self, path: &str, request: &PutContent) -> ApiResult<WriteResult> {
		let url = self.contents_url(path);
		debug!("PUT {} (update: {})", url, request.sha.is_some());
		let response = self.client.put(url).json(&self.on_branch(request)).send().await?;
		let status = response.status();
		if status == StatusCode::OK || status == StatusCode::CREATED {
			// A body we cannot read does not undo an accepted write
			let revision = parse_body::<WriteResponse>(response, "contents")
				.await
				.ok()
				.and_then(|r| r.content)
				.map(|c| c.sha);
			Ok(WriteResult { status: status.as_u16(), revision })
		} else {
			Err(status_error(response).await)
		}
	}

	async fn delete_content(&self, path: &str, request: &DeleteContent) -> ApiResult<()> {
		let url = self.contents_url(path);
		debug!("DELETE {}", url);
		let response = self.client.delete(url).json(&self.on_branch(request)).send().await?;
		if response.status() == StatusCode::OK {
			Ok(())
		} else {
			Err(status_error(response).await)
		}
	}
}


// vim: ts=4
