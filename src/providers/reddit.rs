use futures::stream::{self, BoxStream, StreamExt};
use log::{debug, info};
use reqwest::{Client, StatusCode, header};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::SourceConfig;
use crate::errors::ProviderError;
use crate::providers::{CandidateFilter, ContentSource, Post};

/// Reddit listing client using application-only OAuth
#[derive(Debug, Clone)]
pub struct RedditSource {
    /// HTTP client for API requests
    client: Client,
    /// Credentials, endpoints and user agent
    config: Arc<SourceConfig>,
}

/// OAuth token response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    children: Vec<ListingChild>,
    after: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListingChild {
    data: RedditPost,
}

#[derive(Debug, Deserialize)]
struct RedditPost {
    id: String,
    title: String,
    #[serde(default)]
    selftext: String,
    #[serde(default)]
    is_self: bool,
    #[serde(default)]
    over_18: bool,
    #[serde(default)]
    stickied: bool,
}

impl RedditPost {
    fn into_candidate(self, allow_nsfw: bool) -> Option<Post> {
        let body = self.selftext.trim();
        if !self.is_self || self.stickied || (self.over_18 && !allow_nsfw) {
            return None;
        }
        if body.is_empty() || body == "[removed]" || body == "[deleted]" {
            return None;
        }
        Some(Post::new(self.id, self.title.trim(), body))
    }
}

/// Pagination state of one candidate stream
struct ListingCursor {
    source: RedditSource,
    filter: CandidateFilter,
    token: Option<String>,
    after: Option<String>,
    pages_read: u32,
    exhausted: bool,
}

impl ListingCursor {
    async fn next_page(&mut self) -> Result<Vec<Post>, ProviderError> {
        let token = match &self.token {
            Some(token) => token.clone(),
            None => {
                let token = self.source.authenticate().await?;
                self.token = Some(token.clone());
                token
            }
        };

        let listing = self
            .source
            .fetch_listing(&token, &self.filter, self.after.as_deref())
            .await?;

        self.pages_read += 1;
        self.after = listing.data.after;
        if self.after.is_none() {
            self.exhausted = true;
        }

        let fetched = listing.data.children.len();
        let posts: Vec<Post> = listing
            .data
            .children
            .into_iter()
            .filter_map(|child| child.data.into_candidate(self.filter.allow_nsfw))
            .collect();
        debug!(
            "Reddit page {}: {} post(s), {} usable",
            self.pages_read,
            fetched,
            posts.len()
        );
        Ok(posts)
    }
}

impl RedditSource {
    /// Create a new client from the source configuration
    pub fn new(config: &SourceConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .unwrap_or_default(),
            config: Arc::new(config.clone()),
        }
    }

    /// Obtain an application-only access token
    async fn authenticate(&self) -> Result<String, ProviderError> {
        let response = self
            .client
            .post(&self.config.auth_endpoint)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .header(header::USER_AGENT, &self.config.user_agent)
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        let response = Self::check_status(response).await?;
        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Reddit token response: {}", e)))?;

        info!("Authenticated with Reddit");
        Ok(token.access_token)
    }

    async fn fetch_listing(
        &self,
        token: &str,
        filter: &CandidateFilter,
        after: Option<&str>,
    ) -> Result<Listing, ProviderError> {
        let subreddits = filter
            .subreddits
            .iter()
            .map(|s| s.trim().trim_start_matches("r/"))
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("+");
        if subreddits.is_empty() {
            return Err(ProviderError::InvalidInput("no subreddit given".to_string()));
        }

        let url = format!(
            "{}/r/{}/{}",
            self.config.api_endpoint.trim_end_matches('/'),
            subreddits,
            filter.listing.as_path()
        );
        let limit = filter.page_size.to_string();
        let mut query = vec![("limit", limit.as_str()), ("raw_json", "1")];
        if let Some(after) = after {
            query.push(("after", after));
        }

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .header(header::USER_AGENT, &self.config.user_agent)
            .query(&query)
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        let response = Self::check_status(response).await?;
        response
            .json::<Listing>()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Reddit listing: {}", e)))
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to get error response text".to_string());
        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                ProviderError::AuthenticationError(format!("{}: {}", status, message))
            }
            StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimitExceeded(message),
            _ => ProviderError::ApiError {
                status_code: status.as_u16(),
                message,
            },
        })
    }

    fn map_request_error(&self, error: reqwest::Error) -> ProviderError {
        if error.is_timeout() {
            ProviderError::Timeout {
                operation: "Reddit request".to_string(),
                after: Duration::from_secs(self.config.timeout_secs),
            }
        } else if error.is_connect() {
            ProviderError::ConnectionError(error.to_string())
        } else {
            ProviderError::RequestFailed(error.to_string())
        }
    }
}

impl ContentSource for RedditSource {
    fn fetch_candidates(&self, filter: &CandidateFilter) -> BoxStream<'static, Result<Post, ProviderError>> {
        let cursor = ListingCursor {
            source: self.clone(),
            filter: filter.clone(),
            token: None,
            after: None,
            pages_read: 0,
            exhausted: false,
        };

        stream::unfold(cursor, |mut cursor| async move {
            if cursor.exhausted || cursor.pages_read >= cursor.filter.max_pages {
                return None;
            }
            let items = match cursor.next_page().await {
                Ok(posts) => posts.into_iter().map(Ok).collect::<Vec<_>>(),
                Err(e) => {
                    cursor.exhausted = true;
                    vec![Err(e)]
                }
            };
            Some((stream::iter(items), cursor))
        })
        .flatten()
        .boxed()
    }
}
