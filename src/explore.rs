use crate::client::{Client, ClientResponse};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::log_debug;
use crate::scraper::{
    IntegrationDetail, IntegrationSummary, Scraper, SearchResult, ShowcaseDetail, ShowcaseSummary,
    TrendingDeveloper, TrendingRepo,
};
use serde::Serialize;
use std::time::Duration;

const SHOWCASE_REQUIRED: &str = "showcase required";
const QUERY_REQUIRED: &str = "query required";
const INTEGRATION_REQUIRED: &str = "integration required";
const INVALID_TYPE: &str = "invalid value for argument type";

pub const STATUS_SUCCESSFUL: &str = "successful";
pub const STATUS_FAILED: &str = "failed";

#[derive(Debug, Clone, Default)]
pub struct ShowcaseListArgs {
    pub page: Option<u32>,
}

#[derive(Debug, Clone, Default)]
pub struct ShowcaseGetArgs {
    pub showcase: Option<String>,
    pub sort: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SearchArgs {
    pub query: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct IntegrationListArgs {
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct IntegrationGetArgs {
    pub integration: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TrendingArgs {
    pub kind: Option<String>,
    pub language: Option<String>,
    pub since: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShowcasePage {
    pub page: u32,
    pub results: Vec<ShowcaseSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResults {
    pub results: Vec<SearchResult>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IntegrationPage {
    pub category: String,
    pub results: Vec<IntegrationSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IntegrationSearchResults {
    pub results: Vec<IntegrationSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryList {
    pub results: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendingPage {
    pub results: TrendingResults,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum TrendingResults {
    Repositories(Vec<TrendingRepo>),
    Developers(Vec<TrendingDeveloper>),
}

/// The JSON wrapper every operation result renders to: `{"status":
/// "successful", ...payload}` on success, `{"status": "failed",
/// "response_status_code": .., "error": ..}` on failure.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Envelope<T: Serialize> {
    Success(SuccessEnvelope<T>),
    Failure(FailureEnvelope),
}

#[derive(Debug, Serialize)]
pub struct SuccessEnvelope<T: Serialize> {
    pub status: &'static str,
    #[serde(flatten)]
    pub payload: T,
}

#[derive(Debug, Serialize)]
pub struct FailureEnvelope {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_status_code: Option<u16>,
    pub error: String,
}

impl<T: Serialize> From<Result<T>> for Envelope<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(payload) => Envelope::Success(SuccessEnvelope {
                status: STATUS_SUCCESSFUL,
                payload,
            }),
            Err(err) => Envelope::Failure(FailureEnvelope {
                status: STATUS_FAILED,
                response_status_code: err.status_code(),
                error: err.to_string(),
            }),
        }
    }
}

pub struct Explore {
    client: Client,
    base_url: String,
    default_sort: String,
    default_since: String,
}

impl Explore {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .base_url(&config.base_url)
            .timeout(Duration::from_secs(config.request_timeout))
            .chrome_impersonation(true)
            .header("user-agent", &config.user_agent)?
            .header("accept", "text/html,application/xhtml+xml")?
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            default_sort: config.default_sort.clone(),
            default_since: config.default_since.clone(),
        })
    }

    pub fn showcases(&self) -> Showcases<'_> {
        Showcases {
            explore: self,
            route: "/showcases",
        }
    }

    pub fn integrations(&self) -> Integrations<'_> {
        Integrations {
            explore: self,
            route: "/integrations",
        }
    }

    pub fn trending(&self) -> Trending<'_> {
        Trending {
            explore: self,
            route: "/trending",
        }
    }

    async fn fetch(&self, path: &str) -> Result<ClientResponse> {
        log_debug!("[explore] GET {}", path);
        self.client.get(path).await
    }
}

pub struct Showcases<'a> {
    explore: &'a Explore,
    route: &'static str,
}

impl Showcases<'_> {
    pub async fn list(&self, args: &ShowcaseListArgs) -> Result<ShowcasePage> {
        let page = args.page.unwrap_or(1);
        let response = self.explore.fetch(&self.list_path(page)).await?;

        let results = Scraper::new(&response.content)
            .showcases()
            .with_base_url(&self.explore.base_url)
            .list()?;
        Ok(ShowcasePage { page, results })
    }

    pub async fn get(&self, args: &ShowcaseGetArgs) -> Result<ShowcaseDetail> {
        let showcase = required(&args.showcase, SHOWCASE_REQUIRED)?;
        let sort = args.sort.as_deref().unwrap_or(&self.explore.default_sort);
        let response = self.explore.fetch(&self.get_path(showcase, sort)).await?;

        Scraper::new(&response.content)
            .showcases()
            .with_base_url(&self.explore.base_url)
            .detail()
    }

    pub async fn search(&self, args: &SearchArgs) -> Result<SearchResults> {
        let query = required(&args.query, QUERY_REQUIRED)?;
        let response = self.explore.fetch(&self.search_path(query)).await?;

        let results = Scraper::new(&response.content).showcases().search()?;
        Ok(SearchResults { results })
    }

    fn list_path(&self, page: u32) -> String {
        format!("{}?page={}", self.route, page)
    }

    fn get_path(&self, showcase: &str, sort: &str) -> String {
        format!("{}/{}?s={}", self.route, showcase, sort)
    }

    fn search_path(&self, query: &str) -> String {
        format!("{}/search?q={}", self.route, query)
    }
}

pub struct Integrations<'a> {
    explore: &'a Explore,
    route: &'static str,
}

impl Integrations<'_> {
    pub async fn list(&self, args: &IntegrationListArgs) -> Result<IntegrationPage> {
        let category = args
            .category
            .as_deref()
            .filter(|category| !category.is_empty())
            .unwrap_or("all");
        let response = self.explore.fetch(&self.list_path(category)).await?;

        let results = Scraper::new(&response.content).integrations().list()?;
        Ok(IntegrationPage {
            category: category.to_string(),
            results,
        })
    }

    pub async fn categories(&self) -> Result<CategoryList> {
        let response = self.explore.fetch(self.route).await?;

        let results = Scraper::new(&response.content).integrations().categories()?;
        Ok(CategoryList { results })
    }

    pub async fn get(&self, args: &IntegrationGetArgs) -> Result<IntegrationDetail> {
        let integration = required(&args.integration, INTEGRATION_REQUIRED)?;
        let response = self.explore.fetch(&self.get_path(integration)).await?;

        Scraper::new(&response.content)
            .integrations()
            .with_base_url(&self.explore.base_url)
            .detail()
    }

    pub async fn search(&self, args: &SearchArgs) -> Result<IntegrationSearchResults> {
        let query = required(&args.query, QUERY_REQUIRED)?;
        let response = self.explore.fetch(&self.search_path(query)).await?;

        let results = Scraper::new(&response.content).integrations().list()?;
        Ok(IntegrationSearchResults { results })
    }

    // The default category is part of the plain listing route.
    fn list_path(&self, category: &str) -> String {
        if category == "all" {
            self.route.to_string()
        } else {
            format!("{}/feature/{}", self.route, category)
        }
    }

    fn get_path(&self, integration: &str) -> String {
        format!("{}/{}", self.route, integration)
    }

    fn search_path(&self, query: &str) -> String {
        format!("{}?query={}", self.route, query)
    }
}

pub struct Trending<'a> {
    explore: &'a Explore,
    route: &'static str,
}

impl Trending<'_> {
    pub async fn list(&self, args: &TrendingArgs) -> Result<TrendingPage> {
        let kind = args.kind.as_deref().unwrap_or("");
        if !kind.is_empty() && kind != "developers" {
            return Err(AppError::Argument(INVALID_TYPE.to_string()));
        }

        let language = args.language.as_deref().filter(|l| !l.is_empty());
        let since = args
            .since
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.explore.default_since);

        let response = self
            .explore
            .fetch(&self.list_path(kind, language, since))
            .await?;

        let scraper = Scraper::new(&response.content);
        let results = if kind == "developers" {
            TrendingResults::Developers(scraper.trending().developers()?)
        } else {
            TrendingResults::Repositories(scraper.trending().repositories()?)
        };
        Ok(TrendingPage { results })
    }

    fn list_path(&self, kind: &str, language: Option<&str>, since: &str) -> String {
        let language = language.map(|l| format!("/{}", l)).unwrap_or_default();
        format!("{}/{}{}?since={}", self.route, kind, language, since)
    }
}

// Required arguments follow the reference behavior: absent and empty are
// both treated as missing.
fn required<'a>(value: &'a Option<String>, message: &str) -> Result<&'a str> {
    value
        .as_deref()
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::Argument(message.to_string()))
}
