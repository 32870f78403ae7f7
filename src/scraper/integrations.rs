use super::{
    child_elements, next_element, nth_next_element, require_attr, sel, sibling_with_class, slugify,
    text_of,
};
use crate::error::{ExtractError, Result};
use crate::utils::html_escape;
use scraper::{ElementRef, Html};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// Leading separator character before the developer name in the info list.
const DEVELOPER_PREFIX_LEN: usize = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrationSummary {
    pub title: String,
    pub description: String,
    pub avatar_image: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrationDetail {
    pub title: String,
    pub description: String,
    pub avatar_image: String,
    pub body_html: String,
    pub developer: String,
    pub developer_url: String,
    pub categories: Vec<String>,
    pub more_info: HashMap<String, Option<String>>,
}

pub struct IntegrationScraper<'a> {
    document: &'a Html,
    base_url: String,
}

impl<'a> IntegrationScraper<'a> {
    pub(crate) fn new(document: &'a Html) -> Self {
        Self {
            document,
            base_url: "https://github.com".to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    // One listing shape serves both the category listing and the search
    // results page.
    pub fn list(&self) -> Result<Vec<IntegrationSummary>> {
        let header_selector = sel(".intgrs-lstng-item-header");

        let mut integrations = Vec::new();
        for header in self.document.select(&header_selector) {
            let avatar = sibling_with_class(header, "avatar")
                .ok_or(ExtractError::MissingElement("integration avatar"))?;

            integrations.push(IntegrationSummary {
                title: text_of(header),
                description: next_element(header).map(text_of).unwrap_or_default(),
                avatar_image: require_attr(avatar, "integration avatar", "src")?.to_string(),
            });
        }
        Ok(integrations)
    }

    pub fn categories(&self) -> Result<Vec<String>> {
        let filter_selector = sel(".filter-item");

        Ok(self
            .document
            .select(&filter_selector)
            .map(|item| text_of(item).to_lowercase())
            .collect())
    }

    pub fn detail(&self) -> Result<IntegrationDetail> {
        let container_selector = sel(".container-lg");
        let container = self
            .document
            .select(&container_selector)
            .next()
            .ok_or(ExtractError::MissingElement("integration container"))?;

        let title = find_text(container, ".lh-condensed");
        let description = find_text(container, ".mb-2");

        let avatar_selector = sel(".avatar");
        let avatar = container
            .select(&avatar_selector)
            .next()
            .ok_or(ExtractError::MissingElement("integration avatar"))?;
        let avatar_image = require_attr(avatar, "integration avatar", "src")?.to_string();

        let body_selector = sel(".markdown-body");
        let body = container
            .select(&body_selector)
            .next()
            .ok_or(ExtractError::MissingElement("markdown body"))?;
        let body_html = html_escape(body.inner_html().trim());

        let info_selector = sel(".pb-3");
        let info_anchor = container
            .select(&info_selector)
            .next()
            .ok_or(ExtractError::MissingElement("info list"))?;

        let developer_entry = nth_next_element(info_anchor, 4)
            .ok_or(ExtractError::MissingElement("developer entry"))?;
        let developer = strip_separator(&text_of(developer_entry));
        let developer_url = format!("{}/{}", self.base_url, developer);

        let categories = category_list(container)?;
        let more_info = more_info(info_anchor)?;

        Ok(IntegrationDetail {
            title,
            description,
            avatar_image,
            body_html,
            developer,
            developer_url,
            categories,
            more_info,
        })
    }
}

fn find_text(scope: ElementRef<'_>, selector: &str) -> String {
    let selector = sel(selector);
    scope
        .select(&selector)
        .next()
        .map(text_of)
        .unwrap_or_default()
}

fn strip_separator(text: &str) -> String {
    let mut chars = text.chars();
    for _ in 0..DEVELOPER_PREFIX_LEN {
        chars.next();
    }
    chars.as_str().to_string()
}

// The category blob is newline/CR delimited; normalize the line breaks to
// commas before splitting and slugifying.
fn category_list(container: ElementRef<'_>) -> Result<Vec<String>> {
    let block_selector = sel(".mb-3");
    let block = container
        .select(&block_selector)
        .last()
        .ok_or(ExtractError::MissingElement("category list"))?;

    Ok(split_categories(&text_of(block)))
}

fn split_categories(text: &str) -> Vec<String> {
    text.to_lowercase()
        .replace("\r\n", ",")
        .replace(['\n', '\r'], ",")
        .split(',')
        .map(slugify)
        .collect()
}

// The more-info block is re-parsed as a standalone fragment; each entry maps
// its label to the href of its link, or to nothing when there is no link.
fn more_info(info_anchor: ElementRef<'_>) -> Result<HashMap<String, Option<String>>> {
    let block = nth_next_element(info_anchor, 2)
        .ok_or(ExtractError::MissingElement("more info block"))?;

    let fragment_html = block.inner_html().trim().replace(['\n', '\r'], "");
    let fragment = Html::parse_fragment(&fragment_html);

    let entry_selector = sel("div");
    let link_selector = sel("a");

    let mut entries = HashMap::new();
    for entry in fragment.select(&entry_selector) {
        let label = child_elements(entry)
            .next()
            .map(text_of)
            .unwrap_or_default()
            .to_lowercase()
            .replace(' ', "_");
        let href = entry
            .select(&link_selector)
            .next()
            .and_then(|link| link.value().attr("href"))
            .map(str::to_string);
        entries.insert(label, href);
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scraper::Scraper;

    const LIST_PAGE: &str = r#"
        <div class="intgrs-lstng-item">
          <img class="avatar" src="https://avatars.test/travis.png">
          <h3 class="intgrs-lstng-item-header">Travis CI</h3>
          <p>Test and deploy with confidence.</p>
        </div>
        <div class="intgrs-lstng-item">
          <img class="avatar" src="https://avatars.test/codecov.png">
          <h3 class="intgrs-lstng-item-header">Codecov</h3>
          <p>Coverage reports, grouped.</p>
        </div>
    "#;

    const DETAIL_PAGE: &str = r#"
        <div class="container-lg">
          <h2 class="lh-condensed">Travis CI</h2>
          <p class="mb-2">Test and deploy with confidence.</p>
          <img class="avatar" src="https://avatars.test/travis.png">
          <div class="markdown-body"><p>Built for &amp; loved by <b>"developers"</b></p></div>
          <div class="pb-3">Pricing</div>
          <div>Free for open source</div>
          <div>
            <div><strong>Website</strong> <a href="https://travis-ci.org">travis-ci.org</a></div>
            <div><strong>Support Email</strong></div>
          </div>
          <div>Installs</div>
          <div>@travis-ci</div>
          <div class="mb-3">Continuous integration
Deployment, Monitoring</div>
        </div>
    "#;

    #[test]
    fn list_extracts_every_integration() {
        let scraper = Scraper::new(LIST_PAGE);
        let integrations = scraper.integrations().list().unwrap();

        assert_eq!(integrations.len(), 2);
        assert_eq!(integrations[0].title, "Travis CI");
        assert_eq!(integrations[0].description, "Test and deploy with confidence.");
        assert_eq!(integrations[0].avatar_image, "https://avatars.test/travis.png");
        assert_eq!(integrations[1].title, "Codecov");
    }

    #[test]
    fn categories_are_lowercased_in_order() {
        let page = r#"
            <ul>
              <li class="filter-item">All</li>
              <li class="filter-item">Code Quality</li>
              <li class="filter-item">Deployment</li>
            </ul>
        "#;
        let scraper = Scraper::new(page);
        let categories = scraper.integrations().categories().unwrap();
        assert_eq!(categories, vec!["all", "code quality", "deployment"]);
    }

    #[test]
    fn detail_extracts_header_and_developer() {
        let scraper = Scraper::new(DETAIL_PAGE);
        let detail = scraper
            .integrations()
            .with_base_url("https://github.com")
            .detail()
            .unwrap();

        assert_eq!(detail.title, "Travis CI");
        assert_eq!(detail.description, "Test and deploy with confidence.");
        assert_eq!(detail.avatar_image, "https://avatars.test/travis.png");
        assert_eq!(detail.developer, "travis-ci");
        assert_eq!(detail.developer_url, "https://github.com/travis-ci");
    }

    #[test]
    fn detail_escapes_the_body_markup() {
        let scraper = Scraper::new(DETAIL_PAGE);
        let detail = scraper.integrations().detail().unwrap();

        assert_eq!(
            detail.body_html,
            "&lt;p&gt;Built for &amp; loved by &lt;b&gt;&quot;developers&quot;&lt;/b&gt;&lt;/p&gt;"
        );
    }

    #[test]
    fn detail_slugifies_categories() {
        let scraper = Scraper::new(DETAIL_PAGE);
        let detail = scraper.integrations().detail().unwrap();

        assert_eq!(
            detail.categories,
            vec!["continuous-integration", "deployment", "monitoring"]
        );
    }

    #[test]
    fn detail_maps_more_info_labels_to_optional_links() {
        let scraper = Scraper::new(DETAIL_PAGE);
        let detail = scraper.integrations().detail().unwrap();

        assert_eq!(
            detail.more_info.get("website"),
            Some(&Some("https://travis-ci.org".to_string()))
        );
        assert_eq!(detail.more_info.get("support_email"), Some(&None));
    }

    #[test]
    fn split_categories_normalizes_line_breaks() {
        let categories = split_categories("Code Quality\r\nDeployment, Monitoring");
        assert_eq!(categories, vec!["code-quality", "deployment", "monitoring"]);
    }
}
