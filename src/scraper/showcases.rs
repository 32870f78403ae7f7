use super::{
    child_elements, next_element, nth_next_element, own_text, parse_count, require_attr, sel,
    sibling_with_class, text_of,
};
use crate::error::{ExtractError, Result};
use chrono::NaiveDate;
use scraper::{ElementRef, Html};
use serde::{Deserialize, Serialize};

// Length of the inline `background-image: ` prefix in the header style
// attribute; the remainder is the url(...) token.
const HEADER_STYLE_PREFIX_LEN: usize = 18;

// Length of the label preceding the date in the page meta footer.
const LAST_UPDATED_PREFIX_LEN: usize = 23;

const LAST_UPDATED_FORMAT: &str = "%B %e, %Y";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShowcaseSummary {
    pub title: String,
    pub description: String,
    pub repositories: u64,
    pub languages: u64,
    pub header_image: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShowcaseDetail {
    pub title: String,
    pub description: String,
    pub repositories: Vec<RepositorySummary>,
    pub languages: String,
    pub last_updated: Option<i64>,
    pub related_showcases: Vec<OtherShowcase>,
    pub new_showcases: Vec<OtherShowcase>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtherShowcase {
    pub title: String,
    pub description: String,
    pub header_image: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositorySummary {
    pub author: String,
    pub name: String,
    pub avatar_image: String,
    pub description: String,
    pub url: String,
    pub language: String,
    pub stars: u64,
    pub forks: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub description: String,
}

pub struct ShowcaseScraper<'a> {
    document: &'a Html,
    base_url: String,
}

impl<'a> ShowcaseScraper<'a> {
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

    pub fn list(&self) -> Result<Vec<ShowcaseSummary>> {
        let header_selector = sel(r#"div[class="exploregrid-item-header"]"#);

        let mut showcases = Vec::new();
        for header in self.document.select(&header_selector) {
            showcases.push(self.list_item(header)?);
        }
        Ok(showcases)
    }

    fn list_item(&self, header: ElementRef<'_>) -> Result<ShowcaseSummary> {
        let title = next_element(header).map(text_of).unwrap_or_default();
        let description = nth_next_element(header, 2).map(text_of).unwrap_or_default();

        let meta = sibling_with_class(header, "exploregrid-item-meta")
            .ok_or(ExtractError::MissingElement("exploregrid-item-meta"))?;
        let counts: Vec<ElementRef> = child_elements(meta).collect();
        let repositories = parse_count(
            "repositories",
            &counts.first().copied().map(text_of).unwrap_or_default(),
        )?;
        let languages = parse_count(
            "languages",
            &counts.last().copied().map(text_of).unwrap_or_default(),
        )?;

        let header_image = header_image(header)?;

        Ok(ShowcaseSummary {
            title,
            description,
            repositories,
            languages,
            header_image,
        })
    }

    pub fn detail(&self) -> Result<ShowcaseDetail> {
        let repositories = self.repository_rows()?;

        let title = self.select_text(".showcase-page-title");
        let description = self.select_text(".showcase-page-description");

        let meta_selector = sel(".showcase-page-meta");
        let meta = self.document.select(&meta_selector).next();
        let languages = meta
            .and_then(|m| child_elements(m).nth(1))
            .map(text_of)
            .unwrap_or_default();
        let last_updated = meta
            .and_then(|m| child_elements(m).last())
            .map(text_of)
            .and_then(|text| parse_last_updated(&text));

        // First two are related, the rest are new.
        let mut related_showcases = self.other_showcases()?;
        let new_showcases = related_showcases.split_off(related_showcases.len().min(2));

        Ok(ShowcaseDetail {
            title,
            description,
            repositories,
            languages,
            last_updated,
            related_showcases,
            new_showcases,
        })
    }

    pub fn search(&self) -> Result<Vec<SearchResult>> {
        let title_selector = sel(".collection-search-result-title");

        Ok(self
            .document
            .select(&title_selector)
            .map(|title_el| SearchResult {
                title: text_of(title_el),
                description: next_element(title_el).map(text_of).unwrap_or_default(),
            })
            .collect())
    }

    fn repository_rows(&self) -> Result<Vec<RepositorySummary>> {
        let row_selector = sel(".repo-list-item");

        let mut repositories = Vec::new();
        for row in self.document.select(&row_selector) {
            repositories.push(self.repository_row(row)?);
        }
        Ok(repositories)
    }

    fn repository_row(&self, row: ElementRef<'_>) -> Result<RepositorySummary> {
        let link_selector = sel(".mb-1 a");
        let link = row
            .select(&link_selector)
            .next()
            .ok_or(ExtractError::MissingElement("repository title link"))?;

        let author = child_elements(link)
            .next()
            .map(text_of)
            .unwrap_or_default()
            .replace(' ', "")
            .replacen('/', "", 1);
        let name = own_text(link);

        let href = require_attr(link, "repository title link", "href")?;
        let url = format!("{}{}", self.base_url, href);

        let avatar_selector = sel(".avatar");
        let avatar = row
            .select(&avatar_selector)
            .next()
            .ok_or(ExtractError::MissingElement("repository avatar"))?;
        let avatar_image = require_attr(avatar, "repository avatar", "src")?.to_string();

        let description = child_elements(row).nth(2).map(text_of).unwrap_or_default();

        let language_selector = sel(".mr-3");
        let language = row
            .select(&language_selector)
            .next()
            .map(text_of)
            .unwrap_or_default();

        let stats_selector = sel("a.muted-link");
        let mut stats = row.select(&stats_selector);
        let stars = parse_count("stars", &stats.next().map(text_of).unwrap_or_default())?;
        let forks = parse_count("forks", &stats.next().map(text_of).unwrap_or_default())?;

        Ok(RepositorySummary {
            author,
            name,
            avatar_image,
            description,
            url,
            language,
            stars,
            forks,
        })
    }

    fn other_showcases(&self) -> Result<Vec<OtherShowcase>> {
        let title_selector = sel(".exploregrid-item-title");

        let mut showcases = Vec::new();
        for title_el in self.document.select(&title_selector) {
            let header = sibling_with_class(title_el, "exploregrid-item-header")
                .ok_or(ExtractError::MissingElement("exploregrid-item-header"))?;

            showcases.push(OtherShowcase {
                title: text_of(title_el),
                description: next_element(title_el).map(text_of).unwrap_or_default(),
                header_image: header_image(header)?,
            });
        }
        Ok(showcases)
    }

    fn select_text(&self, selector: &str) -> String {
        let selector = sel(selector);
        self.document
            .select(&selector)
            .next()
            .map(text_of)
            .unwrap_or_default()
    }
}

fn header_image(header: ElementRef<'_>) -> Result<String> {
    let style = require_attr(header, "exploregrid-item-header", "style")?;
    Ok(style
        .get(HEADER_STYLE_PREFIX_LEN..)
        .unwrap_or_default()
        .to_string())
}

fn parse_last_updated(text: &str) -> Option<i64> {
    let date = text.get(LAST_UPDATED_PREFIX_LEN..)?.trim_end();
    let parsed = NaiveDate::parse_from_str(date, LAST_UPDATED_FORMAT).ok()?;
    Some(parsed.and_hms_opt(0, 0, 0)?.and_utc().timestamp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::scraper::Scraper;

    const LIST_PAGE: &str = r#"
        <div class="exploregrid">
          <div class="exploregrid-item">
            <div class="exploregrid-item-header" style="background-image: url(https://img.test/security.png)"></div>
            <h3 class="exploregrid-item-title">Security</h3>
            <p class="exploregrid-item-body">Tools to keep your code safe.</p>
            <div class="exploregrid-item-meta">
              <span>24 repositories</span>
              <span>7 languages</span>
            </div>
          </div>
          <div class="exploregrid-item">
            <div class="exploregrid-item-header" style="background-image: url(https://img.test/ml.png)"></div>
            <h3 class="exploregrid-item-title">Machine learning</h3>
            <p class="exploregrid-item-body">Frameworks, tools, and datasets.</p>
            <div class="exploregrid-item-meta">
              <span>31 repositories</span>
              <span>12 languages</span>
            </div>
          </div>
        </div>
    "#;

    const DETAIL_PAGE: &str = r#"
        <h1 class="showcase-page-title">Machine learning</h1>
        <p class="showcase-page-description">Frameworks, tools, and datasets.</p>
        <div class="showcase-page-meta">
          <span>Languages:</span>
          <span>Python</span>
          <span>Showcase last updated: August 3, 2016 </span>
        </div>
        <ol>
          <li class="repo-list-item">
            <h3 class="mb-1"><a href="/scikit-learn/scikit-learn"><span>scikit-learn /</span> scikit-learn</a></h3>
            <img class="avatar" src="https://avatars.test/sklearn.png">
            <p>Machine learning in Python</p>
            <div>
              <span class="mr-3">Python</span>
              <a class="muted-link" href="#">16,426</a>
              <a class="muted-link" href="#">9,321</a>
            </div>
          </li>
        </ol>
        <div class="exploregrid-item">
          <div class="exploregrid-item-header" style="background-image: url(https://img.test/one.png)"></div>
          <h3 class="exploregrid-item-title">One</h3>
          <p>First related.</p>
        </div>
        <div class="exploregrid-item">
          <div class="exploregrid-item-header" style="background-image: url(https://img.test/two.png)"></div>
          <h3 class="exploregrid-item-title">Two</h3>
          <p>Second related.</p>
        </div>
        <div class="exploregrid-item">
          <div class="exploregrid-item-header" style="background-image: url(https://img.test/three.png)"></div>
          <h3 class="exploregrid-item-title">Three</h3>
          <p>First new.</p>
        </div>
    "#;

    #[test]
    fn list_extracts_every_showcase() {
        let scraper = Scraper::new(LIST_PAGE);
        let showcases = scraper.showcases().list().unwrap();

        assert_eq!(showcases.len(), 2);
        assert_eq!(showcases[0].title, "Security");
        assert_eq!(showcases[0].description, "Tools to keep your code safe.");
        assert_eq!(showcases[0].repositories, 24);
        assert_eq!(showcases[0].languages, 7);
        assert_eq!(
            showcases[0].header_image,
            "url(https://img.test/security.png)"
        );
        assert_eq!(showcases[1].repositories, 31);
    }

    #[test]
    fn list_fails_when_counts_have_no_digits() {
        let page = r#"
            <div class="exploregrid-item">
              <div class="exploregrid-item-header" style="background-image: url(x)"></div>
              <h3 class="exploregrid-item-title">Broken</h3>
              <p>No counts here.</p>
              <div class="exploregrid-item-meta"><span>many repositories</span></div>
            </div>
        "#;
        let scraper = Scraper::new(page);
        let err = scraper.showcases().list().unwrap_err();
        assert!(matches!(
            err,
            AppError::Extract(ExtractError::NoDigits { .. })
        ));
    }

    #[test]
    fn detail_extracts_repositories_and_meta() {
        let scraper = Scraper::new(DETAIL_PAGE);
        let detail = scraper
            .showcases()
            .with_base_url("https://github.com")
            .detail()
            .unwrap();

        assert_eq!(detail.title, "Machine learning");
        assert_eq!(detail.languages, "Python");
        assert_eq!(detail.last_updated, Some(1470182400));

        assert_eq!(detail.repositories.len(), 1);
        let repo = &detail.repositories[0];
        assert_eq!(repo.author, "scikit-learn");
        assert_eq!(repo.name, "scikit-learn");
        assert_eq!(repo.url, "https://github.com/scikit-learn/scikit-learn");
        assert_eq!(repo.avatar_image, "https://avatars.test/sklearn.png");
        assert_eq!(repo.description, "Machine learning in Python");
        assert_eq!(repo.language, "Python");
        assert_eq!(repo.stars, 16426);
        assert_eq!(repo.forks, 9321);
    }

    #[test]
    fn detail_splits_other_showcases_at_two() {
        let scraper = Scraper::new(DETAIL_PAGE);
        let detail = scraper.showcases().detail().unwrap();

        assert_eq!(detail.related_showcases.len(), 2);
        assert_eq!(detail.new_showcases.len(), 1);
        assert_eq!(detail.related_showcases[0].title, "One");
        assert_eq!(detail.related_showcases[1].title, "Two");
        assert_eq!(detail.new_showcases[0].title, "Three");
        assert_eq!(
            detail.new_showcases[0].header_image,
            "url(https://img.test/three.png)"
        );
    }

    #[test]
    fn detail_with_few_other_showcases_has_no_new_ones() {
        let page = r#"
            <div class="exploregrid-item">
              <div class="exploregrid-item-header" style="background-image: url(x)"></div>
              <h3 class="exploregrid-item-title">Only</h3>
              <p>Single related showcase.</p>
            </div>
        "#;
        let scraper = Scraper::new(page);
        let detail = scraper.showcases().detail().unwrap();

        assert_eq!(detail.related_showcases.len(), 1);
        assert!(detail.new_showcases.is_empty());
    }

    #[test]
    fn unparseable_last_updated_is_none() {
        let page = r#"
            <div class="showcase-page-meta">
              <span>Languages:</span>
              <span>Go</span>
              <span>Showcase last updated: sometime recently</span>
            </div>
        "#;
        let scraper = Scraper::new(page);
        let detail = scraper.showcases().detail().unwrap();
        assert_eq!(detail.languages, "Go");
        assert_eq!(detail.last_updated, None);
    }

    #[test]
    fn search_pairs_titles_with_descriptions() {
        let page = r#"
            <div class="collection-search-result">
              <h3 class="collection-search-result-title">Machine learning</h3>
              <p>Frameworks and tools.</p>
            </div>
            <div class="collection-search-result">
              <h3 class="collection-search-result-title">Deep learning</h3>
              <p>Neural networks.</p>
            </div>
        "#;
        let scraper = Scraper::new(page);
        let results = scraper.showcases().search().unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "Machine learning");
        assert_eq!(results[0].description, "Frameworks and tools.");
        assert_eq!(results[1].title, "Deep learning");
    }
}
