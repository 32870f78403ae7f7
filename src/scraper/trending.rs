use super::{child_elements, first_text, parse_count, require_attr, sel, text_of};
use crate::error::{ExtractError, Result};
use scraper::{ElementRef, Html};
use serde::{Deserialize, Serialize};

const META_BULLET: char = '•';

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendingRepo {
    pub author: String,
    pub name: String,
    pub description: String,
    pub language: String,
    pub stars: u64,
    pub built_by: Vec<Contributor>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contributor {
    pub username: String,
    pub avatar_image: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendingDeveloper {
    pub rank: u32,
    pub full_name: String,
    pub username: String,
    pub avatar_image: String,
    pub trending_repo_name: String,
    pub trending_repo_description: String,
}

pub struct TrendingScraper<'a> {
    document: &'a Html,
}

impl<'a> TrendingScraper<'a> {
    pub(crate) fn new(document: &'a Html) -> Self {
        Self { document }
    }

    pub fn repositories(&self) -> Result<Vec<TrendingRepo>> {
        let row_selector = sel(".repo-list li");

        let mut repositories = Vec::new();
        for row in self.document.select(&row_selector) {
            repositories.push(self.repository_row(row)?);
        }
        Ok(repositories)
    }

    pub fn developers(&self) -> Result<Vec<TrendingDeveloper>> {
        let row_selector = sel(".user-leaderboard-list li");

        let mut developers = Vec::new();
        for (index, row) in self.document.select(&row_selector).enumerate() {
            developers.push(self.developer_row(row, index as u32 + 1)?);
        }
        Ok(developers)
    }

    fn repository_row(&self, row: ElementRef<'_>) -> Result<TrendingRepo> {
        let author_selector = sel(".text-normal");
        let author = row
            .select(&author_selector)
            .next()
            .map(text_of)
            .unwrap_or_default()
            .replace(' ', "")
            .replacen('/', "", 1);

        let title_selector = sel(".mb-1");
        let full_name = row
            .select(&title_selector)
            .next()
            .map(text_of)
            .unwrap_or_default();
        let name = repo_name(&full_name);

        let description_selector = sel(".py-1");
        let description = row
            .select(&description_selector)
            .next()
            .map(text_of)
            .unwrap_or_default();

        let meta_selector = sel(".repo-list-meta");
        let meta = row
            .select(&meta_selector)
            .next()
            .ok_or(ExtractError::MissingElement("repo-list-meta"))?;
        let (language, stars) = parse_meta(&text_of(meta))?;

        let built_by = built_by(row)?;

        Ok(TrendingRepo {
            author,
            name,
            description,
            language,
            stars,
            built_by,
        })
    }

    fn developer_row(&self, row: ElementRef<'_>, rank: u32) -> Result<TrendingDeveloper> {
        let full_name_selector = sel(".full-name");
        let full_name = row
            .select(&full_name_selector)
            .next()
            .map(text_of)
            .unwrap_or_default()
            .replace(['(', ')'], "");

        let name_selector = sel(".user-leaderboard-list-name");
        let username = row
            .select(&name_selector)
            .next()
            .and_then(|name| child_elements(name).next())
            .map(first_text)
            .unwrap_or_default();

        let avatar_selector = sel("img");
        let avatar = row
            .select(&avatar_selector)
            .next()
            .ok_or(ExtractError::MissingElement("developer avatar"))?;
        let avatar_image = require_attr(avatar, "developer avatar", "src")?.to_string();

        let repo_selector = sel(".repo");
        let trending_repo_name = row
            .select(&repo_selector)
            .next()
            .map(text_of)
            .unwrap_or_default();

        let repo_description_selector = sel(".repo-snipit-description");
        let trending_repo_description = row
            .select(&repo_description_selector)
            .next()
            .map(text_of)
            .unwrap_or_default();

        Ok(TrendingDeveloper {
            rank,
            full_name,
            username,
            avatar_image,
            trending_repo_name,
            trending_repo_description,
        })
    }
}

// Row titles read `author / name`.
fn repo_name(full_name: &str) -> String {
    match full_name.split_once('/') {
        Some((_, rest)) => rest.strip_prefix(' ').unwrap_or(rest).to_string(),
        None => full_name.to_string(),
    }
}

// The metadata string is bullet-separated. One bullet means there is no
// language field; two mean language comes first. The star count is the
// segment that is purely digits once thousands separators are stripped.
fn parse_meta(text: &str) -> Result<(String, u64), ExtractError> {
    let segments: Vec<&str> = text.split(META_BULLET).collect();

    let language = if segments.len() > 2 {
        segments[0].trim().to_string()
    } else {
        String::new()
    };

    let stars_segment = segments.iter().map(|s| s.trim()).find(|s| is_count(s));
    match stars_segment {
        Some(segment) => Ok((language, parse_count("stars", segment)?)),
        None => Err(ExtractError::NoDigits {
            field: "stars",
            text: text.to_string(),
        }),
    }
}

fn is_count(segment: &str) -> bool {
    let cleaned = segment.trim().replace(',', "");
    !cleaned.is_empty() && cleaned.chars().all(|c| c.is_ascii_digit())
}

// The built-by avatar list is re-parsed as a standalone fragment.
fn built_by(row: ElementRef<'_>) -> Result<Vec<Contributor>> {
    let block_selector = sel(".no-underline");
    let block = row
        .select(&block_selector)
        .next()
        .ok_or(ExtractError::MissingElement("built-by list"))?;

    let fragment = Html::parse_fragment(block.inner_html().trim());
    let image_selector = sel("img");

    Ok(fragment
        .select(&image_selector)
        .map(|image| Contributor {
            username: image.value().attr("title").unwrap_or_default().to_string(),
            avatar_image: image.value().attr("src").unwrap_or_default().to_string(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scraper::Scraper;

    const REPOSITORIES_PAGE: &str = r#"
        <ol class="repo-list">
          <li>
            <h3 class="mb-1"><a href="/rust-lang/rust"><span class="text-normal">rust-lang /</span> rust</a></h3>
            <p class="py-1">Empowering everyone to build reliable and efficient software.</p>
            <div class="repo-list-meta">Rust &#8226; 1,204 &#8226; Built by</div>
            <a class="no-underline" href="/rust-lang/rust/stargazers"><img title="alice" src="https://avatars.test/alice.png"><img title="bob" src="https://avatars.test/bob.png"></a>
          </li>
          <li>
            <h3 class="mb-1"><a href="/someone/dotfiles"><span class="text-normal">someone /</span> dotfiles</a></h3>
            <p class="py-1">Config files.</p>
            <div class="repo-list-meta">87 &#8226; Built by</div>
            <a class="no-underline" href="/someone/dotfiles/stargazers"><img title="carol" src="https://avatars.test/carol.png"></a>
          </li>
        </ol>
    "#;

    const DEVELOPERS_PAGE: &str = r#"
        <ol class="user-leaderboard-list">
          <li>
            <div><a href="/alice"><img src="https://avatars.test/alice.png"></a></div>
            <h2 class="user-leaderboard-list-name">
              <a href="/alice">alice <span class="full-name">(Alice Liddell)</span></a>
            </h2>
            <div class="repo-snipit">
              <span class="repo">wonderland</span>
              <span class="repo-snipit-description">Down the rabbit hole.</span>
            </div>
          </li>
          <li>
            <div><a href="/bob"><img src="https://avatars.test/bob.png"></a></div>
            <h2 class="user-leaderboard-list-name">
              <a href="/bob">bob <span class="full-name">(Bob Builder)</span></a>
            </h2>
            <div class="repo-snipit">
              <span class="repo">scaffold</span>
              <span class="repo-snipit-description">Can we fix it.</span>
            </div>
          </li>
        </ol>
    "#;

    #[test]
    fn repositories_parse_two_bullet_metadata() {
        let scraper = Scraper::new(REPOSITORIES_PAGE);
        let repos = scraper.trending().repositories().unwrap();

        assert_eq!(repos.len(), 2);
        assert_eq!(repos[0].author, "rust-lang");
        assert_eq!(repos[0].name, "rust");
        assert_eq!(repos[0].language, "Rust");
        assert_eq!(repos[0].stars, 1204);
    }

    #[test]
    fn one_bullet_metadata_has_no_language() {
        let scraper = Scraper::new(REPOSITORIES_PAGE);
        let repos = scraper.trending().repositories().unwrap();

        assert_eq!(repos[1].language, "");
        assert_eq!(repos[1].stars, 87);
    }

    #[test]
    fn built_by_lists_contributors_in_order() {
        let scraper = Scraper::new(REPOSITORIES_PAGE);
        let repos = scraper.trending().repositories().unwrap();

        let built_by = &repos[0].built_by;
        assert_eq!(built_by.len(), 2);
        assert_eq!(built_by[0].username, "alice");
        assert_eq!(built_by[0].avatar_image, "https://avatars.test/alice.png");
        assert_eq!(built_by[1].username, "bob");
        assert_eq!(repos[1].built_by.len(), 1);
    }

    #[test]
    fn metadata_without_a_count_segment_fails() {
        let page = r#"
            <ol class="repo-list">
              <li>
                <h3 class="mb-1"><a href="/x/y"><span class="text-normal">x /</span> y</a></h3>
                <div class="repo-list-meta">Rust &#8226; hot &#8226; Built by</div>
                <a class="no-underline" href="#"></a>
              </li>
            </ol>
        "#;
        let scraper = Scraper::new(page);
        let err = scraper.trending().repositories().unwrap_err();
        assert!(matches!(
            err,
            crate::error::AppError::Extract(ExtractError::NoDigits { field: "stars", .. })
        ));
    }

    #[test]
    fn developers_are_ranked_in_document_order() {
        let scraper = Scraper::new(DEVELOPERS_PAGE);
        let developers = scraper.trending().developers().unwrap();

        assert_eq!(developers.len(), 2);
        assert_eq!(developers[0].rank, 1);
        assert_eq!(developers[1].rank, 2);
    }

    #[test]
    fn developer_fields_are_normalized() {
        let scraper = Scraper::new(DEVELOPERS_PAGE);
        let developers = scraper.trending().developers().unwrap();

        let first = &developers[0];
        assert_eq!(first.full_name, "Alice Liddell");
        assert_eq!(first.username, "alice");
        assert_eq!(first.avatar_image, "https://avatars.test/alice.png");
        assert_eq!(first.trending_repo_name, "wonderland");
        assert_eq!(first.trending_repo_description, "Down the rabbit hole.");
    }

    #[test]
    fn repo_name_drops_the_author_prefix() {
        assert_eq!(repo_name("rust-lang / rust"), "rust");
        assert_eq!(repo_name("standalone"), "standalone");
    }

    #[test]
    fn count_segments_allow_thousands_separators() {
        assert!(is_count("1,204"));
        assert!(is_count(" 87 "));
        assert!(!is_count("1,204 stars"));
        assert!(!is_count(""));
    }
}
