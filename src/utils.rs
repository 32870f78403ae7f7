use crate::error::Result;
use regex::Regex;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::sync::LazyLock;

// An ampersand, optionally followed by the rest of an entity reference.
static ENTITY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"&(#?\w+;)?").unwrap());

/// Escape `&`, `<`, `>` and `"` so raw markup can be embedded as text.
/// Ampersands that already start an entity reference are left alone, which
/// makes the function idempotent on pre-escaped input.
pub fn html_escape(html: &str) -> String {
    let escaped = ENTITY.replace_all(html, |caps: &regex::Captures| {
        if caps.get(1).is_some() {
            caps[0].to_string()
        } else {
            "&amp;".to_string()
        }
    });

    escaped
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub fn save_json(data: &impl serde::Serialize, path: impl AsRef<Path>) -> Result<()> {
    if let Some(parent) = path.as_ref().parent() {
        fs::create_dir_all(parent)?;
    }

    let json_string = serde_json::to_string_pretty(data)?;
    let mut file = File::create(path)?;
    file.write_all(json_string.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(
            html_escape("<b>\"bold\" & beautiful</b>"),
            "&lt;b&gt;&quot;bold&quot; &amp; beautiful&lt;/b&gt;"
        );
    }

    #[test]
    fn does_not_double_escape_entities() {
        assert_eq!(html_escape("fish &amp; chips"), "fish &amp; chips");
        assert_eq!(html_escape("&#39;quoted&#39;"), "&#39;quoted&#39;");
    }

    #[test]
    fn is_idempotent_on_escaped_text() {
        let once = html_escape("<a href=\"x\">a & b</a>");
        assert_eq!(html_escape(&once), once);
    }

    #[test]
    fn bare_ampersands_are_escaped() {
        assert_eq!(html_escape("a && b"), "a &amp;&amp; b");
        assert_eq!(html_escape("&"), "&amp;");
    }
}
