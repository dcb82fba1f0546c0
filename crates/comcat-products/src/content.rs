//! Content-file lookup helpers.
//!
//! A product's content map is keyed by in-product path
//! (`download/grid.xml`) and each entry carries a download URL. Lookups
//! match caller patterns against the *end* of a key or of the URL's file
//! name, so `grid\.xml` finds `download/grid.xml` but not
//! `download/grid.xml.zip`.

use comcat_types::ContentMap;
use regex_lite::Regex;
use serde::Serialize;
use url::Url;

use crate::error::ProductError;

/// A regular expression anchored at the end of the tested text.
#[derive(Debug, Clone)]
pub struct ContentPattern {
    source: String,
    regex: Regex,
}

impl ContentPattern {
    /// Compile `pattern` with an implicit trailing `$`.
    ///
    /// The pattern is wrapped in a group first, so alternations anchor as a
    /// whole: `a|b` matches text ending in either `a` or `b`.
    pub fn new(pattern: &str) -> Result<Self, ProductError> {
        let regex = Regex::new(&format!("(?:{pattern})$")).map_err(|e| {
            ProductError::InvalidPattern {
                pattern: pattern.to_owned(),
                message: e.to_string(),
            }
        })?;
        Ok(Self {
            source: pattern.to_owned(),
            regex,
        })
    }

    /// The pattern as supplied by the caller.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether `text` ends with a match.
    pub fn matches(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// The content entry chosen by a shortest-name lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentMatch {
    /// Key in the product's content map.
    pub key: String,
    /// File name derived from the URL.
    pub name: String,
    /// Full download URL.
    pub url: String,
}

/// Final path segment of a content URL.
///
/// Values that do not parse as absolute URLs fall back to the text after
/// the last `/`, with any query or fragment removed.
pub fn file_name(url: &str) -> String {
    if let Ok(parsed) = Url::parse(url) {
        if let Some(name) = parsed.path_segments().and_then(Iterator::last) {
            return name.to_owned();
        }
    }
    let path = url.split(['?', '#']).next().unwrap_or_default();
    path.rsplit('/').next().unwrap_or_default().to_owned()
}

/// File names of every entry whose file name matches, in document order.
pub fn matching_names(contents: &ContentMap, pattern: &ContentPattern) -> Vec<String> {
    contents
        .iter()
        .map(|(_, file)| file_name(&file.url))
        .filter(|name| pattern.matches(name))
        .collect()
}

/// The entry whose key matches and whose file name is shortest.
///
/// Length is counted in characters. On equal lengths the entry listed
/// first in the document wins.
pub fn shortest_match(contents: &ContentMap, pattern: &ContentPattern) -> Option<ContentMatch> {
    let mut best: Option<(usize, ContentMatch)> = None;
    for (key, file) in contents.iter().filter(|(key, _)| pattern.matches(key)) {
        let name = file_name(&file.url);
        let length = name.chars().count();
        if best.as_ref().is_some_and(|(shortest, _)| length >= *shortest) {
            continue;
        }
        best = Some((
            length,
            ContentMatch {
                key: key.to_owned(),
                name,
                url: file.url.clone(),
            },
        ));
    }
    best.map(|(_, found)| found)
}
