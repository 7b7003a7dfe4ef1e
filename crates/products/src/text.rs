//! Searchable text derived from a product's title and description.

/// The two normalized representations stored alongside a product.
///
/// Both fields are produced together by [`normalize`] and are never set
/// independently.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchText {
    with_spaces: String,
    without_spaces: String,
}

impl SearchText {
    /// `title + " " + description`, casing and punctuation untouched.
    pub fn with_spaces(&self) -> &str {
        &self.with_spaces
    }

    /// Title and description with every U+0020 removed, joined without a separator.
    pub fn without_spaces(&self) -> &str {
        &self.without_spaces
    }
}

/// Derive the searchable text pair for a title/description.
///
/// Only the ASCII space character is stripped for the compact form; tabs and
/// newlines survive.
pub fn normalize(title: &str, description: &str) -> SearchText {
    let mut with_spaces = String::with_capacity(title.len() + description.len() + 1);
    with_spaces.push_str(title);
    with_spaces.push(' ');
    with_spaces.push_str(description);

    let mut without_spaces = remove_spaces(title);
    without_spaces.push_str(&remove_spaces(description));

    SearchText {
        with_spaces,
        without_spaces,
    }
}

fn remove_spaces(s: &str) -> String {
    s.chars().filter(|c| *c != ' ').collect()
}
