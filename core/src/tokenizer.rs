use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref RE: Regex = Regex::new(r"[A-Za-z0-9_]+").expect("valid regex");
}

/// Tokenize text into lower-cased terms made of ASCII letters, digits and underscore.
/// Everything else is a separator. No stopword removal or stemming happens here.
pub fn tokenize(text: &str) -> Vec<String> {
    RE.find_iter(text)
        .map(|m| m.as_str().to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_tokenize() {
        let t = tokenize("BM25 vs. TF-IDF!");
        assert_eq!(t, vec!["bm25", "vs", "tf", "idf"]);
    }

    #[test]
    fn empty_input() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("  --- !!! ").is_empty());
    }
}
