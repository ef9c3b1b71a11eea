use retrieval_core::tokenizer::tokenize;

#[test]
fn it_lowercases_and_splits_on_punctuation() {
    let toks = tokenize("Okapi-BM25, TF_IDF & cosine (VSM).");
    assert_eq!(toks, vec!["okapi", "bm25", "tf_idf", "cosine", "vsm"]);
}

#[test]
fn it_keeps_stopwords_and_does_not_stem() {
    let toks = tokenize("The Running runners");
    assert_eq!(toks, vec!["the", "running", "runners"]);
}

#[test]
fn it_treats_non_ascii_as_separators() {
    let toks = tokenize("café naïve");
    assert_eq!(toks, vec!["caf", "na", "ve"]);
}
