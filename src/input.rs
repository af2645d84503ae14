use crate::{algorithm::Article, error::InputError};
use std::path::Path;

/// Marks the start of a paragraph in tokenized articles.
const PARAGRAPH_MARKER: &str = "@PGPH";

/// Parses a tokenized article: one sentence per line, tokens separated by
/// whitespace. A `@PGPH` line or a blank line starts a new paragraph. Empty
/// paragraphs are dropped.
pub fn parse_tokenized(text: &str) -> Article {
    let mut paragraphs = vec![];
    let mut current: Vec<Vec<String>> = vec![];
    for line in text.lines() {
        let mut tokens = line.split_whitespace().peekable();
        if tokens.peek().is_none() || tokens.peek() == Some(&PARAGRAPH_MARKER) {
            if !current.is_empty() {
                paragraphs.push(std::mem::take(&mut current));
            }
            continue;
        }
        current.push(tokens.map(str::to_owned).collect());
    }
    if !current.is_empty() {
        paragraphs.push(current);
    }
    Article::new(paragraphs)
}

/// Reads an article. `.json` files hold `[[["token", ...], ...], ...]`; any
/// other file is read as tokenized text.
pub fn read_article(path: &Path) -> Result<Article, InputError> {
    let text = std::fs::read_to_string(path).map_err(|source| InputError::Io {
        path: path.to_owned(),
        source,
    })?;
    let article = if path.extension().is_some_and(|extension| extension == "json") {
        let mut article: Article = serde_json::from_str(&text).map_err(|source| InputError::Json {
            path: path.to_owned(),
            source,
        })?;
        article.paragraphs.retain(|paragraph| !paragraph.is_empty());
        article
    } else {
        parse_tokenized(&text)
    };
    tracing::debug!(
        path = %path.display(),
        paragraphs = article.paragraph_count(),
        sentences = article.sentence_count(),
        "article read"
    );
    Ok(article)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn tokenized_paragraphs() {
        let article = parse_tokenized(
            "@PGPH\n\
             the title\n\
             @PGPH\n\
             first sentence .\n\
             second  one\n\
             \n\
             \n\
             @PGPH\n\
             third\n",
        );
        assert_eq!(
            article,
            Article::from_text(&[&["the title"], &["first sentence .", "second one"], &["third"]])
        );
    }

    #[test]
    fn marker_inside_a_sentence() {
        let article = parse_tokenized("a @PGPH b\n@PGPH c\nd");
        assert_eq!(article, Article::from_text(&[&["a @PGPH b"], &["d"]]));
    }

    #[test]
    fn empty_text() {
        assert_eq!(parse_tokenized("\n@PGPH\n  \n").paragraph_count(), 0);
    }

    #[test]
    fn read_files() {
        let dir = tempfile::tempdir().unwrap();
        let json = dir.path().join("article.en.0.json");
        std::fs::write(&json, r#"[[["one", "two"], ["three"]], [], [["four"]]]"#).unwrap();
        assert_eq!(
            read_article(&json).unwrap(),
            Article::from_text(&[&["one two", "three"], &["four"]])
        );

        let tok = dir.path().join("article.en.1.tok");
        std::fs::write(&tok, "one two\n@PGPH\nthree\n").unwrap();
        assert_eq!(read_article(&tok).unwrap(), Article::from_text(&[&["one two"], &["three"]]));
    }

    #[test]
    fn read_errors_name_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.tok");
        assert!(matches!(read_article(&missing), Err(InputError::Io { path, .. }) if path == missing));

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "[[[\"one\"]").unwrap();
        assert!(matches!(read_article(&broken), Err(InputError::Json { path, .. }) if path == broken));
    }
}
