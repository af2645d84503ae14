//! Error types for vdalign.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that stop a comparison before or while it is set up.
#[derive(Error, Debug)]
pub enum AlignError {
    /// The two articles use more distinct terms than the configured vocabulary allows.
    #[error("the articles contain {found} distinct terms, but max_vocabulary is {limit}")]
    VocabularyOverflow {
        /// The configured maximum.
        limit: usize,
        /// The number of distinct terms seen before giving up.
        found: usize,
    },

    /// A vicinity group is empty or contains the origin offset.
    #[error("invalid {level} vicinities: {reason}")]
    InvalidVicinities {
        /// "paragraph" or "sentence".
        level: &'static str,
        /// What is wrong with them.
        reason: String,
    },

    /// A comparison asked for a lower level that is not below the higher one.
    #[error("cannot compare level {lower} with level {higher}: the lower level has to be given first")]
    LevelOrder {
        /// The requested lower level.
        lower: usize,
        /// The requested higher level.
        higher: usize,
    },

    /// A comparison asked for a level that the document was not adapted to.
    #[error("{slug} has no version at level {level}")]
    MissingLevel {
        /// The document whose version is missing.
        slug: String,
        /// The missing level.
        level: usize,
    },
}

/// Errors that can occur while reading articles, corpora or configuration.
#[derive(Error, Debug)]
pub enum InputError {
    /// A file or directory could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        /// The path that failed.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },

    /// A JSON article is malformed.
    #[error("malformed article {path}: {source}")]
    Json {
        /// The article path.
        path: PathBuf,
        /// The underlying error.
        source: serde_json::Error,
    },

    /// A configuration file is malformed.
    #[error("invalid configuration in {path}: {source}")]
    Config {
        /// The configuration path.
        path: PathBuf,
        /// The underlying error.
        source: toml::de::Error,
    },
}
