use index_vec::{index_vec, IndexVec};
use string_interner::{backend::StringBackend, symbol::SymbolU32, StringInterner, Symbol as _};

use super::{
    indices::{ParagraphIndex, TermId},
    Article,
};
use crate::error::AlignError;

/// One occurrence of a term in a sentence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct TermOccurrence {
    pub term: TermId,
    pub position: usize,
}

/// Occurrences of the terms of one sentence, sorted by term id.
/// A term occurring several times has one entry per occurrence.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct TermVector {
    occurrences: Vec<TermOccurrence>,
}

impl TermVector {
    pub fn from_terms(terms: impl IntoIterator<Item = TermId>) -> Self {
        let mut occurrences: Vec<TermOccurrence> = terms
            .into_iter()
            .enumerate()
            .map(|(position, term)| TermOccurrence { term, position })
            .collect();
        occurrences.sort_by_key(|occurrence| occurrence.term);
        TermVector { occurrences }
    }

    pub fn occurrences(&self) -> &[TermOccurrence] {
        &self.occurrences
    }
}

/// Term frequencies of a paragraph, or of several paragraphs read as one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ParagraphStatistics {
    pub frequencies: IndexVec<TermId, u32>,
    pub total_words: usize,
}

impl ParagraphStatistics {
    fn empty(vocabulary_size: usize) -> Self {
        ParagraphStatistics {
            frequencies: index_vec![0; vocabulary_size],
            total_words: 0,
        }
    }

    pub fn merge<'a>(parts: impl IntoIterator<Item = &'a ParagraphStatistics>) -> Self {
        let mut parts = parts.into_iter();
        let mut result = parts.next().cloned().expect("merging an empty set of paragraphs");
        for part in parts {
            assert_eq!(result.frequencies.len(), part.frequencies.len());
            for (sum, &frequency) in result.frequencies.iter_mut().zip(part.frequencies.iter()) {
                *sum += frequency;
            }
            result.total_words += part.total_words;
        }
        result
    }
}

/// Raw term vectors and statistics of one article.
#[derive(Debug)]
pub(crate) struct IndexedArticle {
    pub sentence_vectors: IndexVec<ParagraphIndex, Vec<TermVector>>,
    pub statistics: IndexVec<ParagraphIndex, ParagraphStatistics>,
}

/// Assigns term ids to the words of both articles, article 0 first, in document
/// order, and collects per-sentence term vectors and per-paragraph frequencies.
#[tracing::instrument(skip(articles))]
pub(crate) fn index_terms(articles: [&Article; 2], max_vocabulary: usize) -> Result<[IndexedArticle; 2], AlignError> {
    let mut interner: StringInterner<StringBackend<SymbolU32>> = StringInterner::new();
    let mut term_ids: [Vec<Vec<Vec<TermId>>>; 2] = [vec![], vec![]];
    for side in 0..2 {
        for paragraph in &articles[side].paragraphs {
            let mut paragraph_ids = vec![];
            for sentence in paragraph {
                let mut sentence_ids = vec![];
                for word in sentence {
                    let symbol = interner.get_or_intern(word);
                    if interner.len() > max_vocabulary {
                        return Err(AlignError::VocabularyOverflow {
                            limit: max_vocabulary,
                            found: interner.len(),
                        });
                    }
                    sentence_ids.push(TermId::new(symbol.to_usize()));
                }
                paragraph_ids.push(sentence_ids);
            }
            term_ids[side].push(paragraph_ids);
        }
    }

    let vocabulary_size = interner.len();
    tracing::debug!(vocabulary_size, "indexed terms");

    Ok(term_ids.map(|paragraphs| {
        let mut sentence_vectors = IndexVec::new();
        let mut statistics = IndexVec::new();
        for paragraph in paragraphs {
            let mut paragraph_statistics = ParagraphStatistics::empty(vocabulary_size);
            let mut vectors = vec![];
            for sentence in paragraph {
                for &term in &sentence {
                    paragraph_statistics.frequencies[term] += 1;
                    paragraph_statistics.total_words += 1;
                }
                vectors.push(TermVector::from_terms(sentence));
            }
            sentence_vectors.push(vectors);
            statistics.push(paragraph_statistics);
        }
        IndexedArticle {
            sentence_vectors,
            statistics,
        }
    }))
}
