mod blocks;
mod grid;
mod indices;
mod paragraph_alignment;
mod proximity;
mod sentence_alignment;
mod similarity;
mod term_index;
mod tf_idf;

#[cfg(test)]
mod test;

use self::{
    blocks::extract_blocks,
    grid::Grid,
    indices::{ParagraphIndex, SentenceIndex, SentenceIndexConverter},
    proximity::SearchOrder,
    similarity::SimilarityCache,
    term_index::{index_terms, IndexedArticle},
    tf_idf::TfIdfVector,
};
use crate::error::AlignError;
use index_vec::IndexVec;
use serde::{Deserialize, Serialize};

/// A tokenized article: paragraphs of sentences of tokens.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Article {
    pub paragraphs: Vec<Vec<Vec<String>>>,
}

impl Article {
    pub fn new(paragraphs: Vec<Vec<Vec<String>>>) -> Self {
        Article { paragraphs }
    }

    /// Builds an article from sentences given as whitespace separated tokens.
    pub fn from_text(paragraphs: &[&[&str]]) -> Self {
        Article {
            paragraphs: paragraphs
                .iter()
                .map(|paragraph| {
                    paragraph
                        .iter()
                        .map(|sentence| sentence.split_whitespace().map(str::to_string).collect())
                        .collect()
                })
                .collect(),
        }
    }

    pub fn paragraph_count(&self) -> usize {
        self.paragraphs.len()
    }

    pub fn sentence_count(&self) -> usize {
        self.paragraphs.iter().map(Vec::len).sum()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AlignmentParameters {
    /// Paragraphs align when their similarity exceeds this.
    pub paragraph_threshold: f64,
    /// Sentences align when their similarity exceeds this.
    pub sentence_threshold: f64,
    /// How much the similarity may drop while a one-to-many sentence run grows.
    pub extension_slack: f64,
    /// Penalizes scattered matches of a short sentence inside a long one; `None` disables it.
    pub concentration_modifier: Option<f64>,
    pub max_vocabulary: usize,
    /// Offsets from the last alignment checked before the distance-ordered
    /// search, group by group.
    pub paragraph_vicinities: Vec<Vec<[usize; 2]>>,
    pub sentence_vicinities: Vec<Vec<[usize; 2]>>,
}

impl Default for AlignmentParameters {
    fn default() -> Self {
        AlignmentParameters {
            paragraph_threshold: 0.57,
            sentence_threshold: 0.38,
            extension_slack: 0.0,
            concentration_modifier: Some(2.0),
            max_vocabulary: 10000,
            paragraph_vicinities: vec![vec![[0, 1], [1, 0], [1, 1]], vec![[1, 2], [2, 1]]],
            sentence_vicinities: vec![vec![[0, 1], [1, 0], [1, 1]]],
        }
    }
}

/// Position of a sentence: its paragraph and its index within the paragraph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SentencePosition {
    pub paragraph: usize,
    pub sentence: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParagraphBlock {
    pub paragraphs: [Vec<usize>; 2],
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceBlock {
    pub sentences: [Vec<SentencePosition>; 2],
    /// The aligned pairs that formed this block.
    pub links: Vec<[SentencePosition; 2]>,
}

/// Result of a comparison. Indices are 0-based unless the value came from
/// [`ArticleAlignment::to_one_based`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleAlignment {
    pub paragraph_counts: [usize; 2],
    /// For each article, the number of sentences before each paragraph, followed
    /// by the total number of sentences.
    pub paragraph_starts: [Vec<usize>; 2],
    pub paragraph_blocks: Vec<ParagraphBlock>,
    pub sentence_blocks: Vec<SentenceBlock>,
}

impl ArticleAlignment {
    /// Shifts every paragraph and sentence index by one. Counts and paragraph
    /// starts are left as they are.
    pub fn to_one_based(&self) -> ArticleAlignment {
        let shift_position = |position: &SentencePosition| SentencePosition {
            paragraph: position.paragraph + 1,
            sentence: position.sentence + 1,
        };
        ArticleAlignment {
            paragraph_counts: self.paragraph_counts,
            paragraph_starts: self.paragraph_starts.clone(),
            paragraph_blocks: self
                .paragraph_blocks
                .iter()
                .map(|block| ParagraphBlock {
                    paragraphs: block.paragraphs.each_ref().map(|side| side.iter().map(|p| p + 1).collect()),
                })
                .collect(),
            sentence_blocks: self
                .sentence_blocks
                .iter()
                .map(|block| SentenceBlock {
                    sentences: block.sentences.each_ref().map(|side| side.iter().map(shift_position).collect()),
                    links: block.links.iter().map(|link| link.each_ref().map(shift_position)).collect(),
                })
                .collect(),
        }
    }
}

/// Pairs aligned by one pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PassSummary {
    pub paragraph_links: usize,
    pub sentence_links: usize,
}

/// Runs comparisons with one set of parameters. The proximity index is shared
/// by all comparisons and grows when an article pair needs a larger grid.
pub struct Aligner {
    parameters: AlignmentParameters,
    search_order: SearchOrder,
}

const INITIAL_GRID_SIZE: usize = 50;

impl Aligner {
    pub fn new(parameters: AlignmentParameters) -> Result<Self, AlignError> {
        let mut search_order = SearchOrder::new(
            parameters.paragraph_vicinities.clone(),
            parameters.sentence_vicinities.clone(),
        )?;
        search_order.ensure_capacity([INITIAL_GRID_SIZE, INITIAL_GRID_SIZE]);
        Ok(Aligner {
            parameters,
            search_order,
        })
    }

    pub fn parameters(&self) -> &AlignmentParameters {
        &self.parameters
    }

    /// Indexes both articles and sets up the state of one comparison.
    #[tracing::instrument(skip_all)]
    pub fn start(&mut self, articles: [&Article; 2]) -> Result<Comparison<'_>, AlignError> {
        let indexed = index_terms(articles, self.parameters.max_vocabulary)?;
        let converters = articles.map(|article| SentenceIndexConverter::new(article.paragraphs.iter().map(Vec::len)));
        let paragraph_counts = [0, 1].map(|side| converters[side].paragraphs_count());
        let sentence_counts = [0, 1].map(|side| converters[side].sentences_count());
        tracing::debug!(?paragraph_counts, ?sentence_counts, "starting comparison");

        self.search_order.ensure_capacity([
            paragraph_counts[0].max(sentence_counts[0]),
            paragraph_counts[1].max(sentence_counts[1]),
        ]);

        Ok(Comparison {
            parameters: &self.parameters,
            search_order: &self.search_order,
            paragraph_vectors: [0, 1].map(|side| IndexVec::from_vec(vec![None; paragraph_counts[side]])),
            articles: indexed,
            converters,
            sentence_similarity: SimilarityCache::new(sentence_counts, self.parameters.concentration_modifier),
            paragraph_similarity: Grid::new(paragraph_counts, None),
            paragraph_links: Grid::new(paragraph_counts, false),
            sentence_links: Grid::new(sentence_counts, false),
            passes: 0,
        })
    }

    /// Compares two articles, running `passes` passes.
    pub fn align(&mut self, articles: [&Article; 2], passes: usize) -> Result<ArticleAlignment, AlignError> {
        let mut comparison = self.start(articles)?;
        for _ in 0..passes {
            comparison.run_pass();
        }
        Ok(comparison.finish())
    }
}

/// State of one comparison between two articles.
pub struct Comparison<'a> {
    parameters: &'a AlignmentParameters,
    search_order: &'a SearchOrder,
    articles: [IndexedArticle; 2],
    converters: [SentenceIndexConverter; 2],
    /// TF-IDF vectors of single paragraphs, built on first use.
    paragraph_vectors: [IndexVec<ParagraphIndex, Option<Vec<TfIdfVector>>>; 2],
    sentence_similarity: SimilarityCache,
    paragraph_similarity: Grid<Option<f64>>,
    paragraph_links: Grid<bool>,
    sentence_links: Grid<bool>,
    passes: usize,
}

fn count_links(links: &Grid<bool>) -> usize {
    (0..links.size()[0])
        .map(|row| links.row(row).iter().filter(|&&linked| linked).count())
        .sum()
}

impl<'a> Comparison<'a> {
    /// Runs paragraph alignment, and sentence alignment inside every aligned
    /// paragraph group, over the pairs not aligned by earlier passes.
    #[tracing::instrument(skip_all, fields(pass = self.passes))]
    pub fn run_pass(&mut self) -> PassSummary {
        let before = [count_links(&self.paragraph_links), count_links(&self.sentence_links)];
        self.paragraph_similarity.fill(None);
        self.align_paragraphs();
        self.passes += 1;

        let summary = PassSummary {
            paragraph_links: count_links(&self.paragraph_links) - before[0],
            sentence_links: count_links(&self.sentence_links) - before[1],
        };
        tracing::debug!(
            paragraph_links = summary.paragraph_links,
            sentence_links = summary.sentence_links,
            "pass finished"
        );
        summary
    }

    pub fn passes(&self) -> usize {
        self.passes
    }

    /// Forgets the computed similarities. Pairs with an aligned sentence stay
    /// skipped; everything else is recomputed when the next pass needs it.
    pub fn reset_similarities(&mut self) {
        self.sentence_similarity.reset_values();
        self.paragraph_similarity.fill(None);
    }

    /// Groups the aligned pairs into blocks.
    pub fn finish(self) -> ArticleAlignment {
        let paragraph_blocks = extract_blocks(self.paragraph_links)
            .into_iter()
            .map(|block| ParagraphBlock {
                paragraphs: block.sides,
            })
            .collect();

        let converters = &self.converters;
        let position = |side: usize, sentence: usize| {
            let (paragraph, sentence) = converters[side].relative(SentenceIndex::new(sentence));
            SentencePosition {
                paragraph: paragraph.index(),
                sentence,
            }
        };
        let sentence_blocks = extract_blocks(self.sentence_links)
            .into_iter()
            .map(|block| SentenceBlock {
                sentences: [0, 1].map(|side| {
                    block.sides[side]
                        .iter()
                        .map(|&sentence| position(side, sentence))
                        .collect()
                }),
                links: block
                    .links
                    .iter()
                    .map(|link| [position(0, link[0]), position(1, link[1])])
                    .collect(),
            })
            .collect();

        ArticleAlignment {
            paragraph_counts: converters.each_ref().map(SentenceIndexConverter::paragraphs_count),
            paragraph_starts: converters.each_ref().map(SentenceIndexConverter::paragraph_starts),
            paragraph_blocks,
            sentence_blocks,
        }
    }
}
