use super::term_index::{ParagraphStatistics, TermVector};
use super::indices::TermId;

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct WeightedTerm {
    pub term: TermId,
    pub weight: f64,
    pub position: usize,
}

/// A sentence vector weighted by the statistics of the (possibly merged)
/// paragraph containing it. Entries stay sorted by term id.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct TfIdfVector {
    entries: Vec<WeightedTerm>,
}

impl TfIdfVector {
    pub fn entries(&self) -> &[WeightedTerm] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(test)]
    pub fn from_entries(entries: Vec<WeightedTerm>) -> Self {
        assert!(entries.windows(2).all(|pair| pair[0].term <= pair[1].term));
        TfIdfVector { entries }
    }
}

pub(crate) fn term_weight(statistics: &ParagraphStatistics, term: TermId) -> f64 {
    let frequency = statistics.frequencies[term];
    assert!(frequency > 0, "term {term:?} does not occur in its paragraph");
    ((statistics.total_words + 1) as f64 / frequency as f64).ln()
}

/// Weights every raw vector with `ln((total + 1) / frequency)`, where both counts
/// come from `statistics`, which has to cover every sentence in `raw`.
pub(crate) fn build_tf_idf<'a>(
    raw: impl IntoIterator<Item = &'a TermVector>,
    statistics: &ParagraphStatistics,
) -> Vec<TfIdfVector> {
    raw.into_iter()
        .map(|vector| TfIdfVector {
            entries: vector
                .occurrences()
                .iter()
                .map(|occurrence| WeightedTerm {
                    term: occurrence.term,
                    weight: term_weight(statistics, occurrence.term),
                    position: occurrence.position,
                })
                .collect(),
        })
        .collect()
}
