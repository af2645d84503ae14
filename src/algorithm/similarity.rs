use std::{cmp::Ordering, ops::Range};

use super::{
    grid::Grid,
    indices::{range_iter, SentenceIndex},
    tf_idf::{TfIdfVector, WeightedTerm},
};

/// Cosine similarity of two TF-IDF vectors.
///
/// Repeated occurrences of a term are summed before they enter the products.
/// With `concentration_modifier` set, a vector with less than half the entries of
/// the other one that shares more than two occurrences with it is scored by how
/// tightly the shared occurrences cluster inside the longer sentence. That score
/// is not bounded by 1.
pub(crate) fn cosine(a: &TfIdfVector, b: &TfIdfVector, concentration_modifier: Option<f64>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let (long, short) = if a.len() < b.len() { (b, a) } else { (a, b) };

    let run_weight = |run: &[WeightedTerm]| run.iter().map(|entry| entry.weight).sum::<f64>();
    let mut long_runs = long.entries().chunk_by(|x, y| x.term == y.term).peekable();
    let mut short_runs = short.entries().chunk_by(|x, y| x.term == y.term).peekable();

    let mut dot_product = 0.0;
    let mut common_squares = 0.0;
    let mut distinct_squares = 0.0;
    let mut short_squares = 0.0;
    let mut shared_positions = vec![];
    loop {
        let order = match (long_runs.peek(), short_runs.peek()) {
            (Some(long_run), Some(short_run)) => long_run[0].term.cmp(&short_run[0].term),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => break,
        };
        match order {
            Ordering::Less => {
                let weight = long_runs.next().map_or(0.0, run_weight);
                distinct_squares += weight * weight;
            }
            Ordering::Greater => {
                let weight = short_runs.next().map_or(0.0, run_weight);
                short_squares += weight * weight;
            }
            Ordering::Equal => {
                let (Some(long_run), Some(short_run)) = (long_runs.next(), short_runs.next()) else {
                    unreachable!()
                };
                let long_weight = run_weight(long_run);
                let short_weight = run_weight(short_run);
                dot_product += long_weight * short_weight;
                common_squares += long_weight * long_weight;
                short_squares += short_weight * short_weight;
                shared_positions.extend(long_run.iter().map(|entry| entry.position));
            }
        }
    }

    if common_squares == 0.0 {
        return 0.0;
    }
    if let Some(modifier) = concentration_modifier {
        if 2 * short.len() < long.len() && shared_positions.len() > 2 {
            let count = shared_positions.len() as f64;
            let mean = shared_positions.iter().sum::<usize>() as f64 / count;
            let deviation = shared_positions
                .iter()
                .map(|&position| (position as f64 - mean).abs())
                .sum::<f64>()
                / count;
            let variation = 2.0 * deviation / count;
            // Positions within one sentence are distinct, so this only fails for broken input.
            if variation > 0.0 {
                return dot_product / (common_squares * short_squares).sqrt() / variation / modifier;
            }
        }
    }
    dot_product / ((common_squares + distinct_squares) * short_squares).sqrt()
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum CachedSimilarity {
    Unset,
    Value(f64),
    /// One of the sentences is already aligned; the pair must never be aligned.
    Skip,
}

/// Lazily computed similarities of all sentence pairs of one comparison,
/// addressed by absolute sentence indices.
pub(crate) struct SimilarityCache {
    cells: Grid<CachedSimilarity>,
    concentration_modifier: Option<f64>,
}

impl SimilarityCache {
    pub fn new(sentence_counts: [usize; 2], concentration_modifier: Option<f64>) -> Self {
        SimilarityCache {
            cells: Grid::new(sentence_counts, CachedSimilarity::Unset),
            concentration_modifier,
        }
    }

    pub fn cached(&self, sentences: [SentenceIndex; 2]) -> CachedSimilarity {
        self.cells[sentences.map(|sentence| sentence.index())]
    }

    pub fn is_skipped(&self, sentences: [SentenceIndex; 2]) -> bool {
        self.cached(sentences) == CachedSimilarity::Skip
    }

    /// Returns `None` for skipped pairs. `vectors` are only read when the value
    /// is not cached yet.
    pub fn similarity(&mut self, sentences: [SentenceIndex; 2], vectors: [&TfIdfVector; 2]) -> Option<f64> {
        let cell = &mut self.cells[sentences.map(|sentence| sentence.index())];
        match *cell {
            CachedSimilarity::Skip => None,
            CachedSimilarity::Value(value) => Some(value),
            CachedSimilarity::Unset => {
                let value = cosine(vectors[0], vectors[1], self.concentration_modifier);
                *cell = CachedSimilarity::Value(value);
                Some(value)
            }
        }
    }

    /// Skips every pair whose first sentence is in `rows` or whose second one is in `columns`.
    pub fn mark_skip(
        &mut self,
        rows: impl IntoIterator<Item = SentenceIndex>,
        columns: impl IntoIterator<Item = SentenceIndex>,
    ) {
        for row in rows {
            self.cells.row_mut(row.index()).fill(CachedSimilarity::Skip);
        }
        for column in columns {
            for cell in self.cells.column_mut(column.index()) {
                *cell = CachedSimilarity::Skip;
            }
        }
    }

    /// Forgets computed values of the pairs between the given sentence ranges.
    pub fn clear_region(&mut self, rows: &[Range<SentenceIndex>], columns: &[Range<SentenceIndex>]) {
        for row in rows.iter().cloned().flat_map(range_iter) {
            for column in columns.iter().cloned().flat_map(range_iter) {
                let cell = &mut self.cells[[row.index(), column.index()]];
                if *cell != CachedSimilarity::Skip {
                    *cell = CachedSimilarity::Unset;
                }
            }
        }
    }

    /// Forgets every computed value, keeping skipped pairs.
    pub fn reset_values(&mut self) {
        for row in 0..self.cells.size()[0] {
            for cell in self.cells.row_mut(row) {
                if let CachedSimilarity::Value(_) = cell {
                    *cell = CachedSimilarity::Unset;
                }
            }
        }
    }
}
