use index_vec::IndexVec;

use super::{
    indices::{range_iter, ParagraphIndex},
    sentence_alignment::SentenceGroup,
    term_index::{IndexedArticle, ParagraphStatistics},
    tf_idf::{build_tf_idf, TfIdfVector},
    Comparison,
};

fn paragraph_tf_idf<'v>(
    cache: &'v mut IndexVec<ParagraphIndex, Option<Vec<TfIdfVector>>>,
    article: &IndexedArticle,
    paragraph: ParagraphIndex,
) -> &'v [TfIdfVector] {
    cache[paragraph].get_or_insert_with(|| {
        build_tf_idf(&article.sentence_vectors[paragraph], &article.statistics[paragraph])
    })
}

impl<'a> Comparison<'a> {
    /// The highest similarity of a sentence pair of the two paragraphs, ignoring
    /// pairs with an already aligned sentence. Cached until the next pass.
    pub(super) fn paragraph_similarity(&mut self, cell: [usize; 2]) -> f64 {
        if let Some(value) = self.paragraph_similarity[cell] {
            return value;
        }
        let paragraphs = cell.map(ParagraphIndex::new);
        let mut open_pairs = vec![];
        for (i, s0) in range_iter(self.converters[0].sentences(paragraphs[0])).enumerate() {
            for (j, s1) in range_iter(self.converters[1].sentences(paragraphs[1])).enumerate() {
                if !self.sentence_similarity.is_skipped([s0, s1]) {
                    open_pairs.push(([s0, s1], [i, j]));
                }
            }
        }

        let mut best = 0.0;
        if !open_pairs.is_empty() {
            let [cache0, cache1] = &mut self.paragraph_vectors;
            let vectors = [
                paragraph_tf_idf(cache0, &self.articles[0], paragraphs[0]),
                paragraph_tf_idf(cache1, &self.articles[1], paragraphs[1]),
            ];
            for (sentences, [i, j]) in open_pairs {
                if let Some(value) = self.sentence_similarity.similarity(sentences, [&vectors[0][i], &vectors[1][j]]) {
                    if value > best {
                        best = value;
                    }
                }
            }
        }
        self.paragraph_similarity[cell] = Some(best);
        best
    }

    fn paragraph_matches(&mut self, cell: [usize; 2]) -> bool {
        self.paragraph_similarity(cell) > self.parameters.paragraph_threshold
    }

    pub(super) fn align_paragraphs(&mut self) {
        let search_order = self.search_order;
        let bounds = self.paragraph_links.size();

        let Some(first) = search_order.index.nearest_matching([0, 0], 0, bounds, |cell| self.paragraph_matches(cell))
        else {
            tracing::debug!("no paragraphs are similar enough");
            return;
        };
        let mut last = first;
        let mut group = [vec![first[0]], vec![first[1]]];
        loop {
            let threshold = self.parameters.paragraph_threshold;
            let offset = match search_order.paragraph.best_match(last, bounds, threshold, |cell| {
                Some(self.paragraph_similarity(cell))
            }) {
                Some(offset) => offset,
                None => {
                    let fallback = search_order.paragraph.fallback_start;
                    match search_order.index.nearest_matching(last, fallback, bounds, |offset| {
                        self.paragraph_matches([last[0] + offset[0], last[1] + offset[1]])
                    }) {
                        Some(offset) => offset,
                        None => break,
                    }
                }
            };
            last = self.accept_paragraphs(last, offset, &mut group);
        }
        self.close_paragraph_group(&group);
    }

    /// Adds the paragraphs at `last + offset` to the pending group, or closes the
    /// group and starts a new one when both coordinates advance.
    fn accept_paragraphs(&mut self, last: [usize; 2], offset: [usize; 2], group: &mut [Vec<usize>; 2]) -> [usize; 2] {
        let next = [last[0] + offset[0], last[1] + offset[1]];
        tracing::trace!(?offset, ?next, "paragraphs accepted");
        match offset {
            [0, 0] => unreachable!("vicinities never contain the origin"),
            [_, 0] => group[0].push(next[0]),
            [0, _] => group[1].push(next[1]),
            _ => {
                self.close_paragraph_group(group);
                *group = [vec![next[0]], vec![next[1]]];
            }
        }
        next
    }

    /// Records the paragraph links of a group and aligns its sentences. A group
    /// of more than two paragraphs is read as two merged paragraphs, with term
    /// weights taken from the merged statistics.
    fn close_paragraph_group(&mut self, group: &[Vec<usize>; 2]) {
        for &p0 in &group[0] {
            for &p1 in &group[1] {
                self.paragraph_links[[p0, p1]] = true;
            }
        }
        let paragraphs = group.each_ref().map(|side| side.iter().copied().map(ParagraphIndex::new).collect::<Vec<_>>());
        let merged = group[0].len() + group[1].len() > 2;
        tracing::debug!(?group, merged, "closing paragraph group");

        let ranges = [0, 1].map(|side| {
            paragraphs[side]
                .iter()
                .map(|&paragraph| self.converters[side].sentences(paragraph))
                .collect::<Vec<_>>()
        });
        if merged {
            self.sentence_similarity.clear_region(&ranges[0], &ranges[1]);
        }

        let vectors = [0, 1].map(|side| {
            let article = &self.articles[side];
            match paragraphs[side][..] {
                [paragraph] => paragraph_tf_idf(&mut self.paragraph_vectors[side], article, paragraph).to_vec(),
                _ => {
                    let statistics = ParagraphStatistics::merge(
                        paragraphs[side]
                            .iter()
                            .map(|&paragraph| &article.statistics[paragraph]),
                    );
                    build_tf_idf(
                        paragraphs[side]
                            .iter()
                            .flat_map(|&paragraph| &article.sentence_vectors[paragraph]),
                        &statistics,
                    )
                }
            }
        });
        let sentences = ranges.each_ref().map(|side| side.iter().cloned().flat_map(range_iter).collect());
        self.align_sentences(&SentenceGroup { sentences, vectors });

        if merged {
            // Values computed with the merged weights must not leak into later passes.
            self.sentence_similarity.clear_region(&ranges[0], &ranges[1]);
        }
    }
}
