use super::{indices::SentenceIndex, similarity::SimilarityCache, tf_idf::TfIdfVector, Comparison};

/// Sentences of an aligned paragraph group. Positions inside the group are
/// local; `sentences` maps them to absolute indices.
pub(super) struct SentenceGroup {
    pub sentences: [Vec<SentenceIndex>; 2],
    pub vectors: [Vec<TfIdfVector>; 2],
}

impl SentenceGroup {
    fn bounds(&self) -> [usize; 2] {
        [self.sentences[0].len(), self.sentences[1].len()]
    }

    fn similarity(&self, cache: &mut SimilarityCache, cell: [usize; 2]) -> Option<f64> {
        cache.similarity(
            [self.sentences[0][cell[0]], self.sentences[1][cell[1]]],
            [&self.vectors[0][cell[0]], &self.vectors[1][cell[1]]],
        )
    }
}

impl<'a> Comparison<'a> {
    fn sentences_match(&mut self, group: &SentenceGroup, cell: [usize; 2]) -> bool {
        let threshold = self.parameters.sentence_threshold;
        group
            .similarity(&mut self.sentence_similarity, cell)
            .is_some_and(|value| value > threshold)
    }

    pub(super) fn align_sentences(&mut self, group: &SentenceGroup) {
        assert_eq!(group.sentences[0].len(), group.vectors[0].len());
        assert_eq!(group.sentences[1].len(), group.vectors[1].len());
        let search_order = self.search_order;
        let bounds = group.bounds();

        let first = search_order
            .index
            .nearest_matching([0, 0], 0, bounds, |cell| self.sentences_match(group, cell));
        let Some(first) = first else {
            return;
        };
        let mut last = first;
        let mut links = vec![first];
        loop {
            let threshold = self.parameters.sentence_threshold;
            let offset = match search_order.sentence.best_match(last, bounds, threshold, |cell| {
                group.similarity(&mut self.sentence_similarity, cell)
            }) {
                Some(offset) => offset,
                None => {
                    let fallback = search_order.sentence.fallback_start;
                    match search_order.index.nearest_matching(last, fallback, bounds, |offset| {
                        self.sentences_match(group, [last[0] + offset[0], last[1] + offset[1]])
                    }) {
                        Some(offset) => offset,
                        None => break,
                    }
                }
            };
            last = self.accept_sentences(group, last, offset, &mut links);
        }
        self.close_sentence_group(group, &links);
    }

    /// Accepts the sentences at `last + offset`. A one-to-many step keeps taking
    /// further sentences on the many side while their similarity does not drop
    /// by the slack or more and the diagonal step is not at least as similar.
    /// Returns the last accepted cell.
    fn accept_sentences(
        &mut self,
        group: &SentenceGroup,
        last: [usize; 2],
        offset: [usize; 2],
        links: &mut Vec<[usize; 2]>,
    ) -> [usize; 2] {
        let next = [last[0] + offset[0], last[1] + offset[1]];
        tracing::trace!(?offset, ?next, "sentences accepted");
        let many_side = match offset {
            [0, 0] => unreachable!("vicinities never contain the origin"),
            [0, _] => 1,
            [_, 0] => 0,
            _ => {
                self.close_sentence_group(group, links);
                *links = vec![next];
                return next;
            }
        };
        let one_side = 1 - many_side;
        links.push(next);

        let bounds = group.bounds();
        let slack = self.parameters.extension_slack;
        let cell = |many: usize, one: usize| {
            let mut cell = [0; 2];
            cell[many_side] = many;
            cell[one_side] = one;
            cell
        };
        let one = last[one_side];
        let mut current = next[many_side];
        while current + 1 < bounds[many_side] {
            let candidate = current + 1;
            let extension = group.similarity(&mut self.sentence_similarity, cell(candidate, one));
            let previous = group.similarity(&mut self.sentence_similarity, cell(current, one));
            let (Some(extension), Some(previous)) = (extension, previous) else {
                break;
            };
            if extension - previous <= -slack {
                break;
            }
            if one + 1 < bounds[one_side] {
                if let Some(diagonal) = group.similarity(&mut self.sentence_similarity, cell(candidate, one + 1)) {
                    if diagonal >= extension {
                        break;
                    }
                }
            }
            links.push(cell(candidate, one));
            current = candidate;
        }
        cell(current, one)
    }

    /// Records the links of a finished group and excludes its sentences from
    /// any further alignment.
    fn close_sentence_group(&mut self, group: &SentenceGroup, links: &[[usize; 2]]) {
        tracing::debug!(?links, "closing sentence group");
        for link in links {
            let sentences = [group.sentences[0][link[0]], group.sentences[1][link[1]]];
            self.sentence_links[sentences.map(|sentence| sentence.index())] = true;
        }
        self.sentence_similarity.mark_skip(
            links.iter().map(|link| group.sentences[0][link[0]]),
            links.iter().map(|link| group.sentences[1][link[1]]),
        );
    }
}
