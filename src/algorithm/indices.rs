use std::ops::Range;

use index_vec::{index_vec, IndexVec};

pub(crate) trait UsizeConvertible {
    fn from_usize(val: usize) -> Self;
    fn to_usize(&self) -> usize;
}

macro_rules! extend_index_type {
    (
        $type:ident
    ) => {
        impl UsizeConvertible for $type {
            fn from_usize(val: usize) -> Self {
                Self::new(val)
            }

            fn to_usize(&self) -> usize {
                self.index()
            }
        }
    };
}

index_vec::define_index_type! {
    pub(crate) struct ParagraphIndex = usize;
}
extend_index_type!(ParagraphIndex);

index_vec::define_index_type! {
    pub(crate) struct SentenceIndex = usize;
}
extend_index_type!(SentenceIndex);

index_vec::define_index_type! {
    pub(crate) struct TermId = u32;
}
extend_index_type!(TermId);

pub(crate) fn range_iter<Index: UsizeConvertible>(range: Range<Index>) -> impl Iterator<Item = Index> {
    (range.start.to_usize()..range.end.to_usize()).map(Index::from_usize)
}

/// Converts between sentence positions relative to their paragraph and
/// absolute sentence positions within the article.
pub(crate) struct SentenceIndexConverter {
    paragraph_to_sentence: IndexVec<ParagraphIndex, SentenceIndex>,
    sentence_to_paragraph: IndexVec<SentenceIndex, ParagraphIndex>,
}

impl SentenceIndexConverter {
    pub fn new(sentence_counts: impl IntoIterator<Item = usize>) -> Self {
        let mut paragraph_to_sentence = index_vec![SentenceIndex::new(0)];
        let mut sentence_to_paragraph = index_vec![];
        for (paragraph, count) in sentence_counts.into_iter().enumerate() {
            for _ in 0..count {
                sentence_to_paragraph.push(ParagraphIndex::new(paragraph));
            }
            paragraph_to_sentence.push(sentence_to_paragraph.next_idx());
        }

        SentenceIndexConverter {
            paragraph_to_sentence,
            sentence_to_paragraph,
        }
    }

    #[cfg(test)]
    pub fn absolute(&self, paragraph: ParagraphIndex, sentence_in_paragraph: usize) -> SentenceIndex {
        let sentence = self.paragraph_to_sentence[paragraph] + sentence_in_paragraph;
        assert!(sentence < self.paragraph_to_sentence[paragraph + 1]);
        sentence
    }

    pub fn relative(&self, sentence: SentenceIndex) -> (ParagraphIndex, usize) {
        let paragraph = self.sentence_to_paragraph[sentence];
        (paragraph, sentence.index() - self.paragraph_to_sentence[paragraph].index())
    }

    pub fn sentences(&self, paragraph: ParagraphIndex) -> Range<SentenceIndex> {
        self.paragraph_to_sentence[paragraph]..self.paragraph_to_sentence[paragraph + 1]
    }

    pub fn paragraph_starts(&self) -> Vec<usize> {
        self.paragraph_to_sentence.iter().map(|sentence| sentence.index()).collect()
    }

    pub fn paragraphs_count(&self) -> usize {
        self.paragraph_to_sentence.len() - 1
    }

    pub fn sentences_count(&self) -> usize {
        self.sentence_to_paragraph.len()
    }
}
