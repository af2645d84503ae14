use super::algorithm::{ArticleAlignment, SentencePosition};
use std::collections::HashMap;

/// Structural checks of a finished alignment. Returns one message per problem.
pub fn validate(alignment: &ArticleAlignment) -> Vec<String> {
    let mut errors = vec![];

    fn side_str(kind: &str, block_id: usize, side: usize) -> String {
        let side_name = ["First", "Second"][side];
        format!("{side_name} side of {kind} block {block_id}")
    }

    for side in 0..2 {
        let starts = &alignment.paragraph_starts[side];
        if starts.len() != alignment.paragraph_counts[side] + 1 {
            errors.push(format!(
                "Article {side} has {} paragraphs but {} paragraph starts",
                alignment.paragraph_counts[side],
                starts.len()
            ));
        }
        if starts.first().is_some_and(|&start| start != 0) || starts.windows(2).any(|pair| pair[0] > pair[1]) {
            errors.push(format!("Paragraph starts of article {side} are not ascending from 0: {starts:?}"));
        }
    }

    let paragraph_count = |side: usize| alignment.paragraph_counts[side];
    let sentences_in = |side: usize, paragraph: usize| {
        let starts = &alignment.paragraph_starts[side];
        match (starts.get(paragraph), starts.get(paragraph + 1)) {
            (Some(&start), Some(&end)) if end >= start => end - start,
            _ => 0,
        }
    };

    // Each paragraph belongs to at most one block.
    let mut paragraph_block: [HashMap<usize, usize>; 2] = Default::default();
    for (block_id, block) in alignment.paragraph_blocks.iter().enumerate() {
        for side in 0..2 {
            if block.paragraphs[side].is_empty() {
                errors.push(format!("{} is empty", side_str("paragraph", block_id, side)));
            }
            for &paragraph in &block.paragraphs[side] {
                if paragraph >= paragraph_count(side) {
                    errors.push(format!(
                        "{} has paragraph {paragraph} out of range",
                        side_str("paragraph", block_id, side)
                    ));
                }
                if let Some(other) = paragraph_block[side].insert(paragraph, block_id) {
                    errors.push(format!(
                        "Paragraph {paragraph} of article {side} is in paragraph blocks {other} and {block_id}"
                    ));
                }
            }
        }
    }

    // Each sentence belongs to at most one block.
    let mut sentence_block: [HashMap<SentencePosition, usize>; 2] = Default::default();
    let mut check_sentence = |errors: &mut Vec<String>, block_id: usize, side: usize, position: SentencePosition| {
        if position.sentence >= sentences_in(side, position.paragraph) {
            errors.push(format!("{} has sentence {position:?} out of range", side_str("sentence", block_id, side)));
        }
        if let Some(other) = sentence_block[side].insert(position, block_id) {
            if other != block_id {
                errors.push(format!(
                    "Sentence {position:?} of article {side} is in sentence blocks {other} and {block_id}"
                ));
            }
        }
    };
    for (block_id, block) in alignment.sentence_blocks.iter().enumerate() {
        for side in 0..2 {
            if block.sentences[side].is_empty() {
                errors.push(format!("{} is empty", side_str("sentence", block_id, side)));
            }
            for &position in &block.sentences[side] {
                check_sentence(&mut errors, block_id, side, position);
            }
        }
        if block.links.is_empty() {
            errors.push(format!("Sentence block {block_id} has no links"));
        }
        for link in &block.links {
            for side in 0..2 {
                if !block.sentences[side].contains(&link[side]) {
                    errors.push(format!(
                        "Link {link:?} of sentence block {block_id} is not among the block's sentences"
                    ));
                }
            }
            // Sentences are only aligned inside aligned paragraphs.
            let blocks = [0, 1].map(|side| paragraph_block[side].get(&link[side].paragraph));
            match blocks {
                [Some(first), Some(second)] if first == second => {}
                _ => errors.push(format!(
                    "Link {link:?} of sentence block {block_id} is not inside one paragraph block"
                )),
            }
        }
    }

    errors
}
