use super::{similarity::CachedSimilarity, *};

fn position(paragraph: usize, sentence: usize) -> SentencePosition {
    SentencePosition { paragraph, sentence }
}

fn paragraph_blocks(alignment: &ArticleAlignment) -> Vec<[Vec<usize>; 2]> {
    alignment
        .paragraph_blocks
        .iter()
        .map(|block| block.paragraphs.clone())
        .collect()
}

fn sentence_blocks(alignment: &ArticleAlignment) -> Vec<[Vec<SentencePosition>; 2]> {
    alignment
        .sentence_blocks
        .iter()
        .map(|block| block.sentences.clone())
        .collect()
}

fn align(first: &Article, second: &Article, parameters: AlignmentParameters) -> ArticleAlignment {
    let mut aligner = Aligner::new(parameters).unwrap();
    aligner.align([first, second], 1).unwrap()
}

#[test]
fn identical_articles() {
    let article = Article::from_text(&[
        &["apple banana cherry", "dog eagle fox"],
        &["grape house iris", "jam kite lamp"],
    ]);
    let mut aligner = Aligner::new(AlignmentParameters::default()).unwrap();
    let mut comparison = aligner.start([&article, &article]).unwrap();
    assert_eq!(
        comparison.run_pass(),
        PassSummary {
            paragraph_links: 2,
            sentence_links: 4,
        }
    );
    // Every sentence is aligned, so another pass finds nothing new.
    assert_eq!(comparison.run_pass(), PassSummary::default());
    assert_eq!(comparison.passes(), 2);

    let alignment = comparison.finish();
    assert_eq!(alignment.paragraph_counts, [2, 2]);
    assert_eq!(alignment.paragraph_starts, [vec![0, 2, 4], vec![0, 2, 4]]);
    assert_eq!(paragraph_blocks(&alignment), vec![[vec![0], vec![0]], [vec![1], vec![1]]]);
    assert_eq!(
        sentence_blocks(&alignment),
        vec![
            [vec![position(0, 0)], vec![position(0, 0)]],
            [vec![position(0, 1)], vec![position(0, 1)]],
            [vec![position(1, 0)], vec![position(1, 0)]],
            [vec![position(1, 1)], vec![position(1, 1)]],
        ]
    );
    assert_eq!(alignment.sentence_blocks[2].links, vec![[position(1, 0), position(1, 0)]]);
}

#[test]
fn unrelated_articles() {
    let first = Article::from_text(&[&["apple banana"], &["cherry dog"]]);
    let second = Article::from_text(&[&["eagle fox"], &["grape house"]]);
    let alignment = align(&first, &second, AlignmentParameters::default());
    assert!(alignment.paragraph_blocks.is_empty());
    assert!(alignment.sentence_blocks.is_empty());
}

#[test]
fn empty_article() {
    let first = Article::from_text(&[&["apple banana"]]);
    let alignment = align(&first, &Article::default(), AlignmentParameters::default());
    assert_eq!(alignment.paragraph_counts, [1, 0]);
    assert_eq!(alignment.paragraph_starts, [vec![0, 1], vec![0]]);
    assert!(alignment.paragraph_blocks.is_empty());
}

/// The second paragraphs share half their terms, all weighted alike: similarity 0.5.
fn half_similar_articles() -> [Article; 2] {
    [
        Article::from_text(&[&["grape house iris"], &["apple banana cherry dog"]]),
        Article::from_text(&[&["grape house iris"], &["apple banana eagle fox"]]),
    ]
}

#[test]
fn paragraph_between_sentence_and_paragraph_thresholds() {
    let [first, second] = half_similar_articles();
    let mut aligner = Aligner::new(AlignmentParameters::default()).unwrap();
    let mut comparison = aligner.start([&first, &second]).unwrap();
    comparison.run_pass();
    let similarity = comparison.paragraph_similarity[[1, 1]].unwrap();
    assert!((similarity - 0.5).abs() < 1e-9, "{similarity}");
    let alignment = comparison.finish();
    // 0.5 is above the sentence threshold but not above the paragraph one.
    assert_eq!(paragraph_blocks(&alignment), vec![[vec![0], vec![0]]]);
    assert_eq!(
        sentence_blocks(&alignment),
        vec![[vec![position(0, 0)], vec![position(0, 0)]]]
    );

    let parameters = AlignmentParameters {
        paragraph_threshold: 0.45,
        ..AlignmentParameters::default()
    };
    let alignment = align(&first, &second, parameters);
    assert_eq!(paragraph_blocks(&alignment), vec![[vec![0], vec![0]], [vec![1], vec![1]]]);
    assert_eq!(
        sentence_blocks(&alignment),
        vec![
            [vec![position(0, 0)], vec![position(0, 0)]],
            [vec![position(1, 0)], vec![position(1, 0)]],
        ]
    );
}

#[test]
fn reset_similarities_keeps_aligned_pairs_skipped() {
    let [first, second] = half_similar_articles();
    let mut aligner = Aligner::new(AlignmentParameters::default()).unwrap();
    let mut comparison = aligner.start([&first, &second]).unwrap();
    comparison.run_pass();
    let unaligned = [SentenceIndex::new(1), SentenceIndex::new(1)];
    assert!(matches!(
        comparison.sentence_similarity.cached(unaligned),
        CachedSimilarity::Value(_)
    ));

    comparison.reset_similarities();
    assert_eq!(comparison.sentence_similarity.cached(unaligned), CachedSimilarity::Unset);
    assert!(comparison.sentence_similarity.is_skipped([SentenceIndex::new(0), SentenceIndex::new(1)]));
    assert!(comparison.sentence_similarity.is_skipped([SentenceIndex::new(1), SentenceIndex::new(0)]));
    assert_eq!(comparison.paragraph_similarity[[1, 1]], None);

    // The next pass recomputes the same value and still finds nothing new.
    assert_eq!(comparison.run_pass(), PassSummary::default());
    assert!(matches!(
        comparison.sentence_similarity.cached(unaligned),
        CachedSimilarity::Value(value) if (value - 0.5).abs() < 1e-9
    ));
}

fn split_paragraph_articles() -> [Article; 2] {
    [
        Article::from_text(&[
            &["apple banana cherry", "dog eagle fox", "kiwi lemon mango"],
            &["grape house iris"],
        ]),
        Article::from_text(&[
            &["apple banana cherry"],
            &["dog eagle fox", "nut olive pear"],
            &["grape house iris"],
        ]),
    ]
}

#[test]
fn paragraph_split_in_two() {
    let [first, second] = split_paragraph_articles();
    let mut aligner = Aligner::new(AlignmentParameters::default()).unwrap();
    let mut comparison = aligner.start([&first, &second]).unwrap();
    assert_eq!(
        comparison.run_pass(),
        PassSummary {
            paragraph_links: 3,
            sentence_links: 3,
        }
    );

    // The merged group left its unaligned pair to be recomputed with plain paragraph weights.
    let unaligned = [SentenceIndex::new(2), SentenceIndex::new(2)];
    assert_eq!(comparison.sentence_similarity.cached(unaligned), CachedSimilarity::Unset);
    assert!(comparison.sentence_similarity.is_skipped([SentenceIndex::new(2), SentenceIndex::new(1)]));

    assert_eq!(comparison.run_pass(), PassSummary::default());
    let alignment = comparison.finish();
    assert_eq!(paragraph_blocks(&alignment), vec![[vec![0], vec![0, 1]], [vec![1], vec![2]]]);
    assert_eq!(
        sentence_blocks(&alignment),
        vec![
            [vec![position(0, 0)], vec![position(0, 0)]],
            [vec![position(0, 1)], vec![position(1, 0)]],
            [vec![position(1, 0)], vec![position(2, 0)]],
        ]
    );
}

#[test]
fn paragraphs_joined_into_one() {
    let [second, first] = split_paragraph_articles();
    let alignment = align(&first, &second, AlignmentParameters::default());
    assert_eq!(paragraph_blocks(&alignment), vec![[vec![0, 1], vec![0]], [vec![2], vec![1]]]);
    assert_eq!(
        sentence_blocks(&alignment),
        vec![
            [vec![position(0, 0)], vec![position(0, 0)]],
            [vec![position(1, 0)], vec![position(0, 1)]],
            [vec![position(2, 0)], vec![position(1, 0)]],
        ]
    );
}

fn split_sentence_articles() -> [Article; 2] {
    [
        Article::from_text(&[&["apple banana cherry dog eagle fox", "zebra"]]),
        Article::from_text(&[&["apple banana", "cherry dog", "eagle fox", "zebra"]]),
    ]
}

fn slack_parameters() -> AlignmentParameters {
    AlignmentParameters {
        extension_slack: 0.1,
        ..AlignmentParameters::default()
    }
}

#[test]
fn sentence_split_in_three() {
    let [first, second] = split_sentence_articles();
    let alignment = align(&first, &second, slack_parameters());
    assert_eq!(paragraph_blocks(&alignment), vec![[vec![0], vec![0]]]);
    assert_eq!(
        sentence_blocks(&alignment),
        vec![
            [vec![position(0, 0)], vec![position(0, 0), position(0, 1), position(0, 2)]],
            [vec![position(0, 1)], vec![position(0, 3)]],
        ]
    );
    assert_eq!(
        alignment.sentence_blocks[0].links,
        vec![
            [position(0, 0), position(0, 0)],
            [position(0, 0), position(0, 1)],
            [position(0, 0), position(0, 2)],
        ]
    );
}

#[test]
fn sentences_joined_into_one() {
    let [second, first] = split_sentence_articles();
    let alignment = align(&first, &second, slack_parameters());
    assert_eq!(
        sentence_blocks(&alignment),
        vec![
            [vec![position(0, 0), position(0, 1), position(0, 2)], vec![position(0, 0)]],
            [vec![position(0, 3)], vec![position(0, 1)]],
        ]
    );
}

#[test]
fn extension_stops_before_a_better_diagonal() {
    // "eagle fox" would extend the first run, but fits the second sentence better.
    let first = Article::from_text(&[&["apple banana cherry dog eagle fox", "eagle fox zebra"]]);
    let second = Article::from_text(&[&["apple banana", "cherry dog", "eagle fox", "zebra"]]);
    let parameters = AlignmentParameters {
        extension_slack: 0.5,
        ..AlignmentParameters::default()
    };
    let alignment = align(&first, &second, parameters);
    assert_eq!(
        sentence_blocks(&alignment),
        vec![
            [vec![position(0, 0)], vec![position(0, 0), position(0, 1)]],
            [vec![position(0, 1)], vec![position(0, 2), position(0, 3)]],
        ]
    );
}

#[test]
fn aligner_grows_for_long_articles() {
    let paragraphs: Vec<String> = (0..60).map(|i| format!("first{i} second{i} third{i}")).collect();
    let paragraphs: Vec<[&str; 1]> = paragraphs.iter().map(|sentence| [sentence.as_str()]).collect();
    let paragraphs: Vec<&[&str]> = paragraphs.iter().map(|paragraph| &paragraph[..]).collect();
    let article = Article::from_text(&paragraphs);

    let mut aligner = Aligner::new(AlignmentParameters::default()).unwrap();
    let alignment = aligner.align([&article, &article], 1).unwrap();
    assert_eq!(alignment.paragraph_blocks.len(), 60);
    assert!(alignment
        .paragraph_blocks
        .iter()
        .enumerate()
        .all(|(i, block)| block.paragraphs == [vec![i], vec![i]]));
    assert_eq!(alignment.sentence_blocks.len(), 60);

    // The same aligner handles another, smaller pair afterwards.
    let [first, second] = split_paragraph_articles();
    let alignment = aligner.align([&first, &second], 1).unwrap();
    assert_eq!(alignment.paragraph_blocks.len(), 2);
}

#[test]
fn vocabulary_overflow() {
    let first = Article::from_text(&[&["apple banana cherry"]]);
    let second = Article::from_text(&[&["dog eagle"]]);
    let mut aligner = Aligner::new(AlignmentParameters {
        max_vocabulary: 4,
        ..AlignmentParameters::default()
    })
    .unwrap();
    assert!(matches!(
        aligner.align([&first, &second], 1),
        Err(AlignError::VocabularyOverflow { limit: 4, found: 5 })
    ));
}

#[test]
fn invalid_vicinities() {
    let parameters = AlignmentParameters {
        sentence_vicinities: vec![vec![[0, 1], [0, 0]]],
        ..AlignmentParameters::default()
    };
    assert!(matches!(
        Aligner::new(parameters),
        Err(AlignError::InvalidVicinities { level: "sentence", .. })
    ));
}

#[test]
fn one_based_alignment() {
    let [first, second] = split_paragraph_articles();
    let alignment = align(&first, &second, AlignmentParameters::default()).to_one_based();
    assert_eq!(paragraph_blocks(&alignment)[0], [vec![1], vec![1, 2]]);
    assert_eq!(alignment.sentence_blocks[1].links, vec![[position(1, 2), position(2, 1)]]);
    assert_eq!(alignment.paragraph_starts, [vec![0, 3, 4], vec![0, 1, 3, 4]]);
}
