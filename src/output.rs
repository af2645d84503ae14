//! Writers for finished alignments. Coordinates are written 1-based.

use crate::algorithm::{ArticleAlignment, SentencePosition};
use std::io::{self, Write};

/// Writes the sentence alignment: a header naming both versions, one line of
/// paragraph sentence offsets per article, then one line per block listing its
/// links as tab separated `paragraph:sentence,paragraph:sentence` pairs.
pub fn write_sentences(out: &mut impl Write, names: [&str; 2], alignment: &ArticleAlignment) -> io::Result<()> {
    writeln!(
        out,
        "{}\t\t{}\tThe next two lines give, for each paragraph of the first and the second article, \
         the number of sentences before it.",
        names[0], names[1]
    )?;
    for starts in &alignment.paragraph_starts {
        for start in starts {
            write!(out, "{start} ")?;
        }
        writeln!(out)?;
    }
    let position = |position: &SentencePosition| format!("{}:{}", position.paragraph + 1, position.sentence + 1);
    for block in &alignment.sentence_blocks {
        let links: Vec<String> = block
            .links
            .iter()
            .map(|[first, second]| format!("{},{}", position(first), position(second)))
            .collect();
        writeln!(out, "{}", links.join("\t"))?;
    }
    Ok(())
}

/// Writes the paragraph alignment: a header, a line with both paragraph
/// counts, then one line per block, `i,j<TAB><TAB>k,l`.
pub fn write_paragraphs(out: &mut impl Write, names: [&str; 2], alignment: &ArticleAlignment) -> io::Result<()> {
    writeln!(
        out,
        "{}\t\t{}\tThe next line gives the number of paragraphs of the first and the second article.",
        names[0], names[1]
    )?;
    writeln!(out, "{} {}", alignment.paragraph_counts[0], alignment.paragraph_counts[1])?;
    for block in &alignment.paragraph_blocks {
        let [first, second] = block.paragraphs.each_ref().map(|side| {
            side.iter()
                .map(|paragraph| (paragraph + 1).to_string())
                .collect::<Vec<_>>()
                .join(",")
        });
        writeln!(out, "{first}\t\t{second}")?;
    }
    Ok(())
}

pub fn write_json(out: &mut impl Write, alignment: &ArticleAlignment) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, &alignment.to_one_based())?;
    writeln!(out)
}
