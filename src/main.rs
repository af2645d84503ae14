use anyhow::Context as _;
use clap::{error::ErrorKind, ArgAction, ArgGroup, CommandFactory as _, Parser};
use regex::Regex;
use std::{
    fs::File,
    io::{self, stdout, BufWriter, Write as _},
    path::{Path, PathBuf},
};
use tracing_subscriber::EnvFilter;
use vdalign::{
    algorithm::{Aligner, ArticleAlignment},
    config::{Config, ConfigOpt, OutputFormat},
    corpus::{comparison_stem, discover},
    input::read_article,
    output::{write_json, write_paragraphs, write_sentences},
    validate::validate,
};

#[derive(Parser)]
#[command(version, about = "Align paragraphs and sentences of two versions of an article")]
#[command(arg_required_else_help(true))]
#[command(group(ArgGroup::new("input").required(true)))]
struct Args {
    /// Pairs of article versions, the lower level first.
    #[arg(group = "input", value_names = ["LOWER1", "HIGHER1", "LOWER2", "HIGHER2"])]
    files: Vec<PathBuf>,
    /// Compare the versions of every document in this directory.
    #[arg(long, group = "input", value_name = "DIR")]
    corpus: Option<PathBuf>,
    /// Only compare documents whose slug matches.
    #[arg(long, requires = "corpus", value_name = "REGEX")]
    filter: Option<Regex>,
    /// Write results into files in this directory instead of standard output.
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,
    /// Configuration file, by default `vdalign/config.toml` in the user's config directory.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,
    #[arg(short, long)]
    quiet: bool,
    #[command(flatten)]
    config_opt: ConfigOpt,
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Some("error"),
        (false, 0) => None,
        (false, 1) => Some("info"),
        (false, 2) => Some("debug"),
        (false, _) => Some("trace"),
    };
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn compare(aligner: &mut Aligner, paths: [&Path; 2], passes: usize) -> anyhow::Result<ArticleAlignment> {
    let [first, second] = paths.map(read_article);
    let articles = [first?, second?];
    let mut comparison = aligner.start([&articles[0], &articles[1]])?;
    for _ in 0..passes {
        let summary = comparison.run_pass();
        tracing::info!(
            pass = comparison.passes(),
            paragraph_links = summary.paragraph_links,
            sentence_links = summary.sentence_links,
            "pass finished"
        );
    }
    let alignment = comparison.finish();
    for message in validate(&alignment) {
        tracing::warn!(first = %paths[0].display(), second = %paths[1].display(), "{message}");
    }
    Ok(alignment)
}

fn write_file(path: &Path, write: impl FnOnce(&mut BufWriter<File>) -> io::Result<()>) -> anyhow::Result<()> {
    let file = File::create(path).with_context(|| format!("cannot create {}", path.display()))?;
    let mut out = BufWriter::new(file);
    write(&mut out)
        .and_then(|()| out.flush())
        .with_context(|| format!("cannot write {}", path.display()))
}

fn emit(
    config: &Config,
    output_dir: Option<&Path>,
    stem: &str,
    paths: [&Path; 2],
    alignment: &ArticleAlignment,
) -> anyhow::Result<()> {
    let names = paths.map(|path| path.file_name().and_then(|name| name.to_str()).unwrap_or_default());
    match (output_dir, config.format) {
        (Some(dir), OutputFormat::Tsv) => {
            write_file(&dir.join(format!("{stem}.sentences.tsv")), |out| {
                write_sentences(out, names, alignment)
            })?;
            write_file(&dir.join(format!("{stem}.paragraphs.tsv")), |out| {
                write_paragraphs(out, names, alignment)
            })
        }
        (Some(dir), OutputFormat::Json) => {
            write_file(&dir.join(format!("{stem}.json")), |out| write_json(out, alignment))
        }
        (None, format) => {
            let mut out = stdout().lock();
            match format {
                OutputFormat::Tsv => {
                    write_sentences(&mut out, names, alignment)?;
                    write_paragraphs(&mut out, names, alignment)?;
                }
                OutputFormat::Json => write_json(&mut out, alignment)?,
            }
            Ok(())
        }
    }
}

/// Runs the configured level comparisons of every document in `corpus`. A
/// comparison that cannot be planned or computed is logged and skipped.
/// Returns the number of comparisons written.
fn align_corpus(
    config: &Config,
    aligner: &mut Aligner,
    corpus: &Path,
    filter: Option<&Regex>,
    output_dir: Option<&Path>,
) -> anyhow::Result<usize> {
    let mut written = 0;
    for document in discover(corpus, filter)? {
        for &levels in &config.levels {
            let planned = match document.plan(levels) {
                Ok(planned) => planned,
                Err(e) => {
                    tracing::warn!(slug = %document.slug, %levels, "skipping comparison: {e}");
                    continue;
                }
            };
            let paths = planned.paths.each_ref().map(PathBuf::as_path);
            let _span = tracing::info_span!("comparison", slug = %planned.slug, %levels).entered();
            let alignment = match compare(aligner, paths, levels.passes) {
                Ok(alignment) => alignment,
                Err(e) => {
                    tracing::warn!(slug = %planned.slug, %levels, "skipping comparison: {e:#}");
                    continue;
                }
            };
            emit(config, output_dir, &planned.stem(), paths, &alignment)?;
            written += 1;
        }
    }
    Ok(written)
}

fn try_main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    if args.files.len() % 2 != 0 {
        Args::command()
            .error(ErrorKind::TooFewValues, "File count must be even")
            .exit();
    }

    let config = Config::load(args.config.as_deref())?.update(args.config_opt);
    let mut aligner = Aligner::new(config.parameters()).context("invalid alignment parameters")?;
    let output_dir = args.output_dir.as_deref();
    if let Some(dir) = output_dir {
        std::fs::create_dir_all(dir).with_context(|| format!("cannot create {}", dir.display()))?;
    }

    if let Some(corpus) = &args.corpus {
        align_corpus(&config, &mut aligner, corpus, args.filter.as_ref(), output_dir)?;
        return Ok(());
    }

    for pair in args.files.chunks_exact(2) {
        let paths = [pair[0].as_path(), pair[1].as_path()];
        let stem = comparison_stem(paths);
        let _span = tracing::info_span!("comparison", %stem).entered();
        let alignment = compare(&mut aligner, paths, config.passes)
            .with_context(|| format!("comparing {} with {}", paths[0].display(), paths[1].display()))?;
        emit(&config, output_dir, &stem, paths, &alignment)?;
    }
    Ok(())
}

fn main() {
    // Returning the error from main() would print it with Debug.
    if let Err(e) = try_main() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
