//! Batch comparisons over a directory of article versions named
//! `<slug>.en.<level>.<ext>`.

use crate::error::{AlignError, InputError};
use regex::Regex;
use serde::Deserialize;
use std::{
    collections::BTreeMap,
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
    sync::LazyLock,
};

/// Two versions of a document to compare, and the number of alignment passes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct LevelComparison {
    pub lower: usize,
    pub higher: usize,
    pub passes: usize,
}

impl LevelComparison {
    pub fn default_list() -> Vec<LevelComparison> {
        [(0, 1, 3), (1, 2, 3), (2, 3, 2), (3, 4, 2), (4, 5, 2)]
            .into_iter()
            .map(|(lower, higher, passes)| LevelComparison { lower, higher, passes })
            .collect()
    }
}

impl FromStr for LevelComparison {
    type Err = String;

    /// Parses `LO:HI` or `LO:HI:PASSES`. Without an explicit count, one pass is run.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let numbers = s
            .split(':')
            .map(|part| part.trim().parse::<usize>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| format!("invalid level comparison {s:?}: {e}"))?;
        match numbers[..] {
            [lower, higher] => Ok(LevelComparison { lower, higher, passes: 1 }),
            [lower, higher, passes] => Ok(LevelComparison { lower, higher, passes }),
            _ => Err(format!("invalid level comparison {s:?}: expected LO:HI or LO:HI:PASSES")),
        }
    }
}

impl TryFrom<String> for LevelComparison {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for LevelComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.lower, self.higher, self.passes)
    }
}

/// All discovered versions of one document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    pub slug: String,
    pub versions: BTreeMap<usize, PathBuf>,
}

/// A comparison that can be run: both versions exist and are in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlannedComparison {
    pub slug: String,
    pub levels: LevelComparison,
    pub paths: [PathBuf; 2],
}

impl PlannedComparison {
    /// Output file stem, `<slug>-cmp-<lower>-<higher>`.
    pub fn stem(&self) -> String {
        format!("{}-cmp-{}-{}", self.slug, self.levels.lower, self.levels.higher)
    }
}

static VERSION_FILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<slug>.+)\.en\.(?P<level>\d+)\.(?:txt\.tok|tok|txt|json)$").unwrap());

/// Splits a version file name into its slug and level.
pub fn parse_version_name(name: &str) -> Option<(&str, usize)> {
    let captures = VERSION_FILE.captures(name)?;
    let level = captures["level"].parse().ok()?;
    Some((captures.name("slug")?.as_str(), level))
}

/// Output file stem for two explicitly given files: `<slug>-cmp-<lower>-<higher>`
/// when both are versions of one document, else built from both file stems.
pub fn comparison_stem(paths: [&Path; 2]) -> String {
    let names = paths.map(|path| path.file_name().and_then(|name| name.to_str()).unwrap_or_default());
    match names.map(parse_version_name) {
        [Some((first, lower)), Some((second, higher))] if first == second => format!("{first}-cmp-{lower}-{higher}"),
        _ => {
            let [first, second] =
                paths.map(|path| path.file_stem().map(|stem| stem.to_string_lossy()).unwrap_or_default());
            format!("{first}-cmp-{second}")
        }
    }
}

/// Extensions in the order they are preferred when one version exists in several formats.
fn format_rank(path: &Path) -> usize {
    match path.extension().and_then(|extension| extension.to_str()) {
        Some("json") => 0,
        Some("tok") => 1,
        _ => 2,
    }
}

/// Finds the article versions in `dir`, grouped by slug. Documents are sorted
/// by slug and their versions by level.
#[tracing::instrument(skip(filter))]
pub fn discover(dir: &Path, filter: Option<&Regex>) -> Result<Vec<Document>, InputError> {
    let io_error = |source| InputError::Io {
        path: dir.to_owned(),
        source,
    };
    let mut documents: BTreeMap<String, BTreeMap<usize, PathBuf>> = BTreeMap::new();
    for entry in std::fs::read_dir(dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        let Some((slug, level)) = parse_version_name(name) else {
            continue;
        };
        if filter.is_some_and(|filter| !filter.is_match(slug)) {
            continue;
        }
        let versions = documents.entry(slug.to_owned()).or_default();
        let preferred = versions
            .get(&level)
            .map_or(true, |existing| format_rank(&path) < format_rank(existing));
        if preferred {
            versions.insert(level, path);
        }
    }
    tracing::debug!(documents = documents.len(), "corpus discovered");
    Ok(documents
        .into_iter()
        .map(|(slug, versions)| Document { slug, versions })
        .collect())
}

impl Document {
    /// Checks one requested comparison against the versions of this document.
    pub fn plan(&self, levels: LevelComparison) -> Result<PlannedComparison, AlignError> {
        if levels.lower >= levels.higher {
            return Err(AlignError::LevelOrder {
                lower: levels.lower,
                higher: levels.higher,
            });
        }
        let path = |level: usize| {
            self.versions.get(&level).cloned().ok_or_else(|| AlignError::MissingLevel {
                slug: self.slug.clone(),
                level,
            })
        };
        Ok(PlannedComparison {
            slug: self.slug.clone(),
            levels,
            paths: [path(levels.lower)?, path(levels.higher)?],
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), "").unwrap();
    }

    #[test]
    fn parse_level_comparisons() {
        assert_eq!(
            "1:2".parse::<LevelComparison>(),
            Ok(LevelComparison {
                lower: 1,
                higher: 2,
                passes: 1
            })
        );
        assert_eq!(
            "0:4:3".parse::<LevelComparison>(),
            Ok(LevelComparison {
                lower: 0,
                higher: 4,
                passes: 3
            })
        );
        assert!("1".parse::<LevelComparison>().is_err());
        assert!("1:2:3:4".parse::<LevelComparison>().is_err());
        assert!("a:2".parse::<LevelComparison>().is_err());
        assert_eq!(LevelComparison::default_list()[2].to_string(), "2:3:2");
    }

    #[test]
    fn discover_groups_versions() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "turkey-riots.en.1.tok",
            "turkey-riots.en.0.tok",
            "turkey-riots.en.0.json",
            "ski-swat.en.4.txt.tok",
            "ski-swat.es.4.tok",
            "notes.txt",
        ] {
            touch(dir.path(), name);
        }
        let documents = discover(dir.path(), None).unwrap();
        assert_eq!(documents.len(), 2);
        assert_eq!(documents[0].slug, "ski-swat");
        assert_eq!(documents[0].versions.keys().copied().collect::<Vec<_>>(), vec![4]);
        assert_eq!(documents[1].slug, "turkey-riots");
        assert_eq!(documents[1].versions.keys().copied().collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(documents[1].versions[&0], dir.path().join("turkey-riots.en.0.json"));

        let filter = Regex::new("^turkey").unwrap();
        let documents = discover(dir.path(), Some(&filter)).unwrap();
        assert_eq!(documents.len(), 1);
    }

    #[test]
    fn discover_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        assert!(matches!(discover(&missing, None), Err(InputError::Io { path, .. }) if path == missing));
    }

    #[test]
    fn stems() {
        assert_eq!(parse_version_name("ski-swat.en.4.txt.tok"), Some(("ski-swat", 4)));
        assert_eq!(parse_version_name("ski-swat.4.tok"), None);
        assert_eq!(
            comparison_stem([Path::new("in/agtech-food.en.0.tok"), Path::new("in/agtech-food.en.1.json")]),
            "agtech-food-cmp-0-1"
        );
        assert_eq!(comparison_stem([Path::new("old.tok"), Path::new("new.tok")]), "old-cmp-new");
    }

    #[test]
    fn plan_comparisons() {
        let document = Document {
            slug: "pharaoh-tomb".to_owned(),
            versions: BTreeMap::from([(0, PathBuf::from("a")), (1, PathBuf::from("b"))]),
        };
        let levels = "0:1:3".parse().unwrap();
        let planned = document.plan(levels).unwrap();
        assert_eq!(planned.paths, [PathBuf::from("a"), PathBuf::from("b")]);
        assert_eq!(planned.stem(), "pharaoh-tomb-cmp-0-1");

        assert!(matches!(
            document.plan("1:0".parse().unwrap()),
            Err(AlignError::LevelOrder { lower: 1, higher: 0 })
        ));
        assert!(matches!(
            document.plan("1:2".parse().unwrap()),
            Err(AlignError::MissingLevel { level: 2, .. })
        ));
    }
}
