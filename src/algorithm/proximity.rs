use float_ord::FloatOrd;

use crate::error::AlignError;

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct ProximityEntry {
    pub offset: [usize; 2],
    pub distance: f64,
}

fn squared_length(offset: [usize; 2]) -> usize {
    offset[0] * offset[0] + offset[1] * offset[1]
}

/// All offsets of a grid ordered by their euclidean distance from the origin.
#[derive(Debug, Default)]
pub(crate) struct ProximityIndex {
    size: [usize; 2],
    entries: Vec<ProximityEntry>,
}

impl ProximityIndex {
    #[cfg(test)]
    pub fn size(&self) -> [usize; 2] {
        self.size
    }

    #[cfg(test)]
    pub fn entries(&self) -> &[ProximityEntry] {
        &self.entries
    }

    /// Makes the index cover a grid of at least `size`. Returns whether it had to
    /// be rebuilt, which changes the ranks of the entries.
    pub fn ensure_capacity(&mut self, size: [usize; 2]) -> bool {
        if size[0] <= self.size[0] && size[1] <= self.size[1] {
            return false;
        }
        let [n, m] = [size[0].max(self.size[0]).max(1), size[1].max(self.size[1]).max(1)];
        tracing::debug!(n, m, "rebuilding proximity index");

        let mut entries = Vec::with_capacity(n * m);
        // Anti-diagonals by increasing dx + dy, each from its largest dx down.
        for diagonal in 0..(n + m - 1) {
            let lowest = diagonal.saturating_sub(m - 1);
            let highest = diagonal.min(n - 1);
            for dx in (lowest..=highest).rev() {
                let offset = [dx, diagonal - dx];
                entries.push(ProximityEntry {
                    offset,
                    distance: (squared_length(offset) as f64).sqrt(),
                });
            }
        }
        entries.sort_by_key(|entry| FloatOrd(entry.distance));

        self.size = [n, m];
        self.entries = entries;
        true
    }

    /// Scans the offsets from `start_rank` on and returns the first one that keeps
    /// `origin + offset` inside `bounds` and satisfies `predicate`.
    pub fn nearest_matching(
        &self,
        origin: [usize; 2],
        start_rank: usize,
        bounds: [usize; 2],
        mut predicate: impl FnMut([usize; 2]) -> bool,
    ) -> Option<[usize; 2]> {
        if origin[0] >= bounds[0] || origin[1] >= bounds[1] {
            return None;
        }
        let region = [bounds[0] - origin[0], bounds[1] - origin[1]];
        assert!(
            region[0] <= self.size[0] && region[1] <= self.size[1],
            "proximity index of size {:?} cannot cover {region:?}",
            self.size,
        );
        let farthest = squared_length([region[0] - 1, region[1] - 1]);

        for entry in self.entries.iter().skip(start_rank) {
            let offset = entry.offset;
            if squared_length(offset) > farthest {
                break;
            }
            if offset[0] < region[0] && offset[1] < region[1] && predicate(offset) {
                return Some(offset);
            }
        }
        None
    }

    /// Appends, as singleton groups, the offsets that are not farther than the
    /// farthest explicit one but are missing from `groups`. Returns the rank at
    /// which a fallback search has to start so that it considers exactly the
    /// offsets that the groups do not.
    pub fn register_vicinities(&mut self, groups: &mut Vec<Vec<[usize; 2]>>) -> usize {
        let farthest = groups.iter().flatten().map(|&offset| squared_length(offset)).max().unwrap_or(0);
        let mut radius = (farthest as f64).sqrt() as usize;
        while (radius + 1) * (radius + 1) <= farthest {
            radius += 1;
        }
        self.ensure_capacity([radius + 1, radius + 1]);

        let covered = self
            .entries
            .iter()
            .take_while(|entry| squared_length(entry.offset) <= farthest)
            .count();
        for entry in &self.entries[..covered] {
            let offset = entry.offset;
            if offset != [0, 0] && !groups.iter().flatten().any(|&explicit| explicit == offset) {
                groups.push(vec![offset]);
            }
        }
        covered
    }
}

/// Explicit vicinity groups of one alignment level and the rank where the
/// distance-ordered fallback continues.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Vicinities {
    pub groups: Vec<Vec<[usize; 2]>>,
    pub fallback_start: usize,
}

impl Vicinities {
    /// Finds the most similar in-bounds cell around `origin`, one group at a
    /// time, and returns its offset once the best value so far exceeds
    /// `threshold`. Cells with no similarity never match.
    pub fn best_match(
        &self,
        origin: [usize; 2],
        bounds: [usize; 2],
        threshold: f64,
        mut similarity: impl FnMut([usize; 2]) -> Option<f64>,
    ) -> Option<[usize; 2]> {
        let mut best = 0.0;
        let mut best_offset = None;
        for group in &self.groups {
            for &offset in group {
                let cell = [origin[0] + offset[0], origin[1] + offset[1]];
                if cell[0] >= bounds[0] || cell[1] >= bounds[1] {
                    continue;
                }
                if let Some(value) = similarity(cell) {
                    if value > best {
                        best = value;
                        best_offset = Some(offset);
                    }
                }
            }
            if best > threshold {
                return best_offset;
            }
        }
        None
    }
}

/// The proximity index together with the vicinities registered in it.
#[derive(Debug)]
pub(crate) struct SearchOrder {
    pub index: ProximityIndex,
    pub paragraph: Vicinities,
    pub sentence: Vicinities,
}

fn check_vicinities(level: &'static str, groups: &[Vec<[usize; 2]>]) -> Result<(), AlignError> {
    let invalid = |reason: String| AlignError::InvalidVicinities { level, reason };
    if groups.is_empty() {
        return Err(invalid("no vicinity groups given".to_string()));
    }
    let mut seen = vec![];
    for group in groups {
        if group.is_empty() {
            return Err(invalid("a vicinity group is empty".to_string()));
        }
        for &offset in group {
            if offset == [0, 0] {
                return Err(invalid("the offset (0, 0) cannot be a vicinity".to_string()));
            }
            if seen.contains(&offset) {
                return Err(invalid(format!("the offset {offset:?} is listed twice")));
            }
            seen.push(offset);
        }
    }
    Ok(())
}

impl SearchOrder {
    pub fn new(paragraph: Vec<Vec<[usize; 2]>>, sentence: Vec<Vec<[usize; 2]>>) -> Result<Self, AlignError> {
        check_vicinities("paragraph", &paragraph)?;
        check_vicinities("sentence", &sentence)?;
        let mut search_order = SearchOrder {
            index: ProximityIndex::default(),
            paragraph: Vicinities {
                groups: paragraph,
                fallback_start: 0,
            },
            sentence: Vicinities {
                groups: sentence,
                fallback_start: 0,
            },
        };
        search_order.register();
        Ok(search_order)
    }

    fn register(&mut self) {
        self.paragraph.fallback_start = self.index.register_vicinities(&mut self.paragraph.groups);
        self.sentence.fallback_start = self.index.register_vicinities(&mut self.sentence.groups);
    }

    pub fn ensure_capacity(&mut self, size: [usize; 2]) {
        if self.index.ensure_capacity(size) {
            self.register();
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn default_paragraph_groups() -> Vec<Vec<[usize; 2]>> {
        vec![vec![[0, 1], [1, 0], [1, 1]], vec![[1, 2], [2, 1]]]
    }

    #[test]
    fn generation_order() {
        let mut index = ProximityIndex::default();
        index.ensure_capacity([3, 2]);
        let offsets: Vec<[usize; 2]> = index.entries().iter().map(|entry| entry.offset).collect();
        assert_eq!(offsets, vec![[0, 0], [1, 0], [0, 1], [1, 1], [2, 0], [2, 1]]);
    }

    #[test]
    fn distances_do_not_decrease() {
        let mut index = ProximityIndex::default();
        index.ensure_capacity([13, 7]);
        assert_eq!(index.entries().len(), 13 * 7);
        for pair in index.entries().windows(2) {
            assert!(pair[0].distance <= pair[1].distance);
        }
        let mut offsets: Vec<[usize; 2]> = index.entries().iter().map(|entry| entry.offset).collect();
        offsets.sort();
        offsets.dedup();
        assert_eq!(offsets.len(), 13 * 7);
    }

    #[test]
    fn capacity_only_grows() {
        let mut index = ProximityIndex::default();
        assert!(index.ensure_capacity([5, 4]));
        let before = index.entries().to_vec();
        assert!(!index.ensure_capacity([5, 4]));
        assert!(!index.ensure_capacity([2, 3]));
        assert_eq!(index.entries(), &before[..]);

        assert!(index.ensure_capacity([6, 1]));
        assert_eq!(index.size(), [6, 4]);
        assert_eq!(index.entries().len(), 24);
    }

    #[test]
    fn nearest_matching_respects_bounds() {
        let mut index = ProximityIndex::default();
        index.ensure_capacity([10, 10]);
        // Only (4, 6) qualifies; the search must get there from (3, 3).
        let found = index.nearest_matching([3, 3], 1, [5, 7], |offset| offset == [1, 3]);
        assert_eq!(found, Some([1, 3]));

        let mut visited = vec![];
        let found = index.nearest_matching([3, 3], 0, [5, 7], |offset| {
            visited.push(offset);
            false
        });
        assert_eq!(found, None);
        assert_eq!(visited.len(), 2 * 4);
        assert!(visited.iter().all(|offset| offset[0] < 2 && offset[1] < 4));

        assert_eq!(index.nearest_matching([5, 0], 0, [5, 7], |_| true), None);
    }

    #[test]
    fn nearest_matching_prefers_euclidean_distance() {
        let mut index = ProximityIndex::default();
        index.ensure_capacity([8, 8]);
        // (2, 2) is farther in manhattan distance than (3, 0), but closer in euclidean.
        let found = index.nearest_matching([0, 0], 1, [8, 8], |offset| offset == [3, 0] || offset == [2, 2]);
        assert_eq!(found, Some([2, 2]));
    }

    #[test]
    fn register_default_vicinities() {
        let mut index = ProximityIndex::default();
        index.ensure_capacity([50, 50]);
        let mut groups = default_paragraph_groups();
        let start = index.register_vicinities(&mut groups);
        // (2, 0) and (0, 2) are closer than (1, 2) and get their own groups.
        assert_eq!(groups.len(), 4);
        assert_eq!(groups[2].len(), 1);
        assert_eq!(groups[3].len(), 1);
        let mut added = vec![groups[2][0], groups[3][0]];
        added.sort();
        assert_eq!(added, vec![[0, 2], [2, 0]]);
        assert_eq!(start, 8);
        assert!(index.entries()[start].distance > 5f64.sqrt());
    }

    #[test]
    fn registration_covers_every_offset_once() {
        let cases: Vec<Vec<Vec<[usize; 2]>>> = vec![
            default_paragraph_groups(),
            vec![vec![[0, 1], [1, 0], [1, 1]]],
            vec![vec![[3, 1]], vec![[1, 1]]],
            vec![vec![[0, 4]]],
        ];
        for mut groups in cases {
            let mut index = ProximityIndex::default();
            index.ensure_capacity([2, 2]);
            let start = index.register_vicinities(&mut groups);
            let farthest = groups.iter().flatten().map(|&offset| squared_length(offset)).max().unwrap();
            let listed: Vec<[usize; 2]> = groups.iter().flatten().copied().collect();
            for entry in index.entries() {
                let count = listed.iter().filter(|&&offset| offset == entry.offset).count();
                let expected = usize::from(entry.offset != [0, 0] && squared_length(entry.offset) <= farthest);
                assert_eq!(count, expected, "{:?}", entry.offset);
            }
            for (rank, entry) in index.entries().iter().enumerate() {
                assert_eq!(rank >= start, squared_length(entry.offset) > farthest);
            }
        }
    }

    #[test]
    fn search_order_registers_again_after_growth() {
        let mut search_order =
            SearchOrder::new(default_paragraph_groups(), vec![vec![[0, 1], [1, 0], [1, 1]]]).unwrap();
        let groups = search_order.paragraph.groups.clone();
        search_order.ensure_capacity([40, 30]);
        assert_eq!(search_order.paragraph.groups, groups);
        assert_eq!(search_order.paragraph.fallback_start, 8);
        assert_eq!(search_order.sentence.fallback_start, 4);
        assert_eq!(search_order.sentence.groups.len(), 1);
    }

    #[test]
    fn best_match_in_vicinities() {
        let vicinities = Vicinities {
            groups: default_paragraph_groups(),
            fallback_start: 8,
        };
        const VALUES: [[f64; 4]; 4] = [
            [0.0, 0.3, 0.2, 0.0],
            [0.6, 0.4, 0.9, 0.0],
            [0.1, 0.8, 0.0, 0.0],
            [0.0, 0.0, 0.0, 0.0],
        ];
        let grid = |cell: [usize; 2]| Some(VALUES[cell[0]][cell[1]]);
        // The first group already beats the threshold.
        assert_eq!(vicinities.best_match([0, 0], [4, 4], 0.5, grid), Some([1, 0]));
        // Only the second group does.
        assert_eq!(vicinities.best_match([0, 0], [4, 4], 0.7, grid), Some([1, 2]));
        // (1, 2) is out of bounds, so (2, 1) wins.
        assert_eq!(vicinities.best_match([0, 0], [4, 2], 0.7, grid), Some([2, 1]));
        assert_eq!(vicinities.best_match([0, 0], [4, 4], 0.95, grid), None);
        assert_eq!(vicinities.best_match([0, 0], [4, 4], 0.1, |_| None), None);
    }

    #[test]
    fn invalid_vicinities() {
        assert!(SearchOrder::new(vec![vec![[0, 0]]], vec![vec![[1, 1]]]).is_err());
        assert!(SearchOrder::new(vec![vec![]], vec![vec![[1, 1]]]).is_err());
        assert!(SearchOrder::new(vec![vec![[1, 1]]], vec![]).is_err());
        assert!(SearchOrder::new(vec![vec![[1, 1]], vec![[1, 1]]], vec![vec![[1, 1]]]).is_err());
    }
}
