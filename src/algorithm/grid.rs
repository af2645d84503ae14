use std::ops::{Index, IndexMut};

/// Row-major matrix addressed by `[article 0 index, article 1 index]`.
#[derive(Clone, Debug)]
pub(crate) struct Grid<T> {
    size: [usize; 2],
    internal: Vec<T>,
}

impl<T: Clone> Grid<T> {
    pub fn new(size: [usize; 2], value: T) -> Self {
        Grid {
            size,
            internal: vec![value; size[0] * size[1]],
        }
    }

    pub fn fill(&mut self, value: T) {
        self.internal.fill(value);
    }
}

impl<T> Grid<T> {
    pub fn size(&self) -> [usize; 2] {
        self.size
    }

    pub fn row(&self, index: usize) -> &[T] {
        &self.internal[(index * self.size[1])..((index + 1) * self.size[1])]
    }

    pub fn row_mut(&mut self, index: usize) -> &mut [T] {
        &mut self.internal[(index * self.size[1])..((index + 1) * self.size[1])]
    }

    pub fn column_mut(&mut self, index: usize) -> impl Iterator<Item = &mut T> {
        assert!(index < self.size[1]);
        self.internal.iter_mut().skip(index).step_by(self.size[1])
    }
}

impl<T> Index<[usize; 2]> for Grid<T> {
    type Output = T;

    fn index(&self, index: [usize; 2]) -> &Self::Output {
        assert!(index[0] < self.size[0] && index[1] < self.size[1]);
        &self.internal[index[0] * self.size[1] + index[1]]
    }
}

impl<T> IndexMut<[usize; 2]> for Grid<T> {
    fn index_mut(&mut self, index: [usize; 2]) -> &mut Self::Output {
        assert!(index[0] < self.size[0] && index[1] < self.size[1]);
        &mut self.internal[index[0] * self.size[1] + index[1]]
    }
}

#[cfg(test)]
mod test {
    use super::Grid;

    #[test]
    fn rows_and_columns() {
        let mut grid = Grid::new([2, 3], 0);
        grid[[1, 2]] = 5;
        grid.row_mut(0).fill(1);
        for cell in grid.column_mut(1) {
            *cell += 10;
        }
        assert_eq!(grid.row(0), &[1, 11, 1]);
        assert_eq!(grid.row(1), &[0, 10, 5]);
        assert_eq!(grid.size(), [2, 3]);
    }

    #[test]
    #[should_panic]
    fn out_of_bounds() {
        let grid = Grid::new([2, 3], false);
        let _ = grid[[0, 3]];
    }
}
