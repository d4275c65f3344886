use std::fmt;

use log::debug;
use ndarray::Array2;

use crate::wire::SolutionRoot;

/// One cell of a decoded plan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlanCell {
    /// Plain shipped amount. Zero means the route is unused.
    Amount(f64),
    /// Degenerate cell carrying a symbolic epsilon. `order` is signed:
    /// positive renders as `+`, anything else as `-`.
    Epsilon { amount: f64, order: i64 },
}

impl PlanCell {
    pub fn amount(&self) -> f64 {
        match *self {
            PlanCell::Amount(amount) => amount,
            PlanCell::Epsilon { amount, .. } => amount,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        matches!(self, PlanCell::Epsilon { .. })
    }
}

impl fmt::Display for PlanCell {
    /// Epsilon cells with a zero amount drop the leading number, so a
    /// bare epsilon shows as `-2ε` rather than `0-2ε`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            PlanCell::Amount(amount) => write!(f, "{amount}"),
            PlanCell::Epsilon { amount, order } => {
                if amount != 0.0 {
                    write!(f, "{amount}")?;
                }
                let sign = if order > 0 { '+' } else { '-' };
                write!(f, "{sign}{}ε", order.unsigned_abs())
            }
        }
    }
}

/// Dense solution grid decoded from the sparse roots of a response.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanGrid {
    cells: Array2<PlanCell>,
}

impl PlanGrid {
    /// Spreads roots over a `rows` by `cols` grid of zero cells.
    ///
    /// Roots with negative ids or ids outside the grid are dropped, not
    /// errors; the solver's idea of the shape may trail the editor's.
    /// When two roots land on the same cell the later one wins.
    pub fn decode(roots: &[SolutionRoot], rows: usize, cols: usize) -> Self {
        let mut cells = Array2::from_elem((rows, cols), PlanCell::Amount(0.0));
        for root in roots {
            let (Ok(row), Ok(col)) = (
                usize::try_from(root.supplier_id),
                usize::try_from(root.consumer_id),
            ) else {
                debug!("dropping root with negative ids: {root:?}");
                continue;
            };
            if row >= rows || col >= cols {
                debug!("dropping root at ({row}, {col}) outside {rows}x{cols} grid");
                continue;
            }
            cells[[row, col]] = if root.epsilon == 0 {
                PlanCell::Amount(root.amount)
            } else {
                PlanCell::Epsilon {
                    amount: root.amount,
                    order: root.epsilon,
                }
            };
        }
        Self { cells }
    }

    pub fn rows(&self) -> usize {
        self.cells.nrows()
    }

    pub fn cols(&self) -> usize {
        self.cells.ncols()
    }

    pub fn cell(&self, row: usize, col: usize) -> &PlanCell {
        &self.cells[[row, col]]
    }

    pub fn cells(&self) -> &Array2<PlanCell> {
        &self.cells
    }
}

impl fmt::Display for PlanGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.cells.rows().into_iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            for (j, cell) in row.iter().enumerate() {
                if j > 0 {
                    f.write_str("\t")?;
                }
                write!(f, "{cell}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn root(supplier_id: i64, consumer_id: i64, amount: f64, epsilon: i64) -> SolutionRoot {
        SolutionRoot {
            supplier_id,
            consumer_id,
            amount,
            epsilon,
        }
    }

    #[rstest]
    #[case(PlanCell::Amount(0.0), "0")]
    #[case(PlanCell::Amount(5.0), "5")]
    #[case(PlanCell::Amount(2.5), "2.5")]
    #[case(PlanCell::Epsilon { amount: 5.0, order: 1 }, "5+1ε")]
    #[case(PlanCell::Epsilon { amount: 0.0, order: -2 }, "-2ε")]
    #[case(PlanCell::Epsilon { amount: 10.0, order: -3 }, "10-3ε")]
    #[case(PlanCell::Epsilon { amount: 0.0, order: 4 }, "+4ε")]
    #[case(PlanCell::Epsilon { amount: 0.0, order: i64::MIN }, "-9223372036854775808ε")]
    fn test_cell_rendering(#[case] cell: PlanCell, #[case] rendered: &str) {
        assert_eq!(cell.to_string(), rendered);
    }

    #[test]
    fn test_cell_accessors() {
        let plain = PlanCell::Amount(7.5);
        let degenerate = PlanCell::Epsilon {
            amount: 3.0,
            order: -2,
        };
        assert_eq!(plain.amount(), 7.5);
        assert_eq!(degenerate.amount(), 3.0);
        assert!(!plain.is_degenerate());
        assert!(degenerate.is_degenerate());
    }

    #[test]
    fn test_decode_spreads_roots() {
        let roots = vec![
            root(0, 0, 10.0, 0),
            root(1, 1, 5.0, 0),
            root(1, 0, 0.0, 1),
        ];
        let grid = PlanGrid::decode(&roots, 2, 2);
        assert_eq!(grid.cell(0, 0), &PlanCell::Amount(10.0));
        assert_eq!(grid.cell(0, 1), &PlanCell::Amount(0.0));
        assert_eq!(
            grid.cell(1, 0),
            &PlanCell::Epsilon {
                amount: 0.0,
                order: 1
            }
        );
        assert_eq!(grid.cell(1, 1), &PlanCell::Amount(5.0));
    }

    #[test]
    fn test_decode_drops_out_of_range_roots() {
        let roots = vec![
            root(0, 0, 7.0, 0),
            root(2, 0, 9.0, 0),
            root(0, 5, 9.0, 0),
            root(-1, 1, 9.0, 0),
            root(1, -3, 9.0, 0),
        ];
        let grid = PlanGrid::decode(&roots, 2, 2);
        assert_eq!(grid.cell(0, 0), &PlanCell::Amount(7.0));
        for (i, j) in [(0, 1), (1, 0), (1, 1)] {
            assert_eq!(grid.cell(i, j), &PlanCell::Amount(0.0));
        }
    }

    #[test]
    fn test_decode_empty_roots_gives_all_zero_grid() {
        let grid = PlanGrid::decode(&[], 2, 3);
        assert_eq!(grid.rows(), 2);
        assert_eq!(grid.cols(), 3);
        assert!(grid.cells().iter().all(|cell| cell == &PlanCell::Amount(0.0)));
    }

    #[test]
    fn test_decode_into_zero_size_grid() {
        let grid = PlanGrid::decode(&[root(0, 0, 1.0, 0)], 0, 0);
        assert_eq!(grid.rows(), 0);
        assert_eq!(grid.cols(), 0);
        assert_eq!(grid.to_string(), "");
    }

    #[test]
    fn test_extreme_epsilon_order_renders() {
        let grid = PlanGrid::decode(&[root(0, 0, 0.0, i64::MIN)], 1, 1);
        assert!(grid.cell(0, 0).is_degenerate());
        assert_eq!(grid.to_string(), "-9223372036854775808ε");
    }

    #[test]
    fn test_decode_later_root_wins() {
        let roots = vec![root(0, 0, 1.0, 0), root(0, 0, 2.0, 0)];
        let grid = PlanGrid::decode(&roots, 1, 1);
        assert_eq!(grid.cell(0, 0), &PlanCell::Amount(2.0));
    }

    #[test]
    fn test_grid_display() {
        let roots = vec![root(0, 0, 20.0, 0), root(1, 1, 0.0, -1), root(1, 2, 2.5, 0)];
        let grid = PlanGrid::decode(&roots, 2, 3);
        assert_eq!(grid.to_string(), "20\t0\t0\n0\t-1ε\t2.5");
    }
}
