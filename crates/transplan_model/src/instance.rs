use std::collections::BTreeMap;

use ndarray::Array2;

use crate::error::WireError;
use crate::route::Route;
use crate::wire::{Snapshot, decode_capacities, decode_restrictions};

/// Direction of an inequality pinned to one route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestrictionOp {
    Greater,
    Less,
}

impl RestrictionOp {
    pub fn symbol(self) -> char {
        match self {
            RestrictionOp::Greater => '>',
            RestrictionOp::Less => '<',
        }
    }

    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '>' => Some(RestrictionOp::Greater),
            '<' => Some(RestrictionOp::Less),
            _ => None,
        }
    }
}

/// An inequality on the amount shipped along one route.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Restriction {
    pub op: RestrictionOp,
    pub bound: f64,
}

/// A transportation problem as it sits in the editor.
///
/// Suppliers and consumers are the margins of the cost matrix; their
/// lengths always match the matrix shape. A `None` cost cell has been
/// cleared by the user and blocks submission until it is filled again.
/// `0` in a margin means "not entered yet", which is why validation
/// demands strictly positive margins.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    suppliers: Vec<f64>,
    consumers: Vec<f64>,
    costs: Array2<Option<f64>>,
    restrictions: BTreeMap<Route, Restriction>,
    capacities: BTreeMap<Route, f64>,
}

impl Default for Instance {
    fn default() -> Self {
        Self::empty(3, 3)
    }
}

impl Instance {
    /// Fresh instance with every cost cell filled with `0` and empty
    /// margins.
    pub fn empty(rows: usize, cols: usize) -> Self {
        Self {
            suppliers: vec![0.0; rows],
            consumers: vec![0.0; cols],
            costs: Array2::from_elem((rows, cols), Some(0.0)),
            restrictions: BTreeMap::new(),
            capacities: BTreeMap::new(),
        }
    }

    /// Rebuilds an instance from a stored snapshot. Null price cells
    /// collapse to `0`, the same thing the editor writes back out.
    pub fn from_snapshot(snapshot: &Snapshot) -> Result<Self, WireError> {
        let rows = snapshot.suppliers.len();
        let cols = snapshot.consumers.len();
        if snapshot.price_matrix.len() != rows {
            return Err(WireError::MatrixRows {
                expected: rows,
                actual: snapshot.price_matrix.len(),
            });
        }
        let mut costs = Array2::from_elem((rows, cols), Some(0.0));
        for (i, row) in snapshot.price_matrix.iter().enumerate() {
            if row.len() != cols {
                return Err(WireError::MatrixColumns {
                    row: i,
                    expected: cols,
                    actual: row.len(),
                });
            }
            for (j, value) in row.iter().enumerate() {
                costs[[i, j]] = Some(value.unwrap_or(0.0));
            }
        }
        let restrictions = match &snapshot.restrictions {
            Some(map) => decode_restrictions(map)?,
            None => BTreeMap::new(),
        };
        let capacities = snapshot
            .capacities
            .as_deref()
            .map(decode_capacities)
            .unwrap_or_default();
        Ok(Self {
            suppliers: snapshot.suppliers.clone(),
            consumers: snapshot.consumers.clone(),
            costs,
            restrictions,
            capacities,
        })
    }

    pub fn rows(&self) -> usize {
        self.costs.nrows()
    }

    pub fn cols(&self) -> usize {
        self.costs.ncols()
    }

    pub fn suppliers(&self) -> &[f64] {
        &self.suppliers
    }

    pub fn consumers(&self) -> &[f64] {
        &self.consumers
    }

    pub fn costs(&self) -> &Array2<Option<f64>> {
        &self.costs
    }

    pub fn cost(&self, route: Route) -> Option<f64> {
        self.costs
            .get((route.row, route.column))
            .copied()
            .flatten()
    }

    pub fn restrictions(&self) -> &BTreeMap<Route, Restriction> {
        &self.restrictions
    }

    pub fn capacities(&self) -> &BTreeMap<Route, f64> {
        &self.capacities
    }

    /// Dense price matrix for outbound payloads. Unset cells read as `0`;
    /// validation rejects them before anything is sent, so the fallback
    /// only shows up in payloads that were never submitted.
    pub fn price_matrix(&self) -> Vec<Vec<f64>> {
        (0..self.rows())
            .map(|i| {
                (0..self.cols())
                    .map(|j| self.costs[[i, j]].unwrap_or(0.0))
                    .collect()
            })
            .collect()
    }

    // The setters index directly; callers keep edits inside the current
    // shape, which is what the dimension handling in the session layer
    // guarantees.

    pub fn set_supplier(&mut self, index: usize, value: f64) {
        self.suppliers[index] = value;
    }

    pub fn set_consumer(&mut self, index: usize, value: f64) {
        self.consumers[index] = value;
    }

    pub fn set_cost(&mut self, route: Route, value: Option<f64>) {
        self.costs[[route.row, route.column]] = value;
    }

    pub fn set_restriction(&mut self, route: Route, restriction: Restriction) {
        self.restrictions.insert(route, restriction);
    }

    pub fn clear_restriction(&mut self, route: Route) {
        self.restrictions.remove(&route);
    }

    pub fn set_capacity(&mut self, route: Route, bound: f64) {
        self.capacities.insert(route, bound);
    }

    pub fn clear_capacity(&mut self, route: Route) {
        self.capacities.remove(&route);
    }

    /// Reshapes the instance to `rows` by `cols` in one step.
    ///
    /// Surviving cells keep their values, including cleared cost cells,
    /// which stay cleared. New margin slots and new cost cells start at
    /// `0`. Restrictions and capacities that fall outside the new shape
    /// are dropped and do not come back when the table grows again.
    pub fn resize(&mut self, rows: usize, cols: usize) {
        self.suppliers.resize(rows, 0.0);
        self.consumers.resize(cols, 0.0);
        let costs = Array2::from_shape_fn((rows, cols), |(i, j)| {
            self.costs.get((i, j)).copied().unwrap_or(Some(0.0))
        });
        self.costs = costs;
        self.restrictions
            .retain(|route, _| route.row < rows && route.column < cols);
        self.capacities
            .retain(|route, _| route.row < rows && route.column < cols);
    }
}
