use std::fmt;

use crate::instance::Instance;

/// One failed submission rule.
///
/// Positions are zero-based here; the rendered text is one-based because
/// that is what the user sees on screen. The `Display` strings are a
/// contract, clients match on them verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    MissingCost { row: usize, column: usize },
    NegativeCost { row: usize, column: usize },
    NonPositiveSupplier { index: usize },
    NonPositiveConsumer { index: usize },
    PartialCapacities,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::MissingCost { row, column } => write!(
                f,
                "All cells must be filled (missing value at row {}, column {})",
                row + 1,
                column + 1
            ),
            Violation::NegativeCost { row, column } => write!(
                f,
                "Cell values must be equal to or greater than 0 (negative value at row {}, column {})",
                row + 1,
                column + 1
            ),
            Violation::NonPositiveSupplier { index } => {
                write!(f, "Supplier {} must have a value greater than 0", index + 1)
            }
            Violation::NonPositiveConsumer { index } => {
                write!(f, "Consumer {} must have a value greater than 0", index + 1)
            }
            Violation::PartialCapacities => {
                f.write_str("All cells must have capacities when capacities are defined")
            }
        }
    }
}

/// Runs every submission rule against the instance.
///
/// Each rule reports at most its first offender, scanning cells in
/// row-major order and margins left to right, and the rules always land
/// in the same order: missing cells, negative cells, suppliers,
/// consumers, capacity coverage. An empty report means the instance may
/// be submitted.
pub fn validate(instance: &Instance) -> Vec<Violation> {
    let mut report = Vec::new();
    let costs = instance.costs();

    if let Some(((row, column), _)) = costs.indexed_iter().find(|(_, cell)| cell.is_none()) {
        report.push(Violation::MissingCost { row, column });
    }

    if let Some(((row, column), _)) = costs
        .indexed_iter()
        .find(|(_, cell)| matches!(cell, Some(value) if *value < 0.0))
    {
        report.push(Violation::NegativeCost { row, column });
    }

    if let Some(index) = instance.suppliers().iter().position(|value| *value <= 0.0) {
        report.push(Violation::NonPositiveSupplier { index });
    }

    if let Some(index) = instance.consumers().iter().position(|value| *value <= 0.0) {
        report.push(Violation::NonPositiveConsumer { index });
    }

    // Capacities are all or nothing: either no route has one or every
    // route does.
    let capacities = instance.capacities();
    if !capacities.is_empty() && capacities.len() != instance.rows() * instance.cols() {
        report.push(Violation::PartialCapacities);
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::Route;

    fn submittable(rows: usize, cols: usize) -> Instance {
        let mut instance = Instance::empty(rows, cols);
        for i in 0..rows {
            instance.set_supplier(i, 20.0);
        }
        for j in 0..cols {
            instance.set_consumer(j, 15.0);
        }
        for i in 0..rows {
            for j in 0..cols {
                instance.set_cost(Route::new(i, j), Some(1.0));
            }
        }
        instance
    }

    #[test]
    fn test_clean_instance_passes() {
        assert!(validate(&submittable(3, 3)).is_empty());
    }

    #[test]
    fn test_zero_cost_is_allowed() {
        let mut instance = submittable(2, 2);
        instance.set_cost(Route::new(0, 0), Some(0.0));
        assert!(validate(&instance).is_empty());
    }

    #[test]
    fn test_missing_cell_reports_first_offender_row_major() {
        let mut instance = submittable(3, 3);
        instance.set_cost(Route::new(2, 0), None);
        instance.set_cost(Route::new(1, 2), None);
        let report = validate(&instance);
        assert_eq!(report, vec![Violation::MissingCost { row: 1, column: 2 }]);
        assert_eq!(
            report[0].to_string(),
            "All cells must be filled (missing value at row 2, column 3)"
        );
    }

    #[test]
    fn test_negative_cell_message() {
        let mut instance = submittable(2, 2);
        instance.set_cost(Route::new(1, 1), Some(-3.0));
        let report = validate(&instance);
        assert_eq!(
            report[0].to_string(),
            "Cell values must be equal to or greater than 0 (negative value at row 2, column 2)"
        );
    }

    #[test]
    fn test_margin_messages() {
        let mut instance = submittable(2, 3);
        instance.set_supplier(1, 0.0);
        instance.set_consumer(2, -4.0);
        let report = validate(&instance);
        assert_eq!(
            report,
            vec![
                Violation::NonPositiveSupplier { index: 1 },
                Violation::NonPositiveConsumer { index: 2 },
            ]
        );
        assert_eq!(
            report[0].to_string(),
            "Supplier 2 must have a value greater than 0"
        );
        assert_eq!(
            report[1].to_string(),
            "Consumer 3 must have a value greater than 0"
        );
    }

    #[test]
    fn test_partial_capacities_flagged() {
        let mut instance = submittable(2, 2);
        instance.set_capacity(Route::new(0, 0), 10.0);
        assert_eq!(validate(&instance), vec![Violation::PartialCapacities]);

        // all but one covered is still partial
        instance.set_capacity(Route::new(0, 1), 10.0);
        instance.set_capacity(Route::new(1, 0), 10.0);
        let report = validate(&instance);
        assert_eq!(report, vec![Violation::PartialCapacities]);
        assert_eq!(
            report[0].to_string(),
            "All cells must have capacities when capacities are defined"
        );
    }

    #[test]
    fn test_full_capacities_pass() {
        let mut instance = submittable(2, 2);
        for i in 0..2 {
            for j in 0..2 {
                instance.set_capacity(Route::new(i, j), 25.0);
            }
        }
        assert!(validate(&instance).is_empty());
    }

    #[test]
    fn test_report_order_is_fixed() {
        let mut instance = submittable(2, 2);
        instance.set_cost(Route::new(0, 1), None);
        instance.set_cost(Route::new(1, 0), Some(-1.0));
        instance.set_supplier(0, 0.0);
        instance.set_consumer(1, 0.0);
        instance.set_capacity(Route::new(0, 0), 5.0);

        let report = validate(&instance);
        insta::assert_debug_snapshot!(report, @r#"
        [
            MissingCost {
                row: 0,
                column: 1,
            },
            NegativeCost {
                row: 1,
                column: 0,
            },
            NonPositiveSupplier {
                index: 0,
            },
            NonPositiveConsumer {
                index: 1,
            },
            PartialCapacities,
        ]
        "#);
    }
}
