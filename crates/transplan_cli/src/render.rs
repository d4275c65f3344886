use transplan_model::{Instance, PlanGrid, Route};

/// Cost table with supplier and consumer margins, tab separated.
/// Cleared cells print as `-`.
pub fn instance_table(instance: &Instance) -> String {
    let mut out = String::new();
    for j in 0..instance.cols() {
        out.push('\t');
        out.push_str(&format!("Consumer {}", j + 1));
    }
    out.push_str("\tSupply\n");
    for i in 0..instance.rows() {
        out.push_str(&format!("Supplier {}", i + 1));
        for j in 0..instance.cols() {
            match instance.cost(Route::new(i, j)) {
                Some(cost) => out.push_str(&format!("\t{cost}")),
                None => out.push_str("\t-"),
            }
        }
        out.push_str(&format!("\t{}\n", instance.suppliers()[i]));
    }
    out.push_str("Demand");
    for j in 0..instance.cols() {
        out.push_str(&format!("\t{}", instance.consumers()[j]));
    }
    out.push('\n');
    out
}

/// Decoded plan in the same layout as [`instance_table`], with epsilon
/// cells rendered symbolically.
pub fn plan_table(grid: &PlanGrid, suppliers: &[f64], consumers: &[f64]) -> String {
    let mut out = String::new();
    for j in 0..grid.cols() {
        out.push('\t');
        out.push_str(&format!("Consumer {}", j + 1));
    }
    out.push_str("\tSupply\n");
    for i in 0..grid.rows() {
        out.push_str(&format!("Supplier {}", i + 1));
        for j in 0..grid.cols() {
            out.push_str(&format!("\t{}", grid.cell(i, j)));
        }
        match suppliers.get(i) {
            Some(supply) => out.push_str(&format!("\t{supply}\n")),
            None => out.push('\n'),
        }
    }
    out.push_str("Demand");
    for j in 0..grid.cols() {
        match consumers.get(j) {
            Some(demand) => out.push_str(&format!("\t{demand}")),
            None => out.push_str("\t-"),
        }
    }
    out.push('\n');
    out
}
