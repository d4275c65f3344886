#![no_main]

use libfuzzer_sys::fuzz_target;
use transplan_model::{Instance, PlanCell, PlanGrid, Route, Snapshot, SolutionResponse, validate};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = Route::parse_key(s);
        let _ = Route::parse_compact(s);
        if let Ok(snapshot) = serde_json::from_str::<Snapshot>(s) {
            if let Ok(instance) = Instance::from_snapshot(&snapshot) {
                let _ = validate(&instance);
                let _ = instance.price_matrix();
            }
        }
        if let Ok(response) = serde_json::from_str::<SolutionResponse>(s) {
            let grid = PlanGrid::decode(&response.roots, 8, 8);
            let _ = grid.to_string();
            let _: f64 = grid.cells().iter().map(PlanCell::amount).sum();
            let _ = grid.cells().iter().filter(|cell| cell.is_degenerate()).count();
        }
    }
});
