use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::WireError;
use crate::instance::{Instance, Restriction, RestrictionOp};
use crate::route::Route;

/// Seeding method for a basic plan.
///
/// The solver identifies methods both by snake_case name and by a
/// one-based ordinal; the two must stay in step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveMethod {
    Northwest,
    MinCost,
    Vogel,
}

impl SolveMethod {
    pub const ALL: [SolveMethod; 3] = [
        SolveMethod::Northwest,
        SolveMethod::MinCost,
        SolveMethod::Vogel,
    ];

    pub fn ordinal(self) -> u8 {
        match self {
            SolveMethod::Northwest => 1,
            SolveMethod::MinCost => 2,
            SolveMethod::Vogel => 3,
        }
    }

    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        match ordinal {
            1 => Some(SolveMethod::Northwest),
            2 => Some(SolveMethod::MinCost),
            3 => Some(SolveMethod::Vogel),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SolveMethod::Northwest => "northwest",
            SolveMethod::MinCost => "min_cost",
            SolveMethod::Vogel => "vogel",
        }
    }
}

impl fmt::Display for SolveMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SolveMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "northwest" => Ok(SolveMethod::Northwest),
            "min_cost" => Ok(SolveMethod::MinCost),
            "vogel" => Ok(SolveMethod::Vogel),
            other => Err(format!(
                "unknown method '{other}', expected northwest, min_cost or vogel"
            )),
        }
    }
}

/// One capacity row in wire form: the route as a `[row, column]` pair
/// plus its upper bound.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapacityEntry {
    pub cell: (usize, usize),
    pub value: f64,
}

/// Outbound solve payload.
///
/// Restrictions travel as a keyed map, capacities as a list; the two
/// sides of that asymmetry are [`encode_restrictions`] and
/// [`encode_capacities`]. Empty constraint sets are sent as explicit
/// nulls, while `method` and `user_id` are left out entirely when
/// absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveRequest {
    pub suppliers: Vec<f64>,
    pub consumers: Vec<f64>,
    pub price_matrix: Vec<Vec<f64>>,
    pub restrictions: Option<BTreeMap<String, String>>,
    pub capacities: Option<Vec<CapacityEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<SolveMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// One occupied route of a solved plan.
///
/// Ids are signed on purpose: a misbehaving solver may hand back
/// anything, and decoding ranges over whatever arrives before the grid
/// step drops what does not fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolutionRoot {
    pub supplier_id: i64,
    pub consumer_id: i64,
    pub amount: f64,
    #[serde(default)]
    pub epsilon: i64,
}

/// Solved plan as the solver reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolutionResponse {
    pub price: f64,
    pub is_optimal: bool,
    #[serde(default)]
    pub roots: Vec<SolutionRoot>,
}

/// Stored instance as persisted server-side. Identity fields are loose
/// on purpose, old rows may omit any of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    pub suppliers: Vec<f64>,
    pub consumers: Vec<f64>,
    pub price_matrix: Vec<Vec<Option<f64>>>,
    #[serde(default)]
    pub restrictions: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub capacities: Option<Vec<CapacityEntry>>,
    #[serde(default)]
    pub user_id: Option<i64>,
}

/// Renders restrictions into the keyed wire map, `"row, column"` mapped
/// to `"<op><bound>"`, e.g. `{"0, 2": ">5"}`.
pub fn encode_restrictions(
    restrictions: &BTreeMap<Route, Restriction>,
) -> BTreeMap<String, String> {
    restrictions
        .iter()
        .map(|(route, restriction)| {
            (
                route.key(),
                format!("{}{}", restriction.op.symbol(), restriction.bound),
            )
        })
        .collect()
}

pub fn decode_restrictions(
    map: &BTreeMap<String, String>,
) -> Result<BTreeMap<Route, Restriction>, WireError> {
    let mut out = BTreeMap::new();
    for (key, value) in map {
        let route = Route::parse_key(key)?;
        out.insert(route, parse_restriction(route, value)?);
    }
    Ok(out)
}

/// An operator character followed by a number, e.g. `">5"` or `"< 2.5"`.
fn parse_restriction(route: Route, value: &str) -> Result<Restriction, WireError> {
    let mut chars = value.trim().chars();
    let op = chars
        .next()
        .and_then(RestrictionOp::from_symbol)
        .ok_or_else(|| WireError::MissingOperator {
            route,
            value: value.to_string(),
        })?;
    let bound = chars
        .as_str()
        .trim()
        .parse()
        .map_err(|_| WireError::UnreadableBound {
            route,
            value: value.to_string(),
        })?;
    Ok(Restriction { op, bound })
}

/// Capacities flatten into a list ordered row-major by route.
pub fn encode_capacities(capacities: &BTreeMap<Route, f64>) -> Vec<CapacityEntry> {
    capacities
        .iter()
        .map(|(route, value)| CapacityEntry {
            cell: (route.row, route.column),
            value: *value,
        })
        .collect()
}

/// Duplicate cells keep the last entry, matching map insertion.
pub fn decode_capacities(entries: &[CapacityEntry]) -> BTreeMap<Route, f64> {
    entries
        .iter()
        .map(|entry| (Route::new(entry.cell.0, entry.cell.1), entry.value))
        .collect()
}

/// Assembles the outbound payload for one instance.
///
/// `method` should only be set when requesting a basic plan; optimal
/// requests leave it off and the solver picks its own seeding.
pub fn build_request(
    instance: &Instance,
    method: Option<SolveMethod>,
    user_id: Option<String>,
) -> SolveRequest {
    let restrictions = (!instance.restrictions().is_empty())
        .then(|| encode_restrictions(instance.restrictions()));
    let capacities =
        (!instance.capacities().is_empty()).then(|| encode_capacities(instance.capacities()));
    SolveRequest {
        suppliers: instance.suppliers().to_vec(),
        consumers: instance.consumers().to_vec(),
        price_matrix: instance.price_matrix(),
        restrictions,
        capacities,
        method,
        user_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn sample_instance() -> Instance {
        let mut instance = Instance::empty(2, 2);
        instance.set_supplier(0, 20.0);
        instance.set_supplier(1, 30.0);
        instance.set_consumer(0, 25.0);
        instance.set_consumer(1, 25.0);
        for i in 0..2 {
            for j in 0..2 {
                instance.set_cost(Route::new(i, j), Some((1 + i * 2 + j) as f64));
            }
        }
        instance
    }

    #[rstest]
    #[case(SolveMethod::Northwest, 1, "northwest")]
    #[case(SolveMethod::MinCost, 2, "min_cost")]
    #[case(SolveMethod::Vogel, 3, "vogel")]
    fn test_method_names_and_ordinals(
        #[case] method: SolveMethod,
        #[case] ordinal: u8,
        #[case] name: &str,
    ) {
        assert_eq!(method.ordinal(), ordinal);
        assert_eq!(method.as_str(), name);
        assert_eq!(SolveMethod::from_ordinal(ordinal), Some(method));
        assert_eq!(name.parse::<SolveMethod>(), Ok(method));
        assert_eq!(serde_json::to_value(method).unwrap(), json!(name));
    }

    #[test]
    fn test_method_rejects_unknown() {
        assert!(SolveMethod::from_ordinal(0).is_none());
        assert!(SolveMethod::from_ordinal(4).is_none());
        assert!("nw".parse::<SolveMethod>().is_err());
    }

    #[rstest]
    #[case(">5", RestrictionOp::Greater, 5.0)]
    #[case("<2.5", RestrictionOp::Less, 2.5)]
    #[case(" > 10 ", RestrictionOp::Greater, 10.0)]
    #[case("<1e2", RestrictionOp::Less, 100.0)]
    fn test_decode_restriction_values(
        #[case] value: &str,
        #[case] op: RestrictionOp,
        #[case] bound: f64,
    ) {
        let mut map = BTreeMap::new();
        map.insert("0, 1".to_string(), value.to_string());
        let decoded = decode_restrictions(&map).unwrap();
        assert_eq!(decoded.get(&Route::new(0, 1)), Some(&Restriction { op, bound }));
    }

    #[test]
    fn test_decode_restriction_missing_operator() {
        let mut map = BTreeMap::new();
        map.insert("1, 1".to_string(), "5".to_string());
        assert_eq!(
            decode_restrictions(&map),
            Err(WireError::MissingOperator {
                route: Route::new(1, 1),
                value: "5".to_string()
            })
        );
    }

    #[test]
    fn test_decode_restriction_unreadable_bound() {
        let mut map = BTreeMap::new();
        map.insert("1, 1".to_string(), ">abc".to_string());
        assert_eq!(
            decode_restrictions(&map),
            Err(WireError::UnreadableBound {
                route: Route::new(1, 1),
                value: ">abc".to_string()
            })
        );
    }

    #[test]
    fn test_decode_restriction_bad_key() {
        let mut map = BTreeMap::new();
        map.insert("first, second".to_string(), ">1".to_string());
        assert_eq!(
            decode_restrictions(&map),
            Err(WireError::MalformedRouteKey {
                key: "first, second".to_string()
            })
        );
    }

    #[test]
    fn test_restrictions_round_trip() {
        let mut restrictions = BTreeMap::new();
        restrictions.insert(
            Route::new(0, 2),
            Restriction {
                op: RestrictionOp::Greater,
                bound: 5.0,
            },
        );
        restrictions.insert(
            Route::new(1, 0),
            Restriction {
                op: RestrictionOp::Less,
                bound: 2.5,
            },
        );
        let encoded = encode_restrictions(&restrictions);
        assert_eq!(encoded.get("0, 2"), Some(&">5".to_string()));
        assert_eq!(encoded.get("1, 0"), Some(&"<2.5".to_string()));
        assert_eq!(decode_restrictions(&encoded).unwrap(), restrictions);
    }

    #[test]
    fn test_capacities_flatten_row_major() {
        let mut capacities = BTreeMap::new();
        capacities.insert(Route::new(1, 0), 40.0);
        capacities.insert(Route::new(0, 2), 10.0);
        capacities.insert(Route::new(0, 1), 30.0);
        let entries = encode_capacities(&capacities);
        let cells: Vec<_> = entries.iter().map(|entry| entry.cell).collect();
        assert_eq!(cells, vec![(0, 1), (0, 2), (1, 0)]);
        assert_eq!(decode_capacities(&entries), capacities);
    }

    #[test]
    fn test_request_shape_optimal_without_constraints() {
        let request = build_request(&sample_instance(), None, None);
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "suppliers": [20.0, 30.0],
                "consumers": [25.0, 25.0],
                "price_matrix": [[1.0, 2.0], [3.0, 4.0]],
                "restrictions": null,
                "capacities": null,
            })
        );
    }

    #[test]
    fn test_request_shape_basic_with_constraints() {
        let mut instance = sample_instance();
        instance.set_restriction(
            Route::new(0, 1),
            Restriction {
                op: RestrictionOp::Greater,
                bound: 5.0,
            },
        );
        for i in 0..2 {
            for j in 0..2 {
                instance.set_capacity(Route::new(i, j), 50.0);
            }
        }
        let request = build_request(
            &instance,
            Some(SolveMethod::Vogel),
            Some("user-7".to_string()),
        );
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "suppliers": [20.0, 30.0],
                "consumers": [25.0, 25.0],
                "price_matrix": [[1.0, 2.0], [3.0, 4.0]],
                "restrictions": {"0, 1": ">5"},
                "capacities": [
                    {"cell": [0, 0], "value": 50.0},
                    {"cell": [0, 1], "value": 50.0},
                    {"cell": [1, 0], "value": 50.0},
                    {"cell": [1, 1], "value": 50.0},
                ],
                "method": "vogel",
                "user_id": "user-7",
            })
        );
    }

    #[test]
    fn test_response_decodes_with_missing_roots() {
        let response: SolutionResponse =
            serde_json::from_value(json!({"price": 12.5, "is_optimal": true})).unwrap();
        assert_eq!(response.price, 12.5);
        assert!(response.is_optimal);
        assert!(response.roots.is_empty());
    }

    #[test]
    fn test_response_decodes_roots_with_default_epsilon() {
        let response: SolutionResponse = serde_json::from_value(json!({
            "price": 4.0,
            "is_optimal": false,
            "roots": [
                {"supplier_id": 0, "consumer_id": 1, "amount": 10.0},
                {"supplier_id": -2, "consumer_id": 0, "amount": 0.0, "epsilon": -1},
            ]
        }))
        .unwrap();
        assert_eq!(response.roots.len(), 2);
        assert_eq!(response.roots[0].epsilon, 0);
        assert_eq!(response.roots[1].supplier_id, -2);
        assert_eq!(response.roots[1].epsilon, -1);
    }

    #[test]
    fn test_snapshot_decodes_sparse_row() {
        let snapshot: Snapshot = serde_json::from_value(json!({
            "suppliers": [10.0],
            "consumers": [10.0],
            "price_matrix": [[null]],
        }))
        .unwrap();
        assert_eq!(snapshot.id, None);
        assert_eq!(snapshot.name, None);
        assert_eq!(snapshot.restrictions, None);
        assert_eq!(snapshot.price_matrix, vec![vec![None]]);
    }

    #[test]
    fn test_snapshot_decodes_full_row() {
        let snapshot: Snapshot = serde_json::from_value(json!({
            "id": 3,
            "name": "week 12",
            "suppliers": [10.0, 20.0],
            "consumers": [15.0, 15.0],
            "price_matrix": [[1.0, 2.0], [3.0, null]],
            "restrictions": {"0, 0": "<9"},
            "capacities": [{"cell": [1, 1], "value": 12.0}],
            "user_id": 42,
        }))
        .unwrap();
        assert_eq!(snapshot.id, Some(3));
        assert_eq!(snapshot.name.as_deref(), Some("week 12"));
        assert_eq!(snapshot.user_id, Some(42));
        let instance = Instance::from_snapshot(&snapshot).unwrap();
        assert_eq!(instance.cost(Route::new(1, 1)), Some(0.0));
        assert_eq!(
            instance.restrictions().get(&Route::new(0, 0)),
            Some(&Restriction {
                op: RestrictionOp::Less,
                bound: 9.0
            })
        );
        assert_eq!(instance.capacities().get(&Route::new(1, 1)), Some(&12.0));
    }
}
