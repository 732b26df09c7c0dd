use amp_topo::Topology;
use serde_json::json;

#[test]
fn duplicated_index_is_rejected() {
    let err = Topology::parse(&json!([[1, 2], 1])).expect_err("duplicate");
    assert_eq!(err.info().code, "topology-duplicate-index");
}

#[test]
fn missing_index_is_rejected() {
    let err = Topology::parse(&json!([[1, 2], 4])).expect_err("gap");
    assert_eq!(err.info().code, "topology-missing-index");
}

#[test]
fn non_binary_nesting_is_rejected() {
    let err = Topology::parse(&json!([1, 2, 3])).expect_err("ternary");
    assert_eq!(err.info().code, "topology-nesting");

    let err = Topology::parse(&json!([[1], [2, 3]])).expect_err("unary");
    assert_eq!(err.info().code, "topology-nesting");
}

#[test]
fn zero_leaf_is_rejected() {
    let err = Topology::parse(&json!([[0, 1], 2])).expect_err("parent index as leaf");
    assert_eq!(err.info().code, "topology-leaf-range");
}

#[test]
fn non_integer_leaf_is_rejected() {
    let err = Topology::parse(&json!([["a", 1], 2])).expect_err("string leaf");
    assert_eq!(err.info().code, "topology-node-kind");

    let err = Topology::parse(&json!([[1.5, 1], 2])).expect_err("fractional leaf");
    assert_eq!(err.info().code, "topology-leaf-index");
}

#[test]
fn two_body_topology_is_trivial_but_valid() {
    let topology = Topology::parse(&json!([1, 2])).expect("two-body");
    assert_eq!(topology.internal_nodes().len(), 1);
    assert!(topology.decay_nodes().is_empty());
}
