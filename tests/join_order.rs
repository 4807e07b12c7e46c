//! Join Order Tests
//!
//! Tests for the merge-join fold:
//! - Consecutive equated tables become a left-deep merge-join chain
//! - Unrelated tables become a cross product
//! - An empty table list is rejected before any plan is built
//! - Exactly one filter and one project sit above the joins

use std::sync::Arc;

use relplan::observability::{Event, MemoryDiagnosticSink};
use relplan::planner::{CreateTableData, InsertData, JoinOrderBuilder, QueryData, UpdateCommand};
use relplan::query::{collect_rows, Constant, FieldDef, FieldType, Plan, PlanKind, Predicate, Term};
use relplan::server::{Engine, EngineConfig};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

struct Fixture {
    _temp: TempDir,
    engine: Engine,
    sink: Arc<MemoryDiagnosticSink>,
}

fn fixture() -> Fixture {
    let temp = TempDir::new().unwrap();
    let sink = Arc::new(MemoryDiagnosticSink::new());
    let config = EngineConfig::new(temp.path().join("db")).with_query_planner("sort");
    let engine = Engine::boot_with_sink(config, sink.clone()).unwrap();
    Fixture {
        _temp: temp,
        engine,
        sink,
    }
}

fn create_table(engine: &Engine, name: &str, fields: &[&str], rows: &[&[i64]]) {
    let planner = engine.planner();
    let tx = engine.new_transaction().unwrap();

    let create = CreateTableData {
        table_name: name.to_string(),
        fields: fields
            .iter()
            .map(|f| FieldDef::new(*f, FieldType::Int))
            .collect(),
    };
    planner
        .execute_update(&UpdateCommand::CreateTable(create), &tx)
        .unwrap();

    for row in rows {
        let insert = InsertData {
            table_name: name.to_string(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
            values: row.iter().map(|v| Constant::int(*v)).collect(),
        };
        planner
            .execute_update(&UpdateCommand::Insert(insert), &tx)
            .unwrap();
    }
    tx.commit().unwrap();
}

fn builder(f: &Fixture) -> JoinOrderBuilder {
    JoinOrderBuilder::new(Arc::clone(f.engine.catalog()), f.sink.clone())
}

/// Renders the tree as nested kinds, e.g. `Project(Select(TableScan))`.
fn shape(plan: &dyn Plan) -> String {
    let children: Vec<String> = plan.children().into_iter().map(shape).collect();
    if children.is_empty() {
        plan.kind().to_string()
    } else {
        format!("{}({})", plan.kind(), children.join(", "))
    }
}

fn count(plan: &dyn Plan, kind: PlanKind) -> usize {
    let own = usize::from(plan.kind() == kind);
    own + plan
        .children()
        .into_iter()
        .map(|c| count(c, kind))
        .sum::<usize>()
}

fn sorted(mut rows: Vec<Vec<Constant>>) -> Vec<Vec<Constant>> {
    rows.sort();
    rows
}

// =============================================================================
// Three-Table Chain
// =============================================================================

/// A.x = B.x AND B.y = C.y folds into two nested merge joins.
#[test]
fn test_three_table_chain_shape() {
    let f = fixture();
    create_table(&f.engine, "a", &["x", "p"], &[&[1, 100], &[2, 200], &[3, 300]]);
    create_table(&f.engine, "b", &["x", "y"], &[&[1, 10], &[2, 20], &[2, 30]]);
    create_table(&f.engine, "c", &["y", "q"], &[&[10, 7], &[30, 8], &[40, 9]]);

    let query = QueryData::new(["a", "b", "c"])
        .with_term(Term::fields_equal("a.x", "b.x"))
        .with_term(Term::fields_equal("b.y", "c.y"))
        .with_fields(["a.x", "c.y"]);

    let tx = f.engine.new_transaction().unwrap();
    let plan = builder(&f).build(&query, &tx).unwrap();

    assert_eq!(
        shape(plan.as_ref()),
        "Project(Select(MergeJoin(MergeJoin(TableScan, TableScan), TableScan)))"
    );
    let fields: Vec<&str> = plan.schema().fields().collect();
    assert_eq!(fields, vec!["a.x", "c.y"]);
    tx.commit().unwrap();
}

/// The chain returns exactly the equi-join rows.
#[test]
fn test_three_table_chain_rows() {
    let f = fixture();
    create_table(&f.engine, "a", &["x", "p"], &[&[1, 100], &[2, 200], &[3, 300]]);
    create_table(&f.engine, "b", &["x", "y"], &[&[1, 10], &[2, 20], &[2, 30]]);
    create_table(&f.engine, "c", &["y", "q"], &[&[10, 7], &[30, 8], &[40, 9]]);

    let query = QueryData::new(["a", "b", "c"])
        .with_term(Term::fields_equal("a.x", "b.x"))
        .with_term(Term::fields_equal("b.y", "c.y"))
        .with_fields(["a.x", "c.y"]);

    let tx = f.engine.new_transaction().unwrap();
    let plan = builder(&f).build(&query, &tx).unwrap();
    let rows = sorted(collect_rows(plan.as_ref()).unwrap());

    assert_eq!(
        rows,
        vec![
            vec![Constant::int(1), Constant::int(10)],
            vec![Constant::int(2), Constant::int(30)],
        ]
    );
    tx.commit().unwrap();
}

/// One MERGE_JOIN_CREATED record per merge join, none for the filter or project.
#[test]
fn test_merge_join_events_recorded() {
    let f = fixture();
    create_table(&f.engine, "a", &["x"], &[]);
    create_table(&f.engine, "b", &["x", "y"], &[]);
    create_table(&f.engine, "c", &["y"], &[]);

    let query = QueryData::new(["a", "b", "c"])
        .with_term(Term::fields_equal("a.x", "b.x"))
        .with_term(Term::fields_equal("b.y", "c.y"))
        .with_fields(["a.x"]);

    let before = f.sink.count(Event::MergeJoinCreated);
    let tx = f.engine.new_transaction().unwrap();
    builder(&f).build(&query, &tx).unwrap();

    assert_eq!(f.sink.count(Event::MergeJoinCreated) - before, 2);
    let last = f
        .sink
        .records()
        .into_iter()
        .filter(|r| r.event == Event::MergeJoinCreated)
        .last()
        .unwrap();
    assert_eq!(last.field("left_field"), Some("b.y"));
    assert_eq!(last.field("right_field"), Some("c.y"));
    assert_eq!(last.field("tx_id"), Some(tx.id().to_string().as_str()));
}

/// n tables chained on consecutive keys give n - 1 merge joins and no products.
#[test]
fn test_n_table_chain() {
    let f = fixture();
    let n = 5;
    for i in 0..n {
        create_table(&f.engine, &format!("t{}", i), &["k", "v"], &[&[1, i as i64]]);
    }

    let tables: Vec<String> = (0..n).map(|i| format!("t{}", i)).collect();
    let mut query = QueryData::new(tables);
    for i in 0..n - 1 {
        query = query.with_term(Term::fields_equal(
            format!("t{}.k", i),
            format!("t{}.k", i + 1),
        ));
    }
    let fields: Vec<String> = (0..n).rev().map(|i| format!("t{}.v", i)).collect();
    let query = query.with_fields(fields.clone());

    let before = f.sink.count(Event::MergeJoinCreated);
    let tx = f.engine.new_transaction().unwrap();
    let plan = builder(&f).build(&query, &tx).unwrap();

    assert_eq!(count(plan.as_ref(), PlanKind::MergeJoin), n - 1);
    assert_eq!(count(plan.as_ref(), PlanKind::Product), 0);
    assert_eq!(count(plan.as_ref(), PlanKind::Select), 1);
    assert_eq!(count(plan.as_ref(), PlanKind::Project), 1);
    assert_eq!(f.sink.count(Event::MergeJoinCreated) - before, n - 1);

    let schema_fields: Vec<String> = plan.schema().fields().map(String::from).collect();
    assert_eq!(schema_fields, fields);

    let rows = collect_rows(plan.as_ref()).unwrap();
    let expected: Vec<Constant> = (0..n).rev().map(|i| Constant::int(i as i64)).collect();
    assert_eq!(rows, vec![expected]);
}

// =============================================================================
// Cross Products
// =============================================================================

/// Two unrelated tables become one product of |A| x |B| rows.
#[test]
fn test_unrelated_tables_cross_product() {
    let f = fixture();
    create_table(&f.engine, "a", &["x"], &[&[1], &[2], &[3]]);
    create_table(&f.engine, "b", &["y"], &[&[10], &[20]]);

    let query = QueryData::new(["a", "b"]).with_fields(["a.x", "b.y"]);

    let before = f.sink.count(Event::MergeJoinCreated);
    let tx = f.engine.new_transaction().unwrap();
    let plan = builder(&f).build(&query, &tx).unwrap();

    assert_eq!(
        shape(plan.as_ref()),
        "Project(Select(Product(TableScan, TableScan)))"
    );
    assert_eq!(collect_rows(plan.as_ref()).unwrap().len(), 6);
    assert_eq!(f.sink.count(Event::MergeJoinCreated), before);
}

/// A constant term relates no pair of tables, so the join stays a product.
#[test]
fn test_constant_term_does_not_join() {
    let f = fixture();
    create_table(&f.engine, "a", &["x"], &[&[1], &[2]]);
    create_table(&f.engine, "b", &["x"], &[&[1], &[2]]);

    let query = QueryData::new(["a", "b"])
        .with_term(Term::field_equals("a.x", Constant::int(2)))
        .with_fields(["a.x", "b.x"]);

    let tx = f.engine.new_transaction().unwrap();
    let plan = builder(&f).build(&query, &tx).unwrap();

    assert_eq!(count(plan.as_ref(), PlanKind::Product), 1);
    assert_eq!(collect_rows(plan.as_ref()).unwrap().len(), 2);
}

// =============================================================================
// Filter and Empty Input
// =============================================================================

/// An always-true filter keeps every row in scan order.
#[test]
fn test_empty_predicate_filter_is_noop() {
    let f = fixture();
    create_table(&f.engine, "a", &["x"], &[&[3], &[1], &[2]]);

    let query = QueryData::new(["a"]).with_predicate(Predicate::new()).with_fields(["a.x"]);

    let tx = f.engine.new_transaction().unwrap();
    let plan = builder(&f).build(&query, &tx).unwrap();

    let rows = collect_rows(plan.as_ref()).unwrap();
    assert_eq!(
        rows,
        vec![
            vec![Constant::int(3)],
            vec![Constant::int(1)],
            vec![Constant::int(2)],
        ]
    );
}

/// No tables is an explicit REL_QUERY_EMPTY, not a panic.
#[test]
fn test_empty_table_list_rejected() {
    let f = fixture();
    let tx = f.engine.new_transaction().unwrap();

    let err = builder(&f).build(&QueryData::new(Vec::<String>::new()), &tx).unwrap_err();
    assert_eq!(err.code().code(), "REL_QUERY_EMPTY");
}

/// Projecting a field no table has is rejected by the plan algebra.
#[test]
fn test_unknown_projection_field_rejected() {
    let f = fixture();
    create_table(&f.engine, "a", &["x"], &[]);
    let tx = f.engine.new_transaction().unwrap();

    let err = builder(&f)
        .build(&QueryData::new(["a"]).with_fields(["a.nope"]), &tx)
        .unwrap_err();
    assert_eq!(err.code().code(), "REL_UNKNOWN_FIELD");
}
