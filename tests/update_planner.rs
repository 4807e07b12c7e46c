//! Update Planner Tests
//!
//! Tests for DDL and DML through the composed planner:
//! - Inserts and deletes keep every index on the table in step
//! - Rollback undoes inserts, deletes and table definitions
//! - Definitions are mirrored into the catalog tables

use std::sync::Arc;

use relplan::catalog::{INDEX_CATALOG, TABLE_CATALOG};
use relplan::index::{CreateIndexData, IndexType};
use relplan::observability::NullDiagnosticSink;
use relplan::planner::{
    CreateTableData, DeleteData, InsertData, PlannerKind, QueryData, UpdateCommand,
};
use relplan::query::{collect_rows, Constant, FieldDef, FieldType, Predicate, Term};
use relplan::server::{Engine, EngineConfig};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn boot(temp: &TempDir) -> Engine {
    let config = EngineConfig::new(temp.path().join("db"));
    Engine::boot_with_sink(config, Arc::new(NullDiagnosticSink)).unwrap()
}

fn create_student(engine: &Engine) {
    let tx = engine.new_transaction().unwrap();
    let planner = engine.planner();
    planner
        .execute_update(
            &UpdateCommand::CreateTable(CreateTableData {
                table_name: "student".into(),
                fields: vec![
                    FieldDef::new("sid", FieldType::Int),
                    FieldDef::new("sname", FieldType::Varchar { length: 10 }),
                    FieldDef::new("major", FieldType::Int),
                ],
            }),
            &tx,
        )
        .unwrap();
    planner
        .execute_update(
            &UpdateCommand::CreateIndex(CreateIndexData::new(
                "student_major",
                "student",
                "major",
                IndexType::BTree,
            )),
            &tx,
        )
        .unwrap();
    planner
        .execute_update(
            &UpdateCommand::CreateIndex(CreateIndexData::new(
                "student_sid",
                "student",
                "sid",
                IndexType::Hash,
            )),
            &tx,
        )
        .unwrap();
    tx.commit().unwrap();
}

fn insert(sid: i64, name: &str, major: i64) -> UpdateCommand {
    UpdateCommand::Insert(InsertData {
        table_name: "student".into(),
        fields: vec!["sid".into(), "sname".into(), "major".into()],
        values: vec![Constant::int(sid), Constant::string(name), Constant::int(major)],
    })
}

fn delete_major(major: i64) -> UpdateCommand {
    UpdateCommand::Delete(DeleteData {
        table_name: "student".into(),
        predicate: Predicate::new().with_term(Term::field_equals("student.major", Constant::int(major))),
    })
}

fn commit(engine: &Engine, commands: Vec<UpdateCommand>) -> usize {
    let tx = engine.new_transaction().unwrap();
    let planner = engine.planner();
    let affected = commands
        .iter()
        .map(|c| planner.execute_update(c, &tx).unwrap())
        .sum();
    tx.commit().unwrap();
    affected
}

fn sids(engine: &Engine) -> Vec<i64> {
    let tx = engine.new_transaction().unwrap();
    let plan = engine
        .planner_for(PlannerKind::Basic)
        .create_query_plan(&QueryData::new(["student"]).with_fields(["student.sid"]), &tx)
        .unwrap();
    let mut sids: Vec<i64> = collect_rows(plan.as_ref())
        .unwrap()
        .iter()
        .filter_map(|row| row[0].as_int())
        .collect();
    sids.sort();
    sids
}

fn index_len(engine: &Engine, name: &str) -> usize {
    engine
        .catalog()
        .indexes_on("student")
        .iter()
        .find(|i| i.descriptor().index_name() == name)
        .map(|i| i.len())
        .unwrap()
}

// =============================================================================
// Index Maintenance
// =============================================================================

/// Inserted rows are visible to scans and to every index.
#[test]
fn test_insert_maintains_indexes() {
    let temp = TempDir::new().unwrap();
    let engine = boot(&temp);
    create_student(&engine);

    let affected = commit(
        &engine,
        vec![insert(1, "joe", 10), insert(2, "amy", 20), insert(3, "max", 10)],
    );

    assert_eq!(affected, 3);
    assert_eq!(sids(&engine), vec![1, 2, 3]);
    assert_eq!(index_len(&engine, "student_major"), 3);
    assert_eq!(index_len(&engine, "student_sid"), 3);

    let major = engine.catalog().btree_index("student", "major").unwrap();
    assert_eq!(major.lookup(&Constant::int(10)).len(), 2);
}

/// Deletes remove rows from the heap and from every index.
#[test]
fn test_delete_maintains_indexes() {
    let temp = TempDir::new().unwrap();
    let engine = boot(&temp);
    create_student(&engine);
    commit(
        &engine,
        vec![insert(1, "joe", 10), insert(2, "amy", 20), insert(3, "max", 10)],
    );

    let deleted = commit(&engine, vec![delete_major(10)]);

    assert_eq!(deleted, 2);
    assert_eq!(sids(&engine), vec![2]);
    assert_eq!(index_len(&engine, "student_major"), 1);
    assert_eq!(index_len(&engine, "student_sid"), 1);
}

/// An index created over existing rows starts populated.
#[test]
fn test_index_built_from_existing_rows() {
    let temp = TempDir::new().unwrap();
    let engine = boot(&temp);
    create_student(&engine);
    commit(&engine, vec![insert(1, "joe", 10), insert(2, "amy", 20)]);

    commit(
        &engine,
        vec![UpdateCommand::CreateIndex(CreateIndexData::new(
            "student_name",
            "student",
            "sname",
            IndexType::BTree,
        ))],
    );

    assert_eq!(index_len(&engine, "student_name"), 2);
}

// =============================================================================
// Rollback
// =============================================================================

/// A rolled-back insert leaves no row and no index entry.
#[test]
fn test_rollback_undoes_insert() {
    let temp = TempDir::new().unwrap();
    let engine = boot(&temp);
    create_student(&engine);
    commit(&engine, vec![insert(1, "joe", 10)]);

    let tx = engine.new_transaction().unwrap();
    engine.planner().execute_update(&insert(2, "amy", 20), &tx).unwrap();
    tx.rollback().unwrap();

    assert_eq!(sids(&engine), vec![1]);
    assert_eq!(index_len(&engine, "student_major"), 1);
    assert_eq!(index_len(&engine, "student_sid"), 1);
}

/// A rolled-back delete restores rows and index entries.
#[test]
fn test_rollback_undoes_delete() {
    let temp = TempDir::new().unwrap();
    let engine = boot(&temp);
    create_student(&engine);
    commit(
        &engine,
        vec![insert(1, "joe", 10), insert(2, "amy", 20), insert(3, "max", 10)],
    );

    let tx = engine.new_transaction().unwrap();
    let deleted = engine.planner().execute_update(&delete_major(10), &tx).unwrap();
    assert_eq!(deleted, 2);
    tx.rollback().unwrap();

    assert_eq!(sids(&engine), vec![1, 2, 3]);
    let major = engine.catalog().btree_index("student", "major").unwrap();
    assert_eq!(major.lookup(&Constant::int(10)).len(), 2);
}

/// Insert then delete in one transaction, rolled back, leaves the table as it was.
#[test]
fn test_rollback_undoes_mixed_changes_in_reverse() {
    let temp = TempDir::new().unwrap();
    let engine = boot(&temp);
    create_student(&engine);
    commit(&engine, vec![insert(1, "joe", 10)]);

    let tx = engine.new_transaction().unwrap();
    let planner = engine.planner();
    planner.execute_update(&insert(2, "amy", 10), &tx).unwrap();
    assert_eq!(planner.execute_update(&delete_major(10), &tx).unwrap(), 2);
    tx.rollback().unwrap();

    assert_eq!(sids(&engine), vec![1]);
    assert_eq!(index_len(&engine, "student_major"), 1);
}

/// A rolled-back table definition disappears from the catalog.
#[test]
fn test_rollback_undoes_create_table() {
    let temp = TempDir::new().unwrap();
    let engine = boot(&temp);
    let catalog_rows = |engine: &Engine| {
        engine.catalog().table(TABLE_CATALOG).unwrap().heap().len()
    };
    let before = catalog_rows(&engine);

    let tx = engine.new_transaction().unwrap();
    engine
        .planner()
        .execute_update(
            &UpdateCommand::CreateTable(CreateTableData {
                table_name: "tmp".into(),
                fields: vec![FieldDef::new("a", FieldType::Int)],
            }),
            &tx,
        )
        .unwrap();
    assert!(engine.catalog().table("tmp").is_ok());
    tx.rollback().unwrap();

    assert!(engine.catalog().table("tmp").is_err());
    assert_eq!(catalog_rows(&engine), before);
    assert!(engine.storage().heap("tmp").is_none());
}

// =============================================================================
// Catalog Mirroring and Rejections
// =============================================================================

/// Table and index definitions appear as rows in the catalog tables.
#[test]
fn test_definitions_mirrored() {
    let temp = TempDir::new().unwrap();
    let engine = boot(&temp);
    create_student(&engine);

    let tx = engine.new_transaction().unwrap();
    let planner = engine.planner();

    let fields = planner
        .create_query_plan(
            &QueryData::new([TABLE_CATALOG])
                .with_term(Term::field_equals("tblcat.tblname", Constant::string("student")))
                .with_fields(["tblcat.fldname"]),
            &tx,
        )
        .unwrap();
    let mut names: Vec<Constant> = collect_rows(fields.as_ref())
        .unwrap()
        .into_iter()
        .map(|mut row| row.remove(0))
        .collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            Constant::string("major"),
            Constant::string("sid"),
            Constant::string("sname"),
        ]
    );

    let indexes = planner
        .create_query_plan(
            &QueryData::new([INDEX_CATALOG])
                .with_term(Term::field_equals("idxcat.tablename", Constant::string("student")))
                .with_fields(["idxcat.indexname", "idxcat.indextype"]),
            &tx,
        )
        .unwrap();
    assert_eq!(collect_rows(indexes.as_ref()).unwrap().len(), 2);
}

/// Rejected updates report their codes and change nothing.
#[test]
fn test_rejections() {
    let temp = TempDir::new().unwrap();
    let engine = boot(&temp);
    create_student(&engine);
    let planner = engine.planner();
    let tx = engine.new_transaction().unwrap();

    let duplicate = planner
        .execute_update(
            &UpdateCommand::CreateTable(CreateTableData {
                table_name: "student".into(),
                fields: vec![FieldDef::new("a", FieldType::Int)],
            }),
            &tx,
        )
        .unwrap_err();
    assert_eq!(duplicate.code().code(), "REL_CATALOG_REJECTED");

    let bad_index = planner
        .execute_update(
            &UpdateCommand::CreateIndex(CreateIndexData::new(
                "student_gpa",
                "student",
                "gpa",
                IndexType::BTree,
            )),
            &tx,
        )
        .unwrap_err();
    assert_eq!(bad_index.code().code(), "REL_UNKNOWN_FIELD");

    let missing = planner
        .execute_update(
            &UpdateCommand::Delete(DeleteData {
                table_name: "course".into(),
                predicate: Predicate::new(),
            }),
            &tx,
        )
        .unwrap_err();
    assert_eq!(missing.code().code(), "REL_UNKNOWN_TABLE");

    tx.rollback().unwrap();
    assert!(sids(&engine).is_empty());
}
