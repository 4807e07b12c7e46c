//! Table and index definitions
//!
//! Definitions live in memory and are mirrored, one row per field or index,
//! into the `tblcat` and `idxcat` system tables so they can be queried like
//! any other table. Changes register undo actions on the transaction that
//! made them.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use crate::index::{new_index, CreateIndexData, Index, IndexType};
use crate::query::{Constant, FieldType, Schema};
use crate::storage::{Row, RowId, TableHeap};
use crate::tx::Transaction;

use super::errors::{CatalogError, CatalogResult};

/// System table holding one row per table field
pub const TABLE_CATALOG: &str = "tblcat";

/// System table holding one row per index
pub const INDEX_CATALOG: &str = "idxcat";

const NAME_LENGTH: usize = 32;

/// A table definition bound to its heap
#[derive(Debug)]
pub struct TableInfo {
    name: String,
    schema: Schema,
    heap: Arc<TableHeap>,
}

impl TableInfo {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Schema with unqualified field names
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn heap(&self) -> &Arc<TableHeap> {
        &self.heap
    }
}

/// An index definition and its live structure
#[derive(Debug)]
pub struct IndexInfo {
    descriptor: CreateIndexData,
    field_position: usize,
    structure: RwLock<Box<dyn Index>>,
}

impl IndexInfo {
    pub fn descriptor(&self) -> &CreateIndexData {
        &self.descriptor
    }

    pub fn index_type(&self) -> IndexType {
        self.descriptor.index_type()
    }

    /// Adds the entry for `row`
    pub fn insert_row(&self, id: RowId, row: &[Constant]) {
        let mut structure = self.structure.write().unwrap_or_else(|e| e.into_inner());
        structure.insert(row[self.field_position].clone(), id);
    }

    /// Removes the entry for `row`
    pub fn remove_row(&self, id: RowId, row: &[Constant]) {
        let mut structure = self.structure.write().unwrap_or_else(|e| e.into_inner());
        structure.remove(&row[self.field_position], id);
    }

    pub fn lookup(&self, key: &Constant) -> Vec<RowId> {
        let structure = self.structure.read().unwrap_or_else(|e| e.into_inner());
        structure.lookup(key)
    }

    pub fn ordered_rows(&self) -> Option<Vec<RowId>> {
        let structure = self.structure.read().unwrap_or_else(|e| e.into_inner());
        structure.ordered_rows()
    }

    pub fn len(&self) -> usize {
        let structure = self.structure.read().unwrap_or_else(|e| e.into_inner());
        structure.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

type TableMap = BTreeMap<String, Arc<TableInfo>>;
type IndexMap = BTreeMap<String, Vec<Arc<IndexInfo>>>;

/// Catalog of table and index definitions
#[derive(Debug)]
pub struct Catalog {
    tables: Arc<RwLock<TableMap>>,
    indexes: Arc<RwLock<IndexMap>>,
}

impl Catalog {
    /// Creates the catalog and its system tables inside `tx`.
    pub fn bootstrap(tx: &Transaction) -> CatalogResult<Self> {
        let catalog = Self {
            tables: Arc::new(RwLock::new(BTreeMap::new())),
            indexes: Arc::new(RwLock::new(BTreeMap::new())),
        };

        let mut tblcat = Schema::new();
        tblcat.add_string_field("tblname", NAME_LENGTH);
        tblcat.add_string_field("fldname", NAME_LENGTH);
        tblcat.add_string_field("fldtype", 8);
        tblcat.add_int_field("fldlength");
        tblcat.add_int_field("position");
        catalog.create_table(TABLE_CATALOG, tblcat, tx)?;

        let mut idxcat = Schema::new();
        idxcat.add_string_field("indexname", NAME_LENGTH);
        idxcat.add_string_field("tablename", NAME_LENGTH);
        idxcat.add_string_field("fieldname", NAME_LENGTH);
        idxcat.add_string_field("indextype", 8);
        catalog.create_table(INDEX_CATALOG, idxcat, tx)?;

        Ok(catalog)
    }

    /// Defines a table and creates its heap.
    pub fn create_table(
        &self,
        name: &str,
        schema: Schema,
        tx: &Transaction,
    ) -> CatalogResult<Arc<TableInfo>> {
        if schema.is_empty() {
            return Err(CatalogError::NoFields(name.to_string()));
        }
        if self.read_tables().contains_key(name) {
            return Err(CatalogError::TableExists(name.to_string()));
        }

        let heap = tx.storage().create_heap(name)?;
        let info = Arc::new(TableInfo {
            name: name.to_string(),
            schema,
            heap,
        });
        self.write_tables().insert(name.to_string(), Arc::clone(&info));

        // tblcat does not exist yet while it is being defined
        let mirrored = if name == TABLE_CATALOG {
            let rows = field_rows(&info);
            rows.into_iter().map(|row| info.heap.insert(row)).collect()
        } else {
            self.mirror(TABLE_CATALOG, field_rows(&info))?
        };

        let tables = Arc::clone(&self.tables);
        let storage = Arc::clone(tx.storage());
        let table_name = name.to_string();
        let catalog_heap = self.table(TABLE_CATALOG)?.heap.clone();
        tx.on_rollback(Box::new(move || {
            for id in mirrored {
                catalog_heap.delete(id);
            }
            tables
                .write()
                .unwrap_or_else(|e| e.into_inner())
                .remove(&table_name);
            storage.drop_heap(&table_name);
        }));

        Ok(info)
    }

    /// Looks up a table definition
    pub fn table(&self, name: &str) -> CatalogResult<Arc<TableInfo>> {
        self.read_tables()
            .get(name)
            .cloned()
            .ok_or_else(|| CatalogError::UnknownTable(name.to_string()))
    }

    /// Names of all defined tables, system tables included
    pub fn table_names(&self) -> Vec<String> {
        self.read_tables().keys().cloned().collect()
    }

    /// Defines an index and builds it from the table's current rows.
    pub fn create_index(
        &self,
        data: &CreateIndexData,
        tx: &Transaction,
    ) -> CatalogResult<Arc<IndexInfo>> {
        let table = self.table(data.table_name())?;
        let field_position = table.schema.index_of(data.field_name()).ok_or_else(|| {
            CatalogError::UnknownField {
                table: data.table_name().to_string(),
                field: data.field_name().to_string(),
            }
        })?;

        let exists = self
            .read_indexes()
            .values()
            .flatten()
            .any(|i| i.descriptor.index_name() == data.index_name());
        if exists {
            return Err(CatalogError::IndexExists(data.index_name().to_string()));
        }

        let info = Arc::new(IndexInfo {
            descriptor: data.clone(),
            field_position,
            structure: RwLock::new(new_index(data.index_type())),
        });
        for (id, row) in table.heap.snapshot() {
            info.insert_row(id, &row);
        }

        self.write_indexes()
            .entry(data.table_name().to_string())
            .or_default()
            .push(Arc::clone(&info));

        let row = vec![
            Constant::string(data.index_name()),
            Constant::string(data.table_name()),
            Constant::string(data.field_name()),
            Constant::string(data.index_type().as_str()),
        ];
        let mirrored = self.mirror(INDEX_CATALOG, vec![row])?;

        let indexes = Arc::clone(&self.indexes);
        let catalog_heap = self.table(INDEX_CATALOG)?.heap.clone();
        let table_name = data.table_name().to_string();
        let index_name = data.index_name().to_string();
        tx.on_rollback(Box::new(move || {
            for id in mirrored {
                catalog_heap.delete(id);
            }
            let mut indexes = indexes.write().unwrap_or_else(|e| e.into_inner());
            if let Some(list) = indexes.get_mut(&table_name) {
                list.retain(|i| i.descriptor.index_name() != index_name);
            }
        }));

        Ok(info)
    }

    /// All indexes on `table`, in creation order
    pub fn indexes_on(&self, table: &str) -> Vec<Arc<IndexInfo>> {
        self.read_indexes().get(table).cloned().unwrap_or_default()
    }

    /// The first B-tree index on `table.field`, if any
    pub fn btree_index(&self, table: &str, field: &str) -> Option<Arc<IndexInfo>> {
        self.indexes_on(table).into_iter().find(|i| {
            i.index_type() == IndexType::BTree && i.descriptor.field_name() == field
        })
    }

    fn mirror(&self, table: &str, rows: Vec<Row>) -> CatalogResult<Vec<RowId>> {
        let heap = self.table(table)?.heap.clone();
        Ok(rows.into_iter().map(|row| heap.insert(row)).collect())
    }

    fn read_tables(&self) -> std::sync::RwLockReadGuard<'_, TableMap> {
        self.tables.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_tables(&self) -> std::sync::RwLockWriteGuard<'_, TableMap> {
        self.tables.write().unwrap_or_else(|e| e.into_inner())
    }

    fn read_indexes(&self) -> std::sync::RwLockReadGuard<'_, IndexMap> {
        self.indexes.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_indexes(&self) -> std::sync::RwLockWriteGuard<'_, IndexMap> {
        self.indexes.write().unwrap_or_else(|e| e.into_inner())
    }
}

fn field_rows(info: &TableInfo) -> Vec<Row> {
    info.schema
        .field_defs()
        .iter()
        .enumerate()
        .map(|(pos, def)| {
            let length = match def.field_type {
                FieldType::Int => 0,
                FieldType::Varchar { length } => length as i64,
            };
            vec![
                Constant::string(info.name.as_str()),
                Constant::string(def.name.as_str()),
                Constant::string(def.field_type.as_str()),
                Constant::int(length),
                Constant::int(pos as i64),
            ]
        })
        .collect()
}
