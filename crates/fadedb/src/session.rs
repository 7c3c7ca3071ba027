//! Sessions, the unit-of-work surface for reads and staged writes.

use std::collections::HashSet;

use chrono::Utc;
use tracing::{debug, warn};

use fadedb_core::{
    encode_row, ColumnRef, EntityDef, FilterExpr, RelationDef, RowRecord, StorageEngine, Value,
};

use crate::engine::Engine;
use crate::error::Error;
use crate::instance::Instance;
use crate::query::QueryBuilder;

/// A staged mutation, applied on commit.
#[derive(Debug, Clone)]
enum StagedOp {
    /// Insert or overwrite a row.
    Put {
        table: String,
        row_id: [u8; 16],
        fields: Vec<(String, Value)>,
    },
    /// Physically remove a row.
    Remove { table: String, row_id: [u8; 16] },
}

/// A unit of work against the engine.
///
/// Reads go straight to storage through the query pipeline and see committed
/// state only. Writes are staged on the session and applied atomically by
/// [`commit`](Session::commit); [`rollback`](Session::rollback) discards them.
pub struct Session<'a> {
    engine: &'a Engine,
    staged: Vec<StagedOp>,
}

impl<'a> Session<'a> {
    pub(crate) fn new(engine: &'a Engine) -> Self {
        Self {
            engine,
            staged: Vec::new(),
        }
    }

    /// Start a query for an entity type.
    pub fn query(&self, entity: impl Into<String>) -> QueryBuilder<'a> {
        QueryBuilder::new(self.engine, entity)
    }

    /// Stage an insert, assigning an identity when the instance has none.
    pub fn add(&mut self, instance: &mut Instance) -> Result<(), Error> {
        let def = self.lookup_entity(instance.entity())?;

        let row_id = match Self::identity_of(&def, instance)? {
            Some(id) => id,
            None => {
                let id = StorageEngine::generate_id();
                instance.set(def.identity_field.clone(), Value::Uuid(id));
                id
            }
        };

        self.staged.push(StagedOp::Put {
            table: def.table,
            row_id,
            fields: instance.values().to_vec(),
        });
        Ok(())
    }

    /// Stage an update of an existing instance.
    pub fn update(&mut self, instance: &Instance) -> Result<(), Error> {
        let def = self.lookup_entity(instance.entity())?;
        let row_id = Self::identity_of(&def, instance)?.ok_or_else(|| Error::MissingIdentity {
            entity: def.name.clone(),
        })?;

        self.staged.push(StagedOp::Put {
            table: def.table,
            row_id,
            fields: instance.values().to_vec(),
        });
        Ok(())
    }

    /// Load a single instance by identity.
    pub fn get(&self, entity: &str, id: [u8; 16]) -> Result<Option<Instance>, Error> {
        let def = self.lookup_entity(entity)?;
        let column = ColumnRef::new(def.table, def.identity_field);
        self.query(entity)
            .filter(FilterExpr::eq(column, Value::Uuid(id)))
            .first()
    }

    /// Load the instances related to one instance through a named relationship.
    pub fn related(&self, instance: &Instance, relation: &str) -> Result<Vec<Instance>, Error> {
        let def = self.lookup_entity(instance.entity())?;
        let relation = self
            .engine
            .catalog()
            .relations_of(&def.name)
            .into_iter()
            .find(|r| r.name == relation)
            .ok_or_else(|| Error::UnknownRelation {
                entity: def.name.clone(),
                relation: relation.to_string(),
            })?;

        self.load_related(instance, &relation)
    }

    /// Stage deletion of an instance, cascading through the schema.
    ///
    /// Capable entities get their deletion timestamp assigned; entities
    /// without the marker are staged for physical removal. Cascading walks
    /// delete-cascade relationships depth-first against committed state and
    /// visits each row at most once, so shared children and cycles
    /// terminate. Every row staged by one call carries the same timestamp.
    pub fn delete(&mut self, instance: &mut Instance) -> Result<(), Error> {
        let root = self.lookup_entity(instance.entity())?;
        Self::identity_of(&root, instance)?.ok_or_else(|| Error::MissingIdentity {
            entity: root.name.clone(),
        })?;

        let now = Utc::now().timestamp_micros();

        // Timestamp the caller's copy so it reflects the staged state.
        if let Some(entry) = self.engine.registry().entry_for_entity(&root.name) {
            instance.set(entry.column.clone(), Value::Timestamp(now));
        }

        let mut visited: HashSet<(String, [u8; 16])> = HashSet::new();
        let mut stack = vec![instance.clone()];

        while let Some(current) = stack.pop() {
            let def = match self.engine.catalog().get_entity(current.entity()) {
                Some(def) => def,
                None => continue,
            };
            let id = match current.get(&def.identity_field).and_then(Value::as_uuid) {
                Some(id) => id,
                None => continue,
            };
            if !visited.insert((def.name.clone(), id)) {
                continue;
            }

            self.stage_delete(&def, id, &current, now);

            let mut children = Vec::new();
            for relation in self.engine.catalog().relations_of(&def.name) {
                if !relation.cascades_delete() {
                    continue;
                }
                match self.load_related(&current, &relation) {
                    Ok(related) => children.extend(related),
                    Err(e) => {
                        warn!(
                            entity = %def.name,
                            relation = %relation.name,
                            error = %e,
                            "cascade expansion failed; skipping remaining relationships"
                        );
                        break;
                    }
                }
            }
            // LIFO stack: reverse so children are processed in load order.
            children.reverse();
            stack.extend(children);
        }

        Ok(())
    }

    /// Apply all staged operations atomically.
    ///
    /// On failure nothing is applied and the staged operations are kept, so
    /// the caller can roll back or retry.
    pub fn commit(&mut self) -> Result<(), Error> {
        let mut batch = self.engine.storage().batch();
        for op in &self.staged {
            match op {
                StagedOp::Put {
                    table,
                    row_id,
                    fields,
                } => {
                    let data = encode_row(fields)?;
                    batch.put(table.clone(), *row_id, RowRecord::new(data));
                }
                StagedOp::Remove { table, row_id } => {
                    batch.remove(table.clone(), *row_id);
                }
            }
        }

        batch.commit()?;
        debug!(operations = self.staged.len(), "session committed");
        self.staged.clear();
        Ok(())
    }

    /// Discard all staged operations.
    pub fn rollback(&mut self) {
        self.staged.clear();
    }

    /// Get the number of staged operations.
    pub fn staged_count(&self) -> usize {
        self.staged.len()
    }

    /// Stage the delete of one row according to the entity's capability.
    fn stage_delete(&mut self, def: &EntityDef, row_id: [u8; 16], instance: &Instance, now: i64) {
        match self.engine.registry().entry_for_entity(&def.name) {
            Some(entry) => {
                let mut updated = instance.clone();
                updated.set(entry.column.clone(), Value::Timestamp(now));
                self.staged.push(StagedOp::Put {
                    table: def.table.clone(),
                    row_id,
                    fields: updated.values().to_vec(),
                });
            }
            None => {
                self.staged.push(StagedOp::Remove {
                    table: def.table.clone(),
                    row_id,
                });
            }
        }
    }

    /// Load the committed rows related to an instance through one relationship.
    fn load_related(
        &self,
        instance: &Instance,
        relation: &RelationDef,
    ) -> Result<Vec<Instance>, Error> {
        let owner_value = match instance.get(&relation.owner_field) {
            Some(value) if !value.is_null() => value.clone(),
            _ => return Ok(Vec::new()),
        };

        let target = self.lookup_entity(&relation.target)?;
        let column = ColumnRef::new(target.table, relation.target_field.clone());
        self.query(relation.target.as_str())
            .filter(FilterExpr::eq(column, owner_value))
            .all()
    }

    fn lookup_entity(&self, entity: &str) -> Result<EntityDef, Error> {
        self.engine
            .catalog()
            .get_entity(entity)
            .ok_or_else(|| Error::UnknownEntity(entity.to_string()))
    }

    /// Read the identity value of an instance, if it carries a usable one.
    fn identity_of(def: &EntityDef, instance: &Instance) -> Result<Option<[u8; 16]>, Error> {
        match instance.get(&def.identity_field) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Uuid(id)) => Ok(Some(*id)),
            Some(_) => Err(Error::InvalidIdentity {
                entity: def.name.clone(),
            }),
        }
    }
}
