use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::config::{GeneratorConfig, IdGenerator};
use crate::error::{Error, Result};
use crate::graph::{Column, ForeignKeyRef, PrimaryKey, Table, TableGraph, TableId};
use crate::model::{Attribute, Class, EntityModel, ModelIndex};
use crate::naming::NamingPolicy;
use crate::types::{ColumnType, map_scalar};

/// Build the table graph for a model.
///
/// Tables are built depth-first: a class registers a placeholder table
/// before resolving its associations, so association cycles terminate and
/// each table is built at most once. The first type or reference error
/// aborts the build.
pub fn build_table_graph(model: &EntityModel, config: &GeneratorConfig) -> Result<TableGraph> {
    ensure_unique_class_names(model)?;
    ensure_unique_attribute_names(model)?;

    let mut builder = SchemaBuilder {
        index: model.index(),
        naming: config.naming_policy(),
        default_generator: config.id_generator,
        graph: TableGraph::new(),
    };

    for class in &model.classes {
        builder.build_class(class)?;
    }

    info!(
        event = "table_graph_built",
        classes = model.classes.len(),
        tables = builder.graph.len()
    );

    Ok(builder.graph)
}

fn ensure_unique_class_names(model: &EntityModel) -> Result<()> {
    let mut seen = BTreeSet::new();
    for class in &model.classes {
        if !seen.insert(class.name.as_str()) {
            return Err(Error::InvalidModel(format!(
                "duplicate class name: {}",
                class.name
            )));
        }
    }
    Ok(())
}

/// Emitters find a class's columns by attribute name, so names must be
/// unique within a class.
fn ensure_unique_attribute_names(model: &EntityModel) -> Result<()> {
    for class in &model.classes {
        let mut seen = BTreeSet::new();
        for attribute in &class.attributes {
            if !seen.insert(attribute.name.as_str()) {
                return Err(Error::InvalidModel(format!(
                    "duplicate attribute name: {}.{}",
                    class.name, attribute.name
                )));
            }
        }
    }
    Ok(())
}

struct SchemaBuilder<'a> {
    index: ModelIndex<'a>,
    naming: NamingPolicy,
    default_generator: IdGenerator,
    graph: TableGraph,
}

impl<'a> SchemaBuilder<'a> {
    fn build_class(&mut self, class: &'a Class) -> Result<Option<TableId>> {
        if let Some(id) = self.graph.lookup_class(&class.name) {
            return Ok(Some(id));
        }

        if !self.index.is_persistent(class) {
            debug!(event = "class_skipped", class = %class.name);
            return Ok(None);
        }

        let name = self.naming.table_name(class);
        if let Some(existing) = self.graph.table_by_name(&name) {
            return Err(Error::IdentifierCollision {
                name,
                first: existing.class.clone(),
                second: class.name.clone(),
            });
        }

        let id = self.graph.register(Table::new(name, class.name.as_str()));
        debug!(event = "table_registered", class = %class.name, table = %self.graph.table(id).name);

        self.build_key(id, class)?;

        for attribute in class.value_attributes() {
            let column = self.column(class, attribute)?;
            self.push_column(id, column)?;
        }

        self.graph.finalize(id);
        debug!(
            event = "table_built",
            table = %self.graph.table(id).name,
            columns = self.graph.table(id).columns.len()
        );

        Ok(Some(id))
    }

    /// Build the key columns before any other attribute is resolved.
    ///
    /// Each key column is published into the placeholder as soon as it is
    /// built, so cyclic references back into this table find it.
    fn build_key(&mut self, id: TableId, class: &'a Class) -> Result<()> {
        let key_count = class.identity_attributes().count();
        if key_count == 0 {
            debug!(event = "table_without_key", class = %class.name);
            return Ok(());
        }

        let generator = (key_count == 1)
            .then(|| class.id_generator.unwrap_or(self.default_generator));
        self.graph.table_mut(id).primary_key = Some(PrimaryKey {
            columns: Vec::with_capacity(key_count),
            generator,
        });

        for attribute in class.identity_attributes() {
            let mut column = self.column(class, attribute)?;
            column.primary_key = true;
            column.nullable = false;
            let name = column.name.clone();
            self.push_column(id, column)?;
            if let Some(key) = self.graph.table_mut(id).primary_key.as_mut() {
                key.columns.push(name);
            }
        }

        Ok(())
    }

    fn column(&mut self, class: &'a Class, attribute: &'a Attribute) -> Result<Column> {
        let (ty, references) = match self.index.association_target(attribute) {
            Some(target) => {
                let (ty, reference) = self.resolve_reference(class, attribute, target)?;
                (ty, Some(reference))
            }
            None => {
                let ty = map_scalar(&attribute.type_name).ok_or_else(|| Error::UnmappableType {
                    class: class.name.clone(),
                    attribute: attribute.name.clone(),
                    type_name: attribute.type_name.clone(),
                })?;
                (ty, None)
            }
        };

        Ok(Column {
            name: self.naming.column_name(attribute),
            attribute: attribute.name.clone(),
            ty,
            nullable: !attribute.not_null,
            unique: attribute.unique,
            primary_key: false,
            references,
        })
    }

    /// Resolve an association to the type and location of the target's key.
    ///
    /// The column type is the type of the target's first key column, never
    /// derived from the attribute's own type name.
    fn resolve_reference(
        &mut self,
        class: &'a Class,
        attribute: &'a Attribute,
        target: &str,
    ) -> Result<(ColumnType, ForeignKeyRef)> {
        let missing = || Error::MissingReferencedEntity {
            class: class.name.clone(),
            attribute: attribute.name.clone(),
            target: target.to_string(),
        };

        let target_class = self.index.class(target).ok_or_else(missing)?;
        let target_id = self.build_class(target_class)?.ok_or_else(missing)?;
        let table = self.graph.table(target_id);

        if let Some(key) = table.first_key_column() {
            return Ok((
                key.ty,
                ForeignKeyRef {
                    table: table.name.clone(),
                    column: key.name.clone(),
                    class: table.class.clone(),
                },
            ));
        }

        let Some(first) = target_class.identity_attributes().next() else {
            return Err(Error::KeylessReference {
                class: class.name.clone(),
                attribute: attribute.name.clone(),
                target: target.to_string(),
            });
        };

        // The target is still building and its first key column is the
        // association being resolved right now.
        let reference = ForeignKeyRef {
            table: table.name.clone(),
            column: self.naming.column_name(first),
            class: table.class.clone(),
        };
        let mut visited = BTreeSet::from([target_class.name.as_str()]);
        match self.key_type(target_class, first, &mut visited)? {
            Some(ty) => Ok((ty, reference)),
            None => Err(Error::CyclicKey {
                class: class.name.clone(),
                attribute: attribute.name.clone(),
                target: target.to_string(),
            }),
        }
    }

    /// Type of a key attribute, followed through the model when the key is
    /// itself an association. Returns `None` when the chain of leading key
    /// associations loops back on itself.
    fn key_type(
        &self,
        owner: &'a Class,
        attribute: &'a Attribute,
        visited: &mut BTreeSet<&'a str>,
    ) -> Result<Option<ColumnType>> {
        let Some(target) = self.index.association_target(attribute) else {
            return map_scalar(&attribute.type_name)
                .map(Some)
                .ok_or_else(|| Error::UnmappableType {
                    class: owner.name.clone(),
                    attribute: attribute.name.clone(),
                    type_name: attribute.type_name.clone(),
                });
        };

        let target_class =
            self.index
                .class(target)
                .ok_or_else(|| Error::MissingReferencedEntity {
                    class: owner.name.clone(),
                    attribute: attribute.name.clone(),
                    target: target.to_string(),
                })?;
        if let Some(key) = self
            .graph
            .table_for_class(target)
            .and_then(Table::first_key_column)
        {
            return Ok(Some(key.ty));
        }
        if !visited.insert(target_class.name.as_str()) {
            return Ok(None);
        }

        let first = target_class.identity_attributes().next().ok_or_else(|| {
            Error::KeylessReference {
                class: owner.name.clone(),
                attribute: attribute.name.clone(),
                target: target.to_string(),
            }
        })?;
        self.key_type(target_class, first, visited)
    }

    fn push_column(&mut self, id: TableId, column: Column) -> Result<()> {
        let table = self.graph.table_mut(id);
        if let Some(existing) = table.column(&column.name) {
            return Err(Error::InvalidModel(format!(
                "column '{}' of table '{}' is produced by both '{}' and '{}'",
                column.name, table.name, existing.attribute, column.attribute
            )));
        }
        table.columns.push(column);
        Ok(())
    }
}
