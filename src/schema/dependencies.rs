use super::tables::all_tables;
use super::types::TableSchema;
use crate::error::{Error, Result};
use std::collections::HashSet;

/// Derives the build order of the declared tables from their foreign keys
pub struct DependencyResolver {
    /// Declared tables, in declaration order
    tables: Vec<&'static TableSchema>,
}

impl DependencyResolver {
    pub fn new() -> Self {
        Self::from_tables(all_tables())
    }

    pub fn from_tables(tables: Vec<&'static TableSchema>) -> Self {
        Self { tables }
    }

    /// All tables, parents before children
    pub fn build_order(&self) -> Result<Vec<&'static TableSchema>> {
        let all: HashSet<&str> = self.tables.iter().map(|t| t.name).collect();
        self.topological_sort(&all)
    }

    fn get(&self, name: &str) -> Option<&'static TableSchema> {
        self.tables.iter().copied().find(|t| t.name == name)
    }

    /// Topological sort of tables by dependencies, stable in declaration order
    fn topological_sort(&self, included: &HashSet<&str>) -> Result<Vec<&'static TableSchema>> {
        let mut result = Vec::new();
        let mut visited: HashSet<&str> = HashSet::new();
        let mut temp_visited: HashSet<&str> = HashSet::new();

        for table in &self.tables {
            if included.contains(table.name) && !visited.contains(table.name) {
                self.visit(
                    table,
                    included,
                    &mut visited,
                    &mut temp_visited,
                    &mut result,
                )?;
            }
        }

        Ok(result)
    }

    fn visit(
        &self,
        table: &'static TableSchema,
        included: &HashSet<&str>,
        visited: &mut HashSet<&'static str>,
        temp_visited: &mut HashSet<&'static str>,
        result: &mut Vec<&'static TableSchema>,
    ) -> Result<()> {
        let name = table.name;
        if temp_visited.contains(name) {
            return Err(Error::CircularDependency(name.to_string()));
        }
        if visited.contains(name) {
            return Ok(());
        }

        temp_visited.insert(name);

        for fk in table.foreign_keys {
            // Skip self-references
            if fk.references_table == name {
                continue;
            }
            let parent = self
                .get(fk.references_table)
                .ok_or_else(|| Error::MissingForeignKeyTarget {
                    table: name,
                    column: fk.column,
                    target: fk.references_table,
                })?;
            if included.contains(parent.name) {
                self.visit(parent, included, visited, temp_visited, result)?;
            }
        }

        temp_visited.remove(name);
        visited.insert(name);
        result.push(table);

        Ok(())
    }
}

impl Default for DependencyResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Build order of every declared table
pub fn build_order() -> Result<Vec<&'static TableSchema>> {
    DependencyResolver::new().build_order()
}
