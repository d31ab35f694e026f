//! Many-to-many junction tables between entities.
//!
//! A relationship row is nothing but the pair of keys it joins: both columns
//! are required foreign keys and the pair is unique.

use super::types::*;

/// Endpoints of a junction table
#[derive(Debug, Clone, Copy)]
pub struct Relationship {
    pub table: &'static TableSchema,
    pub source_column: &'static str,
    pub source_table: &'static str,
    pub target_column: &'static str,
    pub target_table: &'static str,
}

macro_rules! relationship_table {
    (
        $(#[$meta:meta])*
        $schema:ident, $relationship:ident => $table:literal, $description:literal,
        $source_column:literal -> $source_table:literal,
        $target_column:literal -> $target_table:literal
    ) => {
        $(#[$meta])*
        pub static $schema: TableSchema = TableSchema {
            name: $table,
            kind: TableKind::Relationship,
            description: $description,
            columns: &[
                Column::required($source_column, ColumnType::Text),
                Column::required($target_column, ColumnType::Text),
            ],
            foreign_keys: &[
                ForeignKey::new($source_column, $source_table),
                ForeignKey::new($target_column, $target_table),
            ],
            indexes: &[Index::unique(&[$source_column, $target_column])],
            checks: &[],
        };

        pub static $relationship: Relationship = Relationship {
            table: &$schema,
            source_column: $source_column,
            source_table: $source_table,
            target_column: $target_column,
            target_table: $target_table,
        };
    };
}

relationship_table! {
    ORGANISATION_TO_CONTACT_DETAILS, ORGANISATION_CONTACTS =>
        "relationship_organisationtocontactdetails",
        "Links organisations to their contact details",
    "linkedorganisationid" -> "organisation",
    "linkedcontactdetailsid" -> "contactdetails"
}

/// All junction tables
pub static RELATIONSHIP_TABLES: &[&TableSchema] = &[&ORGANISATION_TO_CONTACT_DETAILS];
