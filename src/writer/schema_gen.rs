use crate::schema::TableSchema;

/// Generate CREATE TABLE SQL for a table schema
pub fn generate_create_table(schema: &TableSchema) -> String {
    let mut sql = format!("CREATE TABLE {} (\n", schema.name);
    let mut columns = vec!["    fid INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL".to_string()];

    for col in schema.columns {
        let null_constraint = if !col.nullable { " NOT NULL" } else { "" };
        let unique = if col.unique { " UNIQUE" } else { "" };

        columns.push(format!(
            "    {} {}{}{}",
            col.name,
            col.col_type.sql_type(),
            null_constraint,
            unique
        ));
    }

    for index in schema.indexes.iter().filter(|i| i.unique) {
        columns.push(format!("    UNIQUE ({})", index.columns.join(", ")));
    }

    for check in schema.checks {
        columns.push(format!("    CHECK ({})", check));
    }

    // No ON DELETE / ON UPDATE actions: integrity is enforced on insert only
    for fk in schema.foreign_keys {
        columns.push(format!(
            "    FOREIGN KEY ({}) REFERENCES {}({})",
            fk.column, fk.references_table, fk.references_column
        ));
    }

    sql.push_str(&columns.join(",\n"));
    sql.push_str("\n)");

    sql
}

/// Generate CREATE INDEX statements for foreign key columns and declared
/// non-unique indexes
pub fn generate_indexes(schema: &TableSchema) -> Vec<String> {
    let fk_columns = schema.foreign_keys.iter().map(|fk| vec![fk.column]);
    let declared = schema
        .indexes
        .iter()
        .filter(|i| !i.unique)
        .map(|i| i.columns.to_vec());

    let mut seen = Vec::new();
    let mut statements = Vec::new();

    for columns in fk_columns.chain(declared) {
        let name = format!("idx_{}_{}", schema.name, columns.join("_"));
        if seen.contains(&name) {
            continue;
        }
        statements.push(format!(
            "CREATE INDEX {} ON {}({})",
            name,
            schema.name,
            columns.join(", ")
        ));
        seen.push(name);
    }

    statements
}

/// Generate an INSERT for the given columns of a table
pub fn generate_insert(table: &str, columns: &[&str]) -> String {
    let placeholders: Vec<&str> = columns.iter().map(|_| "?").collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table,
        columns.join(", "),
        placeholders.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{NETWORK_LINK, ORGANISATION_TO_CONTACT_DETAILS, UTILITY_TYPE};

    #[test]
    fn test_generate_create_table() {
        let sql = generate_create_table(&NETWORK_LINK);
        assert!(sql.contains("CREATE TABLE networklink"));
        assert!(sql.contains("fid INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL"));
        assert!(sql.contains("systemid TEXT NOT NULL UNIQUE"));
        assert!(sql.contains("geom LINESTRING NOT NULL"));
        assert!(sql.contains("programmeid_fk TEXT NOT NULL"));
        assert!(sql.contains("FOREIGN KEY (programmeid_fk) REFERENCES plannedprogramme(systemid)"));
        assert!(sql.contains("FOREIGN KEY (utilitytype) REFERENCES utilitytypevalue(code)"));
        assert!(sql.contains("CHECK (planneddepth_depth IS NULL OR planneddepth_depth >= 0)"));
        assert!(!sql.contains("ON DELETE"));
    }

    #[test]
    fn test_code_list_table() {
        let sql = generate_create_table(&UTILITY_TYPE);
        assert!(sql.contains("code TEXT NOT NULL UNIQUE"));
        assert!(sql.contains("label TEXT NOT NULL"));
        assert!(!sql.contains("FOREIGN KEY"));
    }

    #[test]
    fn test_relationship_pair_unique() {
        let sql = generate_create_table(&ORGANISATION_TO_CONTACT_DETAILS);
        assert!(sql.contains("UNIQUE (linkedorganisationid, linkedcontactdetailsid)"));
    }

    #[test]
    fn test_generate_indexes() {
        let indexes = generate_indexes(&NETWORK_LINK);
        assert!(indexes.iter().any(|i| i.contains("idx_networklink_programmeid_fk")));
        assert!(indexes.iter().any(|i| i.contains("idx_networklink_usrn")));
        assert_eq!(indexes.len(), NETWORK_LINK.foreign_keys.len() + 1);
    }

    #[test]
    fn test_generate_insert() {
        assert_eq!(
            generate_insert("t", &["a", "b"]),
            "INSERT INTO t (a, b) VALUES (?, ?)"
        );
    }
}
