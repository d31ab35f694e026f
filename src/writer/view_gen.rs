//! SQL generation for declared views.

use crate::error::{Error, Result};
use crate::schema::{AggregatedJoin, ViewSchema, ViewSource};

/// Generate CREATE VIEW SQL for a view declaration.
///
/// Every join is a LEFT JOIN on a unique key, so the view keeps exactly the
/// rows of its driving table.
pub fn generate_create_view(view: &ViewSchema) -> Result<String> {
    let root = view.root();
    let mut select = vec![format!("{}.fid AS fid", root.alias)];
    let mut joins = Vec::new();

    if let Some((geom, _, _)) = view.geometry() {
        select.push(format!("{}.{} AS {}", root.alias, geom, geom));
    }

    for source in view.sources {
        if let Some(join) = source.join {
            joins.push(format!(
                "LEFT JOIN {} {} ON {}.{} = {}.{}",
                source.table.name,
                source.alias,
                source.alias,
                join.column,
                join.parent_alias,
                join.parent_column
            ));
        }

        for col in source.columns {
            select.push(format!("{}.{} AS {}", source.alias, col.column, col.output));
        }

        for label in source.labels {
            let (alias, join) = label_join(view, source.table.name, source.alias, label.column)?;
            joins.push(join);
            select.push(format!("{}.label AS {}", alias, label.output));
        }
    }

    for agg in view.aggregates {
        joins.push(aggregate_join(view, agg)?);
        for col in agg.columns.iter().chain(agg.labels) {
            select.push(format!("{}.{} AS {}", agg.alias, col.output, col.output));
        }
        select.push(format!(
            "coalesce({}.{}, 0) AS {}",
            agg.alias, agg.count_output, agg.count_output
        ));
    }

    Ok(format!(
        "CREATE VIEW {} AS\nSELECT\n    {}\nFROM {} {}\n{}",
        view.name,
        select.join(",\n    "),
        root.table.name,
        root.alias,
        joins.join("\n")
    ))
}

/// LEFT JOIN resolving `alias.column` against its code list
fn label_join(
    view: &ViewSchema,
    table: &str,
    alias: &str,
    column: &'static str,
) -> Result<(String, String)> {
    let schema = crate::schema::get_table(table)
        .ok_or_else(|| missing(view, format!("table {table}")))?;
    let fk = schema
        .foreign_key(column)
        .filter(|fk| fk.is_code_list())
        .ok_or_else(|| missing(view, format!("code list for {table}.{column}")))?;

    let label_alias = format!("{}_{}", alias, column);
    let join = format!(
        "LEFT JOIN {} {} ON {}.{} = {}.{}",
        fk.references_table, label_alias, label_alias, fk.references_column, alias, column
    );
    Ok((label_alias, join))
}

/// LEFT JOIN on a sub-select that folds a junction table down to one row
/// per parent key.
///
/// Each member's fields are `coalesce`d to '' before concatenation so the
/// n-th entry of every aggregated column belongs to the same member.
fn aggregate_join(view: &ViewSchema, agg: &AggregatedJoin) -> Result<String> {
    let parent: &ViewSource = view
        .sources
        .iter()
        .find(|s| s.alias == agg.parent_alias)
        .ok_or_else(|| missing(view, format!("source alias {}", agg.parent_alias)))?;

    let rel = agg.relationship;
    let (owner_column, member_column) = if rel.source_table == parent.table.name {
        (rel.source_column, rel.target_column)
    } else if rel.target_table == parent.table.name {
        (rel.target_column, rel.source_column)
    } else {
        return Err(missing(
            view,
            format!("relationship {} to {}", rel.table.name, parent.table.name),
        ));
    };

    let mut inner_select = vec![
        format!("rel.{} AS owner_key", owner_column),
        "m.systemid AS member_key".to_string(),
    ];
    let mut inner_joins = vec![format!(
        "JOIN {} m ON m.systemid = rel.{}",
        agg.table.name, member_column
    )];
    let mut outer_select = vec!["owner_key".to_string()];

    for col in agg.columns {
        inner_select.push(format!("m.{} AS {}", col.column, col.output));
    }
    for label in agg.labels {
        let (alias, join) = label_join(view, agg.table.name, "m", label.column)?;
        inner_joins.push(join);
        inner_select.push(format!("{}.label AS {}", alias, label.output));
    }
    for col in agg.columns.iter().chain(agg.labels) {
        outer_select.push(format!(
            "group_concat(coalesce({}, ''), '{}' ORDER BY member_key) AS {}",
            col.output, agg.separator, col.output
        ));
    }
    outer_select.push(format!("count(*) AS {}", agg.count_output));

    Ok(format!(
        "LEFT JOIN (\n    SELECT {}\n    FROM (\n        SELECT {}\n        FROM {} rel\n        {}\n    )\n    GROUP BY owner_key\n) {} ON {}.owner_key = {}.systemid",
        outer_select.join(", "),
        inner_select.join(", "),
        rel.table.name,
        inner_joins.join("\n        "),
        agg.alias,
        agg.alias,
        agg.parent_alias
    ))
}

fn missing(view: &ViewSchema, what: String) -> Error {
    Error::MissingViewSource {
        view: view.name,
        what,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::UNIFIED_VIEW;

    #[test]
    fn test_unified_view_sql() {
        let sql = generate_create_view(&UNIFIED_VIEW).unwrap();
        assert!(sql.starts_with("CREATE VIEW future_works_unified AS"));
        assert!(sql.contains("FROM networklink nl"));
        assert!(sql.contains("LEFT JOIN plannedprogramme prog ON prog.systemid = nl.programmeid_fk"));
        assert!(sql.contains("LEFT JOIN organisation org ON org.systemid = prog.dataproviderid_fk"));
        assert!(sql.contains(
            "LEFT JOIN utilitytypevalue nl_utilitytype ON nl_utilitytype.code = nl.utilitytype"
        ));
        assert!(sql.contains("nl_utilitytype.label AS utility_type"));
        assert!(sql.contains("GROUP BY owner_key"));
        assert!(sql.contains("'; ' ORDER BY member_key) AS contact_names"));
        assert!(sql.contains("coalesce(contacts.contact_count, 0) AS contact_count"));
        assert!(!sql.contains("INNER JOIN"));
    }

    #[test]
    fn test_every_output_column_is_selected() {
        let sql = generate_create_view(&UNIFIED_VIEW).unwrap();
        for col in UNIFIED_VIEW.output_columns() {
            assert!(sql.contains(&format!(" AS {col}")), "{col} missing");
        }
    }
}
