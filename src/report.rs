//! Record counts and distributions of a populated GeoPackage.

use rusqlite::Connection;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::Result;
use crate::schema::{ENTITY_TABLES, RELATIONSHIP_TABLES, UNIFIED_VIEW};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    /// Rows per entity table, relationship table and the unified view
    pub counts: BTreeMap<String, u64>,
    pub active_links: u64,
    pub earliest_start: Option<String>,
    pub latest_start: Option<String>,
    pub by_utility: BTreeMap<String, u64>,
    pub by_link_status: BTreeMap<String, u64>,
    pub by_organisation: BTreeMap<String, u64>,
}

impl Summary {
    pub fn collect(conn: &Connection) -> Result<Self> {
        let mut counts = BTreeMap::new();
        for name in ENTITY_TABLES
            .iter()
            .chain(RELATIONSHIP_TABLES)
            .map(|t| t.name)
            .chain([UNIFIED_VIEW.name])
        {
            let count: i64 =
                conn.query_row(&format!("SELECT count(*) FROM {name}"), [], |r| r.get(0))?;
            counts.insert(name.to_string(), count as u64);
        }

        let active_links: i64 = conn.query_row(
            "SELECT count(*) FROM future_works_unified WHERE lifecycle_status = 'Active'",
            [],
            |r| r.get(0),
        )?;

        let (earliest_start, latest_start) = conn.query_row(
            "SELECT min(plannedstartdate), max(plannedstartdate) FROM networklink",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )?;

        Ok(Self {
            counts,
            active_links: active_links as u64,
            earliest_start,
            latest_start,
            by_utility: distribution(conn, "utility_type")?,
            by_link_status: distribution(conn, "link_status")?,
            by_organisation: distribution(conn, "organisation_name")?,
        })
    }
}

/// Links per value of a unified view column; missing values count as "Unknown"
fn distribution(conn: &Connection, column: &str) -> Result<BTreeMap<String, u64>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT coalesce({column}, 'Unknown'), count(*) FROM future_works_unified GROUP BY 1"
    ))?;
    let rows = stmt.query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, i64>(1)?)))?;

    let mut counts = BTreeMap::new();
    for row in rows {
        let (value, count) = row?;
        counts.insert(value, count as u64);
    }
    Ok(counts)
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Table record counts:")?;
        for (table, count) in &self.counts {
            writeln!(f, "  {:<44} {:>6}", table, count)?;
        }

        writeln!(f, "\nActive network links: {}", self.active_links)?;
        if let (Some(first), Some(last)) = (&self.earliest_start, &self.latest_start) {
            writeln!(f, "Earliest planned start: {first}")?;
            writeln!(f, "Latest planned start:   {last}")?;
        }

        for (title, dist) in [
            ("Utility type", &self.by_utility),
            ("Link status", &self.by_link_status),
            ("Organisation", &self.by_organisation),
        ] {
            writeln!(f, "\n{title} distribution:")?;
            for (value, count) in dist {
                writeln!(f, "  {:<44} {:>6}", value, count)?;
            }
        }
        Ok(())
    }
}
