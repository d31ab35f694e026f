//! Declaration of the `future_works_unified` view.
//!
//! The view is described as data: a chain of tables joined on their foreign
//! keys, the columns each one contributes, and the code-list columns whose
//! labels replace the stored codes. Contacts hang off the organisation through
//! a junction table and are aggregated to one value per organisation, so the
//! view always has exactly one row per network link.

use super::relationships::{Relationship, ORGANISATION_CONTACTS};
use super::tables::{CONTACT_DETAILS, NETWORK_LINK, ORGANISATION, PLANNED_PROGRAMME};
use super::types::*;

/// A stored column exposed under a consumer-facing name
#[derive(Debug, Clone, Copy)]
pub struct Projection {
    pub column: &'static str,
    pub output: &'static str,
}

const fn p(column: &'static str, output: &'static str) -> Projection {
    Projection { column, output }
}

/// How a source joins onto an earlier one: `alias.column = parent.parent_column`
#[derive(Debug, Clone, Copy)]
pub struct ViewJoin {
    pub column: &'static str,
    pub parent_alias: &'static str,
    pub parent_column: &'static str,
}

/// One table in the join chain
#[derive(Debug)]
pub struct ViewSource {
    pub table: &'static TableSchema,
    pub alias: &'static str,
    /// `None` for the driving table
    pub join: Option<ViewJoin>,
    pub columns: &'static [Projection],
    /// Code-list foreign keys projected as their labels
    pub labels: &'static [Projection],
}

/// A many-to-many edge collapsed to one row per parent key
#[derive(Debug)]
pub struct AggregatedJoin {
    pub relationship: &'static Relationship,
    pub table: &'static TableSchema,
    pub alias: &'static str,
    pub parent_alias: &'static str,
    pub columns: &'static [Projection],
    pub labels: &'static [Projection],
    pub separator: &'static str,
    pub count_output: &'static str,
}

#[derive(Debug)]
pub struct ViewSchema {
    pub name: &'static str,
    pub description: &'static str,
    pub sources: &'static [ViewSource],
    pub aggregates: &'static [AggregatedJoin],
}

impl ViewSchema {
    /// The driving table; one view row per row of it
    pub fn root(&self) -> &ViewSource {
        &self.sources[0]
    }

    /// Geometry column of the driving table, with its SRS
    pub fn geometry(&self) -> Option<(&'static str, GeometryType, i32)> {
        self.root()
            .table
            .geometry_column()
            .and_then(|c| match c.col_type {
                ColumnType::Geometry { kind, srs_id } => Some((c.name, kind, srs_id)),
                _ => None,
            })
    }

    /// Every (table, column) pair the view reads
    pub fn references(&self) -> Vec<(&'static str, &'static str)> {
        let mut refs = Vec::new();

        for source in self.sources {
            let name = source.table.name;
            for proj in source.columns.iter().chain(source.labels) {
                refs.push((name, proj.column));
            }
            for label in source.labels {
                if let Some(fk) = source.table.foreign_key(label.column) {
                    refs.push((fk.references_table, fk.references_column));
                    refs.push((fk.references_table, "label"));
                }
            }
            if let Some(join) = source.join {
                refs.push((name, join.column));
            }
        }

        for agg in self.aggregates {
            let rel = agg.relationship;
            refs.push((rel.table.name, rel.source_column));
            refs.push((rel.table.name, rel.target_column));
            refs.push((agg.table.name, SYSTEM_ID));
            for proj in agg.columns.iter().chain(agg.labels) {
                refs.push((agg.table.name, proj.column));
            }
            for label in agg.labels {
                if let Some(fk) = agg.table.foreign_key(label.column) {
                    refs.push((fk.references_table, fk.references_column));
                    refs.push((fk.references_table, "label"));
                }
            }
        }

        refs.sort_unstable();
        refs.dedup();
        refs
    }

    /// Output column names, in select order
    pub fn output_columns(&self) -> Vec<&'static str> {
        let mut names = vec!["fid"];
        if let Some((geom, _, _)) = self.geometry() {
            names.push(geom);
        }
        for source in self.sources {
            names.extend(source.columns.iter().map(|c| c.output));
            names.extend(source.labels.iter().map(|c| c.output));
        }
        for agg in self.aggregates {
            names.extend(agg.columns.iter().map(|c| c.output));
            names.extend(agg.labels.iter().map(|c| c.output));
            names.push(agg.count_output);
        }
        names
    }
}

pub static UNIFIED_VIEW: ViewSchema = ViewSchema {
    name: "future_works_unified",
    description: "Future works with organisation, programme and contact details in one layer",
    sources: &[
        ViewSource {
            table: &NETWORK_LINK,
            alias: "nl",
            join: None,
            columns: &[
                p("systemid", "work_id"),
                p("objectname", "work_name"),
                p("description", "description"),
                p("usrn", "usrn"),
                p("localereference", "street_name"),
                p("plannedstartdate", "planned_start_date"),
                p("plannedenddate", "planned_end_date"),
                p("plannedinstallationdate", "planned_installation_date"),
                p("planneddepth_depth", "depth"),
                p("datelastupdated", "last_updated"),
            ],
            labels: &[
                p("lifecyclestatus", "lifecycle_status"),
                p("utilitytype", "utility_type"),
                p("utilitysubtype", "utility_subtype"),
                p("plannedworkstatus", "work_status"),
                p("worktype", "work_type"),
                p("plannedmaterial", "material"),
                p("plannedinstallationmethod", "installation_method"),
                p("planneddepth_unitofmeasure", "depth_unit"),
                p("confidencelevel", "confidence_level"),
                p("linkstatus", "link_status"),
                p("locationtype", "location_type"),
                p("datasensitivitylevel", "data_sensitivity"),
                p("dataprovenance", "data_provenance"),
            ],
        },
        ViewSource {
            table: &PLANNED_PROGRAMME,
            alias: "prog",
            join: Some(ViewJoin {
                column: SYSTEM_ID,
                parent_alias: "nl",
                parent_column: "programmeid_fk",
            }),
            columns: &[
                p("systemid", "programme_id"),
                p("programmename", "programme_name"),
                p("programmedescription", "programme_description"),
                p("plannedstartdate", "programme_start_date"),
                p("plannedenddate", "programme_end_date"),
            ],
            labels: &[
                p("programmetype", "programme_type"),
                p("lifecyclestatus", "programme_status"),
                p("datasensitivitylevel", "programme_sensitivity"),
                p("dataprovenance", "programme_provenance"),
            ],
        },
        ViewSource {
            table: &ORGANISATION,
            alias: "org",
            join: Some(ViewJoin {
                column: SYSTEM_ID,
                parent_alias: "prog",
                parent_column: "dataproviderid_fk",
            }),
            columns: &[
                p("systemid", "organisation_id"),
                p("name", "organisation_name"),
                p("shortname", "organisation_shortname"),
                p("swacode", "swa_code"),
                p("websiteurl", "organisation_website"),
            ],
            labels: &[
                p("organisationtype", "organisation_type"),
                p("lifecyclestatus", "organisation_status"),
            ],
        },
    ],
    aggregates: &[AggregatedJoin {
        relationship: &ORGANISATION_CONTACTS,
        table: &CONTACT_DETAILS,
        alias: "contacts",
        parent_alias: "org",
        columns: &[
            p("contactname", "contact_names"),
            p("departmentname", "contact_departments"),
            p("emailaddress", "contact_emails"),
            p("telephonenumber", "contact_phones"),
        ],
        labels: &[p("contactdetailstype", "contact_roles")],
        separator: "; ",
        count_output: "contact_count",
    }],
};

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_driving_table_is_network_link() {
        assert_eq!(UNIFIED_VIEW.root().table.name, "networklink");
        assert!(UNIFIED_VIEW.root().join.is_none());
        let (geom, kind, srs) = UNIFIED_VIEW.geometry().unwrap();
        assert_eq!(geom, "geom");
        assert_eq!(kind, GeometryType::LineString);
        assert_eq!(srs, BRITISH_NATIONAL_GRID);
    }

    #[test]
    fn test_every_code_list_column_is_labelled() {
        for source in UNIFIED_VIEW.sources {
            let labelled: HashSet<_> = source.labels.iter().map(|l| l.column).collect();
            for fk in source.table.foreign_keys.iter().filter(|fk| fk.is_code_list()) {
                assert!(
                    labelled.contains(fk.column),
                    "{}.{} is not resolved to a label",
                    source.table.name,
                    fk.column
                );
            }
        }
    }

    #[test]
    fn test_output_columns_unique() {
        let cols = UNIFIED_VIEW.output_columns();
        let unique: HashSet<_> = cols.iter().collect();
        assert_eq!(unique.len(), cols.len());
    }

    #[test]
    fn test_references_exist_in_declarations() {
        for (table, column) in UNIFIED_VIEW.references() {
            let schema = crate::schema::get_table(table).unwrap();
            assert!(schema.column(column).is_some(), "{table}.{column}");
        }
    }
}
