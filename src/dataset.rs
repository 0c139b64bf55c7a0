use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Attribute pairs scraped from one detail page.
///
/// Keys vary per entity; there is no fixed schema. Only the canonical
/// columns are projected at output time, everything else is overlay data.
pub type DetailAttributes = BTreeMap<String, String>;

/// Fixed fields extracted from one listing-table row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingRow {
    /// Text of the first cell.
    pub company_name: String,

    /// Raw `href` of the first anchor in the name cell, if any.
    pub company_link: Option<String>,

    /// Detail-page URL rebuilt from the link's query string; `None` when
    /// no link could be resolved.
    pub full_company_link: Option<String>,

    pub programme_type: String,
    pub start_date: String,
    pub end_date: String,
    pub id: String,
}

/// Merged listing + detail record for one entity, before derivation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRow {
    pub listing: ListingRow,
    pub details: DetailAttributes,
}

impl RawRow {
    /// Look up a column by its canonical name.
    ///
    /// Detail attributes overlay the listing-derived fields, so a detail key
    /// wins on a name collision (collisions are not expected in practice).
    pub fn get(&self, column: &str) -> Option<&str> {
        if let Some(value) = self.details.get(column) {
            return Some(value);
        }
        match column {
            "Company Name" => Some(&self.listing.company_name),
            "Company Link" => self.listing.company_link.as_deref(),
            "Full Company Link" => self.listing.full_company_link.as_deref(),
            "Programme Type" => Some(&self.listing.programme_type),
            "Start Date" => Some(&self.listing.start_date),
            "End Date" => Some(&self.listing.end_date),
            "ID" => Some(&self.listing.id),
            _ => None,
        }
    }

    /// Whether this row carries the named column at all.
    ///
    /// Listing columns are always part of the schema even when their value
    /// is null (an unresolved link); detail columns exist only if the detail
    /// page produced the key.
    pub fn has_column(&self, column: &str) -> bool {
        matches!(
            column,
            "Company Name"
                | "Company Link"
                | "Full Company Link"
                | "Programme Type"
                | "Start Date"
                | "End Date"
                | "ID"
        ) || self.details.contains_key(column)
    }
}

/// One record of the final dataset, in the canonical 19-column shape.
///
/// Serialized field names match the canonical column labels exactly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetRow {
    pub issuer: Option<String>,

    #[serde(rename = "Remaining Days")]
    pub remaining_days: Option<i64>,

    #[serde(rename = "Last programme update")]
    pub last_programme_update: Option<NaiveDate>,

    #[serde(rename = "Programme Type")]
    pub programme_type: Option<String>,

    #[serde(rename = "Start Date")]
    pub start_date: Option<String>,

    #[serde(rename = "info memo doc date")]
    pub info_memo_doc_date: Option<String>,

    #[serde(rename = "prog guarantee")]
    pub prog_guarantee: Option<String>,

    #[serde(rename = "Credit rating level")]
    pub credit_rating_level: Option<String>,

    #[serde(rename = "Programme ceiling")]
    pub programme_ceiling: Option<f64>,

    #[serde(rename = "Programme ceiling Currency")]
    pub programme_ceiling_currency: Option<String>,

    #[serde(rename = "IPA/PA")]
    pub ipa_pa: Option<String>,

    pub dealer: Option<String>,

    #[serde(rename = "Company Name")]
    pub company_name: Option<String>,

    #[serde(rename = "Company Link")]
    pub company_link: Option<String>,

    #[serde(rename = "Full Company Link")]
    pub full_company_link: Option<String>,

    #[serde(rename = "End Date")]
    pub end_date: Option<String>,

    #[serde(rename = "ID")]
    pub id: Option<String>,

    #[serde(rename = "type code")]
    pub type_code: Option<String>,

    pub documents: Option<String>,
}

/// Final derived, column-projected table, sorted ascending by remaining days.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    pub rows: Vec<DatasetRow>,
}

impl Dataset {
    /// Canonical column order of the output table.
    pub const COLUMNS: [&'static str; 19] = [
        "issuer",
        "Remaining Days",
        "Last programme update",
        "Programme Type",
        "Start Date",
        "info memo doc date",
        "prog guarantee",
        "Credit rating level",
        "Programme ceiling",
        "Programme ceiling Currency",
        "IPA/PA",
        "dealer",
        "Company Name",
        "Company Link",
        "Full Company Link",
        "End Date",
        "ID",
        "type code",
        "documents",
    ];

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
