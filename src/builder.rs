use crate::dataset::{Dataset, DatasetRow, RawRow};
use crate::error::BuildError;
use chrono::{Days, NaiveDate, Utc};
use std::cmp::Ordering;

/// Horizon added to the last-update date: three years plus a 90-day grace period.
const EXPIRY_HORIZON_DAYS: u64 = 3 * 365 + 90;

/// Divisor normalizing programme ceilings to billions.
const CEILING_SCALE: f64 = 1_000_000_000.0;

/// Columns this stage computes or coerces itself rather than projecting
/// verbatim. Their absence from every scraped row degrades to a null column
/// instead of failing the build.
const DERIVED_COLUMNS: [&str; 3] = [
    "Remaining Days",
    "Programme ceiling Currency",
    "Last programme update",
];

/// Accepted formats for "Last programme update".
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%d %B %Y"];

/// Builds the final dataset from the accumulated raw rows: derives computed
/// fields, projects the canonical columns, and sorts ascending by remaining
/// days with nulls last.
pub fn build(rows: Vec<RawRow>) -> Result<Dataset, BuildError> {
    build_at(rows, Utc::now().date_naive())
}

/// Same as [`build`], with an explicit "now" for deterministic countdowns.
pub fn build_at(rows: Vec<RawRow>, today: NaiveDate) -> Result<Dataset, BuildError> {
    if rows.is_empty() {
        return Err(BuildError::Empty);
    }

    // The canonical shape is constructible only if every non-derived column
    // exists in at least one row's schema.
    for column in Dataset::COLUMNS {
        if DERIVED_COLUMNS.contains(&column) {
            continue;
        }
        if !rows.iter().any(|row| row.has_column(column)) {
            return Err(BuildError::MissingColumn {
                column: column.to_string(),
            });
        }
    }

    let mut projected: Vec<DatasetRow> = rows.iter().map(|row| project(row, today)).collect();

    // Stable sort keeps crawl order on ties.
    projected.sort_by(|a, b| match (a.remaining_days, b.remaining_days) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    ::log::debug!("Built dataset with {} rows", projected.len());
    Ok(Dataset { rows: projected })
}

/// Projects one raw row onto the canonical columns, deriving computed
/// fields. Per-field derivation failures degrade to null, never abort.
fn project(row: &RawRow, today: NaiveDate) -> DatasetRow {
    let last_programme_update = row.get("Last programme update").and_then(parse_date);
    let remaining_days = last_programme_update
        .and_then(|date| date.checked_add_days(Days::new(EXPIRY_HORIZON_DAYS)))
        .map(|expiry| expiry.signed_duration_since(today).num_days());

    let ceiling_raw = row.get("Programme ceiling");
    let programme_ceiling_currency = ceiling_raw.map(currency_code);
    let programme_ceiling = ceiling_raw.and_then(parse_ceiling);

    DatasetRow {
        issuer: owned(row, "issuer"),
        remaining_days,
        last_programme_update,
        programme_type: owned(row, "Programme Type"),
        start_date: owned(row, "Start Date"),
        info_memo_doc_date: owned(row, "info memo doc date"),
        prog_guarantee: owned(row, "prog guarantee"),
        credit_rating_level: owned(row, "Credit rating level"),
        programme_ceiling,
        programme_ceiling_currency,
        ipa_pa: owned(row, "IPA/PA"),
        dealer: owned(row, "dealer"),
        company_name: owned(row, "Company Name"),
        company_link: owned(row, "Company Link"),
        full_company_link: owned(row, "Full Company Link"),
        end_date: owned(row, "End Date"),
        id: owned(row, "ID"),
        type_code: owned(row, "type code"),
        documents: owned(row, "documents"),
    }
}

fn owned(row: &RawRow, column: &str) -> Option<String> {
    row.get(column).map(str::to_string)
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
}

/// Last three characters of the raw ceiling text, e.g. "EUR" from
/// "1 500 000 EUR".
fn currency_code(raw: &str) -> String {
    let len = raw.chars().count();
    raw.chars().skip(len.saturating_sub(3)).collect()
}

/// Strips the trailing " XXX" currency suffix and interior spaces, then
/// parses the amount and normalizes it to billions.
fn parse_ceiling(raw: &str) -> Option<f64> {
    let len = raw.chars().count();
    let amount: String = raw
        .chars()
        .take(len.saturating_sub(4))
        .filter(|c| *c != ' ')
        .collect();
    amount.parse::<f64>().ok().map(|value| value / CEILING_SCALE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{DetailAttributes, ListingRow};

    fn listing(name: &str, id: &str) -> ListingRow {
        ListingRow {
            company_name: name.to_string(),
            company_link: Some(format!("dir.php?id={id}")),
            full_company_link: Some(format!("https://example.com/detail.php?id={id}")),
            programme_type: "CP".to_string(),
            start_date: "01/01/2024".to_string(),
            end_date: "31/12/2026".to_string(),
            id: id.to_string(),
        }
    }

    /// A detail map carrying every canonical detail-sourced column, so the
    /// projection presence check passes; callers override what they test.
    fn full_details() -> DetailAttributes {
        [
            ("issuer", "Some Issuer"),
            ("Last programme update", "2024-01-01"),
            ("info memo doc date", "2023-06-01"),
            ("prog guarantee", "None"),
            ("Credit rating level", "A-1"),
            ("Programme ceiling", "1 500 000 EUR"),
            ("IPA/PA", "Bank IPA"),
            ("dealer", "Bank Dealer"),
            ("type code", "STEP"),
            ("documents", "memo.pdf"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    fn raw_row(name: &str, id: &str, overrides: &[(&str, &str)]) -> RawRow {
        let mut details = full_details();
        for (key, value) in overrides {
            details.insert(key.to_string(), value.to_string());
        }
        RawRow {
            listing: listing(name, id),
            details,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[test]
    fn remaining_days_counts_from_the_fixed_horizon() {
        let rows = vec![raw_row("Alpha", "A-1", &[("Last programme update", "2024-01-01")])];
        let dataset = build_at(rows, today()).unwrap();
        assert_eq!(dataset.rows[0].remaining_days, Some(1185));
        assert_eq!(
            dataset.rows[0].last_programme_update,
            NaiveDate::from_ymd_opt(2024, 1, 1)
        );
    }

    #[test]
    fn ceiling_splits_currency_and_normalizes_to_billions() {
        let rows = vec![raw_row("Alpha", "A-1", &[("Programme ceiling", "1 500 000 EUR")])];
        let dataset = build_at(rows, today()).unwrap();
        let row = &dataset.rows[0];
        assert_eq!(row.programme_ceiling_currency.as_deref(), Some("EUR"));
        let ceiling = row.programme_ceiling.unwrap();
        assert!((ceiling - 0.0015).abs() < 1e-12);
    }

    #[test]
    fn unparseable_ceiling_degrades_to_null() {
        let rows = vec![raw_row("Alpha", "A-1", &[("Programme ceiling", "on request")])];
        let dataset = build_at(rows, today()).unwrap();
        assert_eq!(dataset.rows[0].programme_ceiling, None);
        // The currency slice is still taken positionally from the raw text.
        assert_eq!(
            dataset.rows[0].programme_ceiling_currency.as_deref(),
            Some("est")
        );
    }

    #[test]
    fn unparseable_update_yields_null_countdown_and_sorts_last() {
        let rows = vec![
            raw_row("NoDate", "N-1", &[("Last programme update", "unknown")]),
            raw_row("Late", "L-1", &[("Last programme update", "2024-03-01")]),
            raw_row("Early", "E-1", &[("Last programme update", "2024-01-01")]),
        ];
        let dataset = build_at(rows, today()).unwrap();
        let ids: Vec<_> = dataset.rows.iter().map(|r| r.id.as_deref().unwrap()).collect();
        assert_eq!(ids, ["E-1", "L-1", "N-1"]);
        assert_eq!(dataset.rows[2].remaining_days, None);
    }

    #[test]
    fn accepts_slash_separated_dates() {
        let rows = vec![raw_row("Alpha", "A-1", &[("Last programme update", "01/01/2024")])];
        let dataset = build_at(rows, today()).unwrap();
        assert_eq!(dataset.rows[0].remaining_days, Some(1185));
    }

    #[test]
    fn detail_attributes_overlay_listing_fields() {
        let rows = vec![raw_row("Alpha", "A-1", &[("Company Name", "Overlay Ltd")])];
        let dataset = build_at(rows, today()).unwrap();
        assert_eq!(dataset.rows[0].company_name.as_deref(), Some("Overlay Ltd"));
    }

    #[test]
    fn unknown_detail_keys_are_dropped_from_the_projection() {
        let rows = vec![raw_row("Alpha", "A-1", &[("internal note", "ignore me")])];
        let dataset = build_at(rows, today()).unwrap();
        let json = serde_json::to_string(&dataset.rows[0]).unwrap();
        assert!(!json.contains("internal note"));
        assert!(json.contains("Remaining Days"));
    }

    #[test]
    fn missing_update_column_everywhere_still_builds_with_nulls() {
        let mut row = raw_row("Alpha", "A-1", &[]);
        row.details.remove("Last programme update");
        let dataset = build_at(vec![row], today()).unwrap();
        assert_eq!(dataset.rows[0].last_programme_update, None);
        assert_eq!(dataset.rows[0].remaining_days, None);
    }

    #[test]
    fn missing_column_everywhere_fails_the_build() {
        let mut row = raw_row("Alpha", "A-1", &[]);
        row.details.remove("dealer");
        let err = build_at(vec![row], today()).unwrap_err();
        match err {
            BuildError::MissingColumn { column } => assert_eq!(column, "dealer"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn column_present_in_one_row_is_null_in_the_others() {
        let mut sparse = raw_row("Beta", "B-1", &[]);
        sparse.details.remove("dealer");
        let rows = vec![raw_row("Alpha", "A-1", &[]), sparse];
        let dataset = build_at(rows, today()).unwrap();
        let beta = dataset
            .rows
            .iter()
            .find(|r| r.id.as_deref() == Some("B-1"))
            .unwrap();
        assert_eq!(beta.dealer, None);
    }

    #[test]
    fn empty_input_fails_the_build() {
        assert!(matches!(build_at(vec![], today()), Err(BuildError::Empty)));
    }
}
