use crate::dataset::ListingRow;
use crate::error::ParseError;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// One parsed listing page: its row records and the pagination link, if any.
#[derive(Debug, Clone)]
pub struct ListingPage {
    pub rows: Vec<ListingRow>,
    /// Absolute URL of the next listing page; `None` ends traversal.
    pub next_page: Option<String>,
}

/// Parses a listing-page document into row records and the "Next" link.
///
/// A row record is produced per `<tr>` that contains at least one `<td>`;
/// zero-cell rows are header/spacer rows and are skipped silently. Rows with
/// fewer than five cells are skipped with a warning rather than failing the
/// whole crawl. A document with no `<tr>` at all does not have the expected
/// listing shape and is a parse failure.
pub fn parse(markup: &str, page_url: &str, detail_base: &str) -> Result<ListingPage, ParseError> {
    let doc = Html::parse_document(markup);

    let row_selector = Selector::parse("tr").unwrap();
    let cell_selector = Selector::parse("td").unwrap();
    let anchor_selector = Selector::parse("a").unwrap();

    let mut rows = Vec::new();
    let mut saw_table_row = false;

    for tr in doc.select(&row_selector) {
        saw_table_row = true;

        let cells: Vec<ElementRef> = tr.select(&cell_selector).collect();
        if cells.is_empty() {
            continue;
        }
        if cells.len() < 5 {
            ::log::warn!(
                "Skipping malformed listing row on {} with {} cells (expected 5)",
                page_url,
                cells.len()
            );
            continue;
        }

        let company_name = cell_text(&cells[0]);
        let company_link = cells[0]
            .select(&anchor_selector)
            .next()
            .and_then(|a| a.value().attr("href"))
            .map(str::to_string);
        let full_company_link = company_link
            .as_deref()
            .map(|link| detail_url(link, detail_base));

        rows.push(ListingRow {
            company_name,
            company_link,
            full_company_link,
            programme_type: cell_text(&cells[1]),
            start_date: cell_text(&cells[2]),
            end_date: cell_text(&cells[3]),
            id: cell_text(&cells[4]),
        });
    }

    if !saw_table_row {
        return Err(ParseError::NoListingRows {
            url: page_url.to_string(),
        });
    }

    // The pagination control is the first anchor whose visible text is
    // exactly "Next". Its href may be relative to the current page.
    let next_page = doc
        .select(&anchor_selector)
        .find(|a| a.text().collect::<String>().trim() == "Next")
        .and_then(|a| a.value().attr("href"))
        .map(|href| resolve_href(page_url, href));

    ::log::debug!(
        "Parsed {} rows from {} (next page: {})",
        rows.len(),
        page_url,
        next_page.as_deref().unwrap_or("none")
    );

    Ok(ListingPage { rows, next_page })
}

/// Trimmed text content of a cell.
fn cell_text(cell: &ElementRef) -> String {
    cell.text().collect::<String>().trim().to_string()
}

/// Rebuilds the detail-page URL from a row link.
///
/// The listing's row links only carry a usable query string, so everything
/// after the last `?` is grafted onto the fixed detail endpoint. This is a
/// convention of this specific site, not a general rule.
fn detail_url(href: &str, detail_base: &str) -> String {
    let query = href.rsplit('?').next().unwrap_or(href);
    format!("{}{}", detail_base, query)
}

/// Resolves a possibly relative href against the page it appeared on.
fn resolve_href(page_url: &str, href: &str) -> String {
    match Url::parse(page_url).and_then(|base| base.join(href)) {
        Ok(resolved) => resolved.to_string(),
        Err(_) => href.to_string(),
    }
}
