//! Catalog search and result-table scraping
//!
//! A search is a single GET of the listing page with the term as the `search`
//! query parameter. The first table on the page carries the results, one row
//! per show: the ID in the first cell, the title in the second and the
//! download anchor in the third.

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, warn};

use crate::app::client::CatalogClient;
use crate::app::models::SearchResult;
use crate::constants::selectors;
use crate::errors::{ScrapeResult, SearchError};

/// Search the catalog for one term
///
/// Never fails: request errors, error statuses and pages without a result
/// table are logged and produce an empty vector.
pub async fn fetch_results(client: &CatalogClient, search_term: &str) -> Vec<SearchResult> {
    info!("Starting search for '{}'", search_term);

    let html = match client.search_page(search_term).await {
        Ok(html) => html,
        Err(e) => {
            warn!("Error fetching results for '{}': {}", search_term, e);
            return Vec::new();
        }
    };

    debug!("Parsing results for '{}'", search_term);
    match parse_results_table(&html, search_term) {
        Ok(results) => {
            info!("Found {} results for '{}'", results.len(), search_term);
            results
        }
        Err(e) => {
            warn!("Error parsing results for '{}': {}", search_term, e);
            Vec::new()
        }
    }
}

/// Extract result rows from a listing page
///
/// Rows with fewer than three cells are skipped. A table whose markup has no
/// `<tbody>` yields no rows. Download links are kept exactly as written in the
/// anchor; relative ones are resolved when a request is made.
///
/// # Errors
///
/// Returns `SearchError::InvalidSelector` if a built-in selector fails to parse
pub fn parse_results_table(
    html: &str,
    search_term: &str,
) -> ScrapeResult<Vec<SearchResult>> {
    let document = Html::parse_document(html);
    let table_selector = selector(selectors::TABLE)?;
    let body_selector = selector(selectors::TABLE_BODY)?;
    let row_selector = selector(selectors::ROW)?;
    let cell_selector = selector(selectors::CELL)?;
    let anchor_selector = selector(selectors::ANCHOR)?;

    let Some(table) = document.select(&table_selector).next() else {
        info!("No table found on the results page for '{}'", search_term);
        return Ok(Vec::new());
    };

    // The HTML parser adds a tbody to any table with bare rows, so check the
    // markup itself
    if !declares_table_body(html) {
        info!("No results found in the table for '{}'", search_term);
        return Ok(Vec::new());
    }

    let Some(body) = table.select(&body_selector).next() else {
        info!("No results found in the table for '{}'", search_term);
        return Ok(Vec::new());
    };

    let mut results = Vec::new();
    for row in body.select(&row_selector) {
        let cells: Vec<ElementRef> = row.select(&cell_selector).collect();
        if cells.len() < 3 {
            continue;
        }

        let Some(href) = cells[2]
            .select(&anchor_selector)
            .next()
            .and_then(|anchor| anchor.value().attr("href"))
        else {
            debug!("Skipping row without a download link for '{}'", search_term);
            continue;
        };

        results.push(SearchResult::new(
            search_term,
            cell_text(&cells[0]),
            cell_text(&cells[1]),
            href,
        ));
    }

    Ok(results)
}

fn selector(source: &str) -> ScrapeResult<Selector> {
    Selector::parse(source).map_err(|_| SearchError::InvalidSelector {
        selector: source.to_string(),
    })
}

fn cell_text(cell: &ElementRef) -> String {
    cell.text().collect::<String>().trim().to_string()
}

/// Whether the first table in the source carries an explicit `<tbody>`
fn declares_table_body(html: &str) -> bool {
    let lowered = html.to_ascii_lowercase();
    let Some(start) = lowered.find("<table") else {
        return false;
    };
    let table_source = &lowered[start..];
    let end = table_source.find("</table").unwrap_or(table_source.len());
    table_source[..end].contains("<tbody")
}
