//! Table-of-contents extraction.
//!
//! The index page carries one table whose header row contains a `Nr` column.
//! Each data row becomes a [`TocEntry`]:
//!
//! | cell | field                                  |
//! |------|----------------------------------------|
//! | 0    | `number`                               |
//! | 1    | `date`                                 |
//! | 2    | `title`, `url_external`, `url_internal` |
//! | 3    | `categories`                           |
//!
//! Rows with fewer than four `td` cells and header rows are dropped silently.

use tracing::{debug, instrument, trace};

use tbcindex_dom::{Node, extract_text, find_by_tag_name};
use tbcindex_shared::{Result, ScrapeConfig, TbcIndexError, TocEntry};

use crate::topics::TopicIndex;

/// Extract every TOC entry from `document`, in row order.
///
/// Fails with [`TbcIndexError::TocTableNotFound`] if no table qualifies.
#[instrument(skip_all)]
pub fn extract_toc_entries(
    document: &Node,
    topics: &TopicIndex,
    config: &ScrapeConfig,
) -> Result<Vec<TocEntry>> {
    let table = find_toc_table(document, &config.toc_header_marker)?;

    let rows = find_by_tag_name(table, "tr");
    let total_rows = rows.len();

    let entries: Vec<TocEntry> = rows
        .into_iter()
        .filter(|row| !is_header_row(row))
        .filter_map(|row| parse_row(&find_by_tag_name(row, "td"), topics, config))
        .collect();

    debug!(
        rows = total_rows,
        entries = entries.len(),
        skipped = total_rows - entries.len(),
        "TOC table parsed"
    );
    Ok(entries)
}

/// First `table` with a `th` cell whose text contains `marker`.
pub fn find_toc_table<'a>(document: &'a Node, marker: &str) -> Result<&'a Node> {
    find_by_tag_name(document, "table")
        .into_iter()
        .find(|table| {
            find_by_tag_name(table, "th")
                .into_iter()
                .any(|th| extract_text(th).contains(marker))
        })
        .ok_or(TbcIndexError::TocTableNotFound)
}

/// A row counts as a header row only when its very first child node is a
/// `th` element. Whitespace text before the `th` defeats the check.
pub fn is_header_row(row: &Node) -> bool {
    row.children()
        .first()
        .is_some_and(|first| first.is_element("th"))
}

/// Build an entry from a row's `td` cells, or `None` if there are too few.
pub fn parse_row(cells: &[&Node], topics: &TopicIndex, config: &ScrapeConfig) -> Option<TocEntry> {
    let [number, date, content, categories, ..] = cells else {
        trace!(cells = cells.len(), "row has too few cells");
        return None;
    };

    let mut title = String::new();
    let mut url_external = String::new();
    let mut url_internal = String::new();

    for link in find_by_tag_name(content, "a") {
        let Some(href) = link.attr("href").filter(|href| !href.is_empty()) else {
            continue;
        };

        if href.starts_with(&config.external_prefix) {
            url_external = href.to_owned();
            title = extract_text(link);
        } else if href.ends_with(&config.internal_suffix) {
            url_internal = href.to_owned();
        }
    }

    let topic = topics.joined(&url_external);

    Some(TocEntry {
        number: extract_text(number).trim().to_owned(),
        date: extract_text(date).trim().to_owned(),
        title,
        url_external,
        url_internal,
        categories: extract_text(categories).trim().to_owned(),
        topic,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tbcindex_dom::parse_document;

    const EXT: &str = "http://thebuildingcoder.typepad.com/";

    fn scrape(html: &str, topics: &TopicIndex) -> Result<Vec<TocEntry>> {
        extract_toc_entries(&parse_document(html), topics, &ScrapeConfig::default())
    }

    fn table(rows: &str) -> String {
        format!(
            "<table><tr><th>Nr</th><th>Date</th><th>Title</th><th>Categories</th></tr>{rows}</table>"
        )
    }

    #[test]
    fn missing_table_is_fatal() {
        let result = scrape("<p>no tables here</p>", &TopicIndex::new());
        assert!(matches!(result, Err(TbcIndexError::TocTableNotFound)));
    }

    #[test]
    fn table_without_marker_is_not_selected() {
        let html = "<table><tr><th>Number</th><th>When</th></tr>\
                    <tr><td>1</td><td>d</td><td>t</td><td>c</td></tr></table>";
        let result = scrape(html, &TopicIndex::new());
        assert!(matches!(result, Err(TbcIndexError::TocTableNotFound)));
    }

    #[test]
    fn first_qualifying_table_wins() {
        let html = format!(
            "<table><tr><td>layout</td></tr></table>{}{}",
            table("<tr><td>1</td><td>a</td><td></td><td>x</td></tr>"),
            table("<tr><td>2</td><td>b</td><td></td><td>y</td></tr>"),
        );
        let entries = scrape(&html, &TopicIndex::new()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].number, "1");
    }

    #[test]
    fn marker_may_be_part_of_header_text() {
        let html = "<table><tr><th>Nr.</th></tr>\
                    <tr><td>7</td><td>d</td><td>t</td><td>c</td></tr></table>";
        let entries = scrape(html, &TopicIndex::new()).unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn sample_row_is_extracted() {
        let html = table(&format!(
            r#"<tr><td>1</td><td>2024-01-15</td>
               <td><a href="{EXT}p1">Sample</a> <a href="p1.htm">link</a></td>
               <td>dev,revit</td></tr>"#
        ));
        let entries = scrape(&html, &TopicIndex::new()).unwrap();
        assert_eq!(
            entries,
            vec![TocEntry {
                number: "1".into(),
                date: "2024-01-15".into(),
                title: "Sample".into(),
                url_external: format!("{EXT}p1"),
                url_internal: "p1.htm".into(),
                categories: "dev,revit".into(),
                topic: String::new(),
            }]
        );
    }

    #[test]
    fn row_with_three_cells_is_excluded() {
        let html = table(
            "<tr><td>1</td><td>d</td><td>t</td></tr>\
             <tr><td>2</td><td>d</td><td>t</td><td>c</td></tr>",
        );
        let entries = scrape(&html, &TopicIndex::new()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].number, "2");
    }

    #[test]
    fn extra_cells_are_ignored() {
        let html = table("<tr><td>1</td><td>d</td><td>t</td><td>c</td><td>extra</td></tr>");
        let entries = scrape(&html, &TopicIndex::new()).unwrap();
        assert_eq!(entries[0].categories, "c");
    }

    #[test]
    fn rows_keep_document_order_across_sections() {
        let html = "<table><thead><tr><th>Nr</th></tr></thead><tbody>\
                    <tr><td>3</td><td>a</td><td></td><td>x</td></tr>\
                    <tr><td>1</td><td>b</td><td></td><td>y</td></tr>\
                    </tbody><tbody>\
                    <tr><td>2</td><td>c</td><td></td><td>z</td></tr>\
                    </tbody></table>";
        let numbers: Vec<String> = scrape(html, &TopicIndex::new())
            .unwrap()
            .into_iter()
            .map(|e| e.number)
            .collect();
        assert_eq!(numbers, ["3", "1", "2"]);
    }

    #[test]
    fn last_matching_link_wins() {
        let html = table(&format!(
            r#"<tr><td>1</td><td>d</td><td>
                 <a href="{EXT}old">Old</a>
                 <a href="old.htm">o</a>
                 <a href="{EXT}new">New</a>
                 <a href="new.htm">n</a>
                 <a href="https://elsewhere.com/">ignored</a>
               </td><td>c</td></tr>"#
        ));
        let entry = &scrape(&html, &TopicIndex::new()).unwrap()[0];
        assert_eq!(entry.title, "New");
        assert_eq!(entry.url_external, format!("{EXT}new"));
        assert_eq!(entry.url_internal, "new.htm");
    }

    #[test]
    fn external_link_ending_in_htm_is_only_external() {
        let html = table(&format!(
            r#"<tr><td>1</td><td>d</td><td><a href="{EXT}2010/01/post.htm">P</a></td><td>c</td></tr>"#
        ));
        let entry = &scrape(&html, &TopicIndex::new()).unwrap()[0];
        assert_eq!(entry.url_external, format!("{EXT}2010/01/post.htm"));
        assert!(entry.url_internal.is_empty());
    }

    #[test]
    fn missing_links_leave_fields_empty() {
        let html = table("<tr><td> 12 </td><td>  </td><td>plain text</td><td> api </td></tr>");
        let entry = &scrape(&html, &TopicIndex::new()).unwrap()[0];
        assert_eq!(entry.number, "12");
        assert_eq!(entry.date, "");
        assert_eq!(entry.title, "");
        assert_eq!(entry.url_external, "");
        assert_eq!(entry.url_internal, "");
        assert_eq!(entry.categories, "api");
        assert_eq!(entry.topic, "");
    }

    #[test]
    fn topics_are_joined_from_index() {
        let mut topics = TopicIndex::new();
        topics.insert(&format!("{EXT}p1"), "Geometry");
        topics.insert(&format!("{EXT}p1"), "Ribbon");
        let html = table(&format!(
            r#"<tr><td>1</td><td>d</td><td><a href="{EXT}p1">T</a></td><td>c</td></tr>"#
        ));
        let entry = &scrape(&html, &topics).unwrap()[0];
        assert_eq!(entry.topic, "Geometry, Ribbon");
    }

    #[test]
    fn header_row_detection_is_first_child_only() {
        let th_first = Node::element(
            "tr",
            vec![],
            vec![Node::element("th", vec![], vec![Node::text("Nr")])],
        );
        let whitespace_first = Node::element(
            "tr",
            vec![],
            vec![
                Node::text("\n  "),
                Node::element("th", vec![], vec![Node::text("Nr")]),
            ],
        );
        let empty = Node::element("tr", vec![], vec![]);
        assert!(is_header_row(&th_first));
        assert!(!is_header_row(&whitespace_first));
        assert!(!is_header_row(&empty));
    }

    #[test]
    fn comment_before_th_does_not_hide_header_row() {
        // Comments are not part of the tree, so <th> is the row's first child.
        let html = table(&format!(
            "<tr><!--note--><th>9</th><td>9</td><td>2009-01-01</td>\
             <td><a href=\"{EXT}x.html\">X</a></td><td>Misc</td></tr>"
        ));
        let entries = scrape(&html, &TopicIndex::new()).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn header_row_with_td_cells_still_needs_four() {
        // First child is <td>, so the row is treated as data and survives
        // only because it has four cells.
        let html = table("<tr><td>Nr</td><td>Date</td><td>Title</td><td>Cat</td></tr>");
        let entries = scrape(&html, &TopicIndex::new()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].number, "Nr");
    }

    #[test]
    fn parse_row_rejects_short_rows() {
        let cell = Node::element("td", vec![], vec![Node::text("x")]);
        let cells = [&cell, &cell, &cell];
        assert!(parse_row(&cells, &TopicIndex::new(), &ScrapeConfig::default()).is_none());
    }
}
