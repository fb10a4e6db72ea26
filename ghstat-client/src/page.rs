//! Candidate page scraping
//!
//! Greenhouse renders candidate counts and role titles into the HTML of the
//! candidate listing page. The page is parsed into a DOM and the few elements
//! needed are located with CSS selectors.

use scraper::{ElementRef, Html, Selector};

use crate::error::{ClientError, Result};

/// Rendered instead of the results count when a query matches nothing
pub const NO_RESULTS_SELECTOR: &str = ".no_results--header";
/// Element holding the number of matching candidates
pub const RESULTS_COUNT_SELECTOR: &str = "#results_count";
/// Element holding the role title
pub const TITLE_SELECTOR: &str = ".nav-title";

/// Reads the candidate count from a listing page
pub fn parse_candidate_count(html: &str) -> Result<u64> {
    let document = Html::parse_document(html);

    if first_match(&document, NO_RESULTS_SELECTOR)?.is_some() {
        return Ok(0);
    }

    let text = first_match(&document, RESULTS_COUNT_SELECTOR)?
        .map(element_text)
        .ok_or_else(|| ClientError::MissingElement(RESULTS_COUNT_SELECTOR.into()))?;

    text.replace(',', "")
        .parse::<u64>()
        .map_err(|e| ClientError::ParseError(format!("count '{}' is not an integer: {}", text, e)))
}

/// Reads the role title from a listing page
pub fn parse_title(html: &str) -> Result<String> {
    let document = Html::parse_document(html);

    first_match(&document, TITLE_SELECTOR)?
        .map(element_text)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ClientError::MissingElement(TITLE_SELECTOR.into()))
}

fn first_match<'a>(document: &'a Html, selector: &str) -> Result<Option<ElementRef<'a>>> {
    let selector = Selector::parse(selector)
        .map_err(|e| ClientError::ParseError(format!("selector '{}': {}", selector, e)))?;
    Ok(document.select(&selector).next())
}

/// Text content with whitespace runs collapsed
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const COUNT_PAGE: &str = r#"
        <html><body>
          <div class="nav-title  main">
            Software Engineer &amp; <span>Team Lead</span>
          </div>
          <div data-id="results_count">wrong</div>
          <span class="count" id="results_count"> 42 </span>
        </body></html>"#;

    #[test]
    fn test_parse_candidate_count() {
        assert_eq!(parse_candidate_count(COUNT_PAGE).unwrap(), 42);
    }

    #[test]
    fn test_no_results_is_zero() {
        let html = r#"<div class="no_results--header">No candidates</div>"#;
        assert_eq!(parse_candidate_count(html).unwrap(), 0);
    }

    #[test]
    fn test_count_with_thousands_separator() {
        let html = r#"<b id='results_count'>1,204</b>"#;
        assert_eq!(parse_candidate_count(html).unwrap(), 1204);
    }

    #[test]
    fn test_missing_count_element() {
        let err = parse_candidate_count("<html></html>").unwrap_err();
        assert!(matches!(err, ClientError::MissingElement(_)));
    }

    #[test]
    fn test_non_numeric_count() {
        let html = r#"<span id="results_count">many</span>"#;
        let err = parse_candidate_count(html).unwrap_err();
        assert!(matches!(err, ClientError::ParseError(_)));
    }

    #[test]
    fn test_parse_title_collects_nested_text() {
        assert_eq!(
            parse_title(COUNT_PAGE).unwrap(),
            "Software Engineer & Team Lead"
        );
    }

    #[test]
    fn test_title_skips_void_elements() {
        let html = r#"<h1 class="nav-title">Role<br>Title<img src="x"/></h1><p>after</p>"#;
        assert_eq!(parse_title(html).unwrap(), "RoleTitle");
    }

    #[test]
    fn test_empty_title_is_missing() {
        let html = r#"<h1 class="nav-title">   </h1>"#;
        assert!(parse_title(html).is_err());
    }

    #[test]
    fn test_quoted_angle_brackets_in_attributes() {
        let html = r#"
            <div data-props='{"cmp":"a>b"}' class="nav-title">Data Engineer</div>
            <span data-x="1 > 0" id="results_count">12</span>"#;
        assert_eq!(parse_title(html).unwrap(), "Data Engineer");
        assert_eq!(parse_candidate_count(html).unwrap(), 12);
    }
}
