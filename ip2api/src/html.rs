//! Scraping of the IP2 web pages.

use crate::errors::Ip2Error;
use crate::transport::Page;
use crate::types::*;
use lazy_static::lazy_static;
use scraper::{ElementRef, Html, Selector};

lazy_static! {
    static ref ROWS: Selector = Selector::parse("tbody tr").unwrap();
    static ref PROJECT_ID: Selector = Selector::parse(r#"input[name="pid"]"#).unwrap();
    static ref PROJECT_NAME: Selector = Selector::parse(r#"input[name="projectName"]"#).unwrap();
    static ref EXPERIMENT_ID: Selector = Selector::parse(r#"input[name="expId"]"#).unwrap();
    static ref SAMPLE_NAME: Selector = Selector::parse(r#"input[name="sampleName"]"#).unwrap();
    static ref QUALITY_CHECK_LINKS: Selector =
        Selector::parse("div.add_quality_check_details a").unwrap();
    static ref SPECTRA_ROWS: Selector = Selector::parse("table#spectra tbody tr").unwrap();
    static ref SEARCH_CELLS: Selector = Selector::parse("table#search tbody td").unwrap();
    static ref CELL: Selector = Selector::parse("td").unwrap();
    static ref LINK: Selector = Selector::parse("a").unwrap();
    static ref OPTION: Selector = Selector::parse("option").unwrap();
}

/// An `<option>` of a `<select>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SelectOption {
    pub value: Option<String>,
    pub text: String,
}

fn text_of(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn value_of<'a>(row: ElementRef<'a>, selector: &Selector) -> Option<&'a str> {
    row.select(selector).next().and_then(|e| e.value().attr("value"))
}

fn parse_id(value: &str, what: &'static str, page: &Page) -> Result<u32, Ip2Error> {
    value
        .trim()
        .parse()
        .map_err(|_| Ip2Error::malformed(what, &page.url))
}

/// Rows of the project list (`viewProject.html`).
pub(crate) fn projects(page: &Page) -> Result<Vec<(ProjectId, ProjectName)>, Ip2Error> {
    let document = Html::parse_document(&page.text);
    let mut projects = Vec::new();
    for row in document.select(&ROWS) {
        if let Some(id) = value_of(row, &PROJECT_ID) {
            let name = value_of(row, &PROJECT_NAME)
                .ok_or_else(|| Ip2Error::malformed("project name", &page.url))?;
            let id = ProjectId(parse_id(id, "project ID", page)?);
            projects.push((id, ProjectName::from(name)));
        }
    }
    Ok(projects)
}

/// Rows of the experiment list of a project (`viewExperiment.html`).
pub(crate) fn experiments(page: &Page) -> Result<Vec<(ExperimentId, ExperimentName)>, Ip2Error> {
    let document = Html::parse_document(&page.text);
    let mut experiments = Vec::new();
    for row in document.select(&ROWS) {
        if let Some(id) = value_of(row, &EXPERIMENT_ID) {
            let name = value_of(row, &SAMPLE_NAME)
                .ok_or_else(|| Ip2Error::malformed("experiment name", &page.url))?;
            let id = ExperimentId(parse_id(id, "experiment ID", page)?);
            experiments.push((id, ExperimentName::from(name)));
        }
    }
    Ok(experiments)
}

/// The experiment page (`eachExperiment.html`) links to the quality check of
/// the experiment's directory. That link carries the path as `expPath`.
pub(crate) fn experiment_path(page: &Page) -> Result<ExperimentPath, Ip2Error> {
    let document = Html::parse_document(&page.text);
    let href = document
        .select(&QUALITY_CHECK_LINKS)
        .nth(1)
        .and_then(|a| a.value().attr("href"))
        .ok_or_else(|| Ip2Error::malformed("quality check link", &page.url))?;
    let link = resolve(page, href)?;
    link.query_pairs()
        .find(|(k, _)| k == "expPath")
        .map(|(_, v)| ExperimentPath::new(v.into_owned()))
        .ok_or_else(|| Ip2Error::malformed("expPath", &page.url))
}

/// Resolve a link found on a page.
pub(crate) fn resolve(page: &Page, href: &str) -> Result<url::Url, Ip2Error> {
    url::Url::parse(&page.url)
        .and_then(|base| base.join(href))
        .map_err(|_| Ip2Error::malformed("a valid link", &page.url))
}

/// Names of the spectra files listed on the experiment page.
pub(crate) fn spectra_files(page: &Page) -> Vec<String> {
    let document = Html::parse_document(&page.text);
    document
        .select(&SPECTRA_ROWS)
        .filter_map(|row| row.select(&CELL).next())
        .map(text_of)
        .filter(|name| !name.is_empty())
        .collect()
}

fn next_cell(cell: ElementRef) -> Option<ElementRef> {
    cell.next_siblings().find_map(ElementRef::wrap)
}

/// The search ID is in the second cell of the search table on the
/// experiment page. Anything but a number means no search was run yet.
pub(crate) fn search_id(page: &Page) -> Option<SearchId> {
    let document = Html::parse_document(&page.text);
    let first = document.select(&SEARCH_CELLS).next()?;
    let text = text_of(next_cell(first)?);
    text.parse().ok().map(SearchId)
}

/// Find the "View" link next to the cell of the given search.
pub(crate) fn search_view_link(page: &Page, search: SearchId) -> Result<String, Ip2Error> {
    let document = Html::parse_document(&page.text);
    let needle = search.0.to_string();
    document
        .select(&SEARCH_CELLS)
        .filter(|td| text_of(*td).contains(&needle))
        .filter_map(next_cell)
        .flat_map(|td| td.select(&LINK).collect::<Vec<_>>())
        .find(|a| text_of(*a) == "View")
        .and_then(|a| a.value().attr("href"))
        .map(String::from)
        .ok_or_else(|| Ip2Error::malformed("link to search results", &page.url))
}

/// Find the first link labeled with the given text.
pub(crate) fn link_containing(page: &Page, label: &'static str) -> Result<String, Ip2Error> {
    let document = Html::parse_document(&page.text);
    document
        .select(&LINK)
        .find(|a| text_of(*a).contains(label))
        .and_then(|a| a.value().attr("href"))
        .map(String::from)
        .ok_or_else(|| Ip2Error::malformed(label, &page.url))
}

/// Options of the `<select>` matching `selector`.
pub(crate) fn select_options(
    page: &Page,
    selector: &str,
    what: &'static str,
) -> Result<Vec<SelectOption>, Ip2Error> {
    let document = Html::parse_document(&page.text);
    let select_selector =
        Selector::parse(selector).map_err(|_| Ip2Error::malformed(what, &page.url))?;
    let select = document
        .select(&select_selector)
        .next()
        .ok_or_else(|| Ip2Error::malformed(what, &page.url))?;
    let options = select
        .select(&OPTION)
        .map(|o| SelectOption {
            value: o.value().attr("value").map(String::from),
            text: text_of(o),
        })
        .collect();
    Ok(options)
}
