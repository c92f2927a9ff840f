//! HTML extraction of listing and project pages
//!
//! This module turns page bodies into records:
//! - Listing pages yield zero or more [`SummaryRecord`]s
//! - Project pages yield exactly one [`DetailRecord`]
//! - Listing pages also carry the pagination markers used by the paginator
//!
//! All functions are pure: no I/O, no shared state.

use crate::records::{Attribute, DetailRecord, SummaryRecord};
use crate::ExtractError;
use scraper::{ElementRef, Html, Selector};

const ENTRY_SELECTOR: &str = "div.layer-content";
const MEDIA_SELECTOR: &str = "div.layer-media > a";
const CONTACTS_PER_ENTRY: usize = 2;
const PAGE_NUMBER_SELECTOR: &str = "div.paginate a.page-numbers";
const TITLE_SELECTOR: &str = "h1.entry-title";
const IMAGE_SELECTOR: &str = "figure.wp-block-image.size-large > img";
const DATE_SELECTOR: &str = "time.entry-date.published";
const ATTRIBUTE_ITEM_SELECTOR: &str = "div.entry-content li";

/// Extracts the summary records of one listing page
///
/// Each listing entry contributes a name, a detail link with its thumbnail, and
/// two contact fields. Each entry's contact count is checked on its own block,
/// then the fields are flattened into one sequence alternating mandante and
/// arquitecto and split by stride 2.
///
/// # Errors
///
/// The whole page is rejected rather than risking misaligned columns:
/// - `MisalignedEntries` if the number of names and links differ
/// - `EntryContacts` if any single entry does not have exactly two contact fields
/// - `MissingDetailUrl` if an entry's link is empty
///
/// # Example
///
/// ```
/// use ces_harvest::harvest::extract_summaries;
///
/// let html = r#"
///     <div class="layer-media"><a href="https://example.com/p1/"><img src="/p1.jpg"></a></div>
///     <div class="layer-content"><a>Proyecto 1</a><div>Mandante 1</div><div>Arquitecto 1</div></div>
/// "#;
/// let records = extract_summaries(html).unwrap();
/// assert_eq!(records[0].mandante.as_deref(), Some("Mandante 1"));
/// ```
pub fn extract_summaries(body: &str) -> Result<Vec<SummaryRecord>, ExtractError> {
    let document = Html::parse_document(body);

    let entries = select_entries(&document);
    let media = select_media(&document);

    let named = entries.iter().filter(|entry| entry.name.is_some()).count();
    if named != entries.len() || entries.len() != media.len() {
        return Err(ExtractError::MisalignedEntries {
            names: named,
            links: media.len(),
        });
    }

    for (index, entry) in entries.iter().enumerate() {
        if entry.contacts.len() != CONTACTS_PER_ENTRY {
            return Err(ExtractError::EntryContacts {
                index,
                name: entry.name.clone().unwrap_or_default(),
                found: entry.contacts.len(),
            });
        }
    }

    let contacts: Vec<String> = entries
        .iter()
        .flat_map(|entry| entry.contacts.iter().cloned())
        .collect();
    let (mandantes, arquitectos) = deinterleave(&contacts, entries.len())?;
    let names = entries.into_iter().map(|entry| entry.name.unwrap_or_default());

    names
        .zip(media)
        .zip(mandantes.into_iter().zip(arquitectos))
        .enumerate()
        .map(|(index, ((name, (link, image)), (mandante, arquitecto)))| {
            let detail_url = link.filter(|l| !l.is_empty()).ok_or_else(|| {
                ExtractError::MissingDetailUrl {
                    index,
                    name: name.clone(),
                }
            })?;

            Ok(SummaryRecord {
                name,
                detail_url,
                image_url: image,
                mandante: non_empty(mandante),
                arquitecto: non_empty(arquitecto),
            })
        })
        .collect()
}

/// Splits an interleaved `[A1, B1, A2, B2, ...]` sequence into `[A..]` and `[B..]`
///
/// `entries` is the number of pairs expected; any other length is an error.
pub fn deinterleave(
    values: &[String],
    entries: usize,
) -> Result<(Vec<String>, Vec<String>), ExtractError> {
    if values.len() != entries * 2 {
        return Err(ExtractError::MisalignedContacts {
            entries,
            expected: entries * 2,
            found: values.len(),
        });
    }

    let first = values.iter().step_by(2).cloned().collect();
    let second = values.iter().skip(1).step_by(2).cloned().collect();
    Ok((first, second))
}

/// Extracts the detail record of one project page
///
/// Attributes are read from the `<li><b>Label:</b> value</li>` items of the
/// entry content. Labels are normalized with [`normalize_label`] and matched
/// exactly against [`Attribute::labels`]; anything unmatched is ignored and
/// anything absent stays missing. If a label appears twice the last value wins.
pub fn extract_detail(url: &str, body: &str) -> DetailRecord {
    let document = Html::parse_document(body);
    let mut record = DetailRecord::new(url);

    record.name = select_texts(&document, TITLE_SELECTOR)
        .into_iter()
        .next()
        .and_then(non_empty);

    record.image_url = first_attr(&document, IMAGE_SELECTOR, "src").map(|src| secure_scheme(&src));

    record.entry_date = first_attr(&document, DATE_SELECTOR, "datetime")
        .map(|datetime| datetime.chars().take(10).collect::<String>())
        .and_then(|date| non_empty(date.trim().to_string()));

    let (Some(item_selector), Some(label_selector)) = (css(ATTRIBUTE_ITEM_SELECTOR), css("b")) else {
        return record;
    };

    for item in document.select(&item_selector) {
        let Some(label_element) = item.select(&label_selector).next() else {
            continue;
        };

        let raw_label = label_element.text().collect::<String>();
        let label = normalize_label(&raw_label);
        let Some(attribute) = Attribute::from_label(&label) else {
            tracing::trace!("Ignoring label {:?} on {}", label, url);
            continue;
        };

        let mut value = own_text(item);
        if value.is_empty() {
            // Value wrapped in a child element
            let full = item.text().collect::<String>();
            value = full.replacen(raw_label.as_str(), "", 1);
        }

        record.set(attribute, clean_value(&value));
    }

    record
}

/// Extracts every page index shown in a listing page's pagination block
///
/// Markers that are not numbers ("next", "…") are skipped.
pub fn extract_page_numbers(body: &str) -> Vec<u32> {
    let document = Html::parse_document(body);
    select_texts(&document, PAGE_NUMBER_SELECTOR)
        .iter()
        .filter_map(|text| text.parse::<u32>().ok())
        .collect()
}

/// Normalizes an attribute label for matching
///
/// Removes colons, transliterates accented characters to ASCII, and trims and
/// collapses whitespace: `" Región: "` becomes `"Region"`.
pub fn normalize_label(label: &str) -> String {
    let without_colons = label.replace(':', "");
    collapse_whitespace(&deunicode::deunicode(&without_colons))
}

/// Rewrites a plain `http:` link to `https:`
pub fn secure_scheme(link: &str) -> String {
    let link = link.trim();
    match link.strip_prefix("http:") {
        Some(rest) => format!("https:{}", rest),
        None => link.to_string(),
    }
}

fn css(selector: &str) -> Option<Selector> {
    Selector::parse(selector).ok()
}

/// Returns the cleaned text of every element matching `selector`
fn select_texts(document: &Html, selector: &str) -> Vec<String> {
    let Some(selector) = css(selector) else {
        return Vec::new();
    };

    document
        .select(&selector)
        .map(|element| collapse_whitespace(&element.text().collect::<String>()))
        .collect()
}

/// One `div.layer-content` block of a listing page
struct ListingEntry {
    /// Text of the block's first direct `a` child
    name: Option<String>,

    /// Texts of the block's direct `div` children, in order
    contacts: Vec<String>,
}

/// Returns every listing block with its own name and contact fields
fn select_entries(document: &Html) -> Vec<ListingEntry> {
    let Some(selector) = css(ENTRY_SELECTOR) else {
        return Vec::new();
    };

    document
        .select(&selector)
        .map(|block| {
            let children: Vec<ElementRef<'_>> =
                block.children().filter_map(ElementRef::wrap).collect();
            let text = |element: &ElementRef<'_>| {
                collapse_whitespace(&element.text().collect::<String>())
            };

            ListingEntry {
                name: children
                    .iter()
                    .find(|child| child.value().name() == "a")
                    .map(text),
                contacts: children
                    .iter()
                    .filter(|child| child.value().name() == "div")
                    .map(text)
                    .collect(),
            }
        })
        .collect()
}

/// Returns `(href, img src)` of every listing media link
fn select_media(document: &Html) -> Vec<(Option<String>, Option<String>)> {
    let (Some(link_selector), Some(image_selector)) = (css(MEDIA_SELECTOR), css("img")) else {
        return Vec::new();
    };

    document
        .select(&link_selector)
        .map(|link| {
            let href = link.value().attr("href").map(|h| h.trim().to_string());
            let image = link
                .select(&image_selector)
                .next()
                .and_then(|img| img.value().attr("src"))
                .map(|src| src.trim().to_string())
                .filter(|src| !src.is_empty());
            (href, image)
        })
        .collect()
}

fn first_attr(document: &Html, selector: &str, attr: &str) -> Option<String> {
    let selector = css(selector)?;
    document
        .select(&selector)
        .next()
        .and_then(|element| element.value().attr(attr))
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Concatenates the text nodes directly under an element, skipping children
fn own_text(element: ElementRef<'_>) -> String {
    let text = element
        .children()
        .filter_map(|node| node.value().as_text().map(|text| String::from(&**text)))
        .collect::<String>();
    text.trim().to_string()
}

fn clean_value(value: &str) -> Option<String> {
    let trimmed = value.trim().trim_matches(':');
    non_empty(collapse_whitespace(trimmed))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}
