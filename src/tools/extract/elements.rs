//! Element-selector extraction.

use std::collections::HashSet;

use chrono::NaiveDate;
use scraper::{ElementRef, Html};
use tracing::debug;
use url::Url;

use super::fields::*;
use super::rules::{RuleGroup, RULE_GROUPS};
use crate::tools::map::select_primary_link_in_element;
use crate::types::{EventDraft, Provenance};

/// Candidates considered per page.
pub(crate) const MAX_CANDIDATES: usize = 100;

/// Elements matched by any rule of the group, in document order.
///
/// Skips navigation and calendar-widget chrome and anything nested inside
/// an element already selected.
pub(crate) fn select_group<'a>(doc: &'a Html, group: &RuleGroup) -> Vec<ElementRef<'a>> {
    let mut selected = Vec::new();
    let mut ids = HashSet::new();

    for el in doc.root_element().descendants().filter_map(ElementRef::wrap) {
        if selected.len() >= MAX_CANDIDATES {
            break;
        }
        if !group.rules.iter().any(|rule| rule.matches(&el)) {
            continue;
        }
        if el.ancestors().any(|a| ids.contains(&a.id())) || in_chrome(&el) {
            continue;
        }
        ids.insert(el.id());
        selected.push(el);
    }
    selected
}

/// Build a draft from one candidate container.
pub(crate) fn draft_from_element(
    el: &ElementRef,
    page: &Url,
    today: NaiveDate,
    og_image: Option<&str>,
) -> Option<EventDraft> {
    let cleaned = title_of(el, today)?;
    let mut draft = EventDraft::new(cleaned.title, Provenance::Markup);

    if let Some(schedule) = schedule_of(el, today, true) {
        apply_schedule(&mut draft, schedule);
    }
    if draft.end_date.is_none() {
        draft.end_date = cleaned.end_date;
    }

    draft.link = select_primary_link_in_element(el, page).map(String::from);
    draft.description = description_of(el, &draft.title);
    draft.location = location_of(el);
    draft.image_url = image_of(el, page, og_image);
    draft.event_type = event_type_of(
        &draft.title,
        &text_of(el),
        draft.link.as_deref(),
        page,
    );
    Some(draft)
}

/// Run the rule groups in order; the first group yielding drafts wins.
///
/// `og_image` only backs up a page with a single candidate.
pub(crate) fn element_drafts(
    doc: &Html,
    page: &Url,
    today: NaiveDate,
    og_image: Option<&str>,
) -> Vec<EventDraft> {
    for group in RULE_GROUPS {
        let elements = select_group(doc, group);
        if elements.is_empty() {
            continue;
        }
        let fallback_image = if elements.len() == 1 { og_image } else { None };
        let drafts: Vec<EventDraft> = elements
            .iter()
            .filter_map(|el| draft_from_element(el, page, today, fallback_image))
            .collect();
        if !drafts.is_empty() {
            debug!(url = %page, group = group.name, candidates = drafts.len(), "selector group matched");
            return drafts;
        }
    }
    Vec::new()
}
