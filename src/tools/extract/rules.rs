//! Selector rules for event containers.
//!
//! Rules are grouped from most to least specific. Each group is evaluated as
//! a whole; the first group producing candidates wins.

use scraper::node::Element;
use scraper::ElementRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SelectorRule {
    /// Exact class token.
    Class(&'static str),
    /// Any class token containing the fragment.
    ClassContains(&'static str),
    /// Attribute present, optionally with a value containing the fragment.
    DataAttr(&'static str, Option<&'static str>),
    /// Tag name, optionally with a class token containing the fragment.
    Tag(&'static str, Option<&'static str>),
    /// Tag with an exact class token.
    TagClass(&'static str, &'static str),
    /// Microdata `itemtype` ending with the schema.org type.
    ItemType(&'static str),
}

impl SelectorRule {
    pub fn matches(&self, element: &ElementRef) -> bool {
        let el = element.value();
        match *self {
            SelectorRule::Class(class) => has_class(el, class),
            SelectorRule::ClassContains(fragment) => {
                el.classes().any(|c| c.to_ascii_lowercase().contains(fragment))
            }
            SelectorRule::DataAttr(name, value) => match (el.attr(name), value) {
                (Some(_), None) => true,
                (Some(actual), Some(fragment)) => actual.to_ascii_lowercase().contains(fragment),
                (None, _) => false,
            },
            SelectorRule::Tag(tag, class_fragment) => {
                el.name() == tag
                    && class_fragment.map_or(true, |fragment| {
                        el.classes().any(|c| c.to_ascii_lowercase().contains(fragment))
                    })
            }
            SelectorRule::TagClass(tag, class) => el.name() == tag && has_class(el, class),
            SelectorRule::ItemType(schema) => el
                .attr("itemtype")
                .is_some_and(|t| t.trim_end_matches('/').ends_with(&format!("/{schema}"))),
        }
    }
}

fn has_class(el: &Element, class: &str) -> bool {
    el.classes().any(|c| c.eq_ignore_ascii_case(class))
}

pub(crate) struct RuleGroup {
    pub name: &'static str,
    pub rules: &'static [SelectorRule],
}

use SelectorRule::*;

pub(crate) const RULE_GROUPS: &[RuleGroup] = &[
    RuleGroup {
        name: "explicit-class",
        rules: &[
            Class("event"),
            Class("event-item"),
            Class("event-card"),
            Class("event-listing"),
            Class("event-teaser"),
            Class("event-preview"),
            Class("event-block"),
            Class("events-item"),
            Class("exhibition"),
            Class("exhibition-item"),
            Class("exhibition-card"),
            Class("exhibition-listing"),
            Class("exhibition-teaser"),
            Class("program-item"),
            Class("program-card"),
            Class("tour-item"),
            Class("calendar-item"),
            Class("listing-item"),
            Class("card--event"),
            Class("card--exhibition"),
        ],
    },
    RuleGroup {
        name: "class-wildcard",
        rules: &[
            ClassContains("event-card"),
            ClassContains("event-item"),
            ClassContains("eventitem"),
            ClassContains("event-teaser"),
            ClassContains("exhibition-card"),
            ClassContains("exhibition-item"),
            ClassContains("program-card"),
            ClassContains("program-item"),
            ClassContains("tour-card"),
            ClassContains("talk-card"),
            ClassContains("workshop-card"),
            ClassContains("card-event"),
            ClassContains("card-exhibition"),
            ClassContains("event_item"),
        ],
    },
    RuleGroup {
        name: "data-attribute",
        rules: &[
            DataAttr("data-event-id", None),
            DataAttr("data-event", None),
            DataAttr("data-exhibition-id", None),
            DataAttr("data-type", Some("event")),
            DataAttr("data-content-type", Some("event")),
            DataAttr("data-component", Some("event")),
            DataAttr("data-post-type", Some("event")),
        ],
    },
    RuleGroup {
        name: "semantic",
        rules: &[
            ItemType("Event"),
            ItemType("ExhibitionEvent"),
            Tag("article", Some("event")),
            Tag("article", Some("exhibition")),
            Tag("article", Some("program")),
            Tag("li", Some("event")),
            Tag("li", Some("exhibition")),
            Tag("article", None),
        ],
    },
    RuleGroup {
        name: "cms",
        rules: &[
            TagClass("article", "type-tribe_events"),
            Class("tribe-events-calendar-list__event"),
            Class("tribe-event"),
            Class("mec-event-article"),
            Class("em-item"),
            Class("ai1ec-event"),
            Class("evo_eventtop"),
            Class("eventlist-event"),
            Class("summary-item"),
            ClassContains("node--type-event"),
            ClassContains("node--type-exhibition"),
            Class("views-row"),
            Class("wp-block-post"),
            Class("teaser"),
            Class("card"),
            Class("grid-item"),
        ],
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    fn parse(html: &str) -> (Html, Selector) {
        (Html::parse_fragment(html), Selector::parse("div").unwrap())
    }

    #[test]
    fn rule_variants_match() {
        let (doc, sel) = parse(
            r#"<div class="Event-Card big" data-event-id="7" itemtype="https://schema.org/ExhibitionEvent"></div>"#,
        );
        let el = doc.select(&sel).next().unwrap();
        assert!(Class("event-card").matches(&el));
        assert!(ClassContains("card").matches(&el));
        assert!(DataAttr("data-event-id", None).matches(&el));
        assert!(!DataAttr("data-event-id", Some("9")).matches(&el));
        assert!(ItemType("ExhibitionEvent").matches(&el));
        assert!(!ItemType("Event").matches(&el));
        assert!(Tag("div", Some("event")).matches(&el));
        assert!(!TagClass("article", "event-card").matches(&el));
    }

    #[test]
    fn groups_cover_every_family() {
        let total: usize = RULE_GROUPS.iter().map(|g| g.rules.len()).sum();
        assert!(total >= 60, "only {total} rules");
        let names: Vec<&str> = RULE_GROUPS.iter().map(|g| g.name).collect();
        assert_eq!(
            names,
            vec!["explicit-class", "class-wildcard", "data-attribute", "semantic", "cms"]
        );
    }
}
