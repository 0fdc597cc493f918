//! Sitemap parsing (`urlset` and `sitemapindex`).

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::debug;

/// Locations listed by one sitemap document.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct Sitemap {
    /// Page URLs from a `urlset`.
    pub pages: Vec<String>,
    /// Child sitemap URLs from a `sitemapindex`.
    pub children: Vec<String>,
}

impl Sitemap {
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty() && self.children.is_empty()
    }
}

/// Parse sitemap XML. Malformed input yields whatever was read before the error.
pub(crate) fn parse_sitemap(xml: &str) -> Sitemap {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut is_index = false;
    let mut in_loc = false;
    let mut current = String::new();
    let mut locs = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"sitemapindex" => is_index = true,
                b"loc" => {
                    in_loc = true;
                    current.clear();
                }
                _ => {}
            },
            Ok(Event::Text(text)) if in_loc => {
                if let Ok(text) = text.unescape() {
                    current.push_str(&text);
                }
            }
            Ok(Event::CData(data)) if in_loc => {
                current.push_str(&String::from_utf8_lossy(&data));
            }
            Ok(Event::End(e)) if e.local_name().as_ref() == b"loc" => {
                in_loc = false;
                let loc = current.trim();
                if !loc.is_empty() {
                    locs.push(loc.to_string());
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                debug!(error = %e, "sitemap parse stopped early");
                break;
            }
            _ => {}
        }
        buf.clear();
    }

    if is_index {
        Sitemap {
            pages: Vec::new(),
            children: locs,
        }
    } else {
        Sitemap {
            pages: locs,
            children: Vec::new(),
        }
    }
}
