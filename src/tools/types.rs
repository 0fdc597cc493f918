//! Page data handed between the scrape and extract tools.

use serde_json::Value;

/// Top-level JSON-LD objects of one page, `@graph` containers flattened.
pub type Jsonld = Vec<Value>;

/// `(name or property, content)` pairs from `<title>` and `<meta>` tags, in page order.
pub type Metadata = Vec<(String, String)>;
