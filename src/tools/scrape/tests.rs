use super::*;
use serde_json::json;

#[test]
fn test_jsonld_graph_and_arrays_are_flattened() {
    let html = r#"<html><head>
        <script type="application/ld+json">{"@context":"https://schema.org","@graph":[{"@type":"Museum","name":"M"},{"@type":"Event","name":"Opening"}]}</script>
        <script type="application/ld+json">[{"@type":"ExhibitionEvent","name":"Light Atlas"}]</script>
        <script type="application/ld+json">{ not json </script>
    </head><body></body></html>"#;
    let jsonld = scrape_jsonld(html);
    assert_eq!(jsonld.len(), 3);
    assert_eq!(jsonld[1], json!({"@type": "Event", "name": "Opening"}));
    assert_eq!(jsonld[2]["name"], "Light Atlas");
}

#[test]
fn test_jsonld_tolerates_raw_newlines_in_strings() {
    let html = "<script type=\"application/ld+json\">{\"@type\":\"Event\",\"name\":\"Line\nBreak\"}</script>";
    let jsonld = scrape_jsonld(html);
    assert_eq!(jsonld.len(), 1);
    assert_eq!(jsonld[0]["name"], "Line Break");
}

#[test]
fn test_metadata_and_lookup() {
    let html = r#"<html><head><title> Events | Museum </title>
        <meta property="og:image" content="https://m.org/hero.jpg">
        <meta name="description" content="">
    </head></html>"#;
    let metadata = scrape_metadata(html);
    assert_eq!(meta_value(&metadata, &["title"]), Some("Events | Museum"));
    assert_eq!(
        meta_value(&metadata, &["twitter:image", "og:image"]),
        Some("https://m.org/hero.jpg")
    );
    assert_eq!(meta_value(&metadata, &["description"]), None);
}

#[test]
fn test_visible_text_skips_scripts() {
    let html = r#"<html><body><p>Open daily</p><script>var x = "hidden";</script>
        <style>p { color: red }</style><noscript>Enable JS</noscript><div>Free</div></body></html>"#;
    assert_eq!(scrape_text(html), "Open daily Free");
}
