//! Extract the text of each presence zone from a parsed page.

use super::presence::PresenceError;
use scraper::{Html, Selector};
use serde::Serialize;

/// A structural region of a page checked for keyword presence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    Title,
    Description,
    H1,
    H2,
    Content,
    AltText,
    Schema,
}

impl Zone {
    /// Every zone, in report column order.
    pub const ALL: [Zone; 7] = [
        Zone::Title,
        Zone::Description,
        Zone::H1,
        Zone::H2,
        Zone::Content,
        Zone::AltText,
        Zone::Schema,
    ];

    /// Column heading used in reports.
    pub fn label(self) -> &'static str {
        match self {
            Zone::Title => "Title",
            Zone::Description => "Description",
            Zone::H1 => "H1",
            Zone::H2 => "H2",
            Zone::Content => "Content",
            Zone::AltText => "Alt Text",
            Zone::Schema => "Schema",
        }
    }

    /// Snake-case key used in process output.
    pub fn key(self) -> &'static str {
        match self {
            Zone::Title => "title",
            Zone::Description => "description",
            Zone::H1 => "h1",
            Zone::H2 => "h2",
            Zone::Content => "content",
            Zone::AltText => "alt_text",
            Zone::Schema => "schema",
        }
    }
}

/// Lowercased text of every zone on one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZoneText {
    pub title: String,
    pub description: String,
    pub h1: String,
    pub h2: String,
    pub content: String,
    pub alt_text: String,
    pub schema: String,
}

impl ZoneText {
    pub fn get(&self, zone: Zone) -> &str {
        match zone {
            Zone::Title => &self.title,
            Zone::Description => &self.description,
            Zone::H1 => &self.h1,
            Zone::H2 => &self.h2,
            Zone::Content => &self.content,
            Zone::AltText => &self.alt_text,
            Zone::Schema => &self.schema,
        }
    }
}

fn selector(zone: Zone, css: &str) -> Result<Selector, PresenceError> {
    Selector::parse(css).map_err(|e| PresenceError::ZoneExtraction {
        zone,
        reason: format!("bad selector '{css}': {e:?}"),
    })
}

/// Space-joined text of every element matching `css`.
fn joined_text(doc: &Html, zone: Zone, css: &str) -> Result<String, PresenceError> {
    let sel = selector(zone, css)?;
    let parts: Vec<String> = doc
        .select(&sel)
        .map(|el| el.text().collect::<String>())
        .collect();
    Ok(parts.join(" "))
}

/// Extract all seven zones from `doc`.
///
/// - title: text of the first `<title>`
/// - description: `content` of `<meta name="description">`, empty if absent
/// - h1 / h2 / content: space-joined text of every `h1` / `h2` / `p`
/// - alt_text: space-joined `alt` of every `img` that declares one
/// - schema: space-joined re-serialized JSON of each
///   `application/ld+json` block that parses; the rest are skipped
pub fn extract_zones(doc: &Html) -> Result<ZoneText, PresenceError> {
    let title_sel = selector(Zone::Title, "title")?;
    let title = doc
        .select(&title_sel)
        .next()
        .map(|el| el.text().collect::<String>())
        .unwrap_or_default();

    let desc_sel = selector(Zone::Description, r#"meta[name="description"]"#)?;
    let description = doc
        .select(&desc_sel)
        .next()
        .and_then(|el| el.value().attr("content"))
        .unwrap_or("")
        .to_string();

    let alt_sel = selector(Zone::AltText, "img[alt]")?;
    let alt_text = doc
        .select(&alt_sel)
        .filter_map(|el| el.value().attr("alt"))
        .collect::<Vec<_>>()
        .join(" ");

    let schema_sel = selector(Zone::Schema, r#"script[type="application/ld+json"]"#)?;
    let schema = doc
        .select(&schema_sel)
        .filter_map(|el| {
            let raw = el.text().collect::<String>();
            serde_json::from_str::<serde_json::Value>(&raw).ok()
        })
        .map(|value| value.to_string())
        .collect::<Vec<_>>()
        .join(" ");

    Ok(ZoneText {
        title: title.to_lowercase(),
        description: description.to_lowercase(),
        h1: joined_text(doc, Zone::H1, "h1")?.to_lowercase(),
        h2: joined_text(doc, Zone::H2, "h2")?.to_lowercase(),
        content: joined_text(doc, Zone::Content, "p")?.to_lowercase(),
        alt_text: alt_text.to_lowercase(),
        schema: schema.to_lowercase(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!doctype html>
<html><head>
  <title>Best Running Shoes 2026</title>
  <title>Ignored second title</title>
  <meta name="description" content="Reviews of TRAIL runners">
  <script type="application/ld+json">{"@type": "Product", "name": "Trail Runner X"}</script>
  <script type="application/ld+json">{ not valid json </script>
</head><body>
  <h1>Shoes</h1><h1>For <em>Running</em></h1>
  <h2>Sizing</h2>
  <p>First paragraph.</p><p>Second one.</p>
  <img src="a.png" alt="Blue sneaker"><img src="b.png"><img src="c.png" alt="Red boot">
</body></html>"#;

    #[test]
    fn test_extract_all_zones() {
        let doc = Html::parse_document(PAGE);
        let z = extract_zones(&doc).unwrap();
        assert_eq!(z.title, "best running shoes 2026");
        assert_eq!(z.description, "reviews of trail runners");
        assert_eq!(z.h1, "shoes for running");
        assert_eq!(z.h2, "sizing");
        assert_eq!(z.content, "first paragraph. second one.");
        assert_eq!(z.alt_text, "blue sneaker red boot");
        assert!(z.schema.contains("trail runner x"));
        assert!(!z.schema.contains("not valid"));
    }

    #[test]
    fn test_missing_zones_are_empty() {
        let doc = Html::parse_document("<html><body><div>bare</div></body></html>");
        let z = extract_zones(&doc).unwrap();
        for zone in Zone::ALL {
            assert_eq!(z.get(zone), "", "{zone:?} should be empty");
        }
    }

    #[test]
    fn test_zone_labels_in_column_order() {
        let labels: Vec<_> = Zone::ALL.iter().map(|z| z.label()).collect();
        assert_eq!(
            labels,
            vec!["Title", "Description", "H1", "H2", "Content", "Alt Text", "Schema"]
        );
    }
}
