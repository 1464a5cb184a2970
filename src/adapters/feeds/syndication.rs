//! RSS / Atom feed parsing shared by the metadata adapters.
//!
//! Each `<item>` (RSS) or `<entry>` (Atom) becomes a [`FeedEntry`]: a flat,
//! ordered list of `(field name, text)` pairs taken from the entry's direct
//! children. Field names are lower-cased; a namespaced element such as
//! `dc:creator` is exposed both as `dc_creator` and as `creator`.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use thiserror::Error;

/// Feed fetching and parsing errors
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),
}

/// One feed entry with its fields in document order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedEntry {
    fields: Vec<(String, String)>,
}

impl FeedEntry {
    /// First non-empty value of a field
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, value)| key == name && !value.is_empty())
            .map(|(_, value)| value.as_str())
    }

    /// First non-empty value among several candidate field names, in order
    pub fn first_of(&self, names: &[&str]) -> Option<&str> {
        names.iter().find_map(|name| self.get(name))
    }

    /// All fields in document order; repeated elements appear repeatedly
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn push(&mut self, key: String, value: String) {
        self.fields.push((key, value));
    }
}

/// Field currently being read (a direct child of the entry element)
struct PendingField {
    keys: Vec<String>,
    text: String,
}

impl PendingField {
    fn append(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        if !self.text.is_empty() {
            self.text.push(' ');
        }
        self.text.push_str(text);
    }
}

/// Fetch a feed and parse its entries. Non-2xx responses are errors.
pub async fn fetch_entries(
    client: &reqwest::Client,
    url: url::Url,
) -> Result<Vec<FeedEntry>, FeedError> {
    let body = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    parse_feed(&body)
}

/// Parse an RSS 2.0 / RSS 1.0 / Atom document into entries.
pub fn parse_feed(xml: &str) -> Result<Vec<FeedEntry>, FeedError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    let mut current: Option<FeedEntry> = None;
    let mut field: Option<PendingField> = None;
    // 0 while directly inside the entry element
    let mut depth = 0usize;

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                let name = element_name(&start);
                if current.is_none() {
                    if is_entry_element(&name) {
                        current = Some(FeedEntry::default());
                        depth = 0;
                    }
                    continue;
                }
                depth += 1;
                if depth == 1 {
                    field = Some(PendingField {
                        keys: field_keys(&name, &start)?,
                        text: String::new(),
                    });
                }
            }
            Event::Empty(start) => {
                if let Some(entry) = current.as_mut().filter(|_| depth == 0) {
                    let name = element_name(&start);
                    let value = attribute(&start, "href")?
                        .or(attribute(&start, "rdf:resource")?)
                        .unwrap_or_default();
                    for key in field_keys(&name, &start)? {
                        entry.push(key, value.clone());
                    }
                }
            }
            Event::Text(text) => {
                if let Some(field) = field.as_mut() {
                    match text.unescape() {
                        Ok(unescaped) => field.append(&unescaped),
                        // HTML entities such as &nbsp; are not XML entities; keep the raw text
                        Err(_) => field.append(&String::from_utf8_lossy(&text)),
                    }
                }
            }
            Event::CData(cdata) => {
                if let Some(field) = field.as_mut() {
                    field.append(&String::from_utf8_lossy(&cdata));
                }
            }
            Event::End(_) => {
                if current.is_none() {
                    continue;
                }
                if depth == 0 {
                    if let Some(entry) = current.take() {
                        entries.push(entry);
                    }
                    continue;
                }
                if depth == 1 {
                    if let (Some(entry), Some(done)) = (current.as_mut(), field.take()) {
                        for key in done.keys {
                            entry.push(key, done.text.clone());
                        }
                    }
                }
                depth -= 1;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(entries)
}

fn element_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.name().as_ref()).to_lowercase()
}

fn is_entry_element(name: &str) -> bool {
    let local = name.rsplit(':').next().unwrap_or(name);
    local == "item" || local == "entry"
}

/// Names under which a child element is exposed
///
/// - `dc:creator` → `dc_creator`, `creator`
/// - `description` → also `summary`; `pubdate` → also `published`
/// - an `xsi:type` attribute adds `{local}_{type}`, e.g. `identifier_dcndl_isbn`
fn field_keys(name: &str, start: &BytesStart<'_>) -> Result<Vec<String>, FeedError> {
    let mut keys = Vec::with_capacity(3);
    let local = match name.split_once(':') {
        Some((_, local)) => {
            keys.push(name.replace(':', "_"));
            local
        }
        None => name,
    };
    keys.push(local.to_string());

    match local {
        "description" => keys.push("summary".to_string()),
        "pubdate" => keys.push("published".to_string()),
        _ => {}
    }

    if let Some(kind) = attribute(start, "xsi:type")? {
        keys.push(format!("{}_{}", local, kind.to_lowercase().replace(':', "_")));
    }

    keys.dedup();
    Ok(keys)
}

fn attribute(start: &BytesStart<'_>, name: &str) -> Result<Option<String>, FeedError> {
    for attr in start.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        if attr.key.as_ref().eq_ignore_ascii_case(name.as_bytes()) {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}
