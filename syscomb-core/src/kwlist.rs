//! Keyword list loading.
//!
//! A keyword list is the fixed, ordered set of search terms for an
//! evaluation. Every detection list is keyed by the ids it defines.
//!
//! License: MIT OR Apache-2.0

use anyhow::{anyhow, bail, Context, Result};
use log::{debug, info};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::path::Path;

/// A single search term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyword {
    /// Unique id, e.g. `KW206-00001`.
    pub id: String,
    /// The search text.
    pub text: String,
}

/// An ordered keyword list, as read from a `<kwlist>` XML document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KwList {
    pub filename: String,
    pub ecf_filename: Option<String>,
    pub language: Option<String>,
    pub version: Option<String>,
    keywords: Vec<Keyword>,
    index: HashMap<String, usize>,
}

impl KwList {
    /// Builds a list from keywords already in memory. Duplicate ids are rejected.
    pub fn from_keywords<I>(keywords: I) -> Result<Self>
    where
        I: IntoIterator<Item = Keyword>,
    {
        let mut list = KwList::default();
        for kw in keywords {
            list.push(kw)?;
        }
        Ok(list)
    }

    /// Loads a keyword list from an XML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading keyword list from: {}", path.display());
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read keyword list {}", path.display()))?;
        let mut list = Self::from_xml_str(&text)
            .with_context(|| format!("Failed to parse keyword list {}", path.display()))?;
        list.filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        info!("Loaded {} keywords from {}.", list.len(), path.display());
        Ok(list)
    }

    /// Parses a `<kwlist>` document.
    pub fn from_xml_str(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        let mut list = KwList::default();
        let mut current_id: Option<String> = None;
        let mut current_text = String::new();
        let mut in_kwtext = false;

        loop {
            match reader.read_event()? {
                Event::Start(e) | Event::Empty(e) if e.name().as_ref() == b"kwlist" => {
                    list.ecf_filename = attribute(&e, b"ecf_filename")?;
                    list.language = attribute(&e, b"language")?;
                    list.version = attribute(&e, b"version")?;
                }
                Event::Start(e) if e.name().as_ref() == b"kw" => {
                    let id = attribute(&e, b"kwid")?
                        .ok_or_else(|| anyhow!("<kw> element without a kwid attribute"))?;
                    current_id = Some(id);
                    current_text.clear();
                }
                Event::Empty(e) if e.name().as_ref() == b"kw" => {
                    let id = attribute(&e, b"kwid")?
                        .ok_or_else(|| anyhow!("<kw> element without a kwid attribute"))?;
                    list.push(Keyword { id, text: String::new() })?;
                }
                Event::Start(e) if e.name().as_ref() == b"kwtext" => in_kwtext = true,
                Event::End(e) if e.name().as_ref() == b"kwtext" => in_kwtext = false,
                Event::Text(t) if in_kwtext => current_text.push_str(&t.unescape()?),
                Event::End(e) if e.name().as_ref() == b"kw" => {
                    if let Some(id) = current_id.take() {
                        list.push(Keyword {
                            id,
                            text: current_text.trim().to_string(),
                        })?;
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        debug!("Parsed {} keywords.", list.len());
        Ok(list)
    }

    fn push(&mut self, kw: Keyword) -> Result<()> {
        if self.index.contains_key(&kw.id) {
            bail!("Duplicate keyword id '{}' in keyword list.", kw.id);
        }
        self.index.insert(kw.id.clone(), self.keywords.len());
        self.keywords.push(kw);
        Ok(())
    }

    pub fn keywords(&self) -> &[Keyword] {
        &self.keywords
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Keyword> {
        self.keywords.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Keyword> {
        self.index.get(id).map(|&i| &self.keywords[i])
    }

    /// Position of `id` in list order.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}

impl<'a> IntoIterator for &'a KwList {
    type Item = &'a Keyword;
    type IntoIter = std::slice::Iter<'a, Keyword>;

    fn into_iter(self) -> Self::IntoIter {
        self.keywords.iter()
    }
}

/// Reads an unescaped attribute value from an XML start tag.
pub(crate) fn attribute(e: &BytesStart<'_>, name: &[u8]) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == name {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}
