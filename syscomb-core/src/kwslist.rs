//! Reading and writing `<kwslist>` detection-list files.
//!
//! ```xml
//! <kwslist kwlist_filename="..." language="..." system_id="...">
//!   <detected_kwlist kwid="KW-1" search_time="1" oov_count="0">
//!     <kw file="f" channel="1" tbeg="0.50" dur="1.00" score="0.8" decision="YES"/>
//!   </detected_kwlist>
//! </kwslist>
//! ```
//!
//! License: MIT OR Apache-2.0

use anyhow::{anyhow, Context, Result};
use log::{debug, info, warn};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::fs;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use syscomb_fusion::threshold::normalize_to_threshold;

use crate::detection::{Detection, DetectionList};
use crate::kwlist::{attribute, KwList};

/// Options for reading a detection list.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadOptions {
    /// Drop detections whose score is not strictly positive.
    pub remove_zero_score: bool,
}

/// Loads a detection list from `path`, keyed by `kwlist`.
pub fn read_kwslist<P: AsRef<Path>>(path: P, kwlist: &KwList, options: ReadOptions) -> Result<DetectionList> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read detection list {}", path.display()))?;
    let list = parse_kwslist(&text, kwlist, options)
        .with_context(|| format!("Failed to parse detection list {}", path.display()))?;
    debug!(
        "Read {} detections over {} keywords from {}.",
        list.detection_count(),
        list.keyword_count(),
        path.display()
    );
    Ok(list)
}

/// Parses a `<kwslist>` document.
pub fn parse_kwslist(xml: &str, kwlist: &KwList, options: ReadOptions) -> Result<DetectionList> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut list = DetectionList::new(kwlist);
    let mut current_kw: Option<String> = None;
    let mut skipped_keywords = 0usize;
    let mut dropped = 0usize;

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.name().as_ref() == b"kwslist" => {
                if let Some(v) = attribute(&e, b"kwlist_filename")? {
                    list.kwlist_filename = v;
                }
                if let Some(v) = attribute(&e, b"language")? {
                    list.language = v;
                }
                if let Some(v) = attribute(&e, b"system_id")? {
                    list.system_id = v;
                }
            }
            Event::Start(e) if e.name().as_ref() == b"detected_kwlist" => {
                let kwid = required(&e, b"kwid")?;
                if kwlist.contains(&kwid) {
                    if let Some(entry) = list.entry_mut(&kwid) {
                        entry.search_time = optional_number(&e, b"search_time")?;
                        entry.oov_count = optional_number(&e, b"oov_count")?;
                    }
                    current_kw = Some(kwid);
                } else {
                    warn!("Skipping detections for keyword '{}' not in the keyword list.", kwid);
                    skipped_keywords += 1;
                    current_kw = None;
                }
            }
            Event::End(e) if e.name().as_ref() == b"detected_kwlist" => current_kw = None,
            Event::Start(e) | Event::Empty(e) if e.name().as_ref() == b"kw" => {
                let Some(kwid) = current_kw.as_deref() else {
                    continue;
                };
                let det = parse_detection(&e)?;
                if options.remove_zero_score && det.score <= 0.0 {
                    dropped += 1;
                    continue;
                }
                list.push(kwid, det);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if dropped > 0 {
        debug!("Dropped {} zero-score detections.", dropped);
    }
    if skipped_keywords > 0 {
        warn!("{} keywords were not in the keyword list.", skipped_keywords);
    }
    Ok(list)
}

fn parse_detection(e: &BytesStart<'_>) -> Result<Detection> {
    let filename = required(e, b"file")?;
    let tbeg: f64 = number(e, b"tbeg")?;
    let dur: f64 = number(e, b"dur")?;
    let score: f64 = number(e, b"score")?;
    let decision = match attribute(e, b"decision")?.as_deref() {
        Some(d) if d.eq_ignore_ascii_case("YES") => Some(true),
        Some(d) if d.eq_ignore_ascii_case("NO") => Some(false),
        Some(d) => return Err(anyhow!("Invalid decision '{}' for detection in '{}'", d, filename)),
        None => None,
    };
    if dur < 0.0 {
        return Err(anyhow!("Negative duration {} for detection in '{}'", dur, filename));
    }
    Ok(Detection {
        filename,
        start_time: tbeg,
        end_time: tbeg + dur,
        score,
        decision,
    })
}

fn required(e: &BytesStart<'_>, name: &[u8]) -> Result<String> {
    attribute(e, name)?.ok_or_else(|| {
        anyhow!(
            "<{}> element is missing the '{}' attribute",
            String::from_utf8_lossy(e.name().as_ref()),
            String::from_utf8_lossy(name)
        )
    })
}

fn number<T: FromStr>(e: &BytesStart<'_>, name: &[u8]) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = required(e, name)?;
    raw.trim()
        .parse::<T>()
        .with_context(|| format!("Invalid {} value '{}'", String::from_utf8_lossy(name), raw))
}

fn optional_number<T: FromStr>(e: &BytesStart<'_>, name: &[u8]) -> Result<Option<T>>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match attribute(e, name)? {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .with_context(|| format!("Invalid {} value '{}'", String::from_utf8_lossy(name), raw)),
        None => Ok(None),
    }
}

/// Renders `list` as a `<kwslist>` document.
///
/// With `normalize`, each score is mapped through its keyword's decision
/// threshold so that the threshold sits at 0.5. Keywords without a threshold
/// keep their raw scores.
pub fn to_xml_string(list: &DetectionList, normalize: bool) -> Result<String> {
    let mut buf = Vec::new();
    write_xml(list, &mut buf, normalize)?;
    String::from_utf8(buf).context("Generated XML is not valid UTF-8")
}

/// Writes `list` as XML to `out`.
pub fn write_xml<W: Write>(list: &DetectionList, out: W, normalize: bool) -> Result<()> {
    let mut writer = Writer::new_with_indent(out, b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut root = BytesStart::new("kwslist");
    root.push_attribute(("kwlist_filename", list.kwlist_filename.as_str()));
    root.push_attribute(("language", list.language.as_str()));
    root.push_attribute(("system_id", list.system_id.as_str()));
    writer.write_event(Event::Start(root))?;

    for entry in list.entries() {
        let search_time = format_number(entry.search_time.unwrap_or(1.0));
        let oov_count = entry.oov_count.unwrap_or(0).to_string();
        let mut kw_elem = BytesStart::new("detected_kwlist");
        kw_elem.push_attribute(("kwid", entry.kwid.as_str()));
        kw_elem.push_attribute(("search_time", search_time.as_str()));
        kw_elem.push_attribute(("oov_count", oov_count.as_str()));

        if entry.detections.is_empty() {
            writer.write_event(Event::Empty(kw_elem))?;
            continue;
        }
        writer.write_event(Event::Start(kw_elem))?;

        for det in &entry.detections {
            let score = match (normalize, entry.threshold) {
                (true, Some(threshold)) => normalize_to_threshold(det.score, threshold),
                _ => det.score,
            };
            let tbeg = format!("{:.2}", det.start_time);
            let dur = format!("{:.2}", det.duration());
            let score = format!("{:.6}", score);

            let mut elem = BytesStart::new("kw");
            elem.push_attribute(("file", det.filename.as_str()));
            elem.push_attribute(("channel", "1"));
            elem.push_attribute(("tbeg", tbeg.as_str()));
            elem.push_attribute(("dur", dur.as_str()));
            elem.push_attribute(("score", score.as_str()));
            if let Some(yes) = det.decision {
                elem.push_attribute(("decision", if yes { "YES" } else { "NO" }));
            }
            writer.write_event(Event::Empty(elem))?;
        }

        writer.write_event(Event::End(BytesEnd::new("detected_kwlist")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("kwslist")))?;
    writer.get_mut().write_all(b"\n")?;
    Ok(())
}

/// Writes `list` to the file at `path`.
pub fn write_kwslist<P: AsRef<Path>>(list: &DetectionList, path: P, normalize: bool) -> Result<()> {
    let path = path.as_ref();
    let file = fs::File::create(path)
        .with_context(|| format!("Failed to create output file {}", path.display()))?;
    let mut out = std::io::BufWriter::new(file);
    write_xml(list, &mut out, normalize)
        .with_context(|| format!("Failed to write detection list {}", path.display()))?;
    out.flush()
        .with_context(|| format!("Failed to flush {}", path.display()))?;
    info!(
        "Wrote {} detections to {}{}.",
        list.detection_count(),
        path.display(),
        if normalize { " (normalized)" } else { "" }
    );
    Ok(())
}

fn format_number(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kwlist::Keyword;

    fn kwlist() -> KwList {
        KwList::from_keywords(vec![
            Keyword { id: "KW-1".into(), text: "one".into() },
            Keyword { id: "KW-2".into(), text: "two".into() },
        ])
        .unwrap()
    }

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<kwslist kwlist_filename="dev.kwlist.xml" language="zulu" system_id="sys-a">
  <detected_kwlist kwid="KW-1" search_time="2.5" oov_count="0">
    <kw file="BABEL_A" channel="1" tbeg="1.20" dur="0.30" score="0.750000" decision="YES"/>
    <kw file="BABEL_A" channel="1" tbeg="4.00" dur="0.50" score="0.000000" decision="NO"/>
  </detected_kwlist>
  <detected_kwlist kwid="KW-9" search_time="1" oov_count="1">
    <kw file="BABEL_B" channel="1" tbeg="0.00" dur="1.00" score="0.5"/>
  </detected_kwlist>
  <detected_kwlist kwid="KW-2" search_time="1" oov_count="0"/>
</kwslist>
"#;

    #[test]
    fn test_parse_sample() {
        let list = parse_kwslist(SAMPLE, &kwlist(), ReadOptions::default()).unwrap();
        assert_eq!(list.language, "zulu");
        assert_eq!(list.system_id, "sys-a");
        let dets = list.get("KW-1").unwrap();
        assert_eq!(dets.len(), 2);
        assert_eq!(dets[0].filename, "BABEL_A");
        assert!((dets[0].end_time - 1.5).abs() < 1e-9);
        assert_eq!(dets[0].decision, Some(true));
        assert_eq!(list.entry("KW-1").unwrap().search_time, Some(2.5));
        assert_eq!(list.get("KW-2").unwrap().len(), 0);
        assert!(list.get("KW-9").is_none());
    }

    #[test]
    fn test_parse_removes_zero_scores_on_request() {
        let opts = ReadOptions { remove_zero_score: true };
        let list = parse_kwslist(SAMPLE, &kwlist(), opts).unwrap();
        assert_eq!(list.get("KW-1").unwrap().len(), 1);
    }

    #[test]
    fn test_parse_rejects_bad_numbers() {
        let xml = r#"<kwslist><detected_kwlist kwid="KW-1"><kw file="f" tbeg="x" dur="1" score="0.5"/></detected_kwlist></kwslist>"#;
        let err = parse_kwslist(xml, &kwlist(), ReadOptions::default()).unwrap_err();
        assert!(format!("{:#}", err).contains("Invalid tbeg value 'x'"));
    }

    #[test]
    fn test_parse_rejects_missing_attribute() {
        let xml = r#"<kwslist><detected_kwlist kwid="KW-1"><kw tbeg="0" dur="1" score="0.5"/></detected_kwlist></kwslist>"#;
        assert!(parse_kwslist(xml, &kwlist(), ReadOptions::default()).is_err());
    }

    #[test]
    fn test_write_contains_every_keyword() {
        let mut list = DetectionList::new(&kwlist());
        list.language = "zulu".into();
        let mut det = Detection::new("BABEL_A", 0.25, 1.25, 0.5);
        det.decision = Some(true);
        list.push("KW-1", det);

        let xml = to_xml_string(&list, false).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains(r#"language="zulu""#));
        assert!(xml.contains(r#"<detected_kwlist kwid="KW-2" search_time="1" oov_count="0"/>"#));
        assert!(xml.contains(
            r#"<kw file="BABEL_A" channel="1" tbeg="0.25" dur="1.00" score="0.500000" decision="YES"/>"#
        ));
    }

    #[test]
    fn test_normalized_write_maps_threshold_to_half() {
        let mut list = DetectionList::new(&kwlist());
        list.push("KW-1", Detection::new("f", 0.0, 1.0, 0.2));
        list.entry_mut("KW-1").unwrap().threshold = Some(0.2);

        let raw = to_xml_string(&list, false).unwrap();
        let norm = to_xml_string(&list, true).unwrap();
        assert!(raw.contains(r#"score="0.200000""#));
        assert!(norm.contains(r#"score="0.500000""#));
    }

    #[test]
    fn test_written_list_reads_back() {
        let mut list = DetectionList::new(&kwlist());
        list.kwlist_filename = "dev.kwlist.xml".into();
        list.push("KW-2", Detection::new("f&g", 3.5, 4.25, 0.125));
        let xml = to_xml_string(&list, false).unwrap();
        let back = parse_kwslist(&xml, &kwlist(), ReadOptions::default()).unwrap();
        assert_eq!(back.kwlist_filename, "dev.kwlist.xml");
        let det = &back.get("KW-2").unwrap()[0];
        assert_eq!(det.filename, "f&g");
        assert_eq!(det.start_time, 3.5);
        assert_eq!(det.score, 0.125);
    }
}
