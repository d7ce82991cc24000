//! Reading and writing XTB translation bundles.
//!
//! XTB is the XML format consumed by the Closure compiler:
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <!DOCTYPE translationbundle>
//! <translationbundle lang="en">
//!   <translation key="MSG_FOO_0" desc="greeting">Hello</translation>
//! </translationbundle>
//! ```
//!
//! `<ph name="X"/>` placeholders inside a record are kept in the text as
//! `{$X}` and written back as elements.

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use quick_xml::{
    Reader, Writer,
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};

use crate::core::{
    bundle::{Bundle, TranslationEntry},
    error::BundleError,
};

const ROOT_ELEMENT: &str = "translationbundle";
const RECORD_ELEMENT: &str = "translation";
const PLACEHOLDER_ELEMENT: &str = "ph";

/// Read a bundle file. A missing file is `Ok(None)`; content that is not
/// UTF-8 is an invalid bundle.
pub fn read_bundle(path: &Path) -> Result<Option<Bundle>, BundleError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    let content = String::from_utf8(bytes)
        .map_err(|err| BundleError::invalid(format!("not valid UTF-8: {}", err)))?;
    parse_xtb(&content).map(Some)
}

/// Write a bundle file through a sibling temporary file so that a failed
/// write never leaves a truncated bundle behind.
pub fn write_bundle(path: &Path, bundle: &Bundle) -> Result<(), BundleError> {
    let content = to_xtb_string(bundle)?;
    let tmp_path = scratch_path(path);
    fs::write(&tmp_path, content)?;
    if let Err(err) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(err.into());
    }
    Ok(())
}

/// `messages-en.xtb` -> `messages-en.xtb.tmp`
pub fn scratch_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

pub fn parse_xtb(content: &str) -> Result<Bundle, BundleError> {
    let mut reader = Reader::from_str(content);
    let mut bundle = Bundle::default();
    let mut in_root = false;
    let mut seen_root = false;

    loop {
        let position = reader.buffer_position() as u64;
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == ROOT_ELEMENT.as_bytes() => {
                if seen_root {
                    return Err(BundleError::malformed(
                        position,
                        "more than one <translationbundle> element",
                    ));
                }
                bundle.lang = read_attribute(&e, b"lang", position)?.unwrap_or_default();
                in_root = true;
                seen_root = true;
            }
            Event::Empty(e) if e.name().as_ref() == ROOT_ELEMENT.as_bytes() => {
                if seen_root {
                    return Err(BundleError::malformed(
                        position,
                        "more than one <translationbundle> element",
                    ));
                }
                bundle.lang = read_attribute(&e, b"lang", position)?.unwrap_or_default();
                seen_root = true;
            }
            Event::End(e) if e.name().as_ref() == ROOT_ELEMENT.as_bytes() => in_root = false,
            Event::Start(e) if e.name().as_ref() == RECORD_ELEMENT.as_bytes() => {
                ensure_in_root(in_root, position)?;
                let mut entry = read_record(&e, position)?;
                entry.text = read_record_body(&mut reader)?;
                push_entry(&mut bundle, entry)?;
            }
            Event::Empty(e) if e.name().as_ref() == RECORD_ELEMENT.as_bytes() => {
                ensure_in_root(in_root, position)?;
                let entry = read_record(&e, position)?;
                push_entry(&mut bundle, entry)?;
            }
            Event::Start(e) | Event::Empty(e) => {
                return Err(BundleError::malformed(
                    position,
                    format!(
                        "unexpected element <{}>",
                        String::from_utf8_lossy(e.name().as_ref())
                    ),
                ));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if in_root {
        return Err(BundleError::invalid("unterminated <translationbundle> element"));
    }
    if !seen_root {
        return Err(BundleError::invalid("missing <translationbundle> element"));
    }
    Ok(bundle)
}

pub fn to_xtb_string(bundle: &Bundle) -> Result<String, BundleError> {
    let mut buf = Vec::new();
    write_xtb(bundle, &mut buf)?;
    String::from_utf8(buf).map_err(|e| BundleError::invalid(e.to_string()))
}

pub fn write_xtb<W: Write>(bundle: &Bundle, writer: W) -> Result<(), BundleError> {
    let mut xml = Writer::new(writer);

    xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    xml.write_event(Event::Text(BytesText::from_escaped("\n")))?;
    xml.write_event(Event::DocType(BytesText::from_escaped(ROOT_ELEMENT)))?;
    xml.write_event(Event::Text(BytesText::from_escaped("\n")))?;

    let mut root = BytesStart::new(ROOT_ELEMENT);
    root.push_attribute(("lang", bundle.lang.as_str()));
    xml.write_event(Event::Start(root))?;

    for entry in bundle.entries() {
        xml.write_event(Event::Text(BytesText::from_escaped("\n  ")))?;

        let mut record = BytesStart::new(RECORD_ELEMENT);
        if let Some(id) = &entry.id {
            record.push_attribute(("id", id.as_str()));
        }
        record.push_attribute(("key", entry.key.as_str()));
        if let Some(source) = &entry.source {
            record.push_attribute(("source", source.as_str()));
        }
        record.push_attribute(("desc", entry.description.as_str()));
        xml.write_event(Event::Start(record))?;

        for segment in text_segments(&entry.text) {
            match segment {
                Segment::Text(text) => {
                    xml.write_event(Event::Text(BytesText::new(text)))?;
                }
                Segment::Placeholder(name) => {
                    let mut ph = BytesStart::new(PLACEHOLDER_ELEMENT);
                    ph.push_attribute(("name", name));
                    xml.write_event(Event::Empty(ph))?;
                }
            }
        }

        xml.write_event(Event::End(BytesEnd::new(RECORD_ELEMENT)))?;
    }

    xml.write_event(Event::Text(BytesText::from_escaped("\n")))?;
    xml.write_event(Event::End(BytesEnd::new(ROOT_ELEMENT)))?;
    xml.write_event(Event::Text(BytesText::from_escaped("\n")))?;
    Ok(())
}

fn ensure_in_root(in_root: bool, position: u64) -> Result<(), BundleError> {
    if in_root {
        Ok(())
    } else {
        Err(BundleError::malformed(
            position,
            "<translation> outside of <translationbundle>",
        ))
    }
}

fn push_entry(bundle: &mut Bundle, entry: TranslationEntry) -> Result<(), BundleError> {
    bundle
        .push(entry)
        .map_err(|rejected| BundleError::DuplicateKey(rejected.key))
}

fn read_attribute(
    e: &BytesStart,
    name: &[u8],
    position: u64,
) -> Result<Option<String>, BundleError> {
    for attr in e.attributes() {
        let attr = attr.map_err(|err| BundleError::malformed(position, err.to_string()))?;
        if attr.key.as_ref() == name {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

fn read_record(e: &BytesStart, position: u64) -> Result<TranslationEntry, BundleError> {
    let mut key = None;
    let mut description = None;
    let mut id = None;
    let mut source = None;

    for attr in e.attributes() {
        let attr = attr.map_err(|err| BundleError::malformed(position, err.to_string()))?;
        let value = attr.unescape_value()?.into_owned();
        match attr.key.as_ref() {
            b"key" => key = Some(value),
            b"desc" => description = Some(value),
            b"id" => id = Some(value),
            b"source" => source = Some(value),
            _ => {}
        }
    }

    let key = key.ok_or_else(|| {
        BundleError::malformed(position, "<translation> without a `key` attribute")
    })?;

    let mut entry = TranslationEntry::new(key, String::new(), description.unwrap_or_default());
    entry.id = id;
    entry.source = source;
    Ok(entry)
}

fn read_record_body(reader: &mut Reader<&[u8]>) -> Result<String, BundleError> {
    let mut text = String::new();
    let mut depth = 0usize;

    loop {
        let position = reader.buffer_position() as u64;
        match reader.read_event()? {
            Event::Text(e) => text.push_str(&e.unescape()?),
            Event::CData(e) => text.push_str(&String::from_utf8_lossy(&e)),
            Event::Empty(e) if e.name().as_ref() == PLACEHOLDER_ELEMENT.as_bytes() => {
                push_placeholder(&e, position, &mut text)?;
            }
            Event::Start(e) => {
                if e.name().as_ref() == PLACEHOLDER_ELEMENT.as_bytes() {
                    push_placeholder(&e, position, &mut text)?;
                }
                depth += 1;
            }
            Event::End(_) if depth > 0 => depth -= 1,
            Event::End(_) => return Ok(text),
            Event::Eof => {
                return Err(BundleError::malformed(
                    position,
                    "unterminated <translation> element",
                ));
            }
            _ => {}
        }
    }
}

fn push_placeholder(e: &BytesStart, position: u64, text: &mut String) -> Result<(), BundleError> {
    let name = read_attribute(e, b"name", position)?
        .ok_or_else(|| BundleError::malformed(position, "<ph> without a `name` attribute"))?;
    text.push_str("{$");
    text.push_str(&name);
    text.push('}');
    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
enum Segment<'a> {
    Text(&'a str),
    Placeholder(&'a str),
}

/// Split text into literal runs and `{$NAME}` placeholders.
fn text_segments(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut literal_start = 0;
    let mut cursor = 0;

    while let Some(found) = text[cursor..].find("{$") {
        let open = cursor + found;
        let name_start = open + 2;
        let name_len = text[name_start..]
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(text.len() - name_start);
        let name_end = name_start + name_len;

        if name_len > 0 && text[name_end..].starts_with('}') {
            if open > literal_start {
                segments.push(Segment::Text(&text[literal_start..open]));
            }
            segments.push(Segment::Placeholder(&text[name_start..name_end]));
            literal_start = name_end + 1;
            cursor = literal_start;
        } else {
            cursor = name_start;
        }
    }

    if literal_start < text.len() {
        segments.push(Segment::Text(&text[literal_start..]));
    }
    segments
}
