//! Inline markup parsing.
//!
//! Accepts XHTML-like inline fragments (`Some <em>emphasised</em> text`) and
//! builds an [`Inline`] tree. Only structure is kept; styling is resolved later
//! from tag names by the segmenter.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::JustifyError;
use crate::unit::Inline;

struct Frame {
    tag: String,
    attributes: Vec<(String, String)>,
    children: Vec<Inline>,
}

/// Parse an inline fragment into a tree of text runs and elements.
///
/// The fragment may hold several top-level nodes. Entities are unescaped
/// (XML predefined, numeric, and the common typographic HTML names).
pub fn parse_inline(fragment: &str) -> Result<Vec<Inline>, JustifyError> {
    let mut reader = Reader::from_reader(fragment.as_bytes());
    reader.config_mut().trim_text(false);
    let mut buf = Vec::with_capacity(64);
    let mut entity_buf = String::with_capacity(16);
    let mut root: Vec<Inline> = Vec::with_capacity(8);
    let mut stack: Vec<Frame> = Vec::with_capacity(8);

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let frame = frame_from_start(&reader, &e)?;
                stack.push(frame);
            }
            Ok(Event::Empty(e)) => {
                let frame = frame_from_start(&reader, &e)?;
                let node = Inline::Element {
                    tag: frame.tag,
                    attributes: frame.attributes,
                    children: Vec::new(),
                };
                current_children(&mut root, &mut stack).push(node);
            }
            Ok(Event::End(e)) => {
                let tag = decode_tag_name(&reader, e.name().as_ref())?;
                let Some(frame) = stack.pop() else {
                    return Err(markup_error(
                        &reader,
                        format!("unexpected closing tag </{}>", tag),
                    ));
                };
                if frame.tag != tag {
                    return Err(markup_error(
                        &reader,
                        format!("expected </{}>, found </{}>", frame.tag, tag),
                    ));
                }
                let node = Inline::Element {
                    tag: frame.tag,
                    attributes: frame.attributes,
                    children: frame.children,
                };
                current_children(&mut root, &mut stack).push(node);
            }
            Ok(Event::Text(e)) => {
                let text = e
                    .decode()
                    .map_err(|err| markup_error(&reader, format!("decode error: {:?}", err)))?;
                push_text(current_children(&mut root, &mut stack), text.as_ref());
            }
            Ok(Event::CData(e)) => {
                let text = reader
                    .decoder()
                    .decode(&e)
                    .map_err(|err| markup_error(&reader, format!("decode error: {:?}", err)))?;
                push_text(current_children(&mut root, &mut stack), text.as_ref());
            }
            Ok(Event::GeneralRef(e)) => {
                let name = e
                    .decode()
                    .map_err(|err| markup_error(&reader, format!("decode error: {:?}", err)))?;
                entity_buf.clear();
                entity_buf.push('&');
                entity_buf.push_str(name.as_ref());
                entity_buf.push(';');
                let resolved = match quick_xml::escape::unescape(&entity_buf) {
                    Ok(text) => text.into_owned(),
                    Err(_) => match html_entity(name.as_ref()) {
                        Some(ch) => ch.to_string(),
                        None => {
                            return Err(markup_error(
                                &reader,
                                format!("unknown entity &{};", name),
                            ))
                        }
                    },
                };
                push_text(current_children(&mut root, &mut stack), &resolved);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => {
                return Err(markup_error(&reader, format!("XML error: {:?}", err)));
            }
        }
        buf.clear();
    }

    if let Some(frame) = stack.last() {
        return Err(markup_error(
            &reader,
            format!("unclosed element <{}>", frame.tag),
        ));
    }
    Ok(root)
}

fn current_children<'a>(root: &'a mut Vec<Inline>, stack: &'a mut [Frame]) -> &'a mut Vec<Inline> {
    match stack.last_mut() {
        Some(frame) => &mut frame.children,
        None => root,
    }
}

// Entities arrive as separate events; merge them into the neighbouring run.
fn push_text(children: &mut Vec<Inline>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Inline::Text(last)) = children.last_mut() {
        last.push_str(text);
    } else {
        children.push(Inline::Text(text.to_string()));
    }
}

fn frame_from_start(reader: &Reader<&[u8]>, e: &BytesStart<'_>) -> Result<Frame, JustifyError> {
    let tag = decode_tag_name(reader, e.name().as_ref())?;
    let mut attributes = Vec::with_capacity(2);
    for attr in e.attributes().flatten() {
        let key = match reader.decoder().decode(attr.key.as_ref()) {
            Ok(v) => v.to_ascii_lowercase(),
            Err(_) => continue,
        };
        let value = match reader.decoder().decode(&attr.value) {
            Ok(v) => v.to_string(),
            Err(_) => continue,
        };
        attributes.push((key, value));
    }
    Ok(Frame {
        tag,
        attributes,
        children: Vec::with_capacity(4),
    })
}

fn decode_tag_name(reader: &Reader<&[u8]>, raw: &[u8]) -> Result<String, JustifyError> {
    let decoded = reader
        .decoder()
        .decode(raw)
        .map_err(|err| markup_error(reader, format!("decode error: {:?}", err)))?;
    let local_name = decoded.rsplit(':').next().unwrap_or(decoded.as_ref());
    Ok(local_name.to_ascii_lowercase())
}

fn markup_error(reader: &Reader<&[u8]>, message: String) -> JustifyError {
    JustifyError::Markup {
        offset: usize::try_from(reader.buffer_position()).unwrap_or(usize::MAX),
        message: message.into_boxed_str(),
    }
}

fn html_entity(name: &str) -> Option<char> {
    Some(match name {
        "nbsp" => '\u{00A0}',
        "shy" => '\u{00AD}',
        "ndash" => '\u{2013}',
        "mdash" => '\u{2014}',
        "lsquo" => '\u{2018}',
        "rsquo" => '\u{2019}',
        "ldquo" => '\u{201C}',
        "rdquo" => '\u{201D}',
        "laquo" => '\u{00AB}',
        "raquo" => '\u{00BB}',
        "hellip" => '\u{2026}',
        "thinsp" => '\u{2009}',
        _ => return None,
    })
}
