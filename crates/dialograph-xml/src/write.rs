//! Render a [`ScenarioDocument`] as XML.

use std::io::Write;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::document::{DocumentState, ScenarioDocument};
use crate::error::Result;
use crate::tags::*;

pub fn write_document(doc: &ScenarioDocument) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let id = doc.info.id.to_string();
    let mut root = BytesStart::new(EL_SCENARIO);
    root.push_attribute((ATTR_ID, id.as_str()));
    root.push_attribute((ATTR_NAME, doc.info.name.as_str()));
    root.push_attribute((ATTR_DESCRIPTION, doc.info.description.as_str()));
    writer.write_event(Event::Start(root))?;

    open(&mut writer, EL_VECTORS)?;
    for vector in &doc.vectors {
        let mut el = BytesStart::new(EL_VECTOR);
        el.push_attribute((ATTR_NAME, vector.name().as_str()));
        el.push_attribute((ATTR_TYPE, vector.type_tag()));
        let synonyms = vector.as_levenshtein().map(|v| v.synonyms()).unwrap_or(&[]);
        if synonyms.is_empty() {
            writer.write_event(Event::Empty(el))?;
            continue;
        }
        writer.write_event(Event::Start(el))?;
        for synonym in synonyms {
            text_element(&mut writer, EL_SYNONYM, synonym)?;
        }
        close(&mut writer, EL_VECTOR)?;
    }
    close(&mut writer, EL_VECTORS)?;

    open(&mut writer, EL_STATES)?;
    for state in &doc.states {
        write_state(&mut writer, state)?;
    }
    close(&mut writer, EL_STATES)?;

    open(&mut writer, EL_ENTRIES)?;
    for entry in &doc.entries {
        let state = entry.state.to_string();
        let mut el = BytesStart::new(EL_ENTRY);
        el.push_attribute((ATTR_STATE, state.as_str()));
        el.push_attribute((ATTR_VECTOR, entry.vector.as_str()));
        writer.write_event(Event::Empty(el))?;
    }
    close(&mut writer, EL_ENTRIES)?;

    open(&mut writer, EL_TRANSITIONS)?;
    for transition in &doc.transitions {
        let from = transition.from.to_string();
        let mut el = BytesStart::new(EL_TRANSITION);
        el.push_attribute((ATTR_FROM, from.as_str()));
        writer.write_event(Event::Start(el))?;
        for step in &transition.steps {
            let to = step.to.to_string();
            let mut el = BytesStart::new(EL_STEP);
            el.push_attribute((ATTR_TO, to.as_str()));
            el.push_attribute((ATTR_VECTOR, step.vector.as_str()));
            writer.write_event(Event::Empty(el))?;
        }
        close(&mut writer, EL_TRANSITION)?;
    }
    close(&mut writer, EL_TRANSITIONS)?;

    close(&mut writer, EL_SCENARIO)?;
    Ok(String::from_utf8(writer.into_inner())?)
}

fn write_state<W: Write>(writer: &mut Writer<W>, state: &DocumentState) -> Result<()> {
    let id = state.id.to_string();
    let mut el = BytesStart::new(EL_STATE);
    el.push_attribute((ATTR_ID, id.as_str()));
    el.push_attribute((ATTR_NAME, state.name.as_str()));
    el.push_attribute((ATTR_REQUIRED, if state.required { YES } else { NO }));
    writer.write_event(Event::Start(el))?;
    text_element(writer, EL_DESCRIPTION, state.description.as_str())?;
    text_element(writer, EL_CONTENT, state.output.as_str())?;
    close(writer, EL_STATE)
}

fn open<W: Write>(writer: &mut Writer<W>, name: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    Ok(())
}

fn close<W: Write>(writer: &mut Writer<W>, name: &str) -> Result<()> {
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// `<name>text</name>`, or `<name/>` for empty text.
fn text_element<W: Write>(writer: &mut Writer<W>, name: &str, text: &str) -> Result<()> {
    if text.is_empty() {
        writer.write_event(Event::Empty(BytesStart::new(name)))?;
        return Ok(());
    }
    open(writer, name)?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    close(writer, name)
}
