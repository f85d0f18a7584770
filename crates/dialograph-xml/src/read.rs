//! Parse XML into a [`ScenarioDocument`].
//!
//! The input is first loaded into a small element tree, then walked section
//! by section. Unknown elements are skipped with a warning so documents
//! written by newer tools still load.

use dialograph_core::{InputDescription, LevenshteinVector, Name, ScenarioId, ScenarioInfo, StateId};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::document::{
    DocumentEntry, DocumentState, DocumentStep, DocumentTransition, ScenarioDocument,
};
use crate::error::{DocumentError, Result};
use crate::tags::*;

// ============================================================================
// Element tree
// ============================================================================

#[derive(Debug, Default)]
pub(crate) struct Element {
    name: String,
    attrs: Vec<(String, String)>,
    children: Vec<Element>,
    text: String,
}

impl Element {
    fn from_start(start: &BytesStart<'_>) -> Result<Self> {
        let name = std::str::from_utf8(start.name().as_ref())?.to_string();
        let mut attrs = Vec::new();
        for attr in start.attributes() {
            let attr = attr?;
            let key = std::str::from_utf8(attr.key.as_ref())?.to_string();
            let value = attr.unescape_value()?.into_owned();
            attrs.push((key, value));
        }
        Ok(Self {
            name,
            attrs,
            ..Self::default()
        })
    }

    fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn required_attr(&self, key: &str) -> Result<&str> {
        self.attr(key).ok_or_else(|| {
            DocumentError::Malformed(format!("<{}> is missing attribute `{key}`", self.name))
        })
    }

    fn child_text(&self, name: &str) -> &str {
        self.children
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.text.as_str())
            .unwrap_or("")
    }
}

pub(crate) fn parse_tree(xml: &str) -> Result<Element> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root = None;
    loop {
        match reader.read_event()? {
            Event::Start(start) => stack.push(Element::from_start(&start)?),
            Event::Empty(start) => {
                let element = Element::from_start(&start)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| DocumentError::Malformed("unbalanced closing tag".into()))?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&text.unescape()?);
                }
            }
            Event::CData(data) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(std::str::from_utf8(&data)?);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(DocumentError::Malformed(format!("<{}> is never closed", open.name)));
    }
    root.ok_or_else(|| DocumentError::Malformed("document has no root element".into()))
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => {
            return Err(DocumentError::Malformed(format!(
                "second root element <{}>",
                element.name
            )))
        }
    }
    Ok(())
}

// ============================================================================
// Sections
// ============================================================================

pub fn read_document(xml: &str) -> Result<ScenarioDocument> {
    let root = parse_tree(xml)?;
    if root.name != EL_SCENARIO {
        return Err(DocumentError::Malformed(format!(
            "expected <{EL_SCENARIO}> root, found <{}>",
            root.name
        )));
    }

    let id = match root.attr(ATTR_ID) {
        Some(raw) => raw.parse::<ScenarioId>()?,
        None => ScenarioId::default(),
    };
    let mut doc = ScenarioDocument {
        info: ScenarioInfo::new(id, root.attr(ATTR_NAME).unwrap_or(""))
            .with_description(root.attr(ATTR_DESCRIPTION).unwrap_or("")),
        ..ScenarioDocument::default()
    };

    for section in &root.children {
        match section.name.as_str() {
            EL_VECTORS => {
                for el in children_named(section, EL_VECTOR) {
                    doc.vectors.push(read_vector(el)?);
                }
            }
            EL_STATES => {
                for el in children_named(section, EL_STATE) {
                    doc.states.push(read_state(el)?);
                }
            }
            EL_ENTRIES => {
                for el in children_named(section, EL_ENTRY) {
                    doc.entries.push(DocumentEntry {
                        state: el.required_attr(ATTR_STATE)?.parse::<StateId>()?,
                        vector: Name::new(el.required_attr(ATTR_VECTOR)?)?,
                    });
                }
            }
            EL_TRANSITIONS => {
                for el in children_named(section, EL_TRANSITION) {
                    doc.transitions.push(read_transition(el)?);
                }
            }
            other => tracing::warn!(element = %other, "skipping unknown scenario section"),
        }
    }
    Ok(doc)
}

/// Children of `parent` called `name`; anything else is logged and skipped.
fn children_named<'a>(parent: &'a Element, name: &'a str) -> impl Iterator<Item = &'a Element> {
    parent.children.iter().filter(move |c| {
        if c.name == name {
            return true;
        }
        tracing::warn!(parent = %parent.name, element = %c.name, "skipping unknown element");
        false
    })
}

fn read_vector(el: &Element) -> Result<InputDescription> {
    let name = Name::new(el.required_attr(ATTR_NAME)?)?;
    let kind = el.attr(ATTR_TYPE).unwrap_or(TYPE_LEVENSHTEIN);
    if kind != TYPE_LEVENSHTEIN {
        return Err(DocumentError::UnsupportedVector(kind.to_string()));
    }
    let mut vector = LevenshteinVector::new(name);
    for synonym in children_named(el, EL_SYNONYM) {
        vector.add_synonym(synonym.text.as_str())?;
    }
    Ok(vector.into())
}

fn read_state(el: &Element) -> Result<DocumentState> {
    Ok(DocumentState {
        id: el.required_attr(ATTR_ID)?.parse::<StateId>()?,
        name: Name::new(el.required_attr(ATTR_NAME)?)?,
        description: el.child_text(EL_DESCRIPTION).into(),
        output: el.child_text(EL_CONTENT).into(),
        required: match el.attr(ATTR_REQUIRED) {
            Some(raw) => parse_flag(raw)?,
            None => false,
        },
    })
}

fn read_transition(el: &Element) -> Result<DocumentTransition> {
    let from = el.required_attr(ATTR_FROM)?.parse::<StateId>()?;
    let steps = children_named(el, EL_STEP)
        .map(|step| -> Result<DocumentStep> {
            Ok(DocumentStep {
                to: step.required_attr(ATTR_TO)?.parse::<StateId>()?,
                vector: Name::new(step.required_attr(ATTR_VECTOR)?)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(DocumentTransition { from, steps })
}

fn parse_flag(raw: &str) -> Result<bool> {
    match raw.trim() {
        YES | "true" | "1" => Ok(true),
        NO | "false" | "0" => Ok(false),
        other => Err(DocumentError::Malformed(format!(
            "`{other}` is not a valid `{ATTR_REQUIRED}` flag"
        ))),
    }
}
