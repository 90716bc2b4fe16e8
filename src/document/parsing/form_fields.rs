//! Legacy form-field extraction
//!
//! Form fields are delimited by `fldChar` runs whose `fldCharType` is `begin`
//! or `end`. The run carrying `begin` also carries the `ffData` block that
//! names the field; result text and checkbox state follow in sibling runs.

use crate::document::models::*;
use crate::error::{ExtractError, Result};

const PARAGRAPH: &str = "p";
const TEXT: &str = "t";
const FIELD_CHAR: &str = "fldChar";
const FORM_FIELD_DATA: &str = "ffData";
const NAME: &str = "name";
const CHECK_BOX: &str = "checkBox";
const CHECKED: &str = "checked";
const DEFAULT: &str = "default";
const FIELD_BEGIN: &str = "begin";
const FIELD_END: &str = "end";

/// Separator between text segments of one field
pub const LINE_BREAK: &str = "\r\n";

/// Scanning state carried across the runs of qualifying paragraphs
#[derive(Debug, Default)]
struct FieldState {
    in_field: bool,
    first_segment: bool,
}

/// The field currently receiving text and checkbox values
#[derive(Debug)]
struct FieldAccumulator {
    name: String,
    text: String,
    checkboxes: Vec<bool>,
    /// An end marker has been seen since the field began
    ended: bool,
}

impl FieldAccumulator {
    fn new(name: String) -> Self {
        Self {
            name,
            text: String::new(),
            checkboxes: Vec::new(),
            ended: false,
        }
    }

    fn append_text(&mut self, text: &str, first_segment: bool) {
        if !first_segment {
            self.text.push_str(LINE_BREAK);
        }
        self.text.push_str(text);
    }

    /// Trim surrounding line breaks and quote multi-line answers so they stay
    /// in a single delimited cell
    fn close(&mut self) {
        if !self.checkboxes.is_empty() {
            return;
        }

        let trimmed = self.text.trim_matches(['\r', '\n']);
        if trimmed.len() != self.text.len() {
            self.text = trimmed.to_string();
        }

        if self.text.contains(['\r', '\n'])
            && !self.text.starts_with('"')
            && !self.text.ends_with('"')
        {
            self.text = format!("\"{}\"", self.text);
        }
    }

    fn finish(mut self) -> ResponseField {
        if self.ended {
            self.close();
        }

        let value = if self.checkboxes.is_empty() {
            FieldValue::Text(self.text)
        } else if !self.text.is_empty() {
            let mut text = self.text;
            for flag in &self.checkboxes {
                text.push_str(&flag.to_string());
            }
            FieldValue::Text(text)
        } else if let [single] = self.checkboxes.as_slice() {
            FieldValue::Boolean(*single)
        } else {
            FieldValue::Checkboxes(self.checkboxes)
        };
        ResponseField::new(self.name, value)
    }
}

/// Extract one response per legacy form field
///
/// Only paragraphs containing an `ffData` block are scanned. Field state
/// carries across those paragraphs, so a field whose result spans several
/// qualifying paragraphs collects every segment, separated by [`LINE_BREAK`].
/// A `begin` without a matching `end` is closed when the next field begins or
/// the document ends, keeping its value untrimmed. A child that wraps a
/// complete field (a tracked insertion, smart tag or hyperlink) contributes
/// its name, text and checkboxes and leaves the field closed.
pub fn extract_form_fields(document: &SimplifiedNode) -> Result<Questionnaire> {
    let file_name = document.attributes.file_name.as_deref();
    let mut questionnaire = Questionnaire::new(file_name);
    let mut state = FieldState::default();
    let mut current: Option<FieldAccumulator> = None;

    let paragraphs = document
        .descendants_named(PARAGRAPH)
        .filter(|paragraph| paragraph.has_descendant(FORM_FIELD_DATA));

    for paragraph in paragraphs {
        for data in paragraph.descendants_named(FORM_FIELD_DATA) {
            field_name(data, file_name)?;
        }

        for child in paragraph.children() {
            let mut opened = false;
            let mut closes_own_field = false;

            for kind in field_char_types(child) {
                state.first_segment = true;
                match kind {
                    FIELD_BEGIN => {
                        state.in_field = true;
                        opened = true;
                        closes_own_field = false;
                    }
                    FIELD_END => {
                        state.in_field = false;
                        if opened {
                            closes_own_field = true;
                        } else if let Some(field) = current.as_mut() {
                            field.ended = true;
                        }
                    }
                    _ => {}
                }
            }

            // A bare end marker never contributes to the field; a child
            // wrapping a whole begin..end field still does
            if !state.in_field && !opened {
                continue;
            }

            if let Some(data) = child.descendants_named(FORM_FIELD_DATA).next() {
                let name = field_name(data, file_name)?;
                if let Some(done) = current.replace(FieldAccumulator::new(name)) {
                    questionnaire.fields.push(done.finish());
                }
            }

            if has_visible_text(child) {
                if let Some(field) = current.as_mut() {
                    field.append_text(&child.text_of(TEXT), state.first_segment);
                    state.first_segment = false;
                }
            }

            for checkbox in child.descendants_named(CHECK_BOX) {
                if let Some(field) = current.as_mut() {
                    field.checkboxes.push(checkbox_value(checkbox));
                }
            }

            if closes_own_field {
                if let Some(field) = current.as_mut() {
                    field.ended = true;
                }
            }
        }

        state.first_segment = false;

        if !state.in_field {
            if let Some(field) = current.as_mut() {
                field.close();
            }
        }
    }

    if let Some(field) = current {
        questionnaire.fields.push(field.finish());
    }

    Ok(questionnaire)
}

/// Coerce a checkbox marker value to a boolean
///
/// `1`, `on`, `true` are true and `0`, `off`, `false` are false, ignoring
/// case. Anything else yields `default`.
pub fn as_boolean(value: &str, default: bool) -> bool {
    const TRUE: [&str; 3] = ["1", "on", "true"];
    const FALSE: [&str; 3] = ["0", "off", "false"];

    if TRUE.iter().any(|token| value.eq_ignore_ascii_case(token)) {
        true
    } else if FALSE.iter().any(|token| value.eq_ignore_ascii_case(token)) {
        false
    } else {
        default
    }
}

/// Every field-character type inside a child, in document order
fn field_char_types(child: &SimplifiedNode) -> impl Iterator<Item = &str> {
    child
        .descendants_named(FIELD_CHAR)
        .filter_map(|fld_char| fld_char.attributes.fld_char_type.as_deref())
}

/// Name of a form field: exactly one `name` inside its `ffData` block
fn field_name(data: &SimplifiedNode, file_name: Option<&str>) -> Result<String> {
    let mut names = data.descendants_named(NAME);
    match (names.next(), names.count()) {
        (Some(name), 0) => Ok(name.value().unwrap_or_default().to_string()),
        (None, _) => Err(ExtractError::malformed(file_name, "form field data has no name")),
        (Some(_), more) => Err(ExtractError::malformed(
            file_name,
            format!("form field data has {} names", more + 1),
        )),
    }
}

fn has_visible_text(child: &SimplifiedNode) -> bool {
    child
        .descendants_named(TEXT)
        .filter_map(SimplifiedNode::value)
        .any(|text| !text.trim().is_empty())
}

fn checkbox_value(checkbox: &SimplifiedNode) -> bool {
    if let Some(checked) = checkbox.child(CHECKED) {
        return as_boolean(checked.value().unwrap_or_default(), true);
    }
    if let Some(default) = checkbox.child(DEFAULT) {
        return as_boolean(default.value().unwrap_or_default(), false);
    }
    false
}
