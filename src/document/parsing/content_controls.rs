//! Content-control (structured document tag) extraction

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use super::form_fields::as_boolean;
use crate::document::models::*;
use crate::error::{ExtractError, Result};

const SDT: &str = "sdt";
const SDT_PROPERTIES: &str = "sdtPr";
const SDT_CONTENT: &str = "sdtContent";
const TAG: &str = "tag";
const DATE: &str = "date";
const CHECKBOX: &str = "checkbox";
const CHECKED: &str = "checked";
const TEXT: &str = "t";

/// Extract one response per content control, in document order
///
/// The response is named by the control's `tag` (or [`NO_TAG`]) and typed by
/// the first marker found in its properties: `date`, then `checkbox`. Text,
/// combo box, drop-down and untyped controls all yield their content text.
pub fn extract_content_controls(document: &SimplifiedNode) -> Result<Questionnaire> {
    let file_name = document.attributes.file_name.as_deref();
    let mut questionnaire = Questionnaire::new(file_name);

    for sdt in document.descendants_named(SDT) {
        let field = extract_content(sdt.child(SDT_PROPERTIES), sdt.child(SDT_CONTENT), file_name)?;
        questionnaire.fields.push(field);
    }

    Ok(questionnaire)
}

fn extract_content(
    properties: Option<&SimplifiedNode>,
    content: Option<&SimplifiedNode>,
    file_name: Option<&str>,
) -> Result<ResponseField> {
    let text = content.map(|c| c.text_of(TEXT)).unwrap_or_default();

    let Some(properties) = properties else {
        return Ok(ResponseField::new(NO_TAG, FieldValue::Text(text)));
    };

    let name = properties
        .child(TAG)
        .and_then(SimplifiedNode::value)
        .unwrap_or(NO_TAG);

    let value = if let Some(date) = properties.child(DATE) {
        match full_date(properties, date) {
            Some(raw) => FieldValue::Date(parse_full_date(raw).ok_or_else(|| {
                ExtractError::malformed(
                    file_name,
                    format!("content control '{name}' has an invalid date '{raw}'"),
                )
            })?),
            // Date picker never filled in
            None => FieldValue::Text(text),
        }
    } else if properties.has_child(CHECKBOX) {
        let checked = properties
            .descendants_named(CHECKED)
            .next()
            .is_some_and(|marker| as_boolean(marker.value().unwrap_or_default(), true));
        FieldValue::Boolean(checked)
    } else {
        FieldValue::Text(text)
    };

    Ok(ResponseField::new(name, value))
}

fn full_date<'a>(properties: &'a SimplifiedNode, date: &'a SimplifiedNode) -> Option<&'a str> {
    properties
        .attributes
        .full_date
        .as_deref()
        .or(date.attributes.full_date.as_deref())
}

/// Parse an OOXML `fullDate`, e.g. `2017-03-14T00:00:00Z`
pub fn parse_full_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .map(|date| date.naive_utc())
        .ok()
        .or_else(|| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S").ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}
