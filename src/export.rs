//! Questionnaire serialization
//!
//! Writes extracted records as XML, delimited text or JSON, and produces the
//! `<directory>.xml` / `<directory>.csv` pair the batch tool leaves next to a
//! processed directory.

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::io::Cursor;
use std::path::{Path, PathBuf};

use crate::ExportFormat;
use crate::document::{FILE_NAME, QUESTIONNAIRE, Questionnaire};
use crate::error::{ExtractError, Result};

const QUESTIONNAIRES: &str = "questionnaires";
const RESPONSE: &str = "response";
const ROW_END: &str = "\r\n";

/// Serialize records in the requested format
pub fn export(records: &[Questionnaire], format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Xml => to_xml(records),
        ExportFormat::Json => to_json(records),
        delimited => Ok(to_delimited(records, delimited.delimiter().unwrap_or(","))),
    }
}

/// Records as `<questionnaires><questionnaire><fileName/>…</questionnaire></questionnaires>`
///
/// Responses become elements named after the field. Names that are not valid
/// XML element names are written as `<response name="…">`.
pub fn to_xml(records: &[Questionnaire]) -> Result<String> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

    write(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    write(&mut writer, Event::Start(BytesStart::new(QUESTIONNAIRES)))?;
    for record in records {
        write(&mut writer, Event::Start(BytesStart::new(QUESTIONNAIRE)))?;
        write_element(
            &mut writer,
            BytesStart::new(FILE_NAME),
            record.file_name.as_deref().unwrap_or(""),
        )?;
        for field in &record.fields {
            let start = if is_xml_name(&field.name) {
                BytesStart::new(field.name.as_str())
            } else {
                BytesStart::new(RESPONSE).with_attributes([("name", field.name.as_str())])
            };
            write_element(&mut writer, start, &field.value.to_string())?;
        }
        write(&mut writer, Event::End(BytesEnd::new(QUESTIONNAIRE)))?;
    }
    write(&mut writer, Event::End(BytesEnd::new(QUESTIONNAIRES)))?;

    String::from_utf8(writer.into_inner().into_inner()).map_err(ExtractError::xml)
}

fn write_element(writer: &mut Writer<Cursor<Vec<u8>>>, start: BytesStart, text: &str) -> Result<()> {
    let end = start.to_end().into_owned();
    write(writer, Event::Start(start))?;
    if !text.is_empty() {
        write(writer, Event::Text(BytesText::new(text)))?;
    }
    write(writer, Event::End(end))
}

fn write(writer: &mut Writer<Cursor<Vec<u8>>>, event: Event) -> Result<()> {
    writer.write_event(event).map_err(ExtractError::xml)
}

fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

/// Records as delimited text
///
/// The header row is `fileName` followed by the first record's field names;
/// every record is written as one row in its own field order. Cells that
/// contain the delimiter, a quote or a line break are quoted unless the
/// extractor already wrapped them: one quote at each end and none inside.
pub fn to_delimited(records: &[Questionnaire], delimiter: &str) -> String {
    let Some(first) = records.first() else {
        return String::new();
    };

    let mut output = String::new();
    let headers: Vec<String> = first
        .headers()
        .into_iter()
        .map(|header| cell(header, delimiter))
        .collect();
    output.push_str(&headers.join(delimiter));
    output.push_str(ROW_END);

    for record in records {
        let values: Vec<String> = std::iter::once(record.file_name.clone().unwrap_or_default())
            .chain(record.fields.iter().map(|field| field.value.to_string()))
            .map(|value| cell(&value, delimiter))
            .collect();
        output.push_str(&values.join(delimiter));
        output.push_str(ROW_END);
    }

    output
}

fn cell(value: &str, delimiter: &str) -> String {
    let already_quoted = value
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .is_some_and(|inner| !inner.contains('"'));
    let needs_quotes = value.contains(delimiter) || value.contains(['"', '\r', '\n']);

    if already_quoted || !needs_quotes {
        value.to_string()
    } else {
        format!("\"{}\"", value.replace('"', "\"\""))
    }
}

/// Records as a JSON array
pub fn to_json(records: &[Questionnaire]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// `<directory>.<extension>`, next to the directory itself
pub fn sibling_output_path(directory: &Path, extension: &str) -> PathBuf {
    let mut path = directory.components().as_path().as_os_str().to_owned();
    path.push(".");
    path.push(extension);
    PathBuf::from(path)
}

/// Write `<directory>.xml` and/or `<directory>.csv` for a processed directory
pub fn write_outputs(
    records: &[Questionnaire],
    directory: &Path,
    delimiter: &str,
    xml: bool,
    delimited: bool,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    if xml {
        let path = sibling_output_path(directory, "xml");
        std::fs::write(&path, to_xml(records)?)?;
        written.push(path);
    }
    if delimited {
        let path = sibling_output_path(directory, "csv");
        std::fs::write(&path, to_delimited(records, delimiter))?;
        written.push(path);
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{FieldValue, ResponseField};

    fn record(file_name: &str, fields: Vec<(&str, FieldValue)>) -> Questionnaire {
        Questionnaire {
            file_name: Some(file_name.to_string()),
            fields: fields
                .into_iter()
                .map(|(name, value)| ResponseField::new(name, value))
                .collect(),
        }
    }

    fn text(value: &str) -> FieldValue {
        FieldValue::Text(value.to_string())
    }

    #[test]
    fn test_delimited_headers_come_from_first_record() {
        let records = vec![
            record("a", vec![("Q1", text("yes")), ("Q2", FieldValue::Boolean(true))]),
            record("b", vec![("Q1", text("no")), ("Q2", FieldValue::Boolean(false)), ("Q3", text("x"))]),
        ];

        let output = to_delimited(&records, "|");
        let lines: Vec<&str> = output.split(ROW_END).collect();
        assert_eq!(lines[0], "fileName|Q1|Q2");
        assert_eq!(lines[1], "a|yes|true");
        assert_eq!(lines[2], "b|no|false|x");
    }

    #[test]
    fn test_multi_line_value_is_quoted_exactly_once() {
        let original = "Line one\r\nLine two";
        let records = vec![
            record("raw", vec![("Q4", text(original))]),
            record("quoted", vec![("Q4", text(&format!("\"{original}\"")))]),
        ];

        let output = to_delimited(&records, ",");
        for file_name in ["raw", "quoted"] {
            let prefix = format!("{file_name},");
            let start = output.find(&prefix).unwrap() + prefix.len();
            let rest = &output[start..];
            let end = rest[1..].find('"').unwrap() + 2;
            let cell = &rest[..end];

            let unwrapped = cell.strip_prefix('"').and_then(|c| c.strip_suffix('"')).unwrap();
            assert_eq!(unwrapped, original);
            assert_eq!(&rest[end..end + 2], ROW_END);
        }
    }

    #[test]
    fn test_cells_containing_delimiter_are_escaped() {
        assert_eq!(cell("a,b", ","), "\"a,b\"");
        assert_eq!(cell("a,b", "|"), "a,b");
        assert_eq!(cell("say \"hi\" now", ","), "\"say \"\"hi\"\" now\"");
    }

    #[test]
    fn test_answers_wrapped_in_user_quotes_are_escaped() {
        assert_eq!(cell("\"yes\", \"no\"", ","), "\"\"\"yes\"\", \"\"no\"\"\"");
        assert_eq!(cell("\"A\" and \"B\"", ","), "\"\"\"A\"\" and \"\"B\"\"\"");
        assert_eq!(cell("\"a,b\"", ","), "\"a,b\"");

        let records = vec![record("a", vec![("Q1", text("\"yes\", \"no\""))])];
        assert_eq!(
            to_delimited(&records, ","),
            "fileName,Q1\r\na,\"\"\"yes\"\", \"\"no\"\"\"\r\n"
        );
    }

    #[test]
    fn test_empty_batch() {
        assert_eq!(to_delimited(&[], ","), "");
        assert_eq!(to_json(&[]).unwrap(), "[]");
    }

    #[test]
    fn test_xml_output() {
        let records = vec![record(
            "survey",
            vec![("Q1", text("Fish & chips")), ("noTag", FieldValue::Boolean(true)), ("", text("?"))],
        )];

        let xml = to_xml(&records).unwrap();
        assert!(xml.contains("<questionnaire>"));
        assert!(xml.contains("<fileName>survey</fileName>"));
        assert!(xml.contains("<Q1>Fish &amp; chips</Q1>"));
        assert!(xml.contains("<noTag>true</noTag>"));
        assert!(xml.contains("<response name=\"\">?</response>"));
    }

    #[test]
    fn test_json_output() {
        let records = vec![record("survey", vec![("Q1", FieldValue::Checkboxes(vec![true, false]))])];

        let value: serde_json::Value = serde_json::from_str(&to_json(&records).unwrap()).unwrap();
        assert_eq!(value[0]["fileName"], "survey");
        assert_eq!(value[0]["fields"][0]["name"], "Q1");
        assert_eq!(value[0]["fields"][0]["value"], serde_json::json!([true, false]));
    }

    #[test]
    fn test_export_dispatches_on_format() {
        let records = vec![record("survey", vec![("Q1", text("a|b"))])];

        assert_eq!(
            export(&records, ExportFormat::Psv).unwrap(),
            "fileName|Q1\r\nsurvey|\"a|b\"\r\n"
        );
        assert_eq!(
            export(&records, ExportFormat::Tsv).unwrap(),
            "fileName\tQ1\r\nsurvey\ta|b\r\n"
        );
        assert!(export(&records, ExportFormat::Xml).unwrap().contains("<Q1>a|b</Q1>"));
        assert!(export(&records, ExportFormat::Json).unwrap().contains("\"a|b\""));
    }

    #[test]
    fn test_sibling_output_path() {
        assert_eq!(
            sibling_output_path(Path::new("data/forms/"), "csv"),
            PathBuf::from("data/forms.csv")
        );
    }
}
