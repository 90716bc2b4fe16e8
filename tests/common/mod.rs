//! Builds small .docx packages for integration tests

#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;

const NAMESPACES: &str = concat!(
    r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" "#,
    r#"xmlns:w14="http://schemas.microsoft.com/office/word/2010/wordml""#,
);

/// Wrap body markup in a complete main document part
pub fn document_xml(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document {NAMESPACES}><w:body>{body}<w:sectPr><w:pgSz w:w="12240" w:h="15840"/></w:sectPr></w:body></w:document>"#
    )
}

/// Write a package holding only the given parts
pub fn write_package(path: &Path, parts: &[(&str, &str)]) -> PathBuf {
    let file = File::create(path).expect("create package");
    let mut zip = zip::ZipWriter::new(file);
    for (name, content) in parts {
        zip.start_file(*name, SimpleFileOptions::default())
            .expect("start part");
        zip.write_all(content.as_bytes()).expect("write part");
    }
    zip.finish().expect("finish package");
    path.to_path_buf()
}

/// Write `<dir>/<name>` as a .docx whose body is `body`
pub fn write_docx(dir: &Path, name: &str, body: &str) -> PathBuf {
    let xml = document_xml(body);
    write_package(&dir.join(name), &[("word/document.xml", xml.as_str())])
}

/// A text form field in its own paragraph
pub fn text_form_field(name: &str, answer: &str) -> String {
    format!(
        concat!(
            r#"<w:p><w:r><w:t xml:space="preserve">{name}: </w:t></w:r>"#,
            r#"<w:r><w:fldChar w:fldCharType="begin"><w:ffData><w:name w:val="{name}"/><w:enabled/>"#,
            r#"<w:calcOnExit w:val="0"/><w:textInput/></w:ffData></w:fldChar></w:r>"#,
            r#"<w:r><w:instrText xml:space="preserve"> FORMTEXT </w:instrText></w:r>"#,
            r#"<w:r><w:fldChar w:fldCharType="separate"/></w:r>"#,
            r#"<w:r><w:rPr><w:noProof/></w:rPr><w:t>{answer}</w:t></w:r>"#,
            r#"<w:r><w:fldChar w:fldCharType="end"/></w:r></w:p>"#,
        ),
        name = name,
        answer = answer,
    )
}

/// A checkbox form field in its own paragraph
pub fn checkbox_form_field(name: &str, markers: &str) -> String {
    format!(
        concat!(
            r#"<w:p><w:r><w:fldChar w:fldCharType="begin"><w:ffData><w:name w:val="{name}"/>"#,
            r#"<w:enabled/><w:calcOnExit w:val="0"/><w:checkBox><w:sizeAuto/>{markers}</w:checkBox>"#,
            r#"</w:ffData></w:fldChar></w:r>"#,
            r#"<w:r><w:instrText xml:space="preserve"> FORMCHECKBOX </w:instrText></w:r>"#,
            r#"<w:r><w:fldChar w:fldCharType="end"/></w:r><w:r><w:t xml:space="preserve"> I agree</w:t></w:r></w:p>"#,
        ),
        name = name,
        markers = markers,
    )
}

/// A block-level content control
pub fn content_control(properties: &str, content: &str) -> String {
    format!(
        r#"<w:sdt><w:sdtPr>{properties}</w:sdtPr><w:sdtContent><w:p><w:r><w:t>{content}</w:t></w:r></w:p></w:sdtContent></w:sdt>"#
    )
}
