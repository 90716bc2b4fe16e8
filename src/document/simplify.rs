//! OpenXML simplification
//!
//! Strips namespaces and attributes from a raw document tree. This is the only
//! step that looks at qualified names; everything downstream matches on local
//! names.

use crate::error::{ExtractError, Result};

use super::models::*;

const VAL: &str = "val";
const FLD_CHAR_TYPE: &str = "fldCharType";
const FULL_DATE: &str = "fullDate";

/// Simplify a raw document tree
///
/// Branches keep their children in order. Leaves take the namespaced `val`
/// attribute as their value, falling back to their own text. Only `fileName`,
/// `fldCharType` and `fullDate` survive as attributes.
pub fn simplify(element: &RawNode) -> Result<SimplifiedNode> {
    if element.name.local.is_empty() {
        return Err(ExtractError::InvalidInput(
            "cannot simplify an element without a name".to_string(),
        ));
    }

    let content = if element.children.is_empty() {
        let value = element
            .namespaced_attribute(VAL)
            .unwrap_or(element.text.as_str());
        NodeContent::Leaf(value.to_string())
    } else {
        NodeContent::Branch(
            element
                .children
                .iter()
                .map(simplify)
                .collect::<Result<Vec<_>>>()?,
        )
    };

    let attributes = PreservedAttributes {
        file_name: element.plain_attribute(FILE_NAME).map(str::to_string),
        fld_char_type: element.namespaced_attribute(FLD_CHAR_TYPE).map(str::to_string),
        full_date: element.namespaced_attribute(FULL_DATE).map(str::to_string),
    };

    Ok(SimplifiedNode {
        name: element.name.local.clone(),
        content,
        attributes,
    })
}
