use quick_xml::events::BytesStart;
use quick_xml::encoding::Decoder;

use super::ParseError;
use crate::model::{Attributes, Score};

/// Collect all attributes of an element, unescaped, in document order
pub(super) fn collect_attributes(e: &BytesStart, decoder: Decoder) -> Result<Attributes, ParseError> {
    let mut attrs = Attributes::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|e| ParseError::XmlError(quick_xml::Error::from(e)))?;
        let key = std::str::from_utf8(attr.key.as_ref())?.to_string();
        let value = attr.decode_and_unescape_value(decoder)?.into_owned();
        attrs.push(key, value);
    }
    Ok(attrs)
}

/// Remove a required attribute from the list
pub(super) fn take_required(
    attrs: &mut Attributes,
    element: &'static str,
    attribute: &'static str,
) -> Result<String, ParseError> {
    attrs
        .remove(attribute)
        .ok_or(ParseError::MissingAttribute { element, attribute })
}

/// Parse a `<score id=".." value=".."/>` element
pub(super) fn parse_score(e: &BytesStart, decoder: Decoder) -> Result<Score, ParseError> {
    let mut attrs = collect_attributes(e, decoder)?;
    let id = take_required(&mut attrs, "score", "id")?;
    let raw_value = take_required(&mut attrs, "score", "value")?;
    let value = match raw_value.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => {
            return Err(ParseError::MalformedScore {
                score_id: id,
                value: raw_value,
            })
        }
    };
    Ok(Score { id, value, raw_value })
}
