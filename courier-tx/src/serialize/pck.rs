//! PCK fixed-width data file
//!
//! Layout: one literal header line, one form-header line
//! `{instrument}:{ru_ref}{check}:{period}`, then one line per derived
//! value as a 4-digit zero-padded code, a space, and an 11-character
//! zero-padded value. The legacy consumer reads these byte-for-byte.

use crate::rules::TypedValue;
use crate::transform::DerivedValues;
use courier_common::Identifiers;

/// Literal first line: "FV" padded with ten spaces.
const HEADER: &str = "FV          ";

const VALUE_WIDTH: usize = 11;

/// Serialized line set, in emit order.
pub fn lines(values: &DerivedValues, identifiers: &Identifiers) -> Vec<String> {
    let mut out = Vec::with_capacity(values.len() + 2);
    out.push(HEADER.to_string());
    out.push(form_header(identifiers));
    for (code, value) in values.iter() {
        out.push(data_line(code, value));
    }
    out
}

/// Full file content with a trailing newline.
pub fn render(values: &DerivedValues, identifiers: &Identifiers) -> String {
    let mut text = lines(values, identifiers).join("\n");
    text.push('\n');
    text
}

fn form_header(identifiers: &Identifiers) -> String {
    format!(
        "{}:{}{}:{}",
        identifiers.instrument_id, identifiers.ru_ref, identifiers.ru_check, identifiers.period
    )
}

/// One data line. A non-numeric code or un-encodable value renders as the
/// raw code followed by eleven `?`, never an error.
fn data_line(code: &str, value: &TypedValue) -> String {
    let encoded = match code.parse::<u32>() {
        Ok(numeric) => encode(value).map(|text| (format!("{:04}", numeric), text)),
        Err(_) => None,
    };
    match encoded {
        Some((code, value)) => format!("{} {}", code, value),
        None => format!("{} {}", code, "?".repeat(VALUE_WIDTH)),
    }
}

/// Value encoding:
/// - boolean: 1 (true) or 2 (false)
/// - string: 1 when non-empty, 0 when empty
/// - date sequence: boolean-cast per above
/// - scalar date: `ddmmyy` as an integer
/// - integers and decimals: zero-padded numeric literal
fn encode(value: &TypedValue) -> Option<String> {
    let text = match value {
        TypedValue::Bool(true) => format!("{:0width$}", 1, width = VALUE_WIDTH),
        TypedValue::Bool(false) => format!("{:0width$}", 2, width = VALUE_WIDTH),
        TypedValue::Text(t) => {
            format!("{:0width$}", u8::from(!t.is_empty()), width = VALUE_WIDTH)
        }
        TypedValue::Dates(ds) => {
            format!("{:0width$}", u8::from(!ds.is_empty()), width = VALUE_WIDTH)
        }
        TypedValue::Date(d) => {
            let ddmmyy: u32 = d.format("%d%m%y").to_string().parse().ok()?;
            format!("{:0width$}", ddmmyy, width = VALUE_WIDTH)
        }
        TypedValue::Int(i) => format!("{:0width$}", i, width = VALUE_WIDTH),
        TypedValue::Decimal(d) => format!("{:0>width$}", d.to_string(), width = VALUE_WIDTH),
    };
    Some(text)
}
