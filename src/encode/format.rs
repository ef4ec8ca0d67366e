//! Text formatting of numbers and arrays.
//!
//! Numbers are always written with `.` as the decimal separator and without
//! exponent notation, regardless of the process locale.

use std::borrow::Cow;
use std::fmt::{self, Write};

use crate::core::shared::Vector3;

/// Displays an `f32` the way the document grammar expects it.
///
/// The output is the shortest decimal that parses back to the same value.
/// Negative zero is written as `0`, and so are non-finite values (with a warning).
#[derive(Clone, Copy, Debug)]
pub struct FbxFloat(pub f32);

impl fmt::Display for FbxFloat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = self.0;
        if !v.is_finite() {
            log::warn!("Non-finite value {} cannot be represented and is written as 0.", v);
            return f.write_str("0");
        }
        if v == 0.0 {
            return f.write_str("0");
        }
        write!(f, "{}", v)
    }
}

pub fn format_float(value: f32) -> String {
    FbxFloat(value).to_string()
}

/// Writes `values` separated by commas.
pub fn write_floats<I>(out: &mut String, values: I) -> fmt::Result
    where I: IntoIterator<Item = f32>
{
    for (i, v) in values.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write!(out, "{}", FbxFloat(v))?;
    }
    Ok(())
}

/// Writes `values` separated by commas.
pub fn write_ints<I>(out: &mut String, values: I) -> fmt::Result
    where I: IntoIterator<Item = i64>
{
    for (i, v) in values.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write!(out, "{}", v)?;
    }
    Ok(())
}

/// Writes `x,y,z`.
pub fn write_vec3(out: &mut String, v: Vector3) -> fmt::Result {
    write_floats(out, [v.x, v.y, v.z])
}

/// Names are written inside double quotes, which the grammar cannot escape.
/// Quotes inside the name are replaced by single quotes.
pub fn quote_safe(name: &str) -> Cow<'_, str> {
    if name.contains('"') {
        Cow::Owned(name.replace('"', "'"))
    } else {
        Cow::Borrowed(name)
    }
}
