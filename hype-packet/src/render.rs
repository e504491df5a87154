//! Field-by-field textual rendering
//!
//! Each packet variant lists its header fields as [`Field`]s, each carrying a
//! label, a pre-formatted value and a [`Rule`] deciding how it is shown. The
//! engine joins them into `name(label=value ...)` and chains payloads with
//! ` / `, e.g. `eth(dst=ff:ff:ff:ff:ff:ff src=...) / arp(op=request ...)`.

use std::fmt::{self, LowerHex, Write};

/// How a field is displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// The value's `Display` form
    Plain,
    /// `0x`-prefixed, zero-padded hexadecimal
    Hex,
    /// Not shown
    Skip,
}

/// A single rendered header field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub label: &'static str,
    pub value: String,
    pub rule: Rule,
}

impl Field {
    pub fn plain(label: &'static str, value: impl fmt::Display) -> Self {
        Field {
            label,
            value: value.to_string(),
            rule: Rule::Plain,
        }
    }

    /// Hex field, zero-padded to twice the byte width of `T`
    pub fn hex<T: LowerHex>(label: &'static str, value: T) -> Self {
        let width = std::mem::size_of::<T>() * 2;
        Field {
            label,
            value: format!("0x{:0width$x}", value, width = width),
            rule: Rule::Hex,
        }
    }

    pub fn skip(label: &'static str) -> Self {
        Field {
            label,
            value: String::new(),
            rule: Rule::Skip,
        }
    }

    fn is_visible(&self) -> bool {
        self.rule != Rule::Skip && !self.value.is_empty()
    }
}

/// Render one layer as `name(label=value ...)`
pub fn render_layer(name: &str, fields: &[Field]) -> String {
    let mut out = String::with_capacity(name.len() + fields.len() * 12);
    out.push_str(name);
    out.push('(');

    let mut first = true;
    for field in fields.iter().filter(|f| f.is_visible()) {
        if !first {
            out.push(' ');
        }
        first = false;
        // writing into a String cannot fail
        let _ = write!(out, "{}={}", field.label, field.value);
    }

    out.push(')');
    out
}
