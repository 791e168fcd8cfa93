// Copyright 2026 the Marker Reveal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The downloadable contact record.
//!
//! The record is static configuration rendered as a vCard 3.0 text: one
//! `KEY:value` line per field between `BEGIN:VCARD` and `END:VCARD`, lines
//! terminated by CRLF.

use alloc::string::String;
use core::fmt::Write as _;

/// Suggested file name for the exported record.
pub const FILE_NAME: &str = "contact.vcf";

/// MIME type of the exported record.
pub const MIME_TYPE: &str = "text/vcard";

/// Static contact details.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContactRecord {
    /// Display name, e.g. `"Ada Lovelace"`.
    pub name: String,
    /// Phone number in any dialable form.
    pub phone: String,
    /// Organization name.
    pub organization: String,
    /// Optional e-mail address.
    pub email: Option<String>,
}

impl ContactRecord {
    /// Renders the record as vCard 3.0 text.
    #[must_use]
    pub fn to_vcard(&self) -> String {
        let mut out = String::new();
        out.push_str("BEGIN:VCARD\r\n");
        out.push_str("VERSION:3.0\r\n");
        line(&mut out, "FN", &self.name);
        // Structured name: family;given. Everything after the last space is
        // taken as the family name.
        let (given, family) = match self.name.trim().rsplit_once(' ') {
            Some((given, family)) => (given, family),
            None => ("", self.name.trim()),
        };
        let _ = write!(out, "N:{};{};;;\r\n", escape(family), escape(given));
        line(&mut out, "ORG", &self.organization);
        line(&mut out, "TEL;TYPE=CELL", &self.phone);
        if let Some(email) = &self.email {
            line(&mut out, "EMAIL;TYPE=INTERNET", email);
        }
        out.push_str("END:VCARD\r\n");
        out
    }
}

fn line(out: &mut String, key: &str, value: &str) {
    let _ = write!(out, "{key}:{}\r\n", escape(value));
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            ',' => escaped.push_str("\\,"),
            ';' => escaped.push_str("\\;"),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            _ => escaped.push(ch),
        }
    }
    escaped
}
