//! LDIF (RFC2849) rendering of entries.


use std::fmt;
use std::io;

use base64::Engine;

use crate::entry::Entry;


/// Whether a value may be written verbatim (an RFC2849 SAFE-STRING without
/// trailing spaces).
fn is_safe_string(value: &str) -> bool {
    if let Some(first) = value.chars().next() {
        if first == ' ' || first == ':' || first == '<' {
            return false;
        }
    }
    if value.ends_with(' ') {
        return false;
    }
    value.chars()
        .all(|c| c.is_ascii() && c != '\0' && c != '\n' && c != '\r')
}

fn write_attribute<W: fmt::Write>(writer: &mut W, name: &str, value: &str) -> fmt::Result {
    if is_safe_string(value) {
        writeln!(writer, "{}: {}", name, value)
    } else {
        let encoded = base64::engine::general_purpose::STANDARD.encode(value.as_bytes());
        writeln!(writer, "{}:: {}", name, encoded)
    }
}

pub fn write_entry<W: fmt::Write>(writer: &mut W, entry: &Entry) -> fmt::Result {
    write_attribute(writer, "dn", entry.dn())?;
    for (name, values) in entry.data() {
        if name.eq_ignore_ascii_case("dn") {
            continue;
        }
        for value in values {
            write_attribute(writer, name.as_str(), value)?;
        }
    }
    Ok(())
}

/// Writes the entries as LDIF records separated by blank lines.
pub fn write_entries<'a, W: fmt::Write, I: IntoIterator<Item = &'a Entry>>(writer: &mut W, entries: I) -> fmt::Result {
    let mut first = true;
    for entry in entries {
        if first {
            first = false;
        } else {
            writeln!(writer)?;
        }
        write_entry(writer, entry)?;
    }
    Ok(())
}


/// Lets [`fmt::Write`] output go to an [`io::Write`].
pub struct ByteWriteAdapter<'a, W: io::Write>(pub &'a mut W);
impl<'a, W: io::Write> fmt::Write for ByteWriteAdapter<'a, W> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.write_all(s.as_bytes())
            .map_err(|_| fmt::Error)
    }
}


#[cfg(test)]
mod tests {
    use super::{is_safe_string, write_entries, ByteWriteAdapter};
    use crate::entry::{AttributeMap, Entry};
    use unicase::UniCase;

    fn entry(dn: &str, attributes: &[(&str, &str)]) -> Entry {
        let mut data = AttributeMap::new();
        for (name, value) in attributes {
            data.entry(UniCase::new((*name).to_owned()))
                .or_insert_with(Vec::new)
                .push((*value).to_owned());
        }
        Entry::new(dn.to_owned(), data)
    }

    #[test]
    fn test_safe_strings() {
        assert!(is_safe_string("CN=Eve,DC=corp"));
        assert!(is_safe_string(""));
        assert!(!is_safe_string(" leading"));
        assert!(!is_safe_string(":colon"));
        assert!(!is_safe_string("<url"));
        assert!(!is_safe_string("trailing "));
        assert!(!is_safe_string("line\nbreak"));
        assert!(!is_safe_string("Jürgen"));
    }

    #[test]
    fn test_write_entries() {
        let entries = vec![
            entry("CN=Eve,DC=corp", &[("cn", "Eve"), ("description", "Jürgen's pal"), ("memberOf", "CN=b"), ("memberOf", "CN=a")]),
            entry("CN=Bob,DC=corp", &[("cn", "Bob")]),
        ];
        let mut output = String::new();
        write_entries(&mut output, &entries).unwrap();

        let expected = "\
dn: CN=Eve,DC=corp
cn: Eve
description:: SsO8cmdlbidzIHBhbA==
memberOf: CN=b
memberOf: CN=a

dn: CN=Bob,DC=corp
cn: Bob
";
        assert_eq!(output, expected);
    }

    #[test]
    fn test_byte_write_adapter() {
        let mut bytes: Vec<u8> = Vec::new();
        write_entries(&mut ByteWriteAdapter(&mut bytes), &[entry("CN=x", &[])]).unwrap();
        assert_eq!(bytes, b"dn: CN=x\n");
    }
}
