//! Human-readable rendering of keys and raw packet data.

use std::io::{self, Write};

/// Bytes per hex dump row.
const DUMP_COLUMNS: usize = 16;

/// Render `key` as a quoted string if it is UTF-8, else as hex.
pub fn format_key(key: &[u8]) -> String {
    match std::str::from_utf8(key) {
        Ok(text) => format!("{text:?}"),
        Err(_) => hex::encode(key),
    }
}

/// Write `data` as rows of sixteen cells, each row prefixed by `indent`.
///
/// Printable ASCII bytes are shown as the character with a leading space,
/// everything else as two hex digits.
pub fn hex_dump<W: Write + ?Sized>(out: &mut W, data: &[u8], indent: &str) -> io::Result<()> {
    for row in data.chunks(DUMP_COLUMNS) {
        out.write_all(indent.as_bytes())?;
        for (col, &byte) in row.iter().enumerate() {
            if col > 0 {
                out.write_all(b" ")?;
            }
            if byte == b' ' || byte.is_ascii_graphic() {
                write!(out, " {}", char::from(byte))?;
            } else {
                write!(out, "{byte:02x}")?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dump(data: &[u8], indent: &str) -> String {
        let mut out = Vec::new();
        hex_dump(&mut out, data, indent).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn key_formatting() {
        assert_eq!(format_key(b"hunter2"), "\"hunter2\"");
        assert_eq!(format_key(b"say \"hi\""), "\"say \\\"hi\\\"\"");
        assert_eq!(format_key(&[0xff, 0x00, 0x10]), "ff0010");
    }

    #[test]
    fn dump_mixes_ascii_and_hex() {
        assert_eq!(dump(b"A\x00b", ""), " A 00  b\n");
    }

    #[test]
    fn dump_wraps_rows() {
        let data = [0u8; 17];
        let text = dump(&data, "  ");
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], format!("  {}", vec!["00"; 16].join(" ")));
        assert_eq!(lines[1], "  00");
    }

    #[test]
    fn dump_empty() {
        assert_eq!(dump(b"", "    "), "");
    }
}
