//! Minimal CSV codec for the period tables: header line + rows,
//! RFC-4180 quoting. Ragged rows are the store's problem, not the
//! codec's; records come back exactly as written.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("unterminated quoted field")]
    UnterminatedQuote,
    #[error("table has no header line")]
    Empty,
}

pub fn encode(header: &[String], rows: &[Vec<String>]) -> String {
    let mut out = String::new();
    encode_line(&mut out, header);
    for row in rows {
        encode_line(&mut out, row);
    }
    out
}

fn encode_line(out: &mut String, fields: &[String]) {
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        if field.contains(['"', ',', '\n', '\r']) {
            out.push('"');
            out.push_str(&field.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(field);
        }
    }
    out.push('\n');
}

/// Decode into (header, rows). Fails on an unterminated quote or an
/// input with no header line; everything else decodes as written.
pub fn decode(input: &str) -> Result<(Vec<String>, Vec<Vec<String>>), TableError> {
    let mut records: Vec<Vec<String>> = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut chars = input.chars().peekable();
    let mut in_quotes = false;
    let mut row_started = false;

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' => {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                }
                _ => field.push(c),
            }
            continue;
        }
        match c {
            '"' if field.is_empty() => {
                in_quotes = true;
                row_started = true;
            }
            ',' => {
                row.push(std::mem::take(&mut field));
                row_started = true;
            }
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                end_row(&mut records, &mut row, &mut field, &mut row_started);
            }
            '\n' => end_row(&mut records, &mut row, &mut field, &mut row_started),
            _ => {
                field.push(c);
                row_started = true;
            }
        }
    }
    if in_quotes {
        return Err(TableError::UnterminatedQuote);
    }
    end_row(&mut records, &mut row, &mut field, &mut row_started);

    let mut it = records.into_iter();
    let header = it.next().ok_or(TableError::Empty)?;
    Ok((header, it.collect()))
}

fn end_row(
    records: &mut Vec<Vec<String>>,
    row: &mut Vec<String>,
    field: &mut String,
    row_started: &mut bool,
) {
    if !*row_started && row.is_empty() && field.is_empty() {
        return; // blank line, skip
    }
    row.push(std::mem::take(field));
    records.push(std::mem::take(row));
    *row_started = false;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(fields: &[&str]) -> Vec<String> {
        fields.iter().map(|f| f.to_string()).collect()
    }

    #[test]
    fn plain_encode() {
        let out = encode(&s(&["Name", "City"]), &[s(&["Ravi", "Pune"])]);
        assert_eq!(out, "Name,City\nRavi,Pune\n");
    }

    #[test]
    fn quoting_special_characters() {
        let out = encode(
            &s(&["Notes"]),
            &[s(&["line one\nline two, with \"quotes\""])],
        );
        assert_eq!(out, "Notes\n\"line one\nline two, with \"\"quotes\"\"\"\n");
        let (header, rows) = decode(&out).unwrap();
        assert_eq!(header, s(&["Notes"]));
        assert_eq!(rows[0][0], "line one\nline two, with \"quotes\"");
    }

    #[test]
    fn decode_crlf_and_trailing_newline() {
        let (header, rows) = decode("A,B\r\n1,2\r\n").unwrap();
        assert_eq!(header, s(&["A", "B"]));
        assert_eq!(rows, vec![s(&["1", "2"])]);
    }

    #[test]
    fn decode_empty_fields() {
        let (_, rows) = decode("A,B,C\n,,x\n").unwrap();
        assert_eq!(rows[0], s(&["", "", "x"]));
    }

    #[test]
    fn decode_unterminated_quote_is_an_error() {
        assert!(matches!(
            decode("A\n\"never closed"),
            Err(TableError::UnterminatedQuote)
        ));
    }

    #[test]
    fn decode_empty_input_is_an_error() {
        assert!(matches!(decode(""), Err(TableError::Empty)));
    }
}
