//! A1 notation helpers.

use crate::error::SheetsError;

/// Zero-based column index → column letters (`0` → `A`, `26` → `AA`).
pub fn column_letters(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// Zero-based column index and 1-based row → `E5`.
pub fn cell(column: usize, row: usize) -> String {
    format!("{}{row}", column_letters(column))
}

/// Sheet title quoted for use in a range: `'Релизы'`. On its own it
/// addresses the whole sheet.
pub fn quoted(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

/// Prefix `reference` with the quoted sheet title: `'Релизы'!E5`.
pub fn qualified(title: &str, reference: &str) -> String {
    format!("{}!{reference}", quoted(title))
}

/// Parse `E5` (optionally `'Sheet'!E5`) into a zero-based column and 1-based row.
pub fn parse_cell(reference: &str) -> Result<(usize, usize), SheetsError> {
    let invalid = || SheetsError::InvalidRange {
        reference: reference.to_owned(),
    };
    let local = reference.rsplit('!').next().unwrap_or(reference);
    let split = local
        .find(|c: char| c.is_ascii_digit())
        .ok_or_else(invalid)?;
    let (letters, digits) = local.split_at(split);
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(invalid());
    }

    let mut column = 0usize;
    for c in letters.chars() {
        column = column * 26 + (c.to_ascii_uppercase() as usize - 'A' as usize + 1);
    }
    let row: usize = digits.parse().map_err(|_| invalid())?;
    if row == 0 {
        return Err(invalid());
    }
    Ok((column - 1, row))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0, "A")]
    #[case(4, "E")]
    #[case(10, "K")]
    #[case(25, "Z")]
    #[case(26, "AA")]
    #[case(701, "ZZ")]
    #[case(702, "AAA")]
    fn letters(#[case] index: usize, #[case] expected: &str) {
        assert_eq!(column_letters(index), expected);
    }

    #[test]
    fn parse_round_trips_cell() {
        for (column, row) in [(0, 1), (4, 12), (27, 300)] {
            assert_eq!(parse_cell(&cell(column, row)).expect("parse"), (column, row));
        }
    }

    #[test]
    fn parse_accepts_qualified_reference() {
        assert_eq!(parse_cell("'Релизы'!K7").expect("parse"), (10, 7));
    }

    #[rstest]
    #[case("")]
    #[case("E")]
    #[case("12")]
    #[case("E0")]
    #[case("E5:F6")]
    fn parse_rejects_garbage(#[case] reference: &str) {
        assert!(parse_cell(reference).is_err(), "{reference} should be rejected");
    }

    #[test]
    fn qualified_escapes_quotes() {
        assert_eq!(qualified("Q1 'plan'", "A1"), "'Q1 ''plan'''!A1");
    }
}
