//! ISBN-13 checksum

/// Computes the ISBN-13 check digit for the first twelve digits of a code.
///
/// Positions are weighted 1 (even index) and 3 (odd index); the check digit is
/// `(10 - sum % 10) % 10`.
///
/// Returns `None` unless `twelve_digits` is exactly 12 ASCII digits.
pub fn compute_check_digit(twelve_digits: &str) -> Option<u8> {
    let bytes = twelve_digits.as_bytes();
    if bytes.len() != 12 || !bytes.iter().all(u8::is_ascii_digit) {
        return None;
    }

    let sum: u32 = bytes
        .iter()
        .enumerate()
        .map(|(i, b)| {
            let digit = u32::from(b - b'0');
            if i % 2 == 0 {
                digit
            } else {
                digit * 3
            }
        })
        .sum();

    Some(((10 - sum % 10) % 10) as u8)
}

/// Returns true if `candidate` is 13 ASCII digits with a correct check digit.
pub fn is_valid_isbn13(candidate: &str) -> bool {
    let bytes = candidate.as_bytes();
    if bytes.len() != 13 || !bytes.iter().all(u8::is_ascii_digit) {
        return false;
    }

    match compute_check_digit(&candidate[..12]) {
        Some(check) => check == bytes[12] - b'0',
        None => false,
    }
}
