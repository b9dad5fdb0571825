//! String hashing used for template hashes and cache keys.

/// djb2-xor hash over UTF-16 code units, walked from the end of the string.
///
/// Walk order and 32-bit wrap match the `string-hash` package.
pub fn string_hash(input: &str) -> u32 {
    let units: Vec<u16> = input.encode_utf16().collect();
    let mut hash: i32 = 5381;
    for &unit in units.iter().rev() {
        hash = hash.wrapping_mul(33) ^ i32::from(unit);
    }
    hash as u32
}

/// Lowercase base-36 rendering of `value`.
pub fn to_base36(mut value: u32) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

/// `string_hash` rendered in base 36, the form used in class and variable names.
pub fn short_hash(input: &str) -> String {
    to_base36(string_hash(input))
}
