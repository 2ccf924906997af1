pub fn generate_random_code(length: usize) -> String {
    use std::iter;

    // 随机选择字母和数字
    let chars = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

    iter::repeat_with(|| chars[rand::random_range(0..chars.len())] as char)
        .take(length)
        .collect()
}

/// Reject anything that cannot be a minted short code before touching storage.
pub fn is_valid_short_code(code: &str) -> bool {
    !code.is_empty()
        && code.len() <= 64
        && code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Canonical form for access-list comparison: trimmed, ASCII-lowercased.
/// Applied once at the storage boundary and to extracted identities.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}
