/// Masks a secret or PII value for display, keeping the first and last four
/// characters of long values.
pub fn mask_value(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() > 8 {
        let visible: String = chars[..4].iter().collect();
        let end: String = chars[chars.len() - 4..].iter().collect();
        format!("{}****{}", visible, end)
    } else if value.is_empty() {
        String::new()
    } else {
        "****".to_string()
    }
}

/// Keeps only the last four characters, the way card numbers are shown.
pub fn mask_tail(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 4 {
        return "****".repeat(usize::from(!chars.is_empty()));
    }

    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{}", tail)
}
