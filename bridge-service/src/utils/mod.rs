// Utils module

/// Longest emoji sequence to try, in chars (a ZWJ sequence with two skin tones).
const MAX_SEQUENCE_CHARS: usize = 10;

/// Remove emoji from an Up display name and trim the leading whitespace the
/// removal leaves behind, e.g. `"🏖️ Holiday"` becomes `"Holiday"`.
///
/// Emoji are matched as whole sequences against the Unicode emoji list, so a
/// keycap like `"1️⃣"` goes away entirely while a plain `"1"` or `"★"` stays.
pub fn clean_display_name(name: &str) -> String {
    let mut cleaned = String::with_capacity(name.len());
    let mut rest = name;

    while let Some(c) = rest.chars().next() {
        match emoji_prefix_len(rest) {
            Some(len) => rest = &rest[len..],
            None => {
                cleaned.push(c);
                rest = &rest[c.len_utf8()..];
            }
        }
    }

    cleaned.trim_start().to_string()
}

/// Byte length of the longest emoji sequence at the start of `s`, including
/// any stray presentation selectors or skin tones trailing it.
fn emoji_prefix_len(s: &str) -> Option<usize> {
    let end = s
        .char_indices()
        .take(MAX_SEQUENCE_CHARS)
        .map(|(i, c)| i + c.len_utf8())
        .filter(|&end| emojis::get(&s[..end]).is_some())
        .last()?;

    let trailing: usize = s[end..]
        .chars()
        .take_while(|c| is_modifier(*c))
        .map(char::len_utf8)
        .sum();

    Some(end + trailing)
}

fn is_modifier(c: char) -> bool {
    matches!(c as u32, 0xFE0F | 0x1F3FB..=0x1F3FF)
}
