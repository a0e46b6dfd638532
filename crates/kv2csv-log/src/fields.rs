use std::collections::HashMap;

/// Word characters (Unicode letters, digits, underscore) plus hyphen.
fn is_key_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

fn char_at(s: &str, i: usize) -> Option<char> {
    s[i..].chars().next()
}

/// Extracts every `key=value` field from one log line.
///
/// The scanner walks the line left to right looking for a run of key
/// characters followed immediately by `=`. The value side supports the
/// quoting conventions seen in the source logs:
///
/// - unquoted: the value runs until whitespace, a comma, or a quote
///   (`ts=2024-01-01 id=42` yields two fields);
/// - quoted: `msg="hello, world"` keeps commas and spaces up to the
///   closing quote;
/// - doubled quotes: `msg=""hello""` (quote-escaped quoting) strips both
///   layers, and `msg=""` is an empty value.
///
/// Anything between fields that does not fit the grammar is skipped; a
/// line with no matches yields an empty map, never an error. When the same
/// key appears twice on one line, the last occurrence wins.
pub fn extract_fields(line: &str) -> HashMap<String, String> {
    let mut fields = HashMap::new();
    let s = line;
    let mut i = 0;

    while let Some(c) = char_at(s, i) {
        // Skip anything that cannot start a key.
        if !is_key_char(c) {
            i += c.len_utf8();
            continue;
        }

        let key_start = i;
        while let Some(c) = char_at(s, i) {
            if !is_key_char(c) {
                break;
            }
            i += c.len_utf8();
        }
        let key = &s[key_start..i];

        // A key only counts when `=` follows immediately.
        if char_at(s, i) != Some('=') {
            continue;
        }
        i += 1;

        let mut quoted = false;
        if char_at(s, i) == Some('"') {
            quoted = true;
            i += 1;
            if char_at(s, i) == Some('"') {
                // `""` is either a doubled opening quote or an empty quoted
                // value; the character after the second quote decides.
                match char_at(s, i + 1) {
                    Some(c) if c != '"' && c != ',' && !c.is_whitespace() => {
                        i += 1;
                    }
                    _ => {
                        i += 1;
                        fields.insert(key.to_string(), String::new());
                        continue;
                    }
                }
            }
        }

        let value_start = i;
        if quoted {
            // Commas and spaces are part of the value up to the closing quote.
            while let Some(c) = char_at(s, i) {
                if c == '"' {
                    break;
                }
                i += c.len_utf8();
            }
            let value = &s[value_start..i];
            let mut closing = 0;
            while closing < 2 && char_at(s, i) == Some('"') {
                i += 1;
                closing += 1;
            }
            fields.insert(key.to_string(), value.to_string());
        } else {
            while let Some(c) = char_at(s, i) {
                if c == '"' || c == ',' || c.is_whitespace() {
                    break;
                }
                i += c.len_utf8();
            }
            fields.insert(key.to_string(), s[value_start..i].to_string());
        }
    }

    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get<'a>(fields: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
        fields.get(key).map(String::as_str)
    }

    #[test]
    fn unquoted_pair() {
        let fields = extract_fields("a=1");
        assert_eq!(get(&fields, "a"), Some("1"));
        assert_eq!(fields.len(), 1);
    }

    #[test]
    fn multiple_fields_split_on_whitespace() {
        let fields = extract_fields(r#"ts=2024-01-01 id=42 msg="hello, world""#);
        assert_eq!(get(&fields, "ts"), Some("2024-01-01"));
        assert_eq!(get(&fields, "id"), Some("42"));
        assert_eq!(get(&fields, "msg"), Some("hello, world"));
        assert_eq!(fields.len(), 3);
    }

    #[test]
    fn quoted_value_keeps_commas() {
        let fields = extract_fields(r#"a="x,y""#);
        assert_eq!(get(&fields, "a"), Some("x,y"));
    }

    #[test]
    fn comma_separated_pairs() {
        let fields = extract_fields("a=1,b=2");
        assert_eq!(get(&fields, "a"), Some("1"));
        assert_eq!(get(&fields, "b"), Some("2"));
    }

    #[test]
    fn doubled_quote_convention() {
        let fields = extract_fields(r#"k=""v"""#);
        assert_eq!(get(&fields, "k"), Some("v"));
    }

    #[test]
    fn empty_quoted_value() {
        let fields = extract_fields(r#"k="" j=2"#);
        assert_eq!(get(&fields, "k"), Some(""));
        assert_eq!(get(&fields, "j"), Some("2"));
    }

    #[test]
    fn empty_quoted_value_before_comma() {
        let fields = extract_fields(r#"k="",j=2"#);
        assert_eq!(get(&fields, "k"), Some(""));
        assert_eq!(get(&fields, "j"), Some("2"));
    }

    #[test]
    fn unterminated_quote_runs_to_end_of_line() {
        let fields = extract_fields(r#"msg="no closing quote"#);
        assert_eq!(get(&fields, "msg"), Some("no closing quote"));
    }

    #[test]
    fn quoted_pair_with_outer_quotes() {
        // CSV-embedded convention: the whole pair wrapped in quotes.
        let fields = extract_fields(r#""k=v""#);
        assert_eq!(get(&fields, "k"), Some("v"));
    }

    #[test]
    fn garbage_between_fields_is_skipped() {
        let fields = extract_fields("key1=value1 garbage key2=value2");
        assert_eq!(get(&fields, "key1"), Some("value1"));
        assert_eq!(get(&fields, "key2"), Some("value2"));
        assert_eq!(fields.len(), 2);
    }

    #[test]
    fn duplicate_key_last_occurrence_wins() {
        let fields = extract_fields("a=1 a=2");
        assert_eq!(get(&fields, "a"), Some("2"));
        assert_eq!(fields.len(), 1);
    }

    #[test]
    fn hyphenated_and_underscored_keys() {
        let fields = extract_fields("content-type=text/plain remote_addr=10.0.0.1");
        assert_eq!(get(&fields, "content-type"), Some("text/plain"));
        assert_eq!(get(&fields, "remote_addr"), Some("10.0.0.1"));
    }

    #[test]
    fn unicode_keys_and_values() {
        let fields = extract_fields("café=naïve 犬=walk");
        assert_eq!(get(&fields, "café"), Some("naïve"));
        assert_eq!(get(&fields, "犬"), Some("walk"));
    }

    #[test]
    fn no_matches_yields_empty_map() {
        assert!(extract_fields("free-form text without pairs").is_empty());
        assert!(extract_fields("").is_empty());
        assert!(extract_fields("= == =\"").is_empty());
    }

    #[test]
    fn key_without_value_is_empty() {
        let fields = extract_fields("k= next=1");
        assert_eq!(get(&fields, "k"), Some(""));
        assert_eq!(get(&fields, "next"), Some("1"));
    }

    #[test]
    fn equals_inside_unquoted_value() {
        let fields = extract_fields("a=b=c d=e");
        assert_eq!(get(&fields, "a"), Some("b=c"));
        assert_eq!(get(&fields, "d"), Some("e"));
    }
}
