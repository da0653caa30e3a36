//! Identifier case conversions shared by the IR builder and the templates.
//!
//! Only case changes and `_` are treated as word boundaries; a run like
//! `userid` is never split.

/// Lowercases the first code point and leaves the rest untouched, so
/// `SendMessage` becomes `sendMessage`.
pub fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
    }
}

/// Uppercases the first code point and leaves the rest untouched.
pub fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
    }
}

/// Converts `user_id` to `userId`. The first segment is kept verbatim and
/// empty segments from repeated underscores are dropped.
pub fn lower_camel(s: &str) -> String {
    let mut parts = s.split('_');
    let mut out = parts.next().unwrap_or_default().to_string();
    for part in parts.filter(|p| !p.is_empty()) {
        out.push_str(&upper_first(part));
    }
    out
}

/// Converts `GetUser` to `get_user`: an underscore goes before every uppercase
/// code point except the first character, then everything is lowercased.
pub fn to_snake_case(s: &str) -> String {
    let mut snake = String::with_capacity(s.len() + 4);
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() && i > 0 {
            snake.push('_');
        }
        snake.extend(c.to_lowercase());
    }
    snake
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lower_first() {
        assert_eq!(lower_first("SendMessage"), "sendMessage");
        assert_eq!(lower_first(""), "");
        assert_eq!(lower_first("x"), "x");
        assert_eq!(lower_first("ÉtatCivil"), "étatCivil");
    }

    #[test]
    fn test_lower_first_is_idempotent() {
        for s in ["GetUser", "already", "", "ÅB", "URL"] {
            let once = lower_first(s);
            assert_eq!(lower_first(&once), once);
        }
    }

    #[test]
    fn test_lower_camel() {
        assert_eq!(lower_camel("user_id"), "userId");
        assert_eq!(lower_camel("display_name_long"), "displayNameLong");
        assert_eq!(lower_camel("plain"), "plain");
        assert_eq!(lower_camel("a__b"), "aB");
        assert_eq!(lower_camel("_leading"), "Leading");
        assert_eq!(lower_camel(""), "");
    }

    #[test]
    fn test_lower_camel_only_drops_separators() {
        for s in ["user_id", "a_b_c", "x__y", "trailing_", "none"] {
            let underscores = s.matches('_').count();
            assert_eq!(lower_camel(s).chars().count(), s.chars().count() - underscores);
        }
    }

    #[test]
    fn test_to_snake_case() {
        assert_eq!(to_snake_case("GetUser"), "get_user");
        assert_eq!(to_snake_case("userService"), "user_service");
        assert_eq!(to_snake_case("HTTPThing"), "h_t_t_p_thing");
        assert_eq!(to_snake_case("lower"), "lower");
    }
}
