//! Code block language labels.

/// Canonical display name for a fenced code block language tag.
///
/// Known tags map to their usual casing; unknown tags are capitalized
/// (first character upper, rest lower).
#[must_use]
pub fn format_language(lang: &str) -> String {
    if lang.is_empty() {
        return String::new();
    }
    let canonical = match lang.to_lowercase().as_str() {
        "py" | "python" => "Python",
        "js" | "javascript" => "JavaScript",
        "ts" | "typescript" => "TypeScript",
        "json" => "JSON",
        "yaml" | "yml" => "YAML",
        "bash" => "Bash",
        "sh" | "shell" => "Shell",
        _ => return capitalize(lang),
    };
    canonical.to_owned()
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_known_tags() {
        assert_eq!(format_language("py"), "Python");
        assert_eq!(format_language("Python"), "Python");
        assert_eq!(format_language("yml"), "YAML");
        assert_eq!(format_language("sh"), "Shell");
        assert_eq!(format_language("bash"), "Bash");
        assert_eq!(format_language("TS"), "TypeScript");
    }

    #[test]
    fn test_unknown_tags_are_capitalized() {
        assert_eq!(format_language("rust"), "Rust");
        assert_eq!(format_language("RUST"), "Rust");
        assert_eq!(format_language("goLang"), "Golang");
    }

    #[test]
    fn test_empty_tag() {
        assert_eq!(format_language(""), "");
    }
}
