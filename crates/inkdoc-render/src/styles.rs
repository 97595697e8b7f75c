//! Style name candidates.
//!
//! Templates ship with either English or Chinese style names depending on
//! the Word locale they were authored in. Logical names used during
//! rendering expand to an ordered candidate list covering both; the
//! template engine applies the first candidate its style table defines.

/// Bilingual alias table for the style vocabulary of manual templates.
///
/// Expansion is not recursive: each requested name contributes exactly its
/// own alias row (or itself when it has none).
const STYLE_ALIASES: &[(&str, &[&str])] = &[
    ("heading 1", &["heading 1", "Heading 1", "标题 1"]),
    ("heading 2", &["heading 2", "Heading 2", "标题 2"]),
    ("heading 3", &["heading 3", "Heading 3", "标题 3"]),
    ("heading 4", &["heading 4", "Heading 4", "标题 4"]),
    ("heading 5", &["heading 5", "Heading 5", "标题 5"]),
    ("heading 6", &["heading 6", "Heading 6", "标题 6"]),
    ("heading 7", &["heading 7", "Heading 7", "标题 7"]),
    ("heading 8", &["heading 8", "Heading 8", "标题 8"]),
    ("heading 9", &["heading 9", "Heading 9", "标题 9"]),
    ("Normal", &["Normal", "正文"]),
    ("Title", &["Title", "标题"]),
    ("Subtitle", &["Subtitle", "副标题"]),
    ("Quote", &["Quote", "引用"]),
    ("引用块", &["引用块", "Quote", "Intense Quote"]),
    ("提示块", &["提示块", "引用块", "Quote"]),
    ("注意块", &["注意块", "引用块", "Quote"]),
    ("警告块", &["警告块", "引用块", "Intense Quote"]),
    ("Intense Quote", &["Intense Quote", "明显引用"]),
    ("Intense Emphasis", &["Intense Emphasis", "强调"]),
    ("List Paragraph", &["List Paragraph", "列表段落"]),
    ("No List", &["No List", "无列表"]),
    ("列表-无序", &["列表-无序", "List Paragraph", "List"]),
    ("列表-有序", &["列表-有序", "List Paragraph", "List"]),
    (
        "Default Paragraph Font",
        &["Default Paragraph Font", "默认段落字体"],
    ),
    ("Table Grid", &["Table Grid", "表格网格"]),
    ("Normal Table", &["Normal Table", "普通表格"]),
    ("header", &["header", "页眉"]),
    ("footer", &["footer", "页脚"]),
    ("page number", &["page number", "页码"]),
    ("toc 1", &["toc 1", "目录 1"]),
    ("toc 2", &["toc 2", "目录 2"]),
    ("toc 3", &["toc 3", "目录 3"]),
    ("toc 4", &["toc 4", "目录 4"]),
    ("Caption", &["Caption", "题注", "图注"]),
];

fn aliases_of(name: &str) -> Option<&'static [&'static str]> {
    STYLE_ALIASES
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, aliases)| *aliases)
}

/// Expand logical style names into a deduplicated candidate list.
#[must_use]
pub fn expand_candidates(names: &[&str]) -> Vec<String> {
    let mut candidates: Vec<String> = Vec::new();
    for name in names {
        match aliases_of(name) {
            Some(aliases) => {
                for alias in aliases {
                    if !candidates.iter().any(|c| c == alias) {
                        candidates.push((*alias).to_owned());
                    }
                }
            }
            None => {
                if !candidates.iter().any(|c| c == name) {
                    candidates.push((*name).to_owned());
                }
            }
        }
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_expand_plain_name() {
        assert_eq!(
            expand_candidates(&["行内代码", "Inline Code"]),
            vec!["行内代码", "Inline Code"]
        );
    }

    #[test]
    fn test_expand_admonition_with_fallback() {
        assert_eq!(
            expand_candidates(&["提示块", "Normal"]),
            vec!["提示块", "引用块", "Quote", "Normal", "正文"]
        );
        assert_eq!(
            expand_candidates(&["警告块", "Normal"]),
            vec!["警告块", "引用块", "Intense Quote", "Normal", "正文"]
        );
    }

    #[test]
    fn test_expand_deduplicates_across_rows() {
        assert_eq!(
            expand_candidates(&["表注", "Caption", "Normal"]),
            vec!["表注", "Caption", "题注", "图注", "Normal", "正文"]
        );
    }

    #[test]
    fn test_expand_heading_levels() {
        assert_eq!(
            expand_candidates(&["heading 2", "heading 1"]),
            vec![
                "heading 2",
                "Heading 2",
                "标题 2",
                "heading 1",
                "Heading 1",
                "标题 1"
            ]
        );
    }
}
