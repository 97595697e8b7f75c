//! The five checks and the driver that runs them over a package.

use std::path::Path;
use std::sync::LazyLock;

use inkdoc_ooxml::DocxPackage;
use inkdoc_ooxml::package::STYLES_PART;
use inkdoc_ooxml::runs::{
    RunStream, paragraph_runs, paragraph_style_id, paragraph_text, special_char, visit_paragraphs,
};
use inkdoc_ooxml::styles::StyleTable;
use inkdoc_ooxml::xml::XmlNode;
use regex::Regex;

use crate::error::LintError;
use crate::issue::Issue;

/// All three docxtpl bracket styles, non-greedy, across line breaks.
static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\{\{.*?\}\}|\{%.*?%\}|\{#.*?#\}").expect("invalid placeholder regex")
});

const OPENING_MARKERS: [&str; 3] = ["{{", "{%", "{#"];
const CLOSING_MARKERS: [&str; 3] = ["}}", "%}", "#}"];

/// Field instructions that pull content from outside the package.
///
/// Matched as substrings of the uppercased instruction, so `HYPERLINK`
/// fields are reported through the `LINK` keyword as well.
const EXTERNAL_FIELD_KEYWORDS: [&str; 5] =
    ["INCLUDETEXT", "INCLUDEPICTURE", "LINK", "DDEAUTO", "DDE"];

/// Ancestor tag suffixes that mark a paragraph as living outside the body.
const WRAPPER_SUFFIXES: [&str; 4] = ["hdr", "ftr", "tbl", "txbxContent"];

/// Which checks run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LintMode {
    /// Split placeholders, misplaced body styles, and external fields.
    #[default]
    Template,
    /// External relationship targets in generated documents.
    Output,
    /// Both groups.
    All,
}

impl LintMode {
    fn covers_template(self) -> bool {
        matches!(self, Self::Template | Self::All)
    }

    fn covers_output(self) -> bool {
        matches!(self, Self::Output | Self::All)
    }
}

impl std::str::FromStr for LintMode {
    type Err = LintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "template" => Ok(Self::Template),
            "output" => Ok(Self::Output),
            "all" => Ok(Self::All),
            other => Err(LintError::UnknownMode(other.to_owned())),
        }
    }
}

/// Check configuration.
#[derive(Debug, Clone)]
pub struct LintOptions {
    /// Which checks run.
    pub mode: LintMode,
    /// Paragraph style display names treated as body text.
    pub body_styles: Vec<String>,
}

impl Default for LintOptions {
    fn default() -> Self {
        Self {
            mode: LintMode::Template,
            body_styles: vec!["Normal".to_owned(), "正文".to_owned()],
        }
    }
}

/// Run the checks selected by `options` over an open package.
///
/// Unreadable parts are skipped rather than failing the whole scan, so a
/// damaged package still yields whatever issues the intact parts show.
#[must_use]
pub fn lint_package(package: &DocxPackage, options: &LintOptions) -> Vec<Issue> {
    let mut issues = Vec::new();
    let styles = load_styles(package);

    if options.mode.covers_template() {
        for part_name in package.part_names() {
            if !part_name.starts_with("word/") || !part_name.ends_with(".xml") {
                continue;
            }
            let Ok(root) = package.xml_part(part_name) else {
                tracing::debug!(part = %part_name, "Skipping a part that does not parse");
                continue;
            };
            check_paragraphs(
                &root,
                part_name,
                &styles,
                &options.body_styles,
                &mut issues,
            );
            check_external_fields(&root, part_name, &mut issues);
        }
    }

    if options.mode.covers_output() {
        check_external_rels(package, &mut issues);
    }

    for part_name in package.part_names() {
        if part_name.starts_with("word/embeddings/") || part_name.starts_with("word/activeX/") {
            issues.push(Issue::EmbeddedObject {
                part: part_name.to_owned(),
            });
        }
    }

    issues
}

/// Check the package at `path`.
pub fn lint_file(path: &Path, options: &LintOptions) -> Result<Vec<Issue>, LintError> {
    if !path.exists() {
        return Err(LintError::FileNotFound(path.to_owned()));
    }
    let package = DocxPackage::open(path)?;
    Ok(lint_package(&package, options))
}

fn load_styles(package: &DocxPackage) -> StyleTable {
    package
        .xml_part(STYLES_PART)
        .map(|root| StyleTable::from_part(&root))
        .unwrap_or_default()
}

/// Run the per-paragraph checks over every paragraph of a part, numbering
/// paragraphs in document order across nesting levels.
fn check_paragraphs(
    root: &XmlNode,
    part: &str,
    styles: &StyleTable,
    body_styles: &[String],
    issues: &mut Vec<Issue>,
) {
    let mut index = 0usize;
    visit_paragraphs(root, &mut |paragraph, ancestors| {
        check_split_placeholders(paragraph, part, index, issues);
        check_body_style(paragraph, part, index, ancestors, styles, body_styles, issues);
        index += 1;
    });
}

fn check_split_placeholders(
    paragraph: &XmlNode,
    part: &str,
    index: usize,
    issues: &mut Vec<Issue>,
) {
    let stream = RunStream::of(paragraph);
    if !has_marker_pair(&stream.text) {
        return;
    }
    for matched in PLACEHOLDER_RE.find_iter(&stream.text) {
        let Some((first, last)) = stream.run_span(matched.range()) else {
            continue;
        };
        if first == last {
            continue;
        }
        issues.push(Issue::RunSplit {
            part: part.to_owned(),
            paragraph: index,
            run_start: first + 1,
            run_end: last + 1,
            placeholder: matched.as_str().replace('\n', "\\n"),
            text: paragraph_display_text(paragraph),
        });
    }
}

fn has_marker_pair(text: &str) -> bool {
    OPENING_MARKERS.iter().any(|marker| text.contains(marker))
        && CLOSING_MARKERS.iter().any(|marker| text.contains(marker))
}

fn check_body_style(
    paragraph: &XmlNode,
    part: &str,
    index: usize,
    ancestors: &[&str],
    styles: &StyleTable,
    body_styles: &[String],
    issues: &mut Vec<Issue>,
) {
    let Some(style_id) = paragraph_style_id(paragraph) else {
        return;
    };
    if style_id.is_empty() {
        return;
    }
    let style_name = styles.name_of(style_id).unwrap_or(style_id);
    if !body_styles.iter().any(|name| name == style_name) {
        return;
    }
    let wrapped = ancestors
        .iter()
        .any(|tag| WRAPPER_SUFFIXES.iter().any(|suffix| tag.ends_with(suffix)));
    if !wrapped {
        return;
    }
    issues.push(Issue::BodyStyleLocation {
        part: part.to_owned(),
        paragraph: index,
        style: style_name.to_owned(),
        text: paragraph_display_text(paragraph),
    });
}

fn check_external_fields(node: &XmlNode, part: &str, issues: &mut Vec<Issue>) {
    for child in &node.children {
        if child.local() == "instrText" {
            let upper = child.text.to_uppercase();
            if EXTERNAL_FIELD_KEYWORDS
                .iter()
                .any(|keyword| upper.contains(keyword))
            {
                issues.push(Issue::FieldExternal {
                    part: part.to_owned(),
                    text: child.text.trim().to_owned(),
                });
            }
        }
        check_external_fields(child, part, issues);
    }
}

fn check_external_rels(package: &DocxPackage, issues: &mut Vec<Issue>) {
    for part_name in package.part_names() {
        if !part_name.starts_with("word/_rels/") || !part_name.ends_with(".rels") {
            continue;
        }
        let Ok(root) = package.xml_part(part_name) else {
            continue;
        };
        collect_external_targets(&root, part_name, issues);
    }
}

fn collect_external_targets(node: &XmlNode, part: &str, issues: &mut Vec<Issue>) {
    for child in &node.children {
        if child.local() == "Relationship" && child.attr("TargetMode") == Some("External") {
            issues.push(Issue::ExternalRels {
                part: part.to_owned(),
                target: child.attr("Target").unwrap_or_default().to_owned(),
            });
        }
        collect_external_targets(child, part, issues);
    }
}

/// Visible text approximation for report lines.
///
/// Walks the paragraph's direct runs, taking each run's text nodes first
/// and then its tab and break characters, and trims the result. An empty
/// paragraph prints as `[空段落]`.
fn paragraph_display_text(paragraph: &XmlNode) -> String {
    let mut out = String::new();
    for run in paragraph_runs(paragraph) {
        out.push_str(&paragraph_text(run));
        for child in &run.children {
            if let Some(ch) = special_char(child.local()) {
                out.push(ch);
            }
        }
    }
    let text = out.trim();
    if text.is_empty() {
        "[空段落]".to_owned()
    } else {
        text.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use pretty_assertions::assert_eq;

    use super::*;

    const STYLES_XML: &str = concat!(
        "<w:styles>",
        r#"<w:style w:type="paragraph" w:styleId="Body"><w:name w:val="正文"/></w:style>"#,
        r#"<w:style w:type="paragraph" w:styleId="Plain"><w:name w:val="BodyText"/></w:style>"#,
        "</w:styles>",
    );

    fn package_with(parts: &[(&str, &str)]) -> DocxPackage {
        let mut package = DocxPackage::default();
        for (name, xml) in parts {
            package.set_part(name, xml.as_bytes().to_vec());
        }
        package
    }

    fn document_package(body_xml: &str) -> DocxPackage {
        let mut package = DocxPackage::default();
        package.set_part(
            "word/document.xml",
            format!("<w:document><w:body>{body_xml}</w:body></w:document>").into_bytes(),
        );
        package
    }

    #[test]
    fn test_split_placeholder_across_runs() {
        let package = document_package(concat!(
            "<w:p><w:r><w:t>{{so</w:t></w:r>",
            "<w:r><w:t>ftware_name}}</w:t></w:r></w:p>",
        ));

        let issues = lint_package(&package, &LintOptions::default());
        assert_eq!(
            issues,
            vec![Issue::RunSplit {
                part: "word/document.xml".to_owned(),
                paragraph: 0,
                run_start: 1,
                run_end: 2,
                placeholder: "{{software_name}}".to_owned(),
                text: "{{software_name}}".to_owned(),
            }]
        );
    }

    #[test]
    fn test_intact_placeholder_not_reported() {
        let package = document_package("<w:p><w:r><w:t>{{software_name}}</w:t></w:r></w:p>");
        assert_eq!(lint_package(&package, &LintOptions::default()), vec![]);
    }

    #[test]
    fn test_each_split_occurrence_reported_once() {
        let package = document_package(concat!(
            "<w:p><w:r><w:t>{{fi</w:t></w:r><w:r><w:t>rst}} and {{se</w:t></w:r>",
            "<w:r><w:t>cond}}</w:t></w:r></w:p>",
        ));

        let issues = lint_package(&package, &LintOptions::default());
        assert_eq!(issues.len(), 2);
        let Issue::RunSplit {
            run_start, run_end, ..
        } = &issues[1]
        else {
            panic!("expected a run-split issue");
        };
        assert_eq!((*run_start, *run_end), (2, 3));
    }

    #[test]
    fn test_clean_package_stays_clean() {
        let package = document_package("<w:p><w:r><w:t>plain body</w:t></w:r></w:p>");
        for _ in 0..2 {
            assert_eq!(lint_package(&package, &LintOptions::default()), vec![]);
        }
    }

    #[test]
    fn test_placeholder_across_break_escapes_newline() {
        let package = document_package(concat!(
            "<w:p><w:r><w:t>{%if</w:t><w:br/></w:r>",
            "<w:r><w:t>x%}</w:t></w:r></w:p>",
        ));

        let issues = lint_package(&package, &LintOptions::default());
        assert_eq!(issues.len(), 1);
        let Issue::RunSplit {
            placeholder, text, ..
        } = &issues[0]
        else {
            panic!("expected a run-split issue");
        };
        assert_eq!(placeholder, "{%if\\nx%}");
        assert_eq!(text, "{%if\nx%}");
    }

    #[test]
    fn test_paragraph_index_counts_nested_paragraphs_flat() {
        let package = document_package(concat!(
            "<w:p><w:r><w:t>intro</w:t></w:r></w:p>",
            "<w:tbl><w:tr><w:tc>",
            "<w:p><w:r><w:t>{{ce</w:t></w:r><w:r><w:t>ll}}</w:t></w:r></w:p>",
            "</w:tc></w:tr></w:tbl>",
        ));

        let issues = lint_package(&package, &LintOptions::default());
        assert_eq!(issues.len(), 1);
        let Issue::RunSplit { paragraph, .. } = &issues[0] else {
            panic!("expected a run-split issue");
        };
        assert_eq!(*paragraph, 1);
    }

    #[test]
    fn test_hyperlink_runs_are_not_counted() {
        let package = document_package(concat!(
            r#"<w:p><w:hyperlink r:id="rId4"><w:r><w:t>{{x</w:t></w:r></w:hyperlink>"#,
            "<w:r><w:t>}}</w:t></w:r></w:p>",
        ));
        assert_eq!(lint_package(&package, &LintOptions::default()), vec![]);
    }

    #[test]
    fn test_body_style_inside_table() {
        let package = package_with(&[
            (
                "word/document.xml",
                concat!(
                    "<w:document><w:body>",
                    r#"<w:p><w:pPr><w:pStyle w:val="Body"/></w:pPr><w:r><w:t>ok here</w:t></w:r></w:p>"#,
                    "<w:tbl><w:tr><w:tc>",
                    r#"<w:p><w:pPr><w:pStyle w:val="Body"/></w:pPr></w:p>"#,
                    "</w:tc></w:tr></w:tbl>",
                    "</w:body></w:document>",
                ),
            ),
            ("word/styles.xml", STYLES_XML),
        ]);

        let issues = lint_package(&package, &LintOptions::default());
        assert_eq!(
            issues,
            vec![Issue::BodyStyleLocation {
                part: "word/document.xml".to_owned(),
                paragraph: 1,
                style: "正文".to_owned(),
                text: "[空段落]".to_owned(),
            }]
        );
    }

    #[test]
    fn test_body_style_name_falls_back_to_raw_id() {
        let package = package_with(&[(
            "word/header1.xml",
            concat!(
                "<w:hdr>",
                r#"<w:p><w:pPr><w:pStyle w:val="正文"/></w:pPr><w:r><w:t>页眉</w:t></w:r></w:p>"#,
                "</w:hdr>",
            ),
        )]);

        let issues = lint_package(&package, &LintOptions::default());
        assert_eq!(
            issues,
            vec![Issue::BodyStyleLocation {
                part: "word/header1.xml".to_owned(),
                paragraph: 0,
                style: "正文".to_owned(),
                text: "页眉".to_owned(),
            }]
        );
    }

    #[test]
    fn test_custom_body_styles() {
        let header = concat!(
            "<w:hdr>",
            r#"<w:p><w:pPr><w:pStyle w:val="Plain"/></w:pPr><w:r><w:t>x</w:t></w:r></w:p>"#,
            "</w:hdr>",
        );
        let package = package_with(&[("word/header1.xml", header), ("word/styles.xml", STYLES_XML)]);

        assert_eq!(lint_package(&package, &LintOptions::default()), vec![]);

        let options = LintOptions {
            body_styles: vec!["BodyText".to_owned()],
            ..LintOptions::default()
        };
        assert_eq!(lint_package(&package, &options).len(), 1);
    }

    #[test]
    fn test_external_field_keywords() {
        let package = document_package(concat!(
            r#"<w:p><w:r><w:instrText> INCLUDEPICTURE "logo.png" </w:instrText></w:r></w:p>"#,
            r#"<w:p><w:r><w:instrText> HYPERLINK "https://e.com" </w:instrText></w:r></w:p>"#,
            "<w:p><w:r><w:instrText> PAGE </w:instrText></w:r></w:p>",
        ));

        let issues = lint_package(&package, &LintOptions::default());
        assert_eq!(
            issues,
            vec![
                Issue::FieldExternal {
                    part: "word/document.xml".to_owned(),
                    text: "INCLUDEPICTURE \"logo.png\"".to_owned(),
                },
                Issue::FieldExternal {
                    part: "word/document.xml".to_owned(),
                    text: "HYPERLINK \"https://e.com\"".to_owned(),
                },
            ]
        );
    }

    #[test]
    fn test_external_rels_only_in_output_modes() {
        let rels = concat!(
            "<Relationships>",
            r#"<Relationship Id="rId1" Type="t" Target="styles.xml"/>"#,
            r#"<Relationship Id="rId2" Type="t" Target="https://e.com/a.png" TargetMode="External"/>"#,
            "</Relationships>",
        );
        let package = package_with(&[
            (
                "word/document.xml",
                concat!(
                    "<w:document><w:body>",
                    "<w:p><w:r><w:t>{{sp</w:t></w:r><w:r><w:t>lit}}</w:t></w:r></w:p>",
                    "</w:body></w:document>",
                ),
            ),
            ("word/_rels/document.xml.rels", rels),
        ]);

        let template_issues = lint_package(&package, &LintOptions::default());
        assert_eq!(template_issues.len(), 1);
        assert_eq!(template_issues[0].check_name(), "RUN_SPLIT");

        let output_issues = lint_package(
            &package,
            &LintOptions {
                mode: LintMode::Output,
                ..LintOptions::default()
            },
        );
        assert_eq!(
            output_issues,
            vec![Issue::ExternalRels {
                part: "word/_rels/document.xml.rels".to_owned(),
                target: "https://e.com/a.png".to_owned(),
            }]
        );

        let all_issues = lint_package(
            &package,
            &LintOptions {
                mode: LintMode::All,
                ..LintOptions::default()
            },
        );
        assert_eq!(all_issues.len(), 2);
    }

    #[test]
    fn test_embedded_objects_reported_in_every_mode() {
        let mut package = document_package("<w:p/>");
        package.set_part("word/embeddings/oleObject1.bin", vec![0u8, 1, 2]);

        for mode in [LintMode::Template, LintMode::Output, LintMode::All] {
            let issues = lint_package(
                &package,
                &LintOptions {
                    mode,
                    ..LintOptions::default()
                },
            );
            assert_eq!(
                issues,
                vec![Issue::EmbeddedObject {
                    part: "word/embeddings/oleObject1.bin".to_owned(),
                }],
                "mode {mode:?}"
            );
        }
    }

    #[test]
    fn test_unparsable_part_is_skipped() {
        let mut package = document_package("<w:p><w:r><w:t>fine</w:t></w:r></w:p>");
        package.set_part("word/broken.xml", b"<w:hdr><unclosed".to_vec());

        assert_eq!(lint_package(&package, &LintOptions::default()), vec![]);
    }

    #[test]
    fn test_repair_then_lint_reports_no_splits() {
        let mut package = package_with(&[(
            "word/header1.xml",
            concat!(
                "<w:hdr><w:p>",
                "<w:r><w:t>{{com</w:t></w:r>",
                "<w:r><w:t>pa</w:t></w:r>",
                "<w:r><w:t>ny}}</w:t></w:r>",
                "</w:p></w:hdr>",
            ),
        )]);

        assert_eq!(lint_package(&package, &LintOptions::default()).len(), 1);

        let merged = inkdoc_template::merge_header_placeholders(&mut package).unwrap();
        assert_eq!(merged, 1);
        assert_eq!(lint_package(&package, &LintOptions::default()), vec![]);
    }

    #[test]
    fn test_lint_file_reads_saved_package() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("template.docx");
        let package = document_package(concat!(
            "<w:p><w:r><w:t>{{sp</w:t></w:r>",
            "<w:r><w:t>lit}}</w:t></w:r></w:p>",
        ));
        package.save(&path).unwrap();

        let issues = lint_file(&path, &LintOptions::default()).unwrap();
        assert_eq!(issues.len(), 1);
    }

    #[test]
    fn test_lint_file_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.docx");
        let error = lint_file(&missing, &LintOptions::default()).unwrap_err();
        assert!(matches!(error, LintError::FileNotFound(path) if path == missing));
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!(LintMode::from_str("template").unwrap(), LintMode::Template);
        assert_eq!(LintMode::from_str("output").unwrap(), LintMode::Output);
        assert_eq!(LintMode::from_str("all").unwrap(), LintMode::All);
        assert!(matches!(
            LintMode::from_str("bogus"),
            Err(LintError::UnknownMode(_))
        ));
    }
}
