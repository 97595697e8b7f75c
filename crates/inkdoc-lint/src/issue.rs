use std::fmt;

/// A single finding, in the order the checks discovered it.
///
/// The [`Display`](fmt::Display) form is one report line per issue, prefixed
/// with the check name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issue {
    /// A placeholder whose text is spread over more than one run.
    ///
    /// Run indexes are one-based and count the paragraph's direct child
    /// runs, the same runs the header repair can merge.
    RunSplit {
        part: String,
        paragraph: usize,
        run_start: usize,
        run_end: usize,
        placeholder: String,
        text: String,
    },

    /// A body-styled paragraph sitting inside a header, footer, table, or
    /// text box, where generated content would inherit the wrong layout.
    BodyStyleLocation {
        part: String,
        paragraph: usize,
        style: String,
        text: String,
    },

    /// A relationship whose target lives outside the package.
    ExternalRels { part: String, target: String },

    /// A field instruction that pulls in external content when updated.
    FieldExternal { part: String, text: String },

    /// An embedded OLE or ActiveX part.
    EmbeddedObject { part: String },
}

impl Issue {
    /// The check that produced this issue.
    #[must_use]
    pub fn check_name(&self) -> &'static str {
        match self {
            Self::RunSplit { .. } => "RUN_SPLIT",
            Self::BodyStyleLocation { .. } => "BODY_STYLE_LOCATION",
            Self::ExternalRels { .. } => "EXTERNAL_RELS",
            Self::FieldExternal { .. } => "FIELD_EXTERNAL",
            Self::EmbeddedObject { .. } => "EMBEDDED_OBJECT",
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RunSplit {
                part,
                paragraph,
                run_start,
                run_end,
                placeholder,
                text,
            } => write!(
                f,
                "RUN_SPLIT {part}#p{paragraph} runs {run_start}-{run_end}: {placeholder} | {text}"
            ),
            Self::BodyStyleLocation {
                part,
                paragraph,
                style,
                text,
            } => write!(
                f,
                "BODY_STYLE_LOCATION {part}#p{paragraph} style={style} in header/footer/table/textbox: {text}"
            ),
            Self::ExternalRels { part, target } => {
                write!(f, "EXTERNAL_RELS {part}: {target}")
            }
            Self::FieldExternal { part, text } => {
                write!(f, "FIELD_EXTERNAL {part}: {text}")
            }
            Self::EmbeddedObject { part } => write!(f, "EMBEDDED_OBJECT {part}"),
        }
    }
}
