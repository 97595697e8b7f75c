//! CLI command implementations.

pub(crate) mod convert;
pub(crate) mod fix;
pub(crate) mod lint;

pub(crate) use convert::ConvertArgs;
pub(crate) use fix::FixCommand;
pub(crate) use lint::LintArgs;
