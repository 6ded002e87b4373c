//! ID prefix constants.
//!
//! Every entity ID is `{prefix}-{8 hex chars}`, e.g. `eng-3fa9c2d1`. IDs are
//! generated by the store (`randomblob`) inside the inserting transaction.

pub const PREFIX_USER: &str = "usr";
pub const PREFIX_PROGRAM_YEAR: &str = "pyr";
pub const PREFIX_ENGAGEMENT: &str = "eng";
pub const PREFIX_INTAKE: &str = "int";
pub const PREFIX_ASSET: &str = "ast";
pub const PREFIX_FINDING: &str = "fnd";
pub const PREFIX_TEMPLATE: &str = "tpl";
pub const PREFIX_TIMELINE: &str = "tle";
pub const PREFIX_COMMENT: &str = "cmt";

pub const ALL_PREFIXES: &[&str] = &[
    PREFIX_USER,
    PREFIX_PROGRAM_YEAR,
    PREFIX_ENGAGEMENT,
    PREFIX_INTAKE,
    PREFIX_ASSET,
    PREFIX_FINDING,
    PREFIX_TEMPLATE,
    PREFIX_TIMELINE,
    PREFIX_COMMENT,
];
