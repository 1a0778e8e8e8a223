//! CLI command implementations

pub(crate) mod apply;
pub(crate) mod ls;
pub(crate) mod status;
