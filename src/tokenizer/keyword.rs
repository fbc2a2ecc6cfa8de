use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// Reserved words. They are recognized while scanning identifiers, so `thisValue` stays an
/// identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, EnumIter, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Keyword {
    This,
    Class,
    True,
    False,
    Null,
}
