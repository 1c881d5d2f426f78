use std::fmt;
use std::str::FromStr;

use crate::error::GenerateError;

/// Generation mode, chosen once per invocation and immutable thereafter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Every reachable entity of the document.
    Full,
    /// Exactly one named entity plus its structural closure.
    Object,
    /// Direction-labelled sub-schemas, each generated independently.
    Http,
}

impl Target {
    /// True only for the mode that additionally needs a class name.
    pub fn is_objectable(&self) -> bool {
        matches!(self, Target::Object)
    }
}

impl FromStr for Target {
    type Err = GenerateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(Target::Full),
            "object" => Ok(Target::Object),
            "http" => Ok(Target::Http),
            other => Err(GenerateError::UnknownTarget(other.to_string())),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Target::Full => "full",
            Target::Object => "object",
            Target::Http => "http",
        };
        f.write_str(name)
    }
}
