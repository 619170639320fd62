use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Which pointer-index rules apply to `PTRA`/`PTRB` expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PtrSyntax {
    /// Five bit signed index for every form (-16..15).
    #[default]
    Legacy,
    /// Six bit plain index (-32..31), update forms 1..16.
    V33,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AsmOptions {
    pub ptr_syntax: PtrSyntax,
    pub error_on_missing_file: bool, // false: FILE becomes an empty placeholder with a warning
    pub listing_compat: bool,
    pub include_dir: Option<PathBuf>, // FILE lookup for sources given as text
}

impl Default for AsmOptions {
    fn default() -> Self {
        Self {
            ptr_syntax: PtrSyntax::Legacy,
            error_on_missing_file: true,
            listing_compat: false,
            include_dir: None,
        }
    }
}

impl AsmOptions {
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let o = AsmOptions::from_json(r#"{ "ptr_syntax": "v33" }"#).unwrap();
        assert_eq!(o.ptr_syntax, PtrSyntax::V33);
        assert!(o.error_on_missing_file);
        assert!(!o.listing_compat);
    }
}
