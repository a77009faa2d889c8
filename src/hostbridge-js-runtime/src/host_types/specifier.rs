use std::fmt;

use hostbridge_js_common::{HOST_TYPES_PREFIX, NAMESPACE_SEPARATOR, PATH_SEPARATOR};

/// Dotted path of a host type, e.g. `game.PlayerEntity`. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HostTypePath(String);

impl HostTypePath {
    pub(crate) fn from_dotted(path: &str) -> Self {
        Self(path.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The module specifier that imports this host type, e.g. `hosttypes/game/PlayerEntity`.
    pub fn to_specifier(&self) -> String {
        let mut specifier = String::from(HOST_TYPES_PREFIX);
        specifier.extend(self.0.chars().map(|c| {
            if c == NAMESPACE_SEPARATOR {
                PATH_SEPARATOR
            } else {
                c
            }
        }));
        specifier
    }
}

impl fmt::Display for HostTypePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The key a bound host type is exported under: whatever the script wrote after the
/// last `/` of the specifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExportName(String);

impl ExportName {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the name can be used as a named ESM export binding.
    pub fn is_identifier(&self) -> bool {
        is_identifier(&self.0)
    }
}

impl fmt::Display for ExportName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A module specifier that names a host type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostTypeImport {
    pub path: HostTypePath,
    pub export_name: ExportName,
}

/// Decide whether `specifier` names a host type.
///
/// `hosttypes/a/b/ClassName` yields the path `a.b.ClassName` exported as `ClassName`.
/// Anything that does not start with [`HOST_TYPES_PREFIX`], or has nothing after it,
/// is left to native resolution. Whether the path actually resolves is not checked here.
pub fn classify(specifier: &str) -> Option<HostTypeImport> {
    let remainder = specifier.strip_prefix(HOST_TYPES_PREFIX)?;
    if remainder.is_empty() {
        return None;
    }

    let path = remainder
        .chars()
        .map(|c| {
            if c == PATH_SEPARATOR {
                NAMESPACE_SEPARATOR
            } else {
                c
            }
        })
        .collect();

    // taken from the full specifier, the prefix itself ends in a separator
    let export_name = specifier.rsplit(PATH_SEPARATOR).next().unwrap_or_default();

    Some(HostTypeImport {
        path: HostTypePath(path),
        export_name: ExportName(export_name.to_string()),
    })
}

const RESERVED_WORDS: &[&str] = &[
    "await", "break", "case", "catch", "class", "const", "continue", "debugger", "default",
    "delete", "do", "else", "enum", "export", "extends", "false", "finally", "for", "function",
    "if", "implements", "import", "in", "instanceof", "interface", "let", "new", "null",
    "package", "private", "protected", "public", "return", "static", "super", "switch", "this",
    "throw", "true", "try", "typeof", "var", "void", "while", "with", "yield",
];

pub(crate) fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(unicode_ident::is_xid_start(first) || first == '$' || first == '_') {
        return false;
    }
    if !chars.all(|c| unicode_ident::is_xid_continue(c) || c == '$') {
        return false;
    }
    !RESERVED_WORDS.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classified(specifier: &str) -> (String, String) {
        let import = classify(specifier).unwrap();
        (
            import.path.as_str().to_string(),
            import.export_name.as_str().to_string(),
        )
    }

    #[test]
    fn test_host_type_specifier() {
        assert_eq!(
            classified("hosttypes/game/PlayerEntity"),
            ("game.PlayerEntity".to_string(), "PlayerEntity".to_string())
        );
        assert_eq!(
            classified("hosttypes/a/b/ClassName"),
            ("a.b.ClassName".to_string(), "ClassName".to_string())
        );
    }

    #[test]
    fn test_single_segment() {
        assert_eq!(
            classified("hosttypes/Clock"),
            ("Clock".to_string(), "Clock".to_string())
        );
    }

    #[test]
    fn test_export_name_keeps_casing() {
        assert_eq!(
            classified("hosttypes/game/entity/playerEntity"),
            ("game.entity.playerEntity".to_string(), "playerEntity".to_string())
        );
    }

    #[test]
    fn test_unresolvable_paths_are_still_classified() {
        assert_eq!(
            classified("hosttypes/unknown/Nope"),
            ("unknown.Nope".to_string(), "Nope".to_string())
        );
        // a trailing separator leaves an empty export name; binding decides what happens
        assert_eq!(
            classified("hosttypes/game/"),
            ("game.".to_string(), "".to_string())
        );
    }

    #[test]
    fn test_non_host_specifiers() {
        for specifier in [
            "./local/helper.js",
            "../hosttypes/game/PlayerEntity",
            "/hosttypes/game/PlayerEntity",
            "./hosttypes/game/PlayerEntity",
            "hosttypes",
            "hosttypes/",
            "hosttypesgame/PlayerEntity",
            "HostTypes/game/PlayerEntity",
            "require",
            "",
        ] {
            assert_eq!(classify(specifier), None, "{specifier:?} should not classify");
        }
    }

    #[test]
    fn test_classify_is_deterministic() {
        let specifier = "hosttypes/game/PlayerEntity";
        assert_eq!(classify(specifier), classify(specifier));
    }

    #[test]
    fn test_path_round_trips_to_specifier() {
        let import = classify("hosttypes/game/world/Block").unwrap();
        assert_eq!(import.path.to_specifier(), "hosttypes/game/world/Block");
    }

    #[test]
    fn test_identifiers() {
        assert!(is_identifier("PlayerEntity"));
        assert!(is_identifier("_private"));
        assert!(is_identifier("$el"));
        assert!(is_identifier("Straße"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("my-type"));
        assert!(!is_identifier("1st"));
        assert!(!is_identifier("default"));
        assert!(!is_identifier("class"));
    }
}
