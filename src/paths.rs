//! Lexical path algebra and identifier derivation.
//!
//! Logical paths are `/`-joined strings rooted at the `dashboard/` segment.
//! Nothing in here touches the filesystem: relative import paths must come
//! out identical on every platform given identical inputs.

/// Root segment every logical document path hangs under.
pub const LOGICAL_ROOT: &str = "dashboard/";

/// Uppercases the first character, leaving the rest untouched.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// PascalCase identifier for a trait module, derived from its logical path:
/// strip a leading `@` marker, strip the root segment, capitalize each
/// remaining segment and concatenate.
pub fn trait_type_ident(path: &str) -> String {
    ident_from_path(path, false)
}

/// Identifier for a script-action module. Same derivation as traits except
/// the first segment keeps its original casing, yielding camelCase for
/// designer-named scripts.
pub fn script_handler_ident(path: &str) -> String {
    ident_from_path(path, true)
}

fn ident_from_path(path: &str, keep_first: bool) -> String {
    let stripped = path.replace('@', "");
    let stripped = stripped.strip_prefix(LOGICAL_ROOT).unwrap_or(&stripped);

    stripped
        .split('/')
        .enumerate()
        .map(|(i, seg)| {
            if keep_first && i == 0 {
                seg.to_string()
            } else {
                capitalize(seg)
            }
        })
        .collect()
}

/// Relative module path from the document at `current_path` to
/// `target_path`, by pure segment arithmetic: drop the current filename,
/// find the longest common leading prefix, go up once per remaining current
/// segment, then descend into the target's remainder. `./` when no parent
/// traversal is needed.
pub fn relative_import_path(current_path: &str, target_path: &str) -> String {
    let mut current: Vec<&str> = current_path.split('/').collect();
    let target: Vec<&str> = target_path.split('/').collect();

    // Remove filename from current path (e.g. index.json)
    current.pop();

    let mut i = 0;
    while i < current.len() && i < target.len() && current[i] == target[i] {
        i += 1;
    }

    let ups = current.len() - i;
    let remaining = target[i..].join("/");

    if ups == 0 {
        format!("./{}", remaining)
    } else {
        format!("{}{}", "../".repeat(ups), remaining)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_path_sibling_directory() {
        assert_eq!(
            relative_import_path("dashboard/a/b/index", "dashboard/a/c/widget"),
            "../c/widget"
        );
    }

    #[test]
    fn relative_path_same_directory() {
        assert_eq!(
            relative_import_path("dashboard/index", "dashboard/helpers"),
            "./helpers"
        );
    }

    #[test]
    fn relative_path_descending() {
        assert_eq!(
            relative_import_path("dashboard/a/index", "dashboard/a/b/c"),
            "./b/c"
        );
    }

    #[test]
    fn relative_path_to_root_helper() {
        assert_eq!(
            relative_import_path("dashboard/screens/index.json", "helpers"),
            "../../helpers"
        );
    }

    #[test]
    fn trait_ident_is_pascal_case_across_segments() {
        assert_eq!(trait_type_ident("dashboard/card"), "Card");
        assert_eq!(
            trait_type_ident("dashboard/traits/hoverState"),
            "TraitsHoverState"
        );
        assert_eq!(trait_type_ident("dashboard/@shared/tooltip"), "SharedTooltip");
    }

    #[test]
    fn script_ident_keeps_first_segment_casing() {
        assert_eq!(
            script_handler_ident("dashboard/actions/onClick"),
            "actionsOnClick"
        );
        assert_eq!(script_handler_ident("dashboard/submit"), "submit");
    }
}
