//! Direct-serialization outputs: themes, the runtime composition helper,
//! verbatim script actions and the application entry file. None of these
//! involve compilation; they are plain text assembly around the package
//! contents.

use serde_json::Value;

use crate::error::CompileError;

/// Source of the shared runtime helper every other-traits composition
/// imports.
const HELPERS_SOURCE: &str = "\
export const applyTraits = ({ sysPrps, prps, traits }) => {
\tconst res = {
\t\t...sysPrps,
\t\tprps
\t};

\ttraits.forEach(t => {
\t\tif (t?.prps)
\t\t\tObject.assign(res.prps, { ...t.prps });
\t});

\treturn res;
};
";

const MAIN_TEMPLATE: &str = "\
import Startup from './$PATH_TO_INDEX$';
import { createRoot } from 'react-dom/client';

import '@intenda/opus-ui-repeater-grid';
import '@intenda/opus-ui-components';
import '@intenda/opus-ui-drag-move';
import '@intenda/opus-ui-grid';

$THEME_IMPORTS$

//Opus
import Opus from '@intenda/opus-ui';

//Plugins
import '@intenda/vite-plugin-opus-hot-reload/src/hotReload';

//Styles
import './transpiled.css';

const env = import.meta.env.VITE_APP_MODE;

const themesConfig = $THEMES_CONFIG$;

const root = createRoot(document.getElementById('root'));
root.render(
\t<Opus options={{ env }}
\t\tstartupComponent={<Startup />}
\t\tthemesConfig={themesConfig}
\t\twindowHelpers={{
\t\t\tinclude: ['spliceWhere']
\t\t}}
\t/>
);
";

/// The fixed helper module, emitted once per run.
pub fn build_helpers() -> (String, String) {
    ("helpers.jsx".to_string(), HELPERS_SOURCE.to_string())
}

/// Serializes one theme document. Theme files move from `theme/` into the
/// generated `themes/` directory.
pub fn build_theme(path: &str, contents: &Value) -> Result<(String, String), CompileError> {
    let out_path = path
        .replace("theme/", "themes/")
        .replace(".json", ".jsx");

    let body = serde_json::to_string_pretty(contents)?;
    let text = format!("const Theme =\n{}\n;\n\nexport default Theme;\n", body);

    Ok((out_path, text))
}

/// Script actions are copied through untouched.
pub fn build_script_action(path: &str, source: &str) -> (String, String) {
    (format!("dashboard/{}.js", path), source.to_string())
}

/// The application entry file: startup screen import, theme imports and
/// config, root render.
pub fn build_main(startup_path: &str, theme_names: &[String]) -> (String, String) {
    let theme_imports: Vec<String> = theme_names
        .iter()
        .map(|t| format!("import theme_{0} from './themes/{0}';", t))
        .collect();

    let themes_config = format!(
        "{{\n\tthemes: {{\n\t\t{}\n\t}}\n}}",
        theme_names
            .iter()
            .map(|t| format!("{0}: theme_{0}", t))
            .collect::<Vec<_>>()
            .join(",\n\t\t")
    );

    let text = MAIN_TEMPLATE
        .replace("$PATH_TO_INDEX$", &format!("dashboard/{}", startup_path))
        .replace("$THEME_IMPORTS$", &theme_imports.join("\n"))
        .replace("$THEMES_CONFIG$", &themes_config);

    ("main.jsx".to_string(), text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn theme_moves_into_themes_directory() {
        let (path, text) =
            build_theme("theme/dark.json", &json!({ "global": { "padding": "4px" } })).unwrap();
        assert_eq!(path, "themes/dark.jsx");
        assert!(text.starts_with("const Theme ="));
        assert!(text.contains("\"padding\": \"4px\""));
        assert!(text.ends_with("export default Theme;\n"));
    }

    #[test]
    fn script_action_lands_under_dashboard_with_js_extension() {
        let (path, text) = build_script_action("actions/save", "export default 1;");
        assert_eq!(path, "dashboard/actions/save.js");
        assert_eq!(text, "export default 1;");
    }

    #[test]
    fn main_entry_wires_startup_and_themes() {
        let (path, text) = build_main(
            "screens/home/index",
            &["base".to_string(), "dark".to_string()],
        );
        assert_eq!(path, "main.jsx");
        assert!(text.contains("import Startup from './dashboard/screens/home/index';"));
        assert!(text.contains("import theme_base from './themes/base';"));
        assert!(text.contains("import theme_dark from './themes/dark';"));
        assert!(text.contains("base: theme_base,\n\t\tdark: theme_dark"));
    }

    #[test]
    fn helpers_module_exports_apply_traits() {
        let (path, text) = build_helpers();
        assert_eq!(path, "helpers.jsx");
        assert!(text.contains("export const applyTraits"));
    }
}
