//! The single-page UI.

use std::fmt::Write;

use crate::config::voices;

const TEMPLATE: &str = include_str!("index.html");

/// Render the page with the voice selector filled in, `default_voice` preselected.
pub fn render(default_voice: &str) -> String {
    TEMPLATE.replace("{{VOICE_OPTIONS}}", &voice_options(default_voice)).replace("{{VERSION}}", env!("CARGO_PKG_VERSION"))
}

fn voice_options(default_voice: &str) -> String {
    let mut html = String::new();
    for language in voices::LANGUAGES {
        let _ = writeln!(html, "<optgroup label=\"{}\">", language);
        for (name, _) in voices::voices_in(language) {
            let selected = if name == default_voice { " selected" } else { "" };
            let _ = writeln!(html, "  <option value=\"{name}\"{selected}>{name}</option>");
        }
        html.push_str("</optgroup>\n");
    }
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_selects_default_voice() {
        let page = render("bf_emma");
        assert!(page.contains("<option value=\"bf_emma\" selected>bf_emma</option>"));
        assert!(page.contains("<option value=\"af_bella\">af_bella</option>"));
        assert_eq!(page.matches(" selected>").count(), 1);
        assert!(!page.contains("{{"));
    }

    #[test]
    fn test_render_groups_by_language() {
        let page = render("af_bella");
        assert_eq!(page.matches("<optgroup").count(), voices::LANGUAGES.len());
        assert_eq!(page.matches("<option value=").count(), 53);
    }
}
