//! Server-side HTML rendering.
//!
//! Templates live in `templates/` and are embedded into the binary; minijinja loads them by
//! name on first use. Names ending in `.html` are auto-escaped.

use minijinja::{Environment, context};
use rust_embed::RustEmbed;

use crate::filename::ALLOWED_EXTENSION;

#[derive(RustEmbed)]
#[folder = "templates/"]
struct Templates;

const INDEX: &str = "index.html";

/// Template environment wired to the embedded templates
pub fn environment() -> Environment<'static> {
    let mut env = Environment::new();
    env.set_loader(|name| Ok(Templates::get(name).map(|file| String::from_utf8_lossy(&file.data).into_owned())));
    env
}

/// Render the upload/download form with zero or more advisory messages
pub fn render_index(env: &Environment<'_>, viewer_base: &str, messages: &[String]) -> Result<String, minijinja::Error> {
    env.get_template(INDEX)?.render(context! {
        base_url => viewer_base,
        extension => ALLOWED_EXTENSION,
        messages => messages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_renders_forms_and_viewer_link() {
        let env = environment();
        let html = render_index(&env, "http://viewer:7575/#/logs/", &[]).unwrap();

        assert!(html.contains("viewer:7575"));
        assert!(html.contains("View Existing Logs"));
        assert!(html.contains(r#"name="file""#));
        assert!(html.contains(r#"accept=".eval""#));
        assert!(html.contains(r#"action="/download""#));
        assert!(html.contains(r#"name="eval_url""#));
        assert!(html.contains("Only .eval files are allowed"));
        assert!(!html.contains(r#"class="error""#));
    }

    #[test]
    fn test_index_renders_escaped_messages() {
        let env = environment();
        let messages = vec!["File '<script>.eval' not found".to_string()];
        let html = render_index(&env, "http://viewer:7575/#/logs/", &messages).unwrap();

        assert!(html.contains(r#"class="error""#));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }
}
