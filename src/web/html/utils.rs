use html_minifier::HTMLMinifier;
use tera::Context;
use thiserror::Error;
use tracing::warn;

use crate::State;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("rendering error")]
    Tera(#[from] tera::Error),
}

/// Renders `template` and minifies the result, falling back to the
/// unminified page when minification fails.
pub(super) fn render(
    state: &State,
    template: &'static str,
    context: &Context,
) -> Result<String, TemplateError> {
    let rendered = state.tera.render(template, context)?;
    Ok(minify(rendered))
}

fn minify(rendered: String) -> String {
    let mut html_minifier = HTMLMinifier::new();
    if let Err(err) = html_minifier.digest(&rendered) {
        warn!("Failed to minify HTML: {}", err);
        return rendered;
    };

    match std::str::from_utf8(html_minifier.get_html()) {
        Ok(minified) => minified.to_string(),
        Err(err) => {
            warn!("Failed to parse minified HTML as UTF-8: {}", err);
            rendered
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minify_collapses_whitespace() {
        let minified = minify("<p>\n    hello\n    <b>world</b>\n</p>\n".to_string());
        assert!(minified.len() < 30);
        assert!(minified.contains("hello"));
        assert!(minified.contains("<b>world</b>"));
    }
}
