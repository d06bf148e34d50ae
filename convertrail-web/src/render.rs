//! Server-side rendering of yew components into full HTML documents.
use futures::executor::block_on;
use yew::{BaseComponent, LocalServerRenderer};

use crate::error::WebError;

const STYLE: &str = include_str!("../static/style.css");

/// Render component `C` with `props` and wrap it in a page shell.
///
/// Rendering happens on a blocking thread so the async workers never wait on
/// the renderer.
///
/// # Errors
///
/// Returns `WebError::Render` if the rendering task panics or is cancelled.
pub async fn render_page<C>(title: String, props: C::Properties) -> Result<String, WebError>
where
    C: BaseComponent,
    C::Properties: Send + 'static,
{
    let body = tokio::task::spawn_blocking(move || render_body::<C>(props))
        .await
        .map_err(|err| WebError::Render(err.to_string()))?;
    Ok(document(&title, &body))
}

/// Render the component markup only.
#[must_use]
pub fn render_body<C>(props: C::Properties) -> String
where
    C: BaseComponent,
{
    block_on(
        LocalServerRenderer::<C>::with_props(props)
            .hydratable(false)
            .render(),
    )
}

#[must_use]
pub fn document(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{} | Convertrail</title>\n<style>{STYLE}</style>\n</head>\n\
         <body>\n{body}\n</body>\n</html>\n",
        escape_html(title)
    )
}

#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use yew::prelude::*;

    #[derive(Properties, PartialEq)]
    struct GreetingProps {
        name: String,
    }

    #[function_component(Greeting)]
    fn greeting(props: &GreetingProps) -> Html {
        html! { <p class="greeting">{ format!("Hello {}", props.name) }</p> }
    }

    #[test]
    fn document_wraps_body_and_escapes_title() {
        let html = document("A <b> & C", "<main>x</main>");
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>A &lt;b&gt; &amp; C | Convertrail</title>"));
        assert!(html.contains("<main>x</main>"));
        assert!(html.contains("<style>"));
    }

    #[tokio::test]
    async fn render_page_runs_component() {
        let props = GreetingProps {
            name: "<tester>".into(),
        };
        let html = render_page::<Greeting>("Hi".into(), props).await.unwrap();
        assert!(html.contains("class=\"greeting\""), "{html}");
        assert!(html.contains("Hello &lt;tester&gt;"), "{html}");
    }
}
