use crate::i18n::t;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct ShellProps {
    #[prop_or_default]
    pub children: Html,
}

/// Site header, main column and footer shared by every page.
#[function_component(Shell)]
pub fn shell(props: &ShellProps) -> Html {
    html! {
        <>
            <header class="site">
                <a class="brand" href="/">{ t("app.name") }</a>
                <span class="tagline">{ t("app.tagline") }</span>
                <nav>
                    <a href="/game">{ t("nav.dashboard") }</a>
                </nav>
            </header>
            <main>{ props.children.clone() }</main>
            <footer class="site">{ t("footer.note") }</footer>
        </>
    }
}
