use crate::components::Shell;
use crate::i18n::t;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct ErrorPageProps {
    pub status: u16,
    pub message: String,
}

#[function_component(ErrorPage)]
pub fn error_page(props: &ErrorPageProps) -> Html {
    html! {
        <Shell>
            <section class="panel error" aria-live="assertive">
                <h1>{ t("error.title") }</h1>
                <p class="message">{ props.message.clone() }</p>
                <p class="status">{ format!("HTTP {}", props.status) }</p>
                <a href="/game">{ t("error.back") }</a>
            </section>
        </Shell>
    }
}
