use crate::components::Shell;
use crate::i18n::{t, tf};
use convertrail_game::GameConfig;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct HomePageProps {
    pub config: GameConfig,
    /// The visitor already has a game in progress.
    #[prop_or_default]
    pub has_game: bool,
}

#[function_component(HomePage)]
pub fn home_page(props: &HomePageProps) -> Html {
    let config = &props.config;
    let rules = tf(
        "home.rules",
        &[
            ("budget", config.budget.to_string()),
            ("days", config.total_days.to_string()),
            ("cost", config.test_cost_per_day.to_string()),
            ("implement", config.implementation_cost.to_string()),
        ],
    );
    let start_label = if props.has_game {
        t("home.restart")
    } else {
        t("home.start")
    };

    html! {
        <Shell>
            <section class="panel home">
                <h1>{ t("home.title") }</h1>
                <p>{ t("home.intro") }</p>
                <p class="rules">{ rules }</p>
                <form method="post" action="/start_game" class="inline">
                    <button type="submit">{ start_label }</button>
                </form>
                if props.has_game {
                    { " " }
                    <a class="button continue" href="/game">{ t("home.continue") }</a>
                }
            </section>
        </Shell>
    }
}
