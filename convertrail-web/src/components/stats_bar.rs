use crate::i18n::{fmt_money, fmt_pct, t, tf};
use convertrail_game::GameView;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct StatsBarProps {
    pub view: GameView,
}

#[function_component(StatsBar)]
pub fn stats_bar(props: &StatsBarProps) -> Html {
    let view = &props.view;
    let day = tf(
        "stats.day",
        &[
            ("day", view.day.to_string()),
            ("total", view.total_days.to_string()),
        ],
    );
    html! {
        <section class="panel stats-bar" aria-label="game status">
            <div class="stat day"><span class="value">{ day }</span></div>
            <div class="stat budget">
                <span class="label">{ t("stats.budget") }</span>
                <span class="value">{ fmt_money(view.budget) }</span>
            </div>
            <div class="stat rate">
                <span class="label">{ t("stats.conversion_rate") }</span>
                <span class="value">{ fmt_pct(view.conversion_rate_pct) }</span>
            </div>
            <div class="stat revenue">
                <span class="label">{ t("stats.revenue") }</span>
                <span class="value">{ fmt_money(view.total_revenue) }</span>
            </div>
            <div class="stat tests">
                <span class="label">{ t("stats.tests_run") }</span>
                <span class="value">{ view.tests_run }</span>
            </div>
        </section>
    }
}
