use crate::components::{Shell, StatsBar};
use crate::i18n::{fmt_p_value, t, tf};
use convertrail_game::{GameView, TestSummary};
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct GamePageProps {
    pub view: GameView,
}

fn history_row(summary: &TestSummary) -> Html {
    let (badge_class, badge) = if summary.significant {
        ("badge significant", t("game.significant"))
    } else {
        ("badge not-significant", t("game.not_significant"))
    };
    html! {
        <tr>
            <td>{ summary.test_id }</td>
            <td>{ summary.element.clone() }</td>
            <td>{ summary.variant.clone() }</td>
            <td>{ summary.days }</td>
            <td>
                { fmt_p_value(summary.p_value) }{ " " }
                <span class={badge_class}>{ badge }</span>
            </td>
            <td><a href={format!("/results/{}", summary.test_id)}>{ t("game.view") }</a></td>
        </tr>
    }
}

/// Dashboard: current numbers, next action, history and adopted changes.
#[function_component(GamePage)]
pub fn game_page(props: &GamePageProps) -> Html {
    let view = &props.view;

    let next_step = if view.finished {
        html! {
            <p class="finished">
                { tf("game.finished", &[
                    ("rate", format!("{:.2}", view.conversion_rate_pct)),
                    ("revenue", view.total_revenue.to_string()),
                ]) }
            </p>
        }
    } else if view.can_run_test {
        html! { <a class="button run-test" href="/run_test">{ t("game.run_test") }</a> }
    } else {
        html! { <p class="cannot-test">{ t("game.cannot_test") }</p> }
    };

    let history = if view.history.is_empty() {
        html! { <p class="empty">{ t("game.no_tests") }</p> }
    } else {
        html! {
            <table class="history">
                <thead>
                    <tr>
                        <th>{ t("game.col_test") }</th>
                        <th>{ t("game.col_element") }</th>
                        <th>{ t("game.col_variant") }</th>
                        <th>{ t("game.col_days") }</th>
                        <th>{ t("game.col_p") }</th>
                        <th></th>
                    </tr>
                </thead>
                <tbody>
                    { for view.history.iter().map(history_row) }
                </tbody>
            </table>
        }
    };

    let adopted = if view.implemented_changes.is_empty() {
        html! { <p class="empty">{ t("game.no_changes") }</p> }
    } else {
        html! {
            <ul class="adopted">
                { for view.implemented_changes.iter().map(|(element, variant)| html! {
                    <li><strong>{ element.clone() }</strong>{ ": " }{ variant.clone() }</li>
                }) }
            </ul>
        }
    };

    html! {
        <Shell>
            <h1>{ t("game.title") }</h1>
            <StatsBar view={view.clone()} />
            <section class="panel next-step">
                { next_step }
            </section>
            <section class="panel">
                <h2>{ t("game.history") }</h2>
                { history }
            </section>
            <section class="panel">
                <h2>{ t("game.adopted") }</h2>
                { adopted }
            </section>
            <form method="post" action="/start_game">
                <button type="submit" class="secondary">{ t("home.restart") }</button>
            </form>
        </Shell>
    }
}
