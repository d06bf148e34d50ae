use crate::components::{BarChart, Shell};
use crate::i18n::{fmt_p_value, fmt_pct, t, tf};
use convertrail_game::TestResultView;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct ResultsPageProps {
    pub result: TestResultView,
    pub implementation_cost: i64,
}

#[function_component(ResultsPage)]
pub fn results_page(props: &ResultsPageProps) -> Html {
    let result = &props.result;
    let record = &result.record;

    let (verdict_class, verdict) = if result.significant {
        ("verdict significant", t("results.significant"))
    } else {
        ("verdict not-significant", t("results.not_significant"))
    };

    let action = if result.implemented {
        html! { <p class="implemented">{ t("results.implemented") }</p> }
    } else if result.can_implement {
        html! {
            <form method="post" action="/implement_change">
                <input type="hidden" name="test_id" value={result.test_id.to_string()} />
                <button type="submit">
                    { tf("results.implement", &[("cost", props.implementation_cost.to_string())]) }
                </button>
            </form>
        }
    } else {
        html! { <p class="cannot-implement">{ t("results.cannot_implement") }</p> }
    };

    let p_value = tf("results.p_value", &[("p", fmt_p_value(record.p_value))]);
    let lift = tf("results.lift", &[("lift", format!("{:+.1}", result.lift_pct))]);

    html! {
        <Shell>
            <h1>{ t("results.title") }</h1>
            <h2>{ tf("results.heading", &[
                ("element", record.element.clone()),
                ("variant", record.variant.clone()),
            ]) }</h2>
            <section class="panel">
                <BarChart chart={result.chart.clone()} />
            </section>
            <section class="panel numbers">
                <table>
                    <thead>
                        <tr>
                            <th>{ t("results.arm") }</th>
                            <th>{ t("results.visitors") }</th>
                            <th>{ t("results.conversions") }</th>
                            <th>{ t("results.rate") }</th>
                        </tr>
                    </thead>
                    <tbody>
                        <tr class="control">
                            <td>{ t("results.control") }</td>
                            <td>{ record.control_visitors }</td>
                            <td>{ record.control_conversions }</td>
                            <td>{ fmt_pct(result.control_rate_pct) }</td>
                        </tr>
                        <tr class="variant">
                            <td>{ t("results.variant") }</td>
                            <td>{ record.variant_visitors }</td>
                            <td>{ record.variant_conversions }</td>
                            <td>{ fmt_pct(result.variant_rate_pct) }</td>
                        </tr>
                    </tbody>
                </table>
                <p class="p-value">{ p_value }</p>
                <p class="chi-square">
                    { tf("results.chi_square", &[("chi", format!("{:.3}", record.chi_square))]) }
                </p>
                <p class="lift">{ lift }</p>
                <p class={verdict_class}>{ verdict }</p>
            </section>
            <section class="panel action">{ action }</section>
            <a href="/game">{ t("results.back") }</a>
        </Shell>
    }
}
