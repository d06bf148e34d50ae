//! Inline SVG bar chart for a [`ChartSpec`].
use convertrail_game::ChartSpec;
use yew::prelude::*;

const WIDTH: f64 = 400.0;
const HEIGHT: f64 = 280.0;
const MARGIN_LEFT: f64 = 56.0;
const MARGIN_RIGHT: f64 = 16.0;
const MARGIN_TOP: f64 = 40.0;
const MARGIN_BOTTOM: f64 = 36.0;
/// Fraction of each slot a bar fills.
const BAR_FILL: f64 = 0.6;
/// Headroom above the tallest bar.
const HEADROOM: f64 = 1.2;

/// Geometry of one rendered bar.
#[derive(Debug, Clone, PartialEq)]
pub struct BarGeometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Lay out `chart`'s bars inside the plot area.
#[must_use]
pub fn layout(chart: &ChartSpec) -> Vec<BarGeometry> {
    let plot_width = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_height = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
    let max = chart.max_value() * HEADROOM;
    let scale = if max > 0.0 { plot_height / max } else { 0.0 };
    #[allow(clippy::cast_precision_loss)]
    let slot = plot_width / chart.bars.len().max(1) as f64;
    let bar_width = slot * BAR_FILL;

    chart
        .bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            #[allow(clippy::cast_precision_loss)]
            let x = MARGIN_LEFT + slot * i as f64 + (slot - bar_width) / 2.0;
            let height = bar.value.max(0.0) * scale;
            BarGeometry {
                x,
                y: MARGIN_TOP + plot_height - height,
                width: bar_width,
                height,
            }
        })
        .collect()
}

fn fmt(value: f64) -> String {
    format!("{value:.1}")
}

#[derive(Properties, PartialEq)]
pub struct BarChartProps {
    pub chart: ChartSpec,
}

#[function_component(BarChart)]
pub fn bar_chart(props: &BarChartProps) -> Html {
    let chart = &props.chart;
    let axis_y = HEIGHT - MARGIN_BOTTOM;
    let bars = chart
        .bars
        .iter()
        .zip(layout(chart))
        .enumerate()
        .map(|(i, (bar, geo))| {
            let class = if i == 0 { "bar control" } else { "bar variant" };
            let center = geo.x + geo.width / 2.0;
            html! {
                <g>
                    <rect class={class} x={fmt(geo.x)} y={fmt(geo.y)}
                        width={fmt(geo.width)} height={fmt(geo.height)} />
                    <text x={fmt(center)} y={fmt(geo.y - 6.0)} text-anchor="middle">
                        { format!("{:.2}%", bar.value) }
                    </text>
                    <text x={fmt(center)} y={fmt(axis_y + 18.0)} text-anchor="middle">
                        { bar.label.clone() }
                    </text>
                </g>
            }
        })
        .collect::<Html>();
    let label_y = MARGIN_TOP + (HEIGHT - MARGIN_TOP - MARGIN_BOTTOM) / 2.0;

    html! {
        <svg class="chart" viewBox={format!("0 0 {WIDTH} {HEIGHT}")} role="img"
            aria-label={chart.title.clone()}>
            <text class="title" x={fmt(WIDTH / 2.0)} y="20" text-anchor="middle">
                { chart.title.clone() }
            </text>
            <text x="14" y={fmt(label_y)} text-anchor="middle"
                transform={format!("rotate(-90 14 {})", fmt(label_y))}>
                { chart.y_label.clone() }
            </text>
            <line x1={fmt(MARGIN_LEFT)} y1={fmt(axis_y)} x2={fmt(WIDTH - MARGIN_RIGHT)}
                y2={fmt(axis_y)} stroke="#5b6475" />
            { bars }
        </svg>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use convertrail_game::Bar;

    fn chart(values: &[f64]) -> ChartSpec {
        ChartSpec {
            title: "t".into(),
            y_label: "y".into(),
            bars: values
                .iter()
                .map(|v| Bar {
                    label: "b".into(),
                    value: *v,
                })
                .collect(),
        }
    }

    #[test]
    fn tallest_bar_leaves_headroom() {
        let bars = layout(&chart(&[5.0, 7.5]));
        let plot_height = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
        assert!((bars[1].height - plot_height / HEADROOM).abs() < 1e-9);
        assert!((bars[0].height / bars[1].height - 5.0 / 7.5).abs() < 1e-9);
        assert!(bars[0].x < bars[1].x);
        assert!((bars[0].y + bars[0].height - (HEIGHT - MARGIN_BOTTOM)).abs() < 1e-9);
    }

    #[test]
    fn all_zero_chart_has_flat_bars() {
        let bars = layout(&chart(&[0.0, 0.0]));
        assert!(bars.iter().all(|bar| bar.height.abs() < f64::EPSILON));
        assert!(layout(&chart(&[])).is_empty());
    }
}
