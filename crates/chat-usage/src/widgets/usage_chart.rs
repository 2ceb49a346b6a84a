use chat_usage_report::report::format_cost;
use chat_usage_report::{MonthlyRow, UsageReport};
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Bar, BarChart, BarGroup, Block, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

const INPUT_COLOR: Color = Color::Rgb(135, 206, 235); // skyblue
const OUTPUT_COLOR: Color = Color::Rgb(144, 238, 144); // lightgreen
const COST_COLOR: Color = Color::Red;
const AXIS_WIDTH: u16 = 10;
const GROUP_GAP: u16 = 1;

/// One of the two stacked views: monthly or cumulative.
pub struct ChartPanel<'a> {
    title: &'static str,
    token_axis: &'static str,
    input_label: &'static str,
    output_label: &'static str,
    cost_label: &'static str,
    rows: &'a [MonthlyRow],
    months_back: usize,
}

impl<'a> ChartPanel<'a> {
    pub fn monthly(report: &'a UsageReport) -> Self {
        Self {
            title: "Monthly Token Usage and Cost",
            token_axis: "Tokens",
            input_label: "Input Tokens",
            output_label: "Output Tokens",
            cost_label: "Monthly Cost",
            rows: report.monthly(),
            months_back: 0,
        }
    }

    pub fn cumulative(report: &'a UsageReport) -> Self {
        Self {
            title: "Cumulative Token Usage and Cost",
            token_axis: "Cumulative",
            input_label: "Cumulative Input Tokens",
            output_label: "Cumulative Output Tokens",
            cost_label: "Cumulative Cost",
            rows: report.cumulative(),
            months_back: 0,
        }
    }

    /// Moves the visible window this many months back from the latest month.
    pub fn scrolled(mut self, months_back: usize) -> Self {
        self.months_back = months_back;
        self
    }

    /// The rows drawn when at most `capacity` months fit. The window ends at the
    /// latest month unless scrolled back, and never scrolls past the first month.
    pub fn window(&self, capacity: usize) -> &'a [MonthlyRow] {
        let visible = capacity.max(1).min(self.rows.len());
        let hidden = self.rows.len() - visible;
        let end = self.rows.len() - self.months_back.min(hidden);
        &self.rows[end - visible..end]
    }

    fn title_for(&self, window: &[MonthlyRow]) -> String {
        match (window.first(), window.last()) {
            (Some(first), Some(last)) if window.len() < self.rows.len() => format!(
                "{} ({} to {}, {} of {} months)",
                self.title,
                first.month(),
                last.month(),
                window.len(),
                self.rows.len()
            ),
            _ => self.title.to_string(),
        }
    }
}

pub fn max_tokens(rows: &[MonthlyRow]) -> u64 {
    rows.iter()
        .map(|row| row.input_tokens().max(row.output_tokens()))
        .max()
        .unwrap_or(0)
}

pub fn max_cost(rows: &[MonthlyRow]) -> f64 {
    rows.iter().map(|row| row.cost_usd()).fold(0.0, f64::max)
}

/// Column layout of the grouped bars, shared with the cost line and the month
/// labels so all three use the same x positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarGeometry {
    bar_width: u16,
    group_gap: u16,
}

impl BarGeometry {
    /// How many month groups fit side by side with one-column bars.
    pub fn capacity(width: u16) -> usize {
        usize::from(width.saturating_add(GROUP_GAP) / (2 + GROUP_GAP)).max(1)
    }

    pub fn fit(width: u16, groups: usize) -> Self {
        let groups = u16::try_from(groups.max(1)).unwrap_or(u16::MAX);
        let slot = width.saturating_add(GROUP_GAP) / groups;
        let bar_width = (slot.saturating_sub(GROUP_GAP) / 2).max(1);

        Self {
            bar_width,
            group_gap: GROUP_GAP,
        }
    }

    pub fn bar_width(&self) -> u16 {
        self.bar_width
    }

    /// Columns taken by one group including the gap after it.
    pub fn slot(&self) -> u16 {
        2 * self.bar_width + self.group_gap
    }

    pub fn group_start(&self, index: usize) -> f64 {
        index as f64 * f64::from(self.slot())
    }

    /// The column between the input and output bar of a group.
    pub fn group_center(&self, index: usize) -> f64 {
        self.group_start(index) + f64::from(self.bar_width)
    }
}

pub struct UsageChartWidget;

impl UsageChartWidget {
    /// Draws the panel and returns how many months did not fit and can be scrolled to.
    pub fn render(frame: &mut Frame, area: Rect, panel: &ChartPanel) -> usize {
        let inner = Block::bordered().inner(area);
        let [legend_area, plot_area] =
            Layout::vertical([Constraint::Length(1), Constraint::Min(3)]).areas(inner);
        let [token_axis_area, bars_area, cost_axis_area] = Layout::horizontal([
            Constraint::Length(AXIS_WIDTH),
            Constraint::Min(1),
            Constraint::Length(AXIS_WIDTH),
        ])
        .areas(plot_area);
        let [graph_area, label_area] =
            Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(bars_area);

        let window = panel.window(BarGeometry::capacity(bars_area.width));
        let geometry = BarGeometry::fit(bars_area.width, window.len());

        frame.render_widget(Block::bordered().title(panel.title_for(window)), area);
        Self::render_legend(frame, legend_area, panel);
        Self::render_token_axis(frame, token_axis_area, panel, window);
        Self::render_cost_axis(frame, cost_axis_area, window);
        Self::render_bars(frame, graph_area, window, geometry);
        Self::render_cost_line(frame, graph_area, window, geometry);

        let labels = Paragraph::new(month_labels(window, geometry, label_area.width))
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(labels, label_area);

        panel.rows.len() - window.len()
    }

    fn render_legend(frame: &mut Frame, area: Rect, panel: &ChartPanel) {
        let tokens = Paragraph::new(Line::from(vec![
            Span::styled("■ ", Style::default().fg(INPUT_COLOR)),
            Span::raw(panel.input_label),
            Span::raw("  "),
            Span::styled("■ ", Style::default().fg(OUTPUT_COLOR)),
            Span::raw(panel.output_label),
        ]))
        .alignment(Alignment::Left);

        let cost = Paragraph::new(Line::from(vec![
            Span::styled("─•─ ", Style::default().fg(COST_COLOR)),
            Span::raw(panel.cost_label),
        ]))
        .alignment(Alignment::Right);

        frame.render_widget(tokens, area);
        frame.render_widget(cost, area);
    }

    fn render_token_axis(frame: &mut Frame, area: Rect, panel: &ChartPanel, window: &[MonthlyRow]) {
        let lines = axis_lines(
            area.height,
            format_compact(max_tokens(window)),
            "0".to_string(),
            panel.token_axis,
        );
        let axis = Paragraph::new(lines)
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Right);
        frame.render_widget(axis, area);
    }

    fn render_cost_axis(frame: &mut Frame, area: Rect, window: &[MonthlyRow]) {
        let lines = axis_lines(
            area.height,
            format_axis_cost(max_cost(window)),
            format_axis_cost(0.0),
            "Cost (USD)",
        );
        let axis = Paragraph::new(lines)
            .style(Style::default().fg(COST_COLOR))
            .alignment(Alignment::Left);
        frame.render_widget(axis, area);
    }

    fn render_bars(frame: &mut Frame, area: Rect, window: &[MonthlyRow], geometry: BarGeometry) {
        let input_style = Style::default().fg(INPUT_COLOR);
        let output_style = Style::default().fg(OUTPUT_COLOR);

        let mut chart = BarChart::default()
            .bar_width(geometry.bar_width())
            .bar_gap(0)
            .group_gap(geometry.group_gap)
            .max(max_tokens(window).max(1));

        for row in window {
            let group = BarGroup::default().bars(&[
                Bar::default()
                    .value(row.input_tokens())
                    .text_value(String::new())
                    .style(input_style),
                Bar::default()
                    .value(row.output_tokens())
                    .text_value(String::new())
                    .style(output_style),
            ]);
            chart = chart.data(group);
        }

        frame.render_widget(chart, area);
    }

    fn render_cost_line(frame: &mut Frame, area: Rect, window: &[MonthlyRow], geometry: BarGeometry) {
        if area.width == 0 || area.height == 0 || window.is_empty() {
            return;
        }

        let points: Vec<(f64, f64)> = window
            .iter()
            .enumerate()
            .map(|(i, row)| (geometry.group_center(i), row.cost_usd()))
            .collect();
        let cost_style = Style::default().fg(COST_COLOR);

        let datasets = vec![
            Dataset::default()
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(cost_style)
                .data(&points),
            Dataset::default()
                .marker(Marker::Dot)
                .graph_type(GraphType::Scatter)
                .style(cost_style)
                .data(&points),
        ];

        let y_max = match max_cost(window) {
            cost if cost > 0.0 => cost,
            _ => 1.0,
        };
        // One x unit per terminal column.
        let x_max = f64::from(area.width.saturating_sub(1).max(1));

        let chart = Chart::new(datasets)
            .x_axis(Axis::default().bounds([0.0, x_max]))
            .y_axis(Axis::default().bounds([0.0, y_max]))
            .legend_position(None);

        frame.render_widget(chart, area);
    }
}

/// The label row under the bars, exactly `width` columns wide.
///
/// Labels are `YYYY-MM` when a group is wide enough and `YY-MM` otherwise. When
/// even those would collide only every n-th month is labelled, counting back
/// from the latest month so it is always shown. A label that would overlap its
/// right neighbour is dropped.
fn month_labels(window: &[MonthlyRow], geometry: BarGeometry, width: u16) -> String {
    let width = usize::from(width);
    let slot = usize::from(geometry.slot());
    let long = slot > 7;
    let label_len: usize = if long { 7 } else { 5 };
    let step = (label_len + 1).div_ceil(slot);

    let mut line = vec![' '; width];
    let mut limit = width;

    for (i, row) in window.iter().enumerate().rev() {
        if (window.len() - 1 - i) % step != 0 {
            continue;
        }
        if limit < label_len {
            break;
        }

        let month = row.month();
        let label = if long {
            month.to_string()
        } else {
            format!("{:02}-{:02}", month.year().rem_euclid(100), month.month())
        };

        // Centered on the group, but never past the group's last bar column.
        let group_end = geometry.group_start(i) as usize + 2 * usize::from(geometry.bar_width());
        let start = (geometry.group_center(i) as usize)
            .saturating_sub(label_len / 2)
            .min(group_end.saturating_sub(label_len));
        if start + label_len > limit {
            continue;
        }
        for (offset, c) in label.chars().enumerate() {
            line[start + offset] = c;
        }
        limit = start.saturating_sub(1);
    }

    line.into_iter().collect()
}

/// Top label, bottom label on the baseline, and the axis name on the label row.
fn axis_lines(height: u16, top: String, bottom: String, name: &str) -> Vec<Line<'static>> {
    let height = usize::from(height);
    if height < 3 {
        return vec![Line::from(top)];
    }

    let mut lines = vec![Line::from(top)];
    lines.extend((0..height - 3).map(|_| Line::from("")));
    lines.push(Line::from(bottom));
    lines.push(Line::from(name.to_string()));
    lines
}

/// Short token counts for the axis: `999`, `12.3K`, `4.5M`.
pub fn format_compact(n: u64) -> String {
    match n {
        0..=999 => n.to_string(),
        1_000..=999_999 => format!("{:.1}K", n as f64 / 1_000.0),
        1_000_000..=999_999_999 => format!("{:.1}M", n as f64 / 1_000_000.0),
        _ => format!("{:.1}B", n as f64 / 1_000_000_000.0),
    }
}

/// Dollar amount for the cost axis. Amounts under a cent keep enough digits to stay non-zero.
pub fn format_axis_cost(cost: f64) -> String {
    if cost <= 0.0 {
        "$0.00".to_string()
    } else if cost < 0.0001 {
        format!("${:.1e}", cost)
    } else if cost < 0.01 {
        format!("${:.4}", cost)
    } else {
        format!("${}", format_cost(cost))
    }
}
