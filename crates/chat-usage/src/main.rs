use anyhow::Result;
use chat_usage_report::prelude::*;
use chat_usage_report::DEFAULT_EXPORT_PATH;
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Layout},
    DefaultTerminal, Frame,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod widgets;
use widgets::*;

#[derive(Parser, Debug)]
#[clap(author = "Red", version, about)]
struct Args {
    /// Exported conversations.json to analyze
    #[arg(default_value = DEFAULT_EXPORT_PATH)]
    input: String,

    /// JSON file overriding any of the pricing defaults
    #[arg(short = 'c', long = "config")]
    config: Option<String>,

    /// Model whose tokenizer is used for text parts
    #[arg(short = 'm', long = "model")]
    model: Option<String>,

    /// Print the tables only
    #[arg(long = "no-chart")]
    no_chart: bool,

    #[arg(short = 'v')]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn load_pricing(args: &Args) -> Result<PricingConfig> {
    let pricing = match &args.config {
        Some(path) => PricingConfig::load_from_file(shellexpand::tilde(path).into_owned())?,
        None => PricingConfig::default(),
    };

    Ok(match &args.model {
        Some(model) => pricing.with_model(model.as_str()),
        None => pricing,
    })
}

pub struct AppState {
    pub report: UsageReport,
    pub source: String,
    pub model: String,
}

pub struct App {
    state: AppState,
    months_back: usize,
    hidden_months: usize,
    exit: bool,
}

impl App {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            months_back: 0,
            hidden_months: 0,
            exit: false,
        }
    }

    /// Blocks until the user dismisses the view.
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        while !self.exit {
            terminal.draw(|frame| self.draw(frame))?;
            self.handle_event(event::read()?);
        }

        Ok(())
    }

    fn draw(&mut self, frame: &mut Frame) {
        let [header_area, monthly_area, cumulative_area, shortcuts_area] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Fill(1),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        HeaderWidget::render(frame, header_area, &self.state);
        // Both panels share a width, so they hide the same number of months.
        self.hidden_months = UsageChartWidget::render(
            frame,
            monthly_area,
            &ChartPanel::monthly(&self.state.report).scrolled(self.months_back),
        );
        UsageChartWidget::render(
            frame,
            cumulative_area,
            &ChartPanel::cumulative(&self.state.report).scrolled(self.months_back),
        );
        ShortcutsWidget::render(frame, shortcuts_area);

        self.months_back = self.months_back.min(self.hidden_months);
    }

    fn handle_event(&mut self, event: Event) {
        if let Event::Key(key_event) = event {
            if key_event.kind == KeyEventKind::Press {
                match key_event.code {
                    KeyCode::Char('q') | KeyCode::Esc => self.exit = true,
                    KeyCode::Left | KeyCode::Char('h') => {
                        self.months_back = (self.months_back + 1).min(self.hidden_months);
                    }
                    KeyCode::Right | KeyCode::Char('l') => {
                        self.months_back = self.months_back.saturating_sub(1);
                    }
                    _ => {}
                }
            }
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let pricing = load_pricing(&args)?;
    let input_path = shellexpand::tilde(&args.input).into_owned();
    debug!(input = %input_path, model = pricing.model(), "Starting usage report");

    let mut monitor = UsageMonitor::new(pricing);
    monitor.load_data(&input_path)?;
    let report = monitor.report()?;

    print!("{}", report.render());

    if args.no_chart {
        return Ok(());
    }

    let state = AppState {
        report,
        source: input_path,
        model: monitor.pricing().model().to_string(),
    };

    let mut terminal = ratatui::init();
    let result = App::new(state).run(&mut terminal);
    ratatui::restore();

    result
}
