use crate::scoring::aggregator::RunSummary;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::layout::{Constraint, Layout};
use ratatui::{
    style::{Color, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Bar, BarChart, BarGroup, Block, Paragraph},
    DefaultTerminal, Frame,
};
use std::io;

const COLOR_CYCLE: [Color; 6] = [
    Color::Red,
    Color::Yellow,
    Color::Green,
    Color::Cyan,
    Color::Blue,
    Color::Magenta,
];

const BAR_WIDTH: u16 = 5;
const BAR_GAP: u16 = 0;
const GROUP_GAP: u16 = 2;

/// Percentages are stored with one decimal of resolution.
const VALUE_SCALE: f64 = 10.0;

/// Terminal view of a run summary: a kinase group per bar cluster, one bar
/// per file.
#[derive(Debug)]
pub struct App<'a> {
    summary: &'a RunSummary,
    kinases: Vec<&'a str>,
    offset: usize,
    exit: bool,
}

impl<'a> App<'a> {
    pub fn new(summary: &'a RunSummary) -> Self {
        Self {
            summary,
            kinases: summary.kinase_names(),
            offset: 0,
            exit: false,
        }
    }

    /// runs the application's main loop until the user quits
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> io::Result<()> {
        while !self.exit {
            terminal.draw(|frame| self.draw(frame))?;
            self.handle_events()?;
        }
        Ok(())
    }

    /// How many kinase groups fit across `width` terminal columns.
    fn groups_per_screen(&self, width: u16) -> usize {
        let n_files = self.summary.len().max(1) as u16;
        let group_width = n_files * BAR_WIDTH + (n_files - 1) * BAR_GAP + GROUP_GAP;
        (width.saturating_sub(2) / group_width).max(1) as usize
    }

    fn visible_kinases(&self, width: u16) -> &[&'a str] {
        let per_screen = self.groups_per_screen(width);
        let start = self.offset.min(self.kinases.len());
        let end = (start + per_screen).min(self.kinases.len());
        &self.kinases[start..end]
    }

    fn draw(&self, frame: &mut Frame) {
        let legend_height = self.summary.len() as u16 + 2;
        let [chart_area, legend_area] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(legend_height)])
                .areas(frame.area());

        let title = Line::from(vec![
            " % input sequences per kinase site ".bold(),
            " <Left>/<Right> scroll, <Q> quit ".into(),
        ]);
        let mut chart = BarChart::default()
            .block(Block::bordered().title(title))
            .bar_width(BAR_WIDTH)
            .bar_gap(BAR_GAP)
            .group_gap(GROUP_GAP)
            .max((100.0 * VALUE_SCALE) as u64);

        for kinase in self.visible_kinases(chart_area.width) {
            let bars: Vec<Bar> = self
                .summary
                .files
                .iter()
                .enumerate()
                .map(|(f, file)| {
                    let pct = file.percentage(kinase);
                    Bar::default()
                        .value((pct * VALUE_SCALE).round() as u64)
                        .text_value(format!("{:.1}", pct))
                        .style(Style::default().fg(COLOR_CYCLE[f % COLOR_CYCLE.len()]))
                })
                .collect();
            chart = chart.data(
                BarGroup::default()
                    .label(Line::from(kinase.to_string()))
                    .bars(&bars),
            );
        }
        frame.render_widget(chart, chart_area);

        let legend: Vec<Line> = self
            .summary
            .files
            .iter()
            .enumerate()
            .map(|(f, file)| {
                Line::from(vec![
                    Span::styled("■ ", Style::default().fg(COLOR_CYCLE[f % COLOR_CYCLE.len()])),
                    Span::raw(format!(
                        "{} ({} sequences, {} with a kinase match)",
                        file.file_id, file.n_sequences, file.sequences_with_match
                    )),
                ])
            })
            .collect();
        frame.render_widget(
            Paragraph::new(Text::from(legend)).block(Block::bordered().title(" Files ")),
            legend_area,
        );
    }

    fn handle_events(&mut self) -> io::Result<()> {
        match event::read()? {
            // crossterm also reports key release and repeat events on Windows.
            Event::Key(key_event) if key_event.kind == KeyEventKind::Press => {
                self.handle_key_event(key_event)
            }
            _ => {}
        };
        Ok(())
    }

    fn handle_key_event(&mut self, key_event: KeyEvent) {
        match key_event.code {
            KeyCode::Char('q') | KeyCode::Esc => self.exit = true,
            KeyCode::Left => self.offset = self.offset.saturating_sub(1),
            KeyCode::Right => {
                if self.offset + 1 < self.kinases.len() {
                    self.offset += 1;
                }
            }
            _ => {}
        }
    }
}

/// Blocks until the user closes the view.
pub fn show_summary(summary: &RunSummary) -> io::Result<()> {
    let mut terminal = ratatui::init();
    let app_result = App::new(summary).run(&mut terminal);
    ratatui::restore();
    app_result
}
