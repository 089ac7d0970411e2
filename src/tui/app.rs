//! Main TUI application state machine.
//!
//! Handles:
//! - Screen navigation
//! - Input event handling
//! - Calculator service integration

use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};

use crate::adapters::ConfiguredThresholds;
use crate::application::CalculatorService;
use crate::config::Settings;
use crate::domain::Assessment;
use crate::FossiError;

use super::ui::{
    form::{render_form, FormRow, FormState},
    reference::render_reference,
    render_disclaimer,
    result::render_result,
};

/// Current screen/view in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Form,
    Result,
    Reference,
}

/// Main application state
pub struct App {
    screen: Screen,
    /// Screen to return to when leaving the reference view
    previous: Screen,
    should_quit: bool,
    service: CalculatorService<ConfiguredThresholds>,
    form_state: FormState,
    /// Latest assessment, shown on the result screen
    last: Option<Assessment>,
}

impl App {
    /// Create the application from runtime settings.
    ///
    /// # Errors
    /// Returns error if the configured threshold table cannot be loaded.
    pub fn new(settings: &Settings) -> Result<Self> {
        let source = ConfiguredThresholds::from_path(settings.thresholds_path.as_deref());
        let service = CalculatorService::new(source)?;
        Ok(Self::with_service(service))
    }

    /// Create application with an injected service.
    #[must_use]
    pub fn with_service(service: CalculatorService<ConfiguredThresholds>) -> Self {
        Self {
            screen: Screen::Form,
            previous: Screen::Form,
            should_quit: false,
            service,
            form_state: FormState::default(),
            last: None,
        }
    }

    #[must_use]
    pub fn screen(&self) -> Screen {
        self.screen
    }

    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    #[must_use]
    pub fn last_assessment(&self) -> Option<&Assessment> {
        self.last.as_ref()
    }

    #[must_use]
    pub fn service(&self) -> &CalculatorService<ConfiguredThresholds> {
        &self.service
    }

    /// Run the main application loop.
    ///
    /// # Errors
    /// Returns error if terminal operations fail.
    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.main_loop(&mut terminal);

        // Restore terminal
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        // Entered values are not kept once the session ends
        self.form_state.clear_sensitive();
        self.last = None;

        result
    }

    fn main_loop<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        loop {
            terminal.draw(|f| self.draw(f))?;

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code, key.modifiers);
                    }
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Draw the current screen with the disclaimer underneath.
    pub fn draw(&self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(3)])
            .split(f.area());

        let content_area = chunks[0];

        match (self.screen, &self.last) {
            (Screen::Result, Some(assessment)) => render_result(
                f,
                content_area,
                assessment,
                self.service.thresholds(),
                self.service.session().calculations(),
            ),
            (Screen::Reference, _) => render_reference(
                f,
                content_area,
                self.service.thresholds(),
                &self.service.source_description(),
            ),
            _ => render_form(f, content_area, &self.form_state),
        }

        render_disclaimer(f, chunks[1]);
    }

    /// Apply a key press to the current screen.
    pub fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        // Global quit handling
        if key == KeyCode::Char('q') && modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match self.screen {
            Screen::Form => self.handle_form_key(key),
            Screen::Result => self.handle_result_key(key),
            Screen::Reference => self.handle_reference_key(key),
        }
    }

    fn handle_form_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Up | KeyCode::BackTab => {
                self.form_state.prev_field();
            }
            KeyCode::Down | KeyCode::Tab => {
                self.form_state.next_field();
            }
            KeyCode::Left | KeyCode::Right | KeyCode::Char(' ') => {
                self.form_state.toggle_choice();
            }
            KeyCode::Char('s') | KeyCode::Char('S') => {
                self.form_state.load_sample_data();
            }
            KeyCode::Char('e') | KeyCode::Char('E') => {
                self.open_reference();
            }
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char(c) => {
                self.form_state.input_char(c);
            }
            KeyCode::Backspace => {
                self.form_state.delete_char();
            }
            KeyCode::Delete => {
                self.form_state.clear_field();
            }
            KeyCode::Enter => {
                self.submit_form();
            }
            _ => {}
        }
    }

    fn handle_result_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Enter | KeyCode::Esc => {
                self.screen = Screen::Form;
            }
            KeyCode::Char('n') | KeyCode::Char('N') => {
                self.form_state.clear_sensitive();
                self.last = None;
                self.screen = Screen::Form;
            }
            KeyCode::Char('e') | KeyCode::Char('E') => {
                self.open_reference();
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            _ => {}
        }
    }

    fn handle_reference_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('e') | KeyCode::Char('E') => {
                self.screen = self.previous;
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                if let Err(e) = self.service.reload_thresholds() {
                    tracing::error!("Failed to reload cut points: {}", e);
                }
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            _ => {}
        }
    }

    fn open_reference(&mut self) {
        self.previous = self.screen;
        self.screen = Screen::Reference;
    }

    fn submit_form(&mut self) {
        let outcome = self
            .form_state
            .to_measurements()
            .map_err(FossiError::from)
            .and_then(|m| self.service.evaluate_measurements(&m));

        match outcome {
            Ok(assessment) => {
                self.last = Some(assessment);
                self.form_state.error_message = None;
                self.screen = Screen::Result;
            }
            Err(FossiError::Validation(e)) => {
                // Jump to the offending row so it can be corrected in place
                if let Some(row) = row_for_field(e.field) {
                    if let Some(index) = FormRow::ALL.iter().position(|r| *r == row) {
                        self.form_state.selected = index;
                    }
                }
                self.form_state.error_message = Some(e.to_string());
            }
            Err(e) => {
                tracing::error!("Calculation failed: {}", e);
                self.form_state.error_message = Some(e.to_string());
            }
        }
    }
}

fn row_for_field(field: &str) -> Option<FormRow> {
    match field {
        "age" => Some(FormRow::Age),
        "bmi" => Some(FormRow::Bmi),
        "height" => Some(FormRow::Height),
        "waist" => Some(FormRow::Waist),
        "triglycerides" => Some(FormRow::Triglycerides),
        "hdl" => Some(FormRow::Hdl),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::PublishedThresholds;
    use crate::domain::RiskCategory;
    use ratatui::backend::TestBackend;

    fn create_test_app() -> App {
        let service = CalculatorService::new(ConfiguredThresholds::Published(PublishedThresholds))
            .expect("Should create service");
        App::with_service(service)
    }

    fn press(app: &mut App, key: KeyCode) {
        app.handle_key(key, KeyModifiers::NONE);
    }

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn test_sample_submission_shows_result() {
        let mut app = create_test_app();
        press(&mut app, KeyCode::Char('s'));
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.screen(), Screen::Result);
        let assessment = app.last_assessment().expect("Should have result");
        assert_eq!(assessment.result.category, RiskCategory::High);
        assert_eq!(assessment.result.formatted_score(), "8.12");
        assert_eq!(app.service().session().calculations(), 1);
    }

    #[test]
    fn test_missing_field_stays_on_form() {
        let mut app = create_test_app();
        press(&mut app, KeyCode::Char('s'));
        // Move to BMI and clear it
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Delete);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.screen(), Screen::Form);
        assert!(app.last_assessment().is_none());
        assert_eq!(app.form_state.selected_row(), FormRow::Bmi);
        let message = app.form_state.error_message.clone().expect("Should show error");
        assert!(message.contains("bmi"));
    }

    #[test]
    fn test_out_of_range_age_is_rejected() {
        let mut app = create_test_app();
        press(&mut app, KeyCode::Char('s'));
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Delete);
        for c in "12".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.screen(), Screen::Form);
        assert_eq!(app.service().session().calculations(), 0);
    }

    #[test]
    fn test_male_toggle_and_new_patient() {
        let mut app = create_test_app();
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Char('s'));
        press(&mut app, KeyCode::Enter);

        let category = app.last_assessment().map(|a| a.result.category);
        assert_eq!(category, Some(RiskCategory::GreyZone));

        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.screen(), Screen::Form);
        assert!(app.form_state.age.value.is_empty());
        assert!(app.last_assessment().is_none());
    }

    #[test]
    fn test_reference_returns_to_previous_screen() {
        let mut app = create_test_app();
        press(&mut app, KeyCode::Char('s'));
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('e'));
        assert_eq!(app.screen(), Screen::Reference);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.screen(), Screen::Result);
    }

    #[test]
    fn test_quit_keys() {
        let mut app = create_test_app();
        app.handle_key(KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert!(app.should_quit());

        let mut app = create_test_app();
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit());
    }

    #[test]
    fn test_render_screens() {
        let mut app = create_test_app();
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();

        terminal.draw(|f| app.draw(f)).unwrap();
        let text = buffer_text(&terminal);
        assert!(text.contains("FOSSI Calculator"));
        assert!(text.contains("DISCLAIMER"));

        press(&mut app, KeyCode::Char('s'));
        press(&mut app, KeyCode::Enter);
        terminal.draw(|f| app.draw(f)).unwrap();
        let text = buffer_text(&terminal);
        assert!(text.contains("8.12"));
        assert!(text.contains("CMI"));

        press(&mut app, KeyCode::Char('e'));
        terminal.draw(|f| app.draw(f)).unwrap();
        let text = buffer_text(&terminal);
        assert!(text.contains("published cut points"));
    }
}
