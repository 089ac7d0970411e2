//! Measurement input form.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use zeroize::Zeroize;

use crate::domain::validation::parse_number;
use crate::domain::{LipidUnit, Measurements, Sex, ValidationError};
use crate::tui::styles::MedicalTheme;

/// Numeric entry box.
#[derive(Debug, Clone)]
pub struct NumberField {
    pub label: &'static str,
    /// Field name reported in validation errors
    pub name: &'static str,
    pub value: String,
}

impl NumberField {
    fn new(label: &'static str, name: &'static str) -> Self {
        Self {
            label,
            name,
            value: String::new(),
        }
    }
}

/// A row of the form, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormRow {
    Sex,
    Age,
    Bmi,
    Height,
    Waist,
    LipidUnit,
    Triglycerides,
    Hdl,
    Hypertension,
}

impl FormRow {
    pub const ALL: [FormRow; 9] = [
        FormRow::Sex,
        FormRow::Age,
        FormRow::Bmi,
        FormRow::Height,
        FormRow::Waist,
        FormRow::LipidUnit,
        FormRow::Triglycerides,
        FormRow::Hdl,
        FormRow::Hypertension,
    ];

    fn is_choice(self) -> bool {
        matches!(self, FormRow::Sex | FormRow::LipidUnit | FormRow::Hypertension)
    }
}

/// Calculator form state
pub struct FormState {
    pub sex: Sex,
    pub lipid_unit: LipidUnit,
    pub hypertension: bool,
    pub age: NumberField,
    pub bmi: NumberField,
    pub height: NumberField,
    pub waist: NumberField,
    pub triglycerides: NumberField,
    pub hdl: NumberField,
    pub selected: usize,
    pub error_message: Option<String>,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            sex: Sex::Female,
            lipid_unit: LipidUnit::MmolPerL,
            hypertension: false,
            age: NumberField::new("Age", "age"),
            bmi: NumberField::new("BMI", "bmi"),
            height: NumberField::new("Height", "height"),
            waist: NumberField::new("Waist circumference", "waist"),
            triglycerides: NumberField::new("Triglycerides (TG)", "triglycerides"),
            hdl: NumberField::new("HDL cholesterol", "hdl"),
            selected: 0,
            error_message: None,
        }
    }
}

impl FormState {
    #[must_use]
    pub fn selected_row(&self) -> FormRow {
        FormRow::ALL[self.selected]
    }

    /// Move to the next row
    pub fn next_field(&mut self) {
        self.selected = (self.selected + 1) % FormRow::ALL.len();
    }

    /// Move to the previous row
    pub fn prev_field(&mut self) {
        if self.selected == 0 {
            self.selected = FormRow::ALL.len() - 1;
        } else {
            self.selected -= 1;
        }
    }

    fn number_mut(&mut self, row: FormRow) -> Option<&mut NumberField> {
        match row {
            FormRow::Age => Some(&mut self.age),
            FormRow::Bmi => Some(&mut self.bmi),
            FormRow::Height => Some(&mut self.height),
            FormRow::Waist => Some(&mut self.waist),
            FormRow::Triglycerides => Some(&mut self.triglycerides),
            FormRow::Hdl => Some(&mut self.hdl),
            FormRow::Sex | FormRow::LipidUnit | FormRow::Hypertension => None,
        }
    }

    fn number(&self, row: FormRow) -> Option<&NumberField> {
        match row {
            FormRow::Age => Some(&self.age),
            FormRow::Bmi => Some(&self.bmi),
            FormRow::Height => Some(&self.height),
            FormRow::Waist => Some(&self.waist),
            FormRow::Triglycerides => Some(&self.triglycerides),
            FormRow::Hdl => Some(&self.hdl),
            FormRow::Sex | FormRow::LipidUnit | FormRow::Hypertension => None,
        }
    }

    /// Add a character to the current numeric field
    pub fn input_char(&mut self, c: char) {
        if !(c.is_ascii_digit() || c == '.') {
            return;
        }
        if let Some(field) = self.number_mut(self.selected_row()) {
            field.value.push(c);
            self.error_message = None;
        }
    }

    /// Delete the last character
    pub fn delete_char(&mut self) {
        if let Some(field) = self.number_mut(self.selected_row()) {
            field.value.pop();
        }
    }

    /// Clear the current field
    pub fn clear_field(&mut self) {
        if let Some(field) = self.number_mut(self.selected_row()) {
            field.value.zeroize();
        }
    }

    /// Cycle the value of the current choice row.
    pub fn toggle_choice(&mut self) {
        match self.selected_row() {
            FormRow::Sex => {
                self.sex = match self.sex {
                    Sex::Female => Sex::Male,
                    Sex::Male => Sex::Female,
                };
            }
            FormRow::LipidUnit => {
                self.lipid_unit = match self.lipid_unit {
                    LipidUnit::MmolPerL => LipidUnit::MgPerDl,
                    LipidUnit::MgPerDl => LipidUnit::MmolPerL,
                };
            }
            FormRow::Hypertension => self.hypertension = !self.hypertension,
            _ => return,
        }
        self.error_message = None;
    }

    /// Wipe all entered values and return to the first row.
    pub fn clear_sensitive(&mut self) {
        for row in FormRow::ALL {
            if let Some(field) = self.number_mut(row) {
                field.value.zeroize();
            }
        }
        self.hypertension = false;
        self.error_message = None;
        self.selected = 0;
    }

    /// Parse the form into measurements.
    ///
    /// # Errors
    /// Returns a `ValidationError` naming the first blank or non-numeric field.
    pub fn to_measurements(&self) -> Result<Measurements, ValidationError> {
        let read = |field: &NumberField| parse_number(field.name, &field.value);

        Ok(Measurements {
            sex: self.sex,
            age: read(&self.age)?,
            bmi: read(&self.bmi)?,
            height_cm: read(&self.height)?,
            waist_cm: read(&self.waist)?,
            triglycerides: read(&self.triglycerides)?,
            hdl: read(&self.hdl)?,
            lipid_unit: self.lipid_unit,
            hypertension: self.hypertension,
        })
    }

    /// Load the sample patient for the current lipid unit.
    pub fn load_sample_data(&mut self) {
        let (tg, hdl) = match self.lipid_unit {
            LipidUnit::MmolPerL => ("1.9", "1.0"),
            LipidUnit::MgPerDl => ("168", "39"),
        };
        // 62 years, BMI 31, 160 cm, waist 98 cm, hypertensive
        self.age.value = "62".to_string();
        self.bmi.value = "31.0".to_string();
        self.height.value = "160.0".to_string();
        self.waist.value = "98.0".to_string();
        self.triglycerides.value = tg.to_string();
        self.hdl.value = hdl.to_string();
        self.hypertension = true;
        self.error_message = None;
    }

    fn hint(&self, row: FormRow) -> String {
        match row {
            FormRow::Age => "years (18-100)".to_string(),
            FormRow::Bmi => "kg/m² (10-60)".to_string(),
            FormRow::Height => "cm (120-220)".to_string(),
            FormRow::Waist => "cm (50-180)".to_string(),
            FormRow::Triglycerides => match self.lipid_unit {
                LipidUnit::MmolPerL => "mmol/L (0.1-20)".to_string(),
                LipidUnit::MgPerDl => "mg/dL (0.1-2000)".to_string(),
            },
            FormRow::Hdl => match self.lipid_unit {
                LipidUnit::MmolPerL => "mmol/L (0.1-10)".to_string(),
                LipidUnit::MgPerDl => "mg/dL (0.1-400)".to_string(),
            },
            FormRow::Sex | FormRow::LipidUnit | FormRow::Hypertension => String::new(),
        }
    }

    fn label(&self, row: FormRow) -> &'static str {
        match row {
            FormRow::Sex => "Sex",
            FormRow::LipidUnit => "Lipids unit",
            FormRow::Hypertension => "Hypertension",
            other => self.number(other).map(|f| f.label).unwrap_or(""),
        }
    }

    fn choice_text(&self, row: FormRow) -> String {
        match row {
            FormRow::Sex => format!("{} ({})", self.sex, self.sex.equation()),
            FormRow::LipidUnit => self.lipid_unit.to_string(),
            FormRow::Hypertension => {
                if self.hypertension {
                    "Yes (1)".to_string()
                } else {
                    "No (0)".to_string()
                }
            }
            _ => String::new(),
        }
    }
}

/// Render the calculator form
pub fn render_form(f: &mut Frame, area: Rect, state: &FormState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Form
            Constraint::Length(3), // Footer/error
        ])
        .split(area);

    render_form_header(f, chunks[0]);
    render_form_fields(f, chunks[1], state);
    render_form_footer(f, chunks[2], state);
}

fn render_form_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", MedicalTheme::text()),
        Span::styled("FOSSI Calculator", MedicalTheme::title()),
        Span::styled(
            " │ Fast Ossifier Stratification Index in DISH",
            MedicalTheme::text_secondary(),
        ),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_form_fields(f: &mut Frame, area: Rect, state: &FormState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .margin(1)
        .split(area);

    let mid = (FormRow::ALL.len() + 1) / 2;

    render_field_column(f, columns[0], state, 0..mid);
    render_field_column(f, columns[1], state, mid..FormRow::ALL.len());
}

fn render_field_column(f: &mut Frame, area: Rect, state: &FormState, rows: std::ops::Range<usize>) {
    let constraints: Vec<Constraint> = rows
        .clone()
        .map(|_| Constraint::Length(3))
        .chain(std::iter::once(Constraint::Min(0)))
        .collect();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (slot, index) in rows.enumerate() {
        let row = FormRow::ALL[index];
        let is_selected = index == state.selected;

        let (border_style, title_style) = if is_selected {
            (MedicalTheme::border_focused(), MedicalTheme::focused())
        } else {
            (MedicalTheme::border(), MedicalTheme::text_secondary())
        };

        let block = Block::default()
            .title(Span::styled(format!(" {} ", state.label(row)), title_style))
            .borders(Borders::ALL)
            .border_style(border_style);

        let value_display = if row.is_choice() {
            Span::styled(format!("◂ {} ▸", state.choice_text(row)), MedicalTheme::text())
        } else {
            match state.number(row) {
                Some(field) if !field.value.is_empty() => {
                    Span::styled(field.value.clone(), MedicalTheme::text())
                }
                _ => Span::styled(state.hint(row), MedicalTheme::text_muted()),
            }
        };

        let cursor = if is_selected && !row.is_choice() {
            Span::styled("▌", MedicalTheme::cursor())
        } else {
            Span::raw("")
        };

        let content = Paragraph::new(Line::from(vec![Span::raw(" "), value_display, cursor])).block(block);
        f.render_widget(content, chunks[slot]);
    }
}

fn render_form_footer(f: &mut Frame, area: Rect, state: &FormState) {
    let content = if let Some(err) = &state.error_message {
        Line::from(vec![
            Span::styled("! ", MedicalTheme::danger()),
            Span::styled(err.clone(), MedicalTheme::danger()),
        ])
    } else {
        Line::from(vec![
            Span::styled("[↑↓] ", MedicalTheme::key_hint()),
            Span::styled("Navigate ", MedicalTheme::key_desc()),
            Span::styled("[Space] ", MedicalTheme::key_hint()),
            Span::styled("Toggle ", MedicalTheme::key_desc()),
            Span::styled("[Enter] ", MedicalTheme::key_hint()),
            Span::styled("Calculate ", MedicalTheme::key_desc()),
            Span::styled("[S] ", MedicalTheme::key_hint()),
            Span::styled("Sample ", MedicalTheme::key_desc()),
            Span::styled("[E] ", MedicalTheme::key_hint()),
            Span::styled("Equations ", MedicalTheme::key_desc()),
            Span::styled("[Q] ", MedicalTheme::key_hint()),
            Span::styled("Quit", MedicalTheme::key_desc()),
        ])
    };

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(footer, area);
}
