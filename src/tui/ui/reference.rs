//! Equations and cut points in use.

use ratatui::{
    layout::{Constraint, Direction, Layout, Margin, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::domain::{equation_text, Sex, ThresholdTable};
use crate::tui::styles::MedicalTheme;

/// Render the reference screen
pub fn render_reference(f: &mut Frame, area: Rect, thresholds: &ThresholdTable, source: &str) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer
        ])
        .split(area);

    let header = Paragraph::new(Line::from(vec![
        Span::styled(" Equations & Cut Points", MedicalTheme::title()),
        Span::styled(format!(" │ {source}"), MedicalTheme::text_secondary()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(MedicalTheme::border()),
    );
    f.render_widget(header, chunks[0]);

    let mut lines = vec![
        Line::from(Span::styled("Women", MedicalTheme::subtitle())),
        Line::from(Span::styled(equation_text(Sex::Female), MedicalTheme::text())),
        Line::from(Span::styled(
            "HT: hypertension (1 = yes, 0 = no)",
            MedicalTheme::text_muted(),
        )),
    ];
    push_bands(&mut lines, thresholds, Sex::Female);

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Men", MedicalTheme::subtitle())));
    lines.push(Line::from(Span::styled(equation_text(Sex::Male), MedicalTheme::text())));
    lines.push(Line::from(Span::styled(
        "WC: waist circumference (cm)",
        MedicalTheme::text_muted(),
    )));
    push_bands(&mut lines, thresholds, Sex::Male);

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Indices", MedicalTheme::subtitle())));
    lines.push(Line::from(Span::styled(
        "CMI = (TG / HDL) × (WC / height)",
        MedicalTheme::text(),
    )));
    lines.push(Line::from(Span::styled(
        "VAI = [WC / (36.58 + 1.89 × BMI)] × (TG / 0.81) × (1.52 / HDL)",
        MedicalTheme::text(),
    )));
    lines.push(Line::from(Span::styled(
        "Lipids in mmol/L. mg/dL converts as TG / 88.57 and HDL / 38.67.",
        MedicalTheme::text_muted(),
    )));

    let content = Paragraph::new(lines).wrap(Wrap { trim: true });
    f.render_widget(content, chunks[1].inner(Margin::new(1, 1)));

    let footer = Paragraph::new(Line::from(vec![
        Span::styled("[Esc] ", MedicalTheme::key_hint()),
        Span::styled("Back ", MedicalTheme::key_desc()),
        Span::styled("[R] ", MedicalTheme::key_hint()),
        Span::styled("Reload cut points ", MedicalTheme::key_desc()),
        Span::styled("[Q] ", MedicalTheme::key_hint()),
        Span::styled("Quit", MedicalTheme::key_desc()),
    ]))
    .block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(MedicalTheme::border()),
    );
    f.render_widget(footer, chunks[2]);
}

fn push_bands(lines: &mut Vec<Line<'static>>, thresholds: &ThresholdTable, sex: Sex) {
    for (category, label) in thresholds.range_labels(sex) {
        lines.push(Line::from(vec![
            Span::styled(format!("  {label:<18}"), MedicalTheme::text_secondary()),
            Span::styled(category.to_string(), MedicalTheme::risk_category(category)),
        ]));
    }
}
