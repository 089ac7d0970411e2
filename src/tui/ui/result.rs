//! Result view: score, category and the indices behind them.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::domain::{Assessment, DerivedIndices, ThresholdTable};
use crate::tui::styles::MedicalTheme;

/// Render the latest assessment.
pub fn render_result(
    f: &mut Frame,
    area: Rect,
    assessment: &Assessment,
    thresholds: &ThresholdTable,
    calculations: u64,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer
        ])
        .split(area);

    let header = Paragraph::new(Line::from(vec![
        Span::styled(" FOSSI Result", MedicalTheme::title()),
        Span::styled(
            format!(" │ {} │ calculations this session: {}", assessment.result.sex.equation(), calculations),
            MedicalTheme::text_secondary(),
        ),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(MedicalTheme::border()),
    );
    f.render_widget(header, chunks[0]);

    let content = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .margin(1)
        .split(chunks[1]);

    render_score(f, content[0], assessment, thresholds);
    render_indices(f, content[1], assessment.indices.as_ref());

    let footer = Paragraph::new(Line::from(vec![
        Span::styled("[Enter/Esc] ", MedicalTheme::key_hint()),
        Span::styled("Edit ", MedicalTheme::key_desc()),
        Span::styled("[N] ", MedicalTheme::key_hint()),
        Span::styled("New patient ", MedicalTheme::key_desc()),
        Span::styled("[E] ", MedicalTheme::key_hint()),
        Span::styled("Equations ", MedicalTheme::key_desc()),
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

fn render_score(f: &mut Frame, area: Rect, assessment: &Assessment, thresholds: &ThresholdTable) {
    let result = &assessment.result;
    let style = MedicalTheme::risk_category(result.category);

    let block = Block::default()
        .title(Span::styled(" Risk Stratification ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border_focused());

    let mut lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled(format!("{} = ", result.sex.equation()), MedicalTheme::text_secondary()),
            Span::styled(result.formatted_score(), MedicalTheme::title()),
        ]),
        Line::from(Span::styled(
            result.category.to_string(),
            style.add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(result.category.description(), MedicalTheme::text_secondary())),
        Line::from(""),
    ];

    // Band strip with the active band marked
    for (category, label) in thresholds.range_labels(result.sex) {
        let active = category == result.category;
        let marker = if active { "▶ " } else { "  " };
        let label_style = if active {
            MedicalTheme::risk_category(category).add_modifier(Modifier::BOLD)
        } else {
            MedicalTheme::text_muted()
        };
        lines.push(Line::from(vec![
            Span::styled(marker, MedicalTheme::focused()),
            Span::styled(format!("{label:<18}"), label_style),
            Span::styled(category.to_string(), label_style),
        ]));
    }

    let content = Paragraph::new(lines)
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: true })
        .block(block);
    f.render_widget(content, area);
}

fn render_indices(f: &mut Frame, area: Rect, indices: Option<&DerivedIndices>) {
    let block = Block::default()
        .title(Span::styled(" Derived Indices ", MedicalTheme::text_secondary()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border());

    let row = |name: &str, value: String| {
        Line::from(vec![
            Span::styled(format!("{name:<20}"), MedicalTheme::text_secondary()),
            Span::styled(value, MedicalTheme::text()),
        ])
    };

    let lines = match indices {
        Some(ix) => {
            let mut lines = vec![
                Line::from(""),
                row("CMI", format!("{:.3}", ix.cmi)),
            ];
            if let Some(vai) = ix.vai {
                lines.push(row("VAI", format!("{vai:.3}")));
            }
            lines.push(row("TG (mmol/L)", format!("{:.3}", ix.tg_mmol)));
            lines.push(row("HDL (mmol/L)", format!("{:.3}", ix.hdl_mmol)));
            lines
        }
        None => vec![Line::from(Span::styled(
            "Indices were supplied directly.",
            MedicalTheme::text_muted(),
        ))],
    };

    f.render_widget(Paragraph::new(lines).block(block), area);
}
