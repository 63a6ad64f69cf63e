use crate::application::{App, AppMode};
use crate::domain::{FeeSchedule, Lane, LaneStatus, Step};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Gauge, Paragraph, Row, Table, Wrap},
};
use std::time::Instant;

pub fn render_ui(f: &mut Frame, app: &App) {
    if app.submitted {
        render_success(f, app);
    } else {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(f.area());

        render_header(f, app, chunks[0]);
        render_step_indicator(f, app, chunks[1]);
        render_step_body(f, app, chunks[2]);
        render_status_bar(f, app, chunks[3]);
    }

    if matches!(app.mode, AppMode::Help) {
        render_help_popup(f, app.help_scroll);
    }
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let header = Paragraph::new(format!(
        "bpwiz - Business Permit Application Portal | Step {}/{}: {}",
        app.sequencer.current(),
        app.sequencer.len(),
        app.step().title()
    ))
    .style(Style::default().fg(Color::Cyan));
    f.render_widget(header, area);
}

fn render_step_indicator(f: &mut Frame, app: &App, area: Rect) {
    let current = app.sequencer.current();
    let mut spans = Vec::new();
    for step in Step::all() {
        let number = step.number();
        let (marker, style) = if number < current {
            (
                format!("[✓] {}", step.title()),
                Style::default().fg(Color::Green),
            )
        } else if number == current {
            (
                format!("[{}] {}", number, step.title()),
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            (
                format!("[{}] {}", number, step.title()),
                Style::default().fg(Color::DarkGray),
            )
        };
        spans.push(Span::styled(marker, style));
        if number < Step::COUNT {
            spans.push(Span::styled("──", Style::default().fg(Color::DarkGray)));
        }
    }

    let indicator = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL).title("Application Steps"));
    f.render_widget(indicator, area);
}

fn render_step_body(f: &mut Frame, app: &App, area: Rect) {
    match app.step() {
        Step::BusinessDetails | Step::DocumentUpload => render_field_form(f, app, area),
        Step::Verification => render_verification(f, app, area),
        Step::Payment => render_payment(f, area),
        Step::Consent => render_consent(f, app, area),
    }
}

fn render_field_form(f: &mut Frame, app: &App, area: Rect) {
    let step = app.step();
    let editing = matches!(app.mode, AppMode::Editing);

    let rows: Vec<Row> = step
        .fields()
        .iter()
        .enumerate()
        .map(|(index, field)| {
            let focused = index == app.field_focus;
            let label = if field.is_required() {
                format!("{} *", field.label())
            } else {
                field.label().to_string()
            };
            let value = if focused && editing {
                format!("{}▏", app.input)
            } else {
                let stored = app.record.field_value(*field);
                if stored.is_empty() {
                    "(none)".to_string()
                } else {
                    stored
                }
            };
            let style = if focused {
                Style::default().bg(Color::Blue).fg(Color::White)
            } else {
                Style::default()
            };
            Row::new(vec![Cell::from(label), Cell::from(value)]).style(style)
        })
        .collect();

    let title = match step {
        Step::DocumentUpload => "Upload Documents (enter a file name; JPG, PNG, PDF)",
        _ => "Please fill out the information below (* required)",
    };
    let table = Table::new(
        rows,
        [Constraint::Length(34), Constraint::Min(20)],
    )
    .block(Block::default().borders(Borders::ALL).title(title))
    .column_spacing(1);
    f.render_widget(table, area);
}

fn lane_style(status: LaneStatus) -> Style {
    match status {
        LaneStatus::Pending => Style::default().fg(Color::DarkGray),
        LaneStatus::Analyzing => Style::default().fg(Color::Blue),
        LaneStatus::Verified => Style::default().fg(Color::Green),
        LaneStatus::Failed => Style::default().fg(Color::Red),
    }
}

fn render_verification(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(area);

    let mut lane_lines = Vec::new();
    for lane in Lane::all() {
        let status = app
            .verifier
            .as_ref()
            .map(|v| v.lane_status(lane))
            .unwrap_or(LaneStatus::Pending);
        lane_lines.push(Line::from(vec![
            Span::raw(format!("{:<28}", lane.label())),
            Span::styled(status.label(), lane_style(status)),
        ]));
    }
    let lanes = Paragraph::new(lane_lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("AI Document Verification"),
    );
    f.render_widget(lanes, chunks[0]);

    let progress = app
        .verifier
        .as_ref()
        .map(|v| v.progress(Instant::now()))
        .unwrap_or(0.0);
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Analysis"))
        .gauge_style(Style::default().fg(Color::Cyan))
        .ratio(progress.clamp(0.0, 1.0));
    f.render_widget(gauge, chunks[1]);

    let report = app.verifier.as_ref().and_then(|v| v.report());
    let result_lines = match report {
        Some(report) => vec![
            Line::from(Span::styled(
                "AI Analysis Complete",
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            )),
            Line::from(format!("Face Match:    {}%", report.face_match_score)),
            Line::from(format!("Doc Quality:   {}%", report.document_quality_score)),
            Line::from(format!("Overall Score: {}%", report.overall_score)),
            Line::from(""),
            Line::from(if report.auto_approved() {
                "Documents passed AI verification. Your application is likely to be approved automatically."
            } else {
                "Some documents require manual review. Your application will be processed by our staff."
            }),
        ],
        None => vec![Line::from(
            "Our AI is analyzing your documents for authenticity and accuracy...",
        )],
    };
    let results = Paragraph::new(result_lines)
        .block(Block::default().borders(Borders::ALL).title("Results"))
        .wrap(Wrap { trim: true });
    f.render_widget(results, chunks[2]);
}

fn render_payment(f: &mut Frame, area: Rect) {
    let fees = FeeSchedule::default();
    let lines = vec![
        Line::from("Payment Method: Alipay (demonstration only, no charge is made)"),
        Line::from(""),
        Line::from(format!("Business Permit Fee:  {}", peso(fees.permit_fee))),
        Line::from(format!("Processing Fee:       {}", peso(fees.processing_fee))),
        Line::from(Span::styled(
            format!("Total Amount:         {}", peso(fees.total())),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("Fast and secure digital payment. Press PgDn or Enter to continue."),
    ];
    let payment = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Payment"))
        .wrap(Wrap { trim: true });
    f.render_widget(payment, area);
}

fn render_consent(f: &mut Frame, app: &App, area: Rect) {
    let checkbox = if app.record.consent_agreed {
        "[x]"
    } else {
        "[ ]"
    };
    let lines = vec![
        Line::from(Span::styled(
            "Privacy Consent and Full Disclosure Statement",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(
            "1. Data Collection: this system collects your full name, email address, \
             contact number, birthdate, business information, government identification \
             documents, business registration documents, selfie photographs, and payment \
             information, collected directly from you through this application form.",
        ),
        Line::from(
            "2. Purpose of Processing: verification of your identity and business \
             credentials, processing of your business permit application, facial \
             recognition verification to prevent fraud, payment processing for \
             application fees, communication regarding your application status, and \
             compliance with legal and regulatory requirements.",
        ),
        Line::from(
            "3. Data Storage and Security: your data is retained only for the duration \
             of this session and is not transmitted to any external service.",
        ),
        Line::from(""),
        Line::from(Span::styled(
            format!(
                "{} I have read and agree to the Privacy Consent and Full Disclosure Statement",
                checkbox
            ),
            if app.record.consent_agreed {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::Yellow)
            },
        )),
        Line::from(""),
        Line::from("Space: toggle agreement | Enter: submit application"),
    ];
    let consent = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Consent"))
        .wrap(Wrap { trim: true });
    f.render_widget(consent, area);
}

fn render_success(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(f.area());

    let number = app.application_number.as_deref().unwrap_or("-");
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "  ✓ Business Permit Approved",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )),
        Line::from("  Application Successfully Submitted"),
        Line::from(""),
        Line::from(vec![
            Span::raw("  Application Number: "),
            Span::styled(
                number,
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(""),
        Line::from("  Keep this number for your records. You will be contacted at the"),
        Line::from("  email address and contact number you provided."),
        Line::from(""),
        Line::from("  c: copy application number | d: save receipt | e: export CSV | q: quit"),
    ];
    let success = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Application Complete")
            .style(Style::default().fg(Color::White)),
    );
    f.render_widget(success, chunks[0]);
    render_status_bar(f, app, chunks[1]);
}

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let input_text = match app.mode {
        AppMode::Normal => {
            if let Some(ref status) = app.status_message {
                status.clone()
            } else if app.submitted {
                "c: copy number | d: save receipt | e: export CSV | q: quit".to_string()
            } else {
                match app.step() {
                    Step::BusinessDetails | Step::DocumentUpload => {
                        "↑↓/Tab: fields | Enter: edit | PgDn: continue | PgUp: back | 1-5: jump | F1/?: help | q: quit".to_string()
                    }
                    Step::Verification => {
                        "PgDn/Enter: continue when complete | 1-5: jump | F1/?: help | q: quit".to_string()
                    }
                    Step::Payment => {
                        "PgDn/Enter: continue | PgUp: back | 1-5: jump | F1/?: help | q: quit".to_string()
                    }
                    Step::Consent => {
                        "Space: toggle consent | Enter: submit | PgUp: back | F1/?: help | q: quit".to_string()
                    }
                }
            }
        }
        AppMode::Editing => {
            let label = app
                .focused_field()
                .map(|field| field.label())
                .unwrap_or("field");
            format!("Editing {}: {} (Enter to save, Esc to cancel)", label, app.input)
        }
        AppMode::Help => {
            "↑↓/jk: scroll | PgUp/PgDn: fast scroll | Home: top | Esc/q: close help".to_string()
        }
        AppMode::SaveReceipt => format!(
            "Save receipt as: {} (Enter to save, Esc to cancel)",
            app.filename_input
        ),
        AppMode::ExportCsv => format!(
            "Export CSV as: {} (Enter to export, Esc to cancel)",
            app.filename_input
        ),
    };

    let input = Paragraph::new(input_text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(match app.mode {
            AppMode::Normal => Style::default(),
            AppMode::Editing => Style::default().fg(Color::Green),
            AppMode::Help => Style::default().fg(Color::Cyan),
            AppMode::SaveReceipt => Style::default().fg(Color::Yellow),
            AppMode::ExportCsv => Style::default().fg(Color::Magenta),
        });
    f.render_widget(input, area);
}

fn render_help_popup(f: &mut Frame, scroll: usize) {
    let area = f.area();
    let popup_area = Rect {
        x: area.width / 10,
        y: area.height / 10,
        width: area.width * 4 / 5,
        height: area.height * 4 / 5,
    };

    f.render_widget(Clear, popup_area);

    let help_text = get_help_text();
    let help_lines: Vec<&str> = help_text.lines().collect();
    let visible_height = popup_area.height.saturating_sub(2) as usize;

    let start_line = scroll.min(help_lines.len().saturating_sub(visible_height));
    let end_line = (start_line + visible_height).min(help_lines.len());

    let visible_text = help_lines[start_line..end_line].join("\n");

    let help_widget = Paragraph::new(visible_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(
                    "bpwiz Help (Line {}/{})",
                    start_line + 1,
                    help_lines.len()
                ))
                .style(Style::default().fg(Color::Cyan)),
        )
        .style(Style::default().fg(Color::White));

    f.render_widget(help_widget, popup_area);
}

/// Formats an amount in Philippine pesos with thousands grouping.
pub fn peso(amount: f64) -> String {
    let formatted = format!("{:.2}", amount.abs());
    let (int_part, frac_part) = formatted.split_once('.').unwrap_or((&formatted, "00"));
    let mut grouped = String::new();
    let digits: Vec<char> = int_part.chars().collect();
    for (i, ch) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*ch);
    }
    let sign = if amount < 0.0 { "-" } else { "" };
    format!("₱ {}{}.{}", sign, grouped, frac_part)
}

fn get_help_text() -> String {
    r#"BPWIZ - BUSINESS PERMIT APPLICATION WIZARD

=== THE APPLICATION FLOW ===
Step 1  Business Details    Owner information, business details and address
Step 2  Document Upload     Business document, government ID and selfie
Step 3  Verification        Simulated AI analysis of the uploaded documents
Step 4  Payment             Fee summary (demonstration only, no charge)
Step 5  Consent             Privacy consent and final submission

Fields marked with * are required. Any non-empty value is accepted;
there is no format checking. Block, lot and subdivision may be left
empty.

=== FORM STEPS (1 and 2) ===
↑ / ↓ or Tab    Move between fields
Enter           Edit the focused field
PgDn or Ctrl+N  Continue to the next step (checks required fields)
PgUp or Ctrl+P  Go back one step

While editing:
Enter           Save the field value
Esc             Cancel without saving
← / → Home End  Move the cursor

=== STEP INDICATOR ===
1 .. 5          Jump directly to any step, forward or backward.
                Jumping is never blocked by validation. Jumping away
                from a running verification discards that run.

=== VERIFICATION (step 3) ===
Analysis starts automatically and takes about eight seconds. Each of
the three checks resolves independently; a failed check reads
"Review Required" but never blocks the application. Continue unlocks
once the analysis completes. Going back is disabled while the
analysis is running.

=== CONSENT AND SUBMISSION (step 5) ===
Space           Toggle agreement to the privacy statement
Enter           Submit the application (requires agreement)

Submission generates your application number (BP- followed by eight
digits). The wizard then shows the confirmation screen; restart the
program to begin a new application.

=== AFTER SUBMISSION ===
c               Copy the application number to the clipboard
d               Save a JSON receipt of your application
e               Export the receipt as CSV
q               Quit

=== HELP NAVIGATION ===
↑↓ or j/k       Scroll help text up/down one line
Page Up/Down    Scroll help text up/down 5 lines
Home            Jump to top of help text
Esc/F1/?/q      Close this help window

Note: nothing is stored outside this session except receipts you
save yourself."#
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peso_formatting() {
        assert_eq!(peso(1500.0), "₱ 1,500.00");
        assert_eq!(peso(100.0), "₱ 100.00");
        assert_eq!(peso(1600.0), "₱ 1,600.00");
        assert_eq!(peso(0.0), "₱ 0.00");
        assert_eq!(peso(1234567.5), "₱ 1,234,567.50");
    }

    #[test]
    fn test_help_text_mentions_every_step() {
        let help = get_help_text();
        for step in Step::all() {
            assert!(help.contains(step.title()), "missing {}", step.title());
        }
    }
}
