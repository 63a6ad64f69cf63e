use crate::application::{App, AppMode};
use crate::domain::Step;
use crate::infrastructure::{ReceiptCsvExporter, ReceiptRepository};
use crossterm::event::{KeyCode, KeyModifiers};
use std::time::Instant;

/// Byte offset of the given character index within the buffer. The cursor
/// is tracked in characters; edits convert at the boundary so multibyte
/// input (e.g. "Peña") never lands mid-character.
fn byte_offset(text: &str, char_index: usize) -> usize {
    text.char_indices()
        .nth(char_index)
        .map_or(text.len(), |(offset, _)| offset)
}

pub struct InputHandler;

impl InputHandler {
    pub fn handle_key_event(app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
        match app.mode {
            AppMode::Normal if app.submitted => Self::handle_success_mode(app, key),
            AppMode::Normal => Self::handle_form_mode(app, key, modifiers),
            AppMode::Editing => Self::handle_editing_mode(app, key),
            AppMode::Help => Self::handle_help_mode(app, key),
            AppMode::SaveReceipt => Self::handle_filename_input_mode(app, key, "receipt"),
            AppMode::ExportCsv => Self::handle_filename_input_mode(app, key, "csv"),
        }
    }

    fn handle_form_mode(app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
        let now = Instant::now();

        if modifiers.contains(KeyModifiers::CONTROL) {
            match key {
                KeyCode::Char('n') => {
                    app.submit_step(now);
                    return;
                }
                KeyCode::Char('p') => {
                    app.retreat_step(now);
                    return;
                }
                _ => {}
            }
        }

        app.status_message = None;

        match key {
            KeyCode::Up | KeyCode::BackTab => {
                app.focus_prev_field();
            }
            KeyCode::Down | KeyCode::Tab => {
                app.focus_next_field();
            }
            KeyCode::Enter => {
                // Form steps edit the focused field; field-less steps treat
                // Enter as the submit-intent.
                if app.step().fields().is_empty() {
                    app.submit_step(now);
                } else {
                    app.start_editing();
                }
            }
            KeyCode::Char(' ') => {
                if app.step() == Step::Consent {
                    app.toggle_consent();
                }
            }
            KeyCode::Char(c @ '1'..='5') => {
                // The step indicator allows unvalidated jumps anywhere.
                let step = c as usize - '0' as usize;
                app.jump_to_step(step, now);
            }
            KeyCode::PageDown => {
                app.submit_step(now);
            }
            KeyCode::PageUp => {
                app.retreat_step(now);
            }
            KeyCode::F(1) | KeyCode::Char('?') => {
                app.mode = AppMode::Help;
                app.help_scroll = 0;
            }
            KeyCode::Char('q') => {
                // Will be handled by main loop
            }
            _ => {}
        }
    }

    fn handle_success_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Char('c') => {
                if let Some(number) = app.application_number.clone() {
                    let result = arboard::Clipboard::new()
                        .and_then(|mut clipboard| clipboard.set_text(number));
                    app.status_message = Some(match result {
                        Ok(()) => "Application number copied to clipboard".to_string(),
                        Err(error) => format!("Copy failed: {}", error),
                    });
                }
            }
            KeyCode::Char('d') => {
                app.start_save_receipt();
            }
            KeyCode::Char('e') => {
                app.start_csv_export();
            }
            KeyCode::F(1) | KeyCode::Char('?') => {
                app.mode = AppMode::Help;
                app.help_scroll = 0;
            }
            KeyCode::Char('q') => {
                // Will be handled by main loop
            }
            _ => {}
        }
    }

    fn handle_editing_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Enter | KeyCode::Tab => {
                app.finish_editing();
            }
            KeyCode::Esc => {
                app.cancel_editing();
            }
            KeyCode::Backspace => {
                if app.cursor_position > 0 {
                    let offset = byte_offset(&app.input, app.cursor_position - 1);
                    app.input.remove(offset);
                    app.cursor_position -= 1;
                }
            }
            KeyCode::Delete => {
                if app.cursor_position < app.input.chars().count() {
                    let offset = byte_offset(&app.input, app.cursor_position);
                    app.input.remove(offset);
                }
            }
            KeyCode::Left => {
                if app.cursor_position > 0 {
                    app.cursor_position -= 1;
                }
            }
            KeyCode::Right => {
                if app.cursor_position < app.input.chars().count() {
                    app.cursor_position += 1;
                }
            }
            KeyCode::Home => {
                app.cursor_position = 0;
            }
            KeyCode::End => {
                app.cursor_position = app.input.chars().count();
            }
            KeyCode::Char(c) => {
                let offset = byte_offset(&app.input, app.cursor_position);
                app.input.insert(offset, c);
                app.cursor_position += 1;
            }
            _ => {}
        }
    }

    fn handle_help_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('?') | KeyCode::Char('q') => {
                app.mode = AppMode::Normal;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                if app.help_scroll > 0 {
                    app.help_scroll -= 1;
                }
            }
            KeyCode::Down | KeyCode::Char('j') => {
                app.help_scroll += 1;
            }
            KeyCode::PageUp => {
                app.help_scroll = app.help_scroll.saturating_sub(5);
            }
            KeyCode::PageDown => {
                app.help_scroll += 5;
            }
            KeyCode::Home => {
                app.help_scroll = 0;
            }
            _ => {}
        }
    }

    fn handle_filename_input_mode(app: &mut App, key: KeyCode, mode: &str) {
        match key {
            KeyCode::Enter => {
                let Some(receipt) = app.receipt() else {
                    app.cancel_filename_input();
                    return;
                };
                match mode {
                    "receipt" => {
                        let filename = app.get_receipt_filename();
                        let result = ReceiptRepository::save_receipt(&receipt, &filename);
                        app.set_export_result(result);
                    }
                    "csv" => {
                        let filename = app.get_csv_export_filename();
                        let result = ReceiptCsvExporter::export_to_csv(&receipt, &filename);
                        app.set_export_result(result);
                    }
                    _ => {}
                }
            }
            KeyCode::Esc => {
                app.cancel_filename_input();
            }
            KeyCode::Backspace => {
                if app.cursor_position > 0 {
                    let offset = byte_offset(&app.filename_input, app.cursor_position - 1);
                    app.filename_input.remove(offset);
                    app.cursor_position -= 1;
                }
            }
            KeyCode::Delete => {
                if app.cursor_position < app.filename_input.chars().count() {
                    let offset = byte_offset(&app.filename_input, app.cursor_position);
                    app.filename_input.remove(offset);
                }
            }
            KeyCode::Left => {
                if app.cursor_position > 0 {
                    app.cursor_position -= 1;
                }
            }
            KeyCode::Right => {
                if app.cursor_position < app.filename_input.chars().count() {
                    app.cursor_position += 1;
                }
            }
            KeyCode::Home => {
                app.cursor_position = 0;
            }
            KeyCode::End => {
                app.cursor_position = app.filename_input.chars().count();
            }
            KeyCode::Char(c) => {
                let offset = byte_offset(&app.filename_input, app.cursor_position);
                app.filename_input.insert(offset, c);
                app.cursor_position += 1;
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{App, AppMode};
    use crate::domain::{FieldId, RecordPatch};

    fn press(app: &mut App, key: KeyCode) {
        InputHandler::handle_key_event(app, key, KeyModifiers::NONE);
    }

    #[test]
    fn test_digit_keys_jump_between_steps() {
        let mut app = App::default();

        press(&mut app, KeyCode::Char('4'));
        assert_eq!(app.sequencer.current(), 4);

        press(&mut app, KeyCode::Char('1'));
        assert_eq!(app.sequencer.current(), 1);
    }

    #[test]
    fn test_tab_cycles_field_focus() {
        let mut app = App::default();
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.field_focus, 2);
        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.field_focus, 1);
    }

    #[test]
    fn test_enter_edits_and_commits_a_field() {
        let mut app = App::default();
        press(&mut app, KeyCode::Enter);
        assert!(matches!(app.mode, AppMode::Editing));

        for c in "Juan".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Enter);

        assert!(matches!(app.mode, AppMode::Normal));
        assert_eq!(app.record.owner_name, "Juan");
    }

    #[test]
    fn test_editing_backspace_and_escape() {
        let mut app = App::default();
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('a'));
        press(&mut app, KeyCode::Char('b'));
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.input, "a");

        press(&mut app, KeyCode::Esc);
        assert!(matches!(app.mode, AppMode::Normal));
        assert!(app.record.owner_name.is_empty());
    }

    #[test]
    fn test_pgdn_submit_blocked_by_required_fields() {
        let mut app = App::default();
        press(&mut app, KeyCode::PageDown);
        assert_eq!(app.sequencer.current(), 1);
        assert!(app.status_message.is_some());
    }

    #[test]
    fn test_ctrl_n_submits_step() {
        let mut app = App::default();
        for field in crate::domain::Step::BusinessDetails.fields() {
            app.merge_update(RecordPatch::single(*field, "x"));
        }
        InputHandler::handle_key_event(&mut app, KeyCode::Char('n'), KeyModifiers::CONTROL);
        assert_eq!(app.sequencer.current(), 2);
    }

    #[test]
    fn test_space_toggles_consent_only_on_consent_step() {
        let mut app = App::default();
        press(&mut app, KeyCode::Char(' '));
        assert!(!app.record.consent_agreed);

        press(&mut app, KeyCode::Char('5'));
        press(&mut app, KeyCode::Char(' '));
        assert!(app.record.consent_agreed);
        press(&mut app, KeyCode::Char(' '));
        assert!(!app.record.consent_agreed);
    }

    #[test]
    fn test_consent_enter_submits_application() {
        let mut app = App::default();
        press(&mut app, KeyCode::Char('5'));
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Enter);

        assert!(app.submitted);
        assert!(app.application_number.as_deref().unwrap().starts_with("BP-"));
    }

    #[test]
    fn test_help_toggle_and_scroll() {
        let mut app = App::default();
        press(&mut app, KeyCode::Char('?'));
        assert!(matches!(app.mode, AppMode::Help));

        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::PageDown);
        assert_eq!(app.help_scroll, 6);

        press(&mut app, KeyCode::Esc);
        assert!(matches!(app.mode, AppMode::Normal));
    }

    #[test]
    fn test_success_keys_open_export_prompts() {
        let mut app = App::default();
        app.merge_update(RecordPatch::single(FieldId::OwnerName, "Juan"));
        app.toggle_consent();
        app.finalize_at(12345678).unwrap();

        press(&mut app, KeyCode::Char('d'));
        assert!(matches!(app.mode, AppMode::SaveReceipt));
        press(&mut app, KeyCode::Esc);

        press(&mut app, KeyCode::Char('e'));
        assert!(matches!(app.mode, AppMode::ExportCsv));
        press(&mut app, KeyCode::Esc);
        assert!(matches!(app.mode, AppMode::Normal));
    }

    #[test]
    fn test_filename_editing_in_save_prompt() {
        let mut app = App::default();
        app.toggle_consent();
        app.finalize_at(1).unwrap();
        app.start_save_receipt();

        press(&mut app, KeyCode::Char('x'));
        assert_eq!(app.filename_input, "permit-receipt.jsonx");
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.filename_input, "permit-receipt.json");
    }

    #[test]
    fn test_field_editing_with_multibyte_input() {
        let mut app = App::default();
        press(&mut app, KeyCode::Enter);
        for c in "Peña".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        assert_eq!(app.input, "Peña");
        assert_eq!(app.cursor_position, 4);

        // Insert before the 'ñ', then undo it with backspace.
        press(&mut app, KeyCode::Left);
        press(&mut app, KeyCode::Left);
        press(&mut app, KeyCode::Char('ñ'));
        assert_eq!(app.input, "Peñña");
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.input, "Peña");

        press(&mut app, KeyCode::End);
        press(&mut app, KeyCode::Char('s'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.record.owner_name, "Peñas");
    }

    #[test]
    fn test_editing_prefilled_multibyte_value() {
        let mut app = App::default();
        app.merge_update(RecordPatch::single(FieldId::OwnerName, "Peña"));
        app.start_editing();
        assert_eq!(app.cursor_position, 4);

        press(&mut app, KeyCode::Left);
        press(&mut app, KeyCode::Left);
        press(&mut app, KeyCode::Delete);
        assert_eq!(app.input, "Pea");
        press(&mut app, KeyCode::Char('ñ'));
        assert_eq!(app.input, "Peña");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.record.owner_name, "Peña");
    }

    #[test]
    fn test_filename_editing_with_multibyte_input() {
        let mut app = App::default();
        app.toggle_consent();
        app.finalize_at(1).unwrap();
        app.start_save_receipt();

        press(&mut app, KeyCode::Home);
        press(&mut app, KeyCode::Char('ñ'));
        assert_eq!(app.filename_input, "ñpermit-receipt.json");
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.filename_input, "ñermit-receipt.json");
        press(&mut app, KeyCode::End);
        press(&mut app, KeyCode::Char('x'));
        assert_eq!(app.filename_input, "ñermit-receipt.jsonx");
    }

    #[test]
    fn test_save_receipt_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");

        let mut app = App::default();
        app.toggle_consent();
        app.finalize_at(87654321).unwrap();
        app.start_save_receipt();
        app.filename_input = path.to_str().unwrap().to_string();
        app.cursor_position = app.filename_input.chars().count();

        press(&mut app, KeyCode::Enter);
        assert!(matches!(app.mode, AppMode::Normal));
        assert!(path.exists());
        assert!(app.status_message.as_deref().unwrap().starts_with("Saved to"));
    }
}
