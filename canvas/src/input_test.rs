use uuid::Uuid;

use super::*;

fn note_menu(kind: NoteKind) -> ContextMenu {
    ContextMenu { at: Point::new(10.0, 20.0), target: MenuTarget::Note { id: Uuid::new_v4(), kind } }
}

// =============================================================
// ContextMenu
// =============================================================

#[test]
fn canvas_menu_offers_creation() {
    let menu = ContextMenu { at: Point::default(), target: MenuTarget::Canvas };
    assert_eq!(menu.items(), &[MenuItem::AddTextNote, MenuItem::AddDrawingNote, MenuItem::Cancel]);
    let labels: Vec<_> = menu.items().iter().map(|i| menu.label(*i)).collect();
    assert_eq!(labels, ["Text Note", "Draw Note", "Cancel"]);
}

#[test]
fn note_menu_offers_edit_and_delete() {
    let menu = note_menu(NoteKind::Text);
    assert_eq!(menu.items(), &[MenuItem::EditNote, MenuItem::DeleteNote, MenuItem::Cancel]);
    assert_eq!(menu.label(MenuItem::EditNote), "Edit Note");
    assert_eq!(menu.label(MenuItem::DeleteNote), "Delete Note");
}

#[test]
fn drawing_menu_labels_mention_drawing() {
    let menu = note_menu(NoteKind::Drawing);
    assert_eq!(menu.label(MenuItem::EditNote), "Edit Drawing");
    assert_eq!(menu.label(MenuItem::DeleteNote), "Delete Drawing");
}

#[test]
fn only_delete_is_danger() {
    assert!(ContextMenu::is_danger(MenuItem::DeleteNote));
    assert!(!ContextMenu::is_danger(MenuItem::EditNote));
    assert!(!ContextMenu::is_danger(MenuItem::Cancel));
}

// =============================================================
// Key
// =============================================================

#[test]
fn escape_key_detected() {
    assert!(Key("Escape".into()).is_escape());
    assert!(!Key("Enter".into()).is_escape());
}

// =============================================================
// UiState
// =============================================================

#[test]
fn ui_state_starts_closed() {
    let ui = UiState::default();
    assert!(ui.menu.is_none());
    assert!(ui.editing.is_none());
}

#[test]
fn new_note_content_keeps_style_resets_text() {
    let mut ui = UiState::default();
    ui.text_style.font = "Roboto".into();
    ui.text_style.weight = "700".into();
    ui.text_style.text = "typed earlier".into();

    let content = ui.new_note_content();
    assert_eq!(content.text, NEW_NOTE_TEXT);
    assert_eq!(content.font, "Roboto");
    assert_eq!(content.weight, "700");
}

#[test]
fn editor_choices() {
    assert_eq!(FONTS, ["Quicksand", "Open Sans", "Roboto"]);
    let values: Vec<_> = WEIGHTS.iter().map(|(v, _)| *v).collect();
    assert_eq!(values, ["300", "500", "700"]);
}
