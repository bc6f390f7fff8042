//! Keyboard shortcuts mapped onto user intents.

use bevy::prelude::*;

use crate::interaction::{SelectionState, UiCapture, UserIntent, VisitTarget};

const SHORTCUTS: [KeyCode; 9] = [
    KeyCode::Escape,
    KeyCode::Space,
    KeyCode::KeyC,
    KeyCode::KeyV,
    KeyCode::KeyE,
    KeyCode::KeyF,
    KeyCode::KeyO,
    KeyCode::KeyR,
    KeyCode::KeyP,
];

/// Intents triggered by one key press in the given selection state.
pub fn intent_for_key(key: KeyCode, selection: &SelectionState) -> Vec<UserIntent> {
    match key {
        KeyCode::Escape => vec![UserIntent::Select(None)],
        KeyCode::Space => vec![UserIntent::TogglePause],
        KeyCode::KeyC if selection.comparison_mode => vec![UserIntent::DisableCompare],
        KeyCode::KeyC => vec![UserIntent::EnableCompare],
        KeyCode::KeyV => selection
            .selected
            .map(|id| vec![UserIntent::Visit(Some(VisitTarget::Object(id)))])
            .unwrap_or_default(),
        KeyCode::KeyE => vec![UserIntent::Visit(Some(VisitTarget::PrimaryBody))],
        KeyCode::KeyF if selection.followed.is_some() && selection.followed == selection.selected => {
            vec![UserIntent::Follow(None)]
        }
        KeyCode::KeyF => selection
            .selected
            .map(|id| vec![UserIntent::Follow(Some(id))])
            .unwrap_or_default(),
        KeyCode::KeyO => vec![
            UserIntent::DisableCompare,
            UserIntent::Visit(None),
            UserIntent::Follow(None),
        ],
        KeyCode::KeyR => vec![UserIntent::ReloadCatalog],
        KeyCode::KeyP => vec![UserIntent::Reset],
        _ => Vec::new(),
    }
}

pub fn keyboard_intents(
    keys: Res<ButtonInput<KeyCode>>,
    capture: Res<UiCapture>,
    selection: Res<SelectionState>,
    mut intents: EventWriter<UserIntent>,
) {
    if capture.keyboard {
        return;
    }
    for key in SHORTCUTS {
        if keys.just_pressed(key) {
            intents.send_batch(intent_for_key(key, &selection));
        }
    }
}
