use tracing::debug;

use crate::state::UiState;
use crate::view::View;

/// Hides `step` and reveals `step + 1`.
pub fn advance<V: View>(state: &mut UiState, view: &mut V, step: usize) {
    show_only(view, step, step + 1);
    state.set_current_step(step + 1);
}

/// Hides `step` and reveals `step - 1`. Landing on the first step clears the form, the error line
/// and the retained result. There is nothing before step 1, so retreating from it does nothing.
pub fn retreat<V: View>(state: &mut UiState, view: &mut V, step: usize) {
    if step <= 1 {
        debug!(step, "retreat ignored at first step");
        return;
    }
    let prev = step - 1;
    show_only(view, step, prev);
    state.set_current_step(prev);

    if prev == 1 {
        view.reset_form();
        view.hide_error();
        view.hide_results();
        state.clear_retained();
    }
}

fn show_only<V: View>(view: &mut V, hide: usize, reveal: usize) {
    if !view.set_panel_visible(hide, false) {
        debug!(step = hide, "no panel to hide");
    }
    if !view.set_panel_visible(reveal, true) {
        debug!(step = reveal, "no panel to reveal");
    }
}
