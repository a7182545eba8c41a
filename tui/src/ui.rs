mod layout;
mod widgets;

pub use layout::render;
pub use widgets::{
    rating_color, render_calendar, render_delete_confirmation, render_form, render_header,
    render_help_screen, render_history, render_status_bar,
};
