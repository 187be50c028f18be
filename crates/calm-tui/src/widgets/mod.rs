pub mod button_row;
pub mod pane_chrome;
pub mod status_bar;
pub mod toast;
