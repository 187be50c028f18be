pub mod embed_panel;
pub mod header;
pub mod help_overlay;
pub mod mode_bar;
pub mod timer_panel;
pub mod track_list;
pub mod transport;
