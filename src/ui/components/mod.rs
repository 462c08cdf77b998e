pub mod stats_bar;
pub mod typing_area;
pub mod weakness_panel;
