pub mod level_bar;
pub mod pane_chrome;
pub mod scrollable_list;
