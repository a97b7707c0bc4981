pub mod header;
pub mod station_list;
pub mod volume_slider;
