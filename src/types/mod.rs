pub mod camera;
pub mod day;
pub mod journal;
pub mod photo;
pub mod route;
pub mod track;
pub mod viz;
pub mod weather;
