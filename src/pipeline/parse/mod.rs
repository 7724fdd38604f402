mod gpx;

pub use gpx::parse_gpx;
