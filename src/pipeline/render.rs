use crate::error::RenderError;
use crate::types::day::DayId;
use crate::types::photo::{self, Photo};
use crate::types::route::{BoundingBox, Position, RouteFeature, RouteIndex};
use crate::types::viz::{RenderOptions, ACTIVE_COLOR, PAST_COLOR, PAST_OPACITY, PHOTO_COLOR};

const PAST_STROKE_RATIO: f32 = 0.75;
const GLOW_STROKE_RATIO: f32 = 2.4;
const ENDPOINT_RADIUS_RATIO: f64 = 2.2;
const PHOTO_RADIUS: f64 = 6.0;
const START_COLOR: &str = "#0f172a";

/// Maps lng/lat into the pixel space of one preview. Built once per image
/// (or once per animation, so every frame shares the same framing).
#[derive(Debug, Clone, Copy)]
pub struct MapFrame {
    min_x: f64,
    max_y: f64,
    scale: f64,
    offset_x: f64,
    offset_y: f64,
}

impl MapFrame {
    pub fn fit(bbox: BoundingBox, options: &RenderOptions) -> Result<Self, RenderError> {
        let padding = options.padding as f64;
        let view_width = options.width as f64 - 2.0 * padding;
        let view_height = options.height as f64 - 2.0 * padding;
        if view_width <= 0.0 || view_height <= 0.0 {
            return Err(RenderError::SvgError("Invalid viewport size".to_string()));
        }

        let (min_x, min_y) = mercator_project(bbox.min_lat, bbox.min_lng);
        let (max_x, max_y) = mercator_project(bbox.max_lat, bbox.max_lng);
        let content_width = (max_x - min_x).max(f64::EPSILON);
        let content_height = (max_y - min_y).max(f64::EPSILON);
        let scale = (view_width / content_width).min(view_height / content_height);

        Ok(Self {
            min_x,
            max_y,
            scale,
            offset_x: padding + (view_width - content_width * scale) * 0.5,
            offset_y: padding + (view_height - content_height * scale) * 0.5,
        })
    }

    pub fn project(&self, lng: f64, lat: f64) -> (f64, f64) {
        let (x, y) = mercator_project(lat, lng);
        (
            self.offset_x + (x - self.min_x) * self.scale,
            // screen y grows downwards
            self.offset_y + (self.max_y - y) * self.scale,
        )
    }
}

/// Draws the route as ridden by the end of `through`: earlier days faded,
/// `through` itself highlighted, and the photos reached so far.
pub fn render_progress_svg(
    route: &RouteIndex,
    photos: &[Photo],
    through: DayId,
    options: &RenderOptions,
) -> Result<String, RenderError> {
    let bbox = route
        .bbox_through(through)
        .ok_or(RenderError::NoRoute(through.get()))?;
    let frame = MapFrame::fit(bbox, options)?;
    render_frame_svg(route, photos, through, &frame, options)
}

/// Same as [`render_progress_svg`] with a caller-supplied framing.
pub fn render_frame_svg(
    route: &RouteIndex,
    photos: &[Photo],
    through: DayId,
    frame: &MapFrame,
    options: &RenderOptions,
) -> Result<String, RenderError> {
    let features = route.through(through);
    if features.is_empty() {
        return Err(RenderError::NoRoute(through.get()));
    }

    let past_width = (options.stroke_width * PAST_STROKE_RATIO).max(1.0);
    let mut past_paths = String::new();
    let mut active_lines: Vec<Vec<(f64, f64)>> = Vec::new();

    for feature in &features {
        for line in feature.geometry.lines() {
            let coords = project_line(frame, line);
            if feature.day() == through {
                active_lines.push(coords);
                continue;
            }
            past_paths.push_str(&format!(
                r#"<path d="{}" fill="none" stroke="{}" stroke-opacity="{:.2}" stroke-width="{:.1}" stroke-linecap="round" stroke-linejoin="round"/>"#,
                build_polyline_path(&coords),
                PAST_COLOR,
                PAST_OPACITY,
                past_width
            ));
        }
    }

    let active_d: String = active_lines
        .iter()
        .map(|coords| build_polyline_path(coords))
        .collect::<Vec<_>>()
        .join(" ");

    let glow_path = if options.glow && !active_d.is_empty() {
        format!(
            r#"<path d="{}" fill="none" stroke="{}" stroke-width="{:.1}" stroke-linecap="round" stroke-linejoin="round" filter="url(#glow)" opacity="0.6"/>"#,
            active_d,
            ACTIVE_COLOR,
            options.stroke_width * GLOW_STROKE_RATIO
        )
    } else {
        String::new()
    };

    let active_path = if active_d.is_empty() {
        String::new()
    } else {
        format!(
            r#"<path d="{}" fill="none" stroke="{}" stroke-width="{:.1}" stroke-linecap="round" stroke-linejoin="round"/>"#,
            active_d, ACTIVE_COLOR, options.stroke_width
        )
    };

    let endpoint_dots = build_endpoint_dots(features_endpoints(frame, &features), options);
    let photo_dots = if options.show_photos {
        build_photo_dots(frame, &photo::visible(photos, through))
    } else {
        String::new()
    };

    let width = options.width as f64;
    let height = options.height as f64;
    Ok(format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">
  <defs>
    {}
  </defs>
  {}
  {}
  {}
  {}
  {}
</svg>"#,
        width,
        height,
        width,
        height,
        glow_filter_def(options.glow),
        past_paths,
        glow_path,
        active_path,
        photo_dots,
        endpoint_dots
    ))
}

fn project_line(frame: &MapFrame, line: &[Position]) -> Vec<(f64, f64)> {
    line.iter().map(|p| frame.project(p.lng, p.lat)).collect()
}

/// First vertex of the journey and last vertex of the newest day.
fn features_endpoints(
    frame: &MapFrame,
    features: &[&RouteFeature],
) -> Option<((f64, f64), (f64, f64))> {
    let first = features
        .first()
        .and_then(|f| f.geometry.lines().into_iter().find_map(|line| line.first().copied()))?;
    let last = features
        .last()
        .and_then(|f| f.geometry.lines().into_iter().rev().find_map(|line| line.last().copied()))?;
    Some((frame.project(first.lng, first.lat), frame.project(last.lng, last.lat)))
}

fn build_endpoint_dots(endpoints: Option<((f64, f64), (f64, f64))>, options: &RenderOptions) -> String {
    let Some((start, end)) = endpoints else {
        return String::new();
    };
    let radius = options.stroke_width as f64 * ENDPOINT_RADIUS_RATIO;
    format!(
        r#"<circle cx="{:.2}" cy="{:.2}" r="{:.2}" fill="{}" opacity="0.95"/>
  <circle cx="{:.2}" cy="{:.2}" r="{:.2}" fill="{}" stroke="white" stroke-width="2" opacity="0.95"/>"#,
        start.0, start.1, radius, START_COLOR, end.0, end.1, radius, ACTIVE_COLOR
    )
}

fn build_photo_dots(frame: &MapFrame, photos: &[&Photo]) -> String {
    photos
        .iter()
        .map(|photo| {
            let (x, y) = frame.project(photo.coordinates[0], photo.coordinates[1]);
            format!(
                r#"<circle cx="{:.2}" cy="{:.2}" r="{:.1}" fill="{}" stroke="white" stroke-width="1.5"/>"#,
                x, y, PHOTO_RADIUS, PHOTO_COLOR
            )
        })
        .collect()
}

fn mercator_project(lat: f64, lon: f64) -> (f64, f64) {
    let x = lon;
    let y = (lat.to_radians().tan() + (1.0 / lat.to_radians().cos()))
        .ln()
        .to_degrees();
    (x, y)
}

fn glow_filter_def(enabled: bool) -> String {
    if !enabled {
        return String::new();
    }
    r#"<filter id="glow" x="-20%" y="-20%" width="140%" height="140%">
      <feGaussianBlur stdDeviation="6" result="blur"/>
      <feMerge>
        <feMergeNode in="blur"/>
        <feMergeNode in="blur"/>
        <feMergeNode in="SourceGraphic"/>
      </feMerge>
    </filter>"#
        .to_string()
}

fn build_polyline_path(points: &[(f64, f64)]) -> String {
    points.iter().enumerate().fold(String::new(), |mut s, (i, (x, y))| {
        if i == 0 {
            s.push_str(&format!("M {:.2} {:.2}", x, y));
        } else {
            s.push_str(&format!(" L {:.2} {:.2}", x, y));
        }
        s
    })
}

