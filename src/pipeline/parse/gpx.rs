use chrono::{DateTime, Utc};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::ParseError;
use crate::types::track::{Track, TrackPoint};

/// Reads every `<trkpt>` of a GPX file, across all tracks and segments, in
/// document order. Points without a usable lat/lon are dropped.
pub fn parse_gpx(bytes: &[u8]) -> Result<Track, ParseError> {
    let mut reader = Reader::from_reader(bytes);
    reader.trim_text(true);

    let mut points = Vec::new();
    let mut current_point: Option<TrackPoint> = None;
    let mut in_trkpt = false;
    let mut current_element = String::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = element_name(&e)?;
                if name == "trkpt" {
                    in_trkpt = true;
                    current_point = track_point(&e)?;
                } else if in_trkpt {
                    current_element = name;
                }
            }
            // <trkpt lat=".." lon=".."/> with no children
            Ok(Event::Empty(e)) => {
                if element_name(&e)? == "trkpt" {
                    points.extend(track_point(&e)?);
                }
            }
            Ok(Event::Text(e)) if in_trkpt => {
                if let Some(point) = current_point.as_mut() {
                    let text = e
                        .unescape()
                        .map_err(|e| ParseError::InvalidGpx(e.to_string()))?;
                    match current_element.as_str() {
                        "ele" => point.elevation = text.parse().ok(),
                        "time" => point.time = text.parse::<DateTime<Utc>>().ok(),
                        _ => {}
                    }
                }
            }
            Ok(Event::End(e)) => {
                let name = e.name();
                if name.as_ref() == b"trkpt" {
                    points.extend(current_point.take());
                    in_trkpt = false;
                }
                current_element.clear();
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ParseError::InvalidGpx(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    if points.is_empty() {
        return Err(ParseError::EmptyFile);
    }

    Ok(Track { points })
}

fn element_name(e: &BytesStart) -> Result<String, ParseError> {
    let name = e.name();
    std::str::from_utf8(name.as_ref())
        .map(str::to_string)
        .map_err(|e| ParseError::InvalidGpx(e.to_string()))
}

fn track_point(e: &BytesStart) -> Result<Option<TrackPoint>, ParseError> {
    let mut lat = None;
    let mut lon = None;

    for attr in e.attributes() {
        let attr = attr.map_err(|e| ParseError::InvalidGpx(e.to_string()))?;
        let value = std::str::from_utf8(&attr.value)
            .map_err(|e| ParseError::InvalidGpx(e.to_string()))?;
        match attr.key.as_ref() {
            b"lat" => lat = value.trim().parse::<f64>().ok(),
            b"lon" => lon = value.trim().parse::<f64>().ok(),
            _ => {}
        }
    }

    Ok(match (lat, lon) {
        (Some(lat), Some(lon)) => Some(TrackPoint {
            lat,
            lon,
            elevation: None,
            time: None,
        }),
        _ => None,
    })
}
