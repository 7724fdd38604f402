use std::io::Cursor;

use apng::{create_config, image_png, Encoder, Frame, PNGImage};
use rayon::prelude::*;

use crate::error::{AnimationError, RasterError, RenderError};
use crate::pipeline::render::{self, MapFrame};
use crate::pipeline::rasterize;
use crate::types::day::DayId;
use crate::types::photo::Photo;
use crate::types::route::RouteIndex;
use crate::types::viz::{OutputConfig, RenderOptions};

/// One frame per day from day 1 to `through`, each highlighting that day.
/// All frames share the framing of the final day so the map holds still while
/// the route grows.
pub fn render_journey_apng(
    route: &RouteIndex,
    photos: &[Photo],
    through: DayId,
    total_days: u16,
    options: &RenderOptions,
    output: &OutputConfig,
) -> Result<Vec<u8>, AnimationError> {
    let bbox = route
        .bbox_through(through)
        .ok_or(RenderError::NoRoute(through.get()))?;
    let framing = MapFrame::fit(bbox, options)?;

    // Days with no route yet would repeat the previous frame; skip them.
    let days: Vec<DayId> = DayId::all(through.get())
        .filter(|day| route.get(*day).is_some())
        .collect();

    let frames: Vec<PNGImage> = days
        .par_iter()
        .enumerate()
        .map(|(idx, day)| {
            let svg = render::render_frame_svg(route, photos, *day, &framing, options).map_err(|err| {
                RasterError::AnimationFailed(format!(
                    "Failed to render animation frame for day {}: {}",
                    day, err
                ))
            })?;

            let frame_output = if options.label {
                output.clone().with_label(format!("Day {} of {}", day, total_days))
            } else {
                output.clone()
            };
            let png_bytes = rasterize::rasterize(&svg, &frame_output)?;
            png_image_from_bytes(&png_bytes, idx)
        })
        .collect::<Result<Vec<_>, RasterError>>()?;

    let config = create_config(&frames, None)
        .map_err(|err| RasterError::AnimationFailed(format!("Failed to build APNG config: {}", err)))?;

    let mut output_bytes = Vec::new();
    {
        let mut cursor = Cursor::new(&mut output_bytes);
        let mut encoder = Encoder::new(&mut cursor, config)
            .map_err(|err| RasterError::AnimationFailed(format!("Failed to create APNG encoder: {}", err)))?;
        let frame = Frame {
            delay_num: Some(options.frame_delay_ms.clamp(16, u16::MAX as u32) as u16),
            delay_den: Some(1000),
            ..Default::default()
        };
        encoder.encode_all(frames, Some(&frame)).map_err(|err| {
            RasterError::AnimationFailed(format!("Failed to encode APNG frames: {}", err))
        })?;
    }

    Ok(output_bytes)
}

fn png_image_from_bytes(png_bytes: &[u8], frame_idx: usize) -> Result<PNGImage, RasterError> {
    let decoder = image_png::Decoder::new(Cursor::new(png_bytes));
    let mut reader = decoder.read_info().map_err(|err| {
        RasterError::AnimationFailed(format!(
            "Failed to decode PNG metadata for frame {}: {}",
            frame_idx, err
        ))
    })?;
    let mut data = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut data).map_err(|err| {
        RasterError::AnimationFailed(format!(
            "Failed to decode PNG pixels for frame {}: {}",
            frame_idx, err
        ))
    })?;
    data.truncate(info.buffer_size());

    Ok(PNGImage {
        width: info.width,
        height: info.height,
        data,
        color_type: info.color_type,
        bit_depth: info.bit_depth,
    })
}
