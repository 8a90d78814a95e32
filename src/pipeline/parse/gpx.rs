use crate::error::ParseError;
use crate::pipeline::parse::Parser;
use crate::types::activity::{FileFormat, ParsedActivity, TrackPoint};
use chrono::{DateTime, Utc};
use quick_xml::events::Event;
use quick_xml::Reader;

pub struct GpxParser;

impl Parser for GpxParser {
    fn parse(&self, bytes: &[u8]) -> Result<ParsedActivity, ParseError> {
        let mut reader = Reader::from_reader(bytes);
        reader.trim_text(true);

        let mut points = Vec::new();
        let mut name = None;
        let mut sport = None;
        let mut in_trk = false;
        let mut in_trkpt = false;
        let mut current_point: Option<TrackPoint> = None;
        let mut current_element = String::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                    let element = e.name();
                    let name_str = std::str::from_utf8(element.as_ref())
                        .map_err(|e| ParseError::InvalidGpx(e.to_string()))?;

                    if name_str == "trk" {
                        in_trk = true;
                    } else if name_str == "trkpt" {
                        in_trkpt = true;
                        let mut lat = None;
                        let mut lon = None;

                        for attr in e.attributes() {
                            let attr = attr.map_err(|e| ParseError::InvalidGpx(e.to_string()))?;
                            let key = std::str::from_utf8(attr.key.as_ref())
                                .map_err(|e| ParseError::InvalidGpx(e.to_string()))?;
                            let value = std::str::from_utf8(&attr.value)
                                .map_err(|e| ParseError::InvalidGpx(e.to_string()))?;

                            match key {
                                "lat" => lat = value.parse().ok(),
                                "lon" => lon = value.parse().ok(),
                                _ => {}
                            }
                        }

                        if let (Some(lat), Some(lon)) = (lat, lon) {
                            current_point = Some(TrackPoint {
                                lat,
                                lon,
                                elevation: None,
                                time: None,
                                power: None,
                            });
                        }
                    }
                    current_element = name_str.to_string();
                }
                Ok(Event::Text(e)) => {
                    let text = e
                        .unescape()
                        .map_err(|e| ParseError::InvalidGpx(e.to_string()))?;

                    if in_trkpt {
                        if let Some(point) = current_point.as_mut() {
                            match current_element.as_str() {
                                "ele" => point.elevation = text.parse().ok(),
                                "time" => point.time = text.parse::<DateTime<Utc>>().ok(),
                                "power" | "gpxtpx:power" => point.power = text.parse().ok(),
                                _ => {}
                            }
                        }
                    } else if in_trk {
                        match current_element.as_str() {
                            "name" => name = Some(text.to_string()),
                            "type" => sport = Some(text.to_string()),
                            _ => {}
                        }
                    }
                }
                Ok(Event::End(e)) => {
                    let element = e.name();
                    let name_str = std::str::from_utf8(element.as_ref())
                        .map_err(|e| ParseError::InvalidGpx(e.to_string()))?;

                    match name_str {
                        "trkpt" => {
                            if let Some(point) = current_point.take() {
                                points.push(point);
                            }
                            in_trkpt = false;
                        }
                        "trk" => in_trk = false,
                        _ => {}
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

        Ok(ParsedActivity {
            points,
            file_format: FileFormat::Gpx,
            name,
            sport,
            sub_sport: None,
        })
    }
}
