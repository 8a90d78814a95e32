use crate::error::ParseError;
use crate::pipeline::parse::Parser;
use crate::types::activity::{FileFormat, ParsedActivity, TrackPoint};
use chrono::DateTime;
use fitparser::profile::MesgNum;

pub struct FitParser;

impl Parser for FitParser {
    fn parse(&self, bytes: &[u8]) -> Result<ParsedActivity, ParseError> {
        let data = fitparser::from_bytes(bytes)
            .map_err(|e| ParseError::InvalidFit(format!("Failed to parse FIT file: {}", e)))?;

        let mut points = Vec::new();
        let mut sport = None;
        let mut sub_sport = None;

        for record in data {
            match record.kind() {
                MesgNum::Record => {}
                MesgNum::Session | MesgNum::Sport => {
                    for field in record.fields() {
                        match (field.name(), field.value()) {
                            ("sport", fitparser::Value::String(value)) if sport.is_none() => {
                                sport = Some(value.clone());
                            }
                            ("sub_sport", fitparser::Value::String(value)) if sub_sport.is_none() => {
                                sub_sport = Some(value.clone());
                            }
                            _ => {}
                        }
                    }
                    continue;
                }
                _ => continue,
            }

            let mut point = TrackPoint {
                lat: 0.0,
                lon: 0.0,
                elevation: None,
                time: None,
                power: None,
            };

            let mut has_lat = false;
            let mut has_lon = false;

            for field in record.fields() {
                match field.name() {
                    "position_lat" => {
                        if let fitparser::Value::SInt32(val) = field.value() {
                            point.lat = semicircles_to_degrees(*val);
                            has_lat = true;
                        }
                    }
                    "position_long" => {
                        if let fitparser::Value::SInt32(val) = field.value() {
                            point.lon = semicircles_to_degrees(*val);
                            has_lon = true;
                        }
                    }
                    "altitude" | "enhanced_altitude" => {
                        if let fitparser::Value::Float64(val) = field.value() {
                            point.elevation = Some(*val);
                        }
                    }
                    "timestamp" => {
                        if let fitparser::Value::Timestamp(val) = field.value() {
                            point.time = DateTime::from_timestamp(val.timestamp(), 0);
                        }
                    }
                    "power" => {
                        if let fitparser::Value::UInt16(val) = field.value() {
                            point.power = Some(*val);
                        }
                    }
                    _ => {}
                }
            }

            if has_lat && has_lon {
                points.push(point);
            }
        }

        if points.is_empty() {
            return Err(ParseError::EmptyFile);
        }

        Ok(ParsedActivity {
            points,
            file_format: FileFormat::Fit,
            name: None,
            sport,
            sub_sport,
        })
    }
}

fn semicircles_to_degrees(semicircles: i32) -> f64 {
    (semicircles as f64) * (180.0 / 2_147_483_648.0)
}
