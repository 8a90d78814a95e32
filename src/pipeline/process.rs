use crate::types::activity::TrackPoint;

/// Gaps longer than this between two samples count as a pause.
const MAX_MOVING_GAP_SECONDS: i64 = 30;
const MIN_MOVING_SPEED_KMH: f64 = 1.0;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackSummary {
    pub distance_km: f64,
    pub elevation_gain_m: f64,
    pub moving_time_s: u64,
    pub avg_speed_kmh: f64,
    pub max_speed_kmh: f64,
    pub avg_watts: f64,
    pub max_watts: f64,
}

pub fn summarize(points: &[TrackPoint]) -> TrackSummary {
    let mut distance_km = 0.0;
    let mut elevation_gain_m = 0.0;
    let mut moving_time_s = 0u64;
    let mut moving_distance_km = 0.0;
    let mut max_speed_kmh: f64 = 0.0;
    let mut power_sum = 0u64;
    let mut power_count = 0u64;
    let mut max_power = 0u16;

    for pair in points.windows(2) {
        let prev = &pair[0];
        let curr = &pair[1];

        let step_km = haversine_distance(prev.lat, prev.lon, curr.lat, curr.lon);
        distance_km += step_km;

        if let (Some(prev_ele), Some(curr_ele)) = (prev.elevation, curr.elevation) {
            let gain = curr_ele - prev_ele;
            if gain > 0.0 {
                elevation_gain_m += gain;
            }
        }

        if let (Some(prev_time), Some(curr_time)) = (prev.time, curr.time) {
            let seconds = (curr_time - prev_time).num_seconds();
            if seconds > 0 && seconds <= MAX_MOVING_GAP_SECONDS {
                let speed_kmh = step_km / (seconds as f64) * 3600.0;
                if speed_kmh >= MIN_MOVING_SPEED_KMH {
                    moving_time_s += seconds as u64;
                    moving_distance_km += step_km;
                    max_speed_kmh = max_speed_kmh.max(speed_kmh);
                }
            }
        }

        if let Some(power) = curr.power {
            power_sum += power as u64;
            power_count += 1;
            max_power = max_power.max(power);
        }
    }

    let avg_speed_kmh = if moving_time_s > 0 {
        moving_distance_km / (moving_time_s as f64) * 3600.0
    } else {
        0.0
    };

    TrackSummary {
        distance_km,
        elevation_gain_m,
        moving_time_s,
        avg_speed_kmh,
        max_speed_kmh,
        avg_watts: if power_count > 0 {
            power_sum as f64 / power_count as f64
        } else {
            0.0
        },
        max_watts: max_power as f64,
    }
}

fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    const R: f64 = 6371.0; // Earth radius in km

    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);

    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    R * c
}
