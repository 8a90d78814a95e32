use std::ops::AddAssign;

use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Totals {
    pub distance_km: f64,
    pub elevation_m: f64,
}

impl Totals {
    pub fn new(distance_km: f64, elevation_m: f64) -> Self {
        Self {
            distance_km,
            elevation_m,
        }
    }
}

impl AddAssign for Totals {
    fn add_assign(&mut self, other: Self) {
        self.distance_km += other.distance_km;
        self.elevation_m += other.elevation_m;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Gear {
    pub id: String,
    pub nickname: Option<String>,
}

impl Gear {
    pub fn label(&self) -> &str {
        self.nickname.as_deref().unwrap_or(&self.id)
    }
}
