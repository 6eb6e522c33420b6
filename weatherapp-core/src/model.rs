use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Current conditions for one location, as returned by WeatherAPI.com `current.json`.
///
/// Field values are kept verbatim; the only derived value is [`Condition::icon_url`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub location: Location,
    pub current: CurrentConditions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    #[serde(default)]
    pub region: String,
    pub country: String,
    /// Local time at the location, `"YYYY-MM-DD HH:MM"`.
    pub localtime: String,
}

impl Location {
    /// Parse `localtime`. WeatherAPI drops the leading zero on the hour ("2024-05-01 9:05").
    pub fn local_time(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(self.localtime.trim(), "%Y-%m-%d %k:%M")
            .or_else(|_| NaiveDateTime::parse_from_str(self.localtime.trim(), "%Y-%m-%d %H:%M"))
            .ok()
    }

    /// Date half of `localtime`.
    pub fn local_date_str(&self) -> &str {
        self.localtime.split_once(' ').map_or(self.localtime.as_str(), |(date, _)| date)
    }

    /// Clock half of `localtime`, empty when the string has no time part.
    pub fn local_clock_str(&self) -> &str {
        self.localtime.split_once(' ').map_or("", |(_, clock)| clock)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temp_c: f64,
    #[serde(default)]
    pub feelslike_c: Option<f64>,
    pub condition: Condition,
    pub humidity: u8,
    pub wind_kph: f64,
    pub uv: f64,
    pub cloud: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub text: String,
    /// Protocol-relative icon path, e.g. `//cdn.weatherapi.com/weather/64x64/day/116.png`.
    pub icon: String,
}

impl Condition {
    /// Absolute URL of the large (128x128) variant of the condition icon.
    pub fn icon_url(&self) -> String {
        let absolute = if self.icon.starts_with("http:") || self.icon.starts_with("https:") {
            self.icon.clone()
        } else {
            format!("https:{}", self.icon)
        };
        absolute.replace("64x64", "128x128")
    }
}

/// Caller location resolved from its public IP (ipinfo.io `/json`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    /// `"lat,lon"`
    #[serde(default)]
    pub loc: Option<String>,
}

impl GeoLocation {
    /// City name, if the service returned a non-blank one.
    pub fn city_name(&self) -> Option<&str> {
        self.city.as_deref().map(str::trim).filter(|c| !c.is_empty())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    pub(crate) const LONDON_JSON: &str = r#"{
        "location": {
            "name": "London",
            "region": "City of London, Greater London",
            "country": "United Kingdom",
            "lat": 51.52,
            "lon": -0.11,
            "tz_id": "Europe/London",
            "localtime_epoch": 1714550700,
            "localtime": "2024-05-01 9:05"
        },
        "current": {
            "last_updated_epoch": 1714550400,
            "temp_c": 12.0,
            "feelslike_c": 10.6,
            "is_day": 1,
            "condition": {
                "text": "Partly cloudy",
                "icon": "//cdn.weatherapi.com/weather/64x64/day/116.png",
                "code": 1003
            },
            "wind_kph": 15.1,
            "humidity": 77,
            "cloud": 75,
            "uv": 3.0
        }
    }"#;

    pub(crate) fn london() -> WeatherReport {
        serde_json::from_str(LONDON_JSON).expect("fixture must parse")
    }

    #[test]
    fn decodes_weatherapi_current_body() {
        let report = london();

        assert_eq!(report.location.name, "London");
        assert_eq!(report.location.country, "United Kingdom");
        assert_eq!(report.location.localtime, "2024-05-01 9:05");
        assert_eq!(report.current.temp_c, 12.0);
        assert_eq!(report.current.feelslike_c, Some(10.6));
        assert_eq!(report.current.condition.text, "Partly cloudy");
        assert_eq!(report.current.humidity, 77);
        assert_eq!(report.current.wind_kph, 15.1);
        assert_eq!(report.current.uv, 3.0);
        assert_eq!(report.current.cloud, 75);
    }

    #[test]
    fn icon_url_gets_scheme_and_large_variant() {
        let report = london();
        assert_eq!(
            report.current.condition.icon_url(),
            "https://cdn.weatherapi.com/weather/128x128/day/116.png"
        );
    }

    #[test]
    fn icon_url_keeps_existing_scheme() {
        let cond = Condition {
            text: "Sunny".into(),
            icon: "https://cdn.weatherapi.com/weather/64x64/day/113.png".into(),
        };
        assert_eq!(cond.icon_url(), "https://cdn.weatherapi.com/weather/128x128/day/113.png");
    }

    #[test]
    fn local_time_handles_single_digit_hour() {
        let loc = london().location;
        let t = loc.local_time().expect("localtime should parse");

        assert_eq!((t.year(), t.month(), t.day()), (2024, 5, 1));
        assert_eq!((t.hour(), t.minute()), (9, 5));
        assert_eq!(loc.local_date_str(), "2024-05-01");
        assert_eq!(loc.local_clock_str(), "9:05");
    }

    #[test]
    fn local_time_split_without_clock() {
        let loc = Location {
            name: "X".into(),
            region: String::new(),
            country: "Y".into(),
            localtime: "2024-05-01".into(),
        };
        assert_eq!(loc.local_date_str(), "2024-05-01");
        assert_eq!(loc.local_clock_str(), "");
        assert!(loc.local_time().is_none());
    }

    #[test]
    fn geolocation_city_name_ignores_blank() {
        let geo: GeoLocation = serde_json::from_str(r#"{"ip":"1.2.3.4","city":"  "}"#).unwrap();
        assert_eq!(geo.city_name(), None);

        let geo: GeoLocation = serde_json::from_str(r#"{"ip":"1.2.3.4"}"#).unwrap();
        assert_eq!(geo.city_name(), None);

        let geo: GeoLocation = serde_json::from_str(r#"{"city":"Paris","country":"FR"}"#).unwrap();
        assert_eq!(geo.city_name(), Some("Paris"));
    }
}
