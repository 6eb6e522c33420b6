//! Text rendering of result states.

use weatherapp_core::{ResultState, WeatherReport};

pub const LOCATING: &str = "Locating you from your IP address...";
pub const LOADING: &str = "Loading...";

/// Text for one state. `Idle` renders as nothing.
pub fn render(state: &ResultState) -> String {
    match state {
        ResultState::Idle => String::new(),
        ResultState::Loading => LOADING.to_string(),
        ResultState::Error(msg) => msg.clone(),
        ResultState::Success(report) => render_report(report),
    }
}

pub fn render_report(report: &WeatherReport) -> String {
    let location = &report.location;
    let current = &report.current;

    let mut rows = vec![
        ("Humidity", current.humidity.to_string()),
        ("Wind Speed", format!("{}km/h", current.wind_kph)),
        ("UV", current.uv.to_string()),
        ("Cloud", current.cloud.to_string()),
    ];
    if let Some(feels) = current.feelslike_c {
        rows.insert(0, ("Feels like", format!("{feels}°C")));
    }

    rows.push(("Time", location.local_clock_str().to_string()));
    rows.push(("Date", location.local_date_str().to_string()));

    let mut out = String::new();
    out.push_str(&format!("\n  {}\n", location.name));
    out.push_str(&format!("  {}\n\n", location.country));
    out.push_str(&format!("  {}°C\n", current.temp_c));
    out.push_str(&format!("  {}\n", current.condition.text));
    out.push_str(&format!("  {}\n\n", current.condition.icon_url()));

    let width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    for (label, value) in rows {
        out.push_str(&format!("  {label:<width$}  {value}\n"));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{
        "location": {"name": "Paris", "country": "France", "localtime": "2024-07-14 21:30"},
        "current": {
            "temp_c": 24.5,
            "condition": {"text": "Clear", "icon": "//cdn.weatherapi.com/weather/64x64/night/113.png"},
            "humidity": 48,
            "wind_kph": 9.4,
            "uv": 1.0,
            "cloud": 0
        }
    }"#;

    fn paris() -> WeatherReport {
        serde_json::from_str(BODY).unwrap()
    }

    #[test]
    fn simple_states() {
        assert_eq!(render(&ResultState::Idle), "");
        assert_eq!(render(&ResultState::Loading), "Loading...");
        assert_eq!(render(&ResultState::Error("Failed to load: Empty response".into())), "Failed to load: Empty response");
    }

    #[test]
    fn report_shows_every_field() {
        let text = render(&ResultState::Success(paris()));

        assert!(text.contains("Paris"));
        assert!(text.contains("France"));
        assert!(text.contains("24.5°C"));
        assert!(text.contains("Clear"));
        assert!(text.contains("https://cdn.weatherapi.com/weather/128x128/night/113.png"));
        assert!(text.contains("Humidity    48\n"));
        assert!(text.contains("Cloud       0\n"));
        assert!(text.contains("9.4km/h"));
        assert!(text.contains("21:30"));
        assert!(text.contains("2024-07-14"));
        assert!(!text.contains("Feels like"));
    }

    #[test]
    fn local_time_is_shown_as_sent() {
        let mut report = paris();
        report.location.localtime = "2024-07-15 9:05".into();

        let text = render_report(&report);
        assert!(text.contains("Time        9:05\n"));
        assert!(!text.contains("09:05"));
        assert!(text.contains("Date        2024-07-15\n"));
    }

    #[test]
    fn unparseable_localtime_is_shown_raw() {
        let mut report = paris();
        report.location.localtime = "soon later".into();

        let text = render_report(&report);
        assert!(text.contains("Time        later"));
        assert!(text.contains("Date        soon"));
    }
}
