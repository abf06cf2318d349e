use chrono::Local;
use cityweather_core::{Forecast, UiEvent};

pub fn welcome() {
    println!("cityweather: current weather for any city");
    println!();
    println!("  cityweather configure      store your OpenWeather API key");
    println!("  cityweather show <city>    weather for a city");
    println!("  cityweather locate         weather where you are");
}

pub fn loading(city: &str) {
    eprintln!("Fetching weather for {city}...");
}

pub fn cancelled() {
    eprintln!("Cancelled.");
}

pub fn event(event: &UiEvent) {
    match event {
        UiEvent::ShowSnackbar(message) => eprintln!("! {message}"),
    }
}

pub fn forecast(forecast: &Forecast) {
    for line in forecast_lines(forecast) {
        println!("{line}");
    }
}

fn forecast_lines(forecast: &Forecast) -> Vec<String> {
    let mut lines = vec![
        forecast.city.clone(),
        format!("  {:<12}{}", "Condition", forecast.description),
        format!("  {:<12}{}", "Temperature", forecast.temp),
        format!("  {:<12}{}", "Humidity", forecast.humidity),
        format!("  {:<12}{}", "Icon", forecast.icons.day),
    ];

    if let Some(at) = forecast.observed_at {
        let local = at.with_timezone(&Local);
        let updated = local.format("%Y-%m-%d %H:%M");
        lines.push(format!("  {:<12}{updated}", "Updated"));
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use cityweather_core::icons::IconUrls;

    fn sample(observed_at: Option<i64>) -> Forecast {
        Forecast {
            city: "Nagpur".into(),
            temp: "22.0°C".into(),
            humidity: "63%".into(),
            description: "clear sky".into(),
            icons: IconUrls::for_code("01"),
            observed_at: observed_at.and_then(|ts| DateTime::from_timestamp(ts, 0)),
        }
    }

    #[test]
    fn lines_list_every_reading() {
        let lines = forecast_lines(&sample(None));
        assert_eq!(lines[0], "Nagpur");
        assert!(lines.iter().any(|l| l.contains("22.0°C")));
        assert!(lines.iter().any(|l| l.contains("63%")));
        assert!(lines.iter().any(|l| l.ends_with("01d@4x.png")));
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn observation_time_is_appended_when_known() {
        let lines = forecast_lines(&sample(Some(1_700_000_000)));
        assert_eq!(lines.len(), 6);
        assert!(lines[5].trim_start().starts_with("Updated"));
    }
}
