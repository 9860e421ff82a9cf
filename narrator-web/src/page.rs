//! HTML pages. Every interpolated value goes through `html_escape`.

use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use narrator_core::Narrative;

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<link rel="stylesheet" href="/static/style.css">
</head>
<body>
<main>
{body}
</main>
</body>
</html>
"#,
        title = text(title),
    )
}

fn search_form(value: &str) -> String {
    format!(
        r#"<form action="/search" method="get">
<input type="text" name="city" placeholder="City" value="{}" required>
<button type="submit">Show weather</button>
</form>"#,
        attr(value)
    )
}

pub fn home() -> String {
    let body = format!(
        "<h1>What's the weather like?</h1>\n<p>Type a city to get today's story.</p>\n{}",
        search_form("")
    );
    layout("Weather", &body)
}

/// OpenWeather icon tokens ("10d") map to their image CDN; WeatherAPI sends
/// protocol-relative URLs.
fn icon_url(icon: &str) -> Option<String> {
    if icon.is_empty() {
        None
    } else if let Some(rest) = icon.strip_prefix("//") {
        Some(format!("https://{rest}"))
    } else if icon.starts_with("http") {
        Some(icon.to_string())
    } else {
        Some(format!("https://openweathermap.org/img/wn/{icon}@2x.png"))
    }
}

pub fn weather(n: &Narrative) -> String {
    let mut body = String::new();

    body.push_str(&format!("<h1>{}, {}</h1>\n", text(&n.city), text(&n.country)));

    if let Some(url) = n.icon.as_deref().and_then(icon_url) {
        body.push_str(&format!(
            "<img class=\"icon\" src=\"{}\" alt=\"{}\">\n",
            attr(&url),
            attr(&n.description)
        ));
    }

    body.push_str(&format!(
        "<p class=\"headline\"><span class=\"temp\">{}&deg;C</span> with {}.</p>\n",
        n.temperature,
        text(&n.description)
    ));

    if !n.comparison.is_empty() {
        body.push_str(&format!("<p class=\"comparison\">{}</p>\n", text(&n.comparison)));
    }

    body.push_str("<dl>\n");
    if let (Some(low), Some(high)) = (n.temperature_min, n.temperature_max) {
        body.push_str(&format!("<dt>Low / high</dt><dd>{low}&deg;C / {high}&deg;C</dd>\n"));
    }
    body.push_str(&format!("<dt>Humidity</dt><dd>{}%</dd>\n", n.humidity_pct));
    body.push_str(&format!("<dt>Pressure</dt><dd>{} hPa</dd>\n", n.pressure_hpa));
    body.push_str(&format!("<dt>Wind</dt><dd>{:.1} m/s</dd>\n", n.wind_speed_mps));
    if let Some(rise) = n.sunrise {
        body.push_str(&format!("<dt>Sunrise</dt><dd>{} UTC</dd>\n", rise.format("%H:%M")));
    }
    if let Some(set) = n.sunset {
        body.push_str(&format!("<dt>Sunset</dt><dd>{} UTC</dd>\n", set.format("%H:%M")));
    }
    body.push_str("</dl>\n");

    body.push_str(&search_form(&n.city));

    layout(&format!("Weather in {}", n.city), &body)
}

pub fn error(city: Option<&str>) -> String {
    let message = match city {
        Some(city) => format!("We couldn't find a city called \u{201c}{}\u{201d}.", text(city)),
        None => "Something went wrong fetching the weather. Please try again.".to_string(),
    };
    let body = format!(
        "<h1>Sorry!</h1>\n<p class=\"error\">{message}</p>\n{}",
        search_form(city.unwrap_or(""))
    );
    layout("Weather not found", &body)
}
