//! Turns a weather snapshot into the dashboard's view tree.
//!
//! Everything in here is a pure function of its arguments; mounting the
//! result is the caller's business (see [`crate::view::Surface`]).

use chrono::{Datelike, Timelike};

use crate::{
    model::{ForecastDay, HourlySample, WeatherSnapshot},
    view::{Action, ViewNode},
};

pub const WEATHER_CONTAINER_ID: &str = "weatherContainer";
pub const SETTINGS_MODAL_ID: &str = "weatherModal";

/// Day-of-week labels indexed by days since Sunday.
pub const WEEKDAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Positions in the hourly forecast shown in the hourly strip.
pub const HOURLY_INDICES: [usize; 4] = [1, 3, 5, 7];

const ICON_BASE_URL: &str = "https://developer.accuweather.com/sites/default/files";

/// Layout of a weather tile. Only presentation differs between the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileLayout {
    /// Wide tile used for today.
    Hero,
    /// Small tile used in the next-days row.
    Compact,
}

/// Build the full weather container for `label` from `snapshot`.
pub fn render(label: &str, snapshot: &WeatherSnapshot) -> ViewNode {
    ViewNode::new("div")
        .attr("id", WEATHER_CONTAINER_ID)
        .class("row mt-5")
        .attr("data-location-label", label)
        .child(today_section(label, snapshot))
        .child(next_days_section(&snapshot.five_day.days))
}

fn today_section(label: &str, snapshot: &WeatherSnapshot) -> ViewNode {
    ViewNode::new("div")
        .attr("data-section", "today")
        .child(
            ViewNode::new("div")
                .class("d-flex flex-row")
                .child(today_info_box(snapshot))
                .child(settings_trigger(label)),
        )
        .child(current_day_weather(snapshot))
        .child(hourly_strip(&snapshot.hourly))
}

fn today_info_box(snapshot: &WeatherSnapshot) -> ViewNode {
    ViewNode::new("div")
        .class("weather__element flex-grow-1 p-3")
        .child(
            ViewNode::new("h1")
                .text(format!("Weather in {}", snapshot.location_info.localized_name)),
        )
        .child(ViewNode::new("div").text(snapshot.five_day.headline_text.clone()))
}

fn settings_trigger(label: &str) -> ViewNode {
    ViewNode::new("div").class("d-flex weather__element").child(
        ViewNode::new("button")
            .attr("type", "button")
            .class("btn weather__settings__button justify-content-center align-items-center")
            .attr("data-bs-toggle", "modal")
            .attr("data-bs-target", format!("#{SETTINGS_MODAL_ID}"))
            .attr("title", label)
            .attr("aria-label", "Weather settings")
            .on("click", Action::OpenSettings),
    )
}

fn current_day_weather(snapshot: &WeatherSnapshot) -> ViewNode {
    let container =
        ViewNode::new("div").class("d-flex align-items-center weather__element weather__element--center");

    let (Some(today), Some(current)) = (snapshot.five_day.days.first(), snapshot.current_day.first())
    else {
        return container;
    };

    container.child(weather_tile(
        &format!("{}°C", current.temperature_metric),
        today.icon,
        &format!("↑ {}", today.max_temp),
        &format!("↓ {}", today.min_temp),
        TileLayout::Hero,
    ))
}

fn hourly_strip(hourly: &[HourlySample]) -> ViewNode {
    let entries = HOURLY_INDICES.iter().filter_map(|&i| hourly.get(i)).map(|sample| {
        ViewNode::new("div")
            .class("d-flex flex-column")
            .attr("data-hourly", "entry")
            .child(
                ViewNode::new("div")
                    .class("fs-5 fw-bold text-center")
                    .text(format!("{}°C", sample.temperature)),
            )
            .child(ViewNode::new("div").class("text-center").text(hour_label(sample)))
    });

    ViewNode::new("div")
        .class("d-flex flex-column align-items-start justify-content-center weather__element py-4")
        .child(ViewNode::new("h2").class("ps-3").text("Hourly Weather"))
        .child(ViewNode::new("div").class("d-flex justify-content-between col-12 px-3").children(entries))
}

fn next_days_section(days: &[ForecastDay]) -> ViewNode {
    ViewNode::new("div")
        .class("d-flex justify-content-center flex-wrap")
        .attr("data-section", "next-days")
        .children(days.iter().map(|day| {
            ViewNode::new("div").class("col").child(weather_tile(
                weekday_label(day),
                day.icon,
                &day.max_temp.to_string(),
                &day.min_temp.to_string(),
                TileLayout::Compact,
            ))
        }))
}

/// Tile showing a heading, an icon and a max/min pair.
pub fn weather_tile(heading: &str, icon: u8, max: &str, min: &str, layout: TileLayout) -> ViewNode {
    let (tile, heading_node, icon_node, range) = match layout {
        TileLayout::Hero => (
            ViewNode::new("div").class("row d-flex align-items-center justify-content-center m-5"),
            ViewNode::new("div").class("fs-1 fw-bold col-12 col-sm-4 weather__element--center"),
            ViewNode::new("div").class("col-12 col-sm-4 weather__element--center"),
            ViewNode::new("div").class("col-12 col-sm-4 weather__element--center"),
        ),
        TileLayout::Compact => (
            ViewNode::new("div")
                .class("d-flex flex-column align-items-center justify-content-center weather__element p-3"),
            ViewNode::new("div"),
            ViewNode::new("div"),
            ViewNode::new("div").class("row"),
        ),
    };

    tile.attr("data-tile", match layout {
        TileLayout::Hero => "hero",
        TileLayout::Compact => "compact",
    })
    .child(heading_node.text(heading))
    .child(icon_node.child(ViewNode::new("img").attr("src", icon_url(icon)).attr("alt", "")))
    .child(range.child(temperature(max).add_class("fw-bold")).child(temperature(min)))
}

fn temperature(value: &str) -> ViewNode {
    ViewNode::new("div").class("col").text(format!("{value}°C"))
}

/// Icon asset names are the icon number padded to two digits.
pub fn icon_url(icon: u8) -> String {
    format!("{ICON_BASE_URL}/{icon:02}-s.png")
}

pub fn weekday_label(day: &ForecastDay) -> &'static str {
    WEEKDAY_LABELS[day.date.weekday().num_days_from_sunday() as usize]
}

/// "HH:00" in the sample's own offset.
pub fn hour_label(sample: &HourlySample) -> String {
    format!("{:02}:00", sample.date_time.hour())
}
