use chrono::{Local, TimeZone};
use std::path::PathBuf;
use unicode_segmentation::UnicodeSegmentation;

pub fn get_data_dir() -> PathBuf {
    let home_dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home_dir.join(".tap")
}

pub fn get_db_path() -> PathBuf {
    get_data_dir().join("notes.db")
}

pub fn get_config_path() -> PathBuf {
    get_data_dir().join("config.toml")
}

/// First line of `content`, cut to `max` graphemes with a trailing ellipsis.
pub fn preview(content: &str, max: usize) -> String {
    let line = content.lines().next().unwrap_or_default().trim();
    let mut graphemes = line.graphemes(true);
    let head: String = graphemes.by_ref().take(max).collect();
    if graphemes.next().is_some() {
        format!("{}…", head)
    } else {
        head
    }
}

/// Local calendar date for an epoch-milliseconds timestamp.
pub fn format_date(millis: i64) -> String {
    match Local.timestamp_millis_opt(millis).single() {
        Some(dt) => dt.format("%Y-%m-%d").to_string(),
        None => "-".to_string(),
    }
}
