use anyhow::Result;
use arcade::{
    cli,
    logging::{self, LOG_FILE},
    output::resolve_save_dir_in,
};
use chrono::NaiveDateTime;
use log::info;
use std::{fs, path::Path};
use tempdir::TempDir;

/// Splits `2024-05-01 12:00:00,123 INFO: message` into the time and the rest.
fn split_line(line: &str) -> (&str, &str, &str) {
    (&line[..19], &line[19..23], &line[23..])
}

// The logger is global, so everything is checked in a single test.
#[test]
fn log_lines_reach_train_log() -> Result<()> {
    let dir = TempDir::new("train_log")?;
    logging::init(dir.path())?;

    info!("starting");
    let save_dir = resolve_save_dir_in(dir.path(), Some(Path::new("/elsewhere")), dir.path());
    cli::warn_if_rejected(&save_dir);
    log::logger().flush();

    let text = fs::read_to_string(dir.path().join(LOG_FILE))?;
    let lines = text.lines().collect::<Vec<_>>();
    assert_eq!(lines.len(), 2, "{}", text);

    for line in &lines {
        let (time, millis, _) = split_line(line);
        assert!(NaiveDateTime::parse_from_str(time, "%Y-%m-%d %H:%M:%S").is_ok(), "{}", line);
        assert!(millis.starts_with(','), "{}", line);
        assert!(millis[1..].chars().all(|c| c.is_ascii_digit()), "{}", line);
    }

    assert_eq!(split_line(lines[0]).2, " INFO: starting");
    let warning = split_line(lines[1]).2;
    assert!(warning.starts_with(" WARN: SAVE_DIR \"/elsewhere\" was outside project tree."));
    assert!(warning.contains(&format!("{:?}", dir.path().join("out"))));
    Ok(())
}
