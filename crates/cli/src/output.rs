use crate::error::CliError;
use serde::Serialize;

fn to_json<T: Serialize>(value: &T) -> Result<String, CliError> {
    let json = serde_json::to_string_pretty(value)?;
    Ok(json)
}

pub async fn write_report<T: Serialize>(value: &T, path: &str) -> Result<(), CliError> {
    let report_json = to_json(value)?;
    tokio::fs::write(path, report_json).await?;
    Ok(())
}

pub fn print_report<T: Serialize>(value: &T) -> Result<(), CliError> {
    let report_json = to_json(value)?;
    println!("{report_json}");
    Ok(())
}
