//! services/api/src/bin/openapi.rs
//!
//! Writes the course advisor's OpenAPI document.
//!
//! Usage: `openapi [PATH] [--check]`. With `--check` nothing is written; the
//! command fails if the file at `PATH` differs from the current document.

use api_lib::web::rest::ApiDoc;
use utoipa::OpenApi;

const DEFAULT_PATH: &str = "openapi.json";

fn render() -> Result<String, serde_json::Error> {
    let mut doc = ApiDoc::openapi();
    doc.info.title = "Course Advisor API".to_string();
    doc.info.version = env!("CARGO_PKG_VERSION").to_string();
    doc.to_pretty_json()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut path = DEFAULT_PATH.to_string();
    let mut check = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--check" => check = true,
            other => path = other.to_string(),
        }
    }

    let rendered = render()?;
    if check {
        let on_disk = std::fs::read_to_string(&path)?;
        if on_disk != rendered {
            return Err(format!("{} is out of date; rerun without --check", path).into());
        }
        println!("{} is up to date", path);
    } else {
        std::fs::write(&path, rendered)?;
        println!("OpenAPI document written to {}", path);
    }
    Ok(())
}
