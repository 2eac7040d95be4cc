use ghcnd::{merge_stations, Ghcnd, ParseOptions, StationObservations};
use std::env;
use std::path::Path;

const WEATHER_STATION_IDS: [&str; 7] = [
    "USW00023066", // Grand Junction Walker Field
    "USC00053553", // Greeley UNC
    "USC00053005", // Ft Collins
    "USC00050848", // Boulder
    "USC00055984", // Northglenn
    "USC00058995", // Wheat Ridge
    "USW00023061", // Alamosa
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    configure_polars_display();
    let output_dir = Path::new("historical_data/weather_station_data");
    std::fs::create_dir_all(output_dir)?;

    let client = Ghcnd::new().await?;
    let all_observations = client
        .stations_observations(&WEATHER_STATION_IDS, &ParseOptions::default())
        .await?;

    for observations in &all_observations {
        let path = output_dir.join(format!("{}.json", observations.station_id()));
        observations.write_json(&path)?;
        let name = client
            .get_station(observations.station_id())
            .map(|s| s.name.as_str())
            .unwrap_or("?");
        println!(
            "{} ({}): {} days, {} to {} -> {}",
            observations.station_id(),
            name,
            observations.len(),
            observations.start_date(),
            observations.end_date(),
            path.display()
        );
    }

    let owned: Vec<StationObservations> = all_observations
        .iter()
        .map(|observations| StationObservations::clone(observations))
        .collect();
    println!("{:#?}", merge_stations(&owned)?);

    Ok(())
}

fn configure_polars_display() {
    // show every column
    env::set_var("POLARS_FMT_MAX_COLS", "-1");
    // show 20 rows
    env::set_var("POLARS_FMT_MAX_ROWS", "20");
}
