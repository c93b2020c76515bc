//! # Tracker
//!
//! Headless participant for the location relay. Replays a route as its own
//! position, keeps everyone else's latest position, and logs the distance
//! lines a map would draw.

use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use url::Url;

use location_relay::application::client::{
    ConsoleMap, DistanceMode, GeolocationSensor, RouteSensor, SensorOptions, Tracker,
    TrackerEvent, Waypoint,
};
use location_relay::config::Settings;
use location_relay::domain::Coordinates;
use location_relay::presentation::websocket::{decode_server, encode, ClientMessage};
use location_relay::telemetry;

#[derive(Parser, Debug, Clone)]
#[command(name = "tracker", version, about = "Headless location relay participant", long_about = None)]
struct Cli {
    /// Relay URL (http(s)://host:port or ws(s)://host:port/ws)
    #[arg(short, long, default_value = "http://localhost:3000")]
    server: String,

    /// Waypoint as "lat,lon" or "lat,lon@ms" (fix takes ms); repeat to build a route
    #[arg(long = "at", value_parser = parse_waypoint)]
    waypoints: Vec<Waypoint>,

    /// Milliseconds between fixes
    #[arg(long, default_value_t = 3000)]
    interval_ms: u64,

    /// Give up on a fix after this many milliseconds
    #[arg(long, default_value_t = 5000)]
    fix_timeout_ms: u64,

    /// Stop sending after the last waypoint instead of looping
    #[arg(long, default_value_t = false)]
    once: bool,

    /// two_party or all_pairs (defaults to configuration)
    #[arg(long)]
    mode: Option<DistanceMode>,

    /// Map zoom used when recentering (defaults to configuration)
    #[arg(long)]
    zoom: Option<u8>,
}

fn parse_waypoint(raw: &str) -> Result<Waypoint, String> {
    let (position, delay) = match raw.split_once('@') {
        Some((position, ms)) => {
            let ms: u64 = ms.trim().parse().map_err(|e| format!("fix delay: {}", e))?;
            (position, Duration::from_millis(ms))
        }
        None => (raw, Duration::ZERO),
    };
    let (lat, lon) = position
        .split_once(',')
        .ok_or_else(|| format!("expected \"lat,lon\", got '{}'", raw))?;
    let lat: f64 = lat.trim().parse().map_err(|e| format!("latitude: {}", e))?;
    let lon: f64 = lon.trim().parse().map_err(|e| format!("longitude: {}", e))?;
    let position = Coordinates::new(lat, lon).map_err(|e| e.to_string())?;
    Ok(Waypoint::delayed(position, delay))
}

/// Build the relay socket URL from a base like "localhost:3000" or "http://host:3000"
fn build_ws_url(base: &str) -> anyhow::Result<Url> {
    let mut url = if base.contains("://") {
        Url::parse(base)?
    } else {
        Url::parse(&format!("http://{}", base))?
    };

    match url.scheme() {
        "http" => url.set_scheme("ws").ok(),
        "https" => url.set_scheme("wss").ok(),
        "ws" | "wss" => Some(()),
        _ => None,
    }
    .ok_or_else(|| anyhow::anyhow!("Unsupported URL scheme: {}", url.scheme()))?;

    if url.path() != "/ws" {
        url.set_path("/ws");
    }
    Ok(url)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_tracing(telemetry::TRACKER_FILTER);

    let cli = Cli::parse();
    let settings = Settings::load().context("failed to load configuration")?;
    let mode = cli.mode.unwrap_or(settings.tracker.distance_mode);
    let zoom = cli.zoom.unwrap_or(settings.tracker.initial_zoom);

    let ws_url = build_ws_url(&cli.server)?;
    let (ws_stream, _resp) = tokio_tungstenite::connect_async(ws_url.as_str())
        .await
        .with_context(|| format!("failed to connect to {}", ws_url))?;
    let (mut write, mut read) = ws_stream.split();
    tracing::info!(url = %ws_url, mode = %mode, "Connected to relay");

    let (events_tx, events_rx) = mpsc::channel::<TrackerEvent>(256);
    let (uplink_tx, mut uplink_rx) = mpsc::unbounded_channel::<Coordinates>();

    // Hub frames -> tracker events
    let relay_events = events_tx.clone();
    let reader = tokio::spawn(async move {
        loop {
            match read.next().await {
                Some(Ok(Message::Text(txt))) => match decode_server(txt.as_str()) {
                    Ok(event) => {
                        if relay_events.send(TrackerEvent::Relay(event)).await.is_err() {
                            return;
                        }
                    }
                    Err(e) => tracing::warn!(error = %e, "Ignoring hub frame"),
                },
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "WebSocket error");
                    break;
                }
            }
        }
        let _ = relay_events.send(TrackerEvent::Closed).await;
    });

    // Own fixes -> send-location frames
    let writer = tokio::spawn(async move {
        while let Some(coordinates) = uplink_rx.recv().await {
            let text = match encode(&ClientMessage::from(coordinates)) {
                Ok(text) => text,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to serialize location");
                    continue;
                }
            };
            if write.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
        let _ = write.close().await;
    });

    let mut route = RouteSensor::new(cli.waypoints, Duration::from_millis(cli.interval_ms));
    if cli.once {
        route = route.once();
    }
    let options = SensorOptions {
        timeout_ms: cli.fix_timeout_ms,
        ..SensorOptions::default()
    };
    let sensor_events = events_tx.clone();
    let sensor = tokio::spawn(async move {
        route.watch(options, sensor_events).await;
    });

    // Ctrl-C behaves like a closed connection
    let shutdown_events = events_tx;
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_events.send(TrackerEvent::Closed).await;
        }
    });

    let tracker = Tracker::new(mode, ConsoleMap::new(), uplink_tx).with_zoom(zoom);
    let tracker = tracker.run(events_rx).await;

    sensor.abort();
    reader.abort();
    drop(tracker);
    if let Err(e) = writer.await {
        tracing::debug!(error = %e, "Writer task ended abnormally");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_ws_url() {
        assert_eq!(
            build_ws_url("localhost:3000").unwrap().as_str(),
            "ws://localhost:3000/ws"
        );
        assert_eq!(
            build_ws_url("https://relay.example.com").unwrap().as_str(),
            "wss://relay.example.com/ws"
        );
        assert!(build_ws_url("ftp://relay.example.com").is_err());
    }

    #[test]
    fn test_parse_waypoint() {
        let w = parse_waypoint("51.5, -0.12").unwrap();
        assert_eq!(w.position.latitude(), 51.5);
        assert_eq!(w.position.longitude(), -0.12);
        assert_eq!(w.fix_delay, Duration::ZERO);

        let w = parse_waypoint("51.5,-0.12@2500").unwrap();
        assert_eq!(w.fix_delay, Duration::from_millis(2500));

        assert!(parse_waypoint("51.5").is_err());
        assert!(parse_waypoint("51.5,0@soon").is_err());
        assert!(parse_waypoint("95,0").is_err());
        assert!(parse_waypoint("x,0").is_err());
    }
}
