//! Scripted demo feed used when no network stack is attached.
//!
//! Walks through the connectivity states a real device sees at power-on, then
//! cycles through a few arrival boards.

use transit_matrix::model::{TransitRow, TransitUpdate};
use transit_matrix::orchestrator::Connectivity;

/// How long each connectivity phase lasts.
pub const PHASE_MS: u32 = 2_000;

/// How often a new arrival board is published once connected.
pub const UPDATE_INTERVAL_MS: u32 = 5_000;

/// Connectivity at `elapsed_ms` since boot.
pub const fn connectivity_at(elapsed_ms: u32) -> Connectivity {
    match elapsed_ms / PHASE_MS {
        0 => Connectivity {
            wifi_connected: false,
            mqtt_connected: false,
            setup_mode_active: true,
        },
        1 => Connectivity {
            wifi_connected: false,
            mqtt_connected: false,
            setup_mode_active: false,
        },
        2 => Connectivity {
            wifi_connected: true,
            mqtt_connected: false,
            setup_mode_active: false,
        },
        _ => Connectivity::ONLINE,
    }
}

/// Time the first arrival board is published.
pub const fn first_update_ms() -> u32 { 4 * PHASE_MS }

/// Raw board fields: provider, route, destination, ETA.
type Board = [(&'static str, &'static str, &'static str, &'static str); 2];

const BOARDS: [Board; 4] = [
    [
        ("mvg", "U6", "Klinikum Grosshadern", "7"),
        ("mvg", "S8", "Flughafen", "now"),
    ],
    [
        ("mvg", "U6", "Klinikum Grosshadern", "5 min"),
        ("mvg", "S8", "Flughafen", "12"),
    ],
    [
        ("mvg", "27", "", "2"),
        ("mvg", "", "Sendlinger Tor", "--"),
    ],
    [
        ("mvg", "N40", "Hauptbahnhof Nord", "1"),
        ("mvg", "U3", "Moosach", "9"),
    ],
];

/// Arrival board number `step`, wrapping around the script.
pub fn transit_update(step: usize) -> TransitUpdate {
    let [first, second] = BOARDS[step % BOARDS.len()];
    TransitUpdate::pair(
        TransitRow::from_fields(first.0, first.1, first.2, first.3),
        TransitRow::from_fields(second.0, second.1, second.2, second.3),
    )
}
