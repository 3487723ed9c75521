//! Render model: what the matrix should currently show.
//!
//! The model is owned by the [`Orchestrator`](crate::Orchestrator) and only
//! changes in response to a transit update or a UI-state re-evaluation. All
//! text lives in bounded `heapless::String`s; longer input is cut at a
//! character boundary.

use heapless::{String, Vec};

use crate::config::MAX_ROWS;

// =============================================================================
// Capacities
// =============================================================================

pub const PROVIDER_LEN: usize = 24;
pub const ROUTE_LEN: usize = 24;
pub const DESTINATION_LEN: usize = 64;
pub const ETA_LEN: usize = 12;
pub const STATUS_LEN: usize = 32;
pub const DETAIL_LEN: usize = 64;

/// Shown when a route or ETA is missing.
pub const PLACEHOLDER: &str = "--";

/// Copy `text` into a bounded string, truncating at a character boundary.
pub fn bounded<const N: usize>(text: &str) -> String<N> {
    let mut out = String::new();
    for c in text.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

// =============================================================================
// UI State
// =============================================================================

/// What the device is doing, from the viewer's point of view.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub enum UiState {
    #[default]
    Booting,
    SetupMode,
    NoWifi,
    WifiOkNoMqtt,
    ConnectedWaitingData,
    Transit,
}

impl UiState {
    /// Headline and detail shown in the status view.
    pub const fn status_text(self) -> (&'static str, &'static str) {
        match self {
            Self::Booting => ("BOOTING", "Starting device"),
            Self::SetupMode => ("SETUP MODE", "Connect to device Wi-Fi"),
            Self::NoWifi => ("NO WIFI", "Trying reconnect"),
            Self::WifiOkNoMqtt => ("WIFI OK", "MQTT offline"),
            Self::ConnectedWaitingData => ("CONNECTED", "Waiting transit data"),
            Self::Transit => ("TRANSIT", "Live arrivals"),
        }
    }

    /// Short name for logs.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Booting => "booting",
            Self::SetupMode => "setup",
            Self::NoWifi => "no-wifi",
            Self::WifiOkNoMqtt => "no-mqtt",
            Self::ConnectedWaitingData => "waiting",
            Self::Transit => "transit",
        }
    }

    /// Highest-priority state matching the inputs.
    pub const fn derive(
        has_data: bool,
        wifi_connected: bool,
        mqtt_connected: bool,
        setup_mode_active: bool,
    ) -> Self {
        if has_data && wifi_connected && mqtt_connected {
            Self::Transit
        } else if setup_mode_active && !wifi_connected {
            Self::SetupMode
        } else if !wifi_connected {
            Self::NoWifi
        } else if !mqtt_connected {
            Self::WifiOkNoMqtt
        } else {
            Self::ConnectedWaitingData
        }
    }
}

// =============================================================================
// ETA Helpers
// =============================================================================

/// First run of ASCII digits in `text`, saturating.
fn leading_number(text: &str) -> Option<u32> {
    let digits = text.trim_start_matches(|c: char| !c.is_ascii_digit());
    let end = digits.find(|c: char| !c.is_ascii_digit()).unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    Some(
        digits[..end]
            .bytes()
            .fold(0u32, |acc, b| acc.saturating_mul(10).saturating_add(u32::from(b - b'0'))),
    )
}

/// Whether an ETA label means "arriving now".
#[inline]
pub fn is_due(eta: &str) -> bool { eta.starts_with("DUE") || eta.starts_with("NOW") }

/// Minutes until arrival for ordering; `None` when the label has no number.
pub fn eta_minutes(eta: &str) -> Option<u32> {
    if eta == "DUE" || eta == "NOW" {
        return Some(0);
    }
    leading_number(eta)
}

/// Canonical ETA label: `--`, `DUE`, `<n>m`, or the input unchanged.
pub fn normalize_eta(raw: &str) -> String<ETA_LEN> {
    let trimmed = raw.trim();
    let mut upper: String<ETA_LEN> = String::new();
    for c in trimmed.chars() {
        if upper.push(c.to_ascii_uppercase()).is_err() {
            break;
        }
    }

    if upper.is_empty() || upper == PLACEHOLDER {
        return bounded(PLACEHOLDER);
    }
    if upper == "NOW" || upper == "DUE" {
        return bounded("DUE");
    }

    match leading_number(&upper) {
        Some(minutes) if minutes <= 1 => bounded("DUE"),
        Some(minutes) => {
            let mut out = String::new();
            // u32 digits plus suffix always fit
            core::fmt::write(&mut out, format_args!("{minutes}m")).ok();
            out
        }
        None => bounded(trimmed),
    }
}

// =============================================================================
// Transit Rows
// =============================================================================

/// One arrival line.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct TransitRow {
    pub provider_id: String<PROVIDER_LEN>,
    pub route_id: String<ROUTE_LEN>,
    pub destination: String<DESTINATION_LEN>,
    pub eta: String<ETA_LEN>,
}

impl TransitRow {
    /// Build a row from parsed fields, filling gaps with placeholders.
    ///
    /// Empty route becomes `--`, empty destination falls back to the route and
    /// the ETA is normalized.
    pub fn from_fields(
        provider_id: &str,
        route_id: &str,
        destination: &str,
        eta: &str,
    ) -> Self {
        let route_id = route_id.trim();
        let route_id: String<ROUTE_LEN> = bounded(if route_id.is_empty() { PLACEHOLDER } else { route_id });
        let destination = destination.trim();
        let destination = if destination.is_empty() {
            bounded(&route_id)
        } else {
            bounded(destination)
        };
        Self {
            provider_id: bounded(provider_id.trim()),
            route_id,
            destination,
            eta: normalize_eta(eta),
        }
    }

    /// Row shown before any data arrived.
    pub fn waiting() -> Self {
        Self {
            provider_id: String::new(),
            route_id: bounded(PLACEHOLDER),
            destination: bounded("Waiting data"),
            eta: bounded(PLACEHOLDER),
        }
    }

    /// Whether a real route is set.
    #[inline]
    pub fn has_route(&self) -> bool { !self.route_id.is_empty() && self.route_id != PLACEHOLDER }

    /// Sort key: minutes until arrival, unknown last.
    #[inline]
    pub fn sort_key(&self) -> u32 { eta_minutes(&self.eta).unwrap_or(u32::MAX) }
}

/// Validated payload of one or two rows.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TransitUpdate {
    rows: Vec<TransitRow, MAX_ROWS>,
}

impl TransitUpdate {
    /// Update with a single row.
    pub fn single(row: TransitRow) -> Self {
        let mut rows = Vec::new();
        rows.push(row).ok();
        Self { rows }
    }

    /// Update with two rows.
    pub fn pair(
        first: TransitRow,
        second: TransitRow,
    ) -> Self {
        let mut rows = Self::single(first).rows;
        rows.push(second).ok();
        Self { rows }
    }

    #[inline]
    pub fn rows(&self) -> &[TransitRow] { &self.rows }

    /// Rows with the soonest arrival first.
    pub fn into_sorted_rows(self) -> Vec<TransitRow, MAX_ROWS> {
        let mut rows = self.rows;
        if rows.len() == 2 && rows[1].sort_key() < rows[0].sort_key() {
            rows.swap(0, 1);
        }
        rows
    }
}

// =============================================================================
// Render Model
// =============================================================================

/// Everything the frame compiler needs.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct RenderModel {
    pub ui_state: UiState,
    pub has_data: bool,
    pub status_line: String<STATUS_LEN>,
    pub status_detail: String<DETAIL_LEN>,
    /// Active rows, soonest first.
    pub rows: Vec<TransitRow, MAX_ROWS>,
    /// Tick time of the last transit update.
    pub updated_at_ms: Option<u32>,
}

impl RenderModel {
    /// Model at power-on.
    pub fn booting() -> Self {
        let (line, detail) = UiState::Booting.status_text();
        let mut rows = Vec::new();
        rows.push(TransitRow::waiting()).ok();
        Self {
            ui_state: UiState::Booting,
            has_data: false,
            status_line: bounded(line),
            status_detail: bounded(detail),
            rows,
            updated_at_ms: None,
        }
    }

    /// Whether the transit view (rather than the status view) is shown.
    #[inline]
    pub fn shows_transit(&self) -> bool { self.has_data && self.ui_state == UiState::Transit }
}

impl Default for RenderModel {
    fn default() -> Self { Self::booting() }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ui_state_priority() {
        assert_eq!(UiState::derive(true, true, true, false), UiState::Transit);
        assert_eq!(UiState::derive(true, true, true, true), UiState::Transit);
        assert_eq!(UiState::derive(false, false, false, true), UiState::SetupMode);
        assert_eq!(UiState::derive(true, false, true, true), UiState::SetupMode);
        assert_eq!(UiState::derive(true, false, true, false), UiState::NoWifi);
        assert_eq!(UiState::derive(true, true, false, true), UiState::WifiOkNoMqtt);
        assert_eq!(UiState::derive(false, true, true, false), UiState::ConnectedWaitingData);
    }

    #[test]
    fn test_status_text() {
        assert_eq!(UiState::Booting.status_text(), ("BOOTING", "Starting device"));
        assert_eq!(UiState::NoWifi.status_text().0, "NO WIFI");
        assert_eq!(UiState::default(), UiState::Booting);
    }

    #[test]
    fn test_bounded_truncates_on_char_boundary() {
        let s: String<4> = bounded("abcdef");
        assert_eq!(s.as_str(), "abcd");
        let s: String<3> = bounded("aéb");
        assert_eq!(s.as_str(), "aé");
        let s: String<2> = bounded("aé");
        assert_eq!(s.as_str(), "a");
    }

    #[test]
    fn test_normalize_eta() {
        assert_eq!(normalize_eta("").as_str(), "--");
        assert_eq!(normalize_eta("  -- ").as_str(), "--");
        assert_eq!(normalize_eta("now").as_str(), "DUE");
        assert_eq!(normalize_eta("Due").as_str(), "DUE");
        assert_eq!(normalize_eta("0").as_str(), "DUE");
        assert_eq!(normalize_eta("1 min").as_str(), "DUE");
        assert_eq!(normalize_eta("5").as_str(), "5m");
        assert_eq!(normalize_eta(" 12 mins").as_str(), "12m");
        assert_eq!(normalize_eta("Delayed").as_str(), "Delayed");
    }

    #[test]
    fn test_eta_minutes() {
        assert_eq!(eta_minutes("DUE"), Some(0));
        assert_eq!(eta_minutes("NOW"), Some(0));
        assert_eq!(eta_minutes("5m"), Some(5));
        assert_eq!(eta_minutes("in 12m"), Some(12));
        assert_eq!(eta_minutes("--"), None);
        assert_eq!(eta_minutes(""), None);
        assert_eq!(eta_minutes("99999999999m"), Some(u32::MAX));
    }

    #[test]
    fn test_row_placeholders() {
        let row = TransitRow::from_fields("nyc", "", "", "");
        assert_eq!(row.route_id.as_str(), "--");
        assert_eq!(row.destination.as_str(), "--");
        assert_eq!(row.eta.as_str(), "--");
        assert!(!row.has_route());

        let row = TransitRow::from_fields("nyc", "E", "", "3");
        assert_eq!(row.destination.as_str(), "E");
        assert_eq!(row.eta.as_str(), "3m");
        assert!(row.has_route());
    }

    #[test]
    fn test_update_sorting() {
        let a = TransitRow::from_fields("nyc", "E", "Jamaica", "1m");
        let b = TransitRow::from_fields("nyc", "F", "Coney Island", "5m");

        let rows = TransitUpdate::pair(a.clone(), b.clone()).into_sorted_rows();
        assert_eq!(rows[0].route_id.as_str(), "E");

        let rows = TransitUpdate::pair(b, a).into_sorted_rows();
        assert_eq!(rows[0].route_id.as_str(), "E");
        assert_eq!(rows[1].route_id.as_str(), "F");
    }

    #[test]
    fn test_unknown_eta_sorts_last_and_ties_keep_order() {
        let unknown = TransitRow::from_fields("nyc", "A", "Far", "Delayed");
        let known = TransitRow::from_fields("nyc", "C", "Near", "20");
        let rows = TransitUpdate::pair(unknown.clone(), known).into_sorted_rows();
        assert_eq!(rows[0].route_id.as_str(), "C");

        let twin = TransitRow::from_fields("nyc", "B", "Also far", "Delayed");
        let rows = TransitUpdate::pair(unknown, twin).into_sorted_rows();
        assert_eq!(rows[0].route_id.as_str(), "A");
    }

    #[test]
    fn test_booting_model() {
        let model = RenderModel::booting();
        assert_eq!(model.ui_state, UiState::Booting);
        assert_eq!(model.status_line.as_str(), "BOOTING");
        assert!(!model.shows_transit());
        assert_eq!(model.rows.len(), 1);
    }
}
