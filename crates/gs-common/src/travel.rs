use crate::error::{AppError, AppResult};

pub const FLIGHT_KG_CO2_PER_PASSENGER_KM: f64 = 0.255;
pub const DEFAULT_FLIGHT_DISTANCE_KM: f64 = 500.0;
pub const HOTEL_FALLBACK_KG_CO2_PER_ROOM_NIGHT: f64 = 30.0;
pub const ASSUMED_GUESTS_PER_ROOM: f64 = 2.0;
/// Utility bills are assumed to cover a month when deriving a daily figure.
pub const BILL_PERIOD_DAYS: f64 = 30.0;

/// Great-circle distances for routes the calculator knows about, in km.
/// Unknown routes fall back to DEFAULT_FLIGHT_DISTANCE_KM.
const ROUTE_DISTANCES_KM: &[(&str, &str, f64)] = &[
    ("JFK", "LHR", 5550.0),
    ("LHR", "CDG", 350.0),
    ("CDG", "FCO", 1110.0),
    ("FCO", "ATH", 1050.0),
];

const VEHICLE_FACTORS: &[(&str, f64)] = &[
    ("bus", 0.089),
    ("car", 0.171),
    ("train", 0.041),
    ("taxi", 0.171),
    ("metro", 0.033),
];

/// kg CO2 per passenger-km for a ground vehicle; unrecognized types are
/// costed as a car.
pub fn vehicle_factor(vehicle_type: &str) -> f64 {
    let vehicle = vehicle_type.to_ascii_lowercase();
    VEHICLE_FACTORS
        .iter()
        .find(|(name, _)| *name == vehicle)
        .map(|(_, factor)| *factor)
        .unwrap_or(0.171)
}

pub fn route_distance_km(departure: &str, arrival: &str) -> f64 {
    ROUTE_DISTANCES_KM
        .iter()
        .find(|(from, to, _)| {
            (*from == departure && *to == arrival) || (*from == arrival && *to == departure)
        })
        .map(|(_, _, km)| *km)
        .unwrap_or(DEFAULT_FLIGHT_DISTANCE_KM)
}

pub fn flight_co2_kg(departure: &str, arrival: &str, passengers: u32) -> AppResult<f64> {
    if passengers == 0 {
        return Err(AppError::InvalidInput(
            "flight passenger count must be positive".to_string(),
        ));
    }
    Ok(route_distance_km(departure, arrival) * FLIGHT_KG_CO2_PER_PASSENGER_KM * passengers as f64)
}

pub fn transport_co2_kg(vehicle_type: &str, distance_km: f64, passengers: u32) -> AppResult<f64> {
    if !distance_km.is_finite() || distance_km < 0.0 {
        return Err(AppError::InvalidInput(
            "transport distance must be non-negative".to_string(),
        ));
    }
    if passengers == 0 {
        return Err(AppError::InvalidInput(
            "transport passenger count must be positive".to_string(),
        ));
    }
    Ok(distance_km * vehicle_factor(vehicle_type) * passengers as f64)
}

/// Carbon for a hotel stay, derived from the hotel's own billed emissions.
/// `bill_co2_kgs` carries the stored CO2 value of each bill the hotel has
/// uploaded; with no bills the industry fallback per room-night applies.
pub fn hotel_stay_co2_kg(bill_co2_kgs: &[f64], nights: u32, guests: u32) -> AppResult<f64> {
    if nights == 0 || guests == 0 {
        return Err(AppError::InvalidInput(
            "hotel stay nights and guests must be positive".to_string(),
        ));
    }

    let rooms = guests as f64 / ASSUMED_GUESTS_PER_ROOM;
    if bill_co2_kgs.is_empty() {
        return Ok(HOTEL_FALLBACK_KG_CO2_PER_ROOM_NIGHT * nights as f64 * rooms);
    }

    let avg_daily_kg = bill_co2_kgs
        .iter()
        .map(|kg| kg / BILL_PERIOD_DAYS)
        .sum::<f64>()
        / bill_co2_kgs.len() as f64;

    Ok(avg_daily_kg * nights as f64 * rooms)
}
