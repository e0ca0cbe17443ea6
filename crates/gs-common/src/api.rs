use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::emissions::UtilityType;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub ok: bool,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegisterAccountRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub account_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegisterAccountResponse {
    pub account_id: Uuid,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: String,
    pub account_id: Uuid,
    pub account_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BillUploadResponse {
    pub bill_id: Uuid,
    pub bill_type: UtilityType,
    pub bill_month: u32,
    pub bill_year: i32,
    pub bill_amount: f64,
    pub unit: String,
    pub co2_kg: f64,
    pub file_url: String,
    pub message: String,
}

/// Per-utility subtotal in a footprint report. `factor` is the
/// human-readable rate used, e.g. "0.5 kg CO2 per kWh".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UtilitySubtotal {
    pub consumption_total: f64,
    pub unit: String,
    pub co2_kg: f64,
    pub factor: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FootprintBreakdown {
    pub electricity: UtilitySubtotal,
    pub water: UtilitySubtotal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthlyFootprint {
    pub month: u32,
    pub electricity_kwh: f64,
    pub water_liters: f64,
    pub total_co2_kg: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FootprintResponse {
    pub account_name: String,
    pub year: i32,
    pub total_co2_kg: f64,
    pub breakdown: FootprintBreakdown,
    pub monthly: Vec<MonthlyFootprint>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlightSegmentInput {
    pub departure_airport: String,
    pub arrival_airport: String,
    pub transit_airports: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocalTransportInput {
    pub vehicle_type: String,
    pub distance_km: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HotelStayInput {
    pub hotel_id: Uuid,
    pub number_of_nights: u32,
    pub check_in_date: DateTime<Utc>,
    pub check_out_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateTripRequest {
    pub trip_name: String,
    pub trip_description: Option<String>,
    pub number_of_tourists: u32,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub flight_segments: Vec<FlightSegmentInput>,
    #[serde(default)]
    pub local_transports: Vec<LocalTransportInput>,
    #[serde(default)]
    pub hotel_stays: Vec<HotelStayInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlightDetail {
    pub route: String,
    pub carbon_kg: f64,
    pub passengers: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransportDetail {
    pub vehicle_type: String,
    pub distance_km: f64,
    pub carbon_kg: f64,
    pub passengers: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HotelStayDetail {
    pub hotel_name: String,
    pub nights: u32,
    pub carbon_kg: f64,
    pub guests: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TripCarbonResponse {
    pub trip_id: Uuid,
    pub trip_name: String,
    pub number_of_tourists: u32,
    pub total_carbon_kg: f64,
    pub carbon_per_tourist_kg: f64,
    pub flights_carbon_kg: f64,
    pub transport_carbon_kg: f64,
    pub hotels_carbon_kg: f64,
    pub flight_details: Vec<FlightDetail>,
    pub transport_details: Vec<TransportDetail>,
    pub hotel_details: Vec<HotelStayDetail>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TripSummary {
    pub trip_id: Uuid,
    pub trip_name: String,
    pub number_of_tourists: u32,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub total_carbon_kg: f64,
    pub carbon_per_tourist_kg: f64,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TripListResponse {
    pub agent_name: String,
    pub total_trips: usize,
    pub trips: Vec<TripSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiErrorResponse {
    pub code: String,
    pub message: String,
}
