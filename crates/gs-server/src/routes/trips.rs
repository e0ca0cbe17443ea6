use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use gs_common::api::{
    ApiErrorResponse, CreateTripRequest, FlightDetail, HotelStayDetail, TransportDetail,
    TripCarbonResponse, TripListResponse, TripSummary,
};
use gs_common::error::AppError;
use gs_common::travel::{flight_co2_kg, hotel_stay_co2_kg, transport_co2_kg};
use gs_common::types::AccountType;
use uuid::Uuid;

use crate::auth::identity::require_travel_agent;
use crate::routes::error_response;
use crate::state::AppState;
use crate::stores::account::AccountStore;
use crate::stores::bill::BillStore;
use crate::stores::trip::{NewTrip, TripStore};

/// Create a trip and derive its carbon footprint from flights, ground
/// transport, and hotel stays. Hotel stays are costed against the hotel's
/// own billed emissions, so every referenced hotel must exist.
pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateTripRequest>,
) -> Result<Json<TripCarbonResponse>, (StatusCode, Json<ApiErrorResponse>)> {
    let agent = require_travel_agent(&headers, &state.db_pool)
        .await
        .map_err(|e| error_response(&e))?;
    validate_trip(&payload).map_err(|e| error_response(&e))?;

    let tourists = payload.number_of_tourists;
    let accounts = AccountStore::new(state.db_pool.clone());
    let bills = BillStore::new(state.db_pool.clone());

    let mut flights_carbon_kg = 0.0;
    let mut flight_details = Vec::new();
    let mut flight_rows = Vec::new();
    for segment in &payload.flight_segments {
        let carbon_kg = flight_co2_kg(
            &segment.departure_airport,
            &segment.arrival_airport,
            tourists,
        )
        .map_err(|e| error_response(&e))?;
        flights_carbon_kg += carbon_kg;
        flight_details.push(FlightDetail {
            route: format!(
                "{}-{}",
                segment.departure_airport, segment.arrival_airport
            ),
            carbon_kg,
            passengers: tourists,
        });
        flight_rows.push((segment, carbon_kg));
    }

    let mut transport_carbon_kg = 0.0;
    let mut transport_details = Vec::new();
    let mut transport_rows = Vec::new();
    for transport in &payload.local_transports {
        let carbon_kg = transport_co2_kg(&transport.vehicle_type, transport.distance_km, tourists)
            .map_err(|e| error_response(&e))?;
        transport_carbon_kg += carbon_kg;
        transport_details.push(TransportDetail {
            vehicle_type: transport.vehicle_type.clone(),
            distance_km: transport.distance_km,
            carbon_kg,
            passengers: tourists,
        });
        transport_rows.push((transport, carbon_kg));
    }

    let mut hotels_carbon_kg = 0.0;
    let mut hotel_details = Vec::new();
    let mut stay_rows = Vec::new();
    for stay in &payload.hotel_stays {
        let hotel = accounts
            .get(stay.hotel_id)
            .await
            .map_err(|e| error_response(&e))?
            .filter(|account| account.account_type == AccountType::Hotel)
            .ok_or_else(|| {
                error_response(&AppError::InvalidInput(format!(
                    "unknown hotel account: {}",
                    stay.hotel_id
                )))
            })?;

        let hotel_bills = bills
            .list_for_account(stay.hotel_id, None)
            .await
            .map_err(|e| error_response(&e))?;
        let billed_co2: Vec<f64> = hotel_bills.iter().map(|bill| bill.co2_kg).collect();

        let carbon_kg = hotel_stay_co2_kg(&billed_co2, stay.number_of_nights, tourists)
            .map_err(|e| error_response(&e))?;
        hotels_carbon_kg += carbon_kg;
        hotel_details.push(HotelStayDetail {
            hotel_name: hotel.name,
            nights: stay.number_of_nights,
            carbon_kg,
            guests: tourists,
        });
        stay_rows.push((stay, carbon_kg));
    }

    let total_carbon_kg = flights_carbon_kg + transport_carbon_kg + hotels_carbon_kg;

    let store = TripStore::new(state.db_pool.clone());
    let trip = store
        .create(NewTrip {
            account_id: agent.account_id,
            trip_name: payload.trip_name.clone(),
            trip_description: payload.trip_description.clone(),
            number_of_tourists: tourists,
            start_date: payload.start_date,
            end_date: payload.end_date,
            total_carbon_kg,
        })
        .await
        .map_err(|e| error_response(&e))?;

    for (segment, carbon_kg) in flight_rows {
        store
            .add_flight_segment(
                trip.trip_id,
                &segment.departure_airport,
                &segment.arrival_airport,
                segment.transit_airports.as_deref(),
                carbon_kg,
            )
            .await
            .map_err(|e| error_response(&e))?;
    }
    for (transport, carbon_kg) in transport_rows {
        store
            .add_local_transport(
                trip.trip_id,
                &transport.vehicle_type,
                transport.distance_km,
                carbon_kg,
            )
            .await
            .map_err(|e| error_response(&e))?;
    }
    for (stay, carbon_kg) in stay_rows {
        store
            .add_hotel_stay(
                trip.trip_id,
                stay.hotel_id,
                stay.number_of_nights,
                &stay.check_in_date.to_rfc3339(),
                &stay.check_out_date.to_rfc3339(),
                carbon_kg,
            )
            .await
            .map_err(|e| error_response(&e))?;
    }

    tracing::info!(
        trip_id = %trip.trip_id,
        account_id = %agent.account_id,
        total_carbon_kg,
        "trip created"
    );

    Ok(Json(TripCarbonResponse {
        trip_id: trip.trip_id,
        trip_name: trip.trip_name,
        number_of_tourists: tourists,
        total_carbon_kg,
        carbon_per_tourist_kg: total_carbon_kg / tourists as f64,
        flights_carbon_kg,
        transport_carbon_kg,
        hotels_carbon_kg,
        flight_details,
        transport_details,
        hotel_details,
    }))
}

pub async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<TripListResponse>, (StatusCode, Json<ApiErrorResponse>)> {
    let agent = require_travel_agent(&headers, &state.db_pool)
        .await
        .map_err(|e| error_response(&e))?;

    let trips = TripStore::new(state.db_pool.clone())
        .list_for_agent(agent.account_id)
        .await
        .map_err(|e| error_response(&e))?;

    let summaries: Vec<TripSummary> = trips
        .into_iter()
        .map(|trip| TripSummary {
            trip_id: trip.trip_id,
            trip_name: trip.trip_name,
            number_of_tourists: trip.number_of_tourists,
            start_date: trip.start_date,
            end_date: trip.end_date,
            total_carbon_kg: trip.total_carbon_kg,
            carbon_per_tourist_kg: trip.total_carbon_kg / trip.number_of_tourists as f64,
            created_at: trip.created_at,
        })
        .collect();

    Ok(Json(TripListResponse {
        agent_name: agent.name,
        total_trips: summaries.len(),
        trips: summaries,
    }))
}

pub async fn carbon_detail(
    Path(trip_id): Path<String>,
    headers: HeaderMap,
    State(state): State<AppState>,
) -> Result<Json<TripCarbonResponse>, (StatusCode, Json<ApiErrorResponse>)> {
    let agent = require_travel_agent(&headers, &state.db_pool)
        .await
        .map_err(|e| error_response(&e))?;
    let trip_id = Uuid::parse_str(&trip_id).map_err(|_| {
        error_response(&AppError::InvalidInput("trip_id must be a uuid".to_string()))
    })?;

    let store = TripStore::new(state.db_pool.clone());
    let trip = store
        .get_for_agent(trip_id, agent.account_id)
        .await
        .map_err(|e| error_response(&e))?
        .ok_or_else(|| error_response(&AppError::NotFound))?;

    let accounts = AccountStore::new(state.db_pool.clone());

    let segments = store
        .flight_segments(trip.trip_id)
        .await
        .map_err(|e| error_response(&e))?;
    let transports = store
        .local_transports(trip.trip_id)
        .await
        .map_err(|e| error_response(&e))?;
    let stays = store
        .hotel_stays(trip.trip_id)
        .await
        .map_err(|e| error_response(&e))?;

    let flights_carbon_kg: f64 = segments.iter().map(|s| s.carbon_kg).sum();
    let transport_carbon_kg: f64 = transports.iter().map(|t| t.carbon_kg).sum();
    let hotels_carbon_kg: f64 = stays.iter().map(|s| s.carbon_kg).sum();

    let flight_details = segments
        .into_iter()
        .map(|segment| FlightDetail {
            route: format!("{}-{}", segment.departure_airport, segment.arrival_airport),
            carbon_kg: segment.carbon_kg,
            passengers: trip.number_of_tourists,
        })
        .collect();
    let transport_details = transports
        .into_iter()
        .map(|transport| TransportDetail {
            vehicle_type: transport.vehicle_type,
            distance_km: transport.distance_km,
            carbon_kg: transport.carbon_kg,
            passengers: trip.number_of_tourists,
        })
        .collect();

    let mut hotel_details = Vec::new();
    for stay in stays {
        let hotel_name = accounts
            .get(stay.hotel_account_id)
            .await
            .map_err(|e| error_response(&e))?
            .map(|account| account.name)
            .unwrap_or_else(|| "unknown hotel".to_string());
        hotel_details.push(HotelStayDetail {
            hotel_name,
            nights: stay.number_of_nights,
            carbon_kg: stay.carbon_kg,
            guests: trip.number_of_tourists,
        });
    }

    Ok(Json(TripCarbonResponse {
        trip_id: trip.trip_id,
        trip_name: trip.trip_name,
        number_of_tourists: trip.number_of_tourists,
        total_carbon_kg: trip.total_carbon_kg,
        carbon_per_tourist_kg: trip.total_carbon_kg / trip.number_of_tourists as f64,
        flights_carbon_kg,
        transport_carbon_kg,
        hotels_carbon_kg,
        flight_details,
        transport_details,
        hotel_details,
    }))
}

fn validate_trip(payload: &CreateTripRequest) -> Result<(), AppError> {
    if payload.trip_name.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "trip_name must not be empty".to_string(),
        ));
    }
    if payload.number_of_tourists == 0 {
        return Err(AppError::InvalidInput(
            "number_of_tourists must be positive".to_string(),
        ));
    }
    if payload.end_date < payload.start_date {
        return Err(AppError::InvalidInput(
            "end_date must not be before start_date".to_string(),
        ));
    }
    Ok(())
}
