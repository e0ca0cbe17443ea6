use chrono::{DateTime, Utc};
use gs_common::error::{AppError, AppResult};
use serde::Serialize;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripRecord {
    pub trip_id: Uuid,
    pub account_id: Uuid,
    pub trip_name: String,
    pub trip_description: Option<String>,
    pub number_of_tourists: u32,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub total_carbon_kg: f64,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NewTrip {
    pub account_id: Uuid,
    pub trip_name: String,
    pub trip_description: Option<String>,
    pub number_of_tourists: u32,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub total_carbon_kg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlightSegmentRecord {
    pub segment_id: Uuid,
    pub trip_id: Uuid,
    pub departure_airport: String,
    pub arrival_airport: String,
    pub transit_airports: Option<String>,
    pub carbon_kg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocalTransportRecord {
    pub transport_id: Uuid,
    pub trip_id: Uuid,
    pub vehicle_type: String,
    pub distance_km: f64,
    pub carbon_kg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HotelStayRecord {
    pub stay_id: Uuid,
    pub trip_id: Uuid,
    pub hotel_account_id: Uuid,
    pub number_of_nights: u32,
    pub check_in_date: String,
    pub check_out_date: String,
    pub carbon_kg: f64,
}

#[derive(Clone)]
pub struct TripStore {
    pool: SqlitePool,
}

impl TripStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, input: NewTrip) -> AppResult<TripRecord> {
        let trip_id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO trips (trip_id, account_id, trip_name, trip_description, number_of_tourists, start_date, end_date, total_carbon_kg) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(trip_id.to_string())
        .bind(input.account_id.to_string())
        .bind(&input.trip_name)
        .bind(&input.trip_description)
        .bind(input.number_of_tourists as i64)
        .bind(input.start_date.to_rfc3339())
        .bind(input.end_date.to_rfc3339())
        .bind(input.total_carbon_kg)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Upstream(format!("failed to create trip: {e}")))?;

        self.get_for_agent(trip_id, input.account_id)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn add_flight_segment(
        &self,
        trip_id: Uuid,
        departure_airport: &str,
        arrival_airport: &str,
        transit_airports: Option<&str>,
        carbon_kg: f64,
    ) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO flight_segments (segment_id, trip_id, departure_airport, arrival_airport, transit_airports, carbon_kg) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(trip_id.to_string())
        .bind(departure_airport)
        .bind(arrival_airport)
        .bind(transit_airports)
        .bind(carbon_kg)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Upstream(format!("failed to add flight segment: {e}")))?;
        Ok(())
    }

    pub async fn add_local_transport(
        &self,
        trip_id: Uuid,
        vehicle_type: &str,
        distance_km: f64,
        carbon_kg: f64,
    ) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO local_transports (transport_id, trip_id, vehicle_type, distance_km, carbon_kg) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(trip_id.to_string())
        .bind(vehicle_type)
        .bind(distance_km)
        .bind(carbon_kg)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Upstream(format!("failed to add local transport: {e}")))?;
        Ok(())
    }

    pub async fn add_hotel_stay(
        &self,
        trip_id: Uuid,
        hotel_account_id: Uuid,
        number_of_nights: u32,
        check_in_date: &str,
        check_out_date: &str,
        carbon_kg: f64,
    ) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO hotel_stays (stay_id, trip_id, hotel_account_id, number_of_nights, check_in_date, check_out_date, carbon_kg) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(trip_id.to_string())
        .bind(hotel_account_id.to_string())
        .bind(number_of_nights as i64)
        .bind(check_in_date)
        .bind(check_out_date)
        .bind(carbon_kg)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Upstream(format!("failed to add hotel stay: {e}")))?;
        Ok(())
    }

    /// Ownership is enforced in the query itself: a trip id belonging to a
    /// different agent resolves to None, never to another agent's data.
    pub async fn get_for_agent(
        &self,
        trip_id: Uuid,
        account_id: Uuid,
    ) -> AppResult<Option<TripRecord>> {
        let row = sqlx::query(
            "SELECT trip_id, account_id, trip_name, trip_description, number_of_tourists, start_date, end_date, total_carbon_kg, created_at \
             FROM trips WHERE trip_id = ?1 AND account_id = ?2",
        )
        .bind(trip_id.to_string())
        .bind(account_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Upstream(format!("failed to fetch trip: {e}")))?;

        row.map(row_to_trip).transpose()
    }

    pub async fn list_for_agent(&self, account_id: Uuid) -> AppResult<Vec<TripRecord>> {
        let rows = sqlx::query(
            "SELECT trip_id, account_id, trip_name, trip_description, number_of_tourists, start_date, end_date, total_carbon_kg, created_at \
             FROM trips WHERE account_id = ?1 ORDER BY created_at DESC",
        )
        .bind(account_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Upstream(format!("failed to list trips: {e}")))?;

        rows.into_iter().map(row_to_trip).collect()
    }

    pub async fn flight_segments(&self, trip_id: Uuid) -> AppResult<Vec<FlightSegmentRecord>> {
        let rows = sqlx::query(
            "SELECT segment_id, trip_id, departure_airport, arrival_airport, transit_airports, carbon_kg \
             FROM flight_segments WHERE trip_id = ?1",
        )
        .bind(trip_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Upstream(format!("failed to list flight segments: {e}")))?;

        rows.into_iter().map(row_to_flight_segment).collect()
    }

    pub async fn local_transports(&self, trip_id: Uuid) -> AppResult<Vec<LocalTransportRecord>> {
        let rows = sqlx::query(
            "SELECT transport_id, trip_id, vehicle_type, distance_km, carbon_kg \
             FROM local_transports WHERE trip_id = ?1",
        )
        .bind(trip_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Upstream(format!("failed to list local transports: {e}")))?;

        rows.into_iter().map(row_to_local_transport).collect()
    }

    pub async fn hotel_stays(&self, trip_id: Uuid) -> AppResult<Vec<HotelStayRecord>> {
        let rows = sqlx::query(
            "SELECT stay_id, trip_id, hotel_account_id, number_of_nights, check_in_date, check_out_date, carbon_kg \
             FROM hotel_stays WHERE trip_id = ?1",
        )
        .bind(trip_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Upstream(format!("failed to list hotel stays: {e}")))?;

        rows.into_iter().map(row_to_hotel_stay).collect()
    }
}

fn parse_utc(raw: &str, field: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::Upstream(format!("invalid {field} timestamp: {e}")))
}

fn row_to_trip(row: sqlx::sqlite::SqliteRow) -> AppResult<TripRecord> {
    let trip_id: String = row
        .try_get("trip_id")
        .map_err(|e| AppError::Upstream(format!("read trip_id failed: {e}")))?;
    let account_id: String = row
        .try_get("account_id")
        .map_err(|e| AppError::Upstream(format!("read account_id failed: {e}")))?;
    let trip_name: String = row
        .try_get("trip_name")
        .map_err(|e| AppError::Upstream(format!("read trip_name failed: {e}")))?;
    let trip_description: Option<String> = row
        .try_get("trip_description")
        .map_err(|e| AppError::Upstream(format!("read trip_description failed: {e}")))?;
    let number_of_tourists: i64 = row
        .try_get("number_of_tourists")
        .map_err(|e| AppError::Upstream(format!("read number_of_tourists failed: {e}")))?;
    let start_date: String = row
        .try_get("start_date")
        .map_err(|e| AppError::Upstream(format!("read start_date failed: {e}")))?;
    let end_date: String = row
        .try_get("end_date")
        .map_err(|e| AppError::Upstream(format!("read end_date failed: {e}")))?;
    let total_carbon_kg: f64 = row
        .try_get("total_carbon_kg")
        .map_err(|e| AppError::Upstream(format!("read total_carbon_kg failed: {e}")))?;
    let created_at: String = row
        .try_get("created_at")
        .map_err(|e| AppError::Upstream(format!("read created_at failed: {e}")))?;

    Ok(TripRecord {
        trip_id: Uuid::parse_str(&trip_id)
            .map_err(|e| AppError::Upstream(format!("invalid trip_id uuid: {e}")))?,
        account_id: Uuid::parse_str(&account_id)
            .map_err(|e| AppError::Upstream(format!("invalid account_id uuid: {e}")))?,
        trip_name,
        trip_description,
        number_of_tourists: number_of_tourists as u32,
        start_date: parse_utc(&start_date, "start_date")?,
        end_date: parse_utc(&end_date, "end_date")?,
        total_carbon_kg,
        created_at,
    })
}

fn row_to_flight_segment(row: sqlx::sqlite::SqliteRow) -> AppResult<FlightSegmentRecord> {
    let segment_id: String = row
        .try_get("segment_id")
        .map_err(|e| AppError::Upstream(format!("read segment_id failed: {e}")))?;
    let trip_id: String = row
        .try_get("trip_id")
        .map_err(|e| AppError::Upstream(format!("read trip_id failed: {e}")))?;
    let departure_airport: String = row
        .try_get("departure_airport")
        .map_err(|e| AppError::Upstream(format!("read departure_airport failed: {e}")))?;
    let arrival_airport: String = row
        .try_get("arrival_airport")
        .map_err(|e| AppError::Upstream(format!("read arrival_airport failed: {e}")))?;
    let transit_airports: Option<String> = row
        .try_get("transit_airports")
        .map_err(|e| AppError::Upstream(format!("read transit_airports failed: {e}")))?;
    let carbon_kg: f64 = row
        .try_get("carbon_kg")
        .map_err(|e| AppError::Upstream(format!("read carbon_kg failed: {e}")))?;

    Ok(FlightSegmentRecord {
        segment_id: Uuid::parse_str(&segment_id)
            .map_err(|e| AppError::Upstream(format!("invalid segment_id uuid: {e}")))?,
        trip_id: Uuid::parse_str(&trip_id)
            .map_err(|e| AppError::Upstream(format!("invalid trip_id uuid: {e}")))?,
        departure_airport,
        arrival_airport,
        transit_airports,
        carbon_kg,
    })
}

fn row_to_local_transport(row: sqlx::sqlite::SqliteRow) -> AppResult<LocalTransportRecord> {
    let transport_id: String = row
        .try_get("transport_id")
        .map_err(|e| AppError::Upstream(format!("read transport_id failed: {e}")))?;
    let trip_id: String = row
        .try_get("trip_id")
        .map_err(|e| AppError::Upstream(format!("read trip_id failed: {e}")))?;
    let vehicle_type: String = row
        .try_get("vehicle_type")
        .map_err(|e| AppError::Upstream(format!("read vehicle_type failed: {e}")))?;
    let distance_km: f64 = row
        .try_get("distance_km")
        .map_err(|e| AppError::Upstream(format!("read distance_km failed: {e}")))?;
    let carbon_kg: f64 = row
        .try_get("carbon_kg")
        .map_err(|e| AppError::Upstream(format!("read carbon_kg failed: {e}")))?;

    Ok(LocalTransportRecord {
        transport_id: Uuid::parse_str(&transport_id)
            .map_err(|e| AppError::Upstream(format!("invalid transport_id uuid: {e}")))?,
        trip_id: Uuid::parse_str(&trip_id)
            .map_err(|e| AppError::Upstream(format!("invalid trip_id uuid: {e}")))?,
        vehicle_type,
        distance_km,
        carbon_kg,
    })
}

fn row_to_hotel_stay(row: sqlx::sqlite::SqliteRow) -> AppResult<HotelStayRecord> {
    let stay_id: String = row
        .try_get("stay_id")
        .map_err(|e| AppError::Upstream(format!("read stay_id failed: {e}")))?;
    let trip_id: String = row
        .try_get("trip_id")
        .map_err(|e| AppError::Upstream(format!("read trip_id failed: {e}")))?;
    let hotel_account_id: String = row
        .try_get("hotel_account_id")
        .map_err(|e| AppError::Upstream(format!("read hotel_account_id failed: {e}")))?;
    let number_of_nights: i64 = row
        .try_get("number_of_nights")
        .map_err(|e| AppError::Upstream(format!("read number_of_nights failed: {e}")))?;
    let check_in_date: String = row
        .try_get("check_in_date")
        .map_err(|e| AppError::Upstream(format!("read check_in_date failed: {e}")))?;
    let check_out_date: String = row
        .try_get("check_out_date")
        .map_err(|e| AppError::Upstream(format!("read check_out_date failed: {e}")))?;
    let carbon_kg: f64 = row
        .try_get("carbon_kg")
        .map_err(|e| AppError::Upstream(format!("read carbon_kg failed: {e}")))?;

    Ok(HotelStayRecord {
        stay_id: Uuid::parse_str(&stay_id)
            .map_err(|e| AppError::Upstream(format!("invalid stay_id uuid: {e}")))?,
        trip_id: Uuid::parse_str(&trip_id)
            .map_err(|e| AppError::Upstream(format!("invalid trip_id uuid: {e}")))?,
        hotel_account_id: Uuid::parse_str(&hotel_account_id)
            .map_err(|e| AppError::Upstream(format!("invalid hotel_account_id uuid: {e}")))?,
        number_of_nights: number_of_nights as u32,
        check_in_date,
        check_out_date,
        carbon_kg,
    })
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use gs_common::types::AccountType;
    use sqlx::sqlite::SqlitePoolOptions;
    use uuid::Uuid;

    use crate::stores::account::AccountStore;

    use super::{NewTrip, TripStore};

    async fn test_pool() -> sqlx::SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("pool");
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("migrate");
        pool
    }

    async fn agent(pool: &sqlx::SqlitePool, email: &str) -> Uuid {
        AccountStore::new(pool.clone())
            .create("Agent", email, "hash", AccountType::TravelAgent)
            .await
            .expect("account")
            .account_id
    }

    fn sample_trip(account_id: Uuid) -> NewTrip {
        NewTrip {
            account_id,
            trip_name: "European Adventure".to_string(),
            trip_description: None,
            number_of_tourists: 15,
            start_date: Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2024, 7, 15, 0, 0, 0).unwrap(),
            total_carbon_kg: 1234.5,
        }
    }

    #[tokio::test]
    async fn create_trip_with_components() {
        let pool = test_pool().await;
        let owner = agent(&pool, "agent@example.com").await;
        let store = TripStore::new(pool);

        let trip = store.create(sample_trip(owner)).await.expect("create");
        assert_eq!(trip.number_of_tourists, 15);

        store
            .add_flight_segment(trip.trip_id, "JFK", "LHR", None, 100.0)
            .await
            .expect("segment");
        store
            .add_local_transport(trip.trip_id, "bus", 250.5, 50.0)
            .await
            .expect("transport");

        let segments = store.flight_segments(trip.trip_id).await.expect("segments");
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].departure_airport, "JFK");

        let transports = store
            .local_transports(trip.trip_id)
            .await
            .expect("transports");
        assert_eq!(transports.len(), 1);
        assert_eq!(transports[0].distance_km, 250.5);
    }

    #[tokio::test]
    async fn trip_reads_are_scoped_to_agent() {
        let pool = test_pool().await;
        let owner = agent(&pool, "owner@example.com").await;
        let other = agent(&pool, "other@example.com").await;
        let store = TripStore::new(pool);

        let trip = store.create(sample_trip(owner)).await.expect("create");

        let not_yours = store
            .get_for_agent(trip.trip_id, other)
            .await
            .expect("get");
        assert!(not_yours.is_none());

        let others_list = store.list_for_agent(other).await.expect("list");
        assert!(others_list.is_empty());

        let owners_list = store.list_for_agent(owner).await.expect("list");
        assert_eq!(owners_list.len(), 1);
    }
}
