use std::collections::BTreeMap;

use gs_common::api::{FootprintBreakdown, FootprintResponse, MonthlyFootprint, UtilitySubtotal};
use gs_common::emissions::UtilityType;

use crate::stores::bill::BillRecord;

/// Sum a year's bills into the footprint report: totals per utility type
/// plus a month-ordered trend breakdown. Bills are expected to be
/// pre-filtered to the owning account and target year; an empty slice
/// yields zero totals and an empty monthly list.
pub fn build_footprint(account_name: &str, year: i32, bills: &[BillRecord]) -> FootprintResponse {
    let mut electricity = empty_subtotal(UtilityType::Electricity);
    let mut water = empty_subtotal(UtilityType::Water);
    let mut monthly: BTreeMap<u32, MonthlyFootprint> = BTreeMap::new();
    let mut total_co2_kg = 0.0;

    for bill in bills {
        total_co2_kg += bill.co2_kg;

        let entry = monthly
            .entry(bill.bill_month)
            .or_insert_with(|| MonthlyFootprint {
                month: bill.bill_month,
                electricity_kwh: 0.0,
                water_liters: 0.0,
                total_co2_kg: 0.0,
            });
        entry.total_co2_kg += bill.co2_kg;

        match bill.bill_type {
            UtilityType::Electricity => {
                electricity.consumption_total += bill.bill_amount;
                electricity.co2_kg += bill.co2_kg;
                entry.electricity_kwh += bill.bill_amount;
            }
            UtilityType::Water => {
                water.consumption_total += bill.bill_amount;
                water.co2_kg += bill.co2_kg;
                entry.water_liters += bill.bill_amount;
            }
        }
    }

    FootprintResponse {
        account_name: account_name.to_string(),
        year,
        total_co2_kg,
        breakdown: FootprintBreakdown { electricity, water },
        monthly: monthly.into_values().collect(),
    }
}

fn empty_subtotal(utility: UtilityType) -> UtilitySubtotal {
    UtilitySubtotal {
        consumption_total: 0.0,
        unit: utility.canonical_unit().to_string(),
        co2_kg: 0.0,
        factor: utility.factor_label(),
    }
}

#[cfg(test)]
mod tests {
    use gs_common::emissions::{co2_kg, UtilityType};
    use uuid::Uuid;

    use crate::stores::bill::BillRecord;

    use super::build_footprint;

    fn bill(account_id: Uuid, utility: UtilityType, month: u32, amount: f64) -> BillRecord {
        BillRecord {
            bill_id: Uuid::new_v4(),
            account_id,
            bill_type: utility,
            bill_month: month,
            bill_year: 2024,
            bill_amount: amount,
            unit: utility.canonical_unit().to_string(),
            co2_kg: co2_kg(utility, amount).expect("co2"),
            file_url: "memory://bill.pdf".to_string(),
            uploaded_at: "2024-03-15 10:30:00".to_string(),
        }
    }

    #[test]
    fn empty_year_is_zero_not_error() {
        let report = build_footprint("Grand Resort", 2024, &[]);

        assert_eq!(report.total_co2_kg, 0.0);
        assert_eq!(report.breakdown.electricity.co2_kg, 0.0);
        assert_eq!(report.breakdown.water.co2_kg, 0.0);
        assert!(report.monthly.is_empty());
        assert_eq!(report.year, 2024);
    }

    #[test]
    fn two_electricity_bills_sum_in_month_order() {
        let owner = Uuid::new_v4();
        // Inserted out of month order on purpose.
        let bills = vec![
            bill(owner, UtilityType::Electricity, 3, 1450.75),
            bill(owner, UtilityType::Electricity, 2, 1200.0),
        ];

        let report = build_footprint("Grand Resort", 2024, &bills);

        assert_eq!(report.breakdown.electricity.consumption_total, 2650.75);
        assert_eq!(report.breakdown.electricity.co2_kg, 1325.375);
        assert_eq!(report.monthly.len(), 2);
        assert_eq!(report.monthly[0].month, 2);
        assert_eq!(report.monthly[1].month, 3);
        assert_eq!(report.monthly[1].electricity_kwh, 1450.75);
        assert_eq!(report.monthly[1].total_co2_kg, 725.375);
    }

    #[test]
    fn total_equals_sum_of_per_type_subtotals() {
        let owner = Uuid::new_v4();
        let bills = vec![
            bill(owner, UtilityType::Electricity, 1, 1200.0),
            bill(owner, UtilityType::Water, 1, 2500.0),
            bill(owner, UtilityType::Electricity, 5, 333.25),
            bill(owner, UtilityType::Water, 7, 10000.0),
        ];

        let report = build_footprint("Grand Resort", 2024, &bills);

        assert_eq!(
            report.total_co2_kg,
            report.breakdown.electricity.co2_kg + report.breakdown.water.co2_kg
        );
    }

    #[test]
    fn mixed_utilities_share_a_month_row() {
        let owner = Uuid::new_v4();
        let bills = vec![
            bill(owner, UtilityType::Electricity, 3, 1450.75),
            bill(owner, UtilityType::Water, 3, 2500.0),
        ];

        let report = build_footprint("Grand Resort", 2024, &bills);

        assert_eq!(report.monthly.len(), 1);
        let march = &report.monthly[0];
        assert_eq!(march.electricity_kwh, 1450.75);
        assert_eq!(march.water_liters, 2500.0);
        assert_eq!(march.total_co2_kg, 725.375 + 2.5);
        assert_eq!(report.total_co2_kg, 727.875);
    }

    #[test]
    fn factor_labels_ride_along() {
        let report = build_footprint("Grand Resort", 2024, &[]);
        assert_eq!(report.breakdown.electricity.factor, "0.5 kg CO2 per kWh");
        assert_eq!(report.breakdown.water.factor, "0.001 kg CO2 per liter");
        assert_eq!(report.breakdown.electricity.unit, "kWh");
        assert_eq!(report.breakdown.water.unit, "liters");
    }
}
