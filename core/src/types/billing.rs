//! Billing model shared by instance and volume operations.
//!
//! # Design
//! A reservation only exists for prepaid resources, so `Billing` is a sum
//! type: `Prepaid` carries its `Reservation`, the other timings carry
//! nothing. On the wire it is the flat BCE shape
//! `{"paymentTiming": "...", "reservation": {...}}`; conversion goes through
//! `BillingWire` so the invariant is checked on every decode.

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Payment timing tag as sent on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentTiming {
    #[serde(rename = "Prepaid")]
    Prepaid,
    #[serde(rename = "Postpaid")]
    Postpaid,
    #[serde(rename = "bidding")]
    Bidding,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReservationTimeUnit {
    #[default]
    Month,
    Year,
}

/// Reservation term of a prepaid resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub reservation_length: u32,
    #[serde(default)]
    pub reservation_time_unit: ReservationTimeUnit,
}

impl Reservation {
    pub fn new(length: u32, unit: ReservationTimeUnit) -> Result<Self, ApiError> {
        let reservation = Self {
            reservation_length: length,
            reservation_time_unit: unit,
        };
        reservation.validate()?;
        Ok(reservation)
    }

    pub fn months(length: u32) -> Result<Self, ApiError> {
        Self::new(length, ReservationTimeUnit::Month)
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        if self.reservation_length == 0 {
            return Err(ApiError::invalid("reservationLength must be greater than zero"));
        }
        Ok(())
    }
}

/// How a resource is paid for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BillingWire", into = "BillingWire")]
pub enum Billing {
    Prepaid(Reservation),
    Postpaid,
    Bidding,
}

impl Billing {
    pub fn prepaid(length: u32, unit: ReservationTimeUnit) -> Result<Self, ApiError> {
        Ok(Billing::Prepaid(Reservation::new(length, unit)?))
    }

    pub fn postpaid() -> Self {
        Billing::Postpaid
    }

    pub fn bidding() -> Self {
        Billing::Bidding
    }

    /// Assemble a billing value from loose parts, rejecting any combination
    /// where the reservation does not match the timing.
    pub fn from_parts(timing: PaymentTiming, reservation: Option<Reservation>) -> Result<Self, ApiError> {
        match (timing, reservation) {
            (PaymentTiming::Prepaid, Some(reservation)) => {
                reservation.validate()?;
                Ok(Billing::Prepaid(reservation))
            }
            (PaymentTiming::Prepaid, None) => Err(ApiError::invalid("prepaid billing requires a reservation")),
            (_, Some(_)) => Err(ApiError::invalid(format!(
                "reservation is only valid for prepaid billing, got {timing:?}"
            ))),
            (PaymentTiming::Postpaid, None) => Ok(Billing::Postpaid),
            (PaymentTiming::Bidding, None) => Ok(Billing::Bidding),
        }
    }

    pub fn payment_timing(&self) -> PaymentTiming {
        match self {
            Billing::Prepaid(_) => PaymentTiming::Prepaid,
            Billing::Postpaid => PaymentTiming::Postpaid,
            Billing::Bidding => PaymentTiming::Bidding,
        }
    }

    pub fn reservation(&self) -> Option<&Reservation> {
        match self {
            Billing::Prepaid(reservation) => Some(reservation),
            _ => None,
        }
    }

    /// Reservation fields are public, so a prepaid value can still carry a
    /// zero length; builders call this before encoding.
    pub fn validate(&self) -> Result<(), ApiError> {
        match self {
            Billing::Prepaid(reservation) => reservation.validate(),
            _ => Ok(()),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BillingWire {
    payment_timing: PaymentTiming,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reservation: Option<Reservation>,
}

impl TryFrom<BillingWire> for Billing {
    type Error = String;

    fn try_from(wire: BillingWire) -> Result<Self, Self::Error> {
        match (wire.payment_timing, wire.reservation) {
            (PaymentTiming::Prepaid, Some(reservation)) => Ok(Billing::Prepaid(reservation)),
            (PaymentTiming::Prepaid, None) => Err("prepaid billing is missing its reservation".to_string()),
            // Providers may echo a reservation for other timings; it carries no meaning there.
            (PaymentTiming::Postpaid, _) => Ok(Billing::Postpaid),
            (PaymentTiming::Bidding, _) => Ok(Billing::Bidding),
        }
    }
}

impl From<Billing> for BillingWire {
    fn from(billing: Billing) -> Self {
        let payment_timing = billing.payment_timing();
        let reservation = match billing {
            Billing::Prepaid(reservation) => Some(reservation),
            _ => None,
        };
        Self {
            payment_timing,
            reservation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn prepaid_round_trips() {
        let billing = Billing::prepaid(1, ReservationTimeUnit::Month).unwrap();
        let wire = serde_json::to_value(&billing).unwrap();
        assert_eq!(
            wire,
            json!({
                "paymentTiming": "Prepaid",
                "reservation": {"reservationLength": 1, "reservationTimeUnit": "Month"}
            })
        );
        let back: Billing = serde_json::from_value(wire).unwrap();
        assert_eq!(back, billing);
    }

    #[rstest]
    #[case(Billing::Postpaid, "Postpaid")]
    #[case(Billing::Bidding, "bidding")]
    fn non_prepaid_omits_reservation(#[case] billing: Billing, #[case] tag: &str) {
        let wire = serde_json::to_value(&billing).unwrap();
        assert_eq!(wire, json!({ "paymentTiming": tag }));
        assert!(wire.get("reservation").is_none());
    }

    #[test]
    fn prepaid_without_reservation_fails_to_decode() {
        let result: Result<Billing, _> = serde_json::from_value(json!({"paymentTiming": "Prepaid"}));
        assert!(result.is_err());
    }

    #[rstest]
    #[case("Postpaid", Billing::Postpaid)]
    #[case("bidding", Billing::Bidding)]
    fn echoed_reservation_is_ignored(#[case] tag: &str, #[case] expected: Billing) {
        let billing: Billing = serde_json::from_value(json!({
            "paymentTiming": tag,
            "reservation": {"reservationLength": 3, "reservationTimeUnit": "Year"}
        }))
        .unwrap();
        assert_eq!(billing, expected);
        assert!(billing.reservation().is_none());
    }

    #[test]
    fn missing_time_unit_defaults_to_month() {
        let billing: Billing = serde_json::from_value(json!({
            "paymentTiming": "Prepaid",
            "reservation": {"reservationLength": 2}
        }))
        .unwrap();
        assert_eq!(
            billing.reservation().unwrap().reservation_time_unit,
            ReservationTimeUnit::Month
        );
    }

    #[test]
    fn unknown_payment_timing_is_rejected() {
        let result: Result<Billing, _> = serde_json::from_value(json!({"paymentTiming": "Weekly"}));
        assert!(result.is_err());
    }

    #[rstest]
    #[case(PaymentTiming::Prepaid, None)]
    #[case(PaymentTiming::Postpaid, Some(1))]
    #[case(PaymentTiming::Bidding, Some(1))]
    #[case(PaymentTiming::Prepaid, Some(0))]
    fn from_parts_rejects_inconsistent_combinations(
        #[case] timing: PaymentTiming,
        #[case] length: Option<u32>,
    ) {
        let reservation = length.map(|reservation_length| Reservation {
            reservation_length,
            reservation_time_unit: ReservationTimeUnit::Month,
        });
        let err = Billing::from_parts(timing, reservation).unwrap_err();
        assert!(matches!(err, ApiError::InvalidArgument(_)));
    }

    #[test]
    fn from_parts_accepts_consistent_combinations() {
        let prepaid = Billing::from_parts(PaymentTiming::Prepaid, Some(Reservation::months(6).unwrap())).unwrap();
        assert_eq!(prepaid.payment_timing(), PaymentTiming::Prepaid);
        assert_eq!(Billing::from_parts(PaymentTiming::Postpaid, None).unwrap(), Billing::Postpaid);
        assert_eq!(Billing::from_parts(PaymentTiming::Bidding, None).unwrap(), Billing::Bidding);
    }

    #[test]
    fn zero_length_reservation_fails_validation() {
        assert!(Reservation::months(0).is_err());
        let billing = Billing::Prepaid(Reservation {
            reservation_length: 0,
            reservation_time_unit: ReservationTimeUnit::Year,
        });
        assert!(billing.validate().is_err());
        assert!(Billing::Postpaid.validate().is_ok());
    }
}
