//! Identifiers for the booking analytics table.

use sea_query::Iden;

/// `mtd`: one row per room-night booking.
#[derive(Iden, Clone, Copy)]
pub enum Mtd {
    #[iden = "mtd"]
    Table,
    #[iden = "stay_date"]
    StayDate,
    #[iden = "created_at"]
    CreatedAt,
    #[iden = "grand_total"]
    GrandTotal,
    #[iden = "booking_source"]
    BookingSource,
    #[iden = "ota_booking_source"]
    OtaBookingSource,
    #[iden = "guest_status"]
    GuestStatus,
    #[iden = "property_id"]
    PropertyId,
    #[iden = "property_name"]
    PropertyName,
    #[iden = "property_city"]
    PropertyCity,
    #[iden = "room_night_booking_id"]
    RoomNightBookingId,
}
