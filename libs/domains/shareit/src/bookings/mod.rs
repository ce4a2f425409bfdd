//! Booking ledger: time-bounded reservations decided by the item owner.

pub mod entity;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use models::{
    Booking, BookingFilter, BookingResponse, BookingShort, BookingState, BookingStatus,
    CreateBooking, NewBooking,
};
pub use postgres::PgBookingRepository;
pub use repository::{BookingRepository, InMemoryBookingRepository};
pub use service::BookingService;
