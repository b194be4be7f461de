//! Write orchestration
//!
//! Each service validates a request, consults the ledger, persists, then
//! appends history. Handlers own the reads; anything that writes goes
//! through here.
//!
//! Services borrow the pool (and the client lock registry where a
//! read-then-write rule applies) from [`ServerState`](crate::core::ServerState)
//! for the duration of one request. `now` is passed in by the caller.

pub mod attendance;
pub mod clients;
pub mod coaches;
pub mod locks;
pub mod payments;
pub mod promotions;
pub mod statistics;

pub use attendance::AttendanceService;
pub use clients::ClientService;
pub use coaches::CoachService;
pub use locks::ClientLocks;
pub use payments::PaymentService;
pub use promotions::PromotionService;
