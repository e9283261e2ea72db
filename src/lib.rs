pub mod api;
pub mod config;
pub mod db;
pub mod services;

pub use db::DbPool;

use config::Config;

use crate::db::{BookingStore, UserStore};
use crate::services::{AuthService, BookingService};

pub struct AppState {
    pub config: Config,
    pub auth: AuthService,
    pub bookings: BookingService,
}

impl AppState {
    /// Wire the services to a shared pool. The pool stays owned by the
    /// caller, which closes it once the server has stopped.
    pub fn new(config: Config, db: DbPool) -> Self {
        let auth = AuthService::new(UserStore::new(db.clone()));
        let bookings = BookingService::new(
            BookingStore::new(db),
            config.bookings.read_failure_policy,
        );
        Self {
            config,
            auth,
            bookings,
        }
    }
}
