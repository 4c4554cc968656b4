// Database service module
// SQLite connection and lesson schema management

mod connection;
mod migrations;
mod schema;

pub use connection::Database;
