pub mod db;
pub mod error;
pub mod fanout;
pub mod message;
pub mod routes;
pub mod state;
