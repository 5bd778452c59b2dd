pub mod config;
pub mod dashboard;
pub mod db;
pub mod error;
pub mod events;
pub mod feed;
pub mod filter;
pub mod invoices;
pub mod output;
pub mod scope;
pub mod tasks;
pub mod transfers;
pub mod users;
