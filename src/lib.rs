pub mod config;
pub mod error;
pub mod feed;
pub mod fetch;
pub mod parser;
pub mod realtime;
pub mod schedule;
pub mod server;
pub mod static_feed;
pub mod stats;
pub mod upstream;

pub mod gtfs_rt {
    include!(concat!(env!("OUT_DIR"), "/transit_realtime.rs"));
}
